//! `dnl-node`: node flow-distribution models.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                      |
//! |--------------|---------------------------------------------------------------|
//! | [`model`]    | `NodeModel` and its variant parameters                        |
//! | [`movement`] | `NodeInput`, `NodeFlows`, split of mixtures into movements    |
//! | [`simple`]   | origin, destination and linear nodes                          |
//! | [`daganzo`]  | Daganzo diverge and merge                                     |
//! | [`tampere`]  | Tampere's generic node model (unsignalized and signalized)    |
//! | [`signals`]  | fixed-time and basic cyclic signal plans                      |
//! | [`inm`]      | incremental node models (basic, general, approximate INMC)    |
//! | [`error`]    | `NodeError`, `NodeResult<T>`                                  |
//!
//! # Contract
//!
//! A node reads the sending mixture of each incoming link, the receiving
//! flow of each outgoing link and, for intersections, a turning-fraction
//! table.  It returns the mixture removed from every incoming link (at most
//! its sending flow) and the mixture added to every outgoing link (at most
//! its receiving flow).  Except at origins and destinations the two sides
//! carry the same vehicles for the same destinations.
//!
//! Every model except origin and destination is FIFO per incoming link: one
//! share `θ_i` of the link's demand passes, whatever its turn.  The solvers
//! compute those shares and [`Movements::assemble`] turns them into flows.

pub mod daganzo;
pub mod error;
pub mod inm;
pub mod model;
pub mod movement;
pub mod signals;
pub mod simple;
pub mod tampere;


pub use daganzo::{daganzo_diverge, daganzo_merge};
pub use error::{NodeError, NodeResult};
pub use model::{InmPriority, InmVariant, NodeModel, TampereVariant};
pub use movement::{Movements, NodeFlows, NodeInput};
pub use signals::{BasicPhase, BasicSignalPlan, GreenShares, Movement, SignalPhase, SignalPlan};
pub use simple::origin_demand;
pub use tampere::tampere;
