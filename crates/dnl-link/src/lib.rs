//! `dnl-link`: link flow models and their cumulative count history.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`fundamental`] | `FundamentalDiagram`: triangular flow-density relation   |
//! | [`model`]       | `LinkModel`: LTM, CTM, point / spatial queue, connector  |
//! | [`link`]        | `Link`: parameters, per-step supply/demand, history      |
//! | [`lookback`]    | delayed reads of cumulative curves                        |
//! | [`error`]       | `LinkError`, `LinkResult<T>`                              |
//!
//! # Cumulative curves
//!
//! Every link keeps `U` (cumulative inflow at the upstream end) and `D`
//! (cumulative outflow at the downstream end) at each step boundary.  These
//! are the canonical state: sending and receiving flows are recomputed from
//! them, and the destination-tagged `inflow` / `outflow` histories always
//! satisfy `U[t+1] - U[t] == inflow[t].total()`.

pub mod error;
pub mod fundamental;
pub mod link;
pub mod lookback;
pub mod model;


pub use error::{LinkError, LinkResult};
pub use fundamental::FundamentalDiagram;
pub use link::Link;
pub use model::{CellState, LinkKind, LinkModel};
