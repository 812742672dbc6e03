//! `dnl-core`: foundational types for the dynamic network loading workspace.
//!
//! This crate is a dependency of every other `dnl-*` crate.  It has no
//! `dnl-*` dependencies and minimal external ones (`thiserror`, `tracing`,
//! plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`ids`]         | `LinkId`, `NodeId`, `OriginId`, `DestinationId`           |
//! | [`time`]        | `StepClock`, `LoadingConfig`, `LookbackMode`              |
//! | [`mixture`]     | `MixtureFlow`: destination-tagged flow value             |
//! | [`fractions`]   | `MixtureFractions`, `TurningFractions`                    |
//! | [`demand`]      | `TimeDependentOdm`                                        |
//! | [`diagnostics`] | `Diagnostic`, `Diagnostics`: non-fatal model anomalies   |
//! | [`error`]       | `DnlError`, `DnlResult`                                   |
//!
//! # Units
//!
//! Link parameters are in km, km/h, veh/h and veh/km.  The step length is
//! configured in seconds; every flow that crosses a node is expressed in
//! **vehicles per step**.
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public value types.  |

pub mod demand;
pub mod diagnostics;
pub mod error;
pub mod fractions;
pub mod ids;
pub mod mixture;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use demand::TimeDependentOdm;
pub use diagnostics::{Diagnostic, Diagnostics};
pub use error::{DnlError, DnlResult};
pub use fractions::{MixtureFractions, TurningFractions};
pub use ids::{DestinationId, LinkId, NodeId, OriginId};
pub use mixture::MixtureFlow;
pub use time::{LoadingConfig, LookbackMode, StepClock};
