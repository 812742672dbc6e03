//! `dnl-loading`: the step loop that pushes vehicles through a
//! [`DynamicNetwork`](dnl_network::DynamicNetwork).
//!
//! # Step loop
//!
//! ```text
//! for t in 0..total_steps:
//!   ① Prepare: lift stale U(t+1), D(t+1) to at least U(t), D(t).
//!   ② Load:    the strategy alternates link evaluation (sending and
//!              receiving flows) with node evaluation (boundary flows)
//!              until the step is consistent.
//!   ③ Stop:    if the network is empty and no demand remains, hold the
//!              rest of the horizon flat and return.
//! ```
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                     |
//! |------------|------------------------------------------------------------|
//! | `parallel` | Runs the explicit strategy's link and node sweeps on Rayon. |
//! | `serde`    | Serialize/deserialize derives on core types.               |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use dnl_loading::{IltmDnl, LoadingBuilder};
//!
//! let mut loader = LoadingBuilder::new(config, network, odm, IltmDnl::default())
//!     .turning_fractions(fractions)
//!     .build()?;
//! let steps = loader.load_network()?;
//! println!("{} vehicles left at the end", loader.total_flow_on_network(steps));
//! ```

pub mod builder;
pub mod error;
pub mod loader;
pub mod observer;
pub mod strategy;
pub mod update;

#[cfg(test)]
mod tests;

pub use builder::LoadingBuilder;
pub use error::{LoadingError, LoadingResult};
pub use loader::NetworkLoader;
pub use observer::{LoadReport, LoadingObserver, NoopObserver, StepStats};
pub use strategy::{BasicDnl, FastSweepingIltm, IltmDnl, LoadingStrategy, PqfsIltm, StepOutcome};
pub use update::{Ripple, StepContext};
