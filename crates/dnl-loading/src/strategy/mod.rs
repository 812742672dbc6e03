//! Per-step scheduling strategies.
//!
//! | Strategy                 | Scheme                                              |
//! |--------------------------|-----------------------------------------------------|
//! | [`BasicDnl`]             | one synchronous link-then-node sweep (explicit)     |
//! | [`IltmDnl`]              | Gauss–Seidel sweeps over all nodes until converged  |
//! | [`FastSweepingIltm`]     | sweeps in descending potential, skipping idle nodes |
//! | [`PqfsIltm`]             | binary heap on potential, one node at a time        |

mod basic;
mod fast_sweeping;
mod iltm;
mod pqfs;

pub use basic::BasicDnl;
pub use fast_sweeping::FastSweepingIltm;
pub use iltm::IltmDnl;
pub use pqfs::PqfsIltm;

use dnl_core::LoadingConfig;
use dnl_network::DynamicNetwork;

use crate::{LoadingResult, StepContext};

/// Work done to settle one step.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct StepOutcome {
    /// Sweeps, or equivalent sweeps for the queue strategy.
    pub iterations:   usize,
    pub node_updates: usize,
}

/// Drives the links and nodes of one step to a consistent state.
///
/// Implementations must be `Send` so a loader can be moved to a worker
/// thread.
pub trait LoadingStrategy: Send {
    fn name(&self) -> &'static str;

    /// Called once before the first step of every load.
    fn on_load_start(&mut self, _network: &DynamicNetwork, _config: &LoadingConfig) {}

    /// Load step `t`.  Link boundaries at `t + 1` have been prepared.
    fn load_step(&mut self, ctx: &mut StepContext<'_>, t: usize) -> LoadingResult<StepOutcome>;
}

impl<S: LoadingStrategy + ?Sized> LoadingStrategy for Box<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn on_load_start(&mut self, network: &DynamicNetwork, config: &LoadingConfig) {
        (**self).on_load_start(network, config)
    }

    fn load_step(&mut self, ctx: &mut StepContext<'_>, t: usize) -> LoadingResult<StepOutcome> {
        (**self).load_step(ctx, t)
    }
}

/// Largest potential, or 0 for an empty network.
pub(crate) fn max_potential(potentials: &[f64]) -> f64 {
    potentials.iter().copied().fold(0.0, f64::max)
}
