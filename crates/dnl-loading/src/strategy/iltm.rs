use dnl_core::NodeId;

use super::{LoadingStrategy, StepOutcome, max_potential};
use crate::{LoadingError, LoadingResult, StepContext};

/// Iterative LTM: Gauss–Seidel sweeps over all nodes in id order.
///
/// Each node update zeroes the node's own potential and adds the weighted
/// boundary changes to its neighbours.  The step is settled once a full
/// sweep leaves every potential below the configured precision.
#[derive(Clone, Debug, Default)]
pub struct IltmDnl {
    potentials: Vec<f64>,
}

impl LoadingStrategy for IltmDnl {
    fn name(&self) -> &'static str {
        "ILTM_DNL"
    }

    fn load_step(&mut self, ctx: &mut StepContext<'_>, t: usize) -> LoadingResult<StepOutcome> {
        let nodes     = ctx.node_count();
        let precision = ctx.config.precision;
        let max_iter  = ctx.config.max_iterations;
        self.potentials.clear();
        self.potentials.resize(nodes, f64::INFINITY);

        let mut updates = 0;
        for iteration in 1..=max_iter {
            for n in 0..nodes {
                self.potentials[n] = 0.0;
                for ripple in ctx.update_node(NodeId(n as u32), t) {
                    self.potentials[ripple.node.index()] += ripple.amount;
                }
                updates += 1;
            }
            if max_potential(&self.potentials) < precision {
                return Ok(StepOutcome { iterations: iteration, node_updates: updates });
            }
        }
        Err(LoadingError::NonConvergence { strategy: self.name(), step: t, iterations: max_iter })
    }
}
