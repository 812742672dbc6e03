use dnl_core::NodeId;

use super::{LoadingStrategy, StepOutcome, max_potential};
use crate::{LoadingError, LoadingResult, StepContext};

/// Iterative LTM with fast sweeping.
///
/// Each sweep visits nodes in descending order of update potential (ties by
/// id) and skips any node whose potential is already below the precision.
/// The order is refreshed between sweeps.
#[derive(Clone, Debug, Default)]
pub struct FastSweepingIltm {
    potentials: Vec<f64>,
    order:      Vec<usize>,
}

impl LoadingStrategy for FastSweepingIltm {
    fn name(&self) -> &'static str {
        "FastSweepingILTM_DNL"
    }

    fn load_step(&mut self, ctx: &mut StepContext<'_>, t: usize) -> LoadingResult<StepOutcome> {
        let nodes     = ctx.node_count();
        let precision = ctx.config.precision;
        let max_iter  = ctx.config.max_iterations;
        self.potentials.clear();
        self.potentials.resize(nodes, f64::INFINITY);

        let mut updates = 0;
        for iteration in 1..=max_iter {
            self.order.clear();
            self.order.extend(0..nodes);
            let potentials = &self.potentials;
            self.order.sort_by(|&a, &b| potentials[b].total_cmp(&potentials[a]).then(a.cmp(&b)));

            for k in 0..nodes {
                let n = self.order[k];
                if self.potentials[n] < precision {
                    continue;
                }
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
