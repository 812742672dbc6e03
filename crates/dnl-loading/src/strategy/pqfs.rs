use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use dnl_core::NodeId;

use super::{LoadingStrategy, StepOutcome};
use crate::{LoadingError, LoadingResult, StepContext};

/// Heap key ordered by `f64::total_cmp`.
#[derive(Copy, Clone, Debug)]
struct Priority(f64);

impl PartialEq for Priority {
    fn eq(&self, other: &Self) -> bool {
        self.0.total_cmp(&other.0) == Ordering::Equal
    }
}

impl Eq for Priority {}

impl PartialOrd for Priority {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Priority {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Iterative LTM driven by a priority queue.
///
/// The most out-of-date node is popped and updated; neighbours whose
/// potential rises are pushed again.  Superseded heap entries are skipped on
/// pop.  The step is settled when the top of the heap is below the
/// precision.
#[derive(Clone, Debug, Default)]
pub struct PqfsIltm {
    potentials: Vec<f64>,
    heap:       BinaryHeap<(Priority, Reverse<NodeId>)>,
}

impl LoadingStrategy for PqfsIltm {
    fn name(&self) -> &'static str {
        "PQFS_ILTM_DNL"
    }

    fn load_step(&mut self, ctx: &mut StepContext<'_>, t: usize) -> LoadingResult<StepOutcome> {
        let nodes     = ctx.node_count();
        let precision = ctx.config.precision;
        let budget    = ctx.config.max_iterations.saturating_mul(nodes.max(1));

        self.potentials.clear();
        self.potentials.resize(nodes, f64::INFINITY);
        self.heap.clear();
        self.heap.extend((0..nodes).map(|n| (Priority(f64::INFINITY), Reverse(NodeId(n as u32)))));

        let mut updates = 0;
        while let Some((Priority(p), Reverse(n))) = self.heap.pop() {
            if p != self.potentials[n.index()] {
                continue;
            }
            if p < precision {
                break;
            }
            if updates == budget {
                return Err(LoadingError::NonConvergence {
                    strategy:   self.name(),
                    step:       t,
                    iterations: updates.div_ceil(nodes.max(1)),
                });
            }
            self.potentials[n.index()] = 0.0;
            for ripple in ctx.update_node(n, t) {
                let m = ripple.node.index();
                self.potentials[m] += ripple.amount;
                self.heap.push((Priority(self.potentials[m]), Reverse(ripple.node)));
            }
            updates += 1;
        }
        Ok(StepOutcome { iterations: updates.div_ceil(nodes.max(1)), node_updates: updates })
    }
}
