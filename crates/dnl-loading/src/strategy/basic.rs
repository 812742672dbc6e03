use dnl_core::{LoadingConfig, NodeId};
use dnl_network::DynamicNetwork;
use dnl_node::NodeFlows;
use tracing::warn;

use super::{LoadingStrategy, StepOutcome};
use crate::{LoadingResult, StepContext};

/// Explicit scheme: evaluate every link, then every node against that
/// snapshot, then commit all node flows.
///
/// Correct only when every non-connector link takes at least one step to
/// traverse at free-flow speed; shorter links are reported at load start.
#[derive(Copy, Clone, Debug, Default)]
pub struct BasicDnl;

impl LoadingStrategy for BasicDnl {
    fn name(&self) -> &'static str {
        "BasicDNL"
    }

    fn on_load_start(&mut self, network: &DynamicNetwork, _config: &LoadingConfig) {
        let short = network
            .links
            .iter()
            .filter(|l| !l.is_connector() && l.forward_delay() < 1.0)
            .count();
        if short > 0 {
            warn!(short, "links shorter than one free-flow step; the explicit scheme will lag");
        }
    }

    fn load_step(&mut self, ctx: &mut StepContext<'_>, t: usize) -> LoadingResult<StepOutcome> {
        ctx.compute_link_flows(t);

        let nodes = ctx.node_count();
        let view = &*ctx;

        #[cfg(not(feature = "parallel"))]
        let flows: Vec<NodeFlows> = (0..nodes).map(|n| view.evaluate_node(NodeId(n as u32), t)).collect();

        #[cfg(feature = "parallel")]
        let flows: Vec<NodeFlows> = {
            use rayon::prelude::*;
            (0..nodes)
                .into_par_iter()
                .map(|n| view.evaluate_node(NodeId(n as u32), t))
                .collect()
        };

        for (n, node_flows) in flows.into_iter().enumerate() {
            ctx.commit(NodeId(n as u32), t, node_flows);
        }
        Ok(StepOutcome { iterations: 1, node_updates: nodes })
    }
}
