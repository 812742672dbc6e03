//! Shared node update: evaluate one node and commit its flows.
//!
//! Every strategy drives a step through the same two operations:
//!
//! 1. [`StepContext::evaluate_node`] reads the current sending and receiving
//!    flows of a node's links and runs its model.  It takes `&self`, so the
//!    explicit strategy can evaluate all nodes against one frozen snapshot.
//! 2. [`StepContext::commit`] writes the resulting flows into the link
//!    histories and reports how strongly each neighbouring node is affected.
//!
//! A change `ΔU` at the upstream end of an outgoing link feeds the sending
//! flow seen by that link's downstream node with weight `φ` (forward
//! sensitivity).  A change `ΔD` at the downstream end of an incoming link
//! feeds the receiving flow seen by that link's upstream node with weight
//! `ψ` (backward sensitivity).  Those weighted changes are the update
//! potentials the implicit strategies schedule on.

use dnl_core::{
    Diagnostic, Diagnostics, LoadingConfig, MixtureFlow, NodeId, TimeDependentOdm, TurningFractions,
};
use dnl_network::{DynamicNetwork, origin_of};
use dnl_node::{NodeFlows, NodeInput, origin_demand};

/// Potential added to `node` by a commit.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ripple {
    pub node:   NodeId,
    pub amount: f64,
}

/// Mutable view of everything one step of loading touches.
pub struct StepContext<'a> {
    pub network:     &'a mut DynamicNetwork,
    pub odm:         &'a TimeDependentOdm,
    pub fractions:   &'a TurningFractions,
    pub config:      &'a LoadingConfig,
    pub diagnostics: &'a mut Diagnostics,
    pub clock_secs:  u64,
}

impl StepContext<'_> {
    pub fn node_count(&self) -> usize {
        self.network.node_count()
    }

    /// Lift stale `t + 1` boundaries so they are a valid first guess.
    pub fn prepare_step(&mut self, t: usize) {
        for link in &mut self.network.links {
            link.prepare_step(t);
        }
    }

    /// Recompute sending and receiving flows of every link.
    pub fn compute_link_flows(&mut self, t: usize) {
        let mode = self.config.lookback;

        #[cfg(not(feature = "parallel"))]
        for link in &mut self.network.links {
            link.compute_receiving_and_sending_flows(t, mode);
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            self.network
                .links
                .par_iter_mut()
                .for_each(|link| link.compute_receiving_and_sending_flows(t, mode));
        }
    }

    /// Recompute sending flows of `n`'s incoming links and receiving flows
    /// of its outgoing links.
    pub fn refresh_adjacent(&mut self, n: NodeId, t: usize) {
        let mode = self.config.lookback;
        let node = &self.network.nodes[n.index()];
        for &l in node.incoming.iter().chain(&node.outgoing) {
            self.network.links[l.index()].compute_receiving_and_sending_flows(t, mode);
        }
    }

    /// Run `n`'s model against the links' current sending and receiving flows.
    pub fn evaluate_node(&self, n: NodeId, t: usize) -> NodeFlows {
        let network = &*self.network;
        let node = network.node(n);

        let sending: Vec<MixtureFlow> = node
            .incoming
            .iter()
            .map(|&l| {
                let link = network.link(l);
                link.outgoing_mixture_flow(t, link.sending_flow)
            })
            .collect();
        let receiving: Vec<f64> = node.outgoing.iter().map(|&l| network.link(l).receiving_flow).collect();
        let capacities: Vec<f64> = node.incoming.iter().map(|&l| network.link(l).capacity_per_step()).collect();
        let demand = match origin_of(&node.model) {
            Some(origin) => origin_demand(self.odm, origin, t, self.config.step_hours()),
            None => MixtureFlow::ZERO,
        };

        let input = NodeInput {
            node:          n,
            step:          t,
            clock_secs:    self.clock_secs,
            step_hours:    self.config.step_hours(),
            sending:       &sending,
            receiving:     &receiving,
            capacities:    &capacities,
            fractions:     node.intersection.map(|k| self.fractions.get(k, t)),
            origin_demand: &demand,
            tolerance:     self.config.tolerance,
        };
        node.model.resolve(&input)
    }

    /// Write `flows` of node `n` into its links' histories.
    ///
    /// Returns the potential each neighbouring node gains.  Model diagnostics
    /// and a conservation check go to the diagnostics sink.
    pub fn commit(&mut self, n: NodeId, t: usize, flows: NodeFlows) -> Vec<Ripple> {
        let mode = self.config.lookback;
        let NodeFlows { removed, added, diagnostics } = flows;
        self.diagnostics.extend(diagnostics);

        let node = &self.network.nodes[n.index()];
        if !node.model.is_origin() && !node.model.is_destination() {
            let out: f64 = removed.iter().map(MixtureFlow::total).sum();
            let inn: f64 = added.iter().map(MixtureFlow::total).sum();
            let residual = out - inn;
            if residual.abs() > self.config.tolerance * out.abs().max(1.0) {
                self.diagnostics.push(Diagnostic::NonConservation { node: n, step: t, residual });
            }
        }

        let mut ripples = Vec::with_capacity(removed.len() + added.len());
        let incoming = node.incoming.clone();
        let outgoing = node.outgoing.clone();

        for (l, flow) in incoming.into_iter().zip(removed) {
            let link = &mut self.network.links[l.index()];
            let change = link.commit_outflow(t, flow);
            let amount = change * link.backward_sensitivity(mode);
            if amount > 0.0 {
                ripples.push(Ripple { node: link.from, amount });
            }
        }
        for (l, flow) in outgoing.into_iter().zip(added) {
            let link = &mut self.network.links[l.index()];
            let change = link.commit_inflow(t, flow);
            let amount = change * link.forward_sensitivity(mode);
            if amount > 0.0 {
                ripples.push(Ripple { node: link.to, amount });
            }
        }
        ripples
    }

    /// Refresh, evaluate and commit one node.
    pub fn update_node(&mut self, n: NodeId, t: usize) -> Vec<Ripple> {
        self.refresh_adjacent(n, t);
        let flows = self.evaluate_node(n, t);
        self.commit(n, t, flows)
    }
}
