//! Node inputs, outputs, and the split of incoming mixtures into movements.

use dnl_core::{Diagnostic, MixtureFlow, MixtureFractions, NodeId};

/// Everything a node model reads for one evaluation.
///
/// Flows are in vehicles per step.  Slices are ordered like the node's
/// incoming (`sending`, `capacities`) and outgoing (`receiving`) link lists.
#[derive(Clone, Debug)]
pub struct NodeInput<'a> {
    pub node:       NodeId,
    pub step:       usize,
    /// Simulation clock at the start of the step, for signal timing.
    pub clock_secs: u64,
    pub step_hours: f64,
    /// Destination mixture of each incoming link's sending flow.
    pub sending:    &'a [MixtureFlow],
    /// Receiving flow of each outgoing link.
    pub receiving:  &'a [f64],
    /// Capacity per step of each incoming link.
    pub capacities: &'a [f64],
    /// Turning fractions; only intersections get a table.
    pub fractions:  Option<&'a MixtureFractions>,
    /// Vehicles an origin releases this step.  `ZERO` for other nodes.
    pub origin_demand: &'a MixtureFlow,
    /// Tolerance for fraction-row sums.
    pub tolerance:  f64,
}

/// Result of one node evaluation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeFlows {
    /// Flow leaving each incoming link, in incoming-link order.
    pub removed:     Vec<MixtureFlow>,
    /// Flow entering each outgoing link, in outgoing-link order.
    pub added:       Vec<MixtureFlow>,
    pub diagnostics: Vec<Diagnostic>,
}

impl NodeFlows {
    pub fn removed_total(&self) -> f64 {
        self.removed.iter().map(MixtureFlow::total).sum()
    }

    pub fn added_total(&self) -> f64 {
        self.added.iter().map(MixtureFlow::total).sum()
    }
}

/// Incoming mixtures split by outgoing link.
///
/// `pieces[i][j]` is the part of incoming link `i`'s sending flow that wants
/// to turn onto outgoing link `j`; `demand[i][j]` is its total.
#[derive(Clone, Debug)]
pub struct Movements {
    pub pieces: Vec<Vec<MixtureFlow>>,
    pub demand: Vec<Vec<f64>>,
}

impl Movements {
    /// Split every incoming mixture with the node's turning fractions.
    ///
    /// A node with one outgoing link needs no table.  A destination row that
    /// does not sum to 1 is normalised and reported; a destination the
    /// table does not serve is spread evenly and reported.
    pub fn split(input: &NodeInput<'_>, diagnostics: &mut Vec<Diagnostic>) -> Self {
        let n_out = input.receiving.len();
        let mut pieces = Vec::with_capacity(input.sending.len());

        for (i, sending) in input.sending.iter().enumerate() {
            if n_out == 1 {
                pieces.push(vec![sending.clone()]);
                continue;
            }
            let mut per_out: Vec<Vec<_>> = vec![Vec::new(); n_out];
            for (d, portion) in sending.iter() {
                let flow = sending.total() * portion;
                let row = input.fractions.and_then(|f| f.row(d, i));
                let sum: f64 = row.map_or(0.0, |r| r.iter().sum());
                match row {
                    Some(row) if sum > 0.0 => {
                        if (sum - 1.0).abs() > input.tolerance {
                            diagnostics.push(Diagnostic::TurningFractionSum {
                                node:        input.node,
                                step:        input.step,
                                destination: d,
                                incoming:    i,
                                sum,
                            });
                        }
                        for (j, &p) in row.iter().enumerate() {
                            per_out[j].push((d, flow * p / sum));
                        }
                    }
                    _ => {
                        diagnostics.push(Diagnostic::UnroutedDestination {
                            node:        input.node,
                            step:        input.step,
                            destination: d,
                        });
                        let share = flow / n_out as f64;
                        for out in &mut per_out {
                            out.push((d, share));
                        }
                    }
                }
            }
            pieces.push(per_out.into_iter().map(MixtureFlow::from_destination_flows).collect());
        }

        let demand = pieces
            .iter()
            .map(|row| row.iter().map(MixtureFlow::total).collect())
            .collect();
        Self { pieces, demand }
    }

    pub fn incoming_count(&self) -> usize {
        self.demand.len()
    }

    /// Total demand of incoming link `i` over all movements.
    pub fn sending(&self, i: usize) -> f64 {
        self.demand[i].iter().sum()
    }

    /// Build node flows from the share `theta[i]` of each incoming link's
    /// demand that is let through.  Every movement of one incoming link is
    /// scaled alike, so composition and totals are conserved.
    pub fn assemble(&self, theta: &[f64], n_out: usize, diagnostics: Vec<Diagnostic>) -> NodeFlows {
        let mut removed = Vec::with_capacity(self.pieces.len());
        let mut added   = vec![MixtureFlow::ZERO; n_out];
        for (row, &share) in self.pieces.iter().zip(theta) {
            let share = share.clamp(0.0, 1.0);
            let mut out_of_i = MixtureFlow::ZERO;
            for (j, piece) in row.iter().enumerate() {
                let moved = piece.scaled(share);
                out_of_i = out_of_i.plus(&moved);
                added[j] = added[j].plus(&moved);
            }
            removed.push(out_of_i);
        }
        NodeFlows { removed, added, diagnostics }
    }
}

/// Share of demand that each per-link flow represents; 0 where there is no demand.
pub(crate) fn shares(flows: &[f64], demand: impl Fn(usize) -> f64) -> Vec<f64> {
    flows
        .iter()
        .enumerate()
        .map(|(i, &q)| {
            let s = demand(i);
            if s > 0.0 { (q / s).min(1.0) } else { 0.0 }
        })
        .collect()
}
