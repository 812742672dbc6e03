//! Daganzo's diverge and merge models.

use crate::movement::{Movements, shares};
use crate::{NodeFlows, NodeInput};

/// Share of a diverge's demand that gets through.
///
/// `demand[j]` is the flow heading for outgoing link `j`.  The most
/// congested exit sets the share for all exits (FIFO).
pub fn daganzo_diverge(demand: &[f64], receiving: &[f64]) -> f64 {
    demand
        .iter()
        .zip(receiving)
        .filter(|&(&s, _)| s > 0.0)
        .map(|(&s, &r)| r / s)
        .fold(1.0, f64::min)
        .max(0.0)
}

/// Merge flows for the given sending flows, priorities and receiving flow.
///
/// If the total fits, everything passes.  Otherwise the receiving flow is
/// shared in proportion to the priorities; a link that needs less than its
/// share keeps its own demand and the rest is shared again among the others.
pub fn daganzo_merge(sending: &[f64], priorities: &[f64], receiving: f64) -> Vec<f64> {
    let total: f64 = sending.iter().sum();
    if total <= receiving {
        return sending.to_vec();
    }

    let mut flows  = vec![0.0; sending.len()];
    let mut active: Vec<usize> = (0..sending.len()).filter(|&i| sending[i] > 0.0).collect();
    let mut remaining = receiving.max(0.0);

    while !active.is_empty() {
        let raw: f64 = active.iter().map(|&i| priorities[i].max(0.0)).sum();
        // All-zero priorities share evenly.
        let alpha = |i: usize| if raw > 0.0 { priorities[i].max(0.0) } else { 1.0 };
        let weight = if raw > 0.0 { raw } else { active.len() as f64 };
        let level = remaining / weight;

        let (satisfied, rest): (Vec<usize>, Vec<usize>) =
            active.iter().partition(|&&i| sending[i] <= level * alpha(i));
        if satisfied.is_empty() {
            for &i in &rest {
                flows[i] = level * alpha(i);
            }
            break;
        }
        for &i in &satisfied {
            flows[i] = sending[i];
            remaining = (remaining - sending[i]).max(0.0);
        }
        active = rest;
    }
    flows
}

pub(crate) fn diverge(input: &NodeInput<'_>) -> NodeFlows {
    let mut diagnostics = Vec::new();
    let movements = Movements::split(input, &mut diagnostics);
    let theta = daganzo_diverge(&movements.demand[0], input.receiving);
    movements.assemble(&[theta], input.receiving.len(), diagnostics)
}

pub(crate) fn merge(priorities: Option<&[f64]>, input: &NodeInput<'_>) -> NodeFlows {
    let mut diagnostics = Vec::new();
    let movements = Movements::split(input, &mut diagnostics);
    let sending: Vec<f64> = (0..movements.incoming_count()).map(|i| movements.sending(i)).collect();
    let flows = daganzo_merge(&sending, priorities.unwrap_or(input.capacities), input.receiving[0]);
    let theta = shares(&flows, |i| sending[i]);
    movements.assemble(&theta, 1, diagnostics)
}
