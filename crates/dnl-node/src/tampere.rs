//! Tampere's generic node model.
//!
//! Each incoming link `i` has sending flow `S_i`, split into movement
//! demands `S_ij`, and capacity `C_i`.  Its oriented capacity towards `j`
//! is `c_ij = C_i · S_ij / S_i`.  The solver repeatedly takes the outgoing
//! link `j*` with the smallest reduction level
//!
//! ```text
//! a_j = R̃_j / Σ_{i competing for j} c_ij
//! ```
//!
//! and settles the incoming links competing for it, in this order:
//!
//! 1. links whose whole demand fits under the level (`S_i ≤ a·C_i`) and
//!    whose every movement fits under its node capacity `N_ij` pass in full;
//! 2. otherwise links with a movement bound by its node capacity
//!    (`S_ij > N_ij` and `N_ij ≤ a·c_ij`) pass the smallest `N_ij / S_ij`
//!    over their movements, so FIFO holds;
//! 3. otherwise every competitor of `j*` passes `a·C_i`.
//!
//! Node capacities come from green shares, `N_ij = share_ij · c_ij`.  An
//! infinite share leaves the movement unconstrained.
//!
//! Settled flows are subtracted from every outgoing link's remaining supply
//! `R̃_j`.  The loop ends when no outgoing link has competitors left.  Ties
//! in `a_j` go to the lowest outgoing index.

use crate::movement::Movements;
use crate::{NodeFlows, NodeInput, TampereVariant};

/// Share of each incoming link's demand that passes.
///
/// `demand[i][j]` are movement demands, `capacities[i]` incoming capacities,
/// `receiving[j]` outgoing supplies, `shares[i][j]` movement green shares
/// (`f64::INFINITY` when unsignalized).
pub fn tampere(demand: &[Vec<f64>], capacities: &[f64], receiving: &[f64], shares: &[Vec<f64>]) -> Vec<f64> {
    let n_in  = demand.len();
    let n_out = receiving.len();
    let sending: Vec<f64> = demand.iter().map(|row| row.iter().sum()).collect();

    let mut theta = vec![0.0; n_in];
    let mut open: Vec<bool> = sending.iter().map(|&s| s > 0.0).collect();
    let mut remaining = receiving.to_vec();

    let oriented = |i: usize, j: usize| capacities[i] * demand[i][j] / sending[i];
    let node_cap = |i: usize, j: usize| {
        let share = shares[i][j];
        if share.is_infinite() { f64::INFINITY } else { share.max(0.0) * oriented(i, j) }
    };
    let served = move |i: usize| (0..n_out).filter(move |&j| demand[i][j] > 0.0);

    loop {
        let mut tightest: Option<(usize, f64)> = None;
        for j in 0..n_out {
            let competing: f64 = (0..n_in)
                .filter(|&i| open[i] && demand[i][j] > 0.0)
                .map(|i| oriented(i, j))
                .sum();
            if !(competing > 0.0) {
                continue;
            }
            let level = remaining[j].max(0.0) / competing;
            if tightest.is_none_or(|(_, best)| level < best) {
                tightest = Some((j, level));
            }
        }
        let Some((j_star, level)) = tightest else { break };

        let competitors: Vec<usize> = (0..n_in)
            .filter(|&i| open[i] && demand[i][j_star] > 0.0)
            .collect();

        let demand_bound: Vec<(usize, f64)> = competitors
            .iter()
            .filter(|&&i| {
                sending[i] <= level * capacities[i] && served(i).all(|j| demand[i][j] <= node_cap(i, j))
            })
            .map(|&i| (i, 1.0))
            .collect();

        let released = if !demand_bound.is_empty() {
            demand_bound
        } else {
            let node_bound: Vec<(usize, f64)> = competitors
                .iter()
                .filter(|&&i| {
                    served(i).any(|j| demand[i][j] > node_cap(i, j) && node_cap(i, j) <= level * oriented(i, j))
                })
                .map(|&i| {
                    let share = served(i).map(|j| node_cap(i, j) / demand[i][j]).fold(1.0, f64::min);
                    (i, share)
                })
                .collect();
            if !node_bound.is_empty() {
                node_bound
            } else {
                competitors
                    .iter()
                    .map(|&i| (i, (level * capacities[i] / sending[i]).min(1.0)))
                    .collect()
            }
        };

        for (i, share) in released {
            theta[i] = share;
            open[i] = false;
            for j in 0..n_out {
                remaining[j] -= share * demand[i][j];
            }
        }
    }
    theta
}

pub(crate) fn resolve(variant: &TampereVariant, input: &NodeInput<'_>) -> NodeFlows {
    let mut diagnostics = Vec::new();
    let movements = Movements::split(input, &mut diagnostics);
    let (n_in, n_out) = (input.capacities.len(), input.receiving.len());
    let shares = match variant {
        TampereVariant::Unsignalized       => vec![vec![f64::INFINITY; n_out]; n_in],
        TampereVariant::Signalized(plan)   => plan.green_shares(n_in, n_out),
        TampereVariant::BasicSignals(plan) => plan.green_shares(input.clock_secs, n_in, n_out),
    };
    let theta = tampere(&movements.demand, input.capacities, input.receiving, &shares);
    movements.assemble(&theta, input.receiving.len(), diagnostics)
}
