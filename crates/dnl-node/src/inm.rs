//! Incremental node models.
//!
//! Flows start at zero and grow: incoming link `i` at rate `α_i`, outgoing
//! link `j` at `Σ_i p_ij·α_i` where `p_ij = S_ij / S_i`.  Growth of `i`
//! stops when it has sent its demand or when any outgoing link it feeds
//! runs out of supply (FIFO).  Between such events the rates are constant
//! for the basic model, so it jumps from event to event.  The general model
//! lets `α_i` depend on the current flow and integrates with fixed Euler
//! steps.
//!
//! Still-growing incoming links and still-open outgoing links are tracked as
//! `u64` bit sets, so a node may have at most [`MAX_LINKS`] links per side.

use crate::movement::{Movements, shares};
use crate::{InmPriority, InmVariant, NodeFlows, NodeInput};

/// Largest number of incoming or outgoing links an incremental node supports.
pub const MAX_LINKS: usize = 64;

const EPS: f64 = 1e-12;

#[inline]
fn bit(set: u64, k: usize) -> bool {
    set & (1 << k) != 0
}

#[inline]
fn reached(value: f64, limit: f64) -> bool {
    value >= limit - EPS * limit.abs().max(1.0)
}

/// Grow incoming flows until every incoming link is blocked.
///
/// `turn[i][j]` are turning proportions, `limit[i]` the most incoming link
/// `i` may send, `rate(i, q_i)` its growth priority.  With `euler_steps`,
/// each round moves at most `Σ limit / euler_steps` vehicles before the
/// rates are re-evaluated.
pub fn grow<F>(turn: &[Vec<f64>], limit: &[f64], receiving: &[f64], rate: F, euler_steps: Option<usize>) -> Vec<f64>
where
    F: Fn(usize, f64) -> f64,
{
    let n_in  = limit.len();
    let n_out = receiving.len();
    debug_assert!(n_in <= MAX_LINKS && n_out <= MAX_LINKS);

    let mut q = vec![0.0; n_in];
    let mut y = vec![0.0; n_out];

    let mut open: u64 = 0;
    for j in 0..n_out {
        if receiving[j] > EPS {
            open |= 1 << j;
        }
    }
    let mut growing: u64 = 0;
    for i in 0..n_in {
        let blocked = (0..n_out).any(|j| turn[i][j] > 0.0 && !bit(open, j));
        if limit[i] > EPS && !blocked {
            growing |= 1 << i;
        }
    }

    let total_limit: f64 = limit.iter().sum();
    let max_rounds = euler_steps.unwrap_or(0) + n_in + n_out + 1;

    for _ in 0..max_rounds {
        if growing == 0 {
            break;
        }
        let r: Vec<f64> = (0..n_in)
            .map(|i| if bit(growing, i) { rate(i, q[i]).max(0.0) } else { 0.0 })
            .collect();
        let total_rate: f64 = r.iter().sum();
        if !(total_rate > 0.0) {
            break;
        }
        let rho: Vec<f64> = (0..n_out)
            .map(|j| (0..n_in).map(|i| turn[i][j] * r[i]).sum())
            .collect();

        // Time to the next event.
        let mut tau = f64::INFINITY;
        for i in (0..n_in).filter(|&i| r[i] > 0.0) {
            tau = tau.min((limit[i] - q[i]) / r[i]);
        }
        for j in (0..n_out).filter(|&j| bit(open, j) && rho[j] > 0.0) {
            tau = tau.min((receiving[j] - y[j]) / rho[j]);
        }
        if let Some(steps) = euler_steps {
            tau = tau.min(total_limit / steps.max(1) as f64 / total_rate);
        }
        let tau = tau.max(0.0);

        for i in 0..n_in {
            q[i] += tau * r[i];
        }
        for j in 0..n_out {
            y[j] += tau * rho[j];
        }

        for i in 0..n_in {
            if bit(growing, i) && reached(q[i], limit[i]) {
                q[i] = q[i].min(limit[i]);
                growing &= !(1 << i);
            }
        }
        for j in 0..n_out {
            if bit(open, j) && rho[j] > 0.0 && reached(y[j], receiving[j]) {
                open &= !(1 << j);
                for i in 0..n_in {
                    if turn[i][j] > 0.0 {
                        growing &= !(1 << i);
                    }
                }
            }
        }
    }
    q
}

fn turning_proportions(movements: &Movements) -> (Vec<Vec<f64>>, Vec<f64>) {
    let sending: Vec<f64> = (0..movements.incoming_count()).map(|i| movements.sending(i)).collect();
    let turn = movements
        .demand
        .iter()
        .zip(&sending)
        .map(|(row, &s)| row.iter().map(|&d| if s > 0.0 { d / s } else { 0.0 }).collect())
        .collect();
    (turn, sending)
}

/// Blend an unconstrained and a node-capped solution so no incoming link
/// exceeds its node capacity.
///
/// Both inputs respect every supply constraint, so any convex combination
/// does too.  The weight is the largest that keeps every violator of the
/// unconstrained solution within its cap.
pub fn interpolate_capped(unconstrained: &[f64], capped: &[f64], node_caps: &[f64]) -> Vec<f64> {
    let mu = unconstrained
        .iter()
        .zip(capped)
        .zip(node_caps)
        .filter(|&((&u, _), &n)| u > n)
        .map(|((&u, &c), &n)| if u > c { (n - c) / (u - c) } else { 0.0 })
        .fold(1.0, f64::min)
        .clamp(0.0, 1.0);
    unconstrained
        .iter()
        .zip(capped)
        .map(|(&u, &c)| c + mu * (u - c))
        .collect()
}

pub(crate) fn resolve(variant: &InmVariant, input: &NodeInput<'_>) -> NodeFlows {
    let mut diagnostics = Vec::new();
    let movements = Movements::split(input, &mut diagnostics);
    let (turn, sending) = turning_proportions(&movements);
    let caps = input.capacities;

    let flows = match variant {
        InmVariant::Basic => grow(&turn, &sending, input.receiving, |i, _| caps[i], None),
        InmVariant::General { priority, euler_steps } => {
            let rate = |i: usize, q: f64| match *priority {
                InmPriority::Capacity => caps[i],
                InmPriority::Demand => sending[i],
                InmPriority::ResidualDemand { floor } => (sending[i] - q).max(floor * caps[i]),
            };
            grow(&turn, &sending, input.receiving, rate, Some(*euler_steps))
        }
        InmVariant::ApproximateInmc { node_capacities } => {
            let node_caps: Vec<f64> = node_capacities.iter().map(|&c| c * input.step_hours).collect();
            let free = grow(&turn, &sending, input.receiving, |i, _| caps[i], None);
            if free.iter().zip(&node_caps).all(|(&q, &n)| q <= n) {
                free
            } else {
                let limited: Vec<f64> = sending.iter().zip(&node_caps).map(|(&s, &n)| s.min(n)).collect();
                let capped = grow(&turn, &limited, input.receiving, |i, _| caps[i], None);
                interpolate_capped(&free, &capped, &node_caps)
            }
        }
    };

    let theta = shares(&flows, |i| sending[i]);
    movements.assemble(&theta, input.receiving.len(), diagnostics)
}
