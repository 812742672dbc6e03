//! Time-dependent origin-destination demand.

use std::ops::Range;

use crate::{DestinationId, OriginId};

/// Dense `origin × destination × step` demand rates in veh/h.
///
/// Queried by origin nodes once per step and never mutated during loading.
/// Any query outside the matrix (unknown origin or destination, step beyond
/// the horizon) returns 0.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeDependentOdm {
    origins:      usize,
    destinations: usize,
    steps:        usize,
    rates:        Vec<f64>,
}

impl TimeDependentOdm {
    /// An all-zero matrix.
    pub fn new(origins: usize, destinations: usize, steps: usize) -> Self {
        Self {
            origins,
            destinations,
            steps,
            rates: vec![0.0; origins * destinations * steps],
        }
    }

    pub fn origin_count(&self) -> usize { self.origins }
    pub fn destination_count(&self) -> usize { self.destinations }
    pub fn step_count(&self) -> usize { self.steps }

    #[inline]
    fn offset(&self, o: OriginId, d: DestinationId, step: usize) -> Option<usize> {
        if o.index() >= self.origins || d.index() >= self.destinations || step >= self.steps {
            return None;
        }
        Some((o.index() * self.destinations + d.index()) * self.steps + step)
    }

    /// Set the demand rate (veh/h) for one cell.  Out-of-range cells are ignored.
    pub fn set(&mut self, o: OriginId, d: DestinationId, step: usize, rate: f64) {
        if let Some(k) = self.offset(o, d, step) {
            self.rates[k] = rate;
        }
    }

    /// Set the same rate for every step in `steps`.
    pub fn set_range(&mut self, o: OriginId, d: DestinationId, steps: Range<usize>, rate: f64) {
        for t in steps {
            self.set(o, d, t, rate);
        }
    }

    /// Demand rate in veh/h; 0 outside the matrix.
    #[inline]
    pub fn flow(&self, o: OriginId, d: DestinationId, step: usize) -> f64 {
        self.offset(o, d, step).map_or(0.0, |k| self.rates[k])
    }

    /// Non-zero `(destination, rate)` pairs of one origin at `step`, in
    /// ascending destination order.
    pub fn row(&self, o: OriginId, step: usize) -> impl Iterator<Item = (DestinationId, f64)> + '_ {
        (0..self.destinations).filter_map(move |d| {
            let d = DestinationId(d as u32);
            let q = self.flow(o, d, step);
            (q > 0.0).then_some((d, q))
        })
    }

    /// `true` if any cell at `step` or later is positive.
    pub fn has_demand_from(&self, step: usize) -> bool {
        if step >= self.steps {
            return false;
        }
        (0..self.origins * self.destinations).any(|od| {
            self.rates[od * self.steps + step..(od + 1) * self.steps]
                .iter()
                .any(|&q| q > 0.0)
        })
    }

    /// Total vehicles over the horizon for a step length of `step_hours`.
    pub fn total_vehicles(&self, step_hours: f64) -> f64 {
        self.rates.iter().sum::<f64>() * step_hours
    }
}
