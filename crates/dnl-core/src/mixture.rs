//! Destination-tagged flow values.
//!
//! # Representation
//!
//! A [`MixtureFlow`] is a magnitude plus a sparse composition: two parallel
//! arrays of destinations (strictly ascending) and their portions of the
//! magnitude.  Intersections typically see a handful of destinations out of
//! thousands, so the sorted arrays beat a hash map both in memory and in the
//! merge, which is a single linear pass over both operands.
//!
//! Values are immutable; every operation returns a new flow.  A flow with a
//! zero magnitude always collapses to [`MixtureFlow::ZERO`], which has no
//! destinations at all.

use std::cmp::Ordering;
use std::iter::Sum;

use crate::DestinationId;

/// A quantity of vehicles decomposed by destination.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MixtureFlow {
    total:        f64,
    destinations: Vec<DestinationId>,
    portions:     Vec<f64>,
}

impl MixtureFlow {
    /// The empty flow: no vehicles, no destinations.
    pub const ZERO: MixtureFlow = MixtureFlow {
        total:        0.0,
        destinations: Vec::new(),
        portions:     Vec::new(),
    };

    /// Build a flow from parallel arrays.
    ///
    /// `destinations` must be strictly ascending and `portions` should sum to
    /// one; neither is checked.  A non-positive `total` or an empty
    /// composition yields `ZERO`.
    pub fn new(total: f64, destinations: Vec<DestinationId>, portions: Vec<f64>) -> Self {
        debug_assert_eq!(destinations.len(), portions.len());
        if !(total > 0.0) || destinations.is_empty() {
            return Self::ZERO;
        }
        Self { total, destinations, portions }
    }

    /// `total` vehicles all heading for `destination`.
    pub fn single(destination: DestinationId, total: f64) -> Self {
        Self::new(total, vec![destination], vec![1.0])
    }

    /// Build a flow from `(destination, vehicles)` pairs in ascending
    /// destination order.  Non-positive entries are skipped.
    pub fn from_destination_flows<I>(flows: I) -> Self
    where
        I: IntoIterator<Item = (DestinationId, f64)>,
    {
        let mut destinations = Vec::new();
        let mut amounts      = Vec::new();
        for (d, q) in flows {
            if q > 0.0 {
                debug_assert!(destinations.last().is_none_or(|&last| last < d));
                destinations.push(d);
                amounts.push(q);
            }
        }
        let total: f64 = amounts.iter().sum();
        if !(total > 0.0) {
            return Self::ZERO;
        }
        let portions = amounts.into_iter().map(|q| q / total).collect();
        Self { total, destinations, portions }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn total(&self) -> f64 {
        self.total
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.destinations.is_empty()
    }

    #[inline]
    pub fn destinations(&self) -> &[DestinationId] {
        &self.destinations
    }

    #[inline]
    pub fn portions(&self) -> &[f64] {
        &self.portions
    }

    /// `(destination, portion)` pairs in ascending destination order.
    pub fn iter(&self) -> impl Iterator<Item = (DestinationId, f64)> + '_ {
        self.destinations.iter().copied().zip(self.portions.iter().copied())
    }

    /// Vehicles heading for `destination`; 0 if it is not part of the mix.
    pub fn destination_flow(&self, destination: DestinationId) -> f64 {
        match self.destinations.binary_search(&destination) {
            Ok(k)  => self.total * self.portions[k],
            Err(_) => 0.0,
        }
    }

    // ── Arithmetic ────────────────────────────────────────────────────────

    /// Merge two flows.
    ///
    /// The result carries `self.total + other.total` vehicles.  Each
    /// operand's portions are weighted by its share of that total, and the
    /// destination arrays are merged in one sorted-union pass.
    pub fn plus(&self, other: &MixtureFlow) -> MixtureFlow {
        if other.is_zero() {
            return self.clone();
        }
        if self.is_zero() {
            return other.clone();
        }
        let total = self.total + other.total;
        if !(total > 0.0) {
            return Self::ZERO;
        }
        let wa = self.total / total;
        let wb = other.total / total;

        let cap = self.destinations.len() + other.destinations.len();
        let mut destinations = Vec::with_capacity(cap);
        let mut portions     = Vec::with_capacity(cap);

        let (mut a, mut b) = (0, 0);
        while a < self.destinations.len() && b < other.destinations.len() {
            let (da, db) = (self.destinations[a], other.destinations[b]);
            match da.cmp(&db) {
                Ordering::Less => {
                    destinations.push(da);
                    portions.push(self.portions[a] * wa);
                    a += 1;
                }
                Ordering::Greater => {
                    destinations.push(db);
                    portions.push(other.portions[b] * wb);
                    b += 1;
                }
                Ordering::Equal => {
                    destinations.push(da);
                    portions.push(self.portions[a] * wa + other.portions[b] * wb);
                    a += 1;
                    b += 1;
                }
            }
        }
        for k in a..self.destinations.len() {
            destinations.push(self.destinations[k]);
            portions.push(self.portions[k] * wa);
        }
        for k in b..other.destinations.len() {
            destinations.push(other.destinations[k]);
            portions.push(other.portions[k] * wb);
        }

        Self { total, destinations, portions }
    }

    /// Same composition, new magnitude.  Zero (or negative) collapses to `ZERO`.
    pub fn copy_with_flow(&self, total: f64) -> MixtureFlow {
        if !(total > 0.0) || self.is_zero() {
            return Self::ZERO;
        }
        Self {
            total,
            destinations: self.destinations.clone(),
            portions:     self.portions.clone(),
        }
    }

    /// Same composition scaled by `factor`.
    #[inline]
    pub fn scaled(&self, factor: f64) -> MixtureFlow {
        self.copy_with_flow(self.total * factor)
    }

    // ── Diagnostics ───────────────────────────────────────────────────────

    /// Sum of all portions (1 for a well-formed non-zero flow, 0 for `ZERO`).
    pub fn portion_sum(&self) -> f64 {
        self.portions.iter().sum()
    }

    /// `true` if the composition is consistent within `tolerance`.
    pub fn check_portions(&self, tolerance: f64) -> bool {
        if self.is_zero() {
            return true;
        }
        (self.portion_sum() - 1.0).abs() <= tolerance
    }
}

impl Default for MixtureFlow {
    fn default() -> Self {
        Self::ZERO
    }
}

impl<'a> Sum<&'a MixtureFlow> for MixtureFlow {
    fn sum<I: Iterator<Item = &'a MixtureFlow>>(iter: I) -> MixtureFlow {
        iter.fold(MixtureFlow::ZERO, |acc, f| acc.plus(f))
    }
}

impl Sum<MixtureFlow> for MixtureFlow {
    fn sum<I: Iterator<Item = MixtureFlow>>(iter: I) -> MixtureFlow {
        iter.fold(MixtureFlow::ZERO, |acc, f| acc.plus(&f))
    }
}
