//! Destination-specific turning fractions.
//!
//! [`MixtureFractions`] describes one intersection at one step: for every
//! destination it serves, an `incoming × outgoing` matrix (row-major) whose
//! entry `(i, j)` is the probability that a vehicle for that destination
//! arriving on incoming link `i` leaves over outgoing link `j`.
//!
//! [`TurningFractions`] stacks those tables as `[intersection][step]`.  It is
//! produced once by an external route-choice component and only read during
//! loading.

use crate::{DestinationId, DnlError, DnlResult};

// ── MixtureFractions ──────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MixtureFractions {
    incoming:     usize,
    outgoing:     usize,
    destinations: Vec<DestinationId>,
    matrices:     Vec<Vec<f64>>,
}

impl MixtureFractions {
    /// An empty table for a node with the given degree.
    pub fn new(incoming: usize, outgoing: usize) -> Self {
        Self { incoming, outgoing, destinations: Vec::new(), matrices: Vec::new() }
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, destination: DestinationId, matrix: Vec<f64>) -> DnlResult<Self> {
        self.insert(destination, matrix)?;
        Ok(self)
    }

    /// Set the row-major `incoming × outgoing` matrix for `destination`,
    /// replacing any previous one.
    pub fn insert(&mut self, destination: DestinationId, matrix: Vec<f64>) -> DnlResult<()> {
        let expected = self.incoming * self.outgoing;
        if matrix.len() != expected {
            return Err(DnlError::DimensionMismatch {
                what: "turning fraction matrix",
                expected,
                got: matrix.len(),
            });
        }
        match self.destinations.binary_search(&destination) {
            Ok(k) => self.matrices[k] = matrix,
            Err(k) => {
                self.destinations.insert(k, destination);
                self.matrices.insert(k, matrix);
            }
        }
        Ok(())
    }

    /// The same `row` split used for every incoming link and every listed
    /// destination.  Handy for diverges and for tests.
    pub fn uniform(incoming: usize, row: &[f64], destinations: &[DestinationId]) -> DnlResult<Self> {
        let mut table = Self::new(incoming, row.len());
        let matrix: Vec<f64> = (0..incoming).flat_map(|_| row.iter().copied()).collect();
        for &d in destinations {
            table.insert(d, matrix.clone())?;
        }
        Ok(table)
    }

    #[inline]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.incoming, self.outgoing)
    }

    /// Destinations with a matrix, ascending.
    #[inline]
    pub fn destinations(&self) -> &[DestinationId] {
        &self.destinations
    }

    /// Full matrix for `destination`, if served.
    pub fn matrix(&self, destination: DestinationId) -> Option<&[f64]> {
        self.destinations
            .binary_search(&destination)
            .ok()
            .map(|k| self.matrices[k].as_slice())
    }

    /// Row of incoming link `incoming` for `destination`, if served.
    pub fn row(&self, destination: DestinationId, incoming: usize) -> Option<&[f64]> {
        let out = self.outgoing;
        self.matrix(destination).map(|m| &m[incoming * out..(incoming + 1) * out])
    }

    /// Single entry; 0 if the destination is not served.
    pub fn fraction(&self, destination: DestinationId, incoming: usize, outgoing: usize) -> f64 {
        self.row(destination, incoming).map_or(0.0, |r| r[outgoing])
    }

    /// Rows whose sum differs from 1 by more than `tolerance`, as
    /// `(destination, incoming, sum)`.  All-zero rows are not served from
    /// that approach and are skipped.
    pub fn row_sum_violations(&self, tolerance: f64) -> Vec<(DestinationId, usize, f64)> {
        let mut out = Vec::new();
        for (k, &d) in self.destinations.iter().enumerate() {
            for i in 0..self.incoming {
                let row = &self.matrices[k][i * self.outgoing..(i + 1) * self.outgoing];
                let sum: f64 = row.iter().sum();
                if sum != 0.0 && (sum - 1.0).abs() > tolerance {
                    out.push((d, i, sum));
                }
            }
        }
        out
    }
}

// ── TurningFractions ──────────────────────────────────────────────────────────

/// Turning fractions for every intersection over the whole horizon.
///
/// Indexed by the intersection's position in the network's intersection list
/// and by step.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TurningFractions {
    tables: Vec<Vec<MixtureFractions>>,
}

impl TurningFractions {
    pub fn new(tables: Vec<Vec<MixtureFractions>>) -> Self {
        Self { tables }
    }

    /// One time-invariant table per intersection, repeated for `steps` steps.
    pub fn stationary(per_intersection: Vec<MixtureFractions>, steps: usize) -> Self {
        let tables = per_intersection
            .into_iter()
            .map(|t| vec![t; steps])
            .collect();
        Self { tables }
    }

    pub fn intersection_count(&self) -> usize {
        self.tables.len()
    }

    /// Table of intersection `k` at `step`.
    ///
    /// # Panics
    /// Panics if either index is out of range; call
    /// [`validate`](Self::validate) before loading.
    #[inline]
    pub fn get(&self, intersection: usize, step: usize) -> &MixtureFractions {
        &self.tables[intersection][step]
    }

    /// Check the dimensions against the network and horizon.
    ///
    /// `degrees[k]` is `(incoming, outgoing)` of intersection `k`.
    pub fn validate(&self, degrees: &[(usize, usize)], steps: usize) -> DnlResult<()> {
        if self.tables.len() != degrees.len() {
            return Err(DnlError::DimensionMismatch {
                what:     "turning fraction intersections",
                expected: degrees.len(),
                got:      self.tables.len(),
            });
        }
        for (per_step, &degree) in self.tables.iter().zip(degrees) {
            if per_step.len() != steps {
                return Err(DnlError::DimensionMismatch {
                    what:     "turning fraction steps",
                    expected: steps,
                    got:      per_step.len(),
                });
            }
            if let Some(bad) = per_step.iter().find(|t| t.dimensions() != degree) {
                let (i, o) = bad.dimensions();
                return Err(DnlError::DimensionMismatch {
                    what:     "turning fraction node degree",
                    expected: degree.0 * degree.1,
                    got:      i * o,
                });
            }
        }
        Ok(())
    }
}
