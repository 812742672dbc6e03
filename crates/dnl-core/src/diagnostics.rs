//! Non-fatal modelling anomalies.
//!
//! Floating-point slop and inconsistent route-choice input do not stop a
//! load.  Each anomaly is recorded as a [`Diagnostic`] value, logged at
//! `warn` level, and kept in a [`Diagnostics`] sink so callers and tests can
//! assert on it.
//!
//! Implicit loading strategies evaluate a node many times within one step,
//! so the sink keeps only the first diagnostic of each kind per
//! (node or link, step, destination).

use std::collections::HashSet;
use std::fmt;

use tracing::warn;

use crate::{DestinationId, LinkId, NodeId};

#[derive(Clone, Debug, PartialEq)]
pub enum Diagnostic {
    /// Flow removed from incoming links differs from flow added downstream.
    NonConservation {
        node:     NodeId,
        step:     usize,
        residual: f64,
    },
    /// A turning-fraction row sums to something other than 1.
    TurningFractionSum {
        node:        NodeId,
        step:        usize,
        destination: DestinationId,
        incoming:    usize,
        sum:         f64,
    },
    /// Flow arrived for a destination the intersection table does not serve;
    /// it was split evenly over the outgoing links.
    UnroutedDestination {
        node:        NodeId,
        step:        usize,
        destination: DestinationId,
    },
    /// A sink received vehicles tagged with another destination.
    ImpureDestination {
        node:     NodeId,
        step:     usize,
        expected: DestinationId,
        found:    DestinationId,
        flow:     f64,
    },
    /// A stored mixture flow's portions do not sum to 1.
    MixturePortions {
        link: LinkId,
        step: usize,
        sum:  f64,
    },
}

/// Identity of a diagnostic for de-duplication: kind, element, step, destination.
type DiagnosticKey = (u8, u32, usize, u32);

impl Diagnostic {
    fn key(&self) -> DiagnosticKey {
        match *self {
            Diagnostic::NonConservation { node, step, .. } => (0, node.0, step, u32::MAX),
            Diagnostic::TurningFractionSum { node, step, destination, .. } => (1, node.0, step, destination.0),
            Diagnostic::UnroutedDestination { node, step, destination } => (2, node.0, step, destination.0),
            Diagnostic::ImpureDestination { node, step, found, .. } => (3, node.0, step, found.0),
            Diagnostic::MixturePortions { link, step, .. } => (4, link.0, step, u32::MAX),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::NonConservation { node, step, residual } => {
                write!(f, "{node} step {step}: flow not conserved (residual {residual:e})")
            }
            Diagnostic::TurningFractionSum { node, step, destination, incoming, sum } => write!(
                f,
                "{node} step {step}: fractions of {destination} from incoming {incoming} sum to {sum}"
            ),
            Diagnostic::UnroutedDestination { node, step, destination } => {
                write!(f, "{node} step {step}: no turning fractions for {destination}")
            }
            Diagnostic::ImpureDestination { node, step, expected, found, flow } => write!(
                f,
                "{node} step {step}: sink for {expected} received {flow} vehicles for {found}"
            ),
            Diagnostic::MixturePortions { link, step, sum } => {
                write!(f, "{link} step {step}: mixture portions sum to {sum}")
            }
        }
    }
}

/// Collects diagnostics produced during a load.
#[derive(Clone, Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
    seen:    HashSet<DiagnosticKey>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record and log one diagnostic.  Repeats of an already recorded
    /// (kind, element, step, destination) are dropped.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        if !self.seen.insert(diagnostic.key()) {
            return;
        }
        warn!("{diagnostic}");
        self.entries.push(diagnostic);
    }

    pub fn extend<I: IntoIterator<Item = Diagnostic>>(&mut self, iter: I) {
        for d in iter {
            self.push(d);
        }
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove and return everything recorded so far.
    pub fn take(&mut self) -> Vec<Diagnostic> {
        self.seen.clear();
        std::mem::take(&mut self.entries)
    }

    pub fn clear(&mut self) {
        self.seen.clear();
        self.entries.clear();
    }
}
