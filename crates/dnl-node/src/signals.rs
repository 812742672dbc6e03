//! Fixed-time signal plans for the signalized Tampere variants.
//!
//! Signals act on the node model only through a green share per movement
//! `(incoming, outgoing)`.  The solver turns a share into a movement node
//! capacity `N_ij = share_ij · c_ij`, with `c_ij` the oriented capacity.
//! A fully signalized plan averages green over the cycle; the basic plan
//! switches the single active movement with the simulation clock.

use crate::{NodeError, NodeResult};

/// A turn from incoming position `incoming` to outgoing position `outgoing`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Movement {
    pub incoming: usize,
    pub outgoing: usize,
}

impl Movement {
    pub const fn new(incoming: usize, outgoing: usize) -> Self {
        Self { incoming, outgoing }
    }

    fn check(self, incoming: usize, outgoing: usize) -> NodeResult<()> {
        if self.incoming >= incoming || self.outgoing >= outgoing {
            return Err(NodeError::Parameter(format!(
                "signal serves movement {}→{} of a node with {incoming} incoming and {outgoing} outgoing links",
                self.incoming, self.outgoing
            )));
        }
        Ok(())
    }
}

/// Per-movement green share, indexed `[incoming][outgoing]`.
pub type GreenShares = Vec<Vec<f64>>;

/// One stage of a [`SignalPlan`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SignalPhase {
    pub duration_secs: f64,
    /// Movements that have green during this phase.
    pub green: Vec<Movement>,
}

impl SignalPhase {
    pub fn new(duration_secs: f64, green: Vec<Movement>) -> Self {
        Self { duration_secs, green }
    }

    /// Green for every movement leaving approach `incoming`.
    pub fn approach(duration_secs: f64, incoming: usize, outgoing: usize) -> Self {
        let green = (0..outgoing).map(|j| Movement::new(incoming, j)).collect();
        Self { duration_secs, green }
    }
}

/// Phases that run in sequence, followed by `lost_secs` of all-red per cycle.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SignalPlan {
    pub phases:    Vec<SignalPhase>,
    pub lost_secs: f64,
}

impl SignalPlan {
    pub fn new(phases: Vec<SignalPhase>) -> Self {
        Self { phases, lost_secs: 0.0 }
    }

    pub fn with_lost_time(mut self, lost_secs: f64) -> Self {
        self.lost_secs = lost_secs;
        self
    }

    pub fn cycle_secs(&self) -> f64 {
        self.phases.iter().map(|p| p.duration_secs).sum::<f64>() + self.lost_secs
    }

    /// Fraction of the cycle during which `movement` has green.
    pub fn green_share(&self, movement: Movement) -> f64 {
        let cycle = self.cycle_secs();
        if cycle <= 0.0 {
            return 0.0;
        }
        let green: f64 = self
            .phases
            .iter()
            .filter(|p| p.green.contains(&movement))
            .map(|p| p.duration_secs)
            .sum();
        (green / cycle).min(1.0)
    }

    pub fn green_shares(&self, incoming: usize, outgoing: usize) -> GreenShares {
        (0..incoming)
            .map(|i| (0..outgoing).map(|j| self.green_share(Movement::new(i, j))).collect())
            .collect()
    }

    pub(crate) fn validate(&self, incoming: usize, outgoing: usize) -> NodeResult<()> {
        if self.phases.is_empty() {
            return Err(NodeError::Parameter("signal plan has no phases".into()));
        }
        for phase in &self.phases {
            if !(phase.duration_secs >= 0.0) {
                return Err(NodeError::Parameter(format!(
                    "phase duration {} is negative",
                    phase.duration_secs
                )));
            }
            for m in &phase.green {
                m.check(incoming, outgoing)?;
            }
        }
        if !(self.cycle_secs() > 0.0) {
            return Err(NodeError::Parameter("signal cycle has zero length".into()));
        }
        Ok(())
    }
}

/// One movement served alone for `duration_secs`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BasicPhase {
    pub movement:      Movement,
    pub duration_secs: u64,
}

/// Cyclic plan serving a single movement per phase.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BasicSignalPlan {
    pub phases:      Vec<BasicPhase>,
    /// Clock time at which the first phase starts a cycle.
    pub offset_secs: u64,
}

impl BasicSignalPlan {
    pub fn new(phases: Vec<BasicPhase>) -> Self {
        Self { phases, offset_secs: 0 }
    }

    pub fn with_offset(mut self, offset_secs: u64) -> Self {
        self.offset_secs = offset_secs;
        self
    }

    pub fn cycle_secs(&self) -> u64 {
        self.phases.iter().map(|p| p.duration_secs).sum()
    }

    /// Movement with green at `clock_secs`.
    pub fn active_movement(&self, clock_secs: u64) -> Option<Movement> {
        let cycle = self.cycle_secs();
        if cycle == 0 {
            return None;
        }
        let mut at = (clock_secs + cycle - self.offset_secs % cycle) % cycle;
        for phase in &self.phases {
            if at < phase.duration_secs {
                return Some(phase.movement);
            }
            at -= phase.duration_secs;
        }
        None
    }

    /// Full share for the active movement, zero for all others.
    pub fn green_shares(&self, clock_secs: u64, incoming: usize, outgoing: usize) -> GreenShares {
        let active = self.active_movement(clock_secs);
        (0..incoming)
            .map(|i| {
                (0..outgoing)
                    .map(|j| if active == Some(Movement::new(i, j)) { 1.0 } else { 0.0 })
                    .collect()
            })
            .collect()
    }

    pub(crate) fn validate(&self, incoming: usize, outgoing: usize) -> NodeResult<()> {
        if self.cycle_secs() == 0 {
            return Err(NodeError::Parameter("basic signal cycle has zero length".into()));
        }
        for phase in &self.phases {
            phase.movement.check(incoming, outgoing)?;
        }
        Ok(())
    }
}
