//! Simulation time model and loading configuration.
//!
//! # Design
//!
//! Time advances in fixed steps.  Step `t` covers the interval
//! `[t·Δt, (t+1)·Δt)`; cumulative counts are stored at the step boundaries,
//! so a link's cumulative arrays hold `total_steps + 1` entries and the flow
//! crossing a boundary during step `t` is `cum[t + 1] - cum[t]`.
//!
//! `StepClock` maps a step index onto clock time of day, which signal plans
//! use to look up the active phase.

use std::fmt;

// ── LookbackMode ──────────────────────────────────────────────────────────────

/// How a link reads its cumulative curves at `t − delay`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LookbackMode {
    /// Divide the physical delay by the step length and floor it.  Reads a
    /// stored boundary value directly; matches the reference results.
    #[default]
    Floor,
    /// Linearly interpolate between the two boundaries straddling the exact
    /// delayed time.
    Interpolate,
}

// ── StepClock ─────────────────────────────────────────────────────────────────

/// Converts between step indices and clock seconds.
///
/// `StepClock` is cheap to copy and holds no heap data.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StepClock {
    /// Clock time (seconds after midnight) at the start of step 0.
    pub start_secs: u32,
    /// Seconds per step.
    pub step_secs:  u32,
    /// The step currently being loaded.
    pub current:    usize,
}

impl StepClock {
    pub fn new(start_secs: u32, step_secs: u32) -> Self {
        Self { start_secs, step_secs, current: 0 }
    }

    /// Advance the clock by one step.
    #[inline]
    pub fn advance(&mut self) {
        self.current += 1;
    }

    /// Clock seconds at the start of `step`.
    #[inline]
    pub fn secs_at(&self, step: usize) -> u64 {
        self.start_secs as u64 + step as u64 * self.step_secs as u64
    }

    /// Step length in hours, the unit used by link capacities and speeds.
    #[inline]
    pub fn step_hours(&self) -> f64 {
        self.step_secs as f64 / 3_600.0
    }

    /// Break the current clock time into (hour, minute, second).
    pub fn hms(&self) -> (u64, u32, u32) {
        let secs = self.secs_at(self.current);
        (secs / 3_600, ((secs % 3_600) / 60) as u32, (secs % 60) as u32)
    }
}

impl fmt::Display for StepClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (h, m, s) = self.hms();
        write!(f, "step {} ({:02}:{:02}:{:02})", self.current, h, m, s)
    }
}

// ── LoadingConfig ─────────────────────────────────────────────────────────────

/// Top-level loading configuration.
///
/// Typically built in code or deserialized from JSON by the application and
/// passed to the loader builder.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LoadingConfig {
    /// Clock time (seconds after midnight) at step 0.
    pub start_secs: u32,

    /// Seconds per step.  Default: 6.
    pub step_secs: u32,

    /// Length of the horizon in steps.
    pub total_steps: usize,

    /// Fixed-point precision ε of the implicit strategies.  A node is
    /// considered up to date once its update potential drops below ε.
    pub precision: f64,

    /// Loading stops early once fewer than this many vehicles remain on the
    /// network and no demand is left.
    pub flow_epsilon: f64,

    /// Maximum fixed-point iterations per step (sweeps for the sweeping
    /// strategies, `max_iterations × node_count` updates for the queue).
    pub max_iterations: usize,

    /// How delayed cumulative values are read.
    pub lookback: LookbackMode,

    /// Tolerance used by conservation / fraction-sum diagnostics.
    pub tolerance: f64,
}

impl LoadingConfig {
    /// Step length in hours.
    #[inline]
    pub fn step_hours(&self) -> f64 {
        self.step_secs as f64 / 3_600.0
    }

    /// Construct a `StepClock` pre-configured for this run.
    pub fn make_clock(&self) -> StepClock {
        StepClock::new(self.start_secs, self.step_secs)
    }
}

impl Default for LoadingConfig {
    fn default() -> Self {
        Self {
            start_secs:     0,
            step_secs:      6,
            total_steps:    600,
            precision:      1e-8,
            flow_epsilon:   1e-6,
            max_iterations: 1_000,
            lookback:       LookbackMode::Floor,
            tolerance:      1e-9,
        }
    }
}
