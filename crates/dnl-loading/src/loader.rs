//! The `NetworkLoader` struct and its step loop.

use dnl_core::{
    Diagnostic, Diagnostics, LoadingConfig, StepClock, TimeDependentOdm, TurningFractions,
};
use dnl_network::{DynamicNetwork, destination_of};
use tracing::{debug, info};

use crate::{
    LoadReport, LoadingError, LoadingObserver, LoadingResult, LoadingStrategy, NoopObserver,
    StepContext, StepStats,
};

/// Loads one network under one OD matrix with a chosen strategy.
///
/// Each step `t` runs:
///
/// 1. **Prepare**: boundaries at `t + 1` are lifted to at least their value
///    at `t`, keeping any stale history from an earlier pass as the first
///    guess.
/// 2. **Load**: the strategy evaluates links and nodes until the step is
///    consistent.
/// 3. **Stop check**: once fewer than `flow_epsilon` vehicles remain and no
///    demand is left, the remaining horizon is held flat and loading stops.
///
/// Create via [`LoadingBuilder`][crate::LoadingBuilder].
pub struct NetworkLoader<S: LoadingStrategy> {
    pub config: LoadingConfig,

    /// Step clock; `current` is the next step to load.
    pub clock: StepClock,

    pub(crate) network:         DynamicNetwork,
    pub(crate) odm:             TimeDependentOdm,
    pub(crate) fractions:       TurningFractions,
    pub(crate) strategy:        S,
    pub(crate) diagnostics:     Diagnostics,
    pub(crate) steps_simulated: usize,
}

impl<S: LoadingStrategy> NetworkLoader<S> {
    // ── Loading ───────────────────────────────────────────────────────────

    /// Load the whole horizon and return the number of steps simulated.
    pub fn load_network(&mut self) -> LoadingResult<usize> {
        self.load_network_with(&mut NoopObserver).map(|r| r.steps_simulated)
    }

    /// Load the whole horizon, calling observer hooks at every step.
    pub fn load_network_with<O: LoadingObserver>(&mut self, observer: &mut O) -> LoadingResult<LoadReport> {
        let steps = self.network.steps();
        let eps = self.config.flow_epsilon;
        self.clock = self.config.make_clock();
        self.strategy.on_load_start(&self.network, &self.config);

        let mut report = LoadReport::default();
        for t in 0..steps {
            observer.on_step_start(t);
            let clock_secs = self.clock.secs_at(t);

            let mut ctx = StepContext {
                network:     &mut self.network,
                odm:         &self.odm,
                fractions:   &self.fractions,
                config:      &self.config,
                diagnostics: &mut self.diagnostics,
                clock_secs,
            };
            ctx.prepare_step(t);
            let outcome = self.strategy.load_step(&mut ctx, t)?;
            report.record(outcome.iterations, outcome.node_updates);

            let network_flow = self.network.total_flow_on_network(t + 1);
            debug!(
                step = t,
                clock = %self.clock,
                iterations = outcome.iterations,
                updates = outcome.node_updates,
                network_flow,
                "step loaded"
            );
            observer.on_step_end(&StepStats {
                step: t,
                clock_secs,
                iterations: outcome.iterations,
                node_updates: outcome.node_updates,
                network_flow,
            });
            self.clock.advance();

            if network_flow < eps && !self.odm.has_demand_from(t + 1) {
                self.network.hold_from(t + 1);
                break;
            }
        }

        self.steps_simulated = report.steps_simulated;
        let portions = self.check_mixture_portions();
        self.diagnostics.extend(portions);
        info!(
            strategy = self.strategy.name(),
            steps = report.steps_simulated,
            iterations = report.iterations,
            max_step_iterations = report.max_step_iterations,
            diagnostics = self.diagnostics.len(),
            "load finished"
        );
        observer.on_load_end(&report, &self.network);
        Ok(report)
    }

    /// Load step `t` again on top of the current history and return the
    /// largest change of any cumulative count at `t + 1`.
    ///
    /// For a converged implicit step the result is below the precision.
    pub fn reevaluate_step(&mut self, t: usize) -> LoadingResult<f64> {
        if t >= self.network.steps() {
            return Err(LoadingError::Config(format!(
                "step {t} is outside the horizon of {} steps",
                self.network.steps()
            )));
        }
        let before: Vec<(f64, f64)> = self
            .network
            .links
            .iter()
            .map(|l| (l.cumulative_inflow[t + 1], l.cumulative_outflow[t + 1]))
            .collect();

        let mut ctx = StepContext {
            network:     &mut self.network,
            odm:         &self.odm,
            fractions:   &self.fractions,
            config:      &self.config,
            diagnostics: &mut self.diagnostics,
            clock_secs:  self.clock.secs_at(t),
        };
        self.strategy.load_step(&mut ctx, t)?;

        Ok(self
            .network
            .links
            .iter()
            .zip(before)
            .map(|(l, (u, d))| (l.cumulative_inflow[t + 1] - u).abs().max((l.cumulative_outflow[t + 1] - d).abs()))
            .fold(0.0, f64::max))
    }

    // ── Resets and inputs ─────────────────────────────────────────────────

    /// Replace the turning fractions for a fresh pass.
    ///
    /// Dimensions are checked against the network's intersections and the
    /// horizon; on error the current fractions are kept.
    pub fn set_turning_fractions(&mut self, fractions: TurningFractions) -> LoadingResult<()> {
        fractions.validate(&self.network.intersection_degrees(), self.config.total_steps)?;
        self.fractions = fractions;
        Ok(())
    }

    /// Clear all link history and diagnostics.
    pub fn reset_network(&mut self) {
        self.network.reset(true);
        self.diagnostics.clear();
        self.steps_simulated = 0;
        self.clock = self.config.make_clock();
    }

    /// Clear per-step scalars but keep history as the initial guess of the
    /// next pass.
    pub fn soft_reset_network(&mut self) {
        self.network.reset(false);
        self.diagnostics.clear();
        self.steps_simulated = 0;
        self.clock = self.config.make_clock();
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// Vehicles on the network at boundary `t`.
    ///
    /// # Panics
    ///
    /// Panics if `t` is past the horizon.
    pub fn total_flow_on_network(&self, t: usize) -> f64 {
        self.network.total_flow_on_network(t)
    }

    /// Scan every link's inflow history for compositions whose portions do
    /// not sum to one.  Runs at the end of every load.
    pub fn check_mixture_portions(&self) -> Vec<Diagnostic> {
        let tolerance = self.config.tolerance;
        self.network
            .links
            .iter()
            .flat_map(|l| l.portion_diagnostics(tolerance))
            .collect()
    }

    /// Scan every sink's incoming link for vehicles bound elsewhere.
    pub fn check_destination_inflows(&self) -> Vec<Diagnostic> {
        let mut found = Vec::new();
        for &n in self.network.destinations() {
            let node = self.network.node(n);
            let Some(expected) = destination_of(&node.model) else { continue };
            for &l in &node.incoming {
                for (step, flow) in self.network.link(l).inflow.iter().enumerate() {
                    found.extend(flow.iter().filter(|&(d, p)| d != expected && p > 0.0).map(|(d, p)| {
                        Diagnostic::ImpureDestination { node: n, step, expected, found: d, flow: flow.total() * p }
                    }));
                }
            }
        }
        found
    }

    pub fn network(&self) -> &DynamicNetwork {
        &self.network
    }

    pub fn odm(&self) -> &TimeDependentOdm {
        &self.odm
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Drain collected diagnostics.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        self.diagnostics.take()
    }

    /// Steps simulated by the last load, 0 before the first.
    pub fn steps_simulated(&self) -> usize {
        self.steps_simulated
    }

    /// Give the network back, e.g. to load it again with another strategy.
    pub fn into_network(self) -> DynamicNetwork {
        self.network
    }
}
