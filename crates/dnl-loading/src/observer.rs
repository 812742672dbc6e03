//! Loading observer trait for progress reporting and data collection.

use dnl_network::DynamicNetwork;

/// What one step of loading did.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct StepStats {
    pub step:         usize,
    /// Clock seconds at the start of the step.
    pub clock_secs:   u64,
    pub iterations:   usize,
    pub node_updates: usize,
    /// Vehicles on the network at the end of the step.
    pub network_flow: f64,
}

/// Totals of one call to [`NetworkLoader::load_network_with`][crate::NetworkLoader::load_network_with].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub steps_simulated:     usize,
    pub iterations:          usize,
    /// Most iterations any single step needed.
    pub max_step_iterations: usize,
    pub node_updates:        usize,
}

impl LoadReport {
    pub(crate) fn record(&mut self, iterations: usize, node_updates: usize) {
        self.steps_simulated += 1;
        self.iterations += iterations;
        self.max_step_iterations = self.max_step_iterations.max(iterations);
        self.node_updates += node_updates;
    }
}

/// Callbacks invoked by the loader at step boundaries.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example: progress printer
///
/// ```rust,ignore
/// struct Progress;
///
/// impl LoadingObserver for Progress {
///     fn on_step_end(&mut self, stats: &StepStats) {
///         println!("step {}: {} vehicles", stats.step, stats.network_flow);
///     }
/// }
/// ```
pub trait LoadingObserver {
    /// Called before any link or node of `step` is touched.
    fn on_step_start(&mut self, _step: usize) {}

    /// Called once `step` has settled.
    fn on_step_end(&mut self, _stats: &StepStats) {}

    /// Called once after the last simulated step, with read access to every
    /// link's cumulative curves.
    fn on_load_end(&mut self, _report: &LoadReport, _network: &DynamicNetwork) {}
}

/// A [`LoadingObserver`] that does nothing.
pub struct NoopObserver;

impl LoadingObserver for NoopObserver {}
