//! Fluent builder for constructing a [`NetworkLoader`].

use dnl_core::{DnlError, Diagnostics, LoadingConfig, TimeDependentOdm, TurningFractions};
use dnl_network::DynamicNetwork;

use crate::{LoadingError, LoadingResult, LoadingStrategy, NetworkLoader};

/// Fluent builder for [`NetworkLoader<S>`].
///
/// # Required inputs
///
/// - [`LoadingConfig`]: step length, horizon, precision, iteration cap
/// - [`DynamicNetwork`]: from [`dnl_network::DynamicNetworkBuilder`]
/// - [`TimeDependentOdm`]: at least as many origins and destinations as the
///   network's ids span
/// - `S: LoadingStrategy`: e.g. [`IltmDnl`](crate::IltmDnl)
///
/// # Optional inputs
///
/// | Method                     | Default                                   |
/// |----------------------------|-------------------------------------------|
/// | `.turning_fractions(tf)`   | none; required if the network has any intersection |
///
/// # Example
///
/// ```rust,ignore
/// let mut loader = LoadingBuilder::new(config, network, odm, PqfsIltm::default())
///     .turning_fractions(fractions)
///     .build()?;
/// let steps = loader.load_network()?;
/// ```
pub struct LoadingBuilder<S: LoadingStrategy> {
    config:    LoadingConfig,
    network:   DynamicNetwork,
    odm:       TimeDependentOdm,
    fractions: Option<TurningFractions>,
    strategy:  S,
}

impl<S: LoadingStrategy> LoadingBuilder<S> {
    pub fn new(config: LoadingConfig, network: DynamicNetwork, odm: TimeDependentOdm, strategy: S) -> Self {
        Self { config, network, odm, fractions: None, strategy }
    }

    /// Supply per-intersection, per-step turning fractions.
    pub fn turning_fractions(mut self, fractions: TurningFractions) -> Self {
        self.fractions = Some(fractions);
        self
    }

    /// Validate inputs, size the link histories and return a ready loader.
    pub fn build(self) -> LoadingResult<NetworkLoader<S>> {
        let config = self.config;
        if config.step_secs == 0 {
            return Err(LoadingError::Config("step_secs must be positive".into()));
        }
        if config.total_steps == 0 {
            return Err(LoadingError::Config("total_steps must be positive".into()));
        }
        if !(config.precision > 0.0) {
            return Err(LoadingError::Config(format!("precision must be positive, got {}", config.precision)));
        }
        if config.max_iterations == 0 {
            return Err(LoadingError::Config("max_iterations must be positive".into()));
        }

        let mut network = self.network;
        let odm = self.odm;
        if odm.origin_count() < network.origin_span() {
            return Err(DnlError::DimensionMismatch {
                what:     "OD matrix origins",
                expected: network.origin_span(),
                got:      odm.origin_count(),
            }
            .into());
        }
        if odm.destination_count() < network.destination_span() {
            return Err(DnlError::DimensionMismatch {
                what:     "OD matrix destinations",
                expected: network.destination_span(),
                got:      odm.destination_count(),
            }
            .into());
        }

        let fractions = match self.fractions {
            Some(f) => f,
            None if network.intersections().is_empty() => TurningFractions::default(),
            None => {
                return Err(LoadingError::Config(format!(
                    "network has {} intersections but no turning fractions were given",
                    network.intersections().len()
                )));
            }
        };
        fractions.validate(&network.intersection_degrees(), config.total_steps)?;

        network.allocate(config.total_steps, config.step_hours());

        Ok(NetworkLoader {
            clock: config.make_clock(),
            config,
            network,
            odm,
            fractions,
            strategy: self.strategy,
            diagnostics: Diagnostics::new(),
            steps_simulated: 0,
        })
    }
}
