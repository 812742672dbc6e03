//! `LoadingOutputObserver<W>`: bridges `LoadingObserver` to an `OutputWriter`.

use dnl_core::{LoadingConfig, StepClock};
use dnl_loading::{LoadReport, LoadingObserver, StepStats};
use dnl_network::DynamicNetwork;

use crate::row::{LinkCurveRow, StepSummaryRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`LoadingObserver`] that writes one summary row per step and, once the
/// load ends, every link's cumulative curves up to the last simulated
/// boundary.
///
/// Observer hooks return nothing, so writer errors are stored.  After the
/// load returns, check with [`take_error`](Self::take_error).
pub struct LoadingOutputObserver<W: OutputWriter> {
    writer:     W,
    clock:      StepClock,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> LoadingOutputObserver<W> {
    /// Create an observer backed by `writer`, using `config` for clock times.
    pub fn new(writer: W, config: &LoadingConfig) -> Self {
        Self { writer, clock: config.make_clock(), last_error: None }
    }

    /// Take the stored write error, `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer.
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> LoadingObserver for LoadingOutputObserver<W> {
    fn on_step_end(&mut self, stats: &StepStats) {
        let row = StepSummaryRow {
            step:         stats.step as u64,
            clock_secs:   stats.clock_secs,
            iterations:   stats.iterations as u64,
            node_updates: stats.node_updates as u64,
            network_flow: stats.network_flow,
        };
        let result = self.writer.write_step_summary(&row);
        self.store_err(result);
    }

    fn on_load_end(&mut self, report: &LoadReport, network: &DynamicNetwork) {
        let last = report.steps_simulated.min(network.steps());
        for link in &network.links {
            let rows: Vec<LinkCurveRow> = (0..=last)
                .map(|t| LinkCurveRow {
                    link:               link.id.0,
                    boundary:           t as u64,
                    clock_secs:         self.clock.secs_at(t),
                    cumulative_inflow:  link.cumulative_inflow[t],
                    cumulative_outflow: link.cumulative_outflow[t],
                })
                .collect();
            let result = self.writer.write_link_curves(&rows);
            self.store_err(result);
        }
        let result = self.writer.finish();
        self.store_err(result);
    }
}
