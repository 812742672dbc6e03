//! CSV output backend.
//!
//! Creates two files in the configured output directory:
//! - `link_curves.csv`
//! - `step_summaries.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::{LinkCurveRow, OutputResult, StepSummaryRow};
use crate::writer::OutputWriter;

/// Writes loading output to two CSV files.
pub struct CsvWriter {
    curves:    Writer<File>,
    summaries: Writer<File>,
    finished:  bool,
}

impl CsvWriter {
    /// Open (or create) the two CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut curves = Writer::from_path(dir.join("link_curves.csv"))?;
        curves.write_record(["link", "boundary", "clock_secs", "cumulative_inflow", "cumulative_outflow"])?;

        let mut summaries = Writer::from_path(dir.join("step_summaries.csv"))?;
        summaries.write_record(["step", "clock_secs", "iterations", "node_updates", "network_flow"])?;

        Ok(Self { curves, summaries, finished: false })
    }
}

impl OutputWriter for CsvWriter {
    fn write_link_curves(&mut self, rows: &[LinkCurveRow]) -> OutputResult<()> {
        for row in rows {
            self.curves.write_record(&[
                row.link.to_string(),
                row.boundary.to_string(),
                row.clock_secs.to_string(),
                row.cumulative_inflow.to_string(),
                row.cumulative_outflow.to_string(),
            ])?;
        }
        Ok(())
    }

    fn write_step_summary(&mut self, row: &StepSummaryRow) -> OutputResult<()> {
        self.summaries.write_record(&[
            row.step.to_string(),
            row.clock_secs.to_string(),
            row.iterations.to_string(),
            row.node_updates.to_string(),
            row.network_flow.to_string(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.curves.flush()?;
        self.summaries.flush()?;
        Ok(())
    }
}
