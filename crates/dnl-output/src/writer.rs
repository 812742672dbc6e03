//! The `OutputWriter` trait implemented by all backend writers.

use crate::{LinkCurveRow, OutputResult, StepSummaryRow};

/// Trait implemented by the CSV and SQLite writers.
///
/// From the observer's side every call is infallible: errors are stored
/// and retrieved with [`LoadingOutputObserver::take_error`](crate::LoadingOutputObserver::take_error).
pub trait OutputWriter {
    /// Write a batch of cumulative curve points.
    fn write_link_curves(&mut self, rows: &[LinkCurveRow]) -> OutputResult<()>;

    /// Write one step summary row.
    fn write_step_summary(&mut self, row: &StepSummaryRow) -> OutputResult<()>;

    /// Flush and close all underlying handles.
    ///
    /// Idempotent.
    fn finish(&mut self) -> OutputResult<()>;
}
