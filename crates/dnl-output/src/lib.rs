//! `dnl-output`: loading output writers.
//!
//! Two backends are provided:
//!
//! | Feature   | Backend | Files created                             |
//! |-----------|---------|-------------------------------------------|
//! | *(none)*  | CSV     | `link_curves.csv`, `step_summaries.csv`   |
//! | `sqlite`  | SQLite  | `output.db`                               |
//!
//! Both implement [`OutputWriter`] and are driven by
//! [`LoadingOutputObserver`], which implements
//! `dnl_loading::LoadingObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use dnl_output::{CsvWriter, LoadingOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut obs = LoadingOutputObserver::new(writer, &config);
//! loader.load_network_with(&mut obs)?;
//! if let Some(e) = obs.take_error() {
//!     eprintln!("output error: {e}");
//! }
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(test)]
mod tests;

pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::LoadingOutputObserver;
pub use row::{LinkCurveRow, StepSummaryRow};
pub use writer::OutputWriter;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteWriter;
