//! Workspace error type.
//!
//! Sub-crates define their own error enums and wrap `DnlError` as one
//! variant via `#[from]`.  Modelling anomalies that do not stop a load are
//! not errors; they are reported as [`Diagnostic`](crate::Diagnostic)s.

use thiserror::Error;

use crate::NodeId;

/// The top-level error type for `dnl-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum DnlError {
    #[error("node {0} not found")]
    NodeNotFound(NodeId),

    #[error("{what}: expected {expected}, got {got}")]
    DimensionMismatch {
        what:     &'static str,
        expected: usize,
        got:      usize,
    },
}

/// Shorthand result type for all `dnl-*` crates.
pub type DnlResult<T> = Result<T, DnlError>;
