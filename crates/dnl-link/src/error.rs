//! Link-subsystem error type.

use thiserror::Error;

/// Errors produced by `dnl-link`.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("fundamental diagram parameter `{name}` must be positive and finite, got {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("jam density {jam_density} veh/km does not exceed critical density {critical} veh/km")]
    InfeasibleDiagram { jam_density: f64, critical: f64 },
}

pub type LinkResult<T> = Result<T, LinkError>;
