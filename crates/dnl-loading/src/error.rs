use thiserror::Error;

use dnl_core::DnlError;

#[derive(Debug, Error)]
pub enum LoadingError {
    #[error("loading configuration error: {0}")]
    Config(String),

    #[error("{strategy} did not converge in step {step} after {iterations} iterations")]
    NonConvergence {
        strategy:   &'static str,
        step:       usize,
        iterations: usize,
    },

    #[error(transparent)]
    Core(#[from] DnlError),
}

pub type LoadingResult<T> = Result<T, LoadingError>;
