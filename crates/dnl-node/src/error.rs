use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("{model} node needs {expected}, got {incoming} incoming / {outgoing} outgoing links")]
    Degree {
        model:    &'static str,
        expected: &'static str,
        incoming: usize,
        outgoing: usize,
    },

    #[error("{model} node supports at most {limit} links per side, got {got}")]
    TooManyLinks {
        model: &'static str,
        limit: usize,
        got:   usize,
    },

    #[error("invalid node parameter: {0}")]
    Parameter(String),
}

pub type NodeResult<T> = Result<T, NodeError>;
