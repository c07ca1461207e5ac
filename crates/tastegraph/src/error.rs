//! Error types for the TasteGraph core.

use thiserror::Error;

/// Broad classes of failure. Degenerate inputs (zero vectors, empty
/// communities, empty graphs) are never errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Inputs that cannot be compared, such as vectors from different feature spaces.
    MalformedInput,
    /// Parameters rejected before any computation starts.
    Configuration,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("feature schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("dimension mismatch: expected {expected} features, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("feature {feature} has weight {value}; weights must be finite and non-negative")]
    InvalidWeight { feature: String, value: f64 },

    #[error("unknown entity: {0}")]
    UnknownEntity(String),

    #[error("similarity threshold {0} is outside [-1, 1]")]
    InvalidThreshold(f64),

    #[error("top_n must be at least 1")]
    InvalidTopN,

    #[error("top_k must be at least 1")]
    InvalidTopK,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::SchemaMismatch(_)
            | Error::DimensionMismatch { .. }
            | Error::InvalidWeight { .. }
            | Error::UnknownEntity(_) => ErrorKind::MalformedInput,
            Error::InvalidThreshold(_)
            | Error::InvalidTopN
            | Error::InvalidTopK
            | Error::InvalidConfig(_) => ErrorKind::Configuration,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
