//! Probe error types.

use thiserror::Error;

/// Result type for a single environment probe.
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Why an environment probe produced no value.
///
/// Probe errors never escape the fingerprint engine; they are replaced by
/// sentinel components.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProbeError {
    #[error("{0} is not supported in this environment")]
    Unsupported(&'static str),

    #[error("probe failed: {0}")]
    Failed(String),
}
