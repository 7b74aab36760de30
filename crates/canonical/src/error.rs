use thiserror::Error;

/// Errors raised while validating canonical configuration.
///
/// Normalization itself is total; only configuration can be rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CanonicalError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
