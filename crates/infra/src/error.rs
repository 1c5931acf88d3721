use stockroom_core::DomainError;
use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure of a store operation.
///
/// Domain failures pass through unchanged so callers can map them to
/// user-facing responses; the other variants are internal faults.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("failed to serialize event payload: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("store lock poisoned")]
    Poisoned,
}

impl StoreError {
    /// The domain error, if this failure is one.
    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            StoreError::Domain(err) => Some(err),
            _ => None,
        }
    }
}
