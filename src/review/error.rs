use thiserror::Error;
use uuid::Uuid;

use super::storage::StoreError;

/// Errors surfaced by review operations
#[derive(Error, Debug)]
pub enum ReviewError {
    #[error("Invalid quality '{0}': expected easy, hard or wrong")]
    InvalidQuality(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Review item not found: {0}")]
    ItemNotFound(Uuid),

    #[error("Concurrency conflict on item {id}: expected version {expected}, found {actual}")]
    ConcurrencyConflict { id: Uuid, expected: u64, actual: u64 },

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}

impl ReviewError {
    /// Whether replaying the whole event may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ReviewError::ConcurrencyConflict { .. } | ReviewError::StoreUnavailable(_)
        )
    }
}

impl From<StoreError> for ReviewError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => ReviewError::ItemNotFound(id),
            StoreError::VersionMismatch {
                id,
                expected,
                actual,
            } => ReviewError::ConcurrencyConflict {
                id,
                expected,
                actual,
            },
            StoreError::DuplicateId(id) => {
                ReviewError::Validation(format!("review item {} already exists", id))
            }
            other => ReviewError::StoreUnavailable(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReviewError>;
