//! # Error Handling
//!
//! Errors surfaced by the repository layer. Store and storage failures are
//! wrapped without reinterpretation so callers see the original cause.

use thiserror::Error;
use uuid::Uuid;

use crate::storage::StorageError;

/// Errors returned by [`crate::repositories::IntegrationRepository`]
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),
    #[error("upload failed: {0}")]
    Storage(#[from] StorageError),
    #[error("integration '{id}' not found")]
    NotFound { id: Uuid },
    #[error("failed to encode posting times: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RepositoryError {
    /// True when the error means the targeted row does not exist (or is outside the caller's organization)
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            RepositoryError::NotFound { .. }
                | RepositoryError::Database(sea_orm::DbErr::RecordNotFound(_))
                | RepositoryError::Database(sea_orm::DbErr::RecordNotUpdated)
        )
    }
}

/// Convenience alias used throughout the repository layer
pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_variants_are_classified() {
        assert!(RepositoryError::NotFound { id: Uuid::nil() }.is_not_found());
        assert!(RepositoryError::from(sea_orm::DbErr::RecordNotUpdated).is_not_found());
        assert!(
            !RepositoryError::from(StorageError::UnsupportedSource("ftp://x".to_string()))
                .is_not_found()
        );
    }

    #[test]
    fn messages_carry_the_cause() {
        let id = Uuid::nil();
        let err = RepositoryError::NotFound { id };
        assert_eq!(err.to_string(), format!("integration '{}' not found", id));

        let err = RepositoryError::from(StorageError::UnsupportedSource("ftp://x".to_string()));
        assert!(err.to_string().contains("ftp://x"));
    }
}
