use thiserror::Error;
use uuid::Uuid;

use solar_core_api::error::ApiError;

/// Errors raised by repository implementations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// A business check evaluated inside the repository refused the write.
    #[error(transparent)]
    Rejected(#[from] ApiError),

    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// The stored version no longer matches the one the writer loaded.
    #[error("Concurrent modification of {entity} {id}")]
    ConcurrentModification { entity: &'static str, id: Uuid },

    #[error("Entity not found: {0}")]
    NotFound(Uuid),

    #[error("Storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl RepositoryError {
    pub fn storage(message: impl Into<String>) -> Self {
        RepositoryError::Storage(message.into().into())
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Rejected(api_error) => api_error,
            RepositoryError::UniqueViolation(message) => ApiError::Conflict(message),
            RepositoryError::ConcurrentModification { entity, id } => {
                ApiError::Conflict(format!("{entity} {id} was modified concurrently"))
            }
            RepositoryError::NotFound(id) => ApiError::NotFound(id.to_string()),
            RepositoryError::Storage(source) => ApiError::DatabaseError(source.to_string()),
        }
    }
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_error) = &err {
            if db_error.is_unique_violation() {
                return RepositoryError::UniqueViolation(db_error.message().to_string());
            }
            if db_error.is_foreign_key_violation() {
                return RepositoryError::Rejected(ApiError::InvalidState(format!(
                    "Record is still referenced: {}",
                    db_error.message()
                )));
            }
        }
        RepositoryError::Storage(Box::new(err))
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maps_to_api_taxonomy() {
        let id = Uuid::new_v4();
        assert!(matches!(
            ApiError::from(RepositoryError::UniqueViolation("commission".into())),
            ApiError::Conflict(_)
        ));
        assert!(matches!(
            ApiError::from(RepositoryError::ConcurrentModification { entity: "consumer", id }),
            ApiError::Conflict(_)
        ));
        assert!(matches!(ApiError::from(RepositoryError::NotFound(id)), ApiError::NotFound(_)));

        let storage: ApiError = RepositoryError::storage("connection reset").into();
        assert!(storage.is_retryable());

        let rejected: ApiError = RepositoryError::Rejected(ApiError::InvalidState("x".into())).into();
        assert_eq!(rejected, ApiError::InvalidState("x".into()));
    }
}
