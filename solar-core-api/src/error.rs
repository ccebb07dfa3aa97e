use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Malformed or out-of-range input. Never retried.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// The allocation would push the generator over 100%.
    #[error(
        "Capacity exceeded on generator {generator_id}: requested {requested}%, available {available}% (allocated {allocated}%)"
    )]
    CapacityExceeded {
        generator_id: Uuid,
        allocated: Decimal,
        available: Decimal,
        requested: Decimal,
    },

    /// The entity is not in a status that permits the operation.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Already done, or a concurrent writer won the race.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl ApiError {
    /// Only transient persistence failures are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::DatabaseError(_))
    }

    pub fn not_found(entity: &str, id: Uuid) -> Self {
        ApiError::NotFound(format!("{entity} {id}"))
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::ValidationError(errors.to_string())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_database_errors_are_retryable() {
        assert!(ApiError::DatabaseError("connection reset".into()).is_retryable());
        assert!(!ApiError::ValidationError("bad".into()).is_retryable());
        assert!(!ApiError::Conflict("dup".into()).is_retryable());
        assert!(!ApiError::CapacityExceeded {
            generator_id: Uuid::nil(),
            allocated: Decimal::from(80),
            available: Decimal::from(20),
            requested: Decimal::from(21),
        }
        .is_retryable());
    }

    #[test]
    fn test_capacity_exceeded_message_reports_percentages() {
        let err = ApiError::CapacityExceeded {
            generator_id: Uuid::nil(),
            allocated: Decimal::from(80),
            available: Decimal::from(20),
            requested: Decimal::from(21),
        };
        let message = err.to_string();
        assert!(message.contains("requested 21%"));
        assert!(message.contains("available 20%"));
        assert!(message.contains("allocated 80%"));
    }
}
