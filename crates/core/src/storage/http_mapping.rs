//! Pure mapping from facade errors to HTTP status codes.
//!
//! The facade itself does not speak HTTP; this is provided for the request
//! handlers that serialize its tagged results to transport responses.

use super::ServiceError;

/// Maps a [`ServiceError`] to an HTTP status code.
///
/// - `Validation` -> 400 (Bad Request)
/// - `NotFound` -> 404 (Not Found)
/// - `Conflict` -> 409 (Conflict)
/// - `TransactionAborted` -> 503 (Service Unavailable, retryable)
/// - `Unavailable` -> 503 (Service Unavailable, retryable)
pub fn service_error_to_status_code(error: &ServiceError) -> u16 {
    match error {
        ServiceError::Validation(_) => 400,
        ServiceError::NotFound { .. } => 404,
        ServiceError::Conflict { .. } => 409,
        ServiceError::TransactionAborted => 503,
        ServiceError::Unavailable(_) => 503,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ValidationError;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            service_error_to_status_code(&ServiceError::Validation(ValidationError::single(
                "title",
                "must not be empty"
            ))),
            400
        );
        assert_eq!(
            service_error_to_status_code(&ServiceError::NotFound {
                entity: "Recipe",
                id: "r1".to_string()
            }),
            404
        );
        assert_eq!(
            service_error_to_status_code(&ServiceError::Conflict {
                entity: "User",
                id: "alice".to_string()
            }),
            409
        );
        assert_eq!(
            service_error_to_status_code(&ServiceError::TransactionAborted),
            503
        );
        assert_eq!(
            service_error_to_status_code(&ServiceError::Unavailable("timeout".to_string())),
            503
        );
    }
}
