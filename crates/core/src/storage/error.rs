use thiserror::Error;

use crate::model::ValidationError;

use super::value::ItemKey;

/// Why one operation inside a rejected transaction was cancelled.
///
/// The vector carried by [`StoreError::TransactionAborted`] is positional:
/// entry `i` describes operation `i` of the submitted batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancellationCode {
    /// The operation's write condition did not hold.
    ConditionFailed,
    /// Another transaction touched the same item concurrently.
    TransactionConflict,
    /// The operation itself was fine; a sibling caused the abort.
    None,
    /// Any other store-reported reason.
    Other,
}

/// Errors surfaced by the storage engine.
///
/// Absence on a point read is not an error (`get` returns `Option`), so
/// there is no NotFound variant here.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Conditional write failed for {key}")]
    ConditionFailed { key: ItemKey },
    #[error("Transaction aborted, no changes were applied")]
    TransactionAborted { reasons: Vec<CancellationCode> },
    #[error("Malformed record: {0}")]
    MalformedRecord(String),
    #[error("Invalid identifier: {0} must not be empty")]
    InvalidIdentifier(&'static str),
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Result type for storage engine operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors returned by the access facade: the closed taxonomy exposed to
/// request handlers. Vendor fault details never pass this boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// The caller's input is malformed; never retried automatically.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Absence is a legitimate terminal state, not a fault.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
    /// A uniqueness or precondition violation; the caller must resolve
    /// before retrying.
    #[error("{entity} already exists: {id}")]
    Conflict { entity: &'static str, id: String },
    /// Concurrent interference on a multi-item write; safe to retry, no
    /// partial effect occurred.
    #[error("Transaction aborted, safe to retry")]
    TransactionAborted,
    /// Transient infrastructure fault; safe to retry with backoff.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            // Callers that can name the entity map this themselves before
            // reaching the blanket conversion.
            StoreError::ConditionFailed { key } => ServiceError::Conflict {
                entity: "Record",
                id: key.to_string(),
            },
            StoreError::TransactionAborted { .. } => ServiceError::TransactionAborted,
            StoreError::MalformedRecord(msg) => {
                ServiceError::Unavailable(format!("malformed record: {msg}"))
            }
            StoreError::InvalidIdentifier(field) => {
                ServiceError::Validation(ValidationError::single(field, "must not be empty"))
            }
            StoreError::Unavailable(msg) => ServiceError::Unavailable(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let error = StoreError::ConditionFailed {
            key: ItemKey::new("USER#alice", "RECIPE#r1"),
        };
        assert_eq!(
            error.to_string(),
            "Conditional write failed for USER#alice/RECIPE#r1"
        );
        assert_eq!(
            StoreError::MalformedRecord("missing field: title".to_string()).to_string(),
            "Malformed record: missing field: title"
        );
        assert_eq!(
            StoreError::InvalidIdentifier("username").to_string(),
            "Invalid identifier: username must not be empty"
        );
    }

    #[test]
    fn test_service_error_display() {
        let error = ServiceError::NotFound {
            entity: "Recipe",
            id: "r1".to_string(),
        };
        assert_eq!(error.to_string(), "Recipe not found: r1");
        let error = ServiceError::Conflict {
            entity: "Like",
            id: "r1:bob".to_string(),
        };
        assert_eq!(error.to_string(), "Like already exists: r1:bob");
    }

    #[test]
    fn test_malformed_record_surfaces_as_unavailable() {
        let err: ServiceError = StoreError::MalformedRecord("bad likeCount".to_string()).into();
        assert!(matches!(err, ServiceError::Unavailable(_)));
    }

    #[test]
    fn test_invalid_identifier_surfaces_as_validation() {
        let err: ServiceError = StoreError::InvalidIdentifier("username").into();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[test]
    fn test_transaction_abort_conversion() {
        let err: ServiceError = StoreError::TransactionAborted {
            reasons: vec![CancellationCode::TransactionConflict, CancellationCode::None],
        }
        .into();
        assert_eq!(err, ServiceError::TransactionAborted);
    }
}
