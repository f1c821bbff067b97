//! DynamoDB error mapping.
//!
//! Translates AWS SDK fault codes into the closed `StoreError` taxonomy;
//! vendor details never pass this module.

use std::fmt::Debug;

use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::delete_item::DeleteItemError;
use aws_sdk_dynamodb::operation::get_item::GetItemError;
use aws_sdk_dynamodb::operation::put_item::PutItemError;
use aws_sdk_dynamodb::operation::query::QueryError;
use aws_sdk_dynamodb::operation::transact_write_items::TransactWriteItemsError;

use recipeshare_core::storage::{CancellationCode, ItemKey, StoreError};

/// Map a GetItem SDK error to StoreError.
pub fn map_get_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<GetItemError, R>,
) -> StoreError {
    match err.into_service_error() {
        GetItemError::ResourceNotFoundException(_) => {
            StoreError::Unavailable("Table not found".to_string())
        }
        GetItemError::ProvisionedThroughputExceededException(_) => {
            StoreError::Unavailable("Throughput exceeded, please retry".to_string())
        }
        GetItemError::RequestLimitExceeded(_) => {
            StoreError::Unavailable("Request limit exceeded, please retry".to_string())
        }
        GetItemError::InternalServerError(_) => {
            StoreError::Unavailable("Store internal server error".to_string())
        }
        err => StoreError::Unavailable(format!("GetItem failed: {:?}", err)),
    }
}

/// Map a PutItem SDK error to StoreError.
///
/// A failed condition keeps the key so callers can name the entity.
pub fn map_put_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<PutItemError, R>,
    key: ItemKey,
) -> StoreError {
    match err.into_service_error() {
        PutItemError::ConditionalCheckFailedException(_) => StoreError::ConditionFailed { key },
        PutItemError::ResourceNotFoundException(_) => {
            StoreError::Unavailable("Table not found".to_string())
        }
        PutItemError::ProvisionedThroughputExceededException(_) => {
            StoreError::Unavailable("Throughput exceeded, please retry".to_string())
        }
        PutItemError::RequestLimitExceeded(_) => {
            StoreError::Unavailable("Request limit exceeded, please retry".to_string())
        }
        PutItemError::TransactionConflictException(_) => {
            StoreError::Unavailable("Transaction conflict, please retry".to_string())
        }
        PutItemError::InternalServerError(_) => {
            StoreError::Unavailable("Store internal server error".to_string())
        }
        err => StoreError::Unavailable(format!("PutItem failed: {:?}", err)),
    }
}

/// Map a DeleteItem SDK error to StoreError.
pub fn map_delete_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<DeleteItemError, R>,
) -> StoreError {
    match err.into_service_error() {
        DeleteItemError::ResourceNotFoundException(_) => {
            StoreError::Unavailable("Table not found".to_string())
        }
        DeleteItemError::ProvisionedThroughputExceededException(_) => {
            StoreError::Unavailable("Throughput exceeded, please retry".to_string())
        }
        DeleteItemError::RequestLimitExceeded(_) => {
            StoreError::Unavailable("Request limit exceeded, please retry".to_string())
        }
        DeleteItemError::TransactionConflictException(_) => {
            StoreError::Unavailable("Transaction conflict, please retry".to_string())
        }
        DeleteItemError::InternalServerError(_) => {
            StoreError::Unavailable("Store internal server error".to_string())
        }
        err => StoreError::Unavailable(format!("DeleteItem failed: {:?}", err)),
    }
}

/// Map a Query SDK error to StoreError.
pub fn map_query_error<R: Debug + Send + Sync + 'static>(err: SdkError<QueryError, R>) -> StoreError {
    match err.into_service_error() {
        QueryError::ResourceNotFoundException(_) => {
            StoreError::Unavailable("Table or index not found".to_string())
        }
        QueryError::ProvisionedThroughputExceededException(_) => {
            StoreError::Unavailable("Throughput exceeded, please retry".to_string())
        }
        QueryError::RequestLimitExceeded(_) => {
            StoreError::Unavailable("Request limit exceeded, please retry".to_string())
        }
        QueryError::InternalServerError(_) => {
            StoreError::Unavailable("Store internal server error".to_string())
        }
        err => StoreError::Unavailable(format!("Query failed: {:?}", err)),
    }
}

/// Map a TransactWriteItems SDK error to StoreError.
///
/// A cancelled transaction keeps its per-operation cancellation reasons,
/// positionally aligned with the submitted batch, so the caller can tell a
/// failed precondition from concurrent interference.
pub fn map_transact_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<TransactWriteItemsError, R>,
) -> StoreError {
    match err.into_service_error() {
        TransactWriteItemsError::TransactionCanceledException(e) => {
            let reasons = e
                .cancellation_reasons()
                .iter()
                .map(|reason| map_cancellation_code(reason.code()))
                .collect();
            StoreError::TransactionAborted { reasons }
        }
        TransactWriteItemsError::TransactionInProgressException(_) => {
            StoreError::Unavailable("Transaction already in progress".to_string())
        }
        TransactWriteItemsError::ResourceNotFoundException(_) => {
            StoreError::Unavailable("Table not found".to_string())
        }
        TransactWriteItemsError::ProvisionedThroughputExceededException(_) => {
            StoreError::Unavailable("Throughput exceeded, please retry".to_string())
        }
        TransactWriteItemsError::RequestLimitExceeded(_) => {
            StoreError::Unavailable("Request limit exceeded, please retry".to_string())
        }
        TransactWriteItemsError::InternalServerError(_) => {
            StoreError::Unavailable("Store internal server error".to_string())
        }
        err => StoreError::Unavailable(format!("TransactWriteItems failed: {:?}", err)),
    }
}

/// Translate one vendor cancellation code string.
pub fn map_cancellation_code(code: Option<&str>) -> CancellationCode {
    match code {
        Some("ConditionalCheckFailed") => CancellationCode::ConditionFailed,
        Some("TransactionConflict") => CancellationCode::TransactionConflict,
        Some("None") | None => CancellationCode::None,
        Some(_) => CancellationCode::Other,
    }
}
