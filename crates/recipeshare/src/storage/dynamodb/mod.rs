//! DynamoDB table store implementation using `aws-sdk-dynamodb`.

mod convert;
mod error;
mod store;

pub use store::DynamoTableStore;
