//! Storage backend implementations of `recipeshare_core::storage::TableStore`.
//!
//! # Feature Flags
//!
//! - `inmemory` (default): in-memory table store for tests
//! - `dynamodb`: AWS DynamoDB table store using `aws-sdk-dynamodb`
//!
//! Build with DynamoDB:
//! ```bash
//! cargo build -p recipeshare --features dynamodb
//! ```

#[cfg(not(any(feature = "inmemory", feature = "dynamodb")))]
compile_error!(
    "No storage backend selected. Enable 'inmemory' or 'dynamodb' feature. \
    Example: cargo build -p recipeshare --features dynamodb"
);

#[cfg(feature = "dynamodb")]
pub mod dynamodb;

#[cfg(feature = "inmemory")]
pub mod inmemory;

#[cfg(feature = "dynamodb")]
pub use dynamodb::DynamoTableStore;

#[cfg(feature = "inmemory")]
pub use inmemory::InMemoryTableStore;
