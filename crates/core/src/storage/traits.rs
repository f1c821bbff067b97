use async_trait::async_trait;

use super::ops::{IndexQuery, PageToken, RawPage, WriteCondition, WriteOp};
use super::value::{ItemKey, RawItem};
use super::Result;

/// The storage engine: point reads, conditional writes, idempotent deletes,
/// all-or-nothing multi-item transactions, and index-routed listings against
/// the single table.
///
/// Implementations push all concurrency safety into the store's native
/// primitives; there is no in-process locking contract here, and every
/// operation is independently durable once it returns success.
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Single point read. Absence is a valid terminal outcome (`None`),
    /// never an error.
    async fn get(&self, key: &ItemKey) -> Result<Option<RawItem>>;

    /// Unconditional or conditional single-item write. A failed condition
    /// surfaces as [`StoreError::ConditionFailed`].
    ///
    /// [`StoreError::ConditionFailed`]: super::StoreError::ConditionFailed
    async fn put(&self, item: RawItem, condition: WriteCondition) -> Result<()>;

    /// Idempotent delete; removing a non-existent key is not an error.
    async fn delete(&self, key: &ItemKey) -> Result<()>;

    /// All-or-nothing application of the given operations, isolated as if
    /// serialized for the items touched. On rejection nothing is applied
    /// and [`StoreError::TransactionAborted`] carries one positional
    /// [`CancellationCode`] per operation.
    ///
    /// [`StoreError::TransactionAborted`]: super::StoreError::TransactionAborted
    /// [`CancellationCode`]: super::CancellationCode
    async fn transact_write(&self, ops: Vec<WriteOp>) -> Result<()>;

    /// Index-routed listing returning raw items and an opaque continuation
    /// token; pass the token back unmodified to resume.
    async fn query(
        &self,
        query: IndexQuery,
        limit: Option<u32>,
        token: Option<PageToken>,
    ) -> Result<RawPage>;
}
