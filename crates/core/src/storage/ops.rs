use serde::{Deserialize, Serialize};

use crate::model::RecordType;

use super::value::{ItemKey, RawItem};

/// Condition attached to a single-item write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteCondition {
    /// Unconditional write.
    None,
    /// The item must not already exist (optimistic create-if-absent).
    MustNotExist,
    /// The item must already exist (replace).
    MustExist,
}

/// Counter mutation applied by a transactional update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateAction {
    /// Adds `by` to a numeric attribute. A missing attribute starts at
    /// zero, so the increment itself never fails on absence; pair with
    /// [`WriteCondition::MustExist`] to require the item.
    Increment { attribute: &'static str, by: u64 },
}

/// One operation inside a transactional write.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    Put {
        item: RawItem,
        condition: WriteCondition,
    },
    Update {
        key: ItemKey,
        action: UpdateAction,
        condition: WriteCondition,
    },
    Delete {
        key: ItemKey,
        condition: WriteCondition,
    },
}

/// Opaque continuation token for resuming a listing.
///
/// Must be passed back unmodified; its contents are backend-specific.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageToken(String);

impl PageToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Which index a listing reads through, and with what key material.
///
/// The mapping from query intent to physical index is deliberate
/// single-table overloading, part of the persisted external contract:
///
/// | Intent                          | Index | Key                         |
/// |---------------------------------|-------|-----------------------------|
/// | Items within one partition      | main  | PK equals, SK prefix        |
/// | Recipe by id, owner unknown     | GSI1  | SK equals                   |
/// | One record type, chronological  | GSI2  | recordType, createdAt order |
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexQuery {
    /// Main table: one partition, sort keys sharing a prefix.
    PartitionPrefix { pk: String, sk_prefix: String },
    /// Index-by-SortKey: every item with exactly this sort key.
    BySortKey { sk: String },
    /// Index-by-RecordType+CreatedAt: one entity kind in `createdAt`
    /// ascending order.
    ByRecordType { record_type: RecordType },
}

/// A page of raw items plus the token to fetch the next page, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPage {
    pub items: Vec<RawItem>,
    pub next: Option<PageToken>,
}

/// A page of decoded entities returned by the facade.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next: Option<PageToken>,
}
