//! In-memory table store for tests.
//!
//! Implements the full `TableStore` contract, including all-or-nothing
//! transactions and resumable index listings, over a `BTreeMap` behind a
//! single lock. Data is not persisted and is lost when the store is dropped.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use tokio::sync::RwLock;

use recipeshare_core::storage::codec::{ATTR_CREATED_AT, ATTR_PK, ATTR_RECORD_TYPE, ATTR_SK};
use recipeshare_core::storage::{
    CancellationCode, IndexQuery, ItemKey, PageToken, RawItem, RawPage, Result, StoreError,
    TableStore, UpdateAction, Value, WriteCondition, WriteOp,
};

type ItemMap = BTreeMap<(String, String), RawItem>;

/// In-memory storage backend for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTableStore {
    items: Arc<RwLock<ItemMap>>,
}

impl InMemoryTableStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Reads the primary key attributes off a raw item.
fn key_of(item: &RawItem) -> Result<(String, String)> {
    let pk = item
        .get(ATTR_PK)
        .and_then(Value::as_s)
        .ok_or_else(|| StoreError::MalformedRecord("item is missing PK".to_string()))?;
    let sk = item
        .get(ATTR_SK)
        .and_then(Value::as_s)
        .ok_or_else(|| StoreError::MalformedRecord("item is missing SK".to_string()))?;
    Ok((pk.to_string(), sk.to_string()))
}

fn condition_holds(exists: bool, condition: WriteCondition) -> bool {
    match condition {
        WriteCondition::None => true,
        WriteCondition::MustNotExist => !exists,
        WriteCondition::MustExist => exists,
    }
}

/// Key and condition of one transactional operation, for the check phase.
fn op_target(op: &WriteOp) -> Result<((String, String), WriteCondition)> {
    match op {
        WriteOp::Put { item, condition } => Ok((key_of(item)?, *condition)),
        WriteOp::Update { key, condition, .. } | WriteOp::Delete { key, condition } => {
            Ok(((key.pk.clone(), key.sk.clone()), *condition))
        }
    }
}

fn apply(items: &mut ItemMap, op: WriteOp) -> Result<()> {
    match op {
        WriteOp::Put { item, .. } => {
            let key = key_of(&item)?;
            items.insert(key, item);
        }
        WriteOp::Update { key, action, .. } => {
            let item = items
                .entry((key.pk, key.sk))
                .or_insert_with(RawItem::new);
            match action {
                UpdateAction::Increment { attribute, by } => {
                    // ADD semantics: a missing counter starts at zero.
                    let current = item.get(attribute).and_then(Value::as_u64).unwrap_or(0);
                    item.insert(attribute.to_string(), Value::from_u64(current + by));
                }
            }
        }
        WriteOp::Delete { key, .. } => {
            items.remove(&(key.pk, key.sk));
        }
    }
    Ok(())
}

/// The lexicographic position of an item within a listing, used as the
/// continuation token payload.
fn sort_tuple(query: &IndexQuery, key: &(String, String), item: &RawItem) -> Vec<String> {
    match query {
        IndexQuery::PartitionPrefix { .. } => vec![key.0.clone(), key.1.clone()],
        IndexQuery::BySortKey { .. } => vec![key.1.clone(), key.0.clone()],
        IndexQuery::ByRecordType { .. } => {
            let created_at = item
                .get(ATTR_CREATED_AT)
                .and_then(Value::as_s)
                .unwrap_or_default()
                .to_string();
            vec![created_at, key.0.clone(), key.1.clone()]
        }
    }
}

fn encode_token(tuple: &[String]) -> Result<PageToken> {
    let json = serde_json::to_vec(tuple)
        .map_err(|e| StoreError::Unavailable(format!("token encoding failed: {e}")))?;
    Ok(PageToken::new(BASE64.encode(json)))
}

fn decode_token(token: &PageToken) -> Result<Vec<String>> {
    let bytes = BASE64
        .decode(token.as_str())
        .map_err(|_| StoreError::MalformedRecord("invalid continuation token".to_string()))?;
    serde_json::from_slice(&bytes)
        .map_err(|_| StoreError::MalformedRecord("invalid continuation token".to_string()))
}

fn matches(query: &IndexQuery, key: &(String, String), item: &RawItem) -> bool {
    match query {
        IndexQuery::PartitionPrefix { pk, sk_prefix } => {
            key.0 == *pk && key.1.starts_with(sk_prefix)
        }
        IndexQuery::BySortKey { sk } => key.1 == *sk,
        IndexQuery::ByRecordType { record_type } => {
            item.get(ATTR_RECORD_TYPE).and_then(Value::as_s) == Some(record_type.as_str())
        }
    }
}

#[async_trait]
impl TableStore for InMemoryTableStore {
    async fn get(&self, key: &ItemKey) -> Result<Option<RawItem>> {
        let items = self.items.read().await;
        Ok(items.get(&(key.pk.clone(), key.sk.clone())).cloned())
    }

    async fn put(&self, item: RawItem, condition: WriteCondition) -> Result<()> {
        let mut items = self.items.write().await;
        let key = key_of(&item)?;
        if !condition_holds(items.contains_key(&key), condition) {
            return Err(StoreError::ConditionFailed {
                key: ItemKey::new(key.0, key.1),
            });
        }
        items.insert(key, item);
        Ok(())
    }

    async fn delete(&self, key: &ItemKey) -> Result<()> {
        let mut items = self.items.write().await;
        items.remove(&(key.pk.clone(), key.sk.clone()));
        Ok(())
    }

    async fn transact_write(&self, ops: Vec<WriteOp>) -> Result<()> {
        let mut items = self.items.write().await;

        // Check phase: every condition is evaluated against the same
        // snapshot before anything is applied.
        let mut reasons = Vec::with_capacity(ops.len());
        let mut aborted = false;
        for op in &ops {
            let (key, condition) = op_target(op)?;
            if condition_holds(items.contains_key(&key), condition) {
                reasons.push(CancellationCode::None);
            } else {
                reasons.push(CancellationCode::ConditionFailed);
                aborted = true;
            }
        }
        if aborted {
            return Err(StoreError::TransactionAborted { reasons });
        }

        // Apply phase: nothing here can fail a condition anymore.
        for op in ops {
            apply(&mut items, op)?;
        }
        Ok(())
    }

    async fn query(
        &self,
        query: IndexQuery,
        limit: Option<u32>,
        token: Option<PageToken>,
    ) -> Result<RawPage> {
        let items = self.items.read().await;

        let mut rows: Vec<(Vec<String>, RawItem)> = items
            .iter()
            .filter(|(key, item)| matches(&query, key, item))
            .map(|(key, item)| (sort_tuple(&query, key, item), item.clone()))
            .collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));

        if let Some(token) = token {
            let after = decode_token(&token)?;
            rows.retain(|(tuple, _)| tuple > &after);
        }

        let limit = limit.map(|l| l as usize).unwrap_or(usize::MAX);
        let has_more = rows.len() > limit;
        rows.truncate(limit);

        let next = match (has_more, rows.last()) {
            (true, Some((tuple, _))) => Some(encode_token(tuple)?),
            _ => None,
        };

        Ok(RawPage {
            items: rows.into_iter().map(|(_, item)| item).collect(),
            next,
        })
    }
}
