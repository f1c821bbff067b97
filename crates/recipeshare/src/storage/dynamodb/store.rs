//! DynamoDB implementation of the `TableStore` engine contract.
//!
//! All concurrency safety is pushed into the store's native primitives:
//! conditional puts for create-if-absent, `TransactWriteItems` for
//! cross-item atomicity.

use async_trait::async_trait;
use aws_sdk_dynamodb::types::{AttributeValue, Delete, Put, TransactWriteItem, Update};
use aws_sdk_dynamodb::Client;

use recipeshare_core::storage::codec::ATTR_RECORD_TYPE;
use recipeshare_core::storage::{
    IndexQuery, ItemKey, PageToken, RawItem, RawPage, Result, StoreError, TableStore,
    UpdateAction, WriteCondition, WriteOp,
};

use crate::config::Config;

use super::convert;
use super::error::{
    map_delete_error, map_get_error, map_put_error, map_query_error, map_transact_error,
};

/// Index re-partitioning the table on the sort key alone.
const INDEX_BY_SORT_KEY: &str = "GSI1";
/// Index re-partitioning on `recordType`, sorted by `createdAt`.
const INDEX_BY_RECORD_TYPE: &str = "GSI2";

/// DynamoDB-backed table store.
pub struct DynamoTableStore {
    client: Client,
    table_name: String,
}

impl DynamoTableStore {
    /// Creates a new store with the given DynamoDB client and table name.
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    /// Creates a new store from environment configuration.
    ///
    /// Uses the AWS SDK default credential chain; an endpoint override in
    /// the configuration points the client at a local DynamoDB.
    pub async fn from_env(config: &Config) -> Result<Self> {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(endpoint_url) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint_url);
        }
        let sdk_config = loader.load().await;
        let client = Client::new(&sdk_config);

        Ok(Self::new(client, config.table_name.clone()))
    }

    /// Get the table name.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    fn build_transact_item(&self, op: WriteOp) -> Result<TransactWriteItem> {
        match op {
            WriteOp::Put { item, condition } => {
                let mut put = Put::builder()
                    .table_name(&self.table_name)
                    .set_item(Some(convert::item_to_attrs(&item)));
                if let Some(expr) = condition_expression(condition) {
                    put = put.condition_expression(expr);
                }
                let put = put
                    .build()
                    .map_err(|e| StoreError::Unavailable(format!("invalid transact put: {e}")))?;
                Ok(TransactWriteItem::builder().put(put).build())
            }
            WriteOp::Update {
                key,
                action,
                condition,
            } => {
                let UpdateAction::Increment { attribute, by } = action;
                let mut update = Update::builder()
                    .table_name(&self.table_name)
                    .set_key(Some(convert::key_to_attrs(&key)))
                    .update_expression("ADD #attr :delta")
                    .expression_attribute_names("#attr", attribute)
                    .expression_attribute_values(":delta", AttributeValue::N(by.to_string()));
                if let Some(expr) = condition_expression(condition) {
                    update = update.condition_expression(expr);
                }
                let update = update.build().map_err(|e| {
                    StoreError::Unavailable(format!("invalid transact update: {e}"))
                })?;
                Ok(TransactWriteItem::builder().update(update).build())
            }
            WriteOp::Delete { key, condition } => {
                let mut delete = Delete::builder()
                    .table_name(&self.table_name)
                    .set_key(Some(convert::key_to_attrs(&key)));
                if let Some(expr) = condition_expression(condition) {
                    delete = delete.condition_expression(expr);
                }
                let delete = delete.build().map_err(|e| {
                    StoreError::Unavailable(format!("invalid transact delete: {e}"))
                })?;
                Ok(TransactWriteItem::builder().delete(delete).build())
            }
        }
    }
}

/// The condition expression for a write, if any. Existence is checked on
/// the partition key attribute, which every item carries.
fn condition_expression(condition: WriteCondition) -> Option<&'static str> {
    match condition {
        WriteCondition::None => None,
        WriteCondition::MustNotExist => Some("attribute_not_exists(PK)"),
        WriteCondition::MustExist => Some("attribute_exists(PK)"),
    }
}

#[async_trait]
impl TableStore for DynamoTableStore {
    async fn get(&self, key: &ItemKey) -> Result<Option<RawItem>> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .set_key(Some(convert::key_to_attrs(key)))
            .send()
            .await
            .map_err(map_get_error)?;

        Ok(result.item.as_ref().map(convert::attrs_to_item))
    }

    async fn put(&self, item: RawItem, condition: WriteCondition) -> Result<()> {
        let key = convert::item_key(&item)?;
        let mut request = self
            .client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(convert::item_to_attrs(&item)));
        if let Some(expr) = condition_expression(condition) {
            request = request.condition_expression(expr);
        }

        request
            .send()
            .await
            .map_err(|e| map_put_error(e, key))?;
        Ok(())
    }

    async fn delete(&self, key: &ItemKey) -> Result<()> {
        self.client
            .delete_item()
            .table_name(&self.table_name)
            .set_key(Some(convert::key_to_attrs(key)))
            .send()
            .await
            .map_err(map_delete_error)?;
        Ok(())
    }

    async fn transact_write(&self, ops: Vec<WriteOp>) -> Result<()> {
        tracing::debug!(operations = ops.len(), "submitting transactional write");

        let mut request = self.client.transact_write_items();
        for op in ops {
            request = request.transact_items(self.build_transact_item(op)?);
        }

        request.send().await.map_err(map_transact_error)?;
        Ok(())
    }

    async fn query(
        &self,
        query: IndexQuery,
        limit: Option<u32>,
        token: Option<PageToken>,
    ) -> Result<RawPage> {
        let mut request = self.client.query().table_name(&self.table_name);

        request = match &query {
            IndexQuery::PartitionPrefix { pk, sk_prefix } => request
                .key_condition_expression("PK = :pk AND begins_with(SK, :prefix)")
                .expression_attribute_values(":pk", AttributeValue::S(pk.clone()))
                .expression_attribute_values(":prefix", AttributeValue::S(sk_prefix.clone())),
            IndexQuery::BySortKey { sk } => request
                .index_name(INDEX_BY_SORT_KEY)
                .key_condition_expression("SK = :sk")
                .expression_attribute_values(":sk", AttributeValue::S(sk.clone())),
            IndexQuery::ByRecordType { record_type } => request
                .index_name(INDEX_BY_RECORD_TYPE)
                .key_condition_expression("#rt = :rt")
                .expression_attribute_names("#rt", ATTR_RECORD_TYPE)
                .expression_attribute_values(
                    ":rt",
                    AttributeValue::S(record_type.as_str().to_string()),
                )
                .scan_index_forward(true),
        };

        if let Some(limit) = limit {
            request = request.limit(limit as i32);
        }
        if let Some(token) = &token {
            request = request.set_exclusive_start_key(Some(convert::token_to_key(token)?));
        }

        let result = request.send().await.map_err(map_query_error)?;

        let items = result
            .items
            .unwrap_or_default()
            .iter()
            .map(convert::attrs_to_item)
            .collect();
        let next = result
            .last_evaluated_key
            .as_ref()
            .map(convert::token_from_key)
            .transpose()?;

        Ok(RawPage { items, next })
    }
}
