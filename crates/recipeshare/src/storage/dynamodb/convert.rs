//! Conversions between DynamoDB attribute maps and the store-agnostic item
//! representation, plus continuation-token packing.
//!
//! Pure functions, testable without DynamoDB access.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use recipeshare_core::storage::codec::{ATTR_PK, ATTR_SK};
use recipeshare_core::storage::{ItemKey, PageToken, RawItem, Result, StoreError, Value};

/// Convert one attribute value to the wire type.
pub fn value_to_attr(value: &Value) -> AttributeValue {
    match value {
        Value::S(s) => AttributeValue::S(s.clone()),
        Value::N(n) => AttributeValue::N(n.clone()),
        Value::Bool(b) => AttributeValue::Bool(*b),
        Value::L(l) => AttributeValue::L(l.iter().map(value_to_attr).collect()),
    }
}

/// Convert one wire attribute back. Attribute types this layer does not
/// model (maps, binary, sets) return `None` and are dropped by the caller.
pub fn attr_to_value(attr: &AttributeValue) -> Option<Value> {
    match attr {
        AttributeValue::S(s) => Some(Value::S(s.clone())),
        AttributeValue::N(n) => Some(Value::N(n.clone())),
        AttributeValue::Bool(b) => Some(Value::Bool(*b)),
        AttributeValue::L(l) => Some(Value::L(l.iter().filter_map(attr_to_value).collect())),
        _ => None,
    }
}

/// Convert a raw item to a DynamoDB attribute map.
pub fn item_to_attrs(item: &RawItem) -> HashMap<String, AttributeValue> {
    item.iter()
        .map(|(name, value)| (name.clone(), value_to_attr(value)))
        .collect()
}

/// Convert a DynamoDB attribute map to a raw item, dropping attributes of
/// unmodeled types.
pub fn attrs_to_item(attrs: &HashMap<String, AttributeValue>) -> RawItem {
    attrs
        .iter()
        .filter_map(|(name, attr)| attr_to_value(attr).map(|v| (name.clone(), v)))
        .collect()
}

/// Build the primary-key attribute map for a point operation.
pub fn key_to_attrs(key: &ItemKey) -> HashMap<String, AttributeValue> {
    HashMap::from([
        (ATTR_PK.to_string(), AttributeValue::S(key.pk.clone())),
        (ATTR_SK.to_string(), AttributeValue::S(key.sk.clone())),
    ])
}

/// Read the primary key off an encoded item.
pub fn item_key(item: &RawItem) -> Result<ItemKey> {
    let pk = item
        .get(ATTR_PK)
        .and_then(Value::as_s)
        .ok_or_else(|| StoreError::MalformedRecord("item is missing PK".to_string()))?;
    let sk = item
        .get(ATTR_SK)
        .and_then(Value::as_s)
        .ok_or_else(|| StoreError::MalformedRecord("item is missing SK".to_string()))?;
    Ok(ItemKey::new(pk, sk))
}

/// Pack a `LastEvaluatedKey` into an opaque continuation token.
pub fn token_from_key(last_key: &HashMap<String, AttributeValue>) -> Result<PageToken> {
    let item = attrs_to_item(last_key);
    let json = serde_json::to_vec(&item)
        .map_err(|e| StoreError::Unavailable(format!("token encoding failed: {e}")))?;
    Ok(PageToken::new(BASE64.encode(json)))
}

/// Unpack a continuation token into an `ExclusiveStartKey`.
pub fn token_to_key(token: &PageToken) -> Result<HashMap<String, AttributeValue>> {
    let bytes = BASE64
        .decode(token.as_str())
        .map_err(|_| StoreError::MalformedRecord("invalid continuation token".to_string()))?;
    let item: RawItem = serde_json::from_slice(&bytes)
        .map_err(|_| StoreError::MalformedRecord("invalid continuation token".to_string()))?;
    Ok(item_to_attrs(&item))
}
