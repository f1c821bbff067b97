//! Record codec: typed entities to and from the table's generic item
//! representation.
//!
//! Round trips are lossless for all defined fields. Attributes a stored item
//! carries that this version does not know about are preserved opaquely in
//! the entity's `extra` map and written back on encode; they may not shadow
//! reserved attributes. Decoding an item missing a required field fails with
//! [`StoreError::MalformedRecord`] rather than silently defaulting.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::model::{Like, Recipe, RecordType, User};

use super::error::{Result, StoreError};
use super::keys;
use super::value::{RawItem, Value};

// ============================================================================
// Attribute names
// ============================================================================

pub const ATTR_PK: &str = "PK";
pub const ATTR_SK: &str = "SK";
pub const ATTR_RECORD_TYPE: &str = "recordType";
pub const ATTR_CREATED_AT: &str = "createdAt";
pub const ATTR_USERNAME: &str = "username";
pub const ATTR_DISPLAY_NAME: &str = "displayName";
pub const ATTR_ID: &str = "id";
pub const ATTR_OWNER: &str = "owner";
pub const ATTR_TITLE: &str = "title";
pub const ATTR_INGREDIENTS: &str = "ingredients";
pub const ATTR_INSTRUCTIONS: &str = "instructions";
pub const ATTR_LIKE_COUNT: &str = "likeCount";
pub const ATTR_RECIPE_ID: &str = "recipeId";

/// Attributes the codec owns for a User item; `extra` may not contain them.
const USER_RESERVED: &[&str] = &[
    ATTR_PK,
    ATTR_SK,
    ATTR_RECORD_TYPE,
    ATTR_CREATED_AT,
    ATTR_USERNAME,
    ATTR_DISPLAY_NAME,
];

/// Attributes the codec owns for a Recipe item.
const RECIPE_RESERVED: &[&str] = &[
    ATTR_PK,
    ATTR_SK,
    ATTR_RECORD_TYPE,
    ATTR_CREATED_AT,
    ATTR_ID,
    ATTR_OWNER,
    ATTR_TITLE,
    ATTR_INGREDIENTS,
    ATTR_INSTRUCTIONS,
    ATTR_LIKE_COUNT,
];

// ============================================================================
// User conversions
// ============================================================================

/// Convert a User to a raw item.
pub fn encode_user(user: &User) -> Result<RawItem> {
    let key = keys::user_key(&user.username)?;
    let mut item = RawItem::new();

    item.insert(ATTR_PK.to_string(), Value::S(key.pk));
    item.insert(ATTR_SK.to_string(), Value::S(key.sk));
    item.insert(
        ATTR_RECORD_TYPE.to_string(),
        Value::S(RecordType::User.as_str().to_string()),
    );
    item.insert(
        ATTR_USERNAME.to_string(),
        Value::S(user.username.clone()),
    );
    if let Some(display_name) = &user.display_name {
        item.insert(
            ATTR_DISPLAY_NAME.to_string(),
            Value::S(display_name.clone()),
        );
    }
    item.insert(
        ATTR_CREATED_AT.to_string(),
        Value::S(user.created_at.to_rfc3339()),
    );

    merge_extra(&mut item, &user.extra, USER_RESERVED);
    Ok(item)
}

/// Convert a raw item to a User.
pub fn decode_user(item: &RawItem) -> Result<User> {
    expect_record_type(item, RecordType::User)?;
    Ok(User {
        username: get_string(item, ATTR_USERNAME)?,
        display_name: get_optional_string(item, ATTR_DISPLAY_NAME),
        created_at: get_datetime(item, ATTR_CREATED_AT)?,
        extra: collect_extra(item, USER_RESERVED),
    })
}

// ============================================================================
// Recipe conversions
// ============================================================================

/// Convert a Recipe to a raw item.
pub fn encode_recipe(recipe: &Recipe) -> Result<RawItem> {
    let key = keys::recipe_key(&recipe.owner, &recipe.id)?;
    let mut item = RawItem::new();

    item.insert(ATTR_PK.to_string(), Value::S(key.pk));
    item.insert(ATTR_SK.to_string(), Value::S(key.sk));
    item.insert(
        ATTR_RECORD_TYPE.to_string(),
        Value::S(RecordType::Recipe.as_str().to_string()),
    );
    item.insert(ATTR_ID.to_string(), Value::S(recipe.id.clone()));
    item.insert(ATTR_OWNER.to_string(), Value::S(recipe.owner.clone()));
    item.insert(ATTR_TITLE.to_string(), Value::S(recipe.title.clone()));
    item.insert(
        ATTR_INGREDIENTS.to_string(),
        Value::L(
            recipe
                .ingredients
                .iter()
                .map(|i| Value::S(i.clone()))
                .collect(),
        ),
    );
    item.insert(
        ATTR_INSTRUCTIONS.to_string(),
        Value::S(recipe.instructions.clone()),
    );
    item.insert(
        ATTR_LIKE_COUNT.to_string(),
        Value::from_u64(recipe.like_count),
    );
    item.insert(
        ATTR_CREATED_AT.to_string(),
        Value::S(recipe.created_at.to_rfc3339()),
    );

    merge_extra(&mut item, &recipe.extra, RECIPE_RESERVED);
    Ok(item)
}

/// Convert a raw item to a Recipe.
pub fn decode_recipe(item: &RawItem) -> Result<Recipe> {
    expect_record_type(item, RecordType::Recipe)?;
    Ok(Recipe {
        owner: get_string(item, ATTR_OWNER)?,
        id: get_string(item, ATTR_ID)?,
        title: get_string(item, ATTR_TITLE)?,
        ingredients: get_string_list(item, ATTR_INGREDIENTS)?,
        instructions: get_string(item, ATTR_INSTRUCTIONS)?,
        like_count: get_u64(item, ATTR_LIKE_COUNT)?,
        created_at: get_datetime(item, ATTR_CREATED_AT)?,
        extra: collect_extra(item, RECIPE_RESERVED),
    })
}

// ============================================================================
// Like conversions
// ============================================================================

/// Convert a Like to a raw item.
pub fn encode_like(like: &Like) -> Result<RawItem> {
    let key = keys::like_key(&like.recipe_id, &like.username)?;
    let mut item = RawItem::new();

    item.insert(ATTR_PK.to_string(), Value::S(key.pk));
    item.insert(ATTR_SK.to_string(), Value::S(key.sk));
    item.insert(
        ATTR_RECORD_TYPE.to_string(),
        Value::S(RecordType::Like.as_str().to_string()),
    );
    item.insert(
        ATTR_RECIPE_ID.to_string(),
        Value::S(like.recipe_id.clone()),
    );
    item.insert(
        ATTR_USERNAME.to_string(),
        Value::S(like.username.clone()),
    );
    item.insert(
        ATTR_CREATED_AT.to_string(),
        Value::S(like.created_at.to_rfc3339()),
    );
    Ok(item)
}

/// Convert a raw item to a Like.
pub fn decode_like(item: &RawItem) -> Result<Like> {
    expect_record_type(item, RecordType::Like)?;
    Ok(Like {
        recipe_id: get_string(item, ATTR_RECIPE_ID)?,
        username: get_string(item, ATTR_USERNAME)?,
        created_at: get_datetime(item, ATTR_CREATED_AT)?,
    })
}

// ============================================================================
// Helper functions
// ============================================================================

fn expect_record_type(item: &RawItem, expected: RecordType) -> Result<()> {
    let found = get_string(item, ATTR_RECORD_TYPE)?;
    if found != expected.as_str() {
        return Err(StoreError::MalformedRecord(format!(
            "expected recordType {}, found {}",
            expected.as_str(),
            found
        )));
    }
    Ok(())
}

/// Get a required string attribute.
fn get_string(item: &RawItem, key: &str) -> Result<String> {
    item.get(key)
        .and_then(Value::as_s)
        .map(str::to_string)
        .ok_or_else(|| StoreError::MalformedRecord(format!("missing or invalid field: {key}")))
}

/// Get an optional string attribute.
fn get_optional_string(item: &RawItem, key: &str) -> Option<String> {
    item.get(key).and_then(Value::as_s).map(str::to_string)
}

/// Get a required non-negative integer attribute.
fn get_u64(item: &RawItem, key: &str) -> Result<u64> {
    item.get(key)
        .and_then(Value::as_u64)
        .ok_or_else(|| StoreError::MalformedRecord(format!("missing or invalid field: {key}")))
}

/// Get a required list-of-strings attribute.
fn get_string_list(item: &RawItem, key: &str) -> Result<Vec<String>> {
    let list = item
        .get(key)
        .and_then(Value::as_l)
        .ok_or_else(|| StoreError::MalformedRecord(format!("missing or invalid field: {key}")))?;
    list.iter()
        .map(|v| {
            v.as_s().map(str::to_string).ok_or_else(|| {
                StoreError::MalformedRecord(format!("non-string element in field: {key}"))
            })
        })
        .collect()
}

/// Get a required datetime attribute (RFC 3339 format).
fn get_datetime(item: &RawItem, key: &str) -> Result<DateTime<Utc>> {
    let s = get_string(item, key)?;
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::MalformedRecord(format!("invalid datetime {key}: {e}")))
}

/// Write extension attributes into the item, skipping reserved names.
fn merge_extra(item: &mut RawItem, extra: &BTreeMap<String, Value>, reserved: &[&str]) {
    for (name, value) in extra {
        if !reserved.contains(&name.as_str()) {
            item.insert(name.clone(), value.clone());
        }
    }
}

/// Collect every attribute not owned by the codec into the extension map.
fn collect_extra(item: &RawItem, reserved: &[&str]) -> BTreeMap<String, Value> {
    item.iter()
        .filter(|(name, _)| !reserved.contains(&name.as_str()))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}
