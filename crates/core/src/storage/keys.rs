//! Key generation for the single-table design.
//!
//! Pure functions computing partition and sort keys from logical
//! identifiers. Keys are deterministic, injective per entity class, and
//! recomputable from identifiers alone; construction never touches storage
//! and fails only on empty identifier components.

use super::error::{Result, StoreError};
use super::value::ItemKey;

// ============================================================================
// Key prefixes
// ============================================================================

pub const USER_PREFIX: &str = "USER#";
pub const RECIPE_PREFIX: &str = "RECIPE#";
pub const LIKE_PREFIX: &str = "LIKE#";

fn require(field: &'static str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(StoreError::InvalidIdentifier(field));
    }
    Ok(())
}

// ============================================================================
// User keys
// ============================================================================

/// Generate the primary key for a User.
///
/// Pattern: PK `USER#<username>`, SK `USER#<username>` (same as PK for
/// single-item lookups).
pub fn user_key(username: &str) -> Result<ItemKey> {
    require("username", username)?;
    Ok(ItemKey::new(
        format!("{USER_PREFIX}{username}"),
        format!("{USER_PREFIX}{username}"),
    ))
}

/// Generate the partition key grouping a user's own items.
///
/// Pattern: `USER#<username>`
pub fn user_pk(username: &str) -> Result<String> {
    require("username", username)?;
    Ok(format!("{USER_PREFIX}{username}"))
}

// ============================================================================
// Recipe keys
// ============================================================================

/// Generate the primary key for a Recipe.
///
/// Pattern: PK `USER#<username>`, SK `RECIPE#<recipe_id>`
pub fn recipe_key(username: &str, recipe_id: &str) -> Result<ItemKey> {
    require("username", username)?;
    require("recipe_id", recipe_id)?;
    Ok(ItemKey::new(
        format!("{USER_PREFIX}{username}"),
        format!("{RECIPE_PREFIX}{recipe_id}"),
    ))
}

/// Generate the sort key for a Recipe, also the lookup value on the
/// index-by-sort-key when the owner is unknown.
///
/// Pattern: `RECIPE#<recipe_id>`
pub fn recipe_sk(recipe_id: &str) -> Result<String> {
    require("recipe_id", recipe_id)?;
    Ok(format!("{RECIPE_PREFIX}{recipe_id}"))
}

/// Sort-key prefix matching all recipes within a user's partition.
pub fn recipe_sk_prefix() -> &'static str {
    RECIPE_PREFIX
}

// ============================================================================
// Like keys
// ============================================================================

/// Generate the primary key for a Like.
///
/// Pattern: PK `LIKE#<recipe_id>`, SK `LIKE#<username>`
pub fn like_key(recipe_id: &str, username: &str) -> Result<ItemKey> {
    require("recipe_id", recipe_id)?;
    require("username", username)?;
    Ok(ItemKey::new(
        format!("{LIKE_PREFIX}{recipe_id}"),
        format!("{LIKE_PREFIX}{username}"),
    ))
}

/// Generate the partition key grouping all likes of one recipe.
///
/// Pattern: `LIKE#<recipe_id>`
pub fn like_pk(recipe_id: &str) -> Result<String> {
    require("recipe_id", recipe_id)?;
    Ok(format!("{LIKE_PREFIX}{recipe_id}"))
}

/// Sort-key prefix matching all likes within a recipe's partition.
pub fn like_sk_prefix() -> &'static str {
    LIKE_PREFIX
}
