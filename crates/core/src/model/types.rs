use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::Value;

/// Discriminator stored on every item as the `recordType` attribute.
///
/// Immutable once an item is written; every item in the table carries
/// exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordType {
    User,
    Recipe,
    Like,
}

impl RecordType {
    /// The attribute value persisted for this record type.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::User => "USER",
            RecordType::Recipe => "RECIPE",
            RecordType::Like => "LIKE",
        }
    }

    /// Parses a persisted `recordType` attribute value.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "USER" => Some(RecordType::User),
            "RECIPE" => Some(RecordType::Recipe),
            "LIKE" => Some(RecordType::Like),
            _ => None,
        }
    }
}

/// A registered user, keyed by username.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Attributes found on the stored item that this version does not
    /// interpret. Preserved verbatim through the codec.
    pub extra: BTreeMap<String, Value>,
}

impl User {
    /// Creates a new user with the current timestamp and no extra attributes.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            display_name: None,
            created_at: Utc::now(),
            extra: BTreeMap::new(),
        }
    }

    /// Sets the display name for this user.
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }
}

/// A recipe owned by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    /// Username of the owning user.
    pub owner: String,
    pub id: String,
    pub title: String,
    pub ingredients: Vec<String>,
    pub instructions: String,
    /// Count of likes. Only ever adjusted through the atomic increment
    /// transaction, never read-modify-written by application code.
    pub like_count: u64,
    pub created_at: DateTime<Utc>,
    /// Uninterpreted attributes carried along from the stored item.
    pub extra: BTreeMap<String, Value>,
}

/// A like placed by one user on one recipe.
///
/// A Like item exists if and only if the corresponding increment of the
/// recipe's `likeCount` committed; both are written in one transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Like {
    pub recipe_id: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// Caller-supplied body for creating a recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRecipe {
    /// Explicit recipe id; a UUID is generated when absent.
    pub id: Option<String>,
    pub title: String,
    pub ingredients: Vec<String>,
    pub instructions: String,
}

/// Partial update for a recipe. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipePatch {
    pub title: Option<String>,
    pub ingredients: Option<Vec<String>>,
    pub instructions: Option<String>,
}

/// Caller-supplied body for creating a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub display_name: Option<String>,
}

/// Partial update for a user. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPatch {
    pub display_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_type_round_trip() {
        for rt in [RecordType::User, RecordType::Recipe, RecordType::Like] {
            assert_eq!(RecordType::parse(rt.as_str()), Some(rt));
        }
        assert_eq!(RecordType::parse("COMMENT"), None);
    }

    #[test]
    fn test_user_builder() {
        let user = User::new("alice").with_display_name("Alice");
        assert_eq!(user.username, "alice");
        assert_eq!(user.display_name.as_deref(), Some("Alice"));
        assert!(user.extra.is_empty());
    }
}
