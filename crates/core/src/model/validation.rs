//! Pure schema checks run strictly before any write is issued.
//!
//! Each function collects every violation it finds and returns them together;
//! a validation failure never reaches the storage engine.

use super::error::{FieldViolation, ValidationError};
use super::types::{NewRecipe, NewUser, RecipePatch, UserPatch};

/// Maximum length of a username or recipe id.
const IDENTIFIER_MAX_LEN: usize = 64;
/// Maximum length of a recipe title.
const TITLE_MAX_LEN: usize = 200;
/// Maximum length of a display name.
const DISPLAY_NAME_MAX_LEN: usize = 100;

/// Checks whether a string is a well-formed identifier:
/// 1..=64 characters of `[A-Za-z0-9_-]`.
fn is_valid_identifier(s: &str) -> bool {
    !s.is_empty()
        && s.len() <= IDENTIFIER_MAX_LEN
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn check_identifier(field: &'static str, value: &str, violations: &mut Vec<FieldViolation>) {
    if !is_valid_identifier(value) {
        violations.push(FieldViolation::new(
            field,
            format!(
                "must be 1-{IDENTIFIER_MAX_LEN} characters of letters, digits, '-' or '_'"
            ),
        ));
    }
}

fn check_title(title: &str, violations: &mut Vec<FieldViolation>) {
    if title.trim().is_empty() {
        violations.push(FieldViolation::new("title", "must not be empty"));
    } else if title.len() > TITLE_MAX_LEN {
        violations.push(FieldViolation::new(
            "title",
            format!("too long (max {TITLE_MAX_LEN} characters)"),
        ));
    }
}

fn check_ingredients(ingredients: &[String], violations: &mut Vec<FieldViolation>) {
    if ingredients.is_empty() {
        violations.push(FieldViolation::new(
            "ingredients",
            "at least one ingredient is required",
        ));
    }
    if ingredients.iter().any(|i| i.trim().is_empty()) {
        violations.push(FieldViolation::new(
            "ingredients",
            "ingredients must not be empty strings",
        ));
    }
}

fn check_instructions(instructions: &str, violations: &mut Vec<FieldViolation>) {
    if instructions.trim().is_empty() {
        violations.push(FieldViolation::new("instructions", "must not be empty"));
    }
}

fn check_display_name(display_name: &str, violations: &mut Vec<FieldViolation>) {
    if display_name.trim().is_empty() {
        violations.push(FieldViolation::new("displayName", "must not be empty"));
    } else if display_name.len() > DISPLAY_NAME_MAX_LEN {
        violations.push(FieldViolation::new(
            "displayName",
            format!("too long (max {DISPLAY_NAME_MAX_LEN} characters)"),
        ));
    }
}

fn finish(violations: Vec<FieldViolation>) -> Result<(), ValidationError> {
    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::new(violations))
    }
}

/// Validates a standalone username.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    let mut violations = Vec::new();
    check_identifier("username", username, &mut violations);
    finish(violations)
}

/// Validates a user creation request.
pub fn validate_new_user(user: &NewUser) -> Result<(), ValidationError> {
    let mut violations = Vec::new();
    check_identifier("username", &user.username, &mut violations);
    if let Some(display_name) = &user.display_name {
        check_display_name(display_name, &mut violations);
    }
    finish(violations)
}

/// Validates a user patch.
pub fn validate_user_patch(patch: &UserPatch) -> Result<(), ValidationError> {
    let mut violations = Vec::new();
    if let Some(display_name) = &patch.display_name {
        check_display_name(display_name, &mut violations);
    }
    finish(violations)
}

/// Validates a recipe creation request, owner included, so the caller gets
/// one combined list of violations.
pub fn validate_create_recipe(owner: &str, body: &NewRecipe) -> Result<(), ValidationError> {
    let mut violations = Vec::new();
    check_identifier("username", owner, &mut violations);
    if let Some(id) = &body.id {
        check_identifier("id", id, &mut violations);
    }
    check_title(&body.title, &mut violations);
    check_ingredients(&body.ingredients, &mut violations);
    check_instructions(&body.instructions, &mut violations);
    finish(violations)
}

/// Validates a recipe patch. Absent fields are not checked.
pub fn validate_recipe_patch(patch: &RecipePatch) -> Result<(), ValidationError> {
    let mut violations = Vec::new();
    if let Some(title) = &patch.title {
        check_title(title, &mut violations);
    }
    if let Some(ingredients) = &patch.ingredients {
        check_ingredients(ingredients, &mut violations);
    }
    if let Some(instructions) = &patch.instructions {
        check_instructions(instructions, &mut violations);
    }
    finish(violations)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_body() -> NewRecipe {
        NewRecipe {
            id: Some("pasta-carbonara".to_string()),
            title: "Pasta Carbonara".to_string(),
            ingredients: vec!["spaghetti".to_string(), "eggs".to_string()],
            instructions: "Boil pasta, mix with eggs and cheese.".to_string(),
        }
    }

    #[test]
    fn test_valid_usernames() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("bob_42").is_ok());
        assert!(validate_username("chef-jean").is_ok());
    }

    #[test]
    fn test_invalid_usernames() {
        assert!(validate_username("").is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username("émile").is_err());
        assert!(validate_username(&"x".repeat(65)).is_err());
    }

    #[test]
    fn test_valid_recipe_body() {
        assert!(validate_create_recipe("alice", &valid_body()).is_ok());
    }

    #[test]
    fn test_recipe_without_id_is_valid() {
        let mut body = valid_body();
        body.id = None;
        assert!(validate_create_recipe("alice", &body).is_ok());
    }

    #[test]
    fn test_empty_title_rejected() {
        let mut body = valid_body();
        body.title = "   ".to_string();
        let err = validate_create_recipe("alice", &body).unwrap_err();
        assert_eq!(err.violations.len(), 1);
        assert_eq!(err.violations[0].field, "title");
    }

    #[test]
    fn test_violations_are_collected_not_short_circuited() {
        let body = NewRecipe {
            id: Some("bad id!".to_string()),
            title: String::new(),
            ingredients: vec![],
            instructions: String::new(),
        };
        let err = validate_create_recipe("", &body).unwrap_err();
        let fields: Vec<_> = err.violations.iter().map(|v| v.field).collect();
        assert!(fields.contains(&"username"));
        assert!(fields.contains(&"id"));
        assert!(fields.contains(&"title"));
        assert!(fields.contains(&"ingredients"));
        assert!(fields.contains(&"instructions"));
    }

    #[test]
    fn test_empty_patch_is_valid() {
        assert!(validate_recipe_patch(&RecipePatch::default()).is_ok());
        assert!(validate_user_patch(&UserPatch::default()).is_ok());
    }

    #[test]
    fn test_patch_fields_are_checked_when_present() {
        let patch = RecipePatch {
            title: Some(String::new()),
            ingredients: Some(vec![String::new()]),
            instructions: None,
        };
        let err = validate_recipe_patch(&patch).unwrap_err();
        assert_eq!(err.violations.len(), 2);
    }

    #[test]
    fn test_new_user_display_name_checked() {
        let user = NewUser {
            username: "alice".to_string(),
            display_name: Some("  ".to_string()),
        };
        let err = validate_new_user(&user).unwrap_err();
        assert_eq!(err.violations[0].field, "displayName");
    }
}
