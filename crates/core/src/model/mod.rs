mod error;
mod types;
mod validation;

pub use error::{FieldViolation, ValidationError};
pub use types::{Like, NewRecipe, NewUser, Recipe, RecipePatch, RecordType, User, UserPatch};
pub use validation::{
    validate_create_recipe, validate_new_user, validate_recipe_patch, validate_user_patch,
    validate_username,
};
