//! Entity-oriented access facade.
//!
//! Every operation validates its input first, derives physical keys, runs
//! against the table store, and decodes raw items back into domain
//! entities. Results use the closed `ServiceError` taxonomy; store fault
//! details never reach callers.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use recipeshare_core::model::{
    validate_create_recipe, validate_new_user, validate_recipe_patch, validate_user_patch,
    validate_username, Like, NewRecipe, NewUser, Recipe, RecipePatch, RecordType, User, UserPatch,
};
use recipeshare_core::storage::{
    codec, keys, CancellationCode, IndexQuery, Page, PageToken, ServiceError, StoreError,
    TableStore, UpdateAction, WriteCondition, WriteOp,
};

const ENTITY_USER: &str = "User";
const ENTITY_RECIPE: &str = "Recipe";
const ENTITY_LIKE: &str = "Like";

/// Which recipes a listing covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListScope {
    /// Every recipe, in `createdAt` ascending order, via the
    /// record-type index.
    All,
    /// One user's recipes, via a main-table prefix query.
    User(String),
}

/// The access facade over the single-table store.
///
/// Stateless apart from the shared store handle; cloning is cheap and
/// clones operate on the same table.
#[derive(Clone)]
pub struct RecipeService {
    store: Arc<dyn TableStore>,
}

impl RecipeService {
    pub fn new(store: Arc<dyn TableStore>) -> Self {
        Self { store }
    }

    // ========================================================================
    // Users
    // ========================================================================

    /// Creates a user. Fails with `Conflict` if the username is taken.
    pub async fn create_user(&self, new_user: NewUser) -> Result<User, ServiceError> {
        validate_new_user(&new_user)?;

        let user = User {
            username: new_user.username,
            display_name: new_user.display_name,
            created_at: Utc::now(),
            extra: BTreeMap::new(),
        };
        let item = codec::encode_user(&user)?;
        self.store
            .put(item, WriteCondition::MustNotExist)
            .await
            .map_err(|e| conflict_if_condition_failed(e, ENTITY_USER, user.username.clone()))?;

        debug!(username = %user.username, "created user");
        Ok(user)
    }

    /// Fetches a user by username.
    pub async fn get_user(&self, username: &str) -> Result<User, ServiceError> {
        let key = keys::user_key(username)?;
        match self.store.get(&key).await? {
            Some(item) => Ok(codec::decode_user(&item)?),
            None => Err(not_found(ENTITY_USER, username)),
        }
    }

    /// Applies a patch to a user as a whole-item replace.
    pub async fn update_user(
        &self,
        username: &str,
        patch: UserPatch,
    ) -> Result<User, ServiceError> {
        validate_user_patch(&patch)?;

        let mut user = self.get_user(username).await?;
        if let Some(display_name) = patch.display_name {
            user.display_name = Some(display_name);
        }

        let item = codec::encode_user(&user)?;
        self.store
            .put(item, WriteCondition::MustExist)
            .await
            .map_err(|e| not_found_if_condition_failed(e, ENTITY_USER, username))?;
        Ok(user)
    }

    /// Deletes a user. Idempotent: deleting an absent user succeeds.
    pub async fn delete_user(&self, username: &str) -> Result<(), ServiceError> {
        let key = keys::user_key(username)?;
        self.store.delete(&key).await?;
        debug!(username, "deleted user");
        Ok(())
    }

    // ========================================================================
    // Recipes
    // ========================================================================

    /// Creates a recipe under the given owner, generating an id when the
    /// body does not supply one. Fails with `Conflict` on a duplicate id.
    pub async fn create_recipe(
        &self,
        username: &str,
        body: NewRecipe,
    ) -> Result<Recipe, ServiceError> {
        validate_create_recipe(username, &body)?;

        let recipe = Recipe {
            owner: username.to_string(),
            id: body.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            title: body.title,
            ingredients: body.ingredients,
            instructions: body.instructions,
            like_count: 0,
            created_at: Utc::now(),
            extra: BTreeMap::new(),
        };
        let item = codec::encode_recipe(&recipe)?;
        self.store
            .put(item, WriteCondition::MustNotExist)
            .await
            .map_err(|e| conflict_if_condition_failed(e, ENTITY_RECIPE, recipe.id.clone()))?;

        debug!(owner = username, id = %recipe.id, "created recipe");
        Ok(recipe)
    }

    /// Fetches a recipe by owner and id.
    pub async fn get_recipe(&self, username: &str, id: &str) -> Result<Recipe, ServiceError> {
        let key = keys::recipe_key(username, id)?;
        match self.store.get(&key).await? {
            Some(item) => Ok(codec::decode_recipe(&item)?),
            None => Err(not_found(ENTITY_RECIPE, id)),
        }
    }

    /// Applies a patch to a recipe as a whole-item replace.
    ///
    /// `like_count` and `created_at` are carried forward from the stored
    /// item; the counter is only ever changed by the like transaction.
    pub async fn update_recipe(
        &self,
        username: &str,
        id: &str,
        patch: RecipePatch,
    ) -> Result<Recipe, ServiceError> {
        validate_recipe_patch(&patch)?;

        let mut recipe = self.get_recipe(username, id).await?;
        if let Some(title) = patch.title {
            recipe.title = title;
        }
        if let Some(ingredients) = patch.ingredients {
            recipe.ingredients = ingredients;
        }
        if let Some(instructions) = patch.instructions {
            recipe.instructions = instructions;
        }

        let item = codec::encode_recipe(&recipe)?;
        self.store
            .put(item, WriteCondition::MustExist)
            .await
            .map_err(|e| not_found_if_condition_failed(e, ENTITY_RECIPE, id))?;
        Ok(recipe)
    }

    /// Deletes a recipe. Idempotent.
    ///
    /// Likes of the recipe are left in place; the store performs no
    /// cascading deletes.
    pub async fn delete_recipe(&self, username: &str, id: &str) -> Result<(), ServiceError> {
        let key = keys::recipe_key(username, id)?;
        self.store.delete(&key).await?;
        debug!(owner = username, id, "deleted recipe");
        Ok(())
    }

    /// Lists recipes within a scope, one page at a time. The continuation
    /// token is opaque; pass it back unmodified to resume.
    pub async fn list_recipes(
        &self,
        scope: ListScope,
        limit: Option<u32>,
        token: Option<PageToken>,
    ) -> Result<Page<Recipe>, ServiceError> {
        let query = match &scope {
            ListScope::All => IndexQuery::ByRecordType {
                record_type: RecordType::Recipe,
            },
            ListScope::User(username) => IndexQuery::PartitionPrefix {
                pk: keys::user_pk(username)?,
                sk_prefix: keys::recipe_sk_prefix().to_string(),
            },
        };

        let raw = self.store.query(query, limit, token).await?;
        let items = raw
            .items
            .iter()
            .map(codec::decode_recipe)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page {
            items,
            next: raw.next,
        })
    }

    /// Finds a recipe by id alone, without knowing the owner, through the
    /// index-by-sort-key.
    pub async fn find_recipe(&self, recipe_id: &str) -> Result<Recipe, ServiceError> {
        let query = IndexQuery::BySortKey {
            sk: keys::recipe_sk(recipe_id)?,
        };
        let raw = self.store.query(query, Some(1), None).await?;
        match raw.items.first() {
            Some(item) => Ok(codec::decode_recipe(item)?),
            None => Err(not_found(ENTITY_RECIPE, recipe_id)),
        }
    }

    // ========================================================================
    // Likes
    // ========================================================================

    /// Likes a recipe: one transaction that increments the recipe's
    /// `likeCount` by exactly 1 and inserts the Like item. A reader never
    /// observes one without the other.
    pub async fn like_recipe(&self, recipe_id: &str, username: &str) -> Result<(), ServiceError> {
        validate_username(username)?;

        // The Like key carries no owner, so the owning partition is
        // resolved through the index first. The transaction re-checks
        // existence, closing the race with a concurrent delete.
        let recipe = self.find_recipe(recipe_id).await?;
        let recipe_key = keys::recipe_key(&recipe.owner, recipe_id)?;

        let like = Like {
            recipe_id: recipe_id.to_string(),
            username: username.to_string(),
            created_at: Utc::now(),
        };
        let like_item = codec::encode_like(&like)?;

        // Positional: reason 0 is the recipe increment, reason 1 the like
        // insert. The error mapping below depends on this order.
        let ops = vec![
            WriteOp::Update {
                key: recipe_key,
                action: UpdateAction::Increment {
                    attribute: codec::ATTR_LIKE_COUNT,
                    by: 1,
                },
                condition: WriteCondition::MustExist,
            },
            WriteOp::Put {
                item: like_item,
                condition: WriteCondition::MustNotExist,
            },
        ];

        match self.store.transact_write(ops).await {
            Ok(()) => {
                debug!(recipe_id, username, "liked recipe");
                Ok(())
            }
            Err(StoreError::TransactionAborted { reasons }) => {
                if reasons.first() == Some(&CancellationCode::ConditionFailed) {
                    Err(not_found(ENTITY_RECIPE, recipe_id))
                } else if reasons.get(1) == Some(&CancellationCode::ConditionFailed) {
                    Err(ServiceError::Conflict {
                        entity: ENTITY_LIKE,
                        id: format!("{recipe_id}:{username}"),
                    })
                } else {
                    Err(ServiceError::TransactionAborted)
                }
            }
            Err(other) => Err(other.into()),
        }
    }

    /// Fetches one like.
    pub async fn get_like(&self, recipe_id: &str, username: &str) -> Result<Like, ServiceError> {
        let key = keys::like_key(recipe_id, username)?;
        match self.store.get(&key).await? {
            Some(item) => Ok(codec::decode_like(&item)?),
            None => Err(not_found(
                ENTITY_LIKE,
                format!("{recipe_id}:{username}"),
            )),
        }
    }

    /// Lists every like of a recipe, oldest username-order first.
    pub async fn list_likes(&self, recipe_id: &str) -> Result<Vec<Like>, ServiceError> {
        let query = IndexQuery::PartitionPrefix {
            pk: keys::like_pk(recipe_id)?,
            sk_prefix: keys::like_sk_prefix().to_string(),
        };
        let raw = self.store.query(query, None, None).await?;
        raw.items
            .iter()
            .map(|item| codec::decode_like(item).map_err(ServiceError::from))
            .collect()
    }
}

fn not_found(entity: &'static str, id: impl Into<String>) -> ServiceError {
    ServiceError::NotFound {
        entity,
        id: id.into(),
    }
}

fn conflict_if_condition_failed(
    err: StoreError,
    entity: &'static str,
    id: String,
) -> ServiceError {
    match err {
        StoreError::ConditionFailed { .. } => ServiceError::Conflict { entity, id },
        other => other.into(),
    }
}

fn not_found_if_condition_failed(
    err: StoreError,
    entity: &'static str,
    id: &str,
) -> ServiceError {
    match err {
        StoreError::ConditionFailed { .. } => not_found(entity, id),
        other => other.into(),
    }
}

#[cfg(all(test, feature = "inmemory"))]
mod tests {
    use super::*;
    use crate::storage::inmemory::InMemoryTableStore;
    use recipeshare_core::model::ValidationError;

    fn service() -> RecipeService {
        RecipeService::new(Arc::new(InMemoryTableStore::new()))
    }

    fn recipe_body(id: &str) -> NewRecipe {
        NewRecipe {
            id: Some(id.to_string()),
            title: "Pasta Carbonara".to_string(),
            ingredients: vec!["spaghetti".to_string(), "eggs".to_string()],
            instructions: "Boil pasta, mix with eggs and cheese.".to_string(),
        }
    }

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            display_name: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_user() {
        let service = service();
        let created = service.create_user(new_user("alice")).await.unwrap();
        let fetched = service.get_user("alice").await.unwrap();
        assert_eq!(created, fetched);
    }

    #[tokio::test]
    async fn test_duplicate_user_is_conflict() {
        let service = service();
        service.create_user(new_user("alice")).await.unwrap();
        let err = service.create_user(new_user("alice")).await.unwrap_err();
        assert_eq!(
            err,
            ServiceError::Conflict {
                entity: "User",
                id: "alice".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_update_user_display_name() {
        let service = service();
        service.create_user(new_user("alice")).await.unwrap();
        let updated = service
            .update_user(
                "alice",
                UserPatch {
                    display_name: Some("Alice".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.display_name.as_deref(), Some("Alice"));
        assert_eq!(service.get_user("alice").await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_update_missing_user_is_not_found() {
        let service = service();
        let err = service
            .update_user("ghost", UserPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { entity: "User", .. }));
    }

    #[tokio::test]
    async fn test_delete_user_is_idempotent() {
        let service = service();
        service.create_user(new_user("alice")).await.unwrap();
        service.delete_user("alice").await.unwrap();
        service.delete_user("alice").await.unwrap();
        assert!(service.get_user("alice").await.is_err());
    }

    #[tokio::test]
    async fn test_get_recipe_never_created_is_not_found() {
        let service = service();
        let err = service.get_recipe("alice", "nope").await.unwrap_err();
        assert_eq!(
            err,
            ServiceError::NotFound {
                entity: "Recipe",
                id: "nope".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_create_recipe_generates_id_when_absent() {
        let service = service();
        let mut body = recipe_body("ignored");
        body.id = None;
        let recipe = service.create_recipe("alice", body).await.unwrap();
        assert!(!recipe.id.is_empty());
        assert_eq!(recipe.like_count, 0);
        assert_eq!(
            service.get_recipe("alice", &recipe.id).await.unwrap(),
            recipe
        );
    }

    #[tokio::test]
    async fn test_invalid_recipe_causes_zero_writes() {
        let service = service();
        let body = NewRecipe {
            id: Some("r1".to_string()),
            title: String::new(),
            ingredients: vec![],
            instructions: String::new(),
        };
        let err = service.create_recipe("alice", body).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        // Nothing reached the store.
        let err = service.get_recipe("alice", "r1").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_empty_username_is_validation_not_storage() {
        let service = service();
        let err = service.get_user("").await.unwrap_err();
        assert_eq!(
            err,
            ServiceError::Validation(ValidationError::single("username", "must not be empty"))
        );
    }

    #[tokio::test]
    async fn test_update_recipe_preserves_like_count_and_created_at() {
        let service = service();
        service
            .create_recipe("alice", recipe_body("r1"))
            .await
            .unwrap();
        service.like_recipe("r1", "bob").await.unwrap();

        let updated = service
            .update_recipe(
                "alice",
                "r1",
                RecipePatch {
                    title: Some("Better Carbonara".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.title, "Better Carbonara");
        assert_eq!(updated.like_count, 1);

        let fetched = service.get_recipe("alice", "r1").await.unwrap();
        assert_eq!(fetched, updated);
    }

    #[tokio::test]
    async fn test_like_scenario() {
        let service = service();
        service.create_user(new_user("alice")).await.unwrap();
        let recipe = service
            .create_recipe("alice", recipe_body("r1"))
            .await
            .unwrap();
        assert_eq!(recipe.like_count, 0);

        service.like_recipe("r1", "bob").await.unwrap();
        assert_eq!(
            service.get_recipe("alice", "r1").await.unwrap().like_count,
            1
        );

        let err = service.like_recipe("r1", "bob").await.unwrap_err();
        assert_eq!(
            err,
            ServiceError::Conflict {
                entity: "Like",
                id: "r1:bob".to_string()
            }
        );
        assert_eq!(
            service.get_recipe("alice", "r1").await.unwrap().like_count,
            1
        );
    }

    #[tokio::test]
    async fn test_like_missing_recipe_is_not_found() {
        let service = service();
        let err = service.like_recipe("nope", "bob").await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::NotFound {
                entity: "Recipe",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_concurrent_likes_count_exactly() {
        let service = service();
        service
            .create_recipe("alice", recipe_body("r1"))
            .await
            .unwrap();

        let mut handles = Vec::new();
        for i in 0..8 {
            let service = service.clone();
            handles.push(tokio::spawn(async move {
                service.like_recipe("r1", &format!("user{i}")).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(
            service.get_recipe("alice", "r1").await.unwrap().like_count,
            8
        );
        assert_eq!(service.list_likes("r1").await.unwrap().len(), 8);
    }

    #[tokio::test]
    async fn test_get_like_after_liking() {
        let service = service();
        service
            .create_recipe("alice", recipe_body("r1"))
            .await
            .unwrap();
        assert!(service.get_like("r1", "bob").await.is_err());

        service.like_recipe("r1", "bob").await.unwrap();
        let like = service.get_like("r1", "bob").await.unwrap();
        assert_eq!(like.recipe_id, "r1");
        assert_eq!(like.username, "bob");
    }

    #[tokio::test]
    async fn test_find_recipe_without_owner() {
        let service = service();
        service
            .create_recipe("alice", recipe_body("r1"))
            .await
            .unwrap();
        let found = service.find_recipe("r1").await.unwrap();
        assert_eq!(found.owner, "alice");

        assert!(matches!(
            service.find_recipe("nope").await.unwrap_err(),
            ServiceError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_delete_recipe_leaves_likes_behind() {
        let service = service();
        service
            .create_recipe("alice", recipe_body("r1"))
            .await
            .unwrap();
        service.like_recipe("r1", "bob").await.unwrap();

        service.delete_recipe("alice", "r1").await.unwrap();
        assert!(service.get_recipe("alice", "r1").await.is_err());

        // No cascading delete: the like record survives its recipe.
        assert_eq!(service.list_likes("r1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_list_recipes_for_user() {
        let service = service();
        for id in ["r1", "r2", "r3"] {
            service
                .create_recipe("alice", recipe_body(id))
                .await
                .unwrap();
        }
        service
            .create_recipe("bob", recipe_body("r9"))
            .await
            .unwrap();

        let page = service
            .list_recipes(ListScope::User("alice".to_string()), None, None)
            .await
            .unwrap();
        assert_eq!(page.items.len(), 3);
        assert!(page.items.iter().all(|r| r.owner == "alice"));
    }

    #[tokio::test]
    async fn test_list_all_is_chronological_and_resumable() {
        let service = service();
        for (owner, id) in [
            ("alice", "r1"),
            ("bob", "r2"),
            ("alice", "r3"),
            ("carol", "r4"),
            ("bob", "r5"),
        ] {
            service.create_recipe(owner, recipe_body(id)).await.unwrap();
            // Distinct createdAt timestamps keep the expected order
            // unambiguous.
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }

        let full = service
            .list_recipes(ListScope::All, None, None)
            .await
            .unwrap();
        assert_eq!(full.next, None);
        let ids: Vec<_> = full.items.iter().map(|r| r.id.clone()).collect();
        assert_eq!(ids, vec!["r1", "r2", "r3", "r4", "r5"]);
        assert!(full
            .items
            .windows(2)
            .all(|w| w[0].created_at <= w[1].created_at));

        // Concatenating pages yields the same sequence as one fetch.
        let mut paged = Vec::new();
        let mut token = None;
        loop {
            let page = service
                .list_recipes(ListScope::All, Some(2), token)
                .await
                .unwrap();
            paged.extend(page.items);
            match page.next {
                Some(next) => token = Some(next),
                None => break,
            }
        }
        assert_eq!(paged, full.items);
    }
}
