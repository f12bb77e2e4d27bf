//! Builders wiring repositories into the domain services behind HTTP state.

use std::sync::Arc;

use actix_web::web;

use foodgram::domain::ports::{
    FollowRepository, ImageStore, IngredientRepository, MembershipRepository, RecipeRepository,
    UserRepository,
};
use foodgram::domain::{IngredientsService, RecipesService, SubscriptionsService, UsersService};
use foodgram::inbound::http::state::{HttpState, HttpStatePorts};
use foodgram::outbound::persistence::{
    DbPool, DieselFollowRepository, DieselIngredientRepository, DieselMembershipRepository,
    DieselRecipeRepository, DieselUserRepository,
};

/// Driven adapters shared by every service.
#[derive(Clone)]
pub(super) struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub follows: Arc<dyn FollowRepository>,
    pub ingredients: Arc<dyn IngredientRepository>,
    pub recipes: Arc<dyn RecipeRepository>,
    pub memberships: Arc<dyn MembershipRepository>,
    pub images: Arc<dyn ImageStore>,
}

impl Repositories {
    /// PostgreSQL-backed repositories over one pool.
    pub(super) fn diesel(pool: &DbPool, images: Arc<dyn ImageStore>) -> Self {
        Self {
            users: Arc::new(DieselUserRepository::new(pool.clone())),
            follows: Arc::new(DieselFollowRepository::new(pool.clone())),
            ingredients: Arc::new(DieselIngredientRepository::new(pool.clone())),
            recipes: Arc::new(DieselRecipeRepository::new(pool.clone())),
            memberships: Arc::new(DieselMembershipRepository::new(pool.clone())),
            images,
        }
    }
}

/// Build the shared HTTP state from the given repositories.
pub(super) fn build_http_state(repos: Repositories) -> web::Data<HttpState> {
    let Repositories {
        users,
        follows,
        ingredients,
        recipes,
        memberships,
        images,
    } = repos;

    let users_service = Arc::new(UsersService::new(
        users.clone(),
        follows.clone(),
        images.clone(),
    ));
    let recipes_service = Arc::new(RecipesService::new(
        recipes.clone(),
        ingredients.clone(),
        users.clone(),
        follows.clone(),
        memberships,
        images,
    ));
    let subscriptions = Arc::new(SubscriptionsService::new(users, follows, recipes));

    web::Data::new(HttpState::new(HttpStatePorts {
        login: users_service.clone(),
        users: users_service.clone(),
        users_command: users_service,
        ingredients: Arc::new(IngredientsService::new(ingredients)),
        recipes: recipes_service.clone(),
        recipes_command: recipes_service,
        subscriptions: subscriptions.clone(),
        subscriptions_command: subscriptions,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use foodgram::domain::{LoginCredentials, UserRegistration, Viewer};
    use foodgram::test_support::InMemoryStore;
    use pagination::PageRequest;

    fn in_memory(store: &InMemoryStore) -> Repositories {
        let shared = Arc::new(store.clone());
        Repositories {
            users: shared.clone(),
            follows: shared.clone(),
            ingredients: shared.clone(),
            recipes: shared.clone(),
            memberships: shared.clone(),
            images: shared,
        }
    }

    #[tokio::test]
    async fn services_share_the_given_repositories() {
        let store = InMemoryStore::default();
        let state = build_http_state(in_memory(&store));

        let registered = state
            .users_command
            .register(UserRegistration {
                email: Some("cook@example.com".into()),
                username: Some("cook".into()),
                first_name: Some("Ada".into()),
                last_name: Some("Cook".into()),
                password: Some("s3cret-pass".into()),
            })
            .await
            .expect("registration succeeds");

        let credentials =
            LoginCredentials::try_from_parts("cook@example.com", "s3cret-pass").expect("shape");
        let id = state
            .login
            .authenticate(&credentials)
            .await
            .expect("login succeeds");
        assert_eq!(id, registered.id);

        let listed = state
            .users
            .list(Viewer::User(id), &PageRequest::default())
            .await
            .expect("list users");
        assert_eq!(listed.total, 1);
    }

    #[tokio::test]
    async fn ingredients_come_from_the_shared_store() {
        let store = InMemoryStore::default();
        let flour = store.seed_ingredient("flour", "g");
        let state = build_http_state(in_memory(&store));

        let found = state.ingredients.get(flour).await.expect("ingredient");
        assert_eq!(found.name, "flour");
    }
}
