//! Tests for the recipe service.

use std::sync::Arc;

use super::*;
use crate::domain::image::fixtures::GIF_BYTES;
use crate::domain::ports::{
    MockFollowRepository, MockImageStore, MockIngredientRepository, MockMembershipRepository,
    MockRecipeRepository, MockUserRepository, RecipeRepositoryError,
};
use crate::domain::{
    CartItem, ErrorCode, ImageUpload, Ingredient, IngredientAmountInput, Submitted, User,
};
use chrono::{Local, TimeZone};
use mockable::MockClock;
use rstest::rstest;
use serde_json::json;

const AUTHOR: UserId = UserId::new(1);
const STRANGER: UserId = UserId::new(2);
const STAFF: UserId = UserId::new(3);

#[derive(Default)]
struct Mocks {
    recipes: MockRecipeRepository,
    ingredients: MockIngredientRepository,
    users: MockUserRepository,
    follows: MockFollowRepository,
    memberships: MockMembershipRepository,
    images: MockImageStore,
}

impl Mocks {
    fn into_service(self) -> RecipesService {
        RecipesService::new(
            Arc::new(self.recipes),
            Arc::new(self.ingredients),
            Arc::new(self.users),
            Arc::new(self.follows),
            Arc::new(self.memberships),
            Arc::new(self.images),
        )
    }

    /// Users 1..=3 exist; user 3 is staff.
    fn with_users(mut self) -> Self {
        self.users
            .expect_find_by_id()
            .returning(|id| Ok((1..=3).contains(&id.get()).then(|| user(id))));
        self.users
            .expect_find_many()
            .returning(|ids| Ok(ids.iter().copied().map(user).collect()));
        self
    }

    /// Every ingredient id below 100 exists.
    fn with_ingredients(mut self) -> Self {
        self.ingredients.expect_find_many().returning(|ids| {
            Ok(ids
                .iter()
                .filter(|id| id.get() < 100)
                .map(|id| Ingredient {
                    id: *id,
                    name: format!("ingredient {id}"),
                    measurement_unit: "g".into(),
                })
                .collect())
        });
        self
    }

    /// View assembly lookups with no follows, lines, or memberships.
    fn with_view_lookups(mut self) -> Self {
        self.follows
            .expect_followed_among()
            .returning(|_, _| Ok(Vec::new()));
        self.recipes
            .expect_ingredient_lines()
            .returning(|_| Ok(Vec::new()));
        self.memberships
            .expect_contained()
            .returning(|_, _, _| Ok(Vec::new()));
        self
    }
}

fn user(id: UserId) -> User {
    User {
        id,
        email: format!("user{id}@example.com"),
        username: format!("user{id}"),
        first_name: "First".into(),
        last_name: "Last".into(),
        avatar: None,
        is_staff: id == STAFF,
    }
}

fn recipe(id: i64, author: UserId) -> Recipe {
    Recipe {
        id: RecipeId::new(id),
        author_id: author,
        name: "Omelette".into(),
        image: "recipes/images/old.gif".into(),
        text: "Whisk and fry.".into(),
        cooking_time: 10,
        pub_date: chrono::Utc::now(),
    }
}

fn input(ingredient: i64, with_image: bool) -> RecipeInput {
    RecipeInput {
        name: Some("Omelette".into()),
        text: Some("Whisk and fry.".into()),
        cooking_time: Some(Submitted::Value(10)),
        image: with_image.then(|| {
            Submitted::Value(ImageUpload::from_bytes(GIF_BYTES.to_vec()).expect("gif"))
        }),
        ingredients: Some(Submitted::Value(vec![IngredientAmountInput {
            id: Some(Submitted::Value(ingredient)),
            amount: Some(Submitted::Value(2)),
        }])),
    }
}

fn details_code(error: &Error) -> Option<serde_json::Value> {
    error.details().and_then(|details| details.get("code")).cloned()
}

#[tokio::test]
async fn create_requires_a_session() {
    let service = Mocks::default().into_service();
    let error = service
        .create(Viewer::Anonymous, input(1, true))
        .await
        .expect_err("anonymous");
    assert_eq!(error.code(), ErrorCode::Unauthorized);
}

#[tokio::test]
async fn create_rejects_unknown_ingredients_before_storing_image() {
    let mut mocks = Mocks::default().with_ingredients();
    mocks.images.expect_save().never();
    let service = mocks.into_service();

    let error = service
        .create(Viewer::User(AUTHOR), input(404, true))
        .await
        .expect_err("unknown ingredient");
    assert_eq!(
        error.details().and_then(|d| d.pointer("/fields/ingredients/0")),
        Some(&json!("Invalid pk \"404\" - object does not exist."))
    );
}

#[tokio::test]
async fn create_stores_image_and_returns_full_view() {
    let mut mocks = Mocks::default()
        .with_users()
        .with_ingredients()
        .with_view_lookups();
    mocks
        .images
        .expect_save()
        .withf(|folder, _| *folder == ImageFolder::RecipeImages)
        .return_once(|_, _| Ok("recipes/images/new.gif".into()));
    mocks
        .recipes
        .expect_create()
        .withf(|author, write| {
            *author == AUTHOR
                && write.image.as_deref() == Some("recipes/images/new.gif")
                && write.ingredients.len() == 1
        })
        .return_once(|author, write| {
            let mut created = recipe(5, author);
            created.image = write.image.clone().unwrap_or_default();
            Ok(created)
        });
    let service = mocks.into_service();

    let view = service
        .create(Viewer::User(AUTHOR), input(1, true))
        .await
        .expect("created");
    assert_eq!(view.id, RecipeId::new(5));
    assert_eq!(view.author.id, AUTHOR);
    assert_eq!(view.image, "recipes/images/new.gif");
    assert!(!view.is_favorited);
}

#[tokio::test]
async fn create_discards_image_when_insert_fails() {
    let mut mocks = Mocks::default().with_ingredients();
    mocks
        .images
        .expect_save()
        .return_once(|_, _| Ok("recipes/images/new.gif".into()));
    mocks
        .images
        .expect_remove()
        .withf(|path| path == "recipes/images/new.gif")
        .times(1)
        .return_once(|_| Ok(()));
    mocks
        .recipes
        .expect_create()
        .return_once(|_, _| Err(RecipeRepositoryError::query("constraint")));
    let service = mocks.into_service();

    let error = service
        .create(Viewer::User(AUTHOR), input(1, true))
        .await
        .expect_err("insert failed");
    assert_eq!(error.code(), ErrorCode::InternalError);
}

#[tokio::test]
async fn strangers_cannot_update() {
    let mut mocks = Mocks::default().with_users();
    mocks
        .recipes
        .expect_find_by_id()
        .returning(|id| Ok(Some(recipe(id.get(), AUTHOR))));
    mocks.recipes.expect_update().never();
    let service = mocks.into_service();

    let error = service
        .update(
            Viewer::User(STRANGER),
            RecipeId::new(5),
            input(1, true),
            WriteMode::Replace,
        )
        .await
        .expect_err("forbidden");
    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn replace_swaps_the_stored_image() {
    let mut mocks = Mocks::default()
        .with_users()
        .with_ingredients()
        .with_view_lookups();
    mocks
        .recipes
        .expect_find_by_id()
        .returning(|id| Ok(Some(recipe(id.get(), AUTHOR))));
    mocks
        .images
        .expect_save()
        .return_once(|_, _| Ok("recipes/images/new.gif".into()));
    mocks
        .images
        .expect_remove()
        .withf(|path| path == "recipes/images/old.gif")
        .times(1)
        .return_once(|_| Ok(()));
    mocks.recipes.expect_update().return_once(|id, write| {
        let mut updated = recipe(id.get(), AUTHOR);
        updated.image = write.image.clone().unwrap_or_default();
        Ok(updated)
    });
    let service = mocks.into_service();

    let view = service
        .update(
            Viewer::User(AUTHOR),
            RecipeId::new(5),
            input(1, true),
            WriteMode::Replace,
        )
        .await
        .expect("replaced");
    assert_eq!(view.image, "recipes/images/new.gif");
}

#[tokio::test]
async fn patch_without_image_keeps_the_stored_one() {
    let mut mocks = Mocks::default()
        .with_users()
        .with_ingredients()
        .with_view_lookups();
    mocks
        .recipes
        .expect_find_by_id()
        .returning(|id| Ok(Some(recipe(id.get(), AUTHOR))));
    mocks.images.expect_save().never();
    mocks.images.expect_remove().never();
    mocks
        .recipes
        .expect_update()
        .withf(|_, write| write.image.is_none())
        .return_once(|id, _| Ok(recipe(id.get(), AUTHOR)));
    let service = mocks.into_service();

    let view = service
        .update(
            Viewer::User(STAFF),
            RecipeId::new(5),
            input(1, false),
            WriteMode::Patch,
        )
        .await
        .expect("patched by staff");
    assert_eq!(view.image, "recipes/images/old.gif");
}

#[tokio::test]
async fn staff_delete_removes_the_image() {
    let mut mocks = Mocks::default().with_users();
    mocks
        .recipes
        .expect_find_by_id()
        .returning(|id| Ok(Some(recipe(id.get(), AUTHOR))));
    mocks.recipes.expect_delete().return_once(|_| Ok(true));
    mocks
        .images
        .expect_remove()
        .times(1)
        .return_once(|_| Ok(()));
    let service = mocks.into_service();

    service
        .delete(Viewer::User(STAFF), RecipeId::new(5))
        .await
        .expect("deleted");
}

#[rstest]
#[case(RecipeList::Favorites, "already_favorited")]
#[case(RecipeList::ShoppingCart, "already_in_shopping_cart")]
#[tokio::test]
async fn adding_twice_is_a_conflict(#[case] list: RecipeList, #[case] code: &str) {
    let mut mocks = Mocks::default();
    mocks
        .recipes
        .expect_find_by_id()
        .returning(|id| Ok(Some(recipe(id.get(), AUTHOR))));
    mocks
        .memberships
        .expect_add()
        .return_once(|_, _, _| Ok(false));
    let service = mocks.into_service();

    let error = service
        .add_to_list(Viewer::User(STRANGER), list, RecipeId::new(5))
        .await
        .expect_err("duplicate");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(details_code(&error), Some(json!(code)));
}

#[rstest]
#[case(RecipeList::Favorites, "not_favorited")]
#[case(RecipeList::ShoppingCart, "not_in_shopping_cart")]
#[tokio::test]
async fn removing_absent_membership_is_a_conflict(#[case] list: RecipeList, #[case] code: &str) {
    let mut mocks = Mocks::default();
    mocks
        .recipes
        .expect_find_by_id()
        .returning(|id| Ok(Some(recipe(id.get(), AUTHOR))));
    mocks
        .memberships
        .expect_remove()
        .return_once(|_, _, _| Ok(false));
    let service = mocks.into_service();

    let error = service
        .remove_from_list(Viewer::User(STRANGER), list, RecipeId::new(5))
        .await
        .expect_err("absent");
    assert_eq!(details_code(&error), Some(json!(code)));
}

#[tokio::test]
async fn adding_returns_the_minified_recipe() {
    let mut mocks = Mocks::default();
    mocks
        .recipes
        .expect_find_by_id()
        .returning(|id| Ok(Some(recipe(id.get(), AUTHOR))));
    mocks
        .memberships
        .expect_add()
        .withf(|list, user, id| {
            *list == RecipeList::Favorites && *user == STRANGER && *id == RecipeId::new(5)
        })
        .return_once(|_, _, _| Ok(true));
    let service = mocks.into_service();

    let summary = service
        .add_to_list(Viewer::User(STRANGER), RecipeList::Favorites, RecipeId::new(5))
        .await
        .expect("added");
    assert_eq!(summary, recipe(5, AUTHOR).summary());
}

#[tokio::test]
async fn empty_cart_cannot_be_downloaded() {
    let mut mocks = Mocks::default();
    mocks.recipes.expect_cart_items().return_once(|_| Ok(Vec::new()));
    let service = mocks.into_service();

    let error = service
        .shopping_list(Viewer::User(AUTHOR))
        .await
        .expect_err("empty");
    assert_eq!(details_code(&error), Some(json!("empty_shopping_cart")));
}

#[tokio::test]
async fn shopping_list_is_dated_by_the_clock() {
    let mut mocks = Mocks::default();
    mocks.recipes.expect_cart_items().return_once(|_| {
        Ok(vec![CartItem {
            recipe_id: RecipeId::new(1),
            recipe_name: "Omelette".into(),
            author_username: "alice".into(),
            ingredient_name: "eggs".into(),
            measurement_unit: "pcs".into(),
            amount: 2,
        }])
    });
    let mut clock = MockClock::new();
    clock.expect_local().returning(|| {
        Local
            .with_ymd_and_hms(2026, 10, 16, 12, 0, 0)
            .single()
            .expect("valid local time")
    });
    let service = mocks.into_service().with_clock(Arc::new(clock));

    let report = service
        .shopping_list(Viewer::User(AUTHOR))
        .await
        .expect("report");
    assert!(report.starts_with("Foodgram shopping list for 16.10.2026:"));
    assert!(report.contains("1. Eggs (pcs) — 2"));
}

#[tokio::test]
async fn unknown_author_filter_is_a_field_error() {
    let mocks = Mocks::default().with_users();
    let service = mocks.into_service();

    let params = RecipeListParams {
        author: Some("77".into()),
        ..RecipeListParams::default()
    };
    let error = service
        .list(Viewer::Anonymous, params, &PageRequest::default())
        .await
        .expect_err("unknown author");
    assert!(
        error
            .details()
            .and_then(|d| d.pointer("/fields/author"))
            .is_some()
    );
}

#[tokio::test]
async fn anonymous_listing_skips_membership_lookups() {
    let mut mocks = Mocks::default().with_users();
    mocks
        .recipes
        .expect_list()
        .return_once(|_, _| Ok(PageSlice::new(vec![recipe(1, AUTHOR), recipe(2, STRANGER)], 2)));
    mocks
        .recipes
        .expect_ingredient_lines()
        .return_once(|_| Ok(Vec::new()));
    mocks.memberships.expect_contained().never();
    mocks.follows.expect_followed_among().never();
    let service = mocks.into_service();

    let page = service
        .list(
            Viewer::Anonymous,
            RecipeListParams::default(),
            &PageRequest::default(),
        )
        .await
        .expect("list");
    assert_eq!(page.total, 2);
    assert!(page.items.iter().all(|view| !view.is_favorited && !view.author.is_subscribed));
}
