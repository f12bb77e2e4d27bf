//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API. It registers:
//!
//! - **Paths**: every handler of the inbound HTTP layer
//! - **Schemas**: response DTOs, the paginated envelopes, the hand-decoded
//!   recipe write body, and the error payload
//! - **Security**: Session cookie authentication scheme
//!
//! The generated specification is used by Swagger UI (debug builds) and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::dto::{
    AvatarResponse, IngredientResponse, RecipeIngredientResponse, RecipeMinifiedResponse,
    RecipeResponse, RegisteredUserResponse, ShortLinkResponse, SubscriptionResponse, UserResponse,
};
use crate::inbound::http::schemas::{
    IngredientAmountSchema, RecipePage, RecipeWriteSchema, SubscriptionPage, UserPage,
};
use crate::inbound::http::users::{AvatarRequest, LoginRequest, RegisterRequest};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Foodgram API",
        description = "Recipe sharing: users, subscriptions, ingredients, recipes, \
                       favourites, and shopping lists.",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0.html"
        )
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::users::register,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::set_avatar,
        crate::inbound::http::users::clear_avatar,
        crate::inbound::http::subscriptions::list_subscriptions,
        crate::inbound::http::subscriptions::subscribe,
        crate::inbound::http::subscriptions::unsubscribe,
        crate::inbound::http::ingredients::list_ingredients,
        crate::inbound::http::ingredients::get_ingredient,
        crate::inbound::http::recipes::list_recipes,
        crate::inbound::http::recipes::create_recipe,
        crate::inbound::http::recipes::get_recipe,
        crate::inbound::http::recipes::replace_recipe,
        crate::inbound::http::recipes::patch_recipe,
        crate::inbound::http::recipes::delete_recipe,
        crate::inbound::http::recipes::add_favorite,
        crate::inbound::http::recipes::remove_favorite,
        crate::inbound::http::recipes::add_to_shopping_cart,
        crate::inbound::http::recipes::remove_from_shopping_cart,
        crate::inbound::http::recipes::download_shopping_cart,
        crate::inbound::http::recipes::get_short_link,
        crate::inbound::http::short_links::follow_short_link,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        LoginRequest,
        RegisterRequest,
        AvatarRequest,
        UserResponse,
        RegisteredUserResponse,
        AvatarResponse,
        UserPage,
        SubscriptionResponse,
        SubscriptionPage,
        IngredientResponse,
        RecipeIngredientResponse,
        RecipeResponse,
        RecipeMinifiedResponse,
        RecipePage,
        RecipeWriteSchema,
        IngredientAmountSchema,
        ShortLinkResponse,
    )),
    tags(
        (name = "users", description = "Accounts, sessions, and avatars"),
        (name = "subscriptions", description = "Following other authors"),
        (name = "ingredients", description = "Read-only ingredient catalogue"),
        (name = "recipes", description = "Recipes, favourites, and the shopping cart"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
