//! Domain primitives, aggregates, ports, and services.
//!
//! Purpose: define strongly typed entities and the use-cases that operate on
//! them, independent of HTTP and SQL. Inbound adapters call the driving ports
//! in [`ports`]; outbound adapters implement the driven ones.
//!
//! Public surface:
//! - [`Error`] and [`ErrorCode`]: the single error payload.
//! - Users, ingredients, recipes, and their read models.
//! - [`ShoppingList`]: cart aggregation and the text report.
//! - Services implementing the driving ports.

pub mod error;
pub mod image;
pub mod ingredient;
pub mod ports;
pub mod recipe;
pub mod recipe_query;
pub mod shopping_list;
pub mod trace_id;
pub mod user;
pub mod validation;
pub mod viewer;

mod ingredient_import_service;
mod ingredients_service;
mod recipes_service;
mod service_support;
mod subscriptions_service;
mod users_service;

pub use self::error::{Error, ErrorCode};
pub use self::image::{ImageFolder, ImageKind, ImageUpload, InvalidImage};
pub use self::ingredient::{Ingredient, IngredientFilter, IngredientId, NewIngredient};
pub use self::ingredient_import_service::IngredientImportService;
pub use self::ingredients_service::IngredientsService;
pub use self::recipe::{
    IngredientAmount, IngredientAmountInput, Recipe, RecipeDraft, RecipeId, RecipeIngredientLine,
    RecipeInput, RecipeSummary, RecipeView, RecipeWrite, Submitted, WriteMode,
};
pub use self::recipe_query::{MembershipFilter, RecipeListParams, RecipeOrdering, RecipeQuery};
pub use self::recipes_service::RecipesService;
pub use self::shopping_list::{CartItem, CartRecipe, ProductTotal, ShoppingList};
pub use self::subscriptions_service::SubscriptionsService;
pub use self::trace_id::TraceId;
pub use self::user::{
    AuthorWithRecipes, LoginCredentials, NewUser, User, UserId, UserProfile, UserRegistration,
};
pub use self::users_service::UsersService;
pub use self::validation::{FIELD_REQUIRED, FieldErrors};
pub use self::viewer::Viewer;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use foodgram::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
