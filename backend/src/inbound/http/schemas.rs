//! OpenAPI-only schema definitions.
//!
//! Paginated envelopes are generic at runtime; these concrete mirrors give
//! each list endpoint a named schema. The recipe write body is decoded by
//! hand from JSON or multipart, so it is documented here too.

use utoipa::ToSchema;

use crate::inbound::http::dto::{RecipeResponse, SubscriptionResponse, UserResponse};

macro_rules! page_schema {
    ($name:ident, $item:ty, $doc:literal) => {
        #[doc = $doc]
        #[derive(ToSchema)]
        #[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
        pub struct $name {
            /// Number of rows across all pages.
            count: u64,
            /// Absolute link to the following page.
            next: Option<String>,
            /// Absolute link to the preceding page.
            previous: Option<String>,
            results: Vec<$item>,
        }
    };
}

page_schema!(UserPage, UserResponse, "One page of user profiles.");
page_schema!(RecipePage, RecipeResponse, "One page of recipes.");
page_schema!(
    SubscriptionPage,
    SubscriptionResponse,
    "One page of followed authors."
);

/// One `{id, amount}` entry of a recipe write.
#[derive(ToSchema)]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct IngredientAmountSchema {
    /// Ingredient id.
    id: i64,
    /// At least 1.
    amount: i64,
}

/// Recipe create and update body.
///
/// Multipart bodies carry the same fields as parts; `ingredients` is then a
/// JSON-encoded text part and `image` a file part.
#[derive(ToSchema)]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct RecipeWriteSchema {
    ingredients: Vec<IngredientAmountSchema>,
    /// Base64 data URI; optional on PATCH.
    #[schema(example = "data:image/png;base64,iVBORw0KGgo...")]
    image: String,
    #[schema(example = "Pancakes")]
    name: String,
    text: String,
    /// Minutes, at least 1.
    #[schema(example = 20)]
    cooking_time: i64,
}
