//! Wire representations returned by the HTTP adapter.
//!
//! Domain read models stay free of serde and OpenAPI concerns; handlers
//! convert them here, turning stored media paths into absolute URLs.

use actix_web::HttpRequest;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{
    AuthorWithRecipes, Ingredient, RecipeIngredientLine, RecipeSummary, RecipeView, User,
    UserProfile,
};

const MEDIA_PREFIX: &str = "/media/";

/// Absolute URL builder for the request's scheme and host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOrigin {
    base: String,
}

impl RequestOrigin {
    /// Capture `scheme://host` from the connection info.
    pub fn of(req: &HttpRequest) -> Self {
        let info = req.connection_info();
        Self {
            base: format!("{}://{}", info.scheme(), info.host()),
        }
    }

    /// Absolute URL for a path on this server.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Absolute URL for a stored media file.
    pub fn media(&self, stored: &str) -> String {
        format!("{}{MEDIA_PREFIX}{}", self.base, stored.trim_start_matches('/'))
    }
}

/// Public user profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct UserResponse {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "alice@example.com")]
    pub email: String,
    #[schema(example = "alice")]
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    /// Whether the caller follows this user.
    pub is_subscribed: bool,
    /// Absolute avatar URL.
    pub avatar: Option<String>,
}

impl UserResponse {
    pub fn from_profile(profile: UserProfile, origin: &RequestOrigin) -> Self {
        Self {
            id: profile.id.get(),
            email: profile.email,
            username: profile.username,
            first_name: profile.first_name,
            last_name: profile.last_name,
            is_subscribed: profile.is_subscribed,
            avatar: profile.avatar.as_deref().map(|path| origin.media(path)),
        }
    }
}

/// Body of a successful registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct RegisteredUserResponse {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<User> for RegisteredUserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.get(),
            email: user.email,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
        }
    }
}

/// Stored avatar location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct AvatarResponse {
    pub avatar: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct IngredientResponse {
    pub id: i64,
    #[schema(example = "flour")]
    pub name: String,
    #[schema(example = "g")]
    pub measurement_unit: String,
}

impl From<Ingredient> for IngredientResponse {
    fn from(ingredient: Ingredient) -> Self {
        Self {
            id: ingredient.id.get(),
            name: ingredient.name,
            measurement_unit: ingredient.measurement_unit,
        }
    }
}

/// One ingredient line of a recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct RecipeIngredientResponse {
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

impl From<RecipeIngredientLine> for RecipeIngredientResponse {
    fn from(line: RecipeIngredientLine) -> Self {
        Self {
            id: line.id.get(),
            name: line.name,
            measurement_unit: line.measurement_unit,
            amount: line.amount,
        }
    }
}

/// Full recipe representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct RecipeResponse {
    pub id: i64,
    pub author: UserResponse,
    pub ingredients: Vec<RecipeIngredientResponse>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    /// Absolute image URL.
    pub image: String,
    pub text: String,
    /// Minutes.
    pub cooking_time: i32,
}

impl RecipeResponse {
    pub fn from_view(view: RecipeView, origin: &RequestOrigin) -> Self {
        Self {
            id: view.id.get(),
            author: UserResponse::from_profile(view.author, origin),
            ingredients: view.ingredients.into_iter().map(Into::into).collect(),
            is_favorited: view.is_favorited,
            is_in_shopping_cart: view.is_in_shopping_cart,
            name: view.name,
            image: origin.media(&view.image),
            text: view.text,
            cooking_time: view.cooking_time,
        }
    }
}

/// Minified recipe used by favorites, the cart, and subscriptions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct RecipeMinifiedResponse {
    pub id: i64,
    pub name: String,
    pub image: String,
    pub cooking_time: i32,
}

impl RecipeMinifiedResponse {
    pub fn from_summary(summary: RecipeSummary, origin: &RequestOrigin) -> Self {
        Self {
            id: summary.id.get(),
            name: summary.name,
            image: origin.media(&summary.image),
            cooking_time: summary.cooking_time,
        }
    }
}

/// Followed author with a preview of their recipes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct SubscriptionResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub recipes: Vec<RecipeMinifiedResponse>,
    pub recipes_count: u64,
}

impl SubscriptionResponse {
    pub fn from_author(author: AuthorWithRecipes, origin: &RequestOrigin) -> Self {
        Self {
            user: UserResponse::from_profile(author.profile, origin),
            recipes: author
                .recipes
                .into_iter()
                .map(|summary| RecipeMinifiedResponse::from_summary(summary, origin))
                .collect(),
            recipes_count: author.recipes_count,
        }
    }
}

/// Short link to a recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ShortLinkResponse {
    #[serde(rename = "short-link")]
    #[schema(rename = "short-link", example = "http://localhost/s/3/")]
    pub short_link: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RecipeId, UserId};
    use actix_web::test::TestRequest;
    use rstest::{fixture, rstest};
    use serde_json::json;

    #[fixture]
    fn origin() -> RequestOrigin {
        let req = TestRequest::default()
            .insert_header(("host", "food.example"))
            .to_http_request();
        RequestOrigin::of(&req)
    }

    fn profile() -> UserProfile {
        UserProfile {
            id: UserId::new(2),
            email: "bob@example.com".into(),
            username: "bob".into(),
            first_name: "Bob".into(),
            last_name: "Builder".into(),
            avatar: Some("users/avatars/a.png".into()),
            is_subscribed: true,
        }
    }

    #[rstest]
    fn media_paths_become_absolute(origin: RequestOrigin) {
        assert_eq!(
            origin.media("recipes/images/x.png"),
            "http://food.example/media/recipes/images/x.png"
        );
        assert_eq!(origin.url("/s/3/"), "http://food.example/s/3/");
    }

    #[rstest]
    fn subscription_flattens_profile(origin: RequestOrigin) {
        let author = AuthorWithRecipes {
            profile: profile(),
            recipes: vec![RecipeSummary {
                id: RecipeId::new(9),
                name: "Soup".into(),
                image: "recipes/images/s.png".into(),
                cooking_time: 30,
            }],
            recipes_count: 4,
        };

        let value = serde_json::to_value(SubscriptionResponse::from_author(author, &origin))
            .expect("serialises");
        assert_eq!(
            value,
            json!({
                "id": 2,
                "email": "bob@example.com",
                "username": "bob",
                "first_name": "Bob",
                "last_name": "Builder",
                "is_subscribed": true,
                "avatar": "http://food.example/media/users/avatars/a.png",
                "recipes": [{
                    "id": 9,
                    "name": "Soup",
                    "image": "http://food.example/media/recipes/images/s.png",
                    "cooking_time": 30
                }],
                "recipes_count": 4
            })
        );
    }

    #[rstest]
    fn short_link_uses_hyphenated_key() {
        let value = serde_json::to_value(ShortLinkResponse {
            short_link: "http://x/s/1/".into(),
        })
        .expect("serialises");
        assert_eq!(value, json!({"short-link": "http://x/s/1/"}));
    }
}
