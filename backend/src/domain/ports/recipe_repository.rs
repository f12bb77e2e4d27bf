//! Port for recipe rows and their ingredient lines.

use async_trait::async_trait;
use pagination::{PageRequest, PageSlice};

use crate::domain::{
    CartItem, Error, Recipe, RecipeId, RecipeIngredientLine, RecipeQuery, RecipeSummary,
    RecipeWrite, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by recipe repository adapters.
    pub enum RecipeRepositoryError {
        Connection { message: String } => "recipe repository connection failed: {message}",
        Query { message: String } => "recipe repository query failed: {message}",
    }
}

impl From<RecipeRepositoryError> for Error {
    fn from(error: RecipeRepositoryError) -> Self {
        match error {
            RecipeRepositoryError::Connection { message } => {
                Self::service_unavailable(format!("recipe repository unavailable: {message}"))
            }
            RecipeRepositoryError::Query { message } => {
                Self::internal(format!("recipe repository error: {message}"))
            }
        }
    }
}

/// Recipe persistence.
///
/// `create` and `update` write the recipe row and replace its ingredient
/// lines atomically; readers never observe a partially replaced set.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipeRepository: Send + Sync {
    /// Insert a recipe; `recipe.image` must be set.
    async fn create(
        &self,
        author: UserId,
        recipe: &RecipeWrite,
    ) -> Result<Recipe, RecipeRepositoryError>;

    /// Overwrite a recipe; a `None` image keeps the stored one.
    async fn update(
        &self,
        id: RecipeId,
        recipe: &RecipeWrite,
    ) -> Result<Recipe, RecipeRepositoryError>;

    /// Delete a recipe and, by cascade, its lines and memberships.
    async fn delete(&self, id: RecipeId) -> Result<bool, RecipeRepositoryError>;

    async fn find_by_id(&self, id: RecipeId) -> Result<Option<Recipe>, RecipeRepositoryError>;

    /// One page of recipes matching `query`.
    async fn list(
        &self,
        query: &RecipeQuery,
        page: &PageRequest,
    ) -> Result<PageSlice<Recipe>, RecipeRepositoryError>;

    /// Ingredient lines of every recipe in `ids`, ordered by ingredient name.
    async fn ingredient_lines(
        &self,
        ids: &[RecipeId],
    ) -> Result<Vec<(RecipeId, RecipeIngredientLine)>, RecipeRepositoryError>;

    /// Newest recipes by `author`, at most `limit` of them, with the total count.
    async fn by_author(
        &self,
        author: UserId,
        limit: Option<u32>,
    ) -> Result<PageSlice<RecipeSummary>, RecipeRepositoryError>;

    /// Ingredient lines of every recipe in `user`'s shopping cart.
    async fn cart_items(&self, user: UserId) -> Result<Vec<CartItem>, RecipeRepositoryError>;
}
