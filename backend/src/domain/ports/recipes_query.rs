//! Driving port for recipe reads.

use async_trait::async_trait;
use pagination::{PageRequest, PageSlice};

use crate::domain::{Error, RecipeId, RecipeListParams, RecipeView, Viewer};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipesQuery: Send + Sync {
    /// One page of recipes filtered by `params`.
    async fn list(
        &self,
        viewer: Viewer,
        params: RecipeListParams,
        page: &PageRequest,
    ) -> Result<PageSlice<RecipeView>, Error>;

    /// A single recipe; `404` when unknown.
    async fn get(&self, viewer: Viewer, id: RecipeId) -> Result<RecipeView, Error>;

    /// `Ok(())` when the recipe exists, `404` otherwise.
    async fn ensure_exists(&self, id: RecipeId) -> Result<(), Error>;

    /// Rendered shopping-list report for the caller.
    async fn shopping_list(&self, viewer: Viewer) -> Result<String, Error>;
}
