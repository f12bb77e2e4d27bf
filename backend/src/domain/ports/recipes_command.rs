//! Driving port for recipe writes and membership toggles.

use async_trait::async_trait;

use crate::domain::{Error, RecipeId, RecipeInput, RecipeSummary, RecipeView, Viewer, WriteMode};

use super::RecipeList;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipesCommand: Send + Sync {
    /// Publish a recipe authored by the caller.
    async fn create(&self, viewer: Viewer, input: RecipeInput) -> Result<RecipeView, Error>;

    /// Replace or patch a recipe; only its author or staff may do so.
    async fn update(
        &self,
        viewer: Viewer,
        id: RecipeId,
        input: RecipeInput,
        mode: WriteMode,
    ) -> Result<RecipeView, Error>;

    /// Delete a recipe; only its author or staff may do so.
    async fn delete(&self, viewer: Viewer, id: RecipeId) -> Result<(), Error>;

    /// Add to favourites or the cart; `400` when already present.
    async fn add_to_list(
        &self,
        viewer: Viewer,
        list: RecipeList,
        id: RecipeId,
    ) -> Result<RecipeSummary, Error>;

    /// Remove from favourites or the cart; `400` when absent.
    async fn remove_from_list(
        &self,
        viewer: Viewer,
        list: RecipeList,
        id: RecipeId,
    ) -> Result<(), Error>;
}
