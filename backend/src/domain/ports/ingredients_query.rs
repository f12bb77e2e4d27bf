//! Driving port for ingredient lookups.

use async_trait::async_trait;

use crate::domain::{Error, Ingredient, IngredientFilter, IngredientId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IngredientsQuery: Send + Sync {
    /// Every ingredient matching `filter`, unpaginated.
    async fn list(&self, filter: IngredientFilter) -> Result<Vec<Ingredient>, Error>;

    /// A single ingredient; `404` when unknown.
    async fn get(&self, id: IngredientId) -> Result<Ingredient, Error>;
}
