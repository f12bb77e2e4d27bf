//! Port for the ingredient reference table.

use async_trait::async_trait;

use crate::domain::{Error, Ingredient, IngredientFilter, IngredientId, NewIngredient};

use super::define_port_error;

define_port_error! {
    /// Errors raised by ingredient repository adapters.
    pub enum IngredientRepositoryError {
        Connection { message: String } => "ingredient repository connection failed: {message}",
        Query { message: String } => "ingredient repository query failed: {message}",
    }
}

impl From<IngredientRepositoryError> for Error {
    fn from(error: IngredientRepositoryError) -> Self {
        match error {
            IngredientRepositoryError::Connection { message } => {
                Self::service_unavailable(format!("ingredient repository unavailable: {message}"))
            }
            IngredientRepositoryError::Query { message } => {
                Self::internal(format!("ingredient repository error: {message}"))
            }
        }
    }
}

/// Read access to ingredients plus the insert used by the bulk loader.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IngredientRepository: Send + Sync {
    /// Ingredients matching `filter`, ordered by name.
    async fn list(
        &self,
        filter: &IngredientFilter,
    ) -> Result<Vec<Ingredient>, IngredientRepositoryError>;

    async fn find_by_id(
        &self,
        id: IngredientId,
    ) -> Result<Option<Ingredient>, IngredientRepositoryError>;

    /// Every ingredient in `ids` that exists.
    async fn find_many(
        &self,
        ids: &[IngredientId],
    ) -> Result<Vec<Ingredient>, IngredientRepositoryError>;

    /// Insert unless `(name, measurement_unit)` exists; `true` when a row was added.
    async fn insert_if_absent(
        &self,
        ingredient: &NewIngredient,
    ) -> Result<bool, IngredientRepositoryError>;
}
