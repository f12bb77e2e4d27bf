//! Port for the favourites and shopping-cart membership sets.

use async_trait::async_trait;

use crate::domain::{Error, RecipeId, UserId};

use super::define_port_error;

/// Per-user recipe set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecipeList {
    Favorites,
    ShoppingCart,
}

define_port_error! {
    /// Errors raised by membership repository adapters.
    pub enum MembershipRepositoryError {
        Connection { message: String } => "membership repository connection failed: {message}",
        Query { message: String } => "membership repository query failed: {message}",
    }
}

impl From<MembershipRepositoryError> for Error {
    fn from(error: MembershipRepositoryError) -> Self {
        match error {
            MembershipRepositoryError::Connection { message } => {
                Self::service_unavailable(format!("membership repository unavailable: {message}"))
            }
            MembershipRepositoryError::Query { message } => {
                Self::internal(format!("membership repository error: {message}"))
            }
        }
    }
}

/// Binary `(user, recipe)` membership in a [`RecipeList`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MembershipRepository: Send + Sync {
    /// Insert the pair; `false` when it was already present.
    async fn add(
        &self,
        list: RecipeList,
        user: UserId,
        recipe: RecipeId,
    ) -> Result<bool, MembershipRepositoryError>;

    /// Remove the pair; `false` when it was absent.
    async fn remove(
        &self,
        list: RecipeList,
        user: UserId,
        recipe: RecipeId,
    ) -> Result<bool, MembershipRepositoryError>;

    /// The subset of `recipes` present in `user`'s list.
    async fn contained(
        &self,
        list: RecipeList,
        user: UserId,
        recipes: &[RecipeId],
    ) -> Result<Vec<RecipeId>, MembershipRepositoryError>;
}
