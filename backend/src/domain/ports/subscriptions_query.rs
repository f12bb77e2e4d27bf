//! Driving port for listing followed authors.

use async_trait::async_trait;
use pagination::{PageRequest, PageSlice};

use crate::domain::{AuthorWithRecipes, Error, Viewer};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubscriptionsQuery: Send + Sync {
    /// Followed authors, each with up to `recipes_limit` recipes.
    async fn list(
        &self,
        viewer: Viewer,
        page: &PageRequest,
        recipes_limit: Option<u32>,
    ) -> Result<PageSlice<AuthorWithRecipes>, Error>;
}
