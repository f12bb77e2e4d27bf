//! Driving port for following and unfollowing authors.

use async_trait::async_trait;

use crate::domain::{AuthorWithRecipes, Error, UserId, Viewer};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubscriptionsCommand: Send + Sync {
    /// Follow `author`; `400` for self-follows and existing edges.
    async fn subscribe(
        &self,
        viewer: Viewer,
        author: UserId,
        recipes_limit: Option<u32>,
    ) -> Result<AuthorWithRecipes, Error>;

    /// Unfollow `author`; `400` when no edge exists.
    async fn unsubscribe(&self, viewer: Viewer, author: UserId) -> Result<(), Error>;
}
