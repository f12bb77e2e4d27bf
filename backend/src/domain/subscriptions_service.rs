//! Follow edges between users.

use std::sync::Arc;

use async_trait::async_trait;
use pagination::{PageRequest, PageSlice};

use crate::domain::ports::{
    FollowRepository, RecipeRepository, SubscriptionsCommand, SubscriptionsQuery, UserRepository,
};
use crate::domain::{AuthorWithRecipes, Error, User, UserId, UserProfile, Viewer};

/// Subscription service implementing the subscription query and command ports.
#[derive(Clone)]
pub struct SubscriptionsService {
    users: Arc<dyn UserRepository>,
    follows: Arc<dyn FollowRepository>,
    recipes: Arc<dyn RecipeRepository>,
}

fn self_subscription() -> Error {
    Error::conflict_with_code("You cannot subscribe to yourself.", "self_subscription")
}

impl SubscriptionsService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        follows: Arc<dyn FollowRepository>,
        recipes: Arc<dyn RecipeRepository>,
    ) -> Self {
        Self {
            users,
            follows,
            recipes,
        }
    }

    /// Load the author and reject self-follows.
    async fn author(&self, follower: UserId, author: UserId) -> Result<User, Error> {
        let user = self
            .users
            .find_by_id(author)
            .await?
            .ok_or_else(|| Error::not_found(format!("user {author} not found")))?;
        if user.id == follower {
            return Err(self_subscription());
        }
        Ok(user)
    }

    async fn with_recipes(
        &self,
        author: User,
        recipes_limit: Option<u32>,
    ) -> Result<AuthorWithRecipes, Error> {
        let recipes = self.recipes.by_author(author.id, recipes_limit).await?;
        Ok(AuthorWithRecipes {
            profile: UserProfile::from_user(author, true),
            recipes: recipes.items,
            recipes_count: recipes.total,
        })
    }
}

#[async_trait]
impl SubscriptionsQuery for SubscriptionsService {
    async fn list(
        &self,
        viewer: Viewer,
        page: &PageRequest,
        recipes_limit: Option<u32>,
    ) -> Result<PageSlice<AuthorWithRecipes>, Error> {
        let follower = viewer.require()?;
        let authors = self.follows.followed_authors(follower, page).await?;
        let mut items = Vec::with_capacity(authors.items.len());
        for author in authors.items {
            items.push(self.with_recipes(author, recipes_limit).await?);
        }
        Ok(PageSlice::new(items, authors.total))
    }
}

#[async_trait]
impl SubscriptionsCommand for SubscriptionsService {
    async fn subscribe(
        &self,
        viewer: Viewer,
        author: UserId,
        recipes_limit: Option<u32>,
    ) -> Result<AuthorWithRecipes, Error> {
        let follower = viewer.require()?;
        let author = self.author(follower, author).await?;
        if !self.follows.follow(follower, author.id).await? {
            return Err(Error::conflict_with_code(
                "You are already subscribed to this user.",
                "already_subscribed",
            ));
        }
        self.with_recipes(author, recipes_limit).await
    }

    async fn unsubscribe(&self, viewer: Viewer, author: UserId) -> Result<(), Error> {
        let follower = viewer.require()?;
        let author = self.author(follower, author).await?;
        if !self.follows.unfollow(follower, author.id).await? {
            return Err(Error::conflict_with_code(
                "You were not subscribed to this user.",
                "not_subscribed",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "subscriptions_service_tests.rs"]
mod tests;
