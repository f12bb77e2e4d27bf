//! Account services: login, registration, profiles, and avatars.

use std::sync::Arc;

use async_trait::async_trait;
use pagination::{PageRequest, PageSlice};

use crate::domain::ports::{
    FollowRepository, ImageStore, LoginService, UserRepository, UsersCommand, UsersQuery,
};
use crate::domain::service_support::{discard_image, profiles_for};
use crate::domain::{
    Error, ImageFolder, ImageUpload, LoginCredentials, User, UserId, UserProfile,
    UserRegistration, Viewer,
};

/// Message returned for unknown email/password pairs.
pub const INVALID_CREDENTIALS: &str = "Unable to log in with provided credentials.";

/// User service implementing the login, query, and command ports.
#[derive(Clone)]
pub struct UsersService {
    users: Arc<dyn UserRepository>,
    follows: Arc<dyn FollowRepository>,
    images: Arc<dyn ImageStore>,
}

impl UsersService {
    /// Create a new service with the given adapters.
    pub fn new(
        users: Arc<dyn UserRepository>,
        follows: Arc<dyn FollowRepository>,
        images: Arc<dyn ImageStore>,
    ) -> Self {
        Self {
            users,
            follows,
            images,
        }
    }

    async fn find(&self, id: UserId) -> Result<User, Error> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("user {id} not found")))
    }

    async fn profile_of(&self, viewer: Viewer, user: User) -> Result<UserProfile, Error> {
        profiles_for(self.follows.as_ref(), viewer, vec![user])
            .await?
            .pop()
            .ok_or_else(|| Error::internal("profile mapping dropped a user"))
    }
}

#[async_trait]
impl LoginService for UsersService {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error> {
        self.users
            .verify_credentials(credentials.email(), credentials.password())
            .await?
            .ok_or_else(|| Error::unauthorized(INVALID_CREDENTIALS))
    }
}

#[async_trait]
impl UsersQuery for UsersService {
    async fn list(
        &self,
        viewer: Viewer,
        page: &PageRequest,
    ) -> Result<PageSlice<UserProfile>, Error> {
        let slice = self.users.list(page).await?;
        let profiles = profiles_for(self.follows.as_ref(), viewer, slice.items).await?;
        Ok(PageSlice::new(profiles, slice.total))
    }

    async fn profile(&self, viewer: Viewer, id: UserId) -> Result<UserProfile, Error> {
        let user = self.find(id).await?;
        self.profile_of(viewer, user).await
    }

    async fn me(&self, viewer: Viewer) -> Result<UserProfile, Error> {
        let id = viewer.require()?;
        // A session may outlive its account.
        let user = self
            .users
            .find_by_id(id)
            .await?
            .ok_or_else(Error::not_authenticated)?;
        Ok(UserProfile::from_user(user, false))
    }
}

#[async_trait]
impl UsersCommand for UsersService {
    async fn register(&self, registration: UserRegistration) -> Result<User, Error> {
        let new_user = registration.validate()?;
        Ok(self.users.create(&new_user).await?)
    }

    async fn set_avatar(&self, viewer: Viewer, image: ImageUpload) -> Result<String, Error> {
        let id = viewer.require()?;
        let path = self.images.save(ImageFolder::Avatars, &image).await?;
        let previous = match self.users.set_avatar(id, Some(path.clone())).await {
            Ok(previous) => previous,
            Err(error) => {
                discard_image(self.images.as_ref(), &path).await;
                return Err(error.into());
            }
        };
        if let Some(previous) = previous {
            discard_image(self.images.as_ref(), &previous).await;
        }
        Ok(path)
    }

    async fn clear_avatar(&self, viewer: Viewer) -> Result<(), Error> {
        let id = viewer.require()?;
        if let Some(previous) = self.users.set_avatar(id, None).await? {
            discard_image(self.images.as_ref(), &previous).await;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "users_service_tests.rs"]
mod tests;
