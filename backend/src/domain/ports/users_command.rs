//! Driving port for account writes.

use async_trait::async_trait;

use crate::domain::{Error, ImageUpload, User, UserRegistration, Viewer};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersCommand: Send + Sync {
    /// Validate and create an account.
    async fn register(&self, registration: UserRegistration) -> Result<User, Error>;

    /// Store a new avatar, deleting the old file; returns the relative path.
    async fn set_avatar(&self, viewer: Viewer, image: ImageUpload) -> Result<String, Error>;

    /// Remove the avatar if there is one.
    async fn clear_avatar(&self, viewer: Viewer) -> Result<(), Error>;
}
