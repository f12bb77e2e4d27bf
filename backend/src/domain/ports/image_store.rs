//! Port for stored image files.

use async_trait::async_trait;

use crate::domain::{Error, ImageFolder, ImageUpload};

use super::define_port_error;

define_port_error! {
    /// Errors raised by image store adapters.
    pub enum ImageStoreError {
        /// Filesystem operation failed.
        Io { message: String } => "image store failed: {message}",
    }
}

impl From<ImageStoreError> for Error {
    fn from(error: ImageStoreError) -> Self {
        Self::internal(error.to_string())
    }
}

/// File storage for recipe images and avatars.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Store `image` under `folder` with a fresh name; returns the relative path.
    async fn save(&self, folder: ImageFolder, image: &ImageUpload)
    -> Result<String, ImageStoreError>;

    /// Delete a stored file. A missing file is not an error.
    async fn remove(&self, path: &str) -> Result<(), ImageStoreError>;
}
