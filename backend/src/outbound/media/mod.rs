//! Image files under the media root.
//!
//! Every file operation goes through a capability-scoped `cap_std` directory,
//! so stored paths can never escape the media root.

use std::io;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{ImageStore, ImageStoreError};
use crate::domain::{ImageFolder, ImageUpload};

/// [`ImageStore`] writing files beneath a media root directory.
#[derive(Clone)]
pub struct CapStdImageStore {
    root: Arc<Dir>,
}

impl CapStdImageStore {
    /// Open `root`, creating it when missing.
    ///
    /// # Errors
    ///
    /// Returns the I/O error raised while creating or opening the directory.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use foodgram::outbound::media::CapStdImageStore;
    ///
    /// let root = std::env::temp_dir().join("foodgram-media-doc");
    /// let store = CapStdImageStore::open(&root)?;
    /// # let _ = store;
    /// # Ok::<(), std::io::Error>(())
    /// ```
    pub fn open(root: &Path) -> io::Result<Self> {
        Dir::create_ambient_dir_all(root, ambient_authority())?;
        let dir = Dir::open_ambient_dir(root, ambient_authority())?;
        Ok(Self {
            root: Arc::new(dir),
        })
    }
}

fn io_error(error: &io::Error) -> ImageStoreError {
    ImageStoreError::io(error.to_string())
}

fn save_blocking(root: &Dir, folder: ImageFolder, image: &ImageUpload) -> io::Result<String> {
    root.create_dir_all(folder.path())?;
    let path = format!(
        "{}/{}.{}",
        folder.path(),
        Uuid::new_v4().simple(),
        image.kind().extension()
    );
    root.write(&path, image.bytes())?;
    Ok(path)
}

fn remove_blocking(root: &Dir, path: &str) -> io::Result<()> {
    match root.remove_file(path) {
        Ok(()) => Ok(()),
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            debug!(path, "image already gone");
            Ok(())
        }
        Err(error) => Err(error),
    }
}

#[async_trait]
impl ImageStore for CapStdImageStore {
    async fn save(
        &self,
        folder: ImageFolder,
        image: &ImageUpload,
    ) -> Result<String, ImageStoreError> {
        let root = Arc::clone(&self.root);
        let image = image.clone();
        tokio::task::spawn_blocking(move || save_blocking(&root, folder, &image))
            .await
            .map_err(|err| ImageStoreError::io(err.to_string()))?
            .map_err(|err| io_error(&err))
    }

    async fn remove(&self, path: &str) -> Result<(), ImageStoreError> {
        let root = Arc::clone(&self.root);
        let path = path.to_owned();
        tokio::task::spawn_blocking(move || remove_blocking(&root, &path))
            .await
            .map_err(|err| ImageStoreError::io(err.to_string()))?
            .map_err(|err| io_error(&err))
    }
}
