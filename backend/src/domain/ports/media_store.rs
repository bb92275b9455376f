//! Port for storing uploaded images.

use async_trait::async_trait;

use crate::domain::{ImageUpload, MediaFolder, MediaPath};

use super::define_port_error;

define_port_error! {
    /// Errors raised by media store adapters.
    pub enum MediaStoreError {
        /// Reading or writing the underlying storage failed.
        Io { message: String } => "media store I/O failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Persist `image` in `folder` and return its relative path. Storing the
    /// same bytes twice yields the same path.
    async fn store(
        &self,
        folder: MediaFolder,
        image: &ImageUpload,
    ) -> Result<MediaPath, MediaStoreError>;

    /// Read a stored file; `None` when it does not exist.
    async fn load(&self, path: &MediaPath) -> Result<Option<Vec<u8>>, MediaStoreError>;
}
