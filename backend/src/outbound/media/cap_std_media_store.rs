//! Filesystem media store rooted at a capability-scoped directory.
//!
//! All paths are resolved through a `cap_std::fs::Dir`, so a stored path can
//! never reach outside the media root.

use std::io;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};

use crate::TraceId;
use crate::domain::ports::{MediaStore, MediaStoreError};
use crate::domain::{ImageUpload, MediaFolder, MediaPath};

/// Media store writing content-addressed files below a root directory.
#[derive(Clone)]
pub struct CapStdMediaStore {
    root: Arc<Dir>,
}

impl CapStdMediaStore {
    /// Open (creating if needed) the media root.
    ///
    /// # Errors
    /// Returns the I/O error when the directory cannot be created or opened.
    pub fn open(root: impl AsRef<Path>) -> io::Result<Self> {
        let root = root.as_ref();
        Dir::create_ambient_dir_all(root, ambient_authority())?;
        let dir = Dir::open_ambient_dir(root, ambient_authority())?;
        Ok(Self {
            root: Arc::new(dir),
        })
    }
}

fn io_error(path: &str, error: &io::Error) -> MediaStoreError {
    MediaStoreError::io(format!("{path}: {error}"))
}

fn write_file(
    root: &Dir,
    folder: MediaFolder,
    image: &ImageUpload,
) -> Result<MediaPath, MediaStoreError> {
    let path = MediaPath::in_folder(folder, &image.file_name());
    root.create_dir_all(folder.as_dir())
        .map_err(|err| io_error(folder.as_dir(), &err))?;
    if root.exists(path.as_str()) {
        return Ok(path);
    }
    root.write(path.as_str(), image.bytes())
        .map_err(|err| io_error(path.as_str(), &err))?;
    Ok(path)
}

fn read_file(root: &Dir, path: &MediaPath) -> Result<Option<Vec<u8>>, MediaStoreError> {
    match root.read(path.as_str()) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) if err.kind() == io::ErrorKind::IsADirectory => Ok(None),
        Err(err) => Err(io_error(path.as_str(), &err)),
    }
}

#[async_trait]
impl MediaStore for CapStdMediaStore {
    async fn store(
        &self,
        folder: MediaFolder,
        image: &ImageUpload,
    ) -> Result<MediaPath, MediaStoreError> {
        let root = Arc::clone(&self.root);
        let image = image.clone();
        TraceId::in_blocking(move || write_file(&root, folder, &image))
            .await
            .map_err(|err| MediaStoreError::io(err.to_string()))?
    }

    async fn load(&self, path: &MediaPath) -> Result<Option<Vec<u8>>, MediaStoreError> {
        let root = Arc::clone(&self.root);
        let path = path.clone();
        TraceId::in_blocking(move || read_file(&root, &path))
            .await
            .map_err(|err| MediaStoreError::io(err.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn store_dir() -> (TempDir, CapStdMediaStore) {
        let temp = TempDir::new().expect("temp dir");
        let store = CapStdMediaStore::open(temp.path().join("media")).expect("open store");
        (temp, store)
    }

    fn png(payload: &str) -> ImageUpload {
        ImageUpload::from_data_uri(&format!("data:image/png;base64,{payload}")).expect("image")
    }

    #[rstest]
    #[tokio::test]
    async fn stores_content_addressed_files(store_dir: (TempDir, CapStdMediaStore)) {
        let (_temp, store) = store_dir;
        let image = png("aGVsbG8=");

        let first = store
            .store(MediaFolder::RecipeImages, &image)
            .await
            .expect("store");
        let second = store
            .store(MediaFolder::RecipeImages, &image)
            .await
            .expect("store again");

        assert_eq!(first, second);
        assert!(first.as_str().starts_with("recipes/images/"));
        assert!(first.as_str().ends_with(".png"));
        let bytes = store.load(&first).await.expect("load");
        assert_eq!(bytes.as_deref(), Some(&b"hello"[..]));
    }

    #[rstest]
    #[tokio::test]
    async fn missing_files_load_as_none(store_dir: (TempDir, CapStdMediaStore)) {
        let (_temp, store) = store_dir;
        let path = MediaPath::new("users/absent.png").expect("path");
        assert_eq!(store.load(&path).await.expect("load"), None);
    }
}
