//! Uploaded images and the relative paths they are stored under.
//!
//! Clients send images as base64 data URIs
//! (`data:image/<ext>;base64,<payload>`). Stored files are addressed by a
//! [`MediaPath`] relative to the media root, which the HTTP layer turns into
//! an absolute URL.

use std::fmt;
use std::sync::OnceLock;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use regex::Regex;
use sha2::{Digest, Sha256};

/// Image formats accepted for upload.
pub const ALLOWED_IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpeg", "jpg", "gif", "webp"];

/// Reasons an image payload is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageUploadError {
    #[error("image must not be empty")]
    Empty,
    #[error("image must be a base64 data URI")]
    NotADataUri,
    #[error("unsupported image type '{extension}'")]
    UnsupportedType { extension: String },
    #[error("image payload is not valid base64")]
    InvalidBase64,
}

/// Reasons a stored media path is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MediaPathError {
    #[error("media path must not be empty")]
    Empty,
    #[error("media path must be relative and free of parent segments")]
    Escapes,
}

static DATA_URI_RE: OnceLock<Regex> = OnceLock::new();

fn data_uri_regex() -> &'static Regex {
    DATA_URI_RE.get_or_init(|| {
        Regex::new(r"^data:image/(?P<ext>[A-Za-z0-9.+-]+);base64,(?P<data>.+)$")
            .unwrap_or_else(|error| panic!("data URI regex failed to compile: {error}"))
    })
}

/// Decoded image ready to be written to the media store.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    extension: String,
    bytes: Vec<u8>,
}

impl ImageUpload {
    /// Decode a `data:image/<ext>;base64,<payload>` URI.
    ///
    /// # Examples
    /// ```
    /// use foodgram::domain::ImageUpload;
    ///
    /// let image = ImageUpload::from_data_uri("data:image/png;base64,aGVsbG8=")
    ///     .expect("valid data URI");
    /// assert_eq!(image.extension(), "png");
    /// assert_eq!(image.bytes(), b"hello");
    /// ```
    pub fn from_data_uri(raw: &str) -> Result<Self, ImageUploadError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ImageUploadError::Empty);
        }
        let captures = data_uri_regex()
            .captures(trimmed)
            .ok_or(ImageUploadError::NotADataUri)?;
        let extension = captures
            .name("ext")
            .map(|m| m.as_str().to_ascii_lowercase())
            .ok_or(ImageUploadError::NotADataUri)?;
        if !ALLOWED_IMAGE_EXTENSIONS.contains(&extension.as_str()) {
            return Err(ImageUploadError::UnsupportedType { extension });
        }
        let payload = captures
            .name("data")
            .map(|m| m.as_str())
            .ok_or(ImageUploadError::NotADataUri)?;
        let bytes = STANDARD
            .decode(payload)
            .map_err(|_| ImageUploadError::InvalidBase64)?;
        if bytes.is_empty() {
            return Err(ImageUploadError::Empty);
        }
        Ok(Self { extension, bytes })
    }

    /// Lower-case file extension derived from the MIME subtype.
    #[must_use]
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Raw image bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Content-addressed file name: SHA-256 of the bytes plus the extension.
    #[must_use]
    pub fn file_name(&self) -> String {
        let digest = Sha256::digest(&self.bytes);
        format!("{}.{}", hex::encode(digest), self.extension)
    }
}

impl fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageUpload")
            .field("extension", &self.extension)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Directory an upload belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaFolder {
    Avatars,
    RecipeImages,
}

impl MediaFolder {
    /// Directory name below the media root.
    #[must_use]
    pub const fn as_dir(self) -> &'static str {
        match self {
            Self::Avatars => "users",
            Self::RecipeImages => "recipes/images",
        }
    }
}

/// Relative path of a stored media file, using `/` separators.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaPath(String);

impl MediaPath {
    /// Validate a relative media path.
    pub fn new(raw: impl Into<String>) -> Result<Self, MediaPathError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(MediaPathError::Empty);
        }
        if raw.starts_with('/')
            || raw.contains('\\')
            || raw.split('/').any(|segment| segment.is_empty() || segment == "..")
        {
            return Err(MediaPathError::Escapes);
        }
        Ok(Self(raw))
    }

    /// Path for `file_name` inside `folder`.
    #[must_use]
    pub fn in_folder(folder: MediaFolder, file_name: &str) -> Self {
        Self(format!("{}/{file_name}", folder.as_dir()))
    }

    /// Path as stored.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for MediaPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("data:image/JPEG;base64,aGVsbG8=", "jpeg")]
    #[case("data:image/webp;base64,aGVsbG8=", "webp")]
    fn decodes_supported_types(#[case] raw: &str, #[case] extension: &str) {
        let image = ImageUpload::from_data_uri(raw).expect("valid image");
        assert_eq!(image.extension(), extension);
    }

    #[rstest]
    #[case("", ImageUploadError::Empty)]
    #[case("aGVsbG8=", ImageUploadError::NotADataUri)]
    #[case("data:text/plain;base64,aGVsbG8=", ImageUploadError::NotADataUri)]
    #[case(
        "data:image/svg+xml;base64,aGVsbG8=",
        ImageUploadError::UnsupportedType { extension: "svg+xml".to_owned() }
    )]
    #[case("data:image/png;base64,***", ImageUploadError::InvalidBase64)]
    fn rejects_bad_payloads(#[case] raw: &str, #[case] expected: ImageUploadError) {
        assert_eq!(ImageUpload::from_data_uri(raw), Err(expected));
    }

    #[test]
    fn file_name_is_content_addressed() {
        let first = ImageUpload::from_data_uri("data:image/png;base64,aGVsbG8=").expect("image");
        let second = ImageUpload::from_data_uri("data:image/png;base64,aGVsbG8=").expect("image");
        assert_eq!(first.file_name(), second.file_name());
        assert!(first.file_name().ends_with(".png"));
        assert_eq!(first.file_name().len(), 64 + ".png".len());
    }

    #[rstest]
    #[case("recipes/images/a.png", true)]
    #[case("/etc/passwd", false)]
    #[case("users/../../secret", false)]
    #[case("users//a.png", false)]
    #[case("", false)]
    fn validates_media_paths(#[case] raw: &str, #[case] valid: bool) {
        assert_eq!(MediaPath::new(raw).is_ok(), valid);
    }
}
