//! Uploaded images: base64 decoding and format sniffing.
//!
//! Clients send images either as multipart file parts or as strings in the
//! `data:<mime>;base64,<payload>` form. Strings without the data-URI prefix
//! are decoded as raw base64. Only PNG, JPEG, GIF, and WebP payloads are
//! accepted; the format is taken from the leading magic bytes, never from the
//! declared MIME type.

use base64::Engine as _;
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};

/// Validation message for undecodable or unsupported images.
pub const INVALID_IMAGE: &str = "Upload a valid image.";

const DATA_URI_MARKER: &str = "data:";
const BASE64_MARKER: &str = ";base64,";

/// Error returned when a payload is not a supported image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Upload a valid image.")]
pub struct InvalidImage;

/// Supported image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Png,
    Jpeg,
    Gif,
    Webp,
}

impl ImageKind {
    /// Detect the format from magic bytes.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
            Some(Self::Png)
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(Self::Jpeg)
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            Some(Self::Gif)
        } else if bytes.len() >= 12
            && bytes.starts_with(b"RIFF")
            && bytes.get(8..12) == Some(b"WEBP".as_slice())
        {
            Some(Self::Webp)
        } else {
            None
        }
    }

    /// File extension used for stored files.
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Gif => "gif",
            Self::Webp => "webp",
        }
    }
}

/// Decoded image bytes with a known format.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    bytes: Vec<u8>,
    kind: ImageKind,
}

impl std::fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageUpload")
            .field("kind", &self.kind)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl ImageUpload {
    /// Accept raw bytes, e.g. from a multipart file part.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, InvalidImage> {
        let kind = ImageKind::sniff(&bytes).ok_or(InvalidImage)?;
        Ok(Self { bytes, kind })
    }

    /// Decode a base64 data URI, or raw base64 when no prefix is present.
    ///
    /// # Examples
    /// ```
    /// use foodgram::domain::{ImageKind, ImageUpload};
    ///
    /// let gif = "data:image/gif;base64,R0lGODlhAQABAAAAACw=";
    /// let image = ImageUpload::from_base64(gif).expect("gif payload");
    /// assert_eq!(image.kind(), ImageKind::Gif);
    /// ```
    pub fn from_base64(raw: &str) -> Result<Self, InvalidImage> {
        let payload = match raw.split_once(BASE64_MARKER) {
            Some((header, data)) if header.contains(DATA_URI_MARKER) => data,
            _ => raw,
        };
        let cleaned: String = payload.chars().filter(|ch| !ch.is_whitespace()).collect();
        if cleaned.is_empty() {
            return Err(InvalidImage);
        }
        let bytes = STANDARD
            .decode(&cleaned)
            .or_else(|_| STANDARD_NO_PAD.decode(cleaned.trim_end_matches('=')))
            .map_err(|_| InvalidImage)?;
        Self::from_bytes(bytes)
    }

    /// Detected format.
    pub fn kind(&self) -> ImageKind {
        self.kind
    }

    /// Raw file contents.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Storage area for an image, relative to the media root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFolder {
    RecipeImages,
    Avatars,
}

impl ImageFolder {
    /// Directory path relative to the media root.
    pub const fn path(self) -> &'static str {
        match self {
            Self::RecipeImages => "recipes/images",
            Self::Avatars => "users/avatars",
        }
    }
}
