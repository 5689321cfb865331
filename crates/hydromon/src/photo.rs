//! Photo attachment handling.
//!
//! Accepts either a binary file payload or a base64 data-URL payload,
//! enforces the image type allow-list and size cap, and stores accepted
//! photos under timestamp-prefixed names inside the upload directory.
//! The handler knows nothing about entries beyond bytes in, reference out.

use std::path::{Component, Path, PathBuf};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::Utc;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Default maximum decoded payload size in bytes.
pub const DEFAULT_MAX_PHOTO_BYTES: usize = 5_000_000;

/// The accepted image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageKind {
    /// JPEG (`image/jpeg`, `.jpg`/`.jpeg`).
    Jpeg,
    /// PNG (`image/png`, `.png`).
    Png,
    /// GIF (`image/gif`, `.gif`).
    Gif,
}

impl ImageKind {
    /// Map a declared MIME type onto the allow-list.
    #[must_use]
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/gif" => Some(Self::Gif),
            _ => None,
        }
    }

    /// Map a file extension (without the dot) onto the allow-list.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "gif" => Some(Self::Gif),
            _ => None,
        }
    }

    /// Canonical file extension for this format.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Gif => "gif",
        }
    }
}

/// A photo payload attached to an entry submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoPayload {
    /// A binary file with its original name and declared MIME type.
    File {
        /// Name the file was submitted under.
        filename: String,
        /// Declared MIME type.
        content_type: String,
        /// Raw file bytes.
        bytes: Vec<u8>,
    },
    /// A base64 data URL (`data:image/png;base64,...`).
    DataUrl(String),
}

/// A payload that passed the type and size policy.
#[derive(Debug)]
struct DecodedPhoto {
    kind: ImageKind,
    original_name: Option<String>,
    bytes: Vec<u8>,
}

/// Apply the type/size policy and decode the payload bytes.
fn decode_payload(payload: &PhotoPayload, max_bytes: usize) -> Result<DecodedPhoto> {
    match payload {
        PhotoPayload::File {
            filename,
            content_type,
            bytes,
        } => {
            let kind = ImageKind::from_mime(content_type).ok_or_else(|| {
                Error::upload(format!(
                    "unsupported image type '{content_type}' (allowed: jpeg, png, gif)"
                ))
            })?;

            Path::new(filename)
                .extension()
                .and_then(|ext| ext.to_str())
                .and_then(ImageKind::from_extension)
                .ok_or_else(|| {
                    Error::upload(format!(
                        "file '{filename}' does not have an allowed image extension"
                    ))
                })?;

            if bytes.len() > max_bytes {
                return Err(Error::upload(format!(
                    "payload of {} bytes exceeds the {max_bytes} byte limit",
                    bytes.len()
                )));
            }

            Ok(DecodedPhoto {
                kind,
                original_name: Some(sanitize_file_name(filename)),
                bytes: bytes.clone(),
            })
        }
        PhotoPayload::DataUrl(url) => {
            let (kind, encoded) = parse_data_url(url)?;
            let bytes = BASE64
                .decode(encoded)
                .map_err(|e| Error::upload(format!("invalid base64 payload: {e}")))?;

            if bytes.len() > max_bytes {
                return Err(Error::upload(format!(
                    "payload of {} bytes exceeds the {max_bytes} byte limit",
                    bytes.len()
                )));
            }

            Ok(DecodedPhoto {
                kind,
                original_name: None,
                bytes,
            })
        }
    }
}

/// Split a `data:image/<subtype>;base64,<payload>` URL into its parts.
fn parse_data_url(url: &str) -> Result<(ImageKind, &str)> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| Error::upload("payload is not a data URL"))?;

    let (mime, encoded) = rest
        .split_once(";base64,")
        .ok_or_else(|| Error::upload("data URL is missing a base64 payload"))?;

    let kind = ImageKind::from_mime(mime).ok_or_else(|| {
        Error::upload(format!(
            "unsupported image type '{mime}' (allowed: jpeg, png, gif)"
        ))
    })?;

    Ok((kind, encoded))
}

/// Reduce a submitted filename to a safe single-component name.
fn sanitize_file_name(raw: &str) -> String {
    let base = Path::new(raw)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("photo");

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.trim_matches(['_', '.']).is_empty() {
        "photo".to_string()
    } else {
        cleaned
    }
}

/// File store for accepted photos, rooted at the upload directory.
///
/// References handed out by [`PhotoStore::save`] are bare file names;
/// [`PhotoStore::remove`] refuses any reference that would resolve outside
/// the root.
#[derive(Debug)]
pub struct PhotoStore {
    /// Upload directory all photos live in.
    root: PathBuf,
    /// Maximum accepted decoded payload size.
    max_bytes: usize,
}

impl PhotoStore {
    /// Open a photo store rooted at the given directory, creating it if
    /// needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(root: impl AsRef<Path>, max_bytes: usize) -> Result<Self> {
        let root = root.as_ref().to_path_buf();

        if !root.exists() {
            std::fs::create_dir_all(&root).map_err(|source| Error::DirectoryCreate {
                path: root.clone(),
                source,
            })?;
        }

        Ok(Self { root, max_bytes })
    }

    /// The upload directory this store writes into.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Validate, decode, and store a photo payload.
    ///
    /// Returns the reference string the stored file is addressed by.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Upload`] if the payload violates the type/size
    /// policy or cannot be decoded, or an I/O error if the write fails.
    pub fn save(&self, payload: &PhotoPayload) -> Result<String> {
        let decoded = decode_payload(payload, self.max_bytes)?;

        let stamp = Utc::now().timestamp_millis();
        let base = match &decoded.original_name {
            Some(name) => format!("{stamp}-{name}"),
            None => format!("{stamp}.{}", decoded.kind.extension()),
        };

        let (reference, path) = self.place(&base);
        std::fs::write(&path, &decoded.bytes)?;

        info!("Stored photo {} ({} bytes)", reference, decoded.bytes.len());
        Ok(reference)
    }

    /// Delete a stored photo by reference.
    ///
    /// Idempotent: a missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Upload`] if the reference escapes the upload
    /// directory, or an I/O error if the removal fails for another reason.
    pub fn remove(&self, reference: &str) -> Result<()> {
        let path = self.resolve(reference)?;

        match std::fs::remove_file(&path) {
            Ok(()) => {
                debug!("Deleted photo {}", reference);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Check whether a reference currently resolves to a stored file.
    #[must_use]
    pub fn exists(&self, reference: &str) -> bool {
        self.resolve(reference).is_ok_and(|path| path.exists())
    }

    /// Resolve a reference against the root, refusing anything that is not
    /// a single normal path component.
    fn resolve(&self, reference: &str) -> Result<PathBuf> {
        let candidate = Path::new(reference);
        let mut components = candidate.components();

        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) if !reference.contains('\\') => {
                Ok(self.root.join(candidate))
            }
            _ => Err(Error::upload(format!(
                "photo reference '{reference}' escapes the upload directory"
            ))),
        }
    }

    /// Find an unused name for the given base, bumping a prefix on
    /// collision.
    fn place(&self, base: &str) -> (String, PathBuf) {
        let mut name = base.to_string();
        let mut path = self.root.join(&name);
        let mut attempt = 1;

        while path.exists() {
            name = format!("{attempt}-{base}");
            path = self.root.join(&name);
            attempt += 1;
        }

        (name, path)
    }
}
