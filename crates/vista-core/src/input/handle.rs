//! Opaque image handles consumed by predictors.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Config;
use crate::error::InputError;

use super::validate::{ImageKind, Validator};

/// A validated image, held as raw bytes.
///
/// Cheap to clone: the bytes are shared. Nothing in the engine decodes them;
/// predictors decide what to do with the handle.
#[derive(Debug, Clone)]
pub struct ImageHandle {
    /// Path the image was loaded from
    pub path: PathBuf,
    /// Just the filename portion
    pub file_name: String,
    /// Original file bytes
    pub bytes: Arc<[u8]>,
    /// Container detected from magic bytes
    pub kind: ImageKind,
    /// BLAKE3 hash of the bytes
    pub content_hash: String,
}

impl ImageHandle {
    /// Build a handle from bytes already in memory.
    ///
    /// Falls back to JPEG when the container is not recognized, which keeps
    /// tests and in-memory callers simple; use `ImageLoader` for files.
    pub fn from_bytes(path: impl Into<PathBuf>, bytes: Vec<u8>) -> Self {
        let path = path.into();
        let kind = ImageKind::sniff(&bytes).unwrap_or(ImageKind::Jpeg);
        let file_name = file_name_of(&path);
        let content_hash = blake3::hash(&bytes).to_hex().to_string();
        Self {
            path,
            file_name,
            bytes: Arc::from(bytes),
            kind,
            content_hash,
        }
    }

    pub fn media_type(&self) -> &'static str {
        self.kind.media_type()
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown")
        .to_string()
}

/// Loads files into `ImageHandle`s after validation.
pub struct ImageLoader {
    validator: Validator,
}

impl ImageLoader {
    pub fn new(config: &Config) -> Self {
        Self {
            validator: Validator::new(config.input.clone(), config.limits.clone()),
        }
    }

    /// The validator used for extension checks (shared with discovery).
    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    /// Validate and read one image file.
    pub async fn load(&self, path: &Path) -> Result<ImageHandle, InputError> {
        self.validator.validate(path)?;

        let bytes = tokio::fs::read(path).await.map_err(|e| InputError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let kind = self.validator.check_content(path, &bytes)?;
        let content_hash = blake3::hash(&bytes).to_hex().to_string();

        tracing::trace!(
            "Loaded {:?} ({} bytes, {})",
            path,
            bytes.len(),
            kind.media_type()
        );

        Ok(ImageHandle {
            path: path.to_path_buf(),
            file_name: file_name_of(path),
            bytes: Arc::from(bytes),
            kind,
            content_hash,
        })
    }
}
