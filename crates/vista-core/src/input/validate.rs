//! Input validation before an image is handed to predictors.

use std::path::Path;

use crate::config::{InputConfig, LimitsConfig};
use crate::error::InputError;

/// Image container detected from magic bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    Gif,
    Webp,
    Bmp,
}

impl ImageKind {
    /// MIME type sent along with multipart uploads.
    pub fn media_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
            Self::Webp => "image/webp",
            Self::Bmp => "image/bmp",
        }
    }

    /// Identify the container from the first bytes of a file.
    pub fn sniff(header: &[u8]) -> Option<Self> {
        if header.len() < 4 {
            return None;
        }

        // JPEG: FF D8 FF
        if header.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }

        // PNG: 89 50 4E 47
        if header.starts_with(&[0x89, b'P', b'N', b'G']) {
            return Some(Self::Png);
        }

        // GIF: GIF8
        if header.starts_with(b"GIF8") {
            return Some(Self::Gif);
        }

        // WebP: RIFF....WEBP
        if header.starts_with(b"RIFF") && header.len() >= 12 && &header[8..12] == b"WEBP" {
            return Some(Self::Webp);
        }

        // BMP: BM
        if header.starts_with(b"BM") {
            return Some(Self::Bmp);
        }

        None
    }
}

/// Validates files before they are read in full.
pub struct Validator {
    input: InputConfig,
    limits: LimitsConfig,
}

impl Validator {
    pub fn new(input: InputConfig, limits: LimitsConfig) -> Self {
        Self { input, limits }
    }

    /// Cheap checks that need only filesystem metadata.
    ///
    /// Checks:
    /// - File exists
    /// - Extension is in the supported list
    /// - File size is within limits
    pub fn validate(&self, path: &Path) -> Result<u64, InputError> {
        if !path.exists() {
            return Err(InputError::FileNotFound(path.to_path_buf()));
        }

        if !self.is_supported(path) {
            let format = path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("none")
                .to_string();
            return Err(InputError::UnsupportedFormat {
                path: path.to_path_buf(),
                format,
            });
        }

        let metadata = std::fs::metadata(path).map_err(|e| InputError::Read {
            path: path.to_path_buf(),
            message: format!("Cannot read metadata: {e}"),
        })?;

        let max_bytes = self.limits.max_file_size_mb.saturating_mul(1024 * 1024);
        if metadata.len() > max_bytes {
            return Err(InputError::FileTooLarge {
                path: path.to_path_buf(),
                size_mb: metadata.len() / (1024 * 1024),
                max_mb: self.limits.max_file_size_mb,
            });
        }

        Ok(metadata.len())
    }

    /// Check that loaded bytes are an image container we know.
    pub fn check_content(&self, path: &Path, bytes: &[u8]) -> Result<ImageKind, InputError> {
        if bytes.len() < 4 {
            return Err(InputError::InvalidImage {
                path: path.to_path_buf(),
                message: "File too small to be a valid image".to_string(),
            });
        }
        ImageKind::sniff(bytes).ok_or_else(|| InputError::InvalidImage {
            path: path.to_path_buf(),
            message: "Unrecognized image format (invalid magic bytes)".to_string(),
        })
    }

    /// Check if a file has a supported extension.
    pub fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                self.input
                    .supported_formats
                    .iter()
                    .any(|fmt| fmt.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }
}
