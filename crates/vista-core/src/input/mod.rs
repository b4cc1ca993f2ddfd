//! Image input handling.
//!
//! Fusion never decodes pixels. This module only turns paths into opaque
//! `ImageHandle`s that predictors can consume:
//! - **discovery**: Find image files in directories
//! - **validate**: Size, extension and magic-byte checks
//! - **handle**: Load validated bytes into an `ImageHandle`

pub mod discovery;
pub mod handle;
pub mod validate;

pub use discovery::{DiscoveredFile, FileDiscovery};
pub use handle::{ImageHandle, ImageLoader};
pub use validate::{ImageKind, Validator};
