//! File-backed predictors.
//!
//! Externally run models drop their raw output next to the image
//! (`photo.jpg.detections.json`, `photo.jpg.classifications.json`) and these
//! predictors read it back. A missing file makes the source unavailable for
//! that image.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use super::{LocalClassifier, ObjectDetector};
use crate::config::{ClassifierConfig, DetectorConfig};
use crate::error::{SourceError, SourceResult};
use crate::input::ImageHandle;
use crate::types::{ClassifierPrediction, Detection, Source};

fn sidecar_path(image: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(image.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

async fn read_sidecar<T: DeserializeOwned>(source: Source, path: &Path) -> SourceResult<T> {
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            SourceError::unavailable(source, format!("no output at {}", path.display()))
        } else {
            SourceError::unavailable(source, format!("cannot read {}: {e}", path.display()))
        }
    })?;

    serde_json::from_str(&content).map_err(|e| SourceError::Malformed {
        predictor: source,
        message: format!("{}: {e}", path.display()),
    })
}

/// Reads a JSON array of `Detection`s.
pub struct SidecarDetector {
    suffix: String,
}

impl SidecarDetector {
    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
        }
    }

    pub fn from_config(config: &DetectorConfig) -> Self {
        Self::new(config.sidecar_suffix.clone())
    }

    pub fn path_for(&self, image: &Path) -> PathBuf {
        sidecar_path(image, &self.suffix)
    }
}

#[async_trait]
impl ObjectDetector for SidecarDetector {
    fn name(&self) -> &str {
        "sidecar"
    }

    async fn detect(&self, image: &ImageHandle) -> SourceResult<Vec<Detection>> {
        read_sidecar(Source::ObjectDetector, &self.path_for(&image.path)).await
    }
}

/// Reads a JSON array of `{"className", "probability"}` objects.
pub struct SidecarClassifier {
    suffix: String,
}

impl SidecarClassifier {
    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
        }
    }

    pub fn from_config(config: &ClassifierConfig) -> Self {
        Self::new(config.sidecar_suffix.clone())
    }

    pub fn path_for(&self, image: &Path) -> PathBuf {
        sidecar_path(image, &self.suffix)
    }
}

#[async_trait]
impl LocalClassifier for SidecarClassifier {
    fn name(&self) -> &str {
        "sidecar"
    }

    async fn classify(&self, image: &ImageHandle) -> SourceResult<Vec<ClassifierPrediction>> {
        read_sidecar(Source::LocalClassifier, &self.path_for(&image.path)).await
    }
}
