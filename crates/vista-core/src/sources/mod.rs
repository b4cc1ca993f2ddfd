//! Prediction sources and their adapters.
//!
//! Each predictor is a black box behind an async trait; the adapters turn its
//! raw output into `Prediction`s tagged with source and priority:
//! - **detector**: object detector output, priority 1
//! - **backend**: remote backend classification, priority 2 and 3
//! - **classifier**: local fallback classifier, priority 4, validity-filtered
//! - **http**: `RemoteBackend` over HTTP multipart
//! - **sidecar**: file-backed detector and classifier

pub mod backend;
pub mod classifier;
pub mod detector;
pub mod http;
pub mod sidecar;

pub use http::HttpBackend;
pub use sidecar::{SidecarClassifier, SidecarDetector};

use async_trait::async_trait;

use crate::error::SourceResult;
use crate::input::ImageHandle;
use crate::types::{BackendAnalysis, ClassifierPrediction, Detection};

/// Local object detector (label + score + box).
///
/// Uses `async_trait` so engines can hold `Box<dyn ObjectDetector>`.
#[async_trait]
pub trait ObjectDetector: Send + Sync {
    /// Name for logging (e.g., "coco-ssd", "sidecar").
    fn name(&self) -> &str;

    /// Run detection on one image.
    async fn detect(&self, image: &ImageHandle) -> SourceResult<Vec<Detection>>;
}

/// Local fallback classifier (class name + probability).
#[async_trait]
pub trait LocalClassifier: Send + Sync {
    fn name(&self) -> &str;

    /// Classify one image; predictions are expected best-first but need not be.
    async fn classify(&self, image: &ImageHandle) -> SourceResult<Vec<ClassifierPrediction>>;
}

/// Remote vision backend returning a classification and a scene description.
#[async_trait]
pub trait RemoteBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Check whether the backend is reachable and healthy.
    async fn is_available(&self) -> bool;

    /// Send the image and return the validated response.
    async fn analyze(&self, image: &ImageHandle) -> SourceResult<BackendAnalysis>;
}
