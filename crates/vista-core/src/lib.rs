//! Vista Core - multi-source image classification fusion.
//!
//! Vista asks several independent predictors about the same image and turns
//! their disagreeing answers into a short ranked list of labels, each with
//! provenance and confidence.
//!
//! # Architecture
//!
//! ```text
//!            ┌ ObjectDetector ──┐
//! Image ─────┼ RemoteBackend ───┼─→ adapters → dedup → rank → FusionResult
//!            └ LocalClassifier ─┘        ↑
//!                     backend description → semantic rules
//! ```
//!
//! Predictors run concurrently under per-source deadlines. A failing source
//! contributes nothing; fusion itself never fails.
//!
//! # Usage
//!
//! ```rust,ignore
//! use vista_core::{Config, FusionEngine, HttpBackend, ImageLoader, SidecarDetector};
//!
//! #[tokio::main]
//! async fn main() -> vista_core::Result<()> {
//!     let config = Config::load()?;
//!     let engine = FusionEngine::new(&config)
//!         .with_detector(Box::new(SidecarDetector::from_config(&config.detector)))
//!         .with_backend(Box::new(HttpBackend::from_config(&config.backend)));
//!
//!     let image = ImageLoader::new(&config).load("photo.jpg".as_ref()).await?;
//!     for p in engine.fuse(&image).await {
//!         println!("{} ({:.0}%, {})", p.label, p.confidence * 100.0, p.source);
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod fusion;
pub mod input;
pub mod output;
pub mod sources;
pub mod types;

pub use config::{Config, ConfidencePolicy};
pub use error::{ConfigError, InputError, Result, SourceError, SourceResult, VistaError};
pub use fusion::{FusionEngine, SemanticExtractor, ValidityFilter};
pub use input::{FileDiscovery, ImageHandle, ImageLoader};
pub use output::{OutputFormat, OutputWriter};
pub use sources::{
    HttpBackend, LocalClassifier, ObjectDetector, RemoteBackend, SidecarClassifier,
    SidecarDetector,
};
pub use types::{
    ClassifierPrediction, ConfidenceBand, Detection, FusionReport, FusionResult, Prediction,
    Source, SourceOutputs, SourceStatus,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
