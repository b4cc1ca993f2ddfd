//! End-to-end fusion scenarios against mock predictors.

use async_trait::async_trait;
use vista_core::error::{SourceError, SourceResult};
use vista_core::types::{BackendAnalysis, SourceState};
use vista_core::{
    ClassifierPrediction, Config, Detection, FusionEngine, ImageHandle, LocalClassifier,
    ObjectDetector, RemoteBackend, Source, SourceOutputs,
};

fn engine() -> FusionEngine {
    FusionEngine::new(&Config::default())
}

fn outputs(json: &str) -> SourceOutputs {
    serde_json::from_str(json).unwrap()
}

#[test]
fn detector_label_suppresses_redundant_classifier_label() {
    let result = engine().fuse_outputs(&outputs(
        r#"{
            "detections": [{"class": "dog", "score": 0.9}],
            "classifications": [{"className": "dog", "probability": 0.4}]
        }"#,
    ));

    assert_eq!(result.len(), 1);
    let best = result.best().unwrap();
    assert_eq!(best.label, "dog");
    assert_eq!(best.source, Source::ObjectDetector);
    assert_eq!(best.priority, 1);
}

#[test]
fn backend_primary_and_alternatives() {
    let result = engine().fuse_outputs(&outputs(
        r#"{
            "backend": {
                "classification": {
                    "class": "cat",
                    "confidence": 0.5,
                    "top_predictions": [
                        {"class": "cat", "confidence": 0.5},
                        {"class": "kitten", "confidence": 0.2},
                        {"class": "feline", "confidence": 0.1}
                    ]
                }
            }
        }"#,
    ));

    assert_eq!(result.labels(), vec!["cat", "kitten"]);
    assert_eq!(result.predictions()[0].priority, 2);
    assert_eq!(result.predictions()[1].priority, 3);
    assert!((result.predictions()[1].confidence - 0.2).abs() < 1e-6);
}

#[test]
fn action_phrase_beats_keyword() {
    let result = engine().fuse_outputs(&outputs(
        r#"{"backend": {"description": "a woman with arms up celebrating"}}"#,
    ));

    assert_eq!(result.len(), 1);
    let p = result.best().unwrap();
    assert_eq!(p.label, "person celebrating");
    assert!((p.confidence - 0.85).abs() < 1e-6);
    assert_eq!(p.source, Source::SemanticText);
}

#[test]
fn denylisted_classifier_label_never_reaches_pool() {
    let result = engine().fuse_outputs(&outputs(
        r#"{"classifications": [{"className": "coho salmon", "probability": 0.3}]}"#,
    ));
    assert!(result.is_empty());
}

#[test]
fn full_pool_is_truncated_by_priority() {
    let result = engine().fuse_outputs(&outputs(
        r#"{
            "detections": [
                {"class": "person", "score": 0.95},
                {"class": "bicycle", "score": 0.8},
                {"class": "car", "score": 0.7}
            ],
            "backend": {
                "classification": {
                    "class": "mountain bike",
                    "confidence": 0.6,
                    "top_predictions": [
                        {"class": "mountain bike", "confidence": 0.6},
                        {"class": "unicycle", "confidence": 0.3}
                    ]
                },
                "description": "a man riding a bike"
            },
            "classifications": [{"className": "helmet", "probability": 0.7}]
        }"#,
    ));

    // detector keeps its top two; the semantic "person (man)" outranks the
    // backend primary on confidence; alternatives and classifier fall off
    assert_eq!(
        result.labels(),
        vec!["person", "bicycle", "person (man)", "mountain bike"]
    );
}

#[test]
fn blank_backend_class_neither_surfaces_nor_shadows_classifier() {
    let result = engine().fuse_outputs(&outputs(
        r#"{
            "backend": {
                "classification": {"class": "", "confidence": 0.6, "top_predictions": []}
            },
            "classifications": [{"className": "lamp", "probability": 0.5}]
        }"#,
    ));

    assert_eq!(result.labels(), vec!["lamp"]);
    assert!(result.predictions().iter().all(|p| !p.label.trim().is_empty()));
}

#[test]
fn oversized_max_results_is_rejected_at_load() {
    let err = Config::from_toml("[ranking]\nmax_results = 10").unwrap_err();
    assert!(err.to_string().contains("ranking.max_results"));
}

#[test]
fn result_is_capped_even_when_config_is_built_in_code() {
    let mut config = Config::default();
    config.ranking.max_results = 10;
    let result = FusionEngine::new(&config).fuse_outputs(&outputs(
        r#"{
            "detections": [
                {"class": "person", "score": 0.95},
                {"class": "dog", "score": 0.9}
            ],
            "backend": {
                "classification": {
                    "class": "sofa",
                    "confidence": 0.6,
                    "top_predictions": [
                        {"class": "sofa", "confidence": 0.6},
                        {"class": "couch", "confidence": 0.3},
                        {"class": "bench", "confidence": 0.2}
                    ]
                },
                "description": "a woman with arms up"
            },
            "classifications": [{"className": "lamp", "probability": 0.5}]
        }"#,
    ));
    assert_eq!(result.len(), 4);
}

struct DownDetector;
struct DownBackend;
struct DownClassifier;

#[async_trait]
impl ObjectDetector for DownDetector {
    fn name(&self) -> &str {
        "down"
    }

    async fn detect(&self, _image: &ImageHandle) -> SourceResult<Vec<Detection>> {
        Err(SourceError::unavailable(Source::ObjectDetector, "model failed to load"))
    }
}

#[async_trait]
impl RemoteBackend for DownBackend {
    fn name(&self) -> &str {
        "down"
    }

    async fn is_available(&self) -> bool {
        false
    }

    async fn analyze(&self, _image: &ImageHandle) -> SourceResult<BackendAnalysis> {
        Err(SourceError::unavailable(Source::RemoteBackend, "network down"))
    }
}

#[async_trait]
impl LocalClassifier for DownClassifier {
    fn name(&self) -> &str {
        "down"
    }

    async fn classify(&self, _image: &ImageHandle) -> SourceResult<Vec<ClassifierPrediction>> {
        Err(SourceError::Malformed {
            predictor: Source::LocalClassifier,
            message: "tensor shape mismatch".to_string(),
        })
    }
}

#[tokio::test]
async fn every_source_failing_yields_empty_result() {
    let engine = engine()
        .with_detector(Box::new(DownDetector))
        .with_backend(Box::new(DownBackend))
        .with_classifier(Box::new(DownClassifier));
    let image = ImageHandle::from_bytes("broken.jpg", vec![0xFF, 0xD8, 0xFF, 0xDB]);

    let report = engine.analyze(&image).await;

    assert!(report.labels.is_empty());
    assert!(report.description.is_none());
    assert_eq!(report.sources.len(), 3);
    assert!(report.sources.iter().all(|s| s.is_failed()));
    assert!(matches!(
        &report.sources[1].state,
        SourceState::Failed { error } if error.contains("network down")
    ));
}
