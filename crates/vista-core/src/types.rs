//! Core data types for the Vista fusion engine.
//!
//! Raw predictor outputs come in on one side (`Detection`,
//! `ClassifierPrediction`, `BackendAnalysis`), normalized `Prediction`s go out
//! on the other, wrapped in a `FusionResult`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Priority of the remote backend's secondary ("alternative") predictions.
pub const ALTERNATIVE_PRIORITY: u8 = 3;

/// Hard cap on the length of a `FusionResult`.
pub const MAX_RESULTS: usize = 4;

/// Originating predictor of a `Prediction`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    ObjectDetector,
    RemoteBackend,
    SemanticText,
    LocalClassifier,
}

impl Source {
    /// Default trust ranking; lower is preferred.
    ///
    /// The remote backend's secondary predictions use `ALTERNATIVE_PRIORITY`
    /// instead.
    pub fn priority(self) -> u8 {
        match self {
            Source::ObjectDetector => 1,
            Source::RemoteBackend | Source::SemanticText => 2,
            Source::LocalClassifier => 4,
        }
    }

    /// Human-readable name for logs and summaries.
    pub fn display_name(self) -> &'static str {
        match self {
            Source::ObjectDetector => "object detector",
            Source::RemoteBackend => "remote backend",
            Source::SemanticText => "semantic text",
            Source::LocalClassifier => "local classifier",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Coarse confidence grading used by presentation layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceBand {
    High,
    Medium,
    Low,
    VeryLow,
}

impl ConfidenceBand {
    pub fn of(confidence: f32) -> Self {
        if confidence > 0.7 {
            Self::High
        } else if confidence > 0.5 {
            Self::Medium
        } else if confidence > 0.3 {
            Self::Low
        } else {
            Self::VeryLow
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::VeryLow => "very low",
        }
    }
}

impl fmt::Display for ConfidenceBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single label guess with provenance.
///
/// Immutable once created; `priority` is derived from `source` (and, for the
/// remote backend, from whether it is the primary or an alternative class).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Free-form label (vocabulary differs per source)
    pub label: String,

    /// Probability-like score in [0, 1], not calibrated across sources
    pub confidence: f32,

    /// Which predictor produced it
    pub source: Source,

    /// Trust ranking, lower is preferred
    pub priority: u8,

    /// Human-readable rationale
    pub description: String,
}

impl Prediction {
    /// Create a prediction carrying its source's default priority.
    pub fn new(
        label: impl Into<String>,
        confidence: f32,
        source: Source,
        description: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            confidence,
            source,
            priority: source.priority(),
            description: description.into(),
        }
    }

    /// Override the priority (remote backend alternatives).
    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    pub fn band(&self) -> ConfidenceBand {
        ConfidenceBand::of(self.confidence)
    }
}

/// Final ranked answer for one image.
///
/// At most `ranking.max_results` entries (never more than `MAX_RESULTS`),
/// unique normalized labels, sorted by
/// (priority ascending, confidence descending, arrival order).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FusionResult(pub Vec<Prediction>);

impl FusionResult {
    pub fn predictions(&self) -> &[Prediction] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The top-ranked prediction, if any.
    pub fn best(&self) -> Option<&Prediction> {
        self.0.first()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.0.iter().map(|p| p.label.as_str()).collect()
    }

    pub fn into_inner(self) -> Vec<Prediction> {
        self.0
    }
}

impl IntoIterator for FusionResult {
    type Item = Prediction;
    type IntoIter = std::vec::IntoIter<Prediction>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

// === Raw predictor outputs ===

/// One detection from the object detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub class: String,
    pub score: f32,
    /// `[x, y, width, height]`; carried through but unused by fusion
    #[serde(default)]
    pub bbox: [f32; 4],
}

impl Detection {
    pub fn new(class: impl Into<String>, score: f32) -> Self {
        Self {
            class: class.into(),
            score,
            bbox: [0.0; 4],
        }
    }
}

/// One prediction from the local fallback classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifierPrediction {
    pub class_name: String,
    pub probability: f32,
}

impl ClassifierPrediction {
    pub fn new(class_name: impl Into<String>, probability: f32) -> Self {
        Self {
            class_name: class_name.into(),
            probability,
        }
    }
}

/// A class/confidence pair from the backend's ranked list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedClass {
    pub class: String,
    pub confidence: f32,
}

/// The backend's classification block, already validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendClassification {
    pub class: String,
    pub confidence: f32,
    /// Ranked list; index 0 normally repeats the primary class
    #[serde(default)]
    pub top_predictions: Vec<RankedClass>,
}

/// Validated remote backend response.
///
/// Each part is independently optional: a broken classification block does
/// not prevent the description from being used, and vice versa.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackendAnalysis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<BackendClassification>,

    /// Free-text scene description for the semantic extractor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Raw outputs of every source for one image.
///
/// `None` means the source failed, was disabled, or produced nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceOutputs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detections: Option<Vec<Detection>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<BackendAnalysis>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub classifications: Option<Vec<ClassifierPrediction>>,
}

/// Outcome of one source during a collection pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SourceState {
    /// Answered; `items` is the count of raw items returned
    Ok { items: usize },
    /// Failed and contributed nothing
    Failed { error: String },
    /// Not configured or switched off
    Disabled,
}

/// Per-source status line in a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceStatus {
    pub source: Source,
    #[serde(flatten)]
    pub state: SourceState,
}

impl SourceStatus {
    pub fn ok(source: Source, items: usize) -> Self {
        Self {
            source,
            state: SourceState::Ok { items },
        }
    }

    pub fn failed(source: Source, error: impl Into<String>) -> Self {
        Self {
            source,
            state: SourceState::Failed {
                error: error.into(),
            },
        }
    }

    pub fn disabled(source: Source) -> Self {
        Self {
            source,
            state: SourceState::Disabled,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.state, SourceState::Failed { .. })
    }
}

/// Everything the CLI writes out for one analyzed image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusionReport {
    /// Path as given to the analyzer
    pub file_path: PathBuf,

    /// Just the filename portion
    pub file_name: String,

    /// BLAKE3 hash of the image bytes
    pub content_hash: String,

    /// File size in bytes
    pub file_size: u64,

    /// Scene description from the remote backend, if it produced one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Ranked labels
    pub labels: FusionResult,

    /// How each source fared
    pub sources: Vec<SourceStatus>,

    /// Wall-clock time spent collecting and fusing
    pub elapsed_ms: u64,
}
