//! Fusion engine - wires predictors, adapters, dedup and ranking together.

use std::future::Future;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use crate::config::{BackendConfig, ClassifierConfig, Config, DetectorConfig, RankingConfig};
use crate::error::{SourceError, SourceResult};
use crate::input::ImageHandle;
use crate::sources::{backend, classifier, detector};
use crate::sources::{LocalClassifier, ObjectDetector, RemoteBackend};
use crate::types::{
    BackendAnalysis, FusionReport, FusionResult, Source, SourceOutputs, SourceStatus,
    MAX_RESULTS,
};

use super::dedup::deduplicate;
use super::filter::ValidityFilter;
use super::rank::rank;
use super::semantic::SemanticExtractor;

/// Runs the configured predictors on an image and fuses their output.
///
/// Every predictor is optional. A missing or disabled predictor and a failed
/// one look the same to fusion: the source simply contributes nothing.
pub struct FusionEngine {
    detector: Option<Box<dyn ObjectDetector>>,
    backend: Option<Box<dyn RemoteBackend>>,
    classifier: Option<Box<dyn LocalClassifier>>,
    detector_config: DetectorConfig,
    backend_config: BackendConfig,
    classifier_config: ClassifierConfig,
    semantic: Option<SemanticExtractor>,
    filter: ValidityFilter,
    ranking: RankingConfig,
}

impl FusionEngine {
    /// Create an engine with no predictors attached.
    pub fn new(config: &Config) -> Self {
        Self {
            detector: None,
            backend: None,
            classifier: None,
            detector_config: config.detector.clone(),
            backend_config: config.backend.clone(),
            classifier_config: config.classifier.clone(),
            semantic: config
                .semantic
                .enabled
                .then(|| SemanticExtractor::new(&config.semantic)),
            filter: ValidityFilter::new(&config.filter),
            ranking: config.ranking.clone(),
        }
    }

    pub fn with_detector(mut self, detector: Box<dyn ObjectDetector>) -> Self {
        self.detector = Some(detector);
        self
    }

    pub fn with_backend(mut self, backend: Box<dyn RemoteBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn with_classifier(mut self, classifier: Box<dyn LocalClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// The attached remote backend, if any.
    pub fn backend(&self) -> Option<&dyn RemoteBackend> {
        self.backend.as_deref()
    }

    /// Query every enabled predictor concurrently.
    ///
    /// Never fails. Each predictor runs under its own deadline; errors and
    /// timeouts are logged and reported in the returned statuses, which are
    /// in arrival order (detector, backend, classifier).
    pub async fn collect(&self, image: &ImageHandle) -> (SourceOutputs, Vec<SourceStatus>) {
        let detector = self
            .detector
            .as_deref()
            .filter(|_| self.detector_config.enabled);
        let backend = self
            .backend
            .as_deref()
            .filter(|_| self.backend_config.enabled);
        let classifier = self
            .classifier
            .as_deref()
            .filter(|_| self.classifier_config.enabled);

        let (detections, analysis, classifications) = tokio::join!(
            optional(detector.map(|d| {
                guarded(
                    Source::ObjectDetector,
                    d.name(),
                    self.detector_config.timeout_ms,
                    d.detect(image),
                )
            })),
            optional(backend.map(|b| {
                guarded(
                    Source::RemoteBackend,
                    b.name(),
                    self.backend_config.timeout_ms,
                    b.analyze(image),
                )
            })),
            optional(classifier.map(|c| {
                guarded(
                    Source::LocalClassifier,
                    c.name(),
                    self.classifier_config.timeout_ms,
                    c.classify(image),
                )
            })),
        );

        let (detections, detector_status) =
            settle(Source::ObjectDetector, detections, |d| d.len());
        let (backend, backend_status) = settle(Source::RemoteBackend, analysis, backend_items);
        let (classifications, classifier_status) =
            settle(Source::LocalClassifier, classifications, |c| c.len());

        (
            SourceOutputs {
                detections,
                backend,
                classifications,
            },
            vec![detector_status, backend_status, classifier_status],
        )
    }

    /// Fuse raw outputs into a ranked result.
    ///
    /// Pure and deterministic: the same outputs always give the same result.
    pub fn fuse_outputs(&self, outputs: &SourceOutputs) -> FusionResult {
        let policy = self.ranking.confidence_policy;
        let mut pool = Vec::new();

        if let Some(detections) = &outputs.detections {
            pool.extend(detector::adapt(detections, &self.detector_config, policy));
        }

        if let Some(analysis) = &outputs.backend {
            if let Some(classification) = &analysis.classification {
                pool.extend(backend::adapt(classification, &self.backend_config, policy));
            }
            if let (Some(extractor), Some(text)) = (&self.semantic, &analysis.description) {
                pool.extend(extractor.extract(text));
            }
        }

        if let Some(classifications) = &outputs.classifications {
            let extra = classifier::adapt(
                classifications,
                &pool,
                &self.filter,
                &self.classifier_config,
                policy,
            );
            pool.extend(extra);
        }

        let pooled = pool.len();
        let unique = deduplicate(pool);
        let result = rank(unique, self.ranking.max_results.min(MAX_RESULTS));
        tracing::debug!("Fused {} pooled predictions into {}", pooled, result.len());
        result
    }

    /// Collect and fuse.
    pub async fn fuse(&self, image: &ImageHandle) -> FusionResult {
        let (outputs, _) = self.collect(image).await;
        self.fuse_outputs(&outputs)
    }

    /// Collect, fuse and build a full report for one image.
    pub async fn analyze(&self, image: &ImageHandle) -> FusionReport {
        let start = Instant::now();
        let (outputs, sources) = self.collect(image).await;
        let labels = self.fuse_outputs(&outputs);
        let elapsed_ms = start.elapsed().as_millis() as u64;

        tracing::debug!(
            "Analyzed {:?} in {}ms: {:?}",
            image.file_name,
            elapsed_ms,
            labels.labels()
        );

        FusionReport {
            file_path: image.path.clone(),
            file_name: image.file_name.clone(),
            content_hash: image.content_hash.clone(),
            file_size: image.size(),
            description: outputs.backend.and_then(|b| b.description),
            labels,
            sources,
            elapsed_ms,
        }
    }

    /// Like `fuse`, but gives up as soon as `token` is cancelled.
    ///
    /// Returns `None` when cancelled, so a superseded image never publishes
    /// a stale result.
    pub async fn fuse_cancellable(
        &self,
        image: &ImageHandle,
        token: &CancellationToken,
    ) -> Option<FusionResult> {
        tokio::select! {
            biased;
            _ = token.cancelled() => {
                tracing::debug!("Fusion of {:?} cancelled", image.file_name);
                None
            }
            result = self.fuse(image) => Some(result),
        }
    }
}

async fn optional<F: Future>(future: Option<F>) -> Option<F::Output> {
    match future {
        Some(future) => Some(future.await),
        None => None,
    }
}

/// Apply the per-source deadline.
async fn guarded<T>(
    source: Source,
    name: &str,
    timeout_ms: u64,
    call: impl Future<Output = SourceResult<T>>,
) -> SourceResult<T> {
    let start = Instant::now();
    let result = match tokio::time::timeout(Duration::from_millis(timeout_ms), call).await {
        Ok(result) => result,
        Err(_) => Err(SourceError::Timeout {
            predictor: source,
            timeout_ms,
        }),
    };
    tracing::trace!("  {} ({}): {:?}", source, name, start.elapsed());
    result
}

/// Turn a predictor outcome into fusion input plus a status line.
fn settle<T>(
    source: Source,
    outcome: Option<SourceResult<T>>,
    count: impl Fn(&T) -> usize,
) -> (Option<T>, SourceStatus) {
    match outcome {
        None => (None, SourceStatus::disabled(source)),
        Some(Ok(value)) => {
            let items = count(&value);
            (Some(value), SourceStatus::ok(source, items))
        }
        Some(Err(e)) => {
            tracing::warn!("{} failed, continuing without it: {}", source, e);
            (None, SourceStatus::failed(source, e.to_string()))
        }
    }
}

fn backend_items(analysis: &BackendAnalysis) -> usize {
    usize::from(analysis.classification.is_some()) + usize::from(analysis.description.is_some())
}
