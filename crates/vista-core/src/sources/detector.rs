//! Object detector adapter.

use std::cmp::Ordering;

use crate::config::{ConfidencePolicy, DetectorConfig};
use crate::types::{Detection, Prediction, Source};

pub const DETECTOR_DESCRIPTION: &str = "precise object detection";

/// Keep confident detections, best first, capped at `max_predictions`.
///
/// Score must be strictly above `min_score`. Ties keep detector order.
pub fn adapt(
    detections: &[Detection],
    config: &DetectorConfig,
    policy: ConfidencePolicy,
) -> Vec<Prediction> {
    let mut kept: Vec<(&Detection, f32)> = detections
        .iter()
        .filter(|d| !d.class.trim().is_empty())
        .filter_map(|d| policy.apply(d.score).map(|score| (d, score)))
        .filter(|(_, score)| *score > config.min_score)
        .collect();

    kept.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    kept.truncate(config.max_predictions);

    kept.into_iter()
        .map(|(d, score)| {
            Prediction::new(d.class.clone(), score, Source::ObjectDetector, DETECTOR_DESCRIPTION)
        })
        .collect()
}
