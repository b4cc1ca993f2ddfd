//! Final ordering and truncation.

use std::cmp::Ordering;

use crate::types::{FusionResult, Prediction};

/// Sort by priority ascending, then confidence descending, then truncate.
///
/// The sort is stable, so predictions with equal (priority, confidence)
/// keep their arrival order. That is the tertiary key.
pub fn rank(mut predictions: Vec<Prediction>, max_results: usize) -> FusionResult {
    predictions.sort_by(|a, b| {
        a.priority.cmp(&b.priority).then_with(|| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(Ordering::Equal)
        })
    });
    predictions.truncate(max_results);
    FusionResult(predictions)
}
