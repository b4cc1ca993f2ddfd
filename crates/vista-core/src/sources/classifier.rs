//! Local fallback classifier adapter.

use std::cmp::Ordering;

use crate::config::{ClassifierConfig, ConfidencePolicy};
use crate::fusion::filter::ValidityFilter;
use crate::types::{ClassifierPrediction, Prediction, Source};

pub const CLASSIFIER_DESCRIPTION: &str = "basic visual classification";

/// Filter classifier output and append what is not already covered.
///
/// Order of operations: confidence policy, probability threshold (strict),
/// validity filter, best-first cap at `max_predictions`, then a redundancy
/// check. A candidate is redundant when its lowercased label contains, or is
/// contained in, a label already in `pool` or accepted earlier in this call.
pub fn adapt(
    predictions: &[ClassifierPrediction],
    pool: &[Prediction],
    filter: &ValidityFilter,
    config: &ClassifierConfig,
    policy: ConfidencePolicy,
) -> Vec<Prediction> {
    let mut candidates: Vec<(&ClassifierPrediction, f32)> = predictions
        .iter()
        .filter(|p| !p.class_name.trim().is_empty())
        .filter_map(|p| policy.apply(p.probability).map(|prob| (p, prob)))
        .filter(|(_, prob)| *prob > config.min_probability)
        .filter(|(p, _)| filter.is_valid(&p.class_name))
        .collect();

    candidates.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    candidates.truncate(config.max_predictions);

    let mut seen: Vec<String> = pool
        .iter()
        .map(|p| p.label.trim().to_lowercase())
        .filter(|label| !label.is_empty())
        .collect();
    let mut accepted = Vec::new();

    for (candidate, probability) in candidates {
        let name = candidate.class_name.trim().to_lowercase();
        let redundant = seen
            .iter()
            .any(|existing| existing.contains(&name) || name.contains(existing.as_str()));
        if redundant {
            tracing::trace!("Dropping redundant classifier label {:?}", candidate.class_name);
            continue;
        }

        seen.push(name);
        accepted.push(Prediction::new(
            candidate.class_name.clone(),
            probability,
            Source::LocalClassifier,
            CLASSIFIER_DESCRIPTION,
        ));
    }

    accepted
}
