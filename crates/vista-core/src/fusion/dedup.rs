//! First-seen deduplication of pooled predictions.

use std::collections::HashSet;

use crate::types::Prediction;

/// Reduce a label to lowercase ASCII letters and whitespace, trimmed.
///
/// Everything else (digits, punctuation, accented letters) is removed, so
/// "Dog!" and "dog" collide while "dog" and "dogs" do not.
pub fn normalize_label(label: &str) -> String {
    label
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_whitespace())
        .collect::<String>()
        .trim()
        .to_string()
}

/// Keep the first prediction for each normalized label.
///
/// Input order is arrival order (detector, backend, semantic, classifier), so
/// the earlier source wins regardless of confidence or priority. Labels must
/// normalize to the exact same string to collide; there is no fuzzy merge.
pub fn deduplicate(predictions: Vec<Prediction>) -> Vec<Prediction> {
    let mut seen: HashSet<String> = HashSet::with_capacity(predictions.len());
    predictions
        .into_iter()
        .filter(|p| {
            let keep = seen.insert(normalize_label(&p.label));
            if !keep {
                tracing::trace!("Dropping duplicate {:?} from {}", p.label, p.source);
            }
            keep
        })
        .collect()
}
