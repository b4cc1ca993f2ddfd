//! Remote backend response validation and adapter.
//!
//! The backend's JSON is checked part by part at this boundary. A body that
//! is not a JSON object fails the whole source; a broken `classification`
//! block is dropped on its own so the `description` can still feed the
//! semantic extractor.

use serde_json::Value;

use crate::config::{BackendConfig, ConfidencePolicy};
use crate::error::{SourceError, SourceResult};
use crate::types::{BackendAnalysis, BackendClassification, Prediction, Source, ALTERNATIVE_PRIORITY};

pub const PRIMARY_DESCRIPTION: &str = "contextual analysis";
pub const ALTERNATIVE_DESCRIPTION: &str = "alternative possibility";

fn malformed(message: impl Into<String>) -> SourceError {
    SourceError::Malformed {
        predictor: Source::RemoteBackend,
        message: message.into(),
    }
}

/// Validate a raw response body.
pub fn parse_response(body: &str) -> SourceResult<BackendAnalysis> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| malformed(format!("invalid JSON: {e}")))?;
    let object = value
        .as_object()
        .ok_or_else(|| malformed("response body is not a JSON object"))?;

    let classification = match object.get("classification") {
        None | Some(Value::Null) => {
            tracing::debug!("Backend response has no classification");
            None
        }
        Some(raw) => match parse_classification(raw) {
            Ok(classification) => Some(classification),
            Err(message) => {
                tracing::warn!("Ignoring backend classification: {message}");
                None
            }
        },
    };

    let description = match object.get("description") {
        Some(Value::String(text)) if !text.trim().is_empty() => Some(text.clone()),
        None | Some(Value::Null) | Some(Value::String(_)) => None,
        Some(other) => {
            tracing::warn!("Ignoring non-string backend description: {other}");
            None
        }
    };

    Ok(BackendAnalysis {
        classification,
        description,
    })
}

fn parse_classification(raw: &Value) -> Result<BackendClassification, String> {
    if let Some(error) = raw.get("error") {
        return Err(format!("backend reported an error: {error}"));
    }
    let classification: BackendClassification =
        serde_json::from_value(raw.clone()).map_err(|e| format!("schema violation: {e}"))?;
    if classification.class.trim().is_empty() {
        return Err("empty class label".to_string());
    }
    Ok(classification)
}

/// Turn a validated classification into predictions.
///
/// Emits the primary class (priority 2) when it clears
/// `primary_min_confidence`, then up to `alternative_count` entries from
/// `top_predictions[1..]` (priority 3) that clear
/// `alternative_min_confidence`. Index 0 of the ranked list is skipped since
/// it repeats the primary class.
pub fn adapt(
    classification: &BackendClassification,
    config: &BackendConfig,
    policy: ConfidencePolicy,
) -> Vec<Prediction> {
    let mut predictions = Vec::new();

    let primary = Some(classification)
        .filter(|c| !c.class.trim().is_empty())
        .and_then(|c| policy.apply(c.confidence));
    if let Some(confidence) = primary {
        if confidence > config.primary_min_confidence {
            predictions.push(Prediction::new(
                classification.class.clone(),
                confidence,
                Source::RemoteBackend,
                PRIMARY_DESCRIPTION,
            ));
        }
    }

    let alternatives = classification
        .top_predictions
        .iter()
        .skip(1)
        .take(config.alternative_count)
        .filter(|alt| !alt.class.trim().is_empty())
        .filter_map(|alt| policy.apply(alt.confidence).map(|c| (alt, c)))
        .filter(|(_, confidence)| *confidence > config.alternative_min_confidence)
        .map(|(alt, confidence)| {
            Prediction::new(
                alt.class.clone(),
                confidence,
                Source::RemoteBackend,
                ALTERNATIVE_DESCRIPTION,
            )
            .with_priority(ALTERNATIVE_PRIORITY)
        });
    predictions.extend(alternatives);

    predictions
}
