//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};

/// Input file settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Accepted image extensions (case-insensitive)
    pub supported_formats: Vec<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            supported_formats: ["png", "jpg", "jpeg", "gif", "bmp", "webp"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum file size in megabytes (the backend rejects larger uploads)
    pub max_file_size_mb: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 16,
        }
    }
}

/// Object detector source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Whether detector output is collected
    pub enabled: bool,

    /// Detections must score strictly above this
    pub min_score: f32,

    /// Keep at most this many detections (highest score first)
    pub max_predictions: usize,

    /// Deadline for one detector call
    pub timeout_ms: u64,

    /// Sidecar file suffix appended to the image path
    pub sidecar_suffix: String,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_score: 0.6,
            max_predictions: 2,
            timeout_ms: 10_000,
            sidecar_suffix: ".detections.json".to_string(),
        }
    }
}

/// Remote classification backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Whether the backend is queried
    pub enabled: bool,

    /// Base URL of the backend service
    pub endpoint: String,

    /// Deadline for one analyze round-trip
    pub timeout_ms: u64,

    /// Primary class must score strictly above this
    pub primary_min_confidence: f32,

    /// Alternatives must score strictly above this
    pub alternative_min_confidence: f32,

    /// How many entries after the first of `top_predictions` are considered
    pub alternative_count: usize,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "http://localhost:5000".to_string(),
            timeout_ms: 30_000,
            primary_min_confidence: 0.2,
            alternative_min_confidence: 0.15,
            alternative_count: 2,
        }
    }
}

/// Local fallback classifier settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Whether classifier output is collected
    pub enabled: bool,

    /// Predictions must score strictly above this
    pub min_probability: f32,

    /// Keep at most this many predictions after filtering
    pub max_predictions: usize,

    /// Deadline for one classifier call
    pub timeout_ms: u64,

    /// Sidecar file suffix appended to the image path
    pub sidecar_suffix: String,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_probability: 0.25,
            max_predictions: 2,
            timeout_ms: 10_000,
            sidecar_suffix: ".classifications.json".to_string(),
        }
    }
}

/// Posture/action rule: any phrase hit yields the label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRule {
    pub phrases: Vec<String>,
    pub label: String,
    pub confidence: f32,
}

impl ActionRule {
    fn new(phrases: &[&str], label: &str, confidence: f32) -> Self {
        Self {
            phrases: phrases.iter().map(|p| p.to_string()).collect(),
            label: label.to_string(),
            confidence,
        }
    }
}

/// Keyword rule: a keyword hit yields the label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordRule {
    pub keyword: String,
    pub label: String,
    pub confidence: f32,
}

impl KeywordRule {
    fn new(keyword: &str, label: &str, confidence: f32) -> Self {
        Self {
            keyword: keyword.to_string(),
            label: label.to_string(),
            confidence,
        }
    }
}

/// Semantic text extraction rules.
///
/// Both tables are ordered; the first matching entry wins, and every action
/// rule is tried before any keyword rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SemanticConfig {
    /// Whether the backend description is mined for a label
    pub enabled: bool,

    /// Posture/action phrases, checked first
    pub actions: Vec<ActionRule>,

    /// Keyword table, checked in declaration order
    pub keywords: Vec<KeywordRule>,
}

impl Default for SemanticConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            actions: vec![
                ActionRule::new(&["arms up", "fists raised"], "person celebrating", 0.85),
                ActionRule::new(&["sitting"], "person sitting", 0.70),
                ActionRule::new(&["running", "walking"], "person in motion", 0.75),
            ],
            keywords: vec![
                KeywordRule::new("woman", "person (woman)", 0.8),
                KeywordRule::new("man", "person (man)", 0.8),
                KeywordRule::new("person", "person", 0.7),
                KeywordRule::new("child", "child", 0.8),
                KeywordRule::new("baby", "baby", 0.9),
                KeywordRule::new("dog", "dog", 0.8),
                KeywordRule::new("cat", "cat", 0.8),
                KeywordRule::new("car", "vehicle", 0.7),
                KeywordRule::new("building", "architecture", 0.6),
                KeywordRule::new("food", "food", 0.7),
                KeywordRule::new("flower", "plant/flower", 0.8),
            ],
        }
    }
}

/// Validity filter lists for local classifier labels.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Substrings marking known mislabel clusters; always rejected
    pub denylist: Vec<String>,

    /// Substrings marking broad, trustworthy categories
    pub allowlist: Vec<String>,

    /// Labels matching neither list pass only with at most this many words
    pub max_tokens: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        let to_vec = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        Self {
            denylist: to_vec(&[
                "salmon",
                "fish",
                "coho",
                "cohoe",
                "cellular",
                "cellphone",
                "mobile phone",
                "phone",
                "dishwasher",
                "washing machine",
                "marine life",
            ]),
            allowlist: to_vec(&[
                "person",
                "human",
                "people",
                "clothing",
                "shirt",
                "jacket",
                "dress",
                "animal",
                "dog",
                "cat",
                "vehicle",
                "car",
                "truck",
                "building",
                "house",
                "food",
                "fruit",
                "vegetable",
                "furniture",
                "chair",
                "table",
            ]),
            max_tokens: 3,
        }
    }
}

/// How out-of-range confidences from a source are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidencePolicy {
    /// Drop the candidate
    #[default]
    Reject,
    /// Pin the value into [0, 1]
    Clamp,
}

impl ConfidencePolicy {
    /// Apply the policy to a raw confidence.
    ///
    /// Non-finite values are always rejected.
    pub fn apply(self, value: f32) -> Option<f32> {
        if !value.is_finite() {
            return None;
        }
        if (0.0..=1.0).contains(&value) {
            return Some(value);
        }
        match self {
            Self::Reject => None,
            Self::Clamp => Some(value.clamp(0.0, 1.0)),
        }
    }
}

/// Ranking settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    /// Length cap of the final result
    pub max_results: usize,

    /// Out-of-range confidence handling at the adapter boundary
    pub confidence_policy: ConfidencePolicy,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            max_results: 4,
            confidence_policy: ConfidencePolicy::Reject,
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format ("json" or "jsonl")
    pub format: String,

    /// Pretty-print JSON output
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "json".to_string(),
            pretty: false,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_policy_reject() {
        let policy = ConfidencePolicy::Reject;
        assert_eq!(policy.apply(0.5), Some(0.5));
        assert_eq!(policy.apply(0.0), Some(0.0));
        assert_eq!(policy.apply(1.0), Some(1.0));
        assert_eq!(policy.apply(1.2), None);
        assert_eq!(policy.apply(-0.1), None);
        assert_eq!(policy.apply(f32::NAN), None);
    }

    #[test]
    fn test_confidence_policy_clamp() {
        let policy = ConfidencePolicy::Clamp;
        assert_eq!(policy.apply(1.2), Some(1.0));
        assert_eq!(policy.apply(-3.0), Some(0.0));
        assert_eq!(policy.apply(f32::INFINITY), None);
    }

    #[test]
    fn test_semantic_defaults_keep_declaration_order() {
        let config = SemanticConfig::default();
        let keywords: Vec<&str> = config.keywords.iter().map(|k| k.keyword.as_str()).collect();
        assert_eq!(keywords[0], "woman");
        assert_eq!(keywords[1], "man");
        assert_eq!(keywords.last(), Some(&"flower"));
        assert_eq!(config.actions[0].label, "person celebrating");
    }

    #[test]
    fn test_rule_tables_parse_from_toml() {
        let toml_str = r#"
            enabled = true

            [[actions]]
            phrases = ["jumping"]
            label = "person jumping"
            confidence = 0.8

            [[keywords]]
            keyword = "horse"
            label = "horse"
            confidence = 0.75
        "#;
        let config: SemanticConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.actions.len(), 1);
        assert_eq!(config.actions[0].phrases, vec!["jumping".to_string()]);
        assert_eq!(config.keywords.len(), 1);
        assert_eq!(config.keywords[0].label, "horse");
    }

    #[test]
    fn test_confidence_policy_parses_lowercase() {
        let config: RankingConfig = toml::from_str("confidence_policy = \"clamp\"").unwrap();
        assert_eq!(config.confidence_policy, ConfidencePolicy::Clamp);
        assert_eq!(config.max_results, 4);
    }
}
