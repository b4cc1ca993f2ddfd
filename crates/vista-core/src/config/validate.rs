//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;
use crate::types::MAX_RESULTS;

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError(message.into())
}

fn check_unit_range(key: &str, value: f32) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(invalid(format!("{key} must be between 0.0 and 1.0")));
    }
    Ok(())
}

fn check_nonzero(key: &str, value: u64) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(invalid(format!("{key} must be > 0")));
    }
    Ok(())
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_nonzero("limits.max_file_size_mb", self.limits.max_file_size_mb)?;
        if self.input.supported_formats.is_empty() {
            return Err(invalid("input.supported_formats must not be empty"));
        }

        check_unit_range("detector.min_score", self.detector.min_score)?;
        check_nonzero("detector.timeout_ms", self.detector.timeout_ms)?;

        check_unit_range(
            "backend.primary_min_confidence",
            self.backend.primary_min_confidence,
        )?;
        check_unit_range(
            "backend.alternative_min_confidence",
            self.backend.alternative_min_confidence,
        )?;
        check_nonzero("backend.timeout_ms", self.backend.timeout_ms)?;
        if self.backend.enabled && self.backend.endpoint.trim().is_empty() {
            return Err(invalid("backend.endpoint must be set when the backend is enabled"));
        }

        check_unit_range("classifier.min_probability", self.classifier.min_probability)?;
        check_nonzero("classifier.timeout_ms", self.classifier.timeout_ms)?;

        for (i, rule) in self.semantic.actions.iter().enumerate() {
            if rule.label.trim().is_empty() {
                return Err(invalid(format!("semantic.actions[{i}].label must not be empty")));
            }
            if rule.phrases.iter().any(|p| p.trim().is_empty()) || rule.phrases.is_empty() {
                return Err(invalid(format!(
                    "semantic.actions[{i}].phrases must be non-empty strings"
                )));
            }
            check_unit_range(&format!("semantic.actions[{i}].confidence"), rule.confidence)?;
        }
        for (i, rule) in self.semantic.keywords.iter().enumerate() {
            if rule.label.trim().is_empty() || rule.keyword.trim().is_empty() {
                return Err(invalid(format!(
                    "semantic.keywords[{i}] needs a keyword and a label"
                )));
            }
            check_unit_range(&format!("semantic.keywords[{i}].confidence"), rule.confidence)?;
        }

        if self.filter.denylist.iter().any(|s| s.is_empty())
            || self.filter.allowlist.iter().any(|s| s.is_empty())
        {
            // An empty substring matches every label.
            return Err(invalid("filter lists must not contain empty entries"));
        }

        if !(1..=MAX_RESULTS).contains(&self.ranking.max_results) {
            return Err(invalid(format!(
                "ranking.max_results must be between 1 and {MAX_RESULTS}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KeywordRule;

    #[test]
    fn test_default_config_passes_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_threshold_out_of_range() {
        let mut config = Config::default();
        config.detector.min_score = 1.5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("detector.min_score"));

        let mut config = Config::default();
        config.backend.alternative_min_confidence = -0.1;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("alternative_min_confidence"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.backend.timeout_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("backend.timeout_ms"));
    }

    #[test]
    fn test_validate_rejects_empty_endpoint_only_when_enabled() {
        let mut config = Config::default();
        config.backend.endpoint = "  ".to_string();
        assert!(config.validate().is_err());

        config.backend.enabled = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_keyword_rule() {
        let mut config = Config::default();
        config.semantic.keywords.push(KeywordRule {
            keyword: "horse".to_string(),
            label: String::new(),
            confidence: 0.7,
        });
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("semantic.keywords[11]"));
    }

    #[test]
    fn test_validate_rejects_empty_filter_entry() {
        let mut config = Config::default();
        config.filter.denylist.push(String::new());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("filter lists"));
    }

    #[test]
    fn test_validate_rejects_zero_max_results() {
        let mut config = Config::default();
        config.ranking.max_results = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("ranking.max_results"));
    }

    #[test]
    fn test_validate_rejects_max_results_above_cap() {
        let mut config = Config::default();
        config.ranking.max_results = 5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("ranking.max_results"));

        config.ranking.max_results = 1;
        assert!(config.validate().is_ok());
    }
}
