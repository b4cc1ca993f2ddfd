//! Validity filter for local classifier labels.
//!
//! The fallback classifier has known mislabel clusters (fish species, phone
//! brands, appliances) and tends to produce over-specific technical phrases.
//! Only its candidates go through this filter; other sources are trusted.

use crate::config::FilterConfig;

/// Decides whether a label is plausible enough to show.
#[derive(Debug, Clone)]
pub struct ValidityFilter {
    denylist: Vec<String>,
    allowlist: Vec<String>,
    max_tokens: usize,
}

impl ValidityFilter {
    pub fn new(config: &FilterConfig) -> Self {
        Self {
            denylist: config.denylist.iter().map(|s| s.to_lowercase()).collect(),
            allowlist: config.allowlist.iter().map(|s| s.to_lowercase()).collect(),
            max_tokens: config.max_tokens,
        }
    }

    /// Denylist beats allowlist beats the word-count fallback.
    pub fn is_valid(&self, label: &str) -> bool {
        let name = label.to_lowercase();

        if let Some(bad) = self.denylist.iter().find(|bad| name.contains(bad.as_str())) {
            tracing::trace!("Rejecting {label:?}: denylisted {bad:?}");
            return false;
        }

        if self.allowlist.iter().any(|good| name.contains(good.as_str())) {
            return true;
        }

        name.split_whitespace().count() <= self.max_tokens
    }
}

impl Default for ValidityFilter {
    fn default() -> Self {
        Self::new(&FilterConfig::default())
    }
}
