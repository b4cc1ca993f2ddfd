//! Semantic label extraction from free-text scene descriptions.
//!
//! Plain case-insensitive substring matching over ordered rule tables.
//! Posture/action rules are tried first and override the keyword table, so
//! "a woman with arms up" yields "person celebrating", not "person (woman)".

use crate::config::{ActionRule, KeywordRule, SemanticConfig};
use crate::types::{Prediction, Source};

/// Derives at most one prediction from a description.
#[derive(Debug, Clone)]
pub struct SemanticExtractor {
    actions: Vec<ActionRule>,
    keywords: Vec<KeywordRule>,
}

impl SemanticExtractor {
    /// Build from config; phrases and keywords are lowercased once here.
    pub fn new(config: &SemanticConfig) -> Self {
        let actions = config
            .actions
            .iter()
            .map(|rule| ActionRule {
                phrases: rule.phrases.iter().map(|p| p.to_lowercase()).collect(),
                ..rule.clone()
            })
            .collect();
        let keywords = config
            .keywords
            .iter()
            .map(|rule| KeywordRule {
                keyword: rule.keyword.to_lowercase(),
                ..rule.clone()
            })
            .collect();
        Self { actions, keywords }
    }

    /// First matching action rule, else first matching keyword rule.
    ///
    /// The prediction's description quotes the source text.
    pub fn extract(&self, description: &str) -> Option<Prediction> {
        let text = description.to_lowercase();

        let hit = self
            .actions
            .iter()
            .find(|rule| rule.phrases.iter().any(|p| text.contains(p.as_str())))
            .map(|rule| (rule.label.as_str(), rule.confidence))
            .or_else(|| {
                self.keywords
                    .iter()
                    .find(|rule| text.contains(rule.keyword.as_str()))
                    .map(|rule| (rule.label.as_str(), rule.confidence))
            });

        match hit {
            Some((label, confidence)) => {
                tracing::debug!("Semantic match {label:?} ({confidence}) from {description:?}");
                Some(Prediction::new(
                    label,
                    confidence,
                    Source::SemanticText,
                    format!("based on the description: \"{description}\""),
                ))
            }
            None => None,
        }
    }
}

impl Default for SemanticExtractor {
    fn default() -> Self {
        Self::new(&SemanticConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(text: &str) -> Option<Prediction> {
        SemanticExtractor::default().extract(text)
    }

    #[test]
    fn test_action_beats_keyword() {
        let p = extract("a woman with arms up celebrating").unwrap();
        assert_eq!(p.label, "person celebrating");
        assert_eq!(p.confidence, 0.85);
        assert_eq!(p.source, Source::SemanticText);
        assert_eq!(p.priority, 2);
    }

    #[test]
    fn test_action_rule_order() {
        // "sitting" is declared before "running"/"walking"
        assert_eq!(
            extract("a man sitting after running").unwrap().label,
            "person sitting"
        );
        assert_eq!(
            extract("two people walking a dog").unwrap().label,
            "person in motion"
        );
        assert_eq!(
            extract("Fists Raised at a concert").unwrap().label,
            "person celebrating"
        );
    }

    #[test]
    fn test_keyword_declaration_order_wins() {
        // "woman" contains "man"; "woman" is declared first
        assert_eq!(extract("a woman on a beach").unwrap().label, "person (woman)");
        // "dog" is declared before "cat"
        assert_eq!(extract("a cat and a dog").unwrap().label, "dog");
    }

    #[test]
    fn test_keywords_are_substring_matches() {
        // "scarf" contains "car"
        let p = extract("a scarf on a hook").unwrap();
        assert_eq!(p.label, "vehicle");
        assert_eq!(p.confidence, 0.7);
    }

    #[test]
    fn test_no_match() {
        assert!(extract("an empty field under a grey sky").is_none());
        assert!(extract("").is_none());
    }

    #[test]
    fn test_description_quotes_source_text() {
        let p = extract("A baby in a crib").unwrap();
        assert_eq!(p.label, "baby");
        assert!(p.description.contains("\"A baby in a crib\""));
    }

    #[test]
    fn test_injected_rules_replace_defaults() {
        let config = SemanticConfig {
            enabled: true,
            actions: vec![],
            keywords: vec![KeywordRule {
                keyword: "Horse".to_string(),
                label: "horse".to_string(),
                confidence: 0.75,
            }],
        };
        let extractor = SemanticExtractor::new(&config);
        assert_eq!(extractor.extract("a HORSE grazing").unwrap().label, "horse");
        assert!(extractor.extract("a woman sitting").is_none());
    }
}
