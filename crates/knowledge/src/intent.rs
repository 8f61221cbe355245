//! Intent classifier: decides whether a question may see draft policy.

use crate::types::VisibilityMode;
use policy_core::config::IntentConfig;

/// Keywords that signal interest in upcoming or proposed policy.
///
/// Matching is a case-insensitive substring test and favors recall, so
/// "explain" matches "plan".
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "plan",
    "future",
    "change",
    "upcoming",
    "proposed",
    "draft",
    "next year",
];

/// Maps a question to a `VisibilityMode`. The keyword set is fixed for the
/// life of the classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentClassifier {
    keywords: Vec<String>,
}

impl IntentClassifier {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self { keywords }
    }

    /// The built-in keywords plus any configured extras.
    pub fn from_config(config: &IntentConfig) -> Self {
        let extra = config.keywords.iter().flatten().map(String::as_str);
        let mut classifier = Self::new(DEFAULT_KEYWORDS.iter().copied().chain(extra));
        let mut seen = std::collections::HashSet::new();
        classifier.keywords.retain(|k| seen.insert(k.clone()));
        classifier
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Classify a question. Any keyword match yields `IncludeDraft`.
    pub fn classify(&self, question: &str) -> VisibilityMode {
        let lower = question.to_lowercase();
        let matched = self.keywords.iter().find(|k| lower.contains(k.as_str()));

        let mode = match matched {
            Some(_) => VisibilityMode::IncludeDraft,
            None => VisibilityMode::ActiveOnly,
        };

        tracing::info!(mode = %mode, keyword = ?matched, "Classified question intent");
        mode
    }
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_KEYWORDS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_future_question_includes_draft() {
        let classifier = IntentClassifier::default();
        assert_eq!(
            classifier.classify("What is the future vacation plan?"),
            VisibilityMode::IncludeDraft
        );
    }

    #[test]
    fn test_plain_question_is_active_only() {
        let classifier = IntentClassifier::default();
        assert_eq!(
            classifier.classify("How many days can I work remotely?"),
            VisibilityMode::ActiveOnly
        );
        assert_eq!(classifier.classify(""), VisibilityMode::ActiveOnly);
    }

    #[test]
    fn test_case_insensitive_and_multi_word() {
        let classifier = IntentClassifier::default();
        assert_eq!(
            classifier.classify("What happens NEXT YEAR?"),
            VisibilityMode::IncludeDraft
        );
        assert_eq!(
            classifier.classify("Any UPCOMING leave rules?"),
            VisibilityMode::IncludeDraft
        );
    }

    #[test]
    fn test_substring_match_is_accepted() {
        let classifier = IntentClassifier::default();
        assert_eq!(
            classifier.classify("Explain the sick leave policy"),
            VisibilityMode::IncludeDraft
        );
    }

    #[test]
    fn test_configured_keywords_extend_defaults() {
        let config = IntentConfig {
            keywords: Some(vec![
                "  Roadmap ".to_string(),
                "".to_string(),
                "FUTURE".to_string(),
            ]),
        };
        let classifier = IntentClassifier::from_config(&config);

        assert_eq!(classifier.keywords().len(), DEFAULT_KEYWORDS.len() + 1);
        assert_eq!(classifier.keywords().last(), Some(&"roadmap".to_string()));
        assert_eq!(
            classifier.classify("Is this on the roadmap?"),
            VisibilityMode::IncludeDraft
        );
        assert_eq!(
            classifier.classify("What will the FUTURE remote work policy be?"),
            VisibilityMode::IncludeDraft
        );
        assert_eq!(
            classifier.classify("How many days can I work remotely?"),
            VisibilityMode::ActiveOnly
        );
    }

    #[test]
    fn test_default_config_uses_default_keywords() {
        let classifier = IntentClassifier::from_config(&IntentConfig::default());
        assert_eq!(classifier, IntentClassifier::default());
    }
}
