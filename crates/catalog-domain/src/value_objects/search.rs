//! Hybrid-search query and filter shapes (§4.10, §4.11).

use serde::{Deserialize, Serialize};

use crate::entities::ProjectType;

/// Filters extracted from a natural-language query by the LLM parser, or
/// supplied directly by a caller bypassing natural-language parsing.
/// Every field is optional; an absent field imposes no constraint.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SearchFilters {
    /// Keep only projects whose `languages[]` intersects this set
    /// (case-insensitive).
    pub languages: Option<Vec<String>>,
    /// Keep only projects whose `type` partially matches this value.
    pub project_type: Option<String>,
    /// Keep only projects with this exact lifecycle.
    pub lifecycle: Option<String>,
    /// Keep only projects with at least one detected test indicator.
    pub has_tests: Option<bool>,
    /// Keep only projects with `health_score >= min_health_score`. Nulls
    /// are excluded when this filter is set.
    pub min_health_score: Option<f64>,
}

impl SearchFilters {
    /// Whether no filter is set, i.e. this filter set is a no-op.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Drop the `project_type` filter, the first relaxation step.
    pub fn drop_type(&mut self) {
        self.project_type = None;
    }

    /// Drop every filter except `languages`, the second relaxation step.
    pub fn keep_languages_only(&mut self) {
        let languages = self.languages.take();
        *self = Self { languages, ..Self::default() };
    }

    /// Drop every filter, the final relaxation step.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Whether `project_type`, treated as a [`ProjectType`] partial match,
    /// admits the given type.
    #[must_use]
    pub fn matches_type(&self, candidate: ProjectType) -> bool {
        match &self.project_type {
            Some(filter) => candidate.partial_matches(filter),
            None => true,
        }
    }
}

/// A parsed natural-language search request (§4.11).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedQuery {
    /// Keywords extracted from the free-text query, used to drive the
    /// keyword/full-text side of the hybrid search.
    pub keywords: Vec<String>,
    /// Structured filters extracted from the query.
    pub filters: SearchFilters,
    /// The caller's inferred intent, e.g. `"search"`.
    pub intent: String,
}

impl ParsedQuery {
    /// The deterministic fallback used when the LLM is unavailable or its
    /// response fails to parse: naive whitespace tokenization, no filters.
    #[must_use]
    pub fn fallback(query: &str) -> Self {
        Self {
            keywords: tokenize(query),
            filters: SearchFilters::default(),
            intent: "search".to_owned(),
        }
    }
}

/// Lowercase, whitespace/punctuation-split tokenization used both by the
/// natural-language fallback and by the keyword side of hybrid search.
#[must_use]
pub fn tokenize(query: &str) -> Vec<String> {
    query
        .split(|c: char| !c.is_alphanumeric())
        .map(|token| token.to_lowercase())
        .filter(|token| !token.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_splits_on_punctuation_and_lowercases() {
        assert_eq!(tokenize("Rust, async-runtime!"), vec!["rust", "async", "runtime"]);
    }

    #[test]
    fn keep_languages_only_drops_everything_else() {
        let mut filters = SearchFilters {
            languages: Some(vec!["rust".into()]),
            project_type: Some("cli".into()),
            lifecycle: Some("active".into()),
            has_tests: Some(true),
            min_health_score: Some(50.0),
        };
        filters.keep_languages_only();
        assert_eq!(filters.languages, Some(vec!["rust".into()]));
        assert!(filters.project_type.is_none());
        assert!(filters.lifecycle.is_none());
        assert!(filters.has_tests.is_none());
        assert!(filters.min_health_score.is_none());
    }
}
