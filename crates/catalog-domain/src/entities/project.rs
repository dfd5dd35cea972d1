//! The canonical catalog record: a discovered source-code project.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

crate::define_entity! {
    /// A source-code project discovered under one of an organization's
    /// watched filesystem roots. Created by `scan`; mutated by
    /// `refresh`/`health_check`/`llm_analysis`/`quality_assessment`;
    /// destroyed only by explicit org-scoped delete.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Project { id, org_id, created_at, updated_at } {
        /// Absolute filesystem path. Unique per `org_id`.
        pub path: String,
        /// Human-readable name. Unique per `org_id`; auto-disambiguated on
        /// collision by the `scan` handler.
        pub name: String,
        /// Optional display title, distinct from `name`.
        pub title: Option<String>,
        /// Optional free-text description, usually sourced from a manifest.
        pub description: Option<String>,
        /// Classification of what kind of project this is.
        pub project_type: ProjectType,
        /// Where this project sits in its own lifecycle.
        pub lifecycle: Lifecycle,
        /// Lowercase, trimmed, deduplicated detected languages.
        pub languages: Vec<String>,
        /// Lowercase, trimmed, deduplicated detected frameworks.
        pub frameworks: Vec<String>,
        /// Freeform, lowercase, trimmed, deduplicated tags.
        pub tags: Vec<String>,
        /// Deterministic health score in `[0, 100]`, recomputed on
        /// refresh/health-check.
        pub health_score: Option<f64>,
        /// Readiness band assigned by quality assessment.
        pub production_readiness: ProductionReadiness,
        /// Composite quality score in `[0, 100]`.
        pub quality_score: Option<f64>,
        /// Structured LLM (or fallback) quality assessment payload.
        pub quality_assessment: Option<serde_json::Value>,
        /// Boolean filesystem-indicator bundle from the quality scan.
        pub quality_indicators: Option<QualityIndicators>,
        /// When quality was last assessed.
        pub last_quality_check_at: Option<i64>,
        /// When this project was last synced by a `scan`/`refresh` job.
        pub last_synced_at: Option<i64>,
        /// Latest known commit SHA, if the project is a git repository.
        pub last_commit_sha: Option<String>,
        /// Remote repository URL, if known.
        pub repository_url: Option<String>,
        /// Default branch name, if known. Supplemental provenance field.
        pub default_branch: Option<String>,
        /// GitHub star count, if known. Supplemental provenance field.
        pub github_stars: Option<i64>,
        /// GitHub fork count, if known. Supplemental provenance field.
        pub github_forks: Option<i64>,
        /// GitHub watcher count, if known. Supplemental provenance field.
        pub github_watchers: Option<i64>,
        /// Open issue count, if known. Supplemental provenance field.
        pub open_issues: Option<i64>,
        /// Open pull-request count, if known. Supplemental provenance field.
        pub open_prs: Option<i64>,
        /// Total lines of code, if known. Supplemental provenance field.
        pub loc_total: Option<i64>,
        /// File count, if known. Supplemental provenance field.
        pub file_count: Option<i64>,
        /// Average cyclomatic complexity, if known. Supplemental field.
        pub avg_complexity: Option<f64>,
        /// Test coverage percentage, if known. Supplemental field.
        pub test_coverage: Option<f64>,
        /// Opaque free-form metadata map.
        pub extra_metadata: serde_json::Value,
    }
}

impl Project {
    /// Lowercase, trim, and deduplicate a tag/language/framework list.
    /// The invariant every job handler enforces on write.
    #[must_use]
    pub fn normalize_tags(values: impl IntoIterator<Item = impl Into<String>>) -> Vec<String> {
        let mut seen = std::collections::BTreeSet::new();
        let mut out = Vec::new();
        for value in values {
            let normalized = value.into().trim().to_lowercase();
            if normalized.is_empty() {
                continue;
            }
            if seen.insert(normalized.clone()) {
                out.push(normalized);
            }
        }
        out
    }
}

/// Classification of what kind of project this is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProjectType {
    /// A library or package meant to be consumed by other code.
    Library,
    /// An HTTP or RPC API service.
    Api,
    /// A command-line tool.
    Cli,
    /// A web application or site.
    Web,
    /// A long-running background service.
    Service,
    /// A standalone application.
    Application,
    /// A developer tool.
    Tool,
    /// A framework other projects build on top of.
    Framework,
    /// A plugin or extension for a host application.
    Plugin,
    /// A one-off script.
    Script,
    /// A documentation site or book.
    Docs,
    /// A chat or automation bot.
    Bot,
    /// A game.
    Game,
    /// A data pipeline or dataset project.
    Data,
    /// A project template or scaffold.
    Template,
    /// Unclassified or not yet analyzed.
    #[default]
    Other,
}

impl ProjectType {
    /// Parse a string against the fixed enum, case-insensitively, returning
    /// `None` for anything outside the enumerated set rather than guessing.
    /// Per the `type` taxonomy-drift decision, callers should leave the
    /// field at [`ProjectType::Other`] when this returns `None`.
    #[must_use]
    pub fn parse_strict(value: &str) -> Option<Self> {
        value.to_lowercase().parse().ok()
    }

    /// Partial match used by search filtering: `self` matches `other` if
    /// either string representation contains the other (e.g. `"web"`
    /// matches `"web_app"`... though `web_app` is not itself a variant
    /// here, the rule generalizes to any caller-supplied free-text filter
    /// compared against the canonical string form).
    #[must_use]
    pub fn partial_matches(&self, filter: &str) -> bool {
        let this = self.to_string();
        let filter = filter.to_lowercase();
        this.contains(&filter) || filter.contains(&this)
    }
}

/// Where a project sits in its own lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    /// Actively developed.
    #[default]
    Active,
    /// In maintenance mode only.
    Maintenance,
    /// Deprecated but not yet archived.
    Deprecated,
    /// Archived / read-only.
    Archived,
}

/// Ordered production-readiness band, from `prototype` to `mature`, plus
/// the side states `legacy`, `deprecated`, and `unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProductionReadiness {
    /// Not yet assessed.
    #[default]
    Unknown,
    /// Early proof of concept.
    Prototype,
    /// Early but usable.
    Alpha,
    /// Feature-complete, still stabilizing.
    Beta,
    /// Production-ready.
    Production,
    /// Long-lived, battle-tested.
    Mature,
    /// Superseded but still maintained for compatibility.
    Legacy,
    /// No longer maintained.
    Deprecated,
}

/// Boolean filesystem-indicator bundle produced by the quality scan (§4.5).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityIndicators {
    /// A `README.*` file is present.
    pub has_readme: bool,
    /// A license file or manifest license field is present.
    pub has_license: bool,
    /// A recognised tests directory or test-file pattern is present.
    pub has_tests: bool,
    /// A recognised CI configuration is present.
    pub has_ci_cd: bool,
    /// A recognised documentation directory is present.
    pub has_documentation: bool,
    /// A recognised CHANGELOG file is present.
    pub has_changelog: bool,
    /// A recognised CONTRIBUTING file is present.
    pub has_contributing: bool,
    /// A recognised SECURITY policy file is present.
    pub has_security_policy: bool,
    /// A `package.json` is present.
    pub has_package_json: bool,
    /// Docker artefacts are present.
    pub has_docker: bool,
    /// A recognised lint configuration is present.
    pub has_linting: bool,
    /// A type-hint marker (`py.typed`/`tsconfig.json`) is present.
    pub has_type_hints: bool,
}

impl QualityIndicators {
    /// Weighted completeness score in `[0, 100]`. `has_type_hints`
    /// contributes no weight, matching the source implementation.
    #[must_use]
    pub fn completeness_score(&self) -> f64 {
        let mut score: f64 = 0.0;
        score += if self.has_readme { 15.0 } else { 0.0 };
        score += if self.has_license { 10.0 } else { 0.0 };
        score += if self.has_tests { 20.0 } else { 0.0 };
        score += if self.has_ci_cd { 15.0 } else { 0.0 };
        score += if self.has_documentation { 10.0 } else { 0.0 };
        score += if self.has_changelog { 5.0 } else { 0.0 };
        score += if self.has_contributing { 5.0 } else { 0.0 };
        score += if self.has_security_policy { 5.0 } else { 0.0 };
        score += if self.has_package_json { 5.0 } else { 0.0 };
        score += if self.has_docker { 5.0 } else { 0.0 };
        score += if self.has_linting { 5.0 } else { 0.0 };
        score.min(100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_tags_dedups_and_lowercases() {
        let out = Project::normalize_tags(["Rust", " rust ", "WASM", ""]);
        assert_eq!(out, vec!["rust".to_owned(), "wasm".to_owned()]);
    }

    #[test]
    fn project_type_partial_match_is_bidirectional() {
        let web = ProjectType::Web;
        assert!(web.partial_matches("web"));
        assert!(!web.partial_matches("cli"));
    }

    #[test]
    fn completeness_score_ignores_type_hints() {
        let mut indicators = QualityIndicators::default();
        indicators.has_type_hints = true;
        assert_eq!(indicators.completeness_score(), 0.0);
    }

    #[test]
    fn completeness_score_clamped_to_100() {
        let indicators = QualityIndicators {
            has_readme: true,
            has_license: true,
            has_tests: true,
            has_ci_cd: true,
            has_documentation: true,
            has_changelog: true,
            has_contributing: true,
            has_security_policy: true,
            has_package_json: true,
            has_docker: true,
            has_linting: true,
            has_type_hints: true,
        };
        assert_eq!(indicators.completeness_score(), 100.0);
    }
}
