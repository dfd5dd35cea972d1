//! Hybrid Search Engine (C10) and Natural-Language Query Parser (C11).

use std::collections::HashMap;
use std::sync::Arc;

use catalog_domain::entities::Project;
use catalog_domain::error::Result;
use catalog_domain::ports::{CatalogStore, GenerateOptions, Llm};
use catalog_domain::value_objects::{tokenize, ParsedQuery, SearchFilters};
use serde::Deserialize;

use crate::embedding::{EmbeddingService, SimilaritySearchFilter};

/// RRF smoothing constant (§4.10).
const RRF_K: f64 = 60.0;
/// Default full-text weight (§6: `CATALOG_FTS_WEIGHT`).
const DEFAULT_FTS_WEIGHT: f64 = 0.6;
/// Default semantic weight (§6: `CATALOG_SEMANTIC_WEIGHT`).
const DEFAULT_SEMANTIC_WEIGHT: f64 = 0.4;
/// Minimum semantic similarity admitted into the fused list (§4.10).
const SEMANTIC_MIN_SCORE: f32 = 0.2;
/// Above this length an expanded query is discarded in favor of the
/// original (§4.11 supplemental, matching the original's sanity check).
const MAX_EXPANDED_QUERY_LEN: usize = 200;

/// A ranked catalog search hit.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// The matching project.
    pub project: Project,
    /// The fused RRF relevance score.
    pub relevance_score: f64,
}

/// Tunable weights for the two sides of hybrid search.
#[derive(Debug, Clone, Copy)]
pub struct SearchWeights {
    /// Weight applied to full-text rank contributions.
    pub fts: f64,
    /// Weight applied to semantic rank contributions.
    pub semantic: f64,
}

impl Default for SearchWeights {
    fn default() -> Self {
        Self { fts: DEFAULT_FTS_WEIGHT, semantic: DEFAULT_SEMANTIC_WEIGHT }
    }
}

/// Runs keyword and (optionally) semantic search and fuses the two
/// ranked lists with Reciprocal Rank Fusion.
pub struct HybridSearchEngine {
    store: Arc<dyn CatalogStore>,
    embedding: Option<Arc<EmbeddingService>>,
    weights: SearchWeights,
    llm: Option<Arc<dyn Llm>>,
    query_expansion: bool,
}

impl HybridSearchEngine {
    /// Construct a search engine. `embedding` is `None` when semantic
    /// search is disabled or unavailable (`CATALOG_SEMANTIC_AUTO=off`).
    /// `llm` is only consulted when `query_expansion` is enabled.
    #[must_use]
    pub fn new(
        store: Arc<dyn CatalogStore>,
        embedding: Option<Arc<EmbeddingService>>,
        weights: SearchWeights,
        llm: Option<Arc<dyn Llm>>,
        query_expansion: bool,
    ) -> Self {
        Self { store, embedding, weights, llm, query_expansion }
    }

    /// Run a keyword-plus-semantic search over `query`, scoped to `org_id`.
    /// The semantic side embeds an LLM-expanded query when expansion is
    /// enabled and available; the lexical side always uses `query` as-is.
    pub async fn search(&self, org_id: &str, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
        let fts_hits = self.store.projects().fts_query(org_id, query, limit * 2).await?;
        let fts_ranked: Vec<String> = fts_hits.into_iter().map(|hit| hit.project_id).collect();

        let semantic_ranked = if let Some(embedding) = &self.embedding {
            let expanded_query = self.expand_query(query).await;
            let filter = SimilaritySearchFilter { org_id: Some(org_id.to_owned()), ..Default::default() };
            embedding
                .search_similar(&expanded_query, limit * 2, &filter, SEMANTIC_MIN_SCORE)
                .await
                .map(|hits| hits.into_iter().map(|hit| hit.id).collect())
                .unwrap_or_default()
        } else {
            Vec::new()
        };

        let fused_ids = self.fuse(&fts_ranked, &semantic_ranked, limit);
        self.hydrate(org_id, fused_ids).await
    }

    /// Expand `query` via the LLM when enabled, falling back to the
    /// original on any failure, an empty result, or an oversized one
    /// (§4.11 supplemental).
    async fn expand_query(&self, query: &str) -> String {
        if !self.query_expansion {
            return query.to_owned();
        }
        let Some(llm) = &self.llm else {
            return query.to_owned();
        };
        expand_query_with(llm.as_ref(), query).await
    }

    fn fuse(&self, fts_ranked: &[String], semantic_ranked: &[String], limit: usize) -> Vec<(String, f64)> {
        fuse_rrf(self.weights, fts_ranked, semantic_ranked, limit)
    }

    async fn hydrate(&self, org_id: &str, ranked: Vec<(String, f64)>) -> Result<Vec<SearchResult>> {
        let mut results = Vec::with_capacity(ranked.len());
        for (id, score) in ranked {
            if let Some(project) = self.store.projects().get_by_id(org_id, &id).await? {
                results.push(SearchResult { project, relevance_score: score });
            }
        }
        Ok(results)
    }

    /// Run a natural-language query through [`NlQueryParser`], apply
    /// filters with the relaxation cascade, and return the results
    /// (§4.11).
    pub async fn natural_language_search(
        &self,
        llm: Option<&Arc<dyn Llm>>,
        org_id: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<SearchResult>> {
        let parsed = NlQueryParser::parse(llm, query).await;
        let fused = self.search(org_id, &parsed.keywords.join(" "), limit.max(1) * 3).await?;

        let mut filters = parsed.filters;
        let floor = (limit / 2).max(3);

        for _ in 0..3 {
            let filtered = apply_filters(&fused, &filters);
            if filtered.len() >= floor || filters.is_empty() {
                return Ok(filtered.into_iter().take(limit).collect());
            }
            relax(&mut filters);
        }

        Ok(fused.into_iter().take(limit).collect())
    }
}

/// Reciprocal Rank Fusion over the two ranked id lists (§4.10).
fn fuse_rrf(weights: SearchWeights, fts_ranked: &[String], semantic_ranked: &[String], limit: usize) -> Vec<(String, f64)> {
    let mut scores: HashMap<String, f64> = HashMap::new();
    for (rank, id) in fts_ranked.iter().enumerate() {
        *scores.entry(id.clone()).or_insert(0.0) += weights.fts / (RRF_K + rank as f64 + 1.0);
    }
    for (rank, id) in semantic_ranked.iter().enumerate() {
        *scores.entry(id.clone()).or_insert(0.0) += weights.semantic / (RRF_K + rank as f64 + 1.0);
    }

    let mut ranked: Vec<(String, f64)> = scores.into_iter().collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    ranked.truncate(limit);
    ranked
}

/// Apply the 200-char sanity check to an LLM query expansion, falling back
/// to the original `query` on failure, an empty result, or an oversized
/// one (§4.11 supplemental).
async fn expand_query_with(llm: &dyn Llm, query: &str) -> String {
    match llm.expand_query(query).await {
        Ok(expanded) if !expanded.trim().is_empty() && expanded.len() < MAX_EXPANDED_QUERY_LEN => {
            expanded.trim().to_owned()
        }
        _ => query.to_owned(),
    }
}

fn apply_filters(results: &[SearchResult], filters: &SearchFilters) -> Vec<SearchResult> {
    results
        .iter()
        .filter(|result| {
            if let Some(languages) = &filters.languages {
                let wanted: std::collections::HashSet<String> =
                    languages.iter().map(|l| l.to_lowercase()).collect();
                if !result.project.languages.iter().any(|l| wanted.contains(l)) {
                    return false;
                }
            }
            if !filters.matches_type(result.project.project_type) {
                return false;
            }
            if let Some(lifecycle) = &filters.lifecycle
                && result.project.lifecycle.to_string() != lifecycle.to_lowercase()
            {
                return false;
            }
            if filters.has_tests == Some(true)
                && !result.project.quality_indicators.is_some_and(|i| i.has_tests)
            {
                return false;
            }
            if let Some(min_score) = filters.min_health_score
                && !result.project.health_score.is_some_and(|score| score >= min_score)
            {
                return false;
            }
            true
        })
        .cloned()
        .collect()
}

/// Relax filters in the fixed order spec §4.11 prescribes: drop `type`,
/// then drop everything except `languages`, then clear entirely.
fn relax(filters: &mut SearchFilters) {
    if filters.project_type.is_some() {
        filters.drop_type();
    } else if filters.lifecycle.is_some() || filters.has_tests.is_some() || filters.min_health_score.is_some()
    {
        filters.keep_languages_only();
    } else {
        filters.clear();
    }
}

#[derive(Debug, Deserialize)]
struct LlmQueryPayload {
    #[serde(default)]
    keywords: Vec<String>,
    #[serde(default)]
    filters: SearchFilters,
    #[serde(default = "default_intent")]
    intent: String,
}

fn default_intent() -> String {
    "search".to_owned()
}

/// Parses free-text queries into keywords, filters, and intent (§4.11).
pub struct NlQueryParser;

impl NlQueryParser {
    const SYSTEM_PROMPT: &'static str =
        "You translate a user's natural-language project search into structured filters. \
         Respond with a single JSON object: {\"keywords\": [...], \"filters\": {\"languages\": \
         [...]?, \"type\": ...?, \"lifecycle\": ...?, \"has_tests\": ...?, \"min_health_score\": \
         ...?}, \"intent\": ...}. Never invent a filter value that isn't clearly implied by the \
         query.";

    /// Parse `query`, falling back to deterministic tokenization when the
    /// LLM is unavailable or its response fails to parse.
    pub async fn parse(llm: Option<&Arc<dyn Llm>>, query: &str) -> ParsedQuery {
        if let Some(llm) = llm
            && let Some(parsed) = Self::try_llm_parse(llm.as_ref(), query).await
        {
            return parsed;
        }
        ParsedQuery::fallback(query)
    }

    async fn try_llm_parse(llm: &dyn Llm, query: &str) -> Option<ParsedQuery> {
        let response = llm
            .generate(
                query,
                GenerateOptions {
                    system: Some(Self::SYSTEM_PROMPT.to_owned()),
                    temperature: Some(0.0),
                    max_tokens: Some(512),
                },
            )
            .await
            .ok()?;
        let payload: LlmQueryPayload = serde_json::from_str(response.trim()).ok()?;
        let keywords = if payload.keywords.is_empty() { tokenize(query) } else { payload.keywords };
        Some(ParsedQuery { keywords, filters: payload.filters, intent: payload.intent })
    }
}

#[cfg(test)]
mod tests {
    use catalog_domain::entities::{Lifecycle, ProductionReadiness, ProjectType};

    use super::*;

    fn project(id: &str) -> Project {
        Project {
            id: id.to_owned(),
            org_id: "org1".to_owned(),
            created_at: 0,
            updated_at: 0,
            path: format!("/tmp/{id}"),
            name: id.to_owned(),
            title: None,
            description: None,
            project_type: ProjectType::Other,
            lifecycle: Lifecycle::Active,
            languages: vec!["rust".to_owned()],
            frameworks: vec![],
            tags: vec![],
            health_score: Some(80.0),
            production_readiness: ProductionReadiness::Beta,
            quality_score: None,
            quality_assessment: None,
            quality_indicators: None,
            last_quality_check_at: None,
            last_synced_at: None,
            last_commit_sha: None,
            repository_url: None,
            default_branch: None,
            github_stars: None,
            github_forks: None,
            github_watchers: None,
            open_issues: None,
            open_prs: None,
            loc_total: None,
            file_count: None,
            avg_complexity: None,
            test_coverage: None,
            extra_metadata: serde_json::Value::Null,
        }
    }

    #[test]
    fn min_health_score_filter_excludes_nulls() {
        let mut p = project("a");
        p.health_score = None;
        let results = vec![SearchResult { project: p, relevance_score: 1.0 }];
        let filters = SearchFilters { min_health_score: Some(10.0), ..Default::default() };
        assert!(apply_filters(&results, &filters).is_empty());
    }

    #[test]
    fn fuse_favors_the_better_combined_rank() {
        let weights = SearchWeights { fts: 0.6, semantic: 0.4 };
        // "a" wins lexically (rank 0) but never matches semantically; "b"
        // ranks 2nd lexically and 1st semantically, per scenario 5's setup.
        let fts_ranked = vec!["a".to_owned(), "b".to_owned(), "c".to_owned()];
        let semantic_ranked = vec!["b".to_owned(), "c".to_owned()];
        let fused = fuse_rrf(weights, &fts_ranked, &semantic_ranked, 10);
        let order: Vec<&str> = fused.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(order[0], "b");
    }

    struct StubLlm {
        response: Option<String>,
    }

    #[async_trait::async_trait]
    impl Llm for StubLlm {
        async fn generate(&self, _prompt: &str, _options: GenerateOptions) -> Result<String> {
            unimplemented!("only expand_query is exercised")
        }

        async fn expand_query(&self, _query: &str) -> Result<String> {
            self.response.clone().ok_or_else(|| catalog_domain::error::Error::transient("down"))
        }
    }

    #[tokio::test]
    async fn expand_query_with_uses_the_expansion_when_it_fits() {
        let llm = StubLlm { response: Some("rust web framework api".to_owned()) };
        let expanded = expand_query_with(&llm, "rust web").await;
        assert_eq!(expanded, "rust web framework api");
    }

    #[tokio::test]
    async fn expand_query_with_falls_back_when_oversized() {
        let llm = StubLlm { response: Some("x".repeat(MAX_EXPANDED_QUERY_LEN)) };
        let expanded = expand_query_with(&llm, "rust web").await;
        assert_eq!(expanded, "rust web");
    }

    #[tokio::test]
    async fn expand_query_with_falls_back_on_llm_failure() {
        let llm = StubLlm { response: None };
        let expanded = expand_query_with(&llm, "rust web").await;
        assert_eq!(expanded, "rust web");
    }

    #[test]
    fn relax_drops_type_before_other_filters() {
        let mut filters = SearchFilters {
            project_type: Some("cli".to_owned()),
            lifecycle: Some("active".to_owned()),
            ..Default::default()
        };
        relax(&mut filters);
        assert!(filters.project_type.is_none());
        assert!(filters.lifecycle.is_some());
    }
}
