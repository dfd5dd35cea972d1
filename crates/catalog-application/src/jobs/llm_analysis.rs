//! `llm_analysis` job handler (§4.6). Runs an LLM-backed qualitative pass
//! over one or all of an org's projects, filling gaps and reindexing the
//! embedding for each project it touches.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use catalog_domain::entities::{Job, Project, ProjectType};
use catalog_domain::error::Result;
use catalog_domain::ports::{GenerateOptions, Llm};
use catalog_domain::ports::CatalogStore;
use serde::Deserialize;

use crate::embedding::EmbeddingService;
use crate::quality;

use super::{normalize, JobHandler};

/// Maximum tags kept on a project after merging LLM-suggested tags.
const MAX_TAGS: usize = 10;
/// README bytes read for the analysis prompt context.
const README_BUDGET: usize = 4000;

#[derive(Debug, Deserialize)]
struct LlmProjectAnalysis {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    project_type: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    frameworks: Vec<String>,
    #[serde(default)]
    key_features: Vec<String>,
    #[serde(default)]
    improvement_suggestions: Vec<String>,
    #[serde(default)]
    complexity: Option<String>,
}

/// Runs an LLM-backed qualitative analysis over projects, then reindexes
/// their embeddings.
pub struct LlmAnalysisHandler {
    llm: Option<Arc<dyn Llm>>,
    embedding: Option<Arc<EmbeddingService>>,
}

impl LlmAnalysisHandler {
    /// Construct a handler over the given LLM and embedding ports. Both
    /// are optional: with no LLM, analysis is skipped per-project; with
    /// no embedding service, indexing is skipped.
    #[must_use]
    pub fn new(llm: Option<Arc<dyn Llm>>, embedding: Option<Arc<EmbeddingService>>) -> Self {
        Self { llm, embedding }
    }
}

#[async_trait]
impl JobHandler for LlmAnalysisHandler {
    async fn execute(&self, job: &Job, store: &dyn CatalogStore) -> Result<serde_json::Value> {
        let projects = match &job.project_id {
            Some(id) => store
                .projects()
                .get_by_id(&job.org_id, id)
                .await?
                .into_iter()
                .collect::<Vec<_>>(),
            None => store.projects().list(&job.org_id).await?,
        };

        let mut analyzed = 0usize;
        let mut errors: Vec<String> = Vec::new();

        for project in projects {
            match self.analyze_one(&job.org_id, project, store).await {
                Ok(()) => analyzed += 1,
                Err(error) => errors.push(error.to_string()),
            }
        }

        if let Some(embedding) = &self.embedding {
            embedding.persist_snapshot().await?;
        }

        Ok(serde_json::json!({"status": "completed", "analyzed": analyzed, "errors": errors}))
    }
}

impl LlmAnalysisHandler {
    async fn analyze_one(&self, org_id: &str, mut project: Project, store: &dyn CatalogStore) -> Result<()> {
        let path = Path::new(&project.path);
        if !path.is_dir() {
            return Ok(());
        }

        let readme = read_readme(path);
        let file_names = list_file_names(path);

        if let Some(llm) = &self.llm
            && let Some(analysis) = self.try_analyze(llm.as_ref(), &project, readme.as_deref(), &file_names).await
        {
            if project.description.is_none() {
                project.description = analysis.description;
            }
            if matches!(project.project_type, ProjectType::Other)
                && let Some(kind) = analysis.project_type.as_deref().and_then(ProjectType::parse_strict)
            {
                project.project_type = kind;
            }

            let mut tags = project.tags.clone();
            tags.extend(analysis.tags);
            project.tags = normalize(&tags).into_iter().take(MAX_TAGS).collect();

            let mut frameworks = project.frameworks.clone();
            frameworks.extend(analysis.frameworks);
            project.frameworks = normalize(&frameworks);

            let mut extra = project.extra_metadata.as_object().cloned().unwrap_or_default();
            extra.insert("key_features".to_owned(), serde_json::json!(analysis.key_features));
            extra.insert(
                "improvement_suggestions".to_owned(),
                serde_json::json!(analysis.improvement_suggestions),
            );
            if let Some(complexity) = analysis.complexity {
                extra.insert("complexity".to_owned(), serde_json::json!(complexity));
            }
            project.extra_metadata = serde_json::Value::Object(extra);
        }

        let now = chrono::Utc::now().timestamp();
        project.updated_at = now;
        store.projects().update(&project).await?;

        if let Some(embedding) = &self.embedding {
            embedding
                .index_project(
                    &project.id,
                    &project.name,
                    project.description.as_deref(),
                    readme.as_deref(),
                    &project.tags,
                    &project.languages,
                    &project.frameworks,
                    org_id,
                    false,
                )
                .await?;
        }

        Ok(())
    }

    async fn try_analyze(
        &self,
        llm: &dyn Llm,
        project: &Project,
        readme: Option<&str>,
        file_names: &[String],
    ) -> Option<LlmProjectAnalysis> {
        let indicators = quality::scan_quality_indicators(Path::new(&project.path));
        let context = format!(
            "Project: {}\nLanguages: {}\nIndicators: {:?}\nFiles: {:?}\n{}",
            project.name,
            project.languages.join(", "),
            indicators,
            file_names.iter().take(50).collect::<Vec<_>>(),
            readme
                .map(|r| format!("README (truncated):\n{}", r.chars().take(README_BUDGET).collect::<String>()))
                .unwrap_or_default(),
        );
        let prompt = format!(
            "Analyze this software project and respond with a single JSON object with fields \
             description, project_type, tags, frameworks, key_features, improvement_suggestions, \
             complexity.\n\n{context}"
        );

        let response = llm
            .generate(&prompt, GenerateOptions { system: None, temperature: Some(0.2), max_tokens: Some(1024) })
            .await
            .ok()?;
        serde_json::from_str(response.trim()).ok()
    }
}

fn read_readme(path: &Path) -> Option<String> {
    for name in ["README.md", "README.rst", "README.txt", "README"] {
        if let Ok(text) = std::fs::read_to_string(path.join(name)) {
            return Some(text);
        }
    }
    None
}

fn list_file_names(path: &Path) -> Vec<String> {
    std::fs::read_dir(path)
        .map(|entries| entries.flatten().map(|e| e.file_name().to_string_lossy().into_owned()).collect())
        .unwrap_or_default()
}
