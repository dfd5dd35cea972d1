//! `quality_assessment` job handler (§4.6). Recomputes quality indicators
//! and the composite quality score for projects that need it.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use catalog_domain::entities::Job;
use catalog_domain::error::Result;
use catalog_domain::ports::{CatalogStore, Llm};
use serde::Deserialize;

use crate::quality;

use super::JobHandler;

#[derive(Debug, Default, Deserialize)]
struct QualityAssessmentParams {
    #[serde(default)]
    force_refresh: bool,
}

/// Recomputes quality indicators and score for an org's projects.
pub struct QualityAssessmentHandler {
    llm: Option<Arc<dyn Llm>>,
}

impl QualityAssessmentHandler {
    /// Construct a handler over the given (optional) LLM port.
    #[must_use]
    pub fn new(llm: Option<Arc<dyn Llm>>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl JobHandler for QualityAssessmentHandler {
    async fn execute(&self, job: &Job, store: &dyn CatalogStore) -> Result<serde_json::Value> {
        let params: QualityAssessmentParams = serde_json::from_value(job.result.clone()).unwrap_or_default();

        let all_projects = store.projects().list(&job.org_id).await?;
        let targets: Vec<_> = all_projects
            .into_iter()
            .filter(|project| params.force_refresh || project.quality_score.is_none())
            .collect();

        let total = targets.len();
        let mut assessed = 0usize;

        for mut project in targets {
            let path = Path::new(&project.path);
            if !path.is_dir() {
                continue;
            }

            let indicators = quality::scan_quality_indicators(path);
            let readme = read_readme(path);
            let file_names: Vec<String> = std::fs::read_dir(path)
                .map(|entries| entries.flatten().map(|e| e.file_name().to_string_lossy().into_owned()).collect())
                .unwrap_or_default();

            let assessment = quality::assess_quality(
                self.llm.as_ref(),
                &project.name,
                project.description.as_deref(),
                &project.languages,
                &project.frameworks,
                &indicators,
                readme.as_deref(),
                &file_names,
            )
            .await;

            let now = chrono::Utc::now().timestamp();
            project.production_readiness = assessment.production_readiness;
            project.quality_score = Some(assessment.quality_score);
            project.quality_assessment = Some(assessment.payload);
            project.quality_indicators = Some(indicators);
            project.last_quality_check_at = Some(now);
            project.updated_at = now;

            store.projects().update(&project).await?;
            assessed += 1;
        }

        Ok(serde_json::json!({"status": "completed", "assessed": assessed, "total": total}))
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
