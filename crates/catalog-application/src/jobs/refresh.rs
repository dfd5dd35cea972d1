//! `refresh` job handler (§4.6). Re-reads one known project's manifest
//! and filesystem state and recomputes its health score.

use std::path::Path;

use async_trait::async_trait;
use catalog_domain::entities::Job;
use catalog_domain::error::{Error, Result};
use catalog_domain::ports::CatalogStore;

use crate::manifest::ManifestReader;
use crate::quality;

use super::{normalize, JobHandler};

/// Re-reads a single project's manifest and filesystem state.
pub struct RefreshHandler;

#[async_trait]
impl JobHandler for RefreshHandler {
    async fn execute(&self, job: &Job, store: &dyn CatalogStore) -> Result<serde_json::Value> {
        let project_id = job
            .project_id
            .as_deref()
            .ok_or_else(|| Error::invalid("refresh job requires project_id"))?;

        let mut project = store
            .projects()
            .get_by_id(&job.org_id, project_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("project {project_id}")))?;

        let path = Path::new(&project.path);
        if !path.is_dir() {
            return Ok(serde_json::json!({"status": "skipped", "reason": "path_missing"}));
        }

        if let Some(manifest_path) = ManifestReader::detect_best_manifest(path) {
            let manifest = ManifestReader::parse_manifest(&manifest_path, path);
            if let Some(name) = &manifest.name {
                project.title.get_or_insert_with(|| name.clone());
            }
            if let Some(description) = manifest.description {
                project.description = Some(description);
            }
            if !manifest.languages.is_empty() {
                project.languages = normalize(&manifest.languages);
            }
            if !manifest.frameworks.is_empty() {
                project.frameworks = normalize(&manifest.frameworks);
            }
            if let Some(url) = manifest.repository_url {
                project.repository_url = Some(url);
            }
        }

        let indicators = quality::scan_quality_indicators(path);
        let commit_age_days = quality::last_commit_age_days(path);
        project.health_score = Some(quality::health_score(
            path,
            indicators.has_license,
            project.description.as_deref(),
            &project.languages,
            &project.frameworks,
            commit_age_days,
        ));

        let now = chrono::Utc::now().timestamp();
        project.last_synced_at = Some(now);
        project.updated_at = now;

        store.projects().update(&project).await?;

        Ok(serde_json::json!({"status": "completed", "project_id": project.id}))
    }
}
