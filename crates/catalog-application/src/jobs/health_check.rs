//! `health_check` job handler (§4.6). Recomputes the deterministic health
//! score for every project in the org whose path still exists.

use std::path::Path;

use async_trait::async_trait;
use catalog_domain::entities::Job;
use catalog_domain::error::Result;
use catalog_domain::ports::CatalogStore;

use crate::quality;

use super::JobHandler;

/// Recomputes health scores across an organization's projects.
pub struct HealthCheckHandler;

#[async_trait]
impl JobHandler for HealthCheckHandler {
    async fn execute(&self, job: &Job, store: &dyn CatalogStore) -> Result<serde_json::Value> {
        let projects = store.projects().list(&job.org_id).await?;
        let now = chrono::Utc::now().timestamp();

        let mut checked = 0usize;
        let mut skipped = 0usize;

        for mut project in projects {
            let path = Path::new(&project.path);
            if !path.is_dir() {
                skipped += 1;
                continue;
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
            project.updated_at = now;

            store.projects().update(&project).await?;
            checked += 1;
        }

        Ok(serde_json::json!({"status": "completed", "checked": checked, "skipped": skipped}))
    }
}
