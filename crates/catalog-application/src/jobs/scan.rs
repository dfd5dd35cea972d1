//! `scan` job handler (§4.6). Walks one or more configured roots and
//! creates/updates the projects discovered under them.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use catalog_domain::entities::{Job, Project};
use catalog_domain::error::Result;
use catalog_domain::ports::CatalogStore;
use catalog_domain::utils::short_hash;
use serde::Deserialize;

use crate::discovery::{DiscoveredProject, DiscoveryOptions, ProjectDiscovery};

use super::{normalize, JobHandler};

/// Maximum number of per-path errors kept in the result payload.
const MAX_ERRORS: usize = 10;
/// Numbered suffixes tried before falling back to a hash suffix.
const MAX_NUMBERED_SUFFIX: u32 = 10;

#[derive(Debug, Default, Deserialize)]
struct ScanParams {
    #[serde(default)]
    paths: Vec<PathBuf>,
    #[serde(default)]
    max_depth: Option<usize>,
}

/// Walks configured filesystem roots, creating or updating the projects
/// found under them.
pub struct ScanHandler;

#[async_trait]
impl JobHandler for ScanHandler {
    async fn execute(&self, job: &Job, store: &dyn CatalogStore) -> Result<serde_json::Value> {
        let params: ScanParams = serde_json::from_value(job.result.clone()).unwrap_or_default();
        if params.paths.is_empty() {
            return Ok(serde_json::json!({"status": "skipped", "reason": "no_paths_configured"}));
        }

        let options = match params.max_depth {
            Some(max_depth) => DiscoveryOptions { max_depth, ..Default::default() },
            None => DiscoveryOptions::default(),
        };
        let discovery = ProjectDiscovery::new(options);

        let existing = store.projects().list(&job.org_id).await?;
        let mut used_names: HashSet<String> = existing.iter().map(|p| p.name.clone()).collect();
        let mut by_path: std::collections::HashMap<String, Project> =
            existing.into_iter().map(|p| (p.path.clone(), p)).collect();

        let mut discovered = 0usize;
        let mut created = 0usize;
        let mut updated = 0usize;
        let mut errors: Vec<String> = Vec::new();

        for root in &params.paths {
            let found = discovery.discover(root);
            for project in found {
                discovered += 1;
                match self.upsert(&job.org_id, &project, &mut by_path, &mut used_names, store).await {
                    Ok(true) => created += 1,
                    Ok(false) => updated += 1,
                    Err(error) => {
                        if errors.len() < MAX_ERRORS {
                            errors.push(format!("{}: {error}", project.path.display()));
                        }
                    }
                }
            }
        }

        Ok(serde_json::json!({
            "status": "completed",
            "discovered": discovered,
            "created": created,
            "updated": updated,
            "errors": errors,
        }))
    }
}

impl ScanHandler {
    /// Upsert one discovered project, returning `true` if a new project
    /// was created and `false` if an existing one was updated in place.
    async fn upsert(
        &self,
        org_id: &str,
        discovered: &DiscoveredProject,
        by_path: &mut std::collections::HashMap<String, Project>,
        used_names: &mut HashSet<String>,
        store: &dyn CatalogStore,
    ) -> Result<bool> {
        let path = discovered.path.to_string_lossy().into_owned();
        let manifest = &discovered.manifest;
        let now = chrono::Utc::now().timestamp();

        if let Some(existing) = by_path.get(&path) {
            let mut project = existing.clone();
            if let Some(name) = &manifest.name {
                project.title.get_or_insert_with(|| name.clone());
            }
            if let Some(description) = &manifest.description {
                project.description = Some(description.clone());
            }
            if !manifest.languages.is_empty() {
                project.languages = normalize(&manifest.languages);
            }
            if !manifest.frameworks.is_empty() {
                project.frameworks = normalize(&manifest.frameworks);
            }
            if let Some(url) = &manifest.repository_url {
                project.repository_url = Some(url.clone());
            }
            project.last_synced_at = Some(now);
            project.updated_at = now;

            store.projects().update(&project).await?;
            by_path.insert(path, project);
            Ok(false)
        } else {
            let base_name = manifest.name.clone().unwrap_or_else(|| {
                discovered.path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_else(|| "project".to_owned())
            });
            let name = self.generate_unique_name(&base_name, &discovered.path, used_names);
            used_names.insert(name.clone());

            let project = Project {
                id: uuid::Uuid::new_v4().to_string(),
                org_id: org_id.to_owned(),
                created_at: now,
                updated_at: now,
                path: path.clone(),
                name,
                title: manifest.name.clone(),
                description: manifest.description.clone(),
                project_type: catalog_domain::entities::ProjectType::default(),
                lifecycle: catalog_domain::entities::Lifecycle::default(),
                languages: normalize(&manifest.languages),
                frameworks: normalize(&manifest.frameworks),
                tags: normalize(&manifest.keywords),
                health_score: None,
                production_readiness: catalog_domain::entities::ProductionReadiness::default(),
                quality_score: None,
                quality_assessment: None,
                quality_indicators: None,
                last_quality_check_at: None,
                last_synced_at: Some(now),
                last_commit_sha: None,
                repository_url: manifest.repository_url.clone(),
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
                extra_metadata: manifest.extra.clone(),
            };

            store.projects().create(&project).await?;
            by_path.insert(path, project);
            Ok(true)
        }
    }

    /// `base` -> `base-disambiguator` -> `base-disambiguator-{2..10}` ->
    /// `base-<hash>` unique name cascade (§4.6). `base` is the
    /// manifest-declared name when present, else the project directory's
    /// own name. The disambiguator is the nearest path segment that
    /// differs from `base`: the project's own directory name when `base`
    /// came from the manifest, or its parent directory's name when `base`
    /// already *is* the directory name.
    fn generate_unique_name(&self, base: &str, path: &Path, used_names: &HashSet<String>) -> String {
        let base = base.to_owned();
        if !used_names.contains(&base) {
            return base;
        }

        let own_name = path.file_name().map(|n| n.to_string_lossy().into_owned());
        let disambiguator = if own_name.as_deref() == Some(base.as_str()) {
            path.parent().and_then(Path::file_name).map(|n| n.to_string_lossy().into_owned())
        } else {
            own_name
        };

        if let Some(disambiguator) = &disambiguator {
            let candidate = format!("{base}-{disambiguator}");
            if !used_names.contains(&candidate) {
                return candidate;
            }
            for suffix in 2..=MAX_NUMBERED_SUFFIX {
                let candidate = format!("{base}-{disambiguator}-{suffix}");
                if !used_names.contains(&candidate) {
                    return candidate;
                }
            }
        }

        format!("{base}-{}", short_hash(&path.to_string_lossy()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_name_falls_back_to_parent_then_hash() {
        let handler = ScanHandler;
        let mut used = HashSet::new();
        used.insert("demoapp".to_owned());
        used.insert("demoapp-repos".to_owned());

        let path = PathBuf::from("/home/user/repos/demoapp");
        let name = handler.generate_unique_name("demoapp", &path, &used);
        assert_eq!(name, "demoapp-repos-2");
    }

    #[test]
    fn unique_name_is_unchanged_when_available() {
        let handler = ScanHandler;
        let used = HashSet::new();
        let name = handler.generate_unique_name("demoapp", &PathBuf::from("/tmp/demoapp"), &used);
        assert_eq!(name, "demoapp");
    }

    #[test]
    fn unique_name_uses_manifest_declared_base_not_directory_name() {
        let handler = ScanHandler;
        let used = HashSet::new();
        let name = handler.generate_unique_name("svc", &PathBuf::from("/r/a"), &used);
        assert_eq!(name, "svc");
    }

    #[test]
    fn colliding_manifest_names_disambiguate_by_own_directory_name() {
        let handler = ScanHandler;
        let mut used = HashSet::new();
        used.insert("svc".to_owned());
        let name = handler.generate_unique_name("svc", &PathBuf::from("/r/b"), &used);
        assert_eq!(name, "svc-b");
    }
}
