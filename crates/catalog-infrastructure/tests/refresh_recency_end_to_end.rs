//! Verifies that `refresh` and `health_check` both thread a real commit
//! age into the health score's recency component (§4.5), rather than
//! always passing `None`.

use catalog_application::jobs::{HealthCheckHandler, JobHandler, RefreshHandler};
use catalog_domain::constants::HealthWeights;
use catalog_domain::entities::{
    Job, JobKind, JobStatus, Lifecycle, ProductionReadiness, Project, ProjectType,
};
use catalog_infrastructure::SeaOrmCatalogStore;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

fn bare_project(id: &str, org_id: &str, path: &str) -> Project {
    Project {
        id: id.to_owned(),
        org_id: org_id.to_owned(),
        created_at: 0,
        updated_at: 0,
        path: path.to_owned(),
        name: id.to_owned(),
        title: None,
        description: Some("has a description".to_owned()),
        project_type: ProjectType::default(),
        lifecycle: Lifecycle::default(),
        languages: vec![],
        frameworks: vec![],
        tags: vec![],
        health_score: None,
        production_readiness: ProductionReadiness::default(),
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

fn refresh_job(org_id: &str, project_id: &str) -> Job {
    Job {
        id: uuid::Uuid::new_v4().to_string(),
        org_id: org_id.to_owned(),
        created_at: 0,
        updated_at: 0,
        project_id: Some(project_id.to_owned()),
        kind: JobKind::Refresh,
        status: JobStatus::Running,
        priority: 0,
        attempts: 1,
        max_attempts: 3,
        run_after: 0,
        result: serde_json::Value::Null,
        last_error: None,
        started_at: Some(0),
        completed_at: None,
    }
}

fn health_check_job(org_id: &str) -> Job {
    Job {
        id: uuid::Uuid::new_v4().to_string(),
        org_id: org_id.to_owned(),
        created_at: 0,
        updated_at: 0,
        project_id: None,
        kind: JobKind::HealthCheck,
        status: JobStatus::Running,
        priority: 0,
        attempts: 1,
        max_attempts: 3,
        run_after: 0,
        result: serde_json::Value::Null,
        last_error: None,
        started_at: Some(0),
        completed_at: None,
    }
}

fn init_git_repo_with_fresh_commit(dir: &std::path::Path) {
    let run = |args: &[&str]| {
        let status = Command::new("git").args(args).current_dir(dir).status().expect("run git");
        assert!(status.success(), "git {args:?} failed");
    };
    run(&["init", "-q"]);
    run(&["config", "user.email", "test@example.com"]);
    run(&["config", "user.name", "test"]);
    run(&["add", "."]);
    run(&["commit", "-q", "-m", "initial"]);
}

#[tokio::test]
async fn recency_points_are_awarded_for_a_fresh_commit() {
    let store = SeaOrmCatalogStore::connect("sqlite::memory:").await.expect("connect");

    let with_git = tempdir().expect("tempdir");
    fs::write(with_git.path().join("README.md"), "hi").expect("write readme");
    init_git_repo_with_fresh_commit(with_git.path());

    let without_git = tempdir().expect("tempdir");
    fs::write(without_git.path().join("README.md"), "hi").expect("write readme");

    let project_with_git = bare_project("with-git", "O", &with_git.path().to_string_lossy());
    let project_without_git = bare_project("without-git", "O", &without_git.path().to_string_lossy());
    store.projects().create(&project_with_git).await.expect("create");
    store.projects().create(&project_without_git).await.expect("create");

    RefreshHandler.execute(&refresh_job("O", "with-git"), &store).await.expect("refresh with git");
    RefreshHandler.execute(&refresh_job("O", "without-git"), &store).await.expect("refresh without git");

    let refreshed_with_git = store.projects().get_by_id("O", "with-git").await.expect("get").expect("found");
    let refreshed_without_git =
        store.projects().get_by_id("O", "without-git").await.expect("get").expect("found");

    let score_with_git = refreshed_with_git.health_score.expect("health score set");
    let score_without_git = refreshed_without_git.health_score.expect("health score set");

    let expected_gap = HealthWeights::recency_points(0) / HealthWeights::TOTAL * 100.0;
    assert!((score_with_git - score_without_git - expected_gap).abs() < 1e-6);
}

#[tokio::test]
async fn health_check_also_awards_recency_points_for_a_fresh_commit() {
    let store = SeaOrmCatalogStore::connect("sqlite::memory:").await.expect("connect");

    let with_git = tempdir().expect("tempdir");
    fs::write(with_git.path().join("README.md"), "hi").expect("write readme");
    init_git_repo_with_fresh_commit(with_git.path());

    let without_git = tempdir().expect("tempdir");
    fs::write(without_git.path().join("README.md"), "hi").expect("write readme");

    let project_with_git = bare_project("with-git", "O", &with_git.path().to_string_lossy());
    let project_without_git = bare_project("without-git", "O", &without_git.path().to_string_lossy());
    store.projects().create(&project_with_git).await.expect("create");
    store.projects().create(&project_without_git).await.expect("create");

    HealthCheckHandler.execute(&health_check_job("O"), &store).await.expect("health check");

    let refreshed_with_git = store.projects().get_by_id("O", "with-git").await.expect("get").expect("found");
    let refreshed_without_git =
        store.projects().get_by_id("O", "without-git").await.expect("get").expect("found");

    let score_with_git = refreshed_with_git.health_score.expect("health score set");
    let score_without_git = refreshed_without_git.health_score.expect("health score set");

    let expected_gap = HealthWeights::recency_points(0) / HealthWeights::TOTAL * 100.0;
    assert!((score_with_git - score_without_git - expected_gap).abs() < 1e-6);
}
