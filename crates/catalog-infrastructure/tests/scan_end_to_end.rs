//! End-to-end scenarios 1 and 2 from the testable-properties section:
//! scanning a real filesystem layout against a real (in-memory) store and
//! checking the projects it creates.

use catalog_application::jobs::{JobHandler, ScanHandler};
use catalog_domain::entities::{Job, JobKind, JobStatus};
use catalog_infrastructure::SeaOrmCatalogStore;
use std::fs;
use tempfile::tempdir;

fn scan_job(org_id: &str, paths: &[&std::path::Path]) -> Job {
    let now = 0;
    Job {
        id: uuid::Uuid::new_v4().to_string(),
        org_id: org_id.to_owned(),
        created_at: now,
        updated_at: now,
        project_id: None,
        kind: JobKind::Scan,
        status: JobStatus::Running,
        priority: 0,
        attempts: 1,
        max_attempts: 3,
        run_after: now,
        result: serde_json::json!({"paths": paths.iter().map(|p| p.to_string_lossy()).collect::<Vec<_>>()}),
        last_error: None,
        started_at: Some(now),
        completed_at: None,
    }
}

#[tokio::test]
async fn discovers_a_rust_project() {
    let store = SeaOrmCatalogStore::connect("sqlite::memory:").await.expect("connect");
    let root = tempdir().expect("tempdir");
    let project_dir = root.path().join("p1");
    fs::create_dir_all(&project_dir).expect("mkdir");
    fs::write(
        project_dir.join("Cargo.toml"),
        "[package]\nname = \"demoapp\"\ndescription = \"Demo\"\n",
    )
    .expect("write manifest");

    let job = scan_job("O", &[root.path()]);
    ScanHandler.execute(&job, &store).await.expect("scan should succeed");

    let projects = store.projects().list("O").await.expect("list");
    assert_eq!(projects.len(), 1);
    let project = &projects[0];
    assert_eq!(project.name, "demoapp");
    assert_eq!(project.description.as_deref(), Some("Demo"));
    assert_eq!(project.languages, vec!["rust".to_owned()]);
    assert!(project.health_score.is_some_and(|score| score >= 10.0));
}

#[tokio::test]
async fn disambiguates_colliding_names_by_directory() {
    let store = SeaOrmCatalogStore::connect("sqlite::memory:").await.expect("connect");
    let root = tempdir().expect("tempdir");
    for dir in ["a", "b"] {
        let project_dir = root.path().join(dir);
        fs::create_dir_all(&project_dir).expect("mkdir");
        fs::write(project_dir.join("pyproject.toml"), "[project]\nname = \"svc\"\n").expect("write manifest");
    }

    let job = scan_job("O", &[root.path()]);
    ScanHandler.execute(&job, &store).await.expect("scan should succeed");

    let mut projects = store.projects().list("O").await.expect("list");
    projects.sort_by(|a, b| a.path.cmp(&b.path));
    assert_eq!(projects.len(), 2);

    let mut names: Vec<&str> = projects.iter().map(|p| p.name.as_str()).collect();
    names.sort_unstable();
    assert_eq!(names, ["svc", "svc-b"]);
    assert_ne!(projects[0].path, projects[1].path);
}
