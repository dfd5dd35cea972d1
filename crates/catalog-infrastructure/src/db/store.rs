//! Catalog Store (C12): a `sea-orm`-backed implementation of the
//! `catalog_domain::ports` relational persistence traits over SQLite.
//! Grounded on the teacher's `mcb-providers` SeaORM repository pattern,
//! adapted from its workflow-entity shape to the catalog schema.

use async_trait::async_trait;
use catalog_domain::entities::{Job, JobRun, Project};
use catalog_domain::error::{Error, Result};
use catalog_domain::ports::{CatalogStore, FtsHit, JobRepository, JobRunRepository, ProjectRepository};
use chrono::Utc;
use sea_orm::{
    ColumnTrait, Condition, ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, Statement,
};
use sea_orm_migration::MigratorTrait;

use super::convert::{
    job_run_to_model, job_to_model, model_to_job, model_to_job_run, model_to_project, project_to_model,
};
use super::entities::{job, job_run, project};

fn map_db_err(error: DbErr) -> Error {
    let message = error.to_string();
    if message.contains("UNIQUE constraint failed") {
        Error::Constraint { message }
    } else {
        Error::transient(message)
    }
}

fn now_unix() -> i64 {
    Utc::now().timestamp()
}

/// `sea-orm`-backed [`CatalogStore`]. One instance owns the connection
/// pool for the process; cloning is cheap (`DatabaseConnection` is an
/// `Arc` internally).
pub struct SeaOrmCatalogStore {
    conn: DatabaseConnection,
}

impl SeaOrmCatalogStore {
    /// Open a connection pool at `database_url` with write-ahead
    /// journalling and a 30s busy timeout (§5), and run pending migrations.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transient`] if the connection or migration fails.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let mut options = ConnectOptions::new(database_url.to_owned());
        options.sqlx_logging(false);
        let conn = Database::connect(options).await.map_err(map_db_err)?;

        conn.execute_unprepared("PRAGMA journal_mode=WAL;").await.map_err(map_db_err)?;
        conn.execute_unprepared("PRAGMA busy_timeout=30000;").await.map_err(map_db_err)?;

        crate::db::migration::Migrator::up(&conn, None).await.map_err(map_db_err)?;

        Ok(Self { conn })
    }
}

impl CatalogStore for SeaOrmCatalogStore {
    fn projects(&self) -> &dyn ProjectRepository {
        self
    }

    fn jobs(&self) -> &dyn JobRepository {
        self
    }

    fn job_runs(&self) -> &dyn JobRunRepository {
        self
    }
}

#[async_trait]
impl ProjectRepository for SeaOrmCatalogStore {
    async fn create(&self, project: &Project) -> Result<()> {
        let model = project_to_model(project);
        let active: project::ActiveModel = model.into();
        project::Entity::insert(active).exec(&self.conn).await.map_err(map_db_err)?;
        Ok(())
    }

    async fn get_by_id(&self, org_id: &str, id: &str) -> Result<Option<Project>> {
        let found = project::Entity::find_by_id(id.to_owned())
            .filter(project::Column::OrganizationId.eq(org_id))
            .one(&self.conn)
            .await
            .map_err(map_db_err)?;
        found.map(model_to_project).transpose()
    }

    async fn get_by_name(&self, org_id: &str, name: &str) -> Result<Option<Project>> {
        let found = project::Entity::find()
            .filter(project::Column::OrganizationId.eq(org_id))
            .filter(project::Column::Name.eq(name))
            .one(&self.conn)
            .await
            .map_err(map_db_err)?;
        found.map(model_to_project).transpose()
    }

    async fn get_by_path(&self, org_id: &str, path: &str) -> Result<Option<Project>> {
        let found = project::Entity::find()
            .filter(project::Column::OrganizationId.eq(org_id))
            .filter(project::Column::Path.eq(path))
            .one(&self.conn)
            .await
            .map_err(map_db_err)?;
        found.map(model_to_project).transpose()
    }

    async fn list(&self, org_id: &str) -> Result<Vec<Project>> {
        let rows = project::Entity::find()
            .filter(project::Column::OrganizationId.eq(org_id))
            .order_by_asc(project::Column::Name)
            .all(&self.conn)
            .await
            .map_err(map_db_err)?;
        rows.into_iter().map(model_to_project).collect()
    }

    async fn update(&self, project: &Project) -> Result<()> {
        let model = project_to_model(project);
        let active: project::ActiveModel = model.into();
        project::Entity::update(active).exec(&self.conn).await.map_err(map_db_err)?;
        Ok(())
    }

    async fn delete(&self, org_id: &str, id: &str) -> Result<()> {
        project::Entity::delete_many()
            .filter(project::Column::Id.eq(id))
            .filter(project::Column::OrganizationId.eq(org_id))
            .exec(&self.conn)
            .await
            .map_err(map_db_err)?;
        Ok(())
    }

    async fn fts_query(&self, org_id: &str, query: &str, limit: usize) -> Result<Vec<FtsHit>> {
        let sql = "SELECT p.id as project_id, bm25(catalog_projects_fts) as rank
             FROM catalog_projects_fts
             JOIN catalog_projects p ON p.rowid = catalog_projects_fts.rowid
             WHERE catalog_projects_fts MATCH ? AND p.organization_id = ?
             ORDER BY rank LIMIT ?";
        let statement = Statement::from_sql_and_values(
            self.conn.get_database_backend(),
            sql,
            [query.to_owned().into(), org_id.to_owned().into(), (limit as u64).into()],
        );
        let rows = self.conn.query_all(statement).await.map_err(map_db_err)?;

        rows.into_iter()
            .map(|row| {
                let project_id: String = row.try_get("", "project_id").map_err(map_db_err)?;
                let rank: f64 = row.try_get("", "rank").map_err(map_db_err)?;
                Ok(FtsHit { project_id, rank })
            })
            .collect()
    }
}

#[async_trait]
impl JobRepository for SeaOrmCatalogStore {
    async fn create(&self, job: &Job) -> Result<()> {
        let model = job_to_model(job);
        let active: job::ActiveModel = model.into();
        job::Entity::insert(active).exec(&self.conn).await.map_err(map_db_err)?;
        Ok(())
    }

    async fn get_by_id(&self, org_id: &str, id: &str) -> Result<Option<Job>> {
        let found = job::Entity::find_by_id(id.to_owned())
            .filter(job::Column::OrganizationId.eq(org_id))
            .one(&self.conn)
            .await
            .map_err(map_db_err)?;
        Ok(found.map(model_to_job))
    }

    async fn claim_pending(&self, limit: usize) -> Result<Vec<Job>> {
        let now = now_unix();
        let candidates = job::Entity::find()
            .filter(job::Column::Status.eq("pending"))
            .filter(job::Column::RunAfter.lte(now))
            .order_by_asc(job::Column::Priority)
            .order_by_asc(job::Column::CreatedAt)
            .limit(limit as u64)
            .all(&self.conn)
            .await
            .map_err(map_db_err)?;

        let mut claimed = Vec::with_capacity(candidates.len());
        for model in candidates {
            let attempts = model.attempts + 1;
            let mut active: job::ActiveModel = model.into();
            active.attempts = Set(attempts);
            active.status = Set("running".to_owned());
            active.started_at = Set(Some(now));
            active.updated_at = Set(now);
            let updated = job::Entity::update(active).exec(&self.conn).await.map_err(map_db_err)?;
            claimed.push(model_to_job(updated));
        }
        Ok(claimed)
    }

    async fn list_stuck_running(&self, threshold: i64) -> Result<Vec<Job>> {
        let rows = job::Entity::find()
            .filter(job::Column::Status.eq("running"))
            .filter(Condition::any().add(job::Column::StartedAt.lte(threshold)).add(job::Column::StartedAt.is_null()))
            .all(&self.conn)
            .await
            .map_err(map_db_err)?;
        Ok(rows.into_iter().map(model_to_job).collect())
    }

    async fn update(&self, job: &Job) -> Result<()> {
        let mut model = job_to_model(job);
        model.updated_at = now_unix();
        let active: job::ActiveModel = model.into();
        job::Entity::update(active).exec(&self.conn).await.map_err(map_db_err)?;
        Ok(())
    }

    async fn delete(&self, org_id: &str, id: &str) -> Result<()> {
        job::Entity::delete_many()
            .filter(job::Column::Id.eq(id))
            .filter(job::Column::OrganizationId.eq(org_id))
            .exec(&self.conn)
            .await
            .map_err(map_db_err)?;
        Ok(())
    }
}

#[async_trait]
impl JobRunRepository for SeaOrmCatalogStore {
    async fn create(&self, run: &JobRun) -> Result<()> {
        let model = job_run_to_model(run);
        let active: job_run::ActiveModel = model.into();
        job_run::Entity::insert(active).exec(&self.conn).await.map_err(map_db_err)?;
        Ok(())
    }

    async fn update(&self, run: &JobRun) -> Result<()> {
        let model = job_run_to_model(run);
        let active: job_run::ActiveModel = model.into();
        job_run::Entity::update(active).exec(&self.conn).await.map_err(map_db_err)?;
        Ok(())
    }

    async fn list_for_job(&self, job_id: &str) -> Result<Vec<JobRun>> {
        let rows = job_run::Entity::find()
            .filter(job_run::Column::JobId.eq(job_id))
            .order_by_asc(job_run::Column::StartedAt)
            .all(&self.conn)
            .await
            .map_err(map_db_err)?;
        Ok(rows.into_iter().map(model_to_job_run).collect())
    }
}

#[cfg(test)]
mod tests {
    use catalog_domain::entities::{JobKind, JobStatus};

    use super::*;

    async fn in_memory_store() -> SeaOrmCatalogStore {
        SeaOrmCatalogStore::connect("sqlite::memory:").await.expect("in-memory store connects")
    }

    fn sample_project(org_id: &str, name: &str) -> Project {
        Project {
            id: uuid::Uuid::new_v4().to_string(),
            org_id: org_id.to_owned(),
            created_at: 0,
            updated_at: 0,
            path: format!("/tmp/{name}"),
            name: name.to_owned(),
            title: None,
            description: None,
            project_type: catalog_domain::entities::ProjectType::Other,
            lifecycle: catalog_domain::entities::Lifecycle::Active,
            languages: vec!["rust".to_owned()],
            frameworks: Vec::new(),
            tags: Vec::new(),
            health_score: None,
            production_readiness: catalog_domain::entities::ProductionReadiness::Unknown,
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
            extra_metadata: serde_json::json!({}),
        }
    }

    #[tokio::test]
    async fn create_then_get_by_name_round_trips() {
        let store = in_memory_store().await;
        let project = sample_project("org-a", "demo");
        store.projects().create(&project).await.expect("create");

        let fetched = store.projects().get_by_name("org-a", "demo").await.expect("get").expect("present");
        assert_eq!(fetched.id, project.id);
        assert_eq!(fetched.languages, vec!["rust".to_owned()]);
    }

    #[tokio::test]
    async fn duplicate_name_in_same_org_is_a_constraint_violation() {
        let store = in_memory_store().await;
        let a = sample_project("org-a", "demo");
        let mut b = sample_project("org-a", "demo");
        b.path = "/tmp/other".to_owned();

        store.projects().create(&a).await.expect("first insert succeeds");
        let result = store.projects().create(&b).await;
        assert!(matches!(result, Err(Error::Constraint { .. })));
    }

    #[tokio::test]
    async fn claim_pending_transitions_to_running_and_increments_attempts() {
        let store = in_memory_store().await;
        let job = Job {
            id: uuid::Uuid::new_v4().to_string(),
            org_id: "org-a".to_owned(),
            created_at: 0,
            updated_at: 0,
            project_id: None,
            kind: JobKind::Scan,
            status: JobStatus::Pending,
            priority: 0,
            attempts: 0,
            max_attempts: 3,
            run_after: 0,
            result: serde_json::Value::Null,
            last_error: None,
            started_at: None,
            completed_at: None,
        };
        store.jobs().create(&job).await.expect("create");

        let claimed = store.jobs().claim_pending(5).await.expect("claim");
        assert_eq!(claimed.len(), 1);
        assert_eq!(claimed[0].attempts, 1);
        assert_eq!(claimed[0].status, JobStatus::Running);
    }
}
