use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(
            "CREATE TABLE IF NOT EXISTS catalog_projects (
                id TEXT PRIMARY KEY,
                organization_id TEXT NOT NULL,
                name TEXT NOT NULL,
                title TEXT,
                description TEXT,
                path TEXT NOT NULL,
                type TEXT NOT NULL DEFAULT 'other',
                lifecycle TEXT NOT NULL DEFAULT 'active',
                languages TEXT NOT NULL DEFAULT '[]',
                frameworks TEXT NOT NULL DEFAULT '[]',
                tags TEXT NOT NULL DEFAULT '[]',
                repository_url TEXT,
                default_branch TEXT,
                license_spdx TEXT,
                health_score REAL,
                quality_score REAL,
                loc_total INTEGER,
                file_count INTEGER,
                avg_complexity REAL,
                test_coverage REAL,
                production_readiness TEXT NOT NULL DEFAULT 'unknown',
                quality_assessment TEXT,
                quality_indicators TEXT,
                last_quality_check_at INTEGER,
                last_synced_at INTEGER,
                last_commit_at INTEGER,
                last_commit_sha TEXT,
                github_stars INTEGER,
                github_forks INTEGER,
                github_watchers INTEGER,
                open_issues INTEGER,
                open_prs INTEGER,
                extra_metadata TEXT NOT NULL DEFAULT '{}',
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                UNIQUE (organization_id, name),
                UNIQUE (organization_id, path)
            )",
        )
        .await?;

        db.execute_unprepared("CREATE INDEX IF NOT EXISTS idx_catalog_projects_org ON catalog_projects (organization_id)").await?;
        db.execute_unprepared("CREATE INDEX IF NOT EXISTS idx_catalog_projects_lifecycle ON catalog_projects (lifecycle)").await?;
        db.execute_unprepared("CREATE INDEX IF NOT EXISTS idx_catalog_projects_type ON catalog_projects (type)").await?;
        db.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS idx_catalog_projects_readiness ON catalog_projects (production_readiness)",
        )
        .await?;

        db.execute_unprepared(
            "CREATE TABLE IF NOT EXISTS catalog_jobs (
                id TEXT PRIMARY KEY,
                organization_id TEXT NOT NULL,
                project_id TEXT,
                job_type TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending',
                priority INTEGER NOT NULL DEFAULT 5,
                attempts INTEGER NOT NULL DEFAULT 0,
                max_attempts INTEGER NOT NULL DEFAULT 3,
                run_after INTEGER NOT NULL,
                result TEXT NOT NULL DEFAULT 'null',
                last_error TEXT,
                started_at INTEGER,
                completed_at INTEGER,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )",
        )
        .await?;

        db.execute_unprepared("CREATE INDEX IF NOT EXISTS idx_catalog_jobs_status ON catalog_jobs (status)").await?;
        db.execute_unprepared("CREATE INDEX IF NOT EXISTS idx_catalog_jobs_run_after ON catalog_jobs (run_after)").await?;

        db.execute_unprepared(
            "CREATE TABLE IF NOT EXISTS catalog_job_runs (
                id TEXT PRIMARY KEY,
                job_id TEXT NOT NULL REFERENCES catalog_jobs (id) ON DELETE CASCADE,
                status TEXT NOT NULL,
                started_at INTEGER NOT NULL,
                finished_at INTEGER,
                result TEXT,
                error TEXT
            )",
        )
        .await?;

        db.execute_unprepared("CREATE INDEX IF NOT EXISTS idx_catalog_job_runs_job_id ON catalog_job_runs (job_id)")
            .await?;

        // External-content FTS5 index mirroring (name, title, description, path),
        // kept current via insert/delete/update triggers (§6).
        db.execute_unprepared(
            "CREATE VIRTUAL TABLE IF NOT EXISTS catalog_projects_fts USING fts5(
                name, title, description, path,
                content='catalog_projects',
                content_rowid='rowid'
            )",
        )
        .await?;

        db.execute_unprepared(
            "CREATE TRIGGER IF NOT EXISTS catalog_projects_fts_insert AFTER INSERT ON catalog_projects BEGIN
                INSERT INTO catalog_projects_fts(rowid, name, title, description, path)
                VALUES (new.rowid, new.name, new.title, new.description, new.path);
            END",
        )
        .await?;

        db.execute_unprepared(
            "CREATE TRIGGER IF NOT EXISTS catalog_projects_fts_delete AFTER DELETE ON catalog_projects BEGIN
                INSERT INTO catalog_projects_fts(catalog_projects_fts, rowid, name, title, description, path)
                VALUES ('delete', old.rowid, old.name, old.title, old.description, old.path);
            END",
        )
        .await?;

        db.execute_unprepared(
            "CREATE TRIGGER IF NOT EXISTS catalog_projects_fts_update AFTER UPDATE ON catalog_projects BEGIN
                INSERT INTO catalog_projects_fts(catalog_projects_fts, rowid, name, title, description, path)
                VALUES ('delete', old.rowid, old.name, old.title, old.description, old.path);
                INSERT INTO catalog_projects_fts(rowid, name, title, description, path)
                VALUES (new.rowid, new.name, new.title, new.description, new.path);
            END",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared("DROP TRIGGER IF EXISTS catalog_projects_fts_update").await?;
        db.execute_unprepared("DROP TRIGGER IF EXISTS catalog_projects_fts_delete").await?;
        db.execute_unprepared("DROP TRIGGER IF EXISTS catalog_projects_fts_insert").await?;
        db.execute_unprepared("DROP TABLE IF EXISTS catalog_projects_fts").await?;
        db.execute_unprepared("DROP TABLE IF EXISTS catalog_job_runs").await?;
        db.execute_unprepared("DROP TABLE IF EXISTS catalog_jobs").await?;
        db.execute_unprepared("DROP TABLE IF EXISTS catalog_projects").await?;
        Ok(())
    }
}
