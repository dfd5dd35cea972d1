//! `catalog_projects` table (§6).

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "catalog_projects")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(column_name = "organization_id", indexed)]
    pub organization_id: String,
    pub name: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub path: String,
    #[sea_orm(column_name = "type", indexed)]
    pub project_type: String,
    #[sea_orm(indexed)]
    pub lifecycle: String,
    /// JSON-encoded `Vec<String>`.
    pub languages: String,
    /// JSON-encoded `Vec<String>`.
    pub frameworks: String,
    /// JSON-encoded `Vec<String>`.
    pub tags: String,
    pub repository_url: Option<String>,
    pub default_branch: Option<String>,
    pub license_spdx: Option<String>,
    pub health_score: Option<f64>,
    pub quality_score: Option<f64>,
    pub loc_total: Option<i64>,
    pub file_count: Option<i64>,
    pub avg_complexity: Option<f64>,
    pub test_coverage: Option<f64>,
    #[sea_orm(indexed)]
    pub production_readiness: String,
    pub quality_assessment: Option<Json>,
    pub quality_indicators: Option<Json>,
    pub last_quality_check_at: Option<i64>,
    pub last_synced_at: Option<i64>,
    pub last_commit_at: Option<i64>,
    pub last_commit_sha: Option<String>,
    pub github_stars: Option<i64>,
    pub github_forks: Option<i64>,
    pub github_watchers: Option<i64>,
    pub open_issues: Option<i64>,
    pub open_prs: Option<i64>,
    pub extra_metadata: Json,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
