//! `catalog_jobs` table (§6).

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "catalog_jobs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(column_name = "organization_id")]
    pub organization_id: String,
    pub project_id: Option<String>,
    pub job_type: String,
    #[sea_orm(indexed)]
    pub status: String,
    pub priority: i32,
    pub attempts: i32,
    pub max_attempts: i32,
    #[sea_orm(indexed)]
    pub run_after: i64,
    pub result: Json,
    pub last_error: Option<Json>,
    pub started_at: Option<i64>,
    pub completed_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::job_run::Entity")]
    JobRun,
}

impl Related<super::job_run::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JobRun.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
