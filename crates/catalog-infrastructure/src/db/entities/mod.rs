//! SeaORM entity models for the three relational tables (§6).

pub mod job;
pub mod job_run;
pub mod project;
