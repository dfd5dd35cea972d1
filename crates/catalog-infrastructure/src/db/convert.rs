//! Conversions between domain entities and SeaORM row models (§6, §4.12).

use std::str::FromStr;

use catalog_domain::entities::{
    Job, JobKind, JobRun, JobRunStatus, JobStatus, Lifecycle, ProductionReadiness, Project, ProjectType,
};
use catalog_domain::error::{Error, Result};

use super::entities::{job, job_run, project};

fn to_json_list(values: &[String]) -> String {
    serde_json::to_string(values).unwrap_or_else(|_| "[]".to_owned())
}

fn from_json_list(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}

fn parse_enum<T: FromStr + Default>(raw: &str) -> T {
    raw.parse().unwrap_or_default()
}

pub fn project_to_model(project: &Project) -> project::Model {
    project::Model {
        id: project.id.clone(),
        organization_id: project.org_id.clone(),
        name: project.name.clone(),
        title: project.title.clone(),
        description: project.description.clone(),
        path: project.path.clone(),
        project_type: project.project_type.to_string(),
        lifecycle: project.lifecycle.to_string(),
        languages: to_json_list(&project.languages),
        frameworks: to_json_list(&project.frameworks),
        tags: to_json_list(&project.tags),
        repository_url: project.repository_url.clone(),
        default_branch: project.default_branch.clone(),
        license_spdx: None,
        health_score: project.health_score,
        quality_score: project.quality_score,
        loc_total: project.loc_total,
        file_count: project.file_count,
        avg_complexity: project.avg_complexity,
        test_coverage: project.test_coverage,
        production_readiness: project.production_readiness.to_string(),
        quality_assessment: project.quality_assessment.clone(),
        quality_indicators: project
            .quality_indicators
            .map(|indicators| serde_json::to_value(indicators).unwrap_or(serde_json::Value::Null)),
        last_quality_check_at: project.last_quality_check_at,
        last_synced_at: project.last_synced_at,
        last_commit_at: None,
        last_commit_sha: project.last_commit_sha.clone(),
        github_stars: project.github_stars,
        github_forks: project.github_forks,
        github_watchers: project.github_watchers,
        open_issues: project.open_issues,
        open_prs: project.open_prs,
        extra_metadata: project.extra_metadata.clone(),
        created_at: project.created_at,
        updated_at: project.updated_at,
    }
}

pub fn model_to_project(model: project::Model) -> Result<Project> {
    Ok(Project {
        id: model.id,
        org_id: model.organization_id,
        created_at: model.created_at,
        updated_at: model.updated_at,
        path: model.path,
        name: model.name,
        title: model.title,
        description: model.description,
        project_type: parse_enum::<ProjectType>(&model.project_type),
        lifecycle: parse_enum::<Lifecycle>(&model.lifecycle),
        languages: from_json_list(&model.languages),
        frameworks: from_json_list(&model.frameworks),
        tags: from_json_list(&model.tags),
        health_score: model.health_score,
        production_readiness: parse_enum::<ProductionReadiness>(&model.production_readiness),
        quality_score: model.quality_score,
        quality_assessment: model.quality_assessment,
        quality_indicators: model
            .quality_indicators
            .map(|value| serde_json::from_value(value).map_err(Error::from))
            .transpose()?,
        last_quality_check_at: model.last_quality_check_at,
        last_synced_at: model.last_synced_at,
        last_commit_sha: model.last_commit_sha,
        repository_url: model.repository_url,
        default_branch: model.default_branch,
        github_stars: model.github_stars,
        github_forks: model.github_forks,
        github_watchers: model.github_watchers,
        open_issues: model.open_issues,
        open_prs: model.open_prs,
        loc_total: model.loc_total,
        file_count: model.file_count,
        avg_complexity: model.avg_complexity,
        test_coverage: model.test_coverage,
        extra_metadata: model.extra_metadata,
    })
}

pub fn job_to_model(job: &Job) -> job::Model {
    job::Model {
        id: job.id.clone(),
        organization_id: job.org_id.clone(),
        project_id: job.project_id.clone(),
        job_type: job.kind.to_string(),
        status: job.status.to_string(),
        priority: job.priority,
        attempts: job.attempts,
        max_attempts: job.max_attempts,
        run_after: job.run_after,
        result: job.result.clone(),
        last_error: job.last_error.clone(),
        started_at: job.started_at,
        completed_at: job.completed_at,
        created_at: job.created_at,
        updated_at: job.updated_at,
    }
}

pub fn model_to_job(model: job::Model) -> Job {
    Job {
        id: model.id,
        org_id: model.organization_id,
        created_at: model.created_at,
        updated_at: model.updated_at,
        project_id: model.project_id,
        kind: parse_enum::<JobKind>(&model.job_type),
        status: parse_enum::<JobStatus>(&model.status),
        priority: model.priority,
        attempts: model.attempts,
        max_attempts: model.max_attempts,
        run_after: model.run_after,
        result: model.result,
        last_error: model.last_error,
        started_at: model.started_at,
        completed_at: model.completed_at,
    }
}

pub fn job_run_to_model(run: &JobRun) -> job_run::Model {
    job_run::Model {
        id: run.id.clone(),
        job_id: run.job_id.clone(),
        status: run.status.to_string(),
        started_at: run.started_at,
        finished_at: run.finished_at,
        result: run.result.clone(),
        error: run.error.clone(),
    }
}

pub fn model_to_job_run(model: job_run::Model) -> JobRun {
    JobRun {
        id: model.id,
        job_id: model.job_id,
        status: parse_enum::<JobRunStatus>(&model.status),
        started_at: model.started_at,
        finished_at: model.finished_at,
        result: model.result,
        error: model.error,
    }
}
