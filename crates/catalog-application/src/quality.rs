//! Quality & Health Scoring use case (C5).

use std::path::Path;
use std::sync::Arc;

use catalog_domain::constants::HealthWeights;
use catalog_domain::entities::{ProductionReadiness, QualityIndicators};
use catalog_domain::ports::{GenerateOptions, Llm};
use serde::Deserialize;

const README_NAMES: &[&str] = &["README.md", "README.rst", "README.txt", "README"];
const LICENSE_NAMES: &[&str] = &["LICENSE", "LICENSE.md", "LICENSE.txt", "LICENCE", "COPYING"];
const TEST_MARKERS: &[&str] =
    &["test", "tests", "spec", "specs", "__tests__", "pytest.ini", "conftest.py", "jest.config.js"];
const CI_FILES: &[&str] = &[".gitlab-ci.yml", ".travis.yml", "Jenkinsfile", "azure-pipelines.yml"];
const CI_DIRS: &[&str] = &[".github/workflows", ".circleci"];
const DOC_DIRS: &[&str] = &["docs", "documentation", "doc", "wiki"];
const CHANGELOG_NAMES: &[&str] = &["CHANGELOG.md", "CHANGELOG", "HISTORY.md", "CHANGES.md"];
const CONTRIBUTING_NAMES: &[&str] = &["CONTRIBUTING.md", "CONTRIBUTING", "CONTRIBUTE.md"];
const SECURITY_NAMES: &[&str] = &["SECURITY.md", "SECURITY"];
const DOCKER_NAMES: &[&str] = &["Dockerfile", "docker-compose.yml", "docker-compose.yaml"];
const LINT_NAMES: &[&str] =
    &[".eslintrc", ".eslintrc.js", ".eslintrc.json", "pylintrc", ".flake8", ".prettierrc"];
const TYPE_HINT_NAMES: &[&str] = &["py.typed", "tsconfig.json", "tsconfig.base.json"];

/// Scan a project's filesystem for the boolean quality-indicator bundle
/// (§4.5). Returns the default (all-false) bundle if `project_path`
/// doesn't exist or can't be read.
#[must_use]
pub fn scan_quality_indicators(project_path: &Path) -> QualityIndicators {
    let Ok(entries) = std::fs::read_dir(project_path) else {
        return QualityIndicators::default();
    };
    let names: Vec<String> = entries.flatten().map(|e| e.file_name().to_string_lossy().into_owned()).collect();
    let has_any = |candidates: &[&str]| {
        names.iter().any(|name| candidates.iter().any(|c| c.eq_ignore_ascii_case(name)))
    };

    QualityIndicators {
        has_readme: has_any(README_NAMES),
        has_license: has_any(LICENSE_NAMES),
        has_tests: has_any(TEST_MARKERS),
        has_ci_cd: has_any(CI_FILES) || CI_DIRS.iter().any(|d| project_path.join(d).is_dir()),
        has_documentation: has_any(DOC_DIRS),
        has_changelog: has_any(CHANGELOG_NAMES),
        has_contributing: has_any(CONTRIBUTING_NAMES),
        has_security_policy: has_any(SECURITY_NAMES),
        has_package_json: names.iter().any(|n| n == "package.json"),
        has_docker: has_any(DOCKER_NAMES),
        has_linting: has_any(LINT_NAMES) || names.iter().any(|n| n == "pyproject.toml"),
        has_type_hints: has_any(TYPE_HINT_NAMES),
    }
}

/// Age in days of `project_path`'s most recent commit, or `None` if it
/// isn't a git repository or the `git` invocation fails. Shells out to
/// `git log -1 --format=%ct` rather than opening the pack files directly,
/// matching the original's subprocess approach.
#[must_use]
pub fn last_commit_age_days(project_path: &Path) -> Option<i64> {
    if !project_path.join(".git").exists() {
        return None;
    }

    let output = std::process::Command::new("git")
        .args(["log", "-1", "--format=%ct"])
        .current_dir(project_path)
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }

    let committed_at: i64 = String::from_utf8_lossy(&output.stdout).trim().parse().ok()?;
    let now = chrono::Utc::now().timestamp();
    Some((now - committed_at) / 86_400)
}

/// Compute the deterministic health score (0-100, §4.5) as the percentage
/// of the attainable weight actually earned.
#[must_use]
pub fn health_score(
    project_path: &Path,
    has_license: bool,
    description: Option<&str>,
    languages: &[String],
    frameworks: &[String],
    last_commit_age_days: Option<i64>,
) -> f64 {
    let mut earned = 0.0;

    if README_NAMES.iter().any(|name| project_path.join(name).is_file()) {
        earned += HealthWeights::README;
    }
    if has_license || LICENSE_NAMES.iter().any(|name| project_path.join(name).is_file()) {
        earned += HealthWeights::LICENSE;
    }
    if ["tests", "test", "spec", "__tests__"].iter().any(|d| project_path.join(d).is_dir()) {
        earned += HealthWeights::TESTS;
    }
    if CI_DIRS.iter().any(|d| project_path.join(d).is_dir())
        || CI_FILES.iter().any(|f| project_path.join(f).is_file())
    {
        earned += HealthWeights::CI;
    }
    if description.is_some_and(|d| !d.trim().is_empty()) {
        earned += HealthWeights::DESCRIPTION;
    }
    if let Some(age_days) = last_commit_age_days {
        earned += HealthWeights::recency_points(age_days);
    }
    if !languages.is_empty() {
        earned += HealthWeights::LANGUAGE;
    }
    if !frameworks.is_empty() {
        earned += HealthWeights::FRAMEWORK;
    }

    (earned / HealthWeights::TOTAL * 100.0).clamp(0.0, 100.0)
}

/// Structured result of a quality assessment, either LLM-produced or
/// derived from indicators alone.
#[derive(Debug, Clone)]
pub struct QualityAssessment {
    /// Assigned production-readiness band.
    pub production_readiness: ProductionReadiness,
    /// Composite score, mean of the five dimensions plus a completeness
    /// bonus, clamped to 100.
    pub quality_score: f64,
    /// Full structured payload persisted to `quality_assessment`.
    pub payload: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct LlmAssessmentPayload {
    production_readiness: String,
    code_quality: i32,
    documentation: i32,
    tests: i32,
    security: i32,
    maintainability: i32,
    #[serde(default)]
    key_features: Vec<String>,
    #[serde(default)]
    strengths: Vec<String>,
    #[serde(default)]
    weaknesses: Vec<String>,
    #[serde(default)]
    production_blockers: Vec<String>,
    #[serde(default)]
    recommended_improvements: Vec<String>,
    #[serde(default)]
    technology_stack: Vec<String>,
    #[serde(default)]
    use_cases: Vec<String>,
}

/// Assess a project's quality, preferring the LLM when available and
/// falling back to an indicator-only assessment otherwise (§4.5).
pub async fn assess_quality(
    llm: Option<&Arc<dyn Llm>>,
    name: &str,
    description: Option<&str>,
    languages: &[String],
    frameworks: &[String],
    indicators: &QualityIndicators,
    readme: Option<&str>,
    file_names: &[String],
) -> QualityAssessment {
    if let Some(llm) = llm
        && let Some(assessment) = try_llm_assessment(
            llm.as_ref(),
            name,
            description,
            languages,
            frameworks,
            indicators,
            readme,
            file_names,
        )
        .await
    {
        return assessment;
    }

    fallback_assessment(indicators)
}

async fn try_llm_assessment(
    llm: &dyn Llm,
    name: &str,
    description: Option<&str>,
    languages: &[String],
    frameworks: &[String],
    indicators: &QualityIndicators,
    readme: Option<&str>,
    file_names: &[String],
) -> Option<QualityAssessment> {
    let context = build_context(name, description, languages, frameworks, indicators, readme, file_names);
    let prompt = format!(
        "Assess the following project and respond with a single JSON object with fields \
         production_readiness, code_quality, documentation, tests, security, maintainability \
         (each 0-100), key_features, strengths, weaknesses, production_blockers, \
         recommended_improvements, technology_stack, use_cases.\n\n{context}"
    );

    let response = llm
        .generate(
            &prompt,
            GenerateOptions { system: None, temperature: Some(0.2), max_tokens: Some(1024) },
        )
        .await
        .ok()?;

    let parsed: LlmAssessmentPayload = serde_json::from_str(response.trim()).ok()?;
    let readiness = ProductionReadiness::parse_readiness(&parsed.production_readiness)?;
    let completeness = indicators.completeness_score();
    let dimension_mean = f64::from(
        parsed.code_quality + parsed.documentation + parsed.tests + parsed.security + parsed.maintainability,
    ) / 5.0;
    let quality_score = (dimension_mean + 0.1 * completeness).min(100.0);

    Some(QualityAssessment {
        production_readiness: readiness,
        quality_score,
        payload: serde_json::json!({
            "code_quality_score": parsed.code_quality,
            "documentation_score": parsed.documentation,
            "test_score": parsed.tests,
            "security_score": parsed.security,
            "maintainability_score": parsed.maintainability,
            "key_features": parsed.key_features,
            "strengths": parsed.strengths,
            "weaknesses": parsed.weaknesses,
            "production_blockers": parsed.production_blockers,
            "recommended_improvements": parsed.recommended_improvements,
            "technology_stack": parsed.technology_stack,
            "use_cases": parsed.use_cases,
        }),
    })
}

fn fallback_assessment(indicators: &QualityIndicators) -> QualityAssessment {
    let completeness = indicators.completeness_score();
    let readiness = if completeness >= 80.0 && indicators.has_tests && indicators.has_ci_cd {
        ProductionReadiness::Production
    } else if completeness >= 60.0 && indicators.has_tests {
        ProductionReadiness::Beta
    } else if completeness >= 40.0 {
        ProductionReadiness::Alpha
    } else {
        ProductionReadiness::Prototype
    };

    let mut weaknesses = Vec::new();
    let mut improvements = Vec::new();
    if !indicators.has_tests {
        weaknesses.push("no test suite detected".to_owned());
        improvements.push("add a test suite".to_owned());
    }
    if !indicators.has_ci_cd {
        weaknesses.push("no CI configuration detected".to_owned());
        improvements.push("add continuous integration".to_owned());
    }
    if !indicators.has_readme {
        weaknesses.push("no README detected".to_owned());
        improvements.push("add a README".to_owned());
    }

    QualityAssessment {
        production_readiness: readiness,
        quality_score: completeness,
        payload: serde_json::json!({
            "weaknesses": weaknesses,
            "recommended_improvements": improvements,
            "source": "indicator_fallback",
        }),
    }
}

fn build_context(
    name: &str,
    description: Option<&str>,
    languages: &[String],
    frameworks: &[String],
    indicators: &QualityIndicators,
    readme: Option<&str>,
    file_names: &[String],
) -> String {
    let mut parts = vec![format!("Project: {name}")];
    if let Some(description) = description {
        parts.push(format!("Description: {description}"));
    }
    if !languages.is_empty() {
        parts.push(format!("Languages: {}", languages.join(", ")));
    }
    if !frameworks.is_empty() {
        parts.push(format!("Frameworks: {}", frameworks.join(", ")));
    }
    parts.push(format!("Indicators: {:?}", indicators));
    if let Some(readme) = readme {
        let truncated: String = readme.chars().take(3000).collect();
        parts.push(format!("README (truncated):\n{truncated}"));
    }
    if !file_names.is_empty() {
        let sample: Vec<&String> = file_names.iter().take(50).collect();
        parts.push(format!("Files: {sample:?}"));
    }
    parts.join("\n")
}

trait ReadinessParse {
    fn parse_readiness(value: &str) -> Option<ProductionReadiness>;
}

impl ReadinessParse for ProductionReadiness {
    fn parse_readiness(value: &str) -> Option<ProductionReadiness> {
        value.to_lowercase().parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn scan_detects_readme_and_license() {
        let dir = tempdir().expect("tempdir");
        fs::write(dir.path().join("README.md"), "hi").expect("write");
        fs::write(dir.path().join("LICENSE"), "mit").expect("write");

        let indicators = scan_quality_indicators(dir.path());
        assert!(indicators.has_readme);
        assert!(indicators.has_license);
        assert!(!indicators.has_tests);
    }

    #[test]
    fn health_score_is_percentage_of_total() {
        let dir = tempdir().expect("tempdir");
        fs::write(dir.path().join("README.md"), "hi").expect("write");

        let score = health_score(dir.path(), false, None, &[], &[], None);
        let expected = HealthWeights::README / HealthWeights::TOTAL * 100.0;
        assert!((score - expected).abs() < 1e-9);
    }

    #[test]
    fn fallback_assessment_flags_missing_tests() {
        let indicators = QualityIndicators::default();
        let assessment = fallback_assessment(&indicators);
        assert_eq!(assessment.production_readiness, ProductionReadiness::Prototype);
        assert_eq!(assessment.quality_score, 0.0);
    }

    #[test]
    fn fallback_assessment_reaches_production_at_eighty_with_tests_and_ci() {
        let indicators = QualityIndicators {
            has_readme: true,
            has_license: true,
            has_tests: true,
            has_ci_cd: true,
            has_documentation: true,
            has_changelog: true,
            has_contributing: true,
            has_security_policy: true,
            ..QualityIndicators::default()
        };
        assert!(indicators.completeness_score() >= 80.0);
        let assessment = fallback_assessment(&indicators);
        assert_eq!(assessment.production_readiness, ProductionReadiness::Production);
    }

    #[test]
    fn fallback_assessment_reaches_beta_at_sixty_with_tests_but_no_ci() {
        let indicators = QualityIndicators {
            has_readme: true,
            has_license: true,
            has_tests: true,
            has_ci_cd: false,
            has_documentation: true,
            has_changelog: true,
            ..QualityIndicators::default()
        };
        let completeness = indicators.completeness_score();
        assert!((60.0..80.0).contains(&completeness));
        let assessment = fallback_assessment(&indicators);
        assert_eq!(assessment.production_readiness, ProductionReadiness::Beta);
    }

    #[test]
    fn fallback_assessment_does_not_reach_beta_without_tests() {
        let indicators = QualityIndicators {
            has_readme: true,
            has_license: true,
            has_ci_cd: true,
            has_documentation: true,
            has_changelog: true,
            has_contributing: true,
            ..QualityIndicators::default()
        };
        assert!(indicators.completeness_score() >= 60.0);
        let assessment = fallback_assessment(&indicators);
        assert_eq!(assessment.production_readiness, ProductionReadiness::Alpha);
    }
}
