//! Fixed tables consulted by manifest reading, discovery, and scoring
//! (§4.1, §4.2, §4.5). Kept in the domain crate because every layer above
//! it (application use cases, provider adapters) needs the same tables
//! and none of them are configuration a deployer is expected to tune.

/// Directory names skipped unconditionally during project discovery (§4.2).
pub const SKIP_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    ".hg",
    ".svn",
    "__pycache__",
    ".venv",
    "venv",
    "target",
    "dist",
    "build",
    ".cache",
    ".tox",
    ".mypy_cache",
    ".pytest_cache",
    "vendor",
];

/// Default maximum recursion depth for project discovery.
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// File-extension to language table consulted when no manifest is
/// recognised (§4.1). Checked in order; discovery stops after three
/// matches.
pub const EXTENSION_LANGUAGES: &[(&str, &str)] = &[
    ("rs", "rust"),
    ("py", "python"),
    ("js", "javascript"),
    ("jsx", "javascript"),
    ("ts", "typescript"),
    ("tsx", "typescript"),
    ("go", "go"),
    ("java", "java"),
    ("kt", "kotlin"),
    ("rb", "ruby"),
    ("php", "php"),
    ("cs", "csharp"),
    ("cpp", "cpp"),
    ("cc", "cpp"),
    ("c", "c"),
    ("h", "c"),
    ("swift", "swift"),
    ("scala", "scala"),
    ("ex", "elixir"),
    ("exs", "elixir"),
    ("hs", "haskell"),
    ("lua", "lua"),
    ("sh", "shell"),
];

/// Dependency-name to framework label table (§4.1).
pub const FRAMEWORK_TABLE: &[(&str, &str)] = &[
    ("fastapi", "FastAPI"),
    ("flask", "Flask"),
    ("django", "Django"),
    ("react", "React"),
    ("vue", "Vue"),
    ("angular", "Angular"),
    ("svelte", "Svelte"),
    ("next", "Next.js"),
    ("nuxt", "Nuxt"),
    ("express", "Express"),
    ("nestjs", "NestJS"),
    ("tokio", "Tokio"),
    ("actix-web", "Actix Web"),
    ("axum", "Axum"),
    ("rocket", "Rocket"),
    ("spring-boot", "Spring Boot"),
    ("rails", "Ruby on Rails"),
    ("laravel", "Laravel"),
    ("gin", "Gin"),
    ("echo", "Echo"),
];

/// Relative priority of each recognised manifest kind (§4.1). Higher wins
/// when a directory carries more than one recognised manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ManifestPriority {
    /// `pom.xml` / `build.gradle` / `Gemfile`.
    JvmOrRuby = 55,
    /// Other Python manifest forms (`setup.py`, `setup.cfg`).
    OtherPython = 50,
    /// `.csproj` XML.
    CsProj = 60,
    /// Go-style module declaration.
    GoMod = 75,
    /// Rust-style TOML (`[package]`, `[dependencies]`).
    CargoToml = 80,
    /// JSON node manifest.
    PackageJson = 85,
    /// TOML project manifest (`[project]`/`[tool.poetry]`).
    PyProjectToml = 90,
    /// Backstage-style `catalog-info.yaml`.
    CatalogInfo = 100,
}

/// Weights applied by the deterministic health score (§4.5). Each entry is
/// the maximum points awarded for that criterion; the final score is the
/// percentage of the attainable total actually earned.
pub struct HealthWeights;

impl HealthWeights {
    /// `README.*` is present.
    pub const README: f64 = 15.0;
    /// A license file or manifest license field is present.
    pub const LICENSE: f64 = 10.0;
    /// A recognised tests directory is present.
    pub const TESTS: f64 = 15.0;
    /// A recognised CI configuration is present.
    pub const CI: f64 = 10.0;
    /// The project description is non-empty.
    pub const DESCRIPTION: f64 = 10.0;
    /// Maximum points for commit recency; actual award depends on age.
    pub const RECENCY_MAX: f64 = 20.0;
    /// At least one detected language.
    pub const LANGUAGE: f64 = 5.0;
    /// At least one detected framework.
    pub const FRAMEWORK: f64 = 5.0;

    /// Sum of every criterion's maximum, used to normalize to a percentage.
    pub const TOTAL: f64 = Self::README
        + Self::LICENSE
        + Self::TESTS
        + Self::CI
        + Self::DESCRIPTION
        + Self::RECENCY_MAX
        + Self::LANGUAGE
        + Self::FRAMEWORK;

    /// Points awarded for commit recency, banded by age in days.
    #[must_use]
    pub fn recency_points(age_days: i64) -> f64 {
        match age_days {
            d if d < 7 => 20.0,
            d if d < 30 => 15.0,
            d if d < 90 => 10.0,
            d if d < 365 => 5.0,
            _ => 0.0,
        }
    }
}
