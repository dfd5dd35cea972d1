//! Parsed project manifest (`Cargo.toml`, `package.json`, `pyproject.toml`,
//! `go.mod`, ...), as produced by the manifest reader (§4.1).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Normalized view over whichever manifest file a project happened to
/// carry. Every field is best-effort: a manifest that lacks a field (or a
/// project with no recognised manifest at all) simply leaves it `None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    /// Declared package/project name.
    pub name: Option<String>,
    /// Declared display title, if distinct from `name`.
    pub title: Option<String>,
    /// Declared description.
    pub description: Option<String>,
    /// Declared version string.
    pub version: Option<String>,
    /// Languages implied by the manifest's own kind (e.g. a `Cargo.toml`
    /// implies `"rust"`).
    pub languages: Vec<String>,
    /// Frameworks detected from dependency names.
    pub frameworks: Vec<String>,
    /// Declared license identifier or file reference.
    pub license: Option<String>,
    /// Declared repository URL.
    pub repository_url: Option<String>,
    /// Declared keywords/topics.
    pub keywords: Vec<String>,
    /// Declared dependency name -> version-requirement map.
    pub dependencies: BTreeMap<String, String>,
    /// Anything else the manifest carried that doesn't map onto a named
    /// field above, preserved verbatim.
    pub extra: serde_json::Value,
}

impl Manifest {
    /// An empty manifest, used when no recognised manifest file was found
    /// under a project root.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }
}
