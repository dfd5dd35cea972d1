//! Project Discovery use case (C2).
//!
//! Depth-first walk from a root, stopping recursion as soon as a directory
//! resolves to a manifest so that no discovered project's ancestor is ever
//! itself emitted.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use catalog_domain::constants::{DEFAULT_MAX_DEPTH, SKIP_DIRS};
use catalog_domain::entities::Manifest;

use crate::manifest::ManifestReader;

/// One discovered project: its absolute path and parsed manifest.
#[derive(Debug, Clone)]
pub struct DiscoveredProject {
    /// Absolute path to the project root.
    pub path: PathBuf,
    /// The manifest detected for this project.
    pub manifest: Manifest,
}

/// Options controlling a discovery walk.
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    /// Maximum recursion depth below the walk root.
    pub max_depth: usize,
    /// Whether to skip hidden (dotfile) directories.
    pub skip_hidden: bool,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self { max_depth: DEFAULT_MAX_DEPTH, skip_hidden: true }
    }
}

/// Walks a directory tree and yields the projects found under it.
#[derive(Debug, Default, Clone)]
pub struct ProjectDiscovery {
    options: DiscoveryOptions,
}

impl ProjectDiscovery {
    /// Create a discovery walker with the given options.
    #[must_use]
    pub fn new(options: DiscoveryOptions) -> Self {
        Self { options }
    }

    /// Discover every project under `root`. Unreadable directories are
    /// skipped silently (logged); each discovered path is unique and no
    /// project's ancestor is itself emitted.
    #[must_use]
    pub fn discover(&self, root: &Path) -> Vec<DiscoveredProject> {
        let mut projects = Vec::new();
        let mut visited = HashSet::new();
        let canonical_root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
        self.scan_dir(&canonical_root, 0, &mut visited, &mut projects);
        projects
    }

    fn scan_dir(
        &self,
        dir: &Path,
        depth: usize,
        visited: &mut HashSet<PathBuf>,
        projects: &mut Vec<DiscoveredProject>,
    ) {
        if depth > self.options.max_depth || !visited.insert(dir.to_path_buf()) {
            return;
        }

        if let Some(manifest_path) = ManifestReader::detect_best_manifest(dir) {
            let manifest = ManifestReader::parse_manifest(&manifest_path, dir);
            projects.push(DiscoveredProject { path: dir.to_path_buf(), manifest });
            return;
        }

        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(error) => {
                tracing::debug!(path = %dir.display(), %error, "skipping unreadable directory");
                return;
            }
        };

        for entry in entries.flatten() {
            let Ok(file_type) = entry.file_type() else { continue };
            if !file_type.is_dir() {
                continue;
            }
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if self.options.skip_hidden && name.starts_with('.') {
                continue;
            }
            if SKIP_DIRS.contains(&name.as_ref()) {
                continue;
            }
            self.scan_dir(&entry.path(), depth + 1, visited, projects);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn discovers_project_and_does_not_recurse_into_it() {
        let root = tempdir().expect("tempdir");
        let project_dir = root.path().join("demoapp");
        fs::create_dir_all(project_dir.join("src")).expect("mkdir");
        fs::write(project_dir.join("Cargo.toml"), "[package]\nname = \"demoapp\"\n")
            .expect("write");
        fs::write(project_dir.join("src/Cargo.toml"), "not a real manifest").expect("write");

        let discovery = ProjectDiscovery::default();
        let found = discovery.discover(root.path());

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].manifest.name.as_deref(), Some("demoapp"));
    }

    #[test]
    fn skips_fixed_skip_dirs() {
        let root = tempdir().expect("tempdir");
        fs::create_dir_all(root.path().join("node_modules/pkg")).expect("mkdir");
        fs::write(root.path().join("node_modules/pkg/package.json"), "{}").expect("write");

        let discovery = ProjectDiscovery::default();
        let found = discovery.discover(root.path());

        assert!(found.is_empty());
    }
}
