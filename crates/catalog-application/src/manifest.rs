//! Manifest Reader use case (C1).
//!
//! Recognises the manifest formats enumerated in spec §4.1, in descending
//! priority order, and normalizes each into a [`Manifest`]. A directory
//! with no recognised manifest falls back to its own name plus whatever
//! languages a shallow extension scan turns up.

use std::collections::BTreeMap;
use std::path::Path;

use catalog_domain::constants::{EXTENSION_LANGUAGES, FRAMEWORK_TABLE};
use catalog_domain::entities::Manifest;
use serde_json::Value;

/// One recognised manifest file name (or `.csproj` suffix) and its
/// priority, checked in the order given by spec §4.1.
const MANIFEST_CANDIDATES: &[(&str, i32)] = &[
    ("catalog-info.yaml", 100),
    ("pyproject.toml", 90),
    ("package.json", 85),
    ("Cargo.toml", 80),
    ("go.mod", 75),
    ("setup.py", 50),
    ("setup.cfg", 50),
    ("requirements.txt", 50),
    ("pom.xml", 55),
    ("build.gradle", 55),
    ("Gemfile", 50),
];

/// Parses manifest files into normalized [`Manifest`] records.
#[derive(Debug, Default, Clone, Copy)]
pub struct ManifestReader;

impl ManifestReader {
    /// Find the highest-priority recognised manifest directly under `dir`,
    /// including any `*.csproj` file, and return its path.
    #[must_use]
    pub fn detect_best_manifest(dir: &Path) -> Option<std::path::PathBuf> {
        let mut best: Option<(std::path::PathBuf, i32)> = None;

        for (file_name, priority) in MANIFEST_CANDIDATES {
            let candidate = dir.join(file_name);
            if candidate.is_file() && best.as_ref().is_none_or(|(_, p)| *priority > *p) {
                best = Some((candidate, *priority));
            }
        }

        if let Ok(entries) = std::fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) == Some("csproj")
                    && best.as_ref().is_none_or(|(_, p)| 60 > *p)
                {
                    best = Some((path, 60));
                }
            }
        }

        best.map(|(path, _)| path)
    }

    /// Parse the manifest at `path`, falling back to a bare directory-name
    /// manifest on any parse error. Never fails the enclosing job.
    #[must_use]
    pub fn parse_manifest(path: &Path, project_dir: &Path) -> Manifest {
        let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        let result = match file_name {
            "Cargo.toml" => Self::parse_cargo_toml(path),
            "package.json" => Self::parse_package_json(path, project_dir),
            "pyproject.toml" => Self::parse_pyproject(path),
            "go.mod" => Self::parse_go_mod(path),
            "catalog-info.yaml" => Self::parse_catalog_info(path),
            _ if file_name.ends_with(".csproj") => Self::parse_csproj(path),
            _ => None,
        };

        result.unwrap_or_else(|| {
            tracing::warn!(path = %path.display(), "manifest_parse_error, falling back to directory name");
            Manifest {
                name: Some(Self::dir_name(project_dir)),
                languages: detect_languages(project_dir),
                ..Manifest::empty()
            }
        })
    }

    fn dir_name(dir: &Path) -> String {
        dir.file_name().and_then(|n| n.to_str()).unwrap_or("unknown").to_owned()
    }

    fn parse_cargo_toml(path: &Path) -> Option<Manifest> {
        let text = std::fs::read_to_string(path).ok()?;
        let doc: toml::Value = toml::from_str(&text).ok()?;
        let package = doc.get("package")?.as_table()?;
        let deps = doc.get("dependencies").and_then(|d| d.as_table());

        let dependencies = deps.map(toml_table_to_dependency_map).unwrap_or_default();
        let frameworks = detect_frameworks(dependencies.keys());

        Some(Manifest {
            name: package.get("name").and_then(|v| v.as_str()).map(str::to_owned),
            title: None,
            description: package.get("description").and_then(|v| v.as_str()).map(str::to_owned),
            version: package.get("version").and_then(|v| v.as_str()).map(str::to_owned),
            languages: vec!["rust".to_owned()],
            frameworks,
            license: package.get("license").and_then(|v| v.as_str()).map(str::to_owned),
            repository_url: package.get("repository").and_then(|v| v.as_str()).map(str::to_owned),
            keywords: package
                .get("keywords")
                .and_then(|v| v.as_array())
                .map(|a| a.iter().filter_map(|v| v.as_str().map(str::to_owned)).collect())
                .unwrap_or_default(),
            dependencies,
            extra: Value::Null,
        })
    }

    fn parse_package_json(path: &Path, project_dir: &Path) -> Option<Manifest> {
        let text = std::fs::read_to_string(path).ok()?;
        let doc: Value = serde_json::from_str(&text).ok()?;

        let mut dependencies: BTreeMap<String, String> = BTreeMap::new();
        for key in ["dependencies", "devDependencies"] {
            if let Some(map) = doc.get(key).and_then(Value::as_object) {
                for (name, version) in map {
                    dependencies.insert(name.clone(), version.as_str().unwrap_or("").to_owned());
                }
            }
        }

        let has_typescript =
            project_dir.join("tsconfig.json").is_file() || dependencies.contains_key("typescript");
        let languages = if has_typescript {
            vec!["typescript".to_owned(), "javascript".to_owned()]
        } else {
            vec!["javascript".to_owned()]
        };

        let repository_url = match doc.get("repository") {
            Some(Value::Object(map)) => map.get("url").and_then(Value::as_str).map(str::to_owned),
            Some(Value::String(s)) => Some(s.clone()),
            _ => None,
        };

        Some(Manifest {
            name: doc.get("name").and_then(Value::as_str).map(str::to_owned),
            title: None,
            description: doc.get("description").and_then(Value::as_str).map(str::to_owned),
            version: doc.get("version").and_then(Value::as_str).map(str::to_owned),
            languages,
            frameworks: detect_frameworks(dependencies.keys()),
            license: doc.get("license").and_then(Value::as_str).map(str::to_owned),
            repository_url,
            keywords: doc
                .get("keywords")
                .and_then(Value::as_array)
                .map(|a| a.iter().filter_map(|v| v.as_str().map(str::to_owned)).collect())
                .unwrap_or_default(),
            dependencies,
            extra: Value::Null,
        })
    }

    fn parse_pyproject(path: &Path) -> Option<Manifest> {
        let text = std::fs::read_to_string(path).ok()?;
        let doc: toml::Value = toml::from_str(&text).ok()?;
        let empty = toml::value::Table::new();
        let project = doc.get("project").and_then(|v| v.as_table()).unwrap_or(&empty);
        let poetry = doc
            .get("tool")
            .and_then(|v| v.get("poetry"))
            .and_then(|v| v.as_table())
            .unwrap_or(&empty);

        let name = project
            .get("name")
            .or_else(|| poetry.get("name"))
            .and_then(|v| v.as_str())
            .map(str::to_owned);
        let description = project
            .get("description")
            .or_else(|| poetry.get("description"))
            .and_then(|v| v.as_str())
            .map(str::to_owned);
        let version = project
            .get("version")
            .or_else(|| poetry.get("version"))
            .and_then(|v| v.as_str())
            .map(str::to_owned);

        let mut dependencies = BTreeMap::new();
        if let Some(array) = project.get("dependencies").and_then(|v| v.as_array()) {
            for dep in array {
                if let Some(spec) = dep.as_str() {
                    let dep_name = spec
                        .split([' ', '>', '<', '=', '~', '!', '['])
                        .next()
                        .unwrap_or(spec)
                        .trim();
                    if !dep_name.is_empty() {
                        dependencies.insert(dep_name.to_owned(), String::new());
                    }
                }
            }
        }
        if let Some(table) = poetry.get("dependencies").and_then(|v| v.as_table()) {
            dependencies.extend(toml_table_to_dependency_map(table));
        }

        Some(Manifest {
            name,
            title: None,
            description,
            version,
            languages: vec!["python".to_owned()],
            frameworks: detect_frameworks(dependencies.keys()),
            license: None,
            repository_url: None,
            keywords: Vec::new(),
            dependencies,
            extra: Value::Null,
        })
    }

    fn parse_go_mod(path: &Path) -> Option<Manifest> {
        let text = std::fs::read_to_string(path).ok()?;
        let module_re = regex::Regex::new(r"(?m)^module\s+(\S+)").ok()?;
        let dep_re = regex::Regex::new(r"(?m)^\s+(\S+)\s+v([\d.]+)").ok()?;

        let name = module_re.captures(&text).and_then(|c| c.get(1)).map(|m| m.as_str().to_owned());
        let dependencies = dep_re
            .captures_iter(&text)
            .map(|c| (c[1].to_owned(), c[2].to_owned()))
            .collect();

        Some(Manifest {
            name,
            languages: vec!["go".to_owned()],
            dependencies,
            ..Manifest::empty()
        })
    }

    fn parse_csproj(path: &Path) -> Option<Manifest> {
        let text = std::fs::read_to_string(path).ok()?;
        let name = extract_xml_text(&text, "AssemblyName")
            .or_else(|| extract_xml_text(&text, "RootNamespace"));
        let frameworks = if extract_xml_text(&text, "TargetFramework")
            .is_some_and(|f| f.to_lowercase().contains("net"))
        {
            vec![".NET".to_owned()]
        } else {
            Vec::new()
        };

        Some(Manifest { name, languages: vec!["csharp".to_owned()], frameworks, ..Manifest::empty() })
    }

    fn parse_catalog_info(path: &Path) -> Option<Manifest> {
        let text = std::fs::read_to_string(path).ok()?;
        let doc: serde_yaml::Value = serde_yaml::from_str(&text).ok()?;
        let metadata = doc.get("metadata");
        let spec = doc.get("spec");

        let string_array = |value: Option<&serde_yaml::Value>| -> Vec<String> {
            value
                .and_then(serde_yaml::Value::as_sequence)
                .map(|seq| seq.iter().filter_map(|v| v.as_str().map(str::to_owned)).collect())
                .unwrap_or_default()
        };

        Some(Manifest {
            name: metadata.and_then(|m| m.get("name")).and_then(|v| v.as_str()).map(str::to_owned),
            title: metadata.and_then(|m| m.get("title")).and_then(|v| v.as_str()).map(str::to_owned),
            description: metadata
                .and_then(|m| m.get("description"))
                .and_then(|v| v.as_str())
                .map(str::to_owned),
            languages: string_array(spec.and_then(|s| s.get("languages"))),
            frameworks: string_array(spec.and_then(|s| s.get("frameworks"))),
            keywords: string_array(metadata.and_then(|m| m.get("tags"))),
            extra: serde_json::to_value(&doc).unwrap_or(Value::Null),
            ..Manifest::empty()
        })
    }
}

fn toml_table_to_dependency_map(table: &toml::value::Table) -> BTreeMap<String, String> {
    table
        .iter()
        .map(|(name, value)| {
            let version = match value {
                toml::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (name.clone(), version)
        })
        .collect()
}

fn extract_xml_text(document: &str, tag: &str) -> Option<String> {
    use quick_xml::events::Event;
    use quick_xml::reader::Reader;

    let mut reader = Reader::from_str(document);
    let mut in_tag = false;
    loop {
        match reader.read_event().ok()? {
            Event::Start(e) if e.local_name().as_ref() == tag.as_bytes() => in_tag = true,
            Event::End(e) if e.local_name().as_ref() == tag.as_bytes() => in_tag = false,
            Event::Text(t) if in_tag => {
                return t
                    .decode()
                    .ok()
                    .and_then(|s| quick_xml::escape::unescape(&s).ok().map(|s| s.into_owned()));
            }
            Event::Eof => return None,
            _ => {}
        }
    }
}

/// Detect frameworks referenced by a set of dependency names (§4.1).
fn detect_frameworks<'a>(dependency_names: impl Iterator<Item = &'a String>) -> Vec<String> {
    let names: std::collections::HashSet<String> =
        dependency_names.map(|n| n.to_lowercase()).collect();
    FRAMEWORK_TABLE
        .iter()
        .filter(|(dep, _)| names.contains(*dep))
        .map(|(_, framework)| (*framework).to_owned())
        .collect()
}

/// Suffix-scan up to three distinct matches from the closed
/// extension -> language table (§4.1), used when no manifest is
/// recognised.
#[must_use]
pub fn detect_languages(dir: &Path) -> Vec<String> {
    let mut found = Vec::new();
    let mut seen = std::collections::HashSet::new();

    for entry in walkdir::WalkDir::new(dir).into_iter().filter_map(Result::ok) {
        if found.len() >= 3 {
            break;
        }
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(ext) = entry.path().extension().and_then(|e| e.to_str()) else {
            continue;
        };
        if let Some((_, language)) = EXTENSION_LANGUAGES.iter().find(|(e, _)| *e == ext)
            && seen.insert((*language).to_owned())
        {
            found.push((*language).to_owned());
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn detects_cargo_toml_over_readme() {
        let dir = tempdir().expect("tempdir");
        fs::write(
            dir.path().join("Cargo.toml"),
            "[package]\nname = \"demo\"\nversion = \"0.1.0\"\n",
        )
        .expect("write");

        let best = ManifestReader::detect_best_manifest(dir.path()).expect("found manifest");
        assert_eq!(best.file_name().and_then(|n| n.to_str()), Some("Cargo.toml"));
    }

    #[test]
    fn package_json_wins_over_cargo_toml() {
        let dir = tempdir().expect("tempdir");
        fs::write(dir.path().join("Cargo.toml"), "[package]\nname = \"demo\"\n").expect("write");
        fs::write(dir.path().join("package.json"), "{\"name\": \"demo\"}").expect("write");

        let best = ManifestReader::detect_best_manifest(dir.path()).expect("found manifest");
        assert_eq!(best.file_name().and_then(|n| n.to_str()), Some("package.json"));
    }

    #[test]
    fn parse_cargo_toml_detects_framework() {
        let dir = tempdir().expect("tempdir");
        let manifest_path = dir.path().join("Cargo.toml");
        fs::write(
            &manifest_path,
            "[package]\nname = \"demo\"\ndescription = \"d\"\n\n[dependencies]\ntokio = \"1\"\n",
        )
        .expect("write");

        let manifest = ManifestReader::parse_manifest(&manifest_path, dir.path());
        assert_eq!(manifest.name.as_deref(), Some("demo"));
        assert_eq!(manifest.languages, vec!["rust".to_owned()]);
        assert!(manifest.frameworks.contains(&"Tokio".to_owned()));
    }

    #[test]
    fn unreadable_manifest_falls_back_to_directory_name() {
        let dir = tempdir().expect("tempdir");
        let bad_path = dir.path().join("Cargo.toml");
        fs::write(&bad_path, "not valid toml {{{").expect("write");

        let manifest = ManifestReader::parse_manifest(&bad_path, dir.path());
        assert_eq!(
            manifest.name.as_deref(),
            dir.path().file_name().and_then(|n| n.to_str())
        );
    }
}
