//! package.yml manifest parsing.
//!
//! A manifest is a YAML mapping. Besides the structural keys (`depends`,
//! `templates`, `dependency-dir`, `dependency-groups`), every key holding a
//! list of strings is a category of relative paths. Categories named
//! `target.<arch>` declare per-architecture sources.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};
use thiserror::Error;

use crate::core::location::LocationMap;
use crate::core::package_spec::{PackageSpec, SpecError};

/// Prefix of per-architecture source categories.
pub const TARGET_PREFIX: &str = "target.";

/// Error loading a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("manifest not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read manifest: {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse manifest: {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid `{key}` in {}: {message}", path.display())]
    Invalid {
        path: PathBuf,
        key: String,
        message: String,
    },

    #[error("invalid dependency in {}", path.display())]
    Spec {
        path: PathBuf,
        #[source]
        source: SpecError,
    },
}

impl ManifestError {
    /// Whether the manifest file simply does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ManifestError::NotFound { .. })
    }
}

/// The parsed package.yml manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    /// Declared dependencies, in declaration order
    depends: Vec<PackageSpec>,

    /// Category name -> relative paths
    categories: HashMap<String, Vec<String>>,

    /// Architecture names from `target.<arch>` keys, in declaration order
    target_archs: Vec<String>,

    /// Template name -> output path, in declaration order
    templates: Vec<(String, PathBuf)>,

    /// Override directory for dependencies
    dependency_dir: Option<PathBuf>,

    /// Group directory -> package names
    dependency_groups: Vec<(PathBuf, Vec<String>)>,
}

impl Manifest {
    /// Load a manifest from a file path.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                ManifestError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                ManifestError::Read {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;

        Self::parse(&content, path)
    }

    /// Parse manifest content. `path` is only used for error messages.
    pub fn parse(content: &str, path: &Path) -> Result<Self, ManifestError> {
        let value: Value = serde_yaml::from_str(content).map_err(|e| ManifestError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;

        match value {
            Value::Null => Ok(Manifest::default()),
            Value::Mapping(map) => Self::from_mapping(&map, path),
            _ => Err(invalid(path, "<root>", "manifest must be a mapping")),
        }
    }

    fn from_mapping(map: &Mapping, path: &Path) -> Result<Self, ManifestError> {
        let mut manifest = Manifest::default();

        for (key, value) in map {
            let key = key
                .as_str()
                .ok_or_else(|| invalid(path, "<root>", "keys must be strings"))?;

            match key {
                "depends" => {
                    for entry in sequence(value, path, key)? {
                        let spec = PackageSpec::from_yaml(entry).map_err(|e| {
                            ManifestError::Spec {
                                path: path.to_path_buf(),
                                source: e,
                            }
                        })?;
                        manifest.depends.push(spec);
                    }
                }
                "templates" => {
                    for (name, dest) in mapping(value, path, key)? {
                        let name = scalar(name).ok_or_else(|| {
                            invalid(path, key, "template names must be strings")
                        })?;
                        let dest = scalar(dest).ok_or_else(|| {
                            invalid(path, key, "template destinations must be strings")
                        })?;
                        manifest.templates.push((name, PathBuf::from(dest)));
                    }
                }
                "dependency-dir" => {
                    let dir = scalar(value)
                        .ok_or_else(|| invalid(path, key, "expected a directory path"))?;
                    manifest.dependency_dir = Some(PathBuf::from(dir));
                }
                "dependency-groups" => {
                    for (dir, names) in mapping(value, path, key)? {
                        let dir = scalar(dir)
                            .ok_or_else(|| invalid(path, key, "group names must be strings"))?;
                        let names = string_list(names, path, key)?;
                        manifest.dependency_groups.push((PathBuf::from(dir), names));
                    }
                }
                _ => match path_list(value) {
                    Some(entries) => {
                        if let Some(arch) = key.strip_prefix(TARGET_PREFIX) {
                            manifest.target_archs.push(arch.to_string());
                        }
                        manifest.categories.insert(key.to_string(), entries);
                    }
                    None => tracing::debug!("ignoring non-path key `{}` in {}", key, path.display()),
                },
            }
        }

        Ok(manifest)
    }

    /// Set the declared dependencies.
    pub fn with_depends(mut self, depends: Vec<PackageSpec>) -> Self {
        self.depends = depends;
        self
    }

    /// Add a category of relative paths.
    pub fn with_category<S: Into<String>>(
        mut self,
        category: impl Into<String>,
        entries: impl IntoIterator<Item = S>,
    ) -> Self {
        let category = category.into();
        if let Some(arch) = category.strip_prefix(TARGET_PREFIX) {
            if !self.target_archs.iter().any(|a| a == arch) {
                self.target_archs.push(arch.to_string());
            }
        }
        self.categories
            .insert(category, entries.into_iter().map(Into::into).collect());
        self
    }

    /// Declared dependencies.
    pub fn depends(&self) -> &[PackageSpec] {
        &self.depends
    }

    /// Whether the manifest declares any dependencies.
    pub fn has_depends(&self) -> bool {
        !self.depends.is_empty()
    }

    /// Entries of a category, if declared.
    pub fn category(&self, name: &str) -> Option<&[String]> {
        self.categories.get(name).map(Vec::as_slice)
    }

    /// Architecture names declared through `target.<arch>` keys.
    pub fn target_archs(&self) -> &[String] {
        &self.target_archs
    }

    /// Templates to render, as (template name, output path).
    pub fn templates(&self) -> &[(String, PathBuf)] {
        &self.templates
    }

    /// The `dependency-dir` override.
    pub fn dependency_dir(&self) -> Option<&Path> {
        self.dependency_dir.as_deref()
    }

    /// The `dependency-groups` declaration.
    pub fn dependency_groups(&self) -> &[(PathBuf, Vec<String>)] {
        &self.dependency_groups
    }

    /// Build the location map for this manifest's dependency graph.
    ///
    /// `dependency-dir` overrides `default_dir`.
    pub fn location_map(&self, default_dir: &Path) -> LocationMap {
        let dir = self.dependency_dir().unwrap_or(default_dir);
        LocationMap::from_groups(dir, self.dependency_groups.iter().map(|(d, n)| (d, n)))
    }
}

fn invalid(path: &Path, key: &str, message: &str) -> ManifestError {
    ManifestError::Invalid {
        path: path.to_path_buf(),
        key: key.to_string(),
        message: message.to_string(),
    }
}

fn sequence<'a>(value: &'a Value, path: &Path, key: &str) -> Result<&'a [Value], ManifestError> {
    match value {
        Value::Sequence(seq) => Ok(seq),
        Value::Null => Ok(&[]),
        _ => Err(invalid(path, key, "expected a list")),
    }
}

fn mapping<'a>(
    value: &'a Value,
    path: &Path,
    key: &str,
) -> Result<Vec<(&'a Value, &'a Value)>, ManifestError> {
    match value {
        Value::Mapping(map) => Ok(map.iter().collect()),
        Value::Null => Ok(Vec::new()),
        _ => Err(invalid(path, key, "expected a mapping")),
    }
}

fn string_list(value: &Value, path: &Path, key: &str) -> Result<Vec<String>, ManifestError> {
    sequence(value, path, key)?
        .iter()
        .map(|v| scalar(v).ok_or_else(|| invalid(path, key, "expected a list of paths")))
        .collect()
}

/// A list of paths, or `None` if the value holds anything else.
fn path_list(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Sequence(seq) => seq.iter().map(scalar).collect(),
        Value::Null => Some(Vec::new()),
        _ => None,
    }
}

/// Scalars are accepted as strings so `- 01.c` style entries survive YAML typing.
fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
