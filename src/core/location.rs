//! Dependency location map.
//!
//! Packages are fetched into `<group dir>/<name>`. The group directory comes
//! from a `dependency-groups` declaration such as
//! `{control: [pid, odometry], foo: [bar]}`, which this module inverts into
//! `{pid: control, odometry: control, bar: foo}`. Unmapped packages land in
//! the default dependencies directory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::core::PackageSpec;

/// File name of a package manifest.
pub const MANIFEST_NAME: &str = "package.yml";

/// Maps package names to the directory group they are fetched into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationMap {
    default_dir: PathBuf,
    groups: HashMap<String, PathBuf>,
}

impl LocationMap {
    /// Create a map where every package lands in `default_dir`.
    pub fn new(default_dir: impl Into<PathBuf>) -> Self {
        LocationMap {
            default_dir: default_dir.into(),
            groups: HashMap::new(),
        }
    }

    /// Build a map from a group -> package names declaration.
    ///
    /// When a package is listed under several groups the last one wins.
    pub fn from_groups<'a, I, N>(default_dir: impl Into<PathBuf>, groups: I) -> Self
    where
        I: IntoIterator<Item = (&'a PathBuf, N)>,
        N: IntoIterator<Item = &'a String>,
    {
        let mut map = Self::new(default_dir);
        for (dir, names) in groups {
            for name in names {
                map.groups.insert(name.clone(), dir.clone());
            }
        }
        map
    }

    /// Assign a single package to a directory group.
    pub fn with_location(mut self, name: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        self.groups.insert(name.into(), dir.into());
        self
    }

    /// The directory unmapped packages are fetched into.
    pub fn default_dir(&self) -> &Path {
        &self.default_dir
    }

    /// The group directory for a package name.
    pub fn group_for(&self, name: &str) -> &Path {
        self.groups
            .get(name)
            .map(PathBuf::as_path)
            .unwrap_or(&self.default_dir)
    }

    /// The directory a package is fetched into.
    pub fn path_for(&self, spec: &PackageSpec) -> PathBuf {
        let name = spec.name();
        self.group_for(name).join(name)
    }

    /// The path of a package's manifest file.
    pub fn manifest_path_for(&self, spec: &PackageSpec) -> PathBuf {
        self.path_for(spec).join(MANIFEST_NAME)
    }
}
