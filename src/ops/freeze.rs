//! Dependency version pinning.
//!
//! `dump` records the checked out commit of every directory under the
//! dependencies root; `restore` checks each recorded commit out again.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::sources::git::git_program;
use crate::util::fs::{list_subdirs, read_to_string, write_string};
use crate::util::process::ProcessBuilder;

/// Directory name -> commit hash.
pub type PinnedVersions = BTreeMap<String, String>;

/// Outcome of a restore.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreReport {
    /// Directories checked out at their pinned commit
    pub restored: Vec<String>,

    /// Pinned directories that do not exist
    pub missing: Vec<String>,
}

/// Record `git rev-parse HEAD` for each directory under `deps_root`.
pub fn dump_versions(deps_root: &Path) -> Result<PinnedVersions> {
    let git = git_program();
    let mut versions = PinnedVersions::new();

    for dir in list_subdirs(deps_root)? {
        let name = match dir.file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            None => continue,
        };
        let sha = ProcessBuilder::new(&git)
            .args(["rev-parse", "HEAD"])
            .cwd(&dir)
            .read_stdout()
            .with_context(|| format!("failed to read commit of {}", dir.display()))?;

        tracing::debug!("{} is at {}", name, sha);
        versions.insert(name, sha);
    }

    Ok(versions)
}

/// Check out every pinned commit. Missing directories are skipped.
///
/// Every entry is validated before anything is checked out: names must be
/// plain directory names under `deps_root`.
pub fn restore_versions(deps_root: &Path, versions: &PinnedVersions) -> Result<RestoreReport> {
    for (name, sha) in versions {
        if !is_plain_dir_name(name) {
            bail!("invalid pinned dependency name `{}`: expected a directory name", name);
        }
        if sha.is_empty() || sha.starts_with('-') {
            bail!("invalid pinned commit `{}` for `{}`", sha, name);
        }
    }

    let git = git_program();
    let mut report = RestoreReport::default();

    for (name, sha) in versions {
        let dir = deps_root.join(name);
        if !dir.is_dir() {
            tracing::warn!("{} is pinned but {} does not exist", name, dir.display());
            report.missing.push(name.clone());
            continue;
        }

        ProcessBuilder::new(&git)
            .args(["checkout", "--quiet", sha.as_str()])
            .cwd(&dir)
            .exec_and_check()
            .with_context(|| format!("failed to check out {} in {}", sha, dir.display()))?;

        tracing::info!("Restored {} at {}", name, sha);
        report.restored.push(name.clone());
    }

    Ok(report)
}

fn is_plain_dir_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.contains(['/', '\\'])
}

/// Serialize pinned versions as pretty JSON.
pub fn to_json(versions: &PinnedVersions) -> Result<String> {
    serde_json::to_string_pretty(versions).context("failed to serialize pinned versions")
}

/// Parse pinned versions from JSON.
pub fn from_json(content: &str) -> Result<PinnedVersions> {
    serde_json::from_str(content).context("failed to parse pinned versions")
}

/// Write pinned versions to a file.
pub fn save(versions: &PinnedVersions, path: &Path) -> Result<()> {
    let mut json = to_json(versions)?;
    json.push('\n');
    write_string(path, &json)
}

/// Read pinned versions from a file.
pub fn load(path: &Path) -> Result<PinnedVersions> {
    from_json(&read_to_string(path)?)
        .with_context(|| format!("invalid versions file: {}", path.display()))
}

/// Resolve the dependencies root against a project directory.
pub fn deps_root(project_dir: &Path, dependencies_dir: &Path) -> PathBuf {
    project_dir.join(dependencies_dir)
}
