//! Test fixtures: recording fetchers and temporary projects.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::TempDir;

use crate::core::{Workspace, MANIFEST_NAME};
use crate::sources::Fetcher;
use crate::util::config::Config;
use crate::util::GlobalContext;

/// Fetcher that records every `(url, dest)` call.
///
/// When created with [`RecordingFetcher::materializing`], each fetch also
/// creates the destination directory under the project root and writes the
/// manifest registered for the URL, which simulates a successful clone.
#[derive(Debug, Default)]
pub struct RecordingFetcher {
    calls: Vec<(String, PathBuf)>,
    root: Option<PathBuf>,
    manifests: HashMap<String, String>,
}

impl RecordingFetcher {
    /// Create a fetcher that only records calls.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fetcher that materializes fetched directories under `root`.
    pub fn materializing(root: impl Into<PathBuf>) -> Self {
        RecordingFetcher {
            root: Some(root.into()),
            ..Self::default()
        }
    }

    /// Register the package.yml written when `url` is fetched.
    pub fn with_manifest(mut self, url: &str, manifest: &str) -> Self {
        self.manifests.insert(url.to_string(), manifest.to_string());
        self
    }

    /// All recorded calls, in order.
    pub fn calls(&self) -> &[(String, PathBuf)] {
        &self.calls
    }

    /// Recorded URLs, in order.
    pub fn urls(&self) -> Vec<&str> {
        self.calls.iter().map(|(url, _)| url.as_str()).collect()
    }

    /// Number of fetches of `url`.
    pub fn count(&self, url: &str) -> usize {
        self.calls.iter().filter(|(u, _)| u == url).count()
    }
}

impl Fetcher for RecordingFetcher {
    fn name(&self) -> &str {
        "recording"
    }

    fn fetch(&mut self, url: &str, dest: &Path) -> Result<()> {
        self.calls.push((url.to_string(), dest.to_path_buf()));

        if let Some(ref root) = self.root {
            let dir = root.join(dest);
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
            if let Some(manifest) = self.manifests.get(url) {
                std::fs::write(dir.join(MANIFEST_NAME), manifest)?;
            }
        }

        Ok(())
    }
}

/// A temporary project directory with a root package.yml.
#[derive(Debug)]
pub struct ProjectFixture {
    dir: TempDir,
}

impl ProjectFixture {
    /// Create a project with the given root manifest.
    pub fn new(manifest: &str) -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(MANIFEST_NAME), manifest).unwrap();
        ProjectFixture { dir }
    }

    /// Add an already fetched dependency directory, optionally with a manifest.
    pub fn with_dependency(self, dir: &str, manifest: Option<&str>) -> Self {
        let path = self.dir.path().join(dir);
        std::fs::create_dir_all(&path).unwrap();
        if let Some(manifest) = manifest {
            std::fs::write(path.join(MANIFEST_NAME), manifest).unwrap();
        }
        self
    }

    /// Add a file relative to the project root.
    pub fn with_file(self, rel: &str, contents: &str) -> Self {
        let path = self.dir.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, contents).unwrap();
        self
    }

    /// The project root.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Read a file relative to the project root.
    pub fn read(&self, rel: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(rel)).unwrap()
    }

    /// A context rooted at the project with default configuration.
    pub fn context(&self) -> GlobalContext {
        GlobalContext::with_config(self.dir.path().to_path_buf(), Config::default())
    }

    /// Load the project's workspace with default configuration.
    pub fn workspace(&self) -> Workspace {
        Workspace::load(&self.context()).unwrap()
    }
}
