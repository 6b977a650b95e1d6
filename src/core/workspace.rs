//! Workspace - the root package and where its dependencies live.
//!
//! Dependency paths are kept relative to the workspace root, since that is
//! how they appear in rendered build files. Filesystem access goes through
//! [`Workspace::abs`].

use std::path::{Path, PathBuf};

use crate::core::{LocationMap, Manifest, ManifestError, PackageSpec};
use crate::util::config::FetchConfig;
use crate::util::GlobalContext;

/// A workspace containing the root manifest and its location map.
#[derive(Debug, Clone)]
pub struct Workspace {
    /// Directory holding the root package.yml
    root: PathBuf,

    /// The root manifest
    manifest: Manifest,

    /// Resolved fetch locations, built once from the root manifest
    locations: LocationMap,

    /// URL template and default organization
    fetch: FetchConfig,
}

impl Workspace {
    /// Load the root manifest from the context's working directory.
    pub fn load(ctx: &GlobalContext) -> Result<Self, ManifestError> {
        let manifest = Manifest::load(&ctx.manifest_path())?;
        Ok(Self::new(ctx.cwd(), manifest, &ctx.dependencies_dir())
            .with_fetch_config(ctx.config().fetch.clone()))
    }

    /// Create a workspace from an already parsed root manifest.
    ///
    /// The manifest's `dependency-dir` overrides `default_dir`.
    pub fn new(root: impl Into<PathBuf>, manifest: Manifest, default_dir: &Path) -> Self {
        let locations = manifest.location_map(default_dir);
        Workspace {
            root: root.into(),
            manifest,
            locations,
            fetch: FetchConfig::default(),
        }
    }

    /// Use a specific URL template and default organization.
    pub fn with_fetch_config(mut self, fetch: FetchConfig) -> Self {
        self.fetch = fetch;
        self
    }

    /// Replace the location map.
    pub fn with_locations(mut self, locations: LocationMap) -> Self {
        self.locations = locations;
        self
    }

    /// Get the workspace root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the root manifest.
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Get the location map.
    pub fn locations(&self) -> &LocationMap {
        &self.locations
    }

    /// Directory dependencies are fetched into by default.
    pub fn dependencies_dir(&self) -> &Path {
        self.locations.default_dir()
    }

    /// Resolve a workspace-relative path against the root.
    pub fn abs(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }

    /// Workspace-relative directory of a dependency.
    pub fn package_dir(&self, spec: &PackageSpec) -> PathBuf {
        self.locations.path_for(spec)
    }

    /// URL a dependency is fetched from.
    pub fn url_for(&self, spec: &PackageSpec) -> String {
        spec.url(&self.fetch)
    }

    /// Whether a dependency's directory is already on disk.
    pub fn is_fetched(&self, spec: &PackageSpec) -> bool {
        self.abs(&self.package_dir(spec)).exists()
    }

    /// Load a dependency's manifest from its fetched location.
    pub fn load_dependency(&self, spec: &PackageSpec) -> Result<Manifest, ManifestError> {
        Manifest::load(&self.abs(&self.locations.manifest_path_for(spec)))
    }
}
