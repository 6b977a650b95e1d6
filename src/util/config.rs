//! Configuration file support.
//!
//! Two configuration file locations are read:
//! - Global: `~/.packwalk/config.toml` - user-wide defaults
//! - Project: `.packwalk/config.toml` - project-specific overrides
//!
//! Project config takes precedence over global config. A `dependency-dir`
//! declared in the root package.yml overrides both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::sources::FetchMethod;

/// Default URL template; `{fork}` is the owner, `{package}` the package name.
pub const DEFAULT_URL_TEMPLATE: &str = "https://github.com/{fork}/{package}";

/// Organization used for packages declared by bare name.
pub const DEFAULT_ORG: &str = "cvra";

/// Directory dependencies are fetched into when nothing overrides it.
pub const DEFAULT_DEPENDENCIES_DIR: &str = "dependencies";

/// Packwalk configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Fetch settings
    pub fetch: FetchConfig,

    /// Path settings
    pub paths: PathsConfig,
}

/// How package URLs are built and fetched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// URL template with `{fork}` and `{package}` placeholders
    pub url_template: Option<String>,

    /// Owner used for bare-name packages
    pub default_org: Option<String>,

    /// Default fetch method (clone or submodule)
    pub method: Option<FetchMethod>,
}

impl FetchConfig {
    /// The configured URL template, or the built-in one.
    pub fn url_template(&self) -> &str {
        self.url_template.as_deref().unwrap_or(DEFAULT_URL_TEMPLATE)
    }

    /// The configured default organization, or the built-in one.
    pub fn default_org(&self) -> &str {
        self.default_org.as_deref().unwrap_or(DEFAULT_ORG)
    }

    /// Fill the URL template for the given owner and package.
    pub fn format_url(&self, fork: &str, package: &str) -> String {
        self.url_template()
            .replace("{fork}", fork)
            .replace("{package}", package)
    }

    /// The configured fetch method, defaulting to a recursive clone.
    pub fn method(&self) -> FetchMethod {
        self.method.unwrap_or_default()
    }
}

/// Filesystem layout settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory dependencies are fetched into
    pub dependencies_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.fetch.url_template.is_some() {
            self.fetch.url_template = other.fetch.url_template;
        }
        if other.fetch.default_org.is_some() {
            self.fetch.default_org = other.fetch.default_org;
        }
        if other.fetch.method.is_some() {
            self.fetch.method = other.fetch.method;
        }
        if other.paths.dependencies_dir.is_some() {
            self.paths.dependencies_dir = other.paths.dependencies_dir;
        }
    }

    /// The configured dependencies directory, or the built-in one.
    pub fn dependencies_dir(&self) -> PathBuf {
        self.paths
            .dependencies_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DEPENDENCIES_DIR))
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.packwalk/config.toml)
/// 2. Global config (~/.packwalk/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        if global_path.exists() {
            config.merge(Config::load_or_default(global_path));
        }
    }

    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}

/// Get the global config directory (~/.packwalk).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".packwalk"))
}

/// Get the global config path (~/.packwalk/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.packwalk/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".packwalk").join("config.toml")
}
