//! Global context for a packwalk run.
//!
//! Provides centralized access to the working directory and the merged
//! configuration. The context is passed explicitly to every
//! operation.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::MANIFEST_NAME;
use crate::util::config::{global_config_path, load_config, project_config_path, Config};

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Directory holding the root package.yml
    cwd: PathBuf,

    /// Merged global + project configuration
    config: Config,
}

impl GlobalContext {
    /// Create a context for the current directory, loading configuration.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(Self::with_cwd(cwd))
    }

    /// Create a context for a specific working directory, loading configuration.
    pub fn with_cwd(cwd: PathBuf) -> Self {
        let global = global_config_path();
        let config = load_config(global.as_deref(), &project_config_path(&cwd));
        Self::with_config(cwd, config)
    }

    /// Create a context with an explicit configuration.
    pub fn with_config(cwd: PathBuf, config: Config) -> Self {
        GlobalContext {
            cwd,
            config,
        }
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Get the merged configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Path of the root manifest.
    pub fn manifest_path(&self) -> PathBuf {
        self.cwd.join(MANIFEST_NAME)
    }

    /// Configured dependencies directory, relative to the working directory.
    pub fn dependencies_dir(&self) -> PathBuf {
        self.config.dependencies_dir()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_context_paths() {
        let ctx = GlobalContext::new().unwrap();
        assert!(ctx.cwd().is_absolute());
        assert!(ctx.manifest_path().ends_with("package.yml"));
    }

    #[test]
    fn test_project_config_is_loaded() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join(".packwalk");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("config.toml"), "[paths]\ndependencies_dir = \"lib\"\n").unwrap();

        let ctx = GlobalContext::with_cwd(tmp.path().to_path_buf());
        assert_eq!(ctx.dependencies_dir(), PathBuf::from("lib"));
    }
}
