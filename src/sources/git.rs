//! Git fetchers - clone or register dependencies as submodules.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::sources::Fetcher;
use crate::util::config::FetchConfig;
use crate::util::process::{find_executable, ProcessBuilder};

/// How a dependency is materialized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchMethod {
    /// `git clone --recursive <url> <dest>`
    #[default]
    Clone,
    /// `git submodule add <url> <dest>`
    Submodule,
}

impl FetchMethod {
    /// Pick the method for a run: `--submodules` wins over the configured
    /// method, which wins over a recursive clone.
    pub fn select(submodules: bool, config: &FetchConfig) -> Self {
        if submodules {
            FetchMethod::Submodule
        } else {
            config.method()
        }
    }
}

/// Fetches dependencies by shelling out to git.
#[derive(Debug, Clone)]
pub struct GitFetcher {
    method: FetchMethod,
    git: PathBuf,
    cwd: Option<PathBuf>,
}

impl GitFetcher {
    /// Create a fetcher using the git found on PATH.
    pub fn new(method: FetchMethod) -> Self {
        GitFetcher {
            method,
            git: git_program(),
            cwd: None,
        }
    }

    /// Run git from a specific directory instead of the process cwd.
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Build the git invocation for a fetch.
    pub fn command(&self, url: &str, dest: &Path) -> ProcessBuilder {
        let pb = ProcessBuilder::new(&self.git);
        let pb = match self.method {
            FetchMethod::Clone => pb.args(["clone", "--recursive"]),
            FetchMethod::Submodule => pb.args(["submodule", "add"]),
        };
        let pb = pb.arg(url).arg(dest);

        match self.cwd {
            Some(ref cwd) => pb.cwd(cwd),
            None => pb,
        }
    }
}

impl Fetcher for GitFetcher {
    fn name(&self) -> &str {
        match self.method {
            FetchMethod::Clone => "git clone",
            FetchMethod::Submodule => "git submodule",
        }
    }

    fn fetch(&mut self, url: &str, dest: &Path) -> Result<()> {
        let target = match self.cwd {
            Some(ref cwd) => cwd.join(dest),
            None => dest.to_path_buf(),
        };
        if let Some(parent) = target.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create directory: {}", parent.display())
                })?;
            }
        }

        let cmd = self.command(url, dest);
        tracing::debug!("running `{}`", cmd.display_command());

        let status = cmd.status()?;
        if !status.success() {
            // The missing tree is reported later as a missing manifest.
            tracing::warn!(
                "`{}` exited with {:?}",
                cmd.display_command(),
                status.code()
            );
        }

        Ok(())
    }
}

/// Locate git on PATH, falling back to the bare program name.
pub fn git_program() -> PathBuf {
    find_executable("git").unwrap_or_else(|| PathBuf::from("git"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetcher(method: FetchMethod) -> GitFetcher {
        GitFetcher {
            method,
            git: PathBuf::from("git"),
            cwd: None,
        }
    }

    #[test]
    fn test_clone_arguments() {
        let cmd = fetcher(FetchMethod::Clone)
            .command("https://github.com/cvra/pid", Path::new("dependencies/pid"));
        assert_eq!(
            cmd.display_command(),
            "git clone --recursive https://github.com/cvra/pid dependencies/pid"
        );
    }

    #[test]
    fn test_submodule_arguments() {
        let cmd = fetcher(FetchMethod::Submodule)
            .command("https://github.com/cvra/pid", Path::new("dependencies/pid"));
        assert_eq!(
            cmd.get_args(),
            ["submodule", "add", "https://github.com/cvra/pid", "dependencies/pid"]
        );
    }

    #[test]
    fn test_default_method_is_clone() {
        assert_eq!(FetchMethod::default(), FetchMethod::Clone);
    }

    #[test]
    fn test_select_defaults_to_clone() {
        assert_eq!(FetchMethod::select(false, &FetchConfig::default()), FetchMethod::Clone);
    }

    #[test]
    fn test_select_uses_configured_method() {
        let config = FetchConfig {
            method: Some(FetchMethod::Submodule),
            ..FetchConfig::default()
        };
        assert_eq!(FetchMethod::select(false, &config), FetchMethod::Submodule);
    }

    #[test]
    fn test_select_flag_overrides_config() {
        let config = FetchConfig {
            method: Some(FetchMethod::Clone),
            ..FetchConfig::default()
        };
        assert_eq!(FetchMethod::select(true, &config), FetchMethod::Submodule);
        assert_eq!(
            FetchMethod::select(true, &FetchConfig::default()),
            FetchMethod::Submodule
        );
    }

    #[test]
    fn test_method_deserializes_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            method: FetchMethod,
        }
        let w: Wrapper = toml::from_str("method = \"submodule\"").unwrap();
        assert_eq!(w.method, FetchMethod::Submodule);
    }
}
