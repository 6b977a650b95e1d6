//! Dependency graph walking.
//!
//! Visits every `depends` entry depth-first in declaration order, fetching
//! dependencies whose directory is not on disk yet and descending into
//! their own manifests. A dependency without a manifest is a leaf.

use anyhow::Result;
use thiserror::Error;

use crate::core::{Manifest, Workspace};
use crate::sources::Fetcher;
use crate::util::diagnostic::{suggestions, Diagnostic};

/// Error during dependency resolution.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("dependency cycle detected: {}", packages.join(" -> "))]
    CycleDetected { packages: Vec<String> },
}

impl ResolveError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ResolveError::CycleDetected { packages } => {
                Diagnostic::error("dependency cycle detected")
                    .with_context(format!("cycle: {}", packages.join(" -> ")))
                    .with_suggestion(suggestions::BREAK_CYCLE)
            }
        }
    }
}

/// Outcome of a resolution pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveSummary {
    /// Packages fetched during this pass, in fetch order
    pub fetched: Vec<String>,

    /// Packages whose directory has no package.yml
    pub missing_manifests: Vec<String>,
}

/// Chain of package names from the root to the node being visited.
///
/// Diamonds are fine; only a name reappearing on its own chain is a cycle.
#[derive(Debug, Default)]
pub(crate) struct Chain(Vec<String>);

impl Chain {
    pub(crate) fn enter(&mut self, name: &str) -> Result<(), ResolveError> {
        if self.0.iter().any(|n| n == name) {
            let mut packages = self.0.clone();
            packages.push(name.to_string());
            return Err(ResolveError::CycleDetected { packages });
        }
        self.0.push(name.to_string());
        Ok(())
    }

    pub(crate) fn leave(&mut self) {
        self.0.pop();
    }
}

/// Fetch every dependency of `manifest`, transitively.
///
/// Running this again against an unchanged filesystem issues no fetches.
pub fn resolve_dependencies<F: Fetcher + ?Sized>(
    ws: &Workspace,
    manifest: &Manifest,
    fetcher: &mut F,
) -> Result<ResolveSummary> {
    let mut summary = ResolveSummary::default();
    let mut chain = Chain::default();
    walk(ws, manifest, fetcher, &mut chain, &mut summary)?;
    Ok(summary)
}

fn walk<F: Fetcher + ?Sized>(
    ws: &Workspace,
    manifest: &Manifest,
    fetcher: &mut F,
    chain: &mut Chain,
    summary: &mut ResolveSummary,
) -> Result<()> {
    for dep in manifest.depends() {
        chain.enter(dep.name())?;

        let path = ws.package_dir(dep);
        if !ws.is_fetched(dep) {
            let url = ws.url_for(dep);
            tracing::info!("Fetching {} from {} ({})", dep.name(), url, fetcher.name());
            fetcher.fetch(&url, &path)?;
            summary.fetched.push(dep.name().to_string());
        } else {
            tracing::debug!("{} already present at {}", dep.name(), path.display());
        }

        match ws.load_dependency(dep) {
            Ok(dep_manifest) => walk(ws, &dep_manifest, fetcher, chain, summary)?,
            Err(e) if e.is_not_found() => {
                tracing::debug!("{} has no manifest, treating as a leaf", dep.name());
                if !summary.missing_manifests.iter().any(|n| n == dep.name()) {
                    summary.missing_manifests.push(dep.name().to_string());
                }
            }
            Err(e) => return Err(e.into()),
        }

        chain.leave();
    }

    Ok(())
}
