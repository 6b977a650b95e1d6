//! Packwalk - fetches source dependencies and renders build files
//!
//! A package describes itself in a `package.yml`: its sources, tests,
//! include directories and the packages it depends on. This crate fetches
//! the dependency graph, aggregates file lists across it and renders build
//! files from templates.

pub mod core;
pub mod ops;
pub mod sources;
pub mod util;

/// Test utilities for packwalk unit tests.
///
/// Only compiled for tests. Provides a recording fetcher and temporary
/// project fixtures.
#[cfg(test)]
pub mod test_support;

pub use self::core::{LocationMap, Manifest, ManifestError, PackageSpec, SpecError, Workspace};
pub use sources::{FetchMethod, Fetcher, GitFetcher};
pub use util::context::GlobalContext;
