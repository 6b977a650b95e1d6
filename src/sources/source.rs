//! Fetcher trait - common interface for materializing a dependency on disk.

use std::path::Path;

use anyhow::Result;

/// Something that can fetch a package's source tree into a directory.
///
/// Implementations are only called when the destination does not exist yet.
/// A fetch that runs but fails to produce a tree is not an error here; it
/// surfaces later as a missing manifest.
pub trait Fetcher {
    /// Get the fetcher name for display.
    fn name(&self) -> &str;

    /// Fetch `url` into `dest`.
    fn fetch(&mut self, url: &str, dest: &Path) -> Result<()>;
}
