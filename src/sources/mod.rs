//! Package sources.
//!
//! Fetchers are responsible for materializing a dependency's source tree
//! in its directory (by cloning it, or registering it as a submodule).

pub mod git;
pub mod source;

pub use git::{FetchMethod, GitFetcher};
pub use source::Fetcher;
