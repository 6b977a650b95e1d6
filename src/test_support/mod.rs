//! Test utilities for packwalk unit tests.
//!
//! Provides a fetcher that records calls instead of running git, and
//! on-disk project fixtures.
//!
//! # Example
//!
//! ```rust,ignore
//! use crate::test_support::{ProjectFixture, RecordingFetcher};
//!
//! #[test]
//! fn test_example() {
//!     let project = ProjectFixture::new("depends: [pid]\n");
//!     let mut fetcher = RecordingFetcher::materializing(project.path())
//!         .with_manifest("https://github.com/cvra/pid", "source: [pid.c]\n");
//!
//!     // Run operations against project.workspace() with the fetcher...
//! }
//! ```

pub mod fixtures;

pub use fixtures::*;
