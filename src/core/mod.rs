//! Core data structures.
//!
//! - Package specifications and their source URLs
//! - Location map from package names to fetch directories
//! - package.yml manifests
//! - Workspace tying the root manifest to the project directory

pub mod location;
pub mod manifest;
pub mod package_spec;
pub mod workspace;

pub use location::{LocationMap, MANIFEST_NAME};
pub use manifest::{Manifest, ManifestError};
pub use package_spec::{Origin, PackageSpec, SpecError};
pub use workspace::Workspace;
