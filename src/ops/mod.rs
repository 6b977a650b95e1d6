//! High-level operations.
//!
//! This module contains the implementation of packwalk commands.

pub mod aggregate;
pub mod freeze;
pub mod generate;
pub mod render;
pub mod resolve;

pub use aggregate::{aggregate, collect, source_list, IncludeDirectories, SourceDict};
pub use freeze::{dump_versions, restore_versions, PinnedVersions, RestoreReport};
pub use generate::{generate, GenerateResult};
pub use render::{render_all, RenderReport, TemplateRenderer};
pub use resolve::{resolve_dependencies, ResolveError, ResolveSummary};
