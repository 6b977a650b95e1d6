//! Source aggregation across the dependency graph.
//!
//! Each category (`source`, `tests`, `include_directories`, ...) is collected
//! independently: a node contributes its own entries prefixed with its
//! directory, plus everything its dependencies contribute. Results are sets,
//! so a package reached through several paths contributes once.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use crate::core::manifest::TARGET_PREFIX;
use crate::core::{Manifest, Workspace};
use crate::ops::resolve::Chain;

/// Category of regular sources.
pub const SOURCE: &str = "source";

/// Accepted spelling of [`SOURCE`].
pub const SOURCES_ALIAS: &str = "sources";

/// Category of unit test sources.
pub const TESTS: &str = "tests";

/// Category of include directories.
pub const INCLUDE_DIRECTORIES: &str = "include_directories";

/// Category of include directories only needed by tests.
pub const TEST_INCLUDE_DIRECTORIES: &str = "include_directories.test";

/// Include directories, with the test-only directories attached.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IncludeDirectories {
    /// Directories needed to build the sources
    pub paths: Vec<String>,

    /// Directories only needed by the tests
    pub test: Vec<String>,
}

/// Aggregated file lists for a whole dependency graph.
///
/// Every list is sorted and free of duplicates. All categories are present
/// even when nothing declares them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SourceDict {
    pub source: Vec<String>,
    pub tests: Vec<String>,
    pub include_directories: IncludeDirectories,
    /// Architecture -> sources, for every `target.<arch>` of the root manifest
    pub target: BTreeMap<String, Vec<String>>,
}

/// Collect one category across the graph rooted at `manifest`.
///
/// `prefix` is the directory of `manifest` relative to the workspace root
/// (`.` for the root package). Dependencies without a manifest contribute
/// nothing.
pub fn collect(
    ws: &Workspace,
    manifest: &Manifest,
    category: &str,
    prefix: &Path,
) -> Result<BTreeSet<String>> {
    let mut chain = Chain::default();
    collect_node(ws, manifest, category, prefix, &mut chain)
}

fn collect_node(
    ws: &Workspace,
    manifest: &Manifest,
    category: &str,
    prefix: &Path,
    chain: &mut Chain,
) -> Result<BTreeSet<String>> {
    let mut sources: BTreeSet<String> = manifest
        .category(category)
        .unwrap_or_default()
        .iter()
        .map(|entry| prefix.join(entry).to_string_lossy().into_owned())
        .collect();

    for dep in manifest.depends() {
        chain.enter(dep.name())?;

        let dep_manifest = match ws.load_dependency(dep) {
            Ok(m) => Some(m),
            Err(e) if e.is_not_found() => {
                tracing::debug!("skipping {}: no manifest", dep.name());
                None
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(dep_manifest) = dep_manifest {
            let dep_dir = ws.package_dir(dep);
            let dep_sources = collect_node(ws, &dep_manifest, category, &dep_dir, chain)?;
            sources.extend(dep_sources);
        }

        chain.leave();
    }

    Ok(sources)
}

/// Collect a category and return it sorted.
pub fn source_list(ws: &Workspace, manifest: &Manifest, category: &str) -> Result<Vec<String>> {
    Ok(collect(ws, manifest, category, Path::new("."))?
        .into_iter()
        .collect())
}

/// Aggregate every category of the graph rooted at `manifest`.
///
/// Target architectures are discovered from the root manifest only; their
/// source lists are still gathered from the whole graph.
pub fn aggregate(ws: &Workspace, manifest: &Manifest) -> Result<SourceDict> {
    let root = Path::new(".");

    let mut source = collect(ws, manifest, SOURCE, root)?;
    source.extend(collect(ws, manifest, SOURCES_ALIAS, root)?);

    let mut target = BTreeMap::new();
    for arch in manifest.target_archs() {
        let category = format!("{}{}", TARGET_PREFIX, arch);
        target.insert(arch.clone(), source_list(ws, manifest, &category)?);
    }

    let dict = SourceDict {
        source: source.into_iter().collect(),
        tests: source_list(ws, manifest, TESTS)?,
        include_directories: IncludeDirectories {
            paths: source_list(ws, manifest, INCLUDE_DIRECTORIES)?,
            test: source_list(ws, manifest, TEST_INCLUDE_DIRECTORIES)?,
        },
        target,
    };

    tracing::debug!(
        "aggregated {} sources, {} tests, {} targets",
        dict.source.len(),
        dict.tests.len(),
        dict.target.len()
    );

    Ok(dict)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::resolve::ResolveError;
    use crate::test_support::ProjectFixture;

    fn aggregate_root(project: &ProjectFixture) -> SourceDict {
        let ws = project.workspace();
        aggregate(&ws, ws.manifest()).unwrap()
    }

    #[test]
    fn test_absent_category_is_empty() {
        let project = ProjectFixture::new("");
        let ws = project.workspace();
        assert!(collect(&ws, ws.manifest(), "sources", Path::new("."))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_package_without_dependencies() {
        let project = ProjectFixture::new("sources: [pid.c]\n");
        let ws = project.workspace();
        assert_eq!(source_list(&ws, ws.manifest(), "sources").unwrap(), ["./pid.c"]);
    }

    #[test]
    fn test_dependency_sources_are_prefixed() {
        let project = ProjectFixture::new("sources: [application.c]\ndepends: [pid]\n")
            .with_dependency("dependencies/pid", Some("sources: [pid.c]\n"));

        let dict = aggregate_root(&project);
        assert_eq!(dict.source, ["./application.c", "dependencies/pid/pid.c"]);
    }

    #[test]
    fn test_location_map_prefix() {
        let project = ProjectFixture::new(
            "source: [application.c]\ndepends: [pid]\ndependency-groups:\n  foo: [pid]\n",
        )
        .with_dependency("foo/pid", Some("source: [pid.c]\n"));

        let dict = aggregate_root(&project);
        assert_eq!(dict.source, ["./application.c", "foo/pid/pid.c"]);
    }

    #[test]
    fn test_skip_dependency_without_manifest() {
        let project = ProjectFixture::new("source: [application.c]\ndepends: [pid]\n")
            .with_dependency("dependencies/pid", None);

        let dict = aggregate_root(&project);
        assert_eq!(dict.source, ["./application.c"]);
    }

    #[test]
    fn test_dependency_metadata_does_not_break_aggregation() {
        let project = ProjectFixture::new("source: [application.c]\ndepends: [pid]\n")
            .with_dependency(
                "dependencies/pid",
                Some("source: [pid.c]\nauthors:\n  - {name: bob}\n"),
            );

        let dict = aggregate_root(&project);
        assert_eq!(dict.source, ["./application.c", "dependencies/pid/pid.c"]);
    }

    #[test]
    fn test_all_categories_present() {
        let dict = aggregate_root(&ProjectFixture::new(""));
        assert_eq!(dict, SourceDict::default());

        let json = serde_json::to_value(&dict).unwrap();
        for key in ["source", "tests", "include_directories", "target"] {
            assert!(json.get(key).is_some(), "missing {}", key);
        }
    }

    #[test]
    fn test_targets_are_discovered() {
        let dict = aggregate_root(&ProjectFixture::new("target.x86: []\ntarget.linux: []\n"));
        let archs: Vec<_> = dict.target.keys().map(String::as_str).collect();
        assert_eq!(archs, ["linux", "x86"]);
    }

    #[test]
    fn test_target_sources() {
        let dict = aggregate_root(&ProjectFixture::new("target.x86: [main.c]\n"));
        assert_eq!(dict.target["x86"], ["./main.c"]);
    }

    #[test]
    fn test_target_archs_not_inherited_but_sources_are() {
        let project = ProjectFixture::new("target.arm: [b.c, a.c]\ndepends: [pid]\n")
            .with_dependency(
                "dependencies/pid",
                Some("target.arm: [pid_arm.c]\ntarget.x86: [pid_x86.c]\n"),
            );

        let dict = aggregate_root(&project);
        assert_eq!(dict.target.len(), 1);
        assert_eq!(
            dict.target["arm"],
            ["./a.c", "./b.c", "dependencies/pid/pid_arm.c"]
        );
    }

    #[test]
    fn test_tests_are_sorted() {
        let dict = aggregate_root(&ProjectFixture::new("tests: [b, a]\n"));
        assert_eq!(dict.tests, ["./a", "./b"]);
    }

    #[test]
    fn test_include_directories_of_dependencies() {
        let project = ProjectFixture::new("sources: [application.c]\ndepends: [pid]\n")
            .with_dependency(
                "dependencies/pid",
                Some("sources: [pid.c]\ninclude_directories: [poney]\ninclude_directories.test: [mocks]\n"),
            );

        let dict = aggregate_root(&project);
        assert_eq!(dict.include_directories.paths, ["dependencies/pid/poney"]);
        assert_eq!(dict.include_directories.test, ["dependencies/pid/mocks"]);
    }

    #[test]
    fn test_diamond_sources_appear_once() {
        let project = ProjectFixture::new("source: [a.c]\ndepends: [b, c]\n")
            .with_dependency("dependencies/b", Some("source: [b.c]\ndepends: [d]\n"))
            .with_dependency("dependencies/c", Some("source: [c.c]\ndepends: [d]\n"))
            .with_dependency("dependencies/d", Some("source: [d.c]\n"));

        let dict = aggregate_root(&project);
        assert_eq!(
            dict.source,
            [
                "./a.c",
                "dependencies/b/b.c",
                "dependencies/c/c.c",
                "dependencies/d/d.c"
            ]
        );
    }

    #[test]
    fn test_source_and_sources_are_merged() {
        let dict = aggregate_root(&ProjectFixture::new("source: [b.c]\nsources: [a.c, b.c]\n"));
        assert_eq!(dict.source, ["./a.c", "./b.c"]);
    }

    #[test]
    fn test_cycle_is_an_error() {
        let project = ProjectFixture::new("depends: [a]\n")
            .with_dependency("dependencies/a", Some("depends: [a]\n"));
        let ws = project.workspace();

        let err = aggregate(&ws, ws.manifest()).unwrap_err();
        assert!(err.downcast_ref::<ResolveError>().is_some());
    }
}
