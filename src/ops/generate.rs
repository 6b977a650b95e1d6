//! The default packwalk run: fetch, aggregate, render.

use anyhow::Result;

use crate::core::Workspace;
use crate::ops::aggregate::{aggregate, SourceDict};
use crate::ops::render::{render_all, RenderReport, TemplateRenderer};
use crate::ops::resolve::{resolve_dependencies, ResolveSummary};
use crate::sources::Fetcher;

/// Result of a full run.
#[derive(Debug, Clone, Default)]
pub struct GenerateResult {
    /// Dependencies fetched and dependencies lacking a manifest
    pub resolve: ResolveSummary,

    /// Aggregated sources, as passed to the templates
    pub sources: SourceDict,

    /// Files rendered
    pub render: RenderReport,
}

/// Fetch missing dependencies, aggregate sources and render templates.
pub fn generate<F: Fetcher + ?Sized>(ws: &Workspace, fetcher: &mut F) -> Result<GenerateResult> {
    let resolve = resolve_dependencies(ws, ws.manifest(), fetcher)?;
    let sources = aggregate(ws, ws.manifest())?;

    let mut renderer = TemplateRenderer::new(ws.root());
    let render = render_all(ws, &mut renderer, sources.clone())?;

    Ok(GenerateResult {
        resolve,
        sources,
        render,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ProjectFixture, RecordingFetcher};
    use std::path::PathBuf;

    #[test]
    fn test_end_to_end() {
        let project = ProjectFixture::new(
            "sources: [application.c]\ndepends: [pid]\ntemplates:\n  Makefile.jinja: Makefile\n",
        )
        .with_file(
            "Makefile.jinja",
            "{% for f in source %}{{ f }}\n{% endfor %}",
        );
        let ws = project.workspace();
        let mut fetcher = RecordingFetcher::materializing(project.path())
            .with_manifest("https://github.com/cvra/pid", "sources: [pid.c]\n");

        let result = generate(&ws, &mut fetcher).unwrap();

        assert_eq!(result.resolve.fetched, ["pid"]);
        assert_eq!(
            result.sources.source,
            ["./application.c", "dependencies/pid/pid.c"]
        );
        assert_eq!(result.render.written, [PathBuf::from("Makefile")]);
        assert_eq!(
            project.read("Makefile"),
            "./application.c\ndependencies/pid/pid.c\n"
        );

        let again = generate(&ws, &mut fetcher).unwrap();
        assert_eq!(fetcher.calls().len(), 1);
        assert!(again.render.written.is_empty());
    }
}
