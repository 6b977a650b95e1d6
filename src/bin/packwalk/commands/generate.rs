//! Default command: fetch dependencies and render build files

use anyhow::Result;

use packwalk::core::{Workspace, MANIFEST_NAME};
use packwalk::ops::generate;
use packwalk::sources::{FetchMethod, GitFetcher};
use packwalk::util::diagnostic::{emit, suggestions, Diagnostic};
use packwalk::util::GlobalContext;

pub fn execute(submodules: bool, color: bool) -> Result<()> {
    let ctx = GlobalContext::new()?;

    let ws = match Workspace::load(&ctx) {
        Ok(ws) => ws,
        Err(e) if e.is_not_found() => {
            let diag = Diagnostic::warning(format!(
                "{} was not found. Did you forget to git add it ?",
                MANIFEST_NAME
            ))
            .with_location(ctx.manifest_path())
            .with_suggestion(suggestions::NO_MANIFEST);
            emit(&diag, color);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let method = FetchMethod::select(submodules, &ctx.config().fetch);
    tracing::debug!("fetch method: {:?}", method);
    let mut fetcher = GitFetcher::new(method).with_cwd(ws.root());

    let result = generate(&ws, &mut fetcher)?;

    for name in &result.resolve.fetched {
        eprintln!("     Fetched {}", name);
    }
    for name in &result.resolve.missing_manifests {
        if result.resolve.fetched.contains(name) {
            let diag = Diagnostic::warning(format!("`{}` was fetched but has no {}", name, MANIFEST_NAME))
                .with_suggestion(suggestions::FETCH_FAILED);
            emit(&diag, color);
        }
    }
    for path in &result.render.written {
        eprintln!("    Rendered {}", path.display());
    }

    eprintln!(
        "    Finished {} sources, {} tests, {} targets",
        result.sources.source.len(),
        result.sources.tests.len(),
        result.sources.target.len()
    );

    Ok(())
}
