//! `packwalk freeze` command

use anyhow::Result;

use crate::cli::{FreezeArgs, FreezeCommands};
use packwalk::core::Workspace;
use packwalk::ops::freeze;
use packwalk::util::diagnostic::{emit, Diagnostic};
use packwalk::util::GlobalContext;

pub fn execute(args: FreezeArgs, color: bool) -> Result<()> {
    let ctx = GlobalContext::new()?;

    // A root manifest may move the dependencies directory.
    let deps_root = match Workspace::load(&ctx) {
        Ok(ws) => ws.abs(ws.dependencies_dir()),
        Err(e) if e.is_not_found() => freeze::deps_root(ctx.cwd(), &ctx.dependencies_dir()),
        Err(e) => return Err(e.into()),
    };

    match args.command {
        FreezeCommands::Dump(dump) => {
            let versions = freeze::dump_versions(&deps_root)?;
            match dump.output {
                Some(path) => {
                    freeze::save(&versions, &path)?;
                    eprintln!("      Pinned {} dependencies to {}", versions.len(), path.display());
                }
                None => println!("{}", freeze::to_json(&versions)?),
            }
        }
        FreezeCommands::Restore(restore) => {
            let versions = freeze::load(&restore.file)?;
            let report = freeze::restore_versions(&deps_root, &versions)?;
            eprintln!("    Restored {} dependencies", report.restored.len());
            for name in &report.missing {
                let diag = Diagnostic::note(format!("skipped `{}`: not fetched", name))
                    .with_location(deps_root.join(name));
                emit(&diag, color);
            }
        }
    }

    Ok(())
}
