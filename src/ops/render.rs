//! Build file rendering.
//!
//! Aggregated sources are rendered through Tera (Jinja2 syntax) templates.
//! Templates are looked up in the project directory first, then among the
//! built-in templates shipped with packwalk.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tera::{Context as TeraContext, Tera};

use crate::core::Workspace;
use crate::ops::aggregate::SourceDict;
use crate::util::fs::{find_files_with_extension, write_if_changed};

/// Template rendered when the package declares unit tests.
pub const BUILD_FILE_TEMPLATE: &str = "CMakeLists.txt.jinja";

/// Output path of [`BUILD_FILE_TEMPLATE`].
pub const BUILD_FILE: &str = "CMakeLists.txt";

const BUILTIN_TEMPLATES: &[(&str, &str)] = &[(
    BUILD_FILE_TEMPLATE,
    include_str!("../../templates/CMakeLists.txt.jinja"),
)];

/// Extension of template files in a project directory.
pub const TEMPLATE_EXTENSION: &str = "jinja";

/// Renders templates found in a project directory or built in.
///
/// Every template file under the project directory is registered under its
/// relative name on first use, so templates can include, import or extend
/// their siblings.
pub struct TemplateRenderer {
    tera: Tera,
    project_dir: PathBuf,
    builtins: HashMap<&'static str, &'static str>,
    raw: HashSet<String>,
    project: Option<HashSet<String>>,
    loaded_builtins: HashSet<String>,
}

impl TemplateRenderer {
    /// Create a renderer searching `project_dir` before the built-in templates.
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        TemplateRenderer {
            tera: Tera::default(),
            project_dir: project_dir.into(),
            builtins: BUILTIN_TEMPLATES.iter().copied().collect(),
            raw: HashSet::new(),
            project: None,
            loaded_builtins: HashSet::new(),
        }
    }

    /// Register an in-memory template, taking precedence over files.
    pub fn add_raw_template(&mut self, name: &str, content: &str) -> Result<()> {
        self.tera
            .add_raw_template(name, content)
            .with_context(|| format!("failed to parse template `{}`", name))?;
        self.raw.insert(name.to_string());
        Ok(())
    }

    fn load_project_templates(&mut self) -> Result<&HashSet<String>> {
        if self.project.is_none() {
            let mut names = HashSet::new();
            let mut files = Vec::new();
            for path in find_files_with_extension(&self.project_dir, TEMPLATE_EXTENSION)? {
                let name = match path.strip_prefix(&self.project_dir) {
                    Ok(rel) => rel
                        .components()
                        .map(|c| c.as_os_str().to_string_lossy())
                        .collect::<Vec<_>>()
                        .join("/"),
                    Err(_) => continue,
                };
                if self.raw.contains(&name) {
                    continue;
                }
                tracing::debug!("registering template {}", name);
                names.insert(name.clone());
                files.push((path, Some(name)));
            }

            self.tera.add_template_files(files).with_context(|| {
                format!("failed to parse templates in {}", self.project_dir.display())
            })?;
            self.project = Some(names);
        }

        Ok(self.project.get_or_insert_with(HashSet::new))
    }

    fn load(&mut self, name: &str) -> Result<()> {
        if self.raw.contains(name) || self.loaded_builtins.contains(name) {
            return Ok(());
        }

        if self.load_project_templates()?.contains(name) {
            return Ok(());
        }

        if let Some(content) = self.builtins.get(name).copied() {
            self.tera
                .add_raw_template(name, content)
                .with_context(|| format!("failed to parse built-in template `{}`", name))?;
            self.loaded_builtins.insert(name.to_string());
            return Ok(());
        }

        bail!(
            "template `{}` not found in {} or among built-in templates",
            name,
            self.project_dir.display()
        )
    }

    /// Render a template with the given context.
    pub fn render(&mut self, name: &str, context: &SourceDict) -> Result<String> {
        self.load(name)?;

        let ctx = TeraContext::from_serialize(context)
            .context("failed to build template context")?;
        self.tera
            .render(name, &ctx)
            .with_context(|| format!("failed to render template `{}`", name))
    }

    /// Render a template to `dest`, skipping the write if nothing changed.
    ///
    /// Returns whether the file was written.
    pub fn render_to_file(&mut self, name: &str, dest: &Path, context: &SourceDict) -> Result<bool> {
        let rendered = self.render(name, context)?;
        let written = write_if_changed(dest, &rendered)?;
        if written {
            tracing::info!("Rendered {} -> {}", name, dest.display());
        } else {
            tracing::debug!("{} is up to date", dest.display());
        }
        Ok(written)
    }
}

/// Files touched by a render pass, relative to the workspace root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderReport {
    /// Files written
    pub written: Vec<PathBuf>,

    /// Files already holding the rendered content
    pub unchanged: Vec<PathBuf>,
}

impl RenderReport {
    fn record(&mut self, dest: &Path, written: bool) {
        if written {
            self.written.push(dest.to_path_buf());
        } else {
            self.unchanged.push(dest.to_path_buf());
        }
    }
}

/// Render the build file and every template declared by the root manifest.
///
/// The dependencies directory is appended to the include directories. The
/// build file is only rendered when tests are declared.
pub fn render_all(
    ws: &Workspace,
    renderer: &mut TemplateRenderer,
    mut context: SourceDict,
) -> Result<RenderReport> {
    context
        .include_directories
        .paths
        .push(ws.dependencies_dir().to_string_lossy().into_owned());

    let mut report = RenderReport::default();

    if !context.tests.is_empty() {
        let dest = Path::new(BUILD_FILE);
        let written = renderer.render_to_file(BUILD_FILE_TEMPLATE, &ws.abs(dest), &context)?;
        report.record(dest, written);
    }

    for (template, dest) in ws.manifest().templates() {
        let written = renderer.render_to_file(template, &ws.abs(dest), &context)?;
        report.record(dest, written);
    }

    Ok(report)
}
