//! Build orchestration.
//!
//! Stages the output directory, then renders every page category. Categories
//! and the pages inside them render in parallel and in no particular order;
//! the only ordering is that staging completes first.

use std::{
    fs,
    path::PathBuf,
    sync::atomic::{AtomicUsize, Ordering},
    time::{Duration, Instant},
};

use crossdoc_core::{Config, DocumentationModel, Entity};
use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    assets::{ResourceBundle, StagedOutput, StagingError},
    markdown::MarkdownConverter,
    page::{PageOptions, PageRenderer, PageType},
    resolver::CrossReferenceResolver,
    template::{TemplateEngine, ThemeTemplates},
    types::TypeRegistry,
};

/// Build errors.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The output directory could not be staged.
    #[error("staging failed: {0}")]
    Staging(#[from] StagingError),
}

/// Result type for build operations.
pub type Result<T> = std::result::Result<T, BuildError>;

/// Build statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Number of pages written.
    pub pages: usize,

    /// Number of pages abandoned after a template or write error.
    pub failed_pages: usize,

    /// Number of resource files staged.
    pub resources: usize,

    /// Number of unresolved references met while rendering.
    pub missing_links: usize,

    /// Build duration in milliseconds.
    pub duration_ms: u64,
}

/// Page counters shared by the parallel render passes.
#[derive(Debug, Default)]
struct Tally {
    written: AtomicUsize,
    failed: AtomicUsize,
}

impl Tally {
    fn record(&self, written: bool) {
        let counter = if written { &self.written } else { &self.failed };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Site builder that orchestrates the render.
pub struct Builder<'m> {
    model: &'m DocumentationModel,
    config: Config,
    engine: Box<dyn TemplateEngine>,
    markdown: MarkdownConverter,
}

impl std::fmt::Debug for Builder<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Builder")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<'m> Builder<'m> {
    /// Create a builder using the theme templates named by `config`.
    #[must_use]
    pub fn new(model: &'m DocumentationModel, config: Config) -> Self {
        let engine: Box<dyn TemplateEngine> = match config.templates_dir() {
            Some(dir) => Box::new(ThemeTemplates::with_dir(dir)),
            None => Box::new(ThemeTemplates::new()),
        };

        Self {
            model,
            config,
            engine,
            markdown: MarkdownConverter::new(),
        }
    }

    /// Replace the template engine.
    #[must_use]
    pub fn with_engine(mut self, engine: Box<dyn TemplateEngine>) -> Self {
        self.engine = engine;
        self
    }

    /// Execute the full render.
    pub fn build(&self) -> Result<BuildStats> {
        let start = Instant::now();
        let output_dir = self.config.output_dir();

        info!(output = %output_dir.display(), "starting build");

        let types = TypeRegistry::new();
        if let Some(external) = &self.config.external_types {
            types.merge_external(external);
        }

        let staged = StagedOutput::stage(&output_dir, &ResourceBundle::from_config(&self.config))?;

        let resolver = CrossReferenceResolver::new(&self.model.symbol_index, &types);
        let renderer = PageRenderer::new(
            self.model,
            &self.config,
            &resolver,
            self.engine.as_ref(),
            &staged,
        );
        let pass = RenderPass {
            model: self.model,
            config: &self.config,
            markdown: &self.markdown,
            resolver: &resolver,
            renderer: &renderer,
            staged: &staged,
            tally: Tally::default(),
        };
        pass.run();

        let stats = BuildStats {
            pages: pass.tally.written.load(Ordering::Relaxed),
            failed_pages: pass.tally.failed.load(Ordering::Relaxed),
            resources: staged.resources(),
            missing_links: resolver.missing_count(),
            duration_ms: saturating_millis(start.elapsed()),
        };

        info!(
            pages = stats.pages,
            failed_pages = stats.failed_pages,
            resources = stats.resources,
            missing_links = stats.missing_links,
            duration_ms = stats.duration_ms,
            "build complete"
        );

        Ok(stats)
    }
}

/// Whole milliseconds of `duration`, clamped to `u64::MAX`.
fn saturating_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// One run of the per-category passes over a staged output.
struct RenderPass<'a> {
    model: &'a DocumentationModel,
    config: &'a Config,
    markdown: &'a MarkdownConverter,
    resolver: &'a CrossReferenceResolver<'a>,
    renderer: &'a PageRenderer<'a>,
    staged: &'a StagedOutput,
    tally: Tally,
}

impl<'a> RenderPass<'a> {
    fn run(&self) {
        rayon::scope(|s| {
            s.spawn(|_| self.render_readme());
            s.spawn(|_| self.render_guides());
            s.spawn(|_| self.render_pages());
            s.spawn(|_| self.render_restapis());
            s.spawn(|_| self.render_classes());
            s.spawn(|_| self.render_modules());
            s.spawn(|_| self.render_features());
            s.spawn(|_| self.render_files());
        });
    }

    fn render(&self, options: PageOptions<'a>, template_id: &str, output: &str) {
        self.tally
            .record(self.renderer.render(options, template_id, output));
    }

    fn render_readme(&self) {
        let path = self.config.readme_dir().join("README.md");
        let content = match fs::read_to_string(&path) {
            Ok(markdown) => Some(self.markdown.to_html(&markdown)),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "no README");
                None
            }
        };

        let options = PageOptions::new("./", "README", PageType::Home).with_content(content);
        self.render(options, "extra", "index");
    }

    fn render_guides(&self) {
        let model = self.model;
        let guides = &model.guides;
        if guides.is_empty() || self.subdir("guides").is_none() {
            return;
        }

        guides.par_iter().for_each(|guide| {
            let content = guide.content.as_deref().map(|md| self.markdown.to_html(md));
            let options =
                PageOptions::new("../", guide.name.as_str(), PageType::Guides).with_content(content);
            self.render(options, "extra", &guide.filename);
        });
    }

    fn render_pages(&self) {
        if !self.model.pages.is_empty() {
            let options = PageOptions::new("./", "Pages", PageType::Pages);
            self.render(options, "pages", "pages");
        }
    }

    fn render_restapis(&self) {
        if !self.model.restapis.is_empty() {
            let options = PageOptions::new("./", "REST APIs", PageType::RestApis);
            self.render(options, "restapis", "restapis");
        }
    }

    fn render_classes(&self) {
        let model = self.model;
        let classes = &model.classes;
        if classes.is_empty() || self.subdir("classes").is_none() {
            return;
        }

        let resolver = self.resolver;
        classes.par_iter().for_each(|class| {
            let context = format!("(in {})", class.defined_in.as_deref().unwrap_or_default());
            let options = PageOptions::new("../", class.name.as_str(), PageType::Classes)
                .with_subject(class)
                .with_properties(class.sorted_properties())
                .with_type_link(Box::new(move |rel: &str, ty: &str| {
                    resolver.type_link(rel, ty, Some(context.as_str()))
                }));
            self.render(options, "class", &class.filename);
        });
    }

    fn render_modules(&self) {
        let model = self.model;
        let modules = &model.modules;
        if modules.is_empty() || self.subdir("modules").is_none() {
            return;
        }

        modules.par_iter().for_each(|module| {
            let options = PageOptions::new("../", module.name.as_str(), PageType::Modules)
                .with_subject(module)
                .with_properties(module.sorted_properties());
            self.render(options, "module", &module.filename);
        });
    }

    fn render_features(&self) {
        let model = self.model;
        self.render_entities(&model.features, "features", PageType::Features, "feature");
    }

    fn render_files(&self) {
        let model = self.model;
        self.render_entities(&model.files, "files", PageType::Files, "file");
    }

    /// One page per entity, members in model order.
    fn render_entities(
        &self,
        entities: &'a [Entity],
        dir: &str,
        page_type: PageType,
        template_id: &str,
    ) {
        if entities.is_empty() || self.subdir(dir).is_none() {
            return;
        }

        entities.par_iter().for_each(|entity| {
            let options =
                PageOptions::new("../", entity.name.as_str(), page_type).with_subject(entity);
            self.render(options, template_id, &entity.filename);
        });
    }

    /// Create a category directory; failures are logged and skip the category.
    fn subdir(&self, name: &str) -> Option<PathBuf> {
        match self.staged.ensure_subdir(name) {
            Ok(dir) => Some(dir),
            Err(e) => {
                warn!(dir = name, error = %e, "cannot create category directory");
                None
            }
        }
    }
}
