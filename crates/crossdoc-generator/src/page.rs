//! Single page rendering.
//!
//! A [`PageRenderer`] binds a page payload to the model and the resolver,
//! hands it to the template engine and writes the result. Failures are logged
//! and contained to the page.

use std::path::PathBuf;

use crossdoc_core::{Config, DocumentationModel, Entity, Property};
use thiserror::Error;
use tracing::{error, info};

use crate::{
    assets::StagedOutput,
    resolver::CrossReferenceResolver,
    template::{TemplateEngine, TemplateError},
};

/// Type link function: `(rel_path, expression) -> html`.
pub type TypeLinkFn<'a> = Box<dyn Fn(&str, &str) -> String + Send + Sync + 'a>;

/// Page rendering errors.
#[derive(Debug, Error)]
pub enum PageError {
    /// The template engine failed.
    #[error("template {template} failed: {source}")]
    Template {
        template: String,
        #[source]
        source: TemplateError,
    },

    /// The output file could not be written.
    #[error("failed to create {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Site section a page belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageType {
    Home,
    Guides,
    Pages,
    RestApis,
    Classes,
    Modules,
    Features,
    Files,
}

impl PageType {
    /// Identifier used by templates and stylesheets.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Guides => "guides",
            Self::Pages => "pages",
            Self::RestApis => "restapis",
            Self::Classes => "classes",
            Self::Modules => "modules",
            Self::Features => "features",
            Self::Files => "files",
        }
    }
}

/// Payload of one page.
pub struct PageOptions<'a> {
    /// Prefix from the page back to the site root (`./` or `../`).
    pub rel_path: &'static str,
    pub name: String,
    pub page_type: PageType,

    /// Pre-rendered HTML body (README and guides).
    pub content: Option<String>,

    /// Entity the page documents.
    pub subject: Option<&'a Entity>,

    /// Members to list, already in display order.
    pub properties: Vec<&'a Property>,

    /// Specialized type link; the resolver's default is used when unset.
    pub type_link: Option<TypeLinkFn<'a>>,
}

impl<'a> PageOptions<'a> {
    /// Create a payload without content or subject.
    pub fn new(rel_path: &'static str, name: impl Into<String>, page_type: PageType) -> Self {
        Self {
            rel_path,
            name: name.into(),
            page_type,
            content: None,
            subject: None,
            properties: Vec::new(),
            type_link: None,
        }
    }

    #[must_use]
    pub fn with_content(mut self, content: Option<String>) -> Self {
        self.content = content;
        self
    }

    /// Document `entity`, listing its members in their given order.
    #[must_use]
    pub fn with_subject(mut self, entity: &'a Entity) -> Self {
        self.subject = Some(entity);
        self.properties = entity.properties.iter().collect();
        self
    }

    #[must_use]
    pub fn with_properties(mut self, properties: Vec<&'a Property>) -> Self {
        self.properties = properties;
        self
    }

    #[must_use]
    pub fn with_type_link(mut self, type_link: TypeLinkFn<'a>) -> Self {
        self.type_link = Some(type_link);
        self
    }
}

impl std::fmt::Debug for PageOptions<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageOptions")
            .field("rel_path", &self.rel_path)
            .field("name", &self.name)
            .field("page_type", &self.page_type)
            .field("subject", &self.subject.map(|e| &e.name))
            .field("properties", &self.properties.len())
            .field("type_link", &self.type_link.is_some())
            .finish_non_exhaustive()
    }
}

/// Everything a template sees while rendering one page.
pub struct PageContext<'a> {
    pub model: &'a DocumentationModel,
    pub config: &'a Config,
    pub options: PageOptions<'a>,

    /// Whether the engine may reuse frames loaded for earlier pages.
    pub cache: bool,

    resolver: &'a CrossReferenceResolver<'a>,
}

impl<'a> PageContext<'a> {
    /// Bind a payload to the model and resolver.
    pub fn new(
        model: &'a DocumentationModel,
        config: &'a Config,
        resolver: &'a CrossReferenceResolver<'a>,
        options: PageOptions<'a>,
    ) -> Self {
        Self {
            model,
            config,
            options,
            cache: true,
            resolver,
        }
    }

    /// Prefix from this page back to the site root.
    #[must_use]
    pub fn rel_path(&self) -> &'static str {
        self.options.rel_path
    }

    /// Link a type expression, honoring a specialized override.
    pub fn type_link(&self, expression: &str) -> String {
        match &self.options.type_link {
            Some(type_link) => type_link(self.rel_path(), expression),
            None => self.resolver.type_link(self.rel_path(), expression, None),
        }
    }

    /// Link a see-also name.
    pub fn see_link(&self, text: &str) -> String {
        self.resolver.see_link(self.rel_path(), text)
    }

    /// Expand `[[#Name]]` markers.
    pub fn convert_links(&self, text: &str) -> String {
        self.resolver.convert_links(self.rel_path(), text)
    }
}

/// Renders pages into a staged output directory.
pub struct PageRenderer<'a> {
    model: &'a DocumentationModel,
    config: &'a Config,
    resolver: &'a CrossReferenceResolver<'a>,
    engine: &'a dyn TemplateEngine,
    output: &'a StagedOutput,
}

impl<'a> PageRenderer<'a> {
    pub fn new(
        model: &'a DocumentationModel,
        config: &'a Config,
        resolver: &'a CrossReferenceResolver<'a>,
        engine: &'a dyn TemplateEngine,
        output: &'a StagedOutput,
    ) -> Self {
        Self {
            model,
            config,
            resolver,
            engine,
            output,
        }
    }

    /// Render one page to `<output>/<output_path>.html`.
    ///
    /// Returns whether the file was written. Errors are logged, never returned.
    pub fn render(&self, options: PageOptions<'a>, template_id: &str, output_path: &str) -> bool {
        match self.try_render(options, template_id, output_path) {
            Ok(path) => {
                if !self.config.quiet {
                    info!("{} is created", path.display());
                }
                true
            }
            Err(e @ PageError::Template { .. }) => {
                error!(error = ?e, "{e}");
                false
            }
            Err(e) => {
                error!("{e}");
                false
            }
        }
    }

    /// Render one page, reporting the failure instead of logging it.
    pub fn try_render(
        &self,
        options: PageOptions<'a>,
        template_id: &str,
        output_path: &str,
    ) -> Result<PathBuf, PageError> {
        let context = PageContext::new(self.model, self.config, self.resolver, options);

        let html = self
            .engine
            .render(template_id, &context)
            .map_err(|source| PageError::Template {
                template: template_id.to_string(),
                source,
            })?;

        let path = self.output.page_path(output_path);
        std::fs::write(&path, html).map_err(|source| PageError::Write {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}
