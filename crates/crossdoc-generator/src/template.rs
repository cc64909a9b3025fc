//! HTML templates for generated pages.
//!
//! Templates are plain HTML frames with `{{ variable }}` interpolation. The
//! engine behind [`TemplateEngine`] is replaceable; [`ThemeTemplates`] is the
//! default one, with built-in frames that a theme directory may override.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{PoisonError, RwLock},
};

use thiserror::Error;
use tracing::debug;

use crate::{html, page::PageContext};

/// Template rendering errors.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Missing required variable.
    #[error("missing required variable: {0}")]
    MissingVariable(String),

    /// Template not found.
    #[error("template not found: {0}")]
    NotFound(String),

    /// Invalid template syntax.
    #[error("invalid template syntax in {template}: {message}")]
    InvalidSyntax { template: String, message: String },

    /// Template override could not be read.
    #[error("cannot read template {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for template operations.
pub type Result<T> = std::result::Result<T, TemplateError>;

/// Renders a page payload with a named template.
pub trait TemplateEngine: Send + Sync {
    /// Render `template_id` for `page`.
    fn render(&self, template_id: &str, page: &PageContext<'_>) -> Result<String>;
}

/// Template context with variables for interpolation.
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    variables: HashMap<String, String>,
}

impl TemplateContext {
    /// Create a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a variable into the context.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.variables.insert(key.into(), value.into());
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert a variable only when the value is non-empty.
    #[must_use]
    pub fn with_non_empty(mut self, key: impl Into<String>, value: String) -> Self {
        if !value.is_empty() {
            self.insert(key, value);
        }
        self
    }

    /// Get a variable value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.variables.get(key).map(String::as_str)
    }
}

/// A template frame supporting `{{ name }}` and optional `{{ name? }}`
/// placeholders.
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    content: String,
}

impl Template {
    /// Create a new template with the given name and content.
    #[must_use]
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Get the template name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Render the template with the given context.
    ///
    /// Substituted values are not scanned again for placeholders.
    pub fn render(&self, context: &TemplateContext) -> Result<String> {
        let mut out = String::with_capacity(self.content.len());
        let mut rest = self.content.as_str();

        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let end = after.find("}}").ok_or_else(|| TemplateError::InvalidSyntax {
                template: self.name.clone(),
                message: "unclosed {{ delimiter".to_string(),
            })?;

            let var_name = after[..end].trim();
            let (var_name, optional) = match var_name.strip_suffix('?') {
                Some(stripped) => (stripped.trim_end(), true),
                None => (var_name, false),
            };

            match context.get(var_name) {
                Some(value) => out.push_str(value),
                None if optional => {}
                None => return Err(TemplateError::MissingVariable(var_name.to_string())),
            }

            rest = &after[end + 2..];
        }

        out.push_str(rest);
        Ok(out)
    }
}

/// Default engine: built-in frames, optionally overridden from a directory.
#[derive(Debug, Default)]
pub struct ThemeTemplates {
    templates_dir: Option<PathBuf>,
    cache: RwLock<HashMap<String, Template>>,
}

impl ThemeTemplates {
    /// Engine using only the built-in frames.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine reading `<dir>/<id>.html` overrides before the built-in frames.
    #[must_use]
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            templates_dir: Some(dir.into()),
            cache: RwLock::default(),
        }
    }

    /// Fetch a frame. With `cache` set, each frame is loaded once per engine.
    fn frame(&self, id: &str, cache: bool) -> Result<Template> {
        if cache
            && let Some(template) = self
                .cache
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .get(id)
        {
            return Ok(template.clone());
        }

        let template = self.load(id)?;
        if cache {
            self.cache
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(id.to_string(), template.clone());
        }
        Ok(template)
    }

    fn load(&self, id: &str) -> Result<Template> {
        if let Some(dir) = &self.templates_dir {
            let path = dir.join(format!("{id}.html"));
            if path.is_file() {
                return read_template(id, &path);
            }
        }

        builtin_frame(id)
            .map(|content| Template::new(id, content))
            .ok_or_else(|| TemplateError::NotFound(id.to_string()))
    }
}

impl TemplateEngine for ThemeTemplates {
    fn render(&self, template_id: &str, page: &PageContext<'_>) -> Result<String> {
        if template_id == LAYOUT {
            return Err(TemplateError::NotFound(template_id.to_string()));
        }

        let frame = self.frame(template_id, page.cache)?;
        let body = frame.render(&html::body_context(template_id, page))?;

        let layout = self.frame(LAYOUT, page.cache)?;
        layout.render(&html::layout_context(page, &body))
    }
}

fn read_template(id: &str, path: &Path) -> Result<Template> {
    debug!(template = id, path = %path.display(), "loading template override");
    std::fs::read_to_string(path)
        .map(|content| Template::new(id, content))
        .map_err(|source| TemplateError::Read {
            path: path.to_path_buf(),
            source,
        })
}

/// Name of the frame wrapping every page.
pub const LAYOUT: &str = "layout";

fn builtin_frame(id: &str) -> Option<&'static str> {
    match id {
        LAYOUT => Some(DEFAULT_LAYOUT_TEMPLATE),
        "extra" => Some(DEFAULT_EXTRA_TEMPLATE),
        "pages" => Some(DEFAULT_PAGES_TEMPLATE),
        "restapis" => Some(DEFAULT_RESTAPIS_TEMPLATE),
        "class" => Some(DEFAULT_CLASS_TEMPLATE),
        "module" => Some(DEFAULT_MODULE_TEMPLATE),
        "feature" => Some(DEFAULT_FEATURE_TEMPLATE),
        "file" => Some(DEFAULT_FILE_TEMPLATE),
        _ => None,
    }
}

/// Default page layout.
pub const DEFAULT_LAYOUT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{{ title }}</title>
    <link rel="stylesheet" href="{{ rel_path }}css/style.css">
</head>
<body class="{{ type }}">
    <nav class="sidebar">
{{ nav }}
    </nav>
    <main class="content">
{{ body }}
    </main>
    <script src="{{ rel_path }}js/crossdoc.js"></script>
</body>
</html>
"#;

/// Homepage and guides.
pub const DEFAULT_EXTRA_TEMPLATE: &str = r#"<article class="extra">
{{ content? }}
</article>"#;

/// Aggregate page of all documentation pages.
pub const DEFAULT_PAGES_TEMPLATE: &str = r#"<section class="pages">
    <h1>{{ name }}</h1>
{{ items }}
</section>"#;

/// Aggregate page of all REST APIs.
pub const DEFAULT_RESTAPIS_TEMPLATE: &str = r#"<section class="restapis">
    <h1>{{ name }}</h1>
{{ items }}
</section>"#;

pub const DEFAULT_CLASS_TEMPLATE: &str = r#"<article class="class" id="{{ html_id? }}">
    <h1>{{ name }}</h1>
    {{ extends? }}
    {{ defined_in? }}
    <div class="description">{{ description? }}</div>
    {{ see? }}
{{ members }}
</article>"#;

pub const DEFAULT_MODULE_TEMPLATE: &str = r#"<article class="module" id="{{ html_id? }}">
    <h1>{{ name }}</h1>
    {{ defined_in? }}
    <div class="description">{{ description? }}</div>
    {{ see? }}
{{ members }}
</article>"#;

pub const DEFAULT_FEATURE_TEMPLATE: &str = r#"<article class="feature" id="{{ html_id? }}">
    <h1>{{ name }}</h1>
    <div class="description">{{ description? }}</div>
    {{ see? }}
{{ members }}
</article>"#;

pub const DEFAULT_FILE_TEMPLATE: &str = r#"<article class="file" id="{{ html_id? }}">
    <h1>{{ name }}</h1>
    <div class="description">{{ description? }}</div>
{{ members }}
</article>"#;

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_template_render() {
        let template = Template::new("test", "Hello, {{ name }}!");
        let ctx = TemplateContext::new().with_var("name", "World");

        assert_eq!(template.render(&ctx).unwrap(), "Hello, World!");
    }

    #[test]
    fn test_optional_variable() {
        let template = Template::new("test", "Hello{{ suffix? }}!");
        let ctx = TemplateContext::new();

        assert_eq!(template.render(&ctx).unwrap(), "Hello!");
    }

    #[test]
    fn test_missing_required_variable() {
        let template = Template::new("test", "Hello, {{ name }}!");
        let result = template.render(&TemplateContext::new());

        assert!(matches!(result, Err(TemplateError::MissingVariable(ref v)) if v == "name"));
    }

    #[test]
    fn test_unclosed_delimiter() {
        let template = Template::new("broken", "Hello, {{ name");
        let ctx = TemplateContext::new().with_var("name", "World");

        let err = template.render(&ctx).unwrap_err();
        assert!(err.to_string().contains("broken"));
    }

    #[test]
    fn test_values_are_not_rescanned() {
        let template = Template::new("test", "{{ a }}{{ b }}");
        let ctx = TemplateContext::new()
            .with_var("a", "{{ b }}")
            .with_var("b", "x");

        assert_eq!(template.render(&ctx).unwrap(), "{{ b }}x");
    }

    #[test]
    fn test_with_non_empty() {
        let ctx = TemplateContext::new()
            .with_non_empty("a", String::new())
            .with_non_empty("b", "x".to_string());

        assert!(ctx.get("a").is_none());
        assert_eq!(ctx.get("b"), Some("x"));
    }

    #[test]
    fn test_builtin_frames() {
        let engine = ThemeTemplates::new();
        for id in [LAYOUT, "extra", "pages", "restapis", "class", "module", "feature", "file"] {
            assert!(engine.frame(id, true).is_ok(), "missing frame {id}");
        }
        assert!(matches!(
            engine.frame("nope", true),
            Err(TemplateError::NotFound(_))
        ));
    }

    #[test]
    fn test_override_frame_and_cache() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("extra.html");
        std::fs::write(&path, "first {{ content? }}").unwrap();

        let engine = ThemeTemplates::with_dir(dir.path());
        let cached = engine.frame("extra", true).unwrap();
        assert_eq!(cached.render(&TemplateContext::new()).unwrap(), "first ");

        std::fs::write(&path, "second").unwrap();
        let again = engine.frame("extra", true).unwrap();
        assert_eq!(again.render(&TemplateContext::new()).unwrap(), "first ");

        let fresh = engine.frame("extra", false).unwrap();
        assert_eq!(fresh.render(&TemplateContext::new()).unwrap(), "second");

        // Frames without an override fall back to the built-in one.
        assert!(engine.frame("class", true).is_ok());
    }
}
