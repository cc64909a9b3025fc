//! crossdoc Generator Library
//!
//! Renders a documentation model into a static HTML site.
//!
//! # Modules
//!
//! - [`types`] - Type name to URL registry with external type loading
//! - [`resolver`] - Cross-reference resolution and missing link reporting
//! - [`template`] - HTML template system with variable interpolation
//! - [`html`] - Page body and member list generation
//! - [`markdown`] - README and guide Markdown conversion
//! - [`page`] - Single page rendering
//! - [`assets`] - Output directory staging and theme resources
//! - [`build`] - Build orchestration
//! - [`check`] - Reference audit without rendering

pub mod assets;
pub mod build;
pub mod check;
pub mod html;
pub mod markdown;
pub mod page;
pub mod resolver;
pub mod template;
pub mod types;

pub use assets::{ResourceBundle, StagedOutput, StagingError};
pub use build::{BuildError, BuildStats, Builder};
pub use check::{ReferenceAudit, audit_references};
pub use markdown::MarkdownConverter;
pub use page::{PageContext, PageError, PageOptions, PageRenderer, PageType};
pub use resolver::{CrossReferenceResolver, MissingReference, MissingReport};
pub use template::{Template, TemplateContext, TemplateEngine, TemplateError, ThemeTemplates};
pub use types::{ExternalTypesError, TypeRegistry};
