//! Cross-reference resolution.
//!
//! Turns type expressions, see-also names and inline `[[#Name]]` markers into
//! HTML anchors. A reference that cannot be resolved never fails the page: it
//! is logged and rendered as a `missing-link` span so it stays visible.

use std::sync::{LazyLock, Mutex, PoisonError};

use crossdoc_core::{Location, SymbolEntry, SymbolIndex};
use regex::{Captures, Regex};
use thiserror::Error;
use tracing::warn;

use crate::types::TypeRegistry;

/// `[Name](url)` declares a type link in place.
static TYPE_OVERRIDE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(.*)\]\((.*)\)").expect("valid type override pattern"));

/// `Outer<Inner>`; the inner part runs to the last `>` and is not split on commas.
static GENERIC_TYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(.*?)<(.*)>").expect("valid generic type pattern"));

/// `[[#Name]]` where the name holds no brackets.
static INLINE_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[#([^\[\]]+)\]\]").expect("valid inline reference pattern"));

/// A reference that could not be turned into a link.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MissingReference {
    /// The name collides across several documented entities.
    #[error("'{0}' link is ambiguous")]
    Ambiguous(String),

    /// Nothing is documented under the name.
    #[error("'{0}' link does not exist")]
    Missing(String),
}

impl MissingReference {
    /// The unresolved name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Ambiguous(name) | Self::Missing(name) => name,
        }
    }
}

/// A logged missing reference with the context it was met in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingReport {
    pub reference: MissingReference,
    pub context: Option<String>,
}

/// Resolves references against the symbol index and the type registry.
///
/// Safe to share between page-render threads.
#[derive(Debug)]
pub struct CrossReferenceResolver<'a> {
    index: &'a SymbolIndex,
    types: &'a TypeRegistry,
    reports: Mutex<Vec<MissingReport>>,
}

impl<'a> CrossReferenceResolver<'a> {
    /// Create a resolver over a symbol index and a type registry.
    #[must_use]
    pub fn new(index: &'a SymbolIndex, types: &'a TypeRegistry) -> Self {
        Self {
            index,
            types,
            reports: Mutex::new(Vec::new()),
        }
    }

    /// The type registry this resolver reads and extends.
    #[must_use]
    pub fn types(&self) -> &TypeRegistry {
        self.types
    }

    /// Link a type expression.
    ///
    /// Handles `[Name](url)` overrides, which are registered as a side effect,
    /// `Outer<Inner>` generics, and plain names looked up in the registry first
    /// and the symbol index second. `context` is appended to the diagnostic of
    /// a missing name (e.g. `(in lib/widget.js)`).
    pub fn type_link(&self, rel_path: &str, expression: &str, context: Option<&str>) -> String {
        if expression.is_empty() {
            return String::new();
        }

        if let Some(caps) = TYPE_OVERRIDE.captures(expression) {
            let (name, url) = (&caps[1], &caps[2]);
            self.types.register(name, url);
            return anchor(url, name);
        }

        if let Some(caps) = GENERIC_TYPE.captures(expression) {
            return format!(
                "{}&lt;{}&gt;",
                self.type_link(rel_path, &caps[1], context),
                self.type_link(rel_path, &caps[2], context)
            );
        }

        if let Some(url) = self.types.lookup(expression).filter(|url| !url.is_empty()) {
            return anchor(&url, expression);
        }

        match self.lookup(expression) {
            Ok(location) => anchor(&location.href(rel_path), expression),
            Err(reference) => self.missing_link(reference, context),
        }
    }

    /// Link a see-also name if the symbol index knows it, otherwise return it
    /// unchanged. Never logs.
    pub fn see_link(&self, rel_path: &str, text: &str) -> String {
        match self.index.location(text) {
            Some(location) => anchor(&location.href(rel_path), text),
            None => text.to_string(),
        }
    }

    /// Replace every `[[#Name]]` marker in `text` with a link, or with a
    /// missing-link span when the name is unknown or ambiguous.
    pub fn convert_links(&self, rel_path: &str, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        INLINE_REFERENCE
            .replace_all(text, |caps: &Captures<'_>| {
                let name = &caps[1];
                match self.lookup(name) {
                    Ok(location) => anchor(&location.href(rel_path), name),
                    Err(reference) => self.missing_link(reference, None),
                }
            })
            .into_owned()
    }

    /// Exact, non-ambiguous symbol index lookup.
    pub fn lookup(&self, name: &str) -> Result<&'a Location, MissingReference> {
        match self.index.get(name) {
            Some(SymbolEntry::Location(location)) => Ok(location),
            Some(SymbolEntry::Ambiguous) => Err(MissingReference::Ambiguous(name.to_string())),
            None => Err(MissingReference::Missing(name.to_string())),
        }
    }

    /// Log a missing reference and render its flagged span.
    fn missing_link(&self, reference: MissingReference, context: Option<&str>) -> String {
        match context {
            Some(context) => warn!("{reference} {context}"),
            None => warn!("{reference}"),
        }

        let span = format!("<span class='missing-link'>{}</span>", reference.name());
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(MissingReport {
                reference,
                context: context.map(str::to_string),
            });
        span
    }

    /// Number of missing references logged so far.
    #[must_use]
    pub fn missing_count(&self) -> usize {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Missing references logged so far, in the order they were met.
    #[must_use]
    pub fn missing_reports(&self) -> Vec<MissingReport> {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

fn anchor(href: &str, text: &str) -> String {
    format!("<a href='{href}'>{text}</a>")
}
