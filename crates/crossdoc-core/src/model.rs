//! Documentation model produced by the comment parser.
//!
//! The model is read-only for the rendering stage. It is usually loaded from
//! the JSON document the parser writes, see [`DocumentationModel::load`].

use std::{collections::HashMap, path::Path};

use serde::Deserialize;

use crate::error::{CoreError, Result};

/// Where a documented symbol lives in the generated site.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Location {
    /// Output file stem, relative to the site root (e.g. `classes/widget`).
    pub filename: String,

    /// Anchor id inside that file.
    #[serde(alias = "html_id")]
    pub anchor_id: String,
}

impl Location {
    /// Create a new location.
    pub fn new(filename: impl Into<String>, anchor_id: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            anchor_id: anchor_id.into(),
        }
    }

    /// Link target for this location as seen from a page at `rel_path`.
    pub fn href(&self, rel_path: &str) -> String {
        format!("{rel_path}{}.html#{}", self.filename, self.anchor_id)
    }
}

/// Entry of the symbol index.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawSymbolEntry")]
pub enum SymbolEntry {
    /// The name maps to exactly one location.
    Location(Location),

    /// The name collided across the codebase.
    Ambiguous,
}

/// Wire form: a location object, or a marker whose value is never read (the
/// parser writes `"DUPLICATED ENTRY"`).
#[derive(Deserialize)]
#[serde(untagged)]
enum RawSymbolEntry {
    Location(Location),
    Marker(serde::de::IgnoredAny),
}

impl From<RawSymbolEntry> for SymbolEntry {
    fn from(raw: RawSymbolEntry) -> Self {
        match raw {
            RawSymbolEntry::Location(location) => Self::Location(location),
            RawSymbolEntry::Marker(_) => Self::Ambiguous,
        }
    }
}

/// Symbol name to location mapping. Keys are case-sensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct SymbolIndex {
    entries: HashMap<String, SymbolEntry>,
}

impl SymbolIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a unique location for `name`.
    pub fn insert(&mut self, name: impl Into<String>, location: Location) {
        self.entries
            .insert(name.into(), SymbolEntry::Location(location));
    }

    /// Mark `name` as colliding.
    pub fn mark_ambiguous(&mut self, name: impl Into<String>) {
        self.entries.insert(name.into(), SymbolEntry::Ambiguous);
    }

    /// Raw entry for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SymbolEntry> {
        self.entries.get(name)
    }

    /// Location of `name` if it is known and unambiguous.
    #[must_use]
    pub fn location(&self, name: &str) -> Option<&Location> {
        match self.entries.get(name) {
            Some(SymbolEntry::Location(location)) => Some(location),
            _ => None,
        }
    }

    /// Number of entries, ambiguous ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A function or method parameter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Param {
    pub name: String,
    pub types: Vec<String>,
    pub description: String,
    pub optional: bool,
}

/// Return value of a callable member.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Returns {
    pub types: Vec<String>,
    pub description: String,
}

/// A documented member of an entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Property {
    /// Member name. For REST endpoints this is the path.
    pub name: String,

    /// Member kind (`method`, `property`, `event`, or an HTTP verb).
    pub kind: String,

    /// Anchor id of the member on its page.
    pub html_id: String,

    /// Description, possibly holding `[[#Name]]` references.
    pub description: String,

    /// Type expressions of the value.
    pub types: Vec<String>,

    pub params: Vec<Param>,
    pub returns: Option<Returns>,

    /// See-also symbol names.
    pub see: Vec<String>,

    #[serde(rename = "static")]
    pub is_static: bool,

    #[serde(rename = "private")]
    pub is_private: bool,
}

/// A documentable entity: guide, page, REST API, class, module, feature or file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Entity {
    pub name: String,

    /// Output file stem relative to the site root (e.g. `classes/widget`).
    pub filename: String,

    pub html_id: String,

    pub description: String,

    /// Markdown body (guides).
    pub content: Option<String>,

    /// Source location label, used in diagnostics.
    pub defined_in: Option<String>,

    /// Base type expressions (classes).
    pub extends: Vec<String>,

    pub see: Vec<String>,

    pub properties: Vec<Property>,
}

impl Entity {
    /// Create an entity with a name and file stem.
    pub fn new(name: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            filename: filename.into(),
            ..Self::default()
        }
    }

    /// Properties sorted by name, ordinal and ascending.
    ///
    /// Returns a new collection; the entity is left untouched.
    #[must_use]
    pub fn sorted_properties(&self) -> Vec<&Property> {
        let mut properties: Vec<&Property> = self.properties.iter().collect();
        properties.sort_by(|a, b| a.name.cmp(&b.name));
        properties
    }
}

/// The whole parsed codebase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DocumentationModel {
    #[serde(rename = "ids", alias = "symbol_index")]
    pub symbol_index: SymbolIndex,

    pub guides: Vec<Entity>,
    pub pages: Vec<Entity>,

    #[serde(alias = "rest_apis", alias = "restApis")]
    pub restapis: Vec<Entity>,

    pub classes: Vec<Entity>,
    pub modules: Vec<Entity>,
    pub features: Vec<Entity>,
    pub files: Vec<Entity>,
}

impl DocumentationModel {
    /// Load a model from its JSON document.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content).map_err(|e| match e {
            CoreError::Model { message, .. } => CoreError::model(path, message),
            other => other,
        })
    }

    /// Decode a model from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| CoreError::model("<inline>", e.to_string()))
    }
}
