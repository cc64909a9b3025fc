//! Type name to URL registry.
//!
//! The registry is created once per run, seeded with the built-in types, then
//! extended by external configuration and by inline `[Name](url)` overrides met
//! while rendering. It is shared by every page render, so updates go through a
//! lock and each one is atomic; the last update to a name wins.

use std::{
    collections::{BTreeMap, HashMap},
    path::{Path, PathBuf},
    sync::RwLock,
};

use crossdoc_core::ExternalTypes;
use thiserror::Error;
use tracing::{debug, info, warn};

const BUILTIN_BASE_URL: &str = "https://developer.mozilla.org/en/JavaScript/Reference/Global_Objects/";

/// Built-in type names. `undefined` is the "no value" type.
pub const BUILTIN_TYPES: &[&str] = &[
    "Object",
    "Boolean",
    "String",
    "Array",
    "Number",
    "Date",
    "Function",
    "RegExp",
    "Error",
    "undefined",
];

/// External type configuration errors.
#[derive(Debug, Error)]
pub enum ExternalTypesError {
    /// The file could not be read.
    #[error("external-types: cannot open {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not a JSON object of strings.
    #[error("external-types: invalid JSON file {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Registry of type names with known documentation URLs.
#[derive(Debug)]
pub struct TypeRegistry {
    types: RwLock<HashMap<String, String>>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Create a registry seeded with the built-in types.
    #[must_use]
    pub fn new() -> Self {
        let registry = Self {
            types: RwLock::new(HashMap::new()),
        };
        registry.seed_builtins();
        registry
    }

    /// Register the fixed table of built-in types.
    fn seed_builtins(&self) {
        for name in BUILTIN_TYPES {
            self.register(*name, format!("{BUILTIN_BASE_URL}{name}"));
        }
    }

    /// URL registered for `name`.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<String> {
        self.read().get(name).cloned()
    }

    /// Register `name`, replacing any previous URL.
    pub fn register(&self, name: impl Into<String>, url: impl Into<String>) {
        let name = name.into();
        let url = url.into();
        let mut types = self
            .types
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(previous) = types.get(&name)
            && *previous != url
        {
            debug!(name = %name, from = %previous, to = %url, "type link replaced");
        }
        types.insert(name, url);
    }

    /// Number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Sorted copy of the registry contents.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Merge external type links, logging instead of failing.
    ///
    /// Returns the number of registered entries. On a read or parse failure
    /// the registry keeps its current contents.
    pub fn merge_external(&self, external: &ExternalTypes) -> usize {
        match self.try_merge_external(external) {
            Ok(count) => {
                info!(count, "loaded external types");
                count
            }
            Err(e) => {
                warn!("{e}");
                0
            }
        }
    }

    /// Merge external type links.
    pub fn try_merge_external(
        &self,
        external: &ExternalTypes,
    ) -> Result<usize, ExternalTypesError> {
        let types = match external {
            ExternalTypes::Inline(map) => map.clone(),
            ExternalTypes::File(path) => read_types_file(path)?,
        };

        let count = types.len();
        for (name, url) in types {
            self.register(name, url);
        }
        Ok(count)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, String>> {
        self.types
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// Read a JSON object of `name: url` pairs. Entries whose value is not a
/// string are skipped.
fn read_types_file(path: &Path) -> Result<BTreeMap<String, String>, ExternalTypesError> {
    let content = std::fs::read_to_string(path).map_err(|source| ExternalTypesError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let entries: BTreeMap<String, serde_json::Value> = serde_json::from_str(content.trim())
        .map_err(|source| ExternalTypesError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(entries
        .into_iter()
        .filter_map(|(name, value)| match value {
            serde_json::Value::String(url) => Some((name, url)),
            other => {
                debug!(name = %name, value = %other, "skipping non-string external type");
                None
            }
        })
        .collect())
}
