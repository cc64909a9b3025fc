//! Run configuration.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Main configuration structure for a crossdoc run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Root of the documented project.
    #[serde(default = "default_project_dir")]
    pub project_dir: PathBuf,

    /// Output directory, relative to `project_dir` unless absolute.
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Directory holding the `README.md` used for the homepage.
    #[serde(default)]
    pub readme: Option<PathBuf>,

    /// Extra type name to URL mappings.
    #[serde(default, rename = "external-types", alias = "external_types")]
    pub external_types: Option<ExternalTypes>,

    /// Suppress the per-file success log lines.
    #[serde(default, alias = "quite")]
    pub quiet: bool,

    /// Theme directory with optional `resources/` and `templates/` subdirectories.
    #[serde(default)]
    pub theme: Option<PathBuf>,
}

/// Source of external type links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExternalTypes {
    /// Path to a JSON file holding an object of `name: url` pairs.
    File(PathBuf),

    /// Mapping given directly in the configuration.
    Inline(BTreeMap<String, String>),
}

fn default_project_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_output() -> PathBuf {
    PathBuf::from("doc")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project_dir: default_project_dir(),
            output: default_output(),
            readme: None,
            external_types: None,
            quiet: false,
            theme: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            CoreError::config_with_source(
                format!("Failed to parse config file: {}", path.display()),
                e,
            )
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration, falling back to defaults when the file is absent.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration layered with `CROSSDOC__*` environment variables.
    pub fn load_with_env(path: &Path) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(config::Environment::with_prefix("CROSSDOC").separator("__"))
            .build()?;

        let mut config: Config = settings.try_deserialize()?;
        if let Some(ExternalTypes::Inline(map)) = &mut config.external_types {
            restore_type_name_case(path, map)?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<()> {
        if self.output.as_os_str().is_empty() {
            return Err(CoreError::config("output cannot be empty"));
        }

        if let Some(ExternalTypes::File(path)) = &self.external_types
            && path.as_os_str().is_empty()
        {
            return Err(CoreError::config("external-types path cannot be empty"));
        }

        Ok(())
    }

    /// Resolved output directory.
    pub fn output_dir(&self) -> PathBuf {
        self.project_dir.join(&self.output)
    }

    /// Directory searched for `README.md`.
    pub fn readme_dir(&self) -> &Path {
        self.readme.as_deref().unwrap_or(&self.project_dir)
    }

    /// Theme resource bundle directory, if a theme is configured.
    pub fn resources_dir(&self) -> Option<PathBuf> {
        self.theme.as_ref().map(|theme| theme.join("resources"))
    }

    /// Theme template override directory, if a theme is configured.
    pub fn templates_dir(&self) -> Option<PathBuf> {
        self.theme.as_ref().map(|theme| theme.join("templates"))
    }
}

/// The `external-types` entry of a configuration file, read as written.
#[derive(Deserialize)]
struct FileExternalTypes {
    #[serde(default, rename = "external-types", alias = "external_types")]
    external_types: Option<ExternalTypes>,
}

/// Replace the keys of an inline table with their spelling in the file.
///
/// The layered loader lowercases keys; type names are case-sensitive.
fn restore_type_name_case(path: &Path, map: &mut BTreeMap<String, String>) -> Result<()> {
    if !path.is_file() || path.extension().is_some_and(|ext| ext != "toml") {
        return Ok(());
    }

    let content = std::fs::read_to_string(path)?;
    let file: FileExternalTypes = toml::from_str(&content).map_err(|e| {
        CoreError::config_with_source(
            format!("Failed to parse config file: {}", path.display()),
            e,
        )
    })?;
    if let Some(ExternalTypes::Inline(original)) = file.external_types {
        for (name, url) in original {
            map.remove(&name.to_lowercase());
            map.insert(name, url);
        }
    }
    Ok(())
}
