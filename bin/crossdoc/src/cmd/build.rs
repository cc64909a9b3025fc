//! Build command - renders the documentation site

use std::{
    path::{Path, PathBuf},
    time::Instant,
};

use color_eyre::eyre::{Result, WrapErr};
use crossdoc_core::{Config, DocumentationModel, ExternalTypes};
use crossdoc_generator::{BuildStats, Builder};

/// Command-line values that take precedence over the configuration file.
#[derive(Debug, Clone, Default)]
pub struct BuildOverrides {
    /// Documentation model JSON.
    pub model: PathBuf,
    pub output: Option<PathBuf>,
    pub readme: Option<PathBuf>,
    pub external_types: Option<PathBuf>,
    pub theme: Option<PathBuf>,
    pub quiet: bool,
}

impl BuildOverrides {
    /// Overrides that only name the model.
    pub fn new(model: impl Into<PathBuf>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }

    /// Apply the overrides on top of `config`.
    pub fn apply(&self, config: &mut Config) {
        if let Some(output) = &self.output {
            tracing::info!(output = %output.display(), "Overriding output directory from CLI");
            config.output = output.clone();
        }

        if let Some(readme) = &self.readme {
            config.readme = Some(readme.clone());
        }

        if let Some(path) = &self.external_types {
            config.external_types = Some(ExternalTypes::File(path.clone()));
        }

        if let Some(theme) = &self.theme {
            config.theme = Some(theme.clone());
        }

        config.quiet |= self.quiet;
    }
}

/// Run the build command.
///
/// Loads the configuration and the model, then renders the site.
pub fn run(config_path: &Path, overrides: &BuildOverrides) -> Result<BuildStats> {
    let start = Instant::now();
    tracing::info!(?config_path, model = ?overrides.model, "Starting build");

    let mut config = load_config(config_path)?;
    overrides.apply(&mut config);
    tracing::debug!(?config, "Loaded configuration");

    let model = DocumentationModel::load(&overrides.model).wrap_err("Failed to load model")?;
    let output = config.output_dir();

    let stats = Builder::new(&model, config).build().wrap_err("Build failed")?;

    let duration = start.elapsed();

    println!();
    println!("  Build completed!");
    println!();
    println!("  Pages:         {}", stats.pages);
    println!("  Failed pages:  {}", stats.failed_pages);
    println!("  Resources:     {}", stats.resources);
    println!("  Missing links: {}", stats.missing_links);
    println!();
    println!("  Duration:      {:.2}s", duration.as_secs_f64());
    println!("  Output:        {}", output.display());
    println!();

    tracing::info!(?stats, ?duration, "Build completed");

    Ok(stats)
}

/// Load the configuration file layered with `CROSSDOC__*` variables.
///
/// A missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<Config> {
    Config::load_with_env(path).wrap_err("Failed to load configuration")
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_overrides_apply() {
        let mut config = Config::default();
        let overrides = BuildOverrides {
            output: Some(PathBuf::from("site")),
            external_types: Some(PathBuf::from("types.json")),
            quiet: true,
            ..BuildOverrides::new("doc.json")
        };

        overrides.apply(&mut config);

        assert_eq!(config.output, PathBuf::from("site"));
        assert_eq!(
            config.external_types,
            Some(ExternalTypes::File(PathBuf::from("types.json")))
        );
        assert!(config.quiet);
        assert!(config.readme.is_none());
    }

    #[test]
    fn test_overrides_keep_config_values() {
        let mut config = Config {
            quiet: true,
            theme: Some(PathBuf::from("themes/dark")),
            ..Config::default()
        };

        BuildOverrides::new("doc.json").apply(&mut config);

        assert!(config.quiet);
        assert_eq!(config.theme, Some(PathBuf::from("themes/dark")));
        assert_eq!(config.output, PathBuf::from("doc"));
    }

    #[test]
    fn test_run_renders_site() {
        let dir = TempDir::new().unwrap();
        let model = dir.path().join("doc.json");
        fs::write(
            &model,
            r#"{ "classes": [ { "name": "Widget", "filename": "classes/widget" } ] }"#,
        )
        .unwrap();

        let overrides = BuildOverrides {
            output: Some(dir.path().join("site")),
            quiet: true,
            ..BuildOverrides::new(&model)
        };
        let stats = run(&dir.path().join("missing.toml"), &overrides).unwrap();

        assert_eq!(stats.pages, 2);
        assert!(dir.path().join("site/classes/widget.html").is_file());
    }

    #[test]
    fn test_run_fails_without_model() {
        let dir = TempDir::new().unwrap();
        let overrides = BuildOverrides::new(dir.path().join("absent.json"));

        let result = run(&dir.path().join("crossdoc.toml"), &overrides);
        assert!(result.is_err());
    }
}
