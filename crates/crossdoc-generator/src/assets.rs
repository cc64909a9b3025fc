//! Output directory staging.
//!
//! Staging wipes the output directory, recreates it and copies the theme
//! resource bundle into it. Every page render needs the [`StagedOutput`]
//! handle that only a successful staging returns.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use crossdoc_core::Config;
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Files of the built-in theme bundle.
const BUILTIN_RESOURCES: &[(&str, &str)] = &[
    ("css/style.css", include_str!("../theme/css/style.css")),
    ("js/crossdoc.js", include_str!("../theme/js/crossdoc.js")),
];

/// Staging errors. All of them abort the run.
#[derive(Debug, Error)]
pub enum StagingError {
    /// The previous output could not be removed.
    #[error("cannot clear output directory {}: {source}", path.display())]
    Clear {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The output directory could not be created.
    #[error("cannot create output directory {}: {source}", path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A resource file could not be copied or written.
    #[error("cannot copy resource to {}: {source}", path.display())]
    Copy {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The resource directory could not be walked.
    #[error("cannot read resources: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Result type for staging operations.
pub type Result<T> = std::result::Result<T, StagingError>;

/// Static files copied into the output root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceBundle {
    /// No resources.
    None,

    /// The stylesheet and script shipped with crossdoc.
    Builtin,

    /// A theme resource directory, copied recursively.
    Directory(PathBuf),
}

impl ResourceBundle {
    /// Bundle selected by the configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        config
            .resources_dir()
            .map_or(Self::Builtin, Self::Directory)
    }
}

/// An output directory that has been cleared and populated with resources.
#[derive(Debug)]
pub struct StagedOutput {
    root: PathBuf,
    resources: usize,
}

impl StagedOutput {
    /// Clear `root`, recreate it and copy `bundle` into it.
    pub fn stage(root: impl Into<PathBuf>, bundle: &ResourceBundle) -> Result<Self> {
        let root = root.into();
        info!(output = %root.display(), "staging output directory");

        clear_dir(&root)?;
        fs::create_dir_all(&root).map_err(|source| StagingError::Create {
            path: root.clone(),
            source,
        })?;

        let resources = match bundle {
            ResourceBundle::None => 0,
            ResourceBundle::Builtin => write_builtin(&root)?,
            ResourceBundle::Directory(dir) => copy_dir(dir, &root)?,
        };

        debug!(resources, "output directory staged");
        Ok(Self { root, resources })
    }

    /// The output root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of resource files copied during staging.
    #[must_use]
    pub fn resources(&self) -> usize {
        self.resources
    }

    /// Path of the page `<root>/<relative>.html`.
    #[must_use]
    pub fn page_path(&self, relative: &str) -> PathBuf {
        self.root.join(format!("{relative}.html"))
    }

    /// Create a category subdirectory. An existing directory is fine.
    pub fn ensure_subdir(&self, name: &str) -> io::Result<PathBuf> {
        let dir = self.root.join(name);
        match fs::create_dir(&dir) {
            Ok(()) => Ok(dir),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(dir),
            Err(e) => Err(e),
        }
    }
}

/// Remove everything inside `dir`, keeping the directory itself.
fn clear_dir(dir: &Path) -> Result<()> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(source) => {
            return Err(StagingError::Clear {
                path: dir.to_path_buf(),
                source,
            });
        }
    };

    for entry in entries {
        let path = entry
            .map_err(|source| StagingError::Clear {
                path: dir.to_path_buf(),
                source,
            })?
            .path();

        let removed = if path.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        removed.map_err(|source| StagingError::Clear { path, source })?;
    }

    Ok(())
}

fn write_builtin(root: &Path) -> Result<usize> {
    for (relative, content) in BUILTIN_RESOURCES {
        let dest = root.join(relative);
        write_file(&dest, |dest| fs::write(dest, content))?;
    }
    Ok(BUILTIN_RESOURCES.len())
}

/// Copy `source` into `dest` recursively, skipping hidden entries.
fn copy_dir(source: &Path, dest: &Path) -> Result<usize> {
    if !source.is_dir() {
        debug!(source = %source.display(), "resource directory does not exist, skipping");
        return Ok(0);
    }

    let mut count = 0;
    let walker = WalkDir::new(source)
        .min_depth(1)
        .into_iter()
        .filter_entry(|e| !e.file_name().to_string_lossy().starts_with('.'));

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let Ok(relative) = entry.path().strip_prefix(source) else {
            continue;
        };
        let target = dest.join(relative);
        write_file(&target, |target| fs::copy(entry.path(), target).map(|_| ()))?;

        debug!(src = %entry.path().display(), dest = %target.display(), "copied resource");
        count += 1;
    }

    Ok(count)
}

fn write_file(dest: &Path, write: impl FnOnce(&Path) -> io::Result<()>) -> Result<()> {
    let copy_err = |source| StagingError::Copy {
        path: dest.to_path_buf(),
        source,
    };

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(copy_err)?;
    }
    write(dest).map_err(copy_err)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_stage_creates_missing_dir() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("out/doc");

        let staged = StagedOutput::stage(&root, &ResourceBundle::None).unwrap();

        assert!(root.is_dir());
        assert_eq!(staged.root(), root);
        assert_eq!(staged.resources(), 0);
    }

    #[test]
    fn test_stage_clears_previous_output() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("doc");
        fs::create_dir_all(root.join("classes")).unwrap();
        fs::write(root.join("classes/old.html"), "old").unwrap();
        fs::write(root.join("stale.html"), "stale").unwrap();

        StagedOutput::stage(&root, &ResourceBundle::None).unwrap();

        assert!(root.is_dir());
        assert_eq!(fs::read_dir(&root).unwrap().count(), 0);
    }

    #[test]
    fn test_stage_builtin_bundle() {
        let dir = TempDir::new().unwrap();
        let staged = StagedOutput::stage(dir.path().join("doc"), &ResourceBundle::Builtin).unwrap();

        assert_eq!(staged.resources(), 2);
        assert!(staged.root().join("css/style.css").is_file());
        assert!(staged.root().join("js/crossdoc.js").is_file());
    }

    #[test]
    fn test_stage_theme_directory() {
        let theme = TempDir::new().unwrap();
        fs::create_dir_all(theme.path().join("images")).unwrap();
        fs::write(theme.path().join("style.css"), "body {}").unwrap();
        fs::write(theme.path().join("images/logo.svg"), "<svg/>").unwrap();
        fs::write(theme.path().join(".DS_Store"), "").unwrap();

        let out = TempDir::new().unwrap();
        let bundle = ResourceBundle::Directory(theme.path().to_path_buf());
        let staged = StagedOutput::stage(out.path().join("doc"), &bundle).unwrap();

        assert_eq!(staged.resources(), 2);
        assert!(staged.root().join("style.css").is_file());
        assert!(staged.root().join("images/logo.svg").is_file());
        assert!(!staged.root().join(".DS_Store").exists());
    }

    #[test]
    fn test_stage_fails_when_root_is_a_file() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("doc");
        fs::write(&root, "not a directory").unwrap();

        let result = StagedOutput::stage(&root, &ResourceBundle::None);
        assert!(result.is_err());
    }

    #[test]
    fn test_ensure_subdir_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let staged = StagedOutput::stage(dir.path().join("doc"), &ResourceBundle::None).unwrap();

        let first = staged.ensure_subdir("classes").unwrap();
        let second = staged.ensure_subdir("classes").unwrap();

        assert_eq!(first, second);
        assert!(first.is_dir());
        assert_eq!(staged.page_path("classes/widget"), first.join("widget.html"));
    }

    #[test]
    fn test_bundle_from_config() {
        let mut config = Config::default();
        assert_eq!(ResourceBundle::from_config(&config), ResourceBundle::Builtin);

        config.theme = Some(PathBuf::from("/themes/plain"));
        assert_eq!(
            ResourceBundle::from_config(&config),
            ResourceBundle::Directory(PathBuf::from("/themes/plain/resources"))
        );
    }
}
