//! crossdoc CLI Library
//!
//! Command implementations for the crossdoc binary, exposed as a library so
//! they can be driven from tests and other tools.
//!
//! # Modules
//!
//! - [`cmd`] - Command implementations (build, check)
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use crossdoc::cmd::{self, build::BuildOverrides};
//!
//! let overrides = BuildOverrides::new("doc.json");
//! cmd::build::run(Path::new("crossdoc.toml"), &overrides).unwrap();
//! ```

pub mod cmd;

pub use crossdoc_core::{Config, DocumentationModel};
pub use crossdoc_generator::{BuildStats, Builder};

/// Initialize tracing with the specified verbosity level.
///
/// # Arguments
///
/// * `verbose` - Verbosity level (0 = INFO, 1 = DEBUG, 2+ = TRACE)
pub fn init_tracing(verbose: u8) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = match verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}
