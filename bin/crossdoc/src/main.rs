//! crossdoc CLI
//!
//! Renders a documentation model into a static HTML site.
//!
//! This is the binary entry point. The library functionality is in `lib.rs`.

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::Result;
use crossdoc::cmd::build::BuildOverrides;

/// Command-line interface for crossdoc.
#[derive(Parser)]
#[command(
    name = "crossdoc",
    version,
    about = "Render documentation sites with cross-referenced types"
)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "crossdoc.toml")]
    config: PathBuf,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(clap::Subcommand)]
enum Commands {
    /// Render the documentation site
    Build {
        /// Documentation model JSON
        #[arg(short, long)]
        model: PathBuf,
        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Directory holding README.md
        #[arg(long)]
        readme: Option<PathBuf>,
        /// JSON file of extra type name to URL mappings
        #[arg(long)]
        external_types: Option<PathBuf>,
        /// Theme directory
        #[arg(long)]
        theme: Option<PathBuf>,
        /// Do not log each created file
        #[arg(short, long)]
        quiet: bool,
    },
    /// Resolve every reference without writing the site
    Check {
        /// Documentation model JSON
        #[arg(short, long)]
        model: PathBuf,
        /// Fail when any reference is missing
        #[arg(long)]
        strict: bool,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    crossdoc::init_tracing(cli.verbose);

    match cli.command {
        Commands::Build {
            model,
            output,
            readme,
            external_types,
            theme,
            quiet,
        } => {
            let overrides = BuildOverrides {
                model,
                output,
                readme,
                external_types,
                theme,
                quiet,
            };
            crossdoc::cmd::build::run(&cli.config, &overrides)?;
        }
        Commands::Check { model, strict } => {
            crossdoc::cmd::check::run(&cli.config, &model, strict)?;
        }
    }

    Ok(())
}
