//! Check command - resolve every reference without writing the site

use std::path::Path;

use color_eyre::eyre::{Result, WrapErr, bail};
use crossdoc_core::DocumentationModel;
use crossdoc_generator::{ReferenceAudit, audit_references};

use super::build::load_config;

/// Run the check command.
///
/// Loads the configuration and the model and reports every reference a build
/// would render as a missing link. In strict mode any such reference fails
/// the command.
pub fn run(config_path: &Path, model_path: &Path, strict: bool) -> Result<ReferenceAudit> {
    tracing::info!(?config_path, ?model_path, strict, "Checking references");

    println!("Checking configuration...");
    let config = load_config(config_path)?;
    println!("  ✓ Configuration valid");

    println!("\nChecking model...");
    let model = DocumentationModel::load(model_path).wrap_err("Failed to load model")?;
    println!(
        "  ✓ {} symbols, {} classes, {} modules",
        model.symbol_index.len(),
        model.classes.len(),
        model.modules.len()
    );

    println!("\nChecking references...");
    let audit = audit_references(&model, &config);

    println!();
    println!("Summary:");
    println!("  Checked: {}", audit.checked);
    println!("  Missing: {}", audit.missing.len());

    if !audit.is_clean() {
        println!();
        println!("Missing references:");
        for report in &audit.missing {
            match &report.context {
                Some(context) => println!("  ⚠ {} {context}", report.reference),
                None => println!("  ⚠ {}", report.reference),
            }
        }
    }

    if strict && !audit.is_clean() {
        bail!(
            "Check failed with {} missing reference(s) (strict mode)",
            audit.missing.len()
        );
    }

    println!();
    println!("✓ Check complete");

    Ok(audit)
}
