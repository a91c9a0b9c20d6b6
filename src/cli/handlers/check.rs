// src/cli/handlers/check.rs

use crate::cli::handlers::commons;
use crate::core::config::Configuration;
use anyhow::{Result, anyhow};
use colored::Colorize;

/// Validates every definition file of the target and reports per-file status.
pub fn handle(path: Option<String>) -> Result<()> {
    let target = commons::resolve_target(path.as_deref())?;
    let files = commons::definition_files(&target);
    if files.is_empty() {
        return Err(anyhow!("No menu definition files found."));
    }

    let mut failed = 0;
    for file in &files {
        match Configuration::load(file) {
            Ok(config) => {
                println!(
                    "{} {} ({} root menu(s))",
                    "ok".green().bold(),
                    commons::display_path(file),
                    config.menus().len()
                );
            }
            Err(e) => {
                failed += 1;
                println!("{} {}", "error".red().bold(), commons::display_path(file));
                println!("   {e}");
            }
        }
    }

    if failed > 0 {
        return Err(anyhow!(
            "{failed} of {} definition file(s) failed validation.",
            files.len()
        ));
    }
    println!("\n{} definition file(s) are valid.", files.len());
    Ok(())
}
