// src/cli/handlers/show.rs

use crate::cli::handlers::commons::{self, TreeStyle};
use crate::core::actions::Action;
use crate::core::properties::PropertyStore;
use anyhow::Result;
use colored::Colorize;

/// Prints the parsed menu trees exactly as defined, without evaluating
/// validators or expanding properties.
pub fn handle(path: Option<String>) -> Result<()> {
    let target = commons::resolve_target(path.as_deref())?;
    let configurations = commons::load_all(&target)?;

    // An empty store: `show` renders raw names, so it is only here to
    // satisfy the renderer.
    let store = PropertyStore::new();

    for config in &configurations {
        commons::print_configuration(config, &store, TreeStyle::Definition);
        for action in config.defaults() {
            if let Action::Property { name, value } = action {
                println!("{}", format!("default: {name} = {value:?}").dimmed());
            }
        }
    }
    Ok(())
}
