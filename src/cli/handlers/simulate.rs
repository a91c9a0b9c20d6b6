// src/cli/handlers/simulate.rs

use crate::cli::handlers::commons::{self, TreeStyle};
use anyhow::Result;
use colored::Colorize;

/// Evaluates the menus against a simulated selection and prints the
/// resulting trees with their command ids.
pub fn handle(path: Option<String>, select: Vec<String>, set: Vec<String>) -> Result<()> {
    let target = commons::resolve_target(path.as_deref())?;
    let evaluation = commons::evaluate(&target, &select, &set)?;

    println!(
        "Selection: {} element(s), {} file(s), {} director(ies)",
        evaluation.selection.elements().len(),
        evaluation.selection.files_count(),
        evaluation.selection.directories_count()
    );

    for config in &evaluation.configurations {
        commons::print_configuration(config, &evaluation.store, TreeStyle::Evaluated);
    }

    let assigned = evaluation.next_id - 1;
    println!(
        "\n{assigned} command id(s) assigned. {}",
        "Run `ctxmenu exec --id <N>` to dispatch one.".dimmed()
    );
    Ok(())
}
