// src/cli/handlers/exec.rs

use crate::cli::handlers::commons;
use crate::core::actions;
use crate::core::menu::INVALID_COMMAND_ID;
use crate::system::host::{ConsoleHost, DryRunHost, ShellHost};
use anyhow::{Result, anyhow};
use colored::Colorize;

/// Evaluates the menus and dispatches the actions of one command id.
pub fn handle(
    path: Option<String>,
    id: u32,
    select: Vec<String>,
    set: Vec<String>,
    dry_run: bool,
) -> Result<()> {
    if id == INVALID_COMMAND_ID {
        return Err(anyhow!("Command id 0 is reserved for invisible menus."));
    }

    let target = commons::resolve_target(path.as_deref())?;
    let mut evaluation = commons::evaluate(&target, &select, &set)?;

    let menu = evaluation
        .configurations
        .iter()
        .find_map(|config| config.find_menu_by_command_id(id))
        .ok_or_else(|| anyhow!("No visible menu holds command id {id}."))?;

    if !menu.is_enabled() {
        return Err(anyhow!(
            "Menu '{}' is disabled for this selection.",
            menu.display_name(&evaluation.store)
        ));
    }

    println!(
        "Dispatching '{}' ({} action(s))...",
        menu.display_name(&evaluation.store).bold(),
        menu.actions().len()
    );

    let host: Box<dyn ShellHost> = if dry_run {
        Box::new(DryRunHost)
    } else {
        Box::new(ConsoleHost)
    };

    // The menu borrow ends here; actions mutate the store while running.
    let menu_actions = menu.actions().to_vec();
    let failures = actions::run_actions(&menu_actions, &mut evaluation.store, host.as_ref())?;

    if !failures.is_empty() {
        for failure in &failures {
            eprintln!("{} {failure}", "warning:".yellow().bold());
        }
        return Err(anyhow!(
            "{} of {} action(s) failed.",
            failures.len(),
            menu_actions.len()
        ));
    }

    println!("{}", "Done.".green().bold());
    Ok(())
}
