// src/bin/ctxmenu.rs

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use ctxmenu::{
    cli::{Cli, Command, handlers},
    constants::CANCELLED_EXIT_CODE,
    core::actions::ActionError,
};

fn main() {
    env_logger::init();

    if let Err(e) = run_cli(Cli::parse()) {
        // A dismissed prompt is not a failure; exit silently with the
        // shell convention for interruption.
        if matches!(e.downcast_ref::<ActionError>(), Some(ActionError::Cancelled)) {
            std::process::exit(CANCELLED_EXIT_CODE);
        }

        eprintln!("\n{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run_cli(cli: Cli) -> Result<()> {
    log::debug!("CLI args parsed: {cli:?}");

    match cli.command {
        Command::Check { path } => handlers::check::handle(path),
        Command::Show { path } => handlers::show::handle(path),
        Command::Simulate { path, select, set } => handlers::simulate::handle(path, select, set),
        Command::Exec {
            path,
            id,
            select,
            set,
            dry_run,
        } => handlers::exec::handle(path, id, select, set, dry_run),
    }
}
