// src/cli/args.rs

use clap::{Parser, Subcommand};

/// ctxmenu: a declarative, rule-driven context menu engine.
#[derive(Parser, Debug)]
#[command(name = "ctxmenu", author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate menu definition files without evaluating them.
    Check {
        /// A definition file or a directory of *.xml files.
        /// Defaults to the user configuration directory.
        path: Option<String>,
    },

    /// Print the parsed menu trees.
    Show {
        /// A definition file or a directory of *.xml files.
        path: Option<String>,
    },

    /// Evaluate the menus against a simulated selection.
    Simulate {
        /// A definition file or a directory of *.xml files.
        path: Option<String>,

        /// A selected path; repeat for multi-selections.
        #[arg(long = "select", value_name = "PATH")]
        select: Vec<String>,

        /// Extra property values (e.g. "process.started=true").
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
    },

    /// Evaluate the menus and run the actions of one command id.
    Exec {
        /// A definition file or a directory of *.xml files.
        path: Option<String>,

        /// The command id to dispatch, as printed by `simulate`.
        #[arg(long)]
        id: u32,

        /// A selected path; repeat for multi-selections.
        #[arg(long = "select", value_name = "PATH")]
        select: Vec<String>,

        /// Extra property values (e.g. "process.started=true").
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,

        /// Narrate the effects instead of performing them.
        #[arg(long)]
        dry_run: bool,
    },
}
