// src/cli/handlers/mod.rs

// One module per CLI subcommand, plus the shared plumbing.

pub mod check;
pub mod commons;
pub mod exec;
pub mod show;
pub mod simulate;
