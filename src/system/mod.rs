//! # System Interaction Layer
//!
//! Abstractions between the core menu logic and the operating system.
//!
//! ## Modules
//!
//! - **`fs`**: The filesystem probe trait the selection snapshot and the
//!   `exists` criterion go through, with the local implementation.
//! - **`executor`**: Spawns external processes for the `exec` and `open`
//!   actions, including the `cmd.exe` fallback on Windows.
//! - **`host`**: The shell-host seam actions dispatch their effects through
//!   (clipboard, prompts, message boxes), with console and dry-run
//!   implementations.

pub mod executor;
pub mod fs;
pub mod host;
