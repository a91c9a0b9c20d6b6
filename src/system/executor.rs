//! # Process Launching
//!
//! Spawns the programs behind `exec` actions. Argument strings are split with
//! shell-style quoting rules; the launch blocks until the child exits so the
//! caller can observe the status.

use std::io::ErrorKind;
use std::path::Path;
use std::process::{Command as StdCommand, Stdio};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Arguments could not be parsed: {0}")]
    ArgumentParse(String),
    #[error("No program specified to run.")]
    EmptyProgram,
    #[error("Program '{0}' could not be executed: {1}")]
    LaunchFailed(String, std::io::Error),
    #[error("Program '{0}' exited with a non-zero status code.")]
    NonZeroExitStatus(String),
}

/// Launches `program` with shell-style `arguments`, optionally from
/// `base_dir`, and waits for it to finish.
pub fn execute(
    program: &str,
    arguments: Option<&str>,
    base_dir: Option<&str>,
) -> Result<(), ExecutionError> {
    let program = program.trim();
    if program.is_empty() {
        return Err(ExecutionError::EmptyProgram);
    }

    let args = match arguments.map(str::trim).filter(|a| !a.is_empty()) {
        Some(raw) => {
            shlex::split(raw).ok_or_else(|| ExecutionError::ArgumentParse(raw.to_string()))?
        }
        None => Vec::new(),
    };

    let mut command = StdCommand::new(program);
    command
        .args(&args)
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());
    if let Some(dir) = base_dir.map(str::trim).filter(|d| !d.is_empty()) {
        command.current_dir(dunce::simplified(Path::new(dir)));
    }

    log::debug!("launching '{program}' with {} argument(s)", args.len());

    // Fallback for Windows shell built-ins like `echo`: retry through cmd.
    let status = match command.status() {
        Ok(status) => status,
        Err(e) if e.kind() == ErrorKind::NotFound && cfg!(target_os = "windows") => {
            log::debug!("program '{program}' not found, retrying with cmd /C");
            let mut fallback = StdCommand::new("cmd");
            fallback.arg("/C").arg(program).args(&args);
            if let Some(dir) = base_dir.map(str::trim).filter(|d| !d.is_empty()) {
                fallback.current_dir(dunce::simplified(Path::new(dir)));
            }
            fallback
                .status()
                .map_err(|e| ExecutionError::LaunchFailed(program.to_string(), e))?
        }
        Err(e) => return Err(ExecutionError::LaunchFailed(program.to_string(), e)),
    };

    if !status.success() {
        return Err(ExecutionError::NonZeroExitStatus(program.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_program_is_an_error() {
        assert!(matches!(
            execute("", None, None),
            Err(ExecutionError::EmptyProgram)
        ));
        assert!(matches!(
            execute("   ", None, None),
            Err(ExecutionError::EmptyProgram)
        ));
    }

    #[test]
    fn test_unbalanced_quotes_fail_argument_parsing() {
        assert!(matches!(
            execute("true", Some("\"unterminated"), None),
            Err(ExecutionError::ArgumentParse(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_successful_launch() {
        assert!(execute("true", None, None).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_non_zero_exit_status() {
        assert!(matches!(
            execute("false", None, None),
            Err(ExecutionError::NonZeroExitStatus(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_base_dir_is_honored() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("marker");
        std::fs::write(&marker, "x").unwrap();
        assert!(execute("test", Some("-f marker"), dir.path().to_str()).is_ok());
    }

    #[test]
    fn test_missing_program_fails() {
        let result = execute("ctxmenu-no-such-program-here", None, None);
        assert!(result.is_err());
    }
}
