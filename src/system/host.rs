//! # Shell Host
//!
//! The seam through which actions touch the outside world. The evaluation
//! core only ever talks to the [`ShellHost`] trait; the console host performs
//! the real effects, the dry-run host narrates them.

use crate::core::actions::FileEncoding;
use crate::system::executor;
use anyhow::{Context, Result, anyhow};
use colored::Colorize;
use dialoguer::{Confirm, Input, theme::ColorfulTheme};
use std::io::Write;
use std::process::{Command as StdCommand, Stdio};

/// Externally visible effects an action can request.
///
/// Prompt methods return `Ok(None)` when the user cancels; that is an answer,
/// not an error.
pub trait ShellHost {
    fn copy_to_clipboard(&self, text: &str) -> Result<()>;
    fn launch(&self, path: &str, arguments: Option<&str>, base_dir: Option<&str>) -> Result<()>;
    fn write_file(&self, path: &str, text: &str, encoding: FileEncoding) -> Result<()>;
    fn open(&self, path: &str) -> Result<()>;
    fn show_message(&self, title: &str, caption: &str, icon: Option<&str>) -> Result<()>;
    fn prompt_text(&self, title: &str, default: Option<&str>) -> Result<Option<String>>;
    fn prompt_confirm(&self, title: &str) -> Result<Option<bool>>;
}

/// Host with real effects: processes, files, clipboard utility, terminal
/// prompts.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleHost;

impl ConsoleHost {
    /// The platform clipboard utility and its arguments.
    fn clipboard_command() -> (&'static str, &'static [&'static str]) {
        if cfg!(target_os = "windows") {
            ("clip", &[])
        } else if cfg!(target_os = "macos") {
            ("pbcopy", &[])
        } else if std::env::var_os("WAYLAND_DISPLAY").is_some() {
            ("wl-copy", &[])
        } else {
            ("xclip", &["-selection", "clipboard"])
        }
    }

    /// The platform document opener.
    fn opener_command(path: &str) -> StdCommand {
        if cfg!(target_os = "windows") {
            let mut command = StdCommand::new("cmd");
            command.args(["/C", "start", ""]).arg(path);
            command
        } else if cfg!(target_os = "macos") {
            let mut command = StdCommand::new("open");
            command.arg(path);
            command
        } else {
            let mut command = StdCommand::new("xdg-open");
            command.arg(path);
            command
        }
    }

    fn encode(text: &str, encoding: FileEncoding) -> Vec<u8> {
        match encoding {
            FileEncoding::Utf8 => text.as_bytes().to_vec(),
            FileEncoding::Ansi => text
                .chars()
                .map(|c| {
                    let code = u32::from(c);
                    u8::try_from(code).unwrap_or(b'?')
                })
                .collect(),
            FileEncoding::Unicode => {
                let mut bytes = vec![0xFF, 0xFE];
                for unit in text.encode_utf16() {
                    bytes.extend_from_slice(&unit.to_le_bytes());
                }
                bytes
            }
        }
    }
}

impl ShellHost for ConsoleHost {
    fn copy_to_clipboard(&self, text: &str) -> Result<()> {
        let (program, args) = Self::clipboard_command();
        let mut child = StdCommand::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("Failed to start clipboard utility '{program}'"))?;
        child
            .stdin
            .take()
            .ok_or_else(|| anyhow!("Clipboard utility '{program}' did not accept input."))?
            .write_all(text.as_bytes())
            .context("Failed to stream text to the clipboard utility")?;
        let status = child.wait()?;
        if !status.success() {
            return Err(anyhow!("Clipboard utility '{program}' reported failure."));
        }
        log::debug!("copied {} byte(s) to the clipboard", text.len());
        Ok(())
    }

    fn launch(&self, path: &str, arguments: Option<&str>, base_dir: Option<&str>) -> Result<()> {
        executor::execute(path, arguments, base_dir)
            .with_context(|| format!("Failed to run '{path}'"))
    }

    fn write_file(&self, path: &str, text: &str, encoding: FileEncoding) -> Result<()> {
        let bytes = Self::encode(text, encoding);
        std::fs::write(path, bytes).with_context(|| format!("Failed to write file '{path}'"))?;
        log::debug!("wrote '{path}' ({encoding:?})");
        Ok(())
    }

    fn open(&self, path: &str) -> Result<()> {
        let status = Self::opener_command(path)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .with_context(|| format!("Failed to open '{path}'"))?;
        if !status.success() {
            return Err(anyhow!("The system opener rejected '{path}'."));
        }
        Ok(())
    }

    fn show_message(&self, title: &str, caption: &str, _icon: Option<&str>) -> Result<()> {
        println!("\n{}", caption.bold());
        println!("{title}");
        Ok(())
    }

    fn prompt_text(&self, title: &str, default: Option<&str>) -> Result<Option<String>> {
        let theme = ColorfulTheme::default();
        let mut input = Input::<String>::with_theme(&theme)
            .with_prompt(title)
            .allow_empty(true);
        if let Some(default) = default {
            input = input.default(default.to_string());
        }
        // An interrupted read (Ctrl+C / closed stdin) is a cancellation.
        match input.interact_text() {
            Ok(answer) => Ok(Some(answer)),
            Err(e) => {
                log::debug!("prompt aborted: {e}");
                Ok(None)
            }
        }
    }

    fn prompt_confirm(&self, title: &str) -> Result<Option<bool>> {
        match Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(title)
            .interact_opt()
        {
            Ok(answer) => Ok(answer),
            Err(e) => {
                log::debug!("confirmation aborted: {e}");
                Ok(None)
            }
        }
    }
}

/// Host that narrates what would happen instead of doing it.
///
/// Prompts auto-answer (the default text, "yes") so a simulated action list
/// always runs to the end.
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunHost;

impl DryRunHost {
    fn narrate(&self, line: &str) {
        println!("{} {}", "[dry-run]".dimmed(), line);
    }
}

impl ShellHost for DryRunHost {
    fn copy_to_clipboard(&self, text: &str) -> Result<()> {
        self.narrate(&format!("would copy {} byte(s) to the clipboard", text.len()));
        Ok(())
    }

    fn launch(&self, path: &str, arguments: Option<&str>, base_dir: Option<&str>) -> Result<()> {
        let mut line = format!("would run '{path}'");
        if let Some(arguments) = arguments {
            line.push_str(&format!(" with arguments '{arguments}'"));
        }
        if let Some(base_dir) = base_dir {
            line.push_str(&format!(" in '{base_dir}'"));
        }
        self.narrate(&line);
        Ok(())
    }

    fn write_file(&self, path: &str, text: &str, encoding: FileEncoding) -> Result<()> {
        self.narrate(&format!(
            "would write {} byte(s) to '{path}' ({encoding:?})",
            text.len()
        ));
        Ok(())
    }

    fn open(&self, path: &str) -> Result<()> {
        self.narrate(&format!("would open '{path}'"));
        Ok(())
    }

    fn show_message(&self, title: &str, caption: &str, _icon: Option<&str>) -> Result<()> {
        self.narrate(&format!("would show message '{caption}': {title}"));
        Ok(())
    }

    fn prompt_text(&self, title: &str, default: Option<&str>) -> Result<Option<String>> {
        let answer = default.unwrap_or("").to_string();
        self.narrate(&format!("would prompt '{title}', assuming '{answer}'"));
        Ok(Some(answer))
    }

    fn prompt_confirm(&self, title: &str) -> Result<Option<bool>> {
        self.narrate(&format!("would ask '{title}', assuming yes"));
        Ok(Some(true))
    }
}
