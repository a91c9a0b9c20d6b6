//! # Actions
//!
//! What a chosen menu entry does. Every string field is property-expanded at
//! dispatch time, then the effect is delegated through the [`ShellHost`]
//! seam. A failing action is reported and the remaining actions still run; a
//! cancelled prompt stops the list.

use crate::core::properties::PropertyStore;
use crate::system::host::ShellHost;
use thiserror::Error;

/// Encoding of the file written by the `file` action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FileEncoding {
    #[default]
    Utf8,
    /// Platform-native 8-bit; characters outside it degrade to `?`.
    Ansi,
    /// UTF-16LE with a byte-order mark.
    Unicode,
}

impl FileEncoding {
    /// Parses the `encoding` attribute value.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "utf-8" | "utf8" => Some(Self::Utf8),
            "ansi" => Some(Self::Ansi),
            "unicode" => Some(Self::Unicode),
            _ => None,
        }
    }
}

/// Flavor of the `prompt` action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PromptKind {
    /// Free-text input written to the named property.
    #[default]
    Text,
    /// Yes/no question; the answer maps to the `valueyes`/`valueno` strings.
    YesNo,
    /// Confirmation only; nothing is written beyond passing the gate.
    Ok,
}

/// Errors from dispatching one action.
#[derive(Error, Debug)]
pub enum ActionError {
    /// The user dismissed a prompt; remaining actions must not run.
    #[error("The prompt was cancelled by the user.")]
    Cancelled,
    #[error("The '{kind}' action failed: {source}")]
    Failed {
        kind: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

/// One executable effect attached to a menu.
#[derive(Debug, Clone)]
pub enum Action {
    /// Replaces the clipboard content.
    Clipboard { value: String },
    /// Launches a program.
    Execute {
        path: String,
        arguments: Option<String>,
        base_dir: Option<String>,
    },
    /// Writes a text file.
    File {
        path: String,
        text: String,
        encoding: FileEncoding,
    },
    /// Asks the user a question and stores the answer as a property.
    Prompt {
        name: String,
        title: String,
        default: Option<String>,
        kind: PromptKind,
        value_yes: Option<String>,
        value_no: Option<String>,
    },
    /// Sets a property directly.
    Property { name: String, value: String },
    /// Opens a document with its associated application.
    Open { path: String },
    /// Shows a message to the user.
    Message {
        title: String,
        caption: String,
        icon: Option<String>,
    },
}

impl Action {
    /// The element name this action was parsed from.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Clipboard { .. } => "clipboard",
            Self::Execute { .. } => "exec",
            Self::File { .. } => "file",
            Self::Prompt { .. } => "prompt",
            Self::Property { .. } => "property",
            Self::Open { .. } => "open",
            Self::Message { .. } => "message",
        }
    }

    /// Short human-readable description, for tree displays.
    pub fn summary(&self) -> String {
        match self {
            Self::Clipboard { value } => format!("clipboard value={value:?}"),
            Self::Execute { path, .. } => format!("exec path={path:?}"),
            Self::File { path, .. } => format!("file path={path:?}"),
            Self::Prompt { name, .. } => format!("prompt name={name:?}"),
            Self::Property { name, value } => format!("property {name}={value:?}"),
            Self::Open { path } => format!("open path={path:?}"),
            Self::Message { title, .. } => format!("message title={title:?}"),
        }
    }

    /// Expands every field against the store and performs the effect.
    ///
    /// The store is mutable because `property` and `prompt` write into it.
    pub fn execute(
        &self,
        store: &mut PropertyStore,
        host: &dyn ShellHost,
    ) -> Result<(), ActionError> {
        let failed = |source: anyhow::Error| ActionError::Failed {
            kind: self.kind(),
            source,
        };

        match self {
            Self::Clipboard { value } => {
                let value = store.expand(value);
                host.copy_to_clipboard(&value).map_err(failed)
            }
            Self::Execute {
                path,
                arguments,
                base_dir,
            } => {
                let path = store.expand(path);
                let arguments = arguments.as_deref().map(|a| store.expand(a));
                let base_dir = base_dir.as_deref().map(|d| store.expand(d));
                host.launch(&path, arguments.as_deref(), base_dir.as_deref())
                    .map_err(failed)
            }
            Self::File {
                path,
                text,
                encoding,
            } => {
                let path = store.expand(path);
                let text = store.expand(text);
                host.write_file(&path, &text, *encoding).map_err(failed)
            }
            Self::Prompt {
                name,
                title,
                default,
                kind,
                value_yes,
                value_no,
            } => {
                let title = store.expand(title);
                match kind {
                    PromptKind::Text => {
                        let default = default.as_deref().map(|d| store.expand(d));
                        match host.prompt_text(&title, default.as_deref()).map_err(failed)? {
                            Some(answer) => {
                                store.set_property(name, &answer);
                                Ok(())
                            }
                            None => Err(ActionError::Cancelled),
                        }
                    }
                    PromptKind::YesNo => {
                        match host.prompt_confirm(&title).map_err(failed)? {
                            Some(answer) => {
                                let value = if answer { value_yes } else { value_no };
                                let value = store.expand(value.as_deref().unwrap_or(""));
                                store.set_property(name, &value);
                                Ok(())
                            }
                            None => Err(ActionError::Cancelled),
                        }
                    }
                    PromptKind::Ok => match host.prompt_confirm(&title).map_err(failed)? {
                        Some(true) => Ok(()),
                        _ => Err(ActionError::Cancelled),
                    },
                }
            }
            Self::Property { name, value } => {
                let value = store.expand(value);
                store.set_property(name, &value);
                Ok(())
            }
            Self::Open { path } => {
                let path = store.expand(path);
                host.open(&path).map_err(failed)
            }
            Self::Message {
                title,
                caption,
                icon,
            } => {
                let title = store.expand(title);
                let caption = store.expand(caption);
                host.show_message(&title, &caption, icon.as_deref())
                    .map_err(failed)
            }
        }
    }
}

/// Runs an action list in order.
///
/// Individual failures are logged and collected without stopping the list;
/// only a cancelled prompt aborts the remainder. Returns the error messages
/// of the actions that failed.
pub fn run_actions(
    actions: &[Action],
    store: &mut PropertyStore,
    host: &dyn ShellHost,
) -> Result<Vec<String>, ActionError> {
    let mut failures = Vec::new();
    for action in actions {
        match action.execute(store, host) {
            Ok(()) => log::debug!("action '{}' succeeded", action.kind()),
            Err(ActionError::Cancelled) => {
                log::info!("action '{}' cancelled, skipping the rest", action.kind());
                return Err(ActionError::Cancelled);
            }
            Err(e) => {
                log::error!("{e}");
                failures.push(e.to_string());
            }
        }
    }
    Ok(failures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::cell::RefCell;

    /// Host that records every effect and answers prompts from a script.
    #[derive(Default)]
    struct RecordingHost {
        effects: RefCell<Vec<String>>,
        prompt_answer: Option<String>,
        confirm_answer: Option<bool>,
        fail_clipboard: bool,
    }

    impl ShellHost for RecordingHost {
        fn copy_to_clipboard(&self, text: &str) -> anyhow::Result<()> {
            if self.fail_clipboard {
                return Err(anyhow!("clipboard unavailable"));
            }
            self.effects.borrow_mut().push(format!("clipboard:{text}"));
            Ok(())
        }

        fn launch(
            &self,
            path: &str,
            arguments: Option<&str>,
            _base_dir: Option<&str>,
        ) -> anyhow::Result<()> {
            self.effects
                .borrow_mut()
                .push(format!("launch:{path}:{}", arguments.unwrap_or("")));
            Ok(())
        }

        fn write_file(
            &self,
            path: &str,
            text: &str,
            _encoding: FileEncoding,
        ) -> anyhow::Result<()> {
            self.effects.borrow_mut().push(format!("file:{path}:{text}"));
            Ok(())
        }

        fn open(&self, path: &str) -> anyhow::Result<()> {
            self.effects.borrow_mut().push(format!("open:{path}"));
            Ok(())
        }

        fn show_message(
            &self,
            title: &str,
            caption: &str,
            _icon: Option<&str>,
        ) -> anyhow::Result<()> {
            self.effects
                .borrow_mut()
                .push(format!("message:{title}:{caption}"));
            Ok(())
        }

        fn prompt_text(&self, _title: &str, _default: Option<&str>) -> anyhow::Result<Option<String>> {
            Ok(self.prompt_answer.clone())
        }

        fn prompt_confirm(&self, _title: &str) -> anyhow::Result<Option<bool>> {
            Ok(self.confirm_answer)
        }
    }

    #[test]
    fn test_fields_are_expanded_before_dispatch() {
        let mut store = PropertyStore::new();
        store.set_property("selection.path", "/tmp/report.txt");
        let host = RecordingHost::default();

        let action = Action::Clipboard {
            value: "${selection.path}".to_string(),
        };
        action.execute(&mut store, &host).unwrap();
        assert_eq!(
            host.effects.borrow().as_slice(),
            ["clipboard:/tmp/report.txt"]
        );
    }

    #[test]
    fn test_property_action_sets_expanded_value() {
        let mut store = PropertyStore::new();
        store.set_property("base", "42");
        let host = RecordingHost::default();

        let action = Action::Property {
            name: "answer".to_string(),
            value: "value-${base}".to_string(),
        };
        action.execute(&mut store, &host).unwrap();
        assert_eq!(store.get_property("answer"), "value-42");
    }

    #[test]
    fn test_prompt_text_writes_answer() {
        let mut store = PropertyStore::new();
        let host = RecordingHost {
            prompt_answer: Some("my input".to_string()),
            ..Default::default()
        };

        let action = Action::Prompt {
            name: "user.answer".to_string(),
            title: "Enter a value".to_string(),
            default: None,
            kind: PromptKind::Text,
            value_yes: None,
            value_no: None,
        };
        action.execute(&mut store, &host).unwrap();
        assert_eq!(store.get_property("user.answer"), "my input");
    }

    #[test]
    fn test_prompt_cancel_stops_remaining_actions() {
        let mut store = PropertyStore::new();
        let host = RecordingHost {
            prompt_answer: None,
            ..Default::default()
        };

        let actions = vec![
            Action::Prompt {
                name: "p".to_string(),
                title: "t".to_string(),
                default: None,
                kind: PromptKind::Text,
                value_yes: None,
                value_no: None,
            },
            Action::Open {
                path: "/tmp/x".to_string(),
            },
        ];
        let result = run_actions(&actions, &mut store, &host);
        assert!(matches!(result, Err(ActionError::Cancelled)));
        assert!(host.effects.borrow().is_empty());
    }

    #[test]
    fn test_prompt_yesno_maps_values() {
        let mut store = PropertyStore::new();
        let host = RecordingHost {
            confirm_answer: Some(false),
            ..Default::default()
        };

        let action = Action::Prompt {
            name: "choice".to_string(),
            title: "Continue?".to_string(),
            default: None,
            kind: PromptKind::YesNo,
            value_yes: Some("yes!".to_string()),
            value_no: Some("no!".to_string()),
        };
        action.execute(&mut store, &host).unwrap();
        assert_eq!(store.get_property("choice"), "no!");
    }

    #[test]
    fn test_failed_action_does_not_stop_the_list() {
        let mut store = PropertyStore::new();
        let host = RecordingHost {
            fail_clipboard: true,
            ..Default::default()
        };

        let actions = vec![
            Action::Clipboard {
                value: "text".to_string(),
            },
            Action::Open {
                path: "/tmp/x".to_string(),
            },
        ];
        let failures = run_actions(&actions, &mut store, &host).unwrap();
        assert_eq!(failures.len(), 1);
        assert!(failures[0].contains("clipboard"));
        assert_eq!(host.effects.borrow().as_slice(), ["open:/tmp/x"]);
    }

    #[test]
    fn test_file_encoding_parse() {
        assert_eq!(FileEncoding::parse("utf-8"), Some(FileEncoding::Utf8));
        assert_eq!(FileEncoding::parse("UTF-8"), Some(FileEncoding::Utf8));
        assert_eq!(FileEncoding::parse("ansi"), Some(FileEncoding::Ansi));
        assert_eq!(FileEncoding::parse("unicode"), Some(FileEncoding::Unicode));
        assert_eq!(FileEncoding::parse("latin-1"), None);
    }
}
