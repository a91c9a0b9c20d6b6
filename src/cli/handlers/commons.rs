// src/cli/handlers/commons.rs

// Shared plumbing for the command handlers: target resolution, evaluation
// setup, and the ASCII tree renderer.

use crate::constants::CONFIG_DIR_NAME;
use crate::core::config::Configuration;
use crate::core::loader::ConfigLoader;
use crate::core::menu::{INVALID_COMMAND_ID, Menu};
use crate::core::properties::PropertyStore;
use crate::core::selection::SelectionContext;
use crate::system::fs::LocalFileSystem;
use anyhow::{Result, anyhow};
use colored::Colorize;
use std::path::{Path, PathBuf};

/// What a positional `path` argument resolved to.
#[derive(Debug, Clone)]
pub enum Target {
    File(PathBuf),
    Directory(PathBuf),
}

/// The user configuration directory holding menu definition files.
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
}

/// Resolves the optional path argument, expanding `~`.
pub fn resolve_target(path: Option<&str>) -> Result<Target> {
    let Some(raw) = path else {
        return Ok(Target::Directory(default_config_dir()));
    };
    let expanded = shellexpand::tilde(raw);
    let path = PathBuf::from(expanded.as_ref());
    if path.is_file() {
        Ok(Target::File(path))
    } else if path.is_dir() {
        Ok(Target::Directory(path))
    } else {
        Err(anyhow!("'{}' does not exist.", path.display()))
    }
}

/// The definition files a target designates, sorted by name for directories.
pub fn definition_files(target: &Target) -> Vec<PathBuf> {
    match target {
        Target::File(path) => vec![path.clone()],
        Target::Directory(directory) => ConfigLoader::new(vec![directory.clone()]).scan(),
    }
}

/// A path cleaned up for display.
pub fn display_path(path: &Path) -> String {
    dunce::simplified(path).display().to_string()
}

/// Loads every definition file of the target, aborting on the first error.
pub fn load_all(target: &Target) -> Result<Vec<Configuration>> {
    let configurations = match target {
        Target::File(path) => {
            let config = Configuration::load(path)
                .map_err(|e| anyhow!("{}: {e}", display_path(path)))?;
            vec![config]
        }
        Target::Directory(directory) => {
            let mut loader = ConfigLoader::new(vec![directory.clone()]);
            let failures = loader.refresh();
            if let Some((path, e)) = failures.first() {
                return Err(anyhow!("{}: {e}", display_path(path)));
            }
            loader.into_configurations()
        }
    };
    if configurations.is_empty() {
        let directory = match target {
            Target::File(p) | Target::Directory(p) => display_path(p),
        };
        return Err(anyhow!("No menu definition files found in '{directory}'."));
    }
    Ok(configurations)
}

/// Splits `KEY=VALUE` property overrides.
pub fn parse_set_overrides(specs: &[String]) -> Result<Vec<(String, String)>> {
    specs
        .iter()
        .map(|spec| {
            spec.split_once('=')
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .ok_or_else(|| anyhow!("Invalid --set value '{spec}', expected KEY=VALUE."))
        })
        .collect()
}

/// A fully evaluated invocation: configurations with flags and command ids
/// resolved, and the store the actions will expand against.
#[derive(Debug)]
pub struct Evaluation {
    pub configurations: Vec<Configuration>,
    pub store: PropertyStore,
    pub selection: SelectionContext,
    pub next_id: u32,
}

/// Builds the selection, seeds the store, updates every tree and assigns
/// command ids starting at 1. The shared front half of simulate/exec.
pub fn evaluate(target: &Target, selects: &[String], sets: &[String]) -> Result<Evaluation> {
    let fs = LocalFileSystem;
    let mut configurations = load_all(target)?;

    let selection = SelectionContext::from_paths(
        selects.iter().map(|raw| {
            let expanded = shellexpand::tilde(raw);
            expanded.to_string()
        }),
        &fs,
    );

    let mut store = PropertyStore::new();
    for config in &configurations {
        config.apply_default_properties(&mut store);
    }
    for (key, value) in parse_set_overrides(sets)? {
        store.set_property(&key, &value);
    }
    selection.register_properties(&mut store);

    let mut next_id = 1;
    for config in &mut configurations {
        config.update(&selection, &store, &fs);
        next_id = config.assign_command_ids(next_id);
    }

    Ok(Evaluation {
        configurations,
        store,
        selection,
        next_id,
    })
}

/// How [`print_menu`] annotates nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeStyle {
    /// Parse-time view: validator and action summaries, raw names.
    Definition,
    /// Post-update view: command ids, hidden/disabled markers, expanded
    /// names.
    Evaluated,
}

/// Prints one menu node and its subtree with box-drawing prefixes.
pub fn print_menu(menu: &Menu, store: &PropertyStore, prefix: &str, is_last: bool, style: TreeStyle) {
    let connector = if is_last { "└─" } else { "├─" };

    let label = if menu.is_separator() {
        "────────".dimmed().to_string()
    } else {
        match style {
            TreeStyle::Definition => menu.name().to_string(),
            TreeStyle::Evaluated => menu.display_name(store),
        }
    };

    let mut markers = String::new();
    match style {
        TreeStyle::Definition => {
            if let Some(summary) = menu.visibility().summary() {
                markers.push_str(&format!("  {}", format!("[visibility {summary}]").cyan()));
            }
            if let Some(summary) = menu.validity().summary() {
                markers.push_str(&format!("  {}", format!("[validity {summary}]").cyan()));
            }
        }
        TreeStyle::Evaluated => {
            if menu.command_id() != INVALID_COMMAND_ID {
                markers.push_str(&format!("  {}", format!("#{}", menu.command_id()).green()));
            }
            if !menu.is_visible() {
                markers.push_str(&format!("  {}", "(hidden)".dimmed()));
            } else if !menu.is_enabled() {
                markers.push_str(&format!("  {}", "(disabled)".yellow()));
            }
        }
    }

    println!("{prefix}{connector}{label}{markers}");

    let child_prefix = format!("{prefix}{}", if is_last { "   " } else { "│  " });

    if style == TreeStyle::Definition {
        for action in menu.actions() {
            println!(
                "{child_prefix}{}",
                format!("· {}", action.summary()).dimmed()
            );
        }
    }

    let children = menu.children();
    for (i, child) in children.iter().enumerate() {
        let is_last_child = i == children.len() - 1;
        print_menu(child, store, &child_prefix, is_last_child, style);
    }
}

/// Prints every root menu of a configuration under a file header.
pub fn print_configuration(config: &Configuration, store: &PropertyStore, style: TreeStyle) {
    println!("\n{}", display_path(config.file_path()).bold());
    let menus = config.menus();
    for (i, menu) in menus.iter().enumerate() {
        let is_last = i == menus.len() - 1;
        print_menu(menu, store, "", is_last, style);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_parse_set_overrides() {
        let parsed = parse_set_overrides(&[
            "process.started=true".to_string(),
            "empty=".to_string(),
            "with=equals=inside".to_string(),
        ])
        .unwrap();
        assert_eq!(
            parsed,
            vec![
                ("process.started".to_string(), "true".to_string()),
                ("empty".to_string(), String::new()),
                ("with".to_string(), "equals=inside".to_string()),
            ]
        );

        assert!(parse_set_overrides(&["no-separator".to_string()]).is_err());
    }

    #[test]
    fn test_resolve_target_classifies_paths() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("menu.xml");
        fs::write(&file, "<root/>").unwrap();

        let dir_str = dir.path().to_string_lossy().to_string();
        let file_str = file.to_string_lossy().to_string();
        assert!(matches!(
            resolve_target(Some(&dir_str)).unwrap(),
            Target::Directory(_)
        ));
        assert!(matches!(
            resolve_target(Some(&file_str)).unwrap(),
            Target::File(_)
        ));
        assert!(resolve_target(Some("/no/such/target")).is_err());
    }

    #[test]
    fn test_definition_files_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.xml"), "x").unwrap();
        fs::write(dir.path().join("a.XML"), "x").unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();

        let files = definition_files(&Target::Directory(dir.path().to_path_buf()));
        let names: Vec<String> = files
            .iter()
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().to_string())
            .collect();
        assert_eq!(names, ["a.XML", "b.xml"]);
    }

    #[test]
    fn test_evaluate_assigns_ids_and_seeds_properties() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("menus.xml"),
            r#"<root>
  <default><property name="editor" value="vim"/></default>
  <menu name="Open with ${editor}"/>
</root>"#,
        )
        .unwrap();

        let target = Target::Directory(dir.path().to_path_buf());
        let evaluation = evaluate(
            &target,
            &["/tmp/report.txt".to_string()],
            &["mode=fast".to_string()],
        )
        .unwrap();

        assert_eq!(evaluation.next_id, 2);
        assert_eq!(evaluation.store.get_property("editor"), "vim");
        assert_eq!(evaluation.store.get_property("mode"), "fast");
        assert_eq!(
            evaluation.store.get_property("selection.path"),
            "/tmp/report.txt"
        );
        assert_eq!(evaluation.selection.elements().len(), 1);
        let menu = &evaluation.configurations[0].menus()[0];
        assert_eq!(menu.command_id(), 1);
        assert_eq!(menu.display_name(&evaluation.store), "Open with vim");
    }

    #[test]
    fn test_load_all_rejects_broken_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bad.xml"), "<root><menu/></root>").unwrap();
        let result = load_all(&Target::Directory(dir.path().to_path_buf()));
        assert!(result.is_err());
    }
}
