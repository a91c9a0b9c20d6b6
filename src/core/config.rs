//! # Configuration
//!
//! One loaded menu definition file: its parsed default properties and root
//! menus, plus the file metadata the loader uses to decide when a reload is
//! due.

use crate::core::actions::Action;
use crate::core::builder::{self, ConfigError};
use crate::core::menu::Menu;
use crate::core::properties::PropertyStore;
use crate::core::selection::SelectionContext;
use crate::core::xml;
use crate::system::fs::FileSystemProbe;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// The parsed content of one `*.xml` menu definition file.
#[derive(Debug, Clone)]
pub struct Configuration {
    file_path: PathBuf,
    modified: Option<SystemTime>,
    defaults: Vec<Action>,
    menus: Vec<Menu>,
}

impl Configuration {
    /// Reads and parses one definition file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let modified = std::fs::metadata(path).and_then(|m| m.modified()).ok();
        let configuration = Self::from_text(&text, path.to_path_buf(), modified)?;
        log::info!(
            "loaded '{}': {} root menu(s), {} default propert(ies)",
            path.display(),
            configuration.menus.len(),
            configuration.defaults.len()
        );
        Ok(configuration)
    }

    /// Parses definition text that is already in memory.
    pub fn from_text(
        text: &str,
        file_path: PathBuf,
        modified: Option<SystemTime>,
    ) -> Result<Self, ConfigError> {
        let document = xml::parse_document(text)?;
        let (defaults, menus) = builder::parse_root(&document)?;
        Ok(Self {
            file_path,
            modified,
            defaults,
            menus,
        })
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn menus(&self) -> &[Menu] {
        &self.menus
    }

    pub fn defaults(&self) -> &[Action] {
        &self.defaults
    }

    /// True when the file on disk changed (or vanished) since loading.
    pub fn is_stale(&self) -> bool {
        let on_disk = std::fs::metadata(&self.file_path).and_then(|m| m.modified()).ok();
        match (on_disk, self.modified) {
            (Some(current), Some(loaded)) => current != loaded,
            (None, _) => true,
            (Some(_), None) => true,
        }
    }

    /// Seeds the store with this file's `<default>` properties.
    pub fn apply_default_properties(&self, store: &mut PropertyStore) {
        for action in &self.defaults {
            if let Action::Property { name, value } = action {
                let value = store.expand(value);
                store.set_property(name, &value);
            }
        }
    }

    /// Updates visibility/enablement across every root menu.
    pub fn update(
        &mut self,
        context: &SelectionContext,
        store: &PropertyStore,
        fs: &dyn FileSystemProbe,
    ) {
        for menu in &mut self.menus {
            menu.update(context, store, fs);
        }
    }

    /// Assigns command ids across the root menus, threading the counter.
    pub fn assign_command_ids(&mut self, first_id: u32) -> u32 {
        let mut next_id = first_id;
        for menu in &mut self.menus {
            next_id = menu.assign_command_ids(next_id);
        }
        next_id
    }

    /// Pre-order search across the root menus.
    pub fn find_menu_by_command_id(&self, command_id: u32) -> Option<&Menu> {
        self.menus
            .iter()
            .find_map(|menu| menu.find_menu_by_command_id(command_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::fs::LocalFileSystem;

    const SAMPLE: &str = r#"<root>
  <default>
    <property name="editor.path" value="/usr/bin/vim"/>
  </default>
  <menu name="Edit with ${editor.path}">
    <actions><exec path="${editor.path}" arguments="${selection.path}"/></actions>
  </menu>
  <menu separator="true"/>
  <menu name="Details">
    <visibility properties="never.set"/>
  </menu>
</root>"#;

    fn sample() -> Configuration {
        Configuration::from_text(SAMPLE, PathBuf::from("sample.xml"), None).unwrap()
    }

    #[test]
    fn test_from_text_parses_tree() {
        let config = sample();
        assert_eq!(config.menus().len(), 3);
        assert!(config.menus()[1].is_separator());
        assert_eq!(config.defaults().len(), 1);
    }

    #[test]
    fn test_apply_default_properties() {
        let config = sample();
        let mut store = PropertyStore::new();
        config.apply_default_properties(&mut store);
        assert_eq!(store.get_property("editor.path"), "/usr/bin/vim");
    }

    #[test]
    fn test_update_and_assign_across_roots() {
        let mut config = sample();
        let store = PropertyStore::new();
        let context = SelectionContext::new();
        config.update(&context, &store, &LocalFileSystem);

        // The third menu's visibility validator fails.
        assert!(config.menus()[0].is_visible());
        assert!(config.menus()[1].is_visible());
        assert!(!config.menus()[2].is_visible());

        let next = config.assign_command_ids(1);
        assert_eq!(next, 3);
        assert_eq!(config.menus()[0].command_id(), 1);
        assert_eq!(config.menus()[1].command_id(), 2);
        assert_eq!(config.menus()[2].command_id(), 0);

        let found = config.find_menu_by_command_id(2).unwrap();
        assert!(found.is_separator());
    }

    #[test]
    fn test_load_and_staleness() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("menu.xml");
        std::fs::write(&path, SAMPLE).unwrap();

        let config = Configuration::load(&path).unwrap();
        assert!(!config.is_stale());

        // A deleted file is stale.
        std::fs::remove_file(&path).unwrap();
        assert!(config.is_stale());
    }

    #[test]
    fn test_load_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.xml");
        std::fs::write(&path, "<root><menu/></root>").unwrap();
        assert!(Configuration::load(&path).is_err());
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let missing = Path::new("/no/such/dir/menu.xml");
        assert!(matches!(
            Configuration::load(missing),
            Err(ConfigError::Io { .. })
        ));
    }
}
