//! # Configuration Loader
//!
//! Owns the ordered search directories and the set of loaded configurations.
//! `refresh` reconciles that set with the filesystem: new files are loaded,
//! changed files reloaded, deleted files dropped, and broken files reported
//! without taking the loader down.

use crate::core::builder::ConfigError;
use crate::core::config::Configuration;
use crate::core::menu::Menu;
use crate::core::properties::PropertyStore;
use crate::core::selection::SelectionContext;
use crate::system::fs::FileSystemProbe;
use crate::constants::CONFIG_FILE_EXTENSION;
use std::path::PathBuf;
use walkdir::WalkDir;

/// Loads and tracks every menu definition file under the search directories.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    search_directories: Vec<PathBuf>,
    configurations: Vec<Configuration>,
}

impl ConfigLoader {
    pub fn new(search_directories: Vec<PathBuf>) -> Self {
        Self {
            search_directories,
            configurations: Vec::new(),
        }
    }

    pub fn search_directories(&self) -> &[PathBuf] {
        &self.search_directories
    }

    pub fn configurations(&self) -> &[Configuration] {
        &self.configurations
    }

    /// Consumes the loader, releasing the loaded configurations.
    pub fn into_configurations(self) -> Vec<Configuration> {
        self.configurations
    }

    /// Definition files currently present, in directory order then name
    /// order.
    pub fn scan(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();
        for directory in &self.search_directories {
            if !directory.is_dir() {
                log::debug!("skipping missing directory '{}'", directory.display());
                continue;
            }
            let mut found: Vec<PathBuf> = WalkDir::new(directory)
                .max_depth(1)
                .into_iter()
                .filter_map(Result::ok)
                .filter(|entry| entry.file_type().is_file())
                .map(|entry| entry.into_path())
                .filter(|path| {
                    path.extension()
                        .and_then(|e| e.to_str())
                        .is_some_and(|e| e.eq_ignore_ascii_case(CONFIG_FILE_EXTENSION))
                })
                .collect();
            found.sort();
            files.extend(found);
        }
        files
    }

    /// Reconciles the loaded set with the filesystem.
    ///
    /// Returns the files that failed to load together with their errors;
    /// those files are skipped, everything else stays usable.
    pub fn refresh(&mut self) -> Vec<(PathBuf, ConfigError)> {
        let present = self.scan();
        let mut failures = Vec::new();

        // Drop configurations whose file vanished.
        self.configurations.retain(|config| {
            let keep = present.iter().any(|path| path == config.file_path());
            if !keep {
                log::info!("dropping deleted '{}'", config.file_path().display());
            }
            keep
        });

        for path in present {
            let loaded = self
                .configurations
                .iter()
                .position(|config| config.file_path() == path);
            match loaded {
                Some(index) => {
                    if self.configurations.get(index).is_some_and(Configuration::is_stale) {
                        log::info!("reloading changed '{}'", path.display());
                        match Configuration::load(&path) {
                            Ok(config) => {
                                if let Some(slot) = self.configurations.get_mut(index) {
                                    *slot = config;
                                }
                            }
                            Err(e) => {
                                log::error!("failed to reload '{}': {e}", path.display());
                                self.configurations.remove(index);
                                failures.push((path, e));
                            }
                        }
                    }
                }
                None => match Configuration::load(&path) {
                    Ok(config) => self.configurations.push(config),
                    Err(e) => {
                        log::error!("failed to load '{}': {e}", path.display());
                        failures.push((path, e));
                    }
                },
            }
        }
        failures
    }

    /// Applies every configuration's `<default>` properties to the store.
    pub fn apply_default_properties(&self, store: &mut PropertyStore) {
        for config in &self.configurations {
            config.apply_default_properties(store);
        }
    }

    /// Updates visibility/enablement across every configuration.
    pub fn update(
        &mut self,
        context: &SelectionContext,
        store: &PropertyStore,
        fs: &dyn FileSystemProbe,
    ) {
        for config in &mut self.configurations {
            config.update(context, store, fs);
        }
    }

    /// Assigns command ids across configurations, threading the counter.
    pub fn assign_command_ids(&mut self, first_id: u32) -> u32 {
        let mut next_id = first_id;
        for config in &mut self.configurations {
            next_id = config.assign_command_ids(next_id);
        }
        next_id
    }

    /// Searches every configuration for the node holding the command id.
    pub fn find_menu_by_command_id(&self, command_id: u32) -> Option<&Menu> {
        self.configurations
            .iter()
            .find_map(|config| config.find_menu_by_command_id(command_id))
    }
}
