//! # Selection Context
//!
//! An immutable snapshot of the paths the user had selected when the context
//! menu was invoked. Classification (file/folder/drive kind) is resolved once
//! at construction through the filesystem probe; validators and actions then
//! read the snapshot without touching the filesystem again, except where a
//! criterion explicitly probes (`exists`).

use crate::core::properties::PropertyStore;
use crate::system::fs::{DriveKind, FileSystemProbe};

/// Property holding every selected path, joined for multi-selections.
pub const SELECTION_PATH_PROPERTY: &str = "selection.path";
/// Property holding each selected element's parent directory.
pub const SELECTION_PARENT_PATH_PROPERTY: &str = "selection.parent.path";
/// Property holding each selected element's parent directory name.
pub const SELECTION_PARENT_FILENAME_PROPERTY: &str = "selection.parent.filename";
/// Property holding each selected element's file name.
pub const SELECTION_FILENAME_PROPERTY: &str = "selection.filename";
/// Property holding each selected element's file name without extension.
pub const SELECTION_FILENAME_NOEXT_PROPERTY: &str = "selection.filename.noext";
/// Property holding each selected element's extension.
pub const SELECTION_FILENAME_EXTENSION_PROPERTY: &str = "selection.filename.extension";
/// Property holding the number of selected elements.
pub const SELECTION_COUNT_PROPERTY: &str = "selection.count";
/// Property holding the number of selected files.
pub const SELECTION_FILES_COUNT_PROPERTY: &str = "selection.files.count";
/// Property holding the number of selected directories.
pub const SELECTION_DIRECTORIES_COUNT_PROPERTY: &str = "selection.directories.count";

const ALL_SELECTION_PROPERTIES: [&str; 9] = [
    SELECTION_PATH_PROPERTY,
    SELECTION_PARENT_PATH_PROPERTY,
    SELECTION_PARENT_FILENAME_PROPERTY,
    SELECTION_FILENAME_PROPERTY,
    SELECTION_FILENAME_NOEXT_PROPERTY,
    SELECTION_FILENAME_EXTENSION_PROPERTY,
    SELECTION_COUNT_PROPERTY,
    SELECTION_FILES_COUNT_PROPERTY,
    SELECTION_DIRECTORIES_COUNT_PROPERTY,
];

/// One selected path with its classification snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedElement {
    /// The path exactly as the host supplied it.
    pub path: String,
    /// True when the path existed and was a regular file at snapshot time.
    pub is_file: bool,
    /// True when the path existed and was a directory at snapshot time.
    pub is_directory: bool,
    /// The drive the path resides on, when the probe could tell.
    pub drive: Option<DriveKind>,
}

impl SelectedElement {
    fn classify(path: String, fs: &dyn FileSystemProbe) -> Self {
        let is_file = fs.is_file(&path);
        let is_directory = fs.is_directory(&path);
        let drive = fs.drive_kind(&path);
        Self {
            path,
            is_file,
            is_directory,
            drive,
        }
    }

    /// The element's extension (text after the last dot of the file name),
    /// or an empty string when the file name has no dot.
    pub fn extension(&self) -> &str {
        file_extension(&self.path)
    }
}

/// Snapshot of one context-menu invocation's selection.
///
/// Rebuilt per invocation and never mutated during an `Update`/`Validate`
/// pass.
#[derive(Debug, Clone, Default)]
pub struct SelectionContext {
    elements: Vec<SelectedElement>,
    files_count: usize,
    directories_count: usize,
}

impl SelectionContext {
    /// An empty selection (background click, no element).
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a snapshot from raw paths, classifying each through the probe.
    pub fn from_paths<I, S>(paths: I, fs: &dyn FileSystemProbe) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let elements: Vec<SelectedElement> = paths
            .into_iter()
            .map(|path| SelectedElement::classify(path.into(), fs))
            .collect();
        let files_count = elements.iter().filter(|e| e.is_file).count();
        let directories_count = elements.iter().filter(|e| e.is_directory).count();
        log::debug!(
            "selection snapshot: {} element(s), {} file(s), {} director(ies)",
            elements.len(),
            files_count,
            directories_count
        );
        Self {
            elements,
            files_count,
            directories_count,
        }
    }

    /// The selected elements, in the order the host supplied them.
    pub fn elements(&self) -> &[SelectedElement] {
        &self.elements
    }

    /// Number of selected elements classified as files.
    pub fn files_count(&self) -> usize {
        self.files_count
    }

    /// Number of selected elements classified as directories.
    pub fn directories_count(&self) -> usize {
        self.directories_count
    }

    /// True when nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Publishes the `selection.*` properties into the store.
    ///
    /// Multi-selections join per-element values with the store's
    /// multi-selection separator property.
    pub fn register_properties(&self, store: &mut PropertyStore) {
        let separator = store.multi_selection_separator().to_string();
        let join = |extract: fn(&SelectedElement) -> &str| -> String {
            self.elements
                .iter()
                .map(extract)
                .collect::<Vec<&str>>()
                .join(&separator)
        };

        store.set_property(SELECTION_PATH_PROPERTY, &join(|e| &e.path));
        store.set_property(
            SELECTION_PARENT_PATH_PROPERTY,
            &join(|e| parent_path(&e.path)),
        );
        store.set_property(
            SELECTION_PARENT_FILENAME_PROPERTY,
            &join(|e| file_name(parent_path(&e.path))),
        );
        store.set_property(SELECTION_FILENAME_PROPERTY, &join(|e| file_name(&e.path)));
        store.set_property(
            SELECTION_FILENAME_NOEXT_PROPERTY,
            &join(|e| file_stem(&e.path)),
        );
        store.set_property(
            SELECTION_FILENAME_EXTENSION_PROPERTY,
            &join(|e| file_extension(&e.path)),
        );
        store.set_property(SELECTION_COUNT_PROPERTY, &self.elements.len().to_string());
        store.set_property(
            SELECTION_FILES_COUNT_PROPERTY,
            &self.files_count.to_string(),
        );
        store.set_property(
            SELECTION_DIRECTORIES_COUNT_PROPERTY,
            &self.directories_count.to_string(),
        );
    }

    /// Removes every `selection.*` property this snapshot publishes.
    pub fn unregister_properties(&self, store: &mut PropertyStore) {
        for name in ALL_SELECTION_PROPERTIES {
            store.clear_property(name);
        }
    }
}

/// Byte offset right after the last path separator, or 0.
fn after_last_separator(path: &str) -> usize {
    path.rfind(['\\', '/']).map_or(0, |i| i + 1)
}

/// The file-name component of a path string.
///
/// Separator handling is textual (both `\` and `/`) so that snapshots built
/// from foreign-platform paths still derive sensible display values.
pub(crate) fn file_name(path: &str) -> &str {
    path.get(after_last_separator(path)..).unwrap_or("")
}

/// The path without its file-name component (no trailing separator).
pub(crate) fn parent_path(path: &str) -> &str {
    let start = after_last_separator(path);
    let end = start.saturating_sub(1);
    path.get(..end).unwrap_or("")
}

/// The file name without its extension.
pub(crate) fn file_stem(path: &str) -> &str {
    let name = file_name(path);
    name.rfind('.').and_then(|i| name.get(..i)).unwrap_or(name)
}

/// The text after the last dot of the file name, or empty.
pub(crate) fn file_extension(path: &str) -> &str {
    let name = file_name(path);
    name.rfind('.')
        .and_then(|i| name.get(i + 1..))
        .unwrap_or("")
}
