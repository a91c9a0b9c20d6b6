//! # Menu Tree
//!
//! The tree the host renders: separator nodes and command nodes carrying a
//! visibility validator, an enablement validator, an ordered action list and
//! owned submenus. `update` resolves the per-invocation flags, then command
//! ids are assigned to visible nodes only and used by the host to report the
//! user's choice back.

use crate::core::actions::Action;
use crate::core::properties::PropertyStore;
use crate::core::selection::SelectionContext;
use crate::core::validator::Validator;
use crate::system::fs::FileSystemProbe;

/// Sentinel command id of an invisible or not-yet-assigned node.
pub const INVALID_COMMAND_ID: u32 = 0;

/// Hard upper bound on a menu's display name length, in codepoints.
pub const DEFAULT_NAME_MAX_LENGTH: usize = 250;

/// Display icon: a path plus optional index into the file's icon resources,
/// or a file-extension hint the host resolves on its own. Display only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Icon {
    pub path: Option<String>,
    pub index: Option<i32>,
    pub file_extension: Option<String>,
}

impl Icon {
    /// Parses the `icon` attribute form: `path` or `path,index`.
    pub fn from_spec(spec: &str) -> Self {
        let (path, index) = match spec.rsplit_once(',') {
            Some((path, index_str)) => match index_str.trim().parse::<i32>() {
                Ok(index) => (path, Some(index)),
                // Not an index: the comma belongs to the path.
                Err(_) => (spec, None),
            },
            None => (spec, None),
        };
        Self {
            path: Some(path.to_string()),
            index,
            file_extension: None,
        }
    }
}

/// Whether a node renders as a separator line or a command entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuKind {
    Separator,
    Command,
}

/// One context-menu node.
///
/// A menu owns its actions and its submenu children; dropping it drops them.
/// The `visible`/`enabled`/`command_id` fields are invocation-scoped outputs
/// of [`Menu::update`] and [`Menu::assign_command_ids`].
#[derive(Debug, Clone)]
pub struct Menu {
    kind: MenuKind,
    name: String,
    description: String,
    name_max_length: usize,
    icon: Option<Icon>,
    command_id: u32,
    visible: bool,
    enabled: bool,
    visibility: Validator,
    validity: Validator,
    actions: Vec<Action>,
    children: Vec<Menu>,
}

impl Menu {
    /// A command node with the given raw (unexpanded) display name.
    pub fn new(name: &str) -> Self {
        Self {
            kind: MenuKind::Command,
            name: name.to_string(),
            description: String::new(),
            name_max_length: DEFAULT_NAME_MAX_LENGTH,
            icon: None,
            command_id: INVALID_COMMAND_ID,
            visible: true,
            enabled: true,
            visibility: Validator::new(),
            validity: Validator::new(),
            actions: Vec::new(),
            children: Vec::new(),
        }
    }

    /// A separator node. Name and actions carry no meaning on separators.
    pub fn separator() -> Self {
        let mut menu = Self::new("");
        menu.kind = MenuKind::Separator;
        menu
    }

    pub fn is_separator(&self) -> bool {
        self.kind == MenuKind::Separator
    }

    /// True when at least one direct child is a submenu.
    pub fn is_parent_menu(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, description: &str) {
        self.description = description.to_string();
    }

    pub fn name_max_length(&self) -> usize {
        self.name_max_length
    }

    /// Sets the truncation limit, clamped to `1..=250`.
    pub fn set_name_max_length(&mut self, length: usize) {
        self.name_max_length = length.clamp(1, DEFAULT_NAME_MAX_LENGTH);
    }

    pub fn icon(&self) -> Option<&Icon> {
        self.icon.as_ref()
    }

    pub fn set_icon(&mut self, icon: Icon) {
        self.icon = Some(icon);
    }

    pub fn command_id(&self) -> u32 {
        self.command_id
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_visibility(&mut self, visibility: Validator) {
        self.visibility = visibility;
    }

    pub fn visibility(&self) -> &Validator {
        &self.visibility
    }

    pub fn set_validity(&mut self, validity: Validator) {
        self.validity = validity;
    }

    pub fn validity(&self) -> &Validator {
        &self.validity
    }

    /// Appends an action, taking ownership. Actions run in insertion order.
    pub fn add_action(&mut self, action: Action) {
        self.actions.push(action);
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Appends a submenu, taking ownership.
    pub fn add_child(&mut self, child: Menu) {
        self.children.push(child);
    }

    pub fn children(&self) -> &[Menu] {
        &self.children
    }

    /// Recomputes the visible/enabled flags for this node and every
    /// descendant.
    ///
    /// This node's own validators are evaluated first, then the children
    /// recursively; a parent menu whose submenus all ended up invisible is
    /// forced invisible even when its own visibility validator passed.
    pub fn update(
        &mut self,
        context: &SelectionContext,
        store: &PropertyStore,
        fs: &dyn FileSystemProbe,
    ) {
        self.visible = self.visibility.validate(context, store, fs);
        self.enabled = self.validity.validate(context, store, fs);

        let mut all_children_invisible = true;
        for child in &mut self.children {
            child.update(context, store, fs);
            all_children_invisible = all_children_invisible && !child.visible;
        }

        // A parent menu with no visible children renders as an empty
        // submenu arrow; suppress it entirely.
        if self.is_parent_menu() && self.visible && all_children_invisible {
            log::debug!("menu '{}' suppressed: every submenu is invisible", self.name);
            self.visible = false;
        }
    }

    /// Depth-first pre-order command id assignment over visible nodes.
    ///
    /// An invisible node (or a subtree entered with the invalid id) receives
    /// [`INVALID_COMMAND_ID`] together with all its descendants and consumes
    /// nothing. Returns the next unused id.
    pub fn assign_command_ids(&mut self, first_id: u32) -> u32 {
        let mut next_id = first_id;

        if !self.visible || first_id == INVALID_COMMAND_ID {
            self.command_id = INVALID_COMMAND_ID;
        } else {
            self.command_id = next_id;
            next_id += 1;
        }

        for child in &mut self.children {
            if self.command_id == INVALID_COMMAND_ID {
                child.assign_command_ids(INVALID_COMMAND_ID);
            } else {
                next_id = child.assign_command_ids(next_id);
            }
        }

        next_id
    }

    /// Pre-order search for the node holding the given command id.
    pub fn find_menu_by_command_id(&self, command_id: u32) -> Option<&Menu> {
        if self.command_id == command_id {
            return Some(self);
        }
        self.children
            .iter()
            .find_map(|child| child.find_menu_by_command_id(command_id))
    }

    /// Truncates an already-expanded display string to the configured limit,
    /// counting Unicode codepoints rather than bytes.
    ///
    /// Strings whose original length exceeds the global maximum get a
    /// literal `"..."` marker appended after truncation.
    pub fn truncate_name(&self, value: &str) -> String {
        if self.name_max_length == 0 {
            return value.to_string();
        }
        let codepoints = value.chars().count();
        if codepoints <= self.name_max_length {
            return value.to_string();
        }

        let mut truncated: String = value.chars().take(self.name_max_length).collect();
        if codepoints > DEFAULT_NAME_MAX_LENGTH {
            truncated.push_str("...");
        }
        truncated
    }

    /// The property-expanded, truncated string the host should render.
    pub fn display_name(&self, store: &PropertyStore) -> String {
        self.truncate_name(&store.expand(&self.name))
    }
}
