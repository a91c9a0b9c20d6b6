// src/constants.rs

/// Prefix under which process environment variables are mirrored into a
/// property store (`env.<NAME>`).
pub const ENV_PROPERTY_PREFIX: &str = "env.";

/// Name of the property holding the platform path separator.
pub const PATH_SEPARATOR_PROPERTY: &str = "path.separator";

/// Name of the property holding the platform line separator.
pub const LINE_SEPARATOR_PROPERTY: &str = "line.separator";

/// Alias property for the platform line separator.
pub const NEWLINE_PROPERTY: &str = "newline";

/// Name of the property that joins multi-selection values into one string.
pub const MULTI_SELECTION_SEPARATOR_PROPERTY: &str = "selection.multi.separator";

/// Platform path separator seeded into every property store.
#[cfg(windows)]
pub const PATH_SEPARATOR: &str = "\\";
#[cfg(not(windows))]
pub const PATH_SEPARATOR: &str = "/";

/// Platform line separator seeded into every property store.
#[cfg(windows)]
pub const LINE_SEPARATOR: &str = "\r\n";
#[cfg(not(windows))]
pub const LINE_SEPARATOR: &str = "\n";

/// Default value of the multi-selection separator property.
pub const DEFAULT_MULTI_SELECTION_SEPARATOR: &str = LINE_SEPARATOR;

/// File extension of menu definition files picked up by the loader.
pub const CONFIG_FILE_EXTENSION: &str = "xml";

/// Directory name under the user configuration directory that holds menu
/// definition files (`~/.config/ctxmenu` on Linux).
pub const CONFIG_DIR_NAME: &str = "ctxmenu";

/// Exit code reported when the user cancels an interactive prompt.
pub const CANCELLED_EXIT_CODE: i32 = 130;
