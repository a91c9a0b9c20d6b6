//! # Property Store
//!
//! A flat name→value string map that backs `${name}` placeholder expansion
//! everywhere dynamic text is allowed (validator attributes, action fields,
//! menu display names). A store is an ordinary owned value: construct one per
//! menu lifecycle and pass it to whoever needs it.

use crate::constants::{
    DEFAULT_MULTI_SELECTION_SEPARATOR, ENV_PROPERTY_PREFIX, LINE_SEPARATOR,
    LINE_SEPARATOR_PROPERTY, MULTI_SELECTION_SEPARATOR_PROPERTY, NEWLINE_PROPERTY, PATH_SEPARATOR,
    PATH_SEPARATOR_PROPERTY,
};
use std::collections::HashMap;

/// Name→value map with placeholder expansion.
///
/// New stores come pre-seeded with one `env.<NAME>` entry per process
/// environment variable plus the fixed platform defaults (path separator,
/// line separator and its `newline` alias, multi-selection separator).
#[derive(Debug, Clone)]
pub struct PropertyStore {
    properties: HashMap<String, String>,
}

impl PropertyStore {
    /// Creates a store seeded with environment variables and defaults.
    pub fn new() -> Self {
        let mut store = Self {
            properties: HashMap::new(),
        };
        store.register_environment_variables();
        store.register_default_properties();
        store
    }

    /// Inserts or overwrites a property.
    pub fn set_property(&mut self, name: &str, value: &str) {
        self.properties.insert(name.to_string(), value.to_string());
    }

    /// Returns the property value, or an empty string when absent.
    pub fn get_property(&self, name: &str) -> &str {
        self.properties.get(name).map_or("", String::as_str)
    }

    /// Returns true when the property exists, even with an empty value.
    pub fn has_property(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    /// Removes one property if present.
    pub fn clear_property(&mut self, name: &str) {
        self.properties.remove(name);
    }

    /// Drops every entry, then re-seeds environment variables and defaults.
    pub fn clear(&mut self) {
        self.properties.clear();
        self.register_environment_variables();
        self.register_default_properties();
        log::trace!("property store cleared and re-seeded");
    }

    /// Replaces every `${name}` token with the named property's current value.
    ///
    /// This is a single pass over the currently registered properties: each
    /// `(name, value)` pair replaces every literal occurrence of its
    /// `${name}` token once, and the result is never re-scanned. Unknown
    /// tokens stay literal, and expansion of a value that itself contains
    /// token syntax is not resolved further. Iteration order over distinct
    /// names is the map's and is not guaranteed stable.
    pub fn expand(&self, value: &str) -> String {
        let mut output = value.to_string();
        for (name, content) in &self.properties {
            let token = format!("${{{name}}}");
            if output.contains(&token) {
                output = output.replace(&token, content);
            }
        }
        output
    }

    /// Mirrors every process environment variable as `env.<NAME>`.
    fn register_environment_variables(&mut self) {
        for (name, value) in std::env::vars() {
            let key = format!("{ENV_PROPERTY_PREFIX}{name}");
            self.properties.insert(key, value);
        }
    }

    /// Seeds the fixed platform properties.
    fn register_default_properties(&mut self) {
        self.set_property(PATH_SEPARATOR_PROPERTY, PATH_SEPARATOR);
        self.set_property(LINE_SEPARATOR_PROPERTY, LINE_SEPARATOR);
        self.set_property(NEWLINE_PROPERTY, LINE_SEPARATOR);
        self.set_property(
            MULTI_SELECTION_SEPARATOR_PROPERTY,
            DEFAULT_MULTI_SELECTION_SEPARATOR,
        );
    }

    /// The string used to join per-element values of a multi-selection.
    pub fn multi_selection_separator(&self) -> &str {
        let separator = self.get_property(MULTI_SELECTION_SEPARATOR_PROPERTY);
        if separator.is_empty() {
            DEFAULT_MULTI_SELECTION_SEPARATOR
        } else {
            separator
        }
    }
}

impl Default for PropertyStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_has_property() {
        let mut store = PropertyStore::new();
        assert!(!store.has_property("foo"));
        store.set_property("foo", "bar");
        assert!(store.has_property("foo"));
        assert_eq!(store.get_property("foo"), "bar");
        store.set_property("foo", "baz");
        assert_eq!(store.get_property("foo"), "baz");
    }

    #[test]
    fn test_missing_property_reads_empty() {
        let store = PropertyStore::new();
        assert_eq!(store.get_property("does.not.exist"), "");
    }

    #[test]
    fn test_empty_value_still_exists() {
        let mut store = PropertyStore::new();
        store.set_property("empty", "");
        assert!(store.has_property("empty"));
        assert_eq!(store.get_property("empty"), "");
    }

    #[test]
    fn test_clear_property() {
        let mut store = PropertyStore::new();
        store.set_property("foo", "bar");
        store.clear_property("foo");
        assert!(!store.has_property("foo"));
        // Clearing again is a no-op.
        store.clear_property("foo");
    }

    #[test]
    fn test_clear_reseeds_defaults() {
        let mut store = PropertyStore::new();
        store.set_property("custom", "value");
        store.clear();
        assert!(!store.has_property("custom"));
        assert_eq!(store.get_property(PATH_SEPARATOR_PROPERTY), PATH_SEPARATOR);
        assert_eq!(store.get_property(LINE_SEPARATOR_PROPERTY), LINE_SEPARATOR);
        assert_eq!(store.get_property(NEWLINE_PROPERTY), LINE_SEPARATOR);
        assert!(store.has_property(MULTI_SELECTION_SEPARATOR_PROPERTY));
    }

    #[test]
    fn test_environment_variables_are_seeded() {
        let store = PropertyStore::new();
        for (name, value) in std::env::vars() {
            let key = format!("env.{name}");
            assert!(store.has_property(&key), "missing {key}");
            assert_eq!(store.get_property(&key), value);
        }
    }

    #[test]
    fn test_expand_multiple_tokens() {
        let mut store = PropertyStore::new();
        store.set_property("foo", "1");
        store.set_property("bar", "2");
        assert_eq!(store.expand("${foo}-${bar}"), "1-2");
    }

    #[test]
    fn test_expand_repeated_token() {
        let mut store = PropertyStore::new();
        store.set_property("x", "ab");
        assert_eq!(store.expand("${x}${x}${x}"), "ababab");
    }

    #[test]
    fn test_expand_unknown_token_stays_literal() {
        let store = PropertyStore::new();
        assert_eq!(store.expand("${missing}"), "${missing}");
    }

    #[test]
    fn test_expand_empty_input() {
        let store = PropertyStore::new();
        assert_eq!(store.expand(""), "");
    }

    #[test]
    fn test_expand_self_reference_terminates() {
        let mut store = PropertyStore::new();
        store.set_property("loop", "${loop}");
        // Single pass: the replacement text is not re-scanned.
        assert_eq!(store.expand("${loop}"), "${loop}");
    }

    #[test]
    fn test_multi_selection_separator_fallback() {
        let mut store = PropertyStore::new();
        assert_eq!(
            store.multi_selection_separator(),
            DEFAULT_MULTI_SELECTION_SEPARATOR
        );
        store.set_property(MULTI_SELECTION_SEPARATOR_PROPERTY, " | ");
        assert_eq!(store.multi_selection_separator(), " | ");
        store.set_property(MULTI_SELECTION_SEPARATOR_PROPERTY, "");
        assert_eq!(
            store.multi_selection_separator(),
            DEFAULT_MULTI_SELECTION_SEPARATOR
        );
    }
}
