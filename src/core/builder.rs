//! # Menu Tree Builder
//!
//! Turns a parsed [`XmlElement`] tree into menus, validators and actions.
//! Every failure names the offending node and its source line and aborts the
//! whole enclosing subtree; a menu is never partially constructed.

use crate::core::actions::{Action, FileEncoding, PromptKind};
use crate::core::menu::{Icon, Menu};
use crate::core::validator::{Validator, ValidatorError};
use crate::core::xml::{XmlElement, XmlError};
use thiserror::Error;

const NODE_ROOT: &str = "root";
const NODE_MENU: &str = "menu";
const NODE_ICON: &str = "icon";
const NODE_VALIDITY: &str = "validity";
const NODE_VISIBILITY: &str = "visibility";
const NODE_ACTIONS: &str = "actions";
const NODE_DEFAULT: &str = "default";
const NODE_ACTION_CLIPBOARD: &str = "clipboard";
const NODE_ACTION_EXEC: &str = "exec";
const NODE_ACTION_FILE: &str = "file";
const NODE_ACTION_PROMPT: &str = "prompt";
const NODE_ACTION_PROPERTY: &str = "property";
const NODE_ACTION_OPEN: &str = "open";
const NODE_ACTION_MESSAGE: &str = "message";

/// Errors raised while constructing the menu tree from a document.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Xml(#[from] XmlError),
    #[error("I/O error while reading '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Node '{node}' at line {line} is missing attribute '{attribute}'.")]
    MissingAttribute {
        node: String,
        line: usize,
        attribute: String,
    },
    #[error("Node '{node}' at line {line} has attribute '{attribute}' with an empty value.")]
    EmptyAttribute {
        node: String,
        line: usize,
        attribute: String,
    },
    #[error(
        "Node '{node}' at line {line} has attribute '{attribute}' with invalid value '{value}'."
    )]
    InvalidAttribute {
        node: String,
        line: usize,
        attribute: String,
        value: String,
    },
    #[error("Node '{node}' at line {line} is an unknown type.")]
    UnknownElement { node: String, line: usize },
    #[error("Node '{node}' at line {line} has an invalid criterion: {source}")]
    InvalidCriterion {
        node: String,
        line: usize,
        #[source]
        source: ValidatorError,
    },
    #[error("The document root must be <root>, found <{node}> at line {line}.")]
    UnexpectedRoot { node: String, line: usize },
}

/// A required attribute; empty values are rejected when `allow_empty` is
/// false.
fn required_attribute<'a>(
    element: &'a XmlElement,
    attribute: &str,
    allow_empty: bool,
) -> Result<&'a str, ConfigError> {
    let value = element
        .attribute(attribute)
        .ok_or_else(|| ConfigError::MissingAttribute {
            node: element.name.clone(),
            line: element.line,
            attribute: attribute.to_string(),
        })?;
    if !allow_empty && value.is_empty() {
        return Err(ConfigError::EmptyAttribute {
            node: element.name.clone(),
            line: element.line,
            attribute: attribute.to_string(),
        });
    }
    Ok(value)
}

/// An optional attribute; absent yields `None`, present-but-empty is still
/// returned.
fn optional_attribute<'a>(element: &'a XmlElement, attribute: &str) -> Option<&'a str> {
    element.attribute(attribute)
}

fn parse_count_attribute(
    element: &XmlElement,
    attribute: &str,
) -> Result<Option<usize>, ConfigError> {
    let Some(value) = optional_attribute(element, attribute) else {
        return Ok(None);
    };
    value
        .trim()
        .parse::<usize>()
        .map(Some)
        .map_err(|_| ConfigError::InvalidAttribute {
            node: element.name.clone(),
            line: element.line,
            attribute: attribute.to_string(),
            value: value.to_string(),
        })
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "true" | "yes" | "1" | "on"
    )
}

/// Parses a `<validity>` or `<visibility>` element into a validator.
pub fn parse_validator(element: &XmlElement) -> Result<Validator, ConfigError> {
    if element.name != NODE_VALIDITY && element.name != NODE_VISIBILITY {
        return Err(ConfigError::UnknownElement {
            node: element.name.clone(),
            line: element.line,
        });
    }

    let criterion = |source: ValidatorError| ConfigError::InvalidCriterion {
        node: element.name.clone(),
        line: element.line,
        source,
    };

    let mut validator = Validator::new();
    if let Some(max_files) = parse_count_attribute(element, "maxfiles")? {
        validator.set_max_files(max_files);
    }
    if let Some(max_folders) = parse_count_attribute(element, "maxfolders")? {
        validator.set_max_directories(max_folders);
    }
    if let Some(value) = optional_attribute(element, "properties").filter(|v| !v.is_empty()) {
        validator.set_properties(value);
    }
    if let Some(value) = optional_attribute(element, "fileextensions").filter(|v| !v.is_empty()) {
        validator.set_file_extensions(value);
    }
    if let Some(value) = optional_attribute(element, "exists").filter(|v| !v.is_empty()) {
        validator.set_file_exists(value);
    }
    if let Some(value) = optional_attribute(element, "class").filter(|v| !v.is_empty()) {
        validator.set_class(value).map_err(criterion)?;
    }
    if let Some(value) = optional_attribute(element, "pattern").filter(|v| !v.is_empty()) {
        validator.set_pattern(value).map_err(criterion)?;
    }
    if let Some(value) = optional_attribute(element, "inverse").filter(|v| !v.is_empty()) {
        validator.set_inverse(value);
    }
    Ok(validator)
}

/// Parses one action element inside `<actions>` (or `<default>`).
pub fn parse_action(element: &XmlElement) -> Result<Action, ConfigError> {
    match element.name.as_str() {
        NODE_ACTION_CLIPBOARD => Ok(Action::Clipboard {
            value: required_attribute(element, "value", true)?.to_string(),
        }),
        NODE_ACTION_EXEC => Ok(Action::Execute {
            path: required_attribute(element, "path", true)?.to_string(),
            arguments: optional_attribute(element, "arguments").map(str::to_string),
            base_dir: optional_attribute(element, "basedir").map(str::to_string),
        }),
        NODE_ACTION_FILE => {
            let encoding = match optional_attribute(element, "encoding") {
                Some(value) => {
                    FileEncoding::parse(value).ok_or_else(|| ConfigError::InvalidAttribute {
                        node: element.name.clone(),
                        line: element.line,
                        attribute: "encoding".to_string(),
                        value: value.to_string(),
                    })?
                }
                None => FileEncoding::default(),
            };
            Ok(Action::File {
                path: required_attribute(element, "path", true)?.to_string(),
                text: element.text.clone(),
                encoding,
            })
        }
        NODE_ACTION_PROMPT => {
            let kind = match optional_attribute(element, "type") {
                None | Some("") => PromptKind::Text,
                Some("yesno") => PromptKind::YesNo,
                Some("ok") => PromptKind::Ok,
                Some(other) => {
                    return Err(ConfigError::InvalidAttribute {
                        node: element.name.clone(),
                        line: element.line,
                        attribute: "type".to_string(),
                        value: other.to_string(),
                    });
                }
            };
            let value_yes = optional_attribute(element, "valueyes").map(str::to_string);
            let value_no = optional_attribute(element, "valueno").map(str::to_string);
            if kind == PromptKind::YesNo && (value_yes.is_none() || value_no.is_none()) {
                let missing = if value_yes.is_none() {
                    "valueyes"
                } else {
                    "valueno"
                };
                return Err(ConfigError::MissingAttribute {
                    node: element.name.clone(),
                    line: element.line,
                    attribute: missing.to_string(),
                });
            }
            Ok(Action::Prompt {
                name: required_attribute(element, "name", true)?.to_string(),
                title: required_attribute(element, "title", true)?.to_string(),
                default: optional_attribute(element, "default").map(str::to_string),
                kind,
                value_yes,
                value_no,
            })
        }
        NODE_ACTION_PROPERTY => Ok(Action::Property {
            name: required_attribute(element, "name", true)?.to_string(),
            value: required_attribute(element, "value", true)?.to_string(),
        }),
        NODE_ACTION_OPEN => Ok(Action::Open {
            path: required_attribute(element, "path", true)?.to_string(),
        }),
        NODE_ACTION_MESSAGE => Ok(Action::Message {
            title: required_attribute(element, "title", true)?.to_string(),
            caption: required_attribute(element, "caption", true)?.to_string(),
            icon: optional_attribute(element, "icon").map(str::to_string),
        }),
        _ => Err(ConfigError::UnknownElement {
            node: element.name.clone(),
            line: element.line,
        }),
    }
}

/// Parses an `<icon>` element: explicit `path`/`index`/`fileextension`
/// attributes.
pub fn parse_icon(element: &XmlElement) -> Result<Icon, ConfigError> {
    let path = optional_attribute(element, "path").map(str::to_string);
    let file_extension = optional_attribute(element, "fileextension").map(str::to_string);
    if path.is_none() && file_extension.is_none() {
        return Err(ConfigError::MissingAttribute {
            node: element.name.clone(),
            line: element.line,
            attribute: "path".to_string(),
        });
    }
    let index = match optional_attribute(element, "index") {
        Some(value) => Some(value.trim().parse::<i32>().map_err(|_| {
            ConfigError::InvalidAttribute {
                node: element.name.clone(),
                line: element.line,
                attribute: "index".to_string(),
                value: value.to_string(),
            }
        })?),
        None => None,
    };
    Ok(Icon {
        path,
        index,
        file_extension,
    })
}

/// Parses a `<menu>` element and its whole subtree.
///
/// `separator="true"` short-circuits every other attribute and child.
pub fn parse_menu(element: &XmlElement) -> Result<Menu, ConfigError> {
    if element.name != NODE_MENU {
        return Err(ConfigError::UnknownElement {
            node: element.name.clone(),
            line: element.line,
        });
    }

    let is_separator = optional_attribute(element, "separator").is_some_and(parse_bool);
    if is_separator {
        return Ok(Menu::separator());
    }

    let mut menu = Menu::new(required_attribute(element, "name", false)?);
    if let Some(description) = optional_attribute(element, "description") {
        menu.set_description(description);
    }
    if let Some(max_length) = parse_count_attribute(element, "maxlength")? {
        menu.set_name_max_length(max_length);
    }
    if let Some(icon_spec) = optional_attribute(element, "icon").filter(|v| !v.is_empty()) {
        menu.set_icon(Icon::from_spec(icon_spec));
    }

    for child in &element.children {
        match child.name.as_str() {
            NODE_VALIDITY => menu.set_validity(parse_validator(child)?),
            NODE_VISIBILITY => menu.set_visibility(parse_validator(child)?),
            NODE_ACTIONS => {
                for action_element in &child.children {
                    menu.add_action(parse_action(action_element)?);
                }
            }
            NODE_MENU => menu.add_child(parse_menu(child)?),
            NODE_ICON => menu.set_icon(parse_icon(child)?),
            _ => {
                return Err(ConfigError::UnknownElement {
                    node: child.name.clone(),
                    line: child.line,
                });
            }
        }
    }
    Ok(menu)
}

/// Parses the `<default>` element: property actions seeding the store.
///
/// Non-property actions inside `<default>` are skipped with a warning, as
/// the defaults run before any selection exists.
fn parse_defaults(element: &XmlElement) -> Result<Vec<Action>, ConfigError> {
    let mut defaults = Vec::new();
    for child in element.children_named(NODE_ACTION_PROPERTY) {
        defaults.push(parse_action(child)?);
    }
    for child in &element.children {
        if child.name != NODE_ACTION_PROPERTY {
            log::warn!(
                "ignoring <{}> at line {}: only <property> is allowed in <default>",
                child.name,
                child.line
            );
        }
    }
    Ok(defaults)
}

/// Parses the document root into default property actions and root menus.
pub fn parse_root(element: &XmlElement) -> Result<(Vec<Action>, Vec<Menu>), ConfigError> {
    if element.name != NODE_ROOT {
        return Err(ConfigError::UnexpectedRoot {
            node: element.name.clone(),
            line: element.line,
        });
    }

    let mut defaults = Vec::new();
    let mut menus = Vec::new();
    for child in &element.children {
        match child.name.as_str() {
            NODE_DEFAULT => defaults.extend(parse_defaults(child)?),
            NODE_MENU => menus.push(parse_menu(child)?),
            _ => {
                return Err(ConfigError::UnknownElement {
                    node: child.name.clone(),
                    line: child.line,
                });
            }
        }
    }
    Ok((defaults, menus))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::xml::parse_document;

    fn root_of(xml: &str) -> XmlElement {
        parse_document(xml).unwrap()
    }

    #[test]
    fn test_parse_minimal_menu() {
        let doc = root_of(r#"<root><menu name="Open terminal"/></root>"#);
        let (defaults, menus) = parse_root(&doc).unwrap();
        assert!(defaults.is_empty());
        assert_eq!(menus.len(), 1);
        assert_eq!(menus[0].name(), "Open terminal");
        assert!(!menus[0].is_separator());
    }

    #[test]
    fn test_menu_name_is_required_and_non_empty() {
        let doc = root_of("<root><menu/></root>");
        assert!(matches!(
            parse_root(&doc),
            Err(ConfigError::MissingAttribute { node, attribute, .. })
                if node == "menu" && attribute == "name"
        ));

        let doc = root_of(r#"<root><menu name=""/></root>"#);
        assert!(matches!(
            parse_root(&doc),
            Err(ConfigError::EmptyAttribute { attribute, .. }) if attribute == "name"
        ));
    }

    #[test]
    fn test_error_references_node_and_line() {
        let doc = root_of("<root>\n  <menu name=\"ok\"/>\n  <menu/>\n</root>");
        let error = parse_root(&doc).unwrap_err();
        let message = error.to_string();
        assert!(message.contains("'menu'"), "{message}");
        assert!(message.contains("line 3"), "{message}");
        assert!(message.contains("'name'"), "{message}");
    }

    #[test]
    fn test_separator_short_circuits_other_attributes() {
        // No name attribute: would be an error on a normal menu.
        let doc = root_of(r#"<root><menu separator="true"/></root>"#);
        let (_, menus) = parse_root(&doc).unwrap();
        assert!(menus[0].is_separator());

        // separator="false" falls through to normal parsing.
        let doc = root_of(r#"<root><menu separator="false"/></root>"#);
        assert!(parse_root(&doc).is_err());
    }

    #[test]
    fn test_parse_validators_and_inverse() {
        let doc = root_of(
            r#"<root><menu name="m">
                <visibility maxfiles="1" fileextensions="txt;doc" inverse="maxfiles"/>
                <validity maxfolders="0" properties="a.b" class="file" pattern="*.txt"/>
            </menu></root>"#,
        );
        let (_, menus) = parse_root(&doc).unwrap();
        let menu = &menus[0];
        assert!(menu.visibility().is_inversed("maxfiles"));
        assert!(!menu.visibility().is_inversed("fileextensions"));
        assert!(menu.validity().summary().unwrap().contains("maxfolders=0"));
    }

    #[test]
    fn test_malformed_numeric_criterion_fails_parse() {
        let doc = root_of(r#"<root><menu name="m"><visibility maxfiles="abc"/></menu></root>"#);
        assert!(matches!(
            parse_root(&doc),
            Err(ConfigError::InvalidAttribute { attribute, value, .. })
                if attribute == "maxfiles" && value == "abc"
        ));
    }

    #[test]
    fn test_unknown_class_token_fails_parse() {
        let doc = root_of(r#"<root><menu name="m"><visibility class="gizmo"/></menu></root>"#);
        assert!(matches!(
            parse_root(&doc),
            Err(ConfigError::InvalidCriterion { .. })
        ));
    }

    #[test]
    fn test_actions_parsed_in_document_order() {
        let doc = root_of(
            r#"<root><menu name="m"><actions>
                <property name="a" value="1"/>
                <clipboard value="${selection.path}"/>
                <exec path="notepad.exe" arguments="${selection.path}"/>
                <open path="${selection.path}"/>
            </actions></menu></root>"#,
        );
        let (_, menus) = parse_root(&doc).unwrap();
        let kinds: Vec<&str> = menus[0].actions().iter().map(Action::kind).collect();
        assert_eq!(kinds, ["property", "clipboard", "exec", "open"]);
    }

    #[test]
    fn test_unknown_action_aborts_menu() {
        let doc = root_of(
            r#"<root><menu name="m"><actions><reboot/></actions></menu></root>"#,
        );
        assert!(matches!(
            parse_root(&doc),
            Err(ConfigError::UnknownElement { node, .. }) if node == "reboot"
        ));
    }

    #[test]
    fn test_file_action_body_and_encoding() {
        let doc = root_of(
            "<root><menu name=\"m\"><actions><file path=\"out.txt\" encoding=\"unicode\">hello</file></actions></menu></root>",
        );
        let (_, menus) = parse_root(&doc).unwrap();
        match &menus[0].actions()[0] {
            Action::File {
                path,
                text,
                encoding,
            } => {
                assert_eq!(path, "out.txt");
                assert_eq!(text, "hello");
                assert_eq!(*encoding, FileEncoding::Unicode);
            }
            other => panic!("expected file action, got {other:?}"),
        }
    }

    #[test]
    fn test_prompt_yesno_requires_values() {
        let doc = root_of(
            r#"<root><menu name="m"><actions>
                <prompt name="p" title="T" type="yesno" valueyes="y"/>
            </actions></menu></root>"#,
        );
        assert!(matches!(
            parse_root(&doc),
            Err(ConfigError::MissingAttribute { attribute, .. }) if attribute == "valueno"
        ));
    }

    #[test]
    fn test_submenus_nest() {
        let doc = root_of(
            r#"<root><menu name="outer">
                <menu name="inner"><menu name="leaf"/></menu>
            </menu></root>"#,
        );
        let (_, menus) = parse_root(&doc).unwrap();
        assert!(menus[0].is_parent_menu());
        assert_eq!(menus[0].children()[0].children()[0].name(), "leaf");
    }

    #[test]
    fn test_icon_attribute_and_element_forms() {
        let doc = root_of(
            r#"<root><menu name="m" icon="shell32.dll,4">
                <icon fileextension="txt"/>
            </menu></root>"#,
        );
        let (_, menus) = parse_root(&doc).unwrap();
        // The <icon> element form overrides the attribute form.
        let icon = menus[0].icon().unwrap();
        assert_eq!(icon.file_extension.as_deref(), Some("txt"));
    }

    #[test]
    fn test_icon_element_needs_path_or_extension() {
        let doc = root_of(r#"<root><menu name="m"><icon index="3"/></menu></root>"#);
        assert!(matches!(
            parse_root(&doc),
            Err(ConfigError::MissingAttribute { .. })
        ));
    }

    #[test]
    fn test_defaults_collect_property_actions() {
        let doc = root_of(
            r#"<root><default>
                <property name="editor" value="vim"/>
                <property name="mode" value="fast"/>
                <open path="ignored"/>
            </default></root>"#,
        );
        let (defaults, _) = parse_root(&doc).unwrap();
        assert_eq!(defaults.len(), 2);
        assert!(matches!(&defaults[0], Action::Property { name, .. } if name == "editor"));
    }

    #[test]
    fn test_unexpected_root_element() {
        let doc = root_of("<shell/>");
        assert!(matches!(
            parse_root(&doc),
            Err(ConfigError::UnexpectedRoot { node, .. }) if node == "shell"
        ));
    }

    #[test]
    fn test_unknown_element_under_root() {
        let doc = root_of("<root><plugin/></root>");
        assert!(matches!(
            parse_root(&doc),
            Err(ConfigError::UnknownElement { node, .. }) if node == "plugin"
        ));
    }

    #[test]
    fn test_maxlength_attribute_clamps() {
        let doc = root_of(r#"<root><menu name="m" maxlength="9999"/></root>"#);
        let (_, menus) = parse_root(&doc).unwrap();
        assert_eq!(menus[0].name_max_length(), 250);
    }
}
