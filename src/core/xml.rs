//! # XML Element Tree
//!
//! A minimal owned DOM built from the `quick-xml` event stream. The builder
//! works on this tree rather than raw events so configuration errors can
//! reference an element's name and source line, and so child elements keep
//! their document order.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum XmlError {
    #[error("XML syntax error at line {line}: {message}")]
    Syntax { line: usize, message: String },
    #[error("Unexpected closing tag at line {line}.")]
    UnexpectedClose { line: usize },
    #[error("The document has no root element.")]
    NoRootElement,
}

/// One parsed element: name, attributes in document order, merged text
/// content, child elements, and the 1-based source line it started on.
#[derive(Debug, Clone, Default)]
pub struct XmlElement {
    pub name: String,
    pub line: usize,
    pub text: String,
    attributes: Vec<(String, String)>,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    /// The attribute's value, or `None` when absent.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Direct children with the given element name, in document order.
    pub fn children_named<'a>(
        &'a self,
        name: &str,
    ) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// First direct child with the given element name.
    pub fn child_named(&self, name: &str) -> Option<&XmlElement> {
        self.children_named(name).next()
    }
}

/// 1-based line number of the given byte offset.
fn line_at(input: &str, position: u64) -> usize {
    let offset = usize::try_from(position)
        .unwrap_or(input.len())
        .min(input.len());
    let newlines = input
        .get(..offset)
        .map_or(0, |prefix| prefix.bytes().filter(|b| *b == b'\n').count());
    newlines + 1
}

fn element_from_tag(tag: &BytesStart<'_>, line: usize) -> Result<XmlElement, XmlError> {
    let name = String::from_utf8_lossy(tag.name().as_ref()).to_string();
    let mut attributes = Vec::new();
    for attribute in tag.attributes() {
        let attribute = attribute.map_err(|e| XmlError::Syntax {
            line,
            message: e.to_string(),
        })?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).to_string();
        let value = attribute
            .unescape_value()
            .map_err(|e| XmlError::Syntax {
                line,
                message: e.to_string(),
            })?
            .to_string();
        attributes.push((key, value));
    }
    Ok(XmlElement {
        name,
        line,
        text: String::new(),
        attributes,
        children: Vec::new(),
    })
}

/// Attaches a finished element to its parent, or makes it the root.
fn attach(element: XmlElement, stack: &mut Vec<XmlElement>, root: &mut Option<XmlElement>) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
    } else if root.is_none() {
        *root = Some(element);
    } else {
        log::warn!(
            "ignoring extra root element <{}> at line {}",
            element.name,
            element.line
        );
    }
}

/// Parses a whole document into its root element.
///
/// Comments, processing instructions and the XML declaration are skipped;
/// text is whitespace-trimmed and accumulated per element. Mismatched tags
/// surface as syntax errors from the underlying reader.
pub fn parse_document(input: &str) -> Result<XmlElement, XmlError> {
    let mut reader = Reader::from_str(input);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        let event = reader.read_event();
        let line = line_at(input, reader.buffer_position());
        match event {
            Ok(Event::Start(tag)) => {
                let element = element_from_tag(&tag, line)?;
                stack.push(element);
            }
            Ok(Event::Empty(tag)) => {
                let element = element_from_tag(&tag, line)?;
                attach(element, &mut stack, &mut root);
            }
            Ok(Event::Text(text)) => {
                if let Some(top) = stack.last_mut() {
                    let content = text.unescape().map_err(|e| XmlError::Syntax {
                        line,
                        message: e.to_string(),
                    })?;
                    top.text.push_str(&content);
                }
            }
            Ok(Event::CData(data)) => {
                if let Some(top) = stack.last_mut() {
                    top.text
                        .push_str(&String::from_utf8_lossy(data.into_inner().as_ref()));
                }
            }
            Ok(Event::End(_)) => {
                let element = stack.pop().ok_or(XmlError::UnexpectedClose { line })?;
                attach(element, &mut stack, &mut root);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(XmlError::Syntax {
                    line,
                    message: e.to_string(),
                });
            }
        }
    }

    root.ok_or(XmlError::NoRootElement)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_elements_in_order() {
        let root = parse_document(
            r#"<root>
  <menu name="first"><actions><open path="a"/></actions></menu>
  <menu name="second"/>
</root>"#,
        )
        .unwrap();

        assert_eq!(root.name, "root");
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].attribute("name"), Some("first"));
        assert_eq!(root.children[1].attribute("name"), Some("second"));

        let actions = root.children[0].child_named("actions").unwrap();
        assert_eq!(actions.children[0].name, "open");
        assert_eq!(actions.children[0].attribute("path"), Some("a"));
    }

    #[test]
    fn test_line_numbers() {
        let root = parse_document("<root>\n  <menu name=\"a\"/>\n  <menu name=\"b\"/>\n</root>")
            .unwrap();
        assert_eq!(root.line, 1);
        assert_eq!(root.children[0].line, 2);
        assert_eq!(root.children[1].line, 3);
    }

    #[test]
    fn test_text_content_and_entities() {
        let root =
            parse_document("<root><file path=\"x\">line &amp; more</file></root>").unwrap();
        assert_eq!(root.children[0].text, "line & more");
    }

    #[test]
    fn test_missing_attribute_reads_none() {
        let root = parse_document(r#"<root attr="v"/>"#).unwrap();
        assert_eq!(root.attribute("attr"), Some("v"));
        assert_eq!(root.attribute("other"), None);
    }

    #[test]
    fn test_empty_attribute_value() {
        let root = parse_document(r#"<root attr=""/>"#).unwrap();
        assert_eq!(root.attribute("attr"), Some(""));
    }

    #[test]
    fn test_mismatched_tags_are_a_syntax_error() {
        assert!(matches!(
            parse_document("<root><menu></root>"),
            Err(XmlError::Syntax { .. })
        ));
    }

    #[test]
    fn test_empty_document_has_no_root() {
        assert!(matches!(
            parse_document("  \n "),
            Err(XmlError::NoRootElement)
        ));
        assert!(matches!(
            parse_document("<!-- only a comment -->"),
            Err(XmlError::NoRootElement)
        ));
    }

    #[test]
    fn test_children_named_filters() {
        let root = parse_document("<root><a/><b/><a/></root>").unwrap();
        assert_eq!(root.children_named("a").count(), 2);
        assert_eq!(root.children_named("b").count(), 1);
        assert_eq!(root.children_named("c").count(), 0);
    }
}
