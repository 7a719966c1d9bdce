//! Element tree serialization

use super::reader::XML_PROLOG;
use super::tree::{NodeId, XmlTree};
use crate::error::Result;
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use std::io::Write;

/// How empty elements are written below the root.
///
/// Root elements are always written with an explicit end tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyElements {
    /// `<t/>`
    #[default]
    SelfClosing,
    /// `<t></t>`, the form the game writes inside embedded state blobs
    Expanded,
}

/// Serialize a tree without a prolog. An empty tree is written as `<{fallback}></{fallback}>`.
///
/// # Errors
/// Returns an error if XML serialization fails.
pub fn serialize_root(tree: &XmlTree, fallback: &str, empty: EmptyElements) -> Result<String> {
    let mut output = Vec::new();
    {
        let mut writer = Writer::new(&mut output);
        match tree.root() {
            Some(root) => write_element(&mut writer, tree, root, empty, true)?,
            None => {
                writer.write_event(Event::Start(BytesStart::new(fallback)))?;
                writer.write_event(Event::End(BytesEnd::new(fallback)))?;
            }
        }
    }
    Ok(String::from_utf8(output)?)
}

/// Serialize a standalone document with the prolog and expanded empty elements.
///
/// This is the format of the embedded `state` attribute blobs.
///
/// # Errors
/// Returns an error if XML serialization fails.
pub fn serialize_embedded(tree: &XmlTree) -> Result<String> {
    let root = tree
        .root()
        .map_or("data", |node| tree.tag(node))
        .to_string();
    let body = serialize_root(tree, &root, EmptyElements::Expanded)?;
    Ok(format!("{XML_PROLOG}{body}"))
}

fn write_element<W: Write>(
    writer: &mut Writer<W>,
    tree: &XmlTree,
    node: NodeId,
    empty: EmptyElements,
    is_root: bool,
) -> Result<()> {
    let element = tree.element(node);
    let mut start = BytesStart::new(element.tag.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    let has_content = !element.children().is_empty() || element.text.is_some();
    if !has_content && !is_root && empty == EmptyElements::SelfClosing {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start.borrow()))?;
    if let Some(text) = &element.text {
        writer.write_event(Event::Text(BytesText::new(text)))?;
    }
    for child in element.children() {
        write_element(writer, tree, *child, empty, false)?;
    }
    writer.write_event(Event::End(BytesEnd::new(element.tag.as_str())))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::reader::parse_document;

    #[test]
    fn test_absent_root_written_empty() {
        let tree = XmlTree::new();
        let xml = serialize_root(&tree, "missiles", EmptyElements::SelfClosing).unwrap();
        assert_eq!(xml, "<missiles></missiles>");
    }

    #[test]
    fn test_self_closing_children() {
        let mut tree = XmlTree::with_root("vehicles");
        let root = tree.root().unwrap();
        let v = tree.ensure_path(root, &["vehicles", "v"]);
        tree.set_attribute(v, "id", "3");
        let xml = serialize_root(&tree, "vehicles", EmptyElements::SelfClosing).unwrap();
        assert_eq!(xml, r#"<vehicles><vehicles><v id="3"/></vehicles></vehicles>"#);
    }

    #[test]
    fn test_embedded_expands_and_escapes() {
        let mut tree = XmlTree::with_root("data");
        let root = tree.root().unwrap();
        tree.set_attribute(root, "name", "a<b");
        tree.ensure_path(root, &["waypoints"]);
        let xml = serialize_embedded(&tree).unwrap();
        assert!(xml.starts_with(XML_PROLOG));
        assert!(xml.contains(r#"<data name="a&lt;b"><waypoints></waypoints></data>"#));

        let parsed = parse_document(&xml).unwrap();
        let parsed_root = parsed.root().unwrap();
        assert_eq!(parsed.attribute(parsed_root, "name"), Some("a<b"));
    }
}
