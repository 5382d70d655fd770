//! XML ↔ attributed-tree conversion for CDA-family documents.
//!
//! CDA XML carries data in element attributes, so the usual FHIR-style
//! `value` attribute convention does not apply. Instead, every element maps
//! to a JSON object where attributes become `"@_name"` keys, mixed text
//! content becomes a `"#text"` key, and a text-only leaf collapses to a
//! plain string. Because CDA XML cannot express cardinality syntactically,
//! the caller declares which element paths are repeatable ([`ArrayPaths`]);
//! those always parse as arrays even for a single occurrence.
//!
//! Serialization is the exact inverse, with empty nodes (null, empty
//! objects, empty arrays) suppressed entirely.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use roxmltree::Document;
use serde_json::{Map, Value};
use std::io::Cursor;
use thiserror::Error;

/// Key prefix for XML attributes in the attributed tree.
pub const ATTR_PREFIX: &str = "@_";
/// Key for mixed text content in the attributed tree.
pub const TEXT_KEY: &str = "#text";

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("XML parse error: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("XML write error: {0}")]
    XmlWrite(#[from] quick_xml::Error),
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("expected a single root element")]
    ExpectedElement,
}

/// Declares which element paths parse as arrays even when a single
/// occurrence is present.
///
/// `names` match an element name at any depth. `suffixes` match a dotted
/// path ending (`"manufacturedMaterial.code"`), for names that are
/// repeatable only in specific positions. A repeated element at an
/// undeclared path still promotes to an array on its second occurrence.
#[derive(Debug, Clone, Copy)]
pub struct ArrayPaths {
    pub names: &'static [&'static str],
    pub suffixes: &'static [&'static str],
}

impl ArrayPaths {
    /// No forced arrays; repetition alone drives array promotion.
    pub const NONE: ArrayPaths = ArrayPaths { names: &[], suffixes: &[] };

    fn is_array(&self, path: &str, name: &str) -> bool {
        if self.names.contains(&name) {
            return true;
        }
        self.suffixes.iter().any(|suffix| {
            path.ends_with(suffix)
                && (path.len() == suffix.len()
                    || path.as_bytes()[path.len() - suffix.len() - 1] == b'.')
        })
    }
}

/// Parse an XML document into an attributed tree.
///
/// Returns a single-key object `{ root_name: content }`. Namespace
/// declarations on the root element are preserved as `@_xmlns` /
/// `@_xmlns:prefix` keys so that serialization round-trips them.
pub fn parse_xml(input: &str, arrays: &ArrayPaths) -> Result<Value, FormatError> {
    let doc = Document::parse(input)?;
    let root = doc.root_element();
    let name = qualified_name(&root);

    let mut content = element_to_value(&root, &name, arrays);
    if let Value::Object(obj) = &mut content {
        let mut namespaces = Map::new();
        for ns in root.namespaces() {
            let key = match ns.name() {
                Some(prefix) => format!("{ATTR_PREFIX}xmlns:{prefix}"),
                None => format!("{ATTR_PREFIX}xmlns"),
            };
            namespaces.insert(key, Value::String(ns.uri().to_string()));
        }
        // Namespace declarations come first, in document style.
        namespaces.extend(std::mem::take(obj));
        *obj = namespaces;
    }

    let mut result = Map::new();
    result.insert(name, content);
    Ok(Value::Object(result))
}

/// Parse a markup fragment (e.g. a narrative `<div>`), returning only the
/// root element's content with all namespace declarations stripped.
pub fn parse_fragment(input: &str, arrays: &ArrayPaths) -> Result<Value, FormatError> {
    let doc = Document::parse(input)?;
    let root = doc.root_element();
    Ok(element_to_value(&root, root.tag_name().name(), arrays))
}

fn qualified_name(node: &roxmltree::Node) -> String {
    let local = node.tag_name().name();
    match node.tag_name().namespace().and_then(|ns| node.lookup_prefix(ns)) {
        Some(prefix) if !prefix.is_empty() => format!("{prefix}:{local}"),
        _ => local.to_string(),
    }
}

fn qualified_attr_name(node: &roxmltree::Node, attr: &roxmltree::Attribute) -> String {
    let local = attr.name();
    match attr.namespace().and_then(|ns| node.lookup_prefix(ns)) {
        Some(prefix) if !prefix.is_empty() => format!("{prefix}:{local}"),
        _ => local.to_string(),
    }
}

fn element_to_value(node: &roxmltree::Node, path: &str, arrays: &ArrayPaths) -> Value {
    let mut obj = Map::new();

    for attr in node.attributes() {
        obj.insert(
            format!("{}{}", ATTR_PREFIX, qualified_attr_name(node, &attr)),
            Value::String(attr.value().to_string()),
        );
    }

    let mut text = String::new();
    let mut has_child_elements = false;

    for child in node.children() {
        if child.is_element() {
            has_child_elements = true;
            let name = qualified_name(&child);
            let child_path = format!("{path}.{name}");
            let value = element_to_value(&child, &child_path, arrays);
            insert_property(&mut obj, &name, value, arrays.is_array(&child_path, &name));
        } else if child.is_text() {
            if let Some(t) = child.text() {
                text.push_str(t);
            }
        }
    }

    let trimmed = text.trim();

    // A text-only leaf with no attributes collapses to a plain string.
    if !has_child_elements && obj.is_empty() {
        return Value::String(trimmed.to_string());
    }

    if !trimmed.is_empty() {
        obj.insert(TEXT_KEY.to_string(), Value::String(trimmed.to_string()));
    }

    Value::Object(obj)
}

fn insert_property(map: &mut Map<String, Value>, name: &str, value: Value, force_array: bool) {
    match map.entry(name.to_string()) {
        serde_json::map::Entry::Vacant(v) => {
            if force_array {
                v.insert(Value::Array(vec![value]));
            } else {
                v.insert(value);
            }
        }
        serde_json::map::Entry::Occupied(mut o) => match o.get_mut() {
            Value::Array(arr) => arr.push(value),
            existing => {
                let old = existing.take();
                *existing = Value::Array(vec![old, value]);
            }
        },
    }
}

/// Serialize an attributed tree to an XML document with declaration.
///
/// The input must be a single-key object as produced by [`parse_xml`].
pub fn write_document(tree: &Value) -> Result<String, FormatError> {
    let obj = tree.as_object().ok_or(FormatError::ExpectedElement)?;
    let (name, content) = obj.iter().next().ok_or(FormatError::ExpectedElement)?;

    let mut writer = Writer::new(Cursor::new(Vec::new()));
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    write_element(&mut writer, name, content)?;
    let bytes = writer.into_inner().into_inner();
    Ok(String::from_utf8(bytes)?)
}

/// Serialize a single element (no XML declaration), e.g. a narrative
/// fragment re-embedded in another document.
pub fn write_element_string(name: &str, content: &Value) -> Result<String, FormatError> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    write_element(&mut writer, name, content)?;
    let bytes = writer.into_inner().into_inner();
    Ok(String::from_utf8(bytes)?)
}

/// Serialize only the content of a node — its text and child elements,
/// without a wrapping element. Used to re-render section narratives
/// inside a host markup element.
pub fn write_children_string(content: &Value) -> Result<String, FormatError> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    match content {
        Value::Object(obj) => {
            for (key, child) in obj {
                if key.starts_with(ATTR_PREFIX) {
                    continue;
                }
                if key == TEXT_KEY {
                    if let Some(text) = scalar_text(child) {
                        writer.write_event(Event::Text(BytesText::new(&text)))?;
                    }
                    continue;
                }
                write_element(&mut writer, key, child)?;
            }
        }
        other => {
            if let Some(text) = scalar_text(other) {
                if !text.is_empty() {
                    writer.write_event(Event::Text(BytesText::new(&text)))?;
                }
            }
        }
    }
    let bytes = writer.into_inner().into_inner();
    Ok(String::from_utf8(bytes)?)
}

/// An empty node carries no information and is suppressed on output.
fn is_empty_node(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.iter().all(is_empty_node),
        Value::Object(obj) => obj.values().all(is_empty_node),
        _ => false,
    }
}

fn write_element(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    name: &str,
    value: &Value,
) -> Result<(), FormatError> {
    match value {
        Value::Null => Ok(()),
        Value::Array(items) => {
            for item in items {
                write_element(writer, name, item)?;
            }
            Ok(())
        }
        Value::Object(obj) => {
            if is_empty_node(value) {
                return Ok(());
            }

            let mut start = BytesStart::new(name);
            for (key, attr) in obj {
                if let Some(attr_name) = key.strip_prefix(ATTR_PREFIX) {
                    if let Some(text) = scalar_text(attr) {
                        start.push_attribute((attr_name, text.as_str()));
                    }
                }
            }

            let has_content = obj.iter().any(|(k, v)| {
                !k.starts_with(ATTR_PREFIX) && (k == TEXT_KEY || !is_empty_node(v))
            });
            if !has_content {
                writer.write_event(Event::Empty(start))?;
                return Ok(());
            }

            writer.write_event(Event::Start(start))?;
            for (key, child) in obj {
                if key.starts_with(ATTR_PREFIX) {
                    continue;
                }
                if key == TEXT_KEY {
                    if let Some(text) = scalar_text(child) {
                        writer.write_event(Event::Text(BytesText::new(&text)))?;
                    }
                    continue;
                }
                write_element(writer, key, child)?;
            }
            writer.write_event(Event::End(BytesEnd::new(name)))?;
            Ok(())
        }
        scalar => {
            let text = scalar_text(scalar).unwrap_or_default();
            if text.is_empty() {
                writer.write_event(Event::Empty(BytesStart::new(name)))?;
            } else {
                writer.write_event(Event::Start(BytesStart::new(name)))?;
                writer.write_event(Event::Text(BytesText::new(&text)))?;
                writer.write_event(Event::End(BytesEnd::new(name)))?;
            }
            Ok(())
        }
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TEST_ARRAYS: ArrayPaths = ArrayPaths {
        names: &["templateId", "id"],
        suffixes: &["organizer.component"],
    };

    #[test]
    fn attributes_and_text() {
        let xml = r#"<root><code code="1" codeSystem="2.16"/><city>Boston</city></root>"#;
        let tree = parse_xml(xml, &ArrayPaths::NONE).unwrap();
        assert_eq!(tree["root"]["code"]["@_code"], "1");
        assert_eq!(tree["root"]["code"]["@_codeSystem"], "2.16");
        assert_eq!(tree["root"]["city"], "Boston");
    }

    #[test]
    fn forced_arrays_single_occurrence() {
        let xml = r#"<root><templateId root="1.2.3"/><title>T</title></root>"#;
        let tree = parse_xml(xml, &TEST_ARRAYS).unwrap();
        assert!(tree["root"]["templateId"].is_array());
        assert_eq!(tree["root"]["templateId"][0]["@_root"], "1.2.3");
        assert!(tree["root"]["title"].is_string());
    }

    #[test]
    fn suffix_arrays_are_position_sensitive() {
        let xml = r#"<root><organizer><component><a/></component></organizer><component><b/></component></root>"#;
        let tree = parse_xml(xml, &TEST_ARRAYS).unwrap();
        assert!(tree["root"]["organizer"]["component"].is_array());
        assert!(tree["root"]["component"].is_object());
    }

    #[test]
    fn repetition_promotes_to_array() {
        let xml = r#"<root><given>John</given><given>Q</given></root>"#;
        let tree = parse_xml(xml, &ArrayPaths::NONE).unwrap();
        assert_eq!(tree["root"]["given"], json!(["John", "Q"]));
    }

    #[test]
    fn root_namespaces_preserved() {
        let xml = r#"<doc xmlns="urn:hl7-org:v3" xmlns:sdtc="urn:hl7-org:sdtc"><sdtc:raceCode code="1"/></doc>"#;
        let tree = parse_xml(xml, &ArrayPaths::NONE).unwrap();
        assert_eq!(tree["doc"]["@_xmlns"], "urn:hl7-org:v3");
        assert_eq!(tree["doc"]["@_xmlns:sdtc"], "urn:hl7-org:sdtc");
        assert_eq!(tree["doc"]["sdtc:raceCode"]["@_code"], "1");
    }

    #[test]
    fn fragment_strips_namespace_declarations() {
        let xml = r#"<div xmlns="http://www.w3.org/1999/xhtml"><content ID="x">text</content></div>"#;
        let fragment = parse_fragment(xml, &ArrayPaths::NONE).unwrap();
        assert!(fragment.get("@_xmlns").is_none());
        assert_eq!(fragment["content"]["@_ID"], "x");
        assert_eq!(fragment["content"]["#text"], "text");
    }

    #[test]
    fn empty_nodes_suppressed_on_write() {
        let tree = json!({
            "root": {
                "@_code": "X",
                "empty": {},
                "alsoEmpty": null,
                "kept": { "@_value": "1" },
            }
        });
        let xml = write_document(&tree).unwrap();
        assert!(xml.contains(r#"<root code="X">"#));
        assert!(!xml.contains("empty"));
        assert!(xml.contains(r#"<kept value="1"/>"#));
    }

    #[test]
    fn mixed_text_round_trip() {
        let xml = r#"<td>Penicillin <content ID="a1">hives</content></td>"#;
        let tree = parse_fragment(xml, &ArrayPaths::NONE).unwrap();
        assert_eq!(tree["#text"], "Penicillin");
        let out = write_element_string("td", &tree).unwrap();
        let reparsed = parse_fragment(&out, &ArrayPaths::NONE).unwrap();
        assert_eq!(reparsed["content"]["@_ID"], "a1");
    }

    #[test]
    fn document_round_trip_is_stable() {
        let xml = concat!(
            r#"<doc xmlns="urn:hl7-org:v3">"#,
            r#"<templateId root="2.16.840.1.113883.10.20.22.1.1"/>"#,
            r#"<id root="bc01a5d1-3a34-4286-82cc-43eb04c972a7"/>"#,
            r#"<title>Summary</title>"#,
            "</doc>",
        );
        let tree = parse_xml(xml, &TEST_ARRAYS).unwrap();
        let out = write_document(&tree).unwrap();
        let tree2 = parse_xml(&out, &TEST_ARRAYS).unwrap();
        assert_eq!(tree, tree2);
    }

    #[test]
    fn attribute_values_escaped() {
        let tree = json!({ "root": { "@_displayName": "a<b & \"c\"" } });
        let xml = write_document(&tree).unwrap();
        let back = parse_xml(&xml, &ArrayPaths::NONE).unwrap();
        assert_eq!(back["root"]["@_displayName"], "a<b & \"c\"");
    }
}
