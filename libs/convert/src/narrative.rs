//! Narrative anchor threading.
//!
//! Structured values derived from a section narrative carry a single
//! fragment-reference anchor (`#med1`) pointing at the exact narrative
//! text. Forward, the anchor becomes one extension on the produced
//! field; reverse, the extension becomes a `text/reference` element
//! again. At most one anchor per value; absence means the value had no
//! narrative backing.

use crosswalk_cda::{EntryText, Section};
use crosswalk_fhir::{find_extension, Extension, Narrative};
use serde_json::Value;

/// Extension url carrying the narrative anchor on a structured field.
pub const NARRATIVE_REFERENCE_URL: &str =
    "https://crosswalk.rs/fhir/StructureDefinition/cda-narrative-reference";

pub const XHTML_NS: &str = "http://www.w3.org/1999/xhtml";

/// The anchor string carried by an extension list, if any.
pub fn narrative_reference(extensions: Option<&[Extension]>) -> Option<String> {
    find_extension(extensions, NARRATIVE_REFERENCE_URL)?
        .value_string
        .clone()
}

/// Wrap an anchor in the single narrative-reference extension.
pub fn anchor_extensions(anchor: Option<&str>) -> Option<Vec<Extension>> {
    Some(vec![Extension {
        url: NARRATIVE_REFERENCE_URL.to_string(),
        value_string: Some(anchor?.to_string()),
        ..Default::default()
    }])
}

/// Extensions for a document `text` element carrying a reference anchor.
pub fn text_extensions(text: Option<&EntryText>) -> Option<Vec<Extension>> {
    anchor_extensions(text?.reference_value())
}

/// A document `text` element for an extension list carrying an anchor.
pub fn text_from_extensions(extensions: Option<&[Extension]>) -> Option<EntryText> {
    Some(EntryText::from_reference(&narrative_reference(extensions)?))
}

/// Render a section narrative tree into a Composition XHTML `div`.
pub fn narrative_to_div(section: &Section) -> Narrative {
    let inner = section
        .text
        .as_ref()
        .map(|tree| crosswalk_format::write_children_string(tree).unwrap_or_default())
        .unwrap_or_default();
    Narrative {
        status: Some("generated".to_string()),
        div: Some(format!(r#"<div xmlns="{XHTML_NS}">{inner}</div>"#)),
    }
}

/// Re-parse a Composition narrative `div` back into a section narrative
/// tree, stripped of namespace declarations. Unparseable markup yields
/// no narrative rather than an error.
pub fn div_to_narrative(text: Option<&Narrative>) -> Option<Value> {
    let div = text?.div.as_deref()?;
    let tree = crosswalk_format::parse_fragment(div, &crosswalk_cda::ALWAYS_ARRAY).ok()?;
    match &tree {
        Value::Object(obj) if obj.is_empty() => None,
        Value::String(s) if s.is_empty() => None,
        _ => Some(tree),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchor_survives_both_directions() {
        let text = EntryText::from_reference("#allergy1");
        let extensions = text_extensions(Some(&text)).unwrap();
        assert_eq!(extensions.len(), 1);
        assert_eq!(extensions[0].value_string.as_deref(), Some("#allergy1"));

        let back = text_from_extensions(Some(&extensions)).unwrap();
        assert_eq!(back.reference_value(), Some("#allergy1"));
    }

    #[test]
    fn absent_anchor_means_no_extension() {
        assert!(text_extensions(None).is_none());
        let plain = EntryText::Plain("inline prose".to_string());
        assert!(text_extensions(Some(&plain)).is_none());
    }

    #[test]
    fn narrative_div_round_trip() {
        let tree = serde_json::json!({
            "table": {
                "tbody": {
                    "tr": { "td": { "@_ID": "med1", "#text": "Aspirin 81mg" } }
                }
            }
        });
        let section = Section { text: Some(tree.clone()), ..Default::default() };
        let narrative = narrative_to_div(&section);
        let div = narrative.div.as_deref().unwrap();
        assert!(div.starts_with(r#"<div xmlns="http://www.w3.org/1999/xhtml">"#));
        assert!(div.contains(r#"ID="med1""#));

        let back = div_to_narrative(Some(&narrative)).unwrap();
        assert_eq!(back["table"]["tbody"]["tr"]["td"]["@_ID"], "med1");
    }
}
