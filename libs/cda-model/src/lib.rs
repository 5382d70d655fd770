//! Typed model of a C-CDA clinical document.
//!
//! The structs here are a typed view over the attributed tree produced by
//! `crosswalk-format`: XML attributes appear as `"@_name"` serde renames,
//! mixed text content as `"#text"`, and repeatable elements as `Vec`s.
//! Field declaration order matches the CDA schema order, which is
//! significant on output.

mod document;

pub use document::*;

use crosswalk_format::{ArrayPaths, FormatError};
use thiserror::Error;

/// CDA namespace declarations carried on the document root.
pub const CDA_NS: &str = "urn:hl7-org:v3";
pub const SDTC_NS: &str = "urn:hl7-org:sdtc";
pub const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Repeatable CDA element paths. CDA XML does not distinguish singular
/// from repeatable elements syntactically, so the closed list lives here
/// and is passed to the codec on every parse.
///
/// Names apply at any depth; suffixes cover names that are repeatable only
/// in specific positions (`component` is singular at the document level
/// but repeats under `structuredBody` and `organizer`).
pub const ALWAYS_ARRAY: ArrayPaths = ArrayPaths {
    names: &[
        "templateId",
        "id",
        "recordTarget",
        "author",
        "participant",
        "performer",
        "section",
        "entry",
        "entryRelationship",
        "act",
        "observation",
        "organizer",
        "substanceAdministration",
        "encounter",
        "procedure",
        "addr",
        "telecom",
        "name",
        "given",
        "prefix",
        "suffix",
        "streetAddressLine",
        "effectiveTime",
        "raceCode",
        "sdtc:raceCode",
        "ethnicGroupCode",
        "languageCommunication",
        "manufacturedProduct",
        "manufacturedMaterial",
        "manufacturerOrganization",
        "manufacturedLabeledDrug",
        "lotNumberText",
        "referenceRange",
        "translation",
    ],
    suffixes: &[
        "structuredBody.component",
        "organizer.component",
        "manufacturedMaterial.code",
    ],
};

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("format error: {0}")]
    Format(#[from] FormatError),
    #[error("model mapping error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected ClinicalDocument root, found {0}")]
    UnexpectedRoot(String),
}

impl ClinicalDocument {
    /// Parse a C-CDA XML document.
    pub fn from_xml(input: &str) -> Result<ClinicalDocument, ModelError> {
        let tree = crosswalk_format::parse_xml(input, &ALWAYS_ARRAY)?;
        let obj = tree.as_object().and_then(|o| o.iter().next());
        match obj {
            Some((name, content)) if name == "ClinicalDocument" => {
                Ok(serde_json::from_value(content.clone())?)
            }
            Some((name, _)) => Err(ModelError::UnexpectedRoot(name.clone())),
            None => Err(ModelError::UnexpectedRoot(String::new())),
        }
    }

    /// Serialize to C-CDA XML with declaration; empty nodes are suppressed.
    pub fn to_xml(&self) -> Result<String, ModelError> {
        let content = serde_json::to_value(self)?;
        let mut tree = serde_json::Map::new();
        tree.insert("ClinicalDocument".to_string(), content);
        Ok(crosswalk_format::write_document(&serde_json::Value::Object(
            tree,
        ))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = concat!(
        r#"<ClinicalDocument xmlns="urn:hl7-org:v3" xmlns:sdtc="urn:hl7-org:sdtc">"#,
        r#"<realmCode code="US"/>"#,
        r#"<typeId root="2.16.840.1.113883.1.3" extension="POCD_HD000040"/>"#,
        r#"<templateId root="2.16.840.1.113883.10.20.22.1.1"/>"#,
        r#"<id root="bc01a5d1-3a34-4286-82cc-43eb04c972a7"/>"#,
        r#"<title>Medical Summary</title>"#,
        r#"<effectiveTime value="20240115103000-0500"/>"#,
        r#"<languageCode code="en-US"/>"#,
        r#"<recordTarget><patientRole>"#,
        r#"<id root="2.16.840.1.113883.4.1" extension="999-99-9999"/>"#,
        r#"<patient>"#,
        r#"<name use="L"><given>Alice</given><family>Newman</family></name>"#,
        r#"<administrativeGenderCode code="F" codeSystem="2.16.840.1.113883.5.1"/>"#,
        r#"<birthTime value="19700501"/>"#,
        r#"</patient></patientRole></recordTarget>"#,
        "</ClinicalDocument>",
    );

    #[test]
    fn parses_minimal_document() {
        let doc = ClinicalDocument::from_xml(MINIMAL).unwrap();
        assert_eq!(doc.title.as_deref(), Some("Medical Summary"));
        assert_eq!(doc.template_id[0].root.as_deref(), Some("2.16.840.1.113883.10.20.22.1.1"));
        let patient_role = &doc.record_target.as_ref().unwrap()[0].patient_role;
        let patient = patient_role.patient.as_ref().unwrap();
        assert_eq!(
            patient.name.as_ref().unwrap()[0].family.as_ref().unwrap().as_str(),
            Some("Newman")
        );
        assert_eq!(
            patient.administrative_gender_code.as_ref().unwrap().code.as_deref(),
            Some("F")
        );
    }

    #[test]
    fn rejects_foreign_root() {
        let err = ClinicalDocument::from_xml("<Bundle/>").unwrap_err();
        assert!(matches!(err, ModelError::UnexpectedRoot(name) if name == "Bundle"));
    }

    #[test]
    fn round_trips_through_xml() {
        let doc = ClinicalDocument::from_xml(MINIMAL).unwrap();
        let xml = doc.to_xml().unwrap();
        let doc2 = ClinicalDocument::from_xml(&xml).unwrap();
        assert_eq!(doc, doc2);
    }

    #[test]
    fn observation_value_tagged_by_xsi_type() {
        let json = serde_json::json!({
            "@_xsi:type": "PQ",
            "@_value": "98.6",
            "@_unit": "[degF]",
        });
        let value: ObservationValue = serde_json::from_value(json).unwrap();
        match value {
            ObservationValue::Pq(q) => {
                assert_eq!(q.value.as_deref(), Some("98.6"));
                assert_eq!(q.unit.as_deref(), Some("[degF]"));
            }
            other => panic!("expected PQ, got {other:?}"),
        }
    }
}
