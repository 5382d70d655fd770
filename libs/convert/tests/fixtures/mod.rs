//! Shared test documents and bundles.
#![allow(dead_code)]

use crosswalk_fhir::*;

pub const PATIENT_ID: &str = "d7830f15-e2c1-4e83-95b4-5e61317b5a1b";
pub const ALLERGY_ACT_ID: &str = "5c9d2f3a-8c1b-4f2e-9d6a-7b8c9d0e1f2a";
pub const ORGANIZER_ID: &str = "9a1b2c3d-4e5f-4a6b-8c7d-9e0f1a2b3c4d";
pub const CHILD_OBSERVATION_ID: &str = "1f2e3d4c-5b6a-4978-8899-aabbccddeeff";

/// A small but structurally complete continuity-of-care document:
/// header demographics, an allergies section with a full concern act,
/// and a vital-signs organizer.
pub fn ccd_document() -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8"?>"#,
            r#"<ClinicalDocument xmlns="urn:hl7-org:v3" xmlns:sdtc="urn:hl7-org:sdtc" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
            r#"<realmCode code="US"/>"#,
            r#"<typeId root="2.16.840.1.113883.1.3" extension="POCD_HD000040"/>"#,
            r#"<templateId root="2.16.840.1.113883.10.20.22.1.1"/>"#,
            r#"<templateId root="2.16.840.1.113883.10.20.22.1.1" extension="2015-08-01"/>"#,
            r#"<id root="bc01a5d1-3a34-4286-82cc-43eb04c972a7"/>"#,
            r#"<code code="34133-9" codeSystem="2.16.840.1.113883.6.1" codeSystemName="LOINC" displayName="Summarization of Episode Note"/>"#,
            r#"<title>Continuity of Care Document</title>"#,
            r#"<effectiveTime value="20240115103000-0500"/>"#,
            r#"<confidentialityCode code="N"/>"#,
            r#"<languageCode code="en-US"/>"#,
            r#"<recordTarget><patientRole>"#,
            r#"<id root="{patient_id}"/>"#,
            r#"<id root="2.16.840.1.113883.4.1" extension="999-99-9999"/>"#,
            r#"<addr use="HP"><streetAddressLine>2222 Home Street</streetAddressLine><city>Beaverton</city><state>OR</state><postalCode>97867</postalCode><country>US</country></addr>"#,
            r#"<telecom use="HP" value="tel:+1(555)555-2003"/>"#,
            r#"<patient>"#,
            r#"<name use="L"><given>Alice</given><given>Jones</given><family>Newman</family></name>"#,
            r#"<administrativeGenderCode code="F" codeSystem="2.16.840.1.113883.5.1"/>"#,
            r#"<birthTime value="19700501"/>"#,
            r#"<raceCode code="2131-1" displayName="Other Race" codeSystem="2.16.840.1.113883.6.238"/>"#,
            r#"<ethnicGroupCode code="2186-5" displayName="Not Hispanic or Latino" codeSystem="2.16.840.1.113883.6.238"/>"#,
            r#"</patient>"#,
            r#"</patientRole></recordTarget>"#,
            r#"<component><structuredBody>"#,
            // Allergies
            r#"<component><section>"#,
            r#"<templateId root="2.16.840.1.113883.10.20.22.2.6.1"/>"#,
            r#"<templateId root="2.16.840.1.113883.10.20.22.2.6.1" extension="2015-08-01"/>"#,
            r#"<code code="48765-2" codeSystem="2.16.840.1.113883.6.1" codeSystemName="LOINC"/>"#,
            r#"<title>Allergies and Intolerances</title>"#,
            r#"<text><table><tbody><tr><td ID="allergy1">Penicillin G</td></tr></tbody></table></text>"#,
            r#"<entry>"#,
            r#"<act classCode="ACT" moodCode="EVN">"#,
            r#"<templateId root="2.16.840.1.113883.10.20.22.4.30"/>"#,
            r#"<id root="{allergy_act_id}"/>"#,
            r#"<code code="CONC" codeSystem="2.16.840.1.113883.5.6"/>"#,
            r#"<statusCode code="active"/>"#,
            r#"<effectiveTime><low value="20230301"/></effectiveTime>"#,
            r#"<entryRelationship typeCode="SUBJ">"#,
            r#"<observation classCode="OBS" moodCode="EVN">"#,
            r#"<templateId root="2.16.840.1.113883.10.20.22.4.7"/>"#,
            r#"<id root="0d2f1a3b-4c5d-4e6f-8a9b-0c1d2e3f4a5b"/>"#,
            r#"<code code="ASSERTION" codeSystem="2.16.840.1.113883.5.4"/>"#,
            r##"<text><reference value="#allergy1"/></text>"##,
            r#"<statusCode code="completed"/>"#,
            r#"<effectiveTime><low value="20230301"/></effectiveTime>"#,
            r#"<value xsi:type="CD" code="419511003" displayName="Propensity to adverse reactions to drug (finding)" codeSystem="2.16.840.1.113883.6.96"/>"#,
            r#"<participant typeCode="CSM"><participantRole classCode="MANU"><playingEntity classCode="MMAT">"#,
            r##"<code code="7980" displayName="Penicillin G" codeSystem="2.16.840.1.113883.6.88"><originalText><reference value="#allergy1"/></originalText></code>"##,
            r#"</playingEntity></participantRole></participant>"#,
            r#"<entryRelationship typeCode="MFST" inversionInd="true">"#,
            r#"<observation classCode="OBS" moodCode="EVN">"#,
            r#"<templateId root="2.16.840.1.113883.10.20.22.4.9"/>"#,
            r#"<id root="3e4f5a6b-7c8d-4e9f-8a0b-1c2d3e4f5a6b"/>"#,
            r#"<code code="ASSERTION" codeSystem="2.16.840.1.113883.5.4"/>"#,
            r#"<statusCode code="completed"/>"#,
            r#"<effectiveTime><low value="20230301"/></effectiveTime>"#,
            r#"<value xsi:type="CD" code="247472004" displayName="Hives" codeSystem="2.16.840.1.113883.6.96"/>"#,
            r#"<entryRelationship typeCode="SUBJ" inversionInd="true">"#,
            r#"<observation classCode="OBS" moodCode="EVN">"#,
            r#"<templateId root="2.16.840.1.113883.10.20.22.4.8"/>"#,
            r#"<code code="SEV" codeSystem="2.16.840.1.113883.5.4"/>"#,
            r#"<statusCode code="completed"/>"#,
            r#"<value xsi:type="CD" code="6736007" displayName="Moderate" codeSystem="2.16.840.1.113883.6.96"/>"#,
            r#"</observation></entryRelationship>"#,
            r#"</observation></entryRelationship>"#,
            r#"</observation></entryRelationship>"#,
            r#"</act></entry>"#,
            r#"</section></component>"#,
            // Vital signs
            r#"<component><section>"#,
            r#"<templateId root="2.16.840.1.113883.10.20.22.2.4.1"/>"#,
            r#"<code code="8716-3" codeSystem="2.16.840.1.113883.6.1" codeSystemName="LOINC"/>"#,
            r#"<title>Vital Signs</title>"#,
            r#"<text><table><tbody><tr><td ID="vital1">Body temperature 98.6 F</td></tr></tbody></table></text>"#,
            r#"<entry>"#,
            r#"<organizer classCode="CLUSTER" moodCode="EVN">"#,
            r#"<templateId root="2.16.840.1.113883.10.20.22.4.26"/>"#,
            r#"<id root="{organizer_id}"/>"#,
            r#"<code code="46680005" displayName="Vital signs" codeSystem="2.16.840.1.113883.6.96"/>"#,
            r#"<statusCode code="completed"/>"#,
            r#"<effectiveTime value="20240110090000+0000"/>"#,
            r#"<component>"#,
            r#"<observation classCode="OBS" moodCode="EVN">"#,
            r#"<templateId root="2.16.840.1.113883.10.20.22.4.27"/>"#,
            r#"<id root="{child_observation_id}"/>"#,
            r#"<code code="8310-5" displayName="Body temperature" codeSystem="2.16.840.1.113883.6.1"/>"#,
            r##"<text><reference value="#vital1"/></text>"##,
            r#"<statusCode code="completed"/>"#,
            r#"<effectiveTime value="20240110090000+0000"/>"#,
            r#"<value xsi:type="PQ" value="98.6" unit="[degF]"/>"#,
            r#"</observation>"#,
            r#"</component>"#,
            r#"</organizer></entry>"#,
            r#"</section></component>"#,
            r#"</structuredBody></component>"#,
            r#"</ClinicalDocument>"#,
        ),
        patient_id = PATIENT_ID,
        allergy_act_id = ALLERGY_ACT_ID,
        organizer_id = ORGANIZER_ID,
        child_observation_id = CHILD_OBSERVATION_ID,
    )
}

/// A document whose only section carries an unregistered template id
/// around a single act entry.
pub fn unknown_section_document() -> String {
    concat!(
        r#"<ClinicalDocument xmlns="urn:hl7-org:v3">"#,
        r#"<templateId root="2.16.840.1.113883.10.20.22.1.1"/>"#,
        r#"<id root="bc01a5d1-3a34-4286-82cc-43eb04c972a7"/>"#,
        r#"<title>Unknown</title>"#,
        r#"<component><structuredBody><component><section>"#,
        r#"<templateId root="1.2.3.4.5.6.7.8.9"/>"#,
        r#"<code code="00000-0" codeSystem="2.16.840.1.113883.6.1"/>"#,
        r#"<title>Mystery Section</title>"#,
        r#"<entry><act classCode="ACT" moodCode="EVN">"#,
        r#"<templateId root="9.8.7.6.5.4.3.2.1"/>"#,
        r#"<code code="X" codeSystem="1.2.3"/>"#,
        r#"</act></entry>"#,
        r#"</section></component></structuredBody></component>"#,
        r#"</ClinicalDocument>"#,
    )
    .to_string()
}

/// A minimal bundle with a Composition and Patient plus whatever extra
/// resources and section entries the test supplies.
pub fn document_bundle(
    sections: Vec<CompositionSection>,
    extra: Vec<Resource>,
) -> Bundle {
    let patient = Patient {
        id: Some(PATIENT_ID.to_string()),
        identifier: Some(vec![Identifier {
            system: Some("http://hl7.org/fhir/sid/us-ssn".to_string()),
            value: Some("999-99-9999".to_string()),
        }]),
        name: Some(vec![HumanName {
            use_: Some("official".to_string()),
            given: Some(vec!["Alice".to_string()]),
            family: Some("Newman".to_string()),
            ..Default::default()
        }]),
        gender: Some("female".to_string()),
        birth_date: Some("1970-05-01".to_string()),
        ..Default::default()
    };

    let composition = Composition {
        id: Some("bc01a5d1-3a34-4286-82cc-43eb04c972a7".to_string()),
        status: Some("final".to_string()),
        title: Some("Medical Summary".to_string()),
        date: Some("2024-01-15T10:30:00-05:00".to_string()),
        section: Some(sections),
        ..Default::default()
    };

    let mut entries = vec![
        BundleEntry { resource: Some(Resource::Composition(composition)) },
        BundleEntry { resource: Some(Resource::Patient(patient)) },
    ];
    entries.extend(
        extra
            .into_iter()
            .map(|resource| BundleEntry { resource: Some(resource) }),
    );

    Bundle {
        r#type: Some("document".to_string()),
        entry: Some(entries),
        ..Default::default()
    }
}

pub fn loinc_section(code: &str, title: &str, entries: Vec<Reference>) -> CompositionSection {
    CompositionSection {
        title: Some(title.to_string()),
        code: Some(CodeableConcept {
            coding: Some(vec![Coding {
                system: Some("http://loinc.org".to_string()),
                code: Some(code.to_string()),
                display: None,
            }]),
            ..Default::default()
        }),
        text: Some(Narrative {
            status: Some("generated".to_string()),
            div: Some(format!(
                r#"<div xmlns="http://www.w3.org/1999/xhtml"><content ID="x1">{title}</content></div>"#
            )),
        }),
        entry: Some(entries),
    }
}
