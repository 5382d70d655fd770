//! Document → bundle conversion.

mod fixtures;

use crosswalk_cda::ClinicalDocument;
use crosswalk_convert::{convert_ccda_to_fhir, ConvertError, ConvertOptions};
use crosswalk_fhir::Resource;
use fixtures::*;

fn convert() -> crosswalk_fhir::Bundle {
    let doc = ClinicalDocument::from_xml(&ccd_document()).unwrap();
    convert_ccda_to_fhir(&doc, &ConvertOptions::default()).unwrap()
}

#[test]
fn bundle_starts_with_composition_then_patient() {
    let bundle = convert();
    let resources: Vec<&Resource> = bundle.resources().collect();
    assert_eq!(resources[0].resource_type(), "Composition");
    assert_eq!(resources[1].resource_type(), "Patient");
}

#[test]
fn patient_demographics() {
    let bundle = convert();
    let Some(Resource::Patient(patient)) = bundle.first_of_type("Patient") else {
        panic!("patient missing");
    };

    // Identity convention: the UUID root becomes the resource id, the
    // SSN id becomes an identifier.
    assert_eq!(patient.id.as_deref(), Some(PATIENT_ID));
    let identifiers = patient.identifier.as_ref().unwrap();
    assert_eq!(identifiers.len(), 1);
    assert_eq!(
        identifiers[0].system.as_deref(),
        Some("http://hl7.org/fhir/sid/us-ssn")
    );

    let name = &patient.name.as_ref().unwrap()[0];
    assert_eq!(name.use_.as_deref(), Some("official"));
    assert_eq!(name.given.as_ref().unwrap(), &["Alice", "Jones"]);
    assert_eq!(name.family.as_deref(), Some("Newman"));
    assert_eq!(patient.gender.as_deref(), Some("female"));
    assert_eq!(patient.birth_date.as_deref(), Some("1970-05-01"));

    let telecom = &patient.telecom.as_ref().unwrap()[0];
    assert_eq!(telecom.system.as_deref(), Some("phone"));
    assert_eq!(telecom.value.as_deref(), Some("+1(555)555-2003"));
}

#[test]
fn race_code_lands_in_omb_category_extension() {
    let bundle = convert();
    let Some(Resource::Patient(patient)) = bundle.first_of_type("Patient") else {
        panic!("patient missing");
    };

    let race = patient
        .extension
        .as_ref()
        .unwrap()
        .iter()
        .find(|e| e.url.ends_with("us-core-race"))
        .expect("race extension");
    let omb = race.nested("ombCategory").expect("ombCategory");
    let coding = omb.value_coding.as_ref().unwrap();
    assert_eq!(coding.code.as_deref(), Some("2131-1"));
    assert_eq!(coding.display.as_deref(), Some("Other Race"));
    assert_eq!(
        coding.system.as_deref(),
        Some("urn:oid:2.16.840.1.113883.6.238")
    );
}

#[test]
fn allergy_act_becomes_allergy_intolerance() {
    let bundle = convert();
    let Some(Resource::AllergyIntolerance(allergy)) = bundle.first_of_type("AllergyIntolerance")
    else {
        panic!("allergy missing");
    };

    assert_eq!(allergy.id.as_deref(), Some(ALLERGY_ACT_ID));
    assert_eq!(allergy.category.as_ref().unwrap(), &["medication"]);
    assert_eq!(
        allergy
            .clinical_status
            .as_ref()
            .unwrap()
            .first_code(),
        Some("active")
    );

    // Narrative anchor threaded onto the produced value.
    let extensions = allergy.extension.as_ref().unwrap();
    assert_eq!(extensions.len(), 1);
    assert_eq!(extensions[0].value_string.as_deref(), Some("#allergy1"));

    let code = allergy.code.as_ref().unwrap();
    assert_eq!(code.first_code(), Some("7980"));
    assert_eq!(
        code.first_coding().unwrap().system.as_deref(),
        Some("http://www.nlm.nih.gov/research/umls/rxnorm")
    );

    let reaction = &allergy.reaction.as_ref().unwrap()[0];
    assert_eq!(
        reaction.manifestation.as_ref().unwrap()[0].first_code(),
        Some("247472004")
    );
    assert_eq!(reaction.severity.as_deref(), Some("moderate"));
    assert_eq!(allergy.onset_date_time.as_deref(), Some("2023-03-01"));
}

#[test]
fn vitals_organizer_builds_member_graph() {
    let bundle = convert();
    let Some(Resource::Observation(organizer)) =
        bundle.resource_by_reference(&format!("Observation/{ORGANIZER_ID}"))
    else {
        panic!("organizer missing");
    };

    assert_eq!(
        organizer.category.as_ref().unwrap()[0].first_code(),
        Some("vital-signs")
    );
    let members = organizer.has_member.as_ref().unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(
        members[0].reference.as_deref(),
        Some(format!("Observation/{CHILD_OBSERVATION_ID}").as_str())
    );

    let Some(Resource::Observation(child)) =
        bundle.resource_by_reference(&format!("Observation/{CHILD_OBSERVATION_ID}"))
    else {
        panic!("member observation missing");
    };
    let quantity = child.value_quantity.as_ref().unwrap();
    assert_eq!(quantity.value, Some(98.6));
    assert_eq!(quantity.unit.as_deref(), Some("[degF]"));
    assert_eq!(
        quantity.system.as_deref(),
        Some("http://unitsofmeasure.org")
    );
    assert_eq!(
        child.effective_date_time.as_deref(),
        Some("2024-01-10T09:00:00+00:00")
    );
}

#[test]
fn composition_sections_reference_section_resources() {
    let bundle = convert();
    let Some(Resource::Composition(composition)) = bundle.first_of_type("Composition") else {
        panic!("composition missing");
    };

    let sections = composition.section.as_ref().unwrap();
    assert_eq!(sections.len(), 2);
    assert_eq!(
        sections[0].code.as_ref().unwrap().first_code(),
        Some("48765-2")
    );
    assert_eq!(
        sections[0].entry.as_ref().unwrap()[0].reference.as_deref(),
        Some(format!("AllergyIntolerance/{ALLERGY_ACT_ID}").as_str())
    );

    // Narrative rendered into an XHTML div with anchors intact.
    let div = sections[0].text.as_ref().unwrap().div.as_deref().unwrap();
    assert!(div.starts_with(r#"<div xmlns="http://www.w3.org/1999/xhtml">"#));
    assert!(div.contains(r#"ID="allergy1""#));
}

#[test]
fn qrda_needs_qualifying_data() {
    // The fixture has no encounters, interventions, procedures or
    // coverages, so no report is attached and no error is raised.
    let doc = ClinicalDocument::from_xml(&ccd_document()).unwrap();
    let bundle = convert_ccda_to_fhir(
        &doc,
        &ConvertOptions {
            generate_qrda: true,
            qrda: Some(crosswalk_convert::QrdaParams {
                patient_id: "patient-1".to_string(),
                measure_period_start: "2024-01-01T00:00:00Z".to_string(),
                measure_period_end: "2024-12-31T23:59:59Z".to_string(),
            }),
            ..Default::default()
        },
    )
    .unwrap();
    assert!(bundle.first_of_type("DocumentReference").is_none());
}

#[test]
fn qrda_params_required_with_generate_qrda() {
    let doc = ClinicalDocument::from_xml(&ccd_document()).unwrap();
    let err = convert_ccda_to_fhir(
        &doc,
        &ConvertOptions {
            generate_qrda: true,
            qrda: None,
            ..Default::default()
        },
    )
    .unwrap_err();
    assert!(matches!(err, ConvertError::InvalidQrdaParams(_)));
}

#[test]
fn unknown_entry_template_raises_by_default() {
    let doc = ClinicalDocument::from_xml(&unknown_section_document()).unwrap();
    let err = convert_ccda_to_fhir(&doc, &ConvertOptions::default()).unwrap_err();
    match err {
        ConvertError::UnsupportedTemplateId { template_id, .. } => {
            assert_eq!(template_id, "9.8.7.6.5.4.3.2.1");
        }
        other => panic!("expected UnsupportedTemplateId, got {other}"),
    }
}

#[test]
fn unknown_entry_template_skips_when_permissive() {
    let doc = ClinicalDocument::from_xml(&unknown_section_document()).unwrap();
    let bundle = convert_ccda_to_fhir(
        &doc,
        &ConvertOptions {
            ignore_unsupported_sections: true,
            ..Default::default()
        },
    )
    .unwrap();

    // The skipped entry produces zero resources; the section itself
    // still appears in the composition.
    let Some(Resource::Composition(composition)) = bundle.first_of_type("Composition") else {
        panic!("composition missing");
    };
    let sections = composition.section.as_ref().unwrap();
    assert_eq!(sections.len(), 1);
    assert!(sections[0].entry.as_ref().unwrap().is_empty());
    assert!(bundle.first_of_type("Condition").is_none());
}
