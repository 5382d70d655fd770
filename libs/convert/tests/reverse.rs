//! Bundle → document conversion.

mod fixtures;

use crosswalk_cda::{EntryText, ObservationValue};
use crosswalk_convert::{convert_fhir_to_ccda, ConvertError, FhirToCcdaOptions};
use crosswalk_fhir::*;
use fixtures::*;

fn procedure_resource(id: &str, code: &str, display: &str) -> Resource {
    Resource::Procedure(Procedure {
        id: Some(id.to_string()),
        status: Some("completed".to_string()),
        code: Some(CodeableConcept {
            coding: Some(vec![Coding {
                system: Some("http://snomed.info/sct".to_string()),
                code: Some(code.to_string()),
                display: Some(display.to_string()),
            }]),
            ..Default::default()
        }),
        performed_date_time: Some("2024-02-01T09:00:00Z".to_string()),
        ..Default::default()
    })
}

#[test]
fn missing_composition_is_fatal() {
    let bundle = Bundle {
        r#type: Some("document".to_string()),
        entry: Some(vec![BundleEntry {
            resource: Some(Resource::Patient(Patient::default())),
        }]),
        ..Default::default()
    };
    let err = convert_fhir_to_ccda(&bundle, &FhirToCcdaOptions::default()).unwrap_err();
    assert!(matches!(err, ConvertError::MissingResource("Composition")));
}

#[test]
fn missing_patient_is_fatal() {
    let bundle = Bundle {
        r#type: Some("document".to_string()),
        entry: Some(vec![BundleEntry {
            resource: Some(Resource::Composition(Composition::default())),
        }]),
        ..Default::default()
    };
    let err = convert_fhir_to_ccda(&bundle, &FhirToCcdaOptions::default()).unwrap_err();
    assert!(matches!(err, ConvertError::MissingResource("Patient")));
}

#[test]
fn unknown_section_code_is_fatal() {
    let bundle = document_bundle(vec![loinc_section("00000-0", "Mystery", vec![])], vec![]);
    let err = convert_fhir_to_ccda(&bundle, &FhirToCcdaOptions::default()).unwrap_err();
    assert!(matches!(err, ConvertError::UnknownSectionCode(code) if code == "00000-0"));
}

#[test]
fn header_follows_us_realm_shape() {
    let bundle = document_bundle(vec![], vec![]);
    let doc = convert_fhir_to_ccda(&bundle, &FhirToCcdaOptions::default()).unwrap();

    assert_eq!(doc.realm_code.as_ref().unwrap().code.as_deref(), Some("US"));
    assert_eq!(
        doc.template_id[0].root.as_deref(),
        Some("2.16.840.1.113883.10.20.22.1.1")
    );
    assert_eq!(doc.title.as_deref(), Some("Medical Summary"));
    assert_eq!(
        doc.effective_time.as_ref().unwrap()[0].value.as_deref(),
        Some("20240115103000-0500")
    );

    // Identity convention in reverse: resource id becomes a bare root.
    let patient_role = &doc.record_target.as_ref().unwrap()[0].patient_role;
    let ids = patient_role.id.as_ref().unwrap();
    assert_eq!(ids[0].root.as_deref(), Some(PATIENT_ID));
    assert!(ids[0].extension.is_none());
    assert_eq!(ids[1].root.as_deref(), Some("2.16.840.1.113883.4.1"));
    assert_eq!(ids[1].extension.as_deref(), Some("999-99-9999"));

    let patient = patient_role.patient.as_ref().unwrap();
    assert_eq!(
        patient
            .administrative_gender_code
            .as_ref()
            .unwrap()
            .code
            .as_deref(),
        Some("F")
    );
    assert_eq!(
        patient.birth_time.as_ref().unwrap().value.as_deref(),
        Some("19700501")
    );
    // Absent race renders as an explicit unknown.
    assert_eq!(
        patient.race_code.as_ref().unwrap()[0].null_flavor.as_deref(),
        Some("UNK")
    );
}

#[test]
fn patient_education_renders_as_act() {
    let bundle = document_bundle(
        vec![loinc_section(
            "47519-4",
            "Procedures",
            vec![Reference::local("Procedure", "p1")],
        )],
        vec![procedure_resource("p1", "183948003", "Patient education")],
    );
    let doc = convert_fhir_to_ccda(&bundle, &FhirToCcdaOptions::default()).unwrap();

    let section = doc.sections().next().unwrap();
    let entry = &section.entry.as_ref().unwrap()[0];
    assert!(entry.procedure.is_none());
    let act = &entry.act.as_ref().unwrap()[0];
    assert_eq!(
        act.template_id[0].root.as_deref(),
        Some("2.16.840.1.113883.10.20.22.4.12")
    );
    assert_eq!(act.code.as_ref().unwrap().code.as_deref(), Some("183948003"));
}

#[test]
fn surgical_procedure_renders_as_procedure() {
    let bundle = document_bundle(
        vec![loinc_section(
            "47519-4",
            "Procedures",
            vec![Reference::local("Procedure", "p1")],
        )],
        vec![procedure_resource("p1", "80146002", "Appendectomy")],
    );
    let doc = convert_fhir_to_ccda(&bundle, &FhirToCcdaOptions::default()).unwrap();

    let section = doc.sections().next().unwrap();
    let entry = &section.entry.as_ref().unwrap()[0];
    assert!(entry.act.is_none());
    let procedure = &entry.procedure.as_ref().unwrap()[0];
    assert_eq!(
        procedure.template_id[0].root.as_deref(),
        Some("2.16.840.1.113883.10.20.22.4.14")
    );
    assert_eq!(
        procedure.effective_time.as_ref().unwrap()[0].value.as_deref(),
        Some("20240201090000+0000")
    );
}

#[test]
fn unresolved_references_are_omitted_not_fatal() {
    let bundle = document_bundle(
        vec![loinc_section(
            "47519-4",
            "Procedures",
            vec![
                Reference::local("Procedure", "p1"),
                Reference::local("Procedure", "missing"),
            ],
        )],
        vec![procedure_resource("p1", "80146002", "Appendectomy")],
    );
    let doc = convert_fhir_to_ccda(&bundle, &FhirToCcdaOptions::default()).unwrap();

    let section = doc.sections().next().unwrap();
    // Two references, one resolvable: one entry, no error.
    assert_eq!(section.entry.as_ref().unwrap().len(), 1);
    assert!(section.null_flavor.is_none());
}

#[test]
fn empty_section_carries_null_flavor() {
    let bundle = document_bundle(
        vec![loinc_section("47519-4", "Procedures", vec![])],
        vec![],
    );
    let doc = convert_fhir_to_ccda(&bundle, &FhirToCcdaOptions::default()).unwrap();
    let section = doc.sections().next().unwrap();
    assert_eq!(section.null_flavor.as_deref(), Some("NI"));
    assert!(section.entry.is_none());
}

#[test]
fn narrative_anchor_maps_back_to_text_reference() {
    let condition = Resource::Condition(Condition {
        id: Some("c1".to_string()),
        clinical_status: Some(CodeableConcept {
            coding: Some(vec![Coding {
                code: Some("active".to_string()),
                ..Default::default()
            }]),
            ..Default::default()
        }),
        code: Some(CodeableConcept {
            coding: Some(vec![Coding {
                system: Some("http://snomed.info/sct".to_string()),
                code: Some("38341003".to_string()),
                display: Some("Hypertension".to_string()),
            }]),
            ..Default::default()
        }),
        extension: Some(vec![Extension {
            url: crosswalk_convert::narrative::NARRATIVE_REFERENCE_URL.to_string(),
            value_string: Some("#problem1".to_string()),
            ..Default::default()
        }]),
        onset_date_time: Some("2020-03-01".to_string()),
        ..Default::default()
    });

    let bundle = document_bundle(
        vec![loinc_section(
            "11450-4",
            "Problems",
            vec![Reference::local("Condition", "c1")],
        )],
        vec![condition],
    );
    let doc = convert_fhir_to_ccda(&bundle, &FhirToCcdaOptions::default()).unwrap();

    let section = doc.sections().next().unwrap();
    let act = &section.entry.as_ref().unwrap()[0].act.as_ref().unwrap()[0];
    let observation = act.entry_relationship.as_ref().unwrap()[0]
        .first_observation()
        .unwrap();
    assert_eq!(
        observation.text.as_ref().and_then(EntryText::reference_value),
        Some("#problem1")
    );
    match observation.value.as_ref().unwrap() {
        ObservationValue::Cd(code) => {
            assert_eq!(code.code.as_deref(), Some("38341003"));
        }
        other => panic!("expected CD value, got {other:?}"),
    }
}

#[test]
fn referral_kind_uses_referral_header() {
    let bundle = document_bundle(vec![], vec![]);
    let doc = convert_fhir_to_ccda(
        &bundle,
        &FhirToCcdaOptions {
            kind: crosswalk_convert::DocumentKind::Referral,
        },
    )
    .unwrap();

    assert!(doc
        .template_id
        .iter()
        .any(|t| t.root.as_deref() == Some("2.16.840.1.113883.10.20.22.1.14")));
    assert_eq!(doc.code.as_ref().unwrap().code.as_deref(), Some("57133-1"));
}
