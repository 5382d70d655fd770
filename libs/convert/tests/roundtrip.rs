//! Round-trip stability between the two representations.
//!
//! Comparisons run on re-serialized, re-parsed forms so insignificant
//! formatting differences and empty-node removal cannot fail the tests.

mod fixtures;

use crosswalk_cda::{ClinicalDocument, EntryText};
use crosswalk_convert::{
    convert_ccda_to_fhir, convert_fhir_to_ccda, ConvertOptions, FhirToCcdaOptions,
};
use crosswalk_fhir::Resource;
use fixtures::*;

#[test]
fn document_to_bundle_to_document() {
    let original = ClinicalDocument::from_xml(&ccd_document()).unwrap();
    let bundle = convert_ccda_to_fhir(&original, &ConvertOptions::default()).unwrap();
    let document = convert_fhir_to_ccda(&bundle, &FhirToCcdaOptions::default()).unwrap();

    // Normalize: serialize and reparse.
    let document = ClinicalDocument::from_xml(&document.to_xml().unwrap()).unwrap();

    assert_eq!(document.title.as_deref(), Some("Continuity of Care Document"));
    assert_eq!(
        document.id.as_ref().unwrap()[0].root.as_deref(),
        Some("bc01a5d1-3a34-4286-82cc-43eb04c972a7")
    );

    let sections: Vec<_> = document.sections().collect();
    assert_eq!(sections.len(), 2);
    let codes: Vec<_> = sections
        .iter()
        .map(|s| s.code.as_ref().unwrap().code.as_deref().unwrap())
        .collect();
    assert_eq!(codes, ["48765-2", "8716-3"]);

    // The patient identity and SSN identifier survive.
    let patient_role = &document.record_target.as_ref().unwrap()[0].patient_role;
    let ids = patient_role.id.as_ref().unwrap();
    assert!(ids
        .iter()
        .any(|id| id.root.as_deref() == Some(PATIENT_ID) && id.extension.is_none()));
    assert!(ids.iter().any(|id| {
        id.root.as_deref() == Some("2.16.840.1.113883.4.1")
            && id.extension.as_deref() == Some("999-99-9999")
    }));

    // Race coding unchanged through both directions.
    let race = &patient_role.patient.as_ref().unwrap().race_code.as_ref().unwrap()[0];
    assert_eq!(race.code.as_deref(), Some("2131-1"));
    assert_eq!(race.display_name.as_deref(), Some("Other Race"));

    // Narrative anchor symmetry: the allergy observation still points at
    // the same fragment.
    let allergy_act = sections[0].entry.as_ref().unwrap()[0]
        .act
        .as_ref()
        .unwrap()
        .first()
        .unwrap();
    let observation = allergy_act.entry_relationship.as_ref().unwrap()[0]
        .first_observation()
        .unwrap();
    assert_eq!(
        observation.text.as_ref().and_then(EntryText::reference_value),
        Some("#allergy1")
    );
}

#[test]
fn bundle_to_document_to_bundle() {
    let original = ClinicalDocument::from_xml(&ccd_document()).unwrap();
    let bundle = convert_ccda_to_fhir(&original, &ConvertOptions::default()).unwrap();

    let document = convert_fhir_to_ccda(&bundle, &FhirToCcdaOptions::default()).unwrap();
    let document = ClinicalDocument::from_xml(&document.to_xml().unwrap()).unwrap();
    let bundle2 = convert_ccda_to_fhir(&document, &ConvertOptions::default()).unwrap();

    let allergy = |bundle: &crosswalk_fhir::Bundle| -> crosswalk_fhir::AllergyIntolerance {
        match bundle.first_of_type("AllergyIntolerance") {
            Some(Resource::AllergyIntolerance(allergy)) => allergy.clone(),
            _ => panic!("allergy missing"),
        }
    };
    let first = allergy(&bundle);
    let second = allergy(&bundle2);

    assert_eq!(first.id, second.id);
    assert_eq!(first.category, second.category);
    assert_eq!(
        first.code.as_ref().unwrap().first_code(),
        second.code.as_ref().unwrap().first_code()
    );
    assert_eq!(first.onset_date_time, second.onset_date_time);
    assert_eq!(
        first.extension.as_ref().unwrap()[0].value_string,
        second.extension.as_ref().unwrap()[0].value_string
    );
    let first_reaction = &first.reaction.as_ref().unwrap()[0];
    let second_reaction = &second.reaction.as_ref().unwrap()[0];
    assert_eq!(first_reaction.severity, second_reaction.severity);
    assert_eq!(
        first_reaction.manifestation.as_ref().unwrap()[0].first_code(),
        second_reaction.manifestation.as_ref().unwrap()[0].first_code()
    );

    // Patient identity is stable across the full cycle.
    let patient_id = |bundle: &crosswalk_fhir::Bundle| {
        bundle
            .first_of_type("Patient")
            .and_then(|p| p.id())
            .map(str::to_string)
    };
    assert_eq!(patient_id(&bundle).as_deref(), Some(PATIENT_ID));
    assert_eq!(patient_id(&bundle2).as_deref(), Some(PATIENT_ID));
}

#[test]
fn vitals_survive_the_round_trip() {
    let original = ClinicalDocument::from_xml(&ccd_document()).unwrap();
    let bundle = convert_ccda_to_fhir(&original, &ConvertOptions::default()).unwrap();
    let document = convert_fhir_to_ccda(&bundle, &FhirToCcdaOptions::default()).unwrap();
    let document = ClinicalDocument::from_xml(&document.to_xml().unwrap()).unwrap();
    let bundle2 = convert_ccda_to_fhir(&document, &ConvertOptions::default()).unwrap();

    let quantity = |bundle: &crosswalk_fhir::Bundle| {
        bundle.resources().find_map(|resource| match resource {
            Resource::Observation(observation) => observation.value_quantity.clone(),
            _ => None,
        })
    };
    let first = quantity(&bundle).expect("quantity in first bundle");
    let second = quantity(&bundle2).expect("quantity in second bundle");
    assert_eq!(first.value, second.value);
    assert_eq!(first.unit, second.unit);
}
