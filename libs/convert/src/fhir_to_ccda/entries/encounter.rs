//! Encounter activity with referenced diagnosis acts.

use crate::fhir_to_ccda::actors::{map_effective_period, map_effective_time, map_identifiers};
use crate::fhir_to_ccda::{code_only, ReverseContext};
use crate::narrative;
use crate::oids::*;
use crate::systems::*;
use crosswalk_cda as cda;
use crosswalk_fhir::{Encounter, EncounterDiagnosis, Resource};

pub(crate) fn encounter(cx: &ReverseContext, encounter: &Encounter) -> cda::EntryNode {
    let relationships: Vec<cda::EntryRelationship> = encounter
        .diagnosis
        .iter()
        .flatten()
        .filter_map(|diagnosis| diagnosis_relationship(cx, diagnosis))
        .collect();

    cda::EntryNode {
        encounter: Some(vec![cda::Encounter {
            class_code: Some("ENC".to_string()),
            mood_code: Some("EVN".to_string()),
            template_id: vec![
                cda::TemplateId {
                    root: Some(OID_ENCOUNTER_ACTIVITIES.to_string()),
                    extension: None,
                },
                cda::TemplateId {
                    root: Some(OID_ENCOUNTER_ACTIVITIES.to_string()),
                    extension: Some("2015-08-01".to_string()),
                },
            ],
            id: map_identifiers(encounter.id.as_deref(), encounter.identifier.as_deref()),
            code: map_concept_to_cda_code(encounter.type_.as_ref().and_then(|t| t.first())),
            text: narrative::text_from_extensions(encounter.extension.as_deref()),
            status_code: encounter
                .status
                .as_deref()
                .map(|status| code_only(ENCOUNTER_STATUS_MAPPER.fhir_to_cda_or(Some(status), "completed"))),
            effective_time: map_effective_time(None, encounter.period.as_ref()),
            participant: encounter.participant.as_ref().map(|participants| {
                participants
                    .iter()
                    .map(|participant| cda::Participant {
                        type_code: Some("LOC".to_string()),
                        participant_role: Some(cda::ParticipantRole {
                            class_code: Some("SDLOC".to_string()),
                            template_id: Some(vec![cda::TemplateId {
                                root: Some(OID_ENCOUNTER_LOCATION.to_string()),
                                extension: None,
                            }]),
                            code: map_concept_to_cda_code(
                                participant.type_.as_ref().and_then(|t| t.first()),
                            ),
                            ..Default::default()
                        }),
                        ..Default::default()
                    })
                    .collect()
            }),
            entry_relationship: if relationships.is_empty() {
                None
            } else {
                Some(relationships)
            },
            ..Default::default()
        }]),
        ..Default::default()
    }
}

fn diagnosis_relationship(
    cx: &ReverseContext,
    diagnosis: &EncounterDiagnosis,
) -> Option<cda::EntryRelationship> {
    let Resource::Condition(condition) = cx.bundle.resolve(diagnosis.condition.as_ref())? else {
        return None;
    };

    Some(cda::EntryRelationship {
        type_code: Some("REFR".to_string()),
        act: Some(vec![cda::Act {
            class_code: Some("ACT".to_string()),
            mood_code: Some("EVN".to_string()),
            template_id: vec![
                cda::TemplateId {
                    root: Some(OID_ENCOUNTER_ACTIVITIES.to_string()),
                    extension: Some("2015-08-01".to_string()),
                },
                cda::TemplateId {
                    root: Some(OID_ENCOUNTER_ACTIVITIES.to_string()),
                    extension: None,
                },
            ],
            code: Some(cda::Code {
                code: Some(LOINC_DIAGNOSIS.to_string()),
                display_name: Some("Diagnosis".to_string()),
                code_system: Some(OID_LOINC_CODE_SYSTEM.to_string()),
                code_system_name: Some("LOINC".to_string()),
                ..Default::default()
            }),
            entry_relationship: Some(vec![cda::EntryRelationship {
                type_code: Some("SUBJ".to_string()),
                observation: Some(vec![cda::Observation {
                    class_code: Some("OBS".to_string()),
                    mood_code: Some("EVN".to_string()),
                    template_id: vec![
                        cda::TemplateId {
                            root: Some(OID_PROBLEM_OBSERVATION.to_string()),
                            extension: Some("2015-08-01".to_string()),
                        },
                        cda::TemplateId {
                            root: Some(OID_PROBLEM_OBSERVATION.to_string()),
                            extension: None,
                        },
                    ],
                    id: map_identifiers(condition.id.as_deref(), condition.identifier.as_deref()),
                    code: Some(cda::Code {
                        code: Some("282291009".to_string()),
                        display_name: Some("Diagnosis interpretation".to_string()),
                        code_system: Some(OID_SNOMED_CT_CODE_SYSTEM.to_string()),
                        code_system_name: Some("SNOMED CT".to_string()),
                        translation: Some(vec![cda::Code {
                            code: Some(LOINC_DIAGNOSIS.to_string()),
                            display_name: Some("Diagnosis".to_string()),
                            code_system: Some(OID_LOINC_CODE_SYSTEM.to_string()),
                            code_system_name: Some("LOINC".to_string()),
                            ..Default::default()
                        }]),
                        ..Default::default()
                    }),
                    status_code: Some(code_only("completed")),
                    effective_time: map_effective_period(
                        condition.onset_date_time.as_deref(),
                        condition.abatement_date_time.as_deref(),
                        false,
                    ),
                    value: map_concept_to_cda_value(condition.code.as_ref()),
                    ..Default::default()
                }]),
                ..Default::default()
            }]),
            ..Default::default()
        }]),
        ..Default::default()
    })
}
