//! Allergy concern act with nested intolerance, reaction and severity
//! observations.

use crate::fhir_to_ccda::actors::{map_effective_date, map_effective_period, map_identifiers};
use crate::fhir_to_ccda::{code_only, ReverseContext};
use crate::narrative;
use crate::oids::*;
use crate::systems::*;
use crosswalk_cda as cda;
use crosswalk_fhir::{AllergyIntolerance, AllergyIntoleranceReaction};

/// SNOMED "no known allergies" renders as an NA allergen rather than a
/// coded substance.
const NO_KNOWN_ALLERGIES: &str = "716186003";

pub(crate) fn allergy(cx: &ReverseContext, allergy: &AllergyIntolerance) -> cda::EntryNode {
    let reaction = allergy.reaction.as_ref().and_then(|r| r.first());

    cda::EntryNode {
        act: Some(vec![cda::Act {
            class_code: Some("ACT".to_string()),
            mood_code: Some("EVN".to_string()),
            template_id: vec![
                cda::TemplateId {
                    root: Some(OID_ALLERGY_PROBLEM_ACT.to_string()),
                    extension: None,
                },
                cda::TemplateId {
                    root: Some(OID_ALLERGY_PROBLEM_ACT.to_string()),
                    extension: Some("2015-08-01".to_string()),
                },
            ],
            id: map_identifiers(allergy.id.as_deref(), allergy.identifier.as_deref()),
            code: Some(cda::Code {
                code: Some("CONC".to_string()),
                code_system: Some(OID_ACT_CLASS_CODE_SYSTEM.to_string()),
                ..Default::default()
            }),
            text: narrative::text_from_extensions(allergy.extension.as_deref()),
            status_code: Some(code_only(ALLERGY_STATUS_MAPPER.fhir_to_cda_or(
                allergy
                    .clinical_status
                    .as_ref()
                    .and_then(|status| status.first_code()),
                "active",
            ))),
            effective_time: map_effective_period(allergy.recorded_date.as_deref(), None, false),
            author: cx.map_author(
                allergy.recorder.as_ref(),
                allergy.recorded_date.as_deref(),
                false,
            ),
            entry_relationship: Some(vec![cda::EntryRelationship {
                type_code: Some("SUBJ".to_string()),
                observation: Some(vec![intolerance_observation(cx, allergy, reaction)]),
                ..Default::default()
            }]),
            ..Default::default()
        }]),
        ..Default::default()
    }
}

fn intolerance_observation(
    cx: &ReverseContext,
    allergy: &AllergyIntolerance,
    reaction: Option<&AllergyIntoleranceReaction>,
) -> cda::Observation {
    let onset_start = allergy
        .onset_period
        .as_ref()
        .and_then(|p| p.start.as_deref())
        .or(allergy.onset_date_time.as_deref());
    let onset_end = allergy.onset_period.as_ref().and_then(|p| p.end.as_deref());

    cda::Observation {
        class_code: Some("OBS".to_string()),
        mood_code: Some("EVN".to_string()),
        template_id: vec![
            cda::TemplateId { root: Some(OID_ALLERGY_OBSERVATION.to_string()), extension: None },
            cda::TemplateId {
                root: Some(OID_ALLERGY_OBSERVATION.to_string()),
                extension: Some("2014-06-09".to_string()),
            },
        ],
        id: map_identifiers(allergy.id.as_deref(), allergy.identifier.as_deref()),
        code: Some(cda::Code {
            code: Some("ASSERTION".to_string()),
            code_system: Some(OID_ACT_CODE_CODE_SYSTEM.to_string()),
            ..Default::default()
        }),
        text: narrative::text_from_extensions(allergy.extension.as_deref()),
        status_code: Some(code_only("completed")),
        effective_time: map_effective_period(onset_start, onset_end, true),
        value: Some(allergy_category_value(allergy)),
        author: cx.map_author(
            allergy.asserter.as_ref(),
            allergy.recorded_date.as_deref(),
            false,
        ),
        participant: Some(vec![allergen_participant(allergy)]),
        entry_relationship: reaction.map(|reaction| {
            vec![cda::EntryRelationship {
                type_code: Some("MFST".to_string()),
                inversion_ind: Some("true".to_string()),
                observation: Some(vec![reaction_observation(allergy, reaction)]),
                ..Default::default()
            }]
        }),
        ..Default::default()
    }
}

fn allergy_category_value(allergy: &AllergyIntolerance) -> cda::ObservationValue {
    let code = allergy
        .category
        .as_ref()
        .and_then(|categories| categories.first())
        .and_then(|category| ALLERGY_CATEGORY_MAPPER.fhir_to_cda_code(category))
        .unwrap_or_else(|| cda::Code {
            code: Some("419199007".to_string()),
            display_name: Some("Allergy to substance (disorder)".to_string()),
            code_system: Some(OID_SNOMED_CT_CODE_SYSTEM.to_string()),
            code_system_name: Some("SNOMED CT".to_string()),
            ..Default::default()
        });
    cda::ObservationValue::Cd(code)
}

fn allergen_participant(allergy: &AllergyIntolerance) -> cda::Participant {
    let code = if allergy.code.as_ref().and_then(|c| c.first_code()) == Some(NO_KNOWN_ALLERGIES) {
        cda::Code {
            null_flavor: Some("NA".to_string()),
            ..Default::default()
        }
    } else {
        let mut code = map_concept_to_cda_code(allergy.code.as_ref()).unwrap_or_default();
        code.original_text = allergy
            .code
            .as_ref()
            .and_then(|concept| narrative::text_from_extensions(concept.extension.as_deref()));
        code
    };

    cda::Participant {
        type_code: Some("CSM".to_string()),
        participant_role: Some(cda::ParticipantRole {
            class_code: Some("MANU".to_string()),
            playing_entity: Some(cda::PlayingEntity {
                class_code: Some("MMAT".to_string()),
                code: Some(code),
                name: None,
            }),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn reaction_observation(
    allergy: &AllergyIntolerance,
    reaction: &AllergyIntoleranceReaction,
) -> cda::Observation {
    let manifestation = reaction.manifestation.as_ref().and_then(|m| m.first());

    cda::Observation {
        class_code: Some("OBS".to_string()),
        mood_code: Some("EVN".to_string()),
        template_id: vec![
            cda::TemplateId { root: Some(OID_REACTION_OBSERVATION.to_string()), extension: None },
            cda::TemplateId {
                root: Some(OID_REACTION_OBSERVATION.to_string()),
                extension: Some("2014-06-09".to_string()),
            },
        ],
        id: map_identifiers(reaction.id.as_deref(), None),
        code: Some(cda::Code {
            code: Some("ASSERTION".to_string()),
            code_system: Some(OID_ACT_CODE_CODE_SYSTEM.to_string()),
            ..Default::default()
        }),
        text: manifestation
            .and_then(|concept| narrative::text_from_extensions(concept.extension.as_deref())),
        status_code: Some(code_only("completed")),
        effective_time: map_effective_date(
            reaction.onset.as_deref().or(allergy.onset_date_time.as_deref()),
            allergy.onset_period.as_ref(),
        ),
        value: map_concept_to_cda_value(manifestation),
        entry_relationship: severity_relationship(reaction),
        ..Default::default()
    }
}

fn severity_relationship(
    reaction: &AllergyIntoleranceReaction,
) -> Option<Vec<cda::EntryRelationship>> {
    if reaction.severity.is_none() && reaction.extension.is_none() {
        return None;
    }

    Some(vec![cda::EntryRelationship {
        type_code: Some("SUBJ".to_string()),
        inversion_ind: Some("true".to_string()),
        observation: Some(vec![cda::Observation {
            class_code: Some("OBS".to_string()),
            mood_code: Some("EVN".to_string()),
            template_id: vec![
                cda::TemplateId {
                    root: Some(OID_SEVERITY_OBSERVATION.to_string()),
                    extension: None,
                },
                cda::TemplateId {
                    root: Some(OID_SEVERITY_OBSERVATION.to_string()),
                    extension: Some("2014-06-09".to_string()),
                },
            ],
            code: Some(cda::Code {
                code: Some("SEV".to_string()),
                code_system: Some(OID_ACT_CODE_CODE_SYSTEM.to_string()),
                code_system_name: Some("ActCode".to_string()),
                ..Default::default()
            }),
            text: narrative::text_from_extensions(reaction.extension.as_deref()),
            status_code: Some(code_only("completed")),
            value: reaction.severity.as_deref().map(|severity| {
                cda::ObservationValue::Cd(
                    ALLERGY_SEVERITY_MAPPER
                        .fhir_to_cda_code(severity)
                        .unwrap_or_else(|| cda::Code {
                            code: Some(severity.to_string()),
                            ..Default::default()
                        }),
                )
            }),
            ..Default::default()
        }]),
        ..Default::default()
    }])
}
