//! Problem concern act and health concern act.
//!
//! The same Condition resource renders differently depending on the
//! hosting section: a full concern act with a nested problem observation
//! in the problems section, a flat health concern act in the health
//! concerns section.

use crate::datetime::{map_fhir_to_ccda_date, map_fhir_to_ccda_date_time};
use crate::fhir_to_ccda::actors::{map_effective_period, map_identifiers};
use crate::fhir_to_ccda::{code_only, ReverseContext};
use crate::narrative;
use crate::oids::*;
use crate::systems::*;
use crosswalk_cda as cda;
use crosswalk_fhir::{CompositionSection, Condition};
use uuid::Uuid;

pub(crate) fn condition(
    cx: &ReverseContext,
    section: &CompositionSection,
    condition: &Condition,
) -> Option<cda::EntryNode> {
    match section.code.as_ref().and_then(|code| code.first_code()) {
        Some(LOINC_PROBLEMS_SECTION) => Some(problem_entry(cx, condition)),
        Some(LOINC_HEALTH_CONCERNS_SECTION) => Some(health_concern_entry(condition)),
        _ => None,
    }
}

fn problem_entry(cx: &ReverseContext, problem: &Condition) -> cda::EntryNode {
    cda::EntryNode {
        act: Some(vec![cda::Act {
            class_code: Some("ACT".to_string()),
            mood_code: Some("EVN".to_string()),
            template_id: vec![
                cda::TemplateId { root: Some(OID_PROBLEM_ACT.to_string()), extension: None },
                cda::TemplateId {
                    root: Some(OID_PROBLEM_ACT.to_string()),
                    extension: Some("2015-08-01".to_string()),
                },
            ],
            id: map_identifiers(problem.id.as_deref(), None),
            code: Some(cda::Code {
                code: Some("CONC".to_string()),
                code_system: Some(OID_ACT_CLASS_CODE_SYSTEM.to_string()),
                ..Default::default()
            }),
            status_code: Some(code_only(PROBLEM_STATUS_MAPPER.fhir_to_cda_or(
                problem
                    .clinical_status
                    .as_ref()
                    .and_then(|status| status.first_code()),
                "active",
            ))),
            effective_time: map_effective_period(problem.recorded_date.as_deref(), None, false),
            entry_relationship: Some(vec![cda::EntryRelationship {
                type_code: Some("SUBJ".to_string()),
                observation: Some(vec![problem_observation(cx, problem)]),
                ..Default::default()
            }]),
            ..Default::default()
        }]),
        ..Default::default()
    }
}

fn problem_observation(cx: &ReverseContext, problem: &Condition) -> cda::Observation {
    cda::Observation {
        class_code: Some("OBS".to_string()),
        mood_code: Some("EVN".to_string()),
        template_id: vec![
            cda::TemplateId { root: Some(OID_PROBLEM_OBSERVATION.to_string()), extension: None },
            cda::TemplateId {
                root: Some(OID_PROBLEM_OBSERVATION.to_string()),
                extension: Some("2015-08-01".to_string()),
            },
        ],
        id: match &problem.identifier {
            Some(identifiers) => map_identifiers(None, Some(identifiers)),
            None => Some(vec![cda::InstanceIdentifier {
                root: Some(Uuid::new_v4().to_string()),
                ..Default::default()
            }]),
        },
        text: narrative::text_from_extensions(problem.extension.as_deref()),
        code: Some(cda::Code {
            code: Some("55607006".to_string()),
            display_name: Some("Problem".to_string()),
            code_system: Some(OID_SNOMED_CT_CODE_SYSTEM.to_string()),
            code_system_name: Some("SNOMED CT".to_string()),
            translation: Some(vec![cda::Code {
                code: Some(LOINC_CONDITION.to_string()),
                display_name: Some("Condition".to_string()),
                code_system: Some(OID_LOINC_CODE_SYSTEM.to_string()),
                code_system_name: Some("LOINC".to_string()),
                ..Default::default()
            }]),
            ..Default::default()
        }),
        status_code: Some(code_only("completed")),
        effective_time: Some(vec![cda::EffectiveTime {
            low: problem.onset_date_time.as_deref().map(|onset| cda::TimeStamp {
                value: map_fhir_to_ccda_date(Some(onset)),
                null_flavor: None,
            }),
            high: problem
                .abatement_date_time
                .as_deref()
                .map(|abatement| cda::TimeStamp {
                    value: map_fhir_to_ccda_date_time(Some(abatement)),
                    null_flavor: None,
                }),
            ..Default::default()
        }]),
        value: map_concept_to_cda_value(problem.code.as_ref()),
        author: cx.map_author(problem.asserter.as_ref(), problem.recorded_date.as_deref(), false),
        ..Default::default()
    }
}

fn health_concern_entry(problem: &Condition) -> cda::EntryNode {
    cda::EntryNode {
        act: Some(vec![cda::Act {
            class_code: Some("ACT".to_string()),
            mood_code: Some("EVN".to_string()),
            template_id: vec![
                cda::TemplateId {
                    root: Some(OID_HEALTH_CONCERN_ACT.to_string()),
                    extension: Some("2015-08-01".to_string()),
                },
                cda::TemplateId {
                    root: Some(OID_HEALTH_CONCERN_ACT.to_string()),
                    extension: Some("2022-06-01".to_string()),
                },
            ],
            id: map_identifiers(problem.id.as_deref(), None),
            code: Some(cda::Code {
                code: Some(LOINC_HEALTH_CONCERNS_SECTION.to_string()),
                display_name: Some("Health Concern".to_string()),
                code_system: Some(OID_LOINC_CODE_SYSTEM.to_string()),
                code_system_name: Some("LOINC".to_string()),
                ..Default::default()
            }),
            status_code: Some(code_only(PROBLEM_STATUS_MAPPER.fhir_to_cda_or(
                problem
                    .clinical_status
                    .as_ref()
                    .and_then(|status| status.first_code()),
                "active",
            ))),
            effective_time: map_effective_period(problem.recorded_date.as_deref(), None, false),
            ..Default::default()
        }]),
        ..Default::default()
    }
}
