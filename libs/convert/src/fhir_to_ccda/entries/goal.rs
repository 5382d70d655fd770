//! Goal observation (goals section) and plan-of-care activity
//! observation (plan of treatment section).

use crate::datetime::map_fhir_to_ccda_date_time;
use crate::fhir_to_ccda::actors::{map_effective_time, map_identifiers};
use crate::fhir_to_ccda::code_only;
use crate::narrative;
use crate::oids::*;
use crate::systems::*;
use crosswalk_cda as cda;
use crosswalk_fhir::{CompositionSection, Goal};

pub(crate) fn goal(section: &CompositionSection, goal: &Goal) -> Option<cda::EntryNode> {
    let section_code = section.code.as_ref().and_then(|code| code.first_code());

    let template_id = match section_code {
        Some(LOINC_PLAN_OF_TREATMENT_SECTION) => vec![cda::TemplateId {
            root: Some(OID_PLAN_OF_CARE_ACTIVITY_OBSERVATION.to_string()),
            extension: None,
        }],
        Some(LOINC_GOALS_SECTION) => vec![cda::TemplateId {
            root: Some(OID_GOAL_OBSERVATION.to_string()),
            extension: None,
        }],
        _ => return None,
    };

    let code = if section_code == Some(LOINC_GOALS_SECTION) {
        Some(cda::Code {
            code: Some(LOINC_OVERALL_GOAL.to_string()),
            display_name: Some(
                "Resident's overall goal established during assessment process".to_string(),
            ),
            code_system: Some(OID_LOINC_CODE_SYSTEM.to_string()),
            code_system_name: Some("LOINC".to_string()),
            ..Default::default()
        })
    } else {
        map_concept_to_cda_code(goal.description.as_ref())
    };
    let code = code?;

    cda::EntryNode {
        observation: Some(vec![cda::Observation {
            class_code: Some("OBS".to_string()),
            mood_code: Some("GOL".to_string()),
            template_id,
            id: map_identifiers(goal.id.as_deref(), goal.identifier.as_deref()),
            code: Some(code),
            text: narrative::text_from_extensions(goal.extension.as_deref()),
            status_code: Some(code_only(lifecycle_status(goal.lifecycle_status.as_deref()))),
            effective_time: map_effective_time(goal.start_date.as_deref(), None),
            value: goal
                .description
                .as_ref()
                .and_then(|description| description.text.clone())
                .map(|text| cda::ObservationValue::St { text: Some(text) }),
            entry_relationship: goal.target.as_ref().map(|targets| {
                targets
                    .iter()
                    .map(|target| cda::EntryRelationship {
                        type_code: Some("RSON".to_string()),
                        inversion_ind: Some("true".to_string()),
                        act: Some(vec![cda::Act {
                            class_code: Some("ACT".to_string()),
                            mood_code: Some("EVN".to_string()),
                            template_id: vec![
                                cda::TemplateId {
                                    root: Some(OID_PROCEDURE_ACTIVITY_ACT.to_string()),
                                    extension: None,
                                },
                                cda::TemplateId {
                                    root: Some(OID_PROCEDURE_ACTIVITY_ACT.to_string()),
                                    extension: Some("2014-06-09".to_string()),
                                },
                            ],
                            code: map_concept_to_cda_code(target.measure.as_ref()),
                            status_code: Some(code_only("completed")),
                            effective_time: target
                                .due_date
                                .as_deref()
                                .or(goal.start_date.as_deref())
                                .map(|date| {
                                    vec![cda::EffectiveTime {
                                        low: Some(cda::TimeStamp {
                                            value: map_fhir_to_ccda_date_time(Some(date)),
                                            null_flavor: None,
                                        }),
                                        ..Default::default()
                                    }]
                                }),
                            ..Default::default()
                        }]),
                        ..Default::default()
                    })
                    .collect()
            }),
            ..Default::default()
        }]),
        ..Default::default()
    }
    .into()
}

pub(crate) fn lifecycle_status(status: Option<&str>) -> &'static str {
    match status {
        Some("achieved") | Some("completed") => "completed",
        Some("cancelled") => "cancelled",
        _ => "active",
    }
}
