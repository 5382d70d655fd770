//! History of procedures.
//!
//! A `<procedure>` represents a direct intervention that changes the
//! patient's physical state; an `<act>` covers broader interactions
//! (counseling, education, referrals, social services) that do not.
//! The same Procedure resource renders as one or the other based on its
//! code.

use crate::fhir_to_ccda::actors::{map_effective_time, map_identifiers};
use crate::fhir_to_ccda::{code_only, ReverseContext};
use crate::narrative;
use crate::oids::*;
use crate::systems::map_concept_to_cda_code;
use crosswalk_cda as cda;
use crosswalk_fhir::{Procedure, Reference, Resource};

/// Procedure codes that carry act semantics in the document format.
const ACT_CODES: &[&str] = &[
    // Counseling and education
    "183948003", // Patient education
    "409063005", // Counseling
    "311331002", // Patient counseling
    "61310001",  // Nutrition education
    // Care management
    "183945009", // Referral to specialist
    "309814009", // Discharge planning
    "278373008", // Home visit
    // Social services
    "410606002", // Social service procedure
    "183933003", // Social work assessment
    // Other non-surgical services
    "24642003",  // Psychiatry procedure or service
    "225338006", // Physiotherapy procedure
    "128939004", // First aid
];

pub(crate) fn procedure(cx: &ReverseContext, procedure: &Procedure) -> cda::EntryNode {
    let code = procedure.code.as_ref().and_then(|code| code.first_code());
    if code.is_some_and(|code| ACT_CODES.contains(&code)) {
        act_entry(procedure)
    } else {
        procedure_entry(cx, procedure)
    }
}

fn act_entry(procedure: &Procedure) -> cda::EntryNode {
    cda::EntryNode {
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
            id: map_identifiers(procedure.id.as_deref(), procedure.identifier.as_deref()),
            code: map_concept_to_cda_code(procedure.code.as_ref()),
            text: narrative::text_from_extensions(procedure.extension.as_deref()),
            status_code: Some(code_only("completed")),
            effective_time: map_effective_time(
                procedure.performed_date_time.as_deref(),
                procedure.performed_period.as_ref(),
            ),
            ..Default::default()
        }]),
        ..Default::default()
    }
}

fn procedure_entry(cx: &ReverseContext, procedure: &Procedure) -> cda::EntryNode {
    let location = location_participant(cx, procedure.location.as_ref());

    cda::EntryNode {
        procedure: Some(vec![cda::Procedure {
            class_code: Some("PROC".to_string()),
            mood_code: Some("EVN".to_string()),
            template_id: vec![
                cda::TemplateId {
                    root: Some(OID_PROCEDURE_ACTIVITY_PROCEDURE.to_string()),
                    extension: None,
                },
                cda::TemplateId {
                    root: Some(OID_PROCEDURE_ACTIVITY_PROCEDURE.to_string()),
                    extension: Some("2014-06-09".to_string()),
                },
            ],
            id: map_identifiers(procedure.id.as_deref(), procedure.identifier.as_deref()),
            code: map_concept_to_cda_code(procedure.code.as_ref()),
            text: narrative::text_from_extensions(procedure.extension.as_deref()),
            status_code: Some(code_only("completed")),
            effective_time: map_effective_time(
                procedure.performed_date_time.as_deref(),
                procedure.performed_period.as_ref(),
            ),
            target_site_code: map_concept_to_cda_code(
                procedure.body_site.as_ref().and_then(|sites| sites.first()),
            ),
            participant: location.map(|participant| vec![participant]),
            ..Default::default()
        }]),
        ..Default::default()
    }
}

fn location_participant(
    cx: &ReverseContext,
    reference: Option<&Reference>,
) -> Option<cda::Participant> {
    let Resource::Location(location) = cx.bundle.resolve(reference)? else {
        return None;
    };

    Some(cda::Participant {
        type_code: Some("LOC".to_string()),
        participant_role: Some(cda::ParticipantRole {
            class_code: Some("SDLOC".to_string()),
            template_id: Some(vec![cda::TemplateId {
                root: Some(OID_ENCOUNTER_LOCATION.to_string()),
                extension: None,
            }]),
            id: map_identifiers(location.id.as_deref(), location.identifier.as_deref()),
            code: map_concept_to_cda_code(location.type_.as_ref().and_then(|t| t.first())),
            playing_entity: Some(cda::PlayingEntity {
                class_code: Some("PLC".to_string()),
                code: None,
                name: location
                    .name
                    .clone()
                    .map(|name| vec![cda::TextValue::from(name)]),
            }),
            ..Default::default()
        }),
        ..Default::default()
    })
}
