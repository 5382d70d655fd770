//! Care team organizer with one performer act per participant.
//!
//! The member shape mirrors what the forward direction reads back:
//! `component/act/performer` with a function code and assigned entity.

use crate::fhir_to_ccda::actors::{map_effective_period, map_identifiers};
use crate::fhir_to_ccda::{code_only, ReverseContext};
use crate::oids::OID_CARE_TEAM_ORGANIZER_ENTRY;
use crate::systems::map_concept_to_cda_code;
use crosswalk_cda as cda;
use crosswalk_fhir::{CareTeam, CareTeamParticipant};

pub(crate) fn care_team(cx: &ReverseContext, care_team: &CareTeam) -> cda::EntryNode {
    let components: Vec<cda::OrganizerComponent> = care_team
        .participant
        .iter()
        .flatten()
        .filter_map(|participant| member_component(cx, participant))
        .collect();

    cda::EntryNode {
        organizer: Some(vec![cda::Organizer {
            class_code: Some("CLUSTER".to_string()),
            mood_code: Some("EVN".to_string()),
            template_id: vec![
                cda::TemplateId {
                    root: Some(OID_CARE_TEAM_ORGANIZER_ENTRY.to_string()),
                    extension: Some("2022-07-01".to_string()),
                },
                cda::TemplateId {
                    root: Some(OID_CARE_TEAM_ORGANIZER_ENTRY.to_string()),
                    extension: Some("2022-06-01".to_string()),
                },
            ],
            id: map_identifiers(care_team.id.as_deref(), care_team.identifier.as_deref()),
            status_code: Some(code_only("active")),
            component: components,
            ..Default::default()
        }]),
        ..Default::default()
    }
}

fn member_component(
    cx: &ReverseContext,
    participant: &CareTeamParticipant,
) -> Option<cda::OrganizerComponent> {
    let assigned_entity = cx.map_assigned_entity(participant.member.as_ref())?;

    Some(cda::OrganizerComponent {
        type_code: Some("PRF".to_string()),
        act: Some(vec![cda::Act {
            class_code: Some("PCPR".to_string()),
            mood_code: Some("EVN".to_string()),
            effective_time: participant.period.as_ref().and_then(|period| {
                map_effective_period(period.start.as_deref(), period.end.as_deref(), false)
            }),
            performer: Some(vec![cda::Performer {
                type_code: Some("PRF".to_string()),
                function_code: map_concept_to_cda_code(
                    participant.role.as_ref().and_then(|roles| roles.first()),
                ),
                assigned_entity: Some(assigned_entity),
                ..Default::default()
            }]),
            ..Default::default()
        }]),
        ..Default::default()
    })
}
