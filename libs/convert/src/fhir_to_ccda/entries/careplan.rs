//! Plan-of-treatment instruction act for completed care plans.

use crate::fhir_to_ccda::actors::map_identifiers;
use crate::fhir_to_ccda::{code_only, ReverseContext};
use crate::narrative;
use crate::oids::OID_INSTRUCTIONS;
use crate::systems::map_concept_to_cda_code;
use crosswalk_cda as cda;
use crosswalk_fhir::CarePlan;

pub(crate) fn care_plan(_cx: &ReverseContext, care_plan: &CarePlan) -> Option<cda::EntryNode> {
    if care_plan.status.as_deref() != Some("completed") {
        return None;
    }

    Some(cda::EntryNode {
        act: Some(vec![cda::Act {
            class_code: Some("ACT".to_string()),
            mood_code: Some("INT".to_string()),
            template_id: vec![cda::TemplateId {
                root: Some(OID_INSTRUCTIONS.to_string()),
                extension: None,
            }],
            id: map_identifiers(care_plan.id.as_deref(), care_plan.identifier.as_deref()),
            code: map_concept_to_cda_code(
                care_plan.category.as_ref().and_then(|c| c.first()),
            ),
            text: care_plan
                .description
                .clone()
                .map(cda::EntryText::Plain)
                .or_else(|| narrative::text_from_extensions(care_plan.extension.as_deref())),
            status_code: care_plan.status.as_deref().map(code_only),
            ..Default::default()
        }]),
        ..Default::default()
    })
}
