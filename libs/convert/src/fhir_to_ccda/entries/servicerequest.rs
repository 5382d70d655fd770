//! Plan-of-care activity observation for pending service requests.

use crate::fhir_to_ccda::actors::{map_effective_time, map_identifiers};
use crate::fhir_to_ccda::{code_only, ReverseContext};
use crate::narrative;
use crate::oids::OID_PLAN_OF_CARE_ACTIVITY_OBSERVATION;
use crate::systems::map_concept_to_cda_code;
use crosswalk_cda as cda;
use crosswalk_fhir::ServiceRequest;

use super::goal::lifecycle_status;

pub(crate) fn service_request(_cx: &ReverseContext, request: &ServiceRequest) -> cda::EntryNode {
    cda::EntryNode {
        observation: Some(vec![cda::Observation {
            class_code: Some("OBS".to_string()),
            mood_code: Some("RQO".to_string()),
            template_id: vec![cda::TemplateId {
                root: Some(OID_PLAN_OF_CARE_ACTIVITY_OBSERVATION.to_string()),
                extension: None,
            }],
            id: map_identifiers(request.id.as_deref(), request.identifier.as_deref()),
            code: map_concept_to_cda_code(request.code.as_ref()),
            text: narrative::text_from_extensions(request.extension.as_deref()),
            status_code: Some(code_only(lifecycle_status(request.status.as_deref()))),
            effective_time: map_effective_time(request.occurrence_date_time.as_deref(), None),
            ..Default::default()
        }]),
        ..Default::default()
    }
}
