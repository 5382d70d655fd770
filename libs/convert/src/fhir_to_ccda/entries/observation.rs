//! Clinical observations: a grouping observation renders as an
//! organizer, a leaf observation as a single `<observation>` element.

use crate::datetime::map_fhir_to_ccda_date_time;
use crate::fhir_to_ccda::actors::map_identifiers;
use crate::fhir_to_ccda::{code_only, ReverseContext};
use crate::narrative;
use crate::oids::*;
use crate::systems::*;
use crosswalk_cda as cda;
use crosswalk_fhir::{
    Observation, ObservationComponent, ObservationReferenceRange, Resource,
};

pub(crate) fn observation(cx: &ReverseContext, observation: &Observation) -> cda::EntryNode {
    if observation.has_member.is_some() {
        cda::EntryNode {
            organizer: Some(vec![organizer(cx, observation)]),
            ..Default::default()
        }
    } else {
        cda::EntryNode {
            observation: Some(vec![leaf_observation(cx, observation)]),
            ..Default::default()
        }
    }
}

fn organizer(cx: &ReverseContext, observation: &Observation) -> cda::Organizer {
    let mut components = Vec::new();
    for member in observation.has_member.iter().flatten() {
        let Some(Resource::Observation(child)) = cx.bundle.resolve(Some(member)) else {
            continue;
        };
        if let Some(child_components) = &child.component {
            for component in child_components {
                components.push(cda::OrganizerComponent {
                    observation: Some(vec![component_observation(cx, child, component)]),
                    ..Default::default()
                });
            }
        } else {
            components.push(cda::OrganizerComponent {
                observation: Some(vec![leaf_observation(cx, child)]),
                ..Default::default()
            });
        }
    }

    let template_root = match category_code(observation) {
        Some("laboratory") => OID_RESULT_ORGANIZER,
        _ => OID_VITAL_SIGNS_ORGANIZER,
    };

    cda::Organizer {
        class_code: Some("CLUSTER".to_string()),
        mood_code: Some("EVN".to_string()),
        template_id: vec![
            cda::TemplateId { root: Some(template_root.to_string()), extension: None },
            cda::TemplateId {
                root: Some(template_root.to_string()),
                extension: Some("2015-08-01".to_string()),
            },
        ],
        id: map_identifiers(observation.id.as_deref(), observation.identifier.as_deref()),
        code: map_concept_to_cda_code(observation.code.as_ref()),
        status_code: Some(code_only("completed")),
        effective_time: observation.effective_date_time.as_deref().map(|time| {
            vec![cda::EffectiveTime {
                value: map_fhir_to_ccda_date_time(Some(time)),
                ..Default::default()
            }]
        }),
        component: components,
    }
}

pub(crate) fn leaf_observation(cx: &ReverseContext, observation: &Observation) -> cda::Observation {
    cda::Observation {
        class_code: Some("OBS".to_string()),
        mood_code: Some("EVN".to_string()),
        template_id: observation_template_ids(observation),
        id: map_identifiers(observation.id.as_deref(), observation.identifier.as_deref()),
        code: map_concept_to_cda_code(observation.code.as_ref()),
        text: narrative::text_from_extensions(observation.extension.as_deref()),
        status_code: Some(code_only("completed")),
        effective_time: observation.effective_date_time.as_deref().map(|time| {
            vec![cda::EffectiveTime {
                value: map_fhir_to_ccda_date_time(Some(time)),
                ..Default::default()
            }]
        }),
        value: observation_value(observation),
        reference_range: reference_ranges(observation.reference_range.as_deref()),
        author: cx.map_author(
            observation.performer.as_ref().and_then(|p| p.first()),
            observation.effective_date_time.as_deref(),
            false,
        ),
        ..Default::default()
    }
}

fn component_observation(
    cx: &ReverseContext,
    parent: &Observation,
    component: &ObservationComponent,
) -> cda::Observation {
    cda::Observation {
        class_code: Some("OBS".to_string()),
        mood_code: Some("EVN".to_string()),
        template_id: observation_template_ids(parent),
        id: map_identifiers(parent.id.as_deref(), parent.identifier.as_deref()),
        code: map_concept_to_cda_code(component.code.as_ref()),
        text: narrative::text_from_extensions(component.extension.as_deref()),
        status_code: Some(code_only("completed")),
        effective_time: parent.effective_date_time.as_deref().map(|time| {
            vec![cda::EffectiveTime {
                value: map_fhir_to_ccda_date_time(Some(time)),
                ..Default::default()
            }]
        }),
        value: component_value(component),
        reference_range: reference_ranges(component.reference_range.as_deref()),
        author: cx.map_author(
            parent.performer.as_ref().and_then(|p| p.first()),
            parent.effective_date_time.as_deref(),
            false,
        ),
        ..Default::default()
    }
}

fn category_code(observation: &Observation) -> Option<&str> {
    observation
        .category
        .as_ref()?
        .first()?
        .first_code()
}

/// Template selection: specific social-history templates by code, then
/// category-driven templates, then the vital-sign default.
fn observation_template_ids(observation: &Observation) -> Vec<cda::TemplateId> {
    let code = observation.code.as_ref().and_then(|code| code.first_code());

    let specs: &[(&str, Option<&str>)] = match code {
        Some(LOINC_TOBACCO_SMOKING_STATUS) => &[
            (OID_SMOKING_STATUS_OBSERVATION, None),
            (OID_SMOKING_STATUS_OBSERVATION, Some("2014-06-09")),
        ],
        Some(LOINC_HISTORY_OF_TOBACCO_USE) => &[
            (OID_TOBACCO_USE_OBSERVATION, None),
            (OID_TOBACCO_USE_OBSERVATION, Some("2014-06-09")),
        ],
        Some(LOINC_ADMINISTRATIVE_SEX) => &[(OID_SEX_OBSERVATION, Some("2023-06-28"))],
        Some(LOINC_BIRTH_SEX) => &[(OID_BIRTH_SEX, None), (OID_BIRTH_SEX, Some("2016-06-01"))],
        _ => match category_code(observation) {
            Some("exam") => &[
                (OID_PROCEDURE_ACTIVITY_OBSERVATION, None),
                (OID_PROCEDURE_ACTIVITY_OBSERVATION, Some("2014-06-09")),
            ],
            Some("laboratory") => &[
                (OID_RESULT_OBSERVATION, None),
                (OID_RESULT_OBSERVATION, Some("2015-08-01")),
            ],
            _ => &[
                (OID_VITAL_SIGNS_OBSERVATION, None),
                (OID_VITAL_SIGNS_OBSERVATION, Some("2014-06-09")),
            ],
        },
    };

    specs
        .iter()
        .map(|(root, extension)| cda::TemplateId {
            root: Some(root.to_string()),
            extension: extension.map(str::to_string),
        })
        .collect()
}

fn observation_value(observation: &Observation) -> Option<cda::ObservationValue> {
    if let Some(quantity) = &observation.value_quantity {
        return Some(cda::ObservationValue::Pq(cda::Quantity {
            value: quantity.value.map(format_number),
            unit: quantity.unit.clone(),
            null_flavor: None,
        }));
    }
    if let Some(concept) = &observation.value_codeable_concept {
        return map_concept_to_cda_value(Some(concept));
    }
    if let Some(text) = &observation.value_string {
        return Some(cda::ObservationValue::St { text: Some(text.clone()) });
    }
    if let Some(value) = observation.value_integer {
        return Some(cda::ObservationValue::Int { value: Some(value.to_string()) });
    }
    None
}

fn component_value(component: &ObservationComponent) -> Option<cda::ObservationValue> {
    if let Some(quantity) = &component.value_quantity {
        return Some(cda::ObservationValue::Pq(cda::Quantity {
            value: quantity.value.map(format_number),
            unit: quantity.unit.clone(),
            null_flavor: None,
        }));
    }
    if let Some(concept) = &component.value_codeable_concept {
        return map_concept_to_cda_value(Some(concept));
    }
    component
        .value_string
        .as_ref()
        .map(|text| cda::ObservationValue::St { text: Some(text.clone()) })
}

fn reference_ranges(
    ranges: Option<&[ObservationReferenceRange]>,
) -> Option<Vec<cda::ReferenceRange>> {
    let ranges = ranges?;
    if ranges.is_empty() {
        return None;
    }
    Some(
        ranges
            .iter()
            .map(|range| {
                // A narrative-backed range points both its text and its
                // ED value at the same anchor.
                let anchor = narrative::narrative_reference(range.extension.as_deref());
                cda::ReferenceRange {
                    observation_range: Some(cda::ObservationRange {
                        text: narrative::text_from_extensions(range.extension.as_deref()).or_else(
                            || range.text.clone().map(cda::EntryText::Plain),
                        ),
                        value: anchor.map(|anchor| cda::ObservationValue::Ed {
                            reference: Some(cda::ReferenceValue {
                                value: Some(anchor),
                                null_flavor: None,
                            }),
                        }),
                    }),
                }
            })
            .collect(),
    )
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}
