//! Immunization activity.

use crate::datetime::map_fhir_to_ccda_date;
use crate::fhir_to_ccda::actors::map_identifiers;
use crate::fhir_to_ccda::{code_only, ReverseContext};
use crate::narrative;
use crate::oids::*;
use crate::systems::*;
use crosswalk_cda as cda;
use crosswalk_fhir::Immunization;

pub(crate) fn immunization(cx: &ReverseContext, immunization: &Immunization) -> cda::EntryNode {
    let performers: Vec<cda::Performer> = immunization
        .performer
        .iter()
        .flatten()
        .filter_map(|performer| {
            let assigned_entity = cx.map_assigned_entity(performer.actor.as_ref())?;
            Some(cda::Performer {
                assigned_entity: Some(assigned_entity),
                ..Default::default()
            })
        })
        .collect();

    cda::EntryNode {
        substance_administration: Some(vec![cda::SubstanceAdministration {
            class_code: Some("SBADM".to_string()),
            mood_code: Some("EVN".to_string()),
            negation_ind: Some("false".to_string()),
            template_id: vec![
                cda::TemplateId {
                    root: Some(OID_IMMUNIZATION_ACTIVITY.to_string()),
                    extension: None,
                },
                cda::TemplateId {
                    root: Some(OID_IMMUNIZATION_ACTIVITY.to_string()),
                    extension: Some("2015-08-01".to_string()),
                },
            ],
            id: map_identifiers(immunization.id.as_deref(), immunization.identifier.as_deref()),
            text: narrative::text_from_extensions(immunization.extension.as_deref()),
            status_code: Some(code_only(IMMUNIZATION_STATUS_MAPPER.fhir_to_cda_or(
                immunization.status.as_deref(),
                "completed",
            ))),
            effective_time: Some(vec![cda::EffectiveTime {
                value: map_fhir_to_ccda_date(immunization.occurrence_date_time.as_deref()),
                ..Default::default()
            }]),
            consumable: Some(cda::Consumable {
                type_code: None,
                manufactured_product: Some(vec![cda::ManufacturedProduct {
                    class_code: Some("MANU".to_string()),
                    template_id: Some(vec![
                        cda::TemplateId {
                            root: Some(OID_IMMUNIZATION_MEDICATION_INFORMATION.to_string()),
                            extension: None,
                        },
                        cda::TemplateId {
                            root: Some(OID_IMMUNIZATION_MEDICATION_INFORMATION.to_string()),
                            extension: Some("2014-06-09".to_string()),
                        },
                    ]),
                    manufactured_material: Some(vec![cda::ManufacturedMaterial {
                        code: map_concept_to_cda_code(immunization.vaccine_code.as_ref())
                            .map(|code| vec![code]),
                        lot_number_text: immunization
                            .lot_number
                            .clone()
                            .map(|lot| vec![cda::TextValue::from(lot)]),
                    }]),
                    manufactured_labeled_drug: None,
                    manufacturer_organization: immunization.manufacturer.as_ref().map(
                        |manufacturer| {
                            vec![cda::OrganizationNode {
                                name: manufacturer
                                    .display
                                    .clone()
                                    .map(|name| vec![cda::TextValue::from(name)]),
                                ..Default::default()
                            }]
                        },
                    ),
                }]),
            }),
            performer: if performers.is_empty() { None } else { Some(performers) },
            ..Default::default()
        }]),
        ..Default::default()
    }
}
