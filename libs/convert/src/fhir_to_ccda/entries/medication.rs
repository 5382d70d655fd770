//! Medication activity with validity period, dose timing, manufacturer
//! round-trip and free-text sig.

use crate::fhir_to_ccda::actors::map_effective_date;
use crate::fhir_to_ccda::{code_only, ReverseContext};
use crate::narrative;
use crate::oids::*;
use crate::systems::*;
use crosswalk_cda as cda;
use crosswalk_fhir::{Dosage, MedicationRequest};
use uuid::Uuid;

pub(crate) fn medication(cx: &ReverseContext, med: &MedicationRequest) -> cda::EntryNode {
    // Medication details come from the contained resource when the
    // original carried a manufacturer, from the inline concept otherwise.
    let contained = med.contained_medication();
    let medication_code = contained
        .and_then(|m| m.code.as_ref())
        .or(med.medication_codeable_concept.as_ref());
    let manufacturer = contained.and_then(|m| m.manufacturer.as_ref());
    let dosage = med.dosage_instruction.as_ref().and_then(|d| d.first());

    let mut effective_time: Vec<cda::EffectiveTime> = Vec::new();
    if let Some(validity) = med
        .dispense_request
        .as_ref()
        .and_then(|dispense| dispense.validity_period.as_ref())
    {
        if let Some(times) = map_effective_date(None, Some(validity)) {
            effective_time.extend(times);
        }
    }
    if let Some(repeat) = dosage
        .and_then(|d| d.timing.as_ref())
        .and_then(|timing| timing.repeat.as_ref())
    {
        if let Some(period) = repeat.period {
            effective_time.push(cda::EffectiveTime {
                xsi_type: Some("PIVL_TS".to_string()),
                institution_specified: Some("true".to_string()),
                operator: Some("A".to_string()),
                period: Some(cda::Quantity {
                    value: Some(format_number(period)),
                    unit: repeat.period_unit.clone(),
                    null_flavor: None,
                }),
                ..Default::default()
            });
        }
    }

    cda::EntryNode {
        substance_administration: Some(vec![cda::SubstanceAdministration {
            class_code: Some("SBADM".to_string()),
            mood_code: Some("EVN".to_string()),
            template_id: vec![
                cda::TemplateId {
                    root: Some(OID_MEDICATION_ACTIVITY.to_string()),
                    extension: Some("2014-06-09".to_string()),
                },
                cda::TemplateId {
                    root: Some(OID_MEDICATION_ACTIVITY.to_string()),
                    extension: None,
                },
            ],
            id: Some(vec![cda::InstanceIdentifier {
                root: Some(
                    med.id
                        .clone()
                        .unwrap_or_else(|| Uuid::new_v4().to_string()),
                ),
                ..Default::default()
            }]),
            text: narrative::text_from_extensions(med.extension.as_deref())
                .or_else(|| dosage.and_then(|d| d.text.clone()).map(cda::EntryText::Plain)),
            status_code: Some(code_only(
                MEDICATION_STATUS_MAPPER.fhir_to_cda_or(med.status.as_deref(), "active"),
            )),
            effective_time: if effective_time.is_empty() {
                None
            } else {
                Some(effective_time)
            },
            route_code: dosage.and_then(|d| map_concept_to_cda_code(d.route.as_ref())),
            dose_quantity: dose_quantity(dosage),
            consumable: Some(cda::Consumable {
                type_code: Some("CSM".to_string()),
                manufactured_product: Some(vec![cda::ManufacturedProduct {
                    class_code: Some("MANU".to_string()),
                    template_id: Some(vec![
                        cda::TemplateId {
                            root: Some(OID_MEDICATION_INFORMATION_MANUFACTURED_MATERIAL.to_string()),
                            extension: Some("2014-06-09".to_string()),
                        },
                        cda::TemplateId {
                            root: Some(OID_MEDICATION_INFORMATION_MANUFACTURED_MATERIAL.to_string()),
                            extension: None,
                        },
                    ]),
                    manufactured_material: Some(vec![cda::ManufacturedMaterial {
                        code: map_concept_to_cda_code(medication_code).map(|mut code| {
                            code.original_text = contained.and_then(|medication| {
                                narrative::text_from_extensions(medication.extension.as_deref())
                            });
                            vec![code]
                        }),
                        lot_number_text: None,
                    }]),
                    manufactured_labeled_drug: None,
                    manufacturer_organization: manufacturer.map(|manufacturer| {
                        vec![cda::OrganizationNode {
                            id: manufacturer.identifier.as_ref().and_then(|identifier| {
                                identifier.value.clone().map(|value| {
                                    vec![cda::InstanceIdentifier {
                                        root: Some(value),
                                        ..Default::default()
                                    }]
                                })
                            }),
                            name: manufacturer
                                .display
                                .clone()
                                .map(|name| vec![cda::TextValue::from(name)]),
                            ..Default::default()
                        }]
                    }),
                }]),
            }),
            author: cx.map_author(med.requester.as_ref(), med.authored_on.as_deref(), false),
            entry_relationship: free_text_sig(med),
            ..Default::default()
        }]),
        ..Default::default()
    }
}

fn dose_quantity(dosage: Option<&Dosage>) -> Option<cda::Quantity> {
    let dose = dosage?
        .dose_and_rate
        .as_ref()?
        .first()?
        .dose_quantity
        .as_ref()?;
    Some(cda::Quantity {
        value: dose.value.map(format_number),
        unit: dose.unit.clone(),
        null_flavor: None,
    })
}

/// Dosage instructions with a narrative anchor become nested free-text
/// sig administrations.
fn free_text_sig(med: &MedicationRequest) -> Option<Vec<cda::EntryRelationship>> {
    let relationships: Vec<cda::EntryRelationship> = med
        .dosage_instruction
        .iter()
        .flatten()
        .filter(|dosage| dosage.extension.is_some())
        .map(|dosage| cda::EntryRelationship {
            type_code: Some("COMP".to_string()),
            substance_administration: Some(vec![cda::SubstanceAdministration {
                class_code: Some("SBADM".to_string()),
                mood_code: Some("EVN".to_string()),
                template_id: vec![cda::TemplateId {
                    root: Some(OID_MEDICATION_FREE_TEXT_SIG.to_string()),
                    extension: None,
                }],
                code: Some(cda::Code {
                    code: Some(LOINC_MEDICATION_INSTRUCTIONS.to_string()),
                    display_name: Some("Medication Instructions".to_string()),
                    code_system: Some(OID_LOINC_CODE_SYSTEM.to_string()),
                    code_system_name: Some("LOINC".to_string()),
                    ..Default::default()
                }),
                text: narrative::text_from_extensions(dosage.extension.as_deref()),
                consumable: Some(cda::Consumable {
                    type_code: None,
                    manufactured_product: Some(vec![cda::ManufacturedProduct {
                        manufactured_labeled_drug: Some(vec![cda::ManufacturedLabeledDrug {
                            null_flavor: Some("NA".to_string()),
                        }]),
                        ..Default::default()
                    }]),
                }),
                ..Default::default()
            }]),
            ..Default::default()
        })
        .collect();

    if relationships.is_empty() {
        None
    } else {
        Some(relationships)
    }
}

/// Render without a trailing `.0` so whole numbers survive the round
/// trip byte-identically.
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}
