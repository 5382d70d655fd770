//! QRDA Category I generation.
//!
//! A forward-only consumer of the conversion primitives: given clinical
//! resources already extracted by the forward converter, it assembles
//! the fixed regulator-defined document shape — US realm header, measure
//! section, reporting-parameters section, and a patient-data section
//! with exactly one entry per encounter, intervention, procedure and
//! coverage. Nothing is omitted silently.

use crate::datetime::map_fhir_to_ccda_date_time;
use crate::error::ConvertError;
use crate::fhir_to_ccda::actors::{record_target, RecordTargetConfig};
use crate::oids::*;
use crate::systems::*;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use crosswalk_fhir::{
    Attachment, CodeableConcept, Coding, Condition, Coverage, DocumentReference,
    DocumentReferenceContent, Encounter, Patient, Procedure, Resource,
};
use serde_json::{json, Value};
use uuid::Uuid;

/// QRDA reporting authority for patient and report identifiers.
const QRDA_ASSIGNING_AUTHORITY: &str = "1.3.6.1.4.1.115";

/// Intervention procedures carry the SNOMED counseling category.
const CATEGORY_COUNSELING: &str = "409063005";
/// Diagnostic procedures carry the SNOMED diagnostic-procedure category.
const CATEGORY_DIAGNOSTIC: &str = "103693007";

#[derive(Debug, Clone)]
pub struct QrdaParams {
    pub patient_id: String,
    pub measure_period_start: String,
    pub measure_period_end: String,
}

/// One encounter fact: the encounter plus its first ranked diagnosis.
#[derive(Debug, Clone, Copy)]
pub struct QrdaEncounter<'a> {
    pub encounter: &'a Encounter,
    pub diagnosis: Option<&'a Condition>,
    pub rank: Option<u32>,
}

/// Already-extracted clinical data feeding one report.
#[derive(Debug, Default)]
pub struct QrdaInput<'a> {
    pub patient: Option<&'a Patient>,
    pub encounters: Vec<QrdaEncounter<'a>>,
    pub interventions: Vec<&'a Procedure>,
    pub procedures: Vec<&'a Procedure>,
    pub coverages: Vec<&'a Coverage>,
}

impl<'a> QrdaInput<'a> {
    /// Collect qualifying resources from a produced resource set.
    /// Interventions and diagnostic procedures are told apart by their
    /// category coding; encounter diagnoses resolve within the set.
    pub fn collect(resources: &'a [Resource]) -> QrdaInput<'a> {
        let mut input = QrdaInput::default();

        for resource in resources {
            match resource {
                Resource::Patient(patient) => {
                    input.patient.get_or_insert(patient);
                }
                Resource::Encounter(encounter) => {
                    let diagnosis = encounter.diagnosis.as_ref().and_then(|d| d.first());
                    let condition = diagnosis
                        .and_then(|d| d.condition.as_ref())
                        .and_then(|r| r.reference.as_deref())
                        .and_then(|reference| {
                            resources.iter().find_map(|candidate| match candidate {
                                Resource::Condition(condition)
                                    if candidate.local_reference().as_deref()
                                        == Some(reference) =>
                                {
                                    Some(condition)
                                }
                                _ => None,
                            })
                        });
                    input.encounters.push(QrdaEncounter {
                        encounter,
                        diagnosis: condition,
                        rank: diagnosis.and_then(|d| d.rank),
                    });
                }
                Resource::Procedure(procedure) => {
                    match procedure.category.as_ref().and_then(|c| c.first_code()) {
                        Some(CATEGORY_COUNSELING) => input.interventions.push(procedure),
                        Some(CATEGORY_DIAGNOSTIC) => input.procedures.push(procedure),
                        _ => {}
                    }
                }
                Resource::Coverage(coverage) => input.coverages.push(coverage),
                _ => {}
            }
        }

        input
    }

    fn has_clinical_data(&self) -> bool {
        !(self.encounters.is_empty()
            && self.interventions.is_empty()
            && self.procedures.is_empty()
            && self.coverages.is_empty())
    }
}

/// Build the QRDA attachment for a produced resource set. No qualifying
/// clinical data yields no report, which is not an error.
pub(crate) fn build_qrda_document_reference(
    resources: &[Resource],
    params: &QrdaParams,
) -> Result<Option<DocumentReference>, ConvertError> {
    let input = QrdaInput::collect(resources);
    let Some(patient) = input.patient else {
        return Ok(None);
    };
    if !input.has_clinical_data() {
        return Ok(None);
    }

    let xml = build_qrda_xml(&input, params)?;
    let report_type = CodeableConcept {
        coding: Some(vec![Coding {
            system: Some(LOINC.to_string()),
            code: Some(LOINC_QUALITY_MEASURE_REPORT.to_string()),
            display: Some("Quality Measure Report".to_string()),
        }]),
        ..Default::default()
    };

    Ok(Some(DocumentReference {
        id: Some(Uuid::new_v4().to_string()),
        status: Some("current".to_string()),
        type_: Some(report_type.clone()),
        category: Some(vec![report_type]),
        subject: patient
            .id
            .as_deref()
            .map(|id| crosswalk_fhir::Reference::local("Patient", id)),
        content: Some(vec![DocumentReferenceContent {
            attachment: Some(Attachment {
                content_type: Some("application/xml".to_string()),
                data: Some(BASE64.encode(xml.as_bytes())),
                title: Some("QRDA Incidence Report".to_string()),
            }),
        }]),
    }))
}

/// Serialize a QRDA document tree for the given input.
pub fn build_qrda_xml(input: &QrdaInput, params: &QrdaParams) -> Result<String, ConvertError> {
    let patient = input
        .patient
        .ok_or(ConvertError::InvalidQrdaParams("patient required"))?;
    let tree = build_qrda(patient, input, params)?;
    let mut document = serde_json::Map::new();
    document.insert("ClinicalDocument".to_string(), tree);
    Ok(crosswalk_format::write_document(&Value::Object(document))?)
}

fn build_qrda(
    patient: &Patient,
    input: &QrdaInput,
    params: &QrdaParams,
) -> Result<Value, ConvertError> {
    let record_target = serde_json::to_value(record_target(
        patient,
        RecordTargetConfig {
            assigning_authority: Some(QRDA_ASSIGNING_AUTHORITY),
        },
    ))?;

    let mut entries = Vec::new();
    for encounter in &input.encounters {
        entries.push(encounter_entry(encounter));
    }
    for intervention in &input.interventions {
        entries.push(intervention_entry(intervention));
    }
    for procedure in &input.procedures {
        entries.push(procedure_entry(procedure));
    }
    for coverage in &input.coverages {
        entries.push(payer_entry(coverage));
    }

    // Element order is enforced by the QRDA schema.
    Ok(json!({
        "@_xmlns": crosswalk_cda::CDA_NS,
        "@_xmlns:xsi": crosswalk_cda::XSI_NS,
        "realmCode": { "@_code": "US" },
        "typeId": { "@_root": OID_HL7_REGISTERED_MODELS, "@_extension": "POCD_HD000040" },
        "templateId": [
            { "@_root": OID_US_REALM_HEADER, "@_extension": "2015-08-01" },
            { "@_root": OID_QRDA_CATEGORY_I_FRAMEWORK, "@_extension": "2017-08-01" },
            { "@_root": OID_QRDA_QDM_BASED, "@_extension": "2021-08-01" },
        ],
        "id": { "@_root": QRDA_ASSIGNING_AUTHORITY, "@_extension": params.patient_id },
        "code": {
            "@_code": LOINC_QUALITY_MEASURE_REPORT,
            "@_codeSystem": OID_LOINC_CODE_SYSTEM,
            "@_codeSystemName": "LOINC",
            "@_displayName": "Quality Measure Report",
        },
        "title": "QRDA Incidence Report",
        "effectiveTime": { "@_value": now_hl7() },
        "confidentialityCode": { "@_code": "N", "@_codeSystem": OID_CONFIDENTIALITY_VALUE_SET },
        "languageCode": { "@_code": "en-US" },
        "recordTarget": record_target,
        "author": {
            "time": { "@_value": now_hl7() },
            "assignedAuthor": {
                "id": { "@_nullFlavor": "NA" },
                "assignedAuthoringDevice": {
                    "manufacturerModelName": "Crosswalk",
                    "softwareName": "Crosswalk QRDA Generator",
                },
            },
        },
        "custodian": {
            "assignedCustodian": {
                "representedCustodianOrganization": { "id": { "@_nullFlavor": "NA" } },
            },
        },
        "documentationOf": {
            "@_typeCode": "DOC",
            "serviceEvent": {
                "@_classCode": "PCPR",
                "effectiveTime": {
                    "low": { "@_value": hl7(&params.measure_period_start) },
                    "high": { "@_value": hl7(&params.measure_period_end) },
                },
            },
        },
        "component": {
            "structuredBody": {
                "component": [
                    measure_section(),
                    reporting_parameters_section(params),
                    patient_data_section(entries),
                ],
            },
        },
    }))
}

fn now_hl7() -> String {
    chrono::Utc::now().format("%Y%m%d%H%M%S").to_string()
}

fn hl7(value: &str) -> String {
    map_fhir_to_ccda_date_time(Some(value)).unwrap_or_default()
}

fn measure_section() -> Value {
    json!({
        "section": {
            "templateId": [
                { "@_root": OID_MEASURE_SECTION },
                { "@_root": OID_MEASURE_SECTION_QDM },
            ],
            "code": { "@_code": LOINC_MEASURE_DOCUMENT, "@_codeSystem": OID_LOINC_CODE_SYSTEM },
            "title": "Measure Section",
            "text": "",
            "entry": {
                "organizer": {
                    "@_classCode": "CLUSTER",
                    "@_moodCode": "EVN",
                    "templateId": [
                        { "@_root": OID_MEASURE_REFERENCE },
                        { "@_root": OID_EMEASURE_REFERENCE_QDM },
                    ],
                    "id": { "@_root": Uuid::new_v4().to_string() },
                    "statusCode": { "@_code": "completed" },
                }
            },
        }
    })
}

fn reporting_parameters_section(params: &QrdaParams) -> Value {
    json!({
        "section": {
            "templateId": [
                { "@_root": OID_REPORTING_PARAMETERS_SECTION },
                { "@_root": OID_REPORTING_PARAMETERS_SECTION_V2, "@_extension": "2016-03-01" },
            ],
            "code": { "@_code": LOINC_REPORTING_PARAMETERS, "@_codeSystem": OID_LOINC_CODE_SYSTEM },
            "title": "Reporting Parameters",
            "text": "",
            "entry": {
                "@_typeCode": "DRIV",
                "act": {
                    "@_classCode": "ACT",
                    "@_moodCode": "EVN",
                    "templateId": [
                        { "@_root": OID_REPORTING_PARAMETERS_ACT },
                        { "@_root": OID_REPORTING_PARAMETERS_ACT_V2, "@_extension": "2016-03-01" },
                    ],
                    "id": { "@_root": Uuid::new_v4().to_string() },
                    "code": {
                        "@_code": "252116004",
                        "@_codeSystem": OID_SNOMED_CT_CODE_SYSTEM,
                        "@_displayName": "Observation Parameters",
                    },
                    "effectiveTime": {
                        "low": { "@_value": hl7(&params.measure_period_start) },
                        "high": { "@_value": hl7(&params.measure_period_end) },
                    },
                }
            },
        }
    })
}

fn patient_data_section(entries: Vec<Value>) -> Value {
    json!({
        "section": {
            "templateId": [
                { "@_root": OID_PATIENT_DATA_SECTION },
                { "@_root": OID_PATIENT_DATA_SECTION_QDM, "@_extension": "2021-08-01" },
                { "@_root": OID_PATIENT_DATA_SECTION_QDM_V2, "@_extension": "2022-02-01" },
            ],
            "code": { "@_code": LOINC_PATIENT_DATA, "@_codeSystem": OID_LOINC_CODE_SYSTEM },
            "title": "Patient Data",
            "text": "",
            "entry": entries,
        }
    })
}

fn code_value(concept: Option<&CodeableConcept>, fallback: (&str, &str, &str)) -> Value {
    match crate::systems::map_concept_to_cda_code(concept)
        .and_then(|code| serde_json::to_value(code).ok())
    {
        Some(value) if value.get("@_code").is_some() => value,
        _ => json!({
            "@_code": fallback.0,
            "@_codeSystem": fallback.1,
            "@_codeSystemName": fallback.2,
        }),
    }
}

fn encounter_entry(fact: &QrdaEncounter) -> Value {
    let encounter = fact.encounter;
    let mut relationships = Vec::new();

    if let (Some(condition), Some(rank)) = (fact.diagnosis, fact.rank) {
        relationships.push(json!({
            "@_typeCode": "REFR",
            "observation": {
                "@_classCode": "OBS",
                "@_moodCode": "EVN",
                "templateId": { "@_root": OID_ENCOUNTER_DIAGNOSIS_QDM, "@_extension": "2019-12-01" },
                "code": { "@_code": LOINC_DIAGNOSIS, "@_codeSystem": OID_LOINC_CODE_SYSTEM },
                "value": {
                    "@_xsi:type": "CD",
                    "@_code": condition.code.as_ref().and_then(|c| c.first_code()).unwrap_or(""),
                    "@_codeSystem": OID_SNOMED_CT_CODE_SYSTEM,
                    "@_codeSystemName": "SNOMEDCT",
                },
                "entryRelationship": {
                    "@_typeCode": "REFR",
                    "observation": {
                        "@_classCode": "OBS",
                        "@_moodCode": "EVN",
                        "templateId": { "@_root": OID_RANK_OBSERVATION, "@_extension": "2019-12-01" },
                        "code": {
                            "@_code": "263486008",
                            "@_displayName": "Rank",
                            "@_codeSystem": OID_SNOMED_CT_CODE_SYSTEM,
                        },
                        "value": { "@_xsi:type": "INT", "@_value": rank.to_string() },
                    },
                },
            },
        }));
    }

    if let Some(class) = encounter
        .class
        .as_ref()
        .and_then(|class| class.code.as_deref())
        .filter(|code| *code != "UNK")
    {
        relationships.push(json!({
            "@_typeCode": "REFR",
            "act": {
                "@_classCode": "ACT",
                "@_moodCode": "EVN",
                "templateId": [{ "@_root": OID_ENCOUNTER_CLASS_ACT, "@_extension": "2021-08-01" }],
                "code": {
                    "@_code": class,
                    "@_codeSystem": OID_ACT_CODE_CODE_SYSTEM,
                    "@_codeSystemName": "HL7 Act Code",
                },
            },
        }));
    }

    let mut entry = json!({
        "encounter": {
            "@_classCode": "ENC",
            "@_moodCode": "EVN",
            "templateId": [
                { "@_root": OID_ENCOUNTER_ACTIVITIES, "@_extension": "2015-08-01" },
                { "@_root": OID_ENCOUNTER_PERFORMED, "@_extension": "2021-08-01" },
            ],
            "id": { "@_root": encounter.id.as_deref().map(str::to_string).unwrap_or_else(|| Uuid::new_v4().to_string()) },
            "code": code_value(
                encounter.type_.as_ref().and_then(|t| t.first()),
                ("99213", OID_CPT_CODE_SYSTEM, "CPT"),
            ),
            "statusCode": { "@_code": "completed" },
            "effectiveTime": {
                "low": { "@_value": encounter.period.as_ref().and_then(|p| p.start.as_deref()).map(hl7).unwrap_or_default() },
                "high": { "@_value": encounter.period.as_ref().and_then(|p| p.end.as_deref()).map(hl7).unwrap_or_default() },
            },
        }
    });
    if !relationships.is_empty() {
        entry["encounter"]["entryRelationship"] = Value::Array(relationships);
    }
    entry
}

fn intervention_entry(intervention: &Procedure) -> Value {
    let performed = intervention
        .performed_period
        .as_ref()
        .and_then(|p| p.start.as_deref());

    let mut entry = json!({
        "act": {
            "@_classCode": "ACT",
            "@_moodCode": "EVN",
            "@_negationInd": "false",
            "templateId": [
                { "@_root": OID_PROCEDURE_ACTIVITY_ACT, "@_extension": "2014-06-09" },
                { "@_root": OID_INTERVENTION_PERFORMED, "@_extension": "2021-08-01" },
            ],
            "id": { "@_root": intervention.id.as_deref().map(str::to_string).unwrap_or_else(|| Uuid::new_v4().to_string()) },
            "code": code_value(
                intervention.code.as_ref(),
                (CATEGORY_COUNSELING, OID_SNOMED_CT_CODE_SYSTEM, "SNOMEDCT"),
            ),
            "statusCode": { "@_code": "completed" },
            "effectiveTime": match performed {
                Some(start) => json!({ "@_value": hl7(start) }),
                None => json!({ "@_nullFlavor": "UNK" }),
            },
        }
    });

    if let Some(performed_at) = intervention.performed_date_time.as_deref() {
        entry["act"]["author"] = author_time(performed_at);
    }

    if let Some(reason) = intervention
        .status_reason
        .as_ref()
        .and_then(|reason| reason.first_code())
    {
        entry["act"]["entryRelationship"] = json!({
            "@_typeCode": "RSON",
            "observation": {
                "@_classCode": "OBS",
                "@_moodCode": "EVN",
                "templateId": { "@_root": OID_NEGATION_RATIONALE, "@_extension": "2017-08-01" },
                "code": {
                    "@_code": LOINC_REASON_CARE_ACTION,
                    "@_codeSystem": OID_LOINC_CODE_SYSTEM,
                    "@_codeSystemName": "LOINC",
                    "@_displayName": "reason",
                },
                "value": {
                    "@_xsi:type": "CD",
                    "@_code": reason,
                    "@_codeSystem": OID_SNOMED_CT_CODE_SYSTEM,
                    "@_codeSystemName": "SNOMEDCT",
                },
            },
        });
    }

    entry
}

fn procedure_entry(procedure: &Procedure) -> Value {
    let performed = procedure
        .performed_period
        .as_ref()
        .and_then(|p| p.start.as_deref());

    let mut entry = json!({
        "procedure": {
            "@_classCode": "PROC",
            "@_moodCode": "EVN",
            "@_negationInd": "false",
            "templateId": [
                { "@_root": OID_PROCEDURE_PERFORMED, "@_extension": "2021-08-01" },
                { "@_root": OID_PROCEDURE_ACTIVITY_PROCEDURE, "@_extension": "2014-06-09" },
            ],
            "id": { "@_root": procedure.id.as_deref().map(str::to_string).unwrap_or_else(|| Uuid::new_v4().to_string()) },
            "code": code_value(
                procedure.code.as_ref(),
                (CATEGORY_DIAGNOSTIC, OID_SNOMED_CT_CODE_SYSTEM, "SNOMEDCT"),
            ),
            "statusCode": { "@_code": "completed" },
            "effectiveTime": match performed {
                Some(start) => json!({ "@_value": hl7(start) }),
                None => json!({ "@_nullFlavor": "UNK" }),
            },
        }
    });

    if let Some(performed_at) = procedure.performed_date_time.as_deref() {
        entry["procedure"]["author"] = author_time(performed_at);
    }

    entry
}

fn author_time(performed_at: &str) -> Value {
    json!({
        "templateId": { "@_root": OID_AUTHOR_DATETIME, "@_extension": "2019-12-01" },
        "time": { "@_value": hl7(performed_at) },
        "assignedAuthor": { "id": { "@_nullFlavor": "NA" } },
    })
}

fn payer_entry(coverage: &Coverage) -> Value {
    json!({
        "observation": {
            "@_classCode": "OBS",
            "@_moodCode": "EVN",
            "templateId": { "@_root": OID_PATIENT_CHARACTERISTIC_PAYER },
            "id": { "@_root": coverage.id.as_deref().map(str::to_string).unwrap_or_else(|| Uuid::new_v4().to_string()) },
            "code": {
                "@_code": LOINC_PAYMENT_SOURCE,
                "@_codeSystemName": "LOINC",
                "@_codeSystem": OID_LOINC_CODE_SYSTEM,
                "@_displayName": "Payment source",
            },
            "statusCode": { "@_code": "completed" },
            "effectiveTime": {
                "low": { "@_value": coverage.period.as_ref().and_then(|p| p.start.as_deref()).map(hl7).unwrap_or_default() },
                "high": { "@_nullFlavor": "UNK" },
            },
            "value": {
                "@_xsi:type": "CD",
                "@_code": coverage.type_.as_ref().and_then(|t| t.first_code()).unwrap_or(""),
                "@_codeSystem": OID_PAYMENT_TYPOLOGY_CODE_SYSTEM,
                "@_codeSystemName": "Source of Payment Typology",
            },
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crosswalk_fhir::Period;

    fn params() -> QrdaParams {
        QrdaParams {
            patient_id: "patient-1".to_string(),
            measure_period_start: "2024-01-01T00:00:00Z".to_string(),
            measure_period_end: "2024-12-31T23:59:59Z".to_string(),
        }
    }

    #[test]
    fn every_fact_produces_one_entry() {
        let patient = Patient {
            id: Some("patient-1".to_string()),
            ..Default::default()
        };
        let encounter = Encounter {
            id: Some("e1".to_string()),
            period: Some(Period {
                start: Some("2024-02-01T09:00:00Z".to_string()),
                end: Some("2024-02-01T09:30:00Z".to_string()),
            }),
            ..Default::default()
        };
        let intervention = Procedure {
            id: Some("i1".to_string()),
            category: Some(CodeableConcept {
                coding: Some(vec![Coding {
                    code: Some(CATEGORY_COUNSELING.to_string()),
                    ..Default::default()
                }]),
                ..Default::default()
            }),
            ..Default::default()
        };
        let coverage = Coverage {
            id: Some("c1".to_string()),
            ..Default::default()
        };

        let input = QrdaInput {
            patient: Some(&patient),
            encounters: vec![QrdaEncounter {
                encounter: &encounter,
                diagnosis: None,
                rank: None,
            }],
            interventions: vec![&intervention],
            procedures: vec![],
            coverages: vec![&coverage],
        };

        let tree = build_qrda(&patient, &input, &params()).unwrap();
        let sections = tree["component"]["structuredBody"]["component"]
            .as_array()
            .unwrap();
        assert_eq!(sections.len(), 3);
        let entries = sections[2]["section"]["entry"].as_array().unwrap();
        assert_eq!(entries.len(), 3);
        assert!(entries[0].get("encounter").is_some());
        assert!(entries[1].get("act").is_some());
        assert!(entries[2].get("observation").is_some());
    }

    #[test]
    fn no_clinical_data_emits_no_report() {
        let resources = vec![Resource::Patient(Patient {
            id: Some("patient-1".to_string()),
            ..Default::default()
        })];
        let result = build_qrda_document_reference(&resources, &params()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn report_is_base64_xml_attachment() {
        let resources = vec![
            Resource::Patient(Patient {
                id: Some("patient-1".to_string()),
                ..Default::default()
            }),
            Resource::Encounter(Encounter {
                id: Some("e1".to_string()),
                ..Default::default()
            }),
        ];
        let report = build_qrda_document_reference(&resources, &params())
            .unwrap()
            .expect("report expected");
        assert_eq!(
            report.type_.as_ref().unwrap().first_code(),
            Some(LOINC_QUALITY_MEASURE_REPORT)
        );
        let attachment = report.content.as_ref().unwrap()[0]
            .attachment
            .as_ref()
            .unwrap();
        assert_eq!(attachment.content_type.as_deref(), Some("application/xml"));
        let xml = BASE64.decode(attachment.data.as_deref().unwrap()).unwrap();
        let xml = String::from_utf8(xml).unwrap();
        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains("ClinicalDocument"));
        assert!(xml.contains(LOINC_QUALITY_MEASURE_REPORT));
    }

    #[test]
    fn reporting_period_renders_as_interval() {
        let section = reporting_parameters_section(&params());
        let time = &section["section"]["entry"]["act"]["effectiveTime"];
        assert_eq!(time["low"]["@_value"], "20240101000000+0000");
        assert_eq!(time["high"]["@_value"], "20241231235959+0000");
    }
}
