//! Static code-system and value-set mappings.
//!
//! Each [`ConceptMapper`] is a bidirectional table between a FHIR code and
//! its C-CDA counterpart. Tables are const and read-only, safe to share
//! across concurrent conversions. Lookups without a default return
//! `None`; the `_or` variants take an explicit fallback. Duplicate keys
//! resolve to the first entry, so preferred mappings go first.

use crate::oids::*;
use crosswalk_cda as cda;
use crosswalk_fhir::{CodeableConcept, Coding};

/*
 * FHIR code systems and value sets
 */

pub const LOINC: &str = "http://loinc.org";
pub const SNOMED: &str = "http://snomed.info/sct";
pub const RXNORM: &str = "http://www.nlm.nih.gov/research/umls/rxnorm";
pub const UCUM: &str = "http://unitsofmeasure.org";
pub const CPT: &str = "http://www.ama-assn.org/go/cpt";
pub const NDC: &str = "http://hl7.org/fhir/sid/ndc";
pub const CVX: &str = "http://hl7.org/fhir/sid/cvx";

pub const ADMINISTRATIVE_GENDER_CODE_SYSTEM: &str = "http://hl7.org/fhir/administrative-gender";
pub const CLINICAL_CONDITION_CODE_SYSTEM: &str =
    "http://terminology.hl7.org/CodeSystem/condition-clinical";
pub const CONDITION_VERIFICATION_CODE_SYSTEM: &str =
    "http://terminology.hl7.org/CodeSystem/condition-verification";
pub const CONDITION_VER_STATUS_CODE_SYSTEM: &str =
    "http://terminology.hl7.org/CodeSystem/condition-ver-status";
pub const CONDITION_CATEGORY_CODE_SYSTEM: &str =
    "http://terminology.hl7.org/CodeSystem/condition-category";
pub const ALLERGY_CLINICAL_CODE_SYSTEM: &str =
    "http://terminology.hl7.org/CodeSystem/allergyintolerance-clinical";
pub const ALLERGY_VERIFICATION_CODE_SYSTEM: &str =
    "http://terminology.hl7.org/CodeSystem/allergyintolerance-verification";
pub const ACT_CODE_SYSTEM: &str = "http://terminology.hl7.org/CodeSystem/v3-ActCode";
pub const PARTICIPATION_CODE_SYSTEM: &str =
    "http://terminology.hl7.org/CodeSystem/v3-ParticipationType";
pub const DIAGNOSIS_ROLE_CODE_SYSTEM: &str =
    "http://terminology.hl7.org/CodeSystem/diagnosis-role";
pub const CONFIDENTIALITY_CODE_SYSTEM: &str =
    "http://terminology.hl7.org/CodeSystem/v3-Confidentiality";
pub const OBSERVATION_CATEGORY_CODE_SYSTEM: &str =
    "http://terminology.hl7.org/CodeSystem/observation-category";

pub const ADDRESS_USE_VALUE_SET: &str = "http://hl7.org/fhir/ValueSet/address-use";
pub const NAME_USE_VALUE_SET: &str = "http://hl7.org/fhir/ValueSet/name-use";
pub const ADMINISTRATIVE_GENDER_VALUE_SET: &str =
    "http://hl7.org/fhir/ValueSet/administrative-gender";
pub const CONTACT_ENTITY_USE_VALUE_SET: &str = "http://hl7.org/fhir/ValueSet/contactentity-use";
pub const MEDICATION_REQUEST_STATUS_VALUE_SET: &str =
    "http://hl7.org/fhir/ValueSet/medicationrequest-status";

pub const US_CORE_RACE_URL: &str =
    "http://hl7.org/fhir/us/core/StructureDefinition/us-core-race";
pub const US_CORE_ETHNICITY_URL: &str =
    "http://hl7.org/fhir/us/core/StructureDefinition/us-core-ethnicity";
pub const US_CORE_CONDITION_URL: &str =
    "http://hl7.org/fhir/us/core/StructureDefinition/us-core-condition";
pub const US_CORE_MEDICATION_REQUEST_URL: &str =
    "http://hl7.org/fhir/us/core/StructureDefinition/us-core-medicationrequest";

pub const US_SSN_URL: &str = "http://hl7.org/fhir/sid/us-ssn";
pub const US_DRIVER_LICENSE_URL: &str = "http://hl7.org/fhir/sid/us-dln";
pub const US_NPI_URL: &str = "http://hl7.org/fhir/sid/us-npi";
pub const UNII_URL: &str = "http://fdasis.nlm.nih.gov";
pub const NUCC_TAXONOMY_URL: &str = "http://nucc.org/provider-taxonomy";
pub const VA_MEDRT_URL: &str = "http://va.gov/terminology/medrt";
pub const NDFRT_URL: &str = "http://hl7.org/fhir/ndfrt";
pub const NCI_THESAURUS_URL: &str = "http://ncithesaurus-stage.nci.nih.gov";
pub const MDC_URL: &str = "urn:iso:std:iso:11073:10101";

/*
 * Commonly used LOINC codes
 */

pub const LOINC_ALLERGIES_SECTION: &str = "48765-2";
pub const LOINC_IMMUNIZATIONS_SECTION: &str = "11369-6";
pub const LOINC_MEDICATIONS_SECTION: &str = "10160-0";
pub const LOINC_PROBLEMS_SECTION: &str = "11450-4";
pub const LOINC_RESULTS_SECTION: &str = "30954-2";
pub const LOINC_SOCIAL_HISTORY_SECTION: &str = "29762-2";
pub const LOINC_VITAL_SIGNS_SECTION: &str = "8716-3";
pub const LOINC_PROCEDURES_SECTION: &str = "47519-4";
pub const LOINC_PLAN_OF_TREATMENT_SECTION: &str = "18776-5";
pub const LOINC_ASSESSMENTS_SECTION: &str = "51848-0";
pub const LOINC_DEVICES_SECTION: &str = "46264-8";
pub const LOINC_GOALS_SECTION: &str = "61146-7";
pub const LOINC_HEALTH_CONCERNS_SECTION: &str = "75310-3";
pub const LOINC_ENCOUNTERS_SECTION: &str = "46240-8";
pub const LOINC_REASON_FOR_REFERRAL_SECTION: &str = "42349-1";
pub const LOINC_REFERRAL_NOTE: &str = "57133-1";
pub const LOINC_MENTAL_STATUS_SECTION: &str = "10190-7";
pub const LOINC_CARE_TEAM_SECTION: &str = "85847-2";
pub const LOINC_INSURANCE_SECTION: &str = "48768-6";
pub const LOINC_NOTES_SECTION: &str = "11488-4";
pub const LOINC_SUMMARY_OF_EPISODE_NOTE: &str = "34133-9";
pub const LOINC_MEDICATION_INSTRUCTIONS: &str = "76662-6";
pub const LOINC_CONDITION: &str = "75323-6";
pub const LOINC_OVERALL_GOAL: &str = "58144-7";
pub const LOINC_TOBACCO_SMOKING_STATUS: &str = "72166-2";
pub const LOINC_HISTORY_OF_TOBACCO_USE: &str = "11367-0";
pub const LOINC_ADMINISTRATIVE_SEX: &str = "46098-0";
pub const LOINC_BIRTH_SEX: &str = "76689-9";
pub const LOINC_QUALITY_MEASURE_REPORT: &str = "55182-0";
pub const LOINC_MEASURE_DOCUMENT: &str = "55186-1";
pub const LOINC_REPORTING_PARAMETERS: &str = "55187-9";
pub const LOINC_PATIENT_DATA: &str = "55188-7";
pub const LOINC_PAYMENT_SOURCE: &str = "48768-6";
pub const LOINC_DIAGNOSIS: &str = "29308-4";
pub const LOINC_REASON_CARE_ACTION: &str = "77301-0";

#[derive(Debug, Clone, Copy)]
pub struct ConceptEntry {
    pub fhir: &'static str,
    pub cda: &'static str,
    pub display: &'static str,
}

/// A static bidirectional value mapping. First entry wins on duplicate
/// keys in either direction.
#[derive(Debug, Clone, Copy)]
pub struct ConceptMapper {
    pub system_name: &'static str,
    pub cda_system_oid: &'static str,
    pub fhir_system_url: &'static str,
    pub entries: &'static [ConceptEntry],
}

impl ConceptMapper {
    pub fn entry_by_cda(&self, cda: &str) -> Option<&'static ConceptEntry> {
        self.entries.iter().find(|e| e.cda == cda)
    }

    pub fn entry_by_fhir(&self, fhir: &str) -> Option<&'static ConceptEntry> {
        self.entries.iter().find(|e| e.fhir == fhir)
    }

    pub fn cda_to_fhir(&self, cda: &str) -> Option<&'static str> {
        self.entry_by_cda(cda).map(|e| e.fhir)
    }

    pub fn fhir_to_cda(&self, fhir: &str) -> Option<&'static str> {
        self.entry_by_fhir(fhir).map(|e| e.cda)
    }

    /// Lookup with an explicit default for absent or unmapped input.
    pub fn cda_to_fhir_or(&self, cda: Option<&str>, default: &'static str) -> &'static str {
        cda.and_then(|c| self.cda_to_fhir(c)).unwrap_or(default)
    }

    pub fn fhir_to_cda_or(&self, fhir: Option<&str>, default: &'static str) -> &'static str {
        fhir.and_then(|f| self.fhir_to_cda(f)).unwrap_or(default)
    }

    /// Render the mapped C-CDA value as a full code element, carrying the
    /// mapper's code system.
    pub fn fhir_to_cda_code(&self, fhir: &str) -> Option<cda::Code> {
        let entry = self.entry_by_fhir(fhir)?;
        Some(cda::Code {
            code: Some(entry.cda.to_string()),
            display_name: Some(entry.display.to_string()),
            code_system: non_empty(self.cda_system_oid),
            code_system_name: SYSTEM_MAPPER
                .entry_by_cda(self.cda_system_oid)
                .map(|e| e.display.to_string()),
            ..Default::default()
        })
    }

    /// Render the mapped FHIR value as a codeable concept, carrying the
    /// mapper's system url.
    pub fn cda_to_fhir_concept(&self, cda: &str) -> Option<CodeableConcept> {
        let entry = self.entry_by_cda(cda)?;
        Some(CodeableConcept {
            coding: Some(vec![Coding {
                system: non_empty(self.fhir_system_url),
                code: Some(entry.fhir.to_string()),
                display: Some(entry.display.to_string()),
            }]),
            text: Some(entry.display.to_string()),
            extension: None,
        })
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Code-system identity mapping: C-CDA OIDs ↔ FHIR URIs.
pub static SYSTEM_MAPPER: ConceptMapper = ConceptMapper {
    system_name: "System",
    cda_system_oid: "",
    fhir_system_url: "",
    entries: &[
        ConceptEntry { cda: OID_LOINC_CODE_SYSTEM, fhir: LOINC, display: "LOINC" },
        ConceptEntry { cda: OID_SNOMED_CT_CODE_SYSTEM, fhir: SNOMED, display: "SNOMED CT" },
        ConceptEntry { cda: OID_RXNORM_CODE_SYSTEM, fhir: RXNORM, display: "RxNorm" },
        ConceptEntry {
            cda: OID_CPT_CODE_SYSTEM,
            fhir: CPT,
            display: "Current Procedural Terminology (CPT)",
        },
        ConceptEntry { cda: OID_NDC_CODE_SYSTEM, fhir: NDC, display: "National Drug Code (NDC)" },
        ConceptEntry { cda: OID_CVX_CODE_SYSTEM, fhir: CVX, display: "CVX" },
        ConceptEntry { cda: OID_US_SSN_CODE_SYSTEM, fhir: US_SSN_URL, display: "SSN" },
        ConceptEntry { cda: OID_US_DLN_CODE_SYSTEM, fhir: US_DRIVER_LICENSE_URL, display: "DLN" },
        ConceptEntry { cda: OID_US_NPI_CODE_SYSTEM, fhir: US_NPI_URL, display: "NPI" },
        ConceptEntry {
            cda: OID_UNII_CODE_SYSTEM,
            fhir: UNII_URL,
            display: "Unique Ingredient Identifier (UNII)",
        },
        ConceptEntry {
            cda: OID_NUCC_TAXONOMY_CODE_SYSTEM,
            fhir: NUCC_TAXONOMY_URL,
            display: "NUCC Health Care Provider Taxonomy",
        },
        ConceptEntry {
            cda: OID_VA_MED_RT_CODE_SYSTEM,
            fhir: VA_MEDRT_URL,
            display: "Medication Reference Terminology (MED-RT)",
        },
        ConceptEntry {
            cda: OID_NDF_RT_CODE_SYSTEM,
            fhir: NDFRT_URL,
            display: "National Drug File Reference Terminology (NDF-RT)",
        },
        ConceptEntry {
            cda: OID_NCI_THESAURUS_CODE_SYSTEM,
            fhir: NCI_THESAURUS_URL,
            display: "NCI Thesaurus",
        },
        ConceptEntry {
            cda: OID_MDC_CODE_SYSTEM,
            fhir: MDC_URL,
            display: "Medical Device Communications (MDC)",
        },
        ConceptEntry {
            cda: OID_CONFIDENTIALITY_VALUE_SET,
            fhir: "Confidentiality",
            display: "Confidentiality",
        },
        ConceptEntry {
            cda: OID_ADMINISTRATIVE_GENDER_CODE_SYSTEM,
            fhir: ADMINISTRATIVE_GENDER_CODE_SYSTEM,
            display: "Administrative Sex",
        },
        ConceptEntry {
            cda: OID_CDC_RACE_AND_ETHNICITY_CODE_SYSTEM,
            fhir: "urn:oid:2.16.840.1.113883.6.238",
            display: "CDC Race and Ethnicity",
        },
    ],
};

/// Map a C-CDA code-system OID to a FHIR system URI, falling back to the
/// `urn:oid:` form for unmapped OIDs.
pub fn map_cda_system_to_fhir(oid: Option<&str>) -> Option<String> {
    let oid = oid?;
    Some(
        SYSTEM_MAPPER
            .cda_to_fhir(oid)
            .map(str::to_string)
            .unwrap_or_else(|| format!("urn:oid:{oid}")),
    )
}

/// Map a FHIR system URI to a C-CDA code-system OID; `urn:oid:` URIs pass
/// through. Unmapped systems yield `None`.
pub fn map_fhir_system_to_cda(system: Option<&str>) -> Option<String> {
    let system = system?;
    if let Some(oid) = system.strip_prefix("urn:oid:") {
        return Some(oid.to_string());
    }
    SYSTEM_MAPPER.fhir_to_cda(system).map(str::to_string)
}

/// Map a FHIR coding to a C-CDA code element.
pub fn map_coding_to_cda_code(coding: &Coding) -> cda::Code {
    let entry = coding
        .system
        .as_deref()
        .and_then(|s| SYSTEM_MAPPER.entry_by_fhir(s));
    let system_oid = coding
        .system
        .as_deref()
        .and_then(|s| s.strip_prefix("urn:oid:"));

    cda::Code {
        code: coding.code.clone(),
        display_name: coding.display.clone(),
        code_system: entry
            .map(|e| e.cda.to_string())
            .or_else(|| system_oid.map(str::to_string)),
        code_system_name: entry.map(|e| e.display.to_string()),
        ..Default::default()
    }
}

/// Map a FHIR codeable concept to a C-CDA code, with secondary codings as
/// translations.
pub fn map_concept_to_cda_code(concept: Option<&CodeableConcept>) -> Option<cda::Code> {
    let codings = concept?.coding.as_ref()?;
    let mut result = map_coding_to_cda_code(codings.first()?);
    if codings.len() > 1 {
        result.translation = Some(codings[1..].iter().map(map_coding_to_cda_code).collect());
    }
    Some(result)
}

/// Map a FHIR codeable concept to a C-CDA `CD` observation value.
pub fn map_concept_to_cda_value(concept: Option<&CodeableConcept>) -> Option<cda::ObservationValue> {
    Some(cda::ObservationValue::Cd(map_concept_to_cda_code(concept)?))
}

/// Map a C-CDA code element to a FHIR codeable concept, carrying
/// translations as additional codings.
pub fn map_cda_code_to_concept(code: Option<&cda::Code>) -> Option<CodeableConcept> {
    let code = code?;
    let mut coding = vec![Coding {
        system: map_cda_system_to_fhir(code.code_system.as_deref()),
        code: code.code.clone(),
        display: code.display_name.clone(),
    }];
    if let Some(translations) = &code.translation {
        for translation in translations {
            coding.push(Coding {
                system: map_cda_system_to_fhir(translation.code_system.as_deref()),
                code: translation.code.clone(),
                display: translation.display_name.clone(),
            });
        }
    }
    Some(CodeableConcept {
        coding: Some(coding),
        text: code.display_name.clone(),
        extension: None,
    })
}

/// Map a C-CDA code element to a single FHIR coding.
pub fn map_cda_code_to_coding(code: Option<&cda::Code>) -> Option<Coding> {
    let code = code?;
    Some(Coding {
        system: map_cda_system_to_fhir(code.code_system.as_deref()),
        code: code.code.clone(),
        display: code.display_name.clone(),
    })
}

pub static CONFIDENTIALITY_MAPPER: ConceptMapper = ConceptMapper {
    system_name: "Confidentiality",
    cda_system_oid: OID_CONFIDENTIALITY_VALUE_SET,
    fhir_system_url: CONFIDENTIALITY_CODE_SYSTEM,
    entries: &[
        ConceptEntry { cda: "U", fhir: "U", display: "unrestricted" },
        ConceptEntry { cda: "L", fhir: "L", display: "low" },
        ConceptEntry { cda: "M", fhir: "M", display: "moderate" },
        ConceptEntry { cda: "N", fhir: "N", display: "normal" },
        ConceptEntry { cda: "R", fhir: "R", display: "restricted" },
        ConceptEntry { cda: "V", fhir: "V", display: "very restricted" },
    ],
};

// CDA has no representation of "old" or "maiden" names; both render as
// legal ("L").
pub static HUMAN_NAME_USE_MAPPER: ConceptMapper = ConceptMapper {
    system_name: "HumanNameUse",
    cda_system_oid: "",
    fhir_system_url: NAME_USE_VALUE_SET,
    entries: &[
        ConceptEntry { cda: "C", fhir: "usual", display: "Common/Called by" },
        ConceptEntry { cda: "L", fhir: "official", display: "Legal" },
        ConceptEntry { cda: "TEMP", fhir: "temp", display: "Temporary" },
        ConceptEntry { cda: "P", fhir: "nickname", display: "Nickname" },
        ConceptEntry { cda: "ANON", fhir: "anonymous", display: "Anonymous" },
        ConceptEntry { cda: "L", fhir: "maiden", display: "Maiden" },
        ConceptEntry { cda: "L", fhir: "old", display: "Old" },
    ],
};

pub static GENDER_MAPPER: ConceptMapper = ConceptMapper {
    system_name: "Gender",
    cda_system_oid: OID_ADMINISTRATIVE_GENDER_CODE_SYSTEM,
    fhir_system_url: ADMINISTRATIVE_GENDER_VALUE_SET,
    entries: &[
        ConceptEntry { cda: "F", fhir: "female", display: "Female" },
        ConceptEntry { cda: "M", fhir: "male", display: "Male" },
        ConceptEntry { cda: "UN", fhir: "unknown", display: "Unknown" },
        ConceptEntry { cda: "UN", fhir: "other", display: "Other" },
    ],
};

pub static ADDRESS_USE_MAPPER: ConceptMapper = ConceptMapper {
    system_name: "AddressUse",
    cda_system_oid: "",
    fhir_system_url: ADDRESS_USE_VALUE_SET,
    entries: &[
        ConceptEntry { cda: "HP", fhir: "home", display: "Home" },
        ConceptEntry { cda: "WP", fhir: "work", display: "Work" },
    ],
};

pub static TELECOM_USE_MAPPER: ConceptMapper = ConceptMapper {
    system_name: "TelecomUse",
    cda_system_oid: "",
    fhir_system_url: CONTACT_ENTITY_USE_VALUE_SET,
    entries: &[
        ConceptEntry { cda: "WP", fhir: "work", display: "Work" },
        ConceptEntry { cda: "HP", fhir: "home", display: "Home" },
        ConceptEntry { cda: "MC", fhir: "mobile", display: "Mobile" },
    ],
};

pub static ALLERGY_STATUS_MAPPER: ConceptMapper = ConceptMapper {
    system_name: "AllergyStatus",
    cda_system_oid: "",
    fhir_system_url: ALLERGY_VERIFICATION_CODE_SYSTEM,
    entries: &[
        ConceptEntry { cda: "unconfirmed", fhir: "unconfirmed", display: "Unconfirmed" },
        ConceptEntry { cda: "provisional", fhir: "provisional", display: "Provisional" },
        ConceptEntry { cda: "differential", fhir: "differential", display: "Differential" },
        ConceptEntry { cda: "confirmed", fhir: "confirmed", display: "Confirmed" },
        ConceptEntry { cda: "refuted", fhir: "refuted", display: "Refuted" },
        ConceptEntry { cda: "entered-in-error", fhir: "entered-in-error", display: "Entered in Error" },
        ConceptEntry { cda: "unknown", fhir: "unknown", display: "Unknown" },
        ConceptEntry { cda: "active", fhir: "active", display: "Active" },
    ],
};

pub static ALLERGY_CATEGORY_MAPPER: ConceptMapper = ConceptMapper {
    system_name: "AllergyCategory",
    cda_system_oid: OID_SNOMED_CT_CODE_SYSTEM,
    fhir_system_url: ALLERGY_CLINICAL_CODE_SYSTEM,
    entries: &[
        ConceptEntry { cda: "414285001", fhir: "food", display: "Allergy to food (finding)" },
        ConceptEntry {
            cda: "419511003",
            fhir: "medication",
            display: "Propensity to adverse reactions to drug (finding)",
        },
        ConceptEntry {
            cda: "426232007",
            fhir: "environment",
            display: "Environmental allergy (finding)",
        },
        ConceptEntry {
            cda: "418038007",
            fhir: "biologic",
            display: "Propensity to adverse reactions to substance (finding)",
        },
    ],
};

pub static ALLERGY_SEVERITY_MAPPER: ConceptMapper = ConceptMapper {
    system_name: "AllergySeverity",
    cda_system_oid: OID_SNOMED_CT_CODE_SYSTEM,
    fhir_system_url: ALLERGY_CLINICAL_CODE_SYSTEM,
    entries: &[
        ConceptEntry { cda: "255604002", fhir: "mild", display: "Mild" },
        ConceptEntry { cda: "6736007", fhir: "moderate", display: "Moderate" },
        ConceptEntry { cda: "24484000", fhir: "severe", display: "Severe" },
    ],
};

pub static PROBLEM_STATUS_MAPPER: ConceptMapper = ConceptMapper {
    system_name: "ProblemStatus",
    cda_system_oid: "",
    fhir_system_url: CONDITION_VER_STATUS_CODE_SYSTEM,
    entries: &[
        ConceptEntry { cda: "active", fhir: "active", display: "Active" },
        ConceptEntry { cda: "inactive", fhir: "inactive", display: "Inactive" },
        ConceptEntry { cda: "resolved", fhir: "inactive", display: "Resolved" },
        ConceptEntry { cda: "remission", fhir: "inactive", display: "In Remission" },
        ConceptEntry { cda: "relapse", fhir: "active", display: "Relapse" },
        ConceptEntry { cda: "aborted", fhir: "aborted", display: "Aborted" },
    ],
};

pub static IMMUNIZATION_STATUS_MAPPER: ConceptMapper = ConceptMapper {
    system_name: "ImmunizationStatus",
    cda_system_oid: "",
    fhir_system_url: "",
    entries: &[
        ConceptEntry { cda: "completed", fhir: "completed", display: "Completed" },
        ConceptEntry { cda: "nullified", fhir: "entered-in-error", display: "Nullified" },
        ConceptEntry { cda: "aborted", fhir: "not-done", display: "Aborted" },
        ConceptEntry { cda: "cancelled", fhir: "not-done", display: "Cancelled" },
        ConceptEntry { cda: "obsolete", fhir: "not-done", display: "Obsolete" },
    ],
};

pub static ENCOUNTER_STATUS_MAPPER: ConceptMapper = ConceptMapper {
    system_name: "EncounterStatus",
    cda_system_oid: "",
    fhir_system_url: "",
    entries: &[
        ConceptEntry { cda: "active", fhir: "in-progress", display: "In Progress" },
        ConceptEntry { cda: "completed", fhir: "finished", display: "Finished" },
        ConceptEntry { cda: "aborted", fhir: "cancelled", display: "Cancelled" },
        ConceptEntry { cda: "cancelled", fhir: "cancelled", display: "Cancelled" },
        ConceptEntry { cda: "unknown", fhir: "unknown", display: "Unknown" },
    ],
};

pub static PROCEDURE_STATUS_MAPPER: ConceptMapper = ConceptMapper {
    system_name: "ProcedureStatus",
    cda_system_oid: "",
    fhir_system_url: "",
    entries: &[
        ConceptEntry { cda: "completed", fhir: "completed", display: "Completed" },
        ConceptEntry { cda: "aborted", fhir: "stopped", display: "Stopped" },
        ConceptEntry { cda: "cancelled", fhir: "not-done", display: "Not Done" },
        ConceptEntry { cda: "new", fhir: "not-done", display: "Draft" },
        ConceptEntry { cda: "unknown", fhir: "unknown", display: "Unknown" },
    ],
};

pub static MEDICATION_STATUS_MAPPER: ConceptMapper = ConceptMapper {
    system_name: "MedicationStatus",
    cda_system_oid: "",
    fhir_system_url: MEDICATION_REQUEST_STATUS_VALUE_SET,
    entries: &[
        ConceptEntry { cda: "active", fhir: "active", display: "Active" },
        ConceptEntry { cda: "completed", fhir: "completed", display: "Completed" },
        ConceptEntry { cda: "aborted", fhir: "stopped", display: "Stopped" },
        ConceptEntry { cda: "cancelled", fhir: "cancelled", display: "Cancelled" },
        ConceptEntry { cda: "aborted", fhir: "entered-in-error", display: "Entered in Error" },
        ConceptEntry { cda: "active", fhir: "draft", display: "Draft" },
        ConceptEntry { cda: "cancelled", fhir: "unknown", display: "Unknown" },
        ConceptEntry { cda: "nullified", fhir: "cancelled", display: "Nullified" },
        ConceptEntry { cda: "obsolete", fhir: "cancelled", display: "Obsolete" },
    ],
};

/// Observation category derived from entry template ids.
pub static OBSERVATION_CATEGORY_MAPPER: ConceptMapper = ConceptMapper {
    system_name: "ObservationCategory",
    cda_system_oid: "",
    fhir_system_url: OBSERVATION_CATEGORY_CODE_SYSTEM,
    entries: &[
        ConceptEntry {
            cda: OID_SMOKING_STATUS_OBSERVATION,
            fhir: "social-history",
            display: "Smoking Status",
        },
        ConceptEntry {
            cda: OID_TOBACCO_USE_OBSERVATION,
            fhir: "social-history",
            display: "Tobacco Use",
        },
        ConceptEntry { cda: OID_SEX_OBSERVATION, fhir: "social-history", display: "Sex Observation" },
        ConceptEntry { cda: OID_BIRTH_SEX, fhir: "social-history", display: "Birth Sex" },
        ConceptEntry {
            cda: OID_VITAL_SIGNS_OBSERVATION,
            fhir: "vital-signs",
            display: "Vital Signs Observation",
        },
        ConceptEntry {
            cda: OID_VITAL_SIGNS_ORGANIZER,
            fhir: "vital-signs",
            display: "Vital Signs Organizer",
        },
        ConceptEntry { cda: OID_RESULT_OBSERVATION, fhir: "laboratory", display: "Result Observation" },
        ConceptEntry { cda: OID_RESULT_ORGANIZER, fhir: "laboratory", display: "Result Organizer" },
        ConceptEntry {
            cda: OID_PROCEDURE_ACTIVITY_OBSERVATION,
            fhir: "exam",
            display: "Procedure Activity Observation",
        },
        ConceptEntry { cda: OID_PROBLEM_OBSERVATION, fhir: "exam", display: "Problem Observation" },
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_without_default_is_absent() {
        assert_eq!(GENDER_MAPPER.cda_to_fhir("F"), Some("female"));
        assert_eq!(GENDER_MAPPER.cda_to_fhir("X"), None);
    }

    #[test]
    fn lookup_with_default() {
        assert_eq!(
            PROBLEM_STATUS_MAPPER.cda_to_fhir_or(Some("resolved"), "active"),
            "inactive"
        );
        assert_eq!(PROBLEM_STATUS_MAPPER.cda_to_fhir_or(None, "active"), "active");
        assert_eq!(
            PROBLEM_STATUS_MAPPER.cda_to_fhir_or(Some("nonsense"), "active"),
            "active"
        );
    }

    #[test]
    fn first_entry_wins_on_duplicates() {
        // "UN" maps to both unknown and other; the reverse lookup keeps
        // the first declaration.
        assert_eq!(GENDER_MAPPER.cda_to_fhir("UN"), Some("unknown"));
        assert_eq!(GENDER_MAPPER.fhir_to_cda("other"), Some("UN"));
        assert_eq!(HUMAN_NAME_USE_MAPPER.fhir_to_cda("maiden"), Some("L"));
        assert_eq!(HUMAN_NAME_USE_MAPPER.cda_to_fhir("L"), Some("official"));
    }

    #[test]
    fn system_mapping_round_trips_known_oids() {
        assert_eq!(
            map_cda_system_to_fhir(Some(OID_SNOMED_CT_CODE_SYSTEM)).as_deref(),
            Some(SNOMED)
        );
        assert_eq!(
            map_fhir_system_to_cda(Some(SNOMED)).as_deref(),
            Some(OID_SNOMED_CT_CODE_SYSTEM)
        );
    }

    #[test]
    fn unknown_oid_falls_back_to_urn() {
        assert_eq!(
            map_cda_system_to_fhir(Some("1.2.840.114350.1.13")).as_deref(),
            Some("urn:oid:1.2.840.114350.1.13")
        );
        assert_eq!(
            map_fhir_system_to_cda(Some("urn:oid:1.2.3")).as_deref(),
            Some("1.2.3")
        );
        assert_eq!(map_fhir_system_to_cda(Some("http://unmapped.example")), None);
    }

    #[test]
    fn concept_translations_become_extra_codings() {
        let code = crosswalk_cda::Code {
            code: Some("55607006".to_string()),
            display_name: Some("Problem".to_string()),
            code_system: Some(OID_SNOMED_CT_CODE_SYSTEM.to_string()),
            translation: Some(vec![crosswalk_cda::Code {
                code: Some(LOINC_CONDITION.to_string()),
                code_system: Some(OID_LOINC_CODE_SYSTEM.to_string()),
                ..Default::default()
            }]),
            ..Default::default()
        };
        let concept = map_cda_code_to_concept(Some(&code)).unwrap();
        let codings = concept.coding.unwrap();
        assert_eq!(codings.len(), 2);
        assert_eq!(codings[0].system.as_deref(), Some(SNOMED));
        assert_eq!(codings[1].system.as_deref(), Some(LOINC));
    }
}
