//! Regulatory object identifiers.
//!
//! The closed set of template ids and code-system OIDs the converters
//! recognize. Section-level ids are dispatched on in the forward
//! direction; entry-level ids are emitted by the reverse direction and
//! the registry in `templates` keeps the two in lock-step.

// Document-level templates
pub const OID_HL7_REGISTERED_MODELS: &str = "2.16.840.1.113883.1.3";
pub const OID_US_REALM_HEADER: &str = "2.16.840.1.113883.10.20.22.1.1";
pub const OID_US_REALM_HEADER_PATIENT_GENERATED: &str = "2.16.840.1.113883.10.20.29.1";
pub const OID_REFERRAL_NOTE: &str = "2.16.840.1.113883.10.20.22.1.14";

// Section templates
pub const OID_ALLERGIES_SECTION_ENTRIES_OPTIONAL: &str = "2.16.840.1.113883.10.20.22.2.6";
pub const OID_ALLERGIES_SECTION_ENTRIES_REQUIRED: &str = "2.16.840.1.113883.10.20.22.2.6.1";
pub const OID_MEDICATIONS_SECTION_ENTRIES_OPTIONAL: &str = "2.16.840.1.113883.10.20.22.2.1";
pub const OID_MEDICATIONS_SECTION_ENTRIES_REQUIRED: &str = "2.16.840.1.113883.10.20.22.2.1.1";
pub const OID_PROBLEMS_SECTION_ENTRIES_OPTIONAL: &str = "2.16.840.1.113883.10.20.22.2.5";
pub const OID_PROBLEMS_SECTION_ENTRIES_REQUIRED: &str = "2.16.840.1.113883.10.20.22.2.5.1";
pub const OID_PROCEDURES_SECTION_ENTRIES_OPTIONAL: &str = "2.16.840.1.113883.10.20.22.2.7";
pub const OID_PROCEDURES_SECTION_ENTRIES_REQUIRED: &str = "2.16.840.1.113883.10.20.22.2.7.1";
pub const OID_RESULTS_SECTION_ENTRIES_OPTIONAL: &str = "2.16.840.1.113883.10.20.22.2.3";
pub const OID_RESULTS_SECTION_ENTRIES_REQUIRED: &str = "2.16.840.1.113883.10.20.22.2.3.1";
pub const OID_VITAL_SIGNS_SECTION_ENTRIES_OPTIONAL: &str = "2.16.840.1.113883.10.20.22.2.4";
pub const OID_VITAL_SIGNS_SECTION_ENTRIES_REQUIRED: &str = "2.16.840.1.113883.10.20.22.2.4.1";
pub const OID_IMMUNIZATIONS_SECTION_ENTRIES_OPTIONAL: &str = "2.16.840.1.113883.10.20.22.2.2";
pub const OID_IMMUNIZATIONS_SECTION_ENTRIES_REQUIRED: &str = "2.16.840.1.113883.10.20.22.2.2.1";
pub const OID_SOCIAL_HISTORY_SECTION: &str = "2.16.840.1.113883.10.20.22.2.17";
pub const OID_PLAN_OF_CARE_SECTION: &str = "2.16.840.1.113883.10.20.22.2.10";
pub const OID_ASSESSMENTS_SECTION: &str = "2.16.840.1.113883.10.20.22.2.8";
pub const OID_GOALS_SECTION: &str = "2.16.840.1.113883.10.20.22.2.60";
pub const OID_HEALTH_CONCERNS_SECTION: &str = "2.16.840.1.113883.10.20.22.2.58";
pub const OID_ENCOUNTERS_SECTION_ENTRIES_OPTIONAL: &str = "2.16.840.1.113883.10.20.22.2.22";
pub const OID_ENCOUNTERS_SECTION_ENTRIES_REQUIRED: &str = "2.16.840.1.113883.10.20.22.2.22.1";
pub const OID_MEDICAL_EQUIPMENT_SECTION: &str = "2.16.840.1.113883.10.20.22.2.23";
pub const OID_CARE_TEAMS_SECTION: &str = "2.16.840.1.113883.10.20.22.2.500";
pub const OID_MENTAL_STATUS_SECTION: &str = "2.16.840.1.113883.10.20.22.2.56";
pub const OID_PAYERS_SECTION: &str = "2.16.840.1.113883.10.20.22.2.18";
pub const OID_NOTES_SECTION: &str = "2.16.840.1.113883.10.20.22.2.65";
pub const OID_REASON_FOR_REFERRAL: &str = "1.3.6.1.4.1.19376.1.5.3.1.3.1";

// Entry templates
pub const OID_ALLERGY_PROBLEM_ACT: &str = "2.16.840.1.113883.10.20.22.4.30";
pub const OID_ALLERGY_OBSERVATION: &str = "2.16.840.1.113883.10.20.22.4.7";
pub const OID_REACTION_OBSERVATION: &str = "2.16.840.1.113883.10.20.22.4.9";
pub const OID_SEVERITY_OBSERVATION: &str = "2.16.840.1.113883.10.20.22.4.8";
pub const OID_PROBLEM_ACT: &str = "2.16.840.1.113883.10.20.22.4.3";
pub const OID_PROBLEM_OBSERVATION: &str = "2.16.840.1.113883.10.20.22.4.4";
pub const OID_HEALTH_CONCERN_ACT: &str = "2.16.840.1.113883.10.20.22.4.132";
pub const OID_MEDICATION_ACTIVITY: &str = "2.16.840.1.113883.10.20.22.4.16";
pub const OID_MEDICATION_INFORMATION_MANUFACTURED_MATERIAL: &str =
    "2.16.840.1.113883.10.20.22.4.23";
pub const OID_MEDICATION_FREE_TEXT_SIG: &str = "2.16.840.1.113883.10.20.22.4.147";
pub const OID_IMMUNIZATION_ACTIVITY: &str = "2.16.840.1.113883.10.20.22.4.52";
pub const OID_IMMUNIZATION_MEDICATION_INFORMATION: &str = "2.16.840.1.113883.10.20.22.4.54";
pub const OID_PROCEDURE_ACTIVITY_PROCEDURE: &str = "2.16.840.1.113883.10.20.22.4.14";
pub const OID_PROCEDURE_ACTIVITY_ACT: &str = "2.16.840.1.113883.10.20.22.4.12";
pub const OID_PROCEDURE_ACTIVITY_OBSERVATION: &str = "2.16.840.1.113883.10.20.22.4.13";
pub const OID_RESULT_ORGANIZER: &str = "2.16.840.1.113883.10.20.22.4.1";
pub const OID_RESULT_OBSERVATION: &str = "2.16.840.1.113883.10.20.22.4.2";
pub const OID_VITAL_SIGNS_ORGANIZER: &str = "2.16.840.1.113883.10.20.22.4.26";
pub const OID_VITAL_SIGNS_OBSERVATION: &str = "2.16.840.1.113883.10.20.22.4.27";
pub const OID_SMOKING_STATUS_OBSERVATION: &str = "2.16.840.1.113883.10.20.22.4.78";
pub const OID_TOBACCO_USE_OBSERVATION: &str = "2.16.840.1.113883.10.20.22.4.85";
pub const OID_BIRTH_SEX: &str = "2.16.840.1.113883.10.20.22.4.200";
pub const OID_SEX_OBSERVATION: &str = "2.16.840.1.113883.10.20.22.4.507";
pub const OID_ENCOUNTER_ACTIVITIES: &str = "2.16.840.1.113883.10.20.22.4.49";
pub const OID_ENCOUNTER_LOCATION: &str = "2.16.840.1.113883.10.20.22.4.32";
pub const OID_GOAL_OBSERVATION: &str = "2.16.840.1.113883.10.20.22.4.121";
pub const OID_PLAN_OF_CARE_ACTIVITY_OBSERVATION: &str = "2.16.840.1.113883.10.20.22.4.44";
pub const OID_INSTRUCTIONS: &str = "2.16.840.1.113883.10.20.22.4.20";
pub const OID_CARE_TEAM_ORGANIZER_ENTRY: &str = "2.16.840.1.113883.10.20.22.4.500";
pub const OID_AUTHOR_PARTICIPANT: &str = "2.16.840.1.113883.10.20.22.4.119";
pub const OID_NOTE_ACTIVITY: &str = "2.16.840.1.113883.10.20.22.4.202";
pub const OID_PATIENT_REFERRAL_ACTIVITY_OBSERVATION: &str = "2.16.840.1.113883.10.20.22.4.140";
pub const OID_PRODUCT_INSTANCE: &str = "2.16.840.1.113883.10.20.22.4.37";
pub const OID_RELATED_PERSON_PARTICIPANT: &str = "2.16.840.1.113883.10.20.22.4.505";

// Code systems
pub const OID_LOINC_CODE_SYSTEM: &str = "2.16.840.1.113883.6.1";
pub const OID_SNOMED_CT_CODE_SYSTEM: &str = "2.16.840.1.113883.6.96";
pub const OID_RXNORM_CODE_SYSTEM: &str = "2.16.840.1.113883.6.88";
pub const OID_CPT_CODE_SYSTEM: &str = "2.16.840.1.113883.6.12";
pub const OID_NDC_CODE_SYSTEM: &str = "2.16.840.1.113883.6.69";
pub const OID_CVX_CODE_SYSTEM: &str = "2.16.840.1.113883.12.292";
pub const OID_ACT_CLASS_CODE_SYSTEM: &str = "2.16.840.1.113883.5.6";
pub const OID_ACT_CODE_CODE_SYSTEM: &str = "2.16.840.1.113883.5.4";
pub const OID_ACT_PRIORITY_CODE_SYSTEM: &str = "2.16.840.1.113883.5.7";
pub const OID_ADMINISTRATIVE_GENDER_CODE_SYSTEM: &str = "2.16.840.1.113883.5.1";
pub const OID_CONFIDENTIALITY_VALUE_SET: &str = "2.16.840.1.113883.5.25";
pub const OID_CDC_RACE_AND_ETHNICITY_CODE_SYSTEM: &str = "2.16.840.1.113883.6.238";
pub const OID_US_NPI_CODE_SYSTEM: &str = "2.16.840.1.113883.4.6";
pub const OID_US_SSN_CODE_SYSTEM: &str = "2.16.840.1.113883.4.1";
pub const OID_US_DLN_CODE_SYSTEM: &str = "2.16.840.1.113883.4.3";
pub const OID_UNII_CODE_SYSTEM: &str = "2.16.840.1.113883.4.9";
pub const OID_NUCC_TAXONOMY_CODE_SYSTEM: &str = "2.16.840.1.113883.6.101";
pub const OID_VA_MED_RT_CODE_SYSTEM: &str = "2.16.840.1.113883.6.345";
pub const OID_NDF_RT_CODE_SYSTEM: &str = "2.16.840.1.113883.3.26.1.5";
pub const OID_NCI_THESAURUS_CODE_SYSTEM: &str = "2.16.840.1.113883.3.26.1.1";
pub const OID_MDC_CODE_SYSTEM: &str = "2.16.840.1.113883.6.24";
pub const OID_FDA_UDI_CODE_SYSTEM: &str = "2.16.840.1.113883.3.3719";

// QRDA templates
pub const OID_QRDA_CATEGORY_I_FRAMEWORK: &str = "2.16.840.1.113883.10.20.24.1.1";
pub const OID_QRDA_QDM_BASED: &str = "2.16.840.1.113883.10.20.24.1.2";
pub const OID_QRDA_CMS: &str = "2.16.840.1.113883.10.20.24.1.3";
pub const OID_MEASURE_SECTION: &str = "2.16.840.1.113883.10.20.24.2.2";
pub const OID_MEASURE_SECTION_QDM: &str = "2.16.840.1.113883.10.20.24.2.3";
pub const OID_MEASURE_REFERENCE: &str = "2.16.840.1.113883.10.20.24.3.98";
pub const OID_EMEASURE_REFERENCE_QDM: &str = "2.16.840.1.113883.10.20.24.3.97";
pub const OID_REPORTING_PARAMETERS_SECTION: &str = "2.16.840.1.113883.10.20.17.2.1";
pub const OID_REPORTING_PARAMETERS_SECTION_V2: &str = "2.16.840.1.113883.10.20.17.2.1.1";
pub const OID_REPORTING_PARAMETERS_ACT: &str = "2.16.840.1.113883.10.20.17.3.8";
pub const OID_REPORTING_PARAMETERS_ACT_V2: &str = "2.16.840.1.113883.10.20.17.3.8.1";
pub const OID_PATIENT_DATA_SECTION: &str = "2.16.840.1.113883.10.20.17.2.4";
pub const OID_PATIENT_DATA_SECTION_QDM: &str = "2.16.840.1.113883.10.20.24.2.1";
pub const OID_PATIENT_DATA_SECTION_QDM_V2: &str = "2.16.840.1.113883.10.20.24.2.1.1";
pub const OID_ENCOUNTER_PERFORMED: &str = "2.16.840.1.113883.10.20.24.3.23";
pub const OID_ENCOUNTER_DIAGNOSIS_QDM: &str = "2.16.840.1.113883.10.20.24.3.168";
pub const OID_ENCOUNTER_CLASS_ACT: &str = "2.16.840.1.113883.10.20.24.3.171";
pub const OID_RANK_OBSERVATION: &str = "2.16.840.1.113883.10.20.24.3.166";
pub const OID_INTERVENTION_PERFORMED: &str = "2.16.840.1.113883.10.20.24.3.32";
pub const OID_PROCEDURE_PERFORMED: &str = "2.16.840.1.113883.10.20.24.3.64";
pub const OID_PATIENT_CHARACTERISTIC_PAYER: &str = "2.16.840.1.113883.10.20.24.3.55";
pub const OID_NEGATION_RATIONALE: &str = "2.16.840.1.113883.10.20.24.3.88";
pub const OID_AUTHOR_DATETIME: &str = "2.16.840.1.113883.10.20.24.3.155";
pub const OID_PAYMENT_TYPOLOGY_CODE_SYSTEM: &str = "2.16.840.1.113883.3.221.5";
