//! Section template registry.
//!
//! Maps section LOINC codes to the ordered template-id sequences the
//! document format requires. The registry is the single source for both
//! converters: every code the reverse converter accepts here resolves to
//! template ids the forward converter recognizes when the document is
//! re-parsed, which the round-trip tests depend on.

use crate::oids::*;
use crate::systems::*;
use crosswalk_cda::TemplateId;

/// One template id in a registry sequence: root plus optional version
/// extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateIdSpec {
    pub root: &'static str,
    pub extension: Option<&'static str>,
}

impl TemplateIdSpec {
    const fn new(root: &'static str) -> TemplateIdSpec {
        TemplateIdSpec { root, extension: None }
    }

    const fn versioned(root: &'static str, extension: &'static str) -> TemplateIdSpec {
        TemplateIdSpec { root, extension: Some(extension) }
    }

    pub fn to_template_id(self) -> TemplateId {
        TemplateId {
            root: Some(self.root.to_string()),
            extension: self.extension.map(str::to_string),
        }
    }
}

/// Materialize a spec sequence into document template ids.
pub fn template_ids(specs: &[TemplateIdSpec]) -> Vec<TemplateId> {
    specs.iter().map(|spec| spec.to_template_id()).collect()
}

/// US Realm Header sequence for summary documents.
pub const SUMMARY_TEMPLATE_IDS: &[TemplateIdSpec] = &[
    TemplateIdSpec::new(OID_US_REALM_HEADER),
    TemplateIdSpec::versioned(OID_US_REALM_HEADER, "2015-08-01"),
];

/// Header sequence for referral notes.
pub const REFERRAL_TEMPLATE_IDS: &[TemplateIdSpec] = &[
    TemplateIdSpec::new(OID_US_REALM_HEADER),
    TemplateIdSpec::versioned(OID_US_REALM_HEADER, "2015-08-01"),
    TemplateIdSpec::new(OID_REFERRAL_NOTE),
    TemplateIdSpec::versioned(OID_REFERRAL_NOTE, "2015-08-01"),
];

const ALLERGIES: &[TemplateIdSpec] = &[
    TemplateIdSpec::new(OID_ALLERGIES_SECTION_ENTRIES_REQUIRED),
    TemplateIdSpec::versioned(OID_ALLERGIES_SECTION_ENTRIES_REQUIRED, "2015-08-01"),
];
const MEDICATIONS: &[TemplateIdSpec] = &[
    TemplateIdSpec::new(OID_MEDICATIONS_SECTION_ENTRIES_REQUIRED),
    TemplateIdSpec::versioned(OID_MEDICATIONS_SECTION_ENTRIES_REQUIRED, "2014-06-09"),
];
const PROBLEMS: &[TemplateIdSpec] = &[
    TemplateIdSpec::new(OID_PROBLEMS_SECTION_ENTRIES_REQUIRED),
    TemplateIdSpec::versioned(OID_PROBLEMS_SECTION_ENTRIES_REQUIRED, "2015-08-01"),
];
const PROCEDURES: &[TemplateIdSpec] = &[
    TemplateIdSpec::new(OID_PROCEDURES_SECTION_ENTRIES_REQUIRED),
    TemplateIdSpec::versioned(OID_PROCEDURES_SECTION_ENTRIES_REQUIRED, "2014-06-09"),
];
const RESULTS: &[TemplateIdSpec] = &[
    TemplateIdSpec::new(OID_RESULTS_SECTION_ENTRIES_REQUIRED),
    TemplateIdSpec::versioned(OID_RESULTS_SECTION_ENTRIES_REQUIRED, "2015-08-01"),
];
const SOCIAL_HISTORY: &[TemplateIdSpec] = &[
    TemplateIdSpec::new(OID_SOCIAL_HISTORY_SECTION),
    TemplateIdSpec::versioned(OID_SOCIAL_HISTORY_SECTION, "2015-08-01"),
];
const VITAL_SIGNS: &[TemplateIdSpec] = &[
    TemplateIdSpec::new(OID_VITAL_SIGNS_SECTION_ENTRIES_REQUIRED),
    TemplateIdSpec::versioned(OID_VITAL_SIGNS_SECTION_ENTRIES_REQUIRED, "2015-08-01"),
];
const IMMUNIZATIONS: &[TemplateIdSpec] = &[
    TemplateIdSpec::new(OID_IMMUNIZATIONS_SECTION_ENTRIES_REQUIRED),
    TemplateIdSpec::versioned(OID_IMMUNIZATIONS_SECTION_ENTRIES_REQUIRED, "2015-08-01"),
];
const PLAN_OF_TREATMENT: &[TemplateIdSpec] = &[
    TemplateIdSpec::new(OID_PLAN_OF_CARE_SECTION),
    TemplateIdSpec::versioned(OID_PLAN_OF_CARE_SECTION, "2014-06-09"),
];
const ASSESSMENTS: &[TemplateIdSpec] = &[TemplateIdSpec::new(OID_ASSESSMENTS_SECTION)];
const GOALS: &[TemplateIdSpec] = &[TemplateIdSpec::new(OID_GOALS_SECTION)];
const HEALTH_CONCERNS: &[TemplateIdSpec] = &[
    TemplateIdSpec::versioned(OID_HEALTH_CONCERNS_SECTION, "2015-08-01"),
    TemplateIdSpec::versioned(OID_HEALTH_CONCERNS_SECTION, "2022-06-01"),
];
const ENCOUNTERS: &[TemplateIdSpec] = &[
    TemplateIdSpec::new(OID_ENCOUNTERS_SECTION_ENTRIES_REQUIRED),
    TemplateIdSpec::versioned(OID_ENCOUNTERS_SECTION_ENTRIES_REQUIRED, "2015-08-01"),
];
const DEVICES: &[TemplateIdSpec] = &[
    TemplateIdSpec::new(OID_MEDICAL_EQUIPMENT_SECTION),
    TemplateIdSpec::versioned(OID_MEDICAL_EQUIPMENT_SECTION, "2014-06-09"),
];
const CARE_TEAMS: &[TemplateIdSpec] =
    &[TemplateIdSpec::versioned(OID_CARE_TEAMS_SECTION, "2022-06-01")];
const MENTAL_STATUS: &[TemplateIdSpec] = &[
    TemplateIdSpec::new(OID_MENTAL_STATUS_SECTION),
    TemplateIdSpec::versioned(OID_MENTAL_STATUS_SECTION, "2015-08-01"),
];
const INSURANCE: &[TemplateIdSpec] = &[
    TemplateIdSpec::new(OID_PAYERS_SECTION),
    TemplateIdSpec::versioned(OID_PAYERS_SECTION, "2015-08-01"),
];
const NOTES: &[TemplateIdSpec] = &[TemplateIdSpec::versioned(OID_NOTES_SECTION, "2016-11-01")];
const REASON_FOR_REFERRAL: &[TemplateIdSpec] = &[
    TemplateIdSpec::versioned(OID_REASON_FOR_REFERRAL, "2014-06-09"),
    TemplateIdSpec::new(OID_REASON_FOR_REFERRAL),
];

/// Resolve a section LOINC code to its template-id sequence. The set is
/// closed; codes outside it are a modeling gap, not permissive input.
pub fn section_template_ids(loinc: &str) -> Option<&'static [TemplateIdSpec]> {
    match loinc {
        LOINC_ALLERGIES_SECTION => Some(ALLERGIES),
        LOINC_MEDICATIONS_SECTION => Some(MEDICATIONS),
        LOINC_PROBLEMS_SECTION => Some(PROBLEMS),
        LOINC_PROCEDURES_SECTION => Some(PROCEDURES),
        LOINC_RESULTS_SECTION => Some(RESULTS),
        LOINC_SOCIAL_HISTORY_SECTION => Some(SOCIAL_HISTORY),
        LOINC_VITAL_SIGNS_SECTION => Some(VITAL_SIGNS),
        LOINC_IMMUNIZATIONS_SECTION => Some(IMMUNIZATIONS),
        LOINC_PLAN_OF_TREATMENT_SECTION => Some(PLAN_OF_TREATMENT),
        LOINC_ASSESSMENTS_SECTION => Some(ASSESSMENTS),
        LOINC_GOALS_SECTION => Some(GOALS),
        LOINC_HEALTH_CONCERNS_SECTION => Some(HEALTH_CONCERNS),
        LOINC_ENCOUNTERS_SECTION => Some(ENCOUNTERS),
        LOINC_DEVICES_SECTION => Some(DEVICES),
        LOINC_CARE_TEAM_SECTION => Some(CARE_TEAMS),
        LOINC_MENTAL_STATUS_SECTION => Some(MENTAL_STATUS),
        LOINC_INSURANCE_SECTION => Some(INSURANCE),
        LOINC_NOTES_SECTION => Some(NOTES),
        LOINC_REASON_FOR_REFERRAL_SECTION => Some(REASON_FOR_REFERRAL),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_section_codes_resolve() {
        let specs = section_template_ids(LOINC_ALLERGIES_SECTION).unwrap();
        assert_eq!(specs[0].root, OID_ALLERGIES_SECTION_ENTRIES_REQUIRED);
        assert_eq!(specs[1].extension, Some("2015-08-01"));
    }

    #[test]
    fn unknown_section_code_is_absent() {
        assert!(section_template_ids("99999-9").is_none());
    }

    #[test]
    fn registry_stays_in_lock_step_with_forward_dispatch() {
        // Every registered section must resolve to a section kind the
        // forward converter recognizes.
        for loinc in [
            LOINC_ALLERGIES_SECTION,
            LOINC_MEDICATIONS_SECTION,
            LOINC_PROBLEMS_SECTION,
            LOINC_PROCEDURES_SECTION,
            LOINC_RESULTS_SECTION,
            LOINC_SOCIAL_HISTORY_SECTION,
            LOINC_VITAL_SIGNS_SECTION,
            LOINC_IMMUNIZATIONS_SECTION,
            LOINC_PLAN_OF_TREATMENT_SECTION,
            LOINC_GOALS_SECTION,
            LOINC_HEALTH_CONCERNS_SECTION,
            LOINC_ENCOUNTERS_SECTION,
            LOINC_CARE_TEAM_SECTION,
        ] {
            let specs = section_template_ids(loinc).unwrap();
            let kind = crate::ccda_to_fhir::section_kind(specs[0].root);
            assert_ne!(
                kind,
                crate::ccda_to_fhir::SectionKind::Unsupported,
                "section {loinc} maps to an unsupported template root"
            );
        }
    }
}
