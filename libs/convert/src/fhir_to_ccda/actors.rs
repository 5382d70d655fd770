//! Shared actor and record-target composition.
//!
//! Both document shapes (summary/referral documents and QRDA reports)
//! build the same identifier, name, address, telecom and patient
//! demographics structures; keeping one composer prevents the two from
//! drifting apart under template changes.

use crate::datetime::{map_fhir_to_ccda_date, map_fhir_to_ccda_date_time};
use crate::oids::*;
use crate::systems::*;
use crosswalk_cda as cda;
use crosswalk_fhir::{
    find_extension, Address, ContactPoint, Extension, HumanName, Identifier, Patient, Period,
};

/// Configuration for record-target composition. QRDA reports address the
/// patient id through a reporting assigning authority instead of the
/// identity convention.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct RecordTargetConfig {
    pub assigning_authority: Option<&'static str>,
}

/// Map a resource id plus identifier entries back to document ids. The
/// resource id becomes a bare UUID root (the identity convention);
/// identifiers with unmappable systems are dropped.
pub(crate) fn map_identifiers(
    id: Option<&str>,
    identifiers: Option<&[Identifier]>,
) -> Option<Vec<cda::InstanceIdentifier>> {
    let mut result = Vec::new();
    if let Some(id) = id {
        result.push(cda::InstanceIdentifier {
            root: Some(id.to_string()),
            ..Default::default()
        });
    }
    for identifier in identifiers.into_iter().flatten() {
        let Some(root) = map_fhir_system_to_cda(identifier.system.as_deref()) else {
            continue;
        };
        result.push(cda::InstanceIdentifier {
            root: Some(root),
            extension: identifier.value.clone(),
            ..Default::default()
        });
    }
    if result.is_empty() { None } else { Some(result) }
}

pub(crate) fn map_names(names: Option<&[HumanName]>) -> Option<Vec<cda::PersonName>> {
    let names = names?;
    if names.is_empty() {
        return None;
    }
    Some(
        names
            .iter()
            .map(|name| cda::PersonName {
                use_: name
                    .use_
                    .as_deref()
                    .map(|u| HUMAN_NAME_USE_MAPPER.fhir_to_cda_or(Some(u), "L").to_string()),
                prefix: string_values(name.prefix.as_deref()),
                given: string_values(name.given.as_deref()),
                family: name.family.clone().map(cda::TextValue::from),
                suffix: string_values(name.suffix.as_deref()),
            })
            .collect(),
    )
}

fn string_values(values: Option<&[String]>) -> Option<Vec<cda::TextValue>> {
    let values = values?;
    if values.is_empty() {
        return None;
    }
    Some(values.iter().cloned().map(cda::TextValue::from).collect())
}

/// Addresses are required in many document slots; absence renders as an
/// explicit UNK nullFlavor placeholder.
pub(crate) fn map_addresses_or_unknown(addresses: Option<&[Address]>) -> Vec<cda::Addr> {
    let Some(addresses) = addresses.filter(|a| !a.is_empty()) else {
        return vec![cda::Addr {
            null_flavor: Some("UNK".to_string()),
            ..Default::default()
        }];
    };
    addresses
        .iter()
        .map(|address| cda::Addr {
            use_: address
                .use_
                .as_deref()
                .and_then(|u| ADDRESS_USE_MAPPER.fhir_to_cda(u))
                .map(str::to_string),
            street_address_line: address.line.clone(),
            city: address.city.clone(),
            state: address.state.clone(),
            postal_code: address.postal_code.clone(),
            country: address.country.clone(),
            null_flavor: None,
        })
        .collect()
}

pub(crate) fn map_telecoms_or_unknown(telecoms: Option<&[ContactPoint]>) -> Vec<cda::Telecom> {
    let Some(telecoms) = telecoms.filter(|t| !t.is_empty()) else {
        return vec![cda::Telecom {
            null_flavor: Some("UNK".to_string()),
            ..Default::default()
        }];
    };
    telecoms
        .iter()
        .map(|telecom| cda::Telecom {
            use_: telecom
                .use_
                .as_deref()
                .and_then(|u| TELECOM_USE_MAPPER.fhir_to_cda(u))
                .map(str::to_string),
            value: telecom.value.as_deref().map(|value| {
                format!("{}{}", telecom_prefix(telecom.system.as_deref()), value)
            }),
            null_flavor: None,
        })
        .collect()
}

fn telecom_prefix(system: Option<&str>) -> &'static str {
    match system {
        Some("email") => "mailto:",
        Some("phone") => "tel:",
        Some("fax") => "fax:",
        _ => "",
    }
}

/// Compose the record target from patient demographics.
pub(crate) fn record_target(
    patient: &Patient,
    config: RecordTargetConfig,
) -> Vec<cda::RecordTarget> {
    let id = match config.assigning_authority {
        Some(authority) => patient.id.as_deref().map(|id| {
            vec![cda::InstanceIdentifier {
                root: Some(authority.to_string()),
                extension: Some(id.to_string()),
                ..Default::default()
            }]
        }),
        None => map_identifiers(patient.id.as_deref(), patient.identifier.as_deref()),
    };

    vec![cda::RecordTarget {
        patient_role: cda::PatientRole {
            id,
            addr: Some(map_addresses_or_unknown(patient.address.as_deref())),
            telecom: Some(map_telecoms_or_unknown(patient.telecom.as_deref())),
            patient: Some(map_patient_info(patient)),
        },
    }]
}

pub(crate) fn map_patient_info(patient: &Patient) -> cda::PatientInfo {
    cda::PatientInfo {
        name: map_names(patient.name.as_deref()),
        administrative_gender_code: patient.gender.as_deref().map(map_gender_code),
        birth_time: map_fhir_to_ccda_date(patient.birth_date.as_deref()).map(|value| {
            cda::TimeStamp {
                value: Some(value),
                null_flavor: None,
            }
        }),
        race_code: race_codes(patient.extension.as_deref(), US_CORE_RACE_URL, "ombCategory"),
        sdtc_race_code: known_race_codes(patient.extension.as_deref(), US_CORE_RACE_URL, "detailed"),
        ethnic_group_code: race_codes(
            patient.extension.as_deref(),
            US_CORE_ETHNICITY_URL,
            "ombCategory",
        ),
        language_communication: map_language(patient),
    }
}

pub(crate) fn map_gender_code(gender: &str) -> cda::Code {
    match GENDER_MAPPER.entry_by_fhir(gender) {
        Some(entry) => cda::Code {
            code: Some(entry.cda.to_string()),
            display_name: Some(entry.display.to_string()),
            code_system: Some(OID_ADMINISTRATIVE_GENDER_CODE_SYSTEM.to_string()),
            code_system_name: Some("AdministrativeGender".to_string()),
            ..Default::default()
        },
        // Non-enumerated gender codes pass through unchanged.
        None => cda::Code {
            code: Some(gender.to_string()),
            ..Default::default()
        },
    }
}

/// Race/ethnicity extensions render as CDC Race and Ethnicity codes; an
/// absent extension renders as an explicit UNK placeholder.
fn race_codes(
    extensions: Option<&[Extension]>,
    url: &str,
    nested_url: &str,
) -> Option<Vec<cda::Code>> {
    match known_race_codes(extensions, url, nested_url) {
        Some(codes) => Some(codes),
        None => Some(vec![cda::Code {
            null_flavor: Some("UNK".to_string()),
            ..Default::default()
        }]),
    }
}

/// Like `race_codes`, but absent means absent (no UNK placeholder); used
/// for the optional detailed-race element.
fn known_race_codes(
    extensions: Option<&[Extension]>,
    url: &str,
    nested_url: &str,
) -> Option<Vec<cda::Code>> {
    let extension = find_extension(extensions, url)?;
    let codes: Vec<cda::Code> = extension
        .extension
        .iter()
        .flatten()
        .filter(|nested| nested.url == nested_url)
        .filter_map(|nested| nested.value_coding.as_ref())
        .map(|coding| cda::Code {
            code: coding.code.clone(),
            display_name: coding.display.clone(),
            code_system: Some(OID_CDC_RACE_AND_ETHNICITY_CODE_SYSTEM.to_string()),
            code_system_name: Some("CDC Race and Ethnicity".to_string()),
            ..Default::default()
        })
        .collect();
    if codes.is_empty() { None } else { Some(codes) }
}

fn map_language(patient: &Patient) -> Option<Vec<cda::LanguageCommunication>> {
    let communication = patient.communication.as_ref()?.first()?;
    Some(vec![cda::LanguageCommunication {
        language_code: communication
            .language
            .as_ref()
            .and_then(|language| language.first_code())
            .map(|code| cda::Code {
                code: Some(code.to_string()),
                ..Default::default()
            }),
        ..Default::default()
    }])
}

/// A point-or-interval effective time from a FHIR dateTime or period.
pub(crate) fn map_effective_time(
    date_time: Option<&str>,
    period: Option<&Period>,
) -> Option<Vec<cda::EffectiveTime>> {
    if let Some(period) = period {
        return Some(vec![cda::EffectiveTime {
            low: Some(cda::TimeStamp {
                value: map_fhir_to_ccda_date_time(period.start.as_deref()),
                null_flavor: None,
            }),
            high: Some(cda::TimeStamp {
                value: map_fhir_to_ccda_date_time(period.end.as_deref()),
                null_flavor: None,
            }),
            ..Default::default()
        }]);
    }
    date_time.map(|value| {
        vec![cda::EffectiveTime {
            value: map_fhir_to_ccda_date_time(Some(value)),
            ..Default::default()
        }]
    })
}

/// Date-precision variant with an explicit `IVL_TS` interval type.
pub(crate) fn map_effective_date(
    date_time: Option<&str>,
    period: Option<&Period>,
) -> Option<Vec<cda::EffectiveTime>> {
    if let Some(period) = period {
        return Some(vec![cda::EffectiveTime {
            xsi_type: Some("IVL_TS".to_string()),
            low: period.start.as_deref().map(|start| cda::TimeStamp {
                value: map_fhir_to_ccda_date(Some(start)),
                null_flavor: None,
            }),
            high: period.end.as_deref().map(|end| cda::TimeStamp {
                value: map_fhir_to_ccda_date(Some(end)),
                null_flavor: None,
            }),
            ..Default::default()
        }]);
    }
    date_time.map(|value| {
        vec![cda::EffectiveTime {
            value: map_fhir_to_ccda_date(Some(value)),
            ..Default::default()
        }]
    })
}

/// Open/closed interval from start/end date times; missing bounds render
/// as NI nullFlavor when requested.
pub(crate) fn map_effective_period(
    start: Option<&str>,
    end: Option<&str>,
    use_null_flavor: bool,
) -> Option<Vec<cda::EffectiveTime>> {
    if start.is_none() && end.is_none() {
        return None;
    }

    let mut result = cda::EffectiveTime::default();
    match start {
        Some(start) => {
            result.low = Some(cda::TimeStamp {
                value: map_fhir_to_ccda_date_time(Some(start)),
                null_flavor: None,
            });
        }
        None if use_null_flavor => {
            result.low = Some(cda::TimeStamp {
                value: None,
                null_flavor: Some("NI".to_string()),
            });
        }
        None => {}
    }
    match end {
        Some(end) => {
            result.high = Some(cda::TimeStamp {
                value: map_fhir_to_ccda_date_time(Some(end)),
                null_flavor: None,
            });
        }
        None if use_null_flavor => {
            result.high = Some(cda::TimeStamp {
                value: None,
                null_flavor: Some("NI".to_string()),
            });
        }
        None => {}
    }
    Some(vec![result])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crosswalk_fhir::Coding;

    #[test]
    fn resource_id_becomes_bare_root() {
        let ids = map_identifiers(Some("bc01a5d1-3a34-4286-82cc-43eb04c972a7"), None).unwrap();
        assert_eq!(ids.len(), 1);
        assert_eq!(ids[0].root.as_deref(), Some("bc01a5d1-3a34-4286-82cc-43eb04c972a7"));
        assert!(ids[0].extension.is_none());
    }

    #[test]
    fn unmappable_identifier_system_is_dropped() {
        let identifiers = vec![
            Identifier {
                system: Some(US_SSN_URL.to_string()),
                value: Some("999-99-9999".to_string()),
            },
            Identifier {
                system: Some("http://unmapped.example".to_string()),
                value: Some("x".to_string()),
            },
        ];
        let ids = map_identifiers(None, Some(&identifiers)).unwrap();
        assert_eq!(ids.len(), 1);
        assert_eq!(ids[0].root.as_deref(), Some(OID_US_SSN_CODE_SYSTEM));
    }

    #[test]
    fn missing_address_renders_unknown() {
        let addrs = map_addresses_or_unknown(None);
        assert_eq!(addrs[0].null_flavor.as_deref(), Some("UNK"));
    }

    #[test]
    fn race_extension_renders_cdc_codes() {
        let patient = Patient {
            extension: Some(vec![Extension {
                url: US_CORE_RACE_URL.to_string(),
                extension: Some(vec![Extension {
                    url: "ombCategory".to_string(),
                    value_coding: Some(Coding {
                        system: Some("urn:oid:2.16.840.1.113883.6.238".to_string()),
                        code: Some("2131-1".to_string()),
                        display: Some("Other Race".to_string()),
                    }),
                    ..Default::default()
                }]),
                ..Default::default()
            }]),
            ..Default::default()
        };
        let info = map_patient_info(&patient);
        let races = info.race_code.unwrap();
        assert_eq!(races[0].code.as_deref(), Some("2131-1"));
        assert_eq!(races[0].display_name.as_deref(), Some("Other Race"));
        assert_eq!(
            races[0].code_system.as_deref(),
            Some(OID_CDC_RACE_AND_ETHNICITY_CODE_SYSTEM)
        );
        // Ethnicity was absent and renders as an explicit unknown.
        assert_eq!(info.ethnic_group_code.unwrap()[0].null_flavor.as_deref(), Some("UNK"));
    }

    #[test]
    fn gender_identity_codes_pass_through() {
        let code = map_gender_code("33791000087105");
        assert_eq!(code.code.as_deref(), Some("33791000087105"));
        assert!(code.code_system.is_none());
    }
}
