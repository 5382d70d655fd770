//! HL7 TS (`YYYYMMDDHHMMSS±zzzz`) ↔ FHIR date/dateTime conversion.
//!
//! CDA timestamps truncate from the right; partial values map to the
//! matching FHIR precision (`YYYY`, `YYYY-MM`, `YYYY-MM-DD`).

use chrono::{DateTime, NaiveDate};

/// Map an HL7 TS to a FHIR `date`, truncating any time component.
pub fn map_cda_to_fhir_date(value: Option<&str>) -> Option<String> {
    let digits = leading_digits(value?.trim());
    match digits.len() {
        0..=3 => None,
        4 | 5 => Some(digits[0..4].to_string()),
        6 | 7 => Some(format!("{}-{}", &digits[0..4], &digits[4..6])),
        _ => {
            // Validate through chrono so garbage like 20241399 is rejected.
            let date = NaiveDate::from_ymd_opt(
                digits[0..4].parse().ok()?,
                digits[4..6].parse().ok()?,
                digits[6..8].parse().ok()?,
            )?;
            Some(date.format("%Y-%m-%d").to_string())
        }
    }
}

/// Map an HL7 TS to a FHIR `dateTime`. Timestamps without a time
/// component degrade to a date; timestamps without an offset are taken
/// as UTC.
pub fn map_cda_to_fhir_date_time(value: Option<&str>) -> Option<String> {
    let value = value?.trim();
    let digits = leading_digits(value);
    if digits.len() < 12 {
        return map_cda_to_fhir_date(Some(value));
    }

    let date = map_cda_to_fhir_date(Some(&digits[0..8]))?;
    let hour = &digits[8..10];
    let minute = &digits[10..12];
    let second = if digits.len() >= 14 { &digits[12..14] } else { "00" };

    let offset = match value[digits.len()..].as_bytes() {
        [sign @ (b'+' | b'-'), rest @ ..] if rest.len() >= 4 => {
            let rest = std::str::from_utf8(&rest[0..4]).ok()?;
            format!("{}{}:{}", *sign as char, &rest[0..2], &rest[2..4])
        }
        _ => "Z".to_string(),
    };

    let result = format!("{date}T{hour}:{minute}:{second}{offset}");
    // Round-trip through chrono to reject out-of-range components.
    DateTime::parse_from_rfc3339(&result).ok()?;
    Some(result)
}

/// Map a FHIR `date`/`dateTime` to an HL7 TS date (`YYYYMMDD`,
/// truncating time).
pub fn map_fhir_to_ccda_date(value: Option<&str>) -> Option<String> {
    let value = value?.trim();
    let date_part = value.split('T').next()?;
    let stripped: String = date_part.chars().filter(|c| c.is_ascii_digit()).collect();
    if stripped.is_empty() {
        None
    } else {
        Some(stripped)
    }
}

/// Map a FHIR `dateTime` to a full HL7 TS with offset
/// (`YYYYMMDDHHMMSS±zzzz`); `Z` renders as `+0000`. Date-only input
/// degrades to `YYYYMMDD`.
pub fn map_fhir_to_ccda_date_time(value: Option<&str>) -> Option<String> {
    let value = value?.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Some(instant.format("%Y%m%d%H%M%S%z").to_string());
    }
    // Seconds are optional in FHIR dateTime; retry with :00 appended
    // before the offset.
    if let Some(padded) = pad_missing_seconds(value) {
        if let Ok(instant) = DateTime::parse_from_rfc3339(&padded) {
            return Some(instant.format("%Y%m%d%H%M%S%z").to_string());
        }
    }
    map_fhir_to_ccda_date(Some(value))
}

fn pad_missing_seconds(value: &str) -> Option<String> {
    let t = value.find('T')?;
    let time = &value[t + 1..];
    let offset_at = time
        .find(['+', '-', 'Z'])
        .map(|i| t + 1 + i)
        .unwrap_or(value.len());
    if offset_at - (t + 1) == 5 {
        let mut padded = value[..offset_at].to_string();
        padded.push_str(":00");
        padded.push_str(&value[offset_at..]);
        Some(padded)
    } else {
        None
    }
}

fn leading_digits(value: &str) -> &str {
    let end = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    &value[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_truncation_levels() {
        assert_eq!(map_cda_to_fhir_date(Some("2024")).as_deref(), Some("2024"));
        assert_eq!(map_cda_to_fhir_date(Some("202401")).as_deref(), Some("2024-01"));
        assert_eq!(
            map_cda_to_fhir_date(Some("20240115")).as_deref(),
            Some("2024-01-15")
        );
        assert_eq!(
            map_cda_to_fhir_date(Some("20240115103000")).as_deref(),
            Some("2024-01-15")
        );
        assert_eq!(map_cda_to_fhir_date(Some("202413")), None);
        assert_eq!(map_cda_to_fhir_date(None), None);
    }

    #[test]
    fn date_time_with_offset() {
        assert_eq!(
            map_cda_to_fhir_date_time(Some("20240115103000-0500")).as_deref(),
            Some("2024-01-15T10:30:00-05:00")
        );
        assert_eq!(
            map_cda_to_fhir_date_time(Some("20240115103000")).as_deref(),
            Some("2024-01-15T10:30:00Z")
        );
        // No time component degrades to date.
        assert_eq!(
            map_cda_to_fhir_date_time(Some("20240115")).as_deref(),
            Some("2024-01-15")
        );
    }

    #[test]
    fn fhir_to_ccda_date() {
        assert_eq!(
            map_fhir_to_ccda_date(Some("1970-05-01")).as_deref(),
            Some("19700501")
        );
        assert_eq!(
            map_fhir_to_ccda_date(Some("2024-01-15T10:30:00Z")).as_deref(),
            Some("20240115")
        );
        assert_eq!(map_fhir_to_ccda_date(Some("1970-05")).as_deref(), Some("197005"));
    }

    #[test]
    fn fhir_to_ccda_date_time() {
        assert_eq!(
            map_fhir_to_ccda_date_time(Some("2024-01-15T10:30:00-05:00")).as_deref(),
            Some("20240115103000-0500")
        );
        assert_eq!(
            map_fhir_to_ccda_date_time(Some("2024-01-15T10:30:00Z")).as_deref(),
            Some("20240115103000+0000")
        );
        assert_eq!(
            map_fhir_to_ccda_date_time(Some("2024-01-15T10:30Z")).as_deref(),
            Some("20240115103000+0000")
        );
        assert_eq!(
            map_fhir_to_ccda_date_time(Some("2024-01-15")).as_deref(),
            Some("20240115")
        );
    }

    #[test]
    fn hl7_round_trip_preserves_instant() {
        let hl7 = "20240115103000-0500";
        let fhir = map_cda_to_fhir_date_time(Some(hl7)).unwrap();
        assert_eq!(map_fhir_to_ccda_date_time(Some(&fhir)).as_deref(), Some(hl7));
    }
}
