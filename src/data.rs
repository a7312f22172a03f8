use anyhow::{Result, anyhow};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

const MISSING_TOKENS: &[&str] = &["na", "n/a", "nan", "null", "none"];

pub fn is_missing_token(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty()
        || MISSING_TOKENS
            .iter()
            .any(|token| trimmed.eq_ignore_ascii_case(token))
}

pub fn parse_naive_date(value: &str) -> Result<NaiveDate> {
    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%Y/%m/%d", "%d-%m-%Y"];
    for fmt in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(value, fmt) {
            return Ok(parsed);
        }
    }
    Err(anyhow!("Failed to parse '{value}' as date"))
}

pub fn parse_naive_datetime(value: &str) -> Result<NaiveDateTime> {
    const DATETIME_FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%d/%m/%Y %H:%M:%S",
        "%m/%d/%Y %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];
    for fmt in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, fmt) {
            return Ok(parsed);
        }
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.naive_utc());
    }
    Err(anyhow!("Failed to parse '{value}' as datetime"))
}

/// Parses a date or datetime cell; plain dates land on midnight.
pub fn parse_temporal(value: &str) -> Result<NaiveDateTime> {
    let trimmed = value.trim();
    parse_naive_datetime(trimmed)
        .or_else(|_| parse_naive_date(trimmed).map(|date| date.and_time(NaiveTime::MIN)))
        .map_err(|_| anyhow!("Failed to parse '{trimmed}' as date or datetime"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    #[test]
    fn missing_tokens_are_case_insensitive() {
        assert!(is_missing_token(""));
        assert!(is_missing_token("  NA "));
        assert!(is_missing_token("NaN"));
        assert!(is_missing_token("NULL"));
        assert!(is_missing_token("None"));
        assert!(!is_missing_token("nancy"));
        assert!(!is_missing_token("0"));
    }

    #[test]
    fn parse_naive_date_supports_multiple_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 6).unwrap();
        assert_eq!(parse_naive_date("2024-05-06").unwrap(), expected);
        assert_eq!(parse_naive_date("06/05/2024").unwrap(), expected);
        assert_eq!(parse_naive_date("2024/05/06").unwrap(), expected);
    }

    #[test]
    fn parse_naive_datetime_supports_multiple_formats() {
        let expected =
            NaiveDateTime::parse_from_str("2024-05-06 14:30:00", "%Y-%m-%d %H:%M:%S").unwrap();
        assert_eq!(
            parse_naive_datetime("2024-05-06T14:30:00").unwrap(),
            expected
        );
        assert_eq!(
            parse_naive_datetime("06/05/2024 14:30:00").unwrap(),
            expected
        );
        assert_eq!(parse_naive_datetime("2024-05-06 14:30").unwrap(), expected);
        assert_eq!(
            parse_naive_datetime("2024-05-06T14:30:00Z").unwrap(),
            expected
        );
    }

    #[test]
    fn parse_temporal_promotes_dates_to_midnight() {
        let parsed = parse_temporal(" 2016-02-29 ").unwrap();
        assert_eq!(
            parsed,
            NaiveDate::from_ymd_opt(2016, 2, 29)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
        assert!(parse_temporal("2016-02-30").is_err());
        assert!(parse_temporal("x").is_err());
    }
}
