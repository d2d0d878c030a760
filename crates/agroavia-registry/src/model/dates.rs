//! Date helpers shared by the record models

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};

/// Parse a calendar date typed by a user or stored by an older build.
///
/// Accepts `YYYY-MM-DD`, `DD.MM.YYYY` and full RFC 3339 timestamps.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d.%m.%Y"))
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.with_timezone(&Utc).date_naive())
        })
}

/// Render a timestamp the way order tables show it (`dd.mm.yyyy`)
pub fn format_ru_date(at: &DateTime<Utc>) -> String {
    at.format("%d.%m.%Y").to_string()
}

/// Deserialize an optional date, mapping blanks and garbage to `None`
pub(crate) fn lenient<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_date))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 15);
        assert_eq!(parse_date("2024-01-15"), expected);
        assert_eq!(parse_date("15.01.2024"), expected);
        assert_eq!(parse_date("2024-01-15T10:30:00.000Z"), expected);
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("soon"), None);
    }

    #[test]
    fn test_format_ru_date() {
        let at = Utc.with_ymd_and_hms(2024, 6, 10, 8, 0, 0).unwrap();
        assert_eq!(format_ru_date(&at), "10.06.2024");
    }
}
