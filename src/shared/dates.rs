use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Parse a stored schedule date. Accepts plain ISO dates, ISO date-times
/// with or without fractional seconds, and RFC 3339. Time of day is dropped.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}

/// Rewrite a spreadsheet date into ISO form using the first matching
/// format. Text that is already ISO is returned canonicalised; text no
/// format understands yields `None`.
pub fn normalize(raw: &str, formats: &[String]) -> Option<String> {
    let s = raw.trim();
    let date = parse_date(s).or_else(|| {
        formats
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
    })?;
    Some(date.format("%Y-%m-%d").to_string())
}
