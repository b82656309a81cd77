//! Week identifiers (`2025-week-48`) and report date handling.

use once_cell::sync::Lazy;
use regex::Regex;
use time::{
    Date, OffsetDateTime, UtcOffset, format_description::well_known::Rfc3339,
    macros::format_description,
};

use super::error::DomainError;

static WEEK_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-week-\d{1,2}$").expect("week pattern is valid"));

/// Derive the week identifier for a moment, using its ISO-8601 year and week number.
pub fn week_identifier(moment: OffsetDateTime) -> String {
    let (year, week, _) = moment.to_offset(UtcOffset::UTC).date().to_iso_week_date();
    format!("{year}-week-{week}")
}

/// Week identifiers double as file names, so only the canonical shape is accepted.
pub fn is_valid_week_identifier(value: &str) -> bool {
    WEEK_ID_PATTERN.is_match(value)
}

/// Parse a report date: RFC 3339 timestamps or plain `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_report_date(value: &str) -> Result<OffsetDateTime, DomainError> {
    let trimmed = value.trim();

    if let Ok(moment) = OffsetDateTime::parse(trimmed, &Rfc3339) {
        return Ok(moment);
    }

    Date::parse(trimmed, format_description!("[year]-[month]-[day]"))
        .map(|date| date.midnight().assume_utc())
        .map_err(|err| DomainError::malformed_report(format!("unparseable date `{trimmed}`: {err}")))
}

/// Long-form display date, e.g. `November 27, 2025`.
pub fn format_display_date(moment: OffsetDateTime) -> String {
    let format = format_description!("[month repr:long] [day padding:none], [year]");
    moment
        .format(format)
        .unwrap_or_else(|_| moment.date().to_string())
}

/// Canonical timestamp stored in generated frontmatter.
pub fn format_timestamp(moment: OffsetDateTime) -> String {
    moment
        .to_offset(UtcOffset::UTC)
        .format(&Rfc3339)
        .unwrap_or_else(|_| moment.date().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn week_identifier_uses_iso_week() {
        assert_eq!(week_identifier(datetime!(2025-11-27 10:00 UTC)), "2025-week-48");
        assert_eq!(week_identifier(datetime!(2025-01-08 00:00 UTC)), "2025-week-2");
    }

    #[test]
    fn week_identifier_follows_iso_year_at_boundaries() {
        // 2024-12-30 is the Monday of ISO week 1 of 2025.
        assert_eq!(week_identifier(datetime!(2024-12-30 12:00 UTC)), "2025-week-1");
    }

    #[test]
    fn week_identifier_validation() {
        assert!(is_valid_week_identifier("2025-week-48"));
        assert!(is_valid_week_identifier("2025-week-1"));
        assert!(!is_valid_week_identifier("../2025-week-48"));
        assert!(!is_valid_week_identifier("2025-week-"));
        assert!(!is_valid_week_identifier("week-48"));
    }

    #[test]
    fn parses_rfc3339_and_plain_dates() {
        assert_eq!(
            parse_report_date("2025-11-27T10:00:00.000Z").expect("rfc3339"),
            datetime!(2025-11-27 10:00 UTC)
        );
        assert_eq!(
            parse_report_date("2025-01-08").expect("plain date"),
            datetime!(2025-01-08 00:00 UTC)
        );
        assert!(parse_report_date("last tuesday").is_err());
    }

    #[test]
    fn display_date_is_long_form() {
        assert_eq!(
            format_display_date(datetime!(2025-11-07 10:00 UTC)),
            "November 7, 2025"
        );
    }
}
