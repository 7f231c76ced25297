//! Small field-format predicates shared by the auth and application
//! validation paths.

use chrono::{DateTime, NaiveDate};

/// Deliberately loose email shape check: one `@`, a dotted domain, no
/// whitespace. Deliverability is the mail server's problem.
pub fn is_valid_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !value.chars().any(char::is_whitespace)
}

/// Accepts an ISO-8601 calendar date (`2024-09-01`) or a full RFC 3339
/// timestamp.
pub fn is_iso_date(value: &str) -> bool {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
        || DateTime::parse_from_rfc3339(value).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_email_accepted() {
        assert!(is_valid_email("jane.doe@example.com"));
    }

    #[test]
    fn test_missing_at_rejected() {
        assert!(!is_valid_email("jane.example.com"));
    }

    #[test]
    fn test_dotless_domain_rejected() {
        assert!(!is_valid_email("jane@localhost"));
    }

    #[test]
    fn test_whitespace_rejected() {
        assert!(!is_valid_email("jane doe@example.com"));
    }

    #[test]
    fn test_double_at_rejected() {
        assert!(!is_valid_email("jane@doe@example.com"));
    }

    #[test]
    fn test_calendar_date_accepted() {
        assert!(is_iso_date("2024-09-01"));
    }

    #[test]
    fn test_rfc3339_timestamp_accepted() {
        assert!(is_iso_date("2024-09-01T08:30:00Z"));
    }

    #[test]
    fn test_us_style_date_rejected() {
        assert!(!is_iso_date("09/01/2024"));
    }

    #[test]
    fn test_nonsense_date_rejected() {
        assert!(!is_iso_date("2024-13-45"));
        assert!(!is_iso_date("soon"));
    }
}
