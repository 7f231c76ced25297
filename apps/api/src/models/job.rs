use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A posted position, owned by a company.
///
/// `salary_range` is free text ("$120k - $150k"), not a numeric pair.
/// `applications_count` is a denormalized counter maintained by
/// increment-on-create in the submission workflow, never recomputed.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct JobRow {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub company_logo: String,
    pub category: String,
    pub location: String,
    pub employment_type: String,
    pub experience_level: String,
    pub salary_range: String,
    pub description: String,
    pub skills: Vec<String>,
    pub is_active: bool,
    pub applications_count: i32,
    pub company_id: Uuid,
    pub posted_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Job categories accepted by the board.
pub const CATEGORIES: &[&str] = &[
    "Engineering",
    "Product",
    "Design",
    "Marketing",
    "Data",
    "Sales",
    "Operations",
];

/// Employment types. "Remote" doubles as the remote-mode tag the listing
/// filter keys on.
pub const EMPLOYMENT_TYPES: &[&str] = &["Full-time", "Part-time", "Contract", "Remote"];

pub const EXPERIENCE_LEVELS: &[&str] = &["Entry", "Mid-Level", "Senior", "Lead"];

pub fn is_valid_category(value: &str) -> bool {
    CATEGORIES.contains(&value)
}

pub fn is_valid_employment_type(value: &str) -> bool {
    EMPLOYMENT_TYPES.contains(&value)
}

pub fn is_valid_experience_level(value: &str) -> bool {
    EXPERIENCE_LEVELS.contains(&value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_category_accepted() {
        assert!(is_valid_category("Engineering"));
    }

    #[test]
    fn test_unknown_category_rejected() {
        assert!(!is_valid_category("Astrology"));
    }

    #[test]
    fn test_category_match_is_case_sensitive() {
        assert!(!is_valid_category("engineering"));
    }

    #[test]
    fn test_remote_is_an_employment_type() {
        assert!(is_valid_employment_type("Remote"));
    }

    #[test]
    fn test_experience_levels() {
        assert!(is_valid_experience_level("Mid-Level"));
        assert!(!is_valid_experience_level("Intern"));
    }
}
