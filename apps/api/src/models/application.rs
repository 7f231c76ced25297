use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Application lifecycle states. Created as `pending`; only the owning
/// company moves it from there.
pub const STATUSES: &[&str] = &["pending", "reviewed", "shortlisted", "rejected", "hired"];

pub fn is_valid_status(value: &str) -> bool {
    STATUSES.contains(&value)
}

/// A candidate's submission against a job. At most one exists per
/// (job, candidate) pair; the unique index on those columns is the final
/// arbiter under concurrent submissions.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRow {
    pub id: Uuid,
    pub job_id: Uuid,
    pub candidate_id: Uuid,
    pub status: String,
    pub personal_info: Json<PersonalInfo>,
    pub professional_info: Json<ProfessionalInfo>,
    pub application_details: Json<ApplicationDetails>,
    pub applied_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portfolio_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfessionalInfo {
    pub experience: String,
    pub current_role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_company: Option<String>,
    pub salary_expectation: String,
    /// ISO-8601 calendar date the candidate can start.
    pub availability_date: String,
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationDetails {
    pub cover_letter: String,
    pub why_interested: String,
    /// Storage key of the uploaded resume. Mandatory on submission.
    pub resume_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portfolio_path: Option<String>,
    #[serde(default)]
    pub references: bool,
    #[serde(default)]
    pub relocate: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_work: Option<String>,
}
