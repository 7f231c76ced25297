//! Submission validation. Runs before anything is persisted and reports
//! every violated field in one pass, not just the first.

use serde::Deserialize;

use crate::errors::FieldError;
use crate::models::application::{ApplicationDetails, PersonalInfo, ProfessionalInfo};
use crate::validate::{is_iso_date, is_valid_email};

pub const COVER_LETTER_MAX: usize = 2000;
pub const WHY_INTERESTED_MAX: usize = 1000;

/// Remote-work preferences a candidate may state on an application. Distinct
/// from the listing filter's remote modes.
const REMOTE_WORK_PREFERENCES: &[&str] = &["remote", "hybrid", "onsite", "flexible"];

/// Raw deserialization targets for the multipart JSON sub-objects. Every
/// field is optional here so one malformed request can still produce a full
/// list of violations.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfoInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub linkedin_url: Option<String>,
    pub portfolio_url: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfessionalInfoInput {
    pub experience: Option<String>,
    pub current_role: Option<String>,
    pub current_company: Option<String>,
    pub salary_expectation: Option<String>,
    pub availability_date: Option<String>,
    pub skills: Option<Vec<String>>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationDetailsInput {
    pub cover_letter: Option<String>,
    pub why_interested: Option<String>,
    pub references: Option<bool>,
    pub relocate: Option<bool>,
    pub remote_work: Option<String>,
}

/// Validated, fully-populated submission content. The resume path is filled
/// in later, once the upload has been stored.
#[derive(Debug)]
pub struct ValidatedSubmission {
    pub personal: PersonalInfo,
    pub professional: ProfessionalInfo,
    pub cover_letter: String,
    pub why_interested: String,
    pub references: bool,
    pub relocate: bool,
    pub remote_work: Option<String>,
}

impl ValidatedSubmission {
    pub fn into_details(self, resume_path: String, portfolio_path: Option<String>) -> (PersonalInfo, ProfessionalInfo, ApplicationDetails) {
        (
            self.personal,
            self.professional,
            ApplicationDetails {
                cover_letter: self.cover_letter,
                why_interested: self.why_interested,
                resume_path,
                portfolio_path,
                references: self.references,
                relocate: self.relocate,
                remote_work: self.remote_work,
            },
        )
    }
}

fn require_text(
    errors: &mut Vec<FieldError>,
    field: &str,
    value: &Option<String>,
    message: &str,
) -> Option<String> {
    match value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => Some(v.to_string()),
        None => {
            errors.push(FieldError::new(field, message));
            None
        }
    }
}

/// Checks every rule and collects every violation. `has_resume` reflects
/// whether a resume file arrived with the multipart request.
pub fn validate_submission(
    personal: &PersonalInfoInput,
    professional: &ProfessionalInfoInput,
    details: &ApplicationDetailsInput,
    has_resume: bool,
) -> Result<ValidatedSubmission, Vec<FieldError>> {
    let mut errors = Vec::new();

    let first_name = require_text(
        &mut errors,
        "personalInfo.firstName",
        &personal.first_name,
        "First name is required",
    );
    let last_name = require_text(
        &mut errors,
        "personalInfo.lastName",
        &personal.last_name,
        "Last name is required",
    );
    let email = match personal.email.as_deref().map(str::trim) {
        Some(v) if is_valid_email(v) => Some(v.to_lowercase()),
        _ => {
            errors.push(FieldError::new(
                "personalInfo.email",
                "Valid email is required",
            ));
            None
        }
    };
    let phone = require_text(
        &mut errors,
        "personalInfo.phone",
        &personal.phone,
        "Phone number is required",
    );
    let location = require_text(
        &mut errors,
        "personalInfo.location",
        &personal.location,
        "Location is required",
    );

    let experience = require_text(
        &mut errors,
        "professionalInfo.experience",
        &professional.experience,
        "Experience level is required",
    );
    let current_role = require_text(
        &mut errors,
        "professionalInfo.currentRole",
        &professional.current_role,
        "Current role is required",
    );
    let salary_expectation = require_text(
        &mut errors,
        "professionalInfo.salaryExpectation",
        &professional.salary_expectation,
        "Salary expectation is required",
    );
    let availability_date = match professional.availability_date.as_deref().map(str::trim) {
        Some(v) if is_iso_date(v) => Some(v.to_string()),
        _ => {
            errors.push(FieldError::new(
                "professionalInfo.availabilityDate",
                "Valid availability date is required",
            ));
            None
        }
    };
    let skills: Vec<String> = professional
        .skills
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if skills.is_empty() {
        errors.push(FieldError::new(
            "professionalInfo.skills",
            "At least one skill is required",
        ));
    }

    let cover_letter = require_text(
        &mut errors,
        "applicationDetails.coverLetter",
        &details.cover_letter,
        "Cover letter is required",
    );
    if let Some(v) = &cover_letter {
        if v.chars().count() > COVER_LETTER_MAX {
            errors.push(FieldError::new(
                "applicationDetails.coverLetter",
                "Cover letter cannot exceed 2000 characters",
            ));
        }
    }
    let why_interested = require_text(
        &mut errors,
        "applicationDetails.whyInterested",
        &details.why_interested,
        "Interest explanation is required",
    );
    if let Some(v) = &why_interested {
        if v.chars().count() > WHY_INTERESTED_MAX {
            errors.push(FieldError::new(
                "applicationDetails.whyInterested",
                "Interest explanation cannot exceed 1000 characters",
            ));
        }
    }
    let remote_work = details
        .remote_work
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string);
    if let Some(v) = &remote_work {
        if !REMOTE_WORK_PREFERENCES.contains(&v.as_str()) {
            errors.push(FieldError::new(
                "applicationDetails.remoteWork",
                "Invalid remote work preference",
            ));
        }
    }

    if !has_resume {
        errors.push(FieldError::new("resume", "Resume file is required"));
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    // Every Option below is Some: a None would have pushed an error above.
    Ok(ValidatedSubmission {
        personal: PersonalInfo {
            first_name: first_name.unwrap_or_default(),
            last_name: last_name.unwrap_or_default(),
            email: email.unwrap_or_default(),
            phone: phone.unwrap_or_default(),
            location: location.unwrap_or_default(),
            linkedin_url: personal.linkedin_url.clone().filter(|v| !v.trim().is_empty()),
            portfolio_url: personal
                .portfolio_url
                .clone()
                .filter(|v| !v.trim().is_empty()),
        },
        professional: ProfessionalInfo {
            experience: experience.unwrap_or_default(),
            current_role: current_role.unwrap_or_default(),
            current_company: professional
                .current_company
                .clone()
                .filter(|v| !v.trim().is_empty()),
            salary_expectation: salary_expectation.unwrap_or_default(),
            availability_date: availability_date.unwrap_or_default(),
            skills,
        },
        cover_letter: cover_letter.unwrap_or_default(),
        why_interested: why_interested.unwrap_or_default(),
        references: details.references.unwrap_or(false),
        relocate: details.relocate.unwrap_or(false),
        remote_work,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn personal() -> PersonalInfoInput {
        PersonalInfoInput {
            first_name: Some("Jane".to_string()),
            last_name: Some("Doe".to_string()),
            email: Some("Jane@Example.com".to_string()),
            phone: Some("+49 160 1234567".to_string()),
            location: Some("Berlin".to_string()),
            linkedin_url: None,
            portfolio_url: None,
        }
    }

    fn professional() -> ProfessionalInfoInput {
        ProfessionalInfoInput {
            experience: Some("Senior".to_string()),
            current_role: Some("Backend Engineer".to_string()),
            current_company: Some("Acme".to_string()),
            salary_expectation: Some("$130k".to_string()),
            availability_date: Some("2024-09-01".to_string()),
            skills: Some(vec!["Rust".to_string(), "Postgres".to_string()]),
        }
    }

    fn details() -> ApplicationDetailsInput {
        ApplicationDetailsInput {
            cover_letter: Some("I would like to apply.".to_string()),
            why_interested: Some("Interesting problems.".to_string()),
            references: None,
            relocate: Some(true),
            remote_work: Some("hybrid".to_string()),
        }
    }

    #[test]
    fn test_valid_submission_passes() {
        let v = validate_submission(&personal(), &professional(), &details(), true).unwrap();
        assert_eq!(v.personal.first_name, "Jane");
        assert_eq!(v.personal.email, "jane@example.com");
        assert_eq!(v.professional.skills.len(), 2);
        assert!(v.relocate);
        assert!(!v.references);
    }

    #[test]
    fn test_missing_resume_is_its_own_field_error() {
        let errs =
            validate_submission(&personal(), &professional(), &details(), false).unwrap_err();
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].field, "resume");
        assert_eq!(errs[0].message, "Resume file is required");
    }

    #[test]
    fn test_every_violation_is_reported_not_just_the_first() {
        let errs = validate_submission(
            &PersonalInfoInput::default(),
            &ProfessionalInfoInput::default(),
            &ApplicationDetailsInput::default(),
            false,
        )
        .unwrap_err();
        let fields: Vec<&str> = errs.iter().map(|e| e.field.as_str()).collect();
        for expected in [
            "personalInfo.firstName",
            "personalInfo.lastName",
            "personalInfo.email",
            "personalInfo.phone",
            "personalInfo.location",
            "professionalInfo.experience",
            "professionalInfo.currentRole",
            "professionalInfo.salaryExpectation",
            "professionalInfo.availabilityDate",
            "professionalInfo.skills",
            "applicationDetails.coverLetter",
            "applicationDetails.whyInterested",
            "resume",
        ] {
            assert!(fields.contains(&expected), "missing violation {expected}");
        }
    }

    #[test]
    fn test_invalid_email_rejected() {
        let mut p = personal();
        p.email = Some("not-an-email".to_string());
        let errs = validate_submission(&p, &professional(), &details(), true).unwrap_err();
        assert_eq!(errs[0].field, "personalInfo.email");
    }

    #[test]
    fn test_non_iso_availability_date_rejected() {
        let mut p = professional();
        p.availability_date = Some("next month".to_string());
        let errs = validate_submission(&personal(), &p, &details(), true).unwrap_err();
        assert_eq!(errs[0].field, "professionalInfo.availabilityDate");
    }

    #[test]
    fn test_rfc3339_availability_date_accepted() {
        let mut p = professional();
        p.availability_date = Some("2024-09-01T00:00:00Z".to_string());
        assert!(validate_submission(&personal(), &p, &details(), true).is_ok());
    }

    #[test]
    fn test_blank_skills_do_not_count() {
        let mut p = professional();
        p.skills = Some(vec!["  ".to_string(), "".to_string()]);
        let errs = validate_submission(&personal(), &p, &details(), true).unwrap_err();
        assert_eq!(errs[0].field, "professionalInfo.skills");
    }

    #[test]
    fn test_cover_letter_over_limit_rejected() {
        let mut d = details();
        d.cover_letter = Some("x".repeat(COVER_LETTER_MAX + 1));
        let errs = validate_submission(&personal(), &professional(), &d, true).unwrap_err();
        assert_eq!(errs[0].field, "applicationDetails.coverLetter");
        assert_eq!(errs[0].message, "Cover letter cannot exceed 2000 characters");
    }

    #[test]
    fn test_cover_letter_at_limit_accepted() {
        let mut d = details();
        d.cover_letter = Some("x".repeat(COVER_LETTER_MAX));
        assert!(validate_submission(&personal(), &professional(), &d, true).is_ok());
    }

    #[test]
    fn test_interest_statement_over_limit_rejected() {
        let mut d = details();
        d.why_interested = Some("y".repeat(WHY_INTERESTED_MAX + 1));
        let errs = validate_submission(&personal(), &professional(), &d, true).unwrap_err();
        assert_eq!(errs[0].field, "applicationDetails.whyInterested");
    }

    #[test]
    fn test_unknown_remote_preference_rejected() {
        let mut d = details();
        d.remote_work = Some("moonbase".to_string());
        let errs = validate_submission(&personal(), &professional(), &d, true).unwrap_err();
        assert_eq!(errs[0].field, "applicationDetails.remoteWork");
    }

    #[test]
    fn test_whitespace_only_fields_count_as_missing() {
        let mut p = personal();
        p.first_name = Some("   ".to_string());
        let errs = validate_submission(&p, &professional(), &details(), true).unwrap_err();
        assert_eq!(errs[0].field, "personalInfo.firstName");
    }

    #[test]
    fn test_email_is_normalized_to_lowercase() {
        let v = validate_submission(&personal(), &professional(), &details(), true).unwrap();
        assert_eq!(v.personal.email, "jane@example.com");
    }
}
