//! Access guard — who may see or mutate an application, and who owns a job.
//!
//! Ownership is always compared against the authenticated principal's id,
//! never against anything the client sent in a body.

use uuid::Uuid;

use crate::auth::Principal;
use crate::models::application::ApplicationRow;
use crate::models::job::JobRow;

/// A candidate may view their own application; a company may view
/// applications for jobs it owns. The job is optional because the posting
/// may have been deleted out from under the application, in which case no
/// company can claim it.
pub fn can_view_application(
    application: &ApplicationRow,
    job: Option<&JobRow>,
    principal: &Principal,
) -> bool {
    match principal {
        Principal::Candidate(id) => application.candidate_id == *id,
        Principal::Company(id) => job.is_some_and(|job| job.company_id == *id),
        Principal::Anonymous => false,
    }
}

/// Only the company that owns the referenced job may move an application
/// through its status lifecycle.
pub fn can_mutate_status(job: &JobRow, principal: &Principal) -> bool {
    matches!(principal, Principal::Company(id) if job.company_id == *id)
}

pub fn owns_job(job: &JobRow, company_id: Uuid) -> bool {
    job.company_id == company_id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::application::{
        ApplicationDetails, PersonalInfo, ProfessionalInfo,
    };
    use chrono::Utc;
    use sqlx::types::Json;

    fn job(company_id: Uuid) -> JobRow {
        JobRow {
            id: Uuid::new_v4(),
            title: "Backend Engineer".to_string(),
            company: "Acme".to_string(),
            company_logo: "/placeholder-logo.png".to_string(),
            category: "Engineering".to_string(),
            location: "Berlin".to_string(),
            employment_type: "Full-time".to_string(),
            experience_level: "Senior".to_string(),
            salary_range: "$120k - $150k".to_string(),
            description: "Build things".to_string(),
            skills: vec!["Rust".to_string()],
            is_active: true,
            applications_count: 0,
            company_id,
            posted_date: Utc::now(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn application(job_id: Uuid, candidate_id: Uuid) -> ApplicationRow {
        ApplicationRow {
            id: Uuid::new_v4(),
            job_id,
            candidate_id,
            status: "pending".to_string(),
            personal_info: Json(PersonalInfo {
                first_name: "Jane".to_string(),
                last_name: "Doe".to_string(),
                email: "jane@example.com".to_string(),
                phone: "+49 160 0000000".to_string(),
                location: "Berlin".to_string(),
                linkedin_url: None,
                portfolio_url: None,
            }),
            professional_info: Json(ProfessionalInfo {
                experience: "Senior".to_string(),
                current_role: "Engineer".to_string(),
                current_company: None,
                salary_expectation: "$130k".to_string(),
                availability_date: "2024-09-01".to_string(),
                skills: vec!["Rust".to_string()],
            }),
            application_details: Json(ApplicationDetails {
                cover_letter: "Hello".to_string(),
                why_interested: "Because".to_string(),
                resume_path: "uploads/resumes/resume-x.pdf".to_string(),
                portfolio_path: None,
                references: false,
                relocate: false,
                remote_work: None,
            }),
            applied_date: Utc::now(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_candidate_views_own_application() {
        let candidate = Uuid::new_v4();
        let job = job(Uuid::new_v4());
        let app = application(job.id, candidate);
        assert!(can_view_application(
            &app,
            Some(&job),
            &Principal::Candidate(candidate)
        ));
    }

    #[test]
    fn test_other_candidate_cannot_view() {
        let job = job(Uuid::new_v4());
        let app = application(job.id, Uuid::new_v4());
        assert!(!can_view_application(
            &app,
            Some(&job),
            &Principal::Candidate(Uuid::new_v4())
        ));
    }

    #[test]
    fn test_owning_company_views_application() {
        let company = Uuid::new_v4();
        let job = job(company);
        let app = application(job.id, Uuid::new_v4());
        assert!(can_view_application(
            &app,
            Some(&job),
            &Principal::Company(company)
        ));
    }

    #[test]
    fn test_foreign_company_cannot_view() {
        let job = job(Uuid::new_v4());
        let app = application(job.id, Uuid::new_v4());
        assert!(!can_view_application(
            &app,
            Some(&job),
            &Principal::Company(Uuid::new_v4())
        ));
    }

    #[test]
    fn test_company_cannot_claim_deleted_job() {
        let company = Uuid::new_v4();
        let app = application(Uuid::new_v4(), Uuid::new_v4());
        assert!(!can_view_application(&app, None, &Principal::Company(company)));
    }

    #[test]
    fn test_anonymous_sees_nothing() {
        let job = job(Uuid::new_v4());
        let app = application(job.id, Uuid::new_v4());
        assert!(!can_view_application(&app, Some(&job), &Principal::Anonymous));
    }

    #[test]
    fn test_owning_company_mutates_status() {
        let company = Uuid::new_v4();
        let job = job(company);
        assert!(can_mutate_status(&job, &Principal::Company(company)));
    }

    #[test]
    fn test_foreign_company_cannot_mutate_status() {
        let job = job(Uuid::new_v4());
        assert!(!can_mutate_status(&job, &Principal::Company(Uuid::new_v4())));
    }

    #[test]
    fn test_candidate_cannot_mutate_status() {
        let candidate = Uuid::new_v4();
        let job = job(Uuid::new_v4());
        assert!(!can_mutate_status(&job, &Principal::Candidate(candidate)));
    }

    #[test]
    fn test_job_ownership() {
        let company = Uuid::new_v4();
        let job = job(company);
        assert!(owns_job(&job, company));
        assert!(!owns_job(&job, Uuid::new_v4()));
    }
}
