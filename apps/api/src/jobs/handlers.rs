use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::access::owns_job;
use crate::auth::AuthCompany;
use crate::errors::{AppError, FieldError};
use crate::jobs::query::{fetch_page, JobQuery};
use crate::models::job::{
    is_valid_category, is_valid_employment_type, is_valid_experience_level, JobRow,
};
use crate::response::{DataResponse, ListResponse, MessageResponse};
use crate::state::AppState;

/// GET /api/jobs
pub async fn list_jobs(
    State(state): State<AppState>,
    Query(query): Query<JobQuery>,
) -> Result<Json<ListResponse<JobRow>>, AppError> {
    let (jobs, total, page) = fetch_page(&state.db, &query).await?;
    Ok(Json(ListResponse::new(jobs, total, page.page, page.limit)))
}

/// GET /api/jobs/:id
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DataResponse<JobRow>>, AppError> {
    let job = sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Job not found".to_string()))?;
    Ok(Json(DataResponse::new(job)))
}

pub const TITLE_MAX: usize = 100;
pub const COMPANY_MAX: usize = 100;
pub const DESCRIPTION_MAX: usize = 2000;

/// Body for job create/update. Fields stay optional so validation can name
/// every violation at once.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobInput {
    pub title: Option<String>,
    pub company: Option<String>,
    pub company_logo: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub employment_type: Option<String>,
    pub experience_level: Option<String>,
    pub salary_range: Option<String>,
    pub description: Option<String>,
    pub skills: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

#[derive(Debug)]
struct ValidJob {
    title: String,
    company: String,
    company_logo: Option<String>,
    category: String,
    location: String,
    employment_type: String,
    experience_level: String,
    salary_range: String,
    description: String,
    skills: Vec<String>,
    is_active: bool,
}

fn validate_job(input: &JobInput) -> Result<ValidJob, Vec<FieldError>> {
    let mut errors = Vec::new();

    let text = |value: &Option<String>| -> Option<String> {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    let title = text(&input.title);
    match &title {
        None => errors.push(FieldError::new("title", "Job title is required")),
        Some(v) if v.chars().count() > TITLE_MAX => errors.push(FieldError::new(
            "title",
            "Job title cannot exceed 100 characters",
        )),
        Some(_) => {}
    }

    let company = text(&input.company);
    match &company {
        None => errors.push(FieldError::new("company", "Company name is required")),
        Some(v) if v.chars().count() > COMPANY_MAX => errors.push(FieldError::new(
            "company",
            "Company name cannot exceed 100 characters",
        )),
        Some(_) => {}
    }

    let category = text(&input.category);
    match &category {
        Some(v) if is_valid_category(v) => {}
        _ => errors.push(FieldError::new("category", "Invalid job category")),
    }

    let location = text(&input.location);
    if location.is_none() {
        errors.push(FieldError::new("location", "Job location is required"));
    }

    let employment_type = text(&input.employment_type);
    match &employment_type {
        Some(v) if is_valid_employment_type(v) => {}
        _ => errors.push(FieldError::new("employmentType", "Invalid employment type")),
    }

    let experience_level = text(&input.experience_level);
    match &experience_level {
        Some(v) if is_valid_experience_level(v) => {}
        _ => errors.push(FieldError::new("experienceLevel", "Invalid experience level")),
    }

    let salary_range = text(&input.salary_range);
    if salary_range.is_none() {
        errors.push(FieldError::new("salaryRange", "Salary range is required"));
    }

    let description = text(&input.description);
    match &description {
        None => errors.push(FieldError::new("description", "Job description is required")),
        Some(v) if v.chars().count() > DESCRIPTION_MAX => errors.push(FieldError::new(
            "description",
            "Description cannot exceed 2000 characters",
        )),
        Some(_) => {}
    }

    let skills: Vec<String> = input
        .skills
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if skills.is_empty() {
        errors.push(FieldError::new("skills", "At least one skill is required"));
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(ValidJob {
        title: title.unwrap_or_default(),
        company: company.unwrap_or_default(),
        company_logo: text(&input.company_logo),
        category: category.unwrap_or_default(),
        location: location.unwrap_or_default(),
        employment_type: employment_type.unwrap_or_default(),
        experience_level: experience_level.unwrap_or_default(),
        salary_range: salary_range.unwrap_or_default(),
        description: description.unwrap_or_default(),
        skills,
        is_active: input.is_active.unwrap_or(true),
    })
}

/// POST /api/jobs
///
/// The owning company is the authenticated principal, never a body field.
pub async fn create_job(
    State(state): State<AppState>,
    AuthCompany(company_id): AuthCompany,
    Json(input): Json<JobInput>,
) -> Result<(StatusCode, Json<DataResponse<JobRow>>), AppError> {
    let valid = validate_job(&input).map_err(AppError::validation)?;

    let job = sqlx::query_as::<_, JobRow>(
        r#"
        INSERT INTO jobs
            (title, company, company_logo, category, location, employment_type,
             experience_level, salary_range, description, skills, is_active, company_id)
        VALUES ($1, $2, COALESCE($3, '/placeholder-logo.png'), $4, $5, $6, $7, $8, $9, $10, $11, $12)
        RETURNING *
        "#,
    )
    .bind(&valid.title)
    .bind(&valid.company)
    .bind(&valid.company_logo)
    .bind(&valid.category)
    .bind(&valid.location)
    .bind(&valid.employment_type)
    .bind(&valid.experience_level)
    .bind(&valid.salary_range)
    .bind(&valid.description)
    .bind(&valid.skills)
    .bind(valid.is_active)
    .bind(company_id)
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(DataResponse::new(job))))
}

/// PUT /api/jobs/:id
pub async fn update_job(
    State(state): State<AppState>,
    AuthCompany(company_id): AuthCompany,
    Path(id): Path<Uuid>,
    Json(input): Json<JobInput>,
) -> Result<Json<DataResponse<JobRow>>, AppError> {
    let existing = sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Job not found".to_string()))?;
    if !owns_job(&existing, company_id) {
        return Err(AppError::Forbidden(
            "Not authorized to update this job".to_string(),
        ));
    }

    let valid = validate_job(&input).map_err(AppError::validation)?;

    let job = sqlx::query_as::<_, JobRow>(
        r#"
        UPDATE jobs SET
            title = $1, company = $2,
            company_logo = COALESCE($3, company_logo),
            category = $4, location = $5, employment_type = $6,
            experience_level = $7, salary_range = $8, description = $9,
            skills = $10, is_active = $11, updated_at = NOW()
        WHERE id = $12
        RETURNING *
        "#,
    )
    .bind(&valid.title)
    .bind(&valid.company)
    .bind(&valid.company_logo)
    .bind(&valid.category)
    .bind(&valid.location)
    .bind(&valid.employment_type)
    .bind(&valid.experience_level)
    .bind(&valid.salary_range)
    .bind(&valid.description)
    .bind(&valid.skills)
    .bind(valid.is_active)
    .bind(id)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(DataResponse::new(job)))
}

/// DELETE /api/jobs/:id
pub async fn delete_job(
    State(state): State<AppState>,
    AuthCompany(company_id): AuthCompany,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse<()>>, AppError> {
    let existing = sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Job not found".to_string()))?;
    if !owns_job(&existing, company_id) {
        return Err(AppError::Forbidden(
            "Not authorized to delete this job".to_string(),
        ));
    }

    sqlx::query("DELETE FROM jobs WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;

    Ok(Json(MessageResponse::message_only("Job deleted successfully")))
}

/// GET /api/jobs/categories
pub async fn get_categories(
    State(state): State<AppState>,
) -> Result<Json<DataResponse<Vec<String>>>, AppError> {
    let categories: Vec<String> =
        sqlx::query_scalar("SELECT DISTINCT category FROM jobs ORDER BY category")
            .fetch_all(&state.db)
            .await?;
    Ok(Json(DataResponse::new(categories)))
}

/// GET /api/jobs/locations
pub async fn get_locations(
    State(state): State<AppState>,
) -> Result<Json<DataResponse<Vec<String>>>, AppError> {
    let locations: Vec<String> =
        sqlx::query_scalar("SELECT DISTINCT location FROM jobs ORDER BY location")
            .fetch_all(&state.db)
            .await?;
    Ok(Json(DataResponse::new(locations)))
}
