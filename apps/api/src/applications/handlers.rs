use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::access::{can_mutate_status, can_view_application};
use crate::applications::submit::{submit, FileUpload, NewSubmission};
use crate::applications::validation::{
    validate_submission, ApplicationDetailsInput, PersonalInfoInput, ProfessionalInfoInput,
};
use crate::auth::{AuthCandidate, AuthCompany, Principal};
use crate::errors::{AppError, FieldError};
use crate::jobs::query::Page;
use crate::models::application::{is_valid_status, ApplicationRow};
use crate::models::job::JobRow;
use crate::response::{DataResponse, ListResponse, MessageResponse};
use crate::state::AppState;

/// POST /api/applications
///
/// Multipart form: `jobId` plus JSON-encoded `personalInfo`,
/// `professionalInfo`, `applicationDetails`, and the `resume` / `portfolio`
/// file fields. Validation runs before anything is persisted.
pub async fn submit_application(
    State(state): State<AppState>,
    AuthCandidate(candidate_id): AuthCandidate,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<MessageResponse<ApplicationRow>>), AppError> {
    let mut job_id_raw: Option<String> = None;
    let mut personal = PersonalInfoInput::default();
    let mut professional = ProfessionalInfoInput::default();
    let mut details = ApplicationDetailsInput::default();
    let mut resume: Option<FileUpload> = None;
    let mut portfolio: Option<FileUpload> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(format!("Malformed multipart request: {e}")))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        match name.as_str() {
            "jobId" => {
                job_id_raw = Some(field.text().await.map_err(multipart_err)?);
            }
            "personalInfo" => {
                personal = parse_json_field(&name, &field.text().await.map_err(multipart_err)?)?;
            }
            "professionalInfo" => {
                professional =
                    parse_json_field(&name, &field.text().await.map_err(multipart_err)?)?;
            }
            "applicationDetails" => {
                details = parse_json_field(&name, &field.text().await.map_err(multipart_err)?)?;
            }
            "resume" | "portfolio" => {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await.map_err(multipart_err)?;
                let upload = FileUpload {
                    content_type,
                    bytes,
                };
                if name == "resume" {
                    resume = Some(upload);
                } else {
                    portfolio = Some(upload);
                }
            }
            _ => {}
        }
    }

    let mut errors: Vec<FieldError> = Vec::new();
    let job_id = match job_id_raw.as_deref().map(str::trim) {
        None | Some("") => {
            errors.push(FieldError::new("jobId", "Job ID is required"));
            None
        }
        Some(raw) => match Uuid::parse_str(raw) {
            Ok(id) => Some(id),
            Err(_) => {
                errors.push(FieldError::new("jobId", "Job ID must be a valid id"));
                None
            }
        },
    };
    let validated = match validate_submission(&personal, &professional, &details, resume.is_some())
    {
        Ok(v) => Some(v),
        Err(mut field_errors) => {
            errors.append(&mut field_errors);
            None
        }
    };

    let (Some(job_id), Some(validated), Some(resume)) = (job_id, validated, resume) else {
        return Err(AppError::validation(errors));
    };

    let application = submit(
        &state.db,
        state.files.as_ref(),
        state.config.max_upload_bytes,
        NewSubmission {
            job_id,
            candidate_id,
            validated,
            resume,
            portfolio,
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new(
            "Application submitted successfully",
            application,
        )),
    ))
}

fn multipart_err(e: axum::extract::multipart::MultipartError) -> AppError {
    AppError::bad_request(format!("Malformed multipart request: {e}"))
}

fn parse_json_field<T: serde::de::DeserializeOwned>(name: &str, raw: &str) -> Result<T, AppError> {
    serde_json::from_str(raw)
        .map_err(|_| AppError::bad_request(format!("{name} must be valid JSON")))
}

#[derive(Debug, Default, Deserialize)]
pub struct ApplicationListQuery {
    pub status: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

fn status_filter(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && *v != "all")
}

/// GET /api/applications/my-applications
pub async fn my_applications(
    State(state): State<AppState>,
    AuthCandidate(candidate_id): AuthCandidate,
    Query(query): Query<ApplicationListQuery>,
) -> Result<Json<ListResponse<ApplicationRow>>, AppError> {
    let page = Page::from_query(query.page, query.limit);
    let status = status_filter(&query.status);

    let mut qb: QueryBuilder<'_, Postgres> =
        QueryBuilder::new("SELECT * FROM applications WHERE candidate_id = ");
    qb.push_bind(candidate_id);
    if let Some(status) = status {
        qb.push(" AND status = ").push_bind(status.to_string());
    }
    qb.push(" ORDER BY applied_date DESC LIMIT ")
        .push_bind(page.limit as i64)
        .push(" OFFSET ")
        .push_bind(page.offset());
    let applications = qb.build_query_as::<ApplicationRow>().fetch_all(&state.db).await?;

    let mut count_qb: QueryBuilder<'_, Postgres> =
        QueryBuilder::new("SELECT COUNT(*) FROM applications WHERE candidate_id = ");
    count_qb.push_bind(candidate_id);
    if let Some(status) = status {
        count_qb.push(" AND status = ").push_bind(status.to_string());
    }
    let total: i64 = count_qb.build_query_scalar().fetch_one(&state.db).await?;

    Ok(Json(ListResponse::new(
        applications,
        total,
        page.page,
        page.limit,
    )))
}

/// GET /api/applications/:id
pub async fn get_application(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> Result<Json<DataResponse<ApplicationRow>>, AppError> {
    let application = sqlx::query_as::<_, ApplicationRow>("SELECT * FROM applications WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Application not found".to_string()))?;

    let job = sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = $1")
        .bind(application.job_id)
        .fetch_optional(&state.db)
        .await?;

    if !can_view_application(&application, job.as_ref(), &principal) {
        return Err(AppError::Forbidden(
            "Not authorized to view this application".to_string(),
        ));
    }

    Ok(Json(DataResponse::new(application)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusInput {
    pub status: Option<String>,
}

/// PUT /api/applications/:id/status
pub async fn update_application_status(
    State(state): State<AppState>,
    AuthCompany(company_id): AuthCompany,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateStatusInput>,
) -> Result<Json<MessageResponse<ApplicationRow>>, AppError> {
    let status = match input.status.as_deref().map(str::trim) {
        Some(s) if is_valid_status(s) => s.to_string(),
        _ => {
            return Err(AppError::validation(vec![FieldError::new(
                "status",
                "Invalid application status",
            )]));
        }
    };

    let application = sqlx::query_as::<_, ApplicationRow>("SELECT * FROM applications WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Application not found".to_string()))?;

    let job = sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = $1")
        .bind(application.job_id)
        .fetch_optional(&state.db)
        .await?;
    let authorized = job
        .as_ref()
        .map(|job| can_mutate_status(job, &Principal::Company(company_id)))
        .unwrap_or(false);
    if !authorized {
        return Err(AppError::Forbidden(
            "Not authorized to update this application".to_string(),
        ));
    }

    let updated = sqlx::query_as::<_, ApplicationRow>(
        "UPDATE applications SET status = $1, updated_at = NOW() WHERE id = $2 RETURNING *",
    )
    .bind(&status)
    .bind(id)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(MessageResponse::new(
        "Application status updated successfully",
        updated,
    )))
}

/// GET /api/applications/job/:id
pub async fn job_applications(
    State(state): State<AppState>,
    AuthCompany(company_id): AuthCompany,
    Path(job_id): Path<Uuid>,
    Query(query): Query<ApplicationListQuery>,
) -> Result<Json<ListResponse<ApplicationRow>>, AppError> {
    let job = sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = $1")
        .bind(job_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Job not found".to_string()))?;
    if !crate::access::owns_job(&job, company_id) {
        return Err(AppError::Forbidden(
            "Not authorized to view applications for this job".to_string(),
        ));
    }

    let page = Page::from_query(query.page, query.limit);
    let status = status_filter(&query.status);

    let mut qb: QueryBuilder<'_, Postgres> =
        QueryBuilder::new("SELECT * FROM applications WHERE job_id = ");
    qb.push_bind(job_id);
    if let Some(status) = status {
        qb.push(" AND status = ").push_bind(status.to_string());
    }
    qb.push(" ORDER BY applied_date DESC LIMIT ")
        .push_bind(page.limit as i64)
        .push(" OFFSET ")
        .push_bind(page.offset());
    let applications = qb.build_query_as::<ApplicationRow>().fetch_all(&state.db).await?;

    let mut count_qb: QueryBuilder<'_, Postgres> =
        QueryBuilder::new("SELECT COUNT(*) FROM applications WHERE job_id = ");
    count_qb.push_bind(job_id);
    if let Some(status) = status {
        count_qb.push(" AND status = ").push_bind(status.to_string());
    }
    let total: i64 = count_qb.build_query_scalar().fetch_one(&state.db).await?;

    Ok(Json(ListResponse::new(
        applications,
        total,
        page.page,
        page.limit,
    )))
}
