//! Application submission workflow.
//!
//! Ordering: job existence, duplicate pre-check, attachment storage, then a
//! single transaction inserting the application and bumping the job's
//! denormalized counter. The pre-check is an optimization only; the unique
//! index on (job_id, candidate_id) is the arbiter under concurrency, and its
//! violation is translated into the same Conflict the pre-check produces.

use bytes::Bytes;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::applications::validation::ValidatedSubmission;
use crate::errors::{is_unique_violation, AppError};
use crate::models::application::ApplicationRow;
use crate::storage::{validate_upload, FileStore, UploadKind};

/// An uploaded attachment as it arrived in the multipart request.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub content_type: String,
    pub bytes: Bytes,
}

pub struct NewSubmission {
    pub job_id: Uuid,
    pub candidate_id: Uuid,
    pub validated: ValidatedSubmission,
    pub resume: FileUpload,
    pub portfolio: Option<FileUpload>,
}

pub async fn submit(
    pool: &PgPool,
    files: &dyn FileStore,
    max_upload_bytes: u64,
    submission: NewSubmission,
) -> Result<ApplicationRow, AppError> {
    let NewSubmission {
        job_id,
        candidate_id,
        validated,
        resume,
        portfolio,
    } = submission;

    let job_exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM jobs WHERE id = $1)")
        .bind(job_id)
        .fetch_one(pool)
        .await?;
    if !job_exists {
        return Err(AppError::NotFound("Job not found".to_string()));
    }

    let already_applied: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM applications WHERE job_id = $1 AND candidate_id = $2)",
    )
    .bind(job_id)
    .bind(candidate_id)
    .fetch_one(pool)
    .await?;
    if already_applied {
        return Err(AppError::Conflict(
            "You have already applied for this job".to_string(),
        ));
    }

    validate_upload(&resume.content_type, resume.bytes.len() as u64, max_upload_bytes)?;
    if let Some(p) = &portfolio {
        validate_upload(&p.content_type, p.bytes.len() as u64, max_upload_bytes)?;
    }

    let resume_file = files
        .store(UploadKind::Resume, &resume.content_type, resume.bytes)
        .await?;
    let portfolio_path = match portfolio {
        Some(p) => Some(
            files
                .store(UploadKind::Portfolio, &p.content_type, p.bytes)
                .await?
                .path,
        ),
        None => None,
    };

    let (personal, professional, details) =
        validated.into_details(resume_file.path, portfolio_path);

    // Insert and counter increment commit or roll back together.
    let mut tx = pool.begin().await?;

    let inserted = sqlx::query_as::<_, ApplicationRow>(
        r#"
        INSERT INTO applications
            (job_id, candidate_id, personal_info, professional_info, application_details)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(job_id)
    .bind(candidate_id)
    .bind(Json(personal))
    .bind(Json(professional))
    .bind(Json(details))
    .fetch_one(&mut *tx)
    .await;

    let inserted = match inserted {
        Ok(row) => row,
        // Loser of a concurrent duplicate race.
        Err(e) if is_unique_violation(&e) => {
            return Err(AppError::Conflict(
                "You have already applied for this job".to_string(),
            ));
        }
        Err(e) => return Err(e.into()),
    };

    sqlx::query(
        "UPDATE jobs SET applications_count = applications_count + 1, updated_at = NOW() WHERE id = $1",
    )
    .bind(job_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    info!(
        "Application {} submitted for job {job_id} by candidate {candidate_id}",
        inserted.id
    );
    Ok(inserted)
}
