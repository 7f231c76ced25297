use axum::{
    extract::{Multipart, State},
    Json,
};

use crate::auth::{AuthCandidate, AuthCompany};
use crate::errors::AppError;
use crate::response::MessageResponse;
use crate::state::AppState;
use crate::storage::{validate_upload, StoredFile, UploadKind};

/// Pulls the expected file field out of a single-file multipart request,
/// validates it, and stores it.
async fn receive_single(
    state: &AppState,
    mut multipart: Multipart,
    kind: UploadKind,
) -> Result<StoredFile, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(format!("Malformed multipart request: {e}")))?
    {
        if field.name() != Some(kind.field_name()) {
            continue;
        }
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::bad_request(format!("Malformed multipart request: {e}")))?;
        validate_upload(&content_type, bytes.len() as u64, state.config.max_upload_bytes)?;
        return state.files.store(kind, &content_type, bytes).await;
    }
    Err(AppError::bad_request("No file uploaded"))
}

/// POST /api/upload/resume
pub async fn upload_resume(
    State(state): State<AppState>,
    AuthCandidate(_): AuthCandidate,
    multipart: Multipart,
) -> Result<Json<MessageResponse<StoredFile>>, AppError> {
    let stored = receive_single(&state, multipart, UploadKind::Resume).await?;
    Ok(Json(MessageResponse::new(
        "Resume uploaded successfully",
        stored,
    )))
}

/// POST /api/upload/portfolio
pub async fn upload_portfolio(
    State(state): State<AppState>,
    AuthCandidate(_): AuthCandidate,
    multipart: Multipart,
) -> Result<Json<MessageResponse<StoredFile>>, AppError> {
    let stored = receive_single(&state, multipart, UploadKind::Portfolio).await?;
    Ok(Json(MessageResponse::new(
        "Portfolio uploaded successfully",
        stored,
    )))
}

/// POST /api/upload/company-logo
pub async fn upload_company_logo(
    State(state): State<AppState>,
    AuthCompany(_): AuthCompany,
    multipart: Multipart,
) -> Result<Json<MessageResponse<StoredFile>>, AppError> {
    let stored = receive_single(&state, multipart, UploadKind::CompanyLogo).await?;
    Ok(Json(MessageResponse::new(
        "Company logo uploaded successfully",
        stored,
    )))
}
