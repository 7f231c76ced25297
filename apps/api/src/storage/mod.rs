//! File storage collaborator — accepts candidate/company uploads, constrains
//! them to a document/image allow-list and a size cap, and returns a stable
//! key that application records reference.
//!
//! `AppState` holds an `Arc<dyn FileStore>`; production wires [`s3::S3FileStore`].

pub mod handlers;
pub mod s3;

use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;

/// Where an upload lands, and the field name it arrives under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Resume,
    Portfolio,
    CompanyLogo,
}

impl UploadKind {
    pub fn field_name(&self) -> &'static str {
        match self {
            UploadKind::Resume => "resume",
            UploadKind::Portfolio => "portfolio",
            UploadKind::CompanyLogo => "companyLogo",
        }
    }

    pub fn key_prefix(&self) -> &'static str {
        match self {
            UploadKind::Resume => "uploads/resumes",
            UploadKind::Portfolio => "uploads/portfolios",
            UploadKind::CompanyLogo => "uploads/company-logos",
        }
    }
}

/// Result of a stored upload, echoed back to the client.
#[derive(Debug, Clone, Serialize)]
pub struct StoredFile {
    pub filename: String,
    pub path: String,
    pub size: u64,
}

#[async_trait]
pub trait FileStore: Send + Sync {
    /// Persists an already-validated upload and returns its stable handle.
    async fn store(
        &self,
        kind: UploadKind,
        content_type: &str,
        bytes: Bytes,
    ) -> Result<StoredFile, AppError>;
}

/// MIME types accepted for uploads, with the extension the stored key gets.
const ALLOWED_TYPES: &[(&str, &str)] = &[
    ("application/pdf", ".pdf"),
    ("application/msword", ".doc"),
    (
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        ".docx",
    ),
    ("application/zip", ".zip"),
    ("image/jpeg", ".jpg"),
    ("image/jpg", ".jpg"),
    ("image/png", ".png"),
];

pub fn extension_for(content_type: &str) -> Option<&'static str> {
    ALLOWED_TYPES
        .iter()
        .find(|(mime, _)| *mime == content_type)
        .map(|(_, ext)| *ext)
}

/// Rejects uploads outside the allow-list or over the size cap. Returns the
/// extension the stored object key should carry.
pub fn validate_upload(
    content_type: &str,
    size: u64,
    max_bytes: u64,
) -> Result<&'static str, AppError> {
    let ext = extension_for(content_type).ok_or_else(|| {
        AppError::bad_request(
            "Invalid file type. Only PDF, DOC, DOCX, ZIP, JPG, and PNG files are allowed.",
        )
    })?;
    if size > max_bytes {
        return Err(AppError::bad_request(format!(
            "File too large. Maximum size is {} MB.",
            max_bytes / (1024 * 1024)
        )));
    }
    Ok(ext)
}

/// Unique object key: `uploads/resumes/resume-<uuid>.pdf` and friends.
pub fn object_key(kind: UploadKind, ext: &str) -> String {
    format!(
        "{}/{}-{}{}",
        kind.key_prefix(),
        kind.field_name(),
        Uuid::new_v4(),
        ext
    )
}
