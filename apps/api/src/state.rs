use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::storage::FileStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// File storage collaborator. Production wires `S3FileStore`.
    pub files: Arc<dyn FileStore>,
    pub config: Config,
}
