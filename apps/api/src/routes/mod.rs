pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::applications::handlers as applications;
use crate::auth::handlers as auth;
use crate::jobs::handlers as jobs;
use crate::state::AppState;
use crate::storage::handlers as uploads;

/// Multipart bodies carry up to two capped files plus JSON fields; leave
/// headroom above the per-file cap.
const MULTIPART_BODY_LIMIT: usize = 12 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Auth
        .route("/api/auth/register", post(auth::register_candidate))
        .route("/api/auth/login", post(auth::login_candidate))
        .route("/api/auth/company/register", post(auth::register_company))
        .route("/api/auth/company/login", post(auth::login_company))
        .route("/api/auth/me", get(auth::me))
        // Jobs (listing and detail are public)
        .route("/api/jobs", get(jobs::list_jobs).post(jobs::create_job))
        .route("/api/jobs/categories", get(jobs::get_categories))
        .route("/api/jobs/locations", get(jobs::get_locations))
        .route(
            "/api/jobs/:id",
            get(jobs::get_job).put(jobs::update_job).delete(jobs::delete_job),
        )
        // Applications
        .route("/api/applications", post(applications::submit_application))
        .route(
            "/api/applications/my-applications",
            get(applications::my_applications),
        )
        .route("/api/applications/:id", get(applications::get_application))
        .route(
            "/api/applications/:id/status",
            put(applications::update_application_status),
        )
        .route(
            "/api/applications/job/:id",
            get(applications::job_applications),
        )
        // Uploads
        .route("/api/upload/resume", post(uploads::upload_resume))
        .route("/api/upload/portfolio", post(uploads::upload_portfolio))
        .route("/api/upload/company-logo", post(uploads::upload_company_logo))
        .layer(DefaultBodyLimit::max(MULTIPART_BODY_LIMIT))
        .with_state(state)
}
