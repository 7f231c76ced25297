//! Authentication collaborator: bearer-token verification and the tagged
//! principal handlers act as.
//!
//! Handlers take [`AuthCandidate`] / [`AuthCompany`] when a specific role is
//! required, or [`Principal`] when either kind of actor may call. All of them
//! verify the token, then confirm the account still exists.

pub mod handlers;
pub mod password;
pub mod token;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};
use uuid::Uuid;

use crate::auth::token::Role;
use crate::errors::AppError;
use crate::state::AppState;

/// The acting principal on a request. A single tagged value, never two
/// independently-nullable identities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Principal {
    Candidate(Uuid),
    Company(Uuid),
    Anonymous,
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Resolves the request's principal. A missing header yields `Anonymous`;
/// a present-but-invalid token, or a token whose account no longer exists,
/// is an authentication failure.
async fn resolve_principal(parts: &Parts, state: &AppState) -> Result<Principal, AppError> {
    let Some(token) = bearer_token(parts) else {
        return Ok(Principal::Anonymous);
    };
    let claims = token::verify(&state.config.jwt_secret, token)?;

    let (table_check, principal, missing): (&str, Principal, &str) = match claims.role {
        Role::Candidate => (
            "SELECT EXISTS(SELECT 1 FROM candidates WHERE id = $1)",
            Principal::Candidate(claims.sub),
            "Not authorized, user not found",
        ),
        Role::Company => (
            "SELECT EXISTS(SELECT 1 FROM companies WHERE id = $1)",
            Principal::Company(claims.sub),
            "Not authorized, company not found",
        ),
    };

    let exists: bool = sqlx::query_scalar(table_check)
        .bind(claims.sub)
        .fetch_one(&state.db)
        .await?;
    if !exists {
        return Err(AppError::Unauthorized(missing.to_string()));
    }
    Ok(principal)
}

/// Requires any authenticated principal (candidate or company).
#[async_trait]
impl FromRequestParts<AppState> for Principal {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match resolve_principal(parts, state).await? {
            Principal::Anonymous => Err(AppError::Unauthorized(
                "Not authorized, no token".to_string(),
            )),
            principal => Ok(principal),
        }
    }
}

/// Requires a candidate bearer token.
pub struct AuthCandidate(pub Uuid);

#[async_trait]
impl FromRequestParts<AppState> for AuthCandidate {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match resolve_principal(parts, state).await? {
            Principal::Candidate(id) => Ok(AuthCandidate(id)),
            Principal::Anonymous => Err(AppError::Unauthorized(
                "Not authorized, no token".to_string(),
            )),
            Principal::Company(_) => Err(AppError::Unauthorized(
                "Not authorized, user not found".to_string(),
            )),
        }
    }
}

/// Requires a company bearer token.
pub struct AuthCompany(pub Uuid);

#[async_trait]
impl FromRequestParts<AppState> for AuthCompany {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match resolve_principal(parts, state).await? {
            Principal::Company(id) => Ok(AuthCompany(id)),
            Principal::Anonymous => Err(AppError::Unauthorized(
                "Not authorized, no token".to_string(),
            )),
            Principal::Candidate(_) => Err(AppError::Unauthorized(
                "Not authorized, company not found".to_string(),
            )),
        }
    }
}
