use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::auth::password::{hash_password, verify_password};
use crate::auth::token::{issue, Role};
use crate::auth::Principal;
use crate::errors::{is_unique_violation, AppError, FieldError};
use crate::models::account::{CandidatePublic, CandidateRow, CompanyPublic, CompanyRow};
use crate::response::DataResponse;
use crate::state::AppState;
use crate::validate::is_valid_email;

const PASSWORD_MIN: usize = 6;

/// Login/registration envelope: `{success, message, token, data}`.
#[derive(Debug, Serialize)]
pub struct AuthResponse<T> {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub data: T,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateProfileInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterCandidateInput {
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(default)]
    pub profile: CandidateProfileInput,
}

#[derive(Debug, Deserialize)]
pub struct LoginInput {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterCompanyInput {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub industry: Option<String>,
    pub size: Option<String>,
}

fn validate_credentials(
    errors: &mut Vec<FieldError>,
    email: &Option<String>,
    password: &Option<String>,
) -> (Option<String>, Option<String>) {
    let email = match email.as_deref().map(str::trim) {
        Some(v) if is_valid_email(v) => Some(v.to_lowercase()),
        _ => {
            errors.push(FieldError::new("email", "Valid email is required"));
            None
        }
    };
    let password = match password.as_deref() {
        Some(v) if v.chars().count() >= PASSWORD_MIN => Some(v.to_string()),
        _ => {
            errors.push(FieldError::new(
                "password",
                "Password must be at least 6 characters",
            ));
            None
        }
    };
    (email, password)
}

/// POST /api/auth/register
pub async fn register_candidate(
    State(state): State<AppState>,
    Json(input): Json<RegisterCandidateInput>,
) -> Result<(StatusCode, Json<AuthResponse<CandidatePublic>>), AppError> {
    let mut errors = Vec::new();
    let (email, password) = validate_credentials(&mut errors, &input.email, &input.password);
    let first_name = input
        .profile
        .first_name
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string);
    if first_name.is_none() {
        errors.push(FieldError::new("profile.firstName", "First name is required"));
    }
    let last_name = input
        .profile
        .last_name
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string);
    if last_name.is_none() {
        errors.push(FieldError::new("profile.lastName", "Last name is required"));
    }
    let (Some(email), Some(password), Some(first_name), Some(last_name)) =
        (email, password, first_name, last_name)
    else {
        return Err(AppError::validation(errors));
    };

    let taken: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM candidates WHERE email = $1)")
        .bind(&email)
        .fetch_one(&state.db)
        .await?;
    if taken {
        return Err(AppError::bad_request(
            "Candidate already exists with this email",
        ));
    }

    let inserted = sqlx::query_as::<_, CandidateRow>(
        r#"
        INSERT INTO candidates (email, password_hash, first_name, last_name, phone, location)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(&email)
    .bind(hash_password(&password))
    .bind(&first_name)
    .bind(&last_name)
    .bind(&input.profile.phone)
    .bind(&input.profile.location)
    .fetch_one(&state.db)
    .await;

    let candidate = match inserted {
        Ok(row) => row,
        // Lost a concurrent registration race on the email unique index.
        Err(e) if is_unique_violation(&e) => {
            return Err(AppError::bad_request(
                "Candidate already exists with this email",
            ));
        }
        Err(e) => return Err(e.into()),
    };

    let token = issue(
        &state.config.jwt_secret,
        candidate.id,
        Role::Candidate,
        state.config.token_ttl_hours,
    )?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            success: true,
            message: "Candidate registered successfully".to_string(),
            token,
            data: candidate.into(),
        }),
    ))
}

/// POST /api/auth/login
pub async fn login_candidate(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> Result<Json<AuthResponse<CandidatePublic>>, AppError> {
    let (email, password) = match (input.email.as_deref(), input.password.as_deref()) {
        (Some(e), Some(p)) if !e.trim().is_empty() && !p.is_empty() => {
            (e.trim().to_lowercase(), p)
        }
        _ => return Err(AppError::Unauthorized("Invalid credentials".to_string())),
    };

    let candidate = sqlx::query_as::<_, CandidateRow>("SELECT * FROM candidates WHERE email = $1")
        .bind(&email)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?;

    if !verify_password(password, &candidate.password_hash) {
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    }

    sqlx::query("UPDATE candidates SET last_login = NOW() WHERE id = $1")
        .bind(candidate.id)
        .execute(&state.db)
        .await?;

    let token = issue(
        &state.config.jwt_secret,
        candidate.id,
        Role::Candidate,
        state.config.token_ttl_hours,
    )?;

    Ok(Json(AuthResponse {
        success: true,
        message: "Login successful".to_string(),
        token,
        data: candidate.into(),
    }))
}

/// POST /api/auth/company/register
pub async fn register_company(
    State(state): State<AppState>,
    Json(input): Json<RegisterCompanyInput>,
) -> Result<(StatusCode, Json<AuthResponse<CompanyPublic>>), AppError> {
    let mut errors = Vec::new();
    let (email, password) = validate_credentials(&mut errors, &input.email, &input.password);
    let name = input
        .name
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string);
    if name.is_none() {
        errors.push(FieldError::new("name", "Company name is required"));
    }
    let location = input
        .location
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string);
    if location.is_none() {
        errors.push(FieldError::new("location", "Company location is required"));
    }
    let (Some(email), Some(password), Some(name), Some(location)) =
        (email, password, name, location)
    else {
        return Err(AppError::validation(errors));
    };

    let taken: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM companies WHERE email = $1)")
        .bind(&email)
        .fetch_one(&state.db)
        .await?;
    if taken {
        return Err(AppError::bad_request(
            "Company already exists with this email",
        ));
    }

    let inserted = sqlx::query_as::<_, CompanyRow>(
        r#"
        INSERT INTO companies (email, password_hash, name, location, description, website, industry, size)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(&email)
    .bind(hash_password(&password))
    .bind(&name)
    .bind(&location)
    .bind(&input.description)
    .bind(&input.website)
    .bind(&input.industry)
    .bind(&input.size)
    .fetch_one(&state.db)
    .await;

    let company = match inserted {
        Ok(row) => row,
        Err(e) if is_unique_violation(&e) => {
            return Err(AppError::bad_request(
                "Company already exists with this email",
            ));
        }
        Err(e) => return Err(e.into()),
    };

    let token = issue(
        &state.config.jwt_secret,
        company.id,
        Role::Company,
        state.config.token_ttl_hours,
    )?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            success: true,
            message: "Company registered successfully".to_string(),
            token,
            data: company.into(),
        }),
    ))
}

/// POST /api/auth/company/login
pub async fn login_company(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> Result<Json<AuthResponse<CompanyPublic>>, AppError> {
    let (email, password) = match (input.email.as_deref(), input.password.as_deref()) {
        (Some(e), Some(p)) if !e.trim().is_empty() && !p.is_empty() => {
            (e.trim().to_lowercase(), p)
        }
        _ => return Err(AppError::Unauthorized("Invalid credentials".to_string())),
    };

    let company = sqlx::query_as::<_, CompanyRow>("SELECT * FROM companies WHERE email = $1")
        .bind(&email)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?;

    if !verify_password(password, &company.password_hash) {
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    }

    sqlx::query("UPDATE companies SET last_login = NOW() WHERE id = $1")
        .bind(company.id)
        .execute(&state.db)
        .await?;

    let token = issue(
        &state.config.jwt_secret,
        company.id,
        Role::Company,
        state.config.token_ttl_hours,
    )?;

    Ok(Json(AuthResponse {
        success: true,
        message: "Login successful".to_string(),
        token,
        data: company.into(),
    }))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    principal: Principal,
) -> Result<Json<DataResponse<Value>>, AppError> {
    let data = match principal {
        Principal::Candidate(id) => {
            let row = sqlx::query_as::<_, CandidateRow>("SELECT * FROM candidates WHERE id = $1")
                .bind(id)
                .fetch_one(&state.db)
                .await?;
            let public: CandidatePublic = row.into();
            json!({ "role": "candidate", "account": public })
        }
        Principal::Company(id) => {
            let row = sqlx::query_as::<_, CompanyRow>("SELECT * FROM companies WHERE id = $1")
                .bind(id)
                .fetch_one(&state.db)
                .await?;
            let public: CompanyPublic = row.into();
            json!({ "role": "company", "account": public })
        }
        Principal::Anonymous => {
            return Err(AppError::Unauthorized(
                "Not authorized, no token".to_string(),
            ));
        }
    };
    Ok(Json(DataResponse::new(data)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_both_valid() {
        let mut errors = Vec::new();
        let (email, password) = validate_credentials(
            &mut errors,
            &Some("Jane@Example.com".to_string()),
            &Some("secret1".to_string()),
        );
        assert!(errors.is_empty());
        assert_eq!(email.as_deref(), Some("jane@example.com"));
        assert_eq!(password.as_deref(), Some("secret1"));
    }

    #[test]
    fn test_short_password_flagged() {
        let mut errors = Vec::new();
        validate_credentials(
            &mut errors,
            &Some("jane@example.com".to_string()),
            &Some("short".to_string()),
        );
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "password");
    }

    #[test]
    fn test_both_violations_reported() {
        let mut errors = Vec::new();
        validate_credentials(&mut errors, &Some("nope".to_string()), &None);
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["email", "password"]);
    }
}
