use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;

/// Which table the bearer's `sub` points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Candidate,
    Company,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// Signs a bearer token for the given principal (HS256).
pub fn issue(secret: &str, sub: Uuid, role: Role, ttl_hours: i64) -> Result<String, AppError> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub,
        role,
        iat: now,
        exp: now + ttl_hours * 3600,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to sign token: {e}")))
}

/// Verifies signature and expiry; any failure is an authentication failure,
/// never an internal error.
pub fn verify(secret: &str, token: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::Unauthorized("Not authorized, token failed".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_round_trip_preserves_subject_and_role() {
        let id = Uuid::new_v4();
        let token = issue(SECRET, id, Role::Candidate, 24).unwrap();
        let claims = verify(SECRET, &token).unwrap();
        assert_eq!(claims.sub, id);
        assert_eq!(claims.role, Role::Candidate);
    }

    #[test]
    fn test_company_role_survives_round_trip() {
        let token = issue(SECRET, Uuid::new_v4(), Role::Company, 24).unwrap();
        assert_eq!(verify(SECRET, &token).unwrap().role, Role::Company);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = issue(SECRET, Uuid::new_v4(), Role::Candidate, 24).unwrap();
        let err = verify("other-secret", &token).unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_tampered_token_rejected() {
        let token = issue(SECRET, Uuid::new_v4(), Role::Candidate, 24).unwrap();
        let mut tampered = token.clone();
        tampered.pop();
        assert!(verify(SECRET, &tampered).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        // Two hours in the past clears the default leeway.
        let token = issue(SECRET, Uuid::new_v4(), Role::Candidate, -2).unwrap();
        assert!(verify(SECRET, &token).is_err());
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(verify(SECRET, "not-a-jwt").is_err());
    }
}
