//! Bearer-token authentication (HS256 JWT).

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};
use chrono::{Duration, Utc};
use clipvault_core::AppError;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::HttpAppError;
use crate::state::AppState;

const ISSUER: &str = "clipvault";

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iss: String,
    exp: i64,
}

/// Mint an HS256 access token for a user.
///
/// Token issuance is out of band (operator tooling, test fixtures); the
/// service itself exposes no login endpoint.
pub fn issue_token(user_id: Uuid, secret: &str, expiry_hours: i64) -> Result<String, AppError> {
    let claims = Claims {
        sub: user_id.to_string(),
        iss: ISSUER.to_string(),
        exp: (Utc::now() + Duration::hours(expiry_hours)).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
}

/// Validate a bearer token and return the authenticated user id.
pub fn validate_token(token: &str, secret: &str) -> Result<Uuid, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))?;

    data.claims
        .sub
        .parse::<Uuid>()
        .map_err(|_| AppError::Unauthorized("Invalid token subject".to_string()))
}

/// Extractor for the authenticated caller. Rejects with 401 when the
/// Authorization header is missing, malformed, or fails validation.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: Uuid,
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = HttpAppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| {
                HttpAppError(AppError::Unauthorized(
                    "Missing Authorization header".to_string(),
                ))
            })?;

        let token = header_value.strip_prefix("Bearer ").ok_or_else(|| {
            HttpAppError(AppError::Unauthorized(
                "Authorization header must use the Bearer scheme".to_string(),
            ))
        })?;

        let user_id = validate_token(token, &state.config.jwt_secret)?;

        Ok(AuthUser { user_id })
    }
}
