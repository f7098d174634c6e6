//! Bearer-token auth middleware.
//!
//! Real authentication (password checking, user storage) is an external
//! collaborator per spec §1 — `/auth/login` here issues a token for any
//! non-empty username/password pair. What this module *does* own is not
//! stubbing the validator to "always true": tokens are real `jsonwebtoken`
//! HS256 JWTs signed with `SECRET_KEY`, so a request bearing a forged or
//! expired token is rejected.

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
}

/// Validates bearer tokens. Kept as a trait so the HTTP layer doesn't
/// hard-depend on one token scheme, per the capabilities-bundle REDESIGN.
pub trait TokenValidator: Send + Sync {
    fn issue(&self, subject: &str) -> String;
    fn validate(&self, token: &str) -> Result<String, ApiError>;
}

pub struct JwtValidator {
    secret: String,
    expire_hours: i64,
}

impl JwtValidator {
    pub fn new(secret: impl Into<String>, expire_hours: i64) -> Self {
        Self { secret: secret.into(), expire_hours }
    }
}

impl TokenValidator for JwtValidator {
    fn issue(&self, subject: &str) -> String {
        let claims = Claims {
            sub: subject.to_string(),
            exp: (Utc::now() + Duration::hours(self.expire_hours)).timestamp(),
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(self.secret.as_bytes()))
            .expect("HS256 encoding with a fixed secret never fails")
    }

    fn validate(&self, token: &str) -> Result<String, ApiError> {
        decode::<Claims>(token, &DecodingKey::from_secret(self.secret.as_bytes()), &Validation::default())
            .map(|data| data.claims.sub)
            .map_err(|_| ApiError::unauthorized("invalid or expired token"))
    }
}

/// Authenticated caller, injected as a request extension by [`require_auth`].
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub String);

pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::unauthorized("missing bearer token"))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::unauthorized("expected a Bearer token"))?;

    let subject = state.token_validator.validate(token)?;
    request.extensions_mut().insert(AuthenticatedUser(subject));

    Ok(next.run(request).await)
}
