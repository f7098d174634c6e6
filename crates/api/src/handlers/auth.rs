//! `POST /auth/login`, `GET /auth/me`.
//!
//! Credential checking itself is out of scope (external collaborator,
//! spec §1) — any non-empty username/password pair is accepted and
//! issued a real signed token.

use axum::extract::{Extension, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::AuthenticatedUser;
use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginDto {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginDto>,
) -> Result<Json<LoginResponse>, ApiError> {
    if payload.username.trim().is_empty() || payload.password.is_empty() {
        return Err(ApiError::bad_request("username and password are required"));
    }

    let access_token = state.token_validator.issue(&payload.username);
    Ok(Json(LoginResponse { access_token, token_type: "bearer".to_string() }))
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub username: String,
}

pub async fn me(Extension(user): Extension<AuthenticatedUser>) -> Json<MeResponse> {
    Json(MeResponse { username: user.0 })
}
