//! Unauthenticated account routes: register, login, forgot-password.

use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::json;

use todo_core::user::{ForgotPasswordRequest, RegisterRequest};

use crate::error::ApiError;
use crate::server::AppState;

/// `POST /api/v1/security/register`
pub async fn register(
    State(state): State<AppState>,
    Json(data): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let uuid = state.security.register(&data)?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "user_created", "data": uuid })),
    ))
}

/// `GET /api/v1/security/login` — HTTP Basic credentials in, token out.
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let (email, password) = basic_credentials(&headers)?;
    let token = state.security.login(&email, &password)?;
    Ok(Json(json!({ "token": token })))
}

/// `POST /api/v1/security/forgot-password`
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(data): Json<ForgotPasswordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state.security.forgot_password(&data.email).await?;
    Ok(Json(json!({ "message": "password_reset" })))
}

/// Decode `Authorization: Basic <base64(email:password)>`. Anything short
/// of a well-formed pair is `unauthorized`.
fn basic_credentials(headers: &HeaderMap) -> Result<(String, String), ApiError> {
    let authorization = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;

    let encoded = authorization
        .split(' ')
        .next_back()
        .filter(|part| !part.is_empty())
        .ok_or(ApiError::Unauthorized)?;

    let decoded = STANDARD
        .decode(encoded)
        .map_err(|_| ApiError::Unauthorized)?;
    let decoded = String::from_utf8(decoded).map_err(|_| ApiError::Unauthorized)?;

    let (email, password) = decoded.split_once(':').ok_or(ApiError::Unauthorized)?;
    if email.is_empty() || password.is_empty() {
        return Err(ApiError::Unauthorized);
    }
    Ok((email.to_string(), password.to_string()))
}
