//! Wire-facing error mapping.
//!
//! Every failure leaving a handler becomes `{ "message": <code>, "data":
//! <payload> }` with a status from the small table in [`ApiError::status`].
//! Unexpected failures are logged with their detail and surfaced with an
//! empty payload so nothing internal leaks to the caller.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use tracing::error;

use todo_auth::AuthError;
use todo_core::filter::InvalidSort;
use todo_core::pagination::InvalidPaginationParams;
use todo_core::validation::ValidationError;
use todo_store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("validation error")]
    Validation(Vec<String>),

    #[error("invalid pagination params")]
    InvalidPagination(InvalidPaginationParams),

    #[error("invalid sort")]
    InvalidSort(InvalidSort),

    #[error("todo not found: {0}")]
    TodoNotFound(String),

    #[error("user not found")]
    UserNotFound(Value),

    #[error("user already exists: {0}")]
    UserAlreadyExists(String),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("invalid token")]
    InvalidToken,

    #[error("token expired")]
    TokenExpired,

    #[error("unauthorized")]
    Unauthorized,

    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl ApiError {
    /// Machine-readable wire code.
    pub fn message(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::InvalidPagination(_) => "invalid_pagination_params",
            Self::InvalidSort(_) => "invalid_sort",
            Self::TodoNotFound(_) => "todo_not_found",
            Self::UserNotFound(_) => "user_not_found",
            Self::UserAlreadyExists(_) => "user_already_exists",
            Self::InvalidCredentials => "invalid_credentials",
            Self::InvalidToken => "invalid_token",
            Self::TokenExpired => "token_expired",
            Self::Unauthorized => "unauthorized",
            Self::Unexpected(_) => "unexpected_error",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_)
            | Self::InvalidPagination(_)
            | Self::InvalidSort(_)
            | Self::UserNotFound(_)
            | Self::UserAlreadyExists(_)
            | Self::InvalidCredentials => StatusCode::BAD_REQUEST,
            Self::Unauthorized | Self::InvalidToken | Self::TokenExpired => {
                StatusCode::UNAUTHORIZED
            }
            Self::TodoNotFound(_) => StatusCode::NOT_FOUND,
            Self::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn data(&self) -> Value {
        match self {
            Self::Validation(messages) => json!(messages),
            Self::InvalidPagination(p) => json!({
                "totals": p.totals,
                "limit": p.limit,
                "offset": p.offset,
            }),
            Self::InvalidSort(s) => json!({
                "sort": s.sort,
                "sortField": s.field,
                "sortOrder": s.direction,
            }),
            Self::TodoNotFound(uuid) => json!(uuid),
            Self::UserNotFound(data) => data.clone(),
            Self::UserAlreadyExists(email) => json!({ "email": email }),
            _ => json!({}),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Unexpected(detail) = &self {
            error!(detail = %detail, "unexpected error");
        }
        let body = json!({
            "message": self.message(),
            "data": self.data(),
        });
        (self.status(), Json(body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e.messages)
    }
}

impl From<InvalidPaginationParams> for ApiError {
    fn from(e: InvalidPaginationParams) -> Self {
        Self::InvalidPagination(e)
    }
}

impl From<InvalidSort> for ApiError {
    fn from(e: InvalidSort) -> Self {
        Self::InvalidSort(e)
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        Self::Unexpected(e.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Validation(v) => Self::Validation(v.messages),
            AuthError::UserAlreadyExists { email } => Self::UserAlreadyExists(email),
            AuthError::UserNotFound { email } => Self::UserNotFound(json!({ "email": email })),
            AuthError::InvalidCredentials => Self::InvalidCredentials,
            AuthError::InvalidToken => Self::InvalidToken,
            AuthError::TokenExpired => Self::TokenExpired,
            AuthError::Unauthorized => Self::Unauthorized,
            AuthError::Mail(detail) => Self::Unexpected(detail),
            AuthError::Store(e) => Self::Unexpected(e.to_string()),
            AuthError::Token(detail) => Self::Unexpected(detail),
        }
    }
}
