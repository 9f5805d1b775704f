//! Bearer-token authentication for the protected routes.

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;

use todo_core::ids::UserId;

use crate::error::ApiError;
use crate::server::AppState;

/// The authenticated subject, inserted into request extensions once the
/// bearer token checks out.
#[derive(Clone, Debug)]
pub struct AuthedUser(pub UserId);

/// Reject the request unless it carries a valid bearer token. The token is
/// the last space-separated part of the Authorization header, so both
/// `Bearer <token>` and a bare token are accepted.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(' ').next_back())
        .filter(|token| !token.is_empty())
        .ok_or(ApiError::Unauthorized)?;

    let user_id = state.security.validate_token(token)?;

    req.extensions_mut().insert(AuthedUser(user_id));
    Ok(next.run(req).await)
}
