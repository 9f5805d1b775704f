//! Session tokens: HS256 JWTs carrying the user id as `sub`.

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use todo_core::ids::UserId;

use crate::errors::AuthError;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// User id the token was issued for.
    sub: String,
    /// Issued at (Unix seconds).
    iat: i64,
    /// Expiry (Unix seconds).
    exp: i64,
}

/// Issue a token for `user_id`, valid for `ttl_secs` from now.
pub fn issue(user_id: &UserId, secret: &str, ttl_secs: i64) -> Result<String, AuthError> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user_id.as_str().to_string(),
        iat: now,
        exp: now + ttl_secs,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthError::Token(e.to_string()))
}

/// Verify a token and return the user id it was issued for.
///
/// An expired signature maps to [`AuthError::TokenExpired`]; every other
/// verification failure is [`AuthError::InvalidToken`].
pub fn verify(token: &str, secret: &str) -> Result<UserId, AuthError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken,
    })?;
    Ok(UserId::from_raw(data.claims.sub))
}
