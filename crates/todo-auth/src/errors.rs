use thiserror::Error;

use todo_core::validation::ValidationError;
use todo_store::StoreError;

use crate::mailer::MailError;

/// Failures raised by the security service.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Field-level validation failed before any storage access.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Registration attempted with an email that already has an account.
    #[error("user already exists: {email}")]
    UserAlreadyExists { email: String },

    /// No account for the given email.
    #[error("user not found: {email}")]
    UserNotFound { email: String },

    /// Login rejected. Deliberately does not say whether the email or the
    /// password was wrong.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Token failed signature or structural verification.
    #[error("invalid token")]
    InvalidToken,

    /// Token was valid once but its expiry has passed.
    #[error("token expired")]
    TokenExpired,

    /// Request carried no usable credentials at all.
    #[error("unauthorized")]
    Unauthorized,

    /// Mail delivery failed.
    #[error("mail error: {0}")]
    Mail(String),

    /// Underlying storage failure.
    #[error("{0}")]
    Store(#[from] StoreError),

    /// Token construction failed (bad key material, encoding).
    #[error("token error: {0}")]
    Token(String),
}

impl From<MailError> for AuthError {
    fn from(e: MailError) -> Self {
        Self::Mail(e.0)
    }
}
