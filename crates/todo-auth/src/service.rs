use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use tracing::{info, instrument};

use todo_core::ids::UserId;
use todo_core::user::RegisterRequest;
use todo_core::validation::{validate_registration, ValidationError};
use todo_store::users::{UserRepo, UserUpdate};
use todo_store::StoreError;

use crate::errors::AuthError;
use crate::mailer::Mailer;
use crate::{password, tokens};

/// Token signing configuration.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub secret: String,
    pub token_ttl_secs: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            token_ttl_secs: 24 * 60 * 60,
        }
    }
}

/// Account security operations. Stateless apart from its collaborators;
/// constructed once at startup and shared.
pub struct SecurityService {
    users: UserRepo,
    config: AuthConfig,
    mailer: Arc<dyn Mailer>,
}

impl SecurityService {
    pub fn new(users: UserRepo, config: AuthConfig, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            users,
            config,
            mailer,
        }
    }

    /// Register a new account. Fails fast on field validation, then on a
    /// taken email; the unique index backstops the race between the check
    /// and the insert.
    #[instrument(skip(self, data), fields(email = %data.email))]
    pub fn register(&self, data: &RegisterRequest) -> Result<UserId, AuthError> {
        validate_registration(data)?;

        if self.users.get_by_email(&data.email)?.is_some() {
            return Err(AuthError::UserAlreadyExists {
                email: data.email.clone(),
            });
        }

        let hash = password::hash_password(&data.password);
        let row = self
            .users
            .create(&data.first_name, &data.last_name, &data.email, &hash)
            .map_err(|e| match e {
                StoreError::Conflict(code) => {
                    AuthError::Validation(ValidationError {
                        messages: vec![code],
                    })
                }
                other => AuthError::Store(other),
            })?;

        info!(user_id = %row.id, "user registered");
        Ok(row.id)
    }

    /// Exchange credentials for a signed token.
    #[instrument(skip(self, password_plain), fields(email))]
    pub fn login(&self, email: &str, password_plain: &str) -> Result<String, AuthError> {
        let Some(row) = self.users.get_by_email(email)? else {
            return Err(AuthError::InvalidCredentials);
        };
        if !password::verify_password(password_plain, &row.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }
        tokens::issue(&row.id, &self.config.secret, self.config.token_ttl_secs)
    }

    /// Verify a bearer token and return the subject user id.
    pub fn validate_token(&self, token: &str) -> Result<UserId, AuthError> {
        tokens::verify(token, &self.config.secret)
    }

    /// Reset a forgotten password: store a hash of a freshly generated one
    /// and mail the plaintext to the account's address.
    #[instrument(skip(self), fields(email))]
    pub async fn forgot_password(&self, email: &str) -> Result<(), AuthError> {
        let Some(row) = self.users.get_by_email(email)? else {
            return Err(AuthError::UserNotFound {
                email: email.to_string(),
            });
        };

        let mut raw = [0u8; 8];
        rand::thread_rng().fill_bytes(&mut raw);
        let new_password = URL_SAFE_NO_PAD.encode(raw);

        self.users.update(
            &row.id,
            &UserUpdate {
                password_hash: Some(password::hash_password(&new_password)),
                ..UserUpdate::default()
            },
        )?;

        let html = format!(
            "Hi {} {}, your new password is <strong>{new_password}</strong>",
            row.first_name, row.last_name
        );
        self.mailer.send(&row.email, "Password Reset", &html).await?;

        info!(user_id = %row.id, "password reset issued");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mailer::{MailError, NoopMailer};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use todo_store::Database;

    fn service() -> SecurityService {
        service_with_mailer(Arc::new(NoopMailer))
    }

    fn service_with_mailer(mailer: Arc<dyn Mailer>) -> SecurityService {
        let db = Database::in_memory().unwrap();
        SecurityService::new(
            UserRepo::new(db),
            AuthConfig {
                secret: "test-secret".into(),
                token_ttl_secs: 3600,
            },
            mailer,
        )
    }

    fn john() -> RegisterRequest {
        RegisterRequest {
            first_name: "John".into(),
            last_name: "Doe".into(),
            email: "john.doe@example.com".into(),
            password: "12345678".into(),
        }
    }

    /// Captures outgoing mail for assertions.
    struct RecordingMailer {
        sent: Mutex<Vec<(String, String, String)>>,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), MailError> {
            self.sent
                .lock()
                .unwrap()
                .push((to.to_string(), subject.to_string(), html.to_string()));
            Ok(())
        }
    }

    #[test]
    fn register_then_login() {
        let service = service();
        let user_id = service.register(&john()).unwrap();
        assert!(user_id.as_str().starts_with("user_"));

        let token = service.login("john.doe@example.com", "12345678").unwrap();
        let verified = service.validate_token(&token).unwrap();
        assert_eq!(verified, user_id);
    }

    #[test]
    fn duplicate_registration_rejected() {
        let service = service();
        service.register(&john()).unwrap();
        assert!(matches!(
            service.register(&john()),
            Err(AuthError::UserAlreadyExists { .. })
        ));
    }

    #[test]
    fn invalid_fields_rejected_before_storage() {
        let service = service();
        let mut bad = john();
        bad.password = "short".into();
        assert!(matches!(
            service.register(&bad),
            Err(AuthError::Validation(_))
        ));
    }

    #[test]
    fn wrong_password_is_invalid_credentials() {
        let service = service();
        service.register(&john()).unwrap();
        assert!(matches!(
            service.login("john.doe@example.com", "wrong-pass"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn unknown_email_is_invalid_credentials() {
        let service = service();
        assert!(matches!(
            service.login("nobody@example.com", "12345678"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn tampered_token_rejected() {
        let service = service();
        service.register(&john()).unwrap();
        let token = service.login("john.doe@example.com", "12345678").unwrap();
        let tampered = format!("{token}x");
        assert!(matches!(
            service.validate_token(&tampered),
            Err(AuthError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn forgot_password_rotates_and_mails() {
        let mailer = Arc::new(RecordingMailer {
            sent: Mutex::new(Vec::new()),
        });
        let service = service_with_mailer(mailer.clone());
        service.register(&john()).unwrap();

        service.forgot_password("john.doe@example.com").await.unwrap();

        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        let (to, subject, html) = &sent[0];
        assert_eq!(to, "john.doe@example.com");
        assert_eq!(subject, "Password Reset");

        // The mailed password is the only credential that works now.
        let new_password = html
            .split("<strong>")
            .nth(1)
            .and_then(|rest| rest.split("</strong>").next())
            .unwrap()
            .to_string();
        drop(sent);

        assert!(matches!(
            service.login("john.doe@example.com", "12345678"),
            Err(AuthError::InvalidCredentials)
        ));
        service.login("john.doe@example.com", &new_password).unwrap();
    }

    #[tokio::test]
    async fn forgot_password_for_unknown_email_fails() {
        let service = service();
        assert!(matches!(
            service.forgot_password("nobody@example.com").await,
            Err(AuthError::UserNotFound { .. })
        ));
    }
}
