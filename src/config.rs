//! Environment-driven configuration for the daemon.

use std::path::PathBuf;

use todo_auth::MailConfig;

pub struct Config {
    pub port: u16,
    pub db_path: PathBuf,
    pub jwt_secret: String,
    pub jwt_ttl_secs: i64,
    /// Present only when MAIL_URL is set; otherwise mail is a no-op.
    pub mail: Option<MailConfig>,
    pub log_filter: String,
    pub log_json: bool,
}

impl Config {
    pub fn from_env() -> Self {
        let port = env_or("PORT", "3000").parse().unwrap_or(3000);

        let db_path = std::env::var("TODOD_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home_dir().join(".todod").join("todod.db"));

        let jwt_secret = env_or("JWT_SECRET", "");
        let jwt_ttl_secs = env_or("JWT_TTL_SECS", "86400").parse().unwrap_or(86_400);

        let mail = std::env::var("MAIL_URL").ok().map(|url| MailConfig {
            url,
            username: env_or("MAIL_USER", ""),
            password: env_or("MAIL_PASS", ""),
        });

        let log_filter = env_or("LOG_FILTER", "info");
        let log_json = env_or("LOG_JSON", "false") == "true";

        Self {
            port,
            db_path,
            jwt_secret,
            jwt_ttl_secs,
            mail,
            log_filter,
            log_json,
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn home_dir() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}
