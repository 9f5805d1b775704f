use std::sync::Arc;

use todo_auth::{AuthConfig, HttpMailer, Mailer, NoopMailer, SecurityService};
use todo_server::{AppState, ServerConfig};
use todo_store::users::UserRepo;
use todo_store::Database;
use todo_telemetry::TelemetryConfig;

mod config;
use config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();

    todo_telemetry::init_telemetry(&TelemetryConfig {
        log_filter: config.log_filter.clone(),
        json_output: config.log_json,
    });

    tracing::info!("starting todod");

    if config.jwt_secret.is_empty() {
        tracing::warn!("JWT_SECRET is empty; issued tokens are trivially forgeable");
    }

    let db = Database::open(&config.db_path)?;

    let mailer: Arc<dyn Mailer> = match config.mail.clone() {
        Some(mail) => Arc::new(HttpMailer::new(mail)),
        None => {
            tracing::warn!("MAIL_URL not set; password-reset mail will be dropped");
            Arc::new(NoopMailer)
        }
    };

    let security = Arc::new(SecurityService::new(
        UserRepo::new(db.clone()),
        AuthConfig {
            secret: config.jwt_secret.clone(),
            token_ttl_secs: config.jwt_ttl_secs,
        },
        mailer,
    ));

    let state = AppState::new(db, security);
    let handle = todo_server::start(
        ServerConfig {
            port: config.port,
            ..Default::default()
        },
        state,
    )
    .await?;

    tracing::info!(port = handle.port, "todod ready");

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");
    Ok(())
}
