use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::middleware;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use todo_auth::SecurityService;
use todo_store::todos::TodoRepo;
use todo_store::users::UserRepo;
use todo_store::Database;

use crate::auth_layer;
use crate::handlers::{security, todos, users};

/// Server configuration.
pub struct ServerConfig {
    pub port: u16,
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            request_timeout_secs: 30,
        }
    }
}

/// Shared application state passed to Axum handlers. The repositories and
/// the security service are stateless and constructed once at startup;
/// request handling never allocates new ones.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub todos: TodoRepo,
    pub users: UserRepo,
    pub security: Arc<SecurityService>,
}

impl AppState {
    pub fn new(db: Database, security: Arc<SecurityService>) -> Self {
        Self {
            todos: TodoRepo::new(db.clone()),
            users: UserRepo::new(db.clone()),
            db,
            security,
        }
    }
}

/// Build the Axum router with all routes.
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route(
            "/api/v1/user",
            get(users::get_user)
                .patch(users::update_user)
                .delete(users::delete_user),
        )
        .route(
            "/api/v1/tasks",
            post(todos::create_todo).get(todos::list_todos),
        )
        .route(
            "/api/v1/tasks/{uuid}",
            get(todos::get_todo)
                .patch(todos::update_todo)
                .delete(todos::delete_todo),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_layer::require_auth,
        ));

    Router::new()
        .route("/api/v1/security/register", post(security::register))
        .route("/api/v1/security/login", get(security::login))
        .route(
            "/api/v1/security/forgot-password",
            post(security::forgot_password),
        )
        .route("/health", get(health_handler))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Create and start the server. Returns a handle that keeps it alive.
pub async fn start(config: ServerConfig, state: AppState) -> Result<ServerHandle, std::io::Error> {
    let router = build_router(state)
        .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)));

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(port = local_addr.port(), "todod server started");

    let server_handle = tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });

    Ok(ServerHandle {
        port: local_addr.port(),
        _server: server_handle,
    })
}

/// Handle returned by `start()` — keeps the accept loop alive.
pub struct ServerHandle {
    pub port: u16,
    _server: tokio::task::JoinHandle<()>,
}

/// Liveness probe: healthy iff the database answers.
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let alive = state
        .db
        .with_conn(|conn| {
            conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
                .map_err(Into::into)
        })
        .is_ok();

    if alive {
        (StatusCode::OK, Json(serde_json::json!({ "status": "healthy" })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({ "status": "unhealthy" })),
        )
    }
}
