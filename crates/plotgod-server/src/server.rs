use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use plotgod_core::provider::PrepGenerator;
use plotgod_store::{Database, StoreError};

use crate::handlers;

/// Server configuration.
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 8080 }
    }
}

/// Shared application state passed to Axum handlers: the database handle and
/// the generative-text collaborator, both constructed once at startup.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub generator: Arc<dyn PrepGenerator>,
}

/// Build the Axum router with all routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/campaigns",
            get(handlers::campaigns_list).post(handlers::campaigns_create),
        )
        .route(
            "/api/campaigns/{id}",
            get(handlers::campaigns_get).post(handlers::campaigns_update),
        )
        .route("/api/campaigns/{id}/delete", post(handlers::campaigns_delete))
        .route(
            "/api/campaigns/{id}/last-session",
            get(handlers::campaigns_last_session),
        )
        .route(
            "/api/campaigns/{id}/session-prep",
            post(handlers::campaigns_session_prep),
        )
        .route(
            "/api/campaigns/{id}/sessions",
            get(handlers::sessions_list).post(handlers::sessions_create),
        )
        .route(
            "/api/campaigns/{id}/sessions/{sid}",
            get(handlers::sessions_get).post(handlers::sessions_update),
        )
        .route(
            "/api/campaigns/{id}/sessions/{sid}/delete",
            post(handlers::sessions_delete),
        )
        .route(
            "/api/campaigns/{id}/party",
            get(handlers::party_list).post(handlers::party_create),
        )
        .route(
            "/api/campaigns/{id}/party/{mid}",
            get(handlers::party_get).post(handlers::party_update),
        )
        .route(
            "/api/campaigns/{id}/party/{mid}/delete",
            post(handlers::party_delete),
        )
        .route(
            "/api/campaigns/{id}/npcs",
            get(handlers::npcs_list).post(handlers::npcs_create),
        )
        .route(
            "/api/campaigns/{id}/npcs/{nid}",
            get(handlers::npcs_get).post(handlers::npcs_update),
        )
        .route(
            "/api/campaigns/{id}/npcs/{nid}/delete",
            post(handlers::npcs_delete),
        )
        .route(
            "/api/locations",
            get(handlers::locations_list).post(handlers::locations_create),
        )
        .route(
            "/api/locations/{lid}",
            get(handlers::locations_get).post(handlers::locations_update),
        )
        .route(
            "/api/locations/{lid}/delete",
            post(handlers::locations_delete),
        )
        .route("/health", get(health_handler))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Create and start the server. Returns a handle that keeps it alive.
pub async fn start(
    config: ServerConfig,
    db: Database,
    generator: Arc<dyn PrepGenerator>,
) -> Result<ServerHandle, std::io::Error> {
    let state = AppState { db, generator };
    let router = build_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(port = local_addr.port(), "plotgod server started");

    let server_handle = tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });

    Ok(ServerHandle {
        port: local_addr.port(),
        _server: server_handle,
    })
}

/// Handle returned by `start()`.
pub struct ServerHandle {
    pub port: u16,
    _server: tokio::task::JoinHandle<()>,
}

/// Liveness probe: a trivial query against a fresh connection.
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let probe = state.db.with_conn(|conn| {
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .map_err(StoreError::from)
    });

    match probe {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({"ok": true, "status": "healthy"})),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"ok": false, "status": "unhealthy", "error": e.to_string()})),
        ),
    }
}
