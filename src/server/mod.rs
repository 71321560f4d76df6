use axum::{
    routing::{delete, get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use crate::graph::NodeIdentity;
use crate::storage::SqliteStore;

pub mod routes;

/// Server state
pub struct AppState {
    pub store: Mutex<SqliteStore>,
    pub identity: NodeIdentity,
    /// Used when a request does not name a user
    pub default_user: Option<i64>,
}

impl AppState {
    pub fn new(store: SqliteStore, identity: NodeIdentity, default_user: Option<i64>) -> Self {
        Self {
            store: Mutex::new(store),
            identity,
            default_user,
        }
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/stats", get(routes::get_stats))
        .route("/refs/graph", get(routes::get_graph))
        .route("/refs/bind", post(routes::bind))
        .route("/refs/check", get(routes::check))
        .route("/refs/source/{source_id}", get(routes::get_source))
        .route("/refs/{source_id}", delete(routes::delete_source))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start_server(port: u16, state: AppState) -> anyhow::Result<()> {
    let app = build_router(Arc::new(state));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
