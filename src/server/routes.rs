use axum::{
    extract::{Path, Query, State},
    Json,
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use crate::server::AppState;
use crate::graph::ReferenceGraph;
use crate::reference::{ReferenceRecord, ReferenceRequest};
use crate::service::ReferenceService;
use crate::storage::DbStats;
use std::sync::Arc;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphParams {
    pub user_id: Option<i64>,
    pub only_inner: Option<bool>,
}

#[derive(Deserialize)]
pub struct CheckParams {
    pub url: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BindBody {
    pub user_id: Option<i64>,
    pub source_id: i64,
    pub source_name: String,
    #[serde(default)]
    pub references: Vec<ReferenceRequest>,
}

#[derive(Serialize)]
pub struct CheckResponse {
    pub url: String,
    pub referenced: bool,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(e: crate::Error) -> ApiError {
    let status = if e.is_invalid_input() {
        StatusCode::BAD_REQUEST
    } else {
        tracing::error!("Request failed: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(ErrorResponse { error: e.to_string() }))
}

fn resolve_user(state: &AppState, user_id: Option<i64>) -> Result<i64, ApiError> {
    user_id.or(state.default_user).ok_or_else(|| {
        (StatusCode::BAD_REQUEST, Json(ErrorResponse { error: "userId is required".to_string() }))
    })
}

pub async fn get_graph(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GraphParams>,
) -> Result<Json<ReferenceGraph>, ApiError> {
    let user_id = resolve_user(&state, params.user_id)?;
    let store = state.store.lock().await;
    let service = ReferenceService::with_identity(&store, state.identity);

    let graph = service
        .list_all(params.only_inner.unwrap_or(false), user_id)
        .map_err(api_error)?;
    Ok(Json(graph))
}

pub async fn bind(
    State(state): State<Arc<AppState>>,
    Json(body): Json<BindBody>,
) -> Result<StatusCode, ApiError> {
    let user_id = resolve_user(&state, body.user_id)?;
    let store = state.store.lock().await;
    let service = ReferenceService::with_identity(&store, state.identity);

    service
        .bind(user_id, body.source_id, &body.source_name, body.references)
        .map_err(api_error)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_source(
    State(state): State<Arc<AppState>>,
    Path(source_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let store = state.store.lock().await;
    ReferenceService::new(&store).delete(source_id).map_err(api_error)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn check(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CheckParams>,
) -> Result<Json<CheckResponse>, ApiError> {
    let store = state.store.lock().await;
    let referenced = ReferenceService::new(&store).check(&params.url).map_err(api_error)?;
    Ok(Json(CheckResponse { url: params.url, referenced }))
}

pub async fn get_source(
    State(state): State<Arc<AppState>>,
    Path(source_id): Path<i64>,
) -> Result<Json<Vec<ReferenceRecord>>, ApiError> {
    let store = state.store.lock().await;
    let records = ReferenceService::new(&store).references_of(source_id).map_err(api_error)?;
    Ok(Json(records))
}

pub async fn get_stats(State(state): State<Arc<AppState>>) -> Result<Json<DbStats>, ApiError> {
    let store = state.store.lock().await;
    let stats = store.stats().map_err(api_error)?;
    Ok(Json(stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeIdentity;
    use crate::server::build_router;
    use crate::storage::SqliteStore;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    fn app(default_user: Option<i64>) -> axum::Router {
        let store = SqliteStore::open_in_memory().unwrap();
        build_router(Arc::new(AppState::new(store, NodeIdentity::Name, default_user)))
    }

    async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if body.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, value)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).method("GET").body(Body::empty()).unwrap()
    }

    fn post_bind(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .uri("/refs/bind")
            .method("POST")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_bind_then_graph() {
        let app = app(None);
        let (status, _) = send(
            &app,
            post_bind(serde_json::json!({
                "userId": 7,
                "sourceId": 1,
                "sourceName": "Intro",
                "references": [{"targetType": 21, "targetUrl": "https://x.com", "targetName": "X"}]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, graph) = send(&app, get("/refs/graph?userId=7&onlyInner=false")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(graph["nodes"].as_array().unwrap().len(), 2);
        assert_eq!(graph["links"], serde_json::json!([{"source": "Intro", "target": "X"}]));

        let (_, check) = send(&app, get("/refs/check?url=https://x.com")).await;
        assert_eq!(check["referenced"], true);

        let (_, records) = send(&app, get("/refs/source/1")).await;
        assert_eq!(records[0]["sourceName"], "Intro");
    }

    #[tokio::test]
    async fn test_empty_graph_shape() {
        let app = app(Some(7));
        let (status, graph) = send(&app, get("/refs/graph")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(graph, serde_json::json!({"nodes": [], "links": []}));
    }

    #[tokio::test]
    async fn test_graph_requires_user() {
        let app = app(None);
        let (status, body) = send(&app, get("/refs/graph")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("userId"));
    }

    #[tokio::test]
    async fn test_invalid_reference_is_bad_request() {
        let app = app(Some(7));
        let (status, _) = send(
            &app,
            post_bind(serde_json::json!({
                "sourceId": 1,
                "sourceName": "Intro",
                "references": [{"targetType": 11, "targetUrl": "/articles/2", "targetName": "Guide"}]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_delete_unknown_source() {
        let app = app(None);
        let request = Request::builder().uri("/refs/42").method("DELETE").body(Body::empty()).unwrap();
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, stats) = send(&app, get("/stats")).await;
        assert_eq!(stats["references"], 0);
    }
}
