//! REST API for the career catalog.
//!
//! Every catalog route lives under `/api`. Listing routes take `page`, `limit`, `search`
//! and `type` query parameters and answer with paginated envelopes. Errors are JSON
//! `{message}` bodies; chat always answers with `{reply}`.

use crate::catalog::{Career, Question, Roadmap};
use crate::chat::{self, ChatResponder};
use crate::config::Config;
use crate::error::{CatalogError, Result};
use crate::query::{self, CareerPage, CareerQuery, EntryPage, EntryQuery, ListParams};
use crate::quiz::{self, AssessmentRequest, AssessmentResult};
use crate::store::CatalogStore;
use axum::{
    Json, Router,
    body::Body,
    extract::{Path, Query, State},
    http::{Request, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// Shared state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CatalogStore>,
    pub chat: Arc<dyn ChatResponder>,
    pub config: Arc<Config>,
}

impl AppState {
    fn default_limit(&self) -> u64 {
        self.config.server.default_limit
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
}

pub async fn root_handler() -> impl IntoResponse {
    "API is running..."
}

/// Health check endpoint
pub async fn health_handler() -> impl IntoResponse {
    "ok"
}

pub async fn list_careers_handler(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<CareerPage>> {
    let query = CareerQuery::from_params(&params, state.default_limit());
    Ok(Json(query::list_careers(state.store.as_ref(), &query).await?))
}

pub async fn career_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Career>> {
    Ok(Json(query::find_career(state.store.as_ref(), &id).await?))
}

pub async fn questions_handler(State(state): State<AppState>) -> Result<Json<Vec<Question>>> {
    Ok(Json(state.store.questions().await?))
}

pub async fn roadmaps_handler(State(state): State<AppState>) -> Result<Json<Vec<Roadmap>>> {
    Ok(Json(state.store.roadmaps().await?))
}

pub async fn list_colleges_handler(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<EntryPage>> {
    let query = EntryQuery::from_params(&params, state.default_limit());
    Ok(Json(query::list_entries(state.store.as_ref(), &query).await?))
}

/// A body that is missing or not JSON is treated like a missing message
pub async fn chat_handler(
    State(state): State<AppState>,
    payload: Option<Json<ChatRequest>>,
) -> Response {
    let message = payload
        .and_then(|Json(req)| req.message)
        .filter(|m| !m.trim().is_empty());

    let Some(message) = message else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ChatReply {
                reply: chat::MISSING_MESSAGE_REPLY.to_string(),
            }),
        )
            .into_response();
    };

    let reply = chat::reply_to(state.chat.as_ref(), &message).await;
    Json(ChatReply { reply }).into_response()
}

pub async fn assessment_handler(
    State(state): State<AppState>,
    Json(request): Json<AssessmentRequest>,
) -> Result<Json<AssessmentResult>> {
    Ok(Json(quiz::assess(state.store.as_ref(), &request).await?))
}

async fn log_requests(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let start = Instant::now();
    let resp = next.run(req).await;
    info!(
        "{} {} -> {} ({} ms)",
        method,
        path,
        resp.status().as_u16(),
        start.elapsed().as_millis()
    );
    resp
}

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/careers", get(list_careers_handler))
        .route("/careers/:id", get(career_handler))
        .route("/questions", get(questions_handler))
        .route("/roadmaps", get(roadmaps_handler))
        .route("/colleges", get(list_colleges_handler))
        .route("/chat", post(chat_handler))
        .route("/assessment", post(assessment_handler));

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .nest("/api", api)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(middleware::from_fn(log_requests))
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_http_server(state: AppState) -> Result<()> {
    let bind = state.config.server.bind_addr();
    let backend = state.store.backend_tag();
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .map_err(|e| CatalogError::Config {
            message: format!("Failed to bind HTTP listener on {}: {}", bind, e),
        })?;

    info!("Server running on {} (store: {})", bind, backend);

    axum::serve(listener, app)
        .await
        .map_err(|e| CatalogError::Internal {
            message: format!("HTTP server error: {}", e),
        })?;

    Ok(())
}
