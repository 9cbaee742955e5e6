//! Router assembly: HTTP endpoints, WebSocket upgrade, static files, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
  routing::{get, post},
  Router,
};
use tower_http::{
  cors::{Any, CorsLayer},
  services::{ServeDir, ServeFile},
  trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;
pub mod ws;

/// Build the application router with:
/// - WebSocket authoring sessions at `/ws`
/// - Task, registry, and rendering endpoints under `/api/v1/...`
/// - Static SPA from `./static` with index fallback
/// - CORS (allow any origin/method/headers)
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
  let static_service = ServeDir::new("./static")
    .append_index_html_on_directories(true)
    .not_found_service(ServeFile::new("./static/index.html"));

  Router::new()
    .route("/ws", get(ws::ws_upgrade))
    .route("/api/v1/health", get(http::http_health))
    .route("/api/v1/kinds", get(http::http_get_kinds))
    .route("/api/v1/tasks", get(http::http_list_tasks).post(http::http_post_task))
    .route("/api/v1/tasks/form", post(http::http_post_task_form))
    .route("/api/v1/tasks/:id", get(http::http_get_task).delete(http::http_delete_task))
    .route("/api/v1/tasks/:id/display", get(http::http_get_display))
    .route("/api/v1/tasks/:id/answer", get(http::http_get_answer_form))
    .route("/api/v1/render/display", post(http::http_post_render_display))
    .route("/api/v1/render/answer", post(http::http_post_render_answer))
    .route("/api/v1/decode", post(http::http_post_decode))
    .route("/api/v1/answers", post(http::http_post_answer))
    .with_state(state)
    .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
    .layer(
      TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO)),
    )
    .fallback_service(static_service)
}
