//! Challenge Tasks · Authoring and Rendering Backend
//!
//! - Polymorphic task payloads (ten kinds) with a registry, editors, codec, and renderers
//! - Axum HTTP API + WebSocket authoring sessions
//! - Optional grading webhook for end-user answers
//! - Static SPA fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT                 : u16 (default 3000)
//!   TASKS_CONFIG_PATH    : path to TOML config (limits + optional task bank)
//!   GRADING_WEBHOOK_URL  : forwards collected answers when present
//!   LOG_LEVEL            : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT           : "pretty" (default) or "json"

mod telemetry;
mod util;
mod domain;
mod registry;
mod codec;
mod editors;
mod composite;
mod draft;
mod render;
mod config;
mod seeds;
mod state;
mod grading;
mod protocol;
mod logic;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, instrument};

use crate::routes::build_router;
use crate::state::AppState;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Shared state: task store, limits, grading client.
  let state = Arc::new(AppState::new());

  let app = build_router(state.clone());

  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "challenge_tasks", %addr, kinds = registry::all().len(), "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  info!(target: "challenge_tasks", "Server stopped");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(target: "challenge_tasks", error = %e, "Failed to listen for shutdown signal");
  }
}
