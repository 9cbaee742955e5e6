//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs parameters and basic result info.

use std::sync::Arc;

use axum::{
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
  Form, Json,
};
use tracing::{info, instrument, warn};

use crate::codec::{self, CodecError};
use crate::domain::{Task, VariantKind};
use crate::logic::{collect_answer, kinds_catalog, submit_task, AnswerError, SubmitError};
use crate::protocol::*;
use crate::render::{self, AnswerView, DisplayView};
use crate::state::AppState;

type ApiError = (StatusCode, Json<ErrorOut>);

fn api_error(status: StatusCode, field: Option<&'static str>, message: impl Into<String>) -> ApiError {
  (status, Json(ErrorOut { field, message: message.into() }))
}

fn not_found(id: &str) -> ApiError {
  api_error(StatusCode::NOT_FOUND, None, format!("Unknown task id: {}", id))
}

fn submit_error(e: SubmitError) -> ApiError {
  let status = match &e {
    SubmitError::Store(_) => StatusCode::NOT_FOUND,
    _ => StatusCode::UNPROCESSABLE_ENTITY,
  };
  warn!(target: "task", field = ?e.field(), error = %e, "Task submission rejected");
  api_error(status, e.field(), e.to_string())
}

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info")]
pub async fn http_get_kinds() -> impl IntoResponse {
  Json(kinds_catalog())
}

#[instrument(level = "info", skip(state, body), fields(kind = %body.kind, section = %body.meta.section_id))]
pub async fn http_post_task(
  State(state): State<Arc<AppState>>,
  Json(body): Json<TaskForm>,
) -> Result<Json<Task>, ApiError> {
  let task = submit_task(&state, body).await.map_err(submit_error)?;
  info!(target: "task", id = %task.id, "HTTP task saved");
  Ok(Json(task))
}

#[instrument(level = "info", skip(state, body), fields(kind = %body.kind, section = %body.section_id))]
pub async fn http_post_task_form(
  State(state): State<Arc<AppState>>,
  Form(body): Form<HtmlTaskForm>,
) -> Result<Json<Task>, ApiError> {
  let form = body
    .into_form()
    .map_err(|field| api_error(StatusCode::UNPROCESSABLE_ENTITY, Some(field), format!("{} must be a number", field)))?;
  let task = submit_task(&state, form).await.map_err(submit_error)?;
  info!(target: "task", id = %task.id, "HTTP form task saved");
  Ok(Json(task))
}

#[instrument(level = "info", skip(state), fields(section = %q.section))]
pub async fn http_list_tasks(
  State(state): State<Arc<AppState>>,
  Query(q): Query<TaskListQuery>,
) -> impl IntoResponse {
  Json(state.list_section(&q.section).await)
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_get_task(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Result<Json<Task>, ApiError> {
  state.get_task(&id).await.map(Json).ok_or_else(|| not_found(&id))
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_delete_task(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<DeletedOut>, ApiError> {
  if state.delete_task(&id).await {
    info!(target: "task", %id, "Task deleted");
    Ok(Json(DeletedOut { deleted: true }))
  } else {
    Err(not_found(&id))
  }
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_get_display(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<DisplayView>, ApiError> {
  let task = state.get_task(&id).await.ok_or_else(|| not_found(&id))?;
  Ok(Json(render::display_content(&task.content)))
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_get_answer_form(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<AnswerView>, ApiError> {
  let task = state.get_task(&id).await.ok_or_else(|| not_found(&id))?;
  Ok(Json(AnswerView { task_id: task.id.clone(), input: render::answer_input(&task.content) }))
}

/// Render an arbitrary stored pair; unknown kinds come back as a placeholder, not an error.
#[instrument(level = "info", skip(body), fields(kind = %body.kind))]
pub async fn http_post_render_display(Json(body): Json<RenderIn>) -> impl IntoResponse {
  Json(render::display(&body.kind, &body.data))
}

/// Answer form for an arbitrary stored pair. Same placeholder policy as the display.
#[instrument(level = "info", skip(body), fields(kind = %body.kind))]
pub async fn http_post_render_answer(Json(body): Json<RenderIn>) -> impl IntoResponse {
  Json(render::answer_form(&body.task_id, &body.kind, &body.data))
}

/// Decode check for the form `data` field without saving anything.
#[instrument(level = "info", skip(body), fields(kind = %body.kind))]
pub async fn http_post_decode(Json(body): Json<RenderIn>) -> Result<Json<serde_json::Value>, ApiError> {
  let Some(data) = body.data.as_str() else {
    return Err(api_error(StatusCode::UNPROCESSABLE_ENTITY, Some("data"), "data must be the encoded string"));
  };
  let content = body
    .kind
    .parse::<VariantKind>()
    .map_err(CodecError::from)
    .and_then(|kind| codec::decode(kind, data))
    .map_err(|e| api_error(StatusCode::UNPROCESSABLE_ENTITY, Some("data"), e.to_string()))?;
  Ok(Json(codec::payload_value(&content)))
}

#[instrument(level = "info", skip(state, body), fields(task_id = %body.task_id))]
pub async fn http_post_answer(
  State(state): State<Arc<AppState>>,
  Json(body): Json<AnswerIn>,
) -> Result<Json<AnswerOut>, ApiError> {
  match collect_answer(&state, body).await {
    Ok(forwarded) => Ok(Json(AnswerOut { accepted: true, forwarded })),
    Err(AnswerError::UnknownTask(id)) => Err(not_found(&id)),
    Err(e @ AnswerError::Shape(_)) => Err(api_error(StatusCode::UNPROCESSABLE_ENTITY, Some("answer"), e.to_string())),
    Err(e @ AnswerError::Grading(_)) => Err(api_error(StatusCode::BAD_GATEWAY, None, e.to_string())),
  }
}
