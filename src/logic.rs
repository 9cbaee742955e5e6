//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Submitting the authoring form (required fields, decoding, upsert)
//!   - Collecting end-user answers and forwarding them to grading
//!   - Describing the registry to clients

use thiserror::Error;
use tracing::{error, info, instrument, warn};

use crate::codec::{self, CodecError};
use crate::domain::{Task, VariantKind};
use crate::draft::Draft;
use crate::grading::AnswerSubmission;
use crate::protocol::{AnswerIn, KindOut, TaskForm, TaskMeta};
use crate::registry;
use crate::render::{check_answer_shape, AnswerShapeError};
use crate::state::{AppState, StoreError, TaskInput};
use crate::util::{is_blank, non_empty};

#[derive(Debug, Error)]
pub enum SubmitError {
  #[error("{field} is required")]
  MissingField { field: &'static str },

  #[error(transparent)]
  Decode(#[from] CodecError),

  #[error(transparent)]
  Store(#[from] StoreError),
}

impl SubmitError {
  /// Form field to flag next to the message, when there is one.
  pub fn field(&self) -> Option<&'static str> {
    match self {
      SubmitError::MissingField { field } => Some(*field),
      SubmitError::Decode(CodecError::UnknownKind(_)) => Some("type"),
      SubmitError::Decode(_) => Some("data"),
      SubmitError::Store(_) => None,
    }
  }
}

#[derive(Debug, Error)]
pub enum AnswerError {
  #[error("unknown task {0:?}")]
  UnknownTask(String),

  #[error(transparent)]
  Shape(#[from] AnswerShapeError),

  #[error("grading failed: {0}")]
  Grading(String),
}

/// Validate and persist one authoring form. Nothing is stored unless every check passes.
#[instrument(level = "info", skip(state, form), fields(kind = %form.kind, data_len = form.data.len()))]
pub async fn submit_task(state: &AppState, form: TaskForm) -> Result<Task, SubmitError> {
  let TaskForm { meta, kind, data } = form;
  if is_blank(&meta.title) {
    return Err(SubmitError::MissingField { field: "title" });
  }
  if is_blank(&meta.description) {
    return Err(SubmitError::MissingField { field: "description" });
  }
  if is_blank(&meta.section_id) {
    return Err(SubmitError::MissingField { field: "sectionId" });
  }

  let kind = kind.parse::<VariantKind>().map_err(CodecError::from)?;
  let content = codec::decode(kind, &data)?;
  let id = non_empty(meta.id);
  let input = TaskInput {
    section_id: meta.section_id,
    title: meta.title.trim().to_string(),
    description: meta.description,
    hint: meta.hint,
    content,
    points: meta.points,
    order: meta.order,
    multi_entry: meta.multi_entry,
  };
  let task = state.upsert(id.as_deref(), input).await?;
  info!(target: "task", id = %task.id, kind = %task.content.kind(), created = id.is_none(), "Task saved");
  Ok(task)
}

/// Build the form a draft would post: the encoded payload next to its discriminator.
pub fn form_from_draft(draft: &Draft, meta: TaskMeta) -> Result<TaskForm, CodecError> {
  Ok(TaskForm { meta, kind: draft.kind().to_string(), data: draft.emit()? })
}

/// Check an end-user answer against its task and hand it to grading.
/// Returns whether it was forwarded to a grading webhook.
#[instrument(level = "info", skip(state, body), fields(task_id = %body.task_id))]
pub async fn collect_answer(state: &AppState, body: AnswerIn) -> Result<bool, AnswerError> {
  let task = state.get_task(&body.task_id).await.ok_or_else(|| AnswerError::UnknownTask(body.task_id.clone()))?;
  check_answer_shape(&task.content, &body.answer)?;

  let submission = AnswerSubmission { task_id: task.id, answer: body.answer };
  match &state.grading {
    Some(g) => {
      g.forward(&submission).await.map_err(|e| {
        warn!(target: "task", task_id = %submission.task_id, error = %e, "Grading webhook failed");
        AnswerError::Grading(e)
      })?;
      Ok(true)
    }
    None => {
      info!(target: "task", task_id = %submission.task_id, answer = %submission.answer, "Answer accepted (no grading webhook)");
      Ok(false)
    }
  }
}

/// Registry listing for clients building a kind picker.
pub fn kinds_catalog() -> Vec<KindOut> {
  registry::all()
    .iter()
    .map(|s| KindOut {
      kind: s.kind,
      label: s.label,
      editor: s.editor,
      answer: s.answer,
      display: s.display,
      addable_as_child: s.addable_as_child,
      default_data: codec::encode(&s.default_content()).unwrap_or_else(|e| {
        error!(target: "task", kind = %s.kind, error = %e, "Default payload does not encode");
        String::new()
      }),
    })
    .collect()
}
