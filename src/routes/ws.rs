//! WebSocket authoring session. Each connection owns exactly one draft; every message is
//! parsed as JSON, applied to that draft, and answered with a single JSON message.
//!
//! A failed edit or submission leaves the draft as it was so the author can retry.

use std::sync::Arc;

use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{debug, error, info, instrument};

use crate::config::Limits;
use crate::draft::Draft;
use crate::logic::{form_from_draft, submit_task};
use crate::protocol::{ClientWsMessage, ServerWsMessage, TaskMeta};
use crate::state::AppState;

/// Per-connection authoring state.
pub struct Session {
  limits: Limits,
  draft: Option<Draft>,
  /// Id of the task this session last saved, so re-submits update it.
  task_id: Option<String>,
}

impl Session {
  pub fn new(limits: Limits) -> Self {
    Self { limits, draft: None, task_id: None }
  }

  fn draft_message(draft: &Draft) -> ServerWsMessage {
    match draft.emit() {
      Ok(data) => ServerWsMessage::Draft { kind: draft.kind(), data, editor: draft.view() },
      Err(e) => ServerWsMessage::Error { field: Some("data"), message: e.to_string() },
    }
  }

  fn no_draft() -> ServerWsMessage {
    ServerWsMessage::Error { field: Some("type"), message: "Select a task kind first.".into() }
  }

  #[instrument(level = "info", skip(self, state))]
  pub async fn handle(&mut self, msg: ClientWsMessage, state: &AppState) -> ServerWsMessage {
    match msg {
      ClientWsMessage::Ping => ServerWsMessage::Pong,

      ClientWsMessage::SelectKind { kind } => {
        match self.draft.as_mut() {
          Some(d) => d.select_kind(kind),
          None => self.draft = Some(Draft::new(kind, self.limits)),
        }
        let Some(draft) = &self.draft else { return Self::no_draft() };
        Self::draft_message(draft)
      }

      ClientWsMessage::Edit { edit } => {
        let Some(draft) = &mut self.draft else { return Self::no_draft() };
        match draft.apply(&edit) {
          Ok(_) => Self::draft_message(draft),
          Err(e) => ServerWsMessage::Error { field: Some("data"), message: e.to_string() },
        }
      }

      ClientWsMessage::Patch { data } => {
        let Some(draft) = &mut self.draft else { return Self::no_draft() };
        match draft.apply_edit(data) {
          Ok(_) => Self::draft_message(draft),
          Err(e) => ServerWsMessage::Error { field: Some("data"), message: e.to_string() },
        }
      }

      ClientWsMessage::Load { task_id } => match state.get_task(&task_id).await {
        Some(task) => {
          info!(target: "task", id = %task.id, kind = %task.content.kind(), "WS draft loaded from task");
          self.task_id = Some(task.id);
          Self::draft_message(self.draft.insert(Draft::from_content(task.content, self.limits)))
        }
        None => ServerWsMessage::Error { field: None, message: format!("Unknown task id: {}", task_id) },
      },

      ClientWsMessage::Submit { meta } => {
        let Some(draft) = &self.draft else { return Self::no_draft() };
        let meta = TaskMeta { id: meta.id.or_else(|| self.task_id.clone()), ..meta };
        let form = match form_from_draft(draft, meta) {
          Ok(f) => f,
          Err(e) => return ServerWsMessage::Error { field: Some("data"), message: e.to_string() },
        };
        match submit_task(state, form).await {
          Ok(task) => {
            info!(target: "task", id = %task.id, "WS task submitted");
            self.task_id = Some(task.id.clone());
            ServerWsMessage::Submitted { task }
          }
          Err(e) => ServerWsMessage::Error { field: e.field(), message: e.to_string() },
        }
      }
    }
  }
}

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "challenge_tasks", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "challenge_tasks", "WebSocket authoring session opened");
  let mut session = Session::new(state.limits);
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        // Parse, dispatch, serialize response.
        let reply_msg = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => {
            debug!(target: "challenge_tasks", "WS received: {:?}", &incoming);
            session.handle(incoming, &state).await
          }
          Err(e) => ServerWsMessage::Error { field: None, message: format!("Invalid JSON: {}", e) },
        };

        let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
          serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
        });

        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "challenge_tasks", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  // Drafts are never persisted implicitly; dropping the session discards them.
  info!(target: "challenge_tasks", "WebSocket authoring session closed");
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::VariantKind;
  use crate::editors::EditorEvent;
  use serde_json::json;

  fn meta() -> TaskMeta {
    TaskMeta { section_id: "ws".into(), title: "From socket".into(), description: "{}".into(), ..TaskMeta::default() }
  }

  #[tokio::test]
  async fn session_edits_and_submits() {
    let state = AppState::with_config(None, None);
    let mut s = Session::new(Limits::default());

    assert!(matches!(s.handle(ClientWsMessage::Edit { edit: EditorEvent::AddOption }, &state).await, ServerWsMessage::Error { .. }));

    s.handle(ClientWsMessage::SelectKind { kind: VariantKind::MultipleChoice }, &state).await;
    let reply = s.handle(ClientWsMessage::Edit { edit: EditorEvent::SelectAnswer { id: "2".into() } }, &state).await;
    let ServerWsMessage::Draft { data, .. } = reply else { panic!("expected draft") };
    assert_eq!(data, r#"{"question":[{"id":"1","option":""},{"id":"2","option":""}],"answer":"2"}"#);

    let ServerWsMessage::Submitted { task } = s.handle(ClientWsMessage::Submit { meta: meta() }, &state).await else {
      panic!("expected submitted")
    };
    // Second submit updates the same task.
    s.handle(ClientWsMessage::Patch { data: json!({"answer": "1"}) }, &state).await;
    let ServerWsMessage::Submitted { task: again } = s.handle(ClientWsMessage::Submit { meta: meta() }, &state).await else {
      panic!("expected submitted")
    };
    assert_eq!(again.id, task.id);
    assert_eq!(state.list_section("ws").await.len(), 1);
  }

  #[tokio::test]
  async fn failed_submit_keeps_the_draft() {
    let state = AppState::with_config(None, None);
    let mut s = Session::new(Limits::default());
    s.handle(ClientWsMessage::SelectKind { kind: VariantKind::Text }, &state).await;
    s.handle(ClientWsMessage::Edit { edit: EditorEvent::SetAnswer { value: "kept".into() } }, &state).await;

    let reply = s.handle(ClientWsMessage::Submit { meta: TaskMeta { title: String::new(), ..meta() } }, &state).await;
    assert!(matches!(reply, ServerWsMessage::Error { field: Some("title"), .. }));
    assert_eq!(s.draft.as_ref().unwrap().emit().unwrap(), r#"{"answer":"kept"}"#);
  }

  #[tokio::test]
  async fn load_rehydrates_a_stored_task() {
    let state = AppState::with_config(None, None);
    let mut s = Session::new(Limits::default());
    let reply = s.handle(ClientWsMessage::Load { task_id: "demo-parts".into() }, &state).await;
    let ServerWsMessage::Draft { kind, .. } = reply else { panic!("expected draft") };
    assert_eq!(kind, VariantKind::MultiPart);
    assert_eq!(s.task_id.as_deref(), Some("demo-parts"));
  }
}
