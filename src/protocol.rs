//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{Task, VariantKind};
use crate::editors::{EditorEvent, EditorView};
use crate::registry::{AnswerComponent, DisplayComponent, EditorComponent};

/// Messages the authoring client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
  Ping,
  SelectKind {
    kind: VariantKind,
  },
  Edit {
    edit: EditorEvent,
  },
  Patch {
    data: Value,
  },
  Load {
    #[serde(rename = "taskId")]
    task_id: String,
  },
  Submit {
    #[serde(flatten)]
    meta: TaskMeta,
  },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
  Pong,
  /// Full current draft: discriminator, encoded payload, and editor controls.
  Draft {
    kind: VariantKind,
    data: String,
    editor: EditorView,
  },
  Submitted {
    task: Task,
  },
  Error {
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<&'static str>,
    message: String,
  },
}

/// Task fields that travel next to the draft when it is submitted.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct TaskMeta {
  #[serde(default)]
  pub id: Option<String>,
  #[serde(rename = "sectionId")]
  pub section_id: String,
  #[serde(default)]
  pub title: String,
  /// Serialized rich-text document from the description editor.
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub hint: String,
  #[serde(default)]
  pub points: Option<u32>,
  #[serde(default)]
  pub order: i32,
  #[serde(default, rename = "multiEntry")]
  pub multi_entry: bool,
}

/// The authoring form: task fields plus the `type` discriminator and the encoded `data`.
#[derive(Clone, Debug, Deserialize)]
pub struct TaskForm {
  #[serde(flatten)]
  pub meta: TaskMeta,
  #[serde(rename = "type")]
  pub kind: String,
  pub data: String,
}

/// Urlencoded variant of [`TaskForm`] posted by a plain HTML form. Every value arrives as
/// text; numbers and the checkbox are parsed in [`HtmlTaskForm::into_form`].
#[derive(Clone, Debug, Deserialize)]
pub struct HtmlTaskForm {
  #[serde(default)]
  pub id: String,
  #[serde(rename = "sectionId")]
  pub section_id: String,
  #[serde(default)]
  pub title: String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub hint: String,
  #[serde(rename = "type")]
  pub kind: String,
  pub data: String,
  #[serde(default)]
  pub points: String,
  #[serde(default)]
  pub order: String,
  #[serde(default, rename = "multiEntry")]
  pub multi_entry: Option<String>,
}

impl HtmlTaskForm {
  /// Returns the offending field name when a number does not parse.
  pub fn into_form(self) -> Result<TaskForm, &'static str> {
    let points = match self.points.trim() {
      "" => None,
      p => Some(p.parse::<u32>().map_err(|_| "points")?),
    };
    let order = match self.order.trim() {
      "" => 0,
      o => o.parse::<i32>().map_err(|_| "order")?,
    };
    let multi_entry = matches!(self.multi_entry.as_deref(), Some("on" | "true" | "1"));
    Ok(TaskForm {
      meta: TaskMeta {
        id: crate::util::non_empty(Some(self.id)),
        section_id: self.section_id,
        title: self.title,
        description: self.description,
        hint: self.hint,
        points,
        order,
        multi_entry,
      },
      kind: self.kind,
      data: self.data,
    })
  }
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
pub struct TaskListQuery {
  pub section: String,
}

#[derive(Debug, Serialize)]
pub struct KindOut {
  pub kind: VariantKind,
  pub label: &'static str,
  pub editor: EditorComponent,
  pub answer: AnswerComponent,
  pub display: DisplayComponent,
  #[serde(rename = "addableAsChild")]
  pub addable_as_child: bool,
  /// Encoded default payload, ready for the form `data` field.
  #[serde(rename = "defaultData")]
  pub default_data: String,
}

/// A raw stored `(type, data)` pair, as the persistence layer hands it back.
#[derive(Debug, Deserialize)]
pub struct RenderIn {
  #[serde(default, rename = "taskId")]
  pub task_id: String,
  #[serde(rename = "type")]
  pub kind: String,
  pub data: Value,
}

#[derive(Debug, Deserialize)]
pub struct AnswerIn {
  #[serde(rename = "taskId")]
  pub task_id: String,
  pub answer: Value,
}
#[derive(Serialize)]
pub struct AnswerOut {
  pub accepted: bool,
  pub forwarded: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorOut {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub field: Option<&'static str>,
  pub message: String,
}

#[derive(Serialize)]
pub struct DeletedOut {
  pub deleted: bool,
}

#[derive(Serialize)]
pub struct HealthOut {
  pub ok: bool,
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn form_carries_type_and_encoded_data() {
    let f: TaskForm = serde_json::from_value(json!({
      "sectionId": "s1",
      "title": "T",
      "description": "{}",
      "type": "TRUEFALSE",
      "data": "{\"answer\":true}",
      "multiEntry": true
    }))
    .unwrap();
    assert_eq!(f.kind, "TRUEFALSE");
    assert_eq!(f.data, r#"{"answer":true}"#);
    assert!(f.meta.multi_entry);
    assert_eq!(f.meta.points, None);
  }

  #[test]
  fn html_form_values_are_parsed() {
    let html = HtmlTaskForm {
      id: String::new(),
      section_id: "s1".into(),
      title: "T".into(),
      description: "{}".into(),
      hint: String::new(),
      kind: "TEXT".into(),
      data: r#"{"answer":"x"}"#.into(),
      points: "3".into(),
      order: "".into(),
      multi_entry: Some("on".into()),
    };
    let f = html.clone().into_form().unwrap();
    assert_eq!(f.meta.id, None);
    assert_eq!(f.meta.points, Some(3));
    assert_eq!(f.meta.order, 0);
    assert!(f.meta.multi_entry);

    let bad = HtmlTaskForm { points: "many".into(), ..html };
    assert_eq!(bad.into_form().unwrap_err(), "points");
  }

  #[test]
  fn ws_messages_parse() {
    let m: ClientWsMessage = serde_json::from_value(json!({"type": "select_kind", "kind": "CIPHER"})).unwrap();
    assert!(matches!(m, ClientWsMessage::SelectKind { kind: VariantKind::Cipher }));
    let m: ClientWsMessage =
      serde_json::from_value(json!({"type": "edit", "edit": {"event": "set_shift_value", "value": 3}})).unwrap();
    assert!(matches!(m, ClientWsMessage::Edit { edit: EditorEvent::SetShiftValue { value: 3 } }));
    let m: ClientWsMessage = serde_json::from_value(json!({"type": "submit", "sectionId": "s", "title": "x"})).unwrap();
    assert!(matches!(m, ClientWsMessage::Submit { ref meta } if meta.title == "x"));
  }
}
