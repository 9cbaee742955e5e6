//! Variant editors: pure `(payload, event) -> payload` functions plus the view model each
//! editor exposes to the authoring UI.
//!
//! The registry decides which editor a kind uses; composite kinds are handled by
//! [`crate::composite::Composer`], which keeps one nested draft per child.

mod basic;
mod cipher;
pub mod choice;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::codec::CodecError;
use crate::composite::Composer;
use crate::config::Limits;
use crate::domain::{CipherKind, TaskContent, VariantKind};
use crate::registry::{self, EditorComponent};

/// One authoring interaction. Sent by the UI, applied to the active draft.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EditorEvent {
  SetAnswer { value: String },
  SetToggle { value: bool },
  AddOption,
  RemoveOption { id: String },
  SetOptionText { id: String, text: String },
  SelectAnswer { id: String },
  SetCipherType { cipher: CipherKind },
  SetShiftValue { value: i32 },
  AddChild { kind: VariantKind },
  RemoveChild { child: String },
  EditChild { child: String, edit: Box<EditorEvent> },
  PatchChild { child: String, data: Value },
}

impl EditorEvent {
  pub fn name(&self) -> &'static str {
    match self {
      EditorEvent::SetAnswer { .. } => "set_answer",
      EditorEvent::SetToggle { .. } => "set_toggle",
      EditorEvent::AddOption => "add_option",
      EditorEvent::RemoveOption { .. } => "remove_option",
      EditorEvent::SetOptionText { .. } => "set_option_text",
      EditorEvent::SelectAnswer { .. } => "select_answer",
      EditorEvent::SetCipherType { .. } => "set_cipher_type",
      EditorEvent::SetShiftValue { .. } => "set_shift_value",
      EditorEvent::AddChild { .. } => "add_child",
      EditorEvent::RemoveChild { .. } => "remove_child",
      EditorEvent::EditChild { .. } => "edit_child",
      EditorEvent::PatchChild { .. } => "patch_child",
    }
  }
}

#[derive(Debug, Error)]
pub enum EditError {
  #[error("{kind} editor does not handle '{event}'")]
  UnsupportedEvent { kind: VariantKind, event: &'static str },

  #[error("no option with id {0:?}")]
  UnknownOption(String),

  #[error("a multiple choice task needs at least one option")]
  LastOption,

  #[error("no child with id {0:?}")]
  UnknownChild(String),

  #[error("{kind} cannot be added inside a composite task")]
  NotAddable { kind: VariantKind },

  #[error("at most {max} {what} allowed")]
  LimitReached { what: &'static str, max: usize },

  #[error("partial payload must be a JSON object")]
  PatchNotObject,

  #[error(transparent)]
  Codec(#[from] CodecError),
}

pub(crate) fn unsupported(kind: VariantKind, event: &EditorEvent) -> EditError {
  EditError::UnsupportedEvent { kind, event: event.name() }
}

/// View model for one editor: the controls the authoring UI renders.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "component", rename_all = "snake_case")]
pub enum EditorView {
  AnswerField { label: &'static str, value: String },
  Toggle { value: bool },
  Choice { options: Vec<OptionView>, answer: String, can_add: bool, can_remove: bool },
  Cipher {
    cipher: CipherKind,
    answer: String,
    show_shift: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    shift_value: Option<i32>,
  },
  Composite { kind: VariantKind, children: Vec<ChildView>, addable: Vec<VariantKind>, can_add: bool },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OptionView {
  pub id: String,
  pub option: String,
  pub selected: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChildView {
  pub id: String,
  pub kind: VariantKind,
  pub label: &'static str,
  pub editor: EditorView,
}

/// Apply `event` to a leaf (non-composite) content. Returns the complete new content.
pub fn apply_leaf(content: &TaskContent, event: &EditorEvent, limits: &Limits) -> Result<TaskContent, EditError> {
  let kind = content.kind();
  match (registry::spec(kind).editor, content) {
    (EditorComponent::AnswerField, _) => basic::apply_answer(content, event),
    (EditorComponent::Toggle, TaskContent::TrueFalse(_)) => basic::apply_toggle(event).map(TaskContent::TrueFalse),
    (EditorComponent::Choice, TaskContent::MultipleChoice(p)) => {
      choice::apply(p, event, limits).map(TaskContent::MultipleChoice)
    }
    (EditorComponent::Cipher, TaskContent::Cipher(p)) => cipher::apply(p, event).map(TaskContent::Cipher),
    _ => Err(unsupported(kind, event)),
  }
}

/// Editor view for any content. Composite children get positional ids here; a live
/// draft keeps its own stable ids instead.
pub fn view(content: &TaskContent, limits: &Limits) -> EditorView {
  let spec = registry::spec(content.kind());
  match content {
    TaskContent::TrueFalse(p) => EditorView::Toggle { value: p.answer },
    TaskContent::MultipleChoice(p) => choice::view(p, limits),
    TaskContent::Cipher(p) => cipher::view(p),
    TaskContent::MultiPart(_) | TaskContent::MultiEntry(_) => {
      Composer::from_content(content, *limits).map(|c| c.view()).unwrap_or(EditorView::Composite {
        kind: spec.kind,
        children: Vec::new(),
        addable: registry::child_kinds(),
        can_add: true,
      })
    }
    _ => EditorView::AnswerField {
      label: spec.label,
      value: content.answer_payload().map(|p| p.answer.clone()).unwrap_or_default(),
    },
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::*;
  use serde_json::json;

  #[test]
  fn events_use_snake_case_tags() {
    let e: EditorEvent = serde_json::from_value(json!({"event": "select_answer", "id": "2"})).unwrap();
    assert_eq!(e, EditorEvent::SelectAnswer { id: "2".into() });
    let nested: EditorEvent = serde_json::from_value(json!({
      "event": "edit_child", "child": "1", "edit": {"event": "set_toggle", "value": false}
    }))
    .unwrap();
    assert_eq!(nested.name(), "edit_child");
  }

  #[test]
  fn text_like_kinds_bind_answer_directly() {
    let limits = Limits::default();
    for kind in [VariantKind::Text, VariantKind::FillInTheBlank, VariantKind::FileUpload] {
      let c = crate::registry::default_content(kind);
      let next = apply_leaf(&c, &EditorEvent::SetAnswer { value: "42".into() }, &limits).unwrap();
      assert_eq!(next.kind(), kind);
      assert_eq!(next.answer_payload().unwrap().answer, "42");
    }
  }

  #[test]
  fn events_for_other_editors_are_rejected() {
    let limits = Limits::default();
    let c = TaskContent::TrueFalse(TrueFalsePayload { answer: true });
    let err = apply_leaf(&c, &EditorEvent::AddOption, &limits).unwrap_err();
    assert!(matches!(err, EditError::UnsupportedEvent { kind: VariantKind::TrueFalse, event: "add_option" }));
  }

  #[test]
  fn toggle_view_reports_value() {
    let c = TaskContent::TrueFalse(TrueFalsePayload { answer: false });
    assert_eq!(view(&c, &Limits::default()), EditorView::Toggle { value: false });
  }
}
