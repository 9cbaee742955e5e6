//! Display and answer renderers.
//!
//! Both take the raw `(type, data)` pair as stored so that a kind this build does not know,
//! or a record that no longer decodes, turns into an `unsupported` placeholder instead of
//! failing the whole page.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::codec;
use crate::domain::{CipherKind, TaskContent, VariantKind};
use crate::registry::{self, AnswerComponent, DisplayComponent};

/// Administrator view: the task plus its expected answer.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum DisplayView {
  Answer { kind: VariantKind, label: &'static str, expected: String },
  TrueFalse { expected: bool },
  MultipleChoice { options: Vec<DisplayOption> },
  Cipher { cipher: CipherKind, shift_value: i32, expected: String },
  Composite { kind: VariantKind, label: &'static str, children: Vec<DisplayView> },
  Unsupported { kind: String, message: String },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DisplayOption {
  pub id: String,
  pub option: String,
  pub correct: bool,
}

/// End-user view: what to show and which control collects the answer.
/// Never carries the stored answer.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AnswerView {
  #[serde(rename = "taskId")]
  pub task_id: String,
  pub input: AnswerInput,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "control", rename_all = "snake_case")]
pub enum AnswerInput {
  Text { kind: VariantKind },
  Blank,
  File { kind: VariantKind, accept: &'static str },
  Toggle,
  SingleChoice { options: Vec<ChoiceLabel> },
  Cipher { cipher: CipherKind, shift_value: i32 },
  Parts { parts: Vec<AnswerInput> },
  Entries { entries: Vec<AnswerInput> },
  Unsupported { kind: String, message: String },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChoiceLabel {
  pub id: String,
  pub option: String,
}

fn resolve(kind: &str, data: &Value) -> Result<TaskContent, String> {
  codec::decode_raw(kind, data.clone()).map_err(|e| {
    warn!(target: "task", %kind, error = %e, "Rendering placeholder for unreadable task");
    e.to_string()
  })
}

/// Render the administrator display for a stored pair.
pub fn display(kind: &str, data: &Value) -> DisplayView {
  match resolve(kind, data) {
    Ok(content) => display_content(&content),
    Err(message) => DisplayView::Unsupported { kind: kind.to_string(), message },
  }
}

pub fn display_content(content: &TaskContent) -> DisplayView {
  let spec = registry::spec(content.kind());
  match (spec.display, content) {
    (DisplayComponent::TrueFalse, TaskContent::TrueFalse(p)) => DisplayView::TrueFalse { expected: p.answer },
    (DisplayComponent::ChoiceList, TaskContent::MultipleChoice(p)) => DisplayView::MultipleChoice {
      options: p
        .question
        .iter()
        .map(|o| DisplayOption { id: o.id.clone(), option: o.option.clone(), correct: o.id == p.answer })
        .collect(),
    },
    (DisplayComponent::Cipher, TaskContent::Cipher(p)) => {
      DisplayView::Cipher { cipher: p.cipher, shift_value: p.effective_shift(), expected: p.answer.clone() }
    }
    (DisplayComponent::Composite, _) => DisplayView::Composite {
      kind: spec.kind,
      label: spec.label,
      children: content.children().unwrap_or_default().iter().map(display_content).collect(),
    },
    _ => DisplayView::Answer {
      kind: spec.kind,
      label: spec.label,
      expected: content.answer_payload().map(|p| p.answer.clone()).unwrap_or_default(),
    },
  }
}

/// Render the answer form for a stored pair.
pub fn answer_form(task_id: &str, kind: &str, data: &Value) -> AnswerView {
  let input = match resolve(kind, data) {
    Ok(content) => answer_input(&content),
    Err(message) => AnswerInput::Unsupported { kind: kind.to_string(), message },
  };
  AnswerView { task_id: task_id.to_string(), input }
}

pub fn answer_input(content: &TaskContent) -> AnswerInput {
  let spec = registry::spec(content.kind());
  let children = || -> Vec<AnswerInput> { content.children().unwrap_or_default().iter().map(answer_input).collect() };
  match (spec.answer, content) {
    (AnswerComponent::SingleChoice, TaskContent::MultipleChoice(p)) => AnswerInput::SingleChoice {
      options: p.question.iter().map(|o| ChoiceLabel { id: o.id.clone(), option: o.option.clone() }).collect(),
    },
    (AnswerComponent::CipherInput, TaskContent::Cipher(p)) => {
      AnswerInput::Cipher { cipher: p.cipher, shift_value: p.effective_shift() }
    }
    (AnswerComponent::Toggle, _) => AnswerInput::Toggle,
    (AnswerComponent::Parts, _) => AnswerInput::Parts { parts: children() },
    (AnswerComponent::Entries, _) => AnswerInput::Entries { entries: children() },
    (AnswerComponent::FileInput, _) => AnswerInput::File { kind: spec.kind, accept: spec.accept.unwrap_or("*/*") },
    (AnswerComponent::BlankInput, _) => AnswerInput::Blank,
    _ => AnswerInput::Text { kind: spec.kind },
  }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnswerShapeError {
  #[error("{kind} expects {expected}")]
  WrongType { kind: VariantKind, expected: &'static str },

  #[error("{0:?} is not one of the options")]
  UnknownOption(String),

  #[error("{kind} expects {expected} answers, got {got}")]
  WrongCount { kind: VariantKind, expected: usize, got: usize },
}

/// Check a submitted answer has the shape the answer form collects for `content`.
pub fn check_answer_shape(content: &TaskContent, answer: &Value) -> Result<(), AnswerShapeError> {
  let kind = content.kind();
  match content {
    TaskContent::TrueFalse(_) => match answer {
      Value::Bool(_) => Ok(()),
      _ => Err(AnswerShapeError::WrongType { kind, expected: "a boolean" }),
    },
    TaskContent::MultipleChoice(p) => match answer {
      Value::String(id) if p.has_option(id) => Ok(()),
      Value::String(id) => Err(AnswerShapeError::UnknownOption(id.clone())),
      _ => Err(AnswerShapeError::WrongType { kind, expected: "an option id" }),
    },
    TaskContent::MultiPart(_) | TaskContent::MultiEntry(_) => {
      let children = content.children().unwrap_or_default();
      let Value::Array(items) = answer else {
        return Err(AnswerShapeError::WrongType { kind, expected: "a list of answers" });
      };
      if items.len() != children.len() {
        return Err(AnswerShapeError::WrongCount { kind, expected: children.len(), got: items.len() });
      }
      children.iter().zip(items).try_for_each(|(child, item)| check_answer_shape(child, item))
    }
    _ => match answer {
      Value::String(_) => Ok(()),
      _ => Err(AnswerShapeError::WrongType { kind, expected: "a string" }),
    },
  }
}
