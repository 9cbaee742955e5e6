//! Domain models: variant kinds, the per-kind payload shapes, and the persisted task.
//!
//! A task's `(kind, payload)` pair is a single adjacently tagged enum, [`TaskContent`],
//! so it always serializes as `{"type": <KIND>, "data": <payload>}`. Composite kinds
//! embed the same enum for their children.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The closed set of task kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VariantKind {
  Text,
  MultipleChoice,
  TrueFalse,
  FillInTheBlank,
  ImageUpload,
  VideoUpload,
  FileUpload,
  Cipher,
  MultiPart,
  MultiEntry,
}

impl VariantKind {
  /// Declaration order; the registry table follows it.
  pub const ALL: [VariantKind; 10] = [
    VariantKind::Text,
    VariantKind::MultipleChoice,
    VariantKind::TrueFalse,
    VariantKind::FillInTheBlank,
    VariantKind::ImageUpload,
    VariantKind::VideoUpload,
    VariantKind::FileUpload,
    VariantKind::Cipher,
    VariantKind::MultiPart,
    VariantKind::MultiEntry,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      VariantKind::Text => "TEXT",
      VariantKind::MultipleChoice => "MULTIPLECHOICE",
      VariantKind::TrueFalse => "TRUEFALSE",
      VariantKind::FillInTheBlank => "FILLINTHEBLANK",
      VariantKind::ImageUpload => "IMAGEUPLOAD",
      VariantKind::VideoUpload => "VIDEOUPLOAD",
      VariantKind::FileUpload => "FILEUPLOAD",
      VariantKind::Cipher => "CIPHER",
      VariantKind::MultiPart => "MULTIPART",
      VariantKind::MultiEntry => "MULTIENTRY",
    }
  }

  pub fn is_composite(self) -> bool {
    matches!(self, VariantKind::MultiPart | VariantKind::MultiEntry)
  }
}

impl fmt::Display for VariantKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown task kind: {0:?}")]
pub struct UnknownKind(pub String);

impl FromStr for VariantKind {
  type Err = UnknownKind;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    VariantKind::ALL
      .into_iter()
      .find(|k| k.as_str() == s.trim())
      .ok_or_else(|| UnknownKind(s.to_string()))
  }
}

/// Cipher families a cipher task can use.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CipherKind {
  #[default]
  Pigpen,
  Shift,
}

/// Single expected value. Shared by text, fill-in-the-blank and the upload kinds.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnswerPayload {
  pub answer: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrueFalsePayload {
  pub answer: bool,
}

impl Default for TrueFalsePayload {
  fn default() -> Self { Self { answer: true } }
}

/// One option of a multiple choice task. `id` is stable; display order is list order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChoiceOption {
  pub id: String,
  pub option: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MultipleChoicePayload {
  pub question: Vec<ChoiceOption>,
  /// Id of the correct option, or empty while none is selected.
  pub answer: String,
}

impl MultipleChoicePayload {
  pub fn has_option(&self, id: &str) -> bool {
    self.question.iter().any(|o| o.id == id)
  }
}

impl Default for MultipleChoicePayload {
  fn default() -> Self {
    Self {
      question: vec![
        ChoiceOption { id: "1".into(), option: String::new() },
        ChoiceOption { id: "2".into(), option: String::new() },
      ],
      answer: String::new(),
    }
  }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CipherPayload {
  pub answer: String,
  #[serde(rename = "type")]
  pub cipher: CipherKind,
  /// Only meaningful for `SHIFT`; kept (inert) when switching to another cipher.
  #[serde(rename = "shiftValue", default, skip_serializing_if = "Option::is_none")]
  pub shift_value: Option<i32>,
}

impl CipherPayload {
  /// Shift applied at render time; absent means no shift.
  pub fn effective_shift(&self) -> i32 {
    self.shift_value.unwrap_or(0)
  }
}

/// Ordered sequence of distinct sub-questions.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MultiPartPayload {
  pub parts: Vec<TaskContent>,
}

/// A sub-task repeated once per entry, collecting one answer each.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MultiEntryPayload {
  pub entries: Vec<TaskContent>,
}

/// A `(kind, payload)` pair. The variant is the kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "UPPERCASE")]
pub enum TaskContent {
  Text(AnswerPayload),
  MultipleChoice(MultipleChoicePayload),
  TrueFalse(TrueFalsePayload),
  FillInTheBlank(AnswerPayload),
  ImageUpload(AnswerPayload),
  VideoUpload(AnswerPayload),
  FileUpload(AnswerPayload),
  Cipher(CipherPayload),
  MultiPart(MultiPartPayload),
  MultiEntry(MultiEntryPayload),
}

impl TaskContent {
  pub fn kind(&self) -> VariantKind {
    match self {
      TaskContent::Text(_) => VariantKind::Text,
      TaskContent::MultipleChoice(_) => VariantKind::MultipleChoice,
      TaskContent::TrueFalse(_) => VariantKind::TrueFalse,
      TaskContent::FillInTheBlank(_) => VariantKind::FillInTheBlank,
      TaskContent::ImageUpload(_) => VariantKind::ImageUpload,
      TaskContent::VideoUpload(_) => VariantKind::VideoUpload,
      TaskContent::FileUpload(_) => VariantKind::FileUpload,
      TaskContent::Cipher(_) => VariantKind::Cipher,
      TaskContent::MultiPart(_) => VariantKind::MultiPart,
      TaskContent::MultiEntry(_) => VariantKind::MultiEntry,
    }
  }

  /// Children of a composite, `None` for leaf kinds.
  pub fn children(&self) -> Option<&[TaskContent]> {
    match self {
      TaskContent::MultiPart(p) => Some(&p.parts),
      TaskContent::MultiEntry(p) => Some(&p.entries),
      _ => None,
    }
  }

  /// Single-answer payload of the text-like kinds.
  pub fn answer_payload(&self) -> Option<&AnswerPayload> {
    match self {
      TaskContent::Text(p)
      | TaskContent::FillInTheBlank(p)
      | TaskContent::ImageUpload(p)
      | TaskContent::VideoUpload(p)
      | TaskContent::FileUpload(p) => Some(p),
      _ => None,
    }
  }

  /// Rebuild a text-like content of `kind` around `payload`.
  pub fn with_answer(kind: VariantKind, payload: AnswerPayload) -> Option<TaskContent> {
    Some(match kind {
      VariantKind::Text => TaskContent::Text(payload),
      VariantKind::FillInTheBlank => TaskContent::FillInTheBlank(payload),
      VariantKind::ImageUpload => TaskContent::ImageUpload(payload),
      VariantKind::VideoUpload => TaskContent::VideoUpload(payload),
      VariantKind::FileUpload => TaskContent::FileUpload(payload),
      _ => return None,
    })
  }
}

/// Persisted task. Owned by a challenge section.
#[derive(Clone, Debug, Serialize)]
pub struct Task {
  pub id: String,
  #[serde(rename = "sectionId")]
  pub section_id: String,
  pub title: String,
  /// Serialized rich-text document, passed through untouched.
  pub description: String,
  pub hint: String,
  #[serde(flatten)]
  pub content: TaskContent,
  pub points: u32,
  pub order: i32,
  #[serde(rename = "multiEntry")]
  pub multi_entry: bool,
  #[serde(rename = "updatedAt")]
  pub updated_at: u64,
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn kind_names_match_discriminators() {
    for kind in VariantKind::ALL {
      let v = serde_json::to_value(kind).unwrap();
      assert_eq!(v, json!(kind.as_str()));
      assert_eq!(kind.as_str().parse::<VariantKind>().unwrap(), kind);
    }
    assert!("ESSAY".parse::<VariantKind>().is_err());
  }

  #[test]
  fn content_is_adjacently_tagged() {
    let c = TaskContent::Cipher(CipherPayload { answer: "abc".into(), cipher: CipherKind::Shift, shift_value: Some(3) });
    assert_eq!(
      serde_json::to_value(&c).unwrap(),
      json!({"type": "CIPHER", "data": {"answer": "abc", "type": "SHIFT", "shiftValue": 3}})
    );
  }

  #[test]
  fn task_flattens_type_and_data() {
    let t = Task {
      id: "t1".into(),
      section_id: "s1".into(),
      title: "Colours".into(),
      description: "{}".into(),
      hint: String::new(),
      content: TaskContent::TrueFalse(TrueFalsePayload { answer: false }),
      points: 1,
      order: 0,
      multi_entry: false,
      updated_at: 0,
    };
    let v = serde_json::to_value(&t).unwrap();
    assert_eq!(v["type"], json!("TRUEFALSE"));
    assert_eq!(v["data"], json!({"answer": false}));
    assert_eq!(v["multiEntry"], json!(false));
  }
}
