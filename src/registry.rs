//! Variant registry: one table entry per task kind.
//!
//! Every call site that needs per-kind behavior (default payload, which editor, which
//! answer control, which display) goes through [`spec`]. Adding a kind means adding a
//! `VariantKind` variant and one row here.

use serde::Serialize;

use crate::domain::{
  AnswerPayload, CipherPayload, MultiEntryPayload, MultiPartPayload, MultipleChoicePayload,
  TaskContent, TrueFalsePayload, VariantKind,
};

/// Editor component used to author a kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EditorComponent {
  AnswerField,
  Toggle,
  Choice,
  Cipher,
  Composite,
}

/// Component the administrator display uses to show a kind and its expected answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayComponent {
  ExpectedAnswer,
  TrueFalse,
  ChoiceList,
  Cipher,
  Composite,
}

/// Control the answer view uses to collect a new answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerComponent {
  TextInput,
  BlankInput,
  FileInput,
  Toggle,
  SingleChoice,
  CipherInput,
  Parts,
  Entries,
}

#[derive(Debug)]
pub struct VariantSpec {
  pub kind: VariantKind,
  pub label: &'static str,
  pub editor: EditorComponent,
  pub answer: AnswerComponent,
  pub display: DisplayComponent,
  /// MIME filter for upload kinds.
  pub accept: Option<&'static str>,
  /// Whether a composite may offer this kind as a child.
  pub addable_as_child: bool,
  default: fn() -> TaskContent,
}

impl VariantSpec {
  pub fn default_content(&self) -> TaskContent {
    (self.default)()
  }
}

static REGISTRY: [VariantSpec; 10] = [
  VariantSpec {
    kind: VariantKind::Text,
    label: "Short answer",
    editor: EditorComponent::AnswerField,
    answer: AnswerComponent::TextInput,
    display: DisplayComponent::ExpectedAnswer,
    accept: None,
    addable_as_child: true,
    default: || TaskContent::Text(AnswerPayload::default()),
  },
  VariantSpec {
    kind: VariantKind::MultipleChoice,
    label: "Multiple choice",
    editor: EditorComponent::Choice,
    answer: AnswerComponent::SingleChoice,
    display: DisplayComponent::ChoiceList,
    accept: None,
    addable_as_child: true,
    default: || TaskContent::MultipleChoice(MultipleChoicePayload::default()),
  },
  VariantSpec {
    kind: VariantKind::TrueFalse,
    label: "True / false",
    editor: EditorComponent::Toggle,
    answer: AnswerComponent::Toggle,
    display: DisplayComponent::TrueFalse,
    accept: None,
    addable_as_child: true,
    default: || TaskContent::TrueFalse(TrueFalsePayload::default()),
  },
  VariantSpec {
    kind: VariantKind::FillInTheBlank,
    label: "Fill in the blank",
    editor: EditorComponent::AnswerField,
    answer: AnswerComponent::BlankInput,
    display: DisplayComponent::ExpectedAnswer,
    accept: None,
    addable_as_child: true,
    default: || TaskContent::FillInTheBlank(AnswerPayload::default()),
  },
  VariantSpec {
    kind: VariantKind::ImageUpload,
    label: "Image upload",
    editor: EditorComponent::AnswerField,
    answer: AnswerComponent::FileInput,
    display: DisplayComponent::ExpectedAnswer,
    accept: Some("image/*"),
    addable_as_child: true,
    default: || TaskContent::ImageUpload(AnswerPayload::default()),
  },
  VariantSpec {
    kind: VariantKind::VideoUpload,
    label: "Video upload",
    editor: EditorComponent::AnswerField,
    answer: AnswerComponent::FileInput,
    display: DisplayComponent::ExpectedAnswer,
    accept: Some("video/*"),
    addable_as_child: true,
    default: || TaskContent::VideoUpload(AnswerPayload::default()),
  },
  VariantSpec {
    kind: VariantKind::FileUpload,
    label: "File upload",
    editor: EditorComponent::AnswerField,
    answer: AnswerComponent::FileInput,
    display: DisplayComponent::ExpectedAnswer,
    accept: Some("*/*"),
    addable_as_child: true,
    default: || TaskContent::FileUpload(AnswerPayload::default()),
  },
  VariantSpec {
    kind: VariantKind::Cipher,
    label: "Cipher",
    editor: EditorComponent::Cipher,
    answer: AnswerComponent::CipherInput,
    display: DisplayComponent::Cipher,
    accept: None,
    addable_as_child: true,
    default: || TaskContent::Cipher(CipherPayload::default()),
  },
  VariantSpec {
    kind: VariantKind::MultiPart,
    label: "Multi-part",
    editor: EditorComponent::Composite,
    answer: AnswerComponent::Parts,
    display: DisplayComponent::Composite,
    accept: None,
    addable_as_child: false,
    default: || TaskContent::MultiPart(MultiPartPayload::default()),
  },
  VariantSpec {
    kind: VariantKind::MultiEntry,
    label: "Multi-entry",
    editor: EditorComponent::Composite,
    answer: AnswerComponent::Entries,
    display: DisplayComponent::Composite,
    accept: None,
    addable_as_child: false,
    default: || TaskContent::MultiEntry(MultiEntryPayload::default()),
  },
];

fn index(kind: VariantKind) -> usize {
  match kind {
    VariantKind::Text => 0,
    VariantKind::MultipleChoice => 1,
    VariantKind::TrueFalse => 2,
    VariantKind::FillInTheBlank => 3,
    VariantKind::ImageUpload => 4,
    VariantKind::VideoUpload => 5,
    VariantKind::FileUpload => 6,
    VariantKind::Cipher => 7,
    VariantKind::MultiPart => 8,
    VariantKind::MultiEntry => 9,
  }
}

/// Registry entry for `kind`. Total over the closed enum.
pub fn spec(kind: VariantKind) -> &'static VariantSpec {
  &REGISTRY[index(kind)]
}

pub fn all() -> &'static [VariantSpec] {
  &REGISTRY
}

pub fn default_content(kind: VariantKind) -> TaskContent {
  spec(kind).default_content()
}

/// Kinds a composite offers in its "add child" menu.
pub fn child_kinds() -> Vec<VariantKind> {
  REGISTRY.iter().filter(|s| s.addable_as_child).map(|s| s.kind).collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn table_follows_declaration_order() {
    for (i, kind) in VariantKind::ALL.into_iter().enumerate() {
      assert_eq!(REGISTRY[i].kind, kind);
      assert_eq!(spec(kind).kind, kind);
      assert_eq!(spec(kind).default_content().kind(), kind);
    }
  }

  #[test]
  fn defaults_have_expected_shapes() {
    assert_eq!(serde_json::to_value(default_content(VariantKind::TrueFalse)).unwrap()["data"], json!({"answer": true}));
    assert_eq!(
      serde_json::to_value(default_content(VariantKind::MultipleChoice)).unwrap()["data"],
      json!({"question": [{"id": "1", "option": ""}, {"id": "2", "option": ""}], "answer": ""})
    );
    assert_eq!(
      serde_json::to_value(default_content(VariantKind::Cipher)).unwrap()["data"],
      json!({"answer": "", "type": "PIGPEN"})
    );
    assert_eq!(serde_json::to_value(default_content(VariantKind::MultiEntry)).unwrap()["data"], json!({"entries": []}));
  }

  #[test]
  fn display_components_follow_payload_shape() {
    assert_eq!(spec(VariantKind::VideoUpload).display, DisplayComponent::ExpectedAnswer);
    assert_eq!(spec(VariantKind::MultipleChoice).display, DisplayComponent::ChoiceList);
    assert_eq!(spec(VariantKind::Cipher).display, DisplayComponent::Cipher);
    for kind in VariantKind::ALL {
      assert_eq!(spec(kind).display == DisplayComponent::Composite, kind.is_composite(), "{kind}");
    }
  }

  #[test]
  fn composites_are_not_offered_as_children() {
    let kinds = child_kinds();
    assert_eq!(kinds.len(), 8);
    assert!(!kinds.contains(&VariantKind::MultiPart));
    assert!(!kinds.contains(&VariantKind::MultiEntry));
  }
}
