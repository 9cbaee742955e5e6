//! Built-in demo tasks so the authoring UI has something to open without a config file.

use crate::domain::{
  AnswerPayload, ChoiceOption, CipherKind, CipherPayload, MultiPartPayload, MultipleChoicePayload, TaskContent,
  TrueFalsePayload,
};
use crate::state::TaskInput;

const DEMO_SECTION: &str = "demo";

/// Minimal set of built-in tasks covering a leaf kind, a choice, a cipher and a composite.
pub fn seed_tasks() -> Vec<(String, TaskInput)> {
  let task = |order: i32, title: &str, hint: &str, content: TaskContent| TaskInput {
    section_id: DEMO_SECTION.into(),
    title: title.into(),
    description: r#"{"type":"doc","content":[]}"#.into(),
    hint: hint.into(),
    content,
    points: None,
    order,
    multi_entry: false,
  };

  vec![
    (
      "demo-text".into(),
      task(0, "Capital city", "It is on the Seine.", TaskContent::Text(AnswerPayload { answer: "Paris".into() })),
    ),
    (
      "demo-choice".into(),
      task(
        1,
        "Sky colour",
        "",
        TaskContent::MultipleChoice(MultipleChoicePayload {
          question: vec![
            ChoiceOption { id: "1".into(), option: "Red".into() },
            ChoiceOption { id: "2".into(), option: "Blue".into() },
          ],
          answer: "2".into(),
        }),
      ),
    ),
    (
      "demo-cipher".into(),
      task(
        2,
        "Decode the message",
        "Every letter moved three places.",
        TaskContent::Cipher(CipherPayload { answer: "hello".into(), cipher: CipherKind::Shift, shift_value: Some(3) }),
      ),
    ),
    (
      "demo-parts".into(),
      task(
        3,
        "Warm-up",
        "",
        TaskContent::MultiPart(MultiPartPayload {
          parts: vec![
            TaskContent::TrueFalse(TrueFalsePayload { answer: true }),
            TaskContent::FillInTheBlank(AnswerPayload { answer: "seven".into() }),
          ],
        }),
      ),
    ),
  ]
}
