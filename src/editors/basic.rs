//! Single-field editors: the text-like kinds and the true/false toggle.

use crate::domain::{AnswerPayload, TaskContent, TrueFalsePayload, VariantKind};

use super::{unsupported, EditError, EditorEvent};

pub(super) fn apply_answer(content: &TaskContent, event: &EditorEvent) -> Result<TaskContent, EditError> {
  let kind = content.kind();
  match event {
    EditorEvent::SetAnswer { value } => {
      TaskContent::with_answer(kind, AnswerPayload { answer: value.clone() }).ok_or_else(|| unsupported(kind, event))
    }
    _ => Err(unsupported(kind, event)),
  }
}

/// The toggle always carries a concrete boolean, so a set is a full replacement.
pub(super) fn apply_toggle(event: &EditorEvent) -> Result<TrueFalsePayload, EditError> {
  match event {
    EditorEvent::SetToggle { value } => Ok(TrueFalsePayload { answer: *value }),
    _ => Err(unsupported(VariantKind::TrueFalse, event)),
  }
}
