//! Multiple choice editor.
//!
//! Options are addressed by id, never by position. New options take the next sequential
//! id after the highest one in the list. An answer that stops referencing an option is
//! cleared on the spot so it can never reach persistence.

use tracing::warn;

use crate::config::Limits;
use crate::domain::{ChoiceOption, MultipleChoicePayload, VariantKind};

use super::{unsupported, EditError, EditorEvent, EditorView, OptionView};

pub(super) fn apply(
  p: &MultipleChoicePayload,
  event: &EditorEvent,
  limits: &Limits,
) -> Result<MultipleChoicePayload, EditError> {
  let mut next = p.clone();
  match event {
    EditorEvent::AddOption => {
      if next.question.len() >= limits.max_options {
        return Err(EditError::LimitReached { what: "options", max: limits.max_options });
      }
      let id = next_option_id(&next.question);
      next.question.push(ChoiceOption { id, option: String::new() });
    }
    EditorEvent::RemoveOption { id } => {
      if !next.has_option(id) {
        return Err(EditError::UnknownOption(id.clone()));
      }
      if next.question.len() == 1 {
        return Err(EditError::LastOption);
      }
      next.question.retain(|o| &o.id != id);
      reconcile(&mut next);
    }
    EditorEvent::SetOptionText { id, text } => {
      let option = next
        .question
        .iter_mut()
        .find(|o| &o.id == id)
        .ok_or_else(|| EditError::UnknownOption(id.clone()))?;
      option.option = text.clone();
    }
    EditorEvent::SelectAnswer { id } => {
      if !next.has_option(id) {
        return Err(EditError::UnknownOption(id.clone()));
      }
      next.answer = id.clone();
    }
    _ => return Err(unsupported(VariantKind::MultipleChoice, event)),
  }
  Ok(next)
}

/// Next unused sequential id: one past the highest numeric id present, or the smallest
/// free number when that would overflow.
pub fn next_option_id(options: &[ChoiceOption]) -> String {
  let max = options.iter().filter_map(|o| o.id.parse::<u64>().ok()).max().unwrap_or(0);
  match max.checked_add(1) {
    Some(next) => next.to_string(),
    None => (1u64..)
      .map(|n| n.to_string())
      .find(|id| !options.iter().any(|o| &o.id == id))
      .unwrap_or_default(),
  }
}

/// Clear an answer that no longer names a live option. Returns true if it did.
pub fn reconcile(p: &mut MultipleChoicePayload) -> bool {
  if p.answer.is_empty() || p.has_option(&p.answer) {
    return false;
  }
  warn!(target: "task", answer = %p.answer, options = p.question.len(), "Dangling multiple choice answer cleared");
  p.answer.clear();
  true
}

pub(super) fn view(p: &MultipleChoicePayload, limits: &Limits) -> EditorView {
  EditorView::Choice {
    options: p
      .question
      .iter()
      .map(|o| OptionView { id: o.id.clone(), option: o.option.clone(), selected: o.id == p.answer })
      .collect(),
    answer: p.answer.clone(),
    can_add: p.question.len() < limits.max_options,
    can_remove: p.question.len() > 1,
  }
}
