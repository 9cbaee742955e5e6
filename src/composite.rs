//! Composite composer for `MULTIPART` / `MULTIENTRY` drafts.
//!
//! Each child owns a full nested [`Draft`]. Children are addressed by a session-local id
//! that is handed out sequentially and never reused, so removing a child leaves its
//! siblings' ids (and payloads) untouched. The persisted form is just the ordered list of
//! `{type, data}` children; ids are not stored.

use serde_json::Value;
use tracing::debug;

use crate::config::Limits;
use crate::domain::{MultiEntryPayload, MultiPartPayload, TaskContent, VariantKind};
use crate::draft::Draft;
use crate::editors::{unsupported, ChildView, EditError, EditorEvent, EditorView};
use crate::registry;

#[derive(Clone, Debug)]
struct Slot {
  id: String,
  draft: Draft,
}

#[derive(Clone, Debug)]
pub struct Composer {
  kind: VariantKind,
  limits: Limits,
  slots: Vec<Slot>,
  next_id: u64,
}

impl Composer {
  /// Empty composer for a composite `kind`; `None` for leaf kinds.
  pub fn new(kind: VariantKind, limits: Limits) -> Option<Self> {
    kind.is_composite().then(|| Self { kind, limits, slots: Vec::new(), next_id: 1 })
  }

  /// Rebuild a composer from stored content. Children get fresh ids `1..=n`.
  pub fn from_content(content: &TaskContent, limits: Limits) -> Option<Self> {
    let mut composer = Self::new(content.kind(), limits)?;
    for child in content.children().unwrap_or_default() {
      let id = composer.take_id();
      composer.slots.push(Slot { id, draft: Draft::from_content(child.clone(), limits) });
    }
    Some(composer)
  }

  pub fn kind(&self) -> VariantKind {
    self.kind
  }

  pub fn len(&self) -> usize {
    self.slots.len()
  }

  pub fn child_ids(&self) -> Vec<String> {
    self.slots.iter().map(|s| s.id.clone()).collect()
  }

  fn take_id(&mut self) -> String {
    let id = self.next_id.to_string();
    self.next_id += 1;
    id
  }

  fn slot_mut(&mut self, id: &str) -> Result<&mut Slot, EditError> {
    self.slots.iter_mut().find(|s| s.id == id).ok_or_else(|| EditError::UnknownChild(id.to_string()))
  }

  /// Append a child of `kind` with its default payload. Returns the new child's id.
  pub fn add_child(&mut self, kind: VariantKind) -> Result<String, EditError> {
    if !registry::spec(kind).addable_as_child {
      return Err(EditError::NotAddable { kind });
    }
    if self.slots.len() >= self.limits.max_children {
      return Err(EditError::LimitReached { what: "children", max: self.limits.max_children });
    }
    let id = self.take_id();
    self.slots.push(Slot { id: id.clone(), draft: Draft::new(kind, self.limits) });
    debug!(target: "task", parent = %self.kind, child = %id, %kind, "Composite child added");
    Ok(id)
  }

  /// Remove a child; later children move up one position.
  pub fn remove_child(&mut self, id: &str) -> Result<TaskContent, EditError> {
    let pos = self.slots.iter().position(|s| s.id == id).ok_or_else(|| EditError::UnknownChild(id.to_string()))?;
    let slot = self.slots.remove(pos);
    debug!(target: "task", parent = %self.kind, child = %id, "Composite child removed");
    Ok(slot.draft.content())
  }

  /// Route an editor event to one child's own draft.
  pub fn update_child(&mut self, id: &str, event: &EditorEvent) -> Result<(), EditError> {
    self.slot_mut(id)?.draft.apply(event).map(|_| ())
  }

  /// Shallow-merge a partial payload into one child.
  pub fn patch_child(&mut self, id: &str, partial: Value) -> Result<(), EditError> {
    self.slot_mut(id)?.draft.apply_edit(partial).map(|_| ())
  }

  /// Swap in a new child list, keeping slot ids by position. Children past the current
  /// count get fresh ids. Nothing changes when the list is refused.
  pub fn replace_children(&mut self, children: Vec<TaskContent>) -> Result<(), EditError> {
    if children.len() > self.limits.max_children {
      return Err(EditError::LimitReached { what: "children", max: self.limits.max_children });
    }
    if let Some(child) = children.iter().find(|c| !registry::spec(c.kind()).addable_as_child) {
      return Err(EditError::NotAddable { kind: child.kind() });
    }
    let mut kept = self.child_ids().into_iter();
    let mut slots = Vec::with_capacity(children.len());
    for child in children {
      let id = match kept.next() {
        Some(id) => id,
        None => self.take_id(),
      };
      slots.push(Slot { id, draft: Draft::from_content(child, self.limits) });
    }
    self.slots = slots;
    debug!(target: "task", parent = %self.kind, children = self.slots.len(), "Composite children replaced");
    Ok(())
  }

  /// Composite-level events. Leaf events must be wrapped in `edit_child`.
  pub fn apply(&mut self, event: &EditorEvent) -> Result<(), EditError> {
    match event {
      EditorEvent::AddChild { kind } => self.add_child(*kind).map(|_| ()),
      EditorEvent::RemoveChild { child } => self.remove_child(child).map(|_| ()),
      EditorEvent::EditChild { child, edit } => self.update_child(child, edit),
      EditorEvent::PatchChild { child, data } => self.patch_child(child, data.clone()),
      _ => Err(unsupported(self.kind, event)),
    }
  }

  /// Children's current payloads, in order.
  pub fn flatten(&self) -> Vec<TaskContent> {
    self.slots.iter().map(|s| s.draft.content()).collect()
  }

  pub fn content(&self) -> TaskContent {
    let children = self.flatten();
    match self.kind {
      VariantKind::MultiEntry => TaskContent::MultiEntry(MultiEntryPayload { entries: children }),
      _ => TaskContent::MultiPart(MultiPartPayload { parts: children }),
    }
  }

  pub fn view(&self) -> EditorView {
    EditorView::Composite {
      kind: self.kind,
      children: self
        .slots
        .iter()
        .map(|s| ChildView {
          id: s.id.clone(),
          kind: s.draft.kind(),
          label: registry::spec(s.draft.kind()).label,
          editor: s.draft.view(),
        })
        .collect(),
      addable: registry::child_kinds(),
      can_add: self.slots.len() < self.limits.max_children,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::*;
  use serde_json::json;

  fn composer(kind: VariantKind) -> Composer {
    Composer::new(kind, Limits::default()).unwrap()
  }

  #[test]
  fn multipart_composition() {
    let mut c = composer(VariantKind::MultiPart);
    c.add_child(VariantKind::TrueFalse).unwrap();
    c.add_child(VariantKind::MultipleChoice).unwrap();
    assert_eq!(
      c.content(),
      TaskContent::MultiPart(MultiPartPayload {
        parts: vec![
          TaskContent::TrueFalse(TrueFalsePayload { answer: true }),
          TaskContent::MultipleChoice(MultipleChoicePayload::default()),
        ],
      })
    );
  }

  #[test]
  fn add_then_remove_leaves_siblings_untouched() {
    let mut c = composer(VariantKind::MultiEntry);
    let tf = c.add_child(VariantKind::TrueFalse).unwrap();
    let mc = c.add_child(VariantKind::MultipleChoice).unwrap();
    c.update_child(&tf, &EditorEvent::SetToggle { value: false }).unwrap();
    c.update_child(&mc, &EditorEvent::SetOptionText { id: "2".into(), text: "Blue".into() }).unwrap();
    let before = crate::codec::encode(&c.content()).unwrap();

    let extra = c.add_child(VariantKind::Cipher).unwrap();
    c.update_child(&extra, &EditorEvent::SetAnswer { value: "zzz".into() }).unwrap();
    c.remove_child(&extra).unwrap();

    assert_eq!(crate::codec::encode(&c.content()).unwrap(), before);
    assert_eq!(c.child_ids(), vec![tf, mc]);
  }

  #[test]
  fn ids_are_not_reused_after_removal() {
    let mut c = composer(VariantKind::MultiPart);
    let a = c.add_child(VariantKind::Text).unwrap();
    let b = c.add_child(VariantKind::Text).unwrap();
    c.remove_child(&a).unwrap();
    let d = c.add_child(VariantKind::Text).unwrap();
    assert_eq!((a.as_str(), b.as_str(), d.as_str()), ("1", "2", "3"));
    assert!(matches!(c.update_child(&a, &EditorEvent::SetAnswer { value: "x".into() }), Err(EditError::UnknownChild(_))));
  }

  #[test]
  fn composites_cannot_be_nested() {
    let mut c = composer(VariantKind::MultiPart);
    assert!(matches!(c.add_child(VariantKind::MultiPart), Err(EditError::NotAddable { .. })));
    assert!(matches!(c.add_child(VariantKind::MultiEntry), Err(EditError::NotAddable { .. })));
    assert_eq!(c.len(), 0);
  }

  #[test]
  fn nested_edits_reach_the_parent_payload() {
    let mut c = composer(VariantKind::MultiPart);
    let mc = c.add_child(VariantKind::MultipleChoice).unwrap();
    c.apply(&EditorEvent::EditChild { child: mc.clone(), edit: Box::new(EditorEvent::SelectAnswer { id: "2".into() }) })
      .unwrap();
    c.apply(&EditorEvent::PatchChild { child: mc, data: json!({"question": [{"id": "2", "option": "B"}]}) }).unwrap();
    assert_eq!(
      crate::codec::payload_value(&c.content()),
      json!({"parts": [{"type": "MULTIPLECHOICE", "data": {"question": [{"id": "2", "option": "B"}], "answer": "2"}}]})
    );
  }

  #[test]
  fn replacing_children_keeps_ids_by_position() {
    let mut c = composer(VariantKind::MultiEntry);
    let a = c.add_child(VariantKind::Text).unwrap();
    let b = c.add_child(VariantKind::Text).unwrap();
    c.remove_child(&a).unwrap();

    c.replace_children(vec![
      TaskContent::Text(AnswerPayload { answer: "x".into() }),
      TaskContent::TrueFalse(TrueFalsePayload { answer: false }),
    ])
    .unwrap();
    assert_eq!(c.child_ids(), vec![b.clone(), "3".to_string()]);

    let nested = vec![registry::default_content(VariantKind::MultiPart)];
    assert!(matches!(c.replace_children(nested), Err(EditError::NotAddable { .. })));
    assert_eq!(c.child_ids(), vec![b, "3".to_string()]);
  }

  #[test]
  fn child_count_is_bounded() {
    let mut c = Composer::new(VariantKind::MultiPart, Limits { max_children: 1, ..Limits::default() }).unwrap();
    c.add_child(VariantKind::Text).unwrap();
    assert!(matches!(c.add_child(VariantKind::Text), Err(EditError::LimitReached { what: "children", .. })));
  }
}
