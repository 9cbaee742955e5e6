//! Draft state for the one task an authoring session is editing.
//!
//! The draft owns exactly one `(kind, payload)` pair. Choosing a kind resets the payload to
//! the registry default (earlier edits are dropped on purpose). Every edit re-emits the full
//! payload as the encoded form `data` string.

use serde_json::Value;
use tracing::debug;

use crate::codec::{self, CodecError};
use crate::composite::Composer;
use crate::config::Limits;
use crate::domain::{TaskContent, VariantKind};
use crate::editors::{self, choice, EditError, EditorEvent, EditorView};
use crate::registry;

#[derive(Clone, Debug)]
enum Body {
  Leaf(TaskContent),
  Composite(Composer),
}

#[derive(Clone, Debug)]
pub struct Draft {
  limits: Limits,
  body: Body,
}

impl Draft {
  /// Fresh draft of `kind` with its default payload.
  pub fn new(kind: VariantKind, limits: Limits) -> Self {
    Self { limits, body: Self::initial_body(kind, limits) }
  }

  /// Re-hydrate stored content for editing. Dangling multiple choice answers are cleared.
  pub fn from_content(mut content: TaskContent, limits: Limits) -> Self {
    if let TaskContent::MultipleChoice(p) = &mut content {
      choice::reconcile(p);
    }
    let body = match Composer::from_content(&content, limits) {
      Some(composer) => Body::Composite(composer),
      None => Body::Leaf(content),
    };
    Self { limits, body }
  }

  fn initial_body(kind: VariantKind, limits: Limits) -> Body {
    match Composer::new(kind, limits) {
      Some(composer) => Body::Composite(composer),
      None => Body::Leaf(registry::default_content(kind)),
    }
  }

  pub fn kind(&self) -> VariantKind {
    match &self.body {
      Body::Leaf(c) => c.kind(),
      Body::Composite(c) => c.kind(),
    }
  }

  /// Switch kind. The previous payload is discarded, not merged.
  pub fn select_kind(&mut self, kind: VariantKind) {
    debug!(target: "task", from = %self.kind(), to = %kind, "Draft kind selected");
    self.body = Self::initial_body(kind, self.limits);
  }

  /// Full current payload.
  pub fn content(&self) -> TaskContent {
    match &self.body {
      Body::Leaf(c) => c.clone(),
      Body::Composite(c) => c.content(),
    }
  }

  /// Encoded `data` field for the current payload.
  pub fn emit(&self) -> Result<String, CodecError> {
    codec::encode(&self.content())
  }

  /// Apply a typed editor event and re-emit.
  pub fn apply(&mut self, event: &EditorEvent) -> Result<String, EditError> {
    match &mut self.body {
      Body::Leaf(c) => {
        let next = editors::apply_leaf(c, event, &self.limits)?;
        codec::validate(&next)?;
        *c = next;
      }
      Body::Composite(c) => c.apply(event)?,
    }
    Ok(self.emit()?)
  }

  /// Shallow-merge `partial` into the current payload (given fields win, omitted fields
  /// stay) and re-emit. A rejected edit leaves the draft unchanged. On a composite, child
  /// ids carry over by position.
  pub fn apply_edit(&mut self, partial: Value) -> Result<String, EditError> {
    let Value::Object(partial) = partial else {
      return Err(EditError::PatchNotObject);
    };
    let kind = self.kind();
    let mut merged = match codec::payload_value(&self.content()) {
      Value::Object(map) => map,
      _ => serde_json::Map::new(),
    };
    merged.extend(partial);

    let mut next = codec::parse_shape(kind, Value::Object(merged))?;
    if let TaskContent::MultipleChoice(p) = &mut next {
      choice::reconcile(p);
    }
    codec::validate(&next)?;
    match &mut self.body {
      Body::Composite(c) => c.replace_children(next.children().unwrap_or_default().to_vec())?,
      Body::Leaf(_) => *self = Self::from_content(next, self.limits),
    }
    Ok(self.emit()?)
  }

  pub fn view(&self) -> EditorView {
    match &self.body {
      Body::Leaf(c) => editors::view(c, &self.limits),
      Body::Composite(c) => c.view(),
    }
  }
}
