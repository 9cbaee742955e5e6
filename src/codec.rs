//! Encoding of task payloads for the form `data` field and decoding back into typed content.
//!
//! The transport encoding is compact JSON of the payload only; the kind travels in a
//! separate `type` field. Struct field order is fixed, so encoding is deterministic.
//! Persistence stores the decoded `serde_json::Value` directly (see [`decode_value`]).

use std::collections::HashSet;

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::domain::{TaskContent, UnknownKind, VariantKind};

#[derive(Debug, Error)]
pub enum CodecError {
  #[error(transparent)]
  UnknownKind(#[from] UnknownKind),

  #[error("payload is not valid JSON: {0}")]
  Malformed(#[source] serde_json::Error),

  #[error("payload does not match the {kind} shape: {source}")]
  ShapeMismatch {
    kind: VariantKind,
    #[source]
    source: serde_json::Error,
  },

  #[error("{parent} child #{index} is itself a composite ({child})")]
  NestedComposite { parent: VariantKind, index: usize, child: VariantKind },

  #[error("answer {answer:?} does not reference any option")]
  DanglingAnswer { answer: String },

  #[error("option id {id:?} is used more than once")]
  DuplicateOptionId { id: String },
}

/// Encode the payload of `content` as the form `data` string.
pub fn encode(content: &TaskContent) -> Result<String, CodecError> {
  validate(content)?;
  let encoded = match content {
    TaskContent::Text(p)
    | TaskContent::FillInTheBlank(p)
    | TaskContent::ImageUpload(p)
    | TaskContent::VideoUpload(p)
    | TaskContent::FileUpload(p) => serde_json::to_string(p),
    TaskContent::MultipleChoice(p) => serde_json::to_string(p),
    TaskContent::TrueFalse(p) => serde_json::to_string(p),
    TaskContent::Cipher(p) => serde_json::to_string(p),
    TaskContent::MultiPart(p) => serde_json::to_string(p),
    TaskContent::MultiEntry(p) => serde_json::to_string(p),
  };
  encoded.map_err(CodecError::Malformed)
}

/// Decode a form `data` string into content of `kind`.
pub fn decode(kind: VariantKind, data: &str) -> Result<TaskContent, CodecError> {
  let value: Value = serde_json::from_str(data).map_err(CodecError::Malformed)?;
  decode_value(kind, value)
}

/// Decode an already-parsed payload (the persistence path, no string round trip).
pub fn decode_value(kind: VariantKind, value: Value) -> Result<TaskContent, CodecError> {
  let content = parse_shape(kind, value)?;
  validate(&content)?;
  Ok(content)
}

/// Shape-only decoding; callers run [`validate`] once they have repaired what they can.
pub fn parse_shape(kind: VariantKind, value: Value) -> Result<TaskContent, CodecError> {
  Ok(match kind {
    VariantKind::Text => TaskContent::Text(shape(kind, value)?),
    VariantKind::MultipleChoice => TaskContent::MultipleChoice(shape(kind, value)?),
    VariantKind::TrueFalse => TaskContent::TrueFalse(shape(kind, value)?),
    VariantKind::FillInTheBlank => TaskContent::FillInTheBlank(shape(kind, value)?),
    VariantKind::ImageUpload => TaskContent::ImageUpload(shape(kind, value)?),
    VariantKind::VideoUpload => TaskContent::VideoUpload(shape(kind, value)?),
    VariantKind::FileUpload => TaskContent::FileUpload(shape(kind, value)?),
    VariantKind::Cipher => TaskContent::Cipher(shape(kind, value)?),
    VariantKind::MultiPart => TaskContent::MultiPart(shape(kind, value)?),
    VariantKind::MultiEntry => TaskContent::MultiEntry(shape(kind, value)?),
  })
}

/// Decode with the kind given as its raw discriminator string.
pub fn decode_raw(kind: &str, value: Value) -> Result<TaskContent, CodecError> {
  decode_value(kind.parse()?, value)
}

/// Payload of `content` as a JSON value (no kind tag).
pub fn payload_value(content: &TaskContent) -> Value {
  match serde_json::to_value(content) {
    Ok(Value::Object(mut map)) => map.remove("data").unwrap_or(Value::Null),
    _ => Value::Null,
  }
}

fn shape<T: DeserializeOwned>(kind: VariantKind, value: Value) -> Result<T, CodecError> {
  serde_json::from_value(value).map_err(|source| CodecError::ShapeMismatch { kind, source })
}

/// Structural checks serde cannot express: nesting depth and option references.
pub fn validate(content: &TaskContent) -> Result<(), CodecError> {
  if let Some(children) = content.children() {
    for (index, child) in children.iter().enumerate() {
      if child.kind().is_composite() {
        return Err(CodecError::NestedComposite { parent: content.kind(), index, child: child.kind() });
      }
      validate(child)?;
    }
  }
  if let TaskContent::MultipleChoice(mc) = content {
    let mut seen = HashSet::new();
    for o in &mc.question {
      if !seen.insert(o.id.as_str()) {
        return Err(CodecError::DuplicateOptionId { id: o.id.clone() });
      }
    }
    if !mc.answer.is_empty() && !mc.has_option(&mc.answer) {
      return Err(CodecError::DanglingAnswer { answer: mc.answer.clone() });
    }
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::*;
  use crate::registry;
  use serde_json::json;

  fn samples() -> Vec<TaskContent> {
    let choice = TaskContent::MultipleChoice(MultipleChoicePayload {
      question: vec![
        ChoiceOption { id: "3".into(), option: "C".into() },
        ChoiceOption { id: "1".into(), option: "A".into() },
      ],
      answer: "1".into(),
    });
    let shift = TaskContent::Cipher(CipherPayload { answer: "khoor".into(), cipher: CipherKind::Shift, shift_value: Some(3) });
    vec![
      TaskContent::Text(AnswerPayload { answer: "Paris".into() }),
      choice.clone(),
      TaskContent::TrueFalse(TrueFalsePayload { answer: false }),
      TaskContent::FillInTheBlank(AnswerPayload { answer: "mitochondria".into() }),
      TaskContent::ImageUpload(AnswerPayload { answer: "a red door".into() }),
      TaskContent::VideoUpload(AnswerPayload { answer: "a cartwheel".into() }),
      TaskContent::FileUpload(AnswerPayload { answer: "report.pdf".into() }),
      TaskContent::Cipher(CipherPayload { answer: "hello".into(), cipher: CipherKind::Pigpen, shift_value: Some(5) }),
      TaskContent::MultiPart(MultiPartPayload { parts: vec![choice, shift] }),
      TaskContent::MultiEntry(MultiEntryPayload {
        entries: vec![
          TaskContent::VideoUpload(AnswerPayload { answer: "dance".into() }),
          TaskContent::TrueFalse(TrueFalsePayload { answer: true }),
        ],
      }),
    ]
  }

  #[test]
  fn samples_cover_every_kind() {
    let kinds: Vec<VariantKind> = samples().iter().map(TaskContent::kind).collect();
    assert_eq!(kinds, VariantKind::ALL.to_vec());
    for c in samples() {
      assert_ne!(c, registry::default_content(c.kind()), "{} sample is the default", c.kind());
    }
  }

  #[test]
  fn decode_inverts_encode() {
    for c in samples() {
      let s = encode(&c).unwrap();
      assert_eq!(decode(c.kind(), &s).unwrap(), c, "round trip of {}", c.kind());
      assert_eq!(encode(&c).unwrap(), s, "encoding of {} is not deterministic", c.kind());
    }
  }

  #[test]
  fn every_default_payload_survives_the_codec() {
    for kind in VariantKind::ALL {
      let c = registry::default_content(kind);
      let s = encode(&c).unwrap();
      let back = decode(kind, &s).unwrap();
      assert_eq!(encode(&back).unwrap(), s);
    }
  }

  #[test]
  fn cipher_shift_stays_numeric() {
    let s = r#"{"answer":"","type":"SHIFT","shiftValue":3}"#;
    let c = decode(VariantKind::Cipher, s).unwrap();
    assert_eq!(payload_value(&c), json!({"answer": "", "type": "SHIFT", "shiftValue": 3}));
    assert_eq!(encode(&c).unwrap(), s);

    let err = decode(VariantKind::Cipher, r#"{"answer":"","type":"SHIFT","shiftValue":"3"}"#).unwrap_err();
    assert!(matches!(err, CodecError::ShapeMismatch { kind: VariantKind::Cipher, .. }));
  }

  #[test]
  fn rejects_payload_of_another_kind() {
    let mc = r#"{"question":[{"id":"1","option":"A"}],"answer":"1"}"#;
    assert!(matches!(decode(VariantKind::Text, mc), Err(CodecError::ShapeMismatch { .. })));
    assert!(matches!(decode(VariantKind::TrueFalse, r#"{"answer":"yes"}"#), Err(CodecError::ShapeMismatch { .. })));
    assert!(matches!(decode(VariantKind::TrueFalse, "{}"), Err(CodecError::ShapeMismatch { .. })));
    assert!(matches!(decode(VariantKind::Text, "not json"), Err(CodecError::Malformed(_))));
  }

  #[test]
  fn rejects_nested_composites() {
    let nested = json!({"parts": [{"type": "MULTIENTRY", "data": {"entries": []}}]});
    let err = decode_value(VariantKind::MultiPart, nested).unwrap_err();
    assert!(matches!(err, CodecError::NestedComposite { index: 0, child: VariantKind::MultiEntry, .. }));

    let c = TaskContent::MultiPart(MultiPartPayload { parts: vec![registry::default_content(VariantKind::MultiPart)] });
    assert!(encode(&c).is_err());
  }

  #[test]
  fn rejects_dangling_and_duplicate_option_ids() {
    let dangling = json!({"question": [{"id": "2", "option": "B"}], "answer": "1"});
    assert!(matches!(decode_value(VariantKind::MultipleChoice, dangling), Err(CodecError::DanglingAnswer { .. })));

    let dup = json!({"question": [{"id": "1", "option": "A"}, {"id": "1", "option": "B"}], "answer": ""});
    assert!(matches!(decode_value(VariantKind::MultipleChoice, dup), Err(CodecError::DuplicateOptionId { .. })));
  }

  #[test]
  fn unknown_discriminator_is_reported() {
    let err = decode_raw("ESSAY", json!({"answer": ""})).unwrap_err();
    assert!(matches!(err, CodecError::UnknownKind(_)));
  }
}
