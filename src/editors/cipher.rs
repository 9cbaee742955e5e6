//! Cipher editor. The shift field is only shown for `SHIFT`; its value survives a switch
//! to another cipher and is simply ignored there.

use crate::domain::{CipherKind, CipherPayload, VariantKind};

use super::{unsupported, EditError, EditorEvent, EditorView};

pub(super) fn apply(p: &CipherPayload, event: &EditorEvent) -> Result<CipherPayload, EditError> {
  let mut next = p.clone();
  match event {
    EditorEvent::SetAnswer { value } => next.answer = value.clone(),
    EditorEvent::SetCipherType { cipher } => next.cipher = *cipher,
    EditorEvent::SetShiftValue { value } => next.shift_value = Some(*value),
    _ => return Err(unsupported(VariantKind::Cipher, event)),
  }
  Ok(next)
}

pub(super) fn view(p: &CipherPayload) -> EditorView {
  let show_shift = p.cipher == CipherKind::Shift;
  EditorView::Cipher {
    cipher: p.cipher,
    answer: p.answer.clone(),
    show_shift,
    shift_value: if show_shift { Some(p.effective_shift()) } else { None },
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn shift_value_is_kept_when_switching_away() {
    let p = CipherPayload::default();
    let p = apply(&p, &EditorEvent::SetCipherType { cipher: CipherKind::Shift }).unwrap();
    let p = apply(&p, &EditorEvent::SetShiftValue { value: 3 }).unwrap();
    assert_eq!(p, CipherPayload { answer: String::new(), cipher: CipherKind::Shift, shift_value: Some(3) });

    let p = apply(&p, &EditorEvent::SetCipherType { cipher: CipherKind::Pigpen }).unwrap();
    assert_eq!(p.shift_value, Some(3));
    assert!(matches!(view(&p), EditorView::Cipher { show_shift: false, shift_value: None, .. }));
  }

  #[test]
  fn missing_shift_renders_as_zero() {
    let p = CipherPayload { cipher: CipherKind::Shift, ..CipherPayload::default() };
    assert!(matches!(view(&p), EditorView::Cipher { show_shift: true, shift_value: Some(0), .. }));
  }
}
