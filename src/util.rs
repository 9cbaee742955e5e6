//! Small utility helpers used across modules.

/// True when a form field holds nothing but whitespace.
pub fn is_blank(s: &str) -> bool {
  s.trim().is_empty()
}

/// Treat an empty optional form field (e.g. a hidden `id` input) as absent.
pub fn non_empty(s: Option<String>) -> Option<String> {
  s.filter(|v| !is_blank(v))
}

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge request/response payloads.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    return s.to_string();
  }
  let mut end = max;
  while !s.is_char_boundary(end) {
    end -= 1;
  }
  format!("{}… ({} bytes total)", &s[..end], s.len())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn truncation_respects_char_boundaries() {
    assert_eq!(trunc_for_log("abc", 5), "abc");
    assert_eq!(trunc_for_log("héllo", 2), "h… (6 bytes total)");
  }

  #[test]
  fn empty_form_values_are_absent() {
    assert_eq!(non_empty(Some("  ".into())), None);
    assert_eq!(non_empty(Some("t1".into())), Some("t1".into()));
  }
}
