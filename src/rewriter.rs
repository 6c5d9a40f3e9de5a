//! # Rewriter Module
//!
//! Applies a [`YearEdit`] to file text. Only the edited byte range changes;
//! every other byte, including line endings and trailing whitespace, is kept.

use crate::engine::YearEdit;
use crate::error::RewriteError;
use crate::locator::CopyrightSpan;

/// Replace the edit's byte range with its replacement text.
///
/// # Errors
///
/// Returns a [`RewriteError`] when the edit range is not inside the span's
/// notice line or does not fall on character boundaries.
pub fn rewrite(text: &str, span: &CopyrightSpan, edit: &YearEdit) -> Result<String, RewriteError> {
  let start = edit.range.start;
  let end = edit.range.end;

  if start > end || start < span.notice.start || end > span.notice.end || end > text.len() {
    return Err(RewriteError::OutsideNotice { start, end });
  }
  if !text.is_char_boundary(start) || !text.is_char_boundary(end) {
    return Err(RewriteError::NotCharBoundary { start, end });
  }

  let mut rewritten = String::with_capacity(text.len() - (end - start) + edit.replacement.len());
  rewritten.push_str(&text[..start]);
  rewritten.push_str(&edit.replacement);
  rewritten.push_str(&text[end..]);
  Ok(rewritten)
}
