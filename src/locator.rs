//! # Locator Module
//!
//! Finds the copyright notice in a source file. The file is scanned once for
//! comment regions according to its [`CommentDialect`]; only text inside those
//! regions is tested against the dialect's copyright phrase.
//!
//! Contiguous line comments are coalesced into one region, block comments are
//! captured whole. The first region containing the phrase is the copyright
//! block. Within it, a notice line is a phrase line with a year after the
//! phrase; prose that merely mentions copyright is passed over. When the block
//! holds several notice lines, the last one is the current notice. String
//! literals are not stripped, so comment-like tokens inside a string are
//! scanned as comments.

use std::ops::Range;

use crate::dialect::{CommentDialect, Dialect};
use crate::error::UpdateError;
use crate::years::contains_year;

/// The located copyright comment block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyrightSpan {
  /// Byte offset of the start of the comment region.
  pub start: usize,
  /// Byte offset one past the end of the comment region.
  pub end: usize,
  /// The file text in `start..end`.
  pub raw_text: String,
  /// The copyright holder, as written on the notice line.
  pub holder_text: String,
  /// Absolute byte range of the notice line, clipped to the region.
  pub notice: Range<usize>,
  /// Absolute byte range of the phrase match on the notice line.
  pub phrase: Range<usize>,
}

impl CopyrightSpan {
  /// The notice line text.
  pub fn notice_text<'a>(&self, text: &'a str) -> &'a str {
    &text[self.notice.clone()]
  }

  pub const fn len(&self) -> usize {
    self.end - self.start
  }

  pub const fn is_empty(&self) -> bool {
    self.start == self.end
  }
}

/// The notice to update, plus how many other notices were seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedNotice {
  pub span: CopyrightSpan,
  /// Earlier notice lines in the same block plus later comment regions that
  /// also carry a copyright phrase.
  pub additional_notices: usize,
}

/// Locate the copyright notice: the last notice line of the first comment
/// block that contains a copyright phrase.
///
/// A block whose phrase lines all lack a year still yields its first phrase
/// line, so the year parser can report the malformed notice.
///
/// # Errors
///
/// Returns [`UpdateError::NotFound`] when no comment region contains the
/// phrase.
pub fn locate(text: &str, dialect: &Dialect) -> Result<LocatedNotice, UpdateError> {
  let mut blocks = comment_regions(text, dialect.comment())
    .into_iter()
    .map(|region| notices_in_region(text, region, dialect))
    .filter(|notices| !notices.is_empty());

  let mut first = blocks.next().ok_or(UpdateError::NotFound)?;
  let span = first.pop().ok_or(UpdateError::NotFound)?;
  Ok(LocatedNotice {
    span,
    additional_notices: first.len() + blocks.count(),
  })
}

/// Split the text into comment regions, in file order.
pub fn comment_regions(text: &str, comment: &CommentDialect) -> Vec<Range<usize>> {
  let mut regions = Vec::new();
  let block = comment.block();
  let line_token = comment.line_token();
  let mut pos = 0;

  while pos < text.len() {
    if let Some((open, close)) = block
      && text[pos..].starts_with(open)
    {
      let body_start = pos + open.len();
      let end = text[body_start..]
        .find(close)
        .map_or(text.len(), |i| body_start + i + close.len());
      regions.push(pos..end);
      pos = end;
      continue;
    }

    if let Some(token) = line_token
      && starts_line_comment(text, pos, token)
    {
      let mut end = line_content_end(text, pos);
      while let Some(next) = next_line_comment(text, end, token, block.map(|(open, _)| open)) {
        end = line_content_end(text, next);
      }
      regions.push(pos..end);
      pos = end;
      continue;
    }

    pos += text[pos..].chars().next().map_or(1, char::len_utf8);
  }

  regions
}

/// Notice lines of a region, in order. Falls back to the first phrase line
/// when no phrase line carries a year.
fn notices_in_region(text: &str, region: Range<usize>, dialect: &Dialect) -> Vec<CopyrightSpan> {
  let mut notices = Vec::new();
  let mut first_phrase_line = None;
  let mut line_start = region.start;

  while line_start < region.end {
    let line_end = text[line_start..region.end]
      .find('\n')
      .map_or(region.end, |i| line_start + i);
    let line = &text[line_start..line_end];

    if let Some(found) = dialect.phrase().find(line) {
      let span = CopyrightSpan {
        start: region.start,
        end: region.end,
        raw_text: text[region.clone()].to_string(),
        holder_text: holder_from_line(line, found.start(), found.end(), dialect.comment()),
        notice: line_start..line_end,
        phrase: line_start + found.start()..line_start + found.end(),
      };
      if contains_year(&line[found.end()..]) {
        notices.push(span);
      } else if first_phrase_line.is_none() {
        first_phrase_line = Some(span);
      }
    }

    line_start = line_end + 1;
  }

  if notices.is_empty() {
    notices.extend(first_phrase_line);
  }
  notices
}

/// Holder text: what follows the phrase once the year run is dropped, or
/// failing that, what precedes the phrase on the line.
fn holder_from_line(line: &str, phrase_start: usize, phrase_end: usize, comment: &CommentDialect) -> String {
  let mut after = line[phrase_end..].trim_start_matches(|c: char| c.is_ascii_digit() || is_year_separator(c));
  if let Some((_, close)) = comment.block()
    && let Some(idx) = after.find(close)
  {
    after = &after[..idx];
  }
  let after = after.trim();
  if !after.is_empty() {
    return after.to_string();
  }

  let mut before = line[..phrase_start].trim_start();
  if let Some(token) = comment.line_token() {
    before = before.strip_prefix(token).unwrap_or(before);
  }
  if let Some((open, _)) = comment.block() {
    before = before.strip_prefix(open).unwrap_or(before);
  }
  before
    .trim_start_matches(|c: char| c.is_whitespace() || c == '*')
    .trim()
    .to_string()
}

const fn is_year_separator(c: char) -> bool {
  c.is_whitespace() || matches!(c, '-' | '\u{2013}' | ',')
}

fn starts_line_comment(text: &str, pos: usize, token: &str) -> bool {
  if !text[pos..].starts_with(token) {
    return false;
  }

  // Word-like tokens (e.g. `REM`) must stand alone.
  let first_is_word = token.chars().next().is_some_and(char::is_alphanumeric);
  let last_is_word = token.chars().last().is_some_and(char::is_alphanumeric);
  if first_is_word && text[..pos].chars().last().is_some_and(char::is_alphanumeric) {
    return false;
  }
  if last_is_word && text[pos + token.len()..].chars().next().is_some_and(char::is_alphanumeric) {
    return false;
  }
  true
}

/// End of the line starting at or containing `pos`, excluding `\r\n`.
fn line_content_end(text: &str, pos: usize) -> usize {
  let end = text[pos..].find('\n').map_or(text.len(), |i| pos + i);
  if end > pos && text.as_bytes()[end - 1] == b'\r' {
    end - 1
  } else {
    end
  }
}

/// Offset of the line comment token on the line after `end`, if that line is a
/// comment-only line.
fn next_line_comment(text: &str, end: usize, token: &str, block_open: Option<&str>) -> Option<usize> {
  let newline = end + text[end..].find('\n')?;
  let next_line = newline + 1;
  let indent = text[next_line..]
    .find(|c: char| c != ' ' && c != '\t')
    .unwrap_or(text.len() - next_line);
  let candidate = next_line + indent;

  if block_open.is_some_and(|open| text[candidate..].starts_with(open)) {
    return None;
  }
  starts_line_comment(text, candidate, token).then_some(candidate)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::dialect::dialect_for;

  fn c() -> &'static Dialect {
    dialect_for("c").expect("c dialect")
  }

  fn py() -> &'static Dialect {
    dialect_for("py").expect("python dialect")
  }

  #[test]
  fn test_locate_block_comment() {
    let text = "/* Copyright (c) 2019 Acme */\nint main() {}\n";
    let located = locate(text, c()).expect("notice");
    assert_eq!(located.additional_notices, 0);
    let span = located.span;
    assert_eq!(span.start, 0);
    assert_eq!(span.end, 29);
    assert_eq!(span.raw_text, "/* Copyright (c) 2019 Acme */");
    assert_eq!(span.holder_text, "Acme");
    assert_eq!(&text[span.phrase.clone()], "Copyright (c)");
  }

  #[test]
  fn test_locate_coalesces_line_comments() {
    let text = "#!/usr/bin/env python3\n\n# Module header\n# Copyright 2020-2021 Acme\n#\n# Licensed MIT\nimport os\n";
    let span = locate(text, py()).expect("notice").span;
    assert_eq!(span.raw_text, "# Module header\n# Copyright 2020-2021 Acme\n#\n# Licensed MIT");
    assert_eq!(span.notice_text(text), "# Copyright 2020-2021 Acme");
    assert_eq!(span.holder_text, "Acme");
  }

  #[test]
  fn test_indented_line_comments_coalesce() {
    let text = "  // first\n  // Copyright 2018 Acme\nint x;\n";
    let regions = comment_regions(text, c().comment());
    assert_eq!(regions.len(), 1);
    assert_eq!(&text[regions[0].clone()], "// first\n  // Copyright 2018 Acme");
  }

  #[test]
  fn test_blank_line_splits_line_comments() {
    let text = "// one\n\n// two\n";
    let regions = comment_regions(text, c().comment());
    assert_eq!(regions.len(), 2);
  }

  #[test]
  fn test_ignores_copyright_in_code() {
    let text = "int copyright_2019 = 1;\n// nothing here\n";
    let err = locate(text, c()).expect_err("no notice in comments");
    assert!(matches!(err, UpdateError::NotFound));
  }

  #[test]
  fn test_first_matching_region_wins() {
    let text = "// Copyright 2019 First\nint x;\n/* Copyright 2020 Second */\n";
    let located = locate(text, c()).expect("notice");
    assert_eq!(located.span.holder_text, "First");
    assert_eq!(located.additional_notices, 1);
  }

  #[test]
  fn test_notice_inside_multiline_block() {
    let text = "/*\n * Project\n * Copyright (c) 2015-2019 Acme Corp.\n */\n";
    let span = locate(text, c()).expect("notice").span;
    assert_eq!(span.start, 0);
    assert_eq!(span.end, text.len() - 1);
    assert_eq!(span.notice_text(text), " * Copyright (c) 2015-2019 Acme Corp.");
    assert_eq!(span.holder_text, "Acme Corp.");
  }

  #[test]
  fn test_unterminated_block_runs_to_eof() {
    let text = "/* Copyright 2019 Acme\nint x;";
    let span = locate(text, c()).expect("notice").span;
    assert_eq!(span.end, text.len());
  }

  #[test]
  fn test_python_docstring_block() {
    let text = "\"\"\"Tools.\n\nCopyright 2021 Acme\n\"\"\"\nimport os\n";
    let span = locate(text, py()).expect("notice").span;
    assert_eq!(span.start, 0);
    assert_eq!(span.notice_text(text), "Copyright 2021 Acme");
  }

  #[test]
  fn test_block_ends_notice_line() {
    let text = "/* Copyright 2019 Acme */ int year = 2020;\n";
    let span = locate(text, c()).expect("notice").span;
    assert_eq!(span.notice_text(text), "/* Copyright 2019 Acme */");
  }

  #[test]
  fn test_trailing_line_comment() {
    let text = "int x; // Copyright 2019 Acme\n";
    let span = locate(text, c()).expect("notice").span;
    assert_eq!(span.raw_text, "// Copyright 2019 Acme");
  }

  #[test]
  fn test_crlf_line_endings() {
    let text = "// Copyright 2019 Acme\r\n// more\r\ncode\r\n";
    let span = locate(text, c()).expect("notice").span;
    assert_eq!(span.raw_text, "// Copyright 2019 Acme\r\n// more");
  }

  #[test]
  fn test_holder_before_phrase() {
    let text = "// Acme Corp Copyright 2019\n";
    let span = locate(text, c()).expect("notice").span;
    assert_eq!(span.holder_text, "Acme Corp");
  }

  #[test]
  fn test_prose_mention_is_passed_over() {
    let text = "/*\n * Protected by copyright law.\n * Copyright (c) 2019 Acme\n */\n";
    let located = locate(text, c()).expect("notice");
    assert_eq!(located.span.notice_text(text), " * Copyright (c) 2019 Acme");
    assert_eq!(located.additional_notices, 0);
  }

  #[test]
  fn test_phrase_without_year_still_located() {
    let text = "// Copyright Acme\n// 2019\n";
    let located = locate(text, c()).expect("notice");
    assert_eq!(located.span.notice_text(text), "// Copyright Acme");
  }

  #[test]
  fn test_last_notice_line_in_block_wins() {
    let text = "/*\n * Copyright (c) 2015 OldCo\n * Copyright (c) 2020 NewCo\n */\nint x;\n// Copyright 2018 Other\n";
    let located = locate(text, c()).expect("notice");
    assert_eq!(located.span.notice_text(text), " * Copyright (c) 2020 NewCo");
    assert_eq!(located.span.holder_text, "NewCo");
    assert_eq!(located.additional_notices, 2);
  }

  #[test]
  fn test_word_token_requires_boundary() {
    let batch = dialect_for("bat").expect("batch");
    let text = "REMOVE copyright 2019\nREM Copyright 2020 Acme\n";
    let span = locate(text, batch).expect("notice").span;
    assert_eq!(span.raw_text, "REM Copyright 2020 Acme");
  }
}
