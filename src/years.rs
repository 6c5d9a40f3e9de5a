//! # Years Module
//!
//! Parses the year text of a copyright notice: a single year (`2019`), a range
//! (`2019-2023`, `2019 – 2023`) or a list (`2015, 2017-2019`). Only the
//! contiguous run of years directly after the copyright phrase is considered,
//! so digits in a holder name are never read as years.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use crate::dialect::DEFAULT_PHRASE_PATTERN;
use crate::error::ParseError;

/// Earliest year accepted in a copyright notice.
pub const MIN_YEAR: i32 = 1900;

/// Latest year accepted in a copyright notice.
pub const MAX_YEAR: i32 = 2200;

static DEFAULT_PHRASE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(DEFAULT_PHRASE_PATTERN).expect("default phrase regex must compile"));

static FIRST_YEAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\d{4}\b").expect("year regex must compile"));

/// One item of a year run: `YYYY` or `YYYY-YYYY` (hyphen or en dash).
static YEAR_ITEM: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^(\d{4})\b(?:[ \t]*[-\x{2013}][ \t]*(\d{4})\b)?").expect("year item regex must compile"));

/// A dash after a year item that leads into a word instead of a year, as in
/// `2019-present`.
static OPEN_END: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^(?:[-\x{2013}][ \t]*\p{L}|[ \t]+[-\x{2013}][ \t]*(?i:present|now|today|current|date)\b)")
    .expect("open end regex must compile")
});

/// Separator between items of a year list.
static LIST_SEPARATOR: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^(?:[ \t]*,[ \t]*|[ \t]+)").expect("list separator regex must compile"));

/// An inclusive span of years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub struct YearRange {
  pub start: i32,
  pub end: i32,
}

impl YearRange {
  /// A range covering a single year.
  pub const fn single(year: i32) -> Self {
    Self { start: year, end: year }
  }

  pub const fn contains(&self, year: i32) -> bool {
    self.start <= year && year <= self.end
  }
}

impl std::fmt::Display for YearRange {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    if self.start == self.end {
      write!(f, "{}", self.start)
    } else {
      write!(f, "{}-{}", self.start, self.end)
    }
  }
}

/// How the years were written in the notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearForm {
  /// `2019`
  Single,
  /// `2019-2023`
  Range,
  /// `2015, 2017-2019`
  List,
}

/// The parsed year run of a notice.
///
/// All byte ranges are relative to the text handed to the parser; use
/// [`ParsedYears::offset_by`] to make them absolute within a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedYears {
  pub range: YearRange,
  pub form: YearForm,
  /// Byte range of the whole year run.
  pub run: Range<usize>,
  /// Byte range of every 4-digit token, in order.
  pub tokens: Vec<Range<usize>>,
}

impl ParsedYears {
  /// Shift every byte range by `base`.
  pub fn offset_by(mut self, base: usize) -> Self {
    self.run = self.run.start + base..self.run.end + base;
    for token in &mut self.tokens {
      *token = token.start + base..token.end + base;
    }
    self
  }
}

/// Whether `text` contains a 4-digit token that could start a year run.
pub fn contains_year(text: &str) -> bool {
  FIRST_YEAR.is_match(text)
}

/// Parse the years of a copyright notice.
///
/// Parsing starts after the first copyright phrase in `text`, or at the start
/// of `text` when there is none.
pub fn parse_years(text: &str) -> Result<ParsedYears, ParseError> {
  let from = DEFAULT_PHRASE.find(text).map_or(0, |m| m.end());
  parse_years_from(text, from)
}

/// Parse the year run that begins at the first 4-digit token at or after
/// `from`.
///
/// # Errors
///
/// - [`ParseError::NoYear`] when no 4-digit token follows `from`
/// - [`ParseError::OutOfRange`] when a year lies outside [`MIN_YEAR`]..=[`MAX_YEAR`]
/// - [`ParseError::InvertedRange`] when a range starts after it ends
/// - [`ParseError::OpenRange`] when a year is followed by a dash and a word
pub fn parse_years_from(text: &str, from: usize) -> Result<ParsedYears, ParseError> {
  let first = FIRST_YEAR.find_at(text, from).ok_or(ParseError::NoYear)?;

  let mut pos = first.start();
  let mut tokens = Vec::new();
  let mut items = 0usize;
  let mut item_is_range = false;
  let mut min = i32::MAX;
  let mut max = i32::MIN;

  loop {
    let Some(caps) = YEAR_ITEM.captures(&text[pos..]) else {
      break;
    };
    let whole = caps.get(0).map_or(0..0, |m| m.range());

    let mut item_years = Vec::with_capacity(2);
    for group in [caps.get(1), caps.get(2)].into_iter().flatten() {
      let year = validate_year(group.as_str())?;
      tokens.push(pos + group.start()..pos + group.end());
      item_years.push(year);
    }
    if let &[start, end] = item_years.as_slice()
      && start > end
    {
      return Err(ParseError::InvertedRange { start, end });
    }

    for &year in &item_years {
      min = min.min(year);
      max = max.max(year);
    }
    items += 1;
    item_is_range = item_years.len() == 2;
    pos += whole.end;

    if let Some(&start) = item_years.first()
      && OPEN_END.is_match(&text[pos..])
    {
      return Err(ParseError::OpenRange { start });
    }

    // Continue only when another year item follows the separator.
    let Some(sep) = LIST_SEPARATOR.find(&text[pos..]) else {
      break;
    };
    if !YEAR_ITEM.is_match(&text[pos + sep.end()..]) {
      break;
    }
    pos += sep.end();
  }

  let form = match (items, item_is_range) {
    (1, false) => YearForm::Single,
    (1, true) => YearForm::Range,
    _ => YearForm::List,
  };

  Ok(ParsedYears {
    range: YearRange { start: min, end: max },
    form,
    run: first.start()..pos,
    tokens,
  })
}

fn validate_year(token: &str) -> Result<i32, ParseError> {
  let year: i32 = token.parse().ok().ok_or(ParseError::NoYear)?;
  if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
    return Err(ParseError::OutOfRange {
      year,
      min: MIN_YEAR,
      max: MAX_YEAR,
    });
  }
  Ok(year)
}
