//! # Engine Module
//!
//! Decides whether a copyright notice needs a new end year, and turns that
//! decision into a byte-level [`YearEdit`] on the notice's year text.
//!
//! The start year is never changed by an extension and no year is ever
//! decreased. A modification year that predates the notice is left alone and
//! reported as an anomaly for manual review.

use std::ops::Range;

use serde::Serialize;

use crate::years::{ParsedYears, YearForm, YearRange};

/// What to do with a notice's years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum UpdateDecision {
  /// The notice already covers the modification year.
  NoChangeNeeded,
  /// Keep the start year and move the end year forward.
  ExtendRange { new_end: i32 },
  /// Replace the written years with a fresh `start-end` range.
  CreateRange { start: i32, end: i32 },
}

/// A replacement of the year text within a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearEdit {
  /// Byte range of the text to replace.
  pub range: Range<usize>,
  pub replacement: String,
}

/// The decision for one notice together with the edit that realizes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
  pub decision: UpdateDecision,
  /// `None` when no change is needed.
  pub edit: Option<YearEdit>,
  /// The modification year predates the notice's start year.
  pub anomaly: bool,
  /// The years the notice will state after the edit.
  pub result: YearRange,
}

/// Decide how the existing years relate to the modification year.
///
/// # Parameters
///
/// * `existing` - The years currently stated in the notice
/// * `mod_year` - The year the file was last modified
///
/// # Returns
///
/// [`UpdateDecision::ExtendRange`] only when `mod_year` is later than the end
/// year; otherwise [`UpdateDecision::NoChangeNeeded`].
pub const fn decide(existing: YearRange, mod_year: i32) -> UpdateDecision {
  if mod_year > existing.end {
    UpdateDecision::ExtendRange { new_end: mod_year }
  } else {
    UpdateDecision::NoChangeNeeded
  }
}

/// Whether a modification year predates the notice.
pub const fn is_anomaly(existing: YearRange, mod_year: i32) -> bool {
  mod_year < existing.start
}

/// Plan the year edit for a parsed notice.
///
/// Single years become a range, ranges get a new end token, and lists are
/// collapsed into one `min-mod_year` range.
pub fn plan(parsed: &ParsedYears, mod_year: i32) -> Plan {
  let existing = parsed.range;
  let anomaly = is_anomaly(existing, mod_year);

  let UpdateDecision::ExtendRange { new_end } = decide(existing, mod_year) else {
    return Plan {
      decision: UpdateDecision::NoChangeNeeded,
      edit: None,
      anomaly,
      result: existing,
    };
  };

  let result = YearRange {
    start: existing.start,
    end: new_end,
  };

  let (decision, edit) = match parsed.form {
    YearForm::Single => (
      UpdateDecision::ExtendRange { new_end },
      YearEdit {
        range: parsed.run.clone(),
        replacement: result.to_string(),
      },
    ),
    YearForm::Range => {
      let end_token = parsed.tokens.last().cloned().unwrap_or_else(|| parsed.run.clone());
      (
        UpdateDecision::ExtendRange { new_end },
        YearEdit {
          range: end_token,
          replacement: new_end.to_string(),
        },
      )
    }
    YearForm::List => (
      UpdateDecision::CreateRange {
        start: result.start,
        end: result.end,
      },
      YearEdit {
        range: parsed.run.clone(),
        replacement: result.to_string(),
      },
    ),
  };

  Plan {
    decision,
    edit: Some(edit),
    anomaly,
    result,
  }
}
