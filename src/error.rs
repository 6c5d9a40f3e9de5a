//! # Error Module
//!
//! Typed errors produced by the per-file pipeline. Every variant is recovered
//! at the file boundary and turned into a [`FileOutcome`](crate::report::FileOutcome),
//! so a failure on one file never stops the rest of the batch.

use std::path::PathBuf;

use serde::Serialize;

/// The error kinds a single file's pipeline can produce.
#[derive(Debug, thiserror::Error)]
pub enum UpdateError {
  /// No comment dialect is registered for the file's extension.
  #[error("no comment dialect registered for extension '{extension}'")]
  UnknownExtension { extension: String },

  /// No comment region in the file contains a copyright phrase.
  #[error("no copyright notice found in any comment")]
  NotFound,

  /// The copyright notice was found but its year text is malformed.
  #[error(transparent)]
  Parse(#[from] ParseError),

  /// Neither version control nor the filesystem could provide a year.
  #[error("cannot determine modification year for {}: {reason}", path.display())]
  Resolution { path: PathBuf, reason: String },

  /// Reading or writing the file failed.
  #[error("I/O error on {}: {source}", path.display())]
  Io { path: PathBuf, source: std::io::Error },

  /// The computed edit does not line up with the located notice.
  #[error(transparent)]
  Rewrite(#[from] RewriteError),
}

impl UpdateError {
  /// Short, stable name of the error kind for summaries and reports.
  pub const fn kind(&self) -> ErrorKind {
    match self {
      Self::UnknownExtension { .. } => ErrorKind::UnknownExtension,
      Self::NotFound => ErrorKind::NotFound,
      Self::Parse(_) => ErrorKind::Parse,
      Self::Resolution { .. } => ErrorKind::Resolution,
      Self::Io { .. } => ErrorKind::Io,
      Self::Rewrite(_) => ErrorKind::Rewrite,
    }
  }

  pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
    Self::Io {
      path: path.into(),
      source,
    }
  }
}

/// Discriminant of [`UpdateError`], used where the error itself cannot be
/// cloned or serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
  UnknownExtension,
  NotFound,
  Parse,
  Resolution,
  Io,
  Rewrite,
}

impl std::fmt::Display for ErrorKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let name = match self {
      Self::UnknownExtension => "UnknownExtension",
      Self::NotFound => "NotFound",
      Self::Parse => "ParseError",
      Self::Resolution => "ResolutionError",
      Self::Io => "IOError",
      Self::Rewrite => "RewriteError",
    };
    f.write_str(name)
  }
}

/// Malformed year text inside a copyright notice.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
  #[error("no 4-digit year found in copyright notice")]
  NoYear,

  #[error("year {year} is outside the accepted range {min}-{max}")]
  OutOfRange { year: i32, min: i32, max: i32 },

  #[error("year range {start}-{end} starts after it ends")]
  InvertedRange { start: i32, end: i32 },

  #[error("open-ended year range starting {start} cannot be extended")]
  OpenRange { start: i32 },
}

/// The year edit does not fall inside the located copyright notice.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RewriteError {
  #[error("edit range {start}..{end} lies outside the copyright notice")]
  OutsideNotice { start: usize, end: usize },

  #[error("edit range {start}..{end} is not on a character boundary")]
  NotCharBoundary { start: usize, end: usize },
}
