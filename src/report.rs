//! # Report Module
//!
//! This module provides functionality for recording the outcome of each file
//! and generating reports of a run in various formats (JSON, CSV).
//!
//! Every processed file produces exactly one [`FileReport`]. Errors from the
//! per-file pipeline are folded into the report's [`FileOutcome`] so one bad
//! file never hides the results of the rest.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;
use serde::Serialize;

use crate::error::{ErrorKind, UpdateError};
use crate::years::YearRange;

/// What happened to a single file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
  /// The notice's years were extended (or would be, in dry-run mode).
  Updated {
    from: YearRange,
    to: YearRange,
    /// Whether the new text was written to disk.
    written: bool,
  },
  /// The notice already covers the modification year.
  Unchanged { years: YearRange },
  /// The file is outside the tool's remit.
  Skipped { reason: SkipReason },
  /// The pipeline failed for this file.
  Failed { kind: ErrorKind, message: String },
}

/// Why a file was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
  UnknownExtension { extension: String },
  NotFound,
}

impl std::fmt::Display for SkipReason {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::UnknownExtension { extension } if extension.is_empty() => write!(f, "no file extension"),
      Self::UnknownExtension { extension } => write!(f, "no comment dialect for .{extension}"),
      Self::NotFound => write!(f, "no copyright notice"),
    }
  }
}

impl FileOutcome {
  /// Fold a pipeline error into an outcome.
  ///
  /// Unknown extensions and files without a notice are skips; every other
  /// error is a failure.
  pub fn from_error(error: &UpdateError) -> Self {
    match error {
      UpdateError::UnknownExtension { extension } => Self::Skipped {
        reason: SkipReason::UnknownExtension {
          extension: extension.clone(),
        },
      },
      UpdateError::NotFound => Self::Skipped {
        reason: SkipReason::NotFound,
      },
      other => Self::Failed {
        kind: other.kind(),
        message: other.to_string(),
      },
    }
  }

  pub const fn is_updated(&self) -> bool {
    matches!(self, Self::Updated { .. })
  }

  pub const fn is_failed(&self) -> bool {
    matches!(self, Self::Failed { .. })
  }

  /// Short label used in CSV output.
  pub const fn label(&self) -> &'static str {
    match self {
      Self::Updated { written: true, .. } => "updated",
      Self::Updated { written: false, .. } => "outdated",
      Self::Unchanged { .. } => "unchanged",
      Self::Skipped { .. } => "skipped",
      Self::Failed { .. } => "failed",
    }
  }
}

/// A reason to look at a file by hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "flag", rename_all = "snake_case")]
pub enum ReviewFlag {
  /// The file was modified before the notice's start year.
  Anomaly { modification_year: i32, start_year: i32 },
  /// The file carries more than one copyright notice, either several notice
  /// lines in the copyright block or notices in later comment blocks. Only one
  /// was considered.
  MultipleNotices { count: usize },
}

impl std::fmt::Display for ReviewFlag {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Anomaly {
        modification_year,
        start_year,
      } => write!(
        f,
        "modified in {modification_year}, before the notice's start year {start_year}"
      ),
      Self::MultipleNotices { count } => write!(f, "{count} copyright notices, only one was checked"),
    }
  }
}

/// Information about a processed file for reporting
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
  /// Path to the file
  #[serde(serialize_with = "serialize_path")]
  pub path: PathBuf,
  #[serde(flatten)]
  pub outcome: FileOutcome,
  /// Year the file was last modified, when it was resolved.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub modification_year: Option<i32>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub flags: Vec<ReviewFlag>,
}

impl FileReport {
  pub fn new(path: impl Into<PathBuf>, outcome: FileOutcome) -> Self {
    Self {
      path: path.into(),
      outcome,
      modification_year: None,
      flags: Vec::new(),
    }
  }
}

fn serialize_path<S>(path: &Path, serializer: S) -> Result<S::Ok, S::Error>
where
  S: serde::Serializer,
{
  serializer.serialize_str(&path.to_string_lossy())
}

/// Supported report formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
  /// JSON format for machine readability
  Json,
  /// CSV format for spreadsheet compatibility
  Csv,
}

impl std::fmt::Display for ReportFormat {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Json => write!(f, "JSON"),
      Self::Csv => write!(f, "CSV"),
    }
  }
}

/// Report Generator for writing run reports
pub struct ReportGenerator<'a> {
  format: ReportFormat,
  output_path: &'a Path,
}

impl<'a> ReportGenerator<'a> {
  /// Create a new report generator
  ///
  /// # Parameters
  ///
  /// * `format` - The format to use for the report
  /// * `output_path` - The path where the report will be saved
  pub const fn new(format: ReportFormat, output_path: &'a Path) -> Self {
    Self { format, output_path }
  }

  /// Generate a report from a collection of file reports
  ///
  /// # Returns
  ///
  /// `Ok(())` if the report was generated successfully, or an error if the
  /// report couldn't be rendered or written to disk.
  pub fn generate(&self, files: &[FileReport], summary: &ProcessingSummary) -> Result<()> {
    let content = self.render(files, summary)?;
    fs::write(self.output_path, content)
      .with_context(|| format!("Failed to write {} report to {}", self.format, self.output_path.display()))
  }

  /// Render the report content without writing it.
  pub fn render(&self, files: &[FileReport], summary: &ProcessingSummary) -> Result<String> {
    match self.format {
      ReportFormat::Json => generate_json(files, summary),
      ReportFormat::Csv => Ok(generate_csv(files, summary)),
    }
  }
}

fn generate_json(files: &[FileReport], summary: &ProcessingSummary) -> Result<String> {
  let report = serde_json::json!({
    "summary": summary,
    "files": files,
  });
  serde_json::to_string_pretty(&report).context("Failed to serialize JSON report")
}

fn generate_csv(files: &[FileReport], summary: &ProcessingSummary) -> String {
  let mut csv = String::from("file_path,status,from,to,modification_year,notes\n");

  for file in files {
    let (from, to, note) = match &file.outcome {
      FileOutcome::Updated { from, to, .. } => (from.to_string(), to.to_string(), String::new()),
      FileOutcome::Unchanged { years } => (years.to_string(), years.to_string(), String::new()),
      FileOutcome::Skipped { reason } => (String::new(), String::new(), reason.to_string()),
      FileOutcome::Failed { kind, message } => (String::new(), String::new(), format!("{kind}: {message}")),
    };

    let mut notes: Vec<String> = Vec::new();
    if !note.is_empty() {
      notes.push(note);
    }
    notes.extend(file.flags.iter().map(ToString::to_string));

    let row = [
      csv_field(&file.path.to_string_lossy()),
      file.outcome.label().to_string(),
      from,
      to,
      file.modification_year.map(|y| y.to_string()).unwrap_or_default(),
      csv_field(&notes.join("; ")),
    ];
    csv.push_str(&row.join(","));
    csv.push('\n');
  }

  csv.push_str("\n# Summary\n");
  csv.push_str(&format!("Total files,{}\n", summary.total_files));
  csv.push_str(&format!("Updated,{}\n", summary.updated));
  csv.push_str(&format!("Written,{}\n", summary.written));
  csv.push_str(&format!("Unchanged,{}\n", summary.unchanged));
  csv.push_str(&format!("Skipped,{}\n", summary.skipped));
  csv.push_str(&format!("Failed,{}\n", summary.failed));
  csv.push_str(&format!("Flagged for review,{}\n", summary.flagged));
  csv.push_str(&format!("Processing time (seconds),{:.2}\n", summary.processing_time_secs));
  csv.push_str(&format!("Generated on,{}\n", Local::now().format("%Y-%m-%d %H:%M:%S")));

  csv
}

/// Quote a CSV field when it contains a separator, quote or newline.
fn csv_field(value: &str) -> String {
  if value.contains([',', '"', '\n', '\r']) {
    format!("\"{}\"", value.replace('"', "\"\""))
  } else {
    value.to_string()
  }
}

/// Summary of the processing results
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProcessingSummary {
  pub total_files: usize,
  /// Files whose notice needed a new end year
  pub updated: usize,
  /// Updated files whose new text was written
  pub written: usize,
  pub unchanged: usize,
  pub skipped: usize,
  pub failed: usize,
  /// Files carrying at least one review flag
  pub flagged: usize,
  #[serde(skip_serializing)]
  pub processing_time: Duration,
  #[serde(rename = "processing_time_seconds")]
  pub processing_time_secs: f64,
}

impl ProcessingSummary {
  /// Create a ProcessingSummary from a collection of FileReports
  pub fn from_reports(files: &[FileReport], processing_time: Duration) -> Self {
    let mut summary = Self {
      total_files: files.len(),
      processing_time,
      processing_time_secs: processing_time.as_secs_f64(),
      ..Self::default()
    };

    for file in files {
      match &file.outcome {
        FileOutcome::Updated { written, .. } => {
          summary.updated += 1;
          if *written {
            summary.written += 1;
          }
        }
        FileOutcome::Unchanged { .. } => summary.unchanged += 1,
        FileOutcome::Skipped { .. } => summary.skipped += 1,
        FileOutcome::Failed { .. } => summary.failed += 1,
      }
      if !file.flags.is_empty() {
        summary.flagged += 1;
      }
    }

    summary
  }

  /// Failure counts grouped by error kind, in a stable order.
  pub fn failures_by_kind(files: &[FileReport]) -> Vec<(ErrorKind, usize)> {
    let mut counts: Vec<(ErrorKind, usize)> = Vec::new();
    for file in files {
      if let FileOutcome::Failed { kind, .. } = &file.outcome {
        match counts.iter_mut().find(|(k, _)| k == kind) {
          Some((_, n)) => *n += 1,
          None => counts.push((*kind, 1)),
        }
      }
    }
    counts.sort_by_key(|(kind, _)| kind.to_string());
    counts
  }
}
