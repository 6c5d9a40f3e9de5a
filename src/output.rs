//! # Output Module
//!
//! This module centralizes all user-facing output for copyright-keeper.
//! It provides consistent formatting, colors, and symbols for terminal output.
//!
//! ## Design Goals
//!
//! - **Informative**: Show actionable information without requiring flags
//! - **Scannable**: Use formatting to make output easy to parse visually
//! - **Progressive**: More detail with `-v`, silence with `-q`
//! - **Scriptable**: Keep stdout predictable for piping/automation

use std::path::Path;

use owo_colors::{OwoColorize, Stream};

use crate::error::ErrorKind;
use crate::logging::{is_quiet, is_verbose};
use crate::report::{FileOutcome, FileReport, ProcessingSummary};

/// Symbols used in output
pub mod symbols {
  /// Success/up to date
  pub const SUCCESS: &str = "\u{2713}"; // ✓
  /// Failure
  pub const FAILURE: &str = "\u{2717}"; // ✗
  /// Needs a look by hand
  pub const FLAGGED: &str = "!";
  /// Year updated
  pub const UPDATED: &str = "\u{21bb}"; // ↻
}

/// Maximum number of files to show in the default output before truncating
const DEFAULT_FILE_LIST_LIMIT: usize = 20;

/// Print the initial "Checking N files..." or "Processing N files..." message.
///
/// - In modify mode: "Processing N files..."
/// - In dry-run mode: "Checking N files..."
pub fn print_start_message(file_count: usize, modify_mode: bool) {
  if is_quiet() {
    return;
  }

  let verb = if modify_mode { "Processing" } else { "Checking" };
  println!("{} {} {}...", verb, file_count, plural(file_count));
}

/// Print a blank line for visual separation (respects quiet mode).
pub fn print_blank_line() {
  if !is_quiet() {
    println!();
  }
}

/// Print the files whose notice would be extended, with the year change.
///
/// In quiet mode only the bare paths are printed, for scripting.
pub fn print_outdated_files(files: &[&FileReport], workspace_root: Option<&Path>, limit: Option<usize>) {
  if files.is_empty() {
    return;
  }

  if is_quiet() {
    for file in files {
      println!("{}", make_relative_path(&file.path, workspace_root));
    }
    return;
  }

  let header = format!(
    "{} {} {} with outdated year:",
    symbols::UPDATED.if_supports_color(Stream::Stdout, |s| s.yellow()),
    files.len(),
    plural(files.len())
  );
  print_file_list(&header, files, workspace_root, limit, year_change);
}

/// Print the files whose notice was rewritten.
pub fn print_updated_files(files: &[&FileReport], workspace_root: Option<&Path>) {
  if is_quiet() || files.is_empty() {
    return;
  }

  let header = format!(
    "{} Updated year in {} {}:",
    symbols::UPDATED.if_supports_color(Stream::Stdout, |s| s.yellow()),
    files.len(),
    plural(files.len())
  );
  print_file_list(&header, files, workspace_root, None, year_change);
}

/// Print each failed file with its error kind.
///
/// Failures go to stderr so they survive `-q` and stay out of piped output.
pub fn print_failed_files(files: &[&FileReport], workspace_root: Option<&Path>) {
  if files.is_empty() {
    return;
  }

  eprintln!(
    "{} {} {} failed:",
    symbols::FAILURE.if_supports_color(Stream::Stderr, |s| s.red()),
    files.len(),
    plural(files.len())
  );
  for file in files {
    if let FileOutcome::Failed { kind, message } = &file.outcome {
      let display_path = make_relative_path(&file.path, workspace_root);
      eprintln!(
        "  {}: {} ({})",
        display_path,
        kind.if_supports_color(Stream::Stderr, |s| s.red()),
        message
      );
    }
  }
}

/// Print files that need a look by hand, with every flag.
pub fn print_flagged_files(files: &[&FileReport], workspace_root: Option<&Path>) {
  if is_quiet() || files.is_empty() {
    return;
  }

  println!(
    "{} {} {} flagged for review:",
    symbols::FLAGGED.if_supports_color(Stream::Stdout, |s| s.magenta()),
    files.len(),
    plural(files.len())
  );
  for file in files {
    let display_path = make_relative_path(&file.path, workspace_root);
    for flag in &file.flags {
      println!("  {}: {}", display_path, flag);
    }
  }
}

/// Print the success message when nothing needs updating.
pub fn print_all_files_ok() {
  if is_quiet() {
    return;
  }

  println!(
    "{} All copyright years are up to date.",
    symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green())
  );
}

/// Print the processing summary.
///
/// Format: "Summary: X updated, Y unchanged, Z skipped, W failed", followed
/// by one line per failure kind. In verbose mode, also shows timing.
pub fn print_summary(summary: &ProcessingSummary, failures: &[(ErrorKind, usize)], modify_mode: bool) {
  if is_quiet() {
    return;
  }

  let updated_label = if modify_mode { "updated" } else { "outdated" };
  let updated_str = summary.updated.if_supports_color(Stream::Stdout, |s| s.yellow());
  let unchanged_str = summary.unchanged.if_supports_color(Stream::Stdout, |s| s.cyan());
  let skipped_str = summary.skipped.if_supports_color(Stream::Stdout, |s| s.dimmed());
  let failed_str = if summary.failed > 0 {
    summary.failed.if_supports_color(Stream::Stdout, |s| s.red()).to_string()
  } else {
    summary.failed.if_supports_color(Stream::Stdout, |s| s.cyan()).to_string()
  };

  let mut summary_line = format!(
    "Summary: {} {}, {} unchanged, {} skipped, {} failed",
    updated_str, updated_label, unchanged_str, skipped_str, failed_str
  );

  if is_verbose() {
    summary_line.push_str(&format!(" ({:.2}s)", summary.processing_time.as_secs_f64()));
  }

  println!("{}", summary_line);

  for (kind, count) in failures {
    println!("  {}: {}", kind, count);
  }
}

/// Print a hint for the user about what to do next.
pub fn print_hint(message: &str) {
  if is_quiet() {
    return;
  }

  println!("{}", message.if_supports_color(Stream::Stdout, |s| s.yellow()));
}

/// Reports grouped by outcome for output.
#[derive(Debug, Default)]
pub struct CategorizedReports<'a> {
  pub updated: Vec<&'a FileReport>,
  pub unchanged: Vec<&'a FileReport>,
  pub skipped: Vec<&'a FileReport>,
  pub failed: Vec<&'a FileReport>,
  /// Reports with at least one review flag, whatever their outcome
  pub flagged: Vec<&'a FileReport>,
}

impl<'a> CategorizedReports<'a> {
  /// Categorize a slice of file reports.
  pub fn from_reports(reports: &'a [FileReport]) -> Self {
    let mut categorized = Self::default();

    for report in reports {
      match &report.outcome {
        FileOutcome::Updated { .. } => categorized.updated.push(report),
        FileOutcome::Unchanged { .. } => categorized.unchanged.push(report),
        FileOutcome::Skipped { .. } => categorized.skipped.push(report),
        FileOutcome::Failed { .. } => categorized.failed.push(report),
      }
      if !report.flags.is_empty() {
        categorized.flagged.push(report);
      }
    }

    categorized
  }
}

fn print_file_list(
  header: &str,
  files: &[&FileReport],
  workspace_root: Option<&Path>,
  limit: Option<usize>,
  detail: fn(&FileReport) -> Option<String>,
) {
  println!("{}", header);

  let count = files.len();
  let show_all = is_verbose();
  let effective_limit = if show_all {
    count
  } else {
    limit.unwrap_or(DEFAULT_FILE_LIST_LIMIT)
  };

  for file in files.iter().take(effective_limit) {
    let display_path = make_relative_path(&file.path, workspace_root);
    match detail(file) {
      Some(detail) => println!("  {}  {}", display_path, detail.if_supports_color(Stream::Stdout, |s| s.dimmed())),
      None => println!("  {}", display_path),
    }
  }

  if !show_all && count > effective_limit {
    println!("  ... and {} more (use -v to see all)", count - effective_limit);
  }
}

fn year_change(report: &FileReport) -> Option<String> {
  match &report.outcome {
    FileOutcome::Updated { from, to, .. } => Some(format!("{} -> {}", from, to)),
    _ => None,
  }
}

const fn plural(count: usize) -> &'static str {
  if count == 1 { "file" } else { "files" }
}

/// Make a path relative to the workspace root for display.
pub fn make_relative_path(path: &Path, workspace_root: Option<&Path>) -> String {
  if let Some(root) = workspace_root {
    path
      .strip_prefix(root)
      .map(|p| p.to_string_lossy().to_string())
      .unwrap_or_else(|_| path.to_string_lossy().to_string())
  } else {
    path.to_string_lossy().to_string()
  }
}
