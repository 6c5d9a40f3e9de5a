//! # Processor Module
//!
//! This module contains the core functionality for processing files: it runs
//! each file through read, locate, parse, resolve, decide, rewrite and write,
//! and folds the result into a [`FileReport`].
//!
//! The module is organized into several submodules:
//! - [`file_io`] - File reading and atomic writing
//! - [`file_collector`] - Pattern expansion, directory traversal and ignores
//!
//! The [`Processor`] struct is the main entry point, running the per-file
//! [`Pipeline`] over many files in parallel.

mod file_collector;
mod file_io;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
pub use file_collector::{FileCollector, IgnoreSet, normalize_relative_path};
pub use file_io::FileIO;
use futures::stream::{self, StreamExt};
use tracing::{debug, trace, warn};

use crate::dialect::DialectTable;
use crate::diff::DiffManager;
use crate::engine::{UpdateDecision, plan};
use crate::error::UpdateError;
use crate::locator::locate;
use crate::report::{FileOutcome, FileReport, ReviewFlag};
use crate::resolver::ModificationYearResolver;
use crate::rewriter::rewrite;
use crate::verbose_log;
use crate::years::{YearRange, parse_years_from};

/// The result of running the pipeline on a file's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextUpdate {
  pub decision: UpdateDecision,
  pub from: YearRange,
  pub to: YearRange,
  /// The rewritten text, present only when the decision changes the file.
  pub new_text: Option<String>,
  pub flags: Vec<ReviewFlag>,
}

/// Per-file update pipeline.
///
/// Holds everything one file needs: the dialect table, the year resolver, the
/// apply flag and the diff sink. Shared read-only across worker threads.
pub struct Pipeline {
  dialects: DialectTable,
  resolver: ModificationYearResolver,
  apply: bool,
  diff_manager: DiffManager,
}

impl Pipeline {
  /// Create a pipeline.
  ///
  /// # Parameters
  ///
  /// * `dialects` - Extension to comment dialect table
  /// * `resolver` - Source of modification years
  /// * `apply` - Write changes to disk (otherwise dry-run)
  pub fn new(dialects: DialectTable, resolver: ModificationYearResolver, apply: bool) -> Self {
    Self {
      dialects,
      resolver,
      apply,
      diff_manager: DiffManager::default(),
    }
  }

  /// Attach a diff manager for `--show-diff` / `--save-diff`.
  pub fn with_diff_manager(mut self, diff_manager: DiffManager) -> Self {
    self.diff_manager = diff_manager;
    self
  }

  pub const fn apply(&self) -> bool {
    self.apply
  }

  /// Process one file and report what happened. Never fails: errors become
  /// [`FileOutcome::Skipped`] or [`FileOutcome::Failed`].
  pub fn process_file(&self, path: &Path) -> FileReport {
    let mut modification_year = None;
    let result = self.run(path, &mut modification_year);

    let mut report = match result {
      Ok((outcome, flags)) => {
        let mut report = FileReport::new(path, outcome);
        report.flags = flags;
        report
      }
      Err(e) => {
        match &e {
          UpdateError::UnknownExtension { .. } | UpdateError::NotFound => trace!("Skipping {}: {}", path.display(), e),
          _ => warn!("Failed to process {}: {}", path.display(), e),
        }
        FileReport::new(path, FileOutcome::from_error(&e))
      }
    };
    report.modification_year = modification_year;
    report
  }

  fn run(&self, path: &Path, modification_year: &mut Option<i32>) -> Result<(FileOutcome, Vec<ReviewFlag>), UpdateError> {
    let dialect = self.dialects.dialect_for_path(path)?;
    let text = FileIO::read(path)?;

    // Resolve lazily: files without a notice never touch git.
    let update = update_text(&text, dialect, || {
      let year = self.resolver.resolve_year(path)?;
      *modification_year = Some(year);
      Ok(year)
    })?;

    let Some(new_text) = update.new_text else {
      return Ok((FileOutcome::Unchanged { years: update.from }, update.flags));
    };

    if let Err(e) = self.diff_manager.display_diff(path, &text, &new_text) {
      warn!("Failed to render diff for {}: {:#}", path.display(), e);
    }

    if self.apply {
      FileIO::write_atomic(path, &new_text)?;
      verbose_log!("Updated {}: {} -> {}", path.display(), update.from, update.to);
    } else {
      debug!("Would update {}: {} -> {}", path.display(), update.from, update.to);
    }

    Ok((
      FileOutcome::Updated {
        from: update.from,
        to: update.to,
        written: self.apply,
      },
      update.flags,
    ))
  }
}

/// Run locate, parse, decide and rewrite over a file's text.
///
/// `mod_year` is only called once a notice with valid years was found.
pub fn update_text(
  text: &str,
  dialect: &crate::dialect::Dialect,
  mod_year: impl FnOnce() -> Result<i32, UpdateError>,
) -> Result<TextUpdate, UpdateError> {
  let located = locate(text, dialect)?;
  let span = located.span;
  let parsed = parse_years_from(text, span.phrase.end)?;

  // The year run must belong to the notice line.
  if parsed.run.end > span.notice.end {
    return Err(UpdateError::Parse(crate::error::ParseError::NoYear));
  }

  let year = mod_year()?;
  let plan = plan(&parsed, year);

  let mut flags = Vec::new();
  if plan.anomaly {
    flags.push(ReviewFlag::Anomaly {
      modification_year: year,
      start_year: parsed.range.start,
    });
  }
  if located.additional_notices > 0 {
    flags.push(ReviewFlag::MultipleNotices {
      count: located.additional_notices + 1,
    });
  }

  let new_text = match &plan.edit {
    Some(edit) => Some(rewrite(text, &span, edit)?),
    None => None,
  };

  Ok(TextUpdate {
    decision: plan.decision,
    from: parsed.range,
    to: plan.result,
    new_text,
    flags,
  })
}

/// Configuration for creating a Processor instance.
pub struct ProcessorConfig {
  pub pipeline: Pipeline,
  pub workspace_root: PathBuf,
  pub ignore_patterns: Vec<String>,
  pub respect_gitignore: bool,
  /// Stop scheduling files after the first failure.
  pub strict: bool,
  /// Maximum number of files processed at once.
  pub concurrency: usize,
}

impl ProcessorConfig {
  /// Creates a new ProcessorConfig with required fields and sensible defaults.
  ///
  /// Use struct update syntax to override specific fields:
  /// ```ignore
  /// ProcessorConfig {
  ///     strict: true,
  ///     ..ProcessorConfig::new(pipeline, workspace_root)
  /// }
  /// ```
  pub fn new(pipeline: Pipeline, workspace_root: PathBuf) -> Self {
    Self {
      pipeline,
      workspace_root,
      ignore_patterns: Vec::new(),
      respect_gitignore: true,
      strict: false,
      concurrency: num_cpus::get(),
    }
  }
}

/// Result of a batch run.
#[derive(Debug, Default)]
pub struct BatchOutcome {
  /// One report per processed file, sorted by path.
  pub reports: Vec<FileReport>,
  /// Strict mode stopped the run before every file was processed.
  pub aborted: bool,
}

impl BatchOutcome {
  pub fn has_failures(&self) -> bool {
    self.reports.iter().any(|r| r.outcome.is_failed())
  }

  pub fn has_updates(&self) -> bool {
    self.reports.iter().any(|r| r.outcome.is_updated())
  }
}

/// Processor for running the update pipeline over many files.
///
/// The `Processor` is responsible for:
/// - Collecting files from patterns
/// - Processing them concurrently on the blocking thread pool
/// - Stopping early in strict mode
pub struct Processor {
  pipeline: Arc<Pipeline>,
  file_collector: FileCollector,
  strict: bool,
  concurrency: usize,
}

impl Processor {
  /// Creates a new processor with the specified configuration.
  ///
  /// # Errors
  ///
  /// Returns an error if any of the ignore patterns are invalid.
  pub fn new(config: ProcessorConfig) -> Result<Self> {
    let ignore = IgnoreSet::new(&config.ignore_patterns)?;
    let file_collector = FileCollector::new(config.workspace_root, config.respect_gitignore, ignore);

    Ok(Self {
      pipeline: Arc::new(config.pipeline),
      file_collector,
      strict: config.strict,
      concurrency: config.concurrency.max(1),
    })
  }

  /// Expand patterns into the files a run would process.
  pub fn collect_files(&self, patterns: &[String]) -> Result<Vec<PathBuf>> {
    self.file_collector.collect(patterns)
  }

  /// Collect and process every file named by `patterns`.
  pub async fn process(&self, patterns: &[String]) -> Result<BatchOutcome> {
    let files = self.collect_files(patterns)?;
    self.process_files(files).await
  }

  /// Process an already collected list of files.
  ///
  /// Files run in parallel, bounded by the configured concurrency. A failure
  /// on one file is recorded in its report and does not affect the others,
  /// unless strict mode is on, in which case files not yet started are
  /// dropped.
  pub async fn process_files(&self, files: Vec<PathBuf>) -> Result<BatchOutcome> {
    if files.is_empty() {
      debug!("No files to process");
      return Ok(BatchOutcome::default());
    }

    let aborted = Arc::new(AtomicBool::new(false));
    let strict = self.strict;

    let mut results = stream::iter(files)
      .map(|path| {
        let pipeline = Arc::clone(&self.pipeline);
        let aborted = Arc::clone(&aborted);
        tokio::task::spawn_blocking(move || {
          if aborted.load(Ordering::SeqCst) {
            trace!("Not starting {} after strict failure", path.display());
            return None;
          }
          let report = pipeline.process_file(&path);
          if strict && report.outcome.is_failed() {
            aborted.store(true, Ordering::SeqCst);
          }
          Some(report)
        })
      })
      .buffer_unordered(self.concurrency);

    let mut reports = Vec::new();
    while let Some(joined) = results.next().await {
      if let Some(report) = joined.context("File worker panicked")? {
        reports.push(report);
      }
    }

    reports.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(BatchOutcome {
      reports,
      aborted: aborted.load(Ordering::SeqCst),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::dialect::dialect_for;
  use crate::error::ErrorKind;

  fn fixed(year: i32) -> impl FnOnce() -> Result<i32, UpdateError> {
    move || Ok(year)
  }

  #[test]
  fn test_update_text_extends_year() {
    let text = "/* Copyright (c) 2019 Acme */\n";
    let update = update_text(text, dialect_for("c").expect("c"), fixed(2023)).expect("update");
    assert_eq!(update.decision, UpdateDecision::ExtendRange { new_end: 2023 });
    assert_eq!(update.new_text.as_deref(), Some("/* Copyright (c) 2019-2023 Acme */\n"));
  }

  #[test]
  fn test_update_text_skips_resolution_without_notice() {
    let text = "int main() {}\n";
    let err = update_text(text, dialect_for("c").expect("c"), || {
      panic!("resolver must not run for files without a notice")
    })
    .expect_err("no notice");
    assert!(matches!(err, UpdateError::NotFound));
  }

  #[test]
  fn test_update_text_rejects_years_past_notice_line() {
    let text = "// Copyright Acme\n// 2019\n";
    let err = update_text(text, dialect_for("c").expect("c"), fixed(2023)).expect_err("no year on notice line");
    assert_eq!(err.kind(), ErrorKind::Parse);
  }

  #[test]
  fn test_update_text_flags_multiple_notices() {
    let text = "// Copyright 2019 A\nint x;\n// Copyright 2015 B\n";
    let update = update_text(text, dialect_for("c").expect("c"), fixed(2019)).expect("update");
    assert_eq!(update.flags, vec![ReviewFlag::MultipleNotices { count: 2 }]);
    assert!(update.new_text.is_none());
  }

  #[test]
  fn test_update_text_skips_prose_before_notice() {
    let text = "/*\n * Protected by copyright law.\n * Copyright (c) 2019 Acme\n */\n";
    let update = update_text(text, dialect_for("c").expect("c"), fixed(2024)).expect("update");
    assert_eq!(
      update.new_text.as_deref(),
      Some("/*\n * Protected by copyright law.\n * Copyright (c) 2019-2024 Acme\n */\n")
    );
    assert!(update.flags.is_empty());
  }

  #[test]
  fn test_update_text_extends_current_owner_in_transition_block() {
    let text = "/*\n * Copyright (c) 2015 OldCo\n * Copyright (c) 2020 NewCo\n */\n";
    let update = update_text(text, dialect_for("c").expect("c"), fixed(2024)).expect("update");
    assert_eq!(
      update.new_text.as_deref(),
      Some("/*\n * Copyright (c) 2015 OldCo\n * Copyright (c) 2020-2024 NewCo\n */\n")
    );
    assert_eq!(update.from, crate::years::YearRange::single(2020));
    assert_eq!(update.flags, vec![ReviewFlag::MultipleNotices { count: 2 }]);
  }

  #[test]
  fn test_update_text_flags_anomaly() {
    let text = "# Copyright 2020 Acme\n";
    let update = update_text(text, dialect_for("py").expect("py"), fixed(2018)).expect("update");
    assert_eq!(
      update.flags,
      vec![ReviewFlag::Anomaly {
        modification_year: 2018,
        start_year: 2020
      }]
    );
    assert_eq!(update.decision, UpdateDecision::NoChangeNeeded);
  }
}
