//! # Update Command
//!
//! This module implements the update command for copyright years.
//! This is the default command when no subcommand is specified.

use std::path::PathBuf;
use std::process;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;
use copyright_keeper::config::load_config;
use copyright_keeper::dialect::DialectTable;
use copyright_keeper::diff::DiffManager;
use copyright_keeper::info_log;
use copyright_keeper::logging::{ColorMode, init_tracing, set_quiet, set_verbose};
use copyright_keeper::output::{
  CategorizedReports, print_all_files_ok, print_blank_line, print_failed_files, print_flagged_files, print_hint,
  print_outdated_files, print_start_message, print_summary, print_updated_files,
};
use copyright_keeper::processor::{Pipeline, Processor, ProcessorConfig};
use copyright_keeper::report::{FileReport, ProcessingSummary, ReportFormat, ReportGenerator};
use copyright_keeper::resolver::ModificationYearResolver;
use copyright_keeper::workspace::resolve_workspace;
use copyright_keeper::years::{MAX_YEAR, MIN_YEAR};
use tracing::debug;

/// Arguments for the update command
#[derive(Args, Debug, Default)]
pub struct UpdateArgs {
  /// File or directory patterns to process. Directories are processed
  /// recursively.
  #[arg(required = false)]
  pub patterns: Vec<String>,

  /// Path to config file (default: .copyright-keeper.toml in workspace root)
  #[arg(long, value_name = "FILE")]
  pub config: Option<PathBuf>,

  /// Ignore config file even if present
  #[arg(long)]
  pub no_config: bool,

  /// Dry run mode: only report outdated years without modifying files
  /// (default)
  #[arg(long, group = "mode", hide = true)]
  pub dry_run: bool,

  /// Modify mode: rewrite outdated copyright years in place
  #[arg(
    long,
    group = "mode",
    help = "Modify mode: rewrite outdated copyright years in place

[default: --dry-run]"
  )]
  pub modify: bool,

  /// Show diff of changes
  #[arg(long)]
  pub show_diff: bool,

  /// Save diff of changes to a file
  #[arg(long, short = 'o', value_name = "FILE")]
  pub save_diff: Option<PathBuf>,

  /// Use this year as every file's modification year instead of asking git
  /// or the filesystem
  #[arg(long, value_parser = clap::value_parser!(i32).range(i64::from(MIN_YEAR)..=i64::from(MAX_YEAR)))]
  pub year: Option<i32>,

  /// Line comment token for an extension (repeatable, format: EXT=TOKEN)
  /// Example: --dialect "lua=--" --dialect "sql=--"
  #[arg(long, value_name = "EXT=TOKEN")]
  pub dialect: Vec<String>,

  /// File patterns to ignore (supports glob patterns)
  #[arg(long, short = 'i')]
  pub ignore: Vec<String>,

  /// Walk directories without honoring .gitignore files
  #[arg(long)]
  pub no_gitignore: bool,

  /// Stop at the first file that fails
  #[arg(long)]
  pub strict: bool,

  /// Increase verbosity (-v info, -vv debug, -vvv trace)
  #[arg(short, long, action = clap::ArgAction::Count)]
  pub verbose: u8,

  /// Suppress all output except errors
  #[arg(short, long, conflicts_with = "verbose")]
  pub quiet: bool,

  /// Control when to use colored output (auto, never, always)
  #[arg(
    long,
    value_name = "WHEN",
    num_args = 0..=1,
    default_value_t = ColorMode::Auto,
    default_missing_value = "always",
    value_enum
  )]
  pub colors: ColorMode,

  /// Generate a JSON report of every file's outcome and save to the specified
  /// path
  #[arg(long, value_name = "OUTPUT")]
  pub report_json: Option<PathBuf>,

  /// Generate a CSV report of every file's outcome and save to the specified
  /// path
  #[arg(long, value_name = "OUTPUT")]
  pub report_csv: Option<PathBuf>,

  /// Skip git repository ownership check. Useful when running in Docker or
  /// other containerized environments where the repository may be owned by a
  /// different user.
  #[arg(long)]
  pub skip_git_owner_check: bool,
}

impl UpdateArgs {
  /// Validate the arguments and return an error if invalid
  fn validate(&self) -> Result<(), String> {
    if self.patterns.is_empty() {
      return Err("Missing required argument: <PATTERNS>...".to_string());
    }
    Ok(())
  }

  const fn apply(&self) -> bool {
    self.modify && !self.dry_run
  }
}

/// Run the update command with the given arguments
pub async fn run_update(args: UpdateArgs) -> Result<()> {
  if let Err(e) = args.validate() {
    eprintln!("ERROR: {e}");
    process::exit(1);
  }

  init_tracing(args.quiet, args.verbose);

  if args.verbose > 0 {
    set_verbose();
  } else if args.quiet {
    set_quiet();
  }
  args.colors.apply();

  debug!(
    "copyright-keeper {} ({})",
    env!("CARGO_PKG_VERSION"),
    option_env!("GIT_HASH").unwrap_or("unknown")
  );

  if args.skip_git_owner_check {
    debug!("Disabling git repository ownership check");
    // SAFETY: called before any Repository is opened, from a single thread.
    unsafe {
      let _ = git2::opts::set_verify_owner_validation(false);
    }
  }

  let apply = args.apply();

  let diff_manager = DiffManager::new(args.show_diff, args.save_diff.clone());
  diff_manager.init()?;

  let workspace = resolve_workspace(&args.patterns)?;
  let workspace_root = workspace.root().to_path_buf();
  if workspace.is_git() {
    info_log!("Git repository detected, using commit history for modification years");
  }
  debug!("Using workspace root: {}", workspace_root.display());

  let mut config = load_config(args.config.as_deref(), &workspace_root, args.no_config)?;
  if let Err(e) = config.merge_cli_dialects(&args.dialect) {
    eprintln!("ERROR: {}", e);
    process::exit(1);
  }

  let dialects = DialectTable::with_overrides(&config.dialects).context("Invalid comment dialect")?;
  debug!("{} comment dialects registered", dialects.len());

  let resolver = ModificationYearResolver::default().with_fixed_year(args.year);
  if let Some(year) = args.year {
    debug!("Using fixed modification year {}", year);
  }

  let mut ignore_patterns = config.files.ignore;
  ignore_patterns.extend(args.ignore.iter().cloned());

  let pipeline = Pipeline::new(dialects, resolver, apply).with_diff_manager(diff_manager);
  let processor = Processor::new(ProcessorConfig {
    ignore_patterns,
    respect_gitignore: !args.no_gitignore,
    strict: args.strict,
    ..ProcessorConfig::new(pipeline, workspace_root.clone())
  })?;

  let files = processor.collect_files(&args.patterns)?;
  print_start_message(files.len(), apply);

  if files.is_empty() {
    print_blank_line();
    print_all_files_ok();
    return Ok(());
  }

  let start_time = Instant::now();
  let outcome = processor.process_files(files).await?;
  let elapsed = start_time.elapsed();

  let file_reports = outcome.reports;
  let summary = ProcessingSummary::from_reports(&file_reports, elapsed);
  let failures = ProcessingSummary::failures_by_kind(&file_reports);
  let categorized = CategorizedReports::from_reports(&file_reports);

  let has_updates = !categorized.updated.is_empty();
  let has_failures = !categorized.failed.is_empty();

  print_blank_line();
  if apply {
    print_updated_files(&categorized.updated, Some(&workspace_root));
  } else {
    print_outdated_files(&categorized.updated, Some(&workspace_root), None);
  }
  if !has_updates && !has_failures {
    print_all_files_ok();
  }

  if !categorized.flagged.is_empty() {
    print_blank_line();
    print_flagged_files(&categorized.flagged, Some(&workspace_root));
  }

  if has_failures {
    print_blank_line();
    print_failed_files(&categorized.failed, Some(&workspace_root));
  }

  print_blank_line();
  print_summary(&summary, &failures, apply);

  if !apply && has_updates {
    print_blank_line();
    print_hint("Run with --modify to update outdated years.");
  }

  write_reports(&args, &file_reports, &summary);

  if outcome.aborted {
    eprintln!("ERROR: Stopped after the first failure (--strict)");
    process::exit(1);
  }

  if has_failures || (!apply && has_updates) {
    process::exit(1);
  }

  Ok(())
}

fn write_reports(args: &UpdateArgs, file_reports: &[FileReport], summary: &ProcessingSummary) {
  let requested = [
    (ReportFormat::Json, args.report_json.as_ref()),
    (ReportFormat::Csv, args.report_csv.as_ref()),
  ];

  for (format, output_path) in requested {
    let Some(output_path) = output_path else {
      continue;
    };
    let report_generator = ReportGenerator::new(format, output_path);
    if let Err(e) = report_generator.generate(file_reports, summary) {
      eprintln!("Error generating {} report: {:#}", format, e);
    } else {
      info_log!("Generated {} report at {}", format, output_path.display());
    }
  }
}
