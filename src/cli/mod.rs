//! # CLI Module
//!
//! This module contains the command-line interface implementation.
//! It uses clap for argument parsing and supports subcommands for
//! extensibility.

mod update;

use clap::builder::styling::{AnsiColor, Color, Style, Styles};
use clap::{Parser, Subcommand};
pub use update::{UpdateArgs, run_update};

const CUSTOM_STYLES: Styles = Styles::styled()
  .header(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))).bold())
  .usage(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))).bold())
  .literal(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Blue))).bold())
  .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Cyan))))
  .error(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Red))).bold())
  .valid(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))))
  .invalid(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Yellow))));

/// Top-level CLI arguments
#[derive(Parser, Debug)]
#[command(
  author,
  version,
  about,
  styles = CUSTOM_STYLES,
  after_help = "Examples:
  # Report files whose copyright year is out of date
  copyright-keeper src/

  # Extend outdated copyright years in place
  copyright-keeper --modify include/ src/

  # Show the year changes as a diff without modifying files
  copyright-keeper --show-diff src/**/*.c

  # Save the diff to a file
  copyright-keeper --save-diff changes.diff src/

  # Treat every file as modified in 2024
  copyright-keeper --modify --year 2024 .

  # Teach it a new comment syntax
  copyright-keeper --dialect \"lua=--\" scripts/

  # Write a JSON report of every file's outcome
  copyright-keeper --report-json report.json src/

  # Ignore specific files or patterns
  copyright-keeper --ignore \"**/vendor/**\" --ignore \"**/*.min.js\" src/
",
  help_template = "{before-help}{name} v{version}
{about-section}
{usage-heading} {usage}

{all-args}{after-help}
"
)]
pub struct Cli {
  #[command(subcommand)]
  pub command: Option<Command>,

  #[command(flatten)]
  pub update_args: UpdateArgs,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
  /// Check and optionally update copyright years in source files (default)
  Update(UpdateArgs),
}

impl Cli {
  /// Parse CLI arguments and return the Cli struct
  pub fn parse_args() -> Self {
    Self::parse()
  }

  /// Get the effective update arguments, whether from a subcommand or
  /// top-level
  pub fn into_update_args(self) -> UpdateArgs {
    match self.command {
      Some(Command::Update(args)) => args,
      None => self.update_args,
    }
  }
}
