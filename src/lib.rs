//! # copyright-keeper
//!
//! A tool that keeps the year range in source file copyright comments in step
//! with when each file was last changed.
//!
//! For every file it finds the first comment block carrying a copyright
//! notice, parses the years after the copyright phrase, resolves the year the
//! file was last modified (from git history, falling back to the filesystem)
//! and, when that year is later than the notice's end year, rewrites only the
//! year text. The start year is never changed.
//!
//! ## Features
//!
//! * Comment dialects for C, C++, Python, TypeScript, JavaScript and shell
//!   scripts, extensible from a config file or the command line
//! * Dry-run by default, with optional diffs and JSON/CSV reports
//! * Atomic, byte-preserving rewrites that are idempotent
//! * Files processed in parallel; one bad file never hides the others
//!
//! ## Usage as a Library
//!
//! ```rust,no_run
//! use std::path::PathBuf;
//!
//! use copyright_keeper::dialect::DialectTable;
//! use copyright_keeper::processor::{Pipeline, Processor, ProcessorConfig};
//! use copyright_keeper::resolver::ModificationYearResolver;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let root = PathBuf::from(".");
//!     let resolver = ModificationYearResolver::default();
//!     let pipeline = Pipeline::new(DialectTable::builtin(), resolver, false);
//!     let processor = Processor::new(ProcessorConfig::new(pipeline, root))?;
//!
//!     let outcome = processor.process(&["src".to_string()]).await?;
//!     if outcome.has_updates() {
//!         println!("Some copyright years are out of date");
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! * [`locator`] - Finding the copyright comment block
//! * [`years`] - Parsing the year run
//! * [`resolver`] - Finding when a file was last modified
//! * [`engine`] - Deciding how the years change
//! * [`rewriter`] - Applying the year edit
//! * [`processor`] - Running all of the above over many files

pub mod config;
pub mod dialect;
pub mod diff;
pub mod engine;
pub mod error;
pub mod git;
pub mod locator;
pub mod logging;
pub mod output;
pub mod processor;
pub mod report;
pub mod resolver;
pub mod rewriter;
pub mod workspace;
pub mod years;
