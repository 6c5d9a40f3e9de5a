//! # copyright-keeper
//!
//! A tool that keeps source file copyright years up to date.

mod cli;

use anyhow::Result;

use crate::cli::{Cli, run_update};

#[tokio::main]
async fn main() -> Result<()> {
  let cli = Cli::parse_args();
  run_update(cli.into_update_args()).await
}
