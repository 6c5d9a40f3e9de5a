//! # Diff Module
//!
//! This module renders diffs between a file's original and updated text. It is
//! used to show which copyright lines a run changes (or would change).

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use owo_colors::{OwoColorize, Stream};
use similar::{ChangeTag, TextDiff};

/// Manages diff creation and rendering for copyright year changes.
///
/// This struct handles:
/// - Generating unified diffs between original and updated content
/// - Displaying diffs to stderr with colorization
/// - Appending diffs to a single consolidated file
#[derive(Debug, Default)]
pub struct DiffManager {
  /// Whether to print diffs to stderr
  pub show_diff: bool,

  /// Path to save the diffs to
  pub save_diff_path: Option<PathBuf>,

  /// Serializes appends from concurrent workers.
  write_lock: Mutex<()>,
}

impl DiffManager {
  /// Creates a new DiffManager with the specified configuration.
  ///
  /// # Parameters
  ///
  /// * `show_diff` - Whether to print diffs to stderr
  /// * `save_diff_path` - Path to save the diffs to
  pub fn new(show_diff: bool, save_diff_path: Option<PathBuf>) -> Self {
    Self {
      show_diff,
      save_diff_path,
      write_lock: Mutex::new(()),
    }
  }

  /// Whether this manager does anything at all.
  pub const fn is_enabled(&self) -> bool {
    self.show_diff || self.save_diff_path.is_some()
  }

  /// Truncate the save file so a run starts with an empty diff.
  pub fn init(&self) -> Result<()> {
    if let Some(ref diff_path) = self.save_diff_path {
      std::fs::write(diff_path, "")
        .with_context(|| format!("Failed to create diff file {}", diff_path.display()))?;
    }
    Ok(())
  }

  /// Render the unified diff for one file.
  pub fn render(path: &Path, original: &str, updated: &str) -> String {
    let name = path.display().to_string();
    TextDiff::from_lines(original, updated)
      .unified_diff()
      .context_radius(1)
      .header(&format!("a/{name}"), &format!("b/{name}"))
      .to_string()
  }

  /// Displays and/or saves the diff between the original and updated content.
  ///
  /// Diffs from different files are appended to the same save file, creating
  /// a single consolidated patch.
  pub fn display_diff(&self, path: &Path, original: &str, updated: &str) -> Result<()> {
    if !self.is_enabled() {
      return Ok(());
    }

    let rendered = Self::render(path, original, updated);
    let _guard = self.write_lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

    if self.show_diff {
      let diff = TextDiff::from_lines(original, updated);
      let mut unified = diff.unified_diff();
      unified.context_radius(1);

      let mut out = String::new();
      for line in rendered.lines().take(2) {
        out.push_str(&format!("{}\n", line.if_supports_color(Stream::Stderr, |s| s.bold())));
      }
      for hunk in unified.iter_hunks() {
        out.push_str(&format!("{}\n", hunk.header().if_supports_color(Stream::Stderr, |s| s.cyan())));
        for change in hunk.iter_changes() {
          let line = format!("{}{}", sign(change.tag()), change);
          let line = line.trim_end_matches('\n');
          let colored = match change.tag() {
            ChangeTag::Delete => line.if_supports_color(Stream::Stderr, |s| s.red()).to_string(),
            ChangeTag::Insert => line.if_supports_color(Stream::Stderr, |s| s.green()).to_string(),
            ChangeTag::Equal => line.to_string(),
          };
          out.push_str(&colored);
          out.push('\n');
        }
      }
      eprint!("{out}");
    }

    if let Some(ref diff_path) = self.save_diff_path {
      let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(diff_path)
        .with_context(|| format!("Failed to open diff file {}", diff_path.display()))?;
      file
        .write_all(rendered.as_bytes())
        .with_context(|| format!("Failed to write diff file {}", diff_path.display()))?;
    }

    Ok(())
  }
}

const fn sign(tag: ChangeTag) -> &'static str {
  match tag {
    ChangeTag::Delete => "-",
    ChangeTag::Insert => "+",
    ChangeTag::Equal => " ",
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_render_shows_changed_line() {
    let original = "/* Copyright 2019 Acme */\nint x;\n";
    let updated = "/* Copyright 2019-2023 Acme */\nint x;\n";
    let diff = DiffManager::render(Path::new("src/a.c"), original, updated);

    assert!(diff.starts_with("--- a/src/a.c\n+++ b/src/a.c\n"));
    assert!(diff.contains("-/* Copyright 2019 Acme */\n"));
    assert!(diff.contains("+/* Copyright 2019-2023 Acme */\n"));
    assert!(diff.contains(" int x;\n"));
  }

  #[test]
  fn test_save_diff_appends_per_file() {
    let temp_dir = tempfile::tempdir().expect("create temp dir");
    let diff_path = temp_dir.path().join("changes.diff");
    std::fs::write(&diff_path, "stale").expect("write stale diff");

    let manager = DiffManager::new(false, Some(diff_path.clone()));
    manager.init().expect("init");
    manager
      .display_diff(Path::new("a.py"), "# Copyright 2019\n", "# Copyright 2019-2020\n")
      .expect("first diff");
    manager
      .display_diff(Path::new("b.py"), "# Copyright 2018\n", "# Copyright 2018-2020\n")
      .expect("second diff");

    let saved = std::fs::read_to_string(&diff_path).expect("read diff");
    assert!(!saved.contains("stale"));
    assert!(saved.contains("--- a/a.py"));
    assert!(saved.contains("--- a/b.py"));
  }

  #[test]
  fn test_disabled_manager_is_noop() {
    let manager = DiffManager::default();
    assert!(!manager.is_enabled());
    manager
      .display_diff(Path::new("a.c"), "a\n", "b\n")
      .expect("noop diff");
  }
}
