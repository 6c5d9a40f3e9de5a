//! # File Collector Module
//!
//! This module turns user-provided patterns into the list of files to process.
//! Patterns may be files, directories (walked recursively) or glob patterns.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ignore::WalkBuilder;
use tracing::{debug, trace, warn};

/// Glob patterns of files to leave out of a run.
#[derive(Debug, Default)]
pub struct IgnoreSet {
  patterns: Vec<glob::Pattern>,
}

impl IgnoreSet {
  /// Compile the ignore patterns.
  pub fn new(patterns: &[String]) -> Result<Self> {
    let patterns = patterns
      .iter()
      .map(|p| glob::Pattern::new(p).with_context(|| format!("Invalid ignore pattern: {}", p)))
      .collect::<Result<Vec<_>>>()?;
    Ok(Self { patterns })
  }

  /// Whether a workspace-relative path matches any pattern.
  ///
  /// Patterns without a `/` also match against the bare file name.
  pub fn is_ignored(&self, rel_path: &Path) -> bool {
    let file_name = rel_path.file_name().map(Path::new);
    self.patterns.iter().any(|pattern| {
      pattern.matches_path(rel_path)
        || (!pattern.as_str().contains('/') && file_name.is_some_and(|name| pattern.matches_path(name)))
    })
  }

  pub fn is_empty(&self) -> bool {
    self.patterns.is_empty()
  }
}

/// File collector for pattern matching and directory traversal.
///
/// The `FileCollector` handles:
/// - Expanding glob patterns
/// - Walking directories, honoring `.gitignore` when asked to
/// - Dropping ignored paths and duplicates
pub struct FileCollector {
  /// Root of the workspace, used to relativize paths for ignore matching
  workspace_root: PathBuf,
  respect_gitignore: bool,
  ignore: IgnoreSet,
}

impl FileCollector {
  /// Creates a new FileCollector.
  ///
  /// # Parameters
  ///
  /// * `workspace_root` - The root directory of the workspace
  /// * `respect_gitignore` - Whether directory walks skip gitignored files
  /// * `ignore` - Additional ignore patterns
  pub const fn new(workspace_root: PathBuf, respect_gitignore: bool, ignore: IgnoreSet) -> Self {
    Self {
      workspace_root,
      respect_gitignore,
      ignore,
    }
  }

  /// Collect the files named by `patterns`, sorted and deduplicated.
  ///
  /// Explicitly named files are kept even when gitignored; ignore patterns
  /// apply to every path.
  pub fn collect(&self, patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = BTreeSet::new();

    for pattern in patterns {
      let path = PathBuf::from(pattern);
      if path.is_file() {
        files.insert(path);
      } else if path.is_dir() {
        files.extend(self.traverse_directory(&path));
      } else {
        let entries = glob::glob(pattern).with_context(|| format!("Invalid glob pattern: {}", pattern))?;
        let mut matched = false;
        for entry in entries {
          match entry {
            Ok(found) if found.is_file() => {
              matched = true;
              files.insert(found);
            }
            Ok(found) if found.is_dir() => {
              matched = true;
              files.extend(self.traverse_directory(&found));
            }
            Ok(_) => {}
            Err(e) => warn!("Error with glob pattern {}: {}", pattern, e),
          }
        }
        if !matched {
          warn!("Pattern matched no files: {}", pattern);
        }
      }
    }

    let collected: Vec<PathBuf> = files.into_iter().filter(|path| !self.is_ignored(path)).collect();
    debug!("Collected {} files", collected.len());
    Ok(collected)
  }

  fn is_ignored(&self, path: &Path) -> bool {
    if self.ignore.is_empty() {
      return false;
    }
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let rel = normalize_relative_path(&absolute, &self.workspace_root);
    let ignored = self.ignore.is_ignored(&rel);
    if ignored {
      trace!("Ignoring {}", rel.display());
    }
    ignored
  }

  /// Walk a directory recursively and collect its regular files.
  pub fn traverse_directory(&self, dir: &Path) -> Vec<PathBuf> {
    debug!("Scanning directory: {}", dir.display());
    let start_time = std::time::Instant::now();

    let walker = WalkBuilder::new(dir)
      .git_ignore(self.respect_gitignore)
      .git_global(self.respect_gitignore)
      .git_exclude(self.respect_gitignore)
      .ignore(self.respect_gitignore)
      .build();

    let mut files = Vec::new();
    for entry in walker {
      match entry {
        Ok(entry) if entry.file_type().is_some_and(|t| t.is_file()) => files.push(entry.into_path()),
        Ok(_) => {}
        Err(e) => warn!("Error walking {}: {}", dir.display(), e),
      }
    }

    debug!(
      "Found {} files in {}ms",
      files.len(),
      start_time.elapsed().as_millis()
    );
    files
  }
}

/// Normalizes a path to be relative to a given directory.
///
/// # Parameters
///
/// * `path` - The path to normalize
/// * `base` - The directory to make the path relative to
///
/// # Returns
///
/// The normalized relative path.
pub fn normalize_relative_path(path: &Path, base: &Path) -> PathBuf {
  if path.is_absolute() {
    if let Ok(stripped) = path.strip_prefix(base) {
      return stripped.to_path_buf();
    }

    if let Some(rel_path) = pathdiff::diff_paths(path, base) {
      return rel_path;
    }
  }

  let mut normalized = PathBuf::new();
  for component in path.components() {
    if matches!(component, std::path::Component::CurDir) {
      continue;
    }
    normalized.push(component.as_os_str());
  }

  if normalized.as_os_str().is_empty() {
    PathBuf::from(".")
  } else {
    normalized
  }
}
