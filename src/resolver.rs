//! # Resolver Module
//!
//! Determines the year a file was last modified. Version control history is
//! preferred; the filesystem modification time is the fallback. A fixed year
//! supplied by the user bypasses both.
//!
//! The two sources sit behind the [`VcsQuery`] and [`MetadataQuery`] traits so
//! the pipeline can be driven by stubs in tests.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Datelike, Local};
use git2::Repository;
use tracing::{debug, trace};

use crate::error::UpdateError;
use crate::git;

/// Last-commit information from version control.
pub trait VcsQuery: Send + Sync {
  /// Year of the last commit touching `path`, or `None` when the path is
  /// untracked, outside the repository, or the query failed.
  fn last_commit_year(&self, path: &Path) -> Option<i32>;

  /// Whether `path` has changes that are not yet committed.
  fn has_uncommitted_changes(&self, _path: &Path) -> bool {
    false
  }
}

/// Filesystem metadata access.
pub trait MetadataQuery: Send + Sync {
  /// Year of the file's last modification time, in local time.
  fn last_modified_year(&self, path: &Path) -> std::io::Result<i32>;
}

/// [`VcsQuery`] backed by git.
///
/// Each query discovers the repository that contains the file, so files from
/// several repositories resolve against their own history. The repository is
/// reopened per query since [`Repository`] cannot be shared across threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitHistory;

impl GitHistory {
  pub const fn new() -> Self {
    Self
  }

  fn open(&self, path: &Path) -> Option<(Repository, PathBuf)> {
    let absolute = path.canonicalize().ok()?;
    let start = absolute.parent()?;
    let repo = match Repository::discover(start) {
      Ok(repo) => repo,
      Err(e) => {
        trace!("No repository for {}: {}", path.display(), e.message());
        return None;
      }
    };
    let Some(workdir) = repo.workdir() else {
      debug!("Repository for {} has no working directory", path.display());
      return None;
    };
    let workdir = workdir.canonicalize().ok()?;
    let rel = absolute.strip_prefix(&workdir).ok()?.to_path_buf();
    Some((repo, rel))
  }
}

impl VcsQuery for GitHistory {
  fn last_commit_year(&self, path: &Path) -> Option<i32> {
    let (repo, rel) = self.open(path)?;
    match git::last_commit_year(&repo, &rel) {
      Ok(year) => year,
      Err(e) => {
        debug!("Git history lookup failed for {}: {:#}", path.display(), e);
        None
      }
    }
  }

  fn has_uncommitted_changes(&self, path: &Path) -> bool {
    let Some((repo, rel)) = self.open(path) else {
      return false;
    };
    git::has_uncommitted_changes(&repo, &rel).unwrap_or_else(|e| {
      debug!("Git status lookup failed for {}: {:#}", path.display(), e);
      false
    })
  }
}

/// [`MetadataQuery`] reading the filesystem modification time.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsMetadata;

impl MetadataQuery for FsMetadata {
  fn last_modified_year(&self, path: &Path) -> std::io::Result<i32> {
    let modified = std::fs::metadata(path)?.modified()?;
    Ok(local_year(modified))
  }
}

fn local_year(time: SystemTime) -> i32 {
  DateTime::<Local>::from(time).year()
}

/// Resolves the modification year of a file.
///
/// The default resolver reads git history for files inside a repository and
/// filesystem metadata otherwise.
pub struct ModificationYearResolver {
  vcs: Option<Box<dyn VcsQuery>>,
  metadata: Box<dyn MetadataQuery>,
  fixed_year: Option<i32>,
}

impl ModificationYearResolver {
  /// A resolver with the given sources.
  ///
  /// # Parameters
  ///
  /// * `vcs` - Version control source, or `None` outside a repository
  /// * `metadata` - Filesystem fallback
  pub fn new(vcs: Option<Box<dyn VcsQuery>>, metadata: Box<dyn MetadataQuery>) -> Self {
    Self {
      vcs,
      metadata,
      fixed_year: None,
    }
  }

  /// Always resolve to `year`.
  pub fn with_fixed_year(mut self, year: Option<i32>) -> Self {
    self.fixed_year = year;
    self
  }

  /// Resolve the year `path` was last modified.
  ///
  /// Uses the last commit year when the file is tracked. Files with
  /// uncommitted changes resolve to the later of the commit year and the
  /// filesystem year. Untracked files use the filesystem year.
  ///
  /// # Errors
  ///
  /// Returns [`UpdateError::Resolution`] when neither source yields a year.
  pub fn resolve_year(&self, path: &Path) -> Result<i32, UpdateError> {
    if let Some(year) = self.fixed_year {
      return Ok(year);
    }

    let commit_year = self.vcs.as_ref().and_then(|vcs| vcs.last_commit_year(path));

    if let Some(year) = commit_year {
      let dirty = self.vcs.as_ref().is_some_and(|vcs| vcs.has_uncommitted_changes(path));
      if !dirty {
        trace!("{}: commit year {}", path.display(), year);
        return Ok(year);
      }
      let resolved = match self.metadata.last_modified_year(path) {
        Ok(fs_year) => year.max(fs_year),
        Err(_) => year,
      };
      trace!("{}: uncommitted changes, year {}", path.display(), resolved);
      return Ok(resolved);
    }

    match self.metadata.last_modified_year(path) {
      Ok(year) => {
        trace!("{}: filesystem year {}", path.display(), year);
        Ok(year)
      }
      Err(e) => Err(UpdateError::Resolution {
        path: path.to_path_buf(),
        reason: format!("no commit history and no modification time ({e})"),
      }),
    }
  }
}

impl Default for ModificationYearResolver {
  fn default() -> Self {
    Self::new(Some(Box::new(GitHistory::new())), Box::new(FsMetadata))
  }
}

#[cfg(test)]
mod tests {
  use std::collections::HashMap;

  use super::*;

  struct StubVcs {
    years: HashMap<PathBuf, i32>,
    dirty: bool,
  }

  impl VcsQuery for StubVcs {
    fn last_commit_year(&self, path: &Path) -> Option<i32> {
      self.years.get(path).copied()
    }

    fn has_uncommitted_changes(&self, _path: &Path) -> bool {
      self.dirty
    }
  }

  struct StubMetadata(Option<i32>);

  impl MetadataQuery for StubMetadata {
    fn last_modified_year(&self, _path: &Path) -> std::io::Result<i32> {
      self
        .0
        .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"))
    }
  }

  fn resolver(commit: Option<i32>, dirty: bool, fs: Option<i32>) -> ModificationYearResolver {
    let mut years = HashMap::new();
    if let Some(year) = commit {
      years.insert(PathBuf::from("a.c"), year);
    }
    ModificationYearResolver::new(Some(Box::new(StubVcs { years, dirty })), Box::new(StubMetadata(fs)))
  }

  #[test]
  fn test_commit_year_preferred() {
    let r = resolver(Some(2021), false, Some(2024));
    assert_eq!(r.resolve_year(Path::new("a.c")).expect("year"), 2021);
  }

  #[test]
  fn test_untracked_falls_back_to_mtime() {
    let r = resolver(None, false, Some(2024));
    assert_eq!(r.resolve_year(Path::new("a.c")).expect("year"), 2024);
  }

  #[test]
  fn test_dirty_file_takes_later_year() {
    let r = resolver(Some(2021), true, Some(2024));
    assert_eq!(r.resolve_year(Path::new("a.c")).expect("year"), 2024);

    let r = resolver(Some(2021), true, None);
    assert_eq!(r.resolve_year(Path::new("a.c")).expect("year"), 2021);
  }

  #[test]
  fn test_both_sources_fail() {
    let r = resolver(None, false, None);
    let err = r.resolve_year(Path::new("a.c")).expect_err("no year");
    assert!(matches!(err, UpdateError::Resolution { .. }));
  }

  #[test]
  fn test_fixed_year_bypasses_sources() {
    let r = resolver(None, false, None).with_fixed_year(Some(2030));
    assert_eq!(r.resolve_year(Path::new("a.c")).expect("year"), 2030);
  }

  #[test]
  fn test_fs_metadata_reads_mtime() {
    let temp_dir = tempfile::tempdir().expect("create temp dir");
    let path = temp_dir.path().join("a.c");
    std::fs::write(&path, "int x;\n").expect("write");

    let year = FsMetadata.last_modified_year(&path).expect("mtime");
    assert_eq!(year, Local::now().year());
    assert!(FsMetadata.last_modified_year(&temp_dir.path().join("missing.c")).is_err());
  }
}
