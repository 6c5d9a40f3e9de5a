//! # Git Module
//!
//! This module contains functionality for interacting with git repositories:
//! locating the repository root and finding when a file was last committed.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, FixedOffset};
use git2::{Oid, Repository, Sort, Status, Tree};
use tracing::trace;

/// Find the working directory root of the repository containing `start`.
///
/// # Returns
///
/// `Ok(None)` when `start` is not inside a git repository, or when the
/// repository is bare.
pub fn discover_repo_root(start: &Path) -> Result<Option<PathBuf>> {
  match Repository::discover(start) {
    Ok(repo) => {
      let Some(workdir) = repo.workdir() else {
        return Ok(None);
      };
      let root = workdir
        .canonicalize()
        .with_context(|| format!("Failed to resolve repository root {}", workdir.display()))?;
      Ok(Some(root))
    }
    Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
    Err(e) => Err(e).with_context(|| format!("Failed to open git repository at {}", start.display())),
  }
}

/// Year of the most recent commit that changed `rel_path`, in the commit
/// author's timezone.
///
/// Commits are walked newest first. A commit counts as changing the path when
/// the path's blob differs from every parent's (a root commit counts when it
/// contains the path).
///
/// # Parameters
///
/// * `repo` - The repository to search
/// * `rel_path` - Path relative to the repository root
///
/// # Returns
///
/// `Ok(None)` when no commit on `HEAD` contains the path.
pub fn last_commit_year(repo: &Repository, rel_path: &Path) -> Result<Option<i32>> {
  let mut walk = repo.revwalk().context("Failed to start revision walk")?;
  walk.set_sorting(Sort::TIME).context("Failed to sort revision walk")?;
  if let Err(e) = walk.push_head() {
    // Unborn HEAD: the repository has no commits yet.
    trace!("No HEAD to walk from: {}", e);
    return Ok(None);
  }

  for oid in walk {
    let oid = oid.context("Failed to read revision")?;
    let commit = repo
      .find_commit(oid)
      .with_context(|| format!("Failed to find commit {}", oid))?;
    let tree = commit.tree().with_context(|| format!("Failed to read tree of {}", oid))?;

    let Some(blob) = entry_id(&tree, rel_path) else {
      continue;
    };

    let changed = commit.parent_count() == 0
      || commit
        .parents()
        .all(|parent| parent.tree().ok().and_then(|t| entry_id(&t, rel_path)) != Some(blob));

    if changed {
      let when = commit.author().when();
      trace!("{} last changed in {}", rel_path.display(), oid);
      return Ok(year_of_git_time(when));
    }
  }

  Ok(None)
}

/// Whether the path has staged or unstaged changes relative to `HEAD`.
pub fn has_uncommitted_changes(repo: &Repository, rel_path: &Path) -> Result<bool> {
  let status = repo
    .status_file(rel_path)
    .with_context(|| format!("Failed to get git status of {}", rel_path.display()))?;

  let dirty = Status::WT_MODIFIED
    | Status::WT_RENAMED
    | Status::WT_TYPECHANGE
    | Status::INDEX_MODIFIED
    | Status::INDEX_RENAMED
    | Status::INDEX_TYPECHANGE;
  Ok(status.intersects(dirty))
}

fn entry_id(tree: &Tree<'_>, rel_path: &Path) -> Option<Oid> {
  tree.get_path(rel_path).ok().map(|entry| entry.id())
}

/// Calendar year of a git timestamp in its recorded offset.
pub fn year_of_git_time(time: git2::Time) -> Option<i32> {
  let offset = FixedOffset::east_opt(time.offset_minutes() * 60)?;
  let utc = DateTime::from_timestamp(time.seconds(), 0)?;
  Some(utc.with_timezone(&offset).year())
}
