//! # Dialect Module
//!
//! This module maps file extensions to comment dialects: the line-comment
//! token, the block-comment delimiters, and the pattern that recognizes a
//! copyright phrase inside a comment.
//!
//! The module includes:
//! - [`CommentDialect`] for the raw comment delimiters
//! - [`Dialect`] for a delimiter set paired with its phrase-matching rule
//! - [`DialectTable`] for the extension-keyed strategy table, with the builtin
//!   entries and user overrides
//!
//! ## Example
//!
//! ```rust
//! use copyright_keeper::dialect::DialectTable;
//!
//! let table = DialectTable::builtin();
//! let dialect = table.dialect_for("py").expect("python is builtin");
//! assert_eq!(dialect.comment().line_token(), Some("#"));
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::config::DialectConfig;
use crate::error::UpdateError;

/// Default copyright phrase: the word "copyright" in any case, optionally
/// followed by a `(c)` or `©` tag.
pub const DEFAULT_PHRASE_PATTERN: &str = r"(?i)\bcopyright\b(?:\s*(?:\(c\)|©))?";

static DEFAULT_PHRASE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(DEFAULT_PHRASE_PATTERN).expect("default phrase regex must compile"));

static BUILTIN_TABLE: LazyLock<DialectTable> = LazyLock::new(DialectTable::builtin);

/// Errors raised while building a dialect from user configuration.
#[derive(Debug, thiserror::Error)]
pub enum DialectError {
  /// Neither a line token nor a block pair was given.
  #[error("dialect '{name}' has no line token and no block delimiters")]
  Empty { name: String },

  /// Only one of the block delimiters was given.
  #[error("dialect '{name}' must set both block-open and block-close, or neither")]
  UnpairedBlock { name: String },

  /// The phrase override is not a valid regular expression.
  #[error("dialect '{name}' has an invalid phrase pattern: {source}")]
  InvalidPhrase { name: String, source: regex::Error },
}

/// Comment delimiters of a source language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentDialect {
  line_token: Option<String>,
  block_open: Option<String>,
  block_close: Option<String>,
}

impl CommentDialect {
  /// Create a dialect, checking that at least one comment form is usable.
  ///
  /// Empty strings are treated the same as `None`.
  pub fn new(
    name: &str,
    line_token: Option<&str>,
    block_open: Option<&str>,
    block_close: Option<&str>,
  ) -> Result<Self, DialectError> {
    let non_empty = |s: Option<&str>| s.filter(|s| !s.is_empty()).map(str::to_string);
    let line_token = non_empty(line_token);
    let block_open = non_empty(block_open);
    let block_close = non_empty(block_close);

    if block_open.is_some() != block_close.is_some() {
      return Err(DialectError::UnpairedBlock { name: name.to_string() });
    }
    if line_token.is_none() && block_open.is_none() {
      return Err(DialectError::Empty { name: name.to_string() });
    }

    Ok(Self {
      line_token,
      block_open,
      block_close,
    })
  }

  /// Line comments only (e.g. `#`).
  pub fn line(token: &str) -> Self {
    Self {
      line_token: Some(token.to_string()),
      block_open: None,
      block_close: None,
    }
  }

  /// Line comments plus a block form (e.g. `//` and `/* */`).
  pub fn line_and_block(token: &str, open: &str, close: &str) -> Self {
    Self {
      line_token: Some(token.to_string()),
      block_open: Some(open.to_string()),
      block_close: Some(close.to_string()),
    }
  }

  pub fn line_token(&self) -> Option<&str> {
    self.line_token.as_deref()
  }

  /// The block delimiters, present only as a pair.
  pub fn block(&self) -> Option<(&str, &str)> {
    match (&self.block_open, &self.block_close) {
      (Some(open), Some(close)) => Some((open.as_str(), close.as_str())),
      _ => None,
    }
  }
}

/// A comment dialect together with its copyright phrase rule.
#[derive(Debug, Clone)]
pub struct Dialect {
  name: String,
  comment: CommentDialect,
  phrase: Regex,
}

impl Dialect {
  /// Create a dialect using the default copyright phrase.
  pub fn new(name: &str, comment: CommentDialect) -> Self {
    Self {
      name: name.to_string(),
      comment,
      phrase: DEFAULT_PHRASE.clone(),
    }
  }

  /// Replace the phrase rule with a custom regular expression.
  pub fn with_phrase(mut self, pattern: &str) -> Result<Self, DialectError> {
    self.phrase = Regex::new(pattern).map_err(|source| DialectError::InvalidPhrase {
      name: self.name.clone(),
      source,
    })?;
    Ok(self)
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub const fn comment(&self) -> &CommentDialect {
    &self.comment
  }

  pub const fn phrase(&self) -> &Regex {
    &self.phrase
  }

  /// Build a dialect from a configuration entry.
  pub fn from_config(name: &str, config: &DialectConfig) -> Result<Self, DialectError> {
    let comment = CommentDialect::new(
      name,
      config.line.as_deref(),
      config.block_open.as_deref(),
      config.block_close.as_deref(),
    )?;
    let dialect = Self::new(name, comment);
    match config.phrase.as_deref() {
      Some(pattern) => dialect.with_phrase(pattern),
      None => Ok(dialect),
    }
  }
}

/// Extension-keyed table of dialects.
///
/// Keys are lowercase extensions without the leading dot. Several extensions
/// share one [`Dialect`] through an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct DialectTable {
  entries: HashMap<String, Arc<Dialect>>,
}

impl DialectTable {
  /// An empty table.
  pub fn new() -> Self {
    Self::default()
  }

  /// The builtin table.
  ///
  /// - C/C++/TypeScript/JavaScript: `//` and `/* */`
  /// - Python: `#` and `"""` docstrings
  /// - Shell: `#`
  /// - Batch: `REM`
  pub fn builtin() -> Self {
    let mut table = Self::new();

    let c_family = Arc::new(Dialect::new("c", CommentDialect::line_and_block("//", "/*", "*/")));
    for ext in ["c", "h", "cc", "cpp", "cxx", "hh", "hpp", "hxx"] {
      table.entries.insert(ext.to_string(), Arc::clone(&c_family));
    }

    let script = Arc::new(Dialect::new(
      "typescript",
      CommentDialect::line_and_block("//", "/*", "*/"),
    ));
    for ext in ["ts", "tsx", "mts", "cts", "js", "jsx", "mjs", "cjs"] {
      table.entries.insert(ext.to_string(), Arc::clone(&script));
    }

    let python = Arc::new(Dialect::new(
      "python",
      CommentDialect::line_and_block("#", "\"\"\"", "\"\"\""),
    ));
    table.entries.insert("py".to_string(), python);

    let shell = Arc::new(Dialect::new("shell", CommentDialect::line("#")));
    for ext in ["sh", "bash"] {
      table.entries.insert(ext.to_string(), Arc::clone(&shell));
    }

    let batch = Arc::new(Dialect::new("batch", CommentDialect::line("REM")));
    for ext in ["bat", "cmd"] {
      table.entries.insert(ext.to_string(), Arc::clone(&batch));
    }

    table
  }

  /// Register (or replace) the dialect for an extension.
  pub fn insert(&mut self, extension: &str, dialect: Dialect) {
    self.entries.insert(normalize_extension(extension), Arc::new(dialect));
  }

  /// Builtin table with the configured overrides applied on top.
  pub fn with_overrides(overrides: &HashMap<String, DialectConfig>) -> Result<Self, DialectError> {
    let mut table = Self::builtin();
    for (extension, config) in overrides {
      let dialect = Dialect::from_config(extension, config)?;
      table.insert(extension, dialect);
    }
    Ok(table)
  }

  /// Look up the dialect registered for an extension.
  ///
  /// The lookup ignores case and a leading dot.
  pub fn dialect_for(&self, extension: &str) -> Result<&Dialect, UpdateError> {
    self
      .entries
      .get(&normalize_extension(extension))
      .map(Arc::as_ref)
      .ok_or_else(|| UpdateError::UnknownExtension {
        extension: extension.to_string(),
      })
  }

  /// Look up the dialect for a path by its extension.
  pub fn dialect_for_path(&self, path: &Path) -> Result<&Dialect, UpdateError> {
    self.dialect_for(&extension_of(path))
  }

  /// Whether any dialect is registered for the path's extension.
  pub fn handles(&self, path: &Path) -> bool {
    self.entries.contains_key(&normalize_extension(&extension_of(path)))
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

/// Look up an extension in the builtin table.
pub fn dialect_for(extension: &str) -> Result<&'static Dialect, UpdateError> {
  BUILTIN_TABLE.dialect_for(extension)
}

/// The extension of a path, lowercased, or an empty string.
pub fn extension_of(path: &Path) -> String {
  path
    .extension()
    .and_then(|ext| ext.to_str())
    .unwrap_or("")
    .to_lowercase()
}

fn normalize_extension(extension: &str) -> String {
  extension.trim_start_matches('.').to_lowercase()
}
