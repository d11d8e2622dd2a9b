//! Build properties.
//!
//! A [`PropertyMap`] is the key/value configuration that recipes are rendered
//! against. Maps are cheap to clone, and callers are expected to clone the
//! shared base map before binding per-invocation keys so those keys never
//! leak back into it.
//!
//! # File Format
//!
//! ```text
//! # comment
//! compiler.path=/usr/bin/
//! recipe.ar.pattern="{compiler.path}ar" rcs "{archive_file_path}" "{object_file}"
//! ```
//!
//! One `key=value` per line. Whitespace around keys and values is trimmed,
//! blank lines and `#` comments are skipped, and later keys override earlier
//! ones.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while loading properties.
#[derive(Debug, Error)]
pub enum PropertiesError {
  #[error("failed to read properties file {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("invalid property on line {line}: '{content}' (expected key=value)")]
  InvalidLine { line: usize, content: String },

  #[error("invalid property '{0}' (expected key=value)")]
  InvalidPair(String),
}

/// Ordered key/value build properties.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PropertyMap {
  entries: BTreeMap<String, String>,
}

impl PropertyMap {
  pub fn new() -> Self {
    Self::default()
  }

  /// Parse properties from text in `key=value` form.
  pub fn parse(text: &str) -> Result<Self, PropertiesError> {
    let mut map = Self::new();

    for (idx, raw) in text.lines().enumerate() {
      let line = raw.trim();
      if line.is_empty() || line.starts_with('#') {
        continue;
      }

      let (key, value) = split_pair(line).ok_or_else(|| PropertiesError::InvalidLine {
        line: idx + 1,
        content: line.to_string(),
      })?;
      map.set(key, value);
    }

    Ok(map)
  }

  /// Load properties from a file on disk.
  pub fn load(path: impl AsRef<Path>) -> Result<Self, PropertiesError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| PropertiesError::Read {
      path: path.to_path_buf(),
      source,
    })?;

    let map = Self::parse(&text)?;
    debug!(path = ?path, count = map.len(), "loaded properties");
    Ok(map)
  }

  /// Bind a key to a scalar value, replacing any previous value.
  pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
    self.entries.insert(key.into(), value.into());
  }

  /// Bind a key to a filesystem path.
  pub fn set_path(&mut self, key: impl Into<String>, path: impl AsRef<Path>) {
    self.set(key, path.as_ref().to_string_lossy().into_owned());
  }

  /// Bind a key from a `key=value` pair, as given on the command line.
  pub fn set_from_pair(&mut self, pair: &str) -> Result<(), PropertiesError> {
    let (key, value) = split_pair(pair).ok_or_else(|| PropertiesError::InvalidPair(pair.to_string()))?;
    self.set(key, value);
    Ok(())
  }

  pub fn get(&self, key: &str) -> Option<&str> {
    self.entries.get(key).map(String::as_str)
  }

  pub fn contains_key(&self, key: &str) -> bool {
    self.entries.contains_key(key)
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
  }

  /// Copy every entry of `other` into this map. Values from `other` win.
  pub fn merge(&mut self, other: &PropertyMap) {
    for (key, value) in other.iter() {
      self.set(key, value);
    }
  }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PropertyMap {
  fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
    let mut map = Self::new();
    for (key, value) in iter {
      map.set(key, value);
    }
    map
  }
}

fn split_pair(line: &str) -> Option<(&str, &str)> {
  let (key, value) = line.split_once('=')?;
  let key = key.trim();
  if key.is_empty() {
    return None;
  }
  Some((key, value.trim()))
}
