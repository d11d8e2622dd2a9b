//! Recipe parsing and rendering.
//!
//! A recipe is a property whose value is a command-line template. Templates
//! reference other properties with `{key}`; referenced values may contain
//! further references and are expanded recursively.
//!
//! # Example
//!
//! ```
//! use objar_lib::properties::PropertyMap;
//! use objar_lib::recipe::render;
//!
//! let mut props = PropertyMap::new();
//! props.set("recipe.ar.pattern", r#"ar rcs "{archive_file_path}" "{object_file}""#);
//! props.set("archive_file_path", "/build/core.a");
//! props.set("object_file", "/build/main.o");
//!
//! let command = render(&props, "recipe.ar.pattern").unwrap();
//! assert_eq!(command.program, "ar");
//! assert_eq!(command.args, vec!["rcs", "/build/core.a", "/build/main.o"]);
//! ```

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::properties::PropertyMap;

/// Maximum nesting of `{key}` references before expansion gives up.
pub const MAX_EXPANSION_DEPTH: usize = 10;

/// A segment of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
  /// Literal text (no references)
  Literal(String),

  /// `{key}` - reference to another property
  Reference(String),
}

/// Errors that can occur while rendering a recipe.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecipeError {
  #[error("recipe '{0}' is missing or empty")]
  MissingRecipe(String),

  #[error("unclosed reference at position {0}")]
  Unclosed(usize),

  #[error("empty reference at position {0}")]
  EmptyReference(usize),

  #[error("unresolved property: {0}")]
  Unresolved(String),

  #[error("property '{0}' expands too deeply (recursive reference?)")]
  TooDeep(String),

  #[error("unterminated {0} quote in command line")]
  UnterminatedQuote(char),

  #[error("recipe '{0}' renders to an empty command")]
  EmptyCommand(String),
}

/// A fully rendered external command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolCommand {
  pub program: String,
  pub args: Vec<String>,
}

impl fmt::Display for ToolCommand {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", quote_for_display(&self.program))?;
    for arg in &self.args {
      write!(f, " {}", quote_for_display(arg))?;
    }
    Ok(())
  }
}

fn quote_for_display(word: &str) -> String {
  if word.is_empty() || word.chars().any(char::is_whitespace) {
    format!("\"{word}\"")
  } else {
    word.to_string()
  }
}

/// Parse a template into literal and reference segments.
///
/// A `}` with no opening brace is kept as literal text.
///
/// # Errors
///
/// Returns an error for an unclosed `{` or an empty `{}`.
pub fn parse(input: &str) -> Result<Vec<Segment>, RecipeError> {
  let mut segments = Vec::new();
  let mut literal = String::new();
  let mut chars = input.char_indices();

  while let Some((pos, ch)) = chars.next() {
    if ch != '{' {
      literal.push(ch);
      continue;
    }

    let mut key = String::new();
    let mut found_close = false;
    for (_, c) in chars.by_ref() {
      if c == '}' {
        found_close = true;
        break;
      }
      key.push(c);
    }

    if !found_close {
      return Err(RecipeError::Unclosed(pos));
    }
    if key.is_empty() {
      return Err(RecipeError::EmptyReference(pos));
    }

    if !literal.is_empty() {
      segments.push(Segment::Literal(std::mem::take(&mut literal)));
    }
    segments.push(Segment::Reference(key));
  }

  if !literal.is_empty() {
    segments.push(Segment::Literal(literal));
  }

  Ok(segments)
}

/// Expand every `{key}` in `input` against `props`, recursively.
///
/// # Errors
///
/// Returns an error if the template is malformed, a reference has no
/// matching property, or references nest deeper than [`MAX_EXPANSION_DEPTH`].
pub fn expand(input: &str, props: &PropertyMap) -> Result<String, RecipeError> {
  expand_at(input, props, 0)
}

fn expand_at(input: &str, props: &PropertyMap, depth: usize) -> Result<String, RecipeError> {
  let mut result = String::new();

  for segment in parse(input)? {
    match segment {
      Segment::Literal(s) => result.push_str(&s),
      Segment::Reference(key) => {
        if depth >= MAX_EXPANSION_DEPTH {
          return Err(RecipeError::TooDeep(key));
        }
        let value = props.get(&key).ok_or_else(|| RecipeError::Unresolved(key.clone()))?;
        result.push_str(&expand_at(value, props, depth + 1)?);
      }
    }
  }

  Ok(result)
}

/// Split a command line into words.
///
/// Words are separated by whitespace. Text inside `"` or `'` quotes is kept
/// verbatim (quotes removed), so `"a b"` is one word and `""` is an empty one.
pub fn split_command_line(line: &str) -> Result<Vec<String>, RecipeError> {
  let mut words = Vec::new();
  let mut current = String::new();
  let mut in_word = false;
  let mut quote: Option<char> = None;

  for ch in line.chars() {
    match quote {
      Some(q) if ch == q => quote = None,
      Some(_) => current.push(ch),
      None if ch == '"' || ch == '\'' => {
        quote = Some(ch);
        in_word = true;
      }
      None if ch.is_whitespace() => {
        if in_word {
          words.push(std::mem::take(&mut current));
          in_word = false;
        }
      }
      None => {
        current.push(ch);
        in_word = true;
      }
    }
  }

  if let Some(q) = quote {
    return Err(RecipeError::UnterminatedQuote(q));
  }
  if in_word {
    words.push(current);
  }

  Ok(words)
}

/// Render the named recipe into an executable command.
///
/// # Errors
///
/// Returns [`RecipeError::MissingRecipe`] when `recipe` is not set, and any
/// expansion or splitting error otherwise.
pub fn render(props: &PropertyMap, recipe: &str) -> Result<ToolCommand, RecipeError> {
  let pattern = props
    .get(recipe)
    .filter(|p| !p.trim().is_empty())
    .ok_or_else(|| RecipeError::MissingRecipe(recipe.to_string()))?;

  let line = expand(pattern, props)?;
  let mut words = split_command_line(&line)?.into_iter();

  let program = words.next().ok_or_else(|| RecipeError::EmptyCommand(recipe.to_string()))?;

  Ok(ToolCommand {
    program,
    args: words.collect(),
  })
}
