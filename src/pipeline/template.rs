//! Descriptor templates
//!
//! Placeholders are `$name` or `${name}`, where a name is an ASCII letter or
//! underscore followed by letters, digits or underscores. `$$` is a literal
//! `$`. A `$` followed by anything else is kept as-is.
//!
//! Rendering is all-or-nothing: if any placeholder has no value, nothing is
//! produced and every missing name is reported.

use crate::core::error::{ConfigError, RelgenError, RelgenResult, RenderError};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// A loaded template
#[derive(Debug, Clone)]
pub struct DescriptorTemplate {
  source: String,
}

enum Piece<'a> {
  Text(&'a str),
  Slot(&'a str),
}

impl DescriptorTemplate {
  pub fn new(source: impl Into<String>) -> Self {
    Self { source: source.into() }
  }

  /// Read the template; a missing file is a configuration error
  pub fn load(path: &Path) -> RelgenResult<Self> {
    if !path.is_file() {
      return Err(RelgenError::Config(ConfigError::TemplateMissing {
        path: path.to_path_buf(),
      }));
    }
    Ok(Self::new(std::fs::read_to_string(path)?))
  }

  /// Placeholder names the template refers to
  pub fn slots(&self) -> BTreeSet<&str> {
    pieces(&self.source)
      .into_iter()
      .filter_map(|piece| match piece {
        Piece::Slot(name) => Some(name),
        Piece::Text(_) => None,
      })
      .collect()
  }

  /// Substitute every placeholder; fails listing all unresolved names
  pub fn render(&self, values: &BTreeMap<String, String>) -> RelgenResult<String> {
    let mut out = String::with_capacity(self.source.len());
    let mut missing = BTreeSet::new();

    for piece in pieces(&self.source) {
      match piece {
        Piece::Text(text) => out.push_str(text),
        Piece::Slot(name) => match values.get(name) {
          Some(value) => out.push_str(value),
          None => {
            missing.insert(name.to_string());
          }
        },
      }
    }

    if !missing.is_empty() {
      return Err(RelgenError::Render(RenderError::Unresolved {
        slots: missing.into_iter().collect(),
      }));
    }
    Ok(out)
  }
}

fn is_name_start(b: u8) -> bool {
  b.is_ascii_alphabetic() || b == b'_'
}

fn is_name_continue(b: u8) -> bool {
  b.is_ascii_alphanumeric() || b == b'_'
}

/// Split a template into literal text and placeholder names
fn pieces(source: &str) -> Vec<Piece<'_>> {
  let bytes = source.as_bytes();
  let mut pieces = Vec::new();
  let mut text_start = 0;
  let mut i = 0;

  while i < bytes.len() {
    if bytes[i] != b'$' {
      i += 1;
      continue;
    }

    let next = bytes.get(i + 1).copied();
    match next {
      Some(b'$') => {
        // keep the first `$`, drop the second
        pieces.push(Piece::Text(&source[text_start..i + 1]));
        i += 2;
        text_start = i;
      }
      Some(b'{') => {
        let name_start = i + 2;
        let name_end = bytes[name_start..]
          .iter()
          .position(|&b| !is_name_continue(b))
          .map(|n| name_start + n)
          .unwrap_or(bytes.len());
        let closed = bytes.get(name_end) == Some(&b'}');
        if closed && name_end > name_start && is_name_start(bytes[name_start]) {
          pieces.push(Piece::Text(&source[text_start..i]));
          pieces.push(Piece::Slot(&source[name_start..name_end]));
          i = name_end + 1;
          text_start = i;
        } else {
          i += 1;
        }
      }
      Some(b) if is_name_start(b) => {
        let name_start = i + 1;
        let name_end = bytes[name_start..]
          .iter()
          .position(|&b| !is_name_continue(b))
          .map(|n| name_start + n)
          .unwrap_or(bytes.len());
        pieces.push(Piece::Text(&source[text_start..i]));
        pieces.push(Piece::Slot(&source[name_start..name_end]));
        i = name_end;
        text_start = i;
      }
      _ => i += 1,
    }
  }

  pieces.push(Piece::Text(&source[text_start..]));
  pieces
}
