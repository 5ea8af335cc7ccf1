//! Version discovery and ordering
//!
//! Turns the raw output of a tag listing into an ordered, filtered sequence
//! of [`Version`]s. Nothing in here performs I/O.
//!
//! - **version**: the `Version` value type and its total order
//! - **select**: range selection and legacy-tag exclusion

pub mod select;
pub mod version;

pub use select::{LegacyRule, exclude_legacy, select_range};
pub use version::{Qualifier, Version, compare_versions};

use crate::core::error::{RelgenError, RelgenResult};
use tracing::warn;

/// Parses and formats tags that share one prefix (e.g. `release_`)
#[derive(Debug, Clone)]
pub struct VersionCatalog {
  prefix: String,
}

/// Result of a tag-listing pass
#[derive(Debug, Default)]
pub struct Discovery {
  /// Parsed versions, ascending
  pub versions: Vec<Version>,
  /// Tags that survived legacy exclusion but did not parse
  pub malformed: Vec<String>,
}

impl VersionCatalog {
  pub fn new(prefix: impl Into<String>) -> Self {
    Self { prefix: prefix.into() }
  }

  pub fn prefix(&self) -> &str {
    &self.prefix
  }

  /// Parse a full tag such as `release_2.19.0rc2`
  pub fn parse(&self, tag: &str) -> RelgenResult<Version> {
    tag
      .strip_prefix(self.prefix.as_str())
      .and_then(version::parse_unprefixed)
      .ok_or_else(|| RelgenError::malformed_tag(tag))
  }

  /// Parse a command-line argument, with or without the tag prefix
  pub fn parse_arg(&self, arg: &str) -> RelgenResult<Version> {
    if arg.starts_with(self.prefix.as_str()) {
      self.parse(arg)
    } else {
      arg.parse()
    }
  }

  /// Inverse of [`VersionCatalog::parse`]
  pub fn tag_for(&self, version: &Version) -> String {
    format!("{}{}", self.prefix, version)
  }

  /// Glob passed to `git tag --list`
  pub fn tag_glob(&self) -> String {
    format!("{}*", self.prefix)
  }

  /// Parse a tag listing, one tag per line.
  ///
  /// Legacy tags are dropped before parsing. Tags that still fail to parse
  /// are reported and skipped; they never abort the listing.
  pub fn discover<'a, I>(&self, lines: I, legacy: &LegacyRule) -> Discovery
  where
    I: IntoIterator<Item = &'a str>,
  {
    let lines = lines.into_iter().map(str::trim).filter(|line| !line.is_empty());
    let tags = exclude_legacy(lines, |tag| legacy.matches(tag));

    let mut discovery = Discovery::default();
    for tag in tags {
      match self.parse(&tag) {
        Ok(version) => discovery.versions.push(version),
        Err(err) => {
          warn!(%tag, "skipping tag: {}", err);
          discovery.malformed.push(tag);
        }
      }
    }
    discovery.versions.sort_by(compare_versions);
    discovery.versions.dedup();
    discovery
  }
}

impl Default for VersionCatalog {
  fn default() -> Self {
    Self::new("release_")
  }
}
