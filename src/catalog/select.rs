//! Deciding which releases are in scope

use super::version::Version;
use std::collections::BTreeSet;

/// Tags from an era whose naming predates the version grammar.
///
/// A tag is legacy when it starts with `prefix + pattern` for any pattern,
/// so `["1.", "2.0."]` under `release_` covers every 1.x and 2.0.x tag.
#[derive(Debug, Clone)]
pub struct LegacyRule {
  starts: Vec<String>,
}

impl LegacyRule {
  pub fn new<I, S>(prefix: &str, patterns: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    Self {
      starts: patterns
        .into_iter()
        .map(|p| format!("{}{}", prefix, p.as_ref()))
        .collect(),
    }
  }

  pub fn matches(&self, tag: &str) -> bool {
    self.starts.iter().any(|start| tag.starts_with(start.as_str()))
  }
}

impl Default for LegacyRule {
  fn default() -> Self {
    Self::new("release_", ["1.", "2.0."])
  }
}

/// Drop tags matching `is_legacy`, preserving order
pub fn exclude_legacy<I, S, P>(tags: I, is_legacy: P) -> Vec<String>
where
  I: IntoIterator<Item = S>,
  S: AsRef<str>,
  P: Fn(&str) -> bool,
{
  tags
    .into_iter()
    .map(|tag| tag.as_ref().to_string())
    .filter(|tag| !is_legacy(tag))
    .collect()
}

/// Every version strictly above `lower_bound_exclusive`, ascending, without duplicates
pub fn select_range<I>(versions: I, lower_bound_exclusive: &Version) -> Vec<Version>
where
  I: IntoIterator<Item = Version>,
{
  versions
    .into_iter()
    .filter(|v| v > lower_bound_exclusive)
    .collect::<BTreeSet<_>>()
    .into_iter()
    .collect()
}
