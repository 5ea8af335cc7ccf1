//! Cargo.lock parsing into hashable dependency sources

use crate::core::error::{RelgenResult, ResultExt};
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use tracing::warn;

/// `git+<scheme>://<host>/<path>[?query][#fragment]`
static GIT_SOURCE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^git\+(?P<url>(?:https?|ssh|git)://[^/?#\s]+/[^?#\s]+)(?:\?(?P<query>[^#\s]*))?(?:#(?P<fragment>\S*))?$")
    .expect("git source pattern is valid")
});

/// Revision used when a git source pins nothing
pub const DEFAULT_REVISION: &str = "HEAD";

/// Where a locked package comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
  /// crates.io or another registry; hashed by the registry itself
  Registry,
  /// A git repository at a revision
  GitRepository { url: String, revision: String },
  /// Workspace member or path dependency (no `source` key)
  Local,
}

/// One locked package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencySource {
  pub name: String,
  pub version: String,
  pub kind: SourceKind,
}

impl DependencySource {
  /// `name-version`, the key used by the override and hash tables
  pub fn key(&self) -> String {
    format!("{}-{}", self.name, self.version)
  }
}

#[derive(Debug, Deserialize)]
struct LockFile {
  #[serde(default)]
  package: Vec<LockedPackage>,
}

#[derive(Debug, Deserialize)]
struct LockedPackage {
  name: String,
  version: String,
  #[serde(default)]
  source: Option<String>,
}

/// Parse a lock file, deduplicated by `(name, version)` and ordered by that pair.
///
/// Sources that cannot be classified are logged and dropped; they never fail
/// the whole lock file.
pub fn parse_lock_file(content: &str) -> RelgenResult<Vec<DependencySource>> {
  let lock: LockFile = toml_edit::de::from_str(content).context("Failed to parse lock file")?;

  let mut unique: BTreeMap<(String, String), DependencySource> = BTreeMap::new();
  for package in lock.package {
    let kind = match package.source.as_deref() {
      None => SourceKind::Local,
      Some(source) => match classify_source(source) {
        Some(kind) => kind,
        None => {
          warn!(
            package = %package.name,
            version = %package.version,
            source,
            "skipping dependency with unrecognized source"
          );
          continue;
        }
      },
    };

    unique
      .entry((package.name.clone(), package.version.clone()))
      .or_insert(DependencySource {
        name: package.name,
        version: package.version,
        kind,
      });
  }

  Ok(unique.into_values().collect())
}

/// Classify a `source` value; `None` when it matches no known grammar
pub fn classify_source(source: &str) -> Option<SourceKind> {
  if source.starts_with("registry+") || source.starts_with("sparse+") {
    return Some(SourceKind::Registry);
  }
  if source.starts_with("git+") {
    return parse_git_source(source);
  }
  None
}

/// Parse `git+<url>[?rev=<rev>][#<rev>]`.
///
/// Revision precedence: `rev=` query parameter, then the fragment (the
/// locked commit), then `HEAD`. Other query keys are ignored.
pub fn parse_git_source(source: &str) -> Option<SourceKind> {
  let caps = GIT_SOURCE.captures(source)?;
  let url = caps.name("url")?.as_str().to_string();

  let from_query = caps.name("query").and_then(|query| {
    query
      .as_str()
      .split('&')
      .find_map(|pair| pair.strip_prefix("rev="))
      .filter(|rev| !rev.is_empty())
  });
  let from_fragment = caps.name("fragment").map(|m| m.as_str()).filter(|rev| !rev.is_empty());

  let revision = from_query.or(from_fragment).unwrap_or(DEFAULT_REVISION).to_string();
  Some(SourceKind::GitRepository { url, revision })
}
