//! Hand-curated dependency hashes that bypass prefetching
//!
//! Some git dependencies build only with a hash that differs from what the
//! prefetcher reports. Those known-good hashes live in a JSON object keyed
//! by `name-version` and always win over live computation.

use crate::core::error::{RelgenResult, ResultExt};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

/// Read-only `name-version -> hash` table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideTable {
  entries: BTreeMap<String, String>,
}

impl OverrideTable {
  /// Load from a JSON file. A missing file is an empty table; anything
  /// unreadable or not a string-to-string object is an error.
  pub fn load(path: &Path) -> RelgenResult<Self> {
    if !path.exists() {
      debug!(path = %path.display(), "no override table, continuing without overrides");
      return Ok(Self::default());
    }
    let content = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let table = Self::from_json(&content).with_context(|| format!("Invalid override table {}", path.display()))?;
    info!(path = %path.display(), entries = table.len(), "loaded hash overrides");
    Ok(table)
  }

  pub fn from_json(content: &str) -> RelgenResult<Self> {
    let entries: BTreeMap<String, String> = serde_json::from_str(content)?;
    Ok(Self { entries })
  }

  pub fn get(&self, key: &str) -> Option<&str> {
    self.entries.get(key).map(String::as_str)
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for OverrideTable {
  fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
    Self {
      entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
    }
  }
}
