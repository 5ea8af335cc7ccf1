//! The rendered artifact for one release

use crate::catalog::Version;
use crate::pipeline::hashing::{HashTable, UnresolvedHash};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Template slot names
pub mod slot {
  pub const VERSION: &str = "version";
  /// Command line that regenerates the descriptor
  pub const ARGS: &str = "args";
  /// Hash of the release's source tree
  pub const HASH: &str = "hash";
  pub const RUST_VERSION: &str = "rust_version";
  pub const CARGO_LOCK_URL: &str = "cargo_lock_url";
  pub const RUST_TOOLCHAIN_URL: &str = "rust_toolchain_url";
  /// Rendered dependency-hash table
  pub const OUTPUT_HASHES: &str = "output_hashes";
}

/// One generated descriptor
#[derive(Debug, Clone)]
pub struct ReleaseDescriptor {
  pub tag: String,
  pub version: Version,
  /// `name-version -> hash`, sorted
  pub dependency_hashes: BTreeMap<String, String>,
  /// Git dependencies missing from `dependency_hashes`
  pub unresolved: Vec<UnresolvedHash>,
  pub path: PathBuf,
}

impl ReleaseDescriptor {
  /// False when some git dependency hash is missing
  pub fn is_complete(&self) -> bool {
    self.unresolved.is_empty()
  }
}

/// Values gathered for one version before rendering
#[derive(Debug, Clone)]
pub struct SlotValues {
  pub version: Version,
  pub provenance: String,
  pub archive_hash: String,
  pub rust_version: String,
  pub cargo_lock_url: String,
  pub rust_toolchain_url: String,
  pub hashes: HashTable,
}

impl SlotValues {
  pub fn to_map(&self) -> BTreeMap<String, String> {
    [
      (slot::VERSION, self.version.to_string()),
      (slot::ARGS, self.provenance.clone()),
      (slot::HASH, self.archive_hash.clone()),
      (slot::RUST_VERSION, self.rust_version.clone()),
      (slot::CARGO_LOCK_URL, self.cargo_lock_url.clone()),
      (slot::RUST_TOOLCHAIN_URL, self.rust_toolchain_url.clone()),
      (slot::OUTPUT_HASHES, self.hashes.render()),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
  }
}
