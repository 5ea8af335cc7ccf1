//! Concurrent dependency hashing
//!
//! Git dependencies need a fixed-output hash in the descriptor. Each one is
//! resolved from the override table or by running the prefetch command; the
//! prefetches run concurrently, bounded only by the shared limiter.
//!
//! A dependency whose hash cannot be obtained is recorded as unresolved and
//! left out of the table. That never fails the version, but the descriptor
//! is flagged incomplete.

use crate::core::runner::{CommandRunner, LimitedRunner};
use crate::pipeline::lockfile::{DependencySource, SourceKind};
use crate::pipeline::overrides::OverrideTable;
use crate::utils::fill_command;
use std::collections::{BTreeMap, HashMap};
use tokio::task::{Id, JoinSet};
use tracing::{debug, warn};

/// A git dependency left without a hash
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedHash {
  /// `name-version`
  pub key: String,
  pub reason: String,
}

/// Resolved hashes, sorted by key, plus whatever could not be resolved
#[derive(Debug, Clone, Default)]
pub struct HashTable {
  pub entries: BTreeMap<String, String>,
  pub unresolved: Vec<UnresolvedHash>,
}

impl HashTable {
  pub fn is_complete(&self) -> bool {
    self.unresolved.is_empty()
  }

  /// One `"key" = "hash";` binding per line, indented for the template slot
  pub fn render(&self) -> String {
    self
      .entries
      .iter()
      .map(|(key, hash)| format!("\"{}\" = \"{}\";", key, hash))
      .collect::<Vec<_>>()
      .join("\n      ")
  }
}

/// Resolve hashes for every git dependency in `deps`.
///
/// Overrides are used as-is without invoking anything. Registry and local
/// dependencies are ignored.
pub async fn hash_dependencies<R: CommandRunner>(
  runner: &LimitedRunner<R>,
  prefetch_command: &str,
  deps: &[DependencySource],
  overrides: &OverrideTable,
) -> HashTable {
  let mut table = HashTable::default();
  let mut tasks = JoinSet::new();
  let mut keys: HashMap<Id, String> = HashMap::new();

  for dep in deps {
    let SourceKind::GitRepository { url, revision } = &dep.kind else {
      continue;
    };
    let key = dep.key();

    if let Some(hash) = overrides.get(&key) {
      debug!(%key, "using override hash");
      table.entries.insert(key, hash.to_string());
      continue;
    }

    let runner = runner.clone();
    let command = fill_command(prefetch_command, &[("url", url.as_str()), ("rev", revision.as_str())]);
    let handle = tasks.spawn(async move { prefetch(&runner, &command).await });
    keys.insert(handle.id(), key);
  }

  while let Some(joined) = tasks.join_next_with_id().await {
    let (id, result) = match joined {
      Ok((id, result)) => (id, result),
      Err(err) => (err.id(), Err(format!("prefetch task aborted: {}", err))),
    };
    let Some(key) = keys.remove(&id) else {
      continue;
    };
    match result {
      Ok(hash) => {
        table.entries.insert(key, hash);
      }
      Err(reason) => {
        warn!(%key, "dependency hash unresolved: {}", reason);
        table.unresolved.push(UnresolvedHash { key, reason });
      }
    }
  }

  table.unresolved.sort_by(|a, b| a.key.cmp(&b.key));
  table
}

/// Run one prefetch and pull the `hash` field out of its JSON output
async fn prefetch<R: CommandRunner>(runner: &LimitedRunner<R>, command: &str) -> Result<String, String> {
  let output = runner.run(command).await.map_err(|e| e.to_string())?;
  if !output.success() {
    let stderr = output.stderr_lossy();
    warn!(command, status = ?output.status, "prefetch failed, stderr:\n{}", stderr);
    return Err(match output.status {
      Some(code) => format!("prefetch exited with {}", code),
      None => "prefetch killed by signal".to_string(),
    });
  }
  extract_hash(&output.stdout_lossy())
}

fn extract_hash(stdout: &str) -> Result<String, String> {
  let value: serde_json::Value =
    serde_json::from_str(stdout.trim()).map_err(|e| format!("prefetch output is not JSON: {}", e))?;
  match value.get("hash").and_then(serde_json::Value::as_str) {
    Some(hash) if !hash.is_empty() => Ok(hash.to_string()),
    _ => Err("prefetch output has no `hash` field".to_string()),
  }
}
