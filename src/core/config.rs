use crate::core::error::{ConfigError, RelgenError, RelgenResult, ResultExt};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Configuration for relgen
/// Searched in order: relgen.toml, .relgen.toml, .config/relgen.toml
///
/// Every section is optional; an absent file means all defaults, which
/// target pantsbuild/pants and nixpkgs-style `default.nix` descriptors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelgenConfig {
  #[serde(default)]
  pub upstream: UpstreamConfig,
  #[serde(default)]
  pub output: OutputConfig,
  #[serde(default)]
  pub commands: CommandsConfig,
  #[serde(default)]
  pub pipeline: PipelineConfig,
}

/// Where releases come from
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
  /// Clone URL (or local path) of the upstream repository
  pub url: String,

  /// Bare mirror location (default: <cache dir>/relgen/<repo name>)
  pub cache_dir: Option<PathBuf>,

  /// Prefix shared by all release tags
  pub tag_prefix: String,

  /// Lock file path inside the upstream tree
  pub lock_file: String,

  /// Toolchain file path inside the upstream tree
  pub toolchain_file: String,

  /// Raw file URL with `{tag}` and `{path}` placeholders
  pub raw_url: String,

  /// Version prefixes (after `tag_prefix`) whose tags are never parsed
  pub legacy: Vec<String>,
}

impl Default for UpstreamConfig {
  fn default() -> Self {
    Self {
      url: "https://github.com/pantsbuild/pants.git".to_string(),
      cache_dir: None,
      tag_prefix: "release_".to_string(),
      lock_file: "src/rust/engine/Cargo.lock".to_string(),
      toolchain_file: "src/rust/engine/rust-toolchain".to_string(),
      raw_url: "https://raw.githubusercontent.com/pantsbuild/pants/{tag}/{path}".to_string(),
      legacy: vec!["1.".to_string(), "2.0.".to_string()],
    }
  }
}

impl UpstreamConfig {
  /// Repository name derived from the URL (`pants` for `.../pants.git`)
  pub fn repo_name(&self) -> String {
    let trimmed = self.url.trim_end_matches('/');
    let last = trimmed.rsplit(['/', ':']).next().unwrap_or(trimmed);
    let name = last.strip_suffix(".git").unwrap_or(last);
    if name.is_empty() { "upstream".to_string() } else { name.to_string() }
  }

  /// Resolved mirror location
  pub fn mirror_path(&self) -> RelgenResult<PathBuf> {
    if let Some(dir) = &self.cache_dir {
      return Ok(dir.clone());
    }
    let cache = dirs::cache_dir().ok_or_else(|| {
      RelgenError::with_help(
        "Could not determine a cache directory for the upstream mirror",
        "Set `upstream.cache_dir` in relgen.toml.",
      )
    })?;
    Ok(cache.join("relgen").join(self.repo_name()))
  }

  /// Raw URL of `path` at `tag`
  pub fn raw_file_url(&self, tag: &str, path: &str) -> String {
    self.raw_url.replace("{tag}", tag).replace("{path}", path)
  }
}

/// Where and how descriptors are written
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
  /// One subdirectory per tag lives here
  pub dir: PathBuf,

  /// Descriptor template
  pub template: PathBuf,

  /// Known-good dependency hashes (`{"name-version": "hash"}`)
  pub overrides: PathBuf,

  /// Descriptor file name inside each tag directory
  pub descriptor: String,

  /// Index file name inside `dir`
  pub index: String,
}

impl Default for OutputConfig {
  fn default() -> Self {
    Self {
      dir: PathBuf::from("tags"),
      template: PathBuf::from("template.nix"),
      overrides: PathBuf::from("output_hash_overrides.json"),
      descriptor: "default.nix".to_string(),
      index: "default.nix".to_string(),
    }
  }
}

/// External hashing commands
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandsConfig {
  /// Hashes an extracted source tree; `{path}` is replaced with the directory
  pub archive_hash: String,

  /// Prefetches a git dependency and prints JSON with a `hash` field
  pub prefetch: String,
}

impl Default for CommandsConfig {
  fn default() -> Self {
    Self {
      archive_hash: "nix-hash --type sha256 --base32 --sri {path}".to_string(),
      prefetch: "nix-prefetch-git {url} --rev {rev} --quiet".to_string(),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
  /// Maximum external commands in flight across the whole run
  pub concurrency: usize,
}

impl Default for PipelineConfig {
  fn default() -> Self {
    Self { concurrency: 50 }
  }
}

const CONFIG_CANDIDATES: [&str; 3] = ["relgen.toml", ".relgen.toml", ".config/relgen.toml"];

impl RelgenConfig {
  /// Load configuration from the first candidate found under `root`.
  /// Falls back to defaults when no file exists.
  pub fn load(root: &Path) -> RelgenResult<Self> {
    match Self::find_config_path(root) {
      Some(path) => Self::load_from(&path),
      None => {
        debug!(root = %root.display(), "no relgen.toml found, using defaults");
        Ok(Self::default())
      }
    }
  }

  /// Load configuration from an explicit file
  pub fn load_from(path: &Path) -> RelgenResult<Self> {
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let config: Self = toml_edit::de::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))?;
    config.validate()?;
    debug!(path = %path.display(), "loaded configuration");
    Ok(config)
  }

  /// Find config file in search order
  pub fn find_config_path(root: &Path) -> Option<PathBuf> {
    CONFIG_CANDIDATES
      .iter()
      .map(|candidate| root.join(candidate))
      .find(|path| path.is_file())
  }

  /// Reject values that would only fail later, mid-run
  pub fn validate(&self) -> RelgenResult<()> {
    if self.pipeline.concurrency == 0 {
      return Err(invalid("pipeline.concurrency", "must be at least 1"));
    }
    if self.upstream.tag_prefix.is_empty() {
      return Err(invalid("upstream.tag_prefix", "must not be empty"));
    }
    if self.upstream.url.trim().is_empty() {
      return Err(invalid("upstream.url", "must not be empty"));
    }
    for placeholder in ["{tag}", "{path}"] {
      if !self.upstream.raw_url.contains(placeholder) {
        return Err(invalid("upstream.raw_url", format!("missing {} placeholder", placeholder)));
      }
    }
    if !self.commands.archive_hash.contains("{path}") {
      return Err(invalid("commands.archive_hash", "missing {path} placeholder"));
    }
    for placeholder in ["{url}", "{rev}"] {
      if !self.commands.prefetch.contains(placeholder) {
        return Err(invalid("commands.prefetch", format!("missing {} placeholder", placeholder)));
      }
    }
    if self.output.descriptor.is_empty() || self.output.index.is_empty() {
      return Err(invalid("output.descriptor", "file names must not be empty"));
    }
    Ok(())
  }
}

fn invalid(field: &str, reason: impl Into<String>) -> RelgenError {
  RelgenError::Config(ConfigError::Invalid {
    field: field.to_string(),
    reason: reason.into(),
  })
}
