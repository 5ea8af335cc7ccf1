//! Upstream mirror driven through system git
//!
//! The mirror is a bare clone: nothing is ever checked out, so concurrent
//! tasks read `tag:path` snapshots straight from the object store and never
//! contend on a shared working tree.

use crate::core::error::{ConfigError, RelgenError, RelgenResult, ResultExt};
use crate::core::runner::{CommandRunner, LimitedRunner};
use crate::utils::{fill_command, shell_quote, shell_quote_path};
use std::path::{Path, PathBuf};
use tracing::info;

/// What an existing cache path turned out to be
#[derive(Debug, PartialEq, Eq)]
enum CacheState {
  /// Bare repository rooted at the cache path
  Mirror,
  /// Non-bare repository rooted at the cache path
  Checkout,
  /// Anything else; never touched
  Foreign,
}

/// Bare mirror of the upstream repository
pub struct UpstreamRepo<R> {
  /// Clone URL or local path
  url: String,

  /// Bare repository location
  path: PathBuf,

  /// Shared, rate-limited runner
  runner: LimitedRunner<R>,
}

impl<R: CommandRunner> UpstreamRepo<R> {
  pub fn new(url: impl Into<String>, path: impl Into<PathBuf>, runner: LimitedRunner<R>) -> Self {
    Self {
      url: url.into(),
      path: path.into(),
      runner,
    }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  pub fn runner(&self) -> &LimitedRunner<R> {
    &self.runner
  }

  /// Make the mirror current: replace a leftover checkout, clone if absent, fetch tags
  pub async fn sync(&self) -> RelgenResult<()> {
    if self.path.exists() {
      match self.inspect().await? {
        CacheState::Mirror => {}
        CacheState::Checkout => {
          info!(path = %self.path.display(), "cached repository is not a bare mirror, removing");
          std::fs::remove_dir_all(&self.path)
            .with_context(|| format!("Failed to remove stale mirror {}", self.path.display()))?;
        }
        CacheState::Foreign => {
          return Err(RelgenError::Config(ConfigError::Invalid {
            field: "upstream.cache_dir".to_string(),
            reason: format!("{} exists but is not a git repository of its own", self.path.display()),
          }));
        }
      }
    }

    if !self.path.exists() {
      if let Some(parent) = self.path.parent() {
        std::fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
      }
      info!(url = %self.url, path = %self.path.display(), "cloning bare mirror");
      let clone = format!(
        "git clone --bare --quiet {} {}",
        shell_quote(&self.url),
        shell_quote_path(&self.path)
      );
      self.runner.run_checked(&clone).await?;
    }

    info!(url = %self.url, "fetching tags");
    self
      .runner
      .run_checked(&self.git(&["fetch", "--quiet", "--tags", "--force", "origin"]))
      .await?;
    Ok(())
  }

  /// Tags matching a glob, one per line, as git prints them
  pub async fn list_tags(&self, glob: &str) -> RelgenResult<String> {
    let output = self.runner.run_checked(&self.git(&["tag", "--list", glob])).await?;
    Ok(output.stdout_lossy())
  }

  /// Content of `path` at `tag` (`git show tag:path`)
  pub async fn read_file(&self, tag: &str, path: &str) -> RelgenResult<String> {
    let spec = format!("{}:{}", tag, path);
    let output = self.runner.run_checked(&self.git(&["show", spec.as_str()])).await?;
    String::from_utf8(output.stdout).with_context(|| format!("{} is not UTF-8", spec))
  }

  /// Content hash of the source tree at `tag`.
  ///
  /// Archives the tag into a private scratch directory, extracts it, and
  /// runs `hash_command` (with `{path}`) over the extracted tree.
  pub async fn archive_hash(&self, tag: &str, hash_command: &str) -> RelgenResult<String> {
    let scratch = tempfile::Builder::new()
      .prefix("relgen-archive-")
      .tempdir()
      .context("Failed to create scratch directory")?;
    let archive = scratch.path().join("archive.tar.gz");
    let tree = scratch.path().join("source");
    std::fs::create_dir(&tree).with_context(|| format!("Failed to create {}", tree.display()))?;

    let archive_arg = archive.to_string_lossy().into_owned();
    self
      .runner
      .run_checked(&self.git(&["archive", "--format=tar.gz", "-o", archive_arg.as_str(), tag]))
      .await?;
    self
      .runner
      .run_checked(&format!(
        "tar -xzf {} -C {}",
        shell_quote_path(&archive),
        shell_quote_path(&tree)
      ))
      .await?;

    let tree_arg = tree.to_string_lossy().into_owned();
    let output = self
      .runner
      .run_checked(&fill_command(hash_command, &[("path", tree_arg.as_str())]))
      .await?;
    Ok(output.stdout_lossy().trim().to_string())
  }

  /// What the existing cache path holds.
  ///
  /// git answers for the nearest enclosing repository, so the reported git
  /// directory must be the cache path itself (bare) or its `.git` (checkout).
  async fn inspect(&self) -> RelgenResult<CacheState> {
    let command = self.git(&["rev-parse", "--is-bare-repository", "--absolute-git-dir"]);
    let output = self.runner.run(&command).await?.into_success(&command)?;
    let stdout = output.stdout_lossy();
    let mut lines = stdout.lines().map(str::trim);
    let (Some(bare), Some(git_dir)) = (lines.next(), lines.next()) else {
      return Ok(CacheState::Foreign);
    };

    let own = std::fs::canonicalize(&self.path).with_context(|| format!("Failed to resolve {}", self.path.display()))?;
    let git_dir = Path::new(git_dir);
    Ok(match bare {
      "true" if git_dir == own => CacheState::Mirror,
      "false" if git_dir == own.join(".git") => CacheState::Checkout,
      _ => CacheState::Foreign,
    })
  }

  /// `git -C <mirror> <args...>` with every argument quoted
  fn git(&self, args: &[&str]) -> String {
    let mut line = format!("git -C {}", shell_quote_path(&self.path));
    for arg in args {
      line.push(' ');
      line.push_str(&shell_quote(arg));
    }
    line
  }
}
