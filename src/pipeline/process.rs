//! Per-version generation and the bulk fan-out
//!
//! ```text
//! process_all
//!   |-- process_version(v1) --+-- read lock + toolchain  (git show)
//!   |-- process_version(v2)   |-- hash deps + archive    (concurrent)
//!   `-- ...                   `-- render + write
//! ```
//!
//! Every external command from every task goes through the one
//! [`LimitedRunner`] held by the mirror.

use crate::catalog::{Version, VersionCatalog};
use crate::core::config::{CommandsConfig, UpstreamConfig};
use crate::core::error::{RelgenError, RelgenResult};
use crate::core::runner::CommandRunner;
use crate::core::vcs::UpstreamRepo;
use crate::pipeline::descriptor::{ReleaseDescriptor, SlotValues};
use crate::pipeline::hashing::hash_dependencies;
use crate::pipeline::lockfile::parse_lock_file;
use crate::pipeline::output::OutputLayout;
use crate::pipeline::overrides::OverrideTable;
use crate::pipeline::state::{TaskState, VersionTask};
use crate::pipeline::template::DescriptorTemplate;
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{error, info};

/// What happened to one version
#[derive(Debug, Clone)]
pub enum VersionOutcome {
  Generated(ReleaseDescriptor),
  /// Descriptor already on disk and `force` was not set
  Skipped { tag: String, path: PathBuf },
}

/// Generates descriptors; build once per run and share through `Arc`
pub struct ReleasePipeline<R> {
  repo: UpstreamRepo<R>,
  upstream: UpstreamConfig,
  commands: CommandsConfig,
  template: Arc<DescriptorTemplate>,
  overrides: Arc<OverrideTable>,
  catalog: VersionCatalog,
  layout: OutputLayout,
  /// argv[0], recorded in the `args` slot
  program: String,
}

impl<R: CommandRunner> ReleasePipeline<R> {
  pub fn new(
    repo: UpstreamRepo<R>,
    upstream: UpstreamConfig,
    commands: CommandsConfig,
    template: Arc<DescriptorTemplate>,
    overrides: Arc<OverrideTable>,
    layout: OutputLayout,
    program: impl Into<String>,
  ) -> Self {
    let catalog = VersionCatalog::new(upstream.tag_prefix.as_str());
    Self {
      repo,
      upstream,
      commands,
      template,
      overrides,
      catalog,
      layout,
      program: program.into(),
    }
  }

  pub fn repo(&self) -> &UpstreamRepo<R> {
    &self.repo
  }

  pub fn layout(&self) -> &OutputLayout {
    &self.layout
  }

  /// Generate the descriptor for one version.
  ///
  /// An existing descriptor short-circuits to `Skipped` without any
  /// external call unless `force` is set. Nothing is written on failure.
  pub async fn process_version(&self, version: &Version, force: bool) -> RelgenResult<VersionOutcome> {
    let tag = self.catalog.tag_for(version);
    if !force && self.layout.exists(&tag) {
      info!(%tag, "descriptor exists, skipping");
      return Ok(VersionOutcome::Skipped {
        path: self.layout.descriptor_path(&tag),
        tag,
      });
    }

    let mut task = VersionTask::new(tag.as_str());
    match self.generate(&mut task, version, &tag).await {
      Ok(descriptor) => Ok(VersionOutcome::Generated(descriptor)),
      Err(err) => {
        error!(%tag, phase = %task.state(), "generation failed: {}", err);
        task.fail();
        Err(err)
      }
    }
  }

  async fn generate(&self, task: &mut VersionTask, version: &Version, tag: &str) -> RelgenResult<ReleaseDescriptor> {
    task.advance(TaskState::FetchingMetadata)?;
    info!(%tag, "fetching metadata");
    let (lock_content, toolchain) = tokio::try_join!(
      self.repo.read_file(tag, &self.upstream.lock_file),
      self.repo.read_file(tag, &self.upstream.toolchain_file),
    )?;
    let rust_version = parse_toolchain_channel(&toolchain).ok_or_else(|| {
      RelgenError::message(format!("no toolchain channel in {}", self.upstream.toolchain_file))
    })?;
    let deps = parse_lock_file(&lock_content)?;

    task.advance(TaskState::HashingDependencies)?;
    info!(%tag, dependencies = deps.len(), "hashing");
    let (hashes, archive_hash) = tokio::join!(
      hash_dependencies(self.repo.runner(), &self.commands.prefetch, &deps, &self.overrides),
      self.repo.archive_hash(tag, &self.commands.archive_hash),
    );
    let archive_hash = archive_hash?;
    if archive_hash.is_empty() {
      return Err(RelgenError::message("archive hash command printed nothing"));
    }

    task.advance(TaskState::Rendering)?;
    let values = SlotValues {
      version: *version,
      provenance: format!("{} tag {}", self.program, version),
      archive_hash,
      rust_version,
      cargo_lock_url: self.upstream.raw_file_url(tag, &self.upstream.lock_file),
      rust_toolchain_url: self.upstream.raw_file_url(tag, &self.upstream.toolchain_file),
      hashes,
    };
    let rendered = self.template.render(&values.to_map())?;
    let path = self.layout.write(tag, &rendered, &lock_content)?;

    task.advance(TaskState::Completed)?;
    info!(%tag, path = %path.display(), complete = values.hashes.is_complete(), "generated");
    Ok(ReleaseDescriptor {
      tag: tag.to_string(),
      version: *version,
      dependency_hashes: values.hashes.entries,
      unresolved: values.hashes.unresolved,
      path,
    })
  }

  /// Process every version concurrently.
  ///
  /// Results come back in input order. One version failing (or its task
  /// panicking) affects only its own entry. `on_finished` is called as
  /// each version completes, in completion order.
  pub async fn process_all<F>(
    self: &Arc<Self>,
    versions: &[Version],
    force: bool,
    mut on_finished: F,
  ) -> Vec<(Version, RelgenResult<VersionOutcome>)>
  where
    F: FnMut(&Version, &RelgenResult<VersionOutcome>),
  {
    info!(
      versions = versions.len(),
      limit = self.repo.runner().capacity(),
      "processing versions"
    );
    let mut tasks = JoinSet::new();
    for (index, version) in versions.iter().copied().enumerate() {
      let pipeline = Arc::clone(self);
      tasks.spawn(async move {
        let result = pipeline.process_version(&version, force).await;
        (index, result)
      });
    }

    let mut slots: Vec<Option<RelgenResult<VersionOutcome>>> = versions.iter().map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
      match joined {
        Ok((index, result)) => {
          on_finished(&versions[index], &result);
          slots[index] = Some(result);
        }
        Err(err) => error!("version task aborted: {}", err),
      }
    }

    versions
      .iter()
      .copied()
      .zip(slots)
      .map(|(version, slot)| {
        let result = slot.unwrap_or_else(|| {
          Err(RelgenError::message("task aborted before finishing"))
        });
        (version, result)
      })
      .collect()
  }
}

#[derive(Deserialize)]
struct ToolchainFile {
  toolchain: Option<ToolchainSection>,
}

#[derive(Deserialize)]
struct ToolchainSection {
  channel: Option<String>,
}

/// Channel from a `rust-toolchain` file.
///
/// Reads `[toolchain] channel`; older files holding only a bare channel
/// name fall back to that single trimmed line.
pub fn parse_toolchain_channel(content: &str) -> Option<String> {
  if let Ok(file) = toml_edit::de::from_str::<ToolchainFile>(content) {
    return file
      .toolchain
      .and_then(|section| section.channel)
      .map(|channel| channel.trim().to_string())
      .filter(|channel| !channel.is_empty());
  }

  let mut lines = content.lines().map(str::trim).filter(|line| !line.is_empty());
  match (lines.next(), lines.next()) {
    (Some(line), None) if !line.contains(['=', '[', ']']) => Some(line.to_string()),
    _ => None,
  }
}
