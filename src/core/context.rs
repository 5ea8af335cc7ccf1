//! Run context - build once, pass everywhere
//!
//! ```text
//! main.rs:
//!   RunContext::build() -> &RunContext
//!   |
//!   v
//! commands/tag.rs, all.rs, list.rs, index.rs:
//!   fn run_*(ctx: &RunContext, ...)
//! ```
//!
//! Generating commands ask the context for a [`ReleasePipeline`]; that is
//! where the template and override table get loaded, so a broken one fails
//! the run before any version is touched.

use crate::catalog::{LegacyRule, VersionCatalog};
use crate::core::config::RelgenConfig;
use crate::core::error::RelgenResult;
use crate::core::runner::{CommandRunner, LimitedRunner};
use crate::core::vcs::UpstreamRepo;
use crate::pipeline::{DescriptorTemplate, OutputLayout, OverrideTable, ReleasePipeline};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Shared run-level state
#[derive(Clone)]
pub struct RunContext {
  /// Base for relative paths in the config
  pub root: PathBuf,

  /// relgen.toml, or defaults
  pub config: Arc<RelgenConfig>,

  /// Tag parsing for the configured prefix
  pub catalog: VersionCatalog,
}

impl RunContext {
  /// Load configuration from `config_path`, or search `cwd` for it.
  ///
  /// With an explicit file, relative paths resolve against its directory.
  pub fn build(cwd: &Path, config_path: Option<&Path>) -> RelgenResult<Self> {
    let (root, config) = match config_path {
      Some(path) => {
        let path = cwd.join(path);
        let config = RelgenConfig::load_from(&path)?;
        let root = path.parent().map(Path::to_path_buf).unwrap_or_else(|| cwd.to_path_buf());
        (root, config)
      }
      None => (cwd.to_path_buf(), RelgenConfig::load(cwd)?),
    };

    let catalog = VersionCatalog::new(config.upstream.tag_prefix.as_str());
    debug!(root = %root.display(), prefix = catalog.prefix(), "built run context");
    Ok(Self {
      root,
      config: Arc::new(config),
      catalog,
    })
  }

  /// Resolve a config path against the root; absolute paths pass through
  pub fn resolve(&self, path: &Path) -> PathBuf {
    self.root.join(path)
  }

  pub fn legacy_rule(&self) -> LegacyRule {
    LegacyRule::new(&self.config.upstream.tag_prefix, &self.config.upstream.legacy)
  }

  pub fn layout(&self) -> OutputLayout {
    let output = &self.config.output;
    OutputLayout::new(
      self.resolve(&output.dir),
      &output.descriptor,
      &output.index,
      &self.config.upstream.lock_file,
    )
  }

  /// Mirror handle whose commands share the configured concurrency cap
  pub fn repo<R: CommandRunner>(&self, runner: R) -> RelgenResult<UpstreamRepo<R>> {
    let mirror = self.resolve(&self.config.upstream.mirror_path()?);
    let runner = LimitedRunner::new(runner, self.config.pipeline.concurrency);
    Ok(UpstreamRepo::new(self.config.upstream.url.clone(), mirror, runner))
  }

  /// Load the template and overrides and assemble the pipeline
  pub fn pipeline<R: CommandRunner>(&self, repo: UpstreamRepo<R>, program: &str) -> RelgenResult<ReleasePipeline<R>> {
    let template = DescriptorTemplate::load(&self.resolve(&self.config.output.template))?;
    debug!(slots = ?template.slots(), "loaded template");
    let overrides = OverrideTable::load(&self.resolve(&self.config.output.overrides))?;
    if overrides.is_empty() {
      debug!("no hash overrides, every git dependency will be prefetched");
    }

    Ok(ReleasePipeline::new(
      repo,
      self.config.upstream.clone(),
      self.config.commands.clone(),
      Arc::new(template),
      Arc::new(overrides),
      self.layout(),
      program,
    ))
  }
}
