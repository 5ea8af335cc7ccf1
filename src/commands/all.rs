use std::io::{self, Write};
use std::sync::Arc;

use crate::catalog::select_range;
use crate::commands::discover_versions;
use crate::core::context::RunContext;
use crate::core::error::{RelgenError, RelgenResult};
use crate::core::runner::ShellRunner;
use crate::pipeline::RunSummary;
use crate::ui::progress::RunProgress;

/// Ask before launching; only `y`/`yes` proceeds
fn prompt_for_confirmation(message: &str) -> RelgenResult<bool> {
  print!("\n{} [y/n] ", message);
  io::stdout().flush()?;

  let mut input = String::new();
  io::stdin().read_line(&mut input)?;
  Ok(matches!(input.trim().to_lowercase().as_str(), "y" | "yes"))
}

/// Generate every release strictly after `start`
pub async fn run_all(
  ctx: &RunContext,
  program: &str,
  start: &str,
  force: bool,
  yes: bool,
  json: bool,
) -> RelgenResult<()> {
  let start = ctx.catalog.parse_arg(start)?;
  let start_tag = ctx.catalog.tag_for(&start);

  let pipeline = Arc::new(ctx.pipeline(ctx.repo(ShellRunner)?, program)?);
  let discovery = discover_versions(ctx, pipeline.repo()).await?;
  let versions = select_range(discovery.versions, &start);

  if versions.is_empty() {
    if json {
      RunSummary::from_results(&[], &ctx.catalog).print(true)?;
    } else {
      println!("✅ No releases after {}", start_tag);
    }
    return Ok(());
  }

  if !json {
    println!("📦 {} releases after {}:", versions.len(), start_tag);
    for version in &versions {
      let tag = ctx.catalog.tag_for(version);
      let marker = if pipeline.layout().exists(&tag) && !force { "⏭ " } else { "🔨" };
      println!("  {} {}", marker, tag);
    }
  }

  if !yes && !prompt_for_confirmation("Continue?")? {
    println!("Aborted, nothing generated");
    return Ok(());
  }

  let mut progress = RunProgress::maybe(versions.len(), "Generating", !json);
  let results = pipeline
    .process_all(&versions, force, |_, _| {
      if let Some(progress) = progress.as_mut() {
        progress.inc();
      }
    })
    .await;

  pipeline.layout().write_index(&ctx.catalog)?;

  let summary = RunSummary::from_results(&results, &ctx.catalog);
  if !json {
    println!();
  }
  summary.print(json)?;

  if summary.has_failures() {
    return Err(RelgenError::with_help(
      format!("{} of {} releases failed", summary.failed.len(), summary.total()),
      "Re-run the same command to retry; generated releases are skipped.",
    ));
  }
  Ok(())
}
