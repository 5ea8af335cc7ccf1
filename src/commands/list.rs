use serde::Serialize;

use crate::catalog::{Version, select_range};
use crate::commands::discover_versions;
use crate::core::context::RunContext;
use crate::core::error::RelgenResult;
use crate::core::runner::ShellRunner;

/// One in-scope release
#[derive(Debug, Serialize)]
pub struct ReleaseEntry {
  pub tag: String,
  pub version: Version,
  /// rc, alpha or dev release
  pub prerelease: bool,
  /// A descriptor exists on disk
  pub generated: bool,
}

#[derive(Debug, Serialize)]
struct ListOutput {
  releases: Vec<ReleaseEntry>,
  /// Tags that did not parse
  malformed: Vec<String>,
}

/// Show releases known upstream, optionally only those after `start`
pub async fn run_list(ctx: &RunContext, start: Option<&str>, json: bool) -> RelgenResult<()> {
  let start = start.map(|s| ctx.catalog.parse_arg(s)).transpose()?;

  let repo = ctx.repo(ShellRunner)?;
  let discovery = discover_versions(ctx, &repo).await?;
  let versions = match &start {
    Some(start) => select_range(discovery.versions, start),
    None => discovery.versions,
  };

  let layout = ctx.layout();
  let releases: Vec<ReleaseEntry> = versions
    .into_iter()
    .map(|version| {
      let tag = ctx.catalog.tag_for(&version);
      ReleaseEntry {
        generated: layout.exists(&tag),
        prerelease: !version.is_final(),
        tag,
        version,
      }
    })
    .collect();

  if json {
    let output = ListOutput {
      releases,
      malformed: discovery.malformed,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    return Ok(());
  }

  let generated = releases.iter().filter(|r| r.generated).count();
  println!("📋 {} releases ({} generated)", releases.len(), generated);
  for release in &releases {
    let marker = if release.generated { "✅" } else { "⬜" };
    if release.prerelease {
      println!("  {} {} (pre-release)", marker, release.tag);
    } else {
      println!("  {} {}", marker, release.tag);
    }
  }
  if !discovery.malformed.is_empty() {
    println!();
    println!("⚠️  Unparseable tags: {}", discovery.malformed.len());
    for tag in &discovery.malformed {
      println!("  {}", tag);
    }
  }
  Ok(())
}
