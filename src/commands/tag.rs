use crate::core::context::RunContext;
use crate::core::error::RelgenResult;
use crate::core::runner::ShellRunner;
use crate::pipeline::RunSummary;

/// Generate the descriptor for a single release, then refresh the index.
///
/// A failed version is returned as-is so its own help text and exit code
/// reach the user.
pub async fn run_tag(ctx: &RunContext, program: &str, version: &str, force: bool, json: bool) -> RelgenResult<()> {
  let version = ctx.catalog.parse_arg(version)?;
  let tag = ctx.catalog.tag_for(&version);

  let pipeline = ctx.pipeline(ctx.repo(ShellRunner)?, program)?;

  // Skipping needs no upstream access at all
  if force || !pipeline.layout().exists(&tag) {
    pipeline.repo().sync().await?;
  }

  let result = pipeline.process_version(&version, force).await;
  let results = vec![(version, result)];
  pipeline.layout().write_index(&ctx.catalog)?;

  let summary = RunSummary::from_results(&results, &ctx.catalog);
  summary.print(json)?;

  match results.into_iter().next() {
    Some((_, Err(err))) => Err(err),
    _ => Ok(()),
  }
}
