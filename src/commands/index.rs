use crate::core::context::RunContext;
use crate::core::error::RelgenResult;

/// Rewrite the index from the tag directories on disk
pub fn run_index(ctx: &RunContext) -> RelgenResult<()> {
  let layout = ctx.layout();
  let count = layout.write_index(&ctx.catalog)?;
  println!("✅ Wrote {} ({} releases)", layout.index_path().display(), count);
  Ok(())
}
