//! CLI commands for relgen
//!
//! - **tag**: generate the descriptor for one release
//! - **all**: generate every release after a starting version
//! - **list**: show in-scope releases and whether they are generated
//! - **index**: rebuild the index from what is on disk
//!
//! All commands accept `&RunContext` so configuration is loaded once.

pub mod all;
pub mod index;
pub mod list;
pub mod tag;

pub use all::run_all;
pub use index::run_index;
pub use list::run_list;
pub use tag::run_tag;

use crate::catalog::Discovery;
use crate::core::context::RunContext;
use crate::core::error::RelgenResult;
use crate::core::runner::CommandRunner;
use crate::core::vcs::UpstreamRepo;
use tracing::debug;

/// Bring the mirror up to date and parse its release tags
pub(crate) async fn discover_versions<R: CommandRunner>(
  ctx: &RunContext,
  repo: &UpstreamRepo<R>,
) -> RelgenResult<Discovery> {
  debug!(mirror = %repo.path().display(), "syncing upstream mirror");
  repo.sync().await?;
  let listing = repo.list_tags(&ctx.catalog.tag_glob()).await?;
  Ok(ctx.catalog.discover(listing.lines(), &ctx.legacy_rule()))
}
