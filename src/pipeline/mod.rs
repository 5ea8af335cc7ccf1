//! Descriptor generation
//!
//! - **lockfile**: Cargo.lock parsing and git source classification
//! - **overrides**: known-good hashes that bypass prefetching
//! - **hashing**: concurrent dependency prefetch
//! - **template**: `$name` / `${name}` substitution
//! - **descriptor**: the rendered artifact and its slot values
//! - **state**: per-version lifecycle
//! - **output**: tag directories and the index
//! - **process**: per-version generation and fan-out
//! - **summary**: end-of-run report

pub mod descriptor;
pub mod hashing;
pub mod lockfile;
pub mod output;
pub mod overrides;
pub mod process;
pub mod state;
pub mod summary;
pub mod template;

pub use output::OutputLayout;
pub use overrides::OverrideTable;
pub use process::{ReleasePipeline, VersionOutcome};
pub use summary::RunSummary;
pub use template::DescriptorTemplate;
