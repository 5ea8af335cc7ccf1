//! Per-version task lifecycle

use crate::core::error::{RelgenError, RelgenResult};
use std::fmt;
use tracing::debug;

/// Where a version's processing is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
  Pending,
  FetchingMetadata,
  HashingDependencies,
  Rendering,
  Completed,
  Failed,
}

impl TaskState {
  pub fn is_terminal(self) -> bool {
    matches!(self, TaskState::Completed | TaskState::Failed)
  }

  /// Forward-only transitions; any live state may fail
  fn allows(self, next: TaskState) -> bool {
    use TaskState::*;
    matches!(
      (self, next),
      (Pending, FetchingMetadata)
        | (FetchingMetadata, HashingDependencies)
        | (HashingDependencies, Rendering)
        | (Rendering, Completed)
        | (Pending | FetchingMetadata | HashingDependencies | Rendering, Failed)
    )
  }
}

impl fmt::Display for TaskState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      TaskState::Pending => "pending",
      TaskState::FetchingMetadata => "fetching metadata",
      TaskState::HashingDependencies => "hashing dependencies",
      TaskState::Rendering => "rendering",
      TaskState::Completed => "completed",
      TaskState::Failed => "failed",
    };
    f.write_str(name)
  }
}

/// Tracks one version's state and logs every transition
#[derive(Debug)]
pub struct VersionTask {
  tag: String,
  state: TaskState,
}

impl VersionTask {
  pub fn new(tag: impl Into<String>) -> Self {
    Self {
      tag: tag.into(),
      state: TaskState::Pending,
    }
  }

  pub fn state(&self) -> TaskState {
    self.state
  }

  pub fn advance(&mut self, next: TaskState) -> RelgenResult<()> {
    if !self.state.allows(next) {
      return Err(RelgenError::message(format!(
        "invalid transition from {} to {}",
        self.state, next
      )));
    }
    debug!(tag = %self.tag, from = %self.state, to = %next, "task transition");
    self.state = next;
    Ok(())
  }

  /// Record a failure; no-op once terminal
  pub fn fail(&mut self) {
    if !self.state.is_terminal() {
      debug!(tag = %self.tag, from = %self.state, "task failed");
      self.state = TaskState::Failed;
    }
  }
}
