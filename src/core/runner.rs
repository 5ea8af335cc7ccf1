//! External process execution
//!
//! Every external tool relgen uses (git, tar, nix-hash, nix-prefetch-git)
//! is reached through [`CommandRunner`]. Production code runs command lines
//! with `sh -c`; tests substitute a scripted runner.
//!
//! [`LimitedRunner`] wraps any runner with one counting semaphore, so the
//! number of processes in flight stays bounded for the whole run no matter
//! how many versions or dependencies are being worked on.

use crate::core::error::{CommandError, RelgenError, RelgenResult};
use std::future::Future;
use std::sync::Arc;
use tokio::process::Command;
use tokio::sync::Semaphore;
use tracing::{debug, error};

/// Captured result of one command line
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
  pub stdout: Vec<u8>,
  pub stderr: Vec<u8>,
  /// Exit code, `None` if terminated by a signal
  pub status: Option<i32>,
}

impl CommandOutput {
  pub fn success(&self) -> bool {
    self.status == Some(0)
  }

  pub fn stdout_lossy(&self) -> String {
    String::from_utf8_lossy(&self.stdout).into_owned()
  }

  pub fn stderr_lossy(&self) -> String {
    String::from_utf8_lossy(&self.stderr).into_owned()
  }

  /// Turn a non-zero exit into `CommandError::Failed`, logging stderr
  pub fn into_success(self, command: &str) -> RelgenResult<Self> {
    if self.success() {
      return Ok(self);
    }
    let stderr = self.stderr_lossy();
    match self.status {
      Some(code) => error!(command, code, "command failed, stderr:\n{}", stderr),
      None => error!(command, "command killed by signal, stderr:\n{}", stderr),
    }
    Err(RelgenError::Command(CommandError::Failed {
      command: command.to_string(),
      status: self.status,
      stderr,
    }))
  }
}

/// Runs one command line to completion.
///
/// Quoting is the caller's job: arguments that may contain shell
/// metacharacters go through [`crate::utils::shell_quote`].
pub trait CommandRunner: Send + Sync + 'static {
  fn run(&self, command_line: &str) -> impl Future<Output = RelgenResult<CommandOutput>> + Send;
}

/// Runs command lines with `sh -c`
#[derive(Debug, Clone, Default)]
pub struct ShellRunner;

impl CommandRunner for ShellRunner {
  async fn run(&self, command_line: &str) -> RelgenResult<CommandOutput> {
    let output = Command::new("sh")
      .arg("-c")
      .arg(command_line)
      .kill_on_drop(true)
      .output()
      .await
      .map_err(|e| {
        RelgenError::Command(CommandError::Spawn {
          command: command_line.to_string(),
          reason: e.to_string(),
        })
      })?;

    Ok(CommandOutput {
      stdout: output.stdout,
      stderr: output.stderr,
      status: output.status.code(),
    })
  }
}

/// A runner whose invocations share one global concurrency cap.
///
/// Clones share the same semaphore; a caller that would exceed the cap
/// waits until a slot frees.
pub struct LimitedRunner<R> {
  inner: Arc<R>,
  permits: Arc<Semaphore>,
  capacity: usize,
}

impl<R> Clone for LimitedRunner<R> {
  fn clone(&self) -> Self {
    Self {
      inner: Arc::clone(&self.inner),
      permits: Arc::clone(&self.permits),
      capacity: self.capacity,
    }
  }
}

impl<R: CommandRunner> LimitedRunner<R> {
  pub fn new(inner: R, capacity: usize) -> Self {
    let capacity = capacity.max(1);
    Self {
      inner: Arc::new(inner),
      permits: Arc::new(Semaphore::new(capacity)),
      capacity,
    }
  }

  pub fn capacity(&self) -> usize {
    self.capacity
  }

  /// Run and require a zero exit status
  pub async fn run_checked(&self, command_line: &str) -> RelgenResult<CommandOutput> {
    self.run(command_line).await?.into_success(command_line)
  }
}

impl<R: CommandRunner> CommandRunner for LimitedRunner<R> {
  async fn run(&self, command_line: &str) -> RelgenResult<CommandOutput> {
    let _permit = self
      .permits
      .acquire()
      .await
      .map_err(|_| RelgenError::message("command limiter was closed"))?;
    debug!(command = command_line, "running");
    self.inner.run(command_line).await
  }
}
