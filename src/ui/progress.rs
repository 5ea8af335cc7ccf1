//! Progress indicators for bulk runs
//!
//! Uses `linya`, which draws to stderr and leaves stdout to the report.

use linya::{Bar, Progress};

/// One bar advanced as each version finishes
pub struct RunProgress {
  progress: Progress,
  bar: Bar,
}

impl RunProgress {
  pub fn new(total: usize, label: impl Into<String>) -> Self {
    let mut progress = Progress::new();
    let bar = progress.bar(total, label.into());
    Self { progress, bar }
  }

  /// Bar for `total` items, or nothing when output is machine-readable or empty
  pub fn maybe(total: usize, label: impl Into<String>, enabled: bool) -> Option<Self> {
    (enabled && total > 0).then(|| Self::new(total, label))
  }

  /// Increment progress by 1
  pub fn inc(&mut self) {
    self.progress.inc_and_draw(&self.bar, 1);
  }
}
