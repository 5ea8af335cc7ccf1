//! End-of-run report

use crate::catalog::{Version, VersionCatalog};
use crate::core::error::RelgenResult;
use crate::pipeline::process::VersionOutcome;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize)]
pub struct GeneratedEntry {
  pub tag: String,
  pub version: Version,
  pub path: PathBuf,
  /// `name-version -> hash` written into the descriptor
  pub dependency_hashes: BTreeMap<String, String>,
  pub incomplete: bool,
  /// Dependency keys left without a hash
  pub missing: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedEntry {
  pub tag: String,
  pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedEntry {
  pub tag: String,
  pub error: String,
}

/// Outcome of every version in a run, in version order
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
  pub generated_at: DateTime<Utc>,
  pub generated: Vec<GeneratedEntry>,
  pub skipped: Vec<SkippedEntry>,
  pub failed: Vec<FailedEntry>,
}

impl RunSummary {
  pub fn from_results(results: &[(Version, RelgenResult<VersionOutcome>)], catalog: &VersionCatalog) -> Self {
    let mut summary = Self {
      generated_at: Utc::now(),
      generated: Vec::new(),
      skipped: Vec::new(),
      failed: Vec::new(),
    };

    for (version, result) in results {
      match result {
        Ok(VersionOutcome::Generated(descriptor)) => summary.generated.push(GeneratedEntry {
          tag: descriptor.tag.clone(),
          version: descriptor.version,
          path: descriptor.path.clone(),
          dependency_hashes: descriptor.dependency_hashes.clone(),
          incomplete: !descriptor.is_complete(),
          missing: descriptor.unresolved.iter().map(|u| u.key.clone()).collect(),
        }),
        Ok(VersionOutcome::Skipped { tag, path }) => summary.skipped.push(SkippedEntry {
          tag: tag.clone(),
          path: path.clone(),
        }),
        Err(err) => summary.failed.push(FailedEntry {
          tag: catalog.tag_for(version),
          error: err.to_string(),
        }),
      }
    }
    summary
  }

  pub fn has_failures(&self) -> bool {
    !self.failed.is_empty()
  }

  pub fn incomplete(&self) -> impl Iterator<Item = &GeneratedEntry> {
    self.generated.iter().filter(|entry| entry.incomplete)
  }

  pub fn total(&self) -> usize {
    self.generated.len() + self.skipped.len() + self.failed.len()
  }

  pub fn to_json(&self) -> RelgenResult<String> {
    Ok(serde_json::to_string_pretty(self)?)
  }

  /// Human-readable report
  pub fn render_text(&self) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "📋 Run summary ({} versions)", self.total());
    let _ = writeln!(out, "════════════════════════════════════════");

    for entry in &self.generated {
      if entry.incomplete {
        let _ = writeln!(out, "  ⚠️  {} (missing: {})", entry.tag, entry.missing.join(", "));
      } else {
        let _ = writeln!(out, "  ✅ {}", entry.tag);
      }
    }
    for entry in &self.skipped {
      let _ = writeln!(out, "  ⏭  {} (exists)", entry.tag);
    }
    for entry in &self.failed {
      let first_line = entry.error.lines().next().unwrap_or_default();
      let _ = writeln!(out, "  ❌ {}: {}", entry.tag, first_line);
    }

    let _ = writeln!(out);
    let _ = writeln!(
      out,
      "Generated: {} ({} incomplete)  Skipped: {}  Failed: {}",
      self.generated.len(),
      self.incomplete().count(),
      self.skipped.len(),
      self.failed.len()
    );
    out
  }

  pub fn print(&self, json: bool) -> RelgenResult<()> {
    if json {
      println!("{}", self.to_json()?);
    } else {
      print!("{}", self.render_text());
    }
    Ok(())
  }
}
