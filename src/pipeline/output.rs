//! On-disk layout of generated descriptors
//!
//! ```text
//! <dir>/
//!   default.nix                  index of every generated tag
//!   release_2.19.0/
//!     default.nix                rendered descriptor
//!     Cargo.lock                 lock file copied from the tag
//! ```
//!
//! Each version writes only inside its own directory, so concurrent tasks
//! never touch the same file.

use crate::catalog::{Version, VersionCatalog};
use crate::core::error::{RelgenResult, ResultExt};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct OutputLayout {
  root: PathBuf,
  descriptor: String,
  index: String,
  lock_name: String,
}

impl OutputLayout {
  /// `lock_file` is the upstream path; only its file name is kept
  pub fn new(root: impl Into<PathBuf>, descriptor: &str, index: &str, lock_file: &str) -> Self {
    let lock_name = Path::new(lock_file)
      .file_name()
      .map(|n| n.to_string_lossy().into_owned())
      .unwrap_or_else(|| "Cargo.lock".to_string());
    Self {
      root: root.into(),
      descriptor: descriptor.to_string(),
      index: index.to_string(),
      lock_name,
    }
  }

  pub fn tag_dir(&self, tag: &str) -> PathBuf {
    self.root.join(tag)
  }

  pub fn descriptor_path(&self, tag: &str) -> PathBuf {
    self.tag_dir(tag).join(&self.descriptor)
  }

  pub fn index_path(&self) -> PathBuf {
    self.root.join(&self.index)
  }

  /// Whether a descriptor for `tag` was generated before
  pub fn exists(&self, tag: &str) -> bool {
    self.descriptor_path(tag).is_file()
  }

  /// Write the descriptor and the raw lock file; returns the descriptor path.
  ///
  /// Both files are staged in the tag directory and renamed into place, the
  /// descriptor last, so a descriptor on disk is always complete. If this
  /// call created the tag directory and fails, the directory is removed.
  pub fn write(&self, tag: &str, rendered: &str, lock_content: &str) -> RelgenResult<PathBuf> {
    let dir = self.tag_dir(tag);
    let created = !dir.exists();
    fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    let result = self.write_files(&dir, tag, rendered, lock_content);
    if result.is_err() && created {
      if let Err(err) = fs::remove_dir_all(&dir) {
        warn!(dir = %dir.display(), "failed to clean up after write error: {}", err);
      }
    }
    result
  }

  fn write_files(&self, dir: &Path, tag: &str, rendered: &str, lock_content: &str) -> RelgenResult<PathBuf> {
    let descriptor = stage(dir, rendered)?;
    let lock = stage(dir, lock_content)?;

    let lock_path = dir.join(&self.lock_name);
    lock
      .persist(&lock_path)
      .map_err(|e| e.error)
      .with_context(|| format!("Failed to write {}", lock_path.display()))?;

    let path = self.descriptor_path(tag);
    descriptor
      .persist(&path)
      .map_err(|e| e.error)
      .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
  }

  /// Versions that have a descriptor on disk, ascending
  pub fn generated_versions(&self, catalog: &VersionCatalog) -> RelgenResult<Vec<Version>> {
    if !self.root.is_dir() {
      return Ok(Vec::new());
    }

    let mut versions = Vec::new();
    for entry in fs::read_dir(&self.root).with_context(|| format!("Failed to list {}", self.root.display()))? {
      let entry = entry?;
      if !entry.file_type()?.is_dir() {
        continue;
      }
      let name = entry.file_name().to_string_lossy().into_owned();
      if !self.exists(&name) {
        continue;
      }
      match catalog.parse(&name) {
        Ok(version) => versions.push(version),
        Err(err) => warn!(dir = %name, "not indexing directory: {}", err),
      }
    }
    versions.sort();
    Ok(versions)
  }

  /// Rewrite the index from what is on disk; returns how many tags it lists
  pub fn write_index(&self, catalog: &VersionCatalog) -> RelgenResult<usize> {
    let versions = self.generated_versions(catalog)?;
    let content = render_index(versions.iter().map(|v| catalog.tag_for(v)));

    fs::create_dir_all(&self.root).with_context(|| format!("Failed to create {}", self.root.display()))?;
    let path = self.index_path();
    fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), tags = versions.len(), "wrote index");
    Ok(versions.len())
  }
}

/// Content in a temporary file next to its final location
fn stage(dir: &Path, content: &str) -> RelgenResult<NamedTempFile> {
  let mut file = NamedTempFile::new_in(dir).with_context(|| format!("Failed to stage a file in {}", dir.display()))?;
  file
    .write_all(content.as_bytes())
    .with_context(|| format!("Failed to stage a file in {}", dir.display()))?;
  Ok(file)
}

fn render_index<I: IntoIterator<Item = String>>(tags: I) -> String {
  let mut out = String::from("{pkgs}: {\n");
  for tag in tags {
    out.push_str(&format!("  \"{tag}\" = pkgs.callPackage ./{tag} {{}};\n"));
  }
  out.push_str("}\n");
  out
}
