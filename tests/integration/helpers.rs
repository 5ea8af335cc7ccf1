//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

pub const LOCK_PATH: &str = "src/rust/engine/Cargo.lock";
pub const TOOLCHAIN_PATH: &str = "src/rust/engine/rust-toolchain";

pub const LOCK: &str = r#"version = 3

[[package]]
name = "engine"
version = "0.0.1"

[[package]]
name = "serde"
version = "1.0.0"
source = "registry+https://github.com/rust-lang/crates.io-index"

[[package]]
name = "lmdb-rkv"
version = "0.14.0"
source = "git+https://github.com/pantsbuild/lmdb-rs.git?rev=6ae7a55#6ae7a55"
"#;

pub const TOOLCHAIN: &str = "[toolchain]\nchannel = \"1.72.0\"\n";

pub const TEMPLATE: &str = r#"{ version = "$version"; hash = "$hash"; rust = "$rust_version"; args = "$args";
  lock = "$cargo_lock_url";
  outputHashes = {
      $output_hashes
  };
}
"#;

/// An upstream repository with release tags
pub struct Upstream {
  _root: TempDir,
  pub path: PathBuf,
}

impl Upstream {
  pub fn new() -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().join("pants");
    std::fs::create_dir_all(&path)?;

    git(&path, &["init", "--initial-branch=main"])?;
    git(&path, &["config", "user.name", "Test User"])?;
    git(&path, &["config", "user.email", "test@example.com"])?;
    std::fs::write(path.join("README.md"), "# pants\n")?;
    git(&path, &["add", "."])?;
    git(&path, &["commit", "-m", "Initial commit"])?;

    Ok(Self { _root: root, path })
  }

  /// Commit the standard lock and toolchain files and tag the commit
  pub fn release(&self, tag: &str) -> Result<()> {
    self.release_with(tag, LOCK, Some(TOOLCHAIN))
  }

  /// Commit the given files (`None` removes the toolchain file) and tag
  pub fn release_with(&self, tag: &str, lock: &str, toolchain: Option<&str>) -> Result<()> {
    let engine = self.path.join("src/rust/engine");
    std::fs::create_dir_all(&engine)?;
    std::fs::write(self.path.join(LOCK_PATH), lock)?;
    let toolchain_file = self.path.join(TOOLCHAIN_PATH);
    match toolchain {
      Some(content) => std::fs::write(&toolchain_file, content)?,
      None if toolchain_file.exists() => std::fs::remove_file(&toolchain_file)?,
      None => {}
    }
    std::fs::write(self.path.join("VERSION"), tag)?;

    git(&self.path, &["add", "-A"])?;
    git(&self.path, &["commit", "-m", &format!("Release {}", tag)])?;
    git(&self.path, &["tag", tag])?;
    Ok(())
  }
}

/// A directory relgen runs in: config, template, output
pub struct Workdir {
  _root: TempDir,
  pub path: PathBuf,
}

impl Workdir {
  /// relgen.toml pointing at `upstream`, with stub hash commands
  pub fn new(upstream: &Upstream) -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().to_path_buf();

    std::fs::write(
      path.join("relgen.toml"),
      format!(
        r#"[upstream]
url = "{url}"
cache_dir = "cache/pants"

[commands]
archive_hash = "test -f {{path}}/VERSION && echo sha256-ARCHIVE"
prefetch = '''echo {{url}} >/dev/null; printf '{{"hash": "sha256-%s"}}' {{rev}}'''

[pipeline]
concurrency = 4
"#,
        url = upstream.path.display()
      ),
    )?;
    std::fs::write(path.join("template.nix"), TEMPLATE)?;

    Ok(Self { _root: root, path })
  }

  /// An empty directory with no configuration
  pub fn bare() -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().to_path_buf();
    Ok(Self { _root: root, path })
  }

  pub fn file_exists(&self, path: &str) -> bool {
    self.path.join(path).exists()
  }

  pub fn read_file(&self, path: &str) -> Result<String> {
    Ok(std::fs::read_to_string(self.path.join(path))?)
  }

  pub fn write_file(&self, path: &str, content: &str) -> Result<()> {
    let full = self.path.join(path);
    if let Some(parent) = full.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(full, content)?;
    Ok(())
  }
}

/// Run git command in a directory
pub fn git(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = Command::new("git")
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run git command")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    anyhow::bail!("Git command failed: git {}\n{}", args.join(" "), stderr);
  }

  Ok(output)
}

/// Run relgen and return its output whatever the exit status
pub fn run_relgen_raw(cwd: &Path, args: &[&str], stdin: &str) -> Result<Output> {
  let mut child = Command::new(env!("CARGO_BIN_EXE_relgen"))
    .current_dir(cwd)
    .args(args)
    .env("RELGEN_LOG", "info")
    .stdin(Stdio::piped())
    .stdout(Stdio::piped())
    .stderr(Stdio::piped())
    .spawn()
    .context("Failed to run relgen")?;

  if let Some(mut pipe) = child.stdin.take() {
    pipe.write_all(stdin.as_bytes())?;
  }
  Ok(child.wait_with_output()?)
}

/// Run relgen, failing the test on a non-zero exit
pub fn run_relgen(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = run_relgen_raw(cwd, args, "")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    anyhow::bail!(
      "relgen command failed: relgen {}\nstdout: {}\nstderr: {}",
      args.join(" "),
      stdout,
      stderr
    );
  }

  Ok(output)
}

pub fn stdout(output: &Output) -> String {
  String::from_utf8_lossy(&output.stdout).into_owned()
}
