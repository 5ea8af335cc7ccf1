//! Tests for the `all` command

use crate::helpers::*;
use anyhow::Result;

#[test]
fn test_all_generates_everything_after_start() -> Result<()> {
  let upstream = Upstream::new()?;
  for tag in ["release_2.0.3", "release_2.18.0", "release_2.19.0rc1", "release_2.19.0"] {
    upstream.release(tag)?;
  }
  let workdir = Workdir::new(&upstream)?;

  let output = run_relgen(&workdir.path, &["all", "--start", "release_2.18.0", "--yes"])?;
  let text = stdout(&output);
  assert!(text.contains("2 releases after release_2.18.0"));
  assert!(text.contains("Generated: 2 (0 incomplete)  Skipped: 0  Failed: 0"));

  assert!(workdir.file_exists("tags/release_2.19.0rc1/default.nix"));
  assert!(workdir.file_exists("tags/release_2.19.0/default.nix"));
  assert!(!workdir.file_exists("tags/release_2.18.0"));
  assert_eq!(
    workdir.read_file("tags/default.nix")?,
    "{pkgs}: {\n  \
     \"release_2.19.0rc1\" = pkgs.callPackage ./release_2.19.0rc1 {};\n  \
     \"release_2.19.0\" = pkgs.callPackage ./release_2.19.0 {};\n}\n"
  );
  Ok(())
}

#[test]
fn test_all_second_run_skips() -> Result<()> {
  let upstream = Upstream::new()?;
  upstream.release("release_2.18.0")?;
  upstream.release("release_2.19.0")?;
  let workdir = Workdir::new(&upstream)?;

  run_relgen(&workdir.path, &["all", "--start", "2.17.0", "--yes"])?;
  let output = run_relgen(&workdir.path, &["all", "--start", "2.17.0", "--yes", "--json"])?;
  let value: serde_json::Value = serde_json::from_str(&stdout(&output))?;
  assert_eq!(value["generated"].as_array().unwrap().len(), 0);
  assert_eq!(value["skipped"].as_array().unwrap().len(), 2);
  Ok(())
}

#[test]
fn test_all_failure_is_isolated() -> Result<()> {
  let upstream = Upstream::new()?;
  upstream.release("release_2.19.0")?;
  upstream.release_with("release_2.20.0", LOCK, None)?;
  upstream.release_with("release_2.21.0", LOCK, Some(TOOLCHAIN))?;
  let workdir = Workdir::new(&upstream)?;

  let output = run_relgen_raw(&workdir.path, &["all", "--start", "2.18.0", "--yes"], "")?;
  assert_eq!(output.status.code(), Some(1));
  let text = stdout(&output);
  assert!(text.contains("❌ release_2.20.0"));
  assert!(String::from_utf8_lossy(&output.stderr).contains("1 of 3 releases failed"));

  assert!(workdir.file_exists("tags/release_2.19.0/default.nix"));
  assert!(workdir.file_exists("tags/release_2.21.0/default.nix"));
  assert!(!workdir.file_exists("tags/release_2.20.0"));

  let index = workdir.read_file("tags/default.nix")?;
  assert!(index.contains("release_2.19.0"));
  assert!(!index.contains("release_2.20.0"));
  Ok(())
}

#[test]
fn test_all_declined_prompt_generates_nothing() -> Result<()> {
  let upstream = Upstream::new()?;
  upstream.release("release_2.19.0")?;
  let workdir = Workdir::new(&upstream)?;

  let output = run_relgen_raw(&workdir.path, &["all", "--start", "2.18.0"], "n\n")?;
  assert!(output.status.success());
  assert!(stdout(&output).contains("Continue? [y/n]"));
  assert!(!workdir.file_exists("tags"));
  Ok(())
}

#[test]
fn test_all_accepted_prompt() -> Result<()> {
  let upstream = Upstream::new()?;
  upstream.release("release_2.19.0")?;
  let workdir = Workdir::new(&upstream)?;

  let output = run_relgen_raw(&workdir.path, &["all", "--start", "2.18.0"], "yes\n")?;
  assert!(output.status.success());
  assert!(workdir.file_exists("tags/release_2.19.0/default.nix"));
  Ok(())
}
