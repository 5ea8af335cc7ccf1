//! Tests for the `tag` command

use crate::helpers::*;
use anyhow::Result;

#[test]
fn test_tag_generates_descriptor() -> Result<()> {
  let upstream = Upstream::new()?;
  upstream.release("release_2.19.0")?;
  let workdir = Workdir::new(&upstream)?;

  run_relgen(&workdir.path, &["tag", "2.19.0"])?;

  let descriptor = workdir.read_file("tags/release_2.19.0/default.nix")?;
  assert!(descriptor.contains("version = \"2.19.0\";"));
  assert!(descriptor.contains("hash = \"sha256-ARCHIVE\";"));
  assert!(descriptor.contains("rust = \"1.72.0\";"));
  assert!(descriptor.contains("tag 2.19.0\";"));
  assert!(descriptor.contains(
    "lock = \"https://raw.githubusercontent.com/pantsbuild/pants/release_2.19.0/src/rust/engine/Cargo.lock\";"
  ));
  assert!(descriptor.contains("      \"lmdb-rkv-0.14.0\" = \"sha256-6ae7a55\";\n"));
  assert!(!descriptor.contains("serde-1.0.0"));

  assert_eq!(workdir.read_file("tags/release_2.19.0/Cargo.lock")?, LOCK);
  assert_eq!(
    workdir.read_file("tags/default.nix")?,
    "{pkgs}: {\n  \"release_2.19.0\" = pkgs.callPackage ./release_2.19.0 {};\n}\n"
  );
  Ok(())
}

#[test]
fn test_tag_skips_existing_unless_forced() -> Result<()> {
  let upstream = Upstream::new()?;
  upstream.release("release_2.19.0")?;
  let workdir = Workdir::new(&upstream)?;
  workdir.write_file("tags/release_2.19.0/default.nix", "handwritten\n")?;

  let output = run_relgen(&workdir.path, &["tag", "release_2.19.0"])?;
  assert!(stdout(&output).contains("release_2.19.0 (exists)"));
  assert_eq!(workdir.read_file("tags/release_2.19.0/default.nix")?, "handwritten\n");
  // Skipping never touches the upstream
  assert!(!workdir.file_exists("cache/pants"));

  run_relgen(&workdir.path, &["tag", "release_2.19.0", "--force"])?;
  assert!(workdir.read_file("tags/release_2.19.0/default.nix")?.contains("sha256-ARCHIVE"));
  Ok(())
}

#[test]
fn test_tag_uses_override_table() -> Result<()> {
  let upstream = Upstream::new()?;
  upstream.release("release_2.19.0")?;
  let workdir = Workdir::new(&upstream)?;
  workdir.write_file(
    "output_hash_overrides.json",
    r#"{"lmdb-rkv-0.14.0": "sha256-PINNED="}"#,
  )?;

  run_relgen(&workdir.path, &["tag", "2.19.0"])?;
  let descriptor = workdir.read_file("tags/release_2.19.0/default.nix")?;
  assert!(descriptor.contains("\"lmdb-rkv-0.14.0\" = \"sha256-PINNED=\";"));
  Ok(())
}

#[test]
fn test_tag_json_reports_incomplete_hashes() -> Result<()> {
  let upstream = Upstream::new()?;
  upstream.release("release_2.19.0")?;
  let workdir = Workdir::new(&upstream)?;
  let config = workdir.read_file("relgen.toml")?;
  let config = config
    .lines()
    .map(|line| {
      if line.starts_with("prefetch") {
        "prefetch = \"echo {url} {rev} >&2; exit 1\""
      } else {
        line
      }
    })
    .collect::<Vec<_>>()
    .join("\n");
  workdir.write_file("relgen.toml", &config)?;

  let output = run_relgen(&workdir.path, &["tag", "2.19.0", "--json"])?;
  let value: serde_json::Value = serde_json::from_str(&stdout(&output))?;
  assert_eq!(value["generated"][0]["incomplete"], true);
  assert_eq!(value["generated"][0]["missing"], serde_json::json!(["lmdb-rkv-0.14.0"]));
  assert!(workdir.file_exists("tags/release_2.19.0/default.nix"));
  Ok(())
}

#[test]
fn test_tag_unknown_release_is_system_error() -> Result<()> {
  let upstream = Upstream::new()?;
  upstream.release("release_2.19.0")?;
  let workdir = Workdir::new(&upstream)?;

  let output = run_relgen_raw(&workdir.path, &["tag", "2.99.0"], "")?;
  assert_eq!(output.status.code(), Some(2));
  assert!(!workdir.file_exists("tags/release_2.99.0"));
  Ok(())
}

#[test]
fn test_tag_without_template_fails_before_fetching() -> Result<()> {
  let upstream = Upstream::new()?;
  upstream.release("release_2.19.0")?;
  let workdir = Workdir::new(&upstream)?;
  std::fs::remove_file(workdir.path.join("template.nix"))?;

  let output = run_relgen_raw(&workdir.path, &["tag", "2.19.0"], "")?;
  assert_eq!(output.status.code(), Some(1));
  assert!(String::from_utf8_lossy(&output.stderr).contains("template"));
  assert!(!workdir.file_exists("cache/pants"));
  Ok(())
}
