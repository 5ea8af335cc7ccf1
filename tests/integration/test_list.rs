//! Tests for the `list` command

use crate::helpers::*;
use anyhow::Result;

fn upstream_with_history() -> Result<Upstream> {
  let upstream = Upstream::new()?;
  for tag in [
    "release_1.30.0",
    "release_2.0.1",
    "release_2.18.0",
    "release_2.19.0",
    "release_2.19.0rc1",
    "release_2.19.0.dev0",
    "release_candidate",
  ] {
    upstream.release(tag)?;
  }
  Ok(upstream)
}

#[test]
fn test_list_orders_and_filters_tags() -> Result<()> {
  let upstream = upstream_with_history()?;
  let workdir = Workdir::new(&upstream)?;

  let output = run_relgen(&workdir.path, &["list", "--json"])?;
  let value: serde_json::Value = serde_json::from_str(&stdout(&output))?;

  let tags: Vec<&str> = value["releases"]
    .as_array()
    .unwrap()
    .iter()
    .map(|r| r["tag"].as_str().unwrap())
    .collect();
  assert_eq!(
    tags,
    vec!["release_2.18.0", "release_2.19.0.dev0", "release_2.19.0rc1", "release_2.19.0"]
  );
  assert_eq!(value["malformed"], serde_json::json!(["release_candidate"]));
  assert_eq!(value["releases"][0]["version"], "2.18.0");
  assert_eq!(value["releases"][0]["generated"], false);

  // Mirror is a bare clone under the configured cache dir
  assert!(workdir.file_exists("cache/pants/HEAD"));
  assert!(!workdir.file_exists("cache/pants/.git"));
  Ok(())
}

#[test]
fn test_list_start_is_exclusive() -> Result<()> {
  let upstream = upstream_with_history()?;
  let workdir = Workdir::new(&upstream)?;

  let output = run_relgen(&workdir.path, &["list", "--start", "release_2.19.0.dev0"])?;
  let text = stdout(&output);
  assert!(text.contains("2 releases"));
  assert!(text.contains("release_2.19.0rc1"));
  assert!(!text.contains("release_2.18.0"));
  assert!(!text.contains("⬜ release_2.19.0.dev0"));
  Ok(())
}

#[test]
fn test_list_picks_up_new_tags() -> Result<()> {
  let upstream = upstream_with_history()?;
  let workdir = Workdir::new(&upstream)?;
  run_relgen(&workdir.path, &["list"])?;

  upstream.release("release_2.20.0")?;
  let output = run_relgen(&workdir.path, &["list", "--start", "2.19.0"])?;
  assert!(stdout(&output).contains("release_2.20.0"));
  Ok(())
}

#[test]
fn test_list_rejects_malformed_start() -> Result<()> {
  let upstream = upstream_with_history()?;
  let workdir = Workdir::new(&upstream)?;

  let output = run_relgen_raw(&workdir.path, &["list", "--start", "2.19"], "")?;
  assert_eq!(output.status.code(), Some(1));
  assert!(String::from_utf8_lossy(&output.stderr).contains("Malformed version tag"));
  Ok(())
}

#[test]
fn test_existing_data_at_cache_dir_is_left_alone() -> Result<()> {
  let upstream = upstream_with_history()?;
  let workdir = Workdir::new(&upstream)?;
  workdir.write_file("cache/pants/precious.txt", "important")?;

  let output = run_relgen_raw(&workdir.path, &["list"], "")?;
  assert!(!output.status.success());
  assert_eq!(workdir.read_file("cache/pants/precious.txt")?, "important");
  Ok(())
}
