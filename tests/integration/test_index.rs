//! Tests for the `index` command

use crate::helpers::*;
use anyhow::Result;

#[test]
fn test_index_from_existing_directories() -> Result<()> {
  let workdir = Workdir::bare()?;
  workdir.write_file("tags/release_2.20.0/default.nix", "{ }\n")?;
  workdir.write_file("tags/release_2.19.0a1/default.nix", "{ }\n")?;
  workdir.write_file("tags/release_2.19.0/default.nix", "{ }\n")?;
  workdir.write_file("tags/release_2.21.0/Cargo.lock", "")?;
  workdir.write_file("tags/scratch/default.nix", "{ }\n")?;

  let output = run_relgen(&workdir.path, &["index"])?;
  assert!(stdout(&output).contains("3 releases"));
  assert_eq!(
    workdir.read_file("tags/default.nix")?,
    "{pkgs}: {\n  \
     \"release_2.19.0a1\" = pkgs.callPackage ./release_2.19.0a1 {};\n  \
     \"release_2.19.0\" = pkgs.callPackage ./release_2.19.0 {};\n  \
     \"release_2.20.0\" = pkgs.callPackage ./release_2.20.0 {};\n}\n"
  );
  Ok(())
}

#[test]
fn test_index_with_explicit_config() -> Result<()> {
  let workdir = Workdir::bare()?;
  workdir.write_file(
    "conf/relgen.toml",
    "[upstream]\ntag_prefix = \"v\"\n\n[output]\ndir = \"nix\"\nindex = \"all.nix\"\n",
  )?;
  workdir.write_file("conf/nix/v1.2.3/default.nix", "{ }\n")?;

  run_relgen(&workdir.path, &["--config", "conf/relgen.toml", "index"])?;
  assert_eq!(
    workdir.read_file("conf/nix/all.nix")?,
    "{pkgs}: {\n  \"v1.2.3\" = pkgs.callPackage ./v1.2.3 {};\n}\n"
  );
  Ok(())
}

#[test]
fn test_invalid_config_is_user_error() -> Result<()> {
  let workdir = Workdir::bare()?;
  workdir.write_file("relgen.toml", "[pipeline]\nconcurrency = 0\n")?;

  let output = run_relgen_raw(&workdir.path, &["index"], "")?;
  assert_eq!(output.status.code(), Some(1));
  assert!(String::from_utf8_lossy(&output.stderr).contains("pipeline.concurrency"));
  Ok(())
}
