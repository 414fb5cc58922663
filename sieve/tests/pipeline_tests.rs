use anyhow::{Context, Result};
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;

/// Abstraction for managing the Sieve test environment.
struct SieveTestEnv {
    _tmp: TempDir,
    root: PathBuf,
}

impl SieveTestEnv {
    fn new() -> Result<Self> {
        let tmp = tempfile::tempdir()?;
        let project_root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/catalog");

        let dest = tmp.path().join("catalog");
        Self::copy_dir(&project_root, &dest)?;

        Ok(Self {
            _tmp: tmp,
            root: dest,
        })
    }

    fn copy_dir(src: &PathBuf, dst: &PathBuf) -> std::io::Result<()> {
        let mut options = fs_extra::dir::CopyOptions::new();
        options.skip_exist = true;
        options.content_only = true;

        std::fs::create_dir_all(dst)?;
        fs_extra::dir::copy(src, dst, &options)
            .map(|_| ())
            .map_err(|e| std::io::Error::other(e.to_string()))
    }

    fn sieve(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("sieve"));
        cmd.current_dir(&self.root);
        cmd
    }

    fn read(&self, rel: &str) -> Result<String> {
        std::fs::read_to_string(self.root.join(rel)).with_context(|| format!("{} not generated", rel))
    }
}

#[test]
fn test_run_dedupes_and_nullifies_future_year() -> Result<()> {
    let env = SieveTestEnv::new()?;

    env.sieve()
        .arg("run")
        .assert()
        .success()
        .stdout(predicate::str::contains("SUCCESS"));

    let cleaned = env.read("target/cleaned.csv")?;
    let lines: Vec<&str> = cleaned.lines().collect();
    assert_eq!(lines.len(), 4, "header + 3 records:\n{}", cleaned);
    assert_eq!(
        lines[0],
        "Tool Name,Website,Launch Year,review_count,average_rating,Description"
    );
    // the better-reviewed duplicate survives, its 3099 launch year blanked
    assert!(lines[1].starts_with("Pixel Forge,pixelforge.ai,,480,"));
    let blank_years = lines[1..]
        .iter()
        .filter(|l| l.split(',').nth(2) == Some(""))
        .count();
    assert_eq!(blank_years, 1);

    assert!(env.root.join("target/rejected/01_duplicates.csv").exists());
    assert!(env.root.join("target/rejected/04_years.csv").exists());
    assert!(!env.root.join("target/rejected/02_missing.csv").exists());

    let run_results = env.read("target/run_results.json")?;
    let run: serde_json::Value = serde_json::from_str(&run_results)?;
    assert_eq!(run["input_rows"], 4);
    assert_eq!(run["output_rows"], 3);

    let content = env.read("target/report.json")?;
    insta::assert_snapshot!("report", content);

    Ok(())
}

#[test]
fn test_run_is_repeatable() -> Result<()> {
    let env = SieveTestEnv::new()?;

    env.sieve().arg("run").assert().success();
    let first = env.read("target/cleaned.csv")?;
    env.sieve().arg("run").assert().success();
    let second = env.read("target/cleaned.csv")?;

    assert_eq!(first, second);
    Ok(())
}

#[test]
fn test_run_fails_on_mismatched_inputs() -> Result<()> {
    let env = SieveTestEnv::new()?;

    // Poisoning: a second input file with a different header
    std::fs::write(
        env.root.join("data/raw/zz_extra.csv"),
        "Tool Name,Homepage\nOrbit,orbit.app\n",
    )?;

    env.sieve()
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("CRITICAL PIPELINE ERROR"));

    assert!(!env.root.join("target/cleaned.csv").exists());
    Ok(())
}

#[test]
fn test_run_without_config_fails() -> Result<()> {
    let env = SieveTestEnv::new()?;
    std::fs::remove_file(env.root.join("sieve.yaml"))?;

    env.sieve()
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load project configuration"));
    Ok(())
}

#[test]
fn test_inspect_reports_duplicates_without_writing() -> Result<()> {
    let env = SieveTestEnv::new()?;

    env.sieve()
        .args([
            "inspect",
            "data/raw/tools.csv",
            "--identity-key",
            "Tool Name,Company,Website",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 duplicate group(s)"))
        .stdout(predicate::str::contains("Launch Year"));

    assert!(!env.root.join("target").exists());
    Ok(())
}

#[test]
fn test_clean_removes_target() -> Result<()> {
    let env = SieveTestEnv::new()?;

    env.sieve().arg("run").assert().success();
    assert!(env.root.join("target").exists());

    env.sieve()
        .arg("clean")
        .assert()
        .success()
        .stdout(predicate::str::contains("Artifact removed: target"));

    assert!(!env.root.join("target").exists());
    assert!(env.root.join("data/raw/tools.csv").exists());
    Ok(())
}
