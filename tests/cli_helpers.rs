#![allow(dead_code)]

use anyhow::{bail, Result};
use assert_cmd::cargo;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

pub fn setup_temp_home() -> TempDir {
    TempDir::new().expect("failed to create temp home")
}

pub fn db_path_for_home(home: &TempDir) -> PathBuf {
    home.path().join(".networth").join("data.db")
}

/// Command isolated to `home`: its own database, no config file, no network
pub fn base_cmd(home: &TempDir) -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("networth"));
    cmd.env("HOME", home.path());
    cmd.env("NETWORTH_CONFIG", home.path().join("config.toml"));
    cmd.env("NETWORTH_OFFLINE", "1");
    cmd.env_remove("RUST_LOG");
    cmd.arg("--no-color");
    cmd
}

pub fn write_config(home: &TempDir, contents: &str) {
    std::fs::write(home.path().join("config.toml"), contents).expect("failed to write config");
}

pub fn write_csv(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("failed to write csv");
    path
}

pub fn run_cmd(home: &TempDir, args: &[&str]) -> Result<Output> {
    let mut cmd = base_cmd(home);
    cmd.args(args);
    let output = cmd.output()?;
    if !output.status.success() {
        bail!(
            "command failed: {:?}\nstdout: {}\nstderr: {}",
            args,
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
    }
    Ok(output)
}

pub fn run_cmd_json(home: &TempDir, args: &[&str]) -> Result<Value> {
    let mut full_args = vec!["--json"];
    full_args.extend_from_slice(args);
    let output = run_cmd(home, &full_args)?;
    let stdout = String::from_utf8(output.stdout)?;
    Ok(serde_json::from_str(&stdout)?)
}

pub fn add_snapshot(home: &TempDir, date: &str, total_assets: &str, flow: Option<&str>) -> Result<()> {
    let mut args = vec!["snapshot", "add", date, total_assets];
    if let Some(flow) = flow {
        args.push("--flow");
        args.push(flow);
    }
    run_cmd(home, &args)?;
    Ok(())
}

pub fn performance_json(home: &TempDir, extra: &[&str]) -> Result<Value> {
    let mut args = vec!["performance"];
    args.extend_from_slice(extra);
    run_cmd_json(home, &args)
}

/// `rows[i].performance_pct` values of a performance payload
pub fn performance_pcts(view: &Value) -> Vec<f64> {
    view["rows"]
        .as_array()
        .map(|rows| {
            rows.iter()
                .filter_map(|r| r["performance_pct"].as_f64())
                .collect()
        })
        .unwrap_or_default()
}
