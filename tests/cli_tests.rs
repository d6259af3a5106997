use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;

fn demo(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos").join(name)
}

fn forge() -> Command {
    let mut cmd = Command::cargo_bin("socket-forge").unwrap();
    cmd.env("RUST_LOG", "info");
    cmd.arg("--rule-file").arg(demo("meadow.ron"));
    cmd
}

fn small_grid(cmd: &mut Command) -> &mut Command {
    cmd.args(["--width", "5", "--height", "3", "--depth", "5", "--seed", "7"])
}

#[test]
fn test_text_output() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempdir()?;
    let output_file = tmp_dir.path().join("meadow.txt");

    let mut cmd = forge();
    small_grid(&mut cmd).arg("--output-path").arg(&output_file);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Generated 75 tiles"))
        .stderr(predicate::str::contains("Generation completed successfully"));

    let content = fs::read_to_string(&output_file)?;
    assert!(content.starts_with("# 5x3x5"));
    assert!(content.contains("layer 2"));
    assert!(content.contains("floor floor floor floor floor"));
    assert!(content.contains("hedge"));
    assert!(content.contains("tower"));
    Ok(())
}

#[test]
fn test_json_output() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempdir()?;
    let output_file = tmp_dir.path().join("meadow.json");

    let mut cmd = forge();
    small_grid(&mut cmd)
        .args(["--output-format", "json", "--optimize"])
        .arg("--output-path")
        .arg(&output_file);
    cmd.assert().success();

    let report: serde_json::Value = serde_json::from_str(&fs::read_to_string(&output_file)?)?;
    assert_eq!(report["dimensions"], serde_json::json!([5, 3, 5]));
    let placements = report["placements"].as_array().unwrap();
    assert_eq!(placements.len(), 75);
    let towers = placements.iter().filter(|p| p["name"] == "tower").count();
    assert_eq!(towers, 1);
    Ok(())
}

#[test]
fn test_csv_output() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempdir()?;
    let output_file = tmp_dir.path().join("meadow.csv");

    let mut cmd = forge();
    small_grid(&mut cmd)
        .args(["--output-format", "csv", "--cell-size", "2"])
        .arg("--output-path")
        .arg(&output_file);
    cmd.assert().success();

    let content = fs::read_to_string(&output_file)?;
    let mut lines = content.lines();
    assert_eq!(
        lines.next(),
        Some("x,y,z,tile,type,rotation,pos_x,pos_y,pos_z,scale_x,scale_y,scale_z")
    );
    assert_eq!(lines.next(), Some("0,0,0,floor,ground,0,0,0,0,1,1,1"));
    assert_eq!(content.lines().count(), 76);
    Ok(())
}

#[test]
fn test_settings_file_layers() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempdir()?;
    let output_file = tmp_dir.path().join("layered.json");

    let mut cmd = forge();
    cmd.arg("--settings-file")
        .arg(demo("forge.toml"))
        .env("SOCKET_FORGE_DIM_Z", "6")
        .args(["--output-format", "json"])
        .arg("--output-path")
        .arg(&output_file);
    cmd.assert().success();

    let report: serde_json::Value = serde_json::from_str(&fs::read_to_string(&output_file)?)?;
    assert_eq!(report["dimensions"], serde_json::json!([8, 3, 6]));
    assert_eq!(report["cell_size"], 2.0);
    let placements = report["placements"].as_array().unwrap();
    assert_eq!(placements.len(), 8 * 3 * 6 - 1);
    assert!(placements
        .iter()
        .all(|p| p["coords"] != serde_json::json!([3, 1, 3])));
    Ok(())
}

#[test]
fn test_preview_layer() {
    let mut cmd = forge();
    small_grid(&mut cmd).args(["--preview-layer", "1"]);
    cmd.env("NO_COLOR", "1")
        .assert()
        .success()
        .stdout(predicate::str::contains("--- Layer 1 ---"))
        .stdout(predicate::str::contains("hedge"));
}

#[test]
fn test_benchmark_mode() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempdir()?;
    let csv_file = tmp_dir.path().join("bench.csv");

    let mut cmd = forge();
    small_grid(&mut cmd)
        .args(["--benchmark-runs", "2"])
        .arg("--benchmark-csv-output")
        .arg(&csv_file);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Benchmark: 2/2 runs succeeded"));

    let content = fs::read_to_string(&csv_file)?;
    assert_eq!(content.lines().count(), 3);
    Ok(())
}

#[test]
fn test_missing_rule_file_fails() {
    let mut cmd = Command::cargo_bin("socket-forge").unwrap();
    cmd.args(["--rule-file", "does/not/exist.ron"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("I/O error reading file"));
}

#[test]
fn test_unsupported_rule_format_fails() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempdir()?;
    let rules = tmp_dir.path().join("rules.json");
    fs::write(&rules, "{}")?;

    let mut cmd = Command::cargo_bin("socket-forge")?;
    cmd.arg("--rule-file")
        .arg(&rules)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported catalog format"));
    Ok(())
}

#[test]
fn test_too_small_grid_fails() {
    let mut cmd = forge();
    cmd.args(["--width", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Grid dimension x is 1"));
}

#[test]
fn test_border_needs_layers() {
    let mut cmd = forge();
    cmd.args(["--height", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Border tile requires at least 2 Y layers"));
}
