use assert_cmd::Command;
use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

// Short cadences so a sub-second run exercises every check
fn write_valid_config(dir: &tempfile::TempDir) -> PathBuf {
    let toml = r#"
[sensor]
zero_samples = 16

[scale]
overweight_limit_g = 500.0
overweight_check_ms = 100
refresh_ms = 50

[timer]
period_us = 10000
"#;
    let path = dir.path().join("cfg.toml");
    fs::write(&path, toml).unwrap();
    path
}

fn last_json_line(stdout: &[u8]) -> serde_json::Value {
    let text = String::from_utf8_lossy(stdout);
    let line = text
        .lines()
        .rev()
        .find(|l| l.trim_start().starts_with('{'))
        .expect("a JSON line on stdout");
    serde_json::from_str(line).expect("valid JSON snapshot")
}

#[rstest]
#[case(&["--help"], 0, "Usage:", "stdout")]
#[case(&["self-check"], 0, "OK", "stdout")]
#[case(&["health"], 0, "healthy", "stdout")]
#[case(&["calibrate", "--known-grams", "500"], 0, "scale_factor", "stdout")]
#[case(&["calibrate"], 2, "required", "stderr")]
#[case(&["calibrate", "--known-grams", "0"], 3, "reference weight", "stderr")]
#[case(&["calibrate", "--known-grams", "5000"], 1, "saturates the converter", "stderr")]
fn cli_table_cases(
    #[case] args: &[&str],
    #[case] exit_code: i32,
    #[case] needle: &str,
    #[case] stream: &str,
) {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let mut cmd = Command::cargo_bin("scale").unwrap();
    cmd.arg("--config").arg(&cfg);
    for a in args {
        cmd.arg(a);
    }

    let assert = cmd.assert().code(exit_code);
    match stream {
        "stdout" => {
            assert.stdout(predicate::str::contains(needle));
        }
        "stderr" => {
            assert.stderr(predicate::str::contains(needle));
        }
        other => panic!("unknown stream: {other}"),
    }
}

#[rstest]
fn run_measures_simulated_load() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let out = Command::cargo_bin("scale")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .arg("--json")
        .args(["run", "--load-grams", "200", "--duration-ms", "400"])
        .write_stdin("measure\n")
        .output()
        .unwrap();
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let snap = last_json_line(&out.stdout);
    assert_eq!(snap["final"], true);
    assert_eq!(snap["measuring"], true);
    let w = snap["weight_g"].as_f64().unwrap();
    assert!((w - 200.0).abs() < 2.0, "weight {w}");
    assert_eq!(snap["alarm"], false);
}

#[rstest]
fn run_raises_overweight_alarm() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let out = Command::cargo_bin("scale")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .arg("--json")
        .args(["run", "--load-grams", "800", "--duration-ms", "600"])
        .write_stdin("measure\n")
        .output()
        .unwrap();
    assert!(out.status.success());
    let snap = last_json_line(&out.stdout);
    assert_eq!(snap["alarm"], true);
}

#[rstest]
fn keycheck_mode_blocks_measure_when_overweight() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let out = Command::cargo_bin("scale")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .arg("--json")
        .args([
            "run",
            "--mode",
            "keycheck",
            "--load-grams",
            "800",
            "--duration-ms",
            "300",
        ])
        .write_stdin("measure\n")
        .output()
        .unwrap();
    assert!(out.status.success());
    let snap = last_json_line(&out.stdout);
    assert_eq!(snap["measuring"], false);
    assert_eq!(snap["mode"], "keycheck");
    assert_eq!(snap["alarm"], true);
}

#[rstest]
fn quit_command_ends_run_early() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    Command::cargo_bin("scale")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .args(["run", "--duration-ms", "60000"])
        .write_stdin("quit\n")
        .timeout(std::time::Duration::from_secs(20))
        .assert()
        .success()
        .stdout(predicate::str::contains("measuring=false"));
}

#[rstest]
fn invalid_config_is_explained() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[keys]\ntare = 1\ncalib = 1\n").unwrap();

    Command::cargo_bin("scale")
        .unwrap()
        .arg("--config")
        .arg(&path)
        .arg("health")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Configuration is invalid"));
}

#[rstest]
fn json_errors_are_structured() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let out = Command::cargo_bin("scale")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .arg("--json")
        .args(["calibrate", "--known-grams", "0"])
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(3));
    let err = String::from_utf8_lossy(&out.stderr);
    let line = err
        .lines()
        .rev()
        .find(|l| l.contains("\"reason\""))
        .expect("json error line");
    let v: serde_json::Value = serde_json::from_str(line).unwrap();
    assert_eq!(v["reason"], "ZeroReferenceWeight");
}
