use assert_cmd::prelude::*;
use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;

// Simulated outputs; a short tick keeps one-second doses quick.
const VALID: &str = r#"
[device]
id = "aquarium"

[[channels]]
id = "NPK_1"
pin = 25

[[channels]]
id = "NPK_2"
pin = 26

[pins]
relay = 27
indicator = 2

[scheduler]
tick_ms = 10
"#;

fn write_config(dir: &tempfile::TempDir, toml: &str) -> PathBuf {
    let path = dir.path().join("cfg.toml");
    fs::write(&path, toml).unwrap();
    path
}

fn npk() -> Command {
    Command::cargo_bin("npk_pumps").unwrap()
}

#[rstest]
#[case(&["--help"], 0, "Usage:", "stdout")]
#[case(&["self-check"], 0, "ok", "stdout")]
#[case(&["dose", "--channel", "NPK_1", "1"], 0, "homie/aquarium/NPK_1/on 1", "stdout")]
#[case(&["dose", "--channel", "NPK_1", "1"], 0, "homie/aquarium/NPK_1/on false", "stdout")]
#[case(&["dose", "--channel", "NPK_2", "0"], 0, "homie/aquarium/NPK_2/on false", "stdout")]
#[case(&["dose", "--channel", "NPK_2", "-5"], 0, "homie/aquarium/NPK_2/on false", "stdout")]
#[case(&["dose", "--channel", "NPK_1", "abc"], 3, "no digits", "stderr")]
#[case(&["dose", "--channel", "NPK_9", "5"], 4, "NPK_9", "stderr")]
#[case(&["dose", "--channel", "NPK_1"], 2, "required", "stderr")]
fn cli_table_cases(
    #[case] args: &[&str],
    #[case] exit_code: i32,
    #[case] needle: &str,
    #[case] stream: &str,
) {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, VALID);

    let mut cmd = npk();
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
fn numeric_prefix_is_reported_normalized() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, VALID);

    let out = npk()
        .arg("--config")
        .arg(&cfg)
        .args(["dose", "--channel", "NPK_2", "1abc"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines,
        vec!["homie/aquarium/NPK_2/on 1", "homie/aquarium/NPK_2/on false"]
    );
}

#[rstest]
fn json_mode_prints_json_lines() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, VALID);

    let out = npk()
        .arg("--config")
        .arg(&cfg)
        .args(["--json", "dose", "--channel", "NPK_1", "1"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout).unwrap();
    let msgs: Vec<serde_json::Value> = stdout
        .lines()
        .map(|l| serde_json::from_str(l).expect("json line"))
        .collect();
    assert_eq!(msgs.len(), 2);
    assert_eq!(msgs[0]["topic"], "homie/aquarium/NPK_1/on");
    assert_eq!(msgs[0]["payload"], "1");
    assert_eq!(msgs[0]["retained"], true);
    assert_eq!(msgs[1]["payload"], "false");
}

#[rstest]
fn json_mode_reports_structured_errors() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, VALID);

    let out = npk()
        .arg("--config")
        .arg(&cfg)
        .args(["--json", "dose", "--channel", "NPK_1", "on"])
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(3));
    let stderr = String::from_utf8(out.stderr).unwrap();
    let last = stderr.lines().last().expect("error line");
    let v: serde_json::Value = serde_json::from_str(last).unwrap();
    assert_eq!(v["reason"], "InvalidCommand");
}

#[rstest]
fn rejects_config_with_one_channel() {
    let dir = tempdir().unwrap();
    let one = r#"
[[channels]]
id = "NPK_1"
pin = 25
"#;
    let cfg = write_config(&dir, one);

    npk()
        .arg("--config")
        .arg(&cfg)
        .arg("self-check")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Configuration is invalid"))
        .stderr(predicate::str::contains("exactly 2 pumps"));
}

#[rstest]
fn missing_config_file_is_explained() {
    let dir = tempdir().unwrap();

    npk()
        .arg("--config")
        .arg(dir.path().join("absent.toml"))
        .arg("self-check")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("read config"));
}
