//! Configuration integration tests.
//!
//! Config discovery, format parsing, and precedence checked through
//! `gitstep info --json`, which reports the resolved settings.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Returns a Command configured to run our binary.
#[allow(deprecated)]
fn cmd(logs: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin(env!("CARGO_PKG_NAME")).unwrap();
    cmd.env("GITSTEP_LOG_DIR", logs.path());
    cmd
}

/// Run `info --json` from `dir` and return the `config` object.
fn resolved_config(dir: &Path) -> serde_json::Value {
    let logs = TempDir::new().unwrap();
    let output = cmd(&logs)
        .args(["-C", dir.to_str().unwrap(), "info", "--json"])
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    json["config"].clone()
}

// =============================================================================
// Config File Discovery
// =============================================================================

#[test]
fn runs_without_config_file() {
    let tmp = TempDir::new().unwrap();
    let config = resolved_config(tmp.path());
    assert!(config["config_file"].is_null());
    assert_eq!(config["commit_template"], "{type}{scope}{breaking}: {message}");
}

#[test]
fn discovers_dotfile_config_in_current_dir() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join(".gitstep.toml"),
        "[commit]\nscopes = [\"cli\"]\n",
    )
    .unwrap();

    let config = resolved_config(tmp.path());
    assert_eq!(config["commit_scopes"][0], "cli");
}

#[test]
fn discovers_config_in_parent_directory() {
    let tmp = TempDir::new().unwrap();
    let sub_dir = tmp.path().join("nested").join("deep");
    fs::create_dir_all(&sub_dir).unwrap();
    fs::write(
        tmp.path().join("gitstep.toml"),
        "[branch]\ntemplate = \"{type}-{description}\"\n",
    )
    .unwrap();

    let config = resolved_config(&sub_dir);
    assert_eq!(config["branch_template"], "{type}-{description}");
}

// =============================================================================
// Config Format Parsing
// =============================================================================

#[test]
fn parses_yaml_config() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join(".gitstep.yaml"),
        "commit:\n  types:\n    - name: feat\n    - name: fix\n",
    )
    .unwrap();

    let config = resolved_config(tmp.path());
    assert_eq!(config["commit_types"], serde_json::json!(["feat", "fix"]));
}

#[test]
fn parses_yml_config() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join(".gitstep.yml"), "log_level: debug\n").unwrap();
    assert_eq!(resolved_config(tmp.path())["log_level"], "debug");
}

#[test]
fn parses_json_config() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join(".gitstep.json"),
        r#"{"branch": {"types": ["topic"]}}"#,
    )
    .unwrap();
    assert_eq!(
        resolved_config(tmp.path())["branch_types"],
        serde_json::json!(["topic"])
    );
}

// =============================================================================
// Config Precedence
// =============================================================================

#[test]
fn closer_config_takes_precedence() {
    let tmp = TempDir::new().unwrap();
    let sub_dir = tmp.path().join("project");
    fs::create_dir_all(&sub_dir).unwrap();
    fs::write(tmp.path().join(".gitstep.toml"), r#"log_level = "error""#).unwrap();
    fs::write(sub_dir.join(".gitstep.toml"), r#"log_level = "debug""#).unwrap();

    assert_eq!(resolved_config(&sub_dir)["log_level"], "debug");
}

#[test]
fn toml_preferred_over_yaml_in_same_directory() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join(".gitstep.toml"), r#"log_level = "debug""#).unwrap();
    fs::write(tmp.path().join(".gitstep.yaml"), "log_level: error\n").unwrap();

    assert_eq!(resolved_config(tmp.path())["log_level"], "debug");
}

#[test]
fn explicit_config_flag_overrides_discovered() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join(".gitstep.toml"), r#"log_level = "debug""#).unwrap();
    let explicit = tmp.path().join("override.toml");
    fs::write(&explicit, r#"log_level = "warn""#).unwrap();

    let logs = TempDir::new().unwrap();
    let output = cmd(&logs)
        .args([
            "-C",
            tmp.path().to_str().unwrap(),
            "--config",
            explicit.to_str().unwrap(),
            "info",
            "--json",
        ])
        .assert()
        .success();
    let json: serde_json::Value =
        serde_json::from_slice(&output.get_output().stdout).unwrap();
    assert_eq!(json["config"]["log_level"], "warn");
}

#[test]
fn configured_template_drives_dry_run() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join(".gitstep.toml"),
        "[commit]\ntemplate = \"{type}: {message}{breaking}\"\n",
    )
    .unwrap();

    let logs = TempDir::new().unwrap();
    cmd(&logs)
        .args([
            "-C",
            tmp.path().to_str().unwrap(),
            "commit",
            "-t",
            "docs",
            "-s",
            "readme",
            "-m",
            "fix typo",
            "--breaking=false",
            "--no-body",
            "--dry-run",
        ])
        .assert()
        .success()
        .stdout("docs: fix typo\n");
}

// =============================================================================
// Error Cases
// =============================================================================

#[test]
fn invalid_toml_config_shows_error() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join(".gitstep.toml"), "this is not valid toml [[[").unwrap();

    let logs = TempDir::new().unwrap();
    cmd(&logs)
        .args(["-C", tmp.path().to_str().unwrap(), "info"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration"));
}

#[test]
fn invalid_json_config_shows_error() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join(".gitstep.json"), "{not valid json}").unwrap();

    let logs = TempDir::new().unwrap();
    cmd(&logs)
        .args(["-C", tmp.path().to_str().unwrap(), "info"])
        .assert()
        .failure();
}

#[test]
fn unknown_config_field_is_ignored() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join(".gitstep.toml"),
        "log_level = \"info\"\nunknown_field = \"ignored\"\n",
    )
    .unwrap();

    assert_eq!(resolved_config(tmp.path())["log_level"], "info");
}

// =============================================================================
// Boundary Marker
// =============================================================================

#[test]
fn git_boundary_stops_config_search() {
    let tmp = TempDir::new().unwrap();
    let parent = tmp.path().join("parent");
    let repo = parent.join("repo");
    let src = repo.join("src");
    fs::create_dir_all(&src).unwrap();
    fs::write(parent.join(".gitstep.toml"), r#"log_level = "error""#).unwrap();
    fs::create_dir(repo.join(".git")).unwrap();

    assert_eq!(resolved_config(&src)["log_level"], "info");
}

#[test]
fn config_in_same_dir_as_git_is_found() {
    let tmp = TempDir::new().unwrap();
    let repo = tmp.path().join("repo");
    let src = repo.join("src");
    fs::create_dir_all(&src).unwrap();
    fs::create_dir(repo.join(".git")).unwrap();
    fs::write(repo.join(".gitstep.toml"), r#"log_level = "debug""#).unwrap();

    assert_eq!(resolved_config(&src)["log_level"], "debug");
}
