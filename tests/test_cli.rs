//! CLI tests for the apigee-variabilizer binary

mod common;

use assert_cmd::Command;
use common::{cli, cli_with_env, create_temp_file, fixtures, ExitStatus, MockEnvironment};
use predicates::prelude::*;

fn fixture(name: &str) -> String {
    fixtures::fixture_path(name).to_string_lossy().to_string()
}

// =============================================================================
// Basic invocation
// =============================================================================

#[test]
fn test_help_exits_successfully() {
    Command::cargo_bin("apigee-variabilizer")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--start-index"));
}

#[test]
fn test_no_inputs_is_usage_error() {
    let response = cli(&[]);
    assert_eq!(response.exit_status, ExitStatus::Error);
    assert!(response.stderr.contains("usage:"));
}

#[test]
fn test_unknown_flag_is_error() {
    let response = cli(&["--no-such-flag"]);
    assert_eq!(response.exit_status, ExitStatus::Error);
}

#[test]
fn test_missing_spec_reports_error() {
    Command::cargo_bin("apigee-variabilizer")
        .unwrap()
        .env("APIGEE_VARIABILIZER_CONFIG_DIR", MockEnvironment::new().config_path())
        .arg("/nonexistent/spec.yaml")
        .assert()
        .code(1)
        .stderr(predicate::str::starts_with("Error: IO error"));
}

// =============================================================================
// JSON output
// =============================================================================

#[test]
fn test_spec_json_report() {
    let response = cli(&[&fixture("orders-v3.yaml")]);
    assert_eq!(response.exit_status, ExitStatus::Success, "stderr: {}", response.stderr);

    let json = response.json();
    let report = &json[0];
    assert_eq!(report["title"], "Orders API");
    assert_eq!(report["servers"][1]["environment"], "uat1");
    assert_eq!(report["result"]["hasVariabilization"], true);
    assert_eq!(report["result"]["variabilizedPath"], "{private.backend_info_1}/orders/v2");
    assert_eq!(report["result"]["kvmEntries"][0]["name"], "backend_info_1");
}

#[test]
fn test_start_index_and_groups() {
    let response = cli(&[
        &fixture("orders-v3.yaml"),
        &fixture("tenant-v3.json"),
        "--server", "dev1=https://api.example.com/a/v1",
        "--server", "prod1=https://api.example.com/b/v1",
        "--start-index", "20",
    ]);
    assert_eq!(response.exit_status, ExitStatus::Success, "stderr: {}", response.stderr);

    let json = response.json();
    assert_eq!(json.as_array().map(Vec::len), Some(3));
    assert_eq!(json[0]["result"]["kvmEntries"][0]["index"], 20);
    assert_eq!(json[1]["result"]["kvmEntries"][0]["index"], 21);
    assert_eq!(json[1]["result"]["kvmEntries"][1]["index"], 22);
    assert_eq!(json[2]["source"], "--server");
    assert_eq!(json[2]["result"]["kvmEntries"][0]["index"], 23);
    assert_eq!(json[2]["result"]["kvmEntries"][0]["values"]["prod1"], "/b");
}

#[test]
fn test_list_only_prints_servers() {
    let response = cli(&[&fixture("orders-v3.yaml"), "--list"]);
    assert_eq!(response.exit_status, ExitStatus::Success);

    let json = response.json();
    assert!(json[0].get("result").is_none());
    assert_eq!(json[0]["servers"][2]["environment"], "prod1");
}

// =============================================================================
// Other formats and output file
// =============================================================================

#[test]
fn test_summary_format() {
    let response = cli(&[&fixture("hosts-v2.json"), "--format", "summary"]);
    assert_eq!(response.exit_status, ExitStatus::Success);
    assert!(response.contains("Legacy Inventory v1.3"));
    assert!(response.contains("No variabilization needed"));
    assert!(response.contains("Host: inventory.internal.example.com:8443"));
}

#[test]
fn test_summary_shows_server_variable_hints() {
    let response = cli(&[&fixture("tenant-v3.json"), "--format", "summary"]);
    assert_eq!(response.exit_status, ExitStatus::Success);
    assert!(response.contains("backend_info_1 (tenant)"));
    assert!(response.contains("default    \"acme\""));
    assert!(response.contains("allowed    v1, v2"));
}

#[test]
fn test_debug_prints_config_dir() {
    let env = MockEnvironment::new();
    let response = cli_with_env(&[&fixture("hosts-v2.json"), "--debug"], &env);
    assert_eq!(response.exit_status, ExitStatus::Success);
    assert!(response.stderr.contains(&format!("config dir {}", env.config_path().display())));
}

#[test]
fn test_yaml_output_to_file() {
    let (dir, _) = create_temp_file("placeholder.txt", "");
    let out_path = dir.path().join("report.yaml");

    let response = cli(&[
        &fixture("tenant-v3.json"),
        "-f", "yaml",
        "-o", out_path.to_str().unwrap(),
    ]);
    assert_eq!(response.exit_status, ExitStatus::Success);
    assert!(response.stdout.is_empty());
    assert!(response.stderr.contains("Report written to"));

    let written = std::fs::read_to_string(&out_path).unwrap();
    assert!(written.contains("originalName: tenant"));
    assert!(written.contains("originalName: basePath"));
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn test_config_defaults_and_reference_format() {
    let env = MockEnvironment::new();
    env.write_config(
        r#"
[defaults]
start_index = 7

[variabilizer]
reference_scope = "kvm."
variable_prefix = "target_"
"#,
    );

    let response = cli_with_env(&[&fixture("orders-v3.yaml")], &env);
    assert_eq!(response.exit_status, ExitStatus::Success, "stderr: {}", response.stderr);

    let json = response.json();
    let result = &json[0]["result"];
    assert_eq!(result["kvmEntries"][0]["index"], 7);
    assert_eq!(result["kvmEntries"][0]["name"], "target_7");
    assert_eq!(result["variabilizedPath"], "{kvm.target_7}/orders/v2");
}

#[test]
fn test_config_default_options() {
    let env = MockEnvironment::new();
    env.write_config("[defaults]\noptions = [\"--format\", \"summary\"]\n");

    let response = cli_with_env(&[&fixture("hosts-v2.json")], &env);
    assert_eq!(response.exit_status, ExitStatus::Success);
    assert!(response.contains("Servers (1):"));
}

#[test]
fn test_invalid_config_falls_back_to_defaults() {
    let env = MockEnvironment::new();
    env.write_config("[defaults\n");

    let response = cli_with_env(&[&fixture("hosts-v2.json")], &env);
    assert_eq!(response.exit_status, ExitStatus::Success);
    assert!(response.stderr.contains("Failed to load config"));
}

#[test]
fn test_explicit_config_file() {
    let (_dir, path) = create_temp_file(
        "custom.toml",
        "[variabilizer]\nenvironments = [\"test\", \"prod\"]\n",
    );

    let response = cli(&[
        "--config", path.to_str().unwrap(),
        "--server", "test=https://api.example.com/t/v1",
        "--server", "prod=https://api.example.com/p/v1",
    ]);
    assert_eq!(response.exit_status, ExitStatus::Success, "stderr: {}", response.stderr);

    let json = response.json();
    let values = &json[0]["result"]["kvmEntries"][0]["values"];
    assert_eq!(values.as_object().map(|o| o.len()), Some(2));
    assert_eq!(values["test"], "/t");
}
