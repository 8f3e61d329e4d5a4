//! Integration tests for the hirag CLI

use std::process::Command;

fn cargo_run(args: &[&str]) -> std::process::Output {
    Command::new("cargo")
        .args(["run", "--quiet", "--"])
        .args(args)
        .output()
        .expect("Failed to run command")
}

#[test]
fn test_cli_help() {
    let output = cargo_run(&["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("retrieve"));
    assert!(stdout.contains("serve"));
    assert!(stdout.contains("config"));
}

#[test]
fn test_cli_version() {
    let output = cargo_run(&["--version"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("hirag"));
}

#[test]
fn test_retrieve_help() {
    let output = cargo_run(&["retrieve", "--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--top-n"));
    assert!(stdout.contains("--n-questions"));
    assert!(stdout.contains("--format"));
}

#[test]
fn test_serve_help() {
    let output = cargo_run(&["serve", "--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--port"));
    assert!(stdout.contains("--cors"));
}

#[test]
fn test_config_help() {
    let output = cargo_run(&["config", "--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("show"));
    assert!(stdout.contains("init"));
    assert!(stdout.contains("path"));
}

#[test]
fn test_config_path() {
    let output = cargo_run(&["config", "path"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("config.toml"));
}
