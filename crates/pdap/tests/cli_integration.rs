//! CLI integration tests for the pdap command-line interface.
//!
//! These tests cover help output, argument parsing and the commands that
//! work without an API server (session status, OAuth URL, route guard).
//! Each command runs against an empty config directory.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get a command for the pdap binary, isolated in `dir`.
fn pdap(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("pdap").unwrap();
    cmd.current_dir(dir.path())
        .env("PDAP_CONFIG_DIR", dir.path())
        .env_remove("PDAP_API_BASE_URL")
        .env_remove("PDAP_APP_BASE_URL")
        .env_remove("PDAP_PASSWORD");
    cmd
}

// ─────────────────────────────────────────────────────────────────────────────
// Help and Version Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_help_displays() {
    let dir = TempDir::new().unwrap();
    pdap(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("police data sources"));
}

#[test]
fn test_version_displays() {
    let dir = TempDir::new().unwrap();
    pdap(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("pdap"));
}

#[test]
fn test_help_lists_subcommands() {
    let dir = TempDir::new().unwrap();
    pdap(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("auth"))
        .stdout(predicate::str::contains("user"))
        .stdout(predicate::str::contains("sources"))
        .stdout(predicate::str::contains("search"))
        .stdout(predicate::str::contains("route"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_auth_help_lists_subcommands() {
    let dir = TempDir::new().unwrap();
    pdap(&dir)
        .args(["auth", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("login-github"))
        .stdout(predicate::str::contains("link-github"))
        .stdout(predicate::str::contains("oauth-url"))
        .stdout(predicate::str::contains("refresh"))
        .stdout(predicate::str::contains("logout"));
}

#[test]
fn test_user_help_lists_subcommands() {
    let dir = TempDir::new().unwrap();
    pdap(&dir)
        .args(["user", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("signup"))
        .stdout(predicate::str::contains("change-password"))
        .stdout(predicate::str::contains("request-reset"))
        .stdout(predicate::str::contains("validate-token"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Global Flag Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_global_flags_accepted() {
    let dir = TempDir::new().unwrap();
    pdap(&dir)
        .args(["--verbose", "--json", "--api-url", "http://localhost:9", "--help"])
        .assert()
        .success();
}

#[test]
fn test_unknown_subcommand_rejected() {
    let dir = TempDir::new().unwrap();
    pdap(&dir)
        .arg("frobnicate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Argument Validation
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_login_requires_email() {
    let dir = TempDir::new().unwrap();
    pdap(&dir)
        .args(["auth", "login", "--password", "hunter2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--email"));
}

#[test]
fn test_sources_get_requires_id() {
    let dir = TempDir::new().unwrap();
    pdap(&dir).args(["sources", "get"]).assert().failure();
}

#[test]
fn test_sources_create_requires_body() {
    let dir = TempDir::new().unwrap();
    pdap(&dir).args(["sources", "create"]).assert().failure();
}

#[test]
fn test_sources_create_rejects_both_bodies() {
    let dir = TempDir::new().unwrap();
    pdap(&dir)
        .args(["sources", "create", "--data", "{}", "--file", "body.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_sources_create_rejects_invalid_json() {
    let dir = TempDir::new().unwrap();
    pdap(&dir)
        .args(["sources", "create", "--data", "{not json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not valid JSON"));
}

#[test]
fn test_sources_create_requires_sign_in() {
    let dir = TempDir::new().unwrap();
    pdap(&dir)
        .args(["sources", "create", "--data", r#"{"name": "Records"}"#])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Sign in first"));
}

#[test]
fn test_search_param_must_be_key_value() {
    let dir = TempDir::new().unwrap();
    pdap(&dir)
        .args(["search", "run", "--param", "nokey"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("key=value"));
}

#[test]
fn test_search_requires_a_filter() {
    let dir = TempDir::new().unwrap();
    pdap(&dir)
        .args(["search", "run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least one"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Offline Commands
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_status_signed_out() {
    let dir = TempDir::new().unwrap();
    pdap(&dir)
        .args(["auth", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("signed out"));
}

#[test]
fn test_status_json() {
    let dir = TempDir::new().unwrap();
    pdap(&dir)
        .args(["--json", "auth", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""phase": "signed out""#))
        .stdout(predicate::str::contains(r#""user_id": null"#));
}

#[test]
fn test_logout_without_session() {
    let dir = TempDir::new().unwrap();
    pdap(&dir)
        .args(["auth", "logout"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Signed out"));
}

#[test]
fn test_oauth_url_uses_api_url() {
    let dir = TempDir::new().unwrap();
    pdap(&dir)
        .args([
            "--api-url",
            "https://api.example.org/api",
            "auth",
            "oauth-url",
            "--return-path",
            "/profile",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "https://api.example.org/api/auth/oauth?redirect_url=http%3A%2F%2Flocalhost%3A5173%2Fprofile",
        ));
}

#[test]
fn test_route_gated_redirects_to_sign_in() {
    let dir = TempDir::new().unwrap();
    pdap(&dir)
        .args(["--json", "route", "/profile?tab=1"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""landed": "/sign-in""#))
        .stdout(predicate::str::contains(r#""requires_auth": true"#))
        .stdout(predicate::str::contains(r#""redirect_to": "/profile""#));
}

#[test]
fn test_route_gated_saves_return_path() {
    let dir = TempDir::new().unwrap();
    pdap(&dir).args(["route", "/profile"]).assert().success();

    let saved = std::fs::read_to_string(dir.path().join("session.json")).unwrap();
    assert!(saved.contains(r#""redirect_to": "/profile""#));
}

#[test]
fn test_route_public_proceeds() {
    let dir = TempDir::new().unwrap();
    pdap(&dir)
        .args(["--json", "route", "/data-source/42"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""landed": "/data-source/42""#))
        .stdout(predicate::str::contains(r#""requires_auth": false"#));
}

#[test]
fn test_route_home_is_duplicate() {
    let dir = TempDir::new().unwrap();
    pdap(&dir)
        .args(["route", "/"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already at /"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Config Command
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_config_set_then_show() {
    let dir = TempDir::new().unwrap();
    pdap(&dir)
        .args(["config", "set", "api.base_url", "https://api.example.org/"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Set api.base_url"));

    assert!(dir.path().join("config.toml").is_file());

    pdap(&dir)
        .args(["--json", "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""base_url": "https://api.example.org""#));
}

#[test]
fn test_config_set_local_writes_project_file() {
    let dir = TempDir::new().unwrap();
    pdap(&dir)
        .args(["config", "set", "--local", "cache.default_ttl_secs", "30"])
        .assert()
        .success();

    assert!(dir.path().join("pdap.toml").is_file());

    pdap(&dir)
        .args(["--json", "config", "which"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""layer": "project""#))
        .stdout(predicate::str::contains(r#""loaded": true"#));
}

#[test]
fn test_config_set_unknown_key() {
    let dir = TempDir::new().unwrap();
    pdap(&dir)
        .args(["config", "set", "api.colour", "blue"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown config key"));
}

#[test]
fn test_config_show_masks_plaintext_key() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("config.toml"),
        "[auth]\nservice_key = \"super-secret\"\n",
    )
    .unwrap();

    pdap(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("super-secret").not());
}
