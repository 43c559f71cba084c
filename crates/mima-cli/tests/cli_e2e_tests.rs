//! CLI end-to-end tests that invoke the compiled `mima` binary.
//!
//! Every test points `HOME` at a temporary directory so the real user
//! settings never leak in.

use assert_cmd::Command;
use assert_fs::TempDir;
use assert_fs::prelude::*;
use predicates::prelude::*;

/// Get a Command for the mima binary with an isolated home
fn mima(home: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("mima"));
    cmd.env("HOME", home.path())
        .env_remove("MIMA_SETTINGS")
        .env_remove("RUST_LOG");
    cmd
}

fn write_settings(home: &TempDir, content: &str) {
    home.child(".mima/settings.toml").write_str(content).unwrap();
}

#[test]
fn help_lists_commands() {
    let home = TempDir::new().unwrap();
    mima(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("settings"))
        .stdout(predicate::str::contains("route"));
}

#[test]
fn context_defaults_to_central_and_home_repository() {
    let home = TempDir::new().unwrap();
    let output = mima(&home).args(["context", "--json"]).output().unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["remoteRepositories"].as_array().unwrap().len(), 1);
    assert_eq!(json["remoteRepositories"][0]["id"], "central");
    assert_eq!(
        json["localRepository"],
        home.path().join(".mima").join("repository").display().to_string()
    );
    assert_eq!(json["offline"], false);
}

#[test]
fn context_applies_overrides() {
    let home = TempDir::new().unwrap();
    let output = mima(&home)
        .args([
            "context",
            "--json",
            "--offline",
            "--local-repository",
            "/tmp/repo",
            "--repository",
            "releases::https://repo.example.com/releases",
            "-D",
            "build.id=42",
            "--checksum-policy",
            "fail",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["localRepository"], "/tmp/repo");
    assert_eq!(json["offline"], true);
    assert_eq!(json["checksumPolicy"], "fail");
    assert_eq!(json["remoteRepositories"][0]["id"], "releases");
    assert_eq!(json["properties"]["user"]["build.id"], "42");
    assert_eq!(json["properties"]["config"]["build.id"], "42");
}

#[test]
fn settings_json_masks_passwords() {
    let home = TempDir::new().unwrap();
    write_settings(
        &home,
        r#"
[[servers]]
id = "corp"
username = "deployer"
password = "hunter2"
"#,
    );

    mima(&home)
        .args(["settings", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("deployer"))
        .stdout(predicate::str::contains("hunter2").not());
}

#[test]
fn no_settings_ignores_user_file() {
    let home = TempDir::new().unwrap();
    write_settings(&home, "offline = true\n");

    let output = mima(&home)
        .args(["context", "--json", "--no-settings"])
        .output()
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["offline"], false);
}

#[test]
fn malformed_settings_exit_with_error() {
    let home = TempDir::new().unwrap();
    write_settings(&home, "mirrors = = broken");

    mima(&home)
        .arg("context")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("error"))
        .stderr(predicate::str::contains("settings stage"));
}

#[test]
fn missing_explicit_settings_file_is_an_error() {
    let home = TempDir::new().unwrap();
    mima(&home)
        .args(["settings", "--settings"])
        .arg(home.path().join("absent.toml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn route_reports_mirror_and_credentials() {
    let home = TempDir::new().unwrap();
    write_settings(
        &home,
        r#"
[[mirrors]]
id = "corp-mirror"
url = "https://nexus.example.com/public"
mirrorOf = "*"

[[servers]]
id = "corp-mirror"
username = "reader"
password = "secret"
"#,
    );

    mima(&home)
        .args(["route", "https://repo.maven.apache.org/maven2/"])
        .assert()
        .success()
        .stdout(predicate::str::contains("corp-mirror"))
        .stdout(predicate::str::contains("reader"))
        .stdout(predicate::str::contains("secret").not());
}

#[test]
fn route_rejects_bad_url() {
    let home = TempDir::new().unwrap();
    mima(&home)
        .args(["route", "not a url"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a valid repository URL"));
}

#[test]
fn completions_generate_script() {
    let home = TempDir::new().unwrap();
    mima(&home)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("mima"));
}

#[test]
fn header_tokens_and_environment_never_reach_stdout() {
    let home = TempDir::new().unwrap();
    write_settings(
        &home,
        r#"
[[servers]]
id = "corp"

[servers.configuration]
httpHeaders = [{ name = "Authorization", value = "Bearer ${env.MIMA_E2E_TOKEN}" }]
"#,
    );

    for command in ["settings", "context"] {
        mima(&home)
            .env("MIMA_E2E_TOKEN", "tok-4f1d9a")
            .args([command, "--json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Authorization"))
            .stdout(predicate::str::contains("tok-4f1d9a").not());
    }
}

#[test]
fn route_skips_blocked_mirror() {
    let home = TempDir::new().unwrap();
    write_settings(
        &home,
        r#"
[[mirrors]]
id = "blocker"
url = "http://0.0.0.0/"
mirrorOf = "*"
blocked = true
"#,
    );

    mima(&home)
        .args(["route", "https://repo.maven.apache.org/maven2/"])
        .assert()
        .success()
        .stdout(predicate::str::contains("none"))
        .stdout(predicate::str::contains("blocker"))
        .stdout(predicate::str::contains("(blocked)"));
}
