mod common;

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

use common::{MockServer, Route};

const GENERATE: &str =
    "/v1/projects/proj/locations/us-central1/publishers/google/models/gemini-test:generateContent";

const TREE: &str = r#"{
  "sha": "root",
  "tree": [
    { "path": "docs", "type": "tree", "sha": "t0" },
    { "path": "docs/a.md", "type": "blob", "sha": "sha-a" },
    { "path": "docs/b.md", "type": "blob", "sha": "sha-b" },
    { "path": "README.md", "type": "blob", "sha": "sha-r" }
  ],
  "truncated": false
}"#;

const REPLY: &str = r#"{"candidates":[{"content":{"parts":[{"text":"Bonjour"}]}}]}"#;

fn github_routes(tree: &str) -> Vec<Route> {
    vec![
        Route::new("GET", "/repos/acme/handbook", 200, r#"{"default_branch":"main"}"#),
        Route::new("GET", "/repos/acme/handbook/git/trees/main", 200, tree),
        Route::new("GET", "/acme/handbook/main/docs/a.md", 200, "Hello"),
        Route::new("GET", "/acme/handbook/main/docs/b.md", 200, "World"),
        Route::new("POST", GENERATE, 200, REPLY),
    ]
}

/// `mirrorsync` with a clean environment rooted at `dir`.
fn mirrorsync(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("mirrorsync").unwrap();
    cmd.current_dir(dir).env_clear().env("NO_COLOR", "1");
    cmd
}

/// Fully configured `mirrorsync` pointed at `base` for every service.
fn configured(dir: &Path, base: &str) -> Command {
    fs::write(dir.join("prompt.txt"), "Translate to French:").unwrap();
    let mut cmd = mirrorsync(dir);
    cmd.env("MIRRORSYNC_OWNER", "acme")
        .env("MIRRORSYNC_REPO", "handbook")
        .env("MIRRORSYNC_PATH_PREFIX", "docs/")
        .env("MIRRORSYNC_EXTENSION", ".md")
        .env("MIRRORSYNC_PROMPT", dir.join("prompt.txt"))
        .env("MIRRORSYNC_OUTPUT_DIR", dir.join("out"))
        .env("MIRRORSYNC_STORE_PATH", dir.join("state/fingerprints.json"))
        .env("MIRRORSYNC_VERTEX_PROJECT", "proj")
        .env("MIRRORSYNC_VERTEX_LOCATION", "us-central1")
        .env("MIRRORSYNC_VERTEX_MODEL", "gemini-test")
        .env("MIRRORSYNC_VERTEX_ENDPOINT", base)
        .env("MIRRORSYNC_GITHUB_API", base)
        .env("MIRRORSYNC_GITHUB_RAW", base)
        .env("MIRRORSYNC_TIMEOUT_SECS", "5");
    cmd
}

#[test]
fn missing_configuration_names_every_env_var() {
    let dir = TempDir::new().unwrap();
    mirrorsync(dir.path())
        .arg("sync")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("MIRRORSYNC_OWNER"))
        .stderr(predicate::str::contains("MIRRORSYNC_EXTENSION"))
        .stderr(predicate::str::contains("MIRRORSYNC_VERTEX_MODEL"));
}

#[test]
fn config_command_redacts_credentials() {
    let dir = TempDir::new().unwrap();
    configured(dir.path(), "http://127.0.0.1:9")
        .env("GITHUB_TOKEN", "ghp_supersecret")
        .env("MIRRORSYNC_VERTEX_TOKEN", "ya29.supersecret")
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("<redacted>"))
        .stdout(predicate::str::contains("supersecret").not())
        .stdout(predicate::str::contains("handbook"));
}

#[test]
fn config_file_is_read_from_working_directory() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("mirrorsync.yaml"),
        "owner: acme\nrepo: handbook\nextension: .md\nprompt: p.txt\n\
         vertex:\n  project: proj\n  location: europe-west4\n  model: gemini-test\n",
    )
    .unwrap();
    mirrorsync(dir.path())
        .args(["config", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("europe-west4"));
}

#[test]
fn plan_lists_changes_without_calling_the_model() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start(github_routes(TREE));

    configured(dir.path(), &server.base)
        .arg("plan")
        .assert()
        .success()
        .stdout(predicate::str::contains("2 to transform"))
        .stdout(predicate::str::contains("docs/a.md"))
        .stdout(predicate::str::contains("README.md").not());

    let requests = server.requests();
    assert!(requests.iter().all(|r| r.method == "GET"));
    assert!(requests
        .iter()
        .any(|r| r.url == "/repos/acme/handbook/git/trees/main?recursive=1"));
    assert!(!dir.path().join("state/fingerprints.json").exists());
}

#[test]
fn sync_writes_outputs_then_second_run_is_a_no_op() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start(github_routes(TREE));

    configured(dir.path(), &server.base)
        .arg("sync")
        .assert()
        .success()
        .stdout(predicate::str::contains("2 written"));

    assert_eq!(
        fs::read_to_string(dir.path().join("out/docs/a.md")).unwrap(),
        "Bonjour"
    );
    let store: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(dir.path().join("state/fingerprints.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(
        store,
        serde_json::json!({ "docs/a.md": "sha-a", "docs/b.md": "sha-b" })
    );
    let generations = server.requests().iter().filter(|r| r.method == "POST").count();
    assert_eq!(generations, 2);

    configured(dir.path(), &server.base)
        .arg("sync")
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing changed"));
    let generations = server.requests().iter().filter(|r| r.method == "POST").count();
    assert_eq!(generations, 2, "unchanged files must not be regenerated");
}

#[test]
fn sync_json_report_and_dry_run() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start(github_routes(TREE));

    let output = configured(dir.path(), &server.base)
        .args(["sync", "--dry-run", "--json", "--jobs", "2"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["outcomes"][0]["status"], "would_write");
    assert_eq!(report["outcomes"][1]["path"], "docs/b.md");
    assert_eq!(report["committed"], 0);
    assert!(!dir.path().join("out").exists());
    assert!(!dir.path().join("state/fingerprints.json").exists());
}

#[test]
fn empty_listing_fails_the_run() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start(github_routes(r#"{"tree": [], "truncated": false}"#));

    configured(dir.path(), &server.base)
        .arg("sync")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("no files under 'docs/'"));
}

#[test]
fn status_reports_missing_outputs() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("state")).unwrap();
    fs::write(
        dir.path().join("state/fingerprints.json"),
        r#"{ "docs/a.md": "sha-a", "docs/b.md": "sha-b" }"#,
    )
    .unwrap();
    fs::create_dir_all(dir.path().join("out/docs")).unwrap();
    fs::write(dir.path().join("out/docs/a.md"), "Bonjour").unwrap();

    let output = configured(dir.path(), "http://127.0.0.1:9")
        .args(["status", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["tracked"], 2);
    assert_eq!(report["missing"], 1);
    assert_eq!(report["files"][0]["present"], true);
    assert_eq!(report["files"][1]["present"], false);

    configured(dir.path(), "http://127.0.0.1:9")
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("2 tracked | 1 missing"));
}

#[test]
fn status_needs_only_local_paths() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("state")).unwrap();
    fs::write(
        dir.path().join("state/fingerprints.json"),
        r#"{ "docs/a.md": "sha-a" }"#,
    )
    .unwrap();

    let output = mirrorsync(dir.path())
        .env("MIRRORSYNC_STORE_PATH", dir.path().join("state/fingerprints.json"))
        .env("MIRRORSYNC_OUTPUT_DIR", dir.path().join("out"))
        .args(["status", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["repo"], serde_json::Value::Null);
    assert_eq!(report["store_exists"], true);
    assert_eq!(report["tracked"], 1);
    assert_eq!(report["missing"], 1);
}

#[test]
fn status_without_store_reports_never() {
    let dir = TempDir::new().unwrap();
    mirrorsync(dir.path())
        .env("MIRRORSYNC_STORE_PATH", dir.path().join("state/fingerprints.json"))
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("0 tracked | 0 missing | last sync never"))
        .stdout(predicate::str::contains("No fingerprint store at"));
}
