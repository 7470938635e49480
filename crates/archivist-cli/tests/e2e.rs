//! End-to-end tests for the archivist CLI.
//!
//! Tests invoke the `archivist` binary as a subprocess against a temporary
//! vault and verify its output and the files it leaves behind.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

const DATE: &str = "2024-03-07";
const PREFIX: &str = "24-03-07 - ";

fn archivist() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_archivist"));
    cmd.env_remove("ARCHIVIST_VAULT").env_remove("ARCHIVIST_LOG");
    cmd
}

fn archivist_in(dir: &Path) -> Command {
    let mut cmd = archivist();
    cmd.current_dir(dir);
    cmd
}

fn write(dir: &Path, relative: &str, content: &str) {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn run_ok(cmd: &mut Command) -> Output {
    let output = cmd.output().unwrap();
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    output
}

fn json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

/// A small vault: Home links to Notes/a, Notes/lost is linked from nowhere.
fn sample_vault(init_args: &[&str]) -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "Home.md", "# Home\n\nSee [[Notes/a]].\n");
    write(dir.path(), "Notes/a.md", "Alpha links back to [[Home]].\n");
    write(dir.path(), "Notes/lost.md", "Nobody links here.\n");
    run_ok(archivist_in(dir.path()).arg("init").args(init_args));
    dir
}

// === Init ===

#[test]
fn e2e_init_writes_default_config() {
    let dir = TempDir::new().unwrap();
    let output = run_ok(archivist_in(dir.path()).arg("init").arg("."));
    assert!(String::from_utf8_lossy(&output.stdout).contains("Initialized archivist vault"));

    let config = fs::read_to_string(dir.path().join(".archivist").join("config.toml")).unwrap();
    assert!(config.contains("archive_folder = \"Archive\""));
    assert!(config.contains("exclude_mirrors = false"));
}

#[test]
fn e2e_init_rejects_unknown_folders() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("Notes")).unwrap();
    let output = archivist_in(dir.path())
        .args(["init", ".", "--include", "Notes, Nonexistent"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Nonexistent"));
    assert!(!dir.path().join(".archivist").join("config.toml").exists());
}

// === Validate / Config ===

#[test]
fn e2e_validate_reports_mode_and_folders() {
    let dir = sample_vault(&["--include", "Notes", "--root", "Home.md"]);
    let result = json(&run_ok(archivist_in(dir.path()).arg("validate")));
    assert_eq!(result["included_folders"], serde_json::json!(["Notes"]));
    assert_eq!(result["root_file"], "Home.md");
    assert_eq!(result["mode"], "root_tracking");
}

#[test]
fn e2e_validate_names_the_first_invalid_folder() {
    let dir = sample_vault(&[]);
    write(
        dir.path(),
        ".archivist/config.toml",
        "archive_folder = \"Archive\"\nincluded_folders = \"Notes, Nonexistent\"\n",
    );
    let output = archivist_in(dir.path()).arg("validate").output().unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid folder: Nonexistent"), "{stderr}");
}

#[test]
fn e2e_config_prints_toml() {
    let dir = sample_vault(&["--root", "Home.md"]);
    let output = run_ok(archivist_in(dir.path()).arg("config"));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("root_file = \"Home.md\""));
}

#[test]
fn e2e_vault_flag_overrides_working_directory() {
    let dir = sample_vault(&[]);
    let elsewhere = TempDir::new().unwrap();
    let output = run_ok(
        archivist_in(elsewhere.path())
            .arg("--vault")
            .arg(dir.path())
            .arg("validate"),
    );
    assert_eq!(json(&output)["mode"], "orphan");
}

// === Archive ===

#[test]
fn e2e_archive_copy_keeps_original() {
    let dir = sample_vault(&[]);
    let output = run_ok(archivist_in(dir.path()).args(["archive", "Notes/lost.md", "--copy", "--date", DATE]));

    let result = json(&output);
    let archived = format!("Archive/{PREFIX}lost.md");
    assert_eq!(result["archived"][0]["archived"]["path"], archived.as_str());
    assert!(dir.path().join("Notes/lost.md").exists());
    assert_eq!(
        fs::read_to_string(dir.path().join(&archived)).unwrap(),
        "Nobody links here.\n"
    );
    assert!(String::from_utf8_lossy(&output.stderr).contains("archived 1 file(s)"));
}

#[test]
fn e2e_archive_move_versions_same_day_copies() {
    let dir = sample_vault(&[]);
    run_ok(archivist_in(dir.path()).args(["archive", "Notes/a.md", "--copy", "--date", DATE]));
    run_ok(archivist_in(dir.path()).args(["archive", "Notes/a.md", "--date", DATE]));

    assert!(!dir.path().join("Notes/a.md").exists());
    assert!(dir.path().join(format!("Archive/{PREFIX}a.md")).exists());
    assert!(dir.path().join(format!("Archive/{PREFIX}a (1).md")).exists());
}

#[test]
fn e2e_archive_binaries_are_not_dated() {
    let dir = sample_vault(&[]);
    write(dir.path(), "Assets/chart.png", "v1");
    run_ok(archivist_in(dir.path()).args(["archive", "Assets/chart.png", "--copy", "--date", DATE]));
    write(dir.path(), "Assets/chart.png", "v2");
    run_ok(archivist_in(dir.path()).args(["archive", "Assets/chart.png", "--copy", "--date", DATE]));

    assert_eq!(fs::read_to_string(dir.path().join("Archive/chart.png")).unwrap(), "v2");
    assert!(!dir.path().join("Archive/chart (1).png").exists());
}

#[test]
fn e2e_archive_unknown_file_fails() {
    let dir = sample_vault(&[]);
    let output = archivist_in(dir.path())
        .args(["archive", "Notes/missing.md"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Notes/missing.md"));
}

// === Archive current ===

#[test]
fn e2e_archive_current_without_file_is_not_applicable() {
    let dir = sample_vault(&[]);
    let result = json(&run_ok(archivist_in(dir.path()).args(["archive-current", "--check"])));
    assert_eq!(result["applicable"], false);
    assert_eq!(result["result"]["status"], "not_applicable");
}

#[test]
fn e2e_archive_current_check_changes_nothing() {
    let dir = sample_vault(&[]);
    let result = json(&run_ok(
        archivist_in(dir.path()).args(["archive-current", "--file", "Notes/a.md", "--check"]),
    ));
    assert_eq!(result["applicable"], true);
    assert_eq!(result["result"]["view"], false);
    assert!(dir.path().join("Notes/a.md").exists());
    assert!(!dir.path().join("Archive").exists());
}

// === Discovery ===

#[test]
fn e2e_untracked_in_root_mode() {
    let dir = sample_vault(&["--root", "Home.md"]);
    let result = json(&run_ok(archivist_in(dir.path()).args(["untracked", "--format", "json"])));
    assert_eq!(result["mode"], "root_tracking");
    let files = result["files"].as_array().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0]["path"], "Notes/lost.md");
    assert_eq!(files[0]["reason"], "untracked");
}

#[test]
fn e2e_untracked_in_orphan_mode_advises_a_root() {
    let dir = sample_vault(&[]);
    let output = run_ok(archivist_in(dir.path()).arg("untracked"));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Notes/lost.md"));
    assert!(stdout.contains("Orphan"));
    assert!(!stdout.contains("Notes/a.md"));
    assert!(String::from_utf8_lossy(&output.stderr).contains("no root file configured"));
}

#[test]
fn e2e_report_regenerates_in_place_and_feeds_archive_current() {
    let dir = sample_vault(&["--root", "Home.md"]);
    let report = format!("Archive/{PREFIX}Archive Index.md");

    let output = run_ok(archivist_in(dir.path()).args(["report", "--date", DATE]));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), report);
    let first = fs::read_to_string(dir.path().join(&report)).unwrap();
    assert!(first.contains("tags:\n  - archive-view"));
    assert!(first.contains("| [[Notes/lost.md\\|lost.md]] | Untracked |"));
    assert!(!first.contains("Notes/a.md"));

    run_ok(archivist_in(dir.path()).args(["report", "--date", DATE]));
    let second = fs::read_to_string(dir.path().join(&report)).unwrap();
    assert_eq!(first, second);
    let reports = fs::read_dir(dir.path().join("Archive")).unwrap().count();
    assert_eq!(reports, 1);

    let result = json(&run_ok(archivist_in(dir.path()).args([
        "archive-current",
        "--file",
        report.as_str(),
        "--date",
        DATE,
    ])));
    assert_eq!(result["result"]["status"], "archived");
    assert!(!dir.path().join("Notes/lost.md").exists());
    assert!(dir.path().join(format!("Archive/{PREFIX}lost.md")).exists());
    // The report itself is a view and stays put.
    assert!(dir.path().join(&report).exists());
}

#[test]
fn e2e_report_json_does_not_write() {
    let dir = sample_vault(&[]);
    let result = json(&run_ok(archivist_in(dir.path()).args(["report", "--format", "json"])));
    assert_eq!(result["mode"], "orphan");
    assert!(!dir.path().join("Archive").exists());
}

#[test]
fn e2e_mirrors_are_excluded_on_request() {
    let dir = sample_vault(&["--root", "Home.md", "--exclude-mirrors"]);
    write(dir.path(), "Notes/board.md", "---\ntags: mirror\n---\nGenerated.\n");
    let result = json(&run_ok(archivist_in(dir.path()).args(["untracked", "--format", "json"])));
    let paths: Vec<&str> = result["files"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["path"].as_str().unwrap())
        .collect();
    assert_eq!(paths, vec!["Notes/lost.md"]);
}

// === Links ===

#[test]
fn e2e_links_shows_both_directions() {
    let dir = sample_vault(&[]);
    write(dir.path(), "Notes/a.md", "Back to [[Home]], onward to [[Nowhere]]. #draft\n");
    let result = json(&run_ok(archivist_in(dir.path()).args(["links", "Notes/a.md"])));
    assert_eq!(result["outbound"], serde_json::json!(["Home.md"]));
    assert_eq!(result["inbound"], serde_json::json!(["Home.md"]));
    assert_eq!(result["orphan"], false);
    assert_eq!(result["tags"], serde_json::json!(["#draft"]));
    assert_eq!(result["unresolved"]["Nowhere"], 1);
    assert_eq!(result["kind"], "mutable");
}

// === Completions ===

#[test]
fn e2e_completions_bash() {
    let output = run_ok(archivist().args(["completions", "bash"]));
    assert!(String::from_utf8_lossy(&output.stdout).contains("archivist"));
}
