//! CLI integration tests using the REAL loadstone binary

mod common;

use common::{TestWorkspace, entry_unit_json, plain_unit_json};
use predicates::prelude::*;

#[test]
fn test_help_output() {
    TestWorkspace::new()
        .loadstone_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("units"))
        .stdout(predicate::str::contains("inspect"))
        .stdout(predicate::str::contains("resolve"))
        .stdout(predicate::str::contains("completions"));
}

#[test]
fn test_version_output() {
    TestWorkspace::new()
        .loadstone_cmd()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("loadstone"))
        .stdout(predicate::str::contains("Build info"));
}

#[test]
fn test_units_lists_directory_and_archive() {
    let workspace = TestWorkspace::new();
    workspace.write_unit("classes", "app.Main", &entry_unit_json("app.Main"));
    let base = plain_unit_json("lib.Base", None);
    workspace.write_archive("lib.zip", &[("lib/Base.unit", base.as_str())]);

    workspace
        .loadstone_cmd()
        .args(["units", "classes", "lib.zip"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Collected units (2)"))
        .stdout(predicate::str::contains("app.Main"))
        .stdout(predicate::str::contains("lib.Base"));
}

#[test]
fn test_units_full_digest() {
    let workspace = TestWorkspace::new();
    workspace.write_unit("classes", "app.Main", &entry_unit_json("app.Main"));

    workspace
        .loadstone_cmd()
        .args(["units", "--full", "classes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("blake3:"));
}

#[test]
fn test_units_reads_sources_from_config_file() {
    let workspace = TestWorkspace::new();
    workspace.write_unit("classes", "app.Main", &entry_unit_json("app.Main"));
    workspace.write_file("loadstone.yaml", "sources:\n  - classes\n");

    workspace
        .loadstone_cmd()
        .arg("units")
        .assert()
        .success()
        .stdout(predicate::str::contains("app.Main"));
}

#[test]
fn test_malformed_config_exits_with_usage_code() {
    let workspace = TestWorkspace::new();
    workspace.write_file("custom.yaml", "sources: [classes]\nunknown_key: true\n");

    workspace
        .loadstone_cmd()
        .args(["units", "--config", "custom.yaml"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to parse configuration file"));
}

#[test]
fn test_units_with_unreadable_source_is_fatal() {
    let workspace = TestWorkspace::new();

    workspace
        .loadstone_cmd()
        .args(["units", "missing-dir"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("missing-dir"));
}

#[test]
fn test_inspect_shows_markers_and_entry_point() {
    let workspace = TestWorkspace::new();
    workspace.write_unit("classes", "app.Main", &entry_unit_json("app.Main"));
    workspace.write_unit("classes", "app.Tile", &plain_unit_json("app.Tile", Some("app.Base")));
    workspace.write_unit("classes", "app.Base", &plain_unit_json("app.Base", None));

    workspace
        .loadstone_cmd()
        .args(["inspect", "classes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Loaded units (3)"))
        .stdout(predicate::str::contains("extends app.Base"))
        .stdout(predicate::str::contains("entry_point: app.Main"))
        .stdout(predicate::str::contains("Entry point: app.Main::main"));
}

#[test]
fn test_inspect_with_two_entry_points_is_fatal() {
    let workspace = TestWorkspace::new();
    workspace.write_unit("classes", "app.A", &entry_unit_json("app.A"));
    workspace.write_unit("classes", "app.B", &entry_unit_json("app.B"));

    workspace
        .loadstone_cmd()
        .args(["inspect", "classes"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Multiple entry points found: app.A, app.B"));
}

#[test]
fn test_inspect_developer_mode_adds_diagnostic_code() {
    let workspace = TestWorkspace::new();
    workspace.write_unit("classes", "app.Helper", &plain_unit_json("app.Helper", None));

    workspace
        .loadstone_cmd()
        .env("LOADSTONE_DEV", "1")
        .args(["inspect", "classes"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("loadstone::entry::missing"));
}

#[test]
fn test_resolve_prints_load_order() {
    let workspace = TestWorkspace::new();
    workspace.write_file("registries.yaml", "C: [A, B]\nB: [A]\nA: []\n");

    workspace
        .loadstone_cmd()
        .args(["resolve", "registries.yaml"])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"(?s)1\. A.*2\. B.*3\. C").expect("valid regex"));
}

#[test]
fn test_resolve_cycle_exits_fatally_with_report() {
    let workspace = TestWorkspace::new();
    workspace.write_file("registries.yaml", "A: [C]\nB: [A]\nC: [A, B]\n");

    workspace
        .loadstone_cmd()
        .args(["resolve", "registries.yaml"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Circular dependency"))
        .stderr(predicate::str::contains("{A, B, C}"));
}

#[test]
fn test_resolve_missing_file() {
    let workspace = TestWorkspace::new();

    workspace
        .loadstone_cmd()
        .args(["resolve", "nope.yaml"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("nope.yaml"));
}

#[test]
fn test_completions_bash() {
    TestWorkspace::new()
        .loadstone_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("loadstone"));
}

#[test]
fn test_unknown_shell_is_a_usage_error() {
    TestWorkspace::new()
        .loadstone_cmd()
        .args(["completions", "tcsh"])
        .assert()
        .failure()
        .code(2);
}
