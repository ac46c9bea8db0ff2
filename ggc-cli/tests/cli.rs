//! End-to-end tests for the `ggc` binary: legacy-syntax rejection, alias
//! expansion, and config-validation failures, driven through the real CLI
//! surface rather than the library API.
//!
//! Grounded on `cli/tests/integration_tests.rs`'s use of
//! `assert_cmd::Command::cargo_bin` plus fluent `.assert()` predicates;
//! simplified since this crate has no oracle shell to diff against.

use assert_fs::prelude::*;
use predicates::prelude::*;

fn ggc() -> assert_cmd::Command {
    assert_cmd::Command::cargo_bin("ggc").expect("ggc binary should be built for tests")
}

fn write_config(dir: &assert_fs::TempDir, yaml: &str) -> assert_fs::fixture::ChildPath {
    let config = dir.child("ggc.yaml");
    config.write_str(yaml).unwrap();
    config
}

#[test]
fn rebase_dash_i_is_rejected_as_legacy_syntax() {
    ggc()
        .args(["rebase", "-i"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("legacy-like syntax is not supported"));
}

#[test]
fn unknown_top_level_token_is_rejected_as_legacy_syntax() {
    ggc()
        .args(["clean-interactive"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("legacy-like syntax is not supported"));
}

#[test]
fn debug_keys_help_is_exempt_from_the_legacy_guard() {
    ggc()
        .args(["debug-keys", "--help"])
        .assert()
        .stderr(predicate::str::contains("legacy-like syntax is not supported").not());
}

#[test]
fn alias_expands_and_runs_each_step_in_order() {
    let dir = assert_fs::TempDir::new().unwrap();
    let repo = dir.child("repo");
    repo.create_dir_all().unwrap();
    std::process::Command::new("git")
        .args(["init", "-q"])
        .current_dir(repo.path())
        .status()
        .expect("git must be available to run this test");

    let config = write_config(
        &dir,
        "aliases:\n  st: status\n",
    );

    ggc()
        .args(["--config", &config.path().to_string_lossy(), "--no-watch", "st"])
        .current_dir(repo.path())
        .assert()
        .success();
}

#[test]
fn sequence_alias_missing_placeholder_argument_fails_with_a_clear_message() {
    let dir = assert_fs::TempDir::new().unwrap();
    let config = write_config(
        &dir,
        "aliases:\n  save:\n    - add -A\n    - commit -m \"{0}\"\n",
    );

    ggc()
        .args(["--config", &config.path().to_string_lossy(), "--no-watch", "save"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("requires at least 1 argument"));
}

#[test]
fn alias_with_an_unsafe_placeholder_is_rejected_without_touching_the_config_file() {
    let dir = assert_fs::TempDir::new().unwrap();
    let original = "aliases:\n  bad: \"commit -m {bad name}\"\n";
    let config = write_config(&dir, original);

    ggc()
        .args(["--config", &config.path().to_string_lossy(), "--no-watch", "bad"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("placeholder"));

    config.assert(predicate::path::eq_file(
        std::path::Path::new(&config.path()),
    ));
    assert_eq!(std::fs::read_to_string(config.path()).unwrap(), original);
}

#[test]
fn invalid_profile_in_config_is_reported_but_does_not_crash_the_cli() {
    let dir = assert_fs::TempDir::new().unwrap();
    let config = write_config(&dir, "interactive:\n  profile: not-a-real-profile\n");

    // An unusable config falls back to defaults rather than aborting the
    // whole invocation (spec's load-failure-is-not-fatal policy).
    ggc()
        .args(["--config", &config.path().to_string_lossy(), "--no-watch", "debug-keys"])
        .assert()
        .success();
}
