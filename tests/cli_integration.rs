//! Integration tests for the NoteVault CLI.
//!
//! These tests exercise the binary end-to-end using `assert_cmd`.
//! Password prompts are bypassed with `NOTEVAULT_PASSWORD`, and each test
//! writes a `.notevault.toml` with a low iteration count so vault
//! commands stay fast.

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

/// Helper: get a Command pointing at the notevault binary.
fn notevault() -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("notevault").expect("binary should exist");
    cmd.env_remove("NOTEVAULT_PASSWORD");
    cmd
}

/// Helper: a temp project dir with fast settings.
fn project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    tmp.child(".notevault.toml")
        .write_str("kdf_iterations = 1000\ndebounce_ms = 10\n")
        .unwrap();
    tmp
}

/// Helper: run a command inside `tmp` and return its stdout.
fn run_ok(tmp: &TempDir, args: &[&str]) -> String {
    let output = notevault()
        .args(args)
        .current_dir(tmp.path())
        .env("NOTEVAULT_PASSWORD", "hunter2-hunter2")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    String::from_utf8(output).unwrap()
}

/// Helper: create a note and return its full id.
fn create(tmp: &TempDir, title: &str, body: &str) -> String {
    let out = run_ok(tmp, &["new", title, "--body", body]);
    out.lines().last().unwrap().trim().to_string()
}

#[test]
fn help_flag_shows_usage() {
    notevault()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Local-first notes"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("new"))
        .stdout(predicate::str::contains("history"))
        .stdout(predicate::str::contains("restore"))
        .stdout(predicate::str::contains("vault"));
}

#[test]
fn version_flag_shows_version() {
    notevault()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("notevault"));
}

#[test]
fn no_args_shows_help() {
    notevault()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn fresh_notebook_lists_the_welcome_note() {
    let tmp = project();
    let out = run_ok(&tmp, &["list"]);
    assert!(out.contains("Welcome"), "got: {out}");
}

#[test]
fn new_then_show_and_list() {
    let tmp = project();
    let id = create(&tmp, "Groceries", "<p>milk</p><p>eggs</p>");

    let shown = run_ok(&tmp, &["show", &id]);
    assert!(shown.contains("Groceries"));
    assert!(shown.contains("milk\neggs"));

    // A unique prefix resolves too.
    let shown = run_ok(&tmp, &["show", &id[..8]]);
    assert!(shown.contains("Groceries"));

    let listed = run_ok(&tmp, &["list", "--query", "eggs"]);
    assert!(listed.contains("Groceries"));
    assert!(!listed.contains("Welcome"));
}

#[test]
fn show_unknown_note_fails() {
    let tmp = project();
    notevault()
        .args(["show", "does-not-exist"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("does-not-exist"));
}

#[test]
fn tag_pin_and_delete() {
    let tmp = project();
    let id = create(&tmp, "Standup", "<p>notes</p>");

    run_ok(&tmp, &["tag", "add", &id, "work"]);
    run_ok(&tmp, &["pin", &id]);

    let pinned = run_ok(&tmp, &["list", "--pinned"]);
    assert!(pinned.contains("Standup"));
    assert!(pinned.contains("work"));

    // Pinning again unpins.
    run_ok(&tmp, &["pin", &id]);
    let pinned = run_ok(&tmp, &["list", "--pinned"]);
    assert!(!pinned.contains("Standup"));

    run_ok(&tmp, &["delete", &id, "--force"]);
    notevault()
        .args(["show", &id])
        .current_dir(tmp.path())
        .assert()
        .failure();
}

#[test]
fn edit_with_flags_updates_the_note() {
    let tmp = project();
    let id = create(&tmp, "Draft", "<p>first</p>");

    run_ok(&tmp, &["edit", &id, "--title", "Final", "--body", "<p>second</p>"]);
    let shown = run_ok(&tmp, &["show", &id]);
    assert!(shown.contains("Final"));
    assert!(shown.contains("second"));
}

#[test]
fn vault_enable_encrypts_notes_at_rest() {
    let tmp = project();
    create(&tmp, "Diary", "<p>very private words</p>");

    let status = run_ok(&tmp, &["vault", "status"]);
    assert!(status.contains("disabled"));

    run_ok(&tmp, &["vault", "enable"]);
    let status = run_ok(&tmp, &["vault", "status"]);
    assert!(status.contains("enabled"));

    // Nothing in the data dir holds the note in the clear.
    for entry in std::fs::read_dir(tmp.path().join(".notevault")).unwrap() {
        let contents = std::fs::read_to_string(entry.unwrap().path()).unwrap_or_default();
        assert!(!contents.contains("very private words"));
    }

    // The password from the environment unlocks it again.
    let listed = run_ok(&tmp, &["list"]);
    assert!(listed.contains("Diary"));
}

#[test]
fn wrong_password_is_rejected() {
    let tmp = project();
    run_ok(&tmp, &["vault", "enable"]);

    notevault()
        .args(["list"])
        .current_dir(tmp.path())
        .env("NOTEVAULT_PASSWORD", "not-the-password")
        .assert()
        .failure()
        .stderr(predicate::str::contains("wrong password"));
}

#[test]
fn short_password_cannot_enable_the_vault() {
    let tmp = project();
    notevault()
        .args(["vault", "enable"])
        .current_dir(tmp.path())
        .env("NOTEVAULT_PASSWORD", "short")
        .assert()
        .failure();
}

#[test]
fn wipe_starts_over() {
    let tmp = project();
    create(&tmp, "Doomed", "<p>bye</p>");
    run_ok(&tmp, &["vault", "enable"]);

    run_ok(&tmp, &["vault", "wipe", "--force"]);
    let status = run_ok(&tmp, &["vault", "status"]);
    assert!(status.contains("disabled"));

    let listed = run_ok(&tmp, &["list"]);
    assert!(!listed.contains("Doomed"));
}

#[test]
fn data_dir_flag_overrides_settings() {
    let tmp = project();
    let custom = tmp.child("elsewhere");

    notevault()
        .args(["new", "Moved", "--data-dir", custom.path().to_str().unwrap()])
        .current_dir(tmp.path())
        .assert()
        .success();

    assert!(custom.path().is_dir());
    let listed = run_ok(&tmp, &["list"]);
    assert!(!listed.contains("Moved"));
}

#[test]
fn editor_is_refused_while_the_vault_is_enabled() {
    let tmp = project();
    let id = create(&tmp, "Secret", "<p>hidden</p>");
    run_ok(&tmp, &["vault", "enable"]);

    notevault()
        .args(["edit", &id])
        .current_dir(tmp.path())
        .env("NOTEVAULT_PASSWORD", "hunter2-hunter2")
        .env("EDITOR", "true")
        .env("VISUAL", "true")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--body"));

    // Flags still work.
    run_ok(&tmp, &["edit", &id, "--body", "<p>revealed</p>"]);
    assert!(run_ok(&tmp, &["show", &id]).contains("revealed"));
}

#[test]
fn prefs_are_shown_and_clamped() {
    let tmp = project();
    let shown = run_ok(&tmp, &["prefs"]);
    assert!(shown.contains("Snapshot interval: 2 min"));
    assert!(shown.contains("Auto-lock after: 10 min"));

    let updated = run_ok(&tmp, &["prefs", "--snap-mins", "50", "--auto-lock-mins", "5"]);
    assert!(updated.contains("Snapshot interval: 10 min"));
    assert!(updated.contains("Auto-lock after: 5 min"));

    let shown = run_ok(&tmp, &["prefs"]);
    assert!(shown.contains("Snapshot interval: 10 min"));
}
