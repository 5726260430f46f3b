//! E2E tests for `bindery watch`

use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

use tempfile::tempdir;

mod common;
use common::{bin, seed_project, write};

#[test]
fn watch_emits_start_event_and_runs_the_initial_build() {
    let dir = tempdir().unwrap();
    seed_project(dir.path());

    let mut child = Command::new(bin())
        .current_dir(dir.path())
        .args(["--json", "watch"])
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to start bindery watch");

    thread::sleep(Duration::from_millis(1000));
    let _ = child.kill();
    let output = child.wait_with_output().expect("failed to get output");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("watch_started"),
        "expected watch_started event, got:\n{stdout}"
    );
    assert!(
        stdout.contains("rebuild_complete"),
        "expected initial rebuilds, got:\n{stdout}"
    );
    assert!(
        dir.path()
            .join("build/precompiled/base/global/js/bootstrap.js")
            .exists(),
        "initial build should write precompiled files"
    );
}

#[test]
fn watch_rebuilds_the_entity_owning_a_changed_file() {
    let dir = tempdir().unwrap();
    seed_project(dir.path());

    let mut child = Command::new(bin())
        .current_dir(dir.path())
        .args(["--json", "watch"])
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to start bindery watch");

    // Let the initial build finish before touching the tree
    thread::sleep(Duration::from_millis(1000));
    write(
        dir.path(),
        "sources/base/modules/teaser/js/teaser.js",
        "teaser(); updated();\n",
    );
    thread::sleep(Duration::from_millis(1500));

    let _ = child.kill();
    let output = child.wait_with_output().expect("failed to get output");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("file_changed"),
        "expected file_changed event, got:\n{stdout}"
    );
    let updated = std::fs::read_to_string(
        dir.path()
            .join("build/precompiled/base/modules/teaser/js/teaser.js"),
    )
    .unwrap();
    assert!(updated.contains("updated();"), "got: {updated}");
}
