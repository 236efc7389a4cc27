//! End-to-end tests for the room-cli binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn room_cli() -> Command {
    let mut cmd = Command::cargo_bin("room-cli").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn list_shows_standard_mutators() {
    room_cli()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("increment"))
        .stdout(predicate::str::contains("initClientState"))
        .stdout(predicate::str::contains("setCursor"));
}

#[test]
fn increment_only_changes_the_server() {
    room_cli()
        .args(["mutate", "increment", "--room", "A", "--user", "alice", "--client", "c1"])
        .args(["--times", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("client pass (room A, client c1):\n  (no entries)"))
        .stdout(predicate::str::contains("server pass (room A, version 3)"))
        .stdout(predicate::str::contains("room-counter/A = 3"))
        .stdout(predicate::str::contains("evenCount = 2"));
}

#[test]
fn set_cursor_runs_on_both_passes() {
    let assert = room_cli()
        .args(["mutate", "setCursor", "--room", "A", "--user", "alice", "--client", "c1"])
        .args(["--args", r#"{"x":10,"y":20}"#])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert_eq!(stdout.matches("client-state/c1 = ").count(), 2);
    assert!(stdout.contains(r#""cursor":{"x":10.0,"y":20.0}"#));
}

#[test]
fn unknown_mutator_fails() {
    room_cli()
        .args(["mutate", "explode", "--room", "A", "--user", "alice"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown mutator: explode"));
}

#[test]
fn malformed_args_fail() {
    room_cli()
        .args(["mutate", "setCursor", "--room", "A", "--user", "alice"])
        .args(["--args", "{not json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--args is not valid JSON"));
}

#[test]
fn invalid_config_is_rejected() {
    let temp = TempDir::new().unwrap();
    let config_path = temp.path().join("rooms.toml");
    fs::write(&config_path, "[server]\nmax_rooms = 0\n").unwrap();

    room_cli()
        .arg("--config")
        .arg(&config_path)
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid config value server.max_rooms"));
}

#[test]
fn script_replays_steps_per_room() {
    let temp = TempDir::new().unwrap();
    let script = temp.path().join("session.json");
    fs::write(
        &script,
        r##"[
            { "room": "A", "client": "c1", "user": "alice", "name": "increment" },
            { "room": "A", "client": "c2", "user": "bob", "name": "increment" },
            { "room": "B", "client": "c3", "user": "carol", "name": "increment" },
            { "room": "B", "client": "c3", "user": "carol", "name": "initClientState",
              "args": { "name": "Carol", "avatar": "", "color": "#ff0000" } },
            { "room": "B", "client": "c3", "user": "carol", "name": "bogus" }
        ]"##,
    )
    .unwrap();

    room_cli()
        .arg("script")
        .arg(&script)
        .assert()
        .success()
        .stdout(predicate::str::contains("step 5 (bogus) failed"))
        .stdout(predicate::str::contains("=== 5 steps, 1 failed ==="))
        .stdout(predicate::str::contains("room-counter/A = 2"))
        .stdout(predicate::str::contains("room-counter/B = 1"))
        .stdout(predicate::str::contains("client-state/c3"));
}

#[test]
fn rate_limit_from_config_applies_to_scripts() {
    let temp = TempDir::new().unwrap();
    let config_path = temp.path().join("rooms.toml");
    fs::write(&config_path, "[limits]\nmutations_per_minute = 1\n").unwrap();
    let script = temp.path().join("session.json");
    fs::write(
        &script,
        r#"[
            { "room": "A", "client": "c1", "user": "alice", "name": "increment" },
            { "room": "A", "client": "c1", "user": "alice", "name": "increment" }
        ]"#,
    )
    .unwrap();

    room_cli()
        .arg("--config")
        .arg(&config_path)
        .arg("script")
        .arg(&script)
        .assert()
        .success()
        .stdout(predicate::str::contains("step 2 (increment) failed: rate limit exceeded"))
        .stdout(predicate::str::contains("room-counter/A = 1"));
}
