//! Integration tests for the `usbshare` CLI binary.
//!
//! Argument parsing, help output, completions and config handling run
//! without any daemon. Device commands run against a scripted stand-in
//! for `usbipd` (unix only).
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

const MISSING_USBIPD: &str = "/nonexistent/usbshare-cli-test/usbipd";

/// Build a [`Command`] for the `usbshare` binary with env isolation.
///
/// Clears all `USBSHARE_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn usbshare_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("usbshare");
    cmd.env("HOME", "/tmp/usbshare-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/usbshare-cli-test-nonexistent")
        .env_remove("USBSHARE_CONFIG")
        .env_remove("USBSHARE_USBIPD")
        .env_remove("USBSHARE_TIMEOUT")
        .env_remove("USBSHARE_OUTPUT")
        .env_remove("USBSHARE_DAEMON__PROGRAM")
        .env_remove("USBSHARE_DAEMON__TIMEOUT_SECS")
        .env_remove("RUST_LOG");
    cmd
}

/// `usbshare_cmd()` with `--config` pointing into `dir`.
fn cmd_in(dir: &Path) -> assert_cmd::Command {
    let mut cmd = usbshare_cmd();
    cmd.arg("--config").arg(dir.join("config.toml"));
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = usbshare_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    usbshare_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("usbipd")
            .and(predicate::str::contains("devices"))
            .and(predicate::str::contains("ignore"))
            .and(predicate::str::contains("status")),
    );
}

#[test]
fn test_version_flag() {
    usbshare_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("usbshare"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    usbshare_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    usbshare_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn test_completions_fish() {
    usbshare_cmd()
        .args(["completions", "fish"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = usbshare_cmd().arg("foobar").output().unwrap();
    assert!(!output.status.success(), "Expected failure for invalid subcommand");
    let text = combined_output(&output);
    assert!(
        text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_devices_list_without_daemon() {
    let dir = tempfile::tempdir().unwrap();
    let output = cmd_in(dir.path())
        .args(["--usbipd", MISSING_USBIPD, "devices", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(7), "Expected daemon-unavailable exit code");
    let text = combined_output(&output);
    assert!(text.contains("usbipd was not found"), "Unexpected output:\n{text}");
}

#[test]
fn test_zero_timeout_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = cmd_in(dir.path())
        .args(["--timeout", "0", "devices", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn test_status_without_daemon_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    cmd_in(dir.path())
        .args(["--usbipd", MISSING_USBIPD, "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("not found"));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path_honours_flag() {
    let dir = tempfile::tempdir().unwrap();
    let expected = dir.path().join("config.toml");
    cmd_in(dir.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(expected.display().to_string()));
}

#[test]
fn test_config_show_json() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("config.toml"),
        "ignored_devices = [\"046d:c52b\"]\n\n[daemon]\ntimeout_secs = 9\n",
    )
    .unwrap();

    let output = cmd_in(dir.path())
        .args(["config", "show", "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["ignored_devices"][0], "046d:c52b");
    assert_eq!(json["daemon"]["timeout_secs"], 9);
    assert_eq!(json["daemon"]["program"], "usbipd");
}

#[test]
fn test_config_init_with_yes_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    cmd_in(dir.path())
        .args(["--usbipd", "/opt/usbipd/usbipd", "config", "init", "--yes"])
        .assert()
        .success();

    let written = std::fs::read_to_string(dir.path().join("config.toml")).unwrap();
    assert!(written.contains("program = \"/opt/usbipd/usbipd\""), "{written}");
}

#[test]
fn test_config_init_keeps_ignore_list() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("config.toml"), "ignored_devices = [\"046d:c52b\"]\n").unwrap();

    cmd_in(dir.path())
        .args(["config", "init", "--yes"])
        .assert()
        .success();

    let written = std::fs::read_to_string(dir.path().join("config.toml")).unwrap();
    assert!(written.contains("046d:c52b"), "{written}");
}

#[test]
fn test_config_init_ignores_env_overrides() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("config.toml"), "ignored_devices = [\"046d:c52b\"]\n").unwrap();

    cmd_in(dir.path())
        .env("USBSHARE_IGNORED_DEVICES", "[\"dead:beef\"]")
        .args(["config", "init", "--yes"])
        .assert()
        .success();

    let written = std::fs::read_to_string(dir.path().join("config.toml")).unwrap();
    assert!(written.contains("046d:c52b"), "{written}");
    assert!(!written.contains("dead:beef"), "{written}");
}

#[test]
fn test_config_init_refuses_unreadable_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "ignored_devices = [\"046d:c52b\"\n").unwrap();

    let output = cmd_in(dir.path())
        .args(["config", "init", "--yes"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(3), "{}", combined_output(&output));
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "ignored_devices = [\"046d:c52b\"\n"
    );
}

// ── Against a scripted usbipd ───────────────────────────────────────

#[cfg(unix)]
mod scripted {
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};

    use tempfile::TempDir;

    use super::*;

    /// Serves `state.json`; bind and unbind swap in `after-bind.json` /
    /// `after-unbind.json` so verification sees the new state.
    const FAKE_USBIPD: &str = r#"#!/bin/sh
dir=$(dirname "$0")
echo "$@" >> "$dir/calls.log"
case "$1" in
  state) cat "$dir/state.json" ;;
  --version) echo "4.3.0+52.Branch.master.Sha.5b4e3c1" ;;
  bind) cp "$dir/after-bind.json" "$dir/state.json" ;;
  unbind) cp "$dir/after-unbind.json" "$dir/state.json" ;;
  *) exit 2 ;;
esac
"#;

    const NOT_SHARED: &str = r#"{"Devices":[
      {"BusId":"1-4","ClientIPAddress":null,"Description":"USB Serial Converter","InstanceId":"USB\\VID_0403&PID_6001\\A901O7VP","IsForced":false,"PersistedGuid":null,"StubInstanceId":null},
      {"BusId":"2-1","ClientIPAddress":null,"Description":"USB Receiver","InstanceId":"USB\\VID_046D&PID_C52B\\5&1A2B3C4D&0&1","IsForced":false,"PersistedGuid":null,"StubInstanceId":null}
    ]}"#;

    const SHARED: &str = r#"{"Devices":[
      {"BusId":"1-4","ClientIPAddress":null,"Description":"USB Serial Converter","InstanceId":"USB\\VID_0403&PID_6001\\A901O7VP","IsForced":true,"PersistedGuid":"6c1d5e4a-8f1b-4c3d-9e2f-0a1b2c3d4e5f","StubInstanceId":null},
      {"BusId":"2-1","ClientIPAddress":null,"Description":"USB Receiver","InstanceId":"USB\\VID_046D&PID_C52B\\5&1A2B3C4D&0&1","IsForced":false,"PersistedGuid":null,"StubInstanceId":null}
    ]}"#;

    const ATTACHED: &str = r#"{"Devices":[
      {"BusId":"1-4","ClientIPAddress":"172.20.0.2","Description":"USB Serial Converter","InstanceId":"USB\\VID_0403&PID_6001\\A901O7VP","IsForced":true,"PersistedGuid":"6c1d5e4a-8f1b-4c3d-9e2f-0a1b2c3d4e5f","StubInstanceId":"USB\\Vid_80EE&Pid_CAFE\\A901O7VP"}
    ]}"#;

    struct Fake {
        dir: TempDir,
        program: PathBuf,
    }

    impl Fake {
        fn new(state: &str, after_bind: &str, after_unbind: &str) -> Self {
            let dir = tempfile::tempdir().unwrap();
            let program = dir.path().join("usbipd");
            std::fs::write(&program, FAKE_USBIPD).unwrap();
            std::fs::set_permissions(&program, std::fs::Permissions::from_mode(0o755)).unwrap();
            std::fs::write(dir.path().join("state.json"), state).unwrap();
            std::fs::write(dir.path().join("after-bind.json"), after_bind).unwrap();
            std::fs::write(dir.path().join("after-unbind.json"), after_unbind).unwrap();
            Self { dir, program }
        }

        fn path(&self) -> &Path {
            self.dir.path()
        }

        fn cmd(&self) -> assert_cmd::Command {
            let mut cmd = cmd_in(self.path());
            cmd.arg("--usbipd").arg(&self.program);
            cmd
        }

        fn calls(&self) -> String {
            std::fs::read_to_string(self.path().join("calls.log")).unwrap_or_default()
        }

        fn config(&self) -> String {
            std::fs::read_to_string(self.path().join("config.toml")).unwrap_or_default()
        }
    }

    #[test]
    fn test_devices_list_plain_in_bus_order() {
        let fake = Fake::new(NOT_SHARED, SHARED, NOT_SHARED);
        fake.cmd()
            .args(["devices", "list", "-o", "plain"])
            .assert()
            .success()
            .stdout("1-4\n2-1\n");
    }

    #[test]
    fn test_devices_list_json() {
        let fake = Fake::new(SHARED, SHARED, NOT_SHARED);
        let output = fake.cmd().args(["devices", "list", "-o", "json"]).output().unwrap();
        assert!(output.status.success(), "{}", combined_output(&output));

        let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(json[0]["bus_id"], "1-4");
        assert_eq!(json[0]["id"], "0403:6001");
        assert_eq!(json[0]["state"], "connected_shared");
        assert_eq!(json[1]["id"], "046d:c52b");
        assert_eq!(json[1]["state"], "connected_not_shared");
    }

    #[test]
    fn test_devices_list_table() {
        let fake = Fake::new(NOT_SHARED, SHARED, NOT_SHARED);
        fake.cmd()
            .args(["--color", "never", "devices", "list"])
            .assert()
            .success()
            .stdout(
                predicate::str::contains("BUS ID")
                    .and(predicate::str::contains("USB Serial Converter"))
                    .and(predicate::str::contains("not shared")),
            );
    }

    #[test]
    fn test_devices_get_by_identity() {
        let fake = Fake::new(ATTACHED, ATTACHED, NOT_SHARED);
        fake.cmd()
            .args(["devices", "get", "0403:6001"])
            .assert()
            .success()
            .stdout(
                predicate::str::contains("Bus ID:        1-4")
                    .and(predicate::str::contains("attached"))
                    .and(predicate::str::contains("172.20.0.2")),
            );
    }

    #[test]
    fn test_devices_get_unknown_bus() {
        let fake = Fake::new(NOT_SHARED, SHARED, NOT_SHARED);
        let output = fake.cmd().args(["devices", "get", "9-9"]).output().unwrap();
        assert_eq!(output.status.code(), Some(4));
    }

    #[test]
    fn test_bind_forces_by_default_and_verifies() {
        let fake = Fake::new(NOT_SHARED, SHARED, NOT_SHARED);
        fake.cmd().args(["devices", "bind", "1-4"]).assert().success();
        assert!(fake.calls().contains("bind -f -b 1-4"), "{}", fake.calls());
    }

    #[test]
    fn test_bind_without_force() {
        let fake = Fake::new(NOT_SHARED, SHARED, NOT_SHARED);
        fake.cmd()
            .args(["devices", "bind", "1-4", "--no-force"])
            .assert()
            .success();
        assert!(fake.calls().contains("bind -b 1-4"), "{}", fake.calls());
    }

    #[test]
    fn test_bind_that_does_not_take_effect_fails() {
        let fake = Fake::new(NOT_SHARED, NOT_SHARED, NOT_SHARED);
        let output = fake.cmd().args(["devices", "bind", "1-4"]).output().unwrap();
        assert_eq!(output.status.code(), Some(5));
        assert!(
            combined_output(&output).contains("still not shared"),
            "{}",
            combined_output(&output)
        );
    }

    #[test]
    fn test_bind_already_shared_is_a_no_op() {
        let fake = Fake::new(SHARED, SHARED, NOT_SHARED);
        fake.cmd().args(["devices", "bind", "1-4"]).assert().success();
        assert!(!fake.calls().contains("bind -"), "{}", fake.calls());
    }

    #[test]
    fn test_unbind_attached_requires_yes() {
        let fake = Fake::new(ATTACHED, ATTACHED, NOT_SHARED);
        let output = fake.cmd().args(["devices", "unbind", "1-4"]).output().unwrap();
        assert_eq!(output.status.code(), Some(2));
        assert!(!fake.calls().contains("unbind"), "{}", fake.calls());

        fake.cmd()
            .args(["devices", "unbind", "1-4", "--yes"])
            .assert()
            .success();
        assert!(fake.calls().contains("unbind -b 1-4"), "{}", fake.calls());
    }

    #[test]
    fn test_ignore_add_persists_and_hides_device() {
        let fake = Fake::new(NOT_SHARED, SHARED, NOT_SHARED);
        fake.cmd().args(["ignore", "add", "2-1"]).assert().success();
        assert!(fake.config().contains("046d:c52b"), "{}", fake.config());

        fake.cmd()
            .args(["devices", "list", "-o", "plain"])
            .assert()
            .success()
            .stdout("1-4\n");
        fake.cmd()
            .args(["devices", "list", "--all", "-o", "plain"])
            .assert()
            .success()
            .stdout("1-4\n2-1\n");
    }

    #[test]
    fn test_ignore_unplugged_identity_then_remove() {
        let fake = Fake::new(NOT_SHARED, SHARED, NOT_SHARED);
        fake.cmd().args(["ignore", "add", "1234:ABCD"]).assert().success();
        assert!(fake.config().contains("1234:abcd"), "{}", fake.config());

        fake.cmd()
            .args(["ignore", "list", "-o", "plain"])
            .assert()
            .success()
            .stdout("1234:abcd\n");

        fake.cmd().args(["ignore", "rm", "1234:abcd"]).assert().success();
        assert!(!fake.config().contains("1234:abcd"), "{}", fake.config());
    }

    #[test]
    fn test_ignore_remove_unknown_entry() {
        let fake = Fake::new(NOT_SHARED, SHARED, NOT_SHARED);
        let output = fake.cmd().args(["ignore", "remove", "0403:6001"]).output().unwrap();
        assert_eq!(output.status.code(), Some(4));
    }

    #[test]
    fn test_status_reports_version_and_counts() {
        let fake = Fake::new(SHARED, SHARED, NOT_SHARED);
        fake.cmd().arg("status").assert().success().stdout(
            predicate::str::contains("4.3.0")
                .and(predicate::str::contains("1 not shared, 1 shared, 0 attached")),
        );
    }
}
