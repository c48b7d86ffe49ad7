#![cfg(unix)]
#![allow(clippy::unwrap_used)]
// Integration tests for `UsbipdClient` against a scripted stand-in daemon.

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use usbshare_api::{Error, TransportConfig, UsbipdClient};

// ── Helpers ─────────────────────────────────────────────────────────

const FAKE_USBIPD: &str = r#"#!/bin/sh
echo "$@" >> "$0.log"
case "$1" in
  state) cat "$0.json" ;;
  --version) echo "4.3.0+52.Branch.master.Sha.5b4e3c1" ;;
  bind) echo "bound $4" ;;
  unbind) echo "usbipd: error: There is no device with busid '$3'." >&2; exit 1 ;;
  hang) sleep 5 ;;
  *) exit 2 ;;
esac
"#;

const STATE_JSON: &str = r#"{"Devices":[{"BusId":"1-4","ClientIPAddress":null,"Description":"USB Serial Converter","InstanceId":"USB\\VID_0403&PID_6001\\A901O7VP","IsForced":false,"PersistedGuid":null,"StubInstanceId":null}]}"#;

/// Write the fake daemon into a fresh temp dir and return a client for it.
fn setup(state_json: &str) -> (TempDir, PathBuf, UsbipdClient) {
    let dir = tempfile::tempdir().unwrap();
    let program = dir.path().join("usbipd");
    std::fs::write(&program, FAKE_USBIPD).unwrap();
    std::fs::set_permissions(&program, std::fs::Permissions::from_mode(0o755)).unwrap();
    std::fs::write(dir.path().join("usbipd.json"), state_json).unwrap();

    let client = UsbipdClient::new(TransportConfig {
        program: program.clone(),
        timeout: Duration::from_secs(5),
    });
    (dir, program, client)
}

fn invocations(program: &Path) -> Vec<String> {
    let log = program.with_extension("log");
    std::fs::read_to_string(log)
        .unwrap_or_default()
        .lines()
        .map(str::to_owned)
        .collect()
}

// ── Availability ────────────────────────────────────────────────────

#[test]
fn test_available_when_program_exists() {
    let (_dir, _program, client) = setup(STATE_JSON);
    assert!(client.is_available());
}

#[test]
fn test_unavailable_when_program_missing() {
    let client = UsbipdClient::new(TransportConfig {
        program: PathBuf::from("/nonexistent/usbshare/usbipd"),
        timeout: Duration::from_secs(1),
    });
    assert!(!client.is_available());
}

// ── state ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_state_decodes_devices() {
    let (_dir, program, client) = setup(STATE_JSON);

    let state = client.state().await.unwrap();

    assert_eq!(state.devices.len(), 1);
    assert_eq!(state.devices[0].bus_id.as_deref(), Some("1-4"));
    assert_eq!(invocations(&program), vec!["state"]);
}

#[tokio::test]
async fn test_state_with_malformed_json() {
    let (_dir, _program, client) = setup("not json at all");

    let result = client.state().await;

    assert!(
        matches!(result, Err(Error::Deserialization { .. })),
        "expected Deserialization error, got: {result:?}"
    );
}

// ── bind / unbind ───────────────────────────────────────────────────

#[tokio::test]
async fn test_bind_passes_force_and_bus_id() {
    let (_dir, program, client) = setup(STATE_JSON);

    let output = client.bind("1-4", true).await.unwrap();

    assert_eq!(output.stdout.trim(), "bound 1-4");
    assert_eq!(invocations(&program), vec!["bind -f -b 1-4"]);
}

#[tokio::test]
async fn test_bind_without_force() {
    let (_dir, program, client) = setup(STATE_JSON);

    client.bind("2-1", false).await.unwrap();

    assert_eq!(invocations(&program), vec!["bind -b 2-1"]);
}

#[tokio::test]
async fn test_unbind_non_zero_exit() {
    let (_dir, program, client) = setup(STATE_JSON);

    let result = client.unbind("9-9").await;

    match result {
        Err(Error::Exited { code, stderr }) => {
            assert_eq!(code, Some(1));
            assert!(stderr.contains("no device with busid '9-9'"), "{stderr}");
        }
        other => panic!("expected Exited error, got: {other:?}"),
    }
    assert_eq!(invocations(&program), vec!["unbind -b 9-9"]);
}

// ── version ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_version_is_trimmed() {
    let (_dir, _program, client) = setup(STATE_JSON);

    let version = client.version().await.unwrap();

    assert_eq!(version, "4.3.0+52.Branch.master.Sha.5b4e3c1");
}

// ── Transport failures ──────────────────────────────────────────────

#[tokio::test]
async fn test_missing_program_is_not_installed() {
    let client = UsbipdClient::new(TransportConfig {
        program: PathBuf::from("usbshare-test-no-such-daemon"),
        timeout: Duration::from_secs(1),
    });

    let result = client.state().await;

    assert!(
        matches!(result, Err(Error::NotInstalled { .. })),
        "expected NotInstalled error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_hung_daemon_times_out() {
    let (_dir, program, _client) = setup(STATE_JSON);
    let transport = TransportConfig {
        program,
        timeout: Duration::from_millis(200),
    };

    let result = transport.run(["hang"]).await;

    assert!(
        matches!(result, Err(Error::Timeout { .. })),
        "expected Timeout error, got: {result:?}"
    );
}
