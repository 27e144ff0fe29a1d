use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).expect("Failed to write fixture");
    path
}

fn fast_config(dir: &Path) -> PathBuf {
    write_file(
        dir,
        "launcher.toml",
        "[startup]\nreadiness_poll_interval_ms = 5\nsettle_delay_ms = 10\n",
    )
}

fn launcher(home: &Path) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_launcher"));
    command.env("HOME", home).env_remove("LAUNCHER_LOG_DIR");
    command
}

fn events(output: &Output) -> Vec<Value> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).expect("Failed to parse event line"))
        .collect()
}

fn events_named<'a>(events: &'a [Value], name: &str) -> Vec<&'a Value> {
    events.iter().filter(|event| event["event"] == name).collect()
}

#[test]
fn run_waits_for_service_then_navigates_with_shared_text() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let config = fast_config(temp.path());
    let request = write_file(
        temp.path(),
        "request.json",
        r#"{"action": "send", "mime_type": "text/plain",
            "extras": {"android.intent.extra.TEXT": {"kind": "text", "value": "hello"}}}"#,
    );

    let output = launcher(temp.path())
        .arg("run")
        .arg(&request)
        .arg("--config")
        .arg(&config)
        .args(["--ready-after-ms", "30"])
        .output()
        .expect("Failed to run launcher");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let events = events(&output);
    assert_eq!(events_named(&events, "service_started").len(), 1);
    assert_eq!(events_named(&events, "process_ready").len(), 1);

    let navigations = events_named(&events, "navigate");
    assert_eq!(navigations.len(), 1);
    assert_eq!(navigations[0]["request"]["destination"], "main");
    assert_eq!(navigations[0]["request"]["extras"]["msgShared"], "hello");

    let last = events.last().expect("No events");
    assert_eq!(last["event"], "dispatched");
    assert_eq!(last["report"]["share"]["text"], "hello");
}

#[test]
fn run_resolves_contact_reference_from_fixtures() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let config = fast_config(temp.path());
    let fixtures = write_file(
        temp.path(),
        "fixtures.json",
        r#"{"contacts": {"content://contacts/9": "dave@example.org"}}"#,
    );
    let request = write_file(
        temp.path(),
        "request.json",
        r#"{"action": "view", "data": "content://contacts/9"}"#,
    );

    let output = launcher(temp.path())
        .arg("run")
        .arg(&request)
        .arg("--config")
        .arg(&config)
        .arg("--fixtures")
        .arg(&fixtures)
        .arg("--ready-at-launch")
        .output()
        .expect("Failed to run launcher");

    assert!(output.status.success());
    let events = events(&output);
    assert!(events_named(&events, "service_started").is_empty());
    let navigations = events_named(&events, "navigate");
    assert_eq!(
        navigations[0]["request"]["extras"]["SipUriOrNumber"],
        "dave@example.org"
    );
}

#[test]
fn run_with_live_call_screen_shows_incoming_call() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let config = fast_config(temp.path());
    let request = write_file(
        temp.path(),
        "request.json",
        r#"{"action": "call_launched",
            "extras": {"NumberToCall": {"kind": "text", "value": "42"}}}"#,
    );

    let output = launcher(temp.path())
        .arg("run")
        .arg(&request)
        .arg("--config")
        .arg(&config)
        .arg("--ready-at-launch")
        .args(["--live-screen", "call"])
        .output()
        .expect("Failed to run launcher");

    assert!(output.status.success());
    let events = events(&output);
    assert!(events_named(&events, "originate_call").is_empty());
    let screen_events = events_named(&events, "screen_event");
    assert_eq!(screen_events.len(), 1);
    assert_eq!(screen_events[0]["payload"]["kind"], "show_incoming_call");
}

#[test]
fn run_times_out_and_aborts_when_process_never_ready() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let config = fast_config(temp.path());
    let request = write_file(temp.path(), "request.json", r#"{"action": "other"}"#);

    let output = launcher(temp.path())
        .arg("run")
        .arg(&request)
        .arg("--config")
        .arg(&config)
        .args(["--timeout-ms", "100"])
        .output()
        .expect("Failed to run launcher");

    assert!(!output.status.success());
    let events = events(&output);
    assert!(events_named(&events, "navigate").is_empty());
    assert_eq!(events_named(&events, "aborted").len(), 1);
}

#[test]
fn classify_prints_direct_call_intent() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let request = write_file(
        temp.path(),
        "request.json",
        r#"{"action": "call", "data": "sip:erin%40example.org"}"#,
    );

    let output = launcher(temp.path())
        .arg("classify")
        .arg(&request)
        .output()
        .expect("Failed to run launcher");

    assert!(output.status.success());
    let intent: Value = serde_json::from_slice(&output.stdout).expect("Failed to parse intent");
    assert_eq!(intent["kind"], "direct_call");
    assert_eq!(intent["address"], "erin@example.org");
}

#[test]
fn guard_reports_restart_for_missing_manager() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let output = launcher(temp.path())
        .args(["guard", "--process-ready"])
        .output()
        .expect("Failed to run launcher");

    assert!(output.status.success());
    let decision: Value = serde_json::from_slice(&output.stdout).expect("Failed to parse decision");
    assert_eq!(decision["decision"], "restart");
}

#[test]
fn malformed_request_fails() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let request = write_file(temp.path(), "request.json", "{\"action\": 7}");

    let output = launcher(temp.path())
        .arg("classify")
        .arg(&request)
        .output()
        .expect("Failed to run launcher");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Startup request malformed"));
}
