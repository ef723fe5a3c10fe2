//! End-to-end pipeline runs against scripted sessions and transports.

mod common;

use badge_report::connector::ConnectorError;
use badge_report::pipeline::{Pipeline, RunError, RunStage};
use badge_report::report::transform::TransformError;
use badge_report::types::ReportConfig;
use chrono::NaiveDate;
use common::{complete_record, RecordingTransport, ScriptedSession};
use std::path::Path;

/// Config pointing all artifact output into a temporary directory.
fn config_in(dir: &tempfile::TempDir) -> ReportConfig {
    ReportConfig {
        artifact_path: dir.path().join("report.xlsx").to_str().unwrap().to_string(),
        raw_response_path: dir.path().join("last_response.json").to_str().unwrap().to_string(),
        access_username: "operator".to_string(),
        access_password: "secret".to_string(),
        resource_id: "4".to_string(),
        event_type_id: "32".to_string(),
        ..ReportConfig::default()
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
}

#[test]
fn test_full_run_writes_artifact_and_delivers() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir);
    let artifact_path = config.artifact_path.clone();
    let raw_path = config.raw_response_path.clone();

    let mut session = ScriptedSession::with_records(vec![
        complete_record("Ivanov I. I.", "03.02.2024 08:12:44", "Accounting"),
        complete_record("Sidorova A. N.", "05.02.2024 09:00:00", "Accounting"),
        complete_record("Petrov P. P.", "29.02.2024 17:55:01", "Security"),
    ]);
    let transport = RecordingTransport::default();

    let summary = Pipeline::new(config)
        .run(&mut session, &transport, "boss@example.com", today())
        .unwrap();

    let window = summary.window;
    assert_eq!(window.start, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
    assert_eq!(window.end, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    assert_eq!(summary.rows_written, 3);
    assert_eq!(summary.records_skipped, 0);

    assert_eq!(session.calls, ["connect", "check_version", "fetch", "disconnect"]);
    assert!(Path::new(&artifact_path).exists());
    let dump = std::fs::read_to_string(&raw_path).unwrap();
    assert!(dump.contains("regevents"));

    let sent = transport.sent.borrow();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].recipient, "boss@example.com");
    assert_eq!(sent[0].subject, "Access events report 2024-03-10");
    assert_eq!(sent[0].attachment_name, "report.xlsx");
    assert!(!sent[0].attachment.is_empty());
}

#[test]
fn test_incomplete_records_are_skipped_and_counted() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir);

    let mut session = ScriptedSession::with_records(vec![
        complete_record("Ivanov I. I.", "03.02.2024 08:12:44", "Accounting"),
        badge_report::connector::RawEventRecord::new()
            .with_attr("f_date_ev", "05.02.2024 09:00:00")
            .with_attr("f_name_subdiv", "Security"),
        complete_record("Petrov P. P.", "29.02.2024 17:55:01", "Security"),
    ]);
    let transport = RecordingTransport::default();

    let summary = Pipeline::new(config)
        .run(&mut session, &transport, "boss@example.com", today())
        .unwrap();

    assert_eq!(summary.rows_written, 2);
    assert_eq!(summary.records_skipped, 1);
    assert_eq!(transport.sent.borrow().len(), 1);
}

#[test]
fn test_fetch_failure_aborts_before_artifact_and_delivery() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir);
    let artifact_path = config.artifact_path.clone();

    let mut session = ScriptedSession::failing_fetch();
    let transport = RecordingTransport::default();

    let err = Pipeline::new(config)
        .run(&mut session, &transport, "boss@example.com", today())
        .unwrap_err();

    assert!(matches!(err, RunError::Connector(ConnectorError::FetchFailed { .. })));
    assert_eq!(err.stage(), RunStage::Retrieve);
    // the session is still torn down exactly once
    assert_eq!(session.disconnect_count(), 1);
    assert!(!Path::new(&artifact_path).exists());
    assert!(transport.sent.borrow().is_empty());
}

#[test]
fn test_connect_failure_never_disconnects() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir);

    let mut session = ScriptedSession::with_records(Vec::new());
    session.connect_ok = false;
    let transport = RecordingTransport::default();

    let err = Pipeline::new(config)
        .run(&mut session, &transport, "boss@example.com", today())
        .unwrap_err();

    assert!(matches!(err, RunError::Connector(ConnectorError::ConnectFailed { .. })));
    assert_eq!(session.calls, ["connect"]);
}

#[test]
fn test_empty_batch_is_a_transform_failure() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir);
    let artifact_path = config.artifact_path.clone();
    let raw_path = config.raw_response_path.clone();

    let mut session = ScriptedSession::with_records(Vec::new());
    let transport = RecordingTransport::default();

    let err = Pipeline::new(config)
        .run(&mut session, &transport, "boss@example.com", today())
        .unwrap_err();

    assert!(matches!(err, RunError::Transform(TransformError::NoData)));
    assert_eq!(err.stage(), RunStage::Transform);
    // the raw envelope is still dumped for diagnostics
    assert!(Path::new(&raw_path).exists());
    assert!(!Path::new(&artifact_path).exists());
    assert!(transport.sent.borrow().is_empty());
}

#[test]
fn test_invalid_recipient_fails_after_artifact_is_written() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir);
    let artifact_path = config.artifact_path.clone();

    let mut session = ScriptedSession::with_records(vec![complete_record(
        "Ivanov I. I.",
        "03.02.2024 08:12:44",
        "Accounting",
    )]);
    let transport = RecordingTransport::default();

    let err = Pipeline::new(config)
        .run(&mut session, &transport, "not-an-address", today())
        .unwrap_err();

    assert!(matches!(err, RunError::Delivery(_)));
    assert_eq!(err.stage(), RunStage::Delivery);
    // the artifact exists; only the hand-off failed
    assert!(Path::new(&artifact_path).exists());
    assert!(transport.sent.borrow().is_empty());
}
