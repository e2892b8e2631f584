//! S5: tampering with a segment file on disk is detected by chain
//! verification.

mod common;

use std::fs;

use govgate_core::EventLogSink;
use govgate_store::EventLogConfig;
use govgate_store::FileEventLogSink;

#[test]
fn tampering_with_a_segment_file_is_caught_by_verify_chain() {
    let dir = tempfile::tempdir().expect("tempdir");
    let orchestrator = common::orchestrator_at(dir.path());

    orchestrator
        .process_request("tester", common::passing_situation("sit-5"))
        .expect("process request");
    orchestrator.verify_event_log_now().expect("chain verifies before tampering");

    let segment_path = dir.path().join("segment-000000.json");
    let original = fs::read_to_string(&segment_path).expect("read segment");
    assert!(!original.is_empty(), "segment should hold appended entries");
    let mut entries: Vec<serde_json::Value> = serde_json::from_str(&original).expect("parse segment as JSON");
    assert!(!entries.is_empty(), "segment should hold appended entries");
    entries[0]["payload"] = serde_json::json!({"tampered": true});
    fs::write(&segment_path, serde_json::to_vec(&entries).expect("reserialize tampered segment")).expect("tamper with segment");

    let sink = FileEventLogSink::open(dir.path(), EventLogConfig::default()).expect("reopen event log");
    let report = sink.verify_chain().expect("verify_chain runs even over a tampered log");
    assert!(!report.valid);
    assert_eq!(report.first_invalid_index, Some(0));
    assert_eq!(report.reason.as_deref(), Some("hash mismatch"));
}
