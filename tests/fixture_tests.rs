//! End-to-end fixture tests for peopleflow-rs.
//!
//! Each fixture is a hand-checked frame sequence with the expected identity
//! assignments, counters and status after every frame.
//!
//! Run with: cargo test fixture

use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

use peopleflow_rs::{CountingSession, CrossingEvent, Detection, FrameReport, SessionConfig};

// ============================================================================
// Fixture JSON Schema
// ============================================================================

#[derive(Debug, Deserialize)]
struct Fixture {
    #[allow(dead_code)]
    description: String,
    config: SessionConfig,
    steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
struct Step {
    frame_id: u32,
    detections: Vec<[f64; 2]>,
    expected: Expected,
}

#[derive(Debug, Deserialize)]
struct Expected {
    /// Assigned ids in detection order.
    ids: Vec<u64>,
    /// Ids carried into the next frame, in table order.
    live: Vec<u64>,
    entries: u64,
    exits: u64,
    occupancy: i64,
    status: String,
    events: Vec<EventJson>,
}

#[derive(Debug, Deserialize, PartialEq)]
struct EventJson {
    id: u64,
    event: CrossingEvent,
}

// ============================================================================
// Test Helpers
// ============================================================================

fn find_testdata_dir() -> PathBuf {
    let candidates = [
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata/fixtures"),
        PathBuf::from("testdata/fixtures"),
        PathBuf::from("../testdata/fixtures"),
    ];

    for candidate in &candidates {
        if candidate.exists() {
            return candidate.clone();
        }
    }
    panic!("Could not find testdata/fixtures directory");
}

fn load_fixture(scenario: &str) -> Fixture {
    let testdata_dir = find_testdata_dir();
    let path = testdata_dir.join(format!("fixture_{}.json", scenario));

    let content = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture file {:?}: {}", path, e));

    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture file {:?}: {}", path, e))
}

fn frame_time(frame_id: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 17)
        .unwrap()
        .and_hms_opt(18, 30, 0)
        .unwrap()
        + chrono::Duration::milliseconds(frame_id as i64 * 40)
}

fn compare_step(
    step: &Step,
    report: &FrameReport,
    live: &[u64],
) -> Result<(), String> {
    let expected = &step.expected;
    let frame_id = step.frame_id;

    let ids: Vec<u64> = report.assignments.iter().map(|a| a.id).collect();
    if ids != expected.ids {
        return Err(format!(
            "frame {}: assigned ids mismatch: expected {:?}, got {:?}",
            frame_id, expected.ids, ids
        ));
    }

    if live != expected.live {
        return Err(format!(
            "frame {}: live identities mismatch: expected {:?}, got {:?}",
            frame_id, expected.live, live
        ));
    }

    if (report.entries, report.exits) != (expected.entries, expected.exits) {
        return Err(format!(
            "frame {}: counters mismatch: expected in={} out={}, got in={} out={}",
            frame_id, expected.entries, expected.exits, report.entries, report.exits
        ));
    }

    if report.occupancy != expected.occupancy {
        return Err(format!(
            "frame {}: occupancy mismatch: expected {}, got {}",
            frame_id, expected.occupancy, report.occupancy
        ));
    }

    let status = report.status.to_string();
    if status != expected.status {
        return Err(format!(
            "frame {}: status mismatch: expected {:?}, got {:?}",
            frame_id, expected.status, status
        ));
    }

    let events: Vec<EventJson> = report
        .events
        .iter()
        .map(|record| EventJson {
            id: record.id,
            event: record.event,
        })
        .collect();
    if events != expected.events {
        return Err(format!(
            "frame {}: events mismatch:\n  expected {:?}\n  got      {:?}",
            frame_id, expected.events, events
        ));
    }

    Ok(())
}

// ============================================================================
// Fixture Test Runner
// ============================================================================

fn run_fixture_test(scenario: &str) {
    let fixture = load_fixture(scenario);
    let mut session =
        CountingSession::new(fixture.config.clone()).expect("Failed to create session");

    for step in &fixture.steps {
        let detections: Vec<Detection> = step
            .detections
            .iter()
            .map(|[x, y]| Detection::new(*x, *y).expect("fixture detection must be finite"))
            .collect();

        let report = session.process_frame_at(&detections, frame_time(step.frame_id));
        let live: Vec<u64> = session.tracker().identities().iter().map(|i| i.id).collect();

        if let Err(msg) = compare_step(step, &report, &live) {
            panic!("Fixture '{}' diverged: {}", scenario, msg);
        }
    }

    println!(
        "Fixture test '{}' passed: {} steps verified",
        scenario,
        fixture.steps.len()
    );
}

// ============================================================================
// Test Cases
// ============================================================================

#[test]
fn test_fixture_reference() {
    run_fixture_test("reference");
}

#[test]
fn test_fixture_capacity() {
    run_fixture_test("capacity");
}

#[test]
fn test_fixture_grace_nearest() {
    run_fixture_test("grace_nearest");
}
