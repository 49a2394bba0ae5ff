//! Trace Runner Unit Tests.
//!
//! Verifies trace parsing, request delivery on the requested cycles, completion
//! bookkeeping and the cycle budget.

use std::io::Write;

use crate::common::harness::{init_tracing, small_builder};
use dramsim_core::common::{AccessType, SimError};
use dramsim_core::protocol::{ReadRequest, Request};
use dramsim_core::sim::{TraceEntry, TraceRunner, load_trace, parse_trace};
use pretty_assertions::assert_eq;

const TRACE: &str = r#"[
    { "cycle": 0, "op": "write", "address": 64, "data": [1, 2, 3, 4] },
    { "cycle": 200, "op": "read", "address": 64, "size": 4 },
    { "cycle": 200, "op": "write", "address": 128, "data": [7, 7], "dirty_mask": [false, true] }
]"#;

// ══════════════════════════════════════════════════════════
// 1. Parsing
// ══════════════════════════════════════════════════════════

#[test]
fn records_become_numbered_requests() {
    let entries = parse_trace(TRACE).unwrap();

    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].cycle, 0);
    assert_eq!(entries[1].request, Request::Read(ReadRequest::new(2, 1, 64, 4)));
    match &entries[2].request {
        Request::Write(w) => {
            assert_eq!(w.id, 3);
            assert_eq!(w.data, vec![7, 7]);
            assert_eq!(w.dirty_mask, Some(vec![false, true]));
        }
        other => panic!("expected a write, got {other:?}"),
    }
}

#[test]
fn read_without_size_is_rejected() {
    let err = parse_trace(r#"[{ "cycle": 0, "op": "read", "address": 0 }]"#).unwrap_err();
    assert!(matches!(err, SimError::InvalidRecord { index: 0, .. }));
}

#[test]
fn write_without_data_is_rejected() {
    let err = parse_trace(
        r#"[
            { "cycle": 0, "op": "read", "address": 0, "size": 1 },
            { "cycle": 0, "op": "write", "address": 0, "data": [] }
        ]"#,
    )
    .unwrap_err();
    assert!(matches!(err, SimError::InvalidRecord { index: 1, .. }));
}

#[test]
fn malformed_trace_is_a_parse_error() {
    assert!(matches!(parse_trace("[{"), Err(SimError::Trace(_))));
    assert!(matches!(
        parse_trace(r#"[{ "cycle": 0, "op": "erase", "address": 0 }]"#),
        Err(SimError::Trace(_))
    ));
}

#[test]
fn trace_loads_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(TRACE.as_bytes()).unwrap();
    assert_eq!(load_trace(file.path()).unwrap(), parse_trace(TRACE).unwrap());
}

// ══════════════════════════════════════════════════════════
// 2. Running
// ══════════════════════════════════════════════════════════

#[test]
fn run_answers_every_request() {
    init_tracing();
    let ctrl = small_builder().build("MemCtrl").unwrap();
    let mut runner = TraceRunner::new(ctrl);

    let report = runner.run(parse_trace(TRACE).unwrap()).unwrap();

    assert_eq!(report.completions.len(), 3);
    assert_eq!(report.stats.transactions_admitted, 3);
    assert_eq!(report.stats.reads_completed, 1);
    assert_eq!(report.stats.writes_completed, 2);

    let read = report
        .completions
        .iter()
        .find(|c| c.access == AccessType::Read)
        .unwrap();
    assert_eq!(read.request_id, 2);
    assert_eq!(read.address, 64);
    assert_eq!(read.data, Some(vec![1, 2, 3, 4]));
    assert_eq!(read.issued_at, 200);
    assert!(read.completed_at > read.issued_at);
    assert_eq!(report.final_cycle, report.completions.iter().map(|c| c.completed_at).max().unwrap());

    let storage = runner.controller().storage();
    assert_eq!(storage.read(128, 2).unwrap(), vec![0, 7]);
}

#[test]
fn requests_are_not_delivered_before_their_cycle() {
    let ctrl = small_builder().build("MemCtrl").unwrap();
    let mut runner = TraceRunner::new(ctrl);

    let report = runner
        .run(vec![TraceEntry::new(500, ReadRequest::new(1, 1, 0, 64))])
        .unwrap();

    assert_eq!(report.completions[0].issued_at, 500);
    assert!(report.final_cycle > 500);
    assert!(report.stats.idle_ticks >= 500);
}

#[test]
fn entries_are_delivered_in_cycle_order() {
    let ctrl = small_builder().build("MemCtrl").unwrap();
    let mut runner = TraceRunner::new(ctrl);

    let report = runner
        .run(vec![
            TraceEntry::new(300, ReadRequest::new(1, 1, 0, 64)),
            TraceEntry::new(0, ReadRequest::new(2, 1, 64, 64)),
        ])
        .unwrap();

    let first = report.completions.first().unwrap();
    assert_eq!(first.request_id, 2);
    assert_eq!(first.issued_at, 0);
}

#[test]
fn empty_trace_finishes_immediately() {
    let ctrl = small_builder().build("MemCtrl").unwrap();
    let report = TraceRunner::new(ctrl).run(Vec::new()).unwrap();
    assert_eq!(report.final_cycle, 0);
    assert!(report.completions.is_empty());
    assert!(report.mean_latency().abs() < f64::EPSILON);
}

#[test]
fn duplicate_request_ids_are_rejected_before_running() {
    let ctrl = small_builder().build("MemCtrl").unwrap();
    let mut runner = TraceRunner::new(ctrl);

    let err = runner
        .run(vec![
            TraceEntry::new(0, ReadRequest::new(4, 1, 0, 64)),
            TraceEntry::new(0, ReadRequest::new(4, 1, 4096, 64)),
        ])
        .unwrap_err();

    assert!(matches!(err, SimError::DuplicateRequestId { id: 4 }));
    assert_eq!(runner.controller().stats().transactions_admitted, 0);
    assert_eq!(runner.controller().stats().idle_ticks, 0);
}

#[test]
fn cycle_budget_is_enforced() {
    let ctrl = small_builder().build("MemCtrl").unwrap();
    let mut runner = TraceRunner::new(ctrl).with_max_cycles(5);

    let err = runner
        .run(vec![TraceEntry::new(0, ReadRequest::new(1, 1, 0, 64))])
        .unwrap_err();

    assert!(matches!(
        err,
        SimError::CycleLimitExceeded {
            limit: 5,
            outstanding: 1
        }
    ));
}

#[test]
fn consecutive_runs_continue_the_clock() {
    let ctrl = small_builder().build("MemCtrl").unwrap();
    let mut runner = TraceRunner::new(ctrl);

    let first = runner
        .run(vec![TraceEntry::new(0, ReadRequest::new(1, 1, 0, 64))])
        .unwrap();
    let second = runner
        .run(vec![TraceEntry::new(0, ReadRequest::new(2, 1, 0, 64))])
        .unwrap();

    assert!(second.completions[0].issued_at > first.final_cycle);
    assert_eq!(second.stats.reads_completed, 2);
}
