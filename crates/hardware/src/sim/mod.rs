//! Trace-driven simulation.
//!
//! Drives one controller from a list of timed requests. This is a convenience driver for
//! tests and the command-line tool, not a general event engine. It provides:
//! 1. **Trace Parsing:** JSON records of `{cycle, op, address, size | data}`.
//! 2. **Runner:** Delivers due requests, ticks the controller and records completion times.

/// Trace runner.
pub mod runner;

/// Trace parsing.
pub mod trace;

pub use runner::{Completion, RunReport, TraceRunner};
pub use trace::{TraceEntry, TraceOp, TraceRecord, load_trace, parse_trace};
