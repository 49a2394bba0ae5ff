//! Trace parsing.
//!
//! A trace is a JSON array of records such as
//!
//! ```json
//! [
//!   { "cycle": 0, "op": "write", "address": 64, "data": [1, 2, 3, 4] },
//!   { "cycle": 10, "op": "read", "address": 64, "size": 4 }
//! ]
//! ```
//!
//! Writes may also carry a `dirty_mask` of booleans, one per data byte.

use std::path::Path;

use serde::Deserialize;

use crate::common::SimError;
use crate::protocol::{ReadRequest, Request, WriteRequest};

/// Requester id stamped on every trace request.
pub const TRACE_REQUESTER: u64 = 1;

/// Operation of a trace record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceOp {
    /// Read `size` bytes.
    Read,
    /// Write `data`.
    Write,
}

/// One record as it appears in the JSON file.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TraceRecord {
    /// Cycle at which the request becomes available to the controller.
    pub cycle: u64,
    /// Read or write.
    pub op: TraceOp,
    /// Global physical address.
    pub address: u64,
    /// Bytes to read.
    #[serde(default)]
    pub size: Option<u64>,
    /// Bytes to write.
    #[serde(default)]
    pub data: Option<Vec<u8>>,
    /// Per-byte write enables.
    #[serde(default)]
    pub dirty_mask: Option<Vec<bool>>,
}

/// A timed request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraceEntry {
    /// Cycle at which the request becomes available to the controller.
    pub cycle: u64,
    /// The request.
    pub request: Request,
}

impl TraceEntry {
    /// Creates an entry.
    pub fn new(cycle: u64, request: impl Into<Request>) -> Self {
        Self {
            cycle,
            request: request.into(),
        }
    }
}

impl TraceRecord {
    /// Converts the record at position `index` into a request with id `index + 1`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidRecord`] if a read has no positive size or a write has
    /// no data.
    pub fn into_entry(self, index: usize) -> Result<TraceEntry, SimError> {
        let id = index as u64 + 1;
        let request = match self.op {
            TraceOp::Read => match self.size {
                Some(size) if size > 0 => {
                    Request::Read(ReadRequest::new(id, TRACE_REQUESTER, self.address, size))
                }
                _ => {
                    return Err(SimError::InvalidRecord {
                        index,
                        reason: "read needs a positive size",
                    });
                }
            },
            TraceOp::Write => match self.data {
                Some(data) if !data.is_empty() => {
                    let write = WriteRequest::new(id, TRACE_REQUESTER, self.address, data);
                    Request::Write(match self.dirty_mask {
                        Some(mask) => write.with_dirty_mask(mask),
                        None => write,
                    })
                }
                _ => {
                    return Err(SimError::InvalidRecord {
                        index,
                        reason: "write needs non-empty data",
                    });
                }
            },
        };
        Ok(TraceEntry {
            cycle: self.cycle,
            request,
        })
    }
}

/// Parses a JSON trace.
///
/// # Errors
///
/// Returns [`SimError::Trace`] for malformed JSON and [`SimError::InvalidRecord`] for
/// records that do not describe a request.
pub fn parse_trace(text: &str) -> Result<Vec<TraceEntry>, SimError> {
    let records: Vec<TraceRecord> = serde_json::from_str(text)?;
    records
        .into_iter()
        .enumerate()
        .map(|(i, r)| r.into_entry(i))
        .collect()
}

/// Reads and parses a JSON trace file.
///
/// # Errors
///
/// Returns [`SimError::Io`] if the file cannot be read, otherwise as [`parse_trace`].
pub fn load_trace(path: impl AsRef<Path>) -> Result<Vec<TraceEntry>, SimError> {
    let text = std::fs::read_to_string(path)?;
    parse_trace(&text)
}
