//! Memory request and response messages.
//!
//! This module defines the messages exchanged between the controller and whatever sits above
//! it (a cache, a DMA engine, a test agent). It provides:
//! 1. **Requests:** `ReadRequest` and `WriteRequest` (with optional dirty mask).
//! 2. **Responses:** `DataReadyResponse` and `WriteDoneResponse`, each naming the request
//!    it answers.

use crate::common::AccessType;

/// Reads `byte_size` bytes starting at `address`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReadRequest {
    /// Request id, echoed in the response.
    pub id: u64,
    /// Id of the component that expects the response.
    pub requester: u64,
    /// Global physical address.
    pub address: u64,
    /// Number of bytes to read.
    pub byte_size: u64,
}

impl ReadRequest {
    /// Creates a read request.
    pub const fn new(id: u64, requester: u64, address: u64, byte_size: u64) -> Self {
        Self {
            id,
            requester,
            address,
            byte_size,
        }
    }
}

/// Writes `data` starting at `address`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WriteRequest {
    /// Request id, echoed in the response.
    pub id: u64,
    /// Id of the component that expects the response.
    pub requester: u64,
    /// Global physical address.
    pub address: u64,
    /// Bytes to write.
    pub data: Vec<u8>,
    /// When present, only bytes whose mask entry is `true` are written.
    pub dirty_mask: Option<Vec<bool>>,
}

impl WriteRequest {
    /// Creates a write request that overwrites every byte of `data`.
    pub const fn new(id: u64, requester: u64, address: u64, data: Vec<u8>) -> Self {
        Self {
            id,
            requester,
            address,
            data,
            dirty_mask: None,
        }
    }

    /// Restricts the write to the bytes whose mask entry is `true`.
    #[must_use]
    pub fn with_dirty_mask(mut self, mask: Vec<bool>) -> Self {
        self.dirty_mask = Some(mask);
        self
    }
}

/// Any request the controller accepts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Request {
    /// A read.
    Read(ReadRequest),
    /// A write.
    Write(WriteRequest),
}

impl Request {
    /// Request id.
    pub const fn id(&self) -> u64 {
        match self {
            Self::Read(r) => r.id,
            Self::Write(w) => w.id,
        }
    }

    /// Id of the requester.
    pub const fn requester(&self) -> u64 {
        match self {
            Self::Read(r) => r.requester,
            Self::Write(w) => w.requester,
        }
    }

    /// Global physical address.
    pub const fn address(&self) -> u64 {
        match self {
            Self::Read(r) => r.address,
            Self::Write(w) => w.address,
        }
    }

    /// Number of bytes touched.
    pub fn byte_size(&self) -> u64 {
        match self {
            Self::Read(r) => r.byte_size,
            Self::Write(w) => w.data.len() as u64,
        }
    }

    /// Whether this is a read or a write.
    pub const fn access_type(&self) -> AccessType {
        match self {
            Self::Read(_) => AccessType::Read,
            Self::Write(_) => AccessType::Write,
        }
    }
}

impl From<ReadRequest> for Request {
    fn from(r: ReadRequest) -> Self {
        Self::Read(r)
    }
}

impl From<WriteRequest> for Request {
    fn from(w: WriteRequest) -> Self {
        Self::Write(w)
    }
}

/// Carries the data of a completed read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataReadyResponse {
    /// Id of the read request this answers.
    pub respond_to: u64,
    /// Requester the response is addressed to.
    pub dst: u64,
    /// Bytes read.
    pub data: Vec<u8>,
}

/// Acknowledges a completed write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WriteDoneResponse {
    /// Id of the write request this answers.
    pub respond_to: u64,
    /// Requester the response is addressed to.
    pub dst: u64,
}

/// Any response the controller emits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Response {
    /// Answer to a read.
    DataReady(DataReadyResponse),
    /// Answer to a write.
    WriteDone(WriteDoneResponse),
}

impl Response {
    /// Id of the request this response answers.
    pub const fn respond_to(&self) -> u64 {
        match self {
            Self::DataReady(r) => r.respond_to,
            Self::WriteDone(r) => r.respond_to,
        }
    }

    /// Requester the response is addressed to.
    pub const fn dst(&self) -> u64 {
        match self {
            Self::DataReady(r) => r.dst,
            Self::WriteDone(r) => r.dst,
        }
    }
}
