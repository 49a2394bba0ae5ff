//! Error definitions.
//!
//! This module defines the recoverable error types of the DRAM model. It provides:
//! 1. **Configuration Errors:** Invalid geometry or protocol parameters, rejected at build time.
//! 2. **Storage Errors:** Accesses outside the backing storage.
//! 3. **Port Errors:** Transient back-pressure when a destination buffer is full.
//! 4. **Simulation Errors:** Trace-runner failures (unparsable traces, runaway runs).
//!
//! Contract violations (pushing into a full queue, starting a command on a busy bank)
//! are not represented here; they panic at the call site.

use thiserror::Error;

/// Errors raised while validating a configuration or building a controller.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The burst length was zero.
    #[error("burst length cannot be 0")]
    BurstLengthZero,

    /// A geometry parameter that must be a power of two was not.
    #[error("{field} must be a power of two, got {value}")]
    NotPowerOfTwo {
        /// Name of the offending parameter.
        field: &'static str,
        /// Value that was supplied.
        value: u64,
    },

    /// A count or capacity parameter was zero.
    #[error("{field} must be greater than zero")]
    ZeroCapacity {
        /// Name of the offending parameter.
        field: &'static str,
    },

    /// The bus width is not a whole number of bytes or of devices.
    #[error("bus width {bus_width} is not a multiple of 8 and of device width {device_width}")]
    InvalidBusWidth {
        /// Bus width in bits.
        bus_width: u64,
        /// Device width in bits.
        device_width: u64,
    },

    /// A row holds fewer columns than one burst transfers.
    #[error("column count {num_col} is smaller than burst length {burst_length}")]
    ColumnsShorterThanBurst {
        /// Columns per row.
        num_col: u64,
        /// Burst length.
        burst_length: u64,
    },

    /// The address-field bit order does not name every field exactly once.
    #[error("address bit order must list channel, rank, bank group, bank, row and column exactly once")]
    InvalidBitOrder,

    /// The interleaving address-conversion rule is inconsistent.
    #[error("invalid address conversion: {0}")]
    InvalidAddressConversion(String),

    /// The backing storage could not be allocated.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The configuration text could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// The configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the backing storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StorageError {
    /// The access does not fit inside the storage.
    #[error("access of {len} bytes at {address:#x} exceeds storage capacity {capacity:#x}")]
    OutOfBounds {
        /// First byte of the access.
        address: u64,
        /// Length of the access in bytes.
        len: u64,
        /// Storage capacity in bytes.
        capacity: u64,
    },

    /// The host refused to reserve the address range.
    #[error("failed to allocate {size} bytes of backing storage")]
    AllocationFailed {
        /// Requested size in bytes.
        size: u64,
    },
}

/// Errors raised when a message cannot be delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SendError {
    /// The destination buffer is full; retry on a later cycle.
    #[error("destination buffer is full")]
    Busy,
}

/// Errors raised by the trace runner.
#[derive(Debug, Error)]
pub enum SimError {
    /// The trace text could not be parsed.
    #[error("failed to parse trace: {0}")]
    Trace(#[from] serde_json::Error),

    /// The trace file could not be read.
    #[error("failed to read trace: {0}")]
    Io(#[from] std::io::Error),

    /// The controller port refused a request.
    #[error("failed to deliver request: {0}")]
    Port(#[from] SendError),

    /// A trace record is missing a field its operation needs.
    #[error("trace record {index}: {reason}")]
    InvalidRecord {
        /// Position of the record in the trace.
        index: usize,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// Two requests of one run share an id, so their responses cannot be told apart.
    #[error("request id {id} appears more than once in the trace")]
    DuplicateRequestId {
        /// The repeated id.
        id: u64,
    },

    /// Requests were still outstanding when the cycle budget ran out.
    #[error("{outstanding} request(s) still outstanding after {limit} cycles")]
    CycleLimitExceeded {
        /// Cycle budget.
        limit: u64,
        /// Requests that never received a response.
        outstanding: usize,
    },
}
