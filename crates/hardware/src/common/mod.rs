//! Common utilities and types used throughout the DRAM model.
//!
//! This module provides the small building blocks shared by every stage of the
//! controller pipeline. It includes:
//! 1. **Errors:** Configuration, storage, port and trace-runner error types.
//! 2. **Access Types:** Read/write classification of transactions.
//! 3. **Identifiers:** Per-controller monotonically increasing id allocation.
//! 4. **Bit Helpers:** Exact base-2 logarithms for power-of-two geometry.

/// Exact base-2 logarithm helpers.
pub mod bits;

/// Memory access type definitions.
pub mod data;

/// Error types.
pub mod error;

/// Identifier allocation.
pub mod id;

pub use bits::exact_log2;
pub use data::AccessType;
pub use error::{ConfigError, SendError, SimError, StorageError};
pub use id::IdGenerator;
