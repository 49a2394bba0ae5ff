//! Memory Access Types.
//!
//! This module defines the classification of memory accesses used throughout the controller.
//! These types are used for the following:
//! 1. **Command Selection:** The close-page command creator picks `ReadPrecharge` or `WritePrecharge`.
//! 2. **Finalization:** Reads copy data out of storage, writes copy data in.
//! 3. **Statistics Tracking:** Categorizing completed transactions.

use std::fmt;

/// Type of memory access operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AccessType {
    /// Data read access; answered with a `DataReady` response.
    Read,

    /// Data write access; answered with a `WriteDone` response.
    Write,
}

impl fmt::Display for AccessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => f.pad("read"),
            Self::Write => f.pad("write"),
        }
    }
}
