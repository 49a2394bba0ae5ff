//! DRAM organisation: banks, channels and timing tables.
//!
//! This module models the physical side of the memory. It provides:
//! 1. **Bank:** The per-bank state machine that decides which command must run next and
//!    tracks per-kind cooldowns.
//! 2. **Channel:** The rank x bank-group x bank array, which routes commands and broadcasts
//!    timing constraints.
//! 3. **Timing:** The four scoped tables of minimum gaps between command kinds.

/// Per-bank state machine.
pub mod bank;

/// Bank array and timing broadcast.
pub mod channel;

/// Scoped timing tables.
pub mod timing;

pub use bank::{Bank, BankImpl, BankState};
pub use channel::{Banks, Channel, ChannelImpl};
pub use timing::{TimeTable, TimeTableEntry, Timing};
