//! Cycle-level DRAM memory-controller timing model.
//!
//! This crate converts read and write requests into JEDEC-style DRAM commands, schedules
//! them against per-bank state machines and answers each request after a protocol-accurate
//! number of cycles. It includes:
//! 1. **Address Mapping:** Physical address to `{channel, rank, bank group, bank, row, column}`.
//! 2. **Transactions:** Access-unit splitting, close-page command creation and queueing.
//! 3. **Organisation:** Bank state machines, channels and scoped timing tables.
//! 4. **Controller:** The per-tick pipeline, its builder, storage and statistics.
//! 5. **Simulation:** A trace runner for tests and the command-line tool.

/// Physical address to DRAM location mapping.
pub mod addressmapping;
/// Controller construction and timing-table generation.
pub mod builder;
/// Per-rank command queues.
pub mod cmdq;
/// Common types (errors, access types, ids, bit helpers).
pub mod common;
/// Configuration (defaults, protocol, grouped config structures).
pub mod config;
/// The memory controller pipeline.
pub mod controller;
/// Banks, channels and timing tables.
pub mod org;
/// Controller top port.
pub mod port;
/// Request and response messages.
pub mod protocol;
/// Commands, transactions and sub-transactions.
pub mod signal;
/// Trace-driven simulation.
pub mod sim;
/// Controller statistics.
pub mod stats;
/// Backing storage.
pub mod storage;
/// Transaction splitting, command creation and queueing.
pub mod trans;

/// Builder for [`MemController`]; start from `MemControllerBuilder::new()` or a config.
pub use crate::builder::MemControllerBuilder;
/// Root configuration type; use `DramConfig::default()` or deserialize from JSON.
pub use crate::config::{DramConfig, Protocol};
/// The memory controller.
pub use crate::controller::MemController;
