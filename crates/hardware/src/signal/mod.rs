//! Internal signals of the controller pipeline.
//!
//! This module defines the units of work that flow between the pipeline stages:
//! 1. **Transactions:** One accepted external request and its sub-transactions.
//! 2. **Sub-transactions:** One access-unit slice of a transaction, with a shared
//!    completion flag.
//! 3. **Commands:** DRAM-level operations addressed to one bank.

/// DRAM commands and command kinds.
pub mod command;

/// Transactions and sub-transactions.
pub mod transaction;

pub use command::{Command, CommandKind};
pub use transaction::{SubTransaction, Transaction};
