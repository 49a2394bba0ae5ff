//! Transaction front end.
//!
//! This module turns accepted transactions into DRAM commands. It provides:
//! 1. **Splitting:** `SubTransSplitter` slices a transaction into access units.
//! 2. **Command Creation:** `CommandCreator` maps one sub-transaction onto a bank command.
//! 3. **Queueing:** `SubTransactionQueue` buffers sub-transactions until the command queue
//!    accepts them.

/// Close-page command creation.
pub mod command_creator;

/// Bounded first-come first-served sub-transaction queue.
pub mod queue;

/// Access-unit splitting.
pub mod splitter;

pub use command_creator::{ClosePageCommandCreator, CommandCreator};
pub use queue::{FcfsSubTransactionQueue, SubTransactionQueue};
pub use splitter::{SubTransSplitter, UnitSplitter};
