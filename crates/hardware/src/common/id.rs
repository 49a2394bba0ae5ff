//! Identifier allocation.
//!
//! Commands, sub-transactions and transactions carry unique ids. Ids come from
//! a generator owned by one controller instance, so two controllers built from
//! the same configuration hand out identical id sequences.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Shared, monotonically increasing id source.
///
/// Cloning the generator shares the underlying counter; banks, the command
/// creator and the splitter of one controller all draw from the same sequence.
#[derive(Clone, Debug, Default)]
pub struct IdGenerator {
    next: Arc<AtomicU64>,
}

impl IdGenerator {
    /// Creates a generator whose first id is 1.
    pub fn new() -> Self {
        Self {
            next: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Returns a fresh id.
    #[inline]
    pub fn next_id(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}
