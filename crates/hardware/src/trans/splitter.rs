//! Access-unit splitting.

use crate::common::IdGenerator;
use crate::signal::{SubTransaction, Transaction};

/// Breaks a transaction into sub-transactions.
pub trait SubTransSplitter: Send {
    /// Appends one sub-transaction per access unit touched by `trans`.
    ///
    /// Zero-byte transactions are not a valid input.
    fn split(&self, trans: &mut Transaction);

    /// Number of sub-transactions `split` would append for `byte_size` bytes at the
    /// internal address `address`. Allocates nothing.
    fn num_sub_transactions(&self, address: u64, byte_size: u64) -> usize;
}

/// Splits along fixed, naturally aligned access units of `2^bits` bytes.
#[derive(Debug)]
pub struct UnitSplitter {
    log2_access_unit_size: u32,
    ids: IdGenerator,
}

impl UnitSplitter {
    /// Creates a splitter for `2^log2_access_unit_size`-byte units.
    pub const fn new(log2_access_unit_size: u32, ids: IdGenerator) -> Self {
        Self {
            log2_access_unit_size,
            ids,
        }
    }

    /// Size of one access unit in bytes.
    pub const fn access_unit_size(&self) -> u64 {
        1 << self.log2_access_unit_size
    }
}

impl SubTransSplitter for UnitSplitter {
    fn num_sub_transactions(&self, address: u64, byte_size: u64) -> usize {
        let first = address >> self.log2_access_unit_size;
        let last = (address + byte_size).div_ceil(self.access_unit_size());
        (last - first) as usize
    }

    fn split(&self, trans: &mut Transaction) {
        let unit = self.access_unit_size();
        let start = trans.internal_address & !(unit - 1);
        let end = trans.internal_address + trans.access_byte_size();
        let access = trans.access_type();

        let mut addr = start;
        while addr < end {
            let st = SubTransaction::new(self.ids.next_id(), trans.id, access, addr);
            trans.sub_transactions.push(st);
            addr += unit;
        }
    }
}
