//! Transactions and sub-transactions.
//!
//! A transaction wraps one accepted request. The splitter divides it into sub-transactions,
//! one per access unit touched. Commands carry a handle to their sub-transaction; the handle
//! shares a completion flag with the copy owned by the transaction, so a bank can mark the
//! access done without owning the transaction.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::common::AccessType;
use crate::protocol::Request;

/// One access-unit slice of a transaction.
#[derive(Clone, Debug)]
pub struct SubTransaction {
    /// Unique sub-transaction id.
    pub id: u64,
    /// Id of the owning transaction.
    pub transaction_id: u64,
    /// Read or write, inherited from the transaction.
    pub access: AccessType,
    /// Access-unit aligned internal address.
    pub address: u64,
    completed: Arc<AtomicBool>,
}

impl SubTransaction {
    /// Creates an incomplete sub-transaction.
    pub fn new(id: u64, transaction_id: u64, access: AccessType, address: u64) -> Self {
        Self {
            id,
            transaction_id,
            access,
            address,
            completed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Returns `true` once a column command has finished for this slice.
    #[inline]
    pub fn is_completed(&self) -> bool {
        self.completed.load(Ordering::Acquire)
    }

    /// Marks the slice as served. Visible through every clone of this handle.
    pub fn mark_completed(&self) {
        self.completed.store(true, Ordering::Release);
    }
}

impl PartialEq for SubTransaction {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.transaction_id == other.transaction_id
    }
}

impl Eq for SubTransaction {}

/// One accepted external request.
#[derive(Clone, Debug)]
pub struct Transaction {
    /// Unique transaction id.
    pub id: u64,
    /// The request being served.
    pub request: Request,
    /// Address after global-to-internal conversion.
    pub internal_address: u64,
    /// Access-unit slices, in address order.
    pub sub_transactions: Vec<SubTransaction>,
}

impl Transaction {
    /// Wraps a request. The internal address starts equal to the global address.
    pub fn new(id: u64, request: Request) -> Self {
        let internal_address = request.address();
        Self {
            id,
            request,
            internal_address,
            sub_transactions: Vec::new(),
        }
    }

    /// Global physical address of the request.
    pub const fn global_address(&self) -> u64 {
        self.request.address()
    }

    /// Number of bytes the request touches.
    pub fn access_byte_size(&self) -> u64 {
        self.request.byte_size()
    }

    /// Whether the request reads or writes.
    pub const fn access_type(&self) -> AccessType {
        self.request.access_type()
    }

    /// A transaction is complete when every sub-transaction is.
    pub fn is_completed(&self) -> bool {
        self.sub_transactions.iter().all(SubTransaction::is_completed)
    }
}
