//! Bounded first-come first-served sub-transaction queue.

use std::collections::VecDeque;

use crate::cmdq::CommandQueue;
use crate::signal::{SubTransaction, Transaction};
use crate::trans::command_creator::CommandCreator;

/// Buffers sub-transactions until the command queue can take them.
pub trait SubTransactionQueue: Send {
    /// Returns `true` if `n` more sub-transactions fit.
    ///
    /// # Panics
    ///
    /// Panics if `n` reaches the queue capacity: such a transaction could never be admitted.
    fn can_push(&self, n: usize) -> bool;

    /// Enqueues every sub-transaction of `trans`, in order.
    ///
    /// # Panics
    ///
    /// Panics if the sub-transactions do not fit; callers check [`can_push`](Self::can_push).
    fn push(&mut self, trans: &Transaction);

    /// Tries to move the oldest sub-transaction into `cmd_queue`.
    fn tick(&mut self, now: u64, cmd_queue: &mut dyn CommandQueue) -> bool;

    /// Number of queued sub-transactions.
    fn len(&self) -> usize;

    /// Returns `true` if nothing is queued.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Serves sub-transactions strictly in arrival order.
///
/// Only the head of the queue is ever offered to the command queue, so a blocked head
/// blocks everything behind it.
#[derive(Debug)]
pub struct FcfsSubTransactionQueue<C: CommandCreator> {
    capacity: usize,
    queue: VecDeque<SubTransaction>,
    creator: C,
}

impl<C: CommandCreator> FcfsSubTransactionQueue<C> {
    /// Creates an empty queue holding at most `capacity` sub-transactions.
    pub fn new(capacity: usize, creator: C) -> Self {
        Self {
            capacity,
            queue: VecDeque::with_capacity(capacity),
            creator,
        }
    }

    /// Maximum number of queued sub-transactions.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<C: CommandCreator> SubTransactionQueue for FcfsSubTransactionQueue<C> {
    fn can_push(&self, n: usize) -> bool {
        assert!(
            n < self.capacity,
            "transaction with {n} sub-transactions can never fit in a queue of capacity {}",
            self.capacity
        );
        self.queue.len() + n <= self.capacity
    }

    fn push(&mut self, trans: &Transaction) {
        assert!(
            self.queue.len() + trans.sub_transactions.len() <= self.capacity,
            "sub-transaction queue overflow: {} queued, {} pushed, capacity {}",
            self.queue.len(),
            trans.sub_transactions.len(),
            self.capacity
        );
        self.queue.extend(trans.sub_transactions.iter().cloned());
    }

    fn tick(&mut self, _now: u64, cmd_queue: &mut dyn CommandQueue) -> bool {
        let Some(head) = self.queue.front() else {
            return false;
        };

        let cmd = self.creator.create(head);
        if !cmd_queue.can_accept(&cmd) {
            return false;
        }

        cmd_queue.accept(cmd);
        let _ = self.queue.pop_front();
        true
    }

    fn len(&self) -> usize {
        self.queue.len()
    }
}
