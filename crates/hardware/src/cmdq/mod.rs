//! Per-rank command queues.
//!
//! Commands wait here until their bank can execute them. The scheduler is round-robin
//! across queues and first-come first-served within a queue. A queued command that needs a
//! prerequisite (an `Activate` or a `Precharge`) stays queued while the prerequisite is
//! issued in its place; only issuing the queued kind itself removes the entry.

use std::collections::VecDeque;

use crate::org::Channel;
use crate::signal::Command;

/// Holds commands until they can be issued.
pub trait CommandQueue: Send {
    /// Returns `true` if the queue that `cmd` targets has room.
    fn can_accept(&self, cmd: &Command) -> bool;

    /// Enqueues `cmd`.
    ///
    /// # Panics
    ///
    /// Panics if the target queue is full; callers check [`can_accept`](Self::can_accept).
    fn accept(&mut self, cmd: Command);

    /// Returns the next command the channel can start at `now`, if any.
    fn get_command_to_issue(&mut self, now: u64, channel: &dyn Channel) -> Option<Command>;
}

/// One bounded FIFO per `(channel, rank)`, served round-robin.
#[derive(Debug)]
pub struct CommandQueueImpl {
    queues: Vec<VecDeque<Command>>,
    capacity_per_queue: usize,
    num_rank: u64,
    next_queue_index: usize,
}

impl CommandQueueImpl {
    /// Creates `num_channel * num_rank` empty queues of `capacity_per_queue` entries each.
    pub fn new(num_channel: u64, num_rank: u64, capacity_per_queue: usize) -> Self {
        let count = usize::try_from(num_channel * num_rank).unwrap_or(usize::MAX);
        Self {
            queues: (0..count)
                .map(|_| VecDeque::with_capacity(capacity_per_queue))
                .collect(),
            capacity_per_queue,
            num_rank,
            next_queue_index: 0,
        }
    }

    /// Number of queues.
    pub fn num_queues(&self) -> usize {
        self.queues.len()
    }

    /// Number of commands waiting in queue `index`.
    pub fn queue_len(&self, index: usize) -> usize {
        self.queues.get(index).map_or(0, VecDeque::len)
    }

    /// Total number of waiting commands.
    pub fn len(&self) -> usize {
        self.queues.iter().map(VecDeque::len).sum()
    }

    /// Returns `true` if every queue is empty.
    pub fn is_empty(&self) -> bool {
        self.queues.iter().all(VecDeque::is_empty)
    }

    fn queue_index(&self, cmd: &Command) -> usize {
        let index = cmd.location.channel * self.num_rank + cmd.location.rank;
        usize::try_from(index).unwrap_or(usize::MAX)
    }
}

impl CommandQueue for CommandQueueImpl {
    fn can_accept(&self, cmd: &Command) -> bool {
        self.queue_len(self.queue_index(cmd)) < self.capacity_per_queue
    }

    fn accept(&mut self, cmd: Command) {
        let index = self.queue_index(&cmd);
        let capacity = self.capacity_per_queue;
        let Some(queue) = self.queues.get_mut(index) else {
            panic!(
                "command {} targets queue {index}, but only {} queues exist",
                cmd.id,
                self.queues.len()
            );
        };
        assert!(
            queue.len() < capacity,
            "command queue {index} is full ({capacity} entries)"
        );
        queue.push_back(cmd);
    }

    fn get_command_to_issue(&mut self, now: u64, channel: &dyn Channel) -> Option<Command> {
        let count = self.queues.len();
        for offset in 0..count {
            let index = (self.next_queue_index + offset) % count;
            let queue = &mut self.queues[index];

            let found = queue.iter().enumerate().find_map(|(pos, queued)| {
                channel
                    .get_ready_command(now, queued)
                    .map(|ready| (pos, ready.kind == queued.kind, ready))
            });

            if let Some((pos, is_queued_kind, ready)) = found {
                if is_queued_kind {
                    let _ = queue.remove(pos);
                }
                self.next_queue_index = (index + 1) % count;
                return Some(ready);
            }
        }

        None
    }
}
