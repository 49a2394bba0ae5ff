//! Controller top port.
//!
//! The controller talks to the rest of the simulation through a single port. Incoming
//! requests are peeked first and only retrieved once the controller has room for them;
//! outgoing responses may be refused when the destination is busy, in which case the
//! controller retries on a later tick.

use std::collections::VecDeque;

use crate::common::SendError;
use crate::protocol::{Request, Response};

/// Default number of requests a [`BufferedPort`] can hold.
pub const DEFAULT_PORT_CAPACITY: usize = 1024;

/// Controller-side view of a connection.
pub trait Port: Send {
    /// Returns the oldest incoming request without removing it.
    fn peek(&self) -> Option<&Request>;

    /// Removes and returns the oldest incoming request.
    fn retrieve(&mut self, now: u64) -> Option<Request>;

    /// Sends a response towards its requester.
    ///
    /// # Errors
    ///
    /// Returns [`SendError::Busy`] if the response cannot be accepted this cycle.
    fn send(&mut self, rsp: Response) -> Result<(), SendError>;
}

/// Port with bounded incoming and outgoing buffers.
///
/// The remote side pushes requests with [`deliver`](Self::deliver) and drains responses
/// with [`pop_response`](Self::pop_response).
#[derive(Debug)]
pub struct BufferedPort {
    incoming: VecDeque<Request>,
    incoming_capacity: usize,
    outgoing: VecDeque<Response>,
    outgoing_capacity: usize,
}

impl Default for BufferedPort {
    fn default() -> Self {
        Self::new(DEFAULT_PORT_CAPACITY, DEFAULT_PORT_CAPACITY)
    }
}

impl BufferedPort {
    /// Creates a port with the given buffer capacities.
    pub fn new(incoming_capacity: usize, outgoing_capacity: usize) -> Self {
        Self {
            incoming: VecDeque::with_capacity(incoming_capacity.min(DEFAULT_PORT_CAPACITY)),
            incoming_capacity,
            outgoing: VecDeque::with_capacity(outgoing_capacity.min(DEFAULT_PORT_CAPACITY)),
            outgoing_capacity,
        }
    }

    /// Returns `true` if another request fits in the incoming buffer.
    pub fn can_deliver(&self) -> bool {
        self.incoming.len() < self.incoming_capacity
    }

    /// Delivers a request from the remote side.
    ///
    /// # Errors
    ///
    /// Returns [`SendError::Busy`] if the incoming buffer is full.
    pub fn deliver(&mut self, req: impl Into<Request>) -> Result<(), SendError> {
        if !self.can_deliver() {
            return Err(SendError::Busy);
        }
        self.incoming.push_back(req.into());
        Ok(())
    }

    /// Removes the oldest response, if any.
    pub fn pop_response(&mut self) -> Option<Response> {
        self.outgoing.pop_front()
    }

    /// Number of requests waiting to be retrieved.
    pub fn pending_requests(&self) -> usize {
        self.incoming.len()
    }

    /// Number of responses waiting to be drained.
    pub fn pending_responses(&self) -> usize {
        self.outgoing.len()
    }
}

impl Port for BufferedPort {
    fn peek(&self) -> Option<&Request> {
        self.incoming.front()
    }

    fn retrieve(&mut self, _now: u64) -> Option<Request> {
        self.incoming.pop_front()
    }

    fn send(&mut self, rsp: Response) -> Result<(), SendError> {
        if self.outgoing.len() >= self.outgoing_capacity {
            return Err(SendError::Busy);
        }
        self.outgoing.push_back(rsp);
        Ok(())
    }
}
