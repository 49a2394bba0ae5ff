//! Trace runner.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::common::{AccessType, SimError};
use crate::controller::MemController;
use crate::port::BufferedPort;
use crate::protocol::Response;
use crate::sim::trace::TraceEntry;
use crate::stats::DramStats;

/// Default cycle budget of a run.
pub const DEFAULT_MAX_CYCLES: u64 = 10_000_000;

/// Timing of one answered request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Completion {
    /// Request id.
    pub request_id: u64,
    /// Read or write.
    pub access: AccessType,
    /// Global address of the request.
    pub address: u64,
    /// Cycle at which the request entered the port.
    pub issued_at: u64,
    /// Cycle at which the response left the controller.
    pub completed_at: u64,
    /// Data returned by a read.
    pub data: Option<Vec<u8>>,
}

impl Completion {
    /// Cycles between delivery and response.
    pub const fn latency(&self) -> u64 {
        self.completed_at - self.issued_at
    }
}

/// Outcome of a run.
#[derive(Clone, Debug, PartialEq)]
pub struct RunReport {
    /// Cycle on which the last response was sent.
    pub final_cycle: u64,
    /// Answered requests, in response order.
    pub completions: Vec<Completion>,
    /// Controller statistics at the end of the run.
    pub stats: DramStats,
}

impl RunReport {
    /// Mean request latency in cycles.
    pub fn mean_latency(&self) -> f64 {
        if self.completions.is_empty() {
            return 0.0;
        }
        let total: u64 = self.completions.iter().map(Completion::latency).sum();
        total as f64 / self.completions.len() as f64
    }
}

#[derive(Debug)]
struct Outstanding {
    access: AccessType,
    address: u64,
    issued_at: u64,
}

/// Replays timed requests through one controller.
#[derive(Debug)]
pub struct TraceRunner {
    controller: MemController<BufferedPort>,
    max_cycles: u64,
    now: u64,
}

impl TraceRunner {
    /// Creates a runner around `controller`.
    pub const fn new(controller: MemController<BufferedPort>) -> Self {
        Self {
            controller,
            max_cycles: DEFAULT_MAX_CYCLES,
            now: 0,
        }
    }

    /// Gives up after `max_cycles` cycles.
    #[must_use]
    pub const fn with_max_cycles(mut self, max_cycles: u64) -> Self {
        self.max_cycles = max_cycles;
        self
    }

    /// The controller being driven.
    pub const fn controller(&self) -> &MemController<BufferedPort> {
        &self.controller
    }

    /// Consumes the runner and returns the controller.
    pub fn into_controller(self) -> MemController<BufferedPort> {
        self.controller
    }

    /// Runs until every request in `entries` has been answered.
    ///
    /// Requests become available on their cycle and enter the port in trace order,
    /// as long as the port has room. Cycles continue from where a previous run stopped.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::DuplicateRequestId`] before simulating anything if two entries
    /// share a request id, and [`SimError::CycleLimitExceeded`] if requests remain
    /// unanswered after the cycle budget.
    pub fn run(&mut self, mut entries: Vec<TraceEntry>) -> Result<RunReport, SimError> {
        let mut ids = BTreeSet::new();
        if let Some(dup) = entries.iter().find(|e| !ids.insert(e.request.id())) {
            return Err(SimError::DuplicateRequestId { id: dup.request.id() });
        }

        entries.sort_by_key(|e| e.cycle);
        let mut pending: VecDeque<TraceEntry> = entries.into();
        let mut outstanding: BTreeMap<u64, Outstanding> = BTreeMap::new();
        let mut completions = Vec::new();
        let start = self.now;

        loop {
            let now = self.now;
            while pending.front().is_some_and(|e| e.cycle <= now - start)
                && self.controller.port().can_deliver()
            {
                let Some(entry) = pending.pop_front() else {
                    break;
                };
                let req = entry.request;
                let _ = outstanding.insert(
                    req.id(),
                    Outstanding {
                        access: req.access_type(),
                        address: req.address(),
                        issued_at: now,
                    },
                );
                self.controller.port_mut().deliver(req)?;
            }

            let _ = self.controller.tick(now);

            while let Some(rsp) = self.controller.port_mut().pop_response() {
                let request_id = rsp.respond_to();
                let Some(o) = outstanding.remove(&request_id) else {
                    continue;
                };
                let data = match rsp {
                    Response::DataReady(r) => Some(r.data),
                    Response::WriteDone(_) => None,
                };
                completions.push(Completion {
                    request_id,
                    access: o.access,
                    address: o.address,
                    issued_at: o.issued_at,
                    completed_at: now,
                    data,
                });
            }

            if pending.is_empty() && outstanding.is_empty() {
                self.now += 1;
                return Ok(RunReport {
                    final_cycle: now,
                    completions,
                    stats: self.controller.stats().clone(),
                });
            }

            self.now += 1;
            if self.now - start > self.max_cycles {
                return Err(SimError::CycleLimitExceeded {
                    limit: self.max_cycles,
                    outstanding: outstanding.len() + pending.len(),
                });
            }
        }
    }
}
