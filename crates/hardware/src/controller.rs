//! The memory controller.
//!
//! This module drives the per-tick pipeline of one controller. Every tick runs, in order:
//! 1. **Respond:** Finalise the oldest completed transaction and send its response.
//! 2. **Channel:** Advance every bank by one cycle.
//! 3. **Issue:** Start the next ready command and broadcast its timing constraints.
//! 4. **Sub-Transaction Queue:** Turn the oldest sub-transaction into a queued command.
//! 5. **Parse Top:** Admit the next request if all of its sub-transactions fit.
//!
//! A tick reports whether any stage made progress; a controller that made none can sleep
//! until a new request arrives.

use std::sync::Arc;

use tracing::debug;

use crate::addressmapping::AddressConverter;
use crate::cmdq::CommandQueue;
use crate::common::{IdGenerator, SendError};
use crate::org::Channel;
use crate::port::Port;
use crate::protocol::{DataReadyResponse, Request, Response, WriteDoneResponse, WriteRequest};
use crate::signal::Transaction;
use crate::stats::DramStats;
use crate::storage::Storage;
use crate::trans::{SubTransSplitter, SubTransactionQueue};

/// Components a [`MemController`] is assembled from.
///
/// [`MemControllerBuilder`](crate::builder::MemControllerBuilder) fills this in from a
/// configuration; tests can substitute any stage.
pub struct ControllerParts {
    /// Controller name, used in log events.
    pub name: String,
    /// Backing storage.
    pub storage: Arc<Storage>,
    /// Whether `storage` is shared and addressed by global physical address.
    pub global_storage: bool,
    /// Global-to-internal address conversion, if this controller owns an interleaved slice.
    pub addr_converter: Option<Box<dyn AddressConverter>>,
    /// Access-unit splitter.
    pub splitter: Box<dyn SubTransSplitter>,
    /// Sub-transaction queue.
    pub sub_trans_queue: Box<dyn SubTransactionQueue>,
    /// Per-rank command queues.
    pub cmd_queue: Box<dyn CommandQueue>,
    /// Bank array.
    pub channel: Box<dyn Channel>,
    /// Id source for transactions.
    pub ids: IdGenerator,
}

impl std::fmt::Debug for ControllerParts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerParts")
            .field("name", &self.name)
            .field("global_storage", &self.global_storage)
            .finish_non_exhaustive()
    }
}

/// Handles read and write requests against a timed DRAM model.
pub struct MemController<P: Port> {
    name: String,
    top_port: P,
    storage: Arc<Storage>,
    global_storage: bool,
    addr_converter: Option<Box<dyn AddressConverter>>,
    splitter: Box<dyn SubTransSplitter>,
    sub_trans_queue: Box<dyn SubTransactionQueue>,
    cmd_queue: Box<dyn CommandQueue>,
    channel: Box<dyn Channel>,
    inflight: Vec<Transaction>,
    ids: IdGenerator,
    stats: DramStats,
}

impl<P: Port> MemController<P> {
    /// Assembles a controller from its parts.
    pub fn from_parts(parts: ControllerParts, top_port: P) -> Self {
        Self {
            name: parts.name,
            top_port,
            storage: parts.storage,
            global_storage: parts.global_storage,
            addr_converter: parts.addr_converter,
            splitter: parts.splitter,
            sub_trans_queue: parts.sub_trans_queue,
            cmd_queue: parts.cmd_queue,
            channel: parts.channel,
            inflight: Vec::new(),
            ids: parts.ids,
            stats: DramStats::default(),
        }
    }

    /// Controller name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The top port.
    pub const fn port(&self) -> &P {
        &self.top_port
    }

    /// Mutable access to the top port, for delivering requests and draining responses.
    pub const fn port_mut(&mut self) -> &mut P {
        &mut self.top_port
    }

    /// Statistics gathered so far.
    pub const fn stats(&self) -> &DramStats {
        &self.stats
    }

    /// Backing storage.
    pub const fn storage(&self) -> &Arc<Storage> {
        &self.storage
    }

    /// Transactions admitted but not yet answered.
    pub fn inflight_len(&self) -> usize {
        self.inflight.len()
    }

    /// Returns `true` when no admitted transaction is waiting for a response.
    pub fn is_idle(&self) -> bool {
        self.inflight.is_empty() && self.sub_trans_queue.is_empty()
    }

    /// Advances the controller by one cycle.
    ///
    /// # Returns
    ///
    /// `true` if any pipeline stage made progress.
    ///
    /// # Panics
    ///
    /// Panics if a transaction reaches outside the backing storage.
    pub fn tick(&mut self, now: u64) -> bool {
        let mut made_progress = false;
        made_progress |= self.respond(now);
        made_progress |= self.channel.tick(now);
        made_progress |= self.issue(now);
        made_progress |= self.sub_trans_queue.tick(now, self.cmd_queue.as_mut());
        made_progress |= self.parse_top(now);

        if made_progress {
            self.stats.active_ticks += 1;
        } else {
            self.stats.idle_ticks += 1;
        }
        made_progress
    }

    fn parse_top(&mut self, now: u64) -> bool {
        let Some(req) = self.top_port.peek().cloned() else {
            return false;
        };

        let internal_address = match &self.addr_converter {
            Some(converter) => converter.convert_external_to_internal(req.address()),
            None => req.address(),
        };
        let units = self.splitter.num_sub_transactions(internal_address, req.byte_size());
        if !self.sub_trans_queue.can_push(units) {
            return false;
        }

        let mut trans = Transaction::new(self.ids.next_id(), req);
        trans.internal_address = internal_address;
        self.splitter.split(&mut trans);

        self.sub_trans_queue.push(&trans);
        let _ = self.top_port.retrieve(now);
        self.stats.transactions_admitted += 1;

        debug!(
            controller = %self.name,
            now,
            req = trans.request.id(),
            access = %trans.access_type(),
            address = trans.global_address(),
            internal = trans.internal_address,
            size = trans.access_byte_size(),
            sub_transactions = trans.sub_transactions.len(),
            "transaction admitted"
        );

        self.inflight.push(trans);
        true
    }

    fn issue(&mut self, now: u64) -> bool {
        let Some(cmd) = self.cmd_queue.get_command_to_issue(now, self.channel.as_ref()) else {
            return false;
        };

        self.stats.record_command(cmd.kind);
        self.channel.update_timing(now, &cmd);
        self.channel.start_command(now, cmd);
        true
    }

    fn respond(&mut self, now: u64) -> bool {
        let Some(index) = self.inflight.iter().position(Transaction::is_completed) else {
            return false;
        };

        let rsp = self.finalize(&self.inflight[index]);
        match self.top_port.send(rsp) {
            Ok(()) => {
                let trans = self.inflight.remove(index);
                self.record_completion(&trans);
                debug!(
                    controller = %self.name,
                    now,
                    req = trans.request.id(),
                    access = %trans.access_type(),
                    address = trans.global_address(),
                    "transaction completed"
                );
                true
            }
            Err(SendError::Busy) => {
                self.stats.response_retries += 1;
                debug!(
                    controller = %self.name,
                    now,
                    req = self.inflight[index].request.id(),
                    "response refused, retrying next tick"
                );
                false
            }
        }
    }

    fn storage_address(&self, trans: &Transaction) -> u64 {
        if self.global_storage {
            trans.global_address()
        } else {
            trans.internal_address
        }
    }

    fn finalize(&self, trans: &Transaction) -> Response {
        let address = self.storage_address(trans);
        match &trans.request {
            Request::Read(read) => {
                let data = self
                    .storage
                    .read(address, read.byte_size)
                    .unwrap_or_else(|e| panic!("{}: read of request {} failed: {e}", self.name, read.id));
                Response::DataReady(DataReadyResponse {
                    respond_to: read.id,
                    dst: read.requester,
                    data,
                })
            }
            Request::Write(write) => {
                self.write_back(address, write);
                Response::WriteDone(WriteDoneResponse {
                    respond_to: write.id,
                    dst: write.requester,
                })
            }
        }
    }

    fn write_back(&self, address: u64, write: &WriteRequest) {
        let result = match &write.dirty_mask {
            None => self.storage.write(address, &write.data),
            Some(mask) => self.storage.write_masked(address, &write.data, mask),
        };
        if let Err(e) = result {
            panic!("{}: write of request {} failed: {e}", self.name, write.id);
        }
    }

    fn record_completion(&mut self, trans: &Transaction) {
        match &trans.request {
            Request::Read(r) => {
                self.stats.reads_completed += 1;
                self.stats.bytes_read += r.byte_size;
            }
            Request::Write(w) => {
                self.stats.writes_completed += 1;
                self.stats.bytes_written += w.data.len() as u64;
            }
        }
    }
}

impl<P: Port + std::fmt::Debug> std::fmt::Debug for MemController<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemController")
            .field("name", &self.name)
            .field("top_port", &self.top_port)
            .field("storage", &self.storage)
            .field("inflight", &self.inflight.len())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
