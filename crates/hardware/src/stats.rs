//! Controller statistics collection and reporting.
//!
//! This module tracks what one memory controller did over a run. It provides:
//! 1. **Traffic:** Admitted transactions, completed reads and writes, and bytes moved.
//! 2. **Commands:** Issue counts per DRAM command kind, prerequisites included.
//! 3. **Back-pressure:** Response sends refused by a busy destination.
//! 4. **Activity:** Ticks that made progress versus ticks that did not.

use std::fmt;

use crate::signal::CommandKind;

/// Statistics of one memory controller.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DramStats {
    /// Requests accepted from the top port.
    pub transactions_admitted: u64,
    /// Reads answered with a `DataReady` response.
    pub reads_completed: u64,
    /// Writes answered with a `WriteDone` response.
    pub writes_completed: u64,
    /// Bytes returned by completed reads.
    pub bytes_read: u64,
    /// Bytes carried by completed writes.
    pub bytes_written: u64,
    /// Commands started, indexed by [`CommandKind::index`].
    pub commands_issued: [u64; CommandKind::COUNT],
    /// Response sends that failed and were retried later.
    pub response_retries: u64,
    /// Ticks on which any pipeline stage made progress.
    pub active_ticks: u64,
    /// Ticks on which nothing changed.
    pub idle_ticks: u64,
}

impl DramStats {
    /// Number of `kind` commands started.
    pub const fn issued(&self, kind: CommandKind) -> u64 {
        self.commands_issued[kind.index()]
    }

    /// Total commands started.
    pub fn total_commands(&self) -> u64 {
        self.commands_issued.iter().sum()
    }

    /// Activates per completed column access; 1.0 under a close-page policy with no reuse.
    pub fn activates_per_access(&self) -> f64 {
        let accesses = self.issued(CommandKind::Read)
            + self.issued(CommandKind::ReadPrecharge)
            + self.issued(CommandKind::Write)
            + self.issued(CommandKind::WritePrecharge);
        if accesses == 0 {
            return 0.0;
        }
        self.issued(CommandKind::Activate) as f64 / accesses as f64
    }

    pub(crate) fn record_command(&mut self, kind: CommandKind) {
        self.commands_issued[kind.index()] += 1;
    }
}

impl fmt::Display for DramStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ticks = self.active_ticks + self.idle_ticks;
        let busy = if ticks == 0 {
            0.0
        } else {
            self.active_ticks as f64 / ticks as f64 * 100.0
        };

        writeln!(f, "==========================================================")?;
        writeln!(f, "DRAM CONTROLLER STATISTICS")?;
        writeln!(f, "==========================================================")?;
        writeln!(f, "transactions.admitted    {}", self.transactions_admitted)?;
        writeln!(f, "reads.completed          {}", self.reads_completed)?;
        writeln!(f, "writes.completed         {}", self.writes_completed)?;
        writeln!(f, "bytes.read               {}", self.bytes_read)?;
        writeln!(f, "bytes.written            {}", self.bytes_written)?;
        writeln!(f, "response.retries         {}", self.response_retries)?;
        writeln!(f, "ticks.active             {} ({busy:.2}%)", self.active_ticks)?;
        writeln!(f, "ticks.idle               {}", self.idle_ticks)?;
        writeln!(f, "----------------------------------------------------------")?;
        writeln!(f, "COMMANDS")?;
        for kind in CommandKind::ALL {
            writeln!(f, "  {kind:<22} {}", self.issued(kind))?;
        }
        writeln!(f, "  {:<22} {}", "total", self.total_commands())?;
        writeln!(f, "  {:<22} {:.4}", "activates.per.access", self.activates_per_access())?;
        write!(f, "==========================================================")
    }
}
