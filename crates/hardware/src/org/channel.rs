//! Bank array and timing broadcast.

use std::fmt;

use crate::org::bank::Bank;
use crate::org::timing::{TimeTable, Timing};
use crate::signal::{Command, CommandKind};

/// Banks of one channel, indexed by rank, bank group and bank.
pub struct Banks {
    num_rank: u64,
    num_bank_group: u64,
    num_bank: u64,
    banks: Vec<Box<dyn Bank>>,
}

impl Banks {
    /// Creates `num_rank * num_bank_group * num_bank` banks with `make(rank, group, bank)`.
    pub fn from_fn<F>(num_rank: u64, num_bank_group: u64, num_bank: u64, mut make: F) -> Self
    where
        F: FnMut(u64, u64, u64) -> Box<dyn Bank>,
    {
        let mut banks = Vec::new();
        for r in 0..num_rank {
            for g in 0..num_bank_group {
                for b in 0..num_bank {
                    banks.push(make(r, g, b));
                }
            }
        }
        Self {
            num_rank,
            num_bank_group,
            num_bank,
            banks,
        }
    }

    /// Returns `(ranks, bank groups per rank, banks per group)`.
    pub const fn size(&self) -> (u64, u64, u64) {
        (self.num_rank, self.num_bank_group, self.num_bank)
    }

    fn index(&self, rank: u64, bank_group: u64, bank: u64) -> usize {
        assert!(
            rank < self.num_rank && bank_group < self.num_bank_group && bank < self.num_bank,
            "bank [{rank}][{bank_group}][{bank}] is outside a {}x{}x{} channel",
            self.num_rank,
            self.num_bank_group,
            self.num_bank
        );
        ((rank * self.num_bank_group + bank_group) * self.num_bank + bank) as usize
    }

    /// Returns the bank at `[rank][bank_group][bank]`.
    ///
    /// # Panics
    ///
    /// Panics if any index is out of range.
    pub fn get(&self, rank: u64, bank_group: u64, bank: u64) -> &dyn Bank {
        let i = self.index(rank, bank_group, bank);
        self.banks[i].as_ref()
    }

    /// Mutable variant of [`get`](Self::get).
    ///
    /// # Panics
    ///
    /// Panics if any index is out of range.
    pub fn get_mut(&mut self, rank: u64, bank_group: u64, bank: u64) -> &mut dyn Bank {
        let i = self.index(rank, bank_group, bank);
        self.banks[i].as_mut()
    }
}

impl fmt::Debug for Banks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Banks")
            .field("num_rank", &self.num_rank)
            .field("num_bank_group", &self.num_bank_group)
            .field("num_bank", &self.num_bank)
            .finish_non_exhaustive()
    }
}

/// A group of ranks sharing one command bus.
pub trait Channel: Send {
    /// Asks the target bank which command can start at `now` for `cmd`.
    fn get_ready_command(&self, now: u64, cmd: &Command) -> Option<Command>;

    /// Starts `cmd` in its target bank.
    fn start_command(&mut self, now: u64, cmd: Command);

    /// Applies the timing constraints that follow issuing `cmd`.
    fn update_timing(&mut self, now: u64, cmd: &Command);

    /// Advances every bank by one cycle and reports whether any of them changed.
    fn tick(&mut self, now: u64) -> bool;
}

/// Default channel implementation.
#[derive(Debug)]
pub struct ChannelImpl {
    banks: Banks,
    timing: Timing,
}

impl ChannelImpl {
    /// Creates a channel over `banks` constrained by `timing`.
    pub const fn new(banks: Banks, timing: Timing) -> Self {
        Self { banks, timing }
    }

    /// The bank array.
    pub const fn banks(&self) -> &Banks {
        &self.banks
    }

    /// The scoped timing tables.
    pub const fn timing(&self) -> &Timing {
        &self.timing
    }
}

impl Channel for ChannelImpl {
    fn get_ready_command(&self, now: u64, cmd: &Command) -> Option<Command> {
        let loc = &cmd.location;
        self.banks
            .get(loc.rank, loc.bank_group, loc.bank)
            .get_ready_command(now, cmd)
    }

    fn start_command(&mut self, now: u64, cmd: Command) {
        let loc = cmd.location;
        self.banks
            .get_mut(loc.rank, loc.bank_group, loc.bank)
            .start_command(now, cmd);
    }

    fn update_timing(&mut self, _now: u64, cmd: &Command) {
        match cmd.kind {
            CommandKind::Activate
            | CommandKind::Read
            | CommandKind::ReadPrecharge
            | CommandKind::Write
            | CommandKind::WritePrecharge
            | CommandKind::Precharge
            | CommandKind::RefreshBank => {}
            CommandKind::Refresh | CommandKind::SelfRefreshEnter | CommandKind::SelfRefreshExit => {
                return;
            }
        }

        let Self { banks, timing } = self;
        let (num_rank, num_bank_group, num_bank) = banks.size();
        for r in 0..num_rank {
            for g in 0..num_bank_group {
                for b in 0..num_bank {
                    let entries = scoped_table(timing, cmd, r, g, b).entries(cmd.kind);
                    let bank = banks.get_mut(r, g, b);
                    for e in entries {
                        bank.update_timing(e.next_cmd_kind, e.min_cycle_in_between);
                    }
                }
            }
        }
    }

    fn tick(&mut self, now: u64) -> bool {
        let mut made_progress = false;
        for bank in &mut self.banks.banks {
            made_progress |= bank.tick(now);
        }
        made_progress
    }
}

/// Picks the table that applies to bank `[rank][bank_group][bank]` after `cmd` issues.
fn scoped_table<'a>(
    timing: &'a Timing,
    cmd: &Command,
    rank: u64,
    bank_group: u64,
    bank: u64,
) -> &'a TimeTable {
    let loc = &cmd.location;
    if loc.rank != rank {
        &timing.other_ranks
    } else if loc.bank_group != bank_group {
        &timing.same_rank
    } else if loc.bank != bank {
        &timing.other_banks_in_bank_group
    } else {
        &timing.same_bank
    }
}
