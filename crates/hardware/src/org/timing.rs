//! Scoped timing tables.
//!
//! After a command issues, every bank in the channel learns how long it must wait before
//! it may issue each kind of command. The wait depends on where the bank sits relative to
//! the issuing bank, so there are four tables:
//! 1. **Same Bank:** The bank that issued the command.
//! 2. **Other Banks In Bank Group:** Its siblings within the same bank group.
//! 3. **Same Rank:** Banks in other bank groups of the same rank.
//! 4. **Other Ranks:** Every bank of every other rank.

use std::fmt;
use std::ops::Index;

use crate::signal::CommandKind;

/// Minimum gap before `next_cmd_kind` may issue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeTableEntry {
    /// Kind that is being held back.
    pub next_cmd_kind: CommandKind,
    /// Cycles that must elapse first.
    pub min_cycle_in_between: u64,
}

impl TimeTableEntry {
    /// Creates an entry.
    pub const fn new(next_cmd_kind: CommandKind, min_cycle_in_between: u64) -> Self {
        Self {
            next_cmd_kind,
            min_cycle_in_between,
        }
    }
}

/// Entries for each issued command kind.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TimeTable([Vec<TimeTableEntry>; CommandKind::COUNT]);

impl TimeTable {
    /// Creates a table with no constraints.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the constraints that follow `issued`.
    pub fn set(&mut self, issued: CommandKind, entries: Vec<TimeTableEntry>) {
        self.0[issued.index()] = entries;
    }

    /// Constraints that follow `issued`.
    pub fn entries(&self, issued: CommandKind) -> &[TimeTableEntry] {
        &self.0[issued.index()]
    }

    /// Looks up the gap between `issued` and `next`, if the table constrains it.
    pub fn gap(&self, issued: CommandKind, next: CommandKind) -> Option<u64> {
        self.entries(issued)
            .iter()
            .find(|e| e.next_cmd_kind == next)
            .map(|e| e.min_cycle_in_between)
    }
}

impl Index<CommandKind> for TimeTable {
    type Output = [TimeTableEntry];

    fn index(&self, issued: CommandKind) -> &Self::Output {
        self.entries(issued)
    }
}

impl fmt::Display for TimeTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for issued in CommandKind::ALL {
            let entries = self.entries(issued);
            if entries.is_empty() {
                continue;
            }
            write!(f, "  {issued:<16} ->")?;
            for e in entries {
                write!(f, " {}:{}", e.next_cmd_kind, e.min_cycle_in_between)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// The four scoped tables of one channel.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Timing {
    /// Constraints on the issuing bank.
    pub same_bank: TimeTable,
    /// Constraints on other banks of the issuing bank group.
    pub other_banks_in_bank_group: TimeTable,
    /// Constraints on banks of other groups in the issuing rank.
    pub same_rank: TimeTable,
    /// Constraints on banks of other ranks.
    pub other_ranks: TimeTable,
}

impl fmt::Display for Timing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "same bank:")?;
        write!(f, "{}", self.same_bank)?;
        writeln!(f, "other banks in bank group:")?;
        write!(f, "{}", self.other_banks_in_bank_group)?;
        writeln!(f, "same rank:")?;
        write!(f, "{}", self.same_rank)?;
        writeln!(f, "other ranks:")?;
        write!(f, "{}", self.other_ranks)
    }
}
