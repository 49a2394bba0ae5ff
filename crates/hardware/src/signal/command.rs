//! DRAM commands.
//!
//! A command is one JEDEC-style operation addressed to a single bank. The controller
//! creates a *requested* command per sub-transaction; banks derive the command they can
//! actually execute next (an `Activate` in front of a `Read`, for example) by cloning the
//! requested one with a different kind.

use std::fmt;

use crate::addressmapping::Location;
use crate::signal::transaction::SubTransaction;

/// Kind of DRAM command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CommandKind {
    /// Column read; leaves the row open.
    Read,
    /// Column read followed by an automatic precharge.
    ReadPrecharge,
    /// Column write; leaves the row open.
    Write,
    /// Column write followed by an automatic precharge.
    WritePrecharge,
    /// Opens a row.
    Activate,
    /// Closes the open row.
    Precharge,
    /// Refreshes a single bank.
    RefreshBank,
    /// Refreshes every bank of a rank.
    Refresh,
    /// Enters self-refresh.
    SelfRefreshEnter,
    /// Leaves self-refresh.
    SelfRefreshExit,
}

impl CommandKind {
    /// Number of command kinds.
    pub const COUNT: usize = 10;

    /// Every command kind, in index order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Read,
        Self::ReadPrecharge,
        Self::Write,
        Self::WritePrecharge,
        Self::Activate,
        Self::Precharge,
        Self::RefreshBank,
        Self::Refresh,
        Self::SelfRefreshEnter,
        Self::SelfRefreshExit,
    ];

    /// Dense index used by per-kind tables.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns `true` for `Read` and `ReadPrecharge`.
    pub const fn is_read(self) -> bool {
        matches!(self, Self::Read | Self::ReadPrecharge)
    }

    /// Returns `true` for `Write` and `WritePrecharge`.
    pub const fn is_write(self) -> bool {
        matches!(self, Self::Write | Self::WritePrecharge)
    }

    /// Returns `true` for the four column-access kinds.
    pub const fn is_read_or_write(self) -> bool {
        self.is_read() || self.is_write()
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Read => "Read",
            Self::ReadPrecharge => "ReadPrecharge",
            Self::Write => "Write",
            Self::WritePrecharge => "WritePrecharge",
            Self::Activate => "Activate",
            Self::Precharge => "Precharge",
            Self::RefreshBank => "RefreshBank",
            Self::Refresh => "Refresh",
            Self::SelfRefreshEnter => "SelfRefreshEnter",
            Self::SelfRefreshExit => "SelfRefreshExit",
        };
        f.pad(name)
    }
}

/// One DRAM command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Command {
    /// Unique command id.
    pub id: u64,
    /// Command kind.
    pub kind: CommandKind,
    /// Target bank, row and column.
    pub location: Location,
    /// Cycles until the command finishes executing; set when a bank starts it.
    pub cycle_left: u64,
    /// Sub-transaction served by this command. Refresh-class commands have none.
    pub sub_trans: Option<SubTransaction>,
}

impl Command {
    /// Creates a command that has not started executing.
    pub const fn new(
        id: u64,
        kind: CommandKind,
        location: Location,
        sub_trans: Option<SubTransaction>,
    ) -> Self {
        Self {
            id,
            kind,
            location,
            cycle_left: 0,
            sub_trans,
        }
    }

    /// Clones this command under a new id and kind.
    ///
    /// The location and the sub-transaction back-reference are preserved.
    #[must_use]
    pub fn derive(&self, id: u64, kind: CommandKind) -> Self {
        Self {
            id,
            kind,
            location: self.location,
            cycle_left: 0,
            sub_trans: self.sub_trans.clone(),
        }
    }

    /// Returns `true` if this command reads or writes a column.
    #[inline]
    pub const fn is_read_or_write(&self) -> bool {
        self.kind.is_read_or_write()
    }
}
