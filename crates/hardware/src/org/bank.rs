//! Per-bank state machine.
//!
//! A bank holds at most one open row and executes at most one command at a time. Given a
//! requested column command it decides which command has to run next:
//! 1. **Closed Bank:** An `Activate` for the requested row.
//! 2. **Open Bank, Same Row:** The requested command itself.
//! 3. **Open Bank, Other Row:** A `Precharge` to close the current row.
//!
//! The bank also keeps one cooldown counter per command kind. A kind may only issue once its
//! counter has drained to zero.

use tracing::trace;

use crate::common::IdGenerator;
use crate::signal::{Command, CommandKind};

/// Row-buffer state of a bank.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BankState {
    /// A row is latched in the row buffer.
    Open,
    /// No row is open.
    #[default]
    Closed,
    /// The bank is in self-refresh.
    SelfRefresh,
    /// The bank is powered down.
    PowerDown,
}

/// One DRAM bank.
pub trait Bank: Send {
    /// Returns the command that can start at `now` to make progress on `cmd`.
    ///
    /// The result is a copy of `cmd` under a fresh id, with its kind rewritten to the
    /// required kind. Returns `None` if that kind is still cooling down.
    fn get_ready_command(&self, now: u64, cmd: &Command) -> Option<Command>;

    /// Starts executing `cmd`.
    ///
    /// # Panics
    ///
    /// Panics if a command is already in flight or the command is not valid in the
    /// current state.
    fn start_command(&mut self, now: u64, cmd: Command);

    /// Holds back `kind` for at least `cycles` more cycles. Never shortens a cooldown.
    fn update_timing(&mut self, kind: CommandKind, cycles: u64);

    /// Advances the bank by one cycle and reports whether anything changed.
    fn tick(&mut self, now: u64) -> bool;
}

/// Default bank implementation.
#[derive(Debug)]
pub struct BankImpl {
    name: String,
    state: BankState,
    current_cmd: Option<Command>,
    open_row: u64,
    cmd_cycles: [u64; CommandKind::COUNT],
    cycles_to_cmd_available: [u64; CommandKind::COUNT],
    ids: IdGenerator,
}

impl BankImpl {
    /// Creates a closed, idle bank.
    ///
    /// # Arguments
    ///
    /// * `name` - Name used in trace events, e.g. `MemCtrl.Bank[0][0][3]`.
    /// * `cmd_cycles` - Execution time of each command kind, indexed by [`CommandKind::index`].
    /// * `ids` - Id source for the commands this bank derives.
    pub fn new(name: impl Into<String>, cmd_cycles: [u64; CommandKind::COUNT], ids: IdGenerator) -> Self {
        Self {
            name: name.into(),
            state: BankState::Closed,
            current_cmd: None,
            open_row: 0,
            cmd_cycles,
            cycles_to_cmd_available: [0; CommandKind::COUNT],
            ids,
        }
    }

    /// Bank name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current row-buffer state.
    pub const fn state(&self) -> BankState {
        self.state
    }

    /// Open row; meaningful only while the bank is [`BankState::Open`].
    pub const fn open_row(&self) -> u64 {
        self.open_row
    }

    /// Command in flight, if any.
    pub const fn current_command(&self) -> Option<&Command> {
        self.current_cmd.as_ref()
    }

    /// Cycles until `kind` may issue again.
    pub const fn cycles_to_available(&self, kind: CommandKind) -> u64 {
        self.cycles_to_cmd_available[kind.index()]
    }

    /// Execution time of `kind`.
    pub const fn cmd_cycles(&self, kind: CommandKind) -> u64 {
        self.cmd_cycles[kind.index()]
    }

    fn required_kind(&self, cmd: &Command) -> CommandKind {
        match (self.state, cmd.kind) {
            (BankState::Closed, k) if k.is_read_or_write() => CommandKind::Activate,
            (BankState::Open, k) if k.is_read_or_write() => {
                if self.open_row == cmd.location.row {
                    k
                } else {
                    CommandKind::Precharge
                }
            }
            (state, kind) => panic!(
                "{}: no rule to serve a {kind} command while the bank is {state:?}",
                self.name
            ),
        }
    }

    fn apply_transition(&mut self, cmd: &Command) {
        match (self.state, cmd.kind) {
            (BankState::Closed, CommandKind::Activate) => {
                self.state = BankState::Open;
                self.open_row = cmd.location.row;
            }
            (
                BankState::Open,
                CommandKind::Precharge | CommandKind::ReadPrecharge | CommandKind::WritePrecharge,
            ) => {
                self.state = BankState::Closed;
            }
            (BankState::Open, CommandKind::Read | CommandKind::Write) => {}
            (state, kind) => panic!(
                "{}: cannot start a {kind} command while the bank is {state:?}",
                self.name
            ),
        }
    }

    fn count_down_current_cmd(&mut self, now: u64) -> bool {
        let Some(cmd) = self.current_cmd.as_mut() else {
            return false;
        };

        cmd.cycle_left = cmd.cycle_left.saturating_sub(1);
        if cmd.cycle_left == 0 {
            self.complete_current_cmd(now);
        }
        true
    }

    fn complete_current_cmd(&mut self, now: u64) {
        let Some(cmd) = self.current_cmd.take() else {
            return;
        };

        if cmd.is_read_or_write() {
            if let Some(st) = &cmd.sub_trans {
                st.mark_completed();
            }
        }

        trace!(bank = %self.name, now, id = cmd.id, kind = %cmd.kind, "command completed");
    }

    fn count_down_timing(&mut self) -> bool {
        let mut made_progress = false;
        for cycles in &mut self.cycles_to_cmd_available {
            if *cycles > 0 {
                *cycles -= 1;
                made_progress = true;
            }
        }
        made_progress
    }
}

impl Bank for BankImpl {
    fn get_ready_command(&self, _now: u64, cmd: &Command) -> Option<Command> {
        if self.current_cmd.is_some() {
            return None;
        }

        let required = self.required_kind(cmd);
        if self.cycles_to_cmd_available[required.index()] > 0 {
            return None;
        }

        Some(cmd.derive(self.ids.next_id(), required))
    }

    fn start_command(&mut self, now: u64, mut cmd: Command) {
        if let Some(current) = &self.current_cmd {
            panic!(
                "{}: cannot start command {} ({}), command {} ({}) is still in flight",
                self.name, cmd.id, cmd.kind, current.id, current.kind
            );
        }

        self.apply_transition(&cmd);
        cmd.cycle_left = self.cmd_cycles[cmd.kind.index()];

        trace!(
            bank = %self.name,
            now,
            id = cmd.id,
            kind = %cmd.kind,
            row = cmd.location.row,
            cycles = cmd.cycle_left,
            "command started"
        );

        self.current_cmd = Some(cmd);
    }

    fn update_timing(&mut self, kind: CommandKind, cycles: u64) {
        let slot = &mut self.cycles_to_cmd_available[kind.index()];
        if *slot < cycles {
            *slot = cycles;
        }
    }

    fn tick(&mut self, now: u64) -> bool {
        let cmd_progress = self.count_down_current_cmd(now);
        let timing_progress = self.count_down_timing();
        cmd_progress || timing_progress
    }
}
