//! Channel Unit Tests.
//!
//! Verifies command routing to the addressed bank and the scoped broadcast of timing
//! constraints: the issuing bank, its bank-group siblings, other groups of the same
//! rank and other ranks each receive their own table.

use crate::common::mocks::bank::MockDramBank;
use dramsim_core::addressmapping::Location;
use dramsim_core::common::IdGenerator;
use dramsim_core::org::{Bank, BankImpl, Banks, Channel, ChannelImpl, TimeTable, TimeTableEntry, Timing};
use dramsim_core::signal::{Command, CommandKind};
use mockall::predicate::{always, eq};

fn at(rank: u64, bank_group: u64, bank: u64, kind: CommandKind) -> Command {
    let location = Location {
        rank,
        bank_group,
        bank,
        ..Location::default()
    };
    Command::new(1, kind, location, None)
}

/// One `Read -> Read` entry per scope, valued 1 (same bank) through 4 (other ranks).
fn scoped_read_timing() -> Timing {
    let table = |gap| {
        let mut t = TimeTable::new();
        t.set(CommandKind::Read, vec![TimeTableEntry::new(CommandKind::Read, gap)]);
        t
    };
    Timing {
        same_bank: table(1),
        other_banks_in_bank_group: table(2),
        same_rank: table(3),
        other_ranks: table(4),
    }
}

fn gap_seen_by(target: (u64, u64, u64), r: u64, g: u64, b: u64) -> u64 {
    let (tr, tg, tb) = target;
    if r != tr {
        4
    } else if g != tg {
        3
    } else if b != tb {
        2
    } else {
        1
    }
}

// ══════════════════════════════════════════════════════════
// 1. Bank array
// ══════════════════════════════════════════════════════════

#[test]
fn banks_are_created_in_rank_group_bank_order() {
    let mut created = Vec::new();
    let banks = Banks::from_fn(2, 2, 2, |r, g, b| -> Box<dyn Bank> {
        created.push((r, g, b));
        Box::new(MockDramBank::new())
    });

    assert_eq!(banks.size(), (2, 2, 2));
    assert_eq!(created.len(), 8);
    assert_eq!(created[0], (0, 0, 0));
    assert_eq!(created[1], (0, 0, 1));
    assert_eq!(created[2], (0, 1, 0));
    assert_eq!(created[7], (1, 1, 1));
}

#[test]
#[should_panic(expected = "outside a 1x1x2 channel")]
fn out_of_range_bank_panics() {
    let banks = Banks::from_fn(1, 1, 2, |_, _, _| -> Box<dyn Bank> { Box::new(MockDramBank::new()) });
    let _ = banks.get(0, 0, 2);
}

// ══════════════════════════════════════════════════════════
// 2. Routing
// ══════════════════════════════════════════════════════════

#[test]
fn get_ready_command_asks_the_addressed_bank() {
    let banks = Banks::from_fn(2, 1, 2, |r, g, b| -> Box<dyn Bank> {
        let mut bank = MockDramBank::new();
        if (r, g, b) == (1, 0, 1) {
            bank.expect_get_ready_command()
                .times(1)
                .returning(|_, c| Some(c.derive(9, CommandKind::Activate)));
        } else {
            bank.expect_get_ready_command().never();
        }
        Box::new(bank)
    });
    let channel = ChannelImpl::new(banks, Timing::default());

    let ready = channel
        .get_ready_command(0, &at(1, 0, 1, CommandKind::ReadPrecharge))
        .unwrap();

    assert_eq!(ready.kind, CommandKind::Activate);
}

#[test]
fn start_command_reaches_the_addressed_bank() {
    let banks = Banks::from_fn(1, 2, 2, |r, g, b| -> Box<dyn Bank> {
        let mut bank = MockDramBank::new();
        let expected = if (r, g, b) == (0, 1, 0) { 1 } else { 0 };
        bank.expect_start_command()
            .with(eq(5), always())
            .times(expected)
            .return_const(());
        Box::new(bank)
    });
    let mut channel = ChannelImpl::new(banks, Timing::default());

    channel.start_command(5, at(0, 1, 0, CommandKind::Activate));
}

#[test]
fn tick_advances_every_bank() {
    let banks = Banks::from_fn(1, 1, 4, |_, _, b| -> Box<dyn Bank> {
        let mut bank = MockDramBank::new();
        bank.expect_tick().with(eq(3)).times(1).return_const(b == 0);
        Box::new(bank)
    });
    let mut channel = ChannelImpl::new(banks, Timing::default());

    assert!(channel.tick(3));
}

#[test]
fn idle_banks_report_no_progress() {
    let banks = Banks::from_fn(1, 1, 2, |_, _, _| -> Box<dyn Bank> {
        let mut bank = MockDramBank::new();
        bank.expect_tick().return_const(false);
        Box::new(bank)
    });
    let mut channel = ChannelImpl::new(banks, Timing::default());

    assert!(!channel.tick(0));
}

// ══════════════════════════════════════════════════════════
// 3. Timing broadcast
// ══════════════════════════════════════════════════════════

#[test]
fn update_timing_applies_the_table_of_each_scope() {
    let target = (0, 1, 0);
    let banks = Banks::from_fn(2, 2, 2, |r, g, b| -> Box<dyn Bank> {
        let mut bank = MockDramBank::new();
        bank.expect_update_timing()
            .with(eq(CommandKind::Read), eq(gap_seen_by(target, r, g, b)))
            .times(1)
            .return_const(());
        Box::new(bank)
    });
    let mut channel = ChannelImpl::new(banks, scoped_read_timing());

    channel.update_timing(0, &at(0, 1, 0, CommandKind::Read));
}

#[test]
fn kinds_without_entries_update_nothing() {
    let banks = Banks::from_fn(1, 2, 2, |_, _, _| -> Box<dyn Bank> {
        let mut bank = MockDramBank::new();
        bank.expect_update_timing().never();
        Box::new(bank)
    });
    let mut channel = ChannelImpl::new(banks, scoped_read_timing());

    channel.update_timing(0, &at(0, 0, 0, CommandKind::Write));
}

#[test]
fn rank_wide_commands_are_not_broadcast() {
    let mut timing = scoped_read_timing();
    for kind in [
        CommandKind::Refresh,
        CommandKind::SelfRefreshEnter,
        CommandKind::SelfRefreshExit,
    ] {
        timing
            .same_rank
            .set(kind, vec![TimeTableEntry::new(CommandKind::Activate, 10)]);
    }
    let banks = Banks::from_fn(1, 1, 2, |_, _, _| -> Box<dyn Bank> {
        let mut bank = MockDramBank::new();
        bank.expect_update_timing().never();
        Box::new(bank)
    });
    let mut channel = ChannelImpl::new(banks, timing);

    channel.update_timing(0, &at(0, 0, 0, CommandKind::Refresh));
    channel.update_timing(0, &at(0, 0, 0, CommandKind::SelfRefreshEnter));
    channel.update_timing(0, &at(0, 0, 0, CommandKind::SelfRefreshExit));
}

#[test]
fn broadcast_holds_back_real_banks() {
    let cycles = [1; CommandKind::COUNT];
    let ids = IdGenerator::new();
    let banks = Banks::from_fn(2, 1, 2, |r, g, b| -> Box<dyn Bank> {
        Box::new(BankImpl::new(format!("Bank[{r}][{g}][{b}]"), cycles, ids.clone()))
    });
    let mut channel = ChannelImpl::new(banks, scoped_read_timing());

    // Open row 0 in a sibling bank and in a bank of the other rank.
    for (r, b) in [(0, 1), (1, 0)] {
        let activate = channel
            .get_ready_command(0, &at(r, 0, b, CommandKind::Read))
            .unwrap();
        assert_eq!(activate.kind, CommandKind::Activate);
        channel.start_command(0, activate);
    }
    assert!(channel.tick(1));

    channel.update_timing(1, &at(0, 0, 0, CommandKind::Read));

    let sibling = at(0, 0, 1, CommandKind::Read);
    let other_rank = at(1, 0, 0, CommandKind::Read);
    assert!(channel.get_ready_command(1, &sibling).is_none());
    channel.tick(2);
    assert!(channel.get_ready_command(2, &sibling).is_none());
    channel.tick(3);
    assert_eq!(
        channel.get_ready_command(3, &sibling).unwrap().kind,
        CommandKind::Read
    );
    assert!(channel.get_ready_command(3, &other_rank).is_none());
    channel.tick(4);
    channel.tick(5);
    assert!(channel.get_ready_command(5, &other_rank).is_some());
}
