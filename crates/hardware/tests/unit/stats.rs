//! Statistics Unit Tests.
//!
//! Verifies derived metrics and the printed report.

use dramsim_core::signal::CommandKind;
use dramsim_core::stats::DramStats;

#[test]
fn empty_stats_have_no_activity() {
    let stats = DramStats::default();
    assert_eq!(stats.total_commands(), 0);
    assert!(stats.activates_per_access().abs() < f64::EPSILON);
}

#[test]
fn activates_per_access_counts_all_column_kinds() {
    let mut stats = DramStats::default();
    stats.commands_issued[CommandKind::Activate.index()] = 3;
    stats.commands_issued[CommandKind::ReadPrecharge.index()] = 2;
    stats.commands_issued[CommandKind::WritePrecharge.index()] = 1;
    stats.commands_issued[CommandKind::Read.index()] = 1;

    assert_eq!(stats.issued(CommandKind::Activate), 3);
    assert_eq!(stats.total_commands(), 7);
    assert!((stats.activates_per_access() - 0.75).abs() < 1e-9);
}

#[test]
fn report_lists_traffic_and_every_command_kind() {
    let mut stats = DramStats {
        reads_completed: 12,
        bytes_read: 768,
        active_ticks: 3,
        idle_ticks: 1,
        ..DramStats::default()
    };
    stats.commands_issued[CommandKind::Activate.index()] = 12;

    let report = stats.to_string();

    assert!(report.contains("DRAM CONTROLLER STATISTICS"));
    assert!(report.contains("reads.completed          12"));
    assert!(report.contains("bytes.read               768"));
    assert!(report.contains("(75.00%)"));
    for kind in CommandKind::ALL {
        assert!(report.contains(&kind.to_string()), "missing {kind}");
    }
}
