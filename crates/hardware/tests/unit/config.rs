//! # Configuration Tests
//!
//! Tests for configuration defaults, JSON deserialization, and the validation the
//! controller builder applies before wiring anything.

use std::io::Write;

use dramsim_core::MemControllerBuilder;
use dramsim_core::addressmapping::LocationItem;
use dramsim_core::common::ConfigError;
use dramsim_core::config::{DramConfig, Protocol};
use pretty_assertions::assert_eq;

// ══════════════════════════════════════════════════════════
// 1. Defaults
// ══════════════════════════════════════════════════════════

#[test]
fn default_config_is_ddr3_1600() {
    let config = DramConfig::default();
    assert_eq!(config.protocol, Protocol::Ddr3);
    assert_eq!(config.queues.transaction_queue_size, 32);
    assert_eq!(config.queues.command_queue_size, 8);
    assert_eq!(config.organization.bus_width, 64);
    assert_eq!(config.organization.burst_length, 8);
    assert_eq!(config.organization.num_rank, 2);
    assert_eq!(config.organization.num_row, 32768);
    assert_eq!(config.organization.num_col, 1024);
    assert_eq!(config.timing.t_cl, 11);
    assert_eq!(config.timing.t_rcd, 11);
    assert_eq!(config.timing.t_ras, 28);
    assert!(config.address_conversion.is_none());
}

#[test]
fn default_capacity_is_four_gib() {
    assert_eq!(MemControllerBuilder::new().capacity().unwrap(), 4 << 30);
}

#[test]
fn empty_json_equals_defaults() {
    assert_eq!(DramConfig::from_json("{}").unwrap(), DramConfig::default());
}

// ══════════════════════════════════════════════════════════
// 2. Deserialization
// ══════════════════════════════════════════════════════════

#[test]
fn partial_sections_keep_remaining_defaults() {
    let config = DramConfig::from_json(
        r#"{
            "queues": { "command_queue_size": 16 },
            "organization": {
                "num_bank_group": 4,
                "bit_order": ["row", "rank", "bank", "channel", "bank_group", "column"]
            },
            "timing": { "t_ccd_l": 6 }
        }"#,
    )
    .unwrap();

    assert_eq!(config.queues.command_queue_size, 16);
    assert_eq!(config.queues.transaction_queue_size, 32);
    assert_eq!(config.organization.num_bank_group, 4);
    assert_eq!(config.organization.bit_order[3], LocationItem::Channel);
    assert_eq!(config.timing.t_ccd_l, 6);
    assert_eq!(config.timing.t_ccd_s, 4);
}

#[test]
fn address_conversion_section_parses() {
    let config = DramConfig::from_json(
        r#"{
            "address_conversion": {
                "interleaving_size": 4096,
                "total_num_of_elements": 8,
                "current_element_index": 2,
                "lower_bound": 0,
                "upper_bound": 4294967296
            }
        }"#,
    )
    .unwrap();

    let conv = config.address_conversion.unwrap();
    assert_eq!(conv.interleaving_size, 4096);
    assert_eq!(conv.current_element_index, 2);
    assert_eq!(conv.upper_bound, 1 << 32);
}

#[test]
fn protocol_names_are_uppercase() {
    for protocol in Protocol::ALL {
        let json = format!(r#"{{ "protocol": "{protocol}" }}"#);
        assert_eq!(DramConfig::from_json(&json).unwrap().protocol, protocol);
    }
}

#[test]
fn unknown_protocol_is_rejected() {
    let err = DramConfig::from_json(r#"{ "protocol": "DDR9" }"#).unwrap_err();
    assert!(matches!(err, ConfigError::Json(_)));
}

#[test]
fn unknown_field_is_rejected() {
    let err = DramConfig::from_json(r#"{ "timing": { "t_foo": 1 } }"#).unwrap_err();
    assert!(matches!(err, ConfigError::Json(_)));
}

#[test]
fn config_loads_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{ "protocol": "GDDR5X", "organization": {{ "num_rank": 1 }} }}"#).unwrap();

    let config = DramConfig::from_json_file(file.path()).unwrap();

    assert_eq!(config.protocol, Protocol::Gddr5x);
    assert_eq!(config.organization.num_rank, 1);
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = DramConfig::from_json_file(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}

// ══════════════════════════════════════════════════════════
// 3. Build-time validation
// ══════════════════════════════════════════════════════════

#[test]
fn zero_queue_sizes_are_rejected() {
    let err = MemControllerBuilder::new()
        .with_transaction_queue_size(0)
        .build("MemCtrl")
        .unwrap_err();
    assert!(matches!(err, ConfigError::ZeroCapacity { .. }));

    let err = MemControllerBuilder::new()
        .with_command_queue_size(0)
        .build("MemCtrl")
        .unwrap_err();
    assert!(matches!(err, ConfigError::ZeroCapacity { .. }));
}

#[test]
fn bus_width_must_hold_whole_devices() {
    let err = MemControllerBuilder::new()
        .with_device_width(24)
        .build("MemCtrl")
        .unwrap_err();
    assert!(matches!(
        err,
        ConfigError::InvalidBusWidth {
            bus_width: 64,
            device_width: 24
        }
    ));
}

#[test]
fn non_power_of_two_geometry_is_rejected() {
    let err = MemControllerBuilder::new()
        .with_num_bank(6)
        .build("MemCtrl")
        .unwrap_err();
    assert!(matches!(err, ConfigError::NotPowerOfTwo { value: 6, .. }));
}

#[test]
fn inconsistent_interleaving_is_rejected() {
    let cases = [
        MemControllerBuilder::new().with_interleaving_addr_conversion(3000, 4, 0, 0, 1 << 30),
        MemControllerBuilder::new().with_interleaving_addr_conversion(4096, 4, 4, 0, 1 << 30),
        MemControllerBuilder::new().with_interleaving_addr_conversion(4096, 4, 0, 1 << 30, 1 << 30),
    ];
    for builder in cases {
        let err = builder.build("MemCtrl").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidAddressConversion(_)), "{err}");
    }
}

#[test]
fn builder_reflects_the_parsed_config() {
    let config = DramConfig::from_json(r#"{ "protocol": "HBM2" }"#).unwrap();
    let builder = MemControllerBuilder::from_config(config.clone());
    assert_eq!(builder.config(), &config);
}
