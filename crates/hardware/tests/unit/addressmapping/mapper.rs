//! Address Mapper Unit Tests.
//!
//! Verifies bit-field slicing under the default and custom field orders, and the
//! rejection of geometries that cannot be sliced.

use dramsim_core::addressmapping::{AddressMapper, Location, LocationItem, MapperBuilder};
use dramsim_core::common::ConfigError;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;

// ══════════════════════════════════════════════════════════
// 1. Default layout
// ══════════════════════════════════════════════════════════

#[test]
fn default_mapper_slices_bank_row_and_column() {
    let mapper = MapperBuilder::new().build().unwrap();

    let loc = mapper.map(0x24040);

    assert_eq!(
        loc,
        Location {
            channel: 0,
            rank: 0,
            bank_group: 0,
            bank: 1,
            row: 1,
            column: 1,
        }
    );
}

#[test]
fn default_mapper_field_positions() {
    let mapper = MapperBuilder::new().build().unwrap();

    // 64-byte access unit, 2048 / 8 column slots, 8 banks.
    assert_eq!(mapper.field_position(LocationItem::Column), 6);
    assert_eq!(mapper.field_position(LocationItem::Bank), 14);
    assert_eq!(mapper.field_position(LocationItem::Row), 17);
}

#[test]
fn byte_offset_within_access_unit_is_ignored() {
    let mapper = MapperBuilder::new().build().unwrap();
    assert_eq!(mapper.map(0x24040), mapper.map(0x2407f));
    assert_ne!(mapper.map(0x24040), mapper.map(0x24080));
}

#[test]
fn bits_above_row_are_ignored() {
    let mapper = MapperBuilder::new().build().unwrap();
    let high = 1_u64 << 40;
    assert_eq!(mapper.map(0x24040), mapper.map(0x24040 | high));
}

// ══════════════════════════════════════════════════════════
// 2. Custom layouts
// ══════════════════════════════════════════════════════════

#[test]
fn multi_rank_multi_group_layout() {
    let mapper = MapperBuilder::new()
        .with_num_channel(2)
        .with_num_rank(2)
        .with_num_bank_group(4)
        .with_num_bank(4)
        .with_num_col(1024)
        .build()
        .unwrap();

    // column 6..13, bank group 13..15, bank 15..17, rank 17, channel 18, row 19..
    let address = (3 << 19) | (1 << 18) | (1 << 17) | (2 << 15) | (3 << 13) | (5 << 6);
    assert_eq!(
        mapper.map(address),
        Location {
            channel: 1,
            rank: 1,
            bank_group: 3,
            bank: 2,
            row: 3,
            column: 5,
        }
    );
}

#[test]
fn row_in_lowest_bits() {
    let order = vec![
        LocationItem::Channel,
        LocationItem::Rank,
        LocationItem::BankGroup,
        LocationItem::Bank,
        LocationItem::Column,
        LocationItem::Row,
    ];
    let mapper = MapperBuilder::new()
        .with_num_row(1024)
        .with_bit_order_high_to_low(order)
        .build()
        .unwrap();

    assert_eq!(mapper.field_position(LocationItem::Row), 6);
    assert_eq!(mapper.field_position(LocationItem::Column), 16);
    assert_eq!(mapper.field_position(LocationItem::Bank), 24);

    let loc = mapper.map((7 << 24) | (9 << 16) | (0x3ff << 6));
    assert_eq!((loc.bank, loc.column, loc.row), (7, 9, 0x3ff));
}

#[test]
fn narrow_bus_shrinks_access_unit() {
    let builder = MapperBuilder::new().with_bus_width(32).with_burst_length(4);
    assert_eq!(builder.access_unit_bits().unwrap(), 4);
    assert_eq!(builder.build().unwrap().field_position(LocationItem::Column), 4);
}

// ══════════════════════════════════════════════════════════
// 3. Rejected geometries
// ══════════════════════════════════════════════════════════

#[rstest]
#[case::banks(MapperBuilder::new().with_num_bank(6), "bank count", 6)]
#[case::rows(MapperBuilder::new().with_num_row(1000), "row count", 1000)]
#[case::columns(MapperBuilder::new().with_num_col(1536), "column count", 1536)]
#[case::ranks(MapperBuilder::new().with_num_rank(3), "rank count", 3)]
#[case::channels(MapperBuilder::new().with_num_channel(0), "channel count", 0)]
fn non_power_of_two_counts_are_rejected(
    #[case] builder: MapperBuilder,
    #[case] expected_field: &str,
    #[case] expected_value: u64,
) {
    match builder.build() {
        Err(ConfigError::NotPowerOfTwo { field, value }) => {
            assert_eq!(field, expected_field);
            assert_eq!(value, expected_value);
        }
        other => panic!("expected NotPowerOfTwo, got {other:?}"),
    }
}

#[test]
fn zero_burst_length_is_rejected() {
    let err = MapperBuilder::new().with_burst_length(0).build().unwrap_err();
    assert!(matches!(err, ConfigError::BurstLengthZero));
}

#[test]
fn row_shorter_than_burst_is_rejected() {
    let err = MapperBuilder::new().with_num_col(4).build().unwrap_err();
    assert!(matches!(
        err,
        ConfigError::ColumnsShorterThanBurst {
            num_col: 4,
            burst_length: 8
        }
    ));
}

#[test]
fn duplicate_field_in_bit_order_is_rejected() {
    let order = vec![
        LocationItem::Row,
        LocationItem::Row,
        LocationItem::Rank,
        LocationItem::Bank,
        LocationItem::BankGroup,
        LocationItem::Column,
    ];
    let err = MapperBuilder::new()
        .with_bit_order_high_to_low(order)
        .build()
        .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidBitOrder));
}

#[test]
fn missing_field_in_bit_order_is_rejected() {
    let err = MapperBuilder::new()
        .with_bit_order_high_to_low(vec![LocationItem::Row, LocationItem::Column])
        .build()
        .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidBitOrder));
}

proptest! {
    #[test]
    fn every_field_stays_within_its_count(address in any::<u64>()) {
        let mapper = MapperBuilder::new()
            .with_num_rank(2)
            .with_num_bank_group(4)
            .with_num_bank(4)
            .build()
            .unwrap();
        let loc = mapper.map(address);
        prop_assert_eq!(loc.channel, 0);
        prop_assert!(loc.rank < 2);
        prop_assert!(loc.bank_group < 4);
        prop_assert!(loc.bank < 4);
        prop_assert!(loc.row < 65536);
        prop_assert!(loc.column < 2048 / 8);
    }
}
