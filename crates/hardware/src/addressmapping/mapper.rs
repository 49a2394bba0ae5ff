//! Location type and the default bit-slicing mapper.

use serde::Deserialize;
use std::fmt;

/// Coordinates of one access unit inside the DRAM organisation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Location {
    /// Channel index.
    pub channel: u64,
    /// Rank index within the channel.
    pub rank: u64,
    /// Bank-group index within the rank.
    pub bank_group: u64,
    /// Bank index within the bank group.
    pub bank: u64,
    /// Row index within the bank.
    pub row: u64,
    /// Column index (in access-unit granularity) within the row.
    pub column: u64,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ch{} rk{} bg{} bk{} row{:#x} col{:#x}",
            self.channel, self.rank, self.bank_group, self.bank, self.row, self.column
        )
    }
}

/// One field of a [`Location`], used to describe the address bit order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationItem {
    /// Channel bits.
    Channel,
    /// Rank bits.
    Rank,
    /// Bank-group bits.
    BankGroup,
    /// Bank bits.
    Bank,
    /// Row bits.
    Row,
    /// Column bits.
    Column,
}

impl LocationItem {
    /// Every field, in the default high-to-low address order.
    pub const DEFAULT_ORDER_HIGH_TO_LOW: [Self; 6] = [
        Self::Row,
        Self::Channel,
        Self::Rank,
        Self::Bank,
        Self::BankGroup,
        Self::Column,
    ];
}

/// Converts an internal physical address into a DRAM location.
///
/// Mapping is total: every 64-bit address yields a location. Bits above the
/// highest field are ignored.
pub trait AddressMapper: Send + Sync {
    /// Returns the location that holds `address`.
    fn map(&self, address: u64) -> Location;
}

/// Position and width of one address field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct BitField {
    pub(crate) pos: u32,
    pub(crate) mask: u64,
}

impl BitField {
    pub(crate) const fn new(pos: u32, bits: u32) -> Self {
        let mask = if bits >= 64 { u64::MAX } else { (1_u64 << bits) - 1 };
        Self { pos, mask }
    }

    #[inline]
    const fn extract(self, address: u64) -> u64 {
        match address.checked_shr(self.pos) {
            Some(shifted) => shifted & self.mask,
            None => 0,
        }
    }
}

/// Mapper that slices the address into fixed bit fields.
///
/// The lowest `log2(access unit)` bits select a byte within an access unit and
/// are dropped; the remaining fields follow the configured high-to-low order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DefaultMapper {
    pub(crate) channel: BitField,
    pub(crate) rank: BitField,
    pub(crate) bank_group: BitField,
    pub(crate) bank: BitField,
    pub(crate) row: BitField,
    pub(crate) column: BitField,
}

impl DefaultMapper {
    /// Returns the bit position where `item` starts.
    pub const fn field_position(&self, item: LocationItem) -> u32 {
        match item {
            LocationItem::Channel => self.channel.pos,
            LocationItem::Rank => self.rank.pos,
            LocationItem::BankGroup => self.bank_group.pos,
            LocationItem::Bank => self.bank.pos,
            LocationItem::Row => self.row.pos,
            LocationItem::Column => self.column.pos,
        }
    }
}

impl AddressMapper for DefaultMapper {
    #[inline]
    fn map(&self, address: u64) -> Location {
        Location {
            channel: self.channel.extract(address),
            rank: self.rank.extract(address),
            bank_group: self.bank_group.extract(address),
            bank: self.bank.extract(address),
            row: self.row.extract(address),
            column: self.column.extract(address),
        }
    }
}
