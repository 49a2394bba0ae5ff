//! Mapper construction from DRAM geometry.
//!
//! The builder accumulates the organisation parameters, validates that every count is a
//! power of two, and lays the fields out from the lowest address bit upwards in the reverse
//! of the configured high-to-low order.

use super::mapper::{BitField, DefaultMapper, LocationItem};
use crate::common::bits::log2_of;
use crate::common::error::ConfigError;

/// Builds [`DefaultMapper`]s.
///
/// Defaults: 64-bit bus, burst length 8, one channel, one rank, one bank group,
/// eight banks, 65536 rows, 2048 columns, order row-channel-rank-bank-bankgroup-column.
#[derive(Clone, Debug)]
pub struct MapperBuilder {
    bus_width: u64,
    burst_length: u64,
    num_channel: u64,
    num_rank: u64,
    num_bank_group: u64,
    num_bank: u64,
    num_row: u64,
    num_col: u64,
    bit_order_high_to_low: Vec<LocationItem>,
}

impl Default for MapperBuilder {
    fn default() -> Self {
        Self {
            bus_width: 64,
            burst_length: 8,
            num_channel: 1,
            num_rank: 1,
            num_bank_group: 1,
            num_bank: 8,
            num_row: 65536,
            num_col: 2048,
            bit_order_high_to_low: LocationItem::DEFAULT_ORDER_HIGH_TO_LOW.to_vec(),
        }
    }
}

impl MapperBuilder {
    /// Creates a builder with the default geometry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of bits transferred out of the banks at the same time.
    #[must_use]
    pub const fn with_bus_width(mut self, n: u64) -> Self {
        self.bus_width = n;
        self
    }

    /// Sets the number of bus-width transfers grouped into one access.
    #[must_use]
    pub const fn with_burst_length(mut self, n: u64) -> Self {
        self.burst_length = n;
        self
    }

    /// Sets the number of channels.
    #[must_use]
    pub const fn with_num_channel(mut self, n: u64) -> Self {
        self.num_channel = n;
        self
    }

    /// Sets the number of ranks per channel.
    #[must_use]
    pub const fn with_num_rank(mut self, n: u64) -> Self {
        self.num_rank = n;
        self
    }

    /// Sets the number of bank groups per rank.
    #[must_use]
    pub const fn with_num_bank_group(mut self, n: u64) -> Self {
        self.num_bank_group = n;
        self
    }

    /// Sets the number of banks per bank group.
    #[must_use]
    pub const fn with_num_bank(mut self, n: u64) -> Self {
        self.num_bank = n;
        self
    }

    /// Sets the number of rows per bank.
    #[must_use]
    pub const fn with_num_row(mut self, n: u64) -> Self {
        self.num_row = n;
        self
    }

    /// Sets the number of columns per row.
    #[must_use]
    pub const fn with_num_col(mut self, n: u64) -> Self {
        self.num_col = n;
        self
    }

    /// Sets the order of the address fields, most significant first.
    #[must_use]
    pub fn with_bit_order_high_to_low(mut self, order: Vec<LocationItem>) -> Self {
        self.bit_order_high_to_low = order;
        self
    }

    /// Returns `log2` of the access-unit size in bytes (`bus_width / 8 * burst_length`).
    ///
    /// # Errors
    ///
    /// Returns an error if the burst length is zero, the bus width is not a whole
    /// number of bytes, or the access unit is not a power of two.
    pub fn access_unit_bits(&self) -> Result<u32, ConfigError> {
        if self.burst_length == 0 {
            return Err(ConfigError::BurstLengthZero);
        }
        if self.bus_width == 0 || self.bus_width % 8 != 0 {
            return Err(ConfigError::InvalidBusWidth {
                bus_width: self.bus_width,
                device_width: 8,
            });
        }
        log2_of("access unit size", self.bus_width / 8 * self.burst_length)
    }

    /// Validates the geometry and builds the mapper.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if any count is not a power of two, if a row is shorter
    /// than one burst, or if the bit order does not name every field exactly once.
    pub fn build(&self) -> Result<DefaultMapper, ConfigError> {
        let access_unit_bit = self.access_unit_bits()?;
        let col_lo_bit = log2_of("burst length", self.burst_length)?;
        let col_bit = log2_of("column count", self.num_col)?;
        if col_bit < col_lo_bit {
            return Err(ConfigError::ColumnsShorterThanBurst {
                num_col: self.num_col,
                burst_length: self.burst_length,
            });
        }
        let col_hi_bit = col_bit - col_lo_bit;
        let channel_bit = log2_of("channel count", self.num_channel)?;
        let rank_bit = log2_of("rank count", self.num_rank)?;
        let bank_group_bit = log2_of("bank group count", self.num_bank_group)?;
        let bank_bit = log2_of("bank count", self.num_bank)?;
        let row_bit = log2_of("row count", self.num_row)?;

        self.validate_bit_order()?;

        let mut mapper = DefaultMapper::default();
        let mut pos = access_unit_bit;
        for item in self.bit_order_high_to_low.iter().rev() {
            let bits = match item {
                LocationItem::Channel => channel_bit,
                LocationItem::Rank => rank_bit,
                LocationItem::BankGroup => bank_group_bit,
                LocationItem::Bank => bank_bit,
                LocationItem::Row => row_bit,
                LocationItem::Column => col_hi_bit,
            };
            let field = BitField::new(pos, bits);
            match item {
                LocationItem::Channel => mapper.channel = field,
                LocationItem::Rank => mapper.rank = field,
                LocationItem::BankGroup => mapper.bank_group = field,
                LocationItem::Bank => mapper.bank = field,
                LocationItem::Row => mapper.row = field,
                LocationItem::Column => mapper.column = field,
            }
            pos += bits;
        }

        Ok(mapper)
    }

    fn validate_bit_order(&self) -> Result<(), ConfigError> {
        let order = &self.bit_order_high_to_low;
        let complete = order.len() == LocationItem::DEFAULT_ORDER_HIGH_TO_LOW.len()
            && LocationItem::DEFAULT_ORDER_HIGH_TO_LOW
                .iter()
                .all(|item| order.iter().filter(|o| *o == item).count() == 1);
        if complete {
            Ok(())
        } else {
            Err(ConfigError::InvalidBitOrder)
        }
    }
}
