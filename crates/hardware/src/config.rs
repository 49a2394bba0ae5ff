//! Configuration system for the DRAM controller.
//!
//! This module defines the configuration structures used to parameterize a memory
//! controller. It provides:
//! 1. **Defaults:** Baseline DDR3-1600 datasheet constants.
//! 2. **Structures:** Grouped config for protocol, queues, organisation, timing and
//!    address conversion.
//! 3. **Enums:** The DRAM protocol family.
//!
//! Configuration is supplied via JSON (`DramConfig::from_json_file`) or built with
//! `DramConfig::default()`. It is immutable input to the controller builder.

use std::fmt;
use std::path::Path;

use serde::Deserialize;

use crate::addressmapping::LocationItem;
use crate::common::ConfigError;

/// Default configuration constants.
///
/// These values describe a DDR3-1600 part with x16 devices on a 64-bit bus.
mod defaults {
    /// Sub-transactions buffered before command creation.
    pub const TRANSACTION_QUEUE_SIZE: usize = 32;

    /// Commands held by each per-rank command queue.
    pub const COMMAND_QUEUE_SIZE: usize = 8;

    /// Data bus width in bits.
    pub const BUS_WIDTH: u64 = 64;

    /// Bus-width transfers per access.
    pub const BURST_LENGTH: u64 = 8;

    /// Bits delivered by one device per transfer.
    pub const DEVICE_WIDTH: u64 = 16;

    /// Channels per controller.
    pub const NUM_CHANNEL: u64 = 1;

    /// Ranks per channel.
    pub const NUM_RANK: u64 = 2;

    /// Bank groups per rank.
    pub const NUM_BANK_GROUP: u64 = 1;

    /// Banks per bank group.
    pub const NUM_BANK: u64 = 8;

    /// Rows per bank.
    pub const NUM_ROW: u64 = 32768;

    /// Columns per row.
    pub const NUM_COL: u64 = 1024;

    pub const T_AL: u64 = 0;
    pub const T_CL: u64 = 11;
    pub const T_CWL: u64 = 8;
    pub const T_RCD: u64 = 11;
    pub const T_RP: u64 = 11;
    pub const T_RAS: u64 = 28;
    pub const T_CCD_L: u64 = 4;
    pub const T_CCD_S: u64 = 4;
    pub const T_RTRS: u64 = 1;
    pub const T_RTP: u64 = 6;
    pub const T_WTR_L: u64 = 6;
    pub const T_WTR_S: u64 = 6;
    pub const T_WR: u64 = 12;
    pub const T_PPD: u64 = 0;
    pub const T_RRD_L: u64 = 5;
    pub const T_RRD_S: u64 = 5;
    pub const T_RCDRD: u64 = 24;
    pub const T_RCDWR: u64 = 20;
    pub const T_REFI: u64 = 6240;
    pub const T_RFC: u64 = 208;
    pub const T_RFCB: u64 = 1950;
    pub const T_CKESR: u64 = 5;
    pub const T_XS: u64 = 216;
}

/// DRAM protocol family.
///
/// The protocol decides how many bus cycles one burst occupies and whether activate to
/// column-access latencies come from the GDDR-style `tRCDRD`/`tRCDWR` parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Protocol {
    /// DDR3 SDRAM.
    #[default]
    Ddr3,
    /// DDR4 SDRAM.
    Ddr4,
    /// GDDR5 graphics DRAM.
    Gddr5,
    /// GDDR5X graphics DRAM.
    Gddr5x,
    /// GDDR6 graphics DRAM.
    Gddr6,
    /// Low-power DDR.
    Lpddr,
    /// Low-power DDR3.
    Lpddr3,
    /// Low-power DDR4.
    Lpddr4,
    /// High Bandwidth Memory.
    Hbm,
    /// High Bandwidth Memory 2.
    Hbm2,
    /// Hybrid Memory Cube.
    Hmc,
}

impl Protocol {
    /// Every protocol.
    pub const ALL: [Self; 11] = [
        Self::Ddr3,
        Self::Ddr4,
        Self::Gddr5,
        Self::Gddr5x,
        Self::Gddr6,
        Self::Lpddr,
        Self::Lpddr3,
        Self::Lpddr4,
        Self::Hbm,
        Self::Hbm2,
        Self::Hmc,
    ];

    /// Returns `true` for GDDR5, GDDR5X and GDDR6.
    pub const fn is_gddr(self) -> bool {
        matches!(self, Self::Gddr5 | Self::Gddr5x | Self::Gddr6)
    }

    /// Returns `true` for HBM and HBM2.
    pub const fn is_hbm(self) -> bool {
        matches!(self, Self::Hbm | Self::Hbm2)
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ddr3 => "DDR3",
            Self::Ddr4 => "DDR4",
            Self::Gddr5 => "GDDR5",
            Self::Gddr5x => "GDDR5X",
            Self::Gddr6 => "GDDR6",
            Self::Lpddr => "LPDDR",
            Self::Lpddr3 => "LPDDR3",
            Self::Lpddr4 => "LPDDR4",
            Self::Hbm => "HBM",
            Self::Hbm2 => "HBM2",
            Self::Hmc => "HMC",
        };
        f.pad(name)
    }
}

/// Root configuration of one memory controller.
///
/// # Examples
///
/// ```
/// use dramsim_core::config::{DramConfig, Protocol};
///
/// let json = r#"{
///     "protocol": "GDDR5",
///     "organization": { "num_rank": 1, "num_bank_group": 4 },
///     "timing": { "t_cl": 12 }
/// }"#;
/// let config = DramConfig::from_json(json).unwrap();
/// assert_eq!(config.protocol, Protocol::Gddr5);
/// assert_eq!(config.organization.num_bank_group, 4);
/// assert_eq!(config.organization.num_bank, 8);
/// assert_eq!(config.timing.t_cl, 12);
/// assert_eq!(config.timing.t_rcd, 11);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DramConfig {
    /// Protocol family.
    #[serde(default)]
    pub protocol: Protocol,
    /// Queue capacities.
    #[serde(default)]
    pub queues: QueueConfig,
    /// Bus and array geometry.
    #[serde(default)]
    pub organization: OrganizationConfig,
    /// Timing parameters, in memory-clock cycles.
    #[serde(default)]
    pub timing: TimingConfig,
    /// Interleaving rule for multi-controller systems.
    #[serde(default)]
    pub address_conversion: Option<AddressConversionConfig>,
}

impl DramConfig {
    /// Parses a configuration from JSON text. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] if the text is not a valid configuration.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Reads and parses a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read and [`ConfigError::Json`] if
    /// it is not a valid configuration.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

/// Queue capacities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QueueConfig {
    /// Sub-transactions the transaction queue can hold.
    #[serde(default = "QueueConfig::default_transaction_queue_size")]
    pub transaction_queue_size: usize,
    /// Commands each per-rank command queue can hold.
    #[serde(default = "QueueConfig::default_command_queue_size")]
    pub command_queue_size: usize,
}

impl QueueConfig {
    const fn default_transaction_queue_size() -> usize {
        defaults::TRANSACTION_QUEUE_SIZE
    }

    const fn default_command_queue_size() -> usize {
        defaults::COMMAND_QUEUE_SIZE
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            transaction_queue_size: defaults::TRANSACTION_QUEUE_SIZE,
            command_queue_size: defaults::COMMAND_QUEUE_SIZE,
        }
    }
}

/// Bus and array geometry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OrganizationConfig {
    /// Data bus width in bits.
    pub bus_width: u64,
    /// Bus-width transfers per access.
    pub burst_length: u64,
    /// Bits delivered by one device per transfer.
    pub device_width: u64,
    /// Channels per controller.
    pub num_channel: u64,
    /// Ranks per channel.
    pub num_rank: u64,
    /// Bank groups per rank.
    pub num_bank_group: u64,
    /// Banks per bank group.
    pub num_bank: u64,
    /// Rows per bank.
    pub num_row: u64,
    /// Columns per row.
    pub num_col: u64,
    /// Address field order, most significant first.
    pub bit_order: Vec<LocationItem>,
}

impl Default for OrganizationConfig {
    fn default() -> Self {
        Self {
            bus_width: defaults::BUS_WIDTH,
            burst_length: defaults::BURST_LENGTH,
            device_width: defaults::DEVICE_WIDTH,
            num_channel: defaults::NUM_CHANNEL,
            num_rank: defaults::NUM_RANK,
            num_bank_group: defaults::NUM_BANK_GROUP,
            num_bank: defaults::NUM_BANK,
            num_row: defaults::NUM_ROW,
            num_col: defaults::NUM_COL,
            bit_order: LocationItem::DEFAULT_ORDER_HIGH_TO_LOW.to_vec(),
        }
    }
}

/// Primitive timing parameters, in memory-clock cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimingConfig {
    /// Additive latency.
    pub t_al: u64,
    /// Column access strobe (read) latency.
    pub t_cl: u64,
    /// Column write latency.
    pub t_cwl: u64,
    /// Activate to column access.
    pub t_rcd: u64,
    /// Precharge period.
    pub t_rp: u64,
    /// Activate to precharge.
    pub t_ras: u64,
    /// Column to column, same bank group.
    pub t_ccd_l: u64,
    /// Column to column, different bank group.
    pub t_ccd_s: u64,
    /// Rank to rank switch.
    pub t_rtrs: u64,
    /// Read to precharge.
    pub t_rtp: u64,
    /// Write to read, same bank group.
    pub t_wtr_l: u64,
    /// Write to read, different bank group.
    pub t_wtr_s: u64,
    /// Write recovery.
    pub t_wr: u64,
    /// Precharge to precharge.
    pub t_ppd: u64,
    /// Activate to activate, same bank group.
    pub t_rrd_l: u64,
    /// Activate to activate, different bank group.
    pub t_rrd_s: u64,
    /// Activate to read (GDDR/HBM).
    pub t_rcdrd: u64,
    /// Activate to write (GDDR/HBM).
    pub t_rcdwr: u64,
    /// Refresh interval.
    pub t_refi: u64,
    /// All-bank refresh cycle.
    pub t_rfc: u64,
    /// Per-bank refresh cycle.
    pub t_rfcb: u64,
    /// Minimum self-refresh residency.
    pub t_ckesr: u64,
    /// Self-refresh exit to next valid command.
    pub t_xs: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            t_al: defaults::T_AL,
            t_cl: defaults::T_CL,
            t_cwl: defaults::T_CWL,
            t_rcd: defaults::T_RCD,
            t_rp: defaults::T_RP,
            t_ras: defaults::T_RAS,
            t_ccd_l: defaults::T_CCD_L,
            t_ccd_s: defaults::T_CCD_S,
            t_rtrs: defaults::T_RTRS,
            t_rtp: defaults::T_RTP,
            t_wtr_l: defaults::T_WTR_L,
            t_wtr_s: defaults::T_WTR_S,
            t_wr: defaults::T_WR,
            t_ppd: defaults::T_PPD,
            t_rrd_l: defaults::T_RRD_L,
            t_rrd_s: defaults::T_RRD_S,
            t_rcdrd: defaults::T_RCDRD,
            t_rcdwr: defaults::T_RCDWR,
            t_refi: defaults::T_REFI,
            t_rfc: defaults::T_RFC,
            t_rfcb: defaults::T_RFCB,
            t_ckesr: defaults::T_CKESR,
            t_xs: defaults::T_XS,
        }
    }
}

/// Interleaving of the global address space across several controllers.
///
/// For eight controllers interleaved at page granularity over a GPU whose memory spans
/// 8 GiB to 12 GiB, the third controller uses `interleaving_size = 4096`,
/// `total_num_of_elements = 8`, `current_element_index = 2`, `lower_bound = 8 GiB`
/// and `upper_bound = 12 GiB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddressConversionConfig {
    /// Interleaving granularity in bytes.
    pub interleaving_size: u64,
    /// Number of controllers sharing the range.
    pub total_num_of_elements: u64,
    /// Index of this controller.
    pub current_element_index: u64,
    /// Lowest global address of the range.
    pub lower_bound: u64,
    /// One past the highest global address of the range.
    pub upper_bound: u64,
}
