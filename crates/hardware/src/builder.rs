//! Memory controller construction.
//!
//! This module turns a [`DramConfig`] into a wired [`MemController`]. It provides:
//! 1. **Fluent Setters:** One `with_*` method per configuration parameter.
//! 2. **Derived Latencies:** Burst cycles, read/write delays and `tRC` from the primitive
//!    timing parameters.
//! 3. **Timing Tables:** The four scoped tables of minimum gaps between command kinds.
//! 4. **Wiring:** Address mapper, splitter, queues, channel, banks and storage.
//!
//! Gaps that would come out negative for unusual parameter sets clamp to zero.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::addressmapping::{AddressConverter, InterleavingConverter, LocationItem, MapperBuilder};
use crate::cmdq::CommandQueueImpl;
use crate::common::{ConfigError, IdGenerator, StorageError};
use crate::config::{AddressConversionConfig, DramConfig, Protocol};
use crate::controller::{ControllerParts, MemController};
use crate::org::{Bank, BankImpl, Banks, ChannelImpl, TimeTable, TimeTableEntry, Timing};
use crate::port::{BufferedPort, Port};
use crate::signal::CommandKind;
use crate::storage::Storage;
use crate::trans::{ClosePageCommandCreator, FcfsSubTransactionQueue, UnitSplitter};

/// Latencies derived from the primitive timing parameters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DerivedTiming {
    /// Bus cycles occupied by one burst.
    pub burst_cycle: u64,
    /// Read latency, `tAL + tCL`.
    pub t_rl: u64,
    /// Write latency, `tAL + tCWL`.
    pub t_wl: u64,
    /// Cycles from a read command to the end of its data burst.
    pub read_delay: u64,
    /// Cycles from a write command to the end of its data burst.
    pub write_delay: u64,
    /// Row cycle, `tRAS + tRP`.
    pub t_rc: u64,
}

impl fmt::Display for DerivedTiming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "burst_cycle              {}", self.burst_cycle)?;
        writeln!(f, "t_rl                     {}", self.t_rl)?;
        writeln!(f, "t_wl                     {}", self.t_wl)?;
        writeln!(f, "read_delay               {}", self.read_delay)?;
        writeln!(f, "write_delay              {}", self.write_delay)?;
        write!(f, "t_rc                     {}", self.t_rc)
    }
}

/// Builds memory controllers.
///
/// # Examples
///
/// ```
/// use dramsim_core::builder::MemControllerBuilder;
/// use dramsim_core::config::Protocol;
///
/// let ctrl = MemControllerBuilder::new()
///     .with_protocol(Protocol::Ddr4)
///     .with_num_bank_group(4)
///     .with_num_bank(4)
///     .build("MemCtrl")
///     .unwrap();
/// assert_eq!(ctrl.name(), "MemCtrl");
/// ```
#[derive(Clone, Debug, Default)]
pub struct MemControllerBuilder {
    config: DramConfig,
    global_storage: Option<Arc<Storage>>,
}

impl MemControllerBuilder {
    /// Creates a builder with the DDR3-1600 defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder from a parsed configuration.
    pub fn from_config(config: DramConfig) -> Self {
        Self {
            config,
            global_storage: None,
        }
    }

    /// The configuration accumulated so far.
    pub const fn config(&self) -> &DramConfig {
        &self.config
    }

    /// Shares `storage` with other controllers instead of allocating a private one.
    ///
    /// Storage addresses are then global physical addresses.
    #[must_use]
    pub fn with_global_storage(mut self, storage: Arc<Storage>) -> Self {
        self.global_storage = Some(storage);
        self
    }

    /// Sets the rule that converts global physical addresses to internal addresses.
    ///
    /// For eight controllers interleaved at page granularity over a GPU whose memory spans
    /// 8 GiB to 12 GiB, the third controller calls
    /// `with_interleaving_addr_conversion(4096, 8, 2, 8 << 30, 12 << 30)`.
    ///
    /// Without this call the internal address equals the global address.
    #[must_use]
    pub const fn with_interleaving_addr_conversion(
        mut self,
        interleave_granularity: u64,
        num_total_unit: u64,
        current_unit_index: u64,
        lower_bound: u64,
        upper_bound: u64,
    ) -> Self {
        self.config.address_conversion = Some(AddressConversionConfig {
            interleaving_size: interleave_granularity,
            total_num_of_elements: num_total_unit,
            current_element_index: current_unit_index,
            lower_bound,
            upper_bound,
        });
        self
    }

    /// Sets the protocol family.
    #[must_use]
    pub const fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.config.protocol = protocol;
        self
    }

    /// Sets how many sub-transactions can wait for command creation. A request that
    /// touches several access units (`bus_width / 8 * burst_length` bytes) needs one
    /// slot per unit.
    #[must_use]
    pub const fn with_transaction_queue_size(mut self, n: usize) -> Self {
        self.config.queues.transaction_queue_size = n;
        self
    }

    /// Sets how many commands each per-rank command queue holds.
    #[must_use]
    pub const fn with_command_queue_size(mut self, n: usize) -> Self {
        self.config.queues.command_queue_size = n;
        self
    }

    /// Sets the number of bits transferred out of the banks at the same time.
    #[must_use]
    pub const fn with_bus_width(mut self, n: u64) -> Self {
        self.config.organization.bus_width = n;
        self
    }

    /// Sets the number of bus-width transfers grouped into one access.
    #[must_use]
    pub const fn with_burst_length(mut self, n: u64) -> Self {
        self.config.organization.burst_length = n;
        self
    }

    /// Sets the number of bits one device delivers per transfer.
    #[must_use]
    pub const fn with_device_width(mut self, n: u64) -> Self {
        self.config.organization.device_width = n;
        self
    }

    /// Sets the number of channels.
    #[must_use]
    pub const fn with_num_channel(mut self, n: u64) -> Self {
        self.config.organization.num_channel = n;
        self
    }

    /// Sets the number of ranks per channel.
    ///
    /// For a controller capacity `C`, `N_ch` channels, `N_row` rows, `N_col` columns, bus
    /// width `W_b` and device width `W_d`, a bank holds `N_col * N_row * W_d / 8` bytes, a
    /// rank holds that times the bank count times `W_b / W_d`, and the rank count is
    /// `C / N_ch / rank size`.
    #[must_use]
    pub const fn with_num_rank(mut self, n: u64) -> Self {
        self.config.organization.num_rank = n;
        self
    }

    /// Sets the number of bank groups per rank.
    #[must_use]
    pub const fn with_num_bank_group(mut self, n: u64) -> Self {
        self.config.organization.num_bank_group = n;
        self
    }

    /// Sets the number of banks per bank group.
    #[must_use]
    pub const fn with_num_bank(mut self, n: u64) -> Self {
        self.config.organization.num_bank = n;
        self
    }

    /// Sets the number of rows per bank.
    #[must_use]
    pub const fn with_num_row(mut self, n: u64) -> Self {
        self.config.organization.num_row = n;
        self
    }

    /// Sets the number of columns per row.
    #[must_use]
    pub const fn with_num_col(mut self, n: u64) -> Self {
        self.config.organization.num_col = n;
        self
    }

    /// Sets the order of the address fields, most significant first.
    #[must_use]
    pub fn with_bit_order_high_to_low(mut self, order: Vec<LocationItem>) -> Self {
        self.config.organization.bit_order = order;
        self
    }

    /// Sets the additive latency.
    #[must_use]
    pub const fn with_t_al(mut self, cycles: u64) -> Self {
        self.config.timing.t_al = cycles;
        self
    }

    /// Sets the column access strobe latency.
    #[must_use]
    pub const fn with_t_cl(mut self, cycles: u64) -> Self {
        self.config.timing.t_cl = cycles;
        self
    }

    /// Sets the column write latency.
    #[must_use]
    pub const fn with_t_cwl(mut self, cycles: u64) -> Self {
        self.config.timing.t_cwl = cycles;
        self
    }

    /// Sets the row to column delay.
    #[must_use]
    pub const fn with_t_rcd(mut self, cycles: u64) -> Self {
        self.config.timing.t_rcd = cycles;
        self
    }

    /// Sets the row precharge latency.
    #[must_use]
    pub const fn with_t_rp(mut self, cycles: u64) -> Self {
        self.config.timing.t_rp = cycles;
        self
    }

    /// Sets the row access strobe latency.
    #[must_use]
    pub const fn with_t_ras(mut self, cycles: u64) -> Self {
        self.config.timing.t_ras = cycles;
        self
    }

    /// Sets the column to column delay between banks of the same bank group.
    #[must_use]
    pub const fn with_t_ccd_l(mut self, cycles: u64) -> Self {
        self.config.timing.t_ccd_l = cycles;
        self
    }

    /// Sets the column to column delay between banks of different bank groups.
    #[must_use]
    pub const fn with_t_ccd_s(mut self, cycles: u64) -> Self {
        self.config.timing.t_ccd_s = cycles;
        self
    }

    /// Sets the rank to rank switching latency.
    #[must_use]
    pub const fn with_t_rtrs(mut self, cycles: u64) -> Self {
        self.config.timing.t_rtrs = cycles;
        self
    }

    /// Sets the read to precharge latency.
    #[must_use]
    pub const fn with_t_rtp(mut self, cycles: u64) -> Self {
        self.config.timing.t_rtp = cycles;
        self
    }

    /// Sets the write to read latency within a bank group.
    #[must_use]
    pub const fn with_t_wtr_l(mut self, cycles: u64) -> Self {
        self.config.timing.t_wtr_l = cycles;
        self
    }

    /// Sets the write to read latency across bank groups.
    #[must_use]
    pub const fn with_t_wtr_s(mut self, cycles: u64) -> Self {
        self.config.timing.t_wtr_s = cycles;
        self
    }

    /// Sets the write recovery time.
    #[must_use]
    pub const fn with_t_wr(mut self, cycles: u64) -> Self {
        self.config.timing.t_wr = cycles;
        self
    }

    /// Sets the precharge to precharge delay.
    #[must_use]
    pub const fn with_t_ppd(mut self, cycles: u64) -> Self {
        self.config.timing.t_ppd = cycles;
        self
    }

    /// Sets the activate to activate latency within a bank group.
    #[must_use]
    pub const fn with_t_rrd_l(mut self, cycles: u64) -> Self {
        self.config.timing.t_rrd_l = cycles;
        self
    }

    /// Sets the activate to activate latency across bank groups.
    #[must_use]
    pub const fn with_t_rrd_s(mut self, cycles: u64) -> Self {
        self.config.timing.t_rrd_s = cycles;
        self
    }

    /// Sets the activate to read latency. Only GDDR and HBM use it.
    #[must_use]
    pub const fn with_t_rcdrd(mut self, cycles: u64) -> Self {
        self.config.timing.t_rcdrd = cycles;
        self
    }

    /// Sets the activate to write latency. Only GDDR and HBM use it.
    #[must_use]
    pub const fn with_t_rcdwr(mut self, cycles: u64) -> Self {
        self.config.timing.t_rcdwr = cycles;
        self
    }

    /// Sets the refresh interval.
    #[must_use]
    pub const fn with_t_refi(mut self, cycles: u64) -> Self {
        self.config.timing.t_refi = cycles;
        self
    }

    /// Sets the all-bank refresh cycle time.
    #[must_use]
    pub const fn with_t_rfc(mut self, cycles: u64) -> Self {
        self.config.timing.t_rfc = cycles;
        self
    }

    /// Sets the per-bank refresh to activate latency.
    #[must_use]
    pub const fn with_t_rfcb(mut self, cycles: u64) -> Self {
        self.config.timing.t_rfcb = cycles;
        self
    }

    /// Sets the minimum self-refresh residency.
    #[must_use]
    pub const fn with_t_ckesr(mut self, cycles: u64) -> Self {
        self.config.timing.t_ckesr = cycles;
        self
    }

    /// Sets the self-refresh exit latency.
    #[must_use]
    pub const fn with_t_xs(mut self, cycles: u64) -> Self {
        self.config.timing.t_xs = cycles;
        self
    }

    /// Bus cycles occupied by one burst.
    ///
    /// GDDR5 moves four beats per cycle, GDDR5X eight and GDDR6 sixteen; every other
    /// protocol is double data rate.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::BurstLengthZero`] if the burst length is zero.
    pub fn burst_cycle(&self) -> Result<u64, ConfigError> {
        let bl = self.config.organization.burst_length;
        if bl == 0 {
            return Err(ConfigError::BurstLengthZero);
        }
        Ok(match self.config.protocol {
            Protocol::Gddr5 => bl / 4,
            Protocol::Gddr5x => bl / 8,
            Protocol::Gddr6 => bl / 16,
            _ => bl / 2,
        })
    }

    /// Computes the derived latencies.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::BurstLengthZero`] if the burst length is zero.
    pub fn derived_timing(&self) -> Result<DerivedTiming, ConfigError> {
        let t = &self.config.timing;
        let burst_cycle = self.burst_cycle()?;
        let t_rl = t.t_al + t.t_cl;
        let t_wl = t.t_al + t.t_cwl;
        Ok(DerivedTiming {
            burst_cycle,
            t_rl,
            t_wl,
            read_delay: t_rl + burst_cycle,
            // Measured from tRL, same as the read path.
            write_delay: t_rl + burst_cycle,
            t_rc: t.t_ras + t.t_rp,
        })
    }

    /// Execution time of each command kind, indexed by [`CommandKind::index`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::BurstLengthZero`] if the burst length is zero.
    pub fn cmd_cycles(&self) -> Result<[u64; CommandKind::COUNT], ConfigError> {
        let t = &self.config.timing;
        let d = self.derived_timing()?;
        let activate = if self.config.protocol.is_gddr() || self.config.protocol.is_hbm() {
            t.t_rcdrd.saturating_sub(t.t_al)
        } else {
            t.t_rcd.saturating_sub(t.t_al)
        };

        let mut cycles = [1; CommandKind::COUNT];
        cycles[CommandKind::Read.index()] = d.read_delay;
        cycles[CommandKind::ReadPrecharge.index()] = t.t_rp;
        cycles[CommandKind::Write.index()] = d.write_delay;
        cycles[CommandKind::WritePrecharge.index()] = t.t_rp;
        cycles[CommandKind::Activate.index()] = activate;
        cycles[CommandKind::Precharge.index()] = t.t_rp;
        Ok(cycles)
    }

    /// Builds the four scoped timing tables.
    ///
    /// With a single bank group the group-local (`_L`) constraints fall back to their
    /// cross-group (`_S`) values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::BurstLengthZero`] if the burst length is zero.
    pub fn generate_timing(&self) -> Result<Timing, ConfigError> {
        use CommandKind::{
            Activate, Precharge, Read, ReadPrecharge, Refresh, RefreshBank, SelfRefreshEnter,
            SelfRefreshExit, Write, WritePrecharge,
        };

        let t = &self.config.timing;
        let protocol = self.config.protocol;
        let d = self.derived_timing()?;
        let burst = d.burst_cycle;
        let single_group = self.config.organization.num_bank_group == 1;

        let read_to_read_l = burst.max(if single_group { t.t_ccd_s } else { t.t_ccd_l });
        let read_to_read_s = burst.max(t.t_ccd_s);
        let read_to_read_o = burst + t.t_rtrs;
        let read_to_write = (d.t_rl + burst + t.t_rtrs).saturating_sub(d.t_wl);
        let read_to_write_o = (d.read_delay + burst + t.t_rtrs).saturating_sub(d.write_delay);
        let read_to_precharge = t.t_al + t.t_rtp;
        let readp_to_act = t.t_al + burst + t.t_rtp + t.t_rp;

        let write_to_read_l = d.write_delay + if single_group { t.t_wtr_s } else { t.t_wtr_l };
        let write_to_read_s = d.write_delay + t.t_wtr_s;
        let write_to_read_o = (d.write_delay + burst + t.t_rtrs).saturating_sub(d.read_delay);
        let write_to_write_l = burst.max(if single_group { t.t_ccd_s } else { t.t_ccd_l });
        let write_to_write_s = burst.max(t.t_ccd_s);
        let write_to_write_o = burst;
        let write_to_precharge = d.t_wl + burst + t.t_wr;

        let precharge_to_activate = t.t_rp;
        let precharge_to_precharge = t.t_ppd;
        let read_to_activate = read_to_precharge + precharge_to_activate;
        let write_to_activate = write_to_precharge + precharge_to_activate;

        let activate_to_activate = d.t_rc;
        let activate_to_activate_l = if single_group { t.t_rrd_s } else { t.t_rrd_l };
        let activate_to_activate_s = t.t_rrd_s;
        let activate_to_precharge = t.t_ras;
        let (activate_to_read, activate_to_write) = if protocol.is_gddr() || protocol.is_hbm() {
            (t.t_rcdrd, t.t_rcdwr)
        } else {
            let gap = t.t_rcd.saturating_sub(t.t_al);
            (gap, gap)
        };
        // A refresh needs the row closed first, so it waits a whole row cycle.
        let activate_to_refresh = d.t_rc;

        let refresh_to_refresh = t.t_refi;
        let refresh_to_activate = t.t_rfc;
        let refresh_to_activate_bank = t.t_rfcb;

        let self_refresh_entry_to_exit = t.t_ckesr;
        let self_refresh_exit = t.t_xs;

        let e = TimeTableEntry::new;
        let column_after_read = |rr: u64, rw: u64| {
            vec![e(Read, rr), e(Write, rw), e(ReadPrecharge, rr), e(WritePrecharge, rw)]
        };
        let column_after_write = |wr: u64, ww: u64| {
            vec![e(Read, wr), e(Write, ww), e(ReadPrecharge, wr), e(WritePrecharge, ww)]
        };

        let mut same_bank = TimeTable::new();
        let mut other_banks_in_bank_group = TimeTable::new();
        let mut same_rank = TimeTable::new();
        let mut other_ranks = TimeTable::new();

        let mut read_same_bank = column_after_read(read_to_read_l, read_to_write);
        read_same_bank.push(e(Precharge, read_to_precharge));
        same_bank.set(Read, read_same_bank);
        other_banks_in_bank_group.set(Read, column_after_read(read_to_read_l, read_to_write));
        same_rank.set(Read, column_after_read(read_to_read_s, read_to_write));
        other_ranks.set(Read, column_after_read(read_to_read_o, read_to_write_o));

        let mut write_same_bank = column_after_write(write_to_read_l, write_to_write_l);
        write_same_bank.push(e(Precharge, write_to_precharge));
        same_bank.set(Write, write_same_bank);
        other_banks_in_bank_group.set(Write, column_after_write(write_to_read_l, write_to_write_l));
        same_rank.set(Write, column_after_write(write_to_read_s, write_to_write_s));
        other_ranks.set(Write, column_after_write(write_to_read_o, write_to_write_o));

        same_bank.set(
            ReadPrecharge,
            vec![
                e(Activate, readp_to_act),
                e(Refresh, read_to_activate),
                e(RefreshBank, read_to_activate),
                e(SelfRefreshEnter, read_to_activate),
            ],
        );
        other_banks_in_bank_group.set(ReadPrecharge, column_after_read(read_to_read_l, read_to_write));
        same_rank.set(ReadPrecharge, column_after_read(read_to_read_s, read_to_write));
        other_ranks.set(ReadPrecharge, column_after_read(read_to_read_o, read_to_write_o));

        same_bank.set(
            WritePrecharge,
            vec![
                e(Activate, write_to_activate),
                e(Refresh, write_to_activate),
                e(RefreshBank, write_to_activate),
                e(SelfRefreshEnter, write_to_activate),
            ],
        );
        other_banks_in_bank_group.set(WritePrecharge, column_after_write(write_to_read_l, write_to_write_l));
        same_rank.set(WritePrecharge, column_after_write(write_to_read_s, write_to_write_s));
        other_ranks.set(WritePrecharge, column_after_write(write_to_read_o, write_to_write_o));

        same_bank.set(
            Activate,
            vec![
                e(Activate, activate_to_activate),
                e(Read, activate_to_read),
                e(Write, activate_to_write),
                e(ReadPrecharge, activate_to_read),
                e(WritePrecharge, activate_to_write),
                e(Precharge, activate_to_precharge),
            ],
        );
        other_banks_in_bank_group.set(
            Activate,
            vec![e(Activate, activate_to_activate_l), e(RefreshBank, activate_to_refresh)],
        );
        same_rank.set(
            Activate,
            vec![e(Activate, activate_to_activate_s), e(RefreshBank, activate_to_refresh)],
        );

        same_bank.set(
            Precharge,
            vec![
                e(Activate, precharge_to_activate),
                e(Refresh, precharge_to_activate),
                e(RefreshBank, precharge_to_activate),
                e(SelfRefreshEnter, precharge_to_activate),
            ],
        );
        if protocol.is_gddr() || protocol == Protocol::Lpddr4 {
            other_banks_in_bank_group.set(Precharge, vec![e(Precharge, precharge_to_precharge)]);
            same_rank.set(Precharge, vec![e(Precharge, precharge_to_precharge)]);
        }

        same_bank.set(
            RefreshBank,
            vec![
                e(Activate, refresh_to_activate_bank),
                e(Refresh, refresh_to_activate_bank),
                e(RefreshBank, refresh_to_activate_bank),
                e(SelfRefreshEnter, refresh_to_activate_bank),
            ],
        );
        other_banks_in_bank_group.set(
            RefreshBank,
            vec![e(Activate, refresh_to_activate), e(RefreshBank, refresh_to_refresh)],
        );
        same_rank.set(
            RefreshBank,
            vec![e(Activate, refresh_to_activate), e(RefreshBank, refresh_to_refresh)],
        );

        // Refresh and self-refresh address a whole rank.
        same_rank.set(
            Refresh,
            vec![
                e(Activate, refresh_to_activate),
                e(Refresh, refresh_to_activate),
                e(SelfRefreshEnter, refresh_to_activate),
            ],
        );
        same_rank.set(SelfRefreshEnter, vec![e(SelfRefreshExit, self_refresh_entry_to_exit)]);
        same_rank.set(
            SelfRefreshExit,
            vec![
                e(Activate, self_refresh_exit),
                e(Refresh, self_refresh_exit),
                e(RefreshBank, self_refresh_exit),
                e(SelfRefreshEnter, self_refresh_exit),
            ],
        );

        Ok(Timing {
            same_bank,
            other_banks_in_bank_group,
            same_rank,
            other_ranks,
        })
    }

    /// Bytes of local storage the organisation addresses.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBusWidth`] if the bus is not a whole number of devices
    /// and [`StorageError::AllocationFailed`] (wrapped) if the product overflows.
    pub fn capacity(&self) -> Result<u64, ConfigError> {
        let o = &self.config.organization;
        if o.device_width == 0 || o.bus_width % o.device_width != 0 {
            return Err(ConfigError::InvalidBusWidth {
                bus_width: o.bus_width,
                device_width: o.device_width,
            });
        }
        let devices_per_rank = o.bus_width / o.device_width;
        let overflow = || ConfigError::Storage(StorageError::AllocationFailed { size: u64::MAX });

        let bank_bits = o
            .num_col
            .checked_mul(o.num_row)
            .and_then(|v| v.checked_mul(o.device_width))
            .ok_or_else(overflow)?;
        [o.num_bank, o.num_bank_group, devices_per_rank, o.num_rank, o.num_channel]
            .into_iter()
            .try_fold(bank_bits / 8, u64::checked_mul)
            .ok_or_else(overflow)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let q = &self.config.queues;
        if q.transaction_queue_size == 0 {
            return Err(ConfigError::ZeroCapacity {
                field: "transaction queue size",
            });
        }
        if q.command_queue_size == 0 {
            return Err(ConfigError::ZeroCapacity {
                field: "command queue size",
            });
        }
        if self.config.organization.burst_length == 0 {
            return Err(ConfigError::BurstLengthZero);
        }
        let _ = self.capacity()?;
        Ok(())
    }

    fn converter(&self) -> Result<Option<Box<dyn AddressConverter>>, ConfigError> {
        let Some(c) = self.config.address_conversion else {
            return Ok(None);
        };
        if !c.interleaving_size.is_power_of_two() {
            return Err(ConfigError::InvalidAddressConversion(format!(
                "interleaving size {} is not a power of two",
                c.interleaving_size
            )));
        }
        if c.current_element_index >= c.total_num_of_elements {
            return Err(ConfigError::InvalidAddressConversion(format!(
                "unit index {} is not below the unit count {}",
                c.current_element_index, c.total_num_of_elements
            )));
        }
        if c.lower_bound >= c.upper_bound {
            return Err(ConfigError::InvalidAddressConversion(format!(
                "address range {:#x}..{:#x} is empty",
                c.lower_bound, c.upper_bound
            )));
        }
        Ok(Some(Box::new(InterleavingConverter {
            interleaving_size: c.interleaving_size,
            total_num_of_elements: c.total_num_of_elements,
            current_element_index: c.current_element_index,
            offset: c.lower_bound,
        })))
    }

    fn mapper_builder(&self) -> MapperBuilder {
        let o = &self.config.organization;
        MapperBuilder::new()
            .with_bus_width(o.bus_width)
            .with_burst_length(o.burst_length)
            .with_num_channel(o.num_channel)
            .with_num_rank(o.num_rank)
            .with_num_bank_group(o.num_bank_group)
            .with_num_bank(o.num_bank)
            .with_num_row(o.num_row)
            .with_num_col(o.num_col)
            .with_bit_order_high_to_low(o.bit_order.clone())
    }

    /// Builds a controller whose top port is a [`BufferedPort`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration is invalid or the storage cannot be
    /// allocated. No controller is built in that case.
    pub fn build(&self, name: &str) -> Result<MemController<BufferedPort>, ConfigError> {
        self.build_with_port(name, BufferedPort::default())
    }

    /// Builds a controller that talks through `port`.
    ///
    /// # Errors
    ///
    /// Same as [`build`](Self::build).
    pub fn build_with_port<P: Port>(&self, name: &str, port: P) -> Result<MemController<P>, ConfigError> {
        self.validate()?;
        let o = &self.config.organization;

        let mapper_builder = self.mapper_builder();
        let mapper = mapper_builder.build()?;
        let access_unit_bits = mapper_builder.access_unit_bits()?;
        let addr_converter = self.converter()?;

        let timing = self.generate_timing()?;
        let cmd_cycles = self.cmd_cycles()?;
        let derived = self.derived_timing()?;

        let ids = IdGenerator::new();
        let banks = Banks::from_fn(o.num_rank, o.num_bank_group, o.num_bank, |r, g, b| -> Box<dyn Bank> {
            Box::new(BankImpl::new(
                format!("{name}.Bank[{r}][{g}][{b}]"),
                cmd_cycles,
                ids.clone(),
            ))
        });
        let channel = ChannelImpl::new(banks, timing);

        let cmd_queue = CommandQueueImpl::new(
            o.num_channel,
            o.num_rank,
            self.config.queues.command_queue_size,
        );
        let creator = ClosePageCommandCreator::new(Box::new(mapper), ids.clone());
        let sub_trans_queue =
            FcfsSubTransactionQueue::new(self.config.queues.transaction_queue_size, creator);
        let splitter = UnitSplitter::new(access_unit_bits, ids.clone());

        let (storage, global_storage) = match &self.global_storage {
            Some(s) => (Arc::clone(s), true),
            None => (Arc::new(Storage::new(self.capacity()?)?), false),
        };

        debug!(
            controller = name,
            protocol = %self.config.protocol,
            channels = o.num_channel,
            ranks = o.num_rank,
            bank_groups = o.num_bank_group,
            banks = o.num_bank,
            rows = o.num_row,
            cols = o.num_col,
            access_unit = 1_u64 << access_unit_bits,
            capacity = storage.capacity(),
            global_storage,
            burst_cycle = derived.burst_cycle,
            read_delay = derived.read_delay,
            write_delay = derived.write_delay,
            t_rc = derived.t_rc,
            "memory controller built"
        );

        Ok(MemController::from_parts(
            ControllerParts {
                name: name.to_owned(),
                storage,
                global_storage,
                addr_converter,
                splitter: Box::new(splitter),
                sub_trans_queue: Box::new(sub_trans_queue),
                cmd_queue: Box::new(cmd_queue),
                channel: Box::new(channel),
                ids,
            },
            port,
        ))
    }
}
