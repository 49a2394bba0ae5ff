//! Physical address to DRAM location mapping.
//!
//! This module turns a controller-internal physical address into the coordinates of the
//! DRAM cell that holds it. It provides:
//! 1. **Location:** The `{channel, rank, bank group, bank, row, column}` value type.
//! 2. **Mapper:** The `AddressMapper` trait and the bit-slicing `DefaultMapper`.
//! 3. **Builder:** `MapperBuilder`, which derives field positions from the geometry.
//! 4. **Conversion:** `AddressConverter` for controllers that own an interleaved
//!    slice of a larger global address space.

/// Mapper construction from DRAM geometry.
pub mod builder;

/// Global-to-internal address conversion.
pub mod converter;

/// Location type and the default bit-slicing mapper.
pub mod mapper;

pub use builder::MapperBuilder;
pub use converter::{AddressConverter, InterleavingConverter};
pub use mapper::{AddressMapper, DefaultMapper, Location, LocationItem};
