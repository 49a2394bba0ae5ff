//! Global-to-internal address conversion.
//!
//! In a system with several memory controllers, physical addresses are interleaved across
//! controllers at a fixed granularity. Each controller only sees its own slices, packed into
//! a dense internal address space starting at zero.

/// Translates between global physical addresses and controller-internal addresses.
pub trait AddressConverter: Send + Sync {
    /// Converts a global physical address into this controller's internal address.
    fn convert_external_to_internal(&self, external: u64) -> u64;

    /// Converts an internal address back into the global physical address.
    fn convert_internal_to_external(&self, internal: u64) -> u64;
}

/// Interleaves the global address space across `total_num_of_elements` units.
///
/// For example, eight controllers interleaved at 4 KiB granularity over a GPU whose
/// memory starts at 8 GiB use `interleaving_size = 4096`, `total_num_of_elements = 8`
/// and `offset = 8 GiB`; the third controller has `current_element_index = 2`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InterleavingConverter {
    /// Interleaving granularity in bytes.
    pub interleaving_size: u64,
    /// Number of units sharing the address range.
    pub total_num_of_elements: u64,
    /// Index of the unit this converter serves.
    pub current_element_index: u64,
    /// Lowest global address of the interleaved range.
    pub offset: u64,
}

impl AddressConverter for InterleavingConverter {
    fn convert_external_to_internal(&self, external: u64) -> u64 {
        assert!(
            external >= self.offset,
            "address {external:#x} is below the interleaved range starting at {:#x}",
            self.offset
        );

        let addr = external - self.offset;
        let round_size = self.interleaving_size * self.total_num_of_elements;
        let belongs_to = addr % round_size / self.interleaving_size;
        assert!(
            belongs_to == self.current_element_index,
            "address {external:#x} belongs to unit {belongs_to}, not unit {}",
            self.current_element_index
        );

        addr / round_size * self.interleaving_size + addr % self.interleaving_size
    }

    fn convert_internal_to_external(&self, internal: u64) -> u64 {
        let round_size = self.interleaving_size * self.total_num_of_elements;
        internal / self.interleaving_size * round_size
            + self.current_element_index * self.interleaving_size
            + internal % self.interleaving_size
            + self.offset
    }
}
