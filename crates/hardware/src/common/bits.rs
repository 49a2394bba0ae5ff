//! Exact base-2 logarithms.
//!
//! DRAM geometry (rows, columns, banks, burst length) is always a power of two,
//! which lets the address mapper slice addresses into bit fields.

use super::error::ConfigError;

/// Returns `log2(n)` if `n` is a nonzero power of two.
///
/// # Examples
///
/// ```
/// use dramsim_core::common::exact_log2;
///
/// assert_eq!(exact_log2(64), Some(6));
/// assert_eq!(exact_log2(1), Some(0));
/// assert_eq!(exact_log2(48), None);
/// assert_eq!(exact_log2(0), None);
/// ```
pub const fn exact_log2(n: u64) -> Option<u32> {
    if n.is_power_of_two() {
        Some(n.trailing_zeros())
    } else {
        None
    }
}

/// Like [`exact_log2`], but reports the offending configuration field.
pub(crate) fn log2_of(field: &'static str, value: u64) -> Result<u32, ConfigError> {
    match exact_log2(value) {
        Some(bits) => Ok(bits),
        None => Err(ConfigError::NotPowerOfTwo { field, value }),
    }
}
