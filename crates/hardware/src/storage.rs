//! Backing storage.
//!
//! This module provides the byte array that holds the simulated DRAM contents. DRAM
//! capacities routinely reach several gigabytes, most of which a simulation never touches,
//! so on Unix the array is an anonymous `mmap` whose pages the OS commits on first access.
//! Other platforms fall back to a zeroed heap allocation.
//!
//! Several controllers interleaved over one global address space can share a single
//! instance. Every access holds the storage lock for the duration of its copy.

use std::ptr::NonNull;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::common::StorageError;

/// The raw allocation. Only reachable through the lock in [`Storage`].
struct Region {
    ptr: NonNull<u8>,
    size: usize,
    is_mmap: bool,
}

// SAFETY: `Region` owns its allocation exclusively and the pointer is never exposed, so
// moving it to another thread moves sole ownership of the bytes with it.
unsafe impl Send for Region {}

/// Lazily committed, zero-initialised byte array.
pub struct Storage {
    region: Mutex<Region>,
    size: usize,
}

impl Storage {
    /// Allocates `size` bytes of zeroed storage.
    ///
    /// # Arguments
    ///
    /// * `size` - Capacity in bytes.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::AllocationFailed`] if the host refuses the reservation.
    pub fn new(size: u64) -> Result<Self, StorageError> {
        let Ok(len) = usize::try_from(size) else {
            return Err(StorageError::AllocationFailed { size });
        };
        if len == 0 {
            return Ok(Self::from_region(Region {
                ptr: NonNull::dangling(),
                size: 0,
                is_mmap: false,
            }));
        }

        #[cfg(unix)]
        {
            // SAFETY: a private anonymous mapping with no address hint has no preconditions.
            let ptr = unsafe {
                libc::mmap(
                    std::ptr::null_mut(),
                    len,
                    libc::PROT_READ | libc::PROT_WRITE,
                    libc::MAP_PRIVATE | libc::MAP_ANONYMOUS | libc::MAP_NORESERVE,
                    -1,
                    0,
                )
            };
            if ptr == libc::MAP_FAILED {
                return Err(StorageError::AllocationFailed { size });
            }
            let ptr = NonNull::new(ptr.cast::<u8>()).ok_or(StorageError::AllocationFailed { size })?;
            Ok(Self::from_region(Region {
                ptr,
                size: len,
                is_mmap: true,
            }))
        }

        #[cfg(not(unix))]
        {
            let mut vec = std::mem::ManuallyDrop::new(vec![0_u8; len].into_boxed_slice());
            let ptr = NonNull::new(vec.as_mut_ptr()).ok_or(StorageError::AllocationFailed { size })?;
            Ok(Self::from_region(Region {
                ptr,
                size: len,
                is_mmap: false,
            }))
        }
    }

    fn from_region(region: Region) -> Self {
        Self {
            size: region.size,
            region: Mutex::new(region),
        }
    }

    /// Capacity in bytes.
    pub const fn capacity(&self) -> u64 {
        self.size as u64
    }

    // A poisoned lock still guards plain bytes; no invariant spans a panic.
    fn lock(&self) -> MutexGuard<'_, Region> {
        self.region.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check(&self, address: u64, len: u64) -> Result<usize, StorageError> {
        let out_of_bounds = StorageError::OutOfBounds {
            address,
            len,
            capacity: self.capacity(),
        };
        match address.checked_add(len) {
            Some(end) if end <= self.capacity() => Ok(address as usize),
            _ => Err(out_of_bounds),
        }
    }

    /// Copies `len` bytes starting at `address` out of the storage.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::OutOfBounds`] if the range does not fit.
    pub fn read(&self, address: u64, len: u64) -> Result<Vec<u8>, StorageError> {
        let offset = self.check(address, len)?;
        let mut out = vec![0_u8; len as usize];
        let region = self.lock();
        // SAFETY: `check` proved `offset + len <= size`; `out` is a distinct allocation and
        // the lock excludes concurrent writers.
        unsafe {
            std::ptr::copy_nonoverlapping(region.ptr.as_ptr().add(offset), out.as_mut_ptr(), out.len());
        }
        drop(region);
        Ok(out)
    }

    /// Copies `data` into the storage starting at `address`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::OutOfBounds`] if the range does not fit.
    pub fn write(&self, address: u64, data: &[u8]) -> Result<(), StorageError> {
        let offset = self.check(address, data.len() as u64)?;
        let region = self.lock();
        // SAFETY: `check` proved `offset + data.len() <= size`. `data` cannot alias the
        // mapping because no reference into it is ever handed out, and the lock excludes
        // every other access.
        unsafe {
            std::ptr::copy_nonoverlapping(data.as_ptr(), region.ptr.as_ptr().add(offset), data.len());
        }
        drop(region);
        Ok(())
    }

    /// Copies the bytes of `data` whose `mask` entry is `true` into the storage.
    ///
    /// Bytes past the end of `mask` are left untouched. The whole merge happens under one
    /// lock, so a concurrent writer never observes half of it.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::OutOfBounds`] if the range does not fit.
    pub fn write_masked(&self, address: u64, data: &[u8], mask: &[bool]) -> Result<(), StorageError> {
        let offset = self.check(address, data.len() as u64)?;
        let region = self.lock();
        for (i, (byte, dirty)) in data.iter().zip(mask).enumerate() {
            if *dirty {
                // SAFETY: `i < data.len()` and `check` proved `offset + data.len() <= size`;
                // the lock excludes every other access.
                unsafe {
                    region.ptr.as_ptr().add(offset + i).write(*byte);
                }
            }
        }
        drop(region);
        Ok(())
    }
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage")
            .field("capacity", &self.size)
            .field("is_mmap", &self.lock().is_mmap)
            .finish()
    }
}

impl Drop for Region {
    fn drop(&mut self) {
        if self.size == 0 {
            return;
        }
        if self.is_mmap {
            #[cfg(unix)]
            // SAFETY: the mapping was created by `mmap` with exactly this length.
            unsafe {
                let _ = libc::munmap(self.ptr.as_ptr().cast(), self.size);
            }
        } else {
            #[cfg(not(unix))]
            // SAFETY: the pointer and length came from a leaked boxed slice.
            unsafe {
                drop(Box::from_raw(std::ptr::slice_from_raw_parts_mut(self.ptr.as_ptr(), self.size)));
            }
        }
    }
}
