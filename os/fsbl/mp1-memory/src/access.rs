use crate::{PhysicalAddress, RegionValidator};

/// Byte-level access to physical memory.
///
/// The loader never dereferences an address on its own; it asks for a window
/// and copies through the returned slice. Implementations return `None` for any
/// range they cannot (or must not) expose.
pub trait PhysicalMemory {
    /// Read-only view of `len` bytes starting at `addr`.
    fn window(&self, addr: PhysicalAddress, len: usize) -> Option<&[u8]>;

    /// Writable view of `len` bytes starting at `addr`.
    fn window_mut(&mut self, addr: PhysicalAddress, len: usize) -> Option<&mut [u8]>;
}

/// Direct access to the SoC bus.
///
/// Every window is checked against the validator before a slice is formed, so
/// only RETRAM, SRAM and DDR are ever reachable through it.
#[derive(Debug)]
pub struct RawMemory {
    validator: RegionValidator,
}

impl RawMemory {
    /// # Safety
    ///
    /// Every region in `validator` must be backed by initialized, accessible
    /// memory, and nothing else may hold references into those regions while
    /// windows from this value are alive.
    #[must_use]
    pub const unsafe fn new(validator: RegionValidator) -> Self {
        Self { validator }
    }

    #[must_use]
    pub const fn validator(&self) -> &RegionValidator {
        &self.validator
    }

    /// Both ends of the window must lie in the same region; the gaps between
    /// regions are not backed by memory.
    fn checked(&self, addr: PhysicalAddress, len: usize) -> Option<usize> {
        let span = u32::try_from(len).ok()?;
        let end = addr.checked_add(span)?;
        let region = self.validator.region_of(addr)?;
        region.contains(end).then_some(addr.as_usize())
    }
}

impl PhysicalMemory for RawMemory {
    fn window(&self, addr: PhysicalAddress, len: usize) -> Option<&[u8]> {
        let ptr = self.checked(addr, len)? as *const u8;
        // SAFETY: the range lies inside a validated region, see `RawMemory::new`.
        Some(unsafe { core::slice::from_raw_parts(ptr, len) })
    }

    fn window_mut(&mut self, addr: PhysicalAddress, len: usize) -> Option<&mut [u8]> {
        let ptr = self.checked(addr, len)? as *mut u8;
        // SAFETY: the range lies inside a validated region, see `RawMemory::new`.
        Some(unsafe { core::slice::from_raw_parts_mut(ptr, len) })
    }
}
