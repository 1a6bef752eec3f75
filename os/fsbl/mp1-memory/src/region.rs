use crate::PhysicalAddress;
use core::fmt;

/// A named block of physical memory the loader may write images into.
///
/// The region covers `[base, base + size]` *inclusive*: the address one past the
/// last byte still counts as inside, so a copy that ends exactly at the top of
/// the region passes the end-address check.
#[derive(Copy, Clone, Eq, PartialEq)]
pub struct MemoryRegion {
    name: &'static str,
    base: PhysicalAddress,
    size: u32,
}

impl MemoryRegion {
    /// Create a region. `base + size` must not overflow the 32-bit bus.
    #[must_use]
    pub const fn new(name: &'static str, base: PhysicalAddress, size: u32) -> Self {
        assert!(
            base.checked_add(size).is_some(),
            "memory region exceeds the 32-bit address space"
        );
        Self { name, base, size }
    }

    #[inline]
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    #[must_use]
    pub const fn base(&self) -> PhysicalAddress {
        self.base
    }

    #[inline]
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Inclusive upper bound (`base + size`).
    #[inline]
    #[must_use]
    pub const fn end(&self) -> PhysicalAddress {
        PhysicalAddress::new(self.base.as_u32() + self.size)
    }

    #[inline]
    #[must_use]
    pub const fn contains(&self, addr: PhysicalAddress) -> bool {
        addr.as_u32() >= self.base.as_u32() && addr.as_u32() <= self.end().as_u32()
    }

    #[inline]
    #[must_use]
    pub const fn overlaps(&self, other: &Self) -> bool {
        self.base.as_u32() <= other.end().as_u32() && other.base.as_u32() <= self.end().as_u32()
    }
}

impl fmt::Debug for MemoryRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}..={}]", self.name, self.base, self.end())
    }
}

/// Gatekeeper for every address the loader writes to.
///
/// Holds the three writable regions of the SoC (retention RAM, on-chip SRAM,
/// external DDR). A range is only accepted when *both* of its ends fall inside
/// the same region; partially overlapping ranges are rejected as a whole.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct RegionValidator {
    regions: [MemoryRegion; 3],
}

impl RegionValidator {
    #[must_use]
    pub const fn new(regions: [MemoryRegion; 3]) -> Self {
        Self { regions }
    }

    #[must_use]
    pub const fn regions(&self) -> &[MemoryRegion; 3] {
        &self.regions
    }

    /// `true` if no two regions share an address.
    #[must_use]
    pub const fn is_disjoint(&self) -> bool {
        let mut i = 0;
        while i < self.regions.len() {
            let mut j = i + 1;
            while j < self.regions.len() {
                if self.regions[i].overlaps(&self.regions[j]) {
                    return false;
                }
                j += 1;
            }
            i += 1;
        }
        true
    }

    /// The region containing `addr`, if any.
    #[must_use]
    pub fn region_of(&self, addr: PhysicalAddress) -> Option<&MemoryRegion> {
        self.regions.iter().find(|r| r.contains(addr))
    }

    #[inline]
    #[must_use]
    pub fn is_valid(&self, addr: PhysicalAddress) -> bool {
        self.region_of(addr).is_some()
    }

    /// Both ends must lie in the *same* region; a range bridging two regions
    /// also covers the gap between them.
    #[inline]
    #[must_use]
    pub fn is_valid_range(&self, start: PhysicalAddress, end: PhysicalAddress) -> bool {
        start <= end && self.region_of(start).is_some_and(|r| r.contains(end))
    }

    /// Checks `[start, start + len]`; a length that overflows the bus is invalid.
    #[must_use]
    pub fn is_valid_span(&self, start: PhysicalAddress, len: u32) -> bool {
        start
            .checked_add(len)
            .is_some_and(|end| self.is_valid_range(start, end))
    }
}
