//! Writable memory map of the STM32MP15x.
//!
//! Image destinations are checked against these regions before anything is
//! copied. The bounds are inclusive, matching [`MemoryRegion`].

use mp1_memory::{MemoryRegion, PhysicalAddress, RegionValidator};

pub const RETRAM_BASE: PhysicalAddress = PhysicalAddress::new(0x3800_0000);
pub const RETRAM_SIZE: u32 = 0x1_0000;

pub const SRAM_BASE: PhysicalAddress = PhysicalAddress::new(0x3000_0000);
pub const SRAM_SIZE: u32 = 0x6_0000;

pub const DDR_BASE: PhysicalAddress = PhysicalAddress::new(0xC000_0000);
pub const DDR_SIZE: u32 = 0x2000_0000;

pub const RETRAM: MemoryRegion = MemoryRegion::new("RETRAM", RETRAM_BASE, RETRAM_SIZE);
pub const SRAM: MemoryRegion = MemoryRegion::new("SRAM", SRAM_BASE, SRAM_SIZE);
pub const DDR: MemoryRegion = MemoryRegion::new("DDR", DDR_BASE, DDR_SIZE);

/// The validator every image destination goes through.
pub const MEMORY_MAP: RegionValidator = RegionValidator::new([RETRAM, SRAM, DDR]);

const _: () = {
    assert!(MEMORY_MAP.is_disjoint(), "memory regions must not overlap");
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_of_ddr_is_inclusive() {
        assert!(MEMORY_MAP.is_valid(PhysicalAddress::new(0xE000_0000)));
        assert!(!MEMORY_MAP.is_valid(PhysicalAddress::new(0xE000_0001)));
    }

    #[test]
    fn gaps_between_regions_are_invalid() {
        assert!(!MEMORY_MAP.is_valid(PhysicalAddress::new(0x3006_0001)));
        assert!(!MEMORY_MAP.is_valid(PhysicalAddress::new(0x37FF_FFFF)));
        assert!(!MEMORY_MAP.is_valid(PhysicalAddress::new(0x7000_0000)));
    }
}
