use crate::{FixedMmioRegister, MmioRegister, mmio_bitfield};
use bitfield_struct::bitfield;

/// Base address of the TAMP block.
pub const TAMP_BASE: usize = 0x5C00_A000;

/// `TAMP_SMCR`: secure mode control register.
///
/// The boot ROM leaves the backup registers write protected; clearing both
/// protection boundaries opens all of them to non-secure writes.
#[bitfield(u32, order = Lsb)]
#[derive(Eq, PartialEq)]
pub struct TampSmcr {
    /// Bits 0–7: BKPRWDPROT: backup registers read/write protection offset.
    #[bits(8)]
    pub bkprwdprot: u8,

    /// Bits 8–15: Reserved.
    #[bits(8, access = RO)]
    pub reserved0: u8,

    /// Bits 16–23: BKPWDPROT: backup registers write protection offset.
    #[bits(8)]
    pub bkpwdprot: u8,

    /// Bits 24–30: Reserved.
    #[bits(7, access = RO)]
    pub reserved1: u8,

    /// Bit 31: TAMPDPROT: tamper protection.
    pub tampdprot: bool,
}

mmio_bitfield!(TampSmcr, offset = 0x20);

impl FixedMmioRegister for TampSmcr {
    const BASE: usize = TAMP_BASE;
}

impl TampSmcr {
    /// No backup register protected; tamper configuration kept secure.
    #[must_use]
    pub const fn unprotected() -> Self {
        Self::new()
            .with_bkprwdprot(0)
            .with_bkpwdprot(0)
            .with_tampdprot(true)
    }
}

/// `TAMP_BKP6R`: general purpose backup register 6.
///
/// Survives a system reset, so a debugger or host tool can leave a value in it
/// for the loader to pick up.
#[repr(transparent)]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct TampBkp6(pub u32);

impl MmioRegister for TampBkp6 {
    const OFFSET: usize = 0x118;

    #[inline]
    fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    fn into_raw(self) -> u32 {
        self.0
    }
}

impl FixedMmioRegister for TampBkp6 {
    const BASE: usize = TAMP_BASE;
}
