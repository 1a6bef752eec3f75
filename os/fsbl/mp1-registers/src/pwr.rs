use crate::{FixedMmioRegister, mmio_bitfield};
use bitfield_struct::bitfield;

/// Base address of the PWR block.
pub const PWR_BASE: usize = 0x5000_1000;

/// `PWR_CR1`: power control register 1.
///
/// Only [`dbp`](Self::dbp) matters to the loader: it has to be set before any
/// backup-domain register (RTC, TAMP backup registers) accepts writes.
#[bitfield(u32, order = Lsb)]
#[derive(Eq, PartialEq)]
pub struct PwrCr1 {
    /// Bit 0: LPDS: low-power deepsleep with SLEEPDEEP.
    pub lpds: bool,

    /// Bit 1: LPCFG: low-power configuration.
    pub lpcfg: bool,

    /// Bit 2: LVDS: low voltage deepsleep.
    pub lvds: bool,

    /// Bit 3: Reserved.
    #[bits(access = RO)]
    pub reserved0: bool,

    /// Bit 4: PVDEN: programmable voltage detector enable.
    pub pvden: bool,

    /// Bits 5–7: PLS: programmable voltage detector level.
    #[bits(3)]
    pub pls: u8,

    /// Bit 8: DBP: disable backup domain write protection.
    pub dbp: bool,

    /// Bits 9–15: Reserved.
    #[bits(7, access = RO)]
    pub reserved1: u8,

    /// Bit 16: AVDEN: peripheral voltage monitor on VDDA enable.
    pub avden: bool,

    /// Bits 17–18: ALS: analog voltage detector level.
    #[bits(2)]
    pub als: u8,

    /// Bits 19–31: Reserved.
    #[bits(13, access = RO)]
    pub reserved2: u16,
}

mmio_bitfield!(PwrCr1, offset = 0x00);

impl FixedMmioRegister for PwrCr1 {
    const BASE: usize = PWR_BASE;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MmioRegister;

    #[test]
    fn dbp_is_bit_8() {
        assert_eq!(PwrCr1::new().with_dbp(true).into_raw(), 1 << 8);
        assert!(PwrCr1::from_raw(0x0000_0100).dbp());
        assert_eq!(PwrCr1::ADDRESS, 0x5000_1000);
    }

    #[test]
    fn setting_dbp_keeps_other_fields() {
        let cr1 = PwrCr1::from_raw(0x0000_00F1).with_dbp(true);
        assert!(cr1.lpds());
        assert!(cr1.pvden());
        assert_eq!(cr1.pls(), 0b111);
        assert_eq!(cr1.into_raw(), 0x0000_01F1);
    }
}
