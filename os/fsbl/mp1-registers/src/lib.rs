//! # Typed STM32MP15x Registers
//!
//! Bitfield views of the few peripheral registers the first-stage loader
//! touches directly. Each register type is a plain value; reading or writing
//! the hardware goes through [`MmioRegister`] and is always `unsafe`.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

#[cfg(feature = "pwr")]
pub mod pwr;

#[cfg(feature = "tamp")]
pub mod tamp;

#[cfg(feature = "uart")]
pub mod uart;

/// A 32-bit register at a fixed offset inside a peripheral block.
pub trait MmioRegister: Copy {
    /// Byte offset from the peripheral base.
    const OFFSET: usize;

    fn from_raw(raw: u32) -> Self;
    fn into_raw(self) -> u32;

    /// # Safety
    /// `base` must be the base address of the matching peripheral, and the
    /// peripheral must be clocked.
    #[inline]
    unsafe fn read_at(base: usize) -> Self {
        let ptr = (base + Self::OFFSET) as *const u32;
        Self::from_raw(unsafe { core::ptr::read_volatile(ptr) })
    }

    /// # Safety
    /// Same as [`read_at`](Self::read_at); in addition, the written value must
    /// be valid for the register.
    #[inline]
    unsafe fn write_at(self, base: usize) {
        let ptr = (base + Self::OFFSET) as *mut u32;
        unsafe { core::ptr::write_volatile(ptr, self.into_raw()) }
    }
}

/// A register whose peripheral has exactly one instance on the SoC.
pub trait FixedMmioRegister: MmioRegister {
    /// Base address of the owning peripheral.
    const BASE: usize;

    /// Absolute address of the register.
    const ADDRESS: usize = Self::BASE + Self::OFFSET;
}

pub trait LoadRegisterUnsafe {
    /// # Safety
    /// The caller must uphold the implementation-specific safety requirements.
    /// For example, the register may only be readable once its peripheral clock is on.
    unsafe fn load_unsafe() -> Self;
}

pub trait StoreRegisterUnsafe {
    /// # Safety
    /// The caller must uphold the implementation-specific safety requirements.
    /// For example, the register may be write protected until the backup domain is unlocked.
    unsafe fn store_unsafe(self);
}

impl<T> LoadRegisterUnsafe for T
where
    T: FixedMmioRegister,
{
    #[inline]
    unsafe fn load_unsafe() -> Self {
        unsafe { Self::read_at(Self::BASE) }
    }
}

impl<T> StoreRegisterUnsafe for T
where
    T: FixedMmioRegister,
{
    #[inline]
    unsafe fn store_unsafe(self) {
        unsafe { self.write_at(Self::BASE) }
    }
}

/// Implements [`MmioRegister`] for a `#[bitfield(u32)]` type.
macro_rules! mmio_bitfield {
    ($ty:ty, offset = $offset:expr) => {
        impl $crate::MmioRegister for $ty {
            const OFFSET: usize = $offset;

            #[inline]
            fn from_raw(raw: u32) -> Self {
                Self::from_bits(raw)
            }

            #[inline]
            fn into_raw(self) -> u32 {
                self.into_bits()
            }
        }
    };
}

#[allow(unused_imports)]
pub(crate) use mmio_bitfield;
