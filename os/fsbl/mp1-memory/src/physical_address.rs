use core::fmt;

/// Physical memory address on the 32-bit MP1 bus.
///
/// A thin wrapper around a raw `u32` that carries intent: everything the loader
/// writes to, reads from, or jumps to is a `PhysicalAddress`. There is no MMU
/// at this stage, so the value is used verbatim as a pointer.
///
/// Arithmetic is checked only; image headers come from untrusted media and an
/// overflowing address must surface as `None`, never wrap.
///
/// ### Examples
/// ```rust
/// # use mp1_memory::PhysicalAddress;
/// let pa = PhysicalAddress::new(0xC200_0000);
/// assert_eq!(pa.checked_add(0x40), Some(PhysicalAddress::new(0xC200_0040)));
/// assert_eq!(PhysicalAddress::new(0x10).checked_sub(0x40), None);
/// ```
#[repr(transparent)]
#[derive(Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PhysicalAddress(u32);

impl PhysicalAddress {
    #[inline]
    #[must_use]
    pub const fn zero() -> Self {
        Self::new(0)
    }

    #[inline]
    #[must_use]
    pub const fn new(v: u32) -> Self {
        Self(v)
    }

    #[inline]
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    #[inline]
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }

    #[inline]
    #[must_use]
    pub const fn checked_add(self, rhs: u32) -> Option<Self> {
        match self.0.checked_add(rhs) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn checked_sub(self, rhs: u32) -> Option<Self> {
        match self.0.checked_sub(rhs) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Distance in bytes from `self` up to `other`, or `None` if `other` lies below.
    #[inline]
    #[must_use]
    pub const fn offset_to(self, other: Self) -> Option<u32> {
        other.0.checked_sub(self.0)
    }

    /// Whether the address is aligned to `align` bytes (`align` must be a power of two).
    #[inline]
    #[must_use]
    pub const fn is_aligned(self, align: u32) -> bool {
        self.0 & (align - 1) == 0
    }
}

impl fmt::Debug for PhysicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PA(0x{:08X})", self.0)
    }
}

impl fmt::Display for PhysicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

impl fmt::LowerHex for PhysicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl From<u32> for PhysicalAddress {
    #[inline]
    fn from(v: u32) -> Self {
        Self::new(v)
    }
}

impl From<PhysicalAddress> for u32 {
    #[inline]
    fn from(v: PhysicalAddress) -> Self {
        v.as_u32()
    }
}
