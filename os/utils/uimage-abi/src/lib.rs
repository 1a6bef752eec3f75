#![no_std]

#[cfg(feature = "chain")]
pub mod chain;

use zerocopy::byteorder::{BigEndian, U32};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

/// Magic number at the start of every image header (`ih_magic`).
pub const IH_MAGIC: u32 = 0x2705_1956;

/// Length of the NUL padded name field.
pub const IH_NMLEN: usize = 32;

/// Size of [`ImageHeader`] on the medium.
pub const HEADER_SIZE: usize = 64;

/// `ih_type` of an image that provides the entry point.
pub const IH_TYPE_KERNEL: u8 = 2;

/// `ih_type` of a standalone data blob (loaded, never jumped to).
pub const IH_TYPE_FIRMWARE: u8 = 5;

/// `ih_os` for bare-metal / firmware payloads.
pub const IH_OS_FIRMWARE: u8 = 17;

/// `ih_os` for Linux kernels.
pub const IH_OS_LINUX: u8 = 5;

/// `ih_arch` for 32-bit ARM.
pub const IH_ARCH_ARM: u8 = 2;

/// `ih_comp` for uncompressed payloads.
pub const IH_COMP_NONE: u8 = 0;

/// One image header as found on the boot medium.
///
/// All multi-byte fields are **big-endian**. The header is immediately
/// followed by the image body; [`size`](Self::size) counts header and body
/// together, so the next header in a chain starts `size` bytes after this one.
#[repr(C)]
#[derive(Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct ImageHeader {
    /// Constant [`IH_MAGIC`].
    pub magic: U32<BigEndian>,

    /// CRC-32 over the header with this field zeroed.
    pub header_crc: U32<BigEndian>,

    /// Creation time, seconds since the Unix epoch.
    pub timestamp: U32<BigEndian>,

    /// Total size in bytes, header included.
    pub size: U32<BigEndian>,

    /// Address the body is meant to execute from.
    pub load_addr: U32<BigEndian>,

    /// Entry point, only meaningful for [`IH_TYPE_KERNEL`] images.
    pub entry_point: U32<BigEndian>,

    /// CRC-32 over the body.
    pub data_crc: U32<BigEndian>,

    pub os: u8,
    pub arch: u8,
    pub image_type: u8,
    pub compression: u8,

    /// Image name, NUL padded (not necessarily NUL terminated).
    pub name: [u8; IH_NMLEN],
}

const _: () = assert!(size_of::<ImageHeader>() == HEADER_SIZE);

/// Fields a tool chooses when wrapping a payload.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct ImageParams<'a> {
    pub name: &'a str,
    pub load_addr: u32,
    pub entry_point: u32,
    pub image_type: u8,
    pub os: u8,
    pub arch: u8,
    pub timestamp: u32,
}

impl ImageHeader {
    /// Interpret the first [`HEADER_SIZE`] bytes of `bytes` as a header.
    #[must_use]
    pub fn read(bytes: &[u8]) -> Option<Self> {
        Self::read_from_prefix(bytes).ok().map(|(hdr, _)| hdr)
    }

    /// Build a header for `body`, with both checksums filled in.
    ///
    /// Returns `None` if the body does not fit the 32-bit size field.
    #[must_use]
    pub fn wrap(params: &ImageParams<'_>, body: &[u8]) -> Option<Self> {
        let total = body.len().checked_add(HEADER_SIZE)?;
        let total = u32::try_from(total).ok()?;

        let mut name = [0u8; IH_NMLEN];
        let len = params.name.len().min(IH_NMLEN);
        name[..len].copy_from_slice(&params.name.as_bytes()[..len]);

        let mut hdr = Self {
            magic: U32::new(IH_MAGIC),
            header_crc: U32::ZERO,
            timestamp: U32::new(params.timestamp),
            size: U32::new(total),
            load_addr: U32::new(params.load_addr),
            entry_point: U32::new(params.entry_point),
            data_crc: U32::new(mp1_crc32::crc32(body)),
            os: params.os,
            arch: params.arch,
            image_type: params.image_type,
            compression: IH_COMP_NONE,
            name,
        };
        hdr.header_crc = U32::new(hdr.compute_header_crc());
        Some(hdr)
    }

    #[inline]
    #[must_use]
    pub fn has_magic(&self) -> bool {
        self.magic.get() == IH_MAGIC
    }

    #[inline]
    #[must_use]
    pub const fn is_kernel(&self) -> bool {
        self.image_type == IH_TYPE_KERNEL
    }

    /// The name up to the first NUL.
    #[must_use]
    pub fn name_bytes(&self) -> &[u8] {
        let end = self.name.iter().position(|&b| b == 0).unwrap_or(IH_NMLEN);
        &self.name[..end]
    }

    /// Printable ASCII characters of the name; everything else is dropped.
    pub fn printable_name(&self) -> impl Iterator<Item = char> + '_ {
        self.name
            .iter()
            .filter(|b| (32..=126).contains(*b))
            .map(|&b| char::from(b))
    }

    #[must_use]
    pub fn name_starts_with(&self, prefix: &[u8]) -> bool {
        self.name_bytes().starts_with(prefix)
    }

    /// CRC-32 over the header with the `header_crc` field treated as zero.
    #[must_use]
    pub fn compute_header_crc(&self) -> u32 {
        let mut copy = *self;
        copy.header_crc = U32::ZERO;
        mp1_crc32::crc32(copy.as_bytes())
    }

    #[must_use]
    pub fn header_crc_ok(&self) -> bool {
        self.compute_header_crc() == self.header_crc.get()
    }

    #[must_use]
    pub fn data_crc_ok(&self, body: &[u8]) -> bool {
        mp1_crc32::crc32(body) == self.data_crc.get()
    }
}

impl core::fmt::Debug for ImageHeader {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ImageHeader")
            .field("magic", &format_args!("{:#010x}", self.magic.get()))
            .field("size", &format_args!("{:#x}", self.size.get()))
            .field("load_addr", &format_args!("{:#010x}", self.load_addr.get()))
            .field("entry_point", &format_args!("{:#010x}", self.entry_point.get()))
            .field("image_type", &self.image_type)
            .field("name", &core::str::from_utf8(self.name_bytes()).unwrap_or("<binary>"))
            .finish_non_exhaustive()
    }
}
