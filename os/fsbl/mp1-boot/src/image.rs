//! # uImage Header Interpretation
//!
//! Turns one [`ImageHeader`] read from a boot medium into a [`StagedImage`]:
//! where the body goes, how many bytes to copy, and whether the image offers an
//! entry point.
//!
//! ## Rules, in order
//!
//! 1. A magic other than [`IH_MAGIC`] ends the chain ([`ImageError::NotAnImage`]).
//! 2. A kernel image whose entry point lies in `[load, load + size)` offers it.
//! 3. Images listed in [`LEGACY_FIXUPS`] get their load address moved past the
//!    header.
//! 4. If `load - 64` is valid memory the whole image, header included, is
//!    copied to `load - 64` so the body lands on `load`. Otherwise only the
//!    body is copied, straight to `load`.
//! 5. `load` and `load + size` must both be valid memory.
//!
//! ## Copy Layout
//!
//! ```text
//! skip_header = false               skip_header = true
//!
//! load-64 ┌────────┐                        (load-64 invalid)
//!         │ header │                load ┌────────┐
//! load    ├────────┤                     │  body  │ size - 64
//!         │  body  │ size - 64           └────────┘
//!         └────────┘
//! ```

use crate::MediaAddress;
use log::{debug, info, warn};
use mp1_memory::{PhysicalAddress, RegionValidator};
use uimage_abi::{HEADER_SIZE, IH_MAGIC, ImageHeader};

/// [`HEADER_SIZE`] in the width of the header fields.
pub const HEADER_LEN: u32 = 64;

const _: () = assert!(HEADER_LEN as usize == HEADER_SIZE);

/// An image built by an older toolchain that stored its addresses relative to
/// the header instead of the body.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct LegacyImage {
    /// Prefix of the header name.
    pub name: &'static [u8],
    pub load_addr: u32,
    pub entry_point: u32,
}

/// Known legacy images. A header matches when its name starts with `name` and
/// both addresses are equal.
pub const LEGACY_FIXUPS: &[LegacyImage] = &[
    LegacyImage {
        name: b"stm32mp1-baremetal image",
        load_addr: 0xC200_0000,
        entry_point: 0xC200_0040,
    },
    LegacyImage {
        name: b"U-Boot",
        load_addr: 0xC00F_FFC0,
        entry_point: 0xC010_0000,
    },
];

#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum ImageError {
    /// The end of an image chain.
    #[error("not an image, magic was {magic:#010x}, expected {IH_MAGIC:#010x}")]
    NotAnImage { magic: u32 },
    #[error("invalid load address range: {load_addr} + {size:#x}")]
    InvalidRange { load_addr: PhysicalAddress, size: u32 },
    /// The size field cannot even cover the header, so the next image cannot
    /// be located.
    #[error("image size {size:#x} is smaller than its header")]
    Truncated { size: u32 },
}

/// Everything the loader needs to copy one image.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct StagedImage {
    /// Where the body must end up, after legacy fixups.
    pub load_addr: PhysicalAddress,
    /// Total image size, header included.
    pub size: u32,
    /// `true` if only the body is copied.
    pub skip_header: bool,
    /// Entry point offered to the session, kernel images only.
    pub entry_point: Option<PhysicalAddress>,
}

impl StagedImage {
    /// Medium address to copy from, given the address of this image's header.
    #[must_use]
    pub fn copy_source(&self, header_addr: MediaAddress) -> Option<MediaAddress> {
        if self.skip_header {
            header_addr.checked_add(u64::from(HEADER_LEN))
        } else {
            Some(header_addr)
        }
    }

    /// First byte written in physical memory.
    #[must_use]
    pub const fn destination(&self) -> PhysicalAddress {
        match self.load_addr.checked_sub(HEADER_LEN) {
            Some(with_header) if !self.skip_header => with_header,
            _ => self.load_addr,
        }
    }

    /// Number of bytes copied.
    #[must_use]
    pub const fn copy_len(&self) -> u32 {
        if self.skip_header {
            self.size.saturating_sub(HEADER_LEN)
        } else {
            self.size
        }
    }

    /// Address of the header following this image.
    #[must_use]
    pub fn next_header(&self, header_addr: MediaAddress) -> Option<MediaAddress> {
        header_addr.checked_add(u64::from(self.size))
    }
}

/// Find the fixup entry matching `header`, if any.
#[must_use]
pub fn legacy_fixup(header: &ImageHeader) -> Option<&'static LegacyImage> {
    let load = header.load_addr.get();
    let entry = header.entry_point.get();
    LEGACY_FIXUPS
        .iter()
        .find(|l| l.load_addr == load && l.entry_point == entry && header.name_starts_with(l.name))
}

/// `entry ∈ [load, load + size)`, without wrapping.
fn entry_in_image(load: u32, size: u32, entry: u32) -> bool {
    let end = u64::from(load) + u64::from(size);
    entry >= load && u64::from(entry) < end
}

/// Interpret `header` against the writable memory described by `validator`.
///
/// # Errors
/// See [`ImageError`]. Only [`ImageError::NotAnImage`] and
/// [`ImageError::Truncated`] end a scan; an [`ImageError::InvalidRange`] image
/// is skipped.
pub fn parse(header: &ImageHeader, validator: &RegionValidator) -> Result<StagedImage, ImageError> {
    let magic = header.magic.get();
    if magic != IH_MAGIC {
        info!("Not an image. Magic was {magic:#010x}, expected {IH_MAGIC:#010x}");
        return Err(ImageError::NotAnImage { magic });
    }

    let entry = header.entry_point.get();
    let mut load = header.load_addr.get();
    let size = header.size.get();

    let entry_point = match (header.is_kernel(), entry_in_image(load, size, entry)) {
        (true, true) => Some(PhysicalAddress::new(entry)),
        (true, false) => {
            debug!("Bad entry point found: {entry:#010x}");
            None
        }
        (false, _) => None,
    };

    if let Some(legacy) = legacy_fixup(header) {
        info!(
            "Legacy image \"{}\": load address {load:#010x} points at the header",
            legacy.name.escape_ascii()
        );
        load = load.saturating_add(HEADER_LEN);
    }

    if size < HEADER_LEN {
        warn!("Image size {size:#x} cannot hold its own header");
        return Err(ImageError::Truncated { size });
    }

    let load_addr = PhysicalAddress::new(load);
    let skip_header = !load_addr
        .checked_sub(HEADER_LEN)
        .is_some_and(|with_header| validator.is_valid_range(with_header, load_addr));

    if !validator.is_valid_span(load_addr, size) {
        warn!(
            "Skipping section with invalid load address range: {load_addr}-{:#010x}",
            u64::from(load) + u64::from(size)
        );
        return Err(ImageError::InvalidRange { load_addr, size });
    }

    info!("Image load addr: {load_addr}");
    info!("     entry addr: {:#010x}", entry_point.map_or(0, PhysicalAddress::as_u32));
    info!("           size: {size:#x}");

    Ok(StagedImage {
        load_addr,
        size,
        skip_header,
        entry_point,
    })
}
