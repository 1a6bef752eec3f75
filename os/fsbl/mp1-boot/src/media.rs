//! # Boot Media
//!
//! One contract, [`BootMedia`], implemented by one backend per medium:
//!
//! | Medium | Backend | First header | Reads past the data |
//! |--------|---------|--------------|---------------------|
//! | SD card | [`SdBackend`] | start of the GPT boot partition | zeros |
//! | NOR flash | [`NorBackend`] | fixed flash offset | `0xFF` (erased) |
//! | DDR | [`DdrBackend`] | address left in the mailbox register | zeros |
//!
//! Every backend returns deterministic bytes for addresses beyond its data, so
//! a scan always ends on a magic mismatch instead of a fault.
//!
//! The hardware handles a backend works on are built by a [`Platform`]. The
//! loader keeps the active backend in a single [`MediaBackend`] slot.

mod ddr;
mod nor;
mod sd;

pub use ddr::{DdrBackend, TampMailbox};
pub use nor::NorBackend;
pub use sd::SdBackend;

use crate::MediaAddress;
use core::fmt;
use gpt_disk_io::BlockIo;
use mp1_gpt::GptError;
use mp1_memory::{PhysicalAddress, PhysicalMemory};
use uimage_abi::ImageHeader;
use zerocopy::{FromZeros, IntoBytes};

/// The medium the boot ROM loaded the first-stage loader from.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BootMedium {
    SdCard,
    NorFlash,
    Ddr,
    Unknown,
}

impl BootMedium {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::SdCard => "SD Card",
            Self::NorFlash => "NOR Flash",
            Self::Ddr => "DDR RAM",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for BootMedium {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which image chain to load.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LoadTarget {
    App,
    SecondStageBootloader,
}

impl LoadTarget {
    /// Map the level of the alternate boot select pin: asserted selects the
    /// second-stage bootloader.
    #[must_use]
    pub const fn from_boot_select(asserted: bool) -> Self {
        if asserted {
            Self::SecondStageBootloader
        } else {
            Self::App
        }
    }
}

impl fmt::Display for LoadTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::App => "app",
            Self::SecondStageBootloader => "SSBL",
        })
    }
}

/// Errors that end the current load attempt.
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum MediaError {
    #[error("reading {len} bytes at {addr:#x} failed")]
    ReadFailed { addr: MediaAddress, len: usize },
    #[error("block size is {0} but only 512 is supported")]
    UnsupportedBlockSize(u64),
    #[error("no valid GPT header with the boot partition found: {0}")]
    NoBootPartition(#[source] GptError),
    #[error("destination {addr} + {len:#x} is not mappable")]
    Unmappable { addr: PhysicalAddress, len: u32 },
    #[error("medium address {0:#x} is out of range")]
    AddressOutOfRange(MediaAddress),
}

/// Byte-addressed access to the images on one boot medium.
pub trait BootMedia {
    /// Address of the first image header for `target`.
    ///
    /// # Errors
    /// The medium cannot say where the images are.
    fn first_header_addr(&mut self, target: LoadTarget) -> Result<MediaAddress, MediaError>;

    /// Fill `dst` with the bytes starting at `src`.
    ///
    /// # Errors
    /// A backend-fatal read failure.
    fn read_image(&mut self, src: MediaAddress, dst: &mut [u8]) -> Result<(), MediaError>;

    /// Read the 64-byte image header at `addr`, verbatim.
    ///
    /// # Errors
    /// Same as [`read_image`](Self::read_image).
    fn read_header(&mut self, addr: MediaAddress) -> Result<ImageHeader, MediaError> {
        let mut header = ImageHeader::new_zeroed();
        self.read_image(addr, header.as_mut_bytes())?;
        Ok(header)
    }
}

/// The DDR hand-off register.
///
/// A host or debugger writes the address of a pre-staged image chain into it
/// while the loader waits.
pub trait HeaderMailbox {
    /// Put the register into its "waiting" state.
    fn arm(&mut self);

    /// The address written by the host, once it differs from the armed value.
    fn poll(&mut self) -> Option<u32>;

    /// Bus address of the register, shown to the user.
    fn register_address(&self) -> u32;
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum PlatformError {
    #[error("{0} is not fitted on this board")]
    NotFitted(BootMedium),
    #[error("{0} controller failed to initialize")]
    InitFailed(BootMedium),
}

/// Builds the hardware handles for each medium.
///
/// Pin muxing, clocks and controller setup happen here, outside the loader.
pub trait Platform {
    type Card: BlockIo;
    type Flash: AsRef<[u8]>;
    type Staging: PhysicalMemory;
    type Mailbox: HeaderMailbox;

    /// Initialize the SD controller and card. A single read must give up after
    /// `read_timeout_ms` and report an error.
    ///
    /// # Errors
    /// No card, or the controller failed to come up.
    fn sd_card(&mut self, read_timeout_ms: u32) -> Result<Self::Card, PlatformError>;

    /// Put the QSPI controller in memory-mapped mode and return the window.
    ///
    /// # Errors
    /// No flash fitted, or the controller failed to come up.
    fn nor_flash(&mut self) -> Result<Self::Flash, PlatformError>;

    /// Source memory holding pre-staged images, and the mailbox announcing
    /// where they are.
    ///
    /// # Errors
    /// DDR is not usable.
    fn ddr_staging(&mut self) -> Result<(Self::Staging, Self::Mailbox), PlatformError>;
}

/// The one active backend.
pub enum MediaBackend<P: Platform> {
    Sd(SdBackend<P::Card>),
    Nor(NorBackend<P::Flash>),
    Ddr(DdrBackend<P::Staging, P::Mailbox>),
}

impl<P: Platform> MediaBackend<P> {
    #[must_use]
    pub const fn medium(&self) -> BootMedium {
        match self {
            Self::Sd(_) => BootMedium::SdCard,
            Self::Nor(_) => BootMedium::NorFlash,
            Self::Ddr(_) => BootMedium::Ddr,
        }
    }
}

impl<P: Platform> BootMedia for MediaBackend<P> {
    fn first_header_addr(&mut self, target: LoadTarget) -> Result<MediaAddress, MediaError> {
        match self {
            Self::Sd(sd) => sd.first_header_addr(target),
            Self::Nor(nor) => nor.first_header_addr(target),
            Self::Ddr(ddr) => ddr.first_header_addr(target),
        }
    }

    fn read_image(&mut self, src: MediaAddress, dst: &mut [u8]) -> Result<(), MediaError> {
        match self {
            Self::Sd(sd) => sd.read_image(src, dst),
            Self::Nor(nor) => nor.read_image(src, dst),
            Self::Ddr(ddr) => ddr.read_image(src, dst),
        }
    }

    fn read_header(&mut self, addr: MediaAddress) -> Result<ImageHeader, MediaError> {
        match self {
            Self::Sd(sd) => sd.read_header(addr),
            Self::Nor(nor) => nor.read_header(addr),
            Self::Ddr(ddr) => ddr.read_header(addr),
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use std::string::ToString;

    #[test]
    fn boot_select_pin() {
        assert_eq!(LoadTarget::from_boot_select(false), LoadTarget::App);
        assert_eq!(LoadTarget::from_boot_select(true), LoadTarget::SecondStageBootloader);
    }

    #[test]
    fn medium_names() {
        assert_eq!(BootMedium::SdCard.to_string(), "SD Card");
        assert_eq!(BootMedium::Unknown.to_string(), "Unknown");
        assert_eq!(
            PlatformError::NotFitted(BootMedium::NorFlash).to_string(),
            "NOR Flash is not fitted on this board"
        );
    }
}
