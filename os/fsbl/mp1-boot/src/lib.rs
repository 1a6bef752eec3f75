//! # MP1 Boot Media Loader
//!
//! The image loading core of the first-stage boot loader. After clocks, PMIC
//! and DDR are up, the firmware hands this crate the medium the boot ROM came
//! from and a [`LoadTarget`]. The loader then finds a chain of uImage payloads
//! on that medium, copies each into physical memory and jumps to the single
//! kernel entry point it accepted.
//!
//! ## Pipeline
//!
//! ```text
//! BootMedium ─→ BootMediaLoader::set_bootmethod ─→ MediaBackend {Sd, Nor, Ddr}
//!                                                      │
//!       first_header_addr(target) ◄────────────────────┘
//!               │        (SD: GPT lookup, NOR: fixed offset, DDR: mailbox)
//!               ▼
//! ┌────────────────────────────────────────────────────────────┐
//! │ loop                                                       │
//! │   read_header(addr)          64 bytes, big-endian fields   │
//! │   image::parse(header)       magic, fixups, range check    │
//! │   read_image(src, dst)       into a PhysicalMemory window  │
//! │   EntryPointSlot::offer      first kernel entry wins       │
//! │   addr += size               header inclusive              │
//! │ until magic mismatch                                       │
//! └────────────────────────────────────────────────────────────┘
//!               │
//!               ▼
//! BootMediaLoader::boot_image ─→ handoff::jump_to_entry (never returns)
//! ```
//!
//! ## Modules
//!
//! * [`image`]: uImage header interpretation ([`image::parse`]), the legacy
//!   address fixups and the resulting [`image::StagedImage`].
//! * [`entry`]: the per-session entry point slot.
//! * [`media`]: the [`BootMedia`] contract, the three backends and the
//!   [`Platform`] trait that builds their hardware handles.
//! * [`loader`]: [`BootMediaLoader`], the state machine tying it together.
//! * [`sequence`]: trying several media in order and booting the first that
//!   yields an entry point.
//! * [`handoff`]: the non-returning jump.
//!
//! ## Memory Safety
//!
//! Nothing in the scan dereferences an address taken from a header. Every
//! destination is validated against the board memory map and then obtained as
//! a slice from a [`PhysicalMemory`](mp1_memory::PhysicalMemory)
//! implementation. The jump in [`handoff`] is the one place control leaves
//! safe code.

#![cfg_attr(not(any(test, doctest)), no_std)]

pub mod entry;
pub mod handoff;
pub mod image;
pub mod loader;
pub mod media;
pub mod sequence;
mod trace;

pub use entry::{EntryPointError, EntryPointSlot};
pub use image::{ImageError, StagedImage};
pub use loader::{BindError, BootFailure, BootMediaLoader, LoadError, LoadReport, LoaderState};
pub use media::{BootMedia, BootMedium, HeaderMailbox, LoadTarget, MediaBackend, MediaError, Platform, PlatformError};

/// Byte address on a boot medium: an SD card byte offset, a NOR flash offset
/// or a physical DDR address, depending on the backend.
pub type MediaAddress = u64;
