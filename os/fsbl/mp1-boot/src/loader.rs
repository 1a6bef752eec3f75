//! # Boot Media Loader
//!
//! Owns the active backend and the session's entry point, and runs the header
//! scan.
//!
//! ```text
//!            set_bootmethod(ok)          load_image
//! Unbound ───────────────────→ Bound ──────────────→ Scanning ──→ Done
//!    ▲                           ▲                      │ error      │
//!    │ set_bootmethod(err)       └──────────────────────┘            │
//!    └───────────────────────────────────────────────────────────────┘
//!                         set_bootmethod from any state
//! ```
//!
//! A session lasts from one `set_bootmethod` to the next: entry points
//! accepted by several `load_image` calls on the same medium share one slot.

use crate::entry::EntryPointSlot;
use crate::handoff;
use crate::image::{self, ImageError, StagedImage};
use crate::media::{
    BootMedia, BootMedium, DdrBackend, LoadTarget, MediaBackend, MediaError, NorBackend, Platform,
    PlatformError, SdBackend,
};
use crate::{MediaAddress, trace};
use log::{error, info, warn};
use mp1_board::media::SD_READ_TIMEOUT_MS;
use mp1_memory::{PhysicalAddress, PhysicalMemory, RegionValidator};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LoaderState {
    Unbound,
    Bound(BootMedium),
    Scanning(BootMedium),
    Done(BootMedium),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum BindError {
    #[error("unknown boot method")]
    UnknownMedium,
    #[error(transparent)]
    Platform(#[from] PlatformError),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum LoadError {
    #[error("no boot method selected")]
    Unbound,
    #[error(transparent)]
    Media(#[from] MediaError),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum BootFailure {
    #[error("no images containing an entry point have been loaded")]
    NoEntryPoint,
}

/// Outcome of one successful [`BootMediaLoader::load_image`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct LoadReport {
    pub medium: BootMedium,
    pub target: LoadTarget,
    /// Images copied to memory.
    pub loaded: u32,
    /// Images skipped for an invalid load range.
    pub skipped: u32,
    /// The session's entry point after this load.
    pub entry_point: Option<PhysicalAddress>,
}

pub struct BootMediaLoader<P: Platform, M: PhysicalMemory> {
    platform: P,
    memory: M,
    validator: RegionValidator,
    backend: Option<MediaBackend<P>>,
    entry: EntryPointSlot,
    state: LoaderState,
}

impl<P: Platform, M: PhysicalMemory> BootMediaLoader<P, M> {
    /// An unbound loader copying into `memory`, with destinations checked
    /// against `validator`.
    #[must_use]
    pub const fn new(platform: P, memory: M, validator: RegionValidator) -> Self {
        Self {
            platform,
            memory,
            validator,
            backend: None,
            entry: EntryPointSlot::new(),
            state: LoaderState::Unbound,
        }
    }

    #[must_use]
    pub const fn state(&self) -> LoaderState {
        self.state
    }

    #[must_use]
    pub const fn entry_point(&self) -> Option<PhysicalAddress> {
        self.entry.get()
    }

    #[must_use]
    pub const fn memory(&self) -> &M {
        &self.memory
    }

    #[must_use]
    pub const fn platform(&self) -> &P {
        &self.platform
    }

    /// Switch to `medium`, e.g. after [`load_image`](Self::load_image) failed
    /// on another one.
    ///
    /// The previous backend is dropped and the entry point cleared before the
    /// new backend is built.
    ///
    /// # Errors
    /// [`BindError::UnknownMedium`], or the platform could not provide the
    /// hardware handle. The loader is left unbound.
    pub fn set_bootmethod(&mut self, medium: BootMedium) -> Result<(), BindError> {
        self.backend = None;
        self.entry.reset();
        self.state = LoaderState::Unbound;

        let backend = match medium {
            BootMedium::SdCard => MediaBackend::Sd(SdBackend::new(self.platform.sd_card(SD_READ_TIMEOUT_MS)?)),
            BootMedium::NorFlash => MediaBackend::Nor(NorBackend::new(self.platform.nor_flash()?)),
            BootMedium::Ddr => {
                let (staging, mailbox) = self.platform.ddr_staging()?;
                MediaBackend::Ddr(DdrBackend::new(staging, mailbox))
            }
            BootMedium::Unknown => {
                error!("Unknown boot method");
                return Err(BindError::UnknownMedium);
            }
        };

        info!("Boot method: {medium}");
        self.backend = Some(backend);
        self.state = LoaderState::Bound(medium);
        Ok(())
    }

    /// Scan the bound medium for the `target` image chain and copy every
    /// acceptable image into memory.
    ///
    /// # Errors
    /// [`LoadError::Unbound`] without a backend, or a [`MediaError`] that
    /// aborted the scan. Images copied before the error stay in memory.
    pub fn load_image(&mut self, target: LoadTarget) -> Result<LoadReport, LoadError> {
        let Some(backend) = self.backend.as_mut() else {
            error!("load_image(): Unknown boot method");
            return Err(LoadError::Unbound);
        };

        let medium = backend.medium();
        self.state = LoaderState::Scanning(medium);
        info!("Loading {target} image from {medium}");

        let mut report = LoadReport {
            medium,
            target,
            loaded: 0,
            skipped: 0,
            entry_point: None,
        };

        let scan = Scan {
            backend,
            memory: &mut self.memory,
            validator: &self.validator,
            entry: &mut self.entry,
        };

        match scan.run(target, &mut report) {
            Ok(()) => {
                report.entry_point = self.entry.get();
                self.state = LoaderState::Done(medium);
                Ok(report)
            }
            Err(e) => {
                error!("Loading from {medium} failed: {e}");
                self.state = LoaderState::Bound(medium);
                Err(e.into())
            }
        }
    }

    /// Jump to the accepted entry point.
    ///
    /// Returns only if there is none.
    ///
    /// # Safety
    /// The image containing the entry point must be executable code for this
    /// CPU, and nothing the loader still owns may be needed afterwards.
    pub unsafe fn boot_image(&mut self) -> BootFailure {
        let Some(entry) = self.entry.get() else {
            error!("No images containing an entry point have been loaded.");
            return BootFailure::NoEntryPoint;
        };

        info!("Jumping to image entry point: {entry}");
        // SAFETY: forwarded to the caller.
        unsafe { handoff::jump_to_entry(entry) }
    }
}

/// Borrowed pieces of the loader a scan works on.
struct Scan<'a, B, M> {
    backend: &'a mut B,
    memory: &'a mut M,
    validator: &'a RegionValidator,
    entry: &'a mut EntryPointSlot,
}

impl<B: BootMedia, M: PhysicalMemory> Scan<'_, B, M> {
    fn run(mut self, target: LoadTarget, report: &mut LoadReport) -> Result<(), MediaError> {
        let mut addr = self.backend.first_header_addr(target)?;

        loop {
            info!("Reading {addr:#x} to check for uimg header");
            let header = self.backend.read_header(addr)?;
            trace::trace_header(&header);

            let next = match image::parse(&header, self.validator) {
                Ok(image) => {
                    self.copy(addr, &image)?;
                    report.loaded += 1;
                    if let Some(entry) = image.entry_point {
                        // A second entry point is logged by the slot and ignored.
                        let _ = self.entry.offer(entry);
                    }
                    image.next_header(addr)
                }
                Err(ImageError::InvalidRange { size, .. }) => {
                    report.skipped += 1;
                    addr.checked_add(u64::from(size))
                }
                Err(ImageError::NotAnImage { .. }) => {
                    info!("No more sections found");
                    return Ok(());
                }
                Err(ImageError::Truncated { .. }) => {
                    warn!("Cannot locate the next header, stopping");
                    return Ok(());
                }
            };

            let Some(next) = next else {
                warn!("Next header address overflows, stopping");
                return Ok(());
            };
            addr = next;
        }
    }

    fn copy(&mut self, header_addr: MediaAddress, image: &StagedImage) -> Result<(), MediaError> {
        let src = image
            .copy_source(header_addr)
            .ok_or(MediaError::AddressOutOfRange(header_addr))?;
        let dst_addr = image.destination();
        let len = image.copy_len();

        info!(
            "Loading from {src:#x}-{:#x} to {dst_addr}-{:#010x}",
            src.saturating_add(u64::from(len)),
            u64::from(dst_addr.as_u32()) + u64::from(len)
        );

        let unmappable = MediaError::Unmappable { addr: dst_addr, len };
        let len = usize::try_from(len).map_err(|_| unmappable)?;
        let dst = self.memory.window_mut(dst_addr, len).ok_or(unmappable)?;
        self.backend.read_image(src, dst)
    }
}
