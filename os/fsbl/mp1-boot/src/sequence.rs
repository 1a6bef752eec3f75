//! # Boot Sequence
//!
//! What the firmware's `main` does once DDR is up: pick the target, try the
//! media in order, and jump to the first entry point found. If this returns,
//! `main` signals the failure (the LED blinks) and stops.

use crate::loader::{BootFailure, BootMediaLoader};
use crate::media::{BootMedium, LoadTarget, Platform};
use log::{error, info, warn};
use mp1_board::BOARD;
use mp1_memory::{PhysicalAddress, PhysicalMemory};

/// The image chain to load. Boards without a boot select pin always load the
/// app.
#[must_use]
pub const fn boot_target(select_pin_asserted: bool) -> LoadTarget {
    if BOARD.use_boot_select {
        LoadTarget::from_boot_select(select_pin_asserted)
    } else {
        LoadTarget::App
    }
}

/// Bind and load each of `media` in turn until one yields an entry point.
///
/// On success the loader stays bound to that medium, ready for
/// [`BootMediaLoader::boot_image`].
///
/// # Errors
/// [`BootFailure::NoEntryPoint`] if no medium produced one.
pub fn prepare_boot<P: Platform, M: PhysicalMemory>(
    loader: &mut BootMediaLoader<P, M>,
    media: &[BootMedium],
    target: LoadTarget,
) -> Result<PhysicalAddress, BootFailure> {
    for &medium in media {
        info!("Trying {medium}");
        if let Err(e) = loader.set_bootmethod(medium) {
            warn!("Cannot use {medium}: {e}");
            continue;
        }

        match loader.load_image(target) {
            Ok(report) => {
                info!(
                    "{}: {} image(s) loaded, {} skipped",
                    report.medium, report.loaded, report.skipped
                );
                if let Some(entry) = report.entry_point {
                    return Ok(entry);
                }
                warn!("No entry point on {medium}");
            }
            Err(e) => warn!("Loading from {medium} failed: {e}"),
        }
    }

    error!("FAILED!");
    Err(BootFailure::NoEntryPoint)
}

/// [`prepare_boot`], then jump. Returns only on failure.
///
/// # Safety
/// Same as [`BootMediaLoader::boot_image`].
pub unsafe fn boot<P: Platform, M: PhysicalMemory>(
    loader: &mut BootMediaLoader<P, M>,
    media: &[BootMedium],
    target: LoadTarget,
) -> BootFailure {
    match prepare_boot(loader, media, target) {
        // SAFETY: forwarded to the caller.
        Ok(_) => unsafe { loader.boot_image() },
        Err(failure) => failure,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_without_boot_select() {
        if !BOARD.use_boot_select {
            assert_eq!(boot_target(true), LoadTarget::App);
            assert_eq!(boot_target(false), LoadTarget::App);
        }
    }
}
