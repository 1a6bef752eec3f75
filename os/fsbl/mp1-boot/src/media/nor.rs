use crate::MediaAddress;
use crate::media::{BootMedia, LoadTarget, MediaError};
use log::debug;
use mp1_board::media::{NOR_FLASH_APP_OFFSET, NOR_FLASH_SSBL_OFFSET};

/// Value of an erased flash byte.
pub const ERASED: u8 = 0xFF;

/// Images in a memory-mapped QSPI NOR flash. Addresses are offsets into the
/// mapped window.
pub struct NorBackend<F> {
    flash: F,
}

impl<F: AsRef<[u8]>> NorBackend<F> {
    #[must_use]
    pub const fn new(flash: F) -> Self {
        Self { flash }
    }

    /// Flash offset of the image chain for `target`.
    #[must_use]
    pub const fn offset_for(target: LoadTarget) -> u32 {
        match target {
            LoadTarget::App => NOR_FLASH_APP_OFFSET,
            LoadTarget::SecondStageBootloader => NOR_FLASH_SSBL_OFFSET,
        }
    }
}

impl<F: AsRef<[u8]>> BootMedia for NorBackend<F> {
    fn first_header_addr(&mut self, target: LoadTarget) -> Result<MediaAddress, MediaError> {
        Ok(u64::from(Self::offset_for(target)))
    }

    fn read_image(&mut self, src: MediaAddress, dst: &mut [u8]) -> Result<(), MediaError> {
        let window = self.flash.as_ref();
        let available = usize::try_from(src)
            .ok()
            .and_then(|start| window.get(start..))
            .unwrap_or_default();

        let n = available.len().min(dst.len());
        let (mapped, past_end) = dst.split_at_mut(n);
        mapped.copy_from_slice(&available[..n]);

        if !past_end.is_empty() {
            debug!("NOR read at {src:#x}: {} bytes past the mapped window", past_end.len());
            past_end.fill(ERASED);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_follow_the_target() {
        let mut nor = NorBackend::new([0u8; 16]);
        assert_eq!(nor.first_header_addr(LoadTarget::App), Ok(0x10_0000));
        assert_eq!(nor.first_header_addr(LoadTarget::SecondStageBootloader), Ok(0x8_0000));
    }

    #[test]
    fn reads_past_the_window_are_erased() {
        let flash: [u8; 8] = [1, 2, 3, 4, 5, 6, 7, 8];
        let mut nor = NorBackend::new(flash);

        let mut buf = [0u8; 6];
        nor.read_image(5, &mut buf).expect("infallible");
        assert_eq!(buf, [6, 7, 8, ERASED, ERASED, ERASED]);

        nor.read_image(u64::MAX, &mut buf).expect("infallible");
        assert_eq!(buf, [ERASED; 6]);
    }

    #[test]
    fn erased_flash_is_not_an_image() {
        let mut nor = NorBackend::new([ERASED; 128]);
        let header = nor.read_header(0).expect("infallible");
        assert!(!header.has_magic());
    }
}
