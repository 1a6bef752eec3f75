use crate::MediaAddress;
use crate::media::{BootMedia, LoadTarget, MediaError};
use gpt_disk_io::BlockIo;
use gpt_disk_types::{BlockSize, Lba};
use log::{debug, error};
use mp1_board::media::{SD_APP_PARTITION, SD_SSBL_PARTITION};
use mp1_gpt::{BLOCK_SIZE, GptError};

const BLOCK_BYTES: u64 = BLOCK_SIZE as u64;

/// Images on an SD card, inside a GPT partition chosen by the board.
///
/// Byte ranges are mapped onto 512-byte block reads:
///
/// ```text
///        addr                                  addr + len
///   ┌─────┼────────┬──────────────┬──────────────┬─┼─────────┐
///   │     │ prefix │     bulk     │     bulk     │ │ tail    │
///   └─────┴────────┴──────────────┴──────────────┴───────────┘
///     temp block     straight into the destination  temp block
/// ```
///
/// The bulk part is only used when the destination is word aligned; otherwise
/// every block goes through the temporary buffer.
pub struct SdBackend<C> {
    card: C,
    num_blocks: Option<u64>,
}

impl<C: BlockIo> SdBackend<C> {
    #[must_use]
    pub const fn new(card: C) -> Self {
        Self {
            card,
            num_blocks: None,
        }
    }

    #[must_use]
    pub const fn card(&self) -> &C {
        &self.card
    }

    /// 1-based GPT partition holding the images for `target`.
    #[must_use]
    pub const fn partition_for(target: LoadTarget) -> u32 {
        match target {
            LoadTarget::App => SD_APP_PARTITION,
            LoadTarget::SecondStageBootloader => SD_SSBL_PARTITION,
        }
    }

    fn check_block_size(&self) -> Result<(), MediaError> {
        let block_size = self.card.block_size();
        if block_size == BlockSize::BS_512 {
            Ok(())
        } else {
            error!("SD card block size is {} but only 512 is supported", block_size.to_u64());
            Err(MediaError::UnsupportedBlockSize(block_size.to_u64()))
        }
    }

    fn num_blocks(&mut self) -> Result<u64, MediaError> {
        if let Some(n) = self.num_blocks {
            return Ok(n);
        }
        let n = self.card.num_blocks().map_err(|e| {
            error!("Cannot query the SD card size: {e}");
            MediaError::ReadFailed { addr: 0, len: 0 }
        })?;
        self.num_blocks = Some(n);
        Ok(n)
    }

    /// Read whole blocks starting at `lba`. Blocks past the end of the card
    /// come back as zeros.
    fn read_blocks(&mut self, lba: u64, buf: &mut [u8], num_blocks: u64) -> Result<(), MediaError> {
        let wanted = buf.len() / BLOCK_SIZE;
        let present = usize::try_from(num_blocks.saturating_sub(lba)).map_or(wanted, |n| n.min(wanted));
        let (on_card, past_end) = buf.split_at_mut(present * BLOCK_SIZE);

        let len = on_card.len();
        if len != 0 {
            self.card.read_blocks(Lba(lba), on_card).map_err(|e| {
                error!("HAL read of {present} block(s) at {lba} failed: {e}");
                MediaError::ReadFailed {
                    addr: lba.saturating_mul(BLOCK_BYTES),
                    len,
                }
            })?;
        }

        if !past_end.is_empty() {
            debug!("{} block(s) past the end of the card read as zeros", past_end.len() / BLOCK_SIZE);
            past_end.fill(0);
        }
        Ok(())
    }
}

impl<C: BlockIo> BootMedia for SdBackend<C> {
    fn first_header_addr(&mut self, target: LoadTarget) -> Result<MediaAddress, MediaError> {
        self.check_block_size()?;

        let partition = Self::partition_for(target);
        let start = mp1_gpt::locate_partition(&mut self.card, partition.saturating_sub(1)).map_err(|e| match e {
            GptError::UnsupportedBlockSize(size) => MediaError::UnsupportedBlockSize(size),
            other => {
                error!("No valid GPT header found");
                MediaError::NoBootPartition(other)
            }
        })?;

        debug!("GPT partition header says partition {partition} is at block {}", start.0);
        start
            .0
            .checked_mul(BLOCK_BYTES)
            .ok_or(MediaError::AddressOutOfRange(start.0))
    }

    fn read_image(&mut self, src: MediaAddress, dst: &mut [u8]) -> Result<(), MediaError> {
        self.check_block_size()?;
        let num_blocks = self.num_blocks()?;

        debug!("SD read from {src:#x} for {}B", dst.len());

        let mut lba = src / BLOCK_BYTES;
        let offset = usize::try_from(src % BLOCK_BYTES).map_err(|_| MediaError::AddressOutOfRange(src))?;
        let mut block = [0u8; BLOCK_SIZE];
        let mut rest = dst;

        if offset != 0 {
            let keep = (BLOCK_SIZE - offset).min(rest.len());
            debug!("Read a block, drop first {offset} bytes, keep {keep}");
            self.read_blocks(lba, &mut block, num_blocks)?;

            let (head, tail) = core::mem::take(&mut rest).split_at_mut(keep);
            head.copy_from_slice(&block[offset..offset + keep]);
            rest = tail;
            lba += 1;
        }

        if rest.len() >= BLOCK_SIZE && rest.as_ptr().cast::<u32>().is_aligned() {
            let whole = rest.len() / BLOCK_SIZE;
            debug!("Reading {whole} block(s) aligned");

            let (head, tail) = core::mem::take(&mut rest).split_at_mut(whole * BLOCK_SIZE);
            self.read_blocks(lba, head, num_blocks)?;
            rest = tail;
            lba += whole as u64;
        }

        while !rest.is_empty() {
            let n = rest.len().min(BLOCK_SIZE);
            debug!("{}B remain, reading one block into the temporary buffer", rest.len());
            self.read_blocks(lba, &mut block, num_blocks)?;

            let (head, tail) = core::mem::take(&mut rest).split_at_mut(n);
            head.copy_from_slice(&block[..n]);
            rest = tail;
            lba += 1;
        }

        Ok(())
    }
}
