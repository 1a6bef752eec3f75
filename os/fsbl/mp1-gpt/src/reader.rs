use crate::entry::{GptEntry, entry_location, validate_entry};
use crate::{GptError, GptHeader, validate_header};
use gpt_disk_io::BlockIo;
use gpt_disk_types::{BlockSize, Lba};
use log::{debug, error, warn};
use zerocopy::FromBytes;

/// The only block size the reader handles.
pub const BLOCK_SIZE: usize = 512;

fn read_block<B: BlockIo>(io: &mut B, lba: Lba, block: &mut [u8; BLOCK_SIZE]) -> Result<(), GptError> {
    io.read_blocks(lba, block).map_err(|e| {
        error!("Block read at LBA {} failed: {e}", lba.0);
        GptError::Io(lba.0)
    })
}

/// Starting LBA of the 0-based partition `index` according to `hdr`.
///
/// # Errors
/// I/O failure reading the entry block, or an unused entry.
pub fn find_partition_start<B: BlockIo>(io: &mut B, hdr: &GptHeader, index: u32) -> Result<Lba, GptError> {
    let (lba, slot) = entry_location(hdr, index);
    let mut block = [0u8; BLOCK_SIZE];
    read_block(io, lba, &mut block)?;

    let offset = slot * size_of::<GptEntry>();
    let (entry, _) = GptEntry::read_from_prefix(&block[offset..]).map_err(|_| GptError::ShortBlock)?;
    validate_entry(&entry, index)?;
    Ok(entry.starting_lba())
}

/// Find the 0-based partition `index`, trying the primary header at LBA 1 and
/// then the backup header at the last LBA.
///
/// A candidate is used only if its header validates *and* the partition entry
/// it points to is in use; otherwise the next candidate is tried.
///
/// # Errors
/// [`GptError::UnsupportedBlockSize`] for non-512-byte devices, an I/O error
/// querying the device size, or [`GptError::NotFound`] if neither header yields
/// the partition.
pub fn locate_partition<B: BlockIo>(io: &mut B, index: u32) -> Result<Lba, GptError> {
    let block_size = io.block_size();
    if block_size != BlockSize::BS_512 {
        return Err(GptError::UnsupportedBlockSize(block_size.to_u64()));
    }

    let num_blocks = io.num_blocks().map_err(|e| {
        error!("Cannot query the number of blocks: {e}");
        GptError::Io(0)
    })?;
    let Some(last_lba) = num_blocks.checked_sub(1) else {
        return Err(GptError::NotFound);
    };

    let mut block = [0u8; BLOCK_SIZE];
    for candidate in [1, last_lba] {
        debug!("Looking for GPT header at block {candidate}");
        let found = read_block(io, Lba(candidate), &mut block)
            .and_then(|()| validate_header(&block, candidate, last_lba))
            .and_then(|hdr| find_partition_start(io, &hdr, index));

        match found {
            Ok(start) => {
                debug!("GPT at block {candidate} says partition {index} starts at block {}", start.0);
                return Ok(start);
            }
            Err(e) => warn!("GPT at block {candidate} unusable: {e}"),
        }
    }

    error!("No valid GPT header found");
    Err(GptError::NotFound)
}
