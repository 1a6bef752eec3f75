use crate::GptError;
use log::{debug, info};
use zerocopy::byteorder::{LittleEndian, U32, U64};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

/// `"EFI PART"` read as a little-endian `u64`.
pub const GPT_SIGNATURE: u64 = 0x5452_4150_2049_4645;

/// `"IGNOREME"` read as a little-endian `u64` (ChromeOS).
pub const IGNOREME_SIGNATURE: u64 = 0x454D_4552_4F4E_4749;

/// Bytes of the header covered by revision 1.0.
pub const GPT_HEADER_SIZE: usize = 92;

const MAX_HEADER_SIZE: usize = 512;

/// Byte range of `header_crc32` inside the header.
const CRC_FIELD: core::ops::Range<usize> = 16..20;

/// On-disk GPT header, all fields little-endian.
#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct GptHeader {
    pub signature: U64<LittleEndian>,
    pub revision: U32<LittleEndian>,
    pub header_size: U32<LittleEndian>,
    pub header_crc32: U32<LittleEndian>,
    pub reserved1: U32<LittleEndian>,
    pub my_lba: U64<LittleEndian>,
    pub alternate_lba: U64<LittleEndian>,
    pub first_usable_lba: U64<LittleEndian>,
    pub last_usable_lba: U64<LittleEndian>,
    pub disk_guid: [u8; 16],
    pub partition_entry_lba: U64<LittleEndian>,
    pub num_partition_entries: U32<LittleEndian>,
    pub sizeof_partition_entry: U32<LittleEndian>,
    pub partition_entry_array_crc32: U32<LittleEndian>,
}

const _: () = assert!(size_of::<GptHeader>() == GPT_HEADER_SIZE);

/// Validate the GPT header stored at the start of `block`, read from `lba`.
///
/// The CRC is computed over `header_size` bytes of `block` with the CRC field
/// taken as zero; `block` itself is not modified.
///
/// # Errors
/// The first failed check, see the crate documentation for the order.
pub fn validate_header(block: &[u8], lba: u64, last_lba: u64) -> Result<GptHeader, GptError> {
    let (hdr, _) = GptHeader::read_from_prefix(block).map_err(|_| GptError::ShortBlock)?;

    let signature = hdr.signature.get();
    if signature != GPT_SIGNATURE {
        return Err(GptError::BadSignature(signature));
    }

    let header_size = hdr.header_size.get();
    let covered = usize::try_from(header_size).map_err(|_| GptError::BadHeaderSize(header_size))?;
    if !(GPT_HEADER_SIZE..=MAX_HEADER_SIZE).contains(&covered) || covered > block.len() {
        return Err(GptError::BadHeaderSize(header_size));
    }

    let mut crc = mp1_crc32::Crc32::new();
    crc.update(&block[..CRC_FIELD.start]);
    crc.update_zeros(CRC_FIELD.len());
    crc.update(&block[CRC_FIELD.end..covered]);
    let computed = crc.finish();
    let stored = hdr.header_crc32.get();
    if computed != stored {
        return Err(GptError::CrcMismatch { stored, computed });
    }

    let my_lba = hdr.my_lba.get();
    if my_lba != lba {
        return Err(GptError::LbaMismatch {
            found: my_lba,
            expected: lba,
        });
    }

    for (field, value) in [
        ("first_usable_lba", hdr.first_usable_lba.get()),
        ("last_usable_lba", hdr.last_usable_lba.get()),
        ("partition_entry_lba", hdr.partition_entry_lba.get()),
    ] {
        if value > last_lba {
            return Err(GptError::LbaOutOfRange {
                field,
                value,
                last_lba,
            });
        }
    }

    // Unreachable while only "EFI PART" passes the signature check.
    if signature == IGNOREME_SIGNATURE {
        return Err(GptError::Ignored);
    }

    info!(
        "GPT: first_usable_lba: {} last_usable_lba: {} last lba: {}",
        hdr.first_usable_lba.get(),
        hdr.last_usable_lba.get(),
        last_lba
    );
    debug!(
        "GPT header: revision {:#010x}, size {}, crc {:#010x}, my_lba {}, alternate_lba {}, disk {}",
        hdr.revision.get(),
        header_size,
        stored,
        my_lba,
        hdr.alternate_lba.get(),
        gpt_disk_types::Guid::from_bytes(hdr.disk_guid)
    );
    debug!(
        "GPT entries: lba {}, count {}, entry size {}, array crc {:#010x}",
        hdr.partition_entry_lba.get(),
        hdr.num_partition_entries.get(),
        hdr.sizeof_partition_entry.get(),
        hdr.partition_entry_array_crc32.get()
    );

    Ok(hdr)
}
