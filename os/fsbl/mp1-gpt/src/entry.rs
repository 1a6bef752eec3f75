use crate::{GptError, GptHeader};
use bitfield_struct::bitfield;
use core::fmt;
use gpt_disk_types::{Guid, Lba};
use log::info;
use zerocopy::byteorder::{LittleEndian, U16, U64};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

/// Partition entries per 512-byte block.
pub const ENTRIES_PER_BLOCK: u32 = 4;

const NAME_UNITS: usize = 36;

/// On-disk partition entry (128 bytes).
#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct GptEntry {
    pub partition_type_guid: [u8; 16],
    pub unique_partition_guid: [u8; 16],
    pub starting_lba: U64<LittleEndian>,
    pub ending_lba: U64<LittleEndian>,
    pub attributes: U64<LittleEndian>,
    /// UTF-16LE, NUL padded.
    pub partition_name: [U16<LittleEndian>; NAME_UNITS],
}

const _: () = assert!(size_of::<GptEntry>() == 128);
const _: () = assert!(size_of::<GptEntry>() * ENTRIES_PER_BLOCK as usize == 512);

/// Partition entry attribute bits.
#[bitfield(u64, order = Lsb)]
#[derive(Eq, PartialEq)]
pub struct GptAttributes {
    /// Bit 0: required for the platform to function.
    pub required: bool,

    /// Bit 1: firmware must not produce a block I/O protocol for it.
    pub no_block_io: bool,

    /// Bit 2: legacy BIOS bootable.
    pub legacy_bios_bootable: bool,

    /// Bits 3–47: Reserved.
    #[bits(45)]
    pub reserved: u64,

    /// Bits 48–63: partition type specific.
    #[bits(16)]
    pub type_specific: u16,
}

impl GptEntry {
    #[must_use]
    pub const fn type_guid(&self) -> Guid {
        Guid::from_bytes(self.partition_type_guid)
    }

    #[must_use]
    pub const fn unique_guid(&self) -> Guid {
        Guid::from_bytes(self.unique_partition_guid)
    }

    #[must_use]
    pub fn starting_lba(&self) -> Lba {
        Lba(self.starting_lba.get())
    }

    #[must_use]
    pub fn attribute_bits(&self) -> GptAttributes {
        GptAttributes::from_bits(self.attributes.get())
    }

    #[must_use]
    pub const fn name(&self) -> PartitionName<'_> {
        PartitionName(&self.partition_name)
    }

    #[must_use]
    pub fn is_unused(&self) -> bool {
        self.partition_type_guid.iter().all(|&b| b == 0)
    }
}

/// Display adapter decoding the UTF-16 partition name up to the first NUL.
pub struct PartitionName<'a>(&'a [U16<LittleEndian>; NAME_UNITS]);

impl fmt::Display for PartitionName<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let units = self.0.iter().map(|u| u.get()).take_while(|&u| u != 0);
        for c in char::decode_utf16(units) {
            fmt::Write::write_char(f, c.unwrap_or(char::REPLACEMENT_CHARACTER))?;
        }
        Ok(())
    }
}

/// Block and slot holding the 0-based partition `index`.
#[must_use]
pub fn entry_location(hdr: &GptHeader, index: u32) -> (Lba, usize) {
    let lba = hdr.partition_entry_lba.get() + u64::from(index / ENTRIES_PER_BLOCK);
    let slot = (index % ENTRIES_PER_BLOCK) as usize;
    (Lba(lba), slot)
}

/// Accept any entry with a non-zero type GUID. Entries carry no CRC of their own.
///
/// # Errors
/// [`GptError::UnusedEntry`] for an all-zero type GUID.
pub fn validate_entry(entry: &GptEntry, index: u32) -> Result<(), GptError> {
    if entry.is_unused() {
        info!("Invalid GUID (all zeroes) found on partition entry {index}. Skipping");
        return Err(GptError::UnusedEntry(index));
    }

    info!(
        "partition {}: type {} unique {} LBA {}..={} attributes {:#018x} name \"{}\"",
        index,
        entry.type_guid(),
        entry.unique_guid(),
        entry.starting_lba.get(),
        entry.ending_lba.get(),
        entry.attributes.get(),
        entry.name()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::header::tests::sample_block;
    use std::string::ToString;

    fn entry(type_byte: u8, start: u64, name: &str) -> GptEntry {
        let mut partition_name = [U16::ZERO; NAME_UNITS];
        for (slot, unit) in partition_name.iter_mut().zip(name.encode_utf16()) {
            *slot = U16::new(unit);
        }
        GptEntry {
            partition_type_guid: [type_byte; 16],
            unique_partition_guid: [0xA5; 16],
            starting_lba: U64::new(start),
            ending_lba: U64::new(start + 0x7FF),
            attributes: U64::new(GptAttributes::new().with_legacy_bios_bootable(true).into_bits()),
            partition_name,
        }
    }

    #[test]
    fn location_of_index() {
        let hdr = crate::validate_header(&sample_block(1), 1, 999).expect("valid");
        assert_eq!(entry_location(&hdr, 0), (Lba(2), 0));
        assert_eq!(entry_location(&hdr, 3), (Lba(2), 3));
        assert_eq!(entry_location(&hdr, 4), (Lba(3), 0));
        assert_eq!(entry_location(&hdr, 9), (Lba(4), 1));
    }

    #[test]
    fn zero_type_guid_is_unused() {
        assert_eq!(validate_entry(&entry(0, 40, "x"), 2), Err(GptError::UnusedEntry(2)));
        assert_eq!(validate_entry(&entry(0x3F, 40, "ssbl"), 2), Ok(()));
    }

    #[test]
    fn name_decodes_utf16() {
        let e = entry(1, 34, "fsbl1");
        assert_eq!(e.name().to_string(), "fsbl1");
        assert_eq!(e.starting_lba(), Lba(34));
        assert!(e.attribute_bits().legacy_bios_bootable());
        assert_eq!(e.attributes.get(), 1 << 2);
    }

    #[test]
    fn attributes_layout() {
        let attrs = GptAttributes::from_bits(0xBEEF_0000_0000_0001);
        assert!(attrs.required());
        assert!(!attrs.no_block_io());
        assert_eq!(attrs.type_specific(), 0xBEEF);
    }
}
