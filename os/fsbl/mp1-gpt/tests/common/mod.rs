//! In-memory disks with hand-built GUID partition tables.

use core::fmt;
use gpt_disk_io::BlockIo;
use gpt_disk_types::{BlockSize, Lba};
use mp1_gpt::{BLOCK_SIZE, GPT_HEADER_SIZE, GPT_SIGNATURE, GptEntry, GptHeader};
use zerocopy::IntoBytes;
use zerocopy::byteorder::{U16, U32, U64};

#[derive(Debug, Clone, Copy)]
pub struct DiskError;

impl fmt::Display for DiskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("memory disk I/O error")
    }
}

/// Block device over a `Vec`, recording every block it is asked for.
pub struct MemoryDisk {
    pub data: Vec<u8>,
    pub block_size: BlockSize,
    pub reads: Vec<u64>,
}

impl BlockIo for MemoryDisk {
    type Error = DiskError;

    fn block_size(&self) -> BlockSize {
        self.block_size
    }

    fn num_blocks(&mut self) -> Result<u64, Self::Error> {
        Ok((self.data.len() / BLOCK_SIZE) as u64)
    }

    fn read_blocks(&mut self, start_lba: Lba, dst: &mut [u8]) -> Result<(), Self::Error> {
        let count = dst.len() / BLOCK_SIZE;
        self.reads.extend((0..count as u64).map(|i| start_lba.0 + i));
        let offset = start_lba.0 as usize * BLOCK_SIZE;
        let src = self.data.get(offset..offset + dst.len()).ok_or(DiskError)?;
        dst.copy_from_slice(src);
        Ok(())
    }

    fn write_blocks(&mut self, _start_lba: Lba, _src: &[u8]) -> Result<(), Self::Error> {
        Err(DiskError)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Which copy of the table an operation applies to.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Table {
    Primary,
    Backup,
}

pub struct DiskBuilder {
    data: Vec<u8>,
    num_blocks: u64,
}

impl DiskBuilder {
    pub fn new(num_blocks: u64) -> Self {
        Self {
            data: vec![0; num_blocks as usize * BLOCK_SIZE],
            num_blocks,
        }
    }

    fn header_lba(&self, table: Table) -> u64 {
        match table {
            Table::Primary => 1,
            Table::Backup => self.num_blocks - 1,
        }
    }

    fn entries_lba(&self, table: Table) -> u64 {
        match table {
            Table::Primary => 2,
            Table::Backup => self.num_blocks - 33,
        }
    }

    fn block_mut(&mut self, lba: u64) -> &mut [u8] {
        let offset = lba as usize * BLOCK_SIZE;
        &mut self.data[offset..offset + BLOCK_SIZE]
    }

    /// Write a valid header for `table`.
    pub fn header(mut self, table: Table) -> Self {
        let my_lba = self.header_lba(table);
        let alternate = match table {
            Table::Primary => self.header_lba(Table::Backup),
            Table::Backup => 1,
        };
        let mut hdr = GptHeader {
            signature: U64::new(GPT_SIGNATURE),
            revision: U32::new(0x0001_0000),
            header_size: U32::new(GPT_HEADER_SIZE as u32),
            header_crc32: U32::ZERO,
            reserved1: U32::ZERO,
            my_lba: U64::new(my_lba),
            alternate_lba: U64::new(alternate),
            first_usable_lba: U64::new(34),
            last_usable_lba: U64::new(self.num_blocks - 34),
            disk_guid: [0x42; 16],
            partition_entry_lba: U64::new(self.entries_lba(table)),
            num_partition_entries: U32::new(128),
            sizeof_partition_entry: U32::new(128),
            partition_entry_array_crc32: U32::ZERO,
        };
        hdr.header_crc32 = U32::new(mp1_crc32::crc32(hdr.as_bytes()));
        self.block_mut(my_lba)[..GPT_HEADER_SIZE].copy_from_slice(hdr.as_bytes());
        self
    }

    /// Add the 0-based partition `index` to `table`.
    pub fn partition(mut self, table: Table, index: u32, start: u64, name: &str) -> Self {
        let mut partition_name = [U16::ZERO; 36];
        for (slot, unit) in partition_name.iter_mut().zip(name.encode_utf16()) {
            *slot = U16::new(unit);
        }
        let entry = GptEntry {
            partition_type_guid: [0xAF; 16],
            unique_partition_guid: [index as u8 + 1; 16],
            starting_lba: U64::new(start),
            ending_lba: U64::new(start + 0xFFF),
            attributes: U64::ZERO,
            partition_name,
        };
        let lba = self.entries_lba(table) + u64::from(index / 4);
        let slot = (index % 4) as usize * 128;
        self.block_mut(lba)[slot..slot + 128].copy_from_slice(entry.as_bytes());
        self
    }

    /// Flip bits at `offset` within block `lba`.
    pub fn corrupt(mut self, lba: u64, offset: usize) -> Self {
        self.block_mut(lba)[offset] ^= 0xFF;
        self
    }

    pub fn build(self) -> MemoryDisk {
        MemoryDisk {
            data: self.data,
            block_size: BlockSize::BS_512,
            reads: Vec::new(),
        }
    }
}
