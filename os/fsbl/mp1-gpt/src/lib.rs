//! # GUID Partition Table Reader
//!
//! Just enough GPT to find where a boot partition starts: header validation,
//! partition entry lookup, and the primary/backup fallback. Nothing is ever
//! written and the partition entry array CRC is not checked.
//!
//! ## Layout
//!
//! ```text
//! LBA 0      protective MBR (ignored)
//! LBA 1      primary GPT header (92 bytes used, rest of the block reserved)
//! LBA 2..    partition entries, 128 bytes each, 4 per 512-byte block
//! ...
//! LBA n-1    backup GPT header
//! ```
//!
//! ## Validation
//!
//! [`validate_header`] rejects a header on the first failed check, in this
//! order: signature, header size, header CRC, `my_lba`, the three LBA fields
//! against the last LBA of the disk, and finally the ChromeOS `IGNOREME`
//! signature. A rejected primary header falls back to the backup; the two are
//! never merged.
//!
//! ## Usage
//! ```rust,ignore
//! // 0-based index; the board configuration counts partitions from 1.
//! let start = mp1_gpt::locate_partition(&mut card, 3)?;
//! let byte_addr = start.to_u64() * 512;
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![forbid(unsafe_code)]

mod entry;
mod error;
mod header;
mod reader;

pub use entry::{ENTRIES_PER_BLOCK, GptAttributes, GptEntry, PartitionName, entry_location, validate_entry};
pub use error::GptError;
pub use header::{GPT_HEADER_SIZE, GPT_SIGNATURE, GptHeader, IGNOREME_SIGNATURE, validate_header};
pub use reader::{BLOCK_SIZE, find_partition_start, locate_partition};
