#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum GptError {
    #[error("block too short to hold a GPT header")]
    ShortBlock,
    #[error("GPT header signature is wrong: {0:#018x}")]
    BadSignature(u64),
    #[error("GPT header size {0} is out of range")]
    BadHeaderSize(u32),
    #[error("GPT header CRC is wrong: stored {stored:#010x}, computed {computed:#010x}")]
    CrcMismatch { stored: u32, computed: u32 },
    #[error("GPT my_lba incorrect: {found} != {expected}")]
    LbaMismatch { found: u64, expected: u64 },
    #[error("GPT {field} {value} is past the last LBA {last_lba}")]
    LbaOutOfRange {
        field: &'static str,
        value: u64,
        last_lba: u64,
    },
    #[error("ChromeOS 'IGNOREME' GPT header found and ignored")]
    Ignored,
    #[error("partition entry {0} is unused (all-zero type GUID)")]
    UnusedEntry(u32),
    #[error("block size {0} is not supported, only 512")]
    UnsupportedBlockSize(u64),
    #[error("block device read failed at LBA {0}")]
    Io(u64),
    #[error("no valid GPT header with the requested partition found")]
    NotFound,
}
