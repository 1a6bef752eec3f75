//! Where images live on each boot medium.

/// Byte offset of the second-stage bootloader inside the NOR flash.
pub const NOR_FLASH_SSBL_OFFSET: u32 = 0x0008_0000;

/// Byte offset of the application image chain inside the NOR flash.
pub const NOR_FLASH_APP_OFFSET: u32 = 0x0010_0000;

/// GPT partition holding the second-stage bootloader (1-based).
pub const SD_SSBL_PARTITION: u32 = 3;

/// GPT partition holding the application image chain (1-based).
pub const SD_APP_PARTITION: u32 = 4;

/// Per-read timeout handed to the SD card driver.
pub const SD_READ_TIMEOUT_MS: u32 = 2000;

/// TAMP backup register 6, used as the DDR hand-off mailbox.
pub const HEADER_MAILBOX_ADDR: u32 = 0x5C00_A118;

/// Value written to the mailbox while waiting for a host to fill it in.
pub const HEADER_MAILBOX_ARMED: u32 = 0xFFFF_FFFF;

const _: () = {
    assert!(NOR_FLASH_SSBL_OFFSET < NOR_FLASH_APP_OFFSET);
    assert!(SD_SSBL_PARTITION >= 1 && SD_APP_PARTITION >= 1);
    assert!(SD_SSBL_PARTITION != SD_APP_PARTITION);
};
