//! # Board Configuration
//!
//! Compile-time description of the board the loader is built for. Everything
//! that differs between the supported boards, and everything the boot media
//! backends need to find images, lives here as `const` data.
//!
//! ## Board Selection
//!
//! Exactly one preset is active, chosen with Cargo features:
//!
//! | Feature | Board |
//! |---------|-------|
//! | `board-dk2` (default) | STM32MP157 Discovery kit |
//! | `board-osd32` | Octavo OSD32MP1-BRK |
//!
//! `board-osd32` wins if both are enabled, so a dependent crate can turn it on
//! without disabling default features.
//!
//! ## Modules
//!
//! * [`memory`]: the writable memory map (RETRAM, SRAM, DDR) and the
//!   [`RegionValidator`](mp1_memory::RegionValidator) built from it.
//! * [`media`]: where images live on each boot medium (NOR offsets, SD
//!   partition numbers, the DDR hand-off register).
//!
//! ## Memory Map
//!
//! ```text
//! 0x3000_0000 ┌──────────────────────┐
//!             │ SRAM1..4 (384 KiB)   │
//! 0x3006_0000 ├──────────────────────┤
//!             │        ...           │
//! 0x3800_0000 ├──────────────────────┤
//!             │ RETRAM (64 KiB)      │
//! 0x3801_0000 ├──────────────────────┤
//!             │        ...           │
//! 0xC000_0000 ├──────────────────────┤
//!             │ DDR (up to 512 MiB)  │
//! 0xE000_0000 └──────────────────────┘
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![deny(unsafe_code)]

pub mod media;
pub mod memory;

/// Static facts about one board.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct BoardConfig {
    /// Human readable board name, printed in the boot banner.
    pub name: &'static str,
    /// Base address of the UART used for the console.
    pub console_uart: u32,
    /// Whether the boot-select pin is sampled to choose the SSBL over the app.
    pub use_boot_select: bool,
}

/// UART4, the console on both supported boards.
pub const UART4_BASE: u32 = 0x4001_0000;

#[cfg(not(feature = "board-osd32"))]
pub const BOARD: BoardConfig = BoardConfig {
    name: "STM32MP157 Discovery (DK2)",
    console_uart: UART4_BASE,
    use_boot_select: false,
};

#[cfg(feature = "board-osd32")]
pub const BOARD: BoardConfig = BoardConfig {
    name: "OSD32MP1-BRK",
    console_uart: UART4_BASE,
    use_boot_select: false,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn console_is_uart4() {
        assert_eq!(BOARD.console_uart, 0x4001_0000);
    }

    #[test]
    #[cfg(not(feature = "board-osd32"))]
    fn discovery_preset() {
        assert_eq!(BOARD.name, "STM32MP157 Discovery (DK2)");
        assert!(!BOARD.use_boot_select);
    }

    #[test]
    #[cfg(feature = "board-osd32")]
    fn osd32_preset() {
        assert_eq!(BOARD.name, "OSD32MP1-BRK");
        assert!(!BOARD.use_boot_select);
    }
}
