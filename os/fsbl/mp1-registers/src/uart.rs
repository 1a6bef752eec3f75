//! USART/UART registers needed for polled console output.
//!
//! The UART instance depends on the board, so these registers are addressed
//! relative to a base passed at runtime.

use crate::mmio_bitfield;
use bitfield_struct::bitfield;

/// `USART_ISR`: interrupt and status register (FIFO mode layout).
#[bitfield(u32, order = Lsb)]
#[derive(Eq, PartialEq)]
pub struct UartIsr {
    /// Bit 0: PE: parity error.
    pub pe: bool,
    /// Bit 1: FE: framing error.
    pub fe: bool,
    /// Bit 2: NE: noise detected.
    pub ne: bool,
    /// Bit 3: ORE: overrun error.
    pub ore: bool,
    /// Bit 4: IDLE: idle line detected.
    pub idle: bool,
    /// Bit 5: RXFNE: receive FIFO not empty.
    pub rxfne: bool,
    /// Bit 6: TC: transmission complete.
    pub tc: bool,
    /// Bit 7: TXFNF: transmit FIFO not full (TXE without FIFO).
    pub txfnf: bool,
    /// Bits 8–31: status bits the loader does not use.
    #[bits(24, access = RO)]
    pub other: u32,
}

mmio_bitfield!(UartIsr, offset = 0x1C);

/// `USART_TDR`: transmit data register.
#[bitfield(u32, order = Lsb)]
#[derive(Eq, PartialEq)]
pub struct UartTdr {
    /// Bits 0–8: TDR: data to transmit.
    #[bits(9)]
    pub data: u16,
    /// Bits 9–31: Reserved.
    #[bits(23, access = RO)]
    pub reserved: u32,
}

mmio_bitfield!(UartTdr, offset = 0x28);

impl UartTdr {
    #[must_use]
    pub fn byte(b: u8) -> Self {
        Self::new().with_data(u16::from(b))
    }
}
