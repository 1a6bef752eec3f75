//! # Serial Console Output
//!
//! Early console for the first-stage loader: a polled UART writer, a
//! [`console_trace!`] macro for raw formatted output, and a `log::Log`
//! implementation ([`ConsoleLogger`]) that routes the `log` facade to it.
//!
//! ## Output Mechanism
//! ```text
//! log::info!() ─→ ConsoleLogger ─┐
//!                                ├─→ console_fmt::ConsoleSink ─→ UART TDR
//! console_trace!() ──────────────┘
//! ```
//!
//! ## Attaching the UART
//!
//! The sink does nothing until [`attach`] is called with the base address of a
//! clocked, configured UART. Until then, and on host builds that never attach,
//! every write is dropped. Line feeds are expanded to CR LF.
//!
//! ## Usage
//! ```rust,ignore
//! use log::{LevelFilter, info};
//! use mp1_console::{ConsoleLogger, console_trace};
//!
//! static LOGGER: ConsoleLogger = ConsoleLogger::new(LevelFilter::Info);
//!
//! unsafe { mp1_console::attach(mp1_board::BOARD.console_uart as usize) };
//! LOGGER.init().ok();
//! console_trace!("\n\nMP1-Boot\n\n");
//! info!("Loading app image");
//! ```
//!
//! ## `enabled` Feature (default)
//! Without it, [`console_trace!`] and the logger compile to nothing and no
//! register is ever touched.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod logger;

pub use logger::ConsoleLogger;

#[cfg(feature = "enabled")]
pub use console_fmt::{attach, detach};

#[cfg(feature = "enabled")]
#[doc(hidden)]
pub mod console_fmt {
    use core::fmt::{self, Write};
    use core::sync::atomic::{AtomicUsize, Ordering};
    use mp1_registers::MmioRegister;
    use mp1_registers::uart::{UartIsr, UartTdr};

    /// Base of the attached UART, zero while detached.
    static UART_BASE: AtomicUsize = AtomicUsize::new(0);

    /// Route console output to the UART at `base`.
    ///
    /// # Safety
    /// `base` must be the base address of a UART that is clocked, configured and
    /// not driven by anything else.
    pub unsafe fn attach(base: usize) {
        UART_BASE.store(base, Ordering::Release);
    }

    /// Stop writing to the UART, e.g. right before handing over control.
    pub fn detach() {
        UART_BASE.store(0, Ordering::Release);
    }

    #[must_use]
    pub fn is_attached() -> bool {
        UART_BASE.load(Ordering::Acquire) != 0
    }

    /// Write a single byte, waiting for room in the transmit FIFO.
    pub fn putc(c: u8) {
        let base = UART_BASE.load(Ordering::Acquire);
        if base == 0 {
            return;
        }

        // SAFETY: `attach` guarantees `base` points to a usable UART.
        unsafe {
            while !UartIsr::read_at(base).txfnf() {
                core::hint::spin_loop();
            }
            UartTdr::byte(c).write_at(base);
        }
    }

    pub struct ConsoleSink;

    impl Write for ConsoleSink {
        #[inline]
        fn write_str(&mut self, s: &str) -> fmt::Result {
            for b in s.bytes() {
                if b == b'\n' {
                    putc(b'\r');
                }
                putc(b);
            }
            Ok(())
        }
    }

    #[doc(hidden)]
    #[inline]
    pub fn console_write(args: fmt::Arguments) {
        // Best-effort; there is nowhere to report a failed console write.
        let _ = fmt::write(&mut ConsoleSink, args);
    }
}

#[cfg(not(feature = "enabled"))]
#[doc(hidden)]
pub mod console_fmt {
    use core::fmt;

    #[doc(hidden)]
    #[inline]
    pub fn console_write(_: fmt::Arguments) {}
}

#[macro_export]
macro_rules! console_trace {
    ($($arg:tt)*) => {{
        $crate::console_fmt::console_write(core::format_args!($($arg)*));
    }};
}

#[cfg(all(test, feature = "enabled"))]
mod tests {
    use super::console_fmt::{ConsoleSink, is_attached};
    use core::fmt::Write;

    #[test]
    fn detached_console_swallows_output() {
        assert!(!is_attached());
        assert!(write!(ConsoleSink, "value = {:#x}", 0x2705_1956_u32).is_ok());
        console_trace!("still detached: {}\n", 42);
    }
}
