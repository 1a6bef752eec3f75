use crate::MediaAddress;
use crate::media::{BootMedia, HeaderMailbox, LoadTarget, MediaError};
use log::{debug, info};
use mp1_board::media::HEADER_MAILBOX_ARMED;
use mp1_console::console_trace;
use mp1_memory::{PhysicalAddress, PhysicalMemory};
use mp1_registers::pwr::PwrCr1;
use mp1_registers::tamp::{TampBkp6, TampSmcr};
use mp1_registers::{FixedMmioRegister, LoadRegisterUnsafe, StoreRegisterUnsafe};

/// Images pre-staged in RAM by a host or debugger.
///
/// There is nothing to look up: [`first_header_addr`](BootMedia::first_header_addr)
/// waits until someone writes the chain's address into the mailbox. This is
/// the only wait in the loader without a bound.
pub struct DdrBackend<M, X> {
    memory: M,
    mailbox: X,
}

impl<M: PhysicalMemory, X: HeaderMailbox> DdrBackend<M, X> {
    #[must_use]
    pub const fn new(memory: M, mailbox: X) -> Self {
        Self { memory, mailbox }
    }

    fn byte_at(&self, addr: MediaAddress) -> u8 {
        u32::try_from(addr)
            .ok()
            .and_then(|a| self.memory.window(PhysicalAddress::new(a), 1))
            .and_then(|w| w.first().copied())
            .unwrap_or(0)
    }
}

impl<M: PhysicalMemory, X: HeaderMailbox> BootMedia for DdrBackend<M, X> {
    fn first_header_addr(&mut self, _target: LoadTarget) -> Result<MediaAddress, MediaError> {
        self.mailbox.arm();

        console_trace!("Please load a multi-uimg binary into an address in DDR RAM.\n");
        console_trace!(
            "Then write the address to the TAMP_BKP6 register at {:#010x}\n",
            self.mailbox.register_address()
        );
        console_trace!("System will hang until TAMP_BKP6 register is changed...\n");

        loop {
            if let Some(addr) = self.mailbox.poll() {
                info!("Header address {addr:#010x} received");
                return Ok(MediaAddress::from(addr));
            }
            core::hint::spin_loop();
        }
    }

    fn read_image(&mut self, src: MediaAddress, dst: &mut [u8]) -> Result<(), MediaError> {
        let window = u32::try_from(src)
            .ok()
            .and_then(|a| self.memory.window(PhysicalAddress::new(a), dst.len()));

        if let Some(window) = window {
            dst.copy_from_slice(window);
            return Ok(());
        }

        debug!("DDR read at {src:#x} leaves known memory, missing bytes read as zeros");
        for (i, byte) in dst.iter_mut().enumerate() {
            *byte = src.checked_add(i as u64).map_or(0, |a| self.byte_at(a));
        }
        Ok(())
    }
}

/// TAMP backup register 6 as the DDR hand-off mailbox.
pub struct TampMailbox(());

impl TampMailbox {
    /// # Safety
    /// The PWR and TAMP blocks must be clocked, and nothing else may use
    /// backup register 6 while the mailbox exists.
    #[must_use]
    pub const unsafe fn new() -> Self {
        Self(())
    }

    /// Allow writes to the backup registers. The boot ROM leaves them write
    /// protected.
    fn unlock_backup_registers() {
        // SAFETY: see `TampMailbox::new`.
        unsafe {
            PwrCr1::load_unsafe().with_dbp(true).store_unsafe();
            while !PwrCr1::load_unsafe().dbp() {
                core::hint::spin_loop();
            }
            TampSmcr::unprotected().store_unsafe();
        }
    }
}

impl HeaderMailbox for TampMailbox {
    fn arm(&mut self) {
        Self::unlock_backup_registers();
        // SAFETY: backup domain unlocked above.
        unsafe { TampBkp6(HEADER_MAILBOX_ARMED).store_unsafe() };
    }

    fn poll(&mut self) -> Option<u32> {
        // SAFETY: see `TampMailbox::new`.
        let TampBkp6(value) = unsafe { TampBkp6::load_unsafe() };
        (value != HEADER_MAILBOX_ARMED).then_some(value)
    }

    fn register_address(&self) -> u32 {
        mp1_board::media::HEADER_MAILBOX_ADDR
    }
}

const _: () = assert!(TampBkp6::ADDRESS == mp1_board::media::HEADER_MAILBOX_ADDR as usize);

#[cfg(test)]
mod tests {
    use super::*;

    /// One 256-byte bank at 0xC000_0000.
    struct Bank([u8; 256]);

    impl PhysicalMemory for Bank {
        fn window(&self, addr: PhysicalAddress, len: usize) -> Option<&[u8]> {
            let start = usize::try_from(addr.as_u32().checked_sub(0xC000_0000)?).ok()?;
            self.0.get(start..start.checked_add(len)?)
        }

        fn window_mut(&mut self, addr: PhysicalAddress, len: usize) -> Option<&mut [u8]> {
            let start = usize::try_from(addr.as_u32().checked_sub(0xC000_0000)?).ok()?;
            self.0.get_mut(start..start.checked_add(len)?)
        }
    }

    struct Answer(Option<u32>, u32);

    impl HeaderMailbox for Answer {
        fn arm(&mut self) {}

        fn poll(&mut self) -> Option<u32> {
            if self.1 == 0 {
                self.0
            } else {
                self.1 -= 1;
                None
            }
        }

        fn register_address(&self) -> u32 {
            0x5C00_A118
        }
    }

    fn bank() -> Bank {
        let mut bytes = [0u8; 256];
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = u8::try_from(i).expect("fits");
        }
        Bank(bytes)
    }

    #[test]
    fn waits_for_the_mailbox() {
        let mut ddr = DdrBackend::new(bank(), Answer(Some(0xC000_0040), 3));
        assert_eq!(ddr.first_header_addr(LoadTarget::App), Ok(0xC000_0040));
    }

    #[test]
    fn reads_inside_memory_are_copied() {
        let mut ddr = DdrBackend::new(bank(), Answer(None, 0));
        let mut buf = [0u8; 4];
        ddr.read_image(0xC000_0010, &mut buf).expect("infallible");
        assert_eq!(buf, [0x10, 0x11, 0x12, 0x13]);
    }

    #[test]
    fn reads_outside_memory_are_zero() {
        let mut ddr = DdrBackend::new(bank(), Answer(None, 0));
        let mut buf = [0xAAu8; 4];
        ddr.read_image(0xC000_00FE, &mut buf).expect("infallible");
        assert_eq!(buf, [0xFE, 0xFF, 0, 0]);

        ddr.read_image(0x1_0000_0000, &mut buf).expect("infallible");
        assert_eq!(buf, [0; 4]);
    }
}
