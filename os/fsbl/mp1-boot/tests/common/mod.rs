//! Fakes for the hardware the loader talks to: an SD card, physical memory,
//! the DDR mailbox and a platform handing them out.

#![allow(dead_code)]

use core::fmt;
use gpt_disk_io::BlockIo;
use gpt_disk_types::{BlockSize, Lba};
use mp1_boot::{BootMedium, HeaderMailbox, Platform, PlatformError};
use mp1_gpt::{BLOCK_SIZE, GPT_HEADER_SIZE, GPT_SIGNATURE, GptEntry, GptHeader};
use mp1_memory::{PhysicalAddress, PhysicalMemory};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use uimage_abi::{IH_ARCH_ARM, IH_OS_FIRMWARE, ImageHeader, ImageParams};
use zerocopy::IntoBytes;
use zerocopy::byteorder::{U16, U32, U64};

/// A uImage: header followed by `body`.
pub fn image(name: &str, load_addr: u32, entry_point: u32, image_type: u8, body: &[u8]) -> Vec<u8> {
    let params = ImageParams {
        name,
        load_addr,
        entry_point,
        image_type,
        os: IH_OS_FIRMWARE,
        arch: IH_ARCH_ARM,
        timestamp: 0x6500_0000,
    };
    let header = ImageHeader::wrap(&params, body).expect("body fits");
    let mut bytes = header.as_bytes().to_vec();
    bytes.extend_from_slice(body);
    bytes
}

/// `len` bytes of a recognizable pattern.
pub fn pattern(seed: u8, len: usize) -> Vec<u8> {
    (0..len).map(|i| seed.wrapping_add((i % 251) as u8)).collect()
}

/// Physical memory made of a few separate banks.
#[derive(Clone, Default)]
pub struct FakeMemory {
    banks: Vec<(u32, Vec<u8>)>,
}

impl FakeMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a zero-filled bank.
    pub fn bank(self, base: u32, len: usize) -> Self {
        self.bank_with(base, vec![0; len])
    }

    pub fn bank_with(mut self, base: u32, bytes: Vec<u8>) -> Self {
        self.banks.push((base, bytes));
        self
    }

    fn locate(&self, addr: PhysicalAddress, len: usize) -> Option<(usize, usize)> {
        self.banks.iter().enumerate().find_map(|(i, (base, bytes))| {
            let offset = usize::try_from(addr.as_u32().checked_sub(*base)?).ok()?;
            (offset.checked_add(len)? <= bytes.len()).then_some((i, offset))
        })
    }

    /// Bytes at `addr`; panics if they are not backed.
    pub fn read(&self, addr: u32, len: usize) -> &[u8] {
        self.window(PhysicalAddress::new(addr), len).expect("address is backed")
    }
}

impl PhysicalMemory for FakeMemory {
    fn window(&self, addr: PhysicalAddress, len: usize) -> Option<&[u8]> {
        let (bank, offset) = self.locate(addr, len)?;
        Some(&self.banks[bank].1[offset..offset + len])
    }

    fn window_mut(&mut self, addr: PhysicalAddress, len: usize) -> Option<&mut [u8]> {
        let (bank, offset) = self.locate(addr, len)?;
        Some(&mut self.banks[bank].1[offset..offset + len])
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CardError;

impl fmt::Display for CardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("card read timed out")
    }
}

pub struct Card {
    pub data: Vec<u8>,
    pub block_size: BlockSize,
    pub reads: Vec<u64>,
    /// Reads touching this block fail.
    pub bad_block: Option<u64>,
}

/// An SD card the test keeps a handle to after giving it to the loader.
#[derive(Clone)]
pub struct SharedCard(pub Rc<RefCell<Card>>);

impl SharedCard {
    pub fn new(data: Vec<u8>) -> Self {
        Self(Rc::new(RefCell::new(Card {
            data,
            block_size: BlockSize::BS_512,
            reads: Vec::new(),
            bad_block: None,
        })))
    }

    pub fn reads(&self) -> Vec<u64> {
        self.0.borrow().reads.clone()
    }

    pub fn clear_reads(&self) {
        self.0.borrow_mut().reads.clear();
    }
}

impl BlockIo for SharedCard {
    type Error = CardError;

    fn block_size(&self) -> BlockSize {
        self.0.borrow().block_size
    }

    fn num_blocks(&mut self) -> Result<u64, Self::Error> {
        Ok((self.0.borrow().data.len() / BLOCK_SIZE) as u64)
    }

    fn read_blocks(&mut self, start_lba: Lba, dst: &mut [u8]) -> Result<(), Self::Error> {
        let mut card = self.0.borrow_mut();
        let count = (dst.len() / BLOCK_SIZE) as u64;
        let blocks = start_lba.0..start_lba.0 + count;
        card.reads.extend(blocks.clone());
        if card.bad_block.is_some_and(|bad| blocks.contains(&bad)) {
            return Err(CardError);
        }

        let offset = start_lba.0 as usize * BLOCK_SIZE;
        let src = card.data.get(offset..offset + dst.len()).ok_or(CardError)?;
        dst.copy_from_slice(src);
        Ok(())
    }

    fn write_blocks(&mut self, _start_lba: Lba, _src: &[u8]) -> Result<(), Self::Error> {
        Err(CardError)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// A card of `num_blocks` blocks with a primary GPT whose 0-based entry
/// `index` starts at `start_lba`, and `payload` written at that block.
pub fn gpt_card(num_blocks: u64, index: u32, start_lba: u64, payload: &[u8]) -> Vec<u8> {
    let mut data = vec![0u8; num_blocks as usize * BLOCK_SIZE];

    let mut hdr = GptHeader {
        signature: U64::new(GPT_SIGNATURE),
        revision: U32::new(0x0001_0000),
        header_size: U32::new(GPT_HEADER_SIZE as u32),
        header_crc32: U32::ZERO,
        reserved1: U32::ZERO,
        my_lba: U64::new(1),
        alternate_lba: U64::new(num_blocks - 1),
        first_usable_lba: U64::new(34),
        last_usable_lba: U64::new(num_blocks - 34),
        disk_guid: [0x5A; 16],
        partition_entry_lba: U64::new(2),
        num_partition_entries: U32::new(128),
        sizeof_partition_entry: U32::new(128),
        partition_entry_array_crc32: U32::ZERO,
    };
    hdr.header_crc32 = U32::new(mp1_crc32::crc32(hdr.as_bytes()));
    data[BLOCK_SIZE..BLOCK_SIZE + GPT_HEADER_SIZE].copy_from_slice(hdr.as_bytes());

    let mut partition_name = [U16::ZERO; 36];
    for (slot, unit) in partition_name.iter_mut().zip("images".encode_utf16()) {
        *slot = U16::new(unit);
    }
    let entry = GptEntry {
        partition_type_guid: [0x3B; 16],
        unique_partition_guid: [0xC4; 16],
        starting_lba: U64::new(start_lba),
        ending_lba: U64::new(num_blocks - 34),
        attributes: U64::ZERO,
        partition_name,
    };
    let entry_offset = (2 + index as usize / 4) * BLOCK_SIZE + (index as usize % 4) * 128;
    data[entry_offset..entry_offset + 128].copy_from_slice(entry.as_bytes());

    let payload_offset = start_lba as usize * BLOCK_SIZE;
    data[payload_offset..payload_offset + payload.len()].copy_from_slice(payload);
    data
}

/// Answers with `address` after `polls_before` unanswered polls.
#[derive(Clone)]
pub struct FakeMailbox {
    pub address: u32,
    pub polls_before: u32,
    pub polls: Rc<Cell<u32>>,
    pub armed: Rc<Cell<bool>>,
}

impl FakeMailbox {
    pub fn answering(address: u32, polls_before: u32) -> Self {
        Self {
            address,
            polls_before,
            polls: Rc::new(Cell::new(0)),
            armed: Rc::new(Cell::new(false)),
        }
    }
}

impl HeaderMailbox for FakeMailbox {
    fn arm(&mut self) {
        self.armed.set(true);
    }

    fn poll(&mut self) -> Option<u32> {
        let polls = self.polls.get() + 1;
        self.polls.set(polls);
        (self.armed.get() && polls > self.polls_before).then_some(self.address)
    }

    fn register_address(&self) -> u32 {
        0x5C00_A118
    }
}

/// Hands out whatever media the test fitted.
#[derive(Default)]
pub struct FakePlatform {
    pub card: Option<SharedCard>,
    pub flash: Option<Vec<u8>>,
    pub staging: Option<(FakeMemory, FakeMailbox)>,
    pub sd_read_timeout_ms: Cell<Option<u32>>,
}

impl Platform for FakePlatform {
    type Card = SharedCard;
    type Flash = Vec<u8>;
    type Staging = FakeMemory;
    type Mailbox = FakeMailbox;

    fn sd_card(&mut self, read_timeout_ms: u32) -> Result<Self::Card, PlatformError> {
        self.sd_read_timeout_ms.set(Some(read_timeout_ms));
        self.card.clone().ok_or(PlatformError::NotFitted(BootMedium::SdCard))
    }

    fn nor_flash(&mut self) -> Result<Self::Flash, PlatformError> {
        self.flash.clone().ok_or(PlatformError::NotFitted(BootMedium::NorFlash))
    }

    fn ddr_staging(&mut self) -> Result<(Self::Staging, Self::Mailbox), PlatformError> {
        self.staging.clone().ok_or(PlatformError::NotFitted(BootMedium::Ddr))
    }
}
