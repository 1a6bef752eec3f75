//! CRC-32 as used by GPT headers and uImage headers (reflected polynomial
//! `0xEDB8_8320`, initial value and final XOR `0xFFFF_FFFF`).
//!
//! ```rust
//! assert_eq!(mp1_crc32::crc32(b"123456789"), 0xCBF4_3926);
//!
//! let mut crc = mp1_crc32::Crc32::new();
//! crc.update(b"1234");
//! crc.update(b"56789");
//! assert_eq!(crc.finish(), 0xCBF4_3926);
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![forbid(unsafe_code)]

const POLYNOMIAL: u32 = 0xEDB8_8320;

static TABLE: [u32; 256] = generate_table();

#[allow(clippy::cast_possible_truncation)]
const fn generate_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u32;
        let mut j = 0;
        while j < 8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ POLYNOMIAL;
            } else {
                crc >>= 1;
            }
            j += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

/// Incremental CRC-32 state.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Crc32 {
    state: u32,
}

impl Default for Crc32 {
    fn default() -> Self {
        Self::new()
    }
}

impl Crc32 {
    #[must_use]
    pub const fn new() -> Self {
        Self { state: 0xFFFF_FFFF }
    }

    pub fn update(&mut self, data: &[u8]) {
        let mut crc = self.state;
        for &byte in data {
            let index = ((crc ^ u32::from(byte)) & 0xFF) as usize;
            crc = (crc >> 8) ^ TABLE[index];
        }
        self.state = crc;
    }

    /// Feed `len` zero bytes, e.g. in place of a checksum field.
    pub fn update_zeros(&mut self, len: usize) {
        for _ in 0..len {
            self.update(&[0]);
        }
    }

    #[must_use]
    pub const fn finish(self) -> u32 {
        !self.state
    }
}

/// CRC-32 of `data` in one go.
#[must_use]
pub fn crc32(data: &[u8]) -> u32 {
    let mut crc = Crc32::new();
    crc.update(data);
    crc.finish()
}
