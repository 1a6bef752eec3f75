//! STM32MP1 boot ROM image header ("STM2", version 1).
//!
//! The boot ROM loads the first-stage loader into SYSRAM only if it is
//! preceded by this 256-byte little-endian header. The loader binary is
//! linked with 256 bytes reserved at its start; those bytes are dropped and
//! replaced by the header.

use zerocopy::byteorder::{LittleEndian, U32};
use zerocopy::{FromZeros, Immutable, IntoBytes, KnownLayout};

pub const STM32_MAGIC: [u8; 4] = *b"STM2";
pub const STM32_HEADER_SIZE: usize = 256;

/// Where the boot ROM copies the header; the payload follows it.
pub const SYSRAM_LOAD_ADDR: u32 = 0x2FFC_2400;
pub const SYSRAM_ENTRY_POINT: u32 = 0x2FFC_2500;

const HEADER_VERSION: u32 = 0x0001_0000;
/// Bit 0: no signature check.
const OPTION_NO_SIGNATURE: u32 = 1;
const ECDSA_P256: u32 = 1;

#[repr(C)]
#[derive(Debug, Clone, Copy, IntoBytes, FromZeros, Immutable, KnownLayout)]
pub struct Stm32Header {
    pub magic: [u8; 4],
    pub signature: [u8; 64],
    /// Byte sum of the payload.
    pub checksum: U32<LittleEndian>,
    pub header_version: U32<LittleEndian>,
    pub length: U32<LittleEndian>,
    pub entry_point: U32<LittleEndian>,
    pub reserved1: U32<LittleEndian>,
    pub load_address: U32<LittleEndian>,
    pub reserved2: U32<LittleEndian>,
    pub image_version: U32<LittleEndian>,
    pub option_flags: U32<LittleEndian>,
    pub ecdsa_algorithm: U32<LittleEndian>,
    pub ecdsa_public_key: [u8; 64],
    pub padding: [u8; 83],
    pub binary_type: u8,
}

const _: () = assert!(size_of::<Stm32Header>() == STM32_HEADER_SIZE);

#[derive(Debug, Clone, Copy, Eq, PartialEq, thiserror::Error)]
pub enum Stm32Error {
    #[error("input already carries an STM32 header")]
    AlreadyWrapped,
    #[error("input is {0} bytes, shorter than the reserved header space")]
    TooShort(usize),
    #[error("payload of {0} bytes does not fit the length field")]
    TooLarge(usize),
}

impl Stm32Header {
    pub fn for_payload(payload: &[u8]) -> Result<Self, Stm32Error> {
        let length = u32::try_from(payload.len()).map_err(|_| Stm32Error::TooLarge(payload.len()))?;
        let checksum = payload
            .iter()
            .fold(0u32, |sum, &b| sum.wrapping_add(u32::from(b)));

        let mut hdr = Self::new_zeroed();
        hdr.magic = STM32_MAGIC;
        hdr.checksum = U32::new(checksum);
        hdr.header_version = U32::new(HEADER_VERSION);
        hdr.length = U32::new(length);
        hdr.entry_point = U32::new(SYSRAM_ENTRY_POINT);
        hdr.load_address = U32::new(SYSRAM_LOAD_ADDR);
        hdr.option_flags = U32::new(OPTION_NO_SIGNATURE);
        hdr.ecdsa_algorithm = U32::new(ECDSA_P256);
        Ok(hdr)
    }
}

/// Replace the reserved first 256 bytes of `binary` with a boot ROM header.
pub fn wrap(binary: &[u8]) -> Result<Vec<u8>, Stm32Error> {
    if binary.starts_with(&STM32_MAGIC) {
        return Err(Stm32Error::AlreadyWrapped);
    }
    let payload = binary
        .get(STM32_HEADER_SIZE..)
        .ok_or(Stm32Error::TooShort(binary.len()))?;

    let header = Stm32Header::for_payload(payload)?;
    let mut image = Vec::with_capacity(binary.len());
    image.extend_from_slice(header.as_bytes());
    image.extend_from_slice(payload);
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn le(bytes: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
    }

    #[test]
    fn header_fields_land_at_their_offsets() {
        let mut binary = vec![0u8; STM32_HEADER_SIZE];
        binary.extend_from_slice(&[1, 2, 3, 0xFF]);
        let image = wrap(&binary).unwrap();

        assert_eq!(image.len(), STM32_HEADER_SIZE + 4);
        assert_eq!(&image[..4], b"STM2");
        assert_eq!(le(&image, 0x44), 1 + 2 + 3 + 0xFF);
        assert_eq!(le(&image, 0x48), 0x0001_0000);
        assert_eq!(le(&image, 0x4C), 4);
        assert_eq!(le(&image, 0x50), 0x2FFC_2500);
        assert_eq!(le(&image, 0x58), 0x2FFC_2400);
        assert_eq!(le(&image, 0x64), 1);
        assert_eq!(le(&image, 0x68), 1);
        assert_eq!(image[0xFF], 0);
        assert_eq!(&image[STM32_HEADER_SIZE..], &[1, 2, 3, 0xFF]);
    }

    #[test]
    fn wrapped_input_is_refused() {
        let mut binary = vec![0u8; 300];
        binary[..4].copy_from_slice(b"STM2");
        assert_eq!(wrap(&binary), Err(Stm32Error::AlreadyWrapped));
    }

    #[test]
    fn input_must_cover_the_reserved_space() {
        assert_eq!(wrap(&[0u8; 100]), Err(Stm32Error::TooShort(100)));
        assert_eq!(wrap(&[0u8; 256]).map(|v| v.len()), Ok(256));
    }
}
