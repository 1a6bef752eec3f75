//! Walk a multi-image blob held in memory.
//!
//! Images are laid out back to back; each header's `size` field points at the
//! next header. The chain ends at the first position that does not start with
//! [`IH_MAGIC`](crate::IH_MAGIC) or at the end of the blob.

use crate::{HEADER_SIZE, ImageHeader};

#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum ChainError {
    #[error("image at offset {offset:#x} declares size {size:#x}, smaller than its header")]
    SizeTooSmall { offset: usize, size: u32 },
    #[error("image at offset {offset:#x} runs past the end of the blob")]
    Truncated { offset: usize },
}

/// One image found in a chain.
#[derive(Debug, Copy, Clone)]
pub struct ChainEntry<'a> {
    /// Byte offset of the header within the blob.
    pub offset: usize,
    pub header: ImageHeader,
    pub body: &'a [u8],
}

/// Iterator over the images of a blob; yields an error at most once, then stops.
pub struct ImageChain<'a> {
    blob: &'a [u8],
    offset: usize,
    done: bool,
}

impl<'a> ImageChain<'a> {
    #[must_use]
    pub const fn new(blob: &'a [u8]) -> Self {
        Self {
            blob,
            offset: 0,
            done: false,
        }
    }

    /// Offset just past the last image yielded so far.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.offset
    }

    fn step(&mut self) -> Option<Result<ChainEntry<'a>, ChainError>> {
        let rest = self.blob.get(self.offset..)?;
        let header = ImageHeader::read(rest)?;
        if !header.has_magic() {
            return None;
        }

        let offset = self.offset;
        let size = header.size.get();
        let Ok(total) = usize::try_from(size) else {
            return Some(Err(ChainError::Truncated { offset }));
        };
        if total < HEADER_SIZE {
            return Some(Err(ChainError::SizeTooSmall { offset, size }));
        }
        let Some(body) = rest.get(HEADER_SIZE..total) else {
            return Some(Err(ChainError::Truncated { offset }));
        };

        self.offset += total;
        Some(Ok(ChainEntry {
            offset,
            header,
            body,
        }))
    }
}

impl<'a> Iterator for ImageChain<'a> {
    type Item = Result<ChainEntry<'a>, ChainError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self.step();
        if !matches!(item, Some(Ok(_))) {
            self.done = true;
        }
        item
    }
}

impl core::iter::FusedIterator for ImageChain<'_> {}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::{IH_ARCH_ARM, IH_OS_FIRMWARE, IH_TYPE_FIRMWARE, IH_TYPE_KERNEL, ImageParams};
    use std::vec::Vec;
    use zerocopy::IntoBytes;
    use zerocopy::byteorder::U32;

    fn push(blob: &mut Vec<u8>, name: &str, image_type: u8, body: &[u8]) {
        let params = ImageParams {
            name,
            load_addr: 0xC000_0000,
            entry_point: 0xC000_0000,
            image_type,
            os: IH_OS_FIRMWARE,
            arch: IH_ARCH_ARM,
            timestamp: 0,
        };
        let hdr = ImageHeader::wrap(&params, body).expect("fits");
        blob.extend_from_slice(hdr.as_bytes());
        blob.extend_from_slice(body);
    }

    #[test]
    fn walks_until_the_magic_stops() {
        let mut blob = Vec::new();
        push(&mut blob, "data", IH_TYPE_FIRMWARE, &[1; 10]);
        push(&mut blob, "kernel", IH_TYPE_KERNEL, &[2; 100]);
        blob.extend_from_slice(&[0xFF; 128]);

        let entries: Vec<_> = ImageChain::new(&blob).collect::<Result<_, _>>().expect("valid chain");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].offset, 0);
        assert_eq!(entries[1].offset, 74);
        assert_eq!(entries[1].body, &[2; 100][..]);
        assert!(entries[1].header.is_kernel());
    }

    #[test]
    fn undersized_image_is_reported_once() {
        let mut blob = Vec::new();
        push(&mut blob, "bad", IH_TYPE_FIRMWARE, &[]);
        let mut hdr = ImageHeader::read(&blob).expect("header");
        hdr.size = U32::new(16);
        blob[..HEADER_SIZE].copy_from_slice(hdr.as_bytes());

        let mut chain = ImageChain::new(&blob);
        assert_eq!(
            chain.next().map(|r| r.map(|e| e.offset)),
            Some(Err(ChainError::SizeTooSmall { offset: 0, size: 16 }))
        );
        assert!(chain.next().is_none());
    }

    #[test]
    fn truncated_body() {
        let mut blob = Vec::new();
        push(&mut blob, "cut", IH_TYPE_KERNEL, &[7; 32]);
        blob.truncate(80);
        let mut chain = ImageChain::new(&blob);
        assert!(matches!(chain.next(), Some(Err(ChainError::Truncated { offset: 0 }))));
    }
}
