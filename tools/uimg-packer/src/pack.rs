//! Command-line image arguments and uImage wrapping.

use std::path::Path;
use std::str::FromStr;
use uimage_abi::{IH_ARCH_ARM, IH_OS_FIRMWARE, IH_TYPE_FIRMWARE, IH_TYPE_KERNEL, ImageHeader, ImageParams};
use zerocopy::IntoBytes;

#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum ArgError {
    #[error("{0}: expected <file>:<load>[:<entry>]")]
    Malformed(String),
    #[error("{arg}: bad address {value:?}")]
    BadAddress { arg: String, value: String },
}

/// One `<file>:<load>[:<entry>]` argument.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ImageArg {
    pub path: String,
    pub load_addr: u32,
    /// Set for kernel images only.
    pub entry_point: Option<u32>,
}

impl ImageArg {
    /// Image name stored in the header: the file stem.
    #[must_use]
    pub fn name(&self) -> &str {
        Path::new(&self.path)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.path)
    }
}

/// Hex with `0x` prefix, decimal otherwise.
fn parse_addr(value: &str) -> Option<u32> {
    match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(&hex.replace('_', ""), 16).ok(),
        None => value.parse().ok(),
    }
}

impl FromStr for ImageArg {
    type Err = ArgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        let (path, load, entry) = match parts.as_slice() {
            [path, load] => (*path, *load, None),
            [path, load, entry] => (*path, *load, Some(*entry)),
            _ => return Err(ArgError::Malformed(s.to_owned())),
        };
        if path.is_empty() {
            return Err(ArgError::Malformed(s.to_owned()));
        }

        let addr = |value: &str| {
            parse_addr(value).ok_or_else(|| ArgError::BadAddress {
                arg: s.to_owned(),
                value: value.to_owned(),
            })
        };
        Ok(Self {
            path: path.to_owned(),
            load_addr: addr(load)?,
            entry_point: entry.map(addr).transpose()?,
        })
    }
}

/// Header plus body; `None` if the body overflows the size field.
#[must_use]
pub fn wrap(arg: &ImageArg, body: &[u8], timestamp: u32) -> Option<Vec<u8>> {
    let params = ImageParams {
        name: arg.name(),
        load_addr: arg.load_addr,
        entry_point: arg.entry_point.unwrap_or(0),
        image_type: if arg.entry_point.is_some() {
            IH_TYPE_KERNEL
        } else {
            IH_TYPE_FIRMWARE
        },
        os: IH_OS_FIRMWARE,
        arch: IH_ARCH_ARM,
        timestamp,
    };
    let header = ImageHeader::wrap(&params, body)?;
    let mut image = Vec::with_capacity(uimage_abi::HEADER_SIZE + body.len());
    image.extend_from_slice(header.as_bytes());
    image.extend_from_slice(body);
    Some(image)
}
