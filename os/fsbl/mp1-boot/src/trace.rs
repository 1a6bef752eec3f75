//! # Trace output

use core::fmt;
use log::{Level, debug, log_enabled};
use uimage_abi::ImageHeader;

/// Printable characters of the header name.
struct PrintableName<'a>(&'a ImageHeader);

impl fmt::Display for PrintableName<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.0.printable_name() {
            fmt::Write::write_char(f, c)?;
        }
        Ok(())
    }
}

/// Dump every raw header field at debug level, before any interpretation.
pub fn trace_header(header: &ImageHeader) {
    if !log_enabled!(Level::Debug) {
        return;
    }

    debug!("Raw header (big-endian):");
    debug!("  ih_magic: {:08x}", header.magic.get());
    debug!("  ih_hcrc:  {:08x}", header.header_crc.get());
    debug!("  ih_time:  {:08x}", header.timestamp.get());
    debug!("  ih_size:  {:08x}", header.size.get());
    debug!("  ih_load:  {:08x}", header.load_addr.get());
    debug!("  ih_ep:    {:08x}", header.entry_point.get());
    debug!("  ih_dcrc:  {:08x}", header.data_crc.get());
    debug!("  ih_os:    {:02x}", header.os);
    debug!("  ih_arch:  {:02x}", header.arch);
    debug!("  ih_type:  {:02x}", header.image_type);
    debug!("  ih_comp:  {:02x}", header.compression);
    debug!("  ih_name:  {}", PrintableName(header));
}
