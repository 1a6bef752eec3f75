//! `uimg-packer`: host side of the boot flow.
//!
//! ```text
//! uimg-packer pack <out> <file>:<load>[:<entry>] ...
//! uimg-packer list <blob>
//! uimg-packer verify <blob>
//! uimg-packer stm32 <in> <out>
//! ```
//!
//! `pack` wraps each file into a uImage and concatenates them. A file given
//! an entry point becomes a kernel image, all others are data images. The
//! header timestamp comes from `SOURCE_DATE_EPOCH` if set.

mod pack;
mod stm32;

use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};
use std::{env, fs, io};
use uimage_abi::chain::{ChainError, ImageChain};

#[derive(Debug, thiserror::Error)]
pub enum PackerError {
    #[error("usage: uimg-packer <pack|list|verify|stm32> ...")]
    Usage,
    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Arg(#[from] pack::ArgError),
    #[error("{0}: image too large for a 32-bit size field")]
    TooLarge(String),
    #[error(transparent)]
    Chain(#[from] ChainError),
    #[error("{failed} of {total} images failed verification")]
    Verify { failed: usize, total: usize },
    #[error(transparent)]
    Stm32(#[from] stm32::Stm32Error),
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("uimg-packer: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> Result<(), PackerError> {
    match args {
        [cmd, out, images @ ..] if cmd == "pack" && !images.is_empty() => pack_files(out, images),
        [cmd, blob] if cmd == "list" => {
            let blob = read(blob)?;
            list(&blob).map(|_| ())
        }
        [cmd, blob] if cmd == "verify" => verify(&read(blob)?),
        [cmd, input, out] if cmd == "stm32" => {
            let image = stm32::wrap(&read(input)?)?;
            write(out, &image)?;
            eprintln!("wrote STM32 image {out} ({} bytes)", image.len());
            Ok(())
        }
        _ => Err(PackerError::Usage),
    }
}

fn read(path: &str) -> Result<Vec<u8>, PackerError> {
    fs::read(path).map_err(|source| PackerError::Io {
        path: path.to_owned(),
        source,
    })
}

fn write(path: &str, bytes: &[u8]) -> Result<(), PackerError> {
    fs::write(path, bytes).map_err(|source| PackerError::Io {
        path: path.to_owned(),
        source,
    })
}

fn timestamp() -> u32 {
    if let Some(epoch) = env::var("SOURCE_DATE_EPOCH").ok().and_then(|s| s.parse().ok()) {
        return epoch;
    }
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .and_then(|d| u32::try_from(d.as_secs()).ok())
        .unwrap_or(0)
}

fn pack_files(out: &str, images: &[String]) -> Result<(), PackerError> {
    let timestamp = timestamp();
    let mut blob = Vec::new();
    for arg in images {
        let arg: pack::ImageArg = arg.parse()?;
        let body = read(&arg.path)?;
        let image = pack::wrap(&arg, &body, timestamp).ok_or_else(|| PackerError::TooLarge(arg.path.clone()))?;
        blob.extend_from_slice(&image);
    }
    write(out, &blob)?;
    eprintln!("packed {} images into {out} ({} bytes)", images.len(), blob.len());
    Ok(())
}

/// Print one line per image; returns the number of images that failed a CRC check.
fn list(blob: &[u8]) -> Result<usize, PackerError> {
    let mut failed = 0;
    let mut chain = ImageChain::new(blob);
    for entry in chain.by_ref() {
        let entry = entry?;
        let hdr = &entry.header;
        let header_ok = hdr.header_crc_ok();
        let data_ok = hdr.data_crc_ok(entry.body);
        if !(header_ok && data_ok) {
            failed += 1;
        }
        let kind = if hdr.is_kernel() { "kernel" } else { "data" };
        let name: String = hdr.printable_name().collect();
        println!(
            "{:#08x}  {kind:6}  load {:#010x}  entry {:#010x}  size {:#x}  hcrc {}  dcrc {}  {name}",
            entry.offset,
            hdr.load_addr.get(),
            hdr.entry_point.get(),
            hdr.size.get(),
            if header_ok { "ok" } else { "BAD" },
            if data_ok { "ok" } else { "BAD" },
        );
    }
    let trailing = blob.len() - chain.position();
    if trailing > 0 {
        println!("{trailing} trailing bytes after the last image");
    }
    Ok(failed)
}

fn verify(blob: &[u8]) -> Result<(), PackerError> {
    let total = ImageChain::new(blob).count();
    match list(blob)? {
        0 => Ok(()),
        failed => Err(PackerError::Verify { failed, total }),
    }
}
