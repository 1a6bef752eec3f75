//! # Physical Memory Types for the MP1 Loader
//!
//! Address and region primitives shared by the boot media backends and the
//! image loader.
//!
//! ## Overview
//!
//! The first-stage loader runs before any MMU is configured, so every address
//! it handles is physical and used verbatim. This crate keeps those addresses
//! typed and makes the writable memory map explicit:
//!
//! | Type | Description |
//! |------|-------------|
//! | [`PhysicalAddress`] | A raw 32-bit bus address with checked arithmetic. |
//! | [`MemoryRegion`] | A named, inclusive `[base, base + size]` range. |
//! | [`RegionValidator`] | The three regions images may be written to. |
//! | [`PhysicalMemory`] | Byte-slice windows onto physical memory. |
//! | [`RawMemory`] | The bare-metal [`PhysicalMemory`], gated by a validator. |
//!
//! ## Typical Usage
//!
//! ```rust
//! # use mp1_memory::*;
//! const DDR: MemoryRegion = MemoryRegion::new("DDR", PhysicalAddress::new(0xC000_0000), 0x2000_0000);
//! const SRAM: MemoryRegion = MemoryRegion::new("SRAM", PhysicalAddress::new(0x3000_0000), 0x6_0000);
//! const RETRAM: MemoryRegion = MemoryRegion::new("RETRAM", PhysicalAddress::new(0x3800_0000), 0x1_0000);
//!
//! let validator = RegionValidator::new([RETRAM, SRAM, DDR]);
//! assert!(validator.is_valid_span(PhysicalAddress::new(0xC200_0000), 0x1000));
//! assert!(!validator.is_valid(PhysicalAddress::new(0x0800_0000)));
//! ```
//!
//! ## Design Notes
//!
//! - The only `unsafe` in this crate is [`RawMemory::new`]; the windows it hands
//!   out are bounded by the validator it was built with.
//! - Test code implements [`PhysicalMemory`] over plain buffers instead.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod access;
mod physical_address;
mod region;

pub use access::{PhysicalMemory, RawMemory};
pub use physical_address::PhysicalAddress;
pub use region::{MemoryRegion, RegionValidator};
