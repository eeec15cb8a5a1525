// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

//! Repackages a validated panic block into a flat debug artifact.
//!
//! The artifact layout is fixed by downstream debug tooling and must be
//! reproduced byte for byte: the capture signature big-endian (a
//! deliberate flip the consumers expect), every word after it
//! little-endian, the raw RAM window last.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use super::block::PanicBlock;
use super::{PanicDirectory, SECTOR_SIZE};
use crate::layout::Layout;
use crate::Error;

/// Extracts the panic block at byte offset `offset`, returning the debug
/// artifact bytes.
pub fn extract_at(image: &[u8], dir: &PanicDirectory, offset: usize) -> Result<Vec<u8>, Error> {
    let block_bytes = image.get(offset..).ok_or(Error::BufferTooShort)?;
    let block = PanicBlock::from_slice(block_bytes)?;
    block.verify_guards()?;

    let ram_start = dir.sector_offset(block.add_info.ram_sector)?;
    let ram_size = block.add_info.ram_size as usize;
    let ram_end = ram_start.checked_add(ram_size).ok_or(Error::RamRegionOutOfRange)?;
    let ram = image
        .get(ram_start..ram_end)
        .ok_or(Error::RamRegionOutOfRange)?;

    let crash = &block.crash_info;
    let mut out = Vec::with_capacity(PanicBlock::WIDTH + ram.len());
    out.extend_from_slice(&crash.cc_sig.to_be_bytes());
    for word in crash.capture_words() {
        out.extend_from_slice(&word.to_le_bytes());
    }
    if crash.fp_present() {
        for word in crash.fp_regs {
            out.extend_from_slice(&word.to_le_bytes());
        }
        out.extend_from_slice(&crash.fpscr.to_le_bytes());
    }
    out.extend_from_slice(&block.ram_header.start.to_le_bytes());
    out.extend_from_slice(&block.ram_header.end.to_le_bytes());
    out.extend_from_slice(ram);
    Ok(out)
}

/// Extracts the panic block in slot `index`, `stride` bytes apart,
/// starting after the directory sector.
pub fn extract_block(
    image: &[u8],
    dir: &PanicDirectory,
    index: usize,
    stride: usize,
) -> Result<Vec<u8>, Error> {
    let offset = index
        .checked_mul(stride)
        .and_then(|o| o.checked_add(SECTOR_SIZE))
        .ok_or(Error::BufferTooShort)?;
    extract_at(image, dir, offset)
}
