// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

//! Panic area decoding: directory locator, block scanner, crash extractor.
//!
//! The first sector of the panic area holds a directory describing the
//! flash geometry. Panic blocks follow at a fixed stride, each a snapshot
//! of the processor and a window of RAM captured at the moment of a fault.
//! Every structure in a block carries its own signature; a corrupted image
//! can present a valid outer magic with garbage inside, so each guard is
//! checked independently before its fields are trusted.

mod block;
mod extract;
mod scan;
#[cfg(test)]
mod tests;

pub use block::{AddInfo, CrashInfo, PanicBlock, PanicInfo, RamHeader, capture_flags};
pub use extract::{extract_at, extract_block};
pub use scan::{BlockScanner, PANIC_BLOCK_STRIDE, PanicMatch};

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::Error;
use crate::layout::{ByteReader, Layout, put_u32_le};

pub mod sigs {
    //! Signature values guarding the panic area structures.

    /// Panic directory sector.
    pub const DIRECTORY: u32 = 0xdddd_b00b;
    /// `panic_info` sub-structure ("APfD" on flash).
    pub const PANIC_INFO: u32 = 0x4466_5041;
    /// `add_info` sub-structure.
    pub const ADD_INFO: u32 = 0x4466_4441;
    /// `crash_info` sub-structure.
    pub const CRASH_INFO: u32 = 0x4466_4943;
    /// Register-capture sub-block inside `crash_info`. Serialized
    /// big-endian into the debug artifact, which therefore starts
    /// `63 43 02 00`.
    pub const CRASH_CATCHER: u32 = 0x6343_0200;
}

/// Flash sector size used for all sector-relative arithmetic.
pub const SECTOR_SIZE: usize = 512;

/// Directory sector at the start of the panic area.
///
/// All fields are little-endian on flash. Sector numbers are absolute;
/// byte offsets into the image are always `(sector - dir_sector) * 512`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct PanicDirectory {
    pub sig: u32,
    pub dir_sector: u32,
    pub high_sector: u32,
    pub block_sector: u32,
    pub block_size: u32,
    /// Carried but not verified; the tooling that writes it predates the
    /// checksum being kept up to date.
    pub checksum: u32,
}

impl Layout for PanicDirectory {
    const WIDTH: usize = 24;

    fn read(r: &mut ByteReader<'_>) -> Result<Self, Error> {
        Ok(Self {
            sig: r.u32_le()?,
            dir_sector: r.u32_le()?,
            high_sector: r.u32_le()?,
            block_sector: r.u32_le()?,
            block_size: r.u32_le()?,
            checksum: r.u32_le()?,
        })
    }

    fn write(&self, out: &mut Vec<u8>) {
        put_u32_le(out, self.sig);
        put_u32_le(out, self.dir_sector);
        put_u32_le(out, self.high_sector);
        put_u32_le(out, self.block_sector);
        put_u32_le(out, self.block_size);
        put_u32_le(out, self.checksum);
    }
}

impl PanicDirectory {
    /// Reads and validates the directory sector at the start of the image.
    ///
    /// A signature mismatch is fatal to the whole panic path: without the
    /// directory there is no geometry worth scanning.
    pub fn locate(image: &[u8]) -> Result<Self, Error> {
        let sector = image.get(..SECTOR_SIZE).ok_or(Error::BufferTooShort)?;
        let dir = Self::from_slice(sector)?;
        if dir.sig != sigs::DIRECTORY {
            return Err(Error::DirectorySignatureMismatch(dir.sig));
        }
        Ok(dir)
    }

    /// Converts an absolute sector number into a byte offset in the image.
    pub fn sector_offset(&self, sector: u32) -> Result<usize, Error> {
        if sector < self.dir_sector {
            return Err(Error::RamRegionOutOfRange);
        }
        Ok((sector - self.dir_sector) as usize * SECTOR_SIZE)
    }

    /// Slot size implied by the directory geometry, in bytes.
    pub fn declared_stride(&self) -> usize {
        self.block_size as usize * SECTOR_SIZE
    }
}
