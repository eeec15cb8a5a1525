// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

//! Fixed-stride scan for panic blocks.

use super::block::PanicInfo;
use super::{PanicDirectory, SECTOR_SIZE};
use crate::layout::Layout;

/// Byte distance between panic block slots.
///
/// The legacy on-flash layout allocates 150 sectors per slot no matter
/// what block size the directory records. Images that diverge can override
/// the stride with [`BlockScanner::with_stride`].
pub const PANIC_BLOCK_STRIDE: usize = 150 * SECTOR_SIZE;

/// One panic block discovered by the scan.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct PanicMatch {
    /// Position of this match in scan order.
    pub index: usize,
    /// Byte offset of the block in the image.
    pub offset: usize,
    pub info: PanicInfo,
}

/// Walks fixed-stride candidate offsets, yielding every slot whose
/// `panic_info` signature matches. A match never stops the scan — the
/// region may hold several historical panics.
pub struct BlockScanner<'a> {
    image: &'a [u8],
    offset: usize,
    end: usize,
    stride: usize,
    index: usize,
}

impl<'a> BlockScanner<'a> {
    /// Candidate offsets start immediately after the directory sector.
    pub fn new(image: &'a [u8], dir: &PanicDirectory) -> Self {
        if dir.block_size != 0 && dir.declared_stride() != PANIC_BLOCK_STRIDE {
            log::warn!(
                "directory declares {} byte slots, scanning with the fixed {} byte stride",
                dir.declared_stride(),
                PANIC_BLOCK_STRIDE
            );
        }
        Self {
            image,
            offset: SECTOR_SIZE,
            end: image.len(),
            stride: PANIC_BLOCK_STRIDE,
            index: 0,
        }
    }

    /// Overrides the slot stride, in bytes.
    pub fn with_stride(mut self, stride: usize) -> Self {
        self.stride = stride.max(1);
        self
    }

    /// Stops probing at `end` instead of the end of the image.
    pub fn with_end(mut self, end: usize) -> Self {
        self.end = end.min(self.image.len());
        self
    }
}

impl Iterator for BlockScanner<'_> {
    type Item = PanicMatch;

    fn next(&mut self) -> Option<PanicMatch> {
        while self.offset + PanicInfo::WIDTH <= self.end {
            let offset = self.offset;
            self.offset += self.stride;

            // Only panic_info is decoded per probe; it is the cheapest
            // check and rules out empty slots without touching the rest.
            let Ok(info) = PanicInfo::from_slice(&self.image[offset..]) else {
                continue;
            };
            if info.sig_ok() {
                let index = self.index;
                self.index += 1;
                return Some(PanicMatch {
                    index,
                    offset,
                    info,
                });
            }
        }
        None
    }
}
