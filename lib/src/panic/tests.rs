// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

use super::*;
use crate::error::Guard;
use crate::image::{IMAGE_INFO_SIG, ImageInfo};
use crate::layout::Layout;
use crate::Error;

/// Compact slot stride so test images stay small.
const TEST_STRIDE: usize = 1024;

fn directory() -> PanicDirectory {
    PanicDirectory {
        sig: sigs::DIRECTORY,
        dir_sector: 200,
        high_sector: 400,
        block_sector: 201,
        block_size: 1,
        checksum: 0,
    }
}

fn valid_block() -> PanicBlock {
    PanicBlock {
        panic_info: PanicInfo {
            sig: sigs::PANIC_INFO,
            boot_count: 3,
            systime: 1_234_567,
            fail_count: 1,
            subsys: 0x76,
            where_loc: 4,
            pad: 0,
            args: [0xa, 0xb, 0xc, 0xd],
        },
        image_info: ImageInfo {
            sig: IMAGE_INFO_SIG,
            ..ImageInfo::default()
        },
        add_info: AddInfo {
            sig: sigs::ADD_INFO,
            ram_sector: 202,
            ram_size: 1024,
            io_sector: 0,
            fcrumb_sector: 0,
        },
        crash_info: CrashInfo {
            sig: sigs::CRASH_INFO,
            cc_sig: sigs::CRASH_CATCHER,
            pc: 0x0800_1234,
            sp: 0x2000_0200,
            lr: 0x0800_0101,
            regs: [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12],
            ..CrashInfo::default()
        },
        ram_header: RamHeader {
            start: 0x2000_0000,
            end: 0x2000_0400,
        },
        ..PanicBlock::default()
    }
}

/// Builds an image with the directory in sector 0 and the given blocks at
/// their byte offsets.
fn image_with_blocks(blocks: &[(usize, PanicBlock)], len: usize) -> Vec<u8> {
    let mut image = vec![0u8; len];
    image[..PanicDirectory::WIDTH].copy_from_slice(&directory().to_bytes());
    for (offset, block) in blocks {
        image[*offset..*offset + PanicBlock::WIDTH].copy_from_slice(&block.to_bytes());
    }
    image
}

/// Directory, one block in slot 0, and 1024 patterned RAM bytes at the
/// offset `ram_sector` maps to.
fn extraction_image() -> Vec<u8> {
    let mut image = image_with_blocks(&[(SECTOR_SIZE, valid_block())], 2048);
    for (i, byte) in image[1024..2048].iter_mut().enumerate() {
        *byte = i as u8;
    }
    image
}

#[test]
fn block_width_matches_the_slot_layout() {
    assert_eq!(PanicBlock::WIDTH, 508);
}

#[test]
fn directory_locates_with_signature() {
    let image = image_with_blocks(&[], SECTOR_SIZE);
    let dir = PanicDirectory::locate(&image).unwrap();
    assert_eq!(dir, directory());
    assert_eq!(dir.sector_offset(202).unwrap(), 1024);
    assert_eq!(dir.declared_stride(), SECTOR_SIZE);
}

#[test]
fn directory_rejects_any_other_prefix() {
    let mut image = image_with_blocks(&[], SECTOR_SIZE);
    image[0] ^= 0x01;
    assert_eq!(
        PanicDirectory::locate(&image),
        Err(Error::DirectorySignatureMismatch(0xdddd_b00a))
    );

    // The locator reads exactly one sector; anything shorter cannot hold a
    // directory.
    assert_eq!(
        PanicDirectory::locate(&image[..100]),
        Err(Error::BufferTooShort)
    );
}

#[test]
fn directory_round_trip() {
    let bytes = directory().to_bytes();
    assert_eq!(PanicDirectory::from_slice(&bytes).unwrap(), directory());
}

#[test]
fn block_round_trip() {
    let block = valid_block();
    let bytes = block.to_bytes();
    assert_eq!(PanicBlock::from_slice(&bytes).unwrap(), block);
}

#[test]
fn scanner_reports_matches_in_scan_order() {
    // Valid blocks in slots 0 and 2, noise in slot 1.
    let slot0 = SECTOR_SIZE;
    let slot2 = SECTOR_SIZE + 2 * TEST_STRIDE;
    let mut image = image_with_blocks(&[(slot0, valid_block()), (slot2, valid_block())], 4096);
    for byte in image[SECTOR_SIZE + TEST_STRIDE..SECTOR_SIZE + TEST_STRIDE + 64].iter_mut() {
        *byte = 0xa5;
    }

    let dir = PanicDirectory::locate(&image).unwrap();
    let matches: Vec<PanicMatch> = BlockScanner::new(&image, &dir)
        .with_stride(TEST_STRIDE)
        .collect();

    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0].offset, slot0);
    assert_eq!(matches[1].offset, slot2);
    assert_eq!(matches[0].index, 0);
    assert_eq!(matches[1].index, 1);
    assert!(matches.iter().all(|m| m.info.sig_ok()));
}

#[test]
fn scanner_honors_the_end_bound() {
    let slot0 = SECTOR_SIZE;
    let slot1 = SECTOR_SIZE + TEST_STRIDE;
    let image = image_with_blocks(&[(slot0, valid_block()), (slot1, valid_block())], 4096);

    let dir = PanicDirectory::locate(&image).unwrap();
    let matches: Vec<PanicMatch> = BlockScanner::new(&image, &dir)
        .with_stride(TEST_STRIDE)
        .with_end(slot1)
        .collect();

    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].offset, slot0);
}

#[test]
fn extract_produces_the_debug_artifact() {
    let image = extraction_image();
    let dir = PanicDirectory::locate(&image).unwrap();
    let artifact = extract_at(&image, &dir, SECTOR_SIZE).unwrap();

    // Signature big-endian, then 19 LE words, then the RAM window.
    assert_eq!(artifact.len(), 4 + 19 * 4 + 8 + 1024);
    assert_eq!(&artifact[..4], &[0x63, 0x43, 0x02, 0x00]);
    // flags + 13 registers + sp + lr put the program counter at offset 68.
    assert_eq!(&artifact[68..72], &[0x34, 0x12, 0x00, 0x08]);
    assert_eq!(&artifact[80..84], &0x2000_0000u32.to_le_bytes());
    assert_eq!(&artifact[84..88], &0x2000_0400u32.to_le_bytes());
    assert_eq!(&artifact[88..], &image[1024..2048]);
}

#[test]
fn extract_by_index_matches_extract_by_offset() {
    let image = extraction_image();
    let dir = PanicDirectory::locate(&image).unwrap();
    assert_eq!(
        extract_block(&image, &dir, 0, TEST_STRIDE).unwrap(),
        extract_at(&image, &dir, SECTOR_SIZE).unwrap()
    );
}

#[test]
fn extract_appends_the_fp_bank_when_flagged() {
    let mut block = valid_block();
    block.crash_info.flags = capture_flags::FP_PRESENT;
    block.crash_info.fp_regs = [0x5a5a_5a5a; 32];
    block.crash_info.fpscr = 0x0300_0000;
    let mut image = image_with_blocks(&[(SECTOR_SIZE, block)], 2048);
    for (i, byte) in image[1024..2048].iter_mut().enumerate() {
        *byte = i as u8;
    }

    let dir = PanicDirectory::locate(&image).unwrap();
    let artifact = extract_at(&image, &dir, SECTOR_SIZE).unwrap();

    assert_eq!(artifact.len(), 4 + 19 * 4 + 33 * 4 + 8 + 1024);
    assert_eq!(&artifact[80..84], &0x5a5a_5a5au32.to_le_bytes());
    let ram_header_at = 4 + 19 * 4 + 33 * 4;
    assert_eq!(
        &artifact[ram_header_at..ram_header_at + 4],
        &0x2000_0000u32.to_le_bytes()
    );
    assert_eq!(&artifact[ram_header_at + 8..], &image[1024..2048]);
}

#[test]
fn extract_rejects_a_bad_guard() {
    let image = extraction_image();
    let dir = PanicDirectory::locate(&image).unwrap();

    let mut bad_capture = image.clone();
    // cc_sig lives 32 bytes into crash_info.
    let cc_sig_at = SECTOR_SIZE + PanicInfo::WIDTH + ImageInfo::WIDTH + AddInfo::WIDTH + 52 + 32;
    bad_capture[cc_sig_at] ^= 0xff;
    assert_eq!(
        extract_at(&bad_capture, &dir, SECTOR_SIZE),
        Err(Error::BlockSignatureMismatch(Guard::CrashCapture))
    );

    let mut bad_add = image.clone();
    let ai_sig_at = SECTOR_SIZE + PanicInfo::WIDTH + ImageInfo::WIDTH;
    bad_add[ai_sig_at] ^= 0xff;
    assert_eq!(
        extract_at(&bad_add, &dir, SECTOR_SIZE),
        Err(Error::BlockSignatureMismatch(Guard::AddInfo))
    );
}

#[test]
fn extract_rejects_an_out_of_range_ram_window() {
    let mut block = valid_block();
    block.add_info.ram_sector = 300;
    let image = image_with_blocks(&[(SECTOR_SIZE, block)], 2048);
    let dir = PanicDirectory::locate(&image).unwrap();
    assert_eq!(
        extract_at(&image, &dir, SECTOR_SIZE),
        Err(Error::RamRegionOutOfRange)
    );

    let mut block = valid_block();
    block.add_info.ram_sector = 100;
    let image = image_with_blocks(&[(SECTOR_SIZE, block)], 2048);
    assert_eq!(
        extract_at(&image, &dir, SECTOR_SIZE),
        Err(Error::RamRegionOutOfRange)
    );
}
