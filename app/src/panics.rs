// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

//! `tagpix panics` / `tagpix extract`: panic area inspection and
//! extraction.

use std::error::Error;
use std::path::Path;
use tag_recovery::panic::{self, BlockScanner, PanicDirectory, PanicMatch};

/// Locates the directory and collects every panic block in scan order.
/// A directory signature mismatch aborts the whole run.
fn scan(image: &[u8], stride: Option<usize>) -> Result<(PanicDirectory, Vec<PanicMatch>), Box<dyn Error>> {
    let dir = PanicDirectory::locate(image)?;
    let mut scanner = BlockScanner::new(image, &dir);
    if let Some(stride) = stride {
        scanner = scanner.with_stride(stride);
    }
    Ok((dir, scanner.collect()))
}

pub fn list(input: &Path, stride: Option<usize>) -> Result<(), Box<dyn Error>> {
    let image = std::fs::read(input)?;
    let (_, matches) = scan(&image, stride)?;

    println!("{} panic dumps found", matches.len());
    for m in &matches {
        println!("panic block {} @ 0x{:06x}: {}", m.index, m.offset, m.info);
    }
    Ok(())
}

pub fn extract(
    input: &Path,
    output: &Path,
    block: usize,
    stride: Option<usize>,
) -> Result<(), Box<dyn Error>> {
    let image = std::fs::read(input)?;
    let (dir, matches) = scan(&image, stride)?;

    let Some(selected) = matches.get(block) else {
        return Err(format!(
            "no panic block {block}: the image holds {}",
            matches.len()
        )
        .into());
    };

    let artifact = panic::extract_at(&image, &dir, selected.offset)?;
    std::fs::write(output, artifact)?;
    println!("{}", output.display());
    Ok(())
}
