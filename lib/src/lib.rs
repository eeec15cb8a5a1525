// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

//! Decoder library for the tag flash log.
//!
//! A tag flash image carries two kinds of diagnostic state. The Tag Data
//! Stream (TDS) is an append-only log of heterogeneous, length-prefixed
//! telemetry records, each carrying its own checksum. The panic area is a
//! directory sector followed by fixed-size snapshots of the processor and
//! RAM captured at fault time. This crate walks the former record by record
//! with corruption recovery, locates and validates the latter, and can
//! repackage a panic block into a flat debug artifact that CrashDebug-style
//! tooling loads directly.
//!
//! The library performs no I/O and holds no global state: every entry point
//! takes the image as an immutable byte slice plus explicit bounds.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

mod error;
pub mod image;
pub mod layout;
pub mod panic;
pub mod tds;

pub use error::{Error, Guard};

pub mod prelude {
    //! Convenience re-exports for downstream tools.
    pub use crate::error::{Error, Guard};
    pub use crate::image::{ImageInfo, ImageVersion};
    pub use crate::layout::Layout;
    pub use crate::panic::{BlockScanner, PanicBlock, PanicDirectory, PanicInfo, PanicMatch};
    pub use crate::tds::{
        DtType, RecordBody, RecordHeader, RtcTime, StreamWalker, WalkStats, WalkedRecord,
    };
}
