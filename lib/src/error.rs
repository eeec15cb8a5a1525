// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

//! Error taxonomy shared by the stream walker and the panic path.

#[cfg(not(feature = "std"))]
use alloc::fmt;
#[cfg(feature = "std")]
use std::fmt;

/// Names the signature that failed to match inside a panic block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    PanicInfo,
    ImageInfo,
    AddInfo,
    CrashInfo,
    CrashCapture,
}

impl Guard {
    pub fn field_name(&self) -> &'static str {
        match self {
            Guard::PanicInfo => "pi_sig",
            Guard::ImageInfo => "ii_sig",
            Guard::AddInfo => "ai_sig",
            Guard::CrashInfo => "ci_sig",
            Guard::CrashCapture => "cc_sig",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Not enough bytes left to bind the requested layout.
    BufferTooShort,
    /// The directory sector does not carry the panic directory signature.
    /// Fatal to the whole panic path: without the directory there is no
    /// trustworthy geometry to scan.
    DirectorySignatureMismatch(u32),
    /// A guarded sub-structure of a panic block failed its signature check.
    /// Fatal only to that block; the caller may try another one.
    BlockSignatureMismatch(Guard),
    /// Stored record checksum does not match the one computed over the
    /// record's raw bytes.
    ChecksumMismatch,
    /// No decoder is registered for this record type tag.
    UnknownRecordType(u16),
    /// A record header claims more bytes than the stream holds.
    TruncatedStream,
    /// The RAM window referenced by a panic block falls outside the image.
    RamRegionOutOfRange,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::BufferTooShort => write!(f, "buffer too short for layout"),
            Error::DirectorySignatureMismatch(found) => {
                write!(f, "panic directory signature mismatch (found 0x{found:08x})")
            }
            Error::BlockSignatureMismatch(guard) => {
                write!(f, "panic block signature mismatch ({})", guard.field_name())
            }
            Error::ChecksumMismatch => write!(f, "record checksum mismatch"),
            Error::UnknownRecordType(tag) => write!(f, "unknown record type tag {tag}"),
            Error::TruncatedStream => write!(f, "record extends past the end of the stream"),
            Error::RamRegionOutOfRange => {
                write!(f, "RAM region falls outside the input image")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
