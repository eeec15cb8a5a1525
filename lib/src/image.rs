// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

//! Image identity block, shared by the TDS version record and the panic
//! block. Describes which firmware image the device was running.

#[cfg(not(feature = "std"))]
use alloc::fmt;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::fmt;

use crate::Error;
use crate::layout::{ByteReader, Layout, put_u16_le, put_u32_le};

/// Signature carried by a valid [`ImageInfo`] block.
pub const IMAGE_INFO_SIG: u32 = 0x3327_5401;

/// Firmware image version, `major.minor.build`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct ImageVersion {
    pub build: u16,
    pub minor: u8,
    pub major: u8,
}

impl fmt::Display for ImageVersion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.build)
    }
}

impl Layout for ImageVersion {
    const WIDTH: usize = 4;

    fn read(r: &mut ByteReader<'_>) -> Result<Self, Error> {
        Ok(Self {
            build: r.u16_le()?,
            minor: r.u8()?,
            major: r.u8()?,
        })
    }

    fn write(&self, out: &mut Vec<u8>) {
        put_u16_le(out, self.build);
        out.push(self.minor);
        out.push(self.major);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct HwVersion {
    pub rev: u8,
    pub model: u8,
}

impl fmt::Display for HwVersion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "model 0x{:02x} rev {}", self.model, self.rev)
    }
}

impl Layout for HwVersion {
    const WIDTH: usize = 2;

    fn read(r: &mut ByteReader<'_>) -> Result<Self, Error> {
        Ok(Self {
            rev: r.u8()?,
            model: r.u8()?,
        })
    }

    fn write(&self, out: &mut Vec<u8>) {
        out.push(self.rev);
        out.push(self.model);
    }
}

/// Identity of the firmware image that produced the log.
///
/// The descriptor and build-date fields are fixed-width byte arrays; any
/// NUL padding is preserved on decode and only trimmed for display.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct ImageInfo {
    pub sig: u32,
    pub im_start: u32,
    pub im_len: u32,
    pub vect_chk: u32,
    pub im_chk: u32,
    pub ver_id: ImageVersion,
    pub desc0: [u8; 44],
    pub desc1: [u8; 44],
    pub build_date: [u8; 30],
    pub hw_ver: HwVersion,
}

impl Default for ImageInfo {
    fn default() -> Self {
        Self {
            sig: 0,
            im_start: 0,
            im_len: 0,
            vect_chk: 0,
            im_chk: 0,
            ver_id: ImageVersion::default(),
            desc0: [0; 44],
            desc1: [0; 44],
            build_date: [0; 30],
            hw_ver: HwVersion::default(),
        }
    }
}

impl Layout for ImageInfo {
    const WIDTH: usize = 20 + ImageVersion::WIDTH + 44 + 44 + 30 + HwVersion::WIDTH;

    fn read(r: &mut ByteReader<'_>) -> Result<Self, Error> {
        Ok(Self {
            sig: r.u32_le()?,
            im_start: r.u32_le()?,
            im_len: r.u32_le()?,
            vect_chk: r.u32_le()?,
            im_chk: r.u32_le()?,
            ver_id: ImageVersion::read(r)?,
            desc0: r.array()?,
            desc1: r.array()?,
            build_date: r.array()?,
            hw_ver: HwVersion::read(r)?,
        })
    }

    fn write(&self, out: &mut Vec<u8>) {
        put_u32_le(out, self.sig);
        put_u32_le(out, self.im_start);
        put_u32_le(out, self.im_len);
        put_u32_le(out, self.vect_chk);
        put_u32_le(out, self.im_chk);
        self.ver_id.write(out);
        out.extend_from_slice(&self.desc0);
        out.extend_from_slice(&self.desc1);
        out.extend_from_slice(&self.build_date);
        self.hw_ver.write(out);
    }
}

impl ImageInfo {
    pub fn sig_ok(&self) -> bool {
        self.sig == IMAGE_INFO_SIG
    }

    pub fn desc0_str(&self) -> &str {
        printable(&self.desc0)
    }

    pub fn desc1_str(&self) -> &str {
        printable(&self.desc1)
    }

    pub fn build_date_str(&self) -> &str {
        printable(&self.build_date)
    }
}

impl fmt::Display for ImageInfo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "image {} ({}) built {}, start 0x{:08x} len {}",
            self.ver_id,
            self.hw_ver,
            self.build_date_str(),
            self.im_start,
            self.im_len
        )
    }
}

/// Display view of a fixed-width byte-string field: everything up to the
/// first NUL, or nothing if the content is not UTF-8.
fn printable(bytes: &[u8]) -> &str {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    core::str::from_utf8(&bytes[..end]).unwrap_or("")
}
