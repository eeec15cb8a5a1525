// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

//! Typed record bodies and the tag → decoder dispatch table.

#[cfg(not(feature = "std"))]
use alloc::fmt;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::fmt;

use super::SYNC_MAJIK;
use crate::Error;
use crate::image::ImageInfo;
use crate::layout::{ByteReader, Layout, put_u16_le, put_u32_le, put_u64_le};

/// Signature guarding the OverWatch control block carried by reboot
/// records.
pub const OW_SIG: u32 = 0xfaba_faba;

/// Record type tags understood by this decoder.
///
/// Tags outside this set are not an error — the walker skips them by the
/// header's declared length so newer firmware can add types without
/// breaking older tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
#[repr(u16)]
pub enum DtType {
    Reboot = 1,
    Version = 2,
    Sync = 3,
    Event = 4,
    Debug = 5,
    GpsVersion = 6,
    GpsTime = 7,
    GpsGeo = 8,
    GpsXyz = 9,
    SensorData = 10,
    SensorSet = 11,
    Test = 12,
    Note = 13,
    Config = 14,
    GpsRaw = 15,
}

impl DtType {
    pub fn from_tag(tag: u16) -> Option<Self> {
        Some(match tag {
            1 => DtType::Reboot,
            2 => DtType::Version,
            3 => DtType::Sync,
            4 => DtType::Event,
            5 => DtType::Debug,
            6 => DtType::GpsVersion,
            7 => DtType::GpsTime,
            8 => DtType::GpsGeo,
            9 => DtType::GpsXyz,
            10 => DtType::SensorData,
            11 => DtType::SensorSet,
            12 => DtType::Test,
            13 => DtType::Note,
            14 => DtType::Config,
            15 => DtType::GpsRaw,
            _ => return None,
        })
    }

    pub fn tag(self) -> u16 {
        self as u16
    }

    pub fn name(self) -> &'static str {
        match self {
            DtType::Reboot => "REBOOT",
            DtType::Version => "VERSION",
            DtType::Sync => "SYNC",
            DtType::Event => "EVENT",
            DtType::Debug => "DEBUG",
            DtType::GpsVersion => "GPS_VERSION",
            DtType::GpsTime => "GPS_TIME",
            DtType::GpsGeo => "GPS_GEO",
            DtType::GpsXyz => "GPS_XYZ",
            DtType::SensorData => "SENSOR_DATA",
            DtType::SensorSet => "SENSOR_SET",
            DtType::Test => "TEST",
            DtType::Note => "NOTE",
            DtType::Config => "CONFIG",
            DtType::GpsRaw => "GPS_RAW",
        }
    }
}

/// Sync record body. Written periodically so a corrupted stretch of log
/// costs at most the gap to the next sync point.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct SyncRecord {
    /// File offset of the previous sync record.
    pub prev_sync: u32,
    pub majik: u32,
}

impl Layout for SyncRecord {
    const WIDTH: usize = 8;

    fn read(r: &mut ByteReader<'_>) -> Result<Self, Error> {
        Ok(Self {
            prev_sync: r.u32_le()?,
            majik: r.u32_le()?,
        })
    }

    fn write(&self, out: &mut Vec<u8>) {
        put_u32_le(out, self.prev_sync);
        put_u32_le(out, self.majik);
    }
}

impl SyncRecord {
    pub fn majik_ok(&self) -> bool {
        self.majik == SYNC_MAJIK
    }
}

/// OverWatch control block, appended to reboot records by firmware that
/// carries the OverWatch supervisor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct OwControlBlock {
    pub ow_sig: u32,
    pub rpt: u32,
    pub uptime: u64,
    pub reset_status: u32,
    pub reset_others: u32,
    pub from_base: u32,
    pub fail_count: u32,
    pub fault_gold: u32,
    pub fault_nib: u32,
    pub subsys_disable: u32,
    pub ow_sig_b: u32,
    pub ow_req: u8,
    pub reboot_reason: u8,
    pub ow_boot_mode: u8,
    pub owt_action: u8,
    pub reboot_count: u32,
    pub elapsed: u64,
    pub strange: u32,
    pub strange_loc: u32,
    pub vec_chk_fail: u32,
    pub image_chk_fail: u32,
    pub ow_sig_c: u32,
}

impl Layout for OwControlBlock {
    const WIDTH: usize = 84;

    fn read(r: &mut ByteReader<'_>) -> Result<Self, Error> {
        Ok(Self {
            ow_sig: r.u32_le()?,
            rpt: r.u32_le()?,
            uptime: r.u64_le()?,
            reset_status: r.u32_le()?,
            reset_others: r.u32_le()?,
            from_base: r.u32_le()?,
            fail_count: r.u32_le()?,
            fault_gold: r.u32_le()?,
            fault_nib: r.u32_le()?,
            subsys_disable: r.u32_le()?,
            ow_sig_b: r.u32_le()?,
            ow_req: r.u8()?,
            reboot_reason: r.u8()?,
            ow_boot_mode: r.u8()?,
            owt_action: r.u8()?,
            reboot_count: r.u32_le()?,
            elapsed: r.u64_le()?,
            strange: r.u32_le()?,
            strange_loc: r.u32_le()?,
            vec_chk_fail: r.u32_le()?,
            image_chk_fail: r.u32_le()?,
            ow_sig_c: r.u32_le()?,
        })
    }

    fn write(&self, out: &mut Vec<u8>) {
        put_u32_le(out, self.ow_sig);
        put_u32_le(out, self.rpt);
        put_u64_le(out, self.uptime);
        put_u32_le(out, self.reset_status);
        put_u32_le(out, self.reset_others);
        put_u32_le(out, self.from_base);
        put_u32_le(out, self.fail_count);
        put_u32_le(out, self.fault_gold);
        put_u32_le(out, self.fault_nib);
        put_u32_le(out, self.subsys_disable);
        put_u32_le(out, self.ow_sig_b);
        out.push(self.ow_req);
        out.push(self.reboot_reason);
        out.push(self.ow_boot_mode);
        out.push(self.owt_action);
        put_u32_le(out, self.reboot_count);
        put_u64_le(out, self.elapsed);
        put_u32_le(out, self.strange);
        put_u32_le(out, self.strange_loc);
        put_u32_le(out, self.vec_chk_fail);
        put_u32_le(out, self.image_chk_fail);
        put_u32_le(out, self.ow_sig_c);
    }
}

impl OwControlBlock {
    /// All three copies of the signature must agree for the block to be
    /// trusted.
    pub fn sig_ok(&self) -> bool {
        self.ow_sig == OW_SIG && self.ow_sig_b == OW_SIG && self.ow_sig_c == OW_SIG
    }
}

/// Reboot record body. The OverWatch control block follows when the
/// record is long enough to carry it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct RebootRecord {
    pub prev_sync: u32,
    pub majik: u32,
    pub dt_rev: u32,
    pub base: u32,
    pub owcb: Option<OwControlBlock>,
}

impl RebootRecord {
    pub fn from_slice(s: &[u8]) -> Result<Self, Error> {
        let mut r = ByteReader::new(s);
        let prev_sync = r.u32_le()?;
        let majik = r.u32_le()?;
        let dt_rev = r.u32_le()?;
        let base = r.u32_le()?;
        let owcb = if r.remaining() >= OwControlBlock::WIDTH {
            Some(OwControlBlock::read(&mut r)?)
        } else {
            None
        };
        Ok(Self {
            prev_sync,
            majik,
            dt_rev,
            base,
            owcb,
        })
    }

    pub fn majik_ok(&self) -> bool {
        self.majik == SYNC_MAJIK
    }
}

/// Version record body: image base plus the identity of the running image.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct VersionRecord {
    pub base: u32,
    pub image: ImageInfo,
}

impl Layout for VersionRecord {
    const WIDTH: usize = 4 + ImageInfo::WIDTH;

    fn read(r: &mut ByteReader<'_>) -> Result<Self, Error> {
        Ok(Self {
            base: r.u32_le()?,
            image: ImageInfo::read(r)?,
        })
    }

    fn write(&self, out: &mut Vec<u8>) {
        put_u32_le(out, self.base);
        self.image.write(out);
    }
}

/// Event record body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct EventRecord {
    pub event: u16,
    pub pcode: u8,
    pub w: u8,
    pub args: [u32; 4],
}

impl Layout for EventRecord {
    const WIDTH: usize = 20;

    fn read(r: &mut ByteReader<'_>) -> Result<Self, Error> {
        Ok(Self {
            event: r.u16_le()?,
            pcode: r.u8()?,
            w: r.u8()?,
            args: r.words_le()?,
        })
    }

    fn write(&self, out: &mut Vec<u8>) {
        put_u16_le(out, self.event);
        out.push(self.pcode);
        out.push(self.w);
        for arg in self.args {
            put_u32_le(out, arg);
        }
    }
}

impl EventRecord {
    pub fn name(&self) -> Option<&'static str> {
        event_name(self.event)
    }
}

impl fmt::Display for EventRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name}")?,
            None => write!(f, "EVENT_{}", self.event)?,
        }
        write!(
            f,
            " {}/{} 0x{:08x} 0x{:08x} 0x{:08x} 0x{:08x}",
            self.pcode, self.w, self.args[0], self.args[1], self.args[2], self.args[3]
        )
    }
}

/// Note record: free-form bytes, typically a printable string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct NoteRecord {
    pub text: Vec<u8>,
}

impl NoteRecord {
    pub fn from_slice(s: &[u8]) -> Self {
        Self { text: Vec::from(s) }
    }
}

impl fmt::Display for NoteRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match core::str::from_utf8(&self.text) {
            Ok(text) => write!(f, "{}", text.trim_end_matches('\0')),
            Err(_) => write!(f, "<{} binary bytes>", self.text.len()),
        }
    }
}

/// GPS record: a small direction/chip sub-header followed by an opaque
/// SIRF payload. SIRF decoding is a pluggable concern outside this crate;
/// the payload is carried raw.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct GpsRecord {
    pub mark: u32,
    pub chip: u8,
    pub dir: u8,
    pub payload: Vec<u8>,
}

impl GpsRecord {
    pub fn from_slice(s: &[u8]) -> Result<Self, Error> {
        let mut r = ByteReader::new(s);
        let mark = r.u32_le()?;
        let chip = r.u8()?;
        let dir = r.u8()?;
        r.u16_le()?; // pad
        let payload = Vec::from(r.bytes(r.remaining())?);
        Ok(Self {
            mark,
            chip,
            dir,
            payload,
        })
    }
}

/// A decoded record body, one variant per dispatch outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub enum RecordBody {
    Reboot(RebootRecord),
    Version(VersionRecord),
    Sync(SyncRecord),
    Event(EventRecord),
    Note(NoteRecord),
    Gps(GpsRecord),
    /// Known type whose body carries no decoded fields; payload kept raw.
    Plain(DtType, Vec<u8>),
    /// Known type whose body was shorter than its declared layout.
    Truncated(DtType),
    /// Type tag with no registered decoder.
    Unknown(u16, Vec<u8>),
}

impl RecordBody {
    /// Strict dispatch: unknown tags and short bodies surface as typed
    /// errors.
    pub fn decode(tag: u16, payload: &[u8]) -> Result<Self, Error> {
        let Some(dtype) = DtType::from_tag(tag) else {
            return Err(Error::UnknownRecordType(tag));
        };
        Self::decode_typed(dtype, payload)
    }

    fn decode_typed(dtype: DtType, payload: &[u8]) -> Result<Self, Error> {
        Ok(match dtype {
            DtType::Reboot => RecordBody::Reboot(RebootRecord::from_slice(payload)?),
            DtType::Version => RecordBody::Version(VersionRecord::from_slice(payload)?),
            DtType::Sync => RecordBody::Sync(SyncRecord::from_slice(payload)?),
            DtType::Event => RecordBody::Event(EventRecord::from_slice(payload)?),
            DtType::Note => RecordBody::Note(NoteRecord::from_slice(payload)),
            DtType::GpsVersion | DtType::GpsRaw => RecordBody::Gps(GpsRecord::from_slice(payload)?),
            _ => RecordBody::Plain(dtype, Vec::from(payload)),
        })
    }

    /// Lenient dispatch used by the stream walker: failures become
    /// [`RecordBody::Unknown`] / [`RecordBody::Truncated`] so the walk can
    /// keep advancing by the header's length.
    pub fn from_slice(tag: u16, payload: &[u8]) -> Self {
        let Some(dtype) = DtType::from_tag(tag) else {
            return RecordBody::Unknown(tag, Vec::from(payload));
        };
        Self::decode_typed(dtype, payload).unwrap_or(RecordBody::Truncated(dtype))
    }

}

/// Event code names. Pure data, kept next to the event decoder.
pub fn event_name(code: u16) -> Option<&'static str> {
    Some(match code {
        1 => "SURFACED",
        2 => "SUBMERGED",
        3 => "DOCKED",
        4 => "UNDOCKED",
        5 => "GPS_GEO",
        6 => "GPS_XYZ",
        7 => "GPS_TIME",
        8 => "SSW_DELAY_TIME",
        9 => "SSW_BLK_TIME",
        10 => "SSW_GRP_TIME",
        11 => "PANIC_WARN",
        32 => "GPS_BOOT",
        33 => "GPS_BOOT_TIME",
        34 => "GPS_RECONFIG",
        35 => "GPS_TURN_ON",
        36 => "GPS_TURN_OFF",
        37 => "GPS_STANDBY",
        38 => "GPS_MPM",
        39 => "GPS_FULL_PWR",
        40 => "GPS_PULSE",
        41 => "GPS_FAST",
        42 => "GPS_FIRST",
        43 => "GPS_SATS_2",
        44 => "GPS_SATS_7",
        45 => "GPS_SATS_41",
        46 => "GPS_CYCLE_TIME",
        47 => "GPS_RX_ERR",
        48 => "GPS_AWAKE_S",
        49 => "GPS_BOOT_FAIL",
        50 => "GPS_HW_CONFIG",
        51 => "GPS_CMD",
        52 => "GPS_RAW_TX",
        53 => "GPS_SWVER_TO",
        _ => return None,
    })
}

/// Names for the first argument of a GPS_CMD event.
pub fn gps_cmd_name(code: u8) -> Option<&'static str> {
    Some(match code {
        0 => "NOP",
        1 => "TURNON",
        2 => "TURNOFF",
        3 => "STANDBY",
        4 => "HIBERNATE",
        5 => "WAKE",
        6 => "PULSE",
        7 => "AWAKE_STATUS",
        8 => "RESET",
        9 => "POWER_ON",
        10 => "POWER_OFF",
        11 => "SEND_MPM",
        12 => "SEND_FULL",
        13 => "RAW_TX",
        0x80 => "REBOOT",
        0x81 => "PANIC",
        0x82 => "BRICK",
        _ => return None,
    })
}
