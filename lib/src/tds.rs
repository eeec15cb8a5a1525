// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

//! Tag Data Stream decoding.
//!
//! The TDS is an append-only log of length-prefixed records. Every record
//! starts with the same 20-byte header; the header's length field counts
//! the whole record and is the sole authority for how far the walk
//! advances, independent of what the per-type decoder consumes. Sync
//! records are written periodically by the device and double as
//! resynchronization anchors after corruption.

mod header;
mod records;
mod walker;

pub use header::{HEADER_WIDTH, RecordHeader, RtcTime, recsum};
pub use records::{
    DtType, EventRecord, GpsRecord, NoteRecord, OW_SIG, OwControlBlock, RebootRecord, RecordBody,
    SyncRecord, VersionRecord, event_name, gps_cmd_name,
};
pub use walker::{DEFAULT_RESYNC_LIMIT, StreamWalker, WalkStats, WalkedRecord};

use crate::Error;
use crate::layout::Layout;

/// Marker carried by sync and reboot records. A record with this value in
/// its `majik` field is a trustworthy place to re-anchor the walk.
pub const SYNC_MAJIK: u32 = 0xdedf_00ef;

/// Decodes the single record at the start of `data`, strictly.
///
/// Where [`StreamWalker`] tags corrupted records and keeps going, this
/// entry point turns every defect into a typed error: a header overrunning
/// the buffer is [`Error::TruncatedStream`], a bad recsum is
/// [`Error::ChecksumMismatch`], an unregistered tag is
/// [`Error::UnknownRecordType`].
pub fn read_record(data: &[u8]) -> Result<(RecordHeader, RecordBody), Error> {
    let header = RecordHeader::from_slice(data)?;
    let len = header.record_len();
    if len < HEADER_WIDTH || len > data.len() {
        return Err(Error::TruncatedStream);
    }
    let record = &data[..len];
    if !header.verify_recsum(record) {
        return Err(Error::ChecksumMismatch);
    }
    let body = RecordBody::decode(header.dtype, &record[HEADER_WIDTH..])?;
    Ok((header, body))
}
