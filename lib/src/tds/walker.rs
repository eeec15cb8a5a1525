// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

//! Cursor-driven walk over a TDS byte buffer.
//!
//! The walker is a small state machine: it scans records as long as
//! headers stay plausible, drops into a bounded resynchronization scan
//! when one is not, and stops at the end bound. Records come out in buffer
//! order; sequence numbers only report gaps, they never reorder anything.

use super::header::{HEADER_WIDTH, RecordHeader};
use super::records::{DtType, RecordBody, SyncRecord};
use super::SYNC_MAJIK;
use crate::layout::Layout;

/// Total length of a sync record, header included.
const SYNC_RECORD_LEN: usize = HEADER_WIDTH + SyncRecord::WIDTH;

/// Default per-attempt bound on the resynchronization scan. One corrupted
/// record must not turn into an unbounded linear scan over adversarial
/// input.
pub const DEFAULT_RESYNC_LIMIT: usize = 64 * 1024;

/// Counters accumulated over one walk, for diagnostic reporting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct WalkStats {
    /// Records emitted, any status.
    pub records: usize,
    /// Records that decoded fully with a matching checksum.
    pub valid: usize,
    pub checksum_failures: usize,
    pub unknown_types: usize,
    /// Bodies shorter than their typed layout.
    pub truncated_bodies: usize,
    /// Headers that were unparseable or claimed bytes past the end bound.
    pub truncations: usize,
    pub resyncs: usize,
    pub resync_failures: usize,
    /// Bytes stepped over while searching for a sync point.
    pub bytes_skipped: usize,
    /// Jumps observed in the record sequence numbers.
    pub recnum_gaps: usize,
    /// Total records missing across all gaps.
    pub missing_records: u64,
    /// Bytes consumed as well-formed records.
    pub bytes_consumed: usize,
}

/// One record surfaced by the walk.
///
/// A record is emitted even when its checksum fails or its type is
/// unknown; the flags and the body variant say what to trust.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct WalkedRecord {
    /// Byte offset of the record header in the input buffer.
    pub offset: usize,
    pub header: RecordHeader,
    pub body: RecordBody,
    pub checksum_ok: bool,
    /// Records missing between the previous record and this one, per the
    /// sequence numbers. Reported, never corrected.
    pub gap: u32,
}

/// Iterates a byte buffer as a sequence of TDS records.
pub struct StreamWalker<'a> {
    data: &'a [u8],
    cursor: usize,
    end: usize,
    resync_limit: usize,
    last_recnum: Option<u32>,
    stats: WalkStats,
    done: bool,
}

impl<'a> StreamWalker<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            cursor: 0,
            end: data.len(),
            resync_limit: DEFAULT_RESYNC_LIMIT,
            last_recnum: None,
            stats: WalkStats::default(),
            done: false,
        }
    }

    /// Stops the walk at `end` instead of the end of the buffer.
    pub fn with_end(mut self, end: usize) -> Self {
        self.end = end.min(self.data.len());
        self
    }

    /// Bounds each resynchronization scan to `limit` bytes.
    pub fn with_resync_limit(mut self, limit: usize) -> Self {
        self.resync_limit = limit;
        self
    }

    pub fn stats(&self) -> &WalkStats {
        &self.stats
    }

    /// Current cursor position in the input buffer.
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Advances to the next record, resynchronizing past corruption when
    /// needed. `None` means the walk is done: the end bound was reached or
    /// a resync attempt came up empty.
    pub fn next_record(&mut self) -> Option<WalkedRecord> {
        while !self.done {
            if self.cursor + HEADER_WIDTH > self.end {
                self.done = true;
                break;
            }
            let Ok(header) = RecordHeader::from_slice(&self.data[self.cursor..self.end]) else {
                self.done = true;
                break;
            };

            let len = header.record_len();
            if len < HEADER_WIDTH || self.cursor + len > self.end {
                self.stats.truncations += 1;
                if !self.resync() {
                    self.done = true;
                    break;
                }
                continue;
            }

            let offset = self.cursor;
            let record = &self.data[offset..offset + len];
            let checksum_ok = header.verify_recsum(record);
            let body = RecordBody::from_slice(header.dtype, &record[HEADER_WIDTH..]);
            let gap = self.recnum_gap(header.recnum);

            self.cursor += len;
            self.stats.bytes_consumed += len;
            self.stats.records += 1;
            if !checksum_ok {
                self.stats.checksum_failures += 1;
            }
            match &body {
                RecordBody::Unknown(tag, _) => {
                    self.stats.unknown_types += 1;
                    log::debug!("skipping unknown record type {tag} at offset 0x{offset:x}");
                }
                RecordBody::Truncated(dtype) => {
                    self.stats.truncated_bodies += 1;
                    log::debug!(
                        "{} record at offset 0x{offset:x} is shorter than its layout",
                        dtype.name()
                    );
                }
                _ if checksum_ok => self.stats.valid += 1,
                _ => {}
            }

            return Some(WalkedRecord {
                offset,
                header,
                body,
                checksum_ok,
                gap,
            });
        }
        None
    }

    fn recnum_gap(&mut self, recnum: u32) -> u32 {
        let gap = match self.last_recnum {
            Some(prev) if recnum > prev => recnum - prev - 1,
            _ => 0,
        };
        if gap > 0 {
            self.stats.recnum_gaps += 1;
            self.stats.missing_records += u64::from(gap);
        }
        self.last_recnum = Some(recnum);
        gap
    }

    /// Scans forward byte-by-byte for the next plausible sync record and
    /// resumes there. Returns false when the bound (or the end) is reached
    /// first.
    fn resync(&mut self) -> bool {
        self.stats.resyncs += 1;
        let limit = self.cursor.saturating_add(self.resync_limit).min(self.end);
        let mut probe = self.cursor + 1;
        while probe + SYNC_RECORD_LEN <= limit {
            if self.sync_at(probe) {
                log::info!(
                    "resynchronized at offset 0x{probe:x} after skipping {} bytes",
                    probe - self.cursor
                );
                self.stats.bytes_skipped += probe - self.cursor;
                self.cursor = probe;
                return true;
            }
            probe += 1;
        }
        self.stats.resync_failures += 1;
        false
    }

    /// A sync point is only trusted when everything about it checks out:
    /// type tag, declared length, majik, and recsum.
    fn sync_at(&self, offset: usize) -> bool {
        let Some(candidate) = self.data.get(offset..offset + SYNC_RECORD_LEN) else {
            return false;
        };
        let Ok(header) = RecordHeader::from_slice(candidate) else {
            return false;
        };
        if header.dtype != DtType::Sync.tag() || header.record_len() != SYNC_RECORD_LEN {
            return false;
        }
        let Ok(sync) = SyncRecord::from_slice(&candidate[HEADER_WIDTH..]) else {
            return false;
        };
        sync.majik == SYNC_MAJIK && header.verify_recsum(candidate)
    }
}

impl Iterator for StreamWalker<'_> {
    type Item = WalkedRecord;

    fn next(&mut self) -> Option<WalkedRecord> {
        self.next_record()
    }
}
