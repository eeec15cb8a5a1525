// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

//! `tagpix dump`: walk the Tag Data Stream record by record.

use std::error::Error;
use std::path::Path;
use tag_recovery::prelude::*;
use tag_recovery::tds::gps_cmd_name;

pub fn run(input: &Path, end: Option<usize>, json: bool) -> Result<(), Box<dyn Error>> {
    let data = std::fs::read(input)?;
    let mut walker = StreamWalker::new(&data);
    if let Some(end) = end {
        walker = walker.with_end(end);
    }

    for record in &mut walker {
        if json {
            println!("{}", serde_json::to_string(&record)?);
        } else {
            print_record(&record);
        }
    }

    let stats = walker.stats();
    if json {
        eprintln!("{}", serde_json::to_string(stats)?);
    } else {
        print_summary(stats);
    }
    Ok(())
}

fn print_record(record: &WalkedRecord) {
    if record.gap > 0 {
        println!("-------- {} records missing", record.gap);
    }

    let header = &record.header;
    let label = describe(&record.body);
    let status = if record.checksum_ok { "" } else { "  RECSUM-BAD" };
    println!(
        "{:08x} {:>6} {}  {}{}",
        record.offset, header.recnum, header.rt, label, status
    );
}

fn describe(body: &RecordBody) -> String {
    match body {
        RecordBody::Reboot(reboot) => {
            let mut label = format!("REBOOT base 0x{:08x}", reboot.base);
            if let Some(owcb) = &reboot.owcb {
                label.push_str(&format!(
                    " reason {} boots {}",
                    owcb.reboot_reason, owcb.reboot_count
                ));
            }
            label
        }
        RecordBody::Version(version) => format!(
            "VERSION {} base 0x{:08x}",
            version.image.ver_id, version.base
        ),
        RecordBody::Sync(sync) => format!("SYNC prev 0x{:x}", sync.prev_sync),
        RecordBody::Event(event) => {
            let mut label = format!("EVENT {event}");
            if event.event == 51
                && let Some(cmd) = gps_cmd_name(event.args[0] as u8)
            {
                label.push_str(&format!(" ({cmd})"));
            }
            label
        }
        RecordBody::Note(note) => format!("NOTE {note}"),
        RecordBody::Gps(gps) => format!(
            "GPS mark 0x{:08x} chip 0x{:02x} dir {} ({} payload bytes)",
            gps.mark,
            gps.chip,
            gps.dir,
            gps.payload.len()
        ),
        RecordBody::Plain(dtype, payload) => {
            format!("{} ({} payload bytes)", dtype.name(), payload.len())
        }
        RecordBody::Truncated(dtype) => format!("{} (body shorter than layout)", dtype.name()),
        RecordBody::Unknown(tag, payload) => {
            format!("UNKNOWN[{tag}] ({} payload bytes)", payload.len())
        }
    }
}

fn print_summary(stats: &WalkStats) {
    println!(
        "{} records ({} valid), {} checksum failures, {} unknown types, {} truncated bodies",
        stats.records,
        stats.valid,
        stats.checksum_failures,
        stats.unknown_types,
        stats.truncated_bodies
    );
    if stats.resyncs > 0 {
        println!(
            "{} resyncs ({} failed), {} bytes skipped",
            stats.resyncs, stats.resync_failures, stats.bytes_skipped
        );
    }
    if stats.recnum_gaps > 0 {
        println!(
            "{} sequence gaps, {} records missing",
            stats.recnum_gaps, stats.missing_records
        );
    }
    println!("{} bytes consumed", stats.bytes_consumed);
}
