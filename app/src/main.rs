// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

//! tagpix: inspect a tag flash image, walk its data stream, and extract
//! panic dumps for debugging.

mod dump;
mod panics;

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "tagpix",
    version,
    about = "Tag flash log inspector and panic dump extractor"
)]
struct Cli {
    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Walk the Tag Data Stream and print each record
    Dump {
        /// Flash image or extracted stream file
        input: PathBuf,

        /// Stop the walk at this byte offset
        #[arg(short = 'x', long)]
        end: Option<usize>,

        /// Print records as JSON lines
        #[arg(long)]
        json: bool,
    },
    /// List the panic blocks recorded in an image
    Panics {
        /// Flash image holding the panic area
        input: PathBuf,

        /// Override the slot stride, in bytes
        #[arg(long)]
        stride: Option<usize>,
    },
    /// Extract one panic block as a debug artifact
    Extract {
        /// Flash image holding the panic area
        input: PathBuf,

        /// Destination for the debug artifact
        #[arg(short, long)]
        output: PathBuf,

        /// Index of the panic block to extract, in scan order
        #[arg(short, long, default_value_t = 0)]
        block: usize,

        /// Override the slot stride, in bytes
        #[arg(long)]
        stride: Option<usize>,
    },
}

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(match cli.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .init();

    let result = match cli.command {
        Command::Dump { input, end, json } => dump::run(&input, end, json),
        Command::Panics { input, stride } => panics::list(&input, stride),
        Command::Extract {
            input,
            output,
            block,
            stride,
        } => panics::extract(&input, &output, block, stride),
    };

    if let Err(err) = result {
        log::error!("{err}");
        std::process::exit(1);
    }
}
