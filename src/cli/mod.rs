//! Command-line interface wiring for the `washlabel` binary.
//!
//! This module owns the clap definitions and delegates execution to
//! submodules, one per command family.

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

pub mod common;
pub mod encode;
pub mod label;
pub mod reference;
pub mod render;
pub mod utils;
pub mod verify;

/// Parsed CLI entrypoint for the `washlabel` binary.
#[derive(Parser, Debug)]
#[command(
    name = "washlabel",
    version,
    about = "Code128 barcodes and labels for membership cards"
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Top-level command to execute.
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the Code128-B bit pattern for an identifier.
    Encode(encode::EncodeArgs),
    /// Check a bit pattern the way a scanner would and print its data.
    Verify(verify::VerifyArgs),
    /// Render a barcode to SVG or PNG.
    #[command(subcommand)]
    Render(render::RenderCommand),
    /// Render a full membership label from a JSON description.
    Label(label::LabelArgs),
    /// Derive a store+hash reference identifier.
    Reference(reference::ReferenceArgs),
}

/// Execute the requested command.
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Encode(args) => encode::handle(args),
        Command::Verify(args) => verify::handle(args),
        Command::Render(cmd) => render::handle(cmd),
        Command::Label(args) => label::handle(args),
        Command::Reference(args) => reference::handle(args),
    }
}
