//! Encoding helpers (`washlabel encode ...`).

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;
use washlabel::encode;

use crate::cli::common::PatternStyleArg;
use crate::cli::utils::{read_text_arg, trim_line_ending};

/// Arguments for `washlabel encode`.
#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Identifier to encode (falls back to `--from` or stdin).
    pub data: Option<String>,
    /// Read the identifier from file (`-` for stdin).
    #[arg(long = "from")]
    pub from: Option<PathBuf>,
    /// Output view.
    #[arg(long, default_value_t = PatternStyleArg::Ascii01, value_enum)]
    pub style: PatternStyleArg,
    /// Also print a per-symbol breakdown.
    #[arg(long)]
    pub symbols: bool,
}

/// Execute an encode command.
pub fn handle(args: EncodeArgs) -> Result<()> {
    let raw = read_text_arg(args.data, args.from)?;
    let data = trim_line_ending(&raw);
    let pattern = encode(data)
        .with_context(|| format!("cannot generate barcode for identifier {data:?}"))?;
    info!(modules = pattern.len(), checksum = pattern.checksum(), "encoded identifier");

    if args.symbols {
        print!("{}", pattern.listing());
    }
    let view = pattern.render(args.style.into());
    if view.ends_with('\n') {
        print!("{view}");
    } else {
        println!("{view}");
    }
    Ok(())
}
