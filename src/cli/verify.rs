//! Verification workflow (`washlabel verify ...`).

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Args;
use tracing::info;
use washlabel::decode;

use crate::cli::utils::read_text_arg;

/// Arguments for `washlabel verify`.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Bit pattern of `0`/`1` modules.
    #[arg(long)]
    pub bits: Option<String>,
    /// Read the pattern from file (`-` for stdin).
    #[arg(long = "from")]
    pub from: Option<PathBuf>,
    /// Expected data; a mismatch is an error.
    #[arg(long)]
    pub expect: Option<String>,
}

/// Execute a verify command.
pub fn handle(args: VerifyArgs) -> Result<()> {
    let raw = read_text_arg(args.bits, args.from)?;
    // Patterns may be wrapped or indented when pasted.
    let bits: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let data = decode(&bits).context("pattern is not a valid Code128-B barcode")?;
    info!(modules = bits.len(), "pattern verified");

    if let Some(expected) = args.expect {
        if expected != data {
            return Err(anyhow!(
                "pattern decodes to {:?}, expected {:?}",
                data,
                expected
            ));
        }
    }
    println!("{data}");
    Ok(())
}
