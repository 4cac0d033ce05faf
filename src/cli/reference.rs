//! Reference identifier commands (`washlabel reference ...`).

use anyhow::Result;
use clap::Args;
use washlabel::{ReferenceId, encode};

/// Arguments for `washlabel reference`.
#[derive(Args, Debug)]
pub struct ReferenceArgs {
    /// Store number (0-9999).
    #[arg(long)]
    pub store: u32,
    /// Stable member key, such as the payments-platform customer id.
    #[arg(long)]
    pub key: String,
    /// Print the bit pattern on a second line.
    #[arg(long)]
    pub bits: bool,
}

/// Execute a reference command.
pub fn handle(args: ReferenceArgs) -> Result<()> {
    let id = ReferenceId::derive(args.store, &args.key)?;
    println!("{id}");
    if args.bits {
        println!("{}", encode(id.as_str())?);
    }
    Ok(())
}
