//! Label commands (`washlabel label ...`).

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Args;
use tracing::info;
use washlabel::LabelSpec;

use crate::cli::utils::{read_text_arg, write_output};

/// Arguments for `washlabel label`.
#[derive(Args, Debug)]
pub struct LabelArgs {
    /// JSON label description (`-` or omitted for stdin).
    #[arg(long = "from")]
    pub from: Option<PathBuf>,
    /// Output SVG file (`-` for stdout).
    #[arg(short = 'o', long = "output", default_value = "-")]
    pub output: PathBuf,
    /// Stamp today's date when the description has no issue date.
    #[arg(long)]
    pub issued_today: bool,
}

/// Execute a label command.
pub fn handle(args: LabelArgs) -> Result<()> {
    let raw = read_text_arg(None, args.from.clone())?;
    let mut spec: LabelSpec =
        serde_json::from_str(&raw).context("failed to parse label description")?;
    if args.issued_today && spec.issued.is_none() {
        spec.issued = Some(Local::now().date_naive());
    }

    let svg = spec.render_svg()?;
    write_output(&args.output, &format!("{svg}\n"))?;
    info!(reference = %spec.reference, "rendered label");
    if args.output.as_os_str() != "-" {
        println!(
            "Wrote label for {} to {}",
            spec.reference,
            args.output.display()
        );
    }
    Ok(())
}
