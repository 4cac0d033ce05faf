//! Rendering commands (`washlabel render ...`).

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::{Args, Subcommand};
use tracing::{info, warn};
use washlabel::image::{ImageRenderOptions, has_glyph, render_barcode_image};
use washlabel::{encode, render};

use crate::cli::common::PageLayoutArg;
use crate::cli::utils::{ensure_parent, parse_dimension, write_output};

/// Available render subcommands.
#[derive(Subcommand, Debug)]
pub enum RenderCommand {
    /// Render a scalable SVG barcode.
    Svg(RenderSvgArgs),
    /// Render a PNG preview with quiet zone.
    Png(RenderPngArgs),
}

/// Args for `washlabel render svg`.
#[derive(Args, Debug)]
pub struct RenderSvgArgs {
    /// Identifier to encode.
    pub data: String,
    /// Output file (`-` for stdout).
    #[arg(short = 'o', long = "output", default_value = "-")]
    pub output: PathBuf,
    /// Canvas width in the consumer's units.
    #[arg(long, default_value_t = 300.0, value_parser = parse_dimension)]
    pub width: f64,
    /// Canvas height in the consumer's units.
    #[arg(long, default_value_t = 100.0, value_parser = parse_dimension)]
    pub height: f64,
    /// Emit a base64 `data:` URI instead of raw markup.
    #[arg(long)]
    pub data_uri: bool,
}

/// Args for `washlabel render png`.
#[derive(Args, Debug)]
pub struct RenderPngArgs {
    /// Identifier to encode.
    pub data: String,
    /// Output PNG file.
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,
    /// Pixels per module.
    #[arg(long = "module", default_value_t = 2)]
    pub module_px: u32,
    /// Bar height in pixels.
    #[arg(long = "height", default_value_t = 80)]
    pub bar_height_px: u32,
    /// Leave out the human-readable caption.
    #[arg(long)]
    pub no_caption: bool,
    /// Output page layout.
    #[arg(long = "pagesize", default_value_t = PageLayoutArg::Tight, value_enum)]
    pub pagesize: PageLayoutArg,
    /// Dots per inch used for page layouts.
    #[arg(long, default_value_t = 300)]
    pub dpi: u32,
}

/// Execute a render command.
pub fn handle(command: RenderCommand) -> Result<()> {
    match command {
        RenderCommand::Svg(args) => svg(args),
        RenderCommand::Png(args) => png(args),
    }
}

fn svg(args: RenderSvgArgs) -> Result<()> {
    let pattern = encode(&args.data)
        .with_context(|| format!("cannot generate barcode for identifier {:?}", args.data))?;
    let image = render(&pattern, pattern.data(), args.width, args.height)?;
    let mut output = if args.data_uri {
        image.to_data_uri()
    } else {
        image.to_svg()
    };
    output.push('\n');
    write_output(&args.output, &output)?;
    info!(bars = image.bars.len(), "rendered svg");
    if args.output.as_os_str() != "-" {
        println!(
            "Rendered {} ({} modules) to {}",
            args.data,
            pattern.len(),
            args.output.display()
        );
    }
    Ok(())
}

fn png(args: RenderPngArgs) -> Result<()> {
    let is_png = args
        .output
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("png"))
        .unwrap_or(false);
    if !is_png {
        return Err(anyhow!(
            "output path {} must end in .png",
            args.output.display()
        ));
    }

    let pattern = encode(&args.data)
        .with_context(|| format!("cannot generate barcode for identifier {:?}", args.data))?;
    if !args.no_caption {
        let missing: String = args.data.chars().filter(|c| !has_glyph(*c)).collect();
        if !missing.is_empty() {
            warn!(%missing, "caption characters without a glyph are left blank");
        }
    }

    let options = ImageRenderOptions {
        module_px: args.module_px,
        bar_height_px: args.bar_height_px,
        caption: !args.no_caption,
        layout: args.pagesize.into(),
        dpi: args.dpi,
    };
    let image = render_barcode_image(&pattern, &options);
    ensure_parent(&args.output)?;
    image
        .save(&args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    println!(
        "Rendered {} to {} ({}x{} px)",
        args.data,
        args.output.display(),
        image.width(),
        image.height()
    );
    Ok(())
}
