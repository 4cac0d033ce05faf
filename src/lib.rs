//! Code128-B barcode encoding and rendering for car-wash membership cards.
//!
//! ```
//! let pattern = washlabel::encode("1005123456789").unwrap();
//! assert_eq!(pattern.len(), 178);
//!
//! let svg = washlabel::barcode_svg("1005123456789", 356.0, 100.0).unwrap();
//! assert!(svg.starts_with("<svg"));
//! ```

mod label;
mod pattern;
mod symbols;
mod vector;

pub mod image;

pub use label::{LabelError, LabelSpec, ReferenceId, Vehicle};
pub use pattern::{BitPattern, DecodeError, PatternStyle, checksum, decode, encode, expected_len};
pub use symbols::{
    Code128B, EncodeError, START_A, START_B, START_C, STOP, SYMBOL_WIDTH, Symbology, lookup,
    pattern_for_value,
};
pub use vector::{Caption, Rect, RenderError, VectorImage, render};

use thiserror::Error;

/// Failure of the encode-then-render pipeline.
#[derive(Debug, Error)]
pub enum BarcodeError {
    #[error("cannot generate barcode for this identifier: {0}")]
    Encode(#[from] EncodeError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Encode `data` and lay it out on a `width` x `height` canvas.
pub fn barcode_image(data: &str, width: f64, height: f64) -> Result<VectorImage, BarcodeError> {
    let pattern = encode(data)?;
    Ok(render(&pattern, pattern.data(), width, height)?)
}

/// Encode `data` straight to SVG markup.
pub fn barcode_svg(data: &str, width: f64, height: f64) -> Result<String, BarcodeError> {
    barcode_image(data, width, height).map(|image| image.to_svg())
}
