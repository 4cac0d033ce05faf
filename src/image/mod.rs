//! Raster (PNG) previews of encoded barcodes.

mod font;
mod paint;

pub use font::{GLYPH_HEIGHT, GLYPH_WIDTH, has_glyph};
pub use paint::{ImageRenderOptions, PageLayout, QUIET_ZONE_MODULES, render_barcode_image};
