use image::imageops::overlay;
use image::{DynamicImage, ImageBuffer, Rgba, RgbaImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use tracing::debug;

use super::font::{GLYPH_HEIGHT, GLYPH_WIDTH, glyph_pattern};
use crate::pattern::BitPattern;

const A4_WIDTH_IN: f32 = 8.27;
const A4_HEIGHT_IN: f32 = 11.69;
/// Light margin, in modules, required on each side for scanners.
pub const QUIET_ZONE_MODULES: u32 = 10;

/// Target layout for the generated image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLayout {
    /// Barcode plus quiet zone, nothing else.
    Tight,
    /// Barcode centered on an A4 page at `dpi`.
    A4,
}

/// Options controlling PNG generation.
#[derive(Debug, Clone, Copy)]
pub struct ImageRenderOptions {
    /// Pixels per module.
    pub module_px: u32,
    /// Bar height in pixels.
    pub bar_height_px: u32,
    pub caption: bool,
    pub layout: PageLayout,
    /// Only used for page layouts.
    pub dpi: u32,
}

impl Default for ImageRenderOptions {
    fn default() -> Self {
        Self {
            module_px: 2,
            bar_height_px: 80,
            caption: true,
            layout: PageLayout::Tight,
            dpi: 300,
        }
    }
}

struct Palette {
    background: Rgba<u8>,
    page: Rgba<u8>,
    bar: Rgba<u8>,
    text: Rgba<u8>,
}

const PALETTE: Palette = Palette {
    background: Rgba([0xff, 0xff, 0xff, 0xff]),
    page: Rgba([0xff, 0xff, 0xff, 0xff]),
    bar: Rgba([0x00, 0x00, 0x00, 0xff]),
    text: Rgba([0x00, 0x00, 0x00, 0xff]),
};

/// Rasterise a barcode with its quiet zone and optional caption.
pub fn render_barcode_image(pattern: &BitPattern, options: &ImageRenderOptions) -> DynamicImage {
    let module = options.module_px.clamp(1, 20);
    let bar_height = options.bar_height_px.clamp(8, 2000);
    let quiet = QUIET_ZONE_MODULES * module;

    let scale = module;
    let caption_height = if options.caption {
        (GLYPH_HEIGHT as u32 + 4) * scale
    } else {
        0
    };
    let width = pattern.len() as u32 * module + 2 * quiet;
    let height = bar_height + caption_height + 2 * module * 2;
    let top = module * 2;

    let mut img: RgbaImage = ImageBuffer::from_pixel(width, height, PALETTE.background);

    // Draw runs of dark modules as single rectangles.
    let bits = pattern.bits().as_bytes();
    let mut idx = 0;
    while idx < bits.len() {
        if bits[idx] != b'1' {
            idx += 1;
            continue;
        }
        let start = idx;
        while idx < bits.len() && bits[idx] == b'1' {
            idx += 1;
        }
        let x = quiet + start as u32 * module;
        let run = (idx - start) as u32 * module;
        draw_filled_rect_mut(
            &mut img,
            Rect::at(x as i32, top as i32).of_size(run, bar_height),
            PALETTE.bar,
        );
    }

    if options.caption {
        let text_width = pattern.data().chars().count() as u32 * (GLYPH_WIDTH as u32 + 1) * scale;
        let x = (width as i32 - text_width as i32) / 2;
        let y = (top + bar_height + 2 * scale) as i32;
        for (i, ch) in pattern.data().chars().enumerate() {
            let glyph_x = x + (i as u32 * (GLYPH_WIDTH as u32 + 1) * scale) as i32;
            draw_glyph(&mut img, glyph_x, y, ch, PALETTE.text, scale);
        }
    }

    debug!(width, height, module, "rasterised barcode");

    match options.layout {
        PageLayout::Tight => DynamicImage::ImageRgba8(img),
        PageLayout::A4 => {
            let dpi = options.dpi.clamp(72, 1200);
            let page_width = inches_to_px(A4_WIDTH_IN, dpi).max(width);
            let page_height = inches_to_px(A4_HEIGHT_IN, dpi).max(height);
            let mut page = ImageBuffer::from_pixel(page_width, page_height, PALETTE.page);
            let offset_x = ((page_width - width) / 2) as i64;
            let offset_y = ((page_height - height) / 2) as i64;
            overlay(&mut page, &img, offset_x, offset_y);
            DynamicImage::ImageRgba8(page)
        }
    }
}

fn inches_to_px(inches: f32, dpi: u32) -> u32 {
    (inches * dpi as f32).round() as u32
}

fn draw_glyph(image: &mut RgbaImage, x: i32, y: i32, ch: char, color: Rgba<u8>, scale: u32) {
    let pattern = glyph_pattern(ch);
    for (row, bits) in pattern.iter().enumerate() {
        for col in 0..GLYPH_WIDTH {
            if bits & (1 << (GLYPH_WIDTH - 1 - col)) != 0 {
                let px = x + (col as i32 * scale as i32);
                let py = y + (row as i32 * scale as i32);
                draw_filled_rect_mut(image, Rect::at(px, py).of_size(scale, scale), color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::encode;

    fn no_caption() -> ImageRenderOptions {
        ImageRenderOptions {
            caption: false,
            ..ImageRenderOptions::default()
        }
    }

    #[test]
    fn tight_image_includes_quiet_zone() {
        let pattern = encode("A").unwrap();
        let img = render_barcode_image(&pattern, &no_caption()).to_rgba8();
        // 46 modules + 2 * 10 quiet modules, 2px each
        assert_eq!(img.width(), 132);
        assert_eq!(*img.get_pixel(0, 10), PALETTE.background);
        assert_eq!(*img.get_pixel(19, 10), PALETTE.background);
        // First module of Start-B is a bar.
        assert_eq!(*img.get_pixel(20, 10), PALETTE.bar);
    }

    #[test]
    fn columns_follow_the_pattern() {
        let pattern = encode("CW-0042").unwrap();
        let img = render_barcode_image(&pattern, &no_caption()).to_rgba8();
        let row = 4 + 10;
        for (i, bit) in pattern.bits().bytes().enumerate() {
            let x = 20 + i as u32 * 2;
            let expected = if bit == b'1' { PALETTE.bar } else { PALETTE.background };
            assert_eq!(*img.get_pixel(x, row), expected, "module {i}");
            assert_eq!(*img.get_pixel(x + 1, row), expected, "module {i}");
        }
    }

    #[test]
    fn caption_adds_height_and_ink() {
        let pattern = encode("42").unwrap();
        let plain = render_barcode_image(&pattern, &no_caption()).to_rgba8();
        let captioned = render_barcode_image(&pattern, &ImageRenderOptions::default()).to_rgba8();
        assert!(captioned.height() > plain.height());
        let caption_top = plain.height() - 4;
        let inked = (caption_top..captioned.height())
            .flat_map(|y| (0..captioned.width()).map(move |x| (x, y)))
            .any(|(x, y)| *captioned.get_pixel(x, y) == PALETTE.text);
        assert!(inked);
    }

    #[test]
    fn a4_layout_centers_on_page() {
        let pattern = encode("A").unwrap();
        let options = ImageRenderOptions {
            layout: PageLayout::A4,
            dpi: 100,
            ..no_caption()
        };
        let img = render_barcode_image(&pattern, &options);
        assert_eq!(img.width(), 827);
        assert_eq!(img.height(), 1169);
    }
}
