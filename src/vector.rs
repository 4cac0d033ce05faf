//! Vector rendering of a [`BitPattern`]: background, one rectangle per dark
//! module, and a centered caption. Output is plain geometry so any SVG or
//! PDF canvas can draw it.

use std::fmt::Write;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;
use tracing::debug;

use crate::pattern::BitPattern;

/// Share of the canvas height taken by the bars.
pub const BAR_HEIGHT_RATIO: f64 = 0.8;
/// Caption baseline distance from the bottom edge, as a share of height.
pub const CAPTION_MARGIN_RATIO: f64 = 0.04;
/// Caption font size as a share of height.
pub const CAPTION_SIZE_RATIO: f64 = 0.13;
pub const CAPTION_FONT_FAMILY: &str = "monospace";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    #[error("invalid dimensions {width} x {height}: both must be positive")]
    InvalidDimensions { width: f64, height: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Caption {
    pub text: String,
    /// Horizontal center of the text.
    pub x: f64,
    /// Baseline.
    pub y: f64,
    pub font_size: f64,
    pub font_family: &'static str,
}

/// Fully specified drawing of a barcode, in caller units.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorImage {
    pub width: f64,
    pub height: f64,
    pub background: Rect,
    pub bars: Vec<Rect>,
    pub caption: Caption,
}

/// Lay out `pattern` on a `width` x `height` canvas with `data` as caption.
pub fn render(
    pattern: &BitPattern,
    data: &str,
    width: f64,
    height: f64,
) -> Result<VectorImage, RenderError> {
    if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
        return Err(RenderError::InvalidDimensions { width, height });
    }

    let modules = pattern.len() as f64;
    let bar_height = height * BAR_HEIGHT_RATIO;
    // Both edges come from absolute offsets, so rounding never pushes the
    // last bar past `width`.
    let edge = |idx: usize| (width * idx as f64 / modules).min(width);
    let bars: Vec<Rect> = pattern
        .bits()
        .bytes()
        .enumerate()
        .filter(|(_, b)| *b == b'1')
        .map(|(idx, _)| {
            let x = edge(idx);
            Rect {
                x,
                y: 0.0,
                width: edge(idx + 1) - x,
                height: bar_height,
            }
        })
        .collect();

    debug!(bars = bars.len(), modules, width, height, "rendered barcode geometry");

    Ok(VectorImage {
        width,
        height,
        background: Rect {
            x: 0.0,
            y: 0.0,
            width,
            height,
        },
        bars,
        caption: Caption {
            text: data.to_string(),
            x: width / 2.0,
            y: height - height * CAPTION_MARGIN_RATIO,
            font_size: height * CAPTION_SIZE_RATIO,
            font_family: CAPTION_FONT_FAMILY,
        },
    })
}

impl VectorImage {
    /// Standalone SVG document.
    pub fn to_svg(&self) -> String {
        let mut svg = String::new();
        let _ = write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = num(self.width),
            h = num(self.height),
        );
        self.write_body(&mut svg);
        svg.push_str("</svg>");
        svg
    }

    /// `data:` URI with the SVG base64-encoded, ready for an `<img src>`.
    pub fn to_data_uri(&self) -> String {
        format!(
            "data:image/svg+xml;base64,{}",
            STANDARD.encode(self.to_svg().as_bytes())
        )
    }

    /// Shapes without the outer `<svg>` element, for embedding in a larger
    /// drawing.
    pub(crate) fn write_body(&self, svg: &mut String) {
        let bg = &self.background;
        let _ = write!(
            svg,
            r##"<rect x="{}" y="{}" width="{}" height="{}" fill="#ffffff"/>"##,
            num(bg.x),
            num(bg.y),
            num(bg.width),
            num(bg.height)
        );
        svg.push_str(r##"<g fill="#000000" shape-rendering="crispEdges">"##);
        for bar in &self.bars {
            let _ = write!(
                svg,
                r#"<rect x="{}" y="{}" width="{}" height="{}"/>"#,
                num(bar.x),
                num(bar.y),
                num(bar.width),
                num(bar.height)
            );
        }
        svg.push_str("</g>");
        let c = &self.caption;
        let _ = write!(
            svg,
            r##"<text x="{}" y="{}" font-family="{}" font-size="{}" text-anchor="middle" fill="#000000">{}</text>"##,
            num(c.x),
            num(c.y),
            c.font_family,
            num(c.font_size),
            escape_xml(&c.text)
        );
    }
}

/// Fixed four-decimal formatting with trailing zeros trimmed, so output does
/// not depend on float printing quirks.
pub(crate) fn num(value: f64) -> String {
    let s = format!("{value:.4}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

/// Escape markup characters and replace control characters XML 1.0 does
/// not allow with U+FFFD.
pub(crate) fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\t' | '\n' | '\r' => out.push(ch),
            c if c < ' ' => out.push(char::REPLACEMENT_CHARACTER),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::encode;
    use pretty_assertions::assert_eq;

    #[test]
    fn one_rect_per_dark_module() {
        let pattern = encode("1005123456789").unwrap();
        let image = render(&pattern, pattern.data(), 356.0, 100.0).unwrap();
        assert_eq!(pattern.len(), 178);
        assert_eq!(image.bars.len(), pattern.bar_modules());
        assert_eq!(image.bars.len(), 100);
    }

    #[test]
    fn bars_scale_to_canvas() {
        let pattern = encode("CW-0042").unwrap();
        let image = render(&pattern, "CW-0042", 224.0, 50.0).unwrap();
        // 112 modules on 224 units -> 2 units per module
        assert_eq!(image.bars[0], Rect { x: 0.0, y: 0.0, width: 2.0, height: 40.0 });
        for pair in image.bars.windows(2) {
            assert!(pair[0].x < pair[1].x);
        }
        let last = image.bars.last().unwrap();
        assert_eq!(last.x + last.width, 224.0);
        assert_eq!(image.background.width, 224.0);
        assert_eq!(image.caption.x, 112.0);
    }

    #[test]
    fn last_bar_ends_inside_awkward_widths() {
        let pattern = encode("A").unwrap();
        for width in [3.5, 0.3, 7.1, 99.9, 1e-3] {
            let image = render(&pattern, "A", width, 10.0).unwrap();
            let last = image.bars.last().unwrap();
            assert!(last.x + last.width <= width, "width {width}");
            assert!(image.bars.iter().all(|bar| bar.width > 0.0), "width {width}");
        }
    }

    #[test]
    fn rejects_non_positive_dimensions() {
        let pattern = encode("A").unwrap();
        assert!(render(&pattern, "A", 0.0, 10.0).is_err());
        assert!(render(&pattern, "A", 10.0, -1.0).is_err());
        assert!(render(&pattern, "A", f64::NAN, 10.0).is_err());
    }

    #[test]
    fn svg_escapes_caption_and_counts_rects() {
        let pattern = encode("A&B").unwrap();
        let svg = render(&pattern, pattern.data(), 100.0, 40.0).unwrap().to_svg();
        assert!(svg.starts_with("<svg xmlns="));
        assert!(svg.contains(">A&amp;B</text>"));
        assert_eq!(svg.matches("<rect").count(), pattern.bar_modules() + 1);
    }

    #[test]
    fn data_uri_is_base64_svg() {
        let pattern = encode("A").unwrap();
        let image = render(&pattern, "A", 92.0, 30.0).unwrap();
        let uri = image.to_data_uri();
        let payload = uri.strip_prefix("data:image/svg+xml;base64,").unwrap();
        let decoded = STANDARD.decode(payload).unwrap();
        assert_eq!(String::from_utf8(decoded).unwrap(), image.to_svg());
    }

    #[test]
    fn caption_control_characters_are_replaced() {
        assert_eq!(escape_xml("a\u{7}b\u{0}"), "a\u{FFFD}b\u{FFFD}");
        assert_eq!(escape_xml("x\ty"), "x\ty");
        let pattern = encode("CW-0042").unwrap();
        let svg = render(&pattern, "CW\u{1b}0042", 224.0, 50.0).unwrap().to_svg();
        assert!(svg.contains(">CW\u{FFFD}0042</text>"));
        assert!(!svg.contains('\u{1b}'));
    }

    #[test]
    fn numbers_are_trimmed() {
        assert_eq!(num(2.0), "2");
        assert_eq!(num(0.5), "0.5");
        assert_eq!(num(1.0 / 3.0), "0.3333");
        assert_eq!(num(-0.00001), "0");
    }
}
