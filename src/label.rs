//! Membership-card label artwork: the barcode plus customer and vehicle
//! lines, and derivation of the store+hash reference identifiers printed on
//! it.

use std::fmt::{self, Write};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::debug;

use crate::pattern::BitPattern;
use crate::symbols::EncodeError;
use crate::vector::{self, RenderError, escape_xml, num};

const DEFAULT_LABEL_WIDTH: f64 = 400.0;
const DEFAULT_LABEL_HEIGHT: f64 = 240.0;
/// Padding around the barcode, as a share of label width (sides) or
/// height (bottom).
const SIDE_MARGIN_RATIO: f64 = 0.05;
const MAX_STORE: u32 = 9999;
const HASH_DIGITS: u32 = 9;

#[derive(Debug, Error)]
pub enum LabelError {
    #[error("cannot generate barcode for this identifier: {0}")]
    Encode(#[from] EncodeError),
    #[error("rendering failed: {0}")]
    Render(#[from] RenderError),
    #[error("store number {0} does not fit in four digits")]
    StoreOutOfRange(u32),
    #[error("member key must not be empty")]
    EmptyKey,
}

/// Vehicle printed on the card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Everything needed to draw one membership label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelSpec {
    pub reference: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle: Option<Vehicle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued: Option<NaiveDate>,
    #[serde(default = "default_width")]
    pub width: f64,
    #[serde(default = "default_height")]
    pub height: f64,
}

fn default_width() -> f64 {
    DEFAULT_LABEL_WIDTH
}

fn default_height() -> f64 {
    DEFAULT_LABEL_HEIGHT
}

impl LabelSpec {
    pub fn new<S: Into<String>>(reference: S) -> Self {
        Self {
            reference: reference.into(),
            customer: None,
            vehicle: None,
            plan: None,
            issued: None,
            width: DEFAULT_LABEL_WIDTH,
            height: DEFAULT_LABEL_HEIGHT,
        }
    }

    /// Text lines printed above the barcode, top to bottom.
    pub fn text_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(customer) = self.customer.as_deref().filter(|s| !s.trim().is_empty()) {
            lines.push(customer.trim().to_string());
        }
        if let Some(vehicle) = &self.vehicle {
            let parts: Vec<&str> = [vehicle.color.as_deref(), vehicle.model.as_deref()]
                .into_iter()
                .flatten()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect();
            if !parts.is_empty() {
                lines.push(parts.join(" "));
            }
        }
        let mut footer = Vec::new();
        if let Some(plan) = self.plan.as_deref().filter(|s| !s.trim().is_empty()) {
            footer.push(plan.trim().to_string());
        }
        if let Some(issued) = self.issued {
            footer.push(format!("Issued {}", issued.format("%Y-%m-%d")));
        }
        if !footer.is_empty() {
            lines.push(footer.join(" | "));
        }
        lines
    }

    /// Draw the label as a standalone SVG document.
    ///
    /// The top 40% holds the text lines, the rest the barcode with its own
    /// caption, inset by a side margin.
    pub fn render_svg(&self) -> Result<String, LabelError> {
        let pattern = BitPattern::encode(&self.reference)?;
        let (width, height) = (self.width, self.height);
        let margin = width * SIDE_MARGIN_RATIO;
        let text_area = height * 0.4;
        let barcode = vector::render(
            &pattern,
            pattern.data(),
            width - 2.0 * margin,
            height - text_area - height * SIDE_MARGIN_RATIO,
        )?;

        let lines = self.text_lines();
        let line_height = if lines.is_empty() {
            0.0
        } else {
            text_area / (lines.len() as f64 + 0.5)
        };
        let font_size = (line_height * 0.75).min(height * 0.1);
        let named = self
            .customer
            .as_deref()
            .is_some_and(|s| !s.trim().is_empty());

        let mut svg = String::new();
        let _ = write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = num(width),
            h = num(height),
        );
        let _ = write!(
            svg,
            r##"<rect x="0" y="0" width="{}" height="{}" fill="#ffffff"/>"##,
            num(width),
            num(height)
        );
        for (idx, line) in lines.iter().enumerate() {
            let weight = if idx == 0 && named { "bold" } else { "normal" };
            let _ = write!(
                svg,
                r##"<text x="{}" y="{}" font-family="sans-serif" font-size="{}" font-weight="{}" fill="#000000">{}</text>"##,
                num(margin),
                num(line_height * (idx as f64 + 1.0)),
                num(font_size),
                weight,
                escape_xml(line)
            );
        }
        let _ = write!(
            svg,
            r#"<g transform="translate({} {})">"#,
            num(margin),
            num(text_area)
        );
        barcode.write_body(&mut svg);
        svg.push_str("</g></svg>");

        debug!(
            reference = %self.reference,
            lines = lines.len(),
            bars = barcode.bars.len(),
            "rendered membership label"
        );
        Ok(svg)
    }
}

/// Reference identifier printed on a membership card: four-digit store
/// number followed by nine digits derived from the member key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReferenceId(String);

impl ReferenceId {
    pub fn derive(store: u32, member_key: &str) -> Result<Self, LabelError> {
        if store > MAX_STORE {
            return Err(LabelError::StoreOutOfRange(store));
        }
        let key = member_key.trim();
        if key.is_empty() {
            return Err(LabelError::EmptyKey);
        }
        let digest = Sha256::digest(key.as_bytes());
        let mut head = [0u8; 8];
        head.copy_from_slice(&digest[..8]);
        let suffix = u64::from_be_bytes(head) % 10u64.pow(HASH_DIGITS);
        Ok(Self(format!(
            "{store:04}{suffix:0width$}",
            width = HASH_DIGITS as usize
        )))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Store number encoded in the first four digits.
    pub fn store(&self) -> Option<u32> {
        self.0.get(..4).and_then(|s| s.parse().ok())
    }
}

impl fmt::Display for ReferenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ReferenceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> LabelSpec {
        LabelSpec {
            customer: Some("Dana Ortiz".to_string()),
            vehicle: Some(Vehicle {
                model: Some("Civic".to_string()),
                color: Some("Blue".to_string()),
            }),
            plan: Some("Unlimited Plus".to_string()),
            issued: NaiveDate::from_ymd_opt(2026, 10, 19),
            ..LabelSpec::new("1005123456789")
        }
    }

    #[test]
    fn text_lines_skip_missing_fields() {
        assert_eq!(
            sample().text_lines(),
            vec![
                "Dana Ortiz".to_string(),
                "Blue Civic".to_string(),
                "Unlimited Plus | Issued 2026-10-19".to_string(),
            ]
        );
        assert!(LabelSpec::new("A").text_lines().is_empty());
    }

    #[test]
    fn label_embeds_barcode_and_text() {
        let svg = sample().render_svg().unwrap();
        let pattern = BitPattern::encode("1005123456789").unwrap();
        // label background + barcode background + one per bar
        assert_eq!(svg.matches("<rect").count(), pattern.bar_modules() + 2);
        assert!(svg.contains(">Dana Ortiz</text>"));
        assert!(svg.contains(">1005123456789</text>"));
        assert!(svg.ends_with("</g></svg>"));
    }

    #[test]
    fn label_surfaces_encode_failure() {
        let err = LabelSpec::new("bad\u{1}id").render_svg().unwrap_err();
        assert!(matches!(
            err,
            LabelError::Encode(EncodeError::UnsupportedCharacter('\u{1}', 4))
        ));
        assert!(err.to_string().starts_with("cannot generate barcode"));
    }

    #[test]
    fn label_spec_reads_json_with_defaults() {
        let spec: LabelSpec = serde_json::from_str(
            r#"{"reference":"CW-0042","vehicle":{"model":"F-150"},"issued":"2026-01-05"}"#,
        )
        .unwrap();
        assert_eq!(spec.width, 400.0);
        assert_eq!(spec.height, 240.0);
        assert_eq!(spec.issued, NaiveDate::from_ymd_opt(2026, 1, 5));
        assert_eq!(spec.text_lines(), vec!["F-150".to_string(), "Issued 2026-01-05".to_string()]);
    }

    #[test]
    fn reference_id_is_store_plus_nine_digits() {
        let id = ReferenceId::derive(1005, "member-8841").unwrap();
        assert_eq!(id.as_str().len(), 13);
        assert!(id.as_str().starts_with("1005"));
        assert!(id.as_str().bytes().all(|b| b.is_ascii_digit()));
        assert_eq!(id.store(), Some(1005));
        assert_eq!(id, ReferenceId::derive(1005, "  member-8841 ").unwrap());
        assert_ne!(id, ReferenceId::derive(1005, "member-8842").unwrap());
        assert!(ReferenceId::derive(7, "x").unwrap().as_str().starts_with("0007"));
    }

    #[test]
    fn reference_id_validates_inputs() {
        assert!(matches!(
            ReferenceId::derive(10_000, "k"),
            Err(LabelError::StoreOutOfRange(10_000))
        ));
        assert!(matches!(ReferenceId::derive(1, "  "), Err(LabelError::EmptyKey)));
    }
}
