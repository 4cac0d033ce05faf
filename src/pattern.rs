use std::fmt;

use thiserror::Error;
use tracing::debug;

use crate::symbols::{
    self, CHECKSUM_MODULUS, Code128B, EncodeError, START_B, START_B_VALUE, STOP, SYMBOL_WIDTH,
    Symbology,
};

/// Failure to read a bit pattern back into data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("pattern length {0} is not 11 * symbols + 13")]
    Length(usize),
    #[error("pattern contains {0:?}, only '0' and '1' are allowed")]
    InvalidModule(char),
    #[error("pattern does not begin with the Start-B symbol")]
    MissingStart,
    #[error("pattern does not end with the stop symbol")]
    MissingStop,
    #[error("symbol {0} is not a Code128 pattern")]
    UnknownSymbol(usize),
    #[error("symbol {0} is a control value, not a subset-B character")]
    ControlSymbol(usize),
    #[error("checksum mismatch: pattern carries {found}, data sums to {expected}")]
    Checksum { expected: u8, found: u8 },
}

/// Encoded Code128-B barcode: the module string plus the symbol values it
/// was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitPattern {
    bits: String,
    data: String,
    symbols: Vec<u8>,
}

impl BitPattern {
    /// Encode `data` as Start-B, one symbol per character, checksum, stop.
    pub fn encode(data: &str) -> Result<Self, EncodeError> {
        if data.is_empty() {
            return Err(EncodeError::Empty);
        }

        let enc = Code128B;
        let mut values = symbol_values(&enc, data)?;
        let check = checksum_of_values(&values);
        values.push(check);

        let mut bits = String::with_capacity(expected_len(values.len() - 1));
        bits.push_str(START_B);
        for &value in &values {
            // Every value in 0..=102 is tabulated, checksum included.
            bits.push_str(symbols::pattern_for_value(value).unwrap_or_default());
        }
        bits.push_str(STOP);

        debug!(
            data,
            symbols = values.len(),
            checksum = check,
            modules = bits.len(),
            "encoded {}",
            enc.name()
        );

        Ok(Self {
            bits,
            data: data.to_string(),
            symbols: values,
        })
    }

    /// Module string, `1` for bar and `0` for space.
    pub fn bits(&self) -> &str {
        &self.bits
    }

    /// The data the pattern was encoded from, used for the caption.
    pub fn data(&self) -> &str {
        &self.data
    }

    /// Data symbol values followed by the checksum value.
    pub fn symbols(&self) -> &[u8] {
        &self.symbols
    }

    pub fn checksum(&self) -> u8 {
        self.symbols.last().copied().unwrap_or_default()
    }

    /// Number of modules.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Count of dark modules.
    pub fn bar_modules(&self) -> usize {
        self.bits.bytes().filter(|b| *b == b'1').count()
    }

    pub fn render(&self, style: PatternStyle) -> String {
        match style {
            PatternStyle::Ascii01 => self.bits.clone(),
            PatternStyle::Blocks => self.render_blocks(),
        }
    }

    /// Terminal preview: three rows of full blocks with the data underneath.
    fn render_blocks(&self) -> String {
        let row: String = self
            .bits
            .chars()
            .map(|c| if c == '1' { '█' } else { ' ' })
            .collect();
        let mut out = String::new();
        for _ in 0..3 {
            out.push_str(&row);
            out.push('\n');
        }
        let pad = self.bits.len().saturating_sub(self.data.chars().count()) / 2;
        out.push_str(&" ".repeat(pad));
        out.push_str(&self.data);
        out.push('\n');
        out
    }

    /// Per-symbol listing: role, value, character and pattern.
    pub fn listing(&self) -> String {
        let Some((check, data)) = self.symbols.split_last() else {
            return String::new();
        };
        let mut out = String::new();
        out.push_str(&format!("{:<8} {:>5}  {:<4} {}\n", "START", START_B_VALUE, "", START_B));
        for (idx, &value) in data.iter().enumerate() {
            let ch = symbols::char_for_value(value).unwrap_or('?');
            out.push_str(&format!(
                "{:<8} {:>5}  {:<4} {}\n",
                format!("#{}", idx + 1),
                value,
                format!("{ch:?}"),
                symbols::pattern_for_value(value).unwrap_or_default()
            ));
        }
        out.push_str(&format!(
            "{:<8} {:>5}  {:<4} {}\n",
            "CHECK",
            check,
            "",
            symbols::pattern_for_value(*check).unwrap_or_default()
        ));
        out.push_str(&format!("{:<8} {:>5}  {:<4} {}\n", "STOP", "", "", STOP));
        out
    }
}

impl fmt::Display for BitPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.bits)
    }
}

/// Text views of a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternStyle {
    /// The raw module string.
    Ascii01,
    /// Full-block characters for terminals.
    Blocks,
}

impl fmt::Display for PatternStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternStyle::Ascii01 => write!(f, "ascii-01"),
            PatternStyle::Blocks => write!(f, "blocks"),
        }
    }
}

/// Modulo-103 checksum value for `data`.
///
/// Fails on the first character outside subset B, with the same error
/// [`encode`] reports.
pub fn checksum(data: &str) -> Result<u8, EncodeError> {
    let values = symbol_values(&Code128B, data)?;
    Ok(checksum_of_values(&values))
}

/// Symbol value of every character, 1-based position on failure.
fn symbol_values(enc: &impl Symbology, data: &str) -> Result<Vec<u8>, EncodeError> {
    let mut values = Vec::with_capacity(data.len() + 1);
    for (idx, ch) in data.chars().enumerate() {
        let value = enc
            .symbol_value(ch)
            .ok_or(EncodeError::UnsupportedCharacter(ch, idx + 1))?;
        values.push(value);
    }
    Ok(values)
}

fn checksum_of_values(values: &[u8]) -> u8 {
    let sum = values
        .iter()
        .enumerate()
        .fold(START_B_VALUE as u32, |acc, (idx, &value)| {
            (acc + value as u32 * (idx as u32 + 1)) % CHECKSUM_MODULUS
        });
    sum as u8
}

/// Module count of a pattern carrying `data_len` characters.
pub fn expected_len(data_len: usize) -> usize {
    SYMBOL_WIDTH * (data_len + 2) + STOP.len()
}

/// Encode `data` into a Code128-B module string.
pub fn encode(data: &str) -> Result<BitPattern, EncodeError> {
    BitPattern::encode(data)
}

/// Read a module string back into its data, checking start, stop and
/// checksum the way a scanner would.
pub fn decode(bits: &str) -> Result<String, DecodeError> {
    if let Some(bad) = bits.chars().find(|c| *c != '0' && *c != '1') {
        return Err(DecodeError::InvalidModule(bad));
    }
    let len = bits.len();
    if len < expected_len(1) || (len - STOP.len()) % SYMBOL_WIDTH != 0 {
        return Err(DecodeError::Length(len));
    }
    if !bits.starts_with(START_B) {
        return Err(DecodeError::MissingStart);
    }
    if !bits.ends_with(STOP) {
        return Err(DecodeError::MissingStop);
    }

    let body = &bits[SYMBOL_WIDTH..len - STOP.len()];
    let mut values = Vec::with_capacity(body.len() / SYMBOL_WIDTH);
    for (idx, chunk) in body.as_bytes().chunks(SYMBOL_WIDTH).enumerate() {
        // Input was checked to be ASCII above.
        let chunk = std::str::from_utf8(chunk).map_err(|_| DecodeError::UnknownSymbol(idx + 1))?;
        let value = symbols::value_for_pattern(chunk).ok_or(DecodeError::UnknownSymbol(idx + 1))?;
        values.push(value);
    }

    let (found, data_values) = values.split_last().ok_or(DecodeError::Length(len))?;
    let expected = checksum_of_values(data_values);
    if expected != *found {
        return Err(DecodeError::Checksum {
            expected,
            found: *found,
        });
    }

    data_values
        .iter()
        .enumerate()
        .map(|(idx, &value)| symbols::char_for_value(value).ok_or(DecodeError::ControlSymbol(idx + 1)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn single_letter_matches_hand_computed_pattern() {
        let pattern = encode("A").unwrap();
        // (104 + 33 * 1) mod 103
        assert_eq!(pattern.checksum(), 34);
        assert_eq!(
            pattern.bits(),
            "1101001000010100011000100010110001100011101011"
        );
        assert_eq!(pattern.symbols(), &[33, 34]);
    }

    #[test]
    fn checksum_weights_positions_from_one() {
        // H=40, i=73, !=1 -> 104 + 40 + 146 + 3 = 293 -> 87
        assert_eq!(checksum("Hi!"), Ok(87));
        assert_eq!(checksum("1005123456789"), Ok(89));
    }

    #[test]
    fn checksum_rejects_characters_outside_subset_b() {
        assert_eq!(checksum("AB"), Ok(102));
        assert_eq!(
            checksum("A\u{7}B"),
            Err(EncodeError::UnsupportedCharacter('\u{7}', 2))
        );
        assert_eq!(
            checksum("CW-ü"),
            Err(EncodeError::UnsupportedCharacter('ü', 4))
        );
    }

    #[test]
    fn checksum_outside_printable_range_still_encodes() {
        // "Hi!" checks to 87, a control value with no subset-B character.
        let pattern = encode("Hi!").unwrap();
        assert_eq!(pattern.checksum(), 87);
        assert_eq!(pattern.len(), expected_len(3));
        assert_eq!(decode(pattern.bits()).unwrap(), "Hi!");
    }

    #[test]
    fn empty_input_is_rejected() {
        assert_eq!(encode(""), Err(EncodeError::Empty));
    }

    #[test]
    fn unsupported_character_reports_position() {
        assert_eq!(
            encode("AB\tC"),
            Err(EncodeError::UnsupportedCharacter('\t', 3))
        );
        assert_eq!(
            encode("ü1"),
            Err(EncodeError::UnsupportedCharacter('ü', 1))
        );
    }

    #[test]
    fn blocks_view_has_caption() {
        let view = encode("A").unwrap().render(PatternStyle::Blocks);
        let lines: Vec<&str> = view.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0].chars().count(), 46);
        assert_eq!(lines[3].trim(), "A");
    }

    #[test]
    fn listing_names_every_symbol() {
        let listing = encode("AB").unwrap().listing();
        assert_eq!(listing.lines().count(), 5);
        assert!(listing.starts_with("START"));
        assert!(listing.contains("'B'"));
        assert!(listing.lines().last().unwrap().starts_with("STOP"));
    }

    #[test]
    fn decode_rejects_tampered_checksum() {
        let pattern = encode("CW-0042").unwrap();
        let bits = pattern.bits();
        let check_at = bits.len() - STOP.len() - SYMBOL_WIDTH;
        let other = symbols::pattern_for_value((pattern.checksum() + 1) % 103).unwrap();
        let tampered = format!("{}{}{}", &bits[..check_at], other, STOP);
        assert!(matches!(
            decode(&tampered),
            Err(DecodeError::Checksum { .. })
        ));
    }

    #[test]
    fn decode_rejects_malformed_input() {
        assert_eq!(decode("10x"), Err(DecodeError::InvalidModule('x')));
        assert_eq!(decode("1101"), Err(DecodeError::Length(4)));
        let bits = encode("A").unwrap().bits().replacen(START_B, symbols::START_A, 1);
        assert_eq!(decode(&bits), Err(DecodeError::MissingStart));
    }
}
