use thiserror::Error;

/// Number of modules in every data, checksum, or start symbol.
pub const SYMBOL_WIDTH: usize = 11;

/// Value of the Start-B selector, also the seed of the checksum sum.
pub const START_B_VALUE: u8 = 104;

/// Modulus of the Code128 checksum.
pub const CHECKSUM_MODULUS: u32 = 103;

/// Highest value that can appear as a data or checksum symbol.
pub const MAX_SYMBOL_VALUE: u8 = 102;

pub const START_A: &str = "11010000100";
pub const START_B: &str = "11010010000";
pub const START_C: &str = "11010011100";

/// Stop symbol, 13 modules wide because it carries the final 2-module bar.
pub const STOP: &str = "1100011101011";

/// Bar/space patterns indexed by symbol value (0..=102).
///
/// `1` is a dark module, `0` a light module. In subset B, values 0..=94 are
/// the printable ASCII characters 32..=126 and values 95..=102 are control
/// functions which only ever appear here as checksum symbols.
#[rustfmt::skip]
static PATTERNS: [&str; 103] = [
    "11011001100", "11001101100", "11001100110", "10010011000",
    "10010001100", "10001001100", "10011001000", "10011000100",
    "10001100100", "11001001000", "11001000100", "11000100100",
    "10110011100", "10011011100", "10011001110", "10111001100",
    "10011101100", "10011100110", "11001110010", "11001011100",
    "11001001110", "11011100100", "11001110100", "11101101110",
    "11101001100", "11100101100", "11100100110", "11101100100",
    "11100110100", "11100110010", "11011011000", "11011000110",
    "11000110110", "10100011000", "10001011000", "10001000110",
    "10110001000", "10001101000", "10001100010", "11010001000",
    "11000101000", "11000100010", "10110111000", "10110001110",
    "10001101110", "10111011000", "10111000110", "10001110110",
    "11101110110", "11010001110", "11000101110", "11011101000",
    "11011100010", "11011101110", "11101011000", "11101000110",
    "11100010110", "11101101000", "11101100010", "11100011010",
    "11101111010", "11001000010", "11110001010", "10100110000",
    "10100001100", "10010110000", "10010000110", "10000101100",
    "10000100110", "10110010000", "10110000100", "10011010000",
    "10011000010", "10000110100", "10000110010", "11000010010",
    "11001010000", "11110111010", "11000010100", "10001111010",
    "10100111100", "10010111100", "10010011110", "10111100100",
    "10011110100", "10011110010", "11110100100", "11110010100",
    "11110010010", "11011011110", "11011110110", "11110110110",
    "10101111000", "10100011110", "10001011110", "10111101000",
    "10111100010", "11110101000", "11110100010", "10111011110",
    "10111101110", "11101011110", "11110101110",
];

/// Lowest and highest characters encodable in subset B.
const FIRST_PRINTABLE: u32 = 32;
const LAST_PRINTABLE: u32 = 126;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("cannot generate a barcode for an empty identifier")]
    Empty,
    /// Offending character and its 1-based position in the input.
    #[error("unsupported character {0:?} at position {1}")]
    UnsupportedCharacter(char, usize),
}

/// A character set that maps input characters onto Code128 symbol values.
pub trait Symbology {
    fn name(&self) -> &'static str;
    fn symbol_value(&self, ch: char) -> Option<u8>;
    fn is_supported(&self, ch: char) -> bool {
        self.symbol_value(ch).is_some()
    }
}

/// Code128 subset B: printable ASCII, space through `~`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Code128B;

impl Symbology for Code128B {
    fn name(&self) -> &'static str {
        "Code128-B"
    }

    fn symbol_value(&self, ch: char) -> Option<u8> {
        let code = ch as u32;
        if (FIRST_PRINTABLE..=LAST_PRINTABLE).contains(&code) {
            Some((code - FIRST_PRINTABLE) as u8)
        } else {
            None
        }
    }
}

/// Pattern for a symbol value. Covers data values, the three start codes
/// (103..=105) and returns `None` for anything else.
pub fn pattern_for_value(value: u8) -> Option<&'static str> {
    match value {
        0..=MAX_SYMBOL_VALUE => Some(PATTERNS[value as usize]),
        103 => Some(START_A),
        104 => Some(START_B),
        105 => Some(START_C),
        _ => None,
    }
}

/// Pattern for a subset-B character. The character is treated as a
/// one-character input, so a failure reports position 1.
pub fn lookup(ch: char) -> Result<&'static str, EncodeError> {
    Code128B
        .symbol_value(ch)
        .map(|value| PATTERNS[value as usize])
        .ok_or(EncodeError::UnsupportedCharacter(ch, 1))
}

/// Reverse lookup of a data or checksum pattern (0..=102).
pub fn value_for_pattern(bits: &str) -> Option<u8> {
    PATTERNS
        .iter()
        .position(|p| *p == bits)
        .map(|idx| idx as u8)
}

/// Character a subset-B data value stands for, if it is printable.
pub fn char_for_value(value: u8) -> Option<char> {
    if value <= (LAST_PRINTABLE - FIRST_PRINTABLE) as u8 {
        char::from_u32(value as u32 + FIRST_PRINTABLE)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_pattern_is_eleven_modules_of_bits() {
        for (value, p) in PATTERNS.iter().enumerate() {
            assert_eq!(p.len(), SYMBOL_WIDTH, "value {value}");
            assert!(p.chars().all(|c| c == '0' || c == '1'), "value {value}");
            // Each symbol starts with a bar and ends with a space.
            assert!(p.starts_with('1') && p.ends_with('0'), "value {value}");
        }
        assert_eq!(STOP.len(), 13);
    }

    #[test]
    fn every_pattern_has_three_bars() {
        for p in PATTERNS.iter().chain([START_A, START_B, START_C].iter()) {
            let bars = p.split('0').filter(|run| !run.is_empty()).count();
            assert_eq!(bars, 3, "{p}");
        }
    }

    #[test]
    fn patterns_are_unique() {
        let unique: HashSet<&str> = PATTERNS.iter().copied().collect();
        assert_eq!(unique.len(), PATTERNS.len());
        assert!(!unique.contains(START_B));
    }

    #[test]
    fn lookup_maps_printable_ascii() {
        assert_eq!(lookup(' ').unwrap(), "11011001100");
        assert_eq!(lookup('A').unwrap(), "10100011000");
        assert_eq!(lookup('0').unwrap(), "10011101100");
        assert_eq!(lookup('~').unwrap(), "10001011110");
    }

    #[test]
    fn lookup_rejects_outside_subset_b() {
        assert!(matches!(
            lookup('\n'),
            Err(EncodeError::UnsupportedCharacter('\n', _))
        ));
        assert!(lookup('\u{7f}').is_err());
        assert!(lookup('é').is_err());
    }

    #[test]
    fn checksum_only_values_have_patterns() {
        for value in 95..=MAX_SYMBOL_VALUE {
            assert!(pattern_for_value(value).is_some());
            assert_eq!(char_for_value(value), None);
        }
        assert_eq!(pattern_for_value(104), Some(START_B));
        assert_eq!(pattern_for_value(106), None);
    }

    #[test]
    fn reverse_lookup_round_trips_values() {
        assert_eq!(value_for_pattern("10100011000"), Some(33));
        assert_eq!(value_for_pattern(START_B), None);
        assert_eq!(char_for_value(33), Some('A'));
    }
}
