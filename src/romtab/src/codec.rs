//! Field codec: byte windows to cell text and back.
//!
//! Reading direction: a little-endian window of 1 to 8 bytes becomes a
//! decimal or hex cell. Writing direction: a cell becomes one event
//! literal when an aligned code covers the whole field, or one literal
//! per byte when the field is odd-sized or unaligned and has to be
//! decomposed.

use byteorder::{ByteOrder, LittleEndian};
use thiserror::Error;

use crate::layout::{DisplayBase, Field};

/// Errors that can occur while encoding a single cell
#[derive(Error, Debug)]
pub enum CellError {
    #[error("cell is empty")]
    Empty,

    #[error("cell contains a non-literal expression for a decomposed field: `{0}`")]
    NonLiteral(String),

    #[error("value {value} out of range for a {length}-byte field")]
    OutOfRange { value: i128, length: u32 },
}

/// Job-wide policy for empty cells, decided once before a batch starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyCellPolicy {
    /// An empty cell aborts the conversion
    Fail,
    /// Empty cells encode as zero
    FillZero,
}

/// Native code width used to emit a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeWidth {
    Byte,
    Short,
    Word,
}

impl CodeWidth {
    /// Widest aligned code that covers the field exactly.
    ///
    /// Odd-length or unaligned fields always fall back to bytes.
    pub fn for_field(field: &Field) -> Self {
        if field.length == 4 && field.offset % 4 == 0 {
            CodeWidth::Word
        } else if field.length == 2 && field.offset % 2 == 0 {
            CodeWidth::Short
        } else {
            CodeWidth::Byte
        }
    }

    /// Width in bytes
    pub fn bytes(self) -> u32 {
        match self {
            CodeWidth::Byte => 1,
            CodeWidth::Short => 2,
            CodeWidth::Word => 4,
        }
    }

    /// Event-code keyword for this width
    pub fn keyword(self) -> &'static str {
        match self {
            CodeWidth::Byte => "BYTE",
            CodeWidth::Short => "SHORT",
            CodeWidth::Word => "WORD",
        }
    }
}

/// Decode a field window into its cell text.
///
/// `window` must be exactly `field.length` (1 to 8) bytes.
pub fn decode_field(window: &[u8], field: &Field) -> String {
    let value: i128 = if field.signed {
        i128::from(LittleEndian::read_int(window, window.len()))
    } else {
        i128::from(LittleEndian::read_uint(window, window.len()))
    };

    match field.base {
        DisplayBase::Decimal => value.to_string(),
        DisplayBase::Hex => {
            if value < 0 {
                format!("-0x{:X}", -value)
            } else {
                format!("0x{:X}", value)
            }
        }
    }
}

/// Parse an integer literal: optional sign, then `0x`/`0o`/`0b` prefixed
/// digits or plain decimal.
pub fn parse_int_literal(text: &str) -> Option<i128> {
    let text = text.trim();
    let (negative, rest) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };

    let (radix, digits) = if let Some(d) = rest.strip_prefix("0x").or_else(|| rest.strip_prefix("0X")) {
        (16, d)
    } else if let Some(d) = rest.strip_prefix("0o").or_else(|| rest.strip_prefix("0O")) {
        (8, d)
    } else if let Some(d) = rest.strip_prefix("0b").or_else(|| rest.strip_prefix("0B")) {
        (2, d)
    } else {
        (10, rest)
    };

    if digits.is_empty() {
        return None;
    }

    let magnitude = i128::from(u64::from_str_radix(digits, radix).ok()?);
    Some(if negative { -magnitude } else { magnitude })
}

/// Render a masked value as an event literal: small values stay decimal,
/// anything else becomes the dialect's `$` hex form.
fn int_to_literal(value: u64) -> String {
    if value < 100 {
        value.to_string()
    } else {
        format!("${:X}", value)
    }
}

/// Convert a value to exactly `length` little-endian bytes, range-checked
/// against the field's signedness.
fn to_le_bytes(value: i128, length: u32, signed: bool) -> Option<Vec<u8>> {
    let bits = 8 * length;
    let (lo, hi) = if signed {
        (-(1i128 << (bits - 1)), (1i128 << (bits - 1)) - 1)
    } else {
        (0, (1i128 << bits) - 1)
    };

    if value < lo || value > hi {
        return None;
    }

    let raw = (value as u128 & ((1u128 << bits) - 1)) as u64;
    Some(raw.to_le_bytes()[..length as usize].to_vec())
}

/// Encode one cell into its event-literal form.
///
/// A standard field (whose code width covers the whole field) produces a
/// single literal, or passes the cell through in parentheses when it does
/// not parse as an integer - complex expressions are left to the event
/// assembler. A decomposed field produces one byte literal per byte and
/// rejects anything that is not an integer literal, since no single
/// downstream code could hold the expression.
pub fn encode_cell(cell: &str, field: &Field, policy: EmptyCellPolicy) -> Result<String, CellError> {
    let cell = if cell.is_empty() {
        match policy {
            EmptyCellPolicy::Fail => return Err(CellError::Empty),
            EmptyCellPolicy::FillZero => "0",
        }
    } else {
        cell
    };

    if CodeWidth::for_field(field).bytes() == field.length {
        return Ok(match parse_int_literal(cell) {
            Some(value) => {
                let mask = (1u128 << (8 * field.length)) - 1;
                int_to_literal((value as u128 & mask) as u64)
            }
            None => format!("({})", cell),
        });
    }

    // Decomposed field: only a literal can be unpacked into bytes
    let value = parse_int_literal(cell).ok_or_else(|| CellError::NonLiteral(cell.to_string()))?;
    let bytes = to_le_bytes(value, field.length, field.signed).ok_or(CellError::OutOfRange {
        value,
        length: field.length,
    })?;

    Ok(bytes
        .iter()
        .map(|&b| int_to_literal(u64::from(b)))
        .collect::<Vec<_>>()
        .join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(offset: u32, length: u32, signed: bool, base: DisplayBase) -> Field {
        Field {
            description: String::new(),
            offset,
            length,
            signed,
            base,
        }
    }

    #[test]
    fn test_code_width_selection() {
        assert_eq!(
            CodeWidth::for_field(&field(0, 4, false, DisplayBase::Hex)),
            CodeWidth::Word
        );
        assert_eq!(
            CodeWidth::for_field(&field(8, 4, false, DisplayBase::Hex)),
            CodeWidth::Word
        );
        assert_eq!(
            CodeWidth::for_field(&field(2, 2, false, DisplayBase::Hex)),
            CodeWidth::Short
        );

        // unaligned words and shorts decompose
        assert_eq!(
            CodeWidth::for_field(&field(2, 4, false, DisplayBase::Hex)),
            CodeWidth::Byte
        );
        assert_eq!(
            CodeWidth::for_field(&field(1, 2, false, DisplayBase::Hex)),
            CodeWidth::Byte
        );

        // odd lengths always decompose
        assert_eq!(
            CodeWidth::for_field(&field(0, 3, false, DisplayBase::Hex)),
            CodeWidth::Byte
        );
        assert_eq!(
            CodeWidth::for_field(&field(0, 1, false, DisplayBase::Hex)),
            CodeWidth::Byte
        );
    }

    #[test]
    fn test_decode_unsigned_decimal() {
        let f = field(0, 1, false, DisplayBase::Decimal);
        assert_eq!(decode_field(&[0x09], &f), "9");
    }

    #[test]
    fn test_decode_signed_hex() {
        let f = field(0, 2, true, DisplayBase::Hex);
        assert_eq!(decode_field(&[0xFF, 0xFF], &f), "-0x1");
    }

    #[test]
    fn test_decode_little_endian() {
        let f = field(0, 4, false, DisplayBase::Hex);
        assert_eq!(decode_field(&[0x78, 0x56, 0x34, 0x12], &f), "0x12345678");

        let f = field(0, 2, false, DisplayBase::Decimal);
        assert_eq!(decode_field(&[0x01, 0x02], &f), "513");
    }

    #[test]
    fn test_decode_unsigned_keeps_high_bit() {
        let f = field(0, 1, false, DisplayBase::Decimal);
        assert_eq!(decode_field(&[0xFF], &f), "255");
    }

    #[test]
    fn test_parse_int_literal() {
        assert_eq!(parse_int_literal("9"), Some(9));
        assert_eq!(parse_int_literal("-1"), Some(-1));
        assert_eq!(parse_int_literal("0x1F"), Some(0x1F));
        assert_eq!(parse_int_literal("-0x1"), Some(-1));
        assert_eq!(parse_int_literal("0b101"), Some(5));
        assert_eq!(parse_int_literal("0o17"), Some(15));
        assert_eq!(parse_int_literal(" 42 "), Some(42));

        assert_eq!(parse_int_literal("Sword + 1"), None);
        assert_eq!(parse_int_literal("0x"), None);
        assert_eq!(parse_int_literal(""), None);
    }

    #[test]
    fn test_literal_rendering_threshold() {
        assert_eq!(int_to_literal(0), "0");
        assert_eq!(int_to_literal(99), "99");
        assert_eq!(int_to_literal(100), "$64");
        assert_eq!(int_to_literal(0xFFFF), "$FFFF");
    }

    #[test]
    fn test_encode_standard_literal() {
        let f = field(0, 1, false, DisplayBase::Decimal);
        assert_eq!(encode_cell("9", &f, EmptyCellPolicy::Fail).unwrap(), "9");
    }

    #[test]
    fn test_encode_standard_masks_to_width() {
        // -1 in a signed 2-byte field wraps to the field's bit width
        let f = field(0, 2, true, DisplayBase::Hex);
        assert_eq!(
            encode_cell("-1", &f, EmptyCellPolicy::Fail).unwrap(),
            "$FFFF"
        );

        let f = field(0, 1, false, DisplayBase::Decimal);
        assert_eq!(
            encode_cell("0x100", &f, EmptyCellPolicy::Fail).unwrap(),
            "0"
        );
    }

    #[test]
    fn test_encode_standard_expression_passes_through() {
        let f = field(0, 4, false, DisplayBase::Hex);
        assert_eq!(
            encode_cell("ItemTable + 4", &f, EmptyCellPolicy::Fail).unwrap(),
            "(ItemTable + 4)"
        );
    }

    #[test]
    fn test_encode_decomposed_emits_byte_literals() {
        let f = field(1, 3, false, DisplayBase::Hex);
        assert_eq!(
            encode_cell("0x123456", &f, EmptyCellPolicy::Fail).unwrap(),
            "86 52 18"
        );

        let f = field(1, 3, false, DisplayBase::Hex);
        assert_eq!(
            encode_cell("0xABCDEF", &f, EmptyCellPolicy::Fail).unwrap(),
            "$EF $CD $AB"
        );
    }

    #[test]
    fn test_encode_decomposed_rejects_expression() {
        let f = field(1, 3, false, DisplayBase::Hex);
        let err = encode_cell("ItemTable + 4", &f, EmptyCellPolicy::Fail).unwrap_err();
        assert!(matches!(err, CellError::NonLiteral(_)));
    }

    #[test]
    fn test_encode_decomposed_range_checks() {
        let f = field(1, 3, false, DisplayBase::Hex);
        let err = encode_cell("0x1000000", &f, EmptyCellPolicy::Fail).unwrap_err();
        assert!(matches!(err, CellError::OutOfRange { .. }));

        let f = field(1, 3, true, DisplayBase::Hex);
        assert_eq!(
            encode_cell("-1", &f, EmptyCellPolicy::Fail).unwrap(),
            "$FF $FF $FF"
        );
    }

    #[test]
    fn test_encode_empty_cell_policy() {
        let f = field(0, 1, false, DisplayBase::Decimal);

        let err = encode_cell("", &f, EmptyCellPolicy::Fail).unwrap_err();
        assert!(matches!(err, CellError::Empty));

        assert_eq!(encode_cell("", &f, EmptyCellPolicy::FillZero).unwrap(), "0");
    }

    #[test]
    fn test_roundtrip_decoded_cells() {
        // every cell the decoder can produce must re-encode
        let cases = [
            (field(0, 1, false, DisplayBase::Decimal), vec![0x09u8]),
            (field(0, 2, true, DisplayBase::Hex), vec![0xFF, 0xFF]),
            (field(0, 4, false, DisplayBase::Hex), vec![0x78, 0x56, 0x34, 0x12]),
            (field(0, 2, true, DisplayBase::Decimal), vec![0x00, 0x80]),
        ];

        for (f, bytes) in cases {
            let cell = decode_field(&bytes, &f);
            assert!(
                encode_cell(&cell, &f, EmptyCellPolicy::Fail).is_ok(),
                "cell `{}` failed to re-encode",
                cell
            );
        }
    }
}
