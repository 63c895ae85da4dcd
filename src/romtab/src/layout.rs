//! Table layout modules.
//!
//! A layout module describes one fixed-stride record table inside a ROM
//! image: where it lives, how many rows it has, and the typed fields that
//! make up one row. Modules are line-oriented text files:
//!
//! ```text
//! # comment lines start with '#', blank lines are ignored
//! 1                 format version
//! Item Table        module title
//! 0xB808            table offset in the ROM
//! 156               row count
//! 36                row stride in bytes
//! NULL              entry-name list file, or NULL
//! ```
//!
//! followed by one four-line block per field: description, byte offset
//! within the row, byte length, and a type code. Type codes are four
//! letters - `N`, then `E` (edit) or `D` (dropdown, which carries one
//! extra reference-file line that is skipped), then `H` (hex) or `D`
//! (decimal), then `U` (unsigned) or `S` (signed). `NEHU` is an unsigned
//! hex edit field, `NEDS` a signed decimal one.
//!
//! An entry-name list file is plain text with one row label per line.

use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported module format version `{0}`")]
    UnsupportedVersion(String),

    #[error("line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("module ended before {0}")]
    Truncated(&'static str),
}

/// Display base for a decoded field value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayBase {
    Decimal,
    Hex,
}

/// One fixed-width field within a table row
#[derive(Debug, Clone)]
pub struct Field {
    /// Human-readable column description
    pub description: String,
    /// Byte offset within a row
    pub offset: u32,
    /// Width in bytes, 1 to 8
    pub length: u32,
    /// Interpret the bytes as a signed value
    pub signed: bool,
    /// Base used when displaying the decoded value
    pub base: DisplayBase,
}

/// A fixed-stride record table and its column layout
#[derive(Debug, Clone)]
pub struct TableLayout {
    /// Module title
    pub title: String,
    /// Absolute offset of the table in the ROM image
    pub base_offset: u32,
    /// Number of rows
    pub row_count: u32,
    /// Byte distance between consecutive rows
    pub row_stride: u32,
    /// Fields of one row; order defines both CSV column order and
    /// macro-argument order
    pub columns: Vec<Field>,
    /// Row labels; may be shorter than `row_count`
    pub entry_names: Vec<String>,
}

/// Meaningful module lines with their 1-based line numbers
struct ModuleLines<'a> {
    inner: std::iter::Enumerate<std::str::Lines<'a>>,
}

impl<'a> ModuleLines<'a> {
    fn new(text: &'a str) -> Self {
        ModuleLines {
            inner: text.lines().enumerate(),
        }
    }

    /// Next non-blank, non-comment line, or a truncation error naming what
    /// was expected
    fn next_value(&mut self, expected: &'static str) -> Result<(usize, &'a str), LayoutError> {
        for (idx, raw) in self.inner.by_ref() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            return Ok((idx + 1, line));
        }
        Err(LayoutError::Truncated(expected))
    }

    /// Like `next_value`, but `Ok(None)` at end of input
    fn try_next_value(&mut self) -> Option<(usize, &'a str)> {
        for (idx, raw) in self.inner.by_ref() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            return Some((idx + 1, line));
        }
        None
    }
}

fn parse_number(line: usize, text: &str) -> Result<u32, LayoutError> {
    let value = crate::codec::parse_int_literal(text).ok_or_else(|| LayoutError::Malformed {
        line,
        reason: format!("expected a number, got `{}`", text),
    })?;

    u32::try_from(value).map_err(|_| LayoutError::Malformed {
        line,
        reason: format!("number out of range: `{}`", text),
    })
}

/// Decode a field type code into (is dropdown, display base, signed)
fn parse_type_code(line: usize, code: &str) -> Result<(bool, DisplayBase, bool), LayoutError> {
    let malformed = || LayoutError::Malformed {
        line,
        reason: format!("bad field type code `{}`", code),
    };

    let bytes = code.as_bytes();
    if bytes.len() != 4 || bytes[0] != b'N' {
        return Err(malformed());
    }

    let dropdown = match bytes[1] {
        b'E' => false,
        b'D' => true,
        _ => return Err(malformed()),
    };

    let base = match bytes[2] {
        b'H' => DisplayBase::Hex,
        b'D' => DisplayBase::Decimal,
        _ => return Err(malformed()),
    };

    let signed = match bytes[3] {
        b'U' => false,
        b'S' => true,
        _ => return Err(malformed()),
    };

    Ok((dropdown, base, signed))
}

impl TableLayout {
    /// Parse module text.
    ///
    /// Returns the layout (with `entry_names` still empty) and the name of
    /// the entry-name list file referenced by the header, if any.
    pub fn parse(text: &str) -> Result<(Self, Option<String>), LayoutError> {
        let mut lines = ModuleLines::new(text);

        let (_, version) = lines.next_value("format version")?;
        if version != "1" {
            return Err(LayoutError::UnsupportedVersion(version.to_string()));
        }

        let (_, title) = lines.next_value("module title")?;
        let (line, offset) = lines.next_value("table offset")?;
        let base_offset = parse_number(line, offset)?;
        let (line, count) = lines.next_value("row count")?;
        let row_count = parse_number(line, count)?;
        let (line, stride) = lines.next_value("row stride")?;
        let row_stride = parse_number(line, stride)?;
        let (_, names_file) = lines.next_value("entry-name list")?;

        let names_file = if names_file == "NULL" {
            None
        } else {
            Some(names_file.to_string())
        };

        let mut columns = Vec::new();
        while let Some((_, description)) = lines.try_next_value() {
            let (line, offset) = lines.next_value("field offset")?;
            let offset = parse_number(line, offset)?;
            let (line, length) = lines.next_value("field length")?;
            let length = parse_number(line, length)?;
            let (code_line, code) = lines.next_value("field type code")?;
            let (dropdown, base, signed) = parse_type_code(code_line, code)?;

            if dropdown {
                // dropdown reference file, unused here
                lines.next_value("dropdown reference file")?;
            }

            if !(1..=8).contains(&length) {
                return Err(LayoutError::Malformed {
                    line,
                    reason: format!("field `{}` has unsupported length {}", description, length),
                });
            }

            if u64::from(offset) + u64::from(length) > u64::from(row_stride) {
                return Err(LayoutError::Malformed {
                    line,
                    reason: format!(
                        "field `{}` extends past the row stride ({} + {} > {})",
                        description, offset, length, row_stride
                    ),
                });
            }

            columns.push(Field {
                description: description.to_string(),
                offset,
                length,
                signed,
                base,
            });
        }

        let layout = TableLayout {
            title: title.to_string(),
            base_offset,
            row_count,
            row_stride,
            columns,
            entry_names: Vec::new(),
        };

        Ok((layout, names_file))
    }

    /// Load a module from disk, resolving its entry-name list relative to
    /// the module's directory.
    pub fn from_file(path: &Path) -> Result<Self, LayoutError> {
        let text = fs::read_to_string(path)?;
        let (mut layout, names_file) = Self::parse(&text)?;

        if let Some(names_file) = names_file {
            let names_path = match path.parent() {
                Some(parent) => parent.join(&names_file),
                None => Path::new(&names_file).to_path_buf(),
            };
            let names = fs::read_to_string(names_path)?;
            layout.entry_names = names.lines().map(|l| l.trim().to_string()).collect();
        }

        Ok(layout)
    }
}
