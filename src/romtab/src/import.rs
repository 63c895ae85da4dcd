//! Table import: CSV rows to an event file.
//!
//! The first record's first cell is the placement directive; the rest of
//! that record (the header the exporter wrote) is informational. Every
//! remaining record is one table row: a label cell, then one cell per
//! column. Diagnostics count the header as row 1 and the label as column
//! 1, so the first value cell of the first data row is row 2, column 2.

use thiserror::Error;

use crate::codec::{self, CellError, EmptyCellPolicy};
use crate::emit::{sanitize_identifier, RowMacro};
use crate::layout::TableLayout;
use crate::pointer::{PointerCache, RomImage, GBA_ROM_BASE};
use crate::sheet::Row;

/// Prefix for generated row macros, keeping them out of user namespaces
const MACRO_PREFIX: &str = "_ROMTAB_";

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("table document is empty")]
    Empty,

    #[error("in `{table}`, row {row}, column {col}: {source}")]
    BadCell {
        table: String,
        row: usize,
        col: usize,
        source: CellError,
    },

    #[error("`{0}` requests relocation but no reference ROM was supplied")]
    MissingRom(String),
}

/// Placement directive from a table document's first cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// Write the table at a fixed address expression
    At(String),
    /// Relocate the table and repoint every reference to it
    Inline { label: String },
}

impl Directive {
    /// Parse the first cell of a table document
    pub fn parse(cell: &str) -> Self {
        let cell = cell.trim();
        match cell.strip_prefix("INLINE") {
            Some(rest) => Directive::Inline {
                label: sanitize_identifier(rest.trim()),
            },
            None => Directive::At(cell.to_string()),
        }
    }
}

/// Convert one table document into event-file text.
///
/// `name` is the document's file stem; it names the generated macro and
/// any error coordinates. The pointer cache is consulted (and filled) only
/// when the directive requests relocation, in which case `rom` must be
/// present.
pub fn build_event(
    name: &str,
    layout: &TableLayout,
    rows: &[Row],
    policy: EmptyCellPolicy,
    rom: Option<&RomImage>,
    cache: &mut PointerCache,
) -> Result<String, ImportError> {
    let mut records = rows.iter();
    let first = records.next().ok_or(ImportError::Empty)?;
    let directive = Directive::parse(first.first().map(String::as_str).unwrap_or(""));

    let row_macro = RowMacro::for_layout(
        &format!("{}{}", MACRO_PREFIX, sanitize_identifier(name)),
        layout,
    );

    let mut lines = Vec::new();
    for (data_index, row) in records.enumerate() {
        // cell 0 is the row label; value cells pair up with columns in order
        let cells = row.iter().skip(1);
        let mut entries = Vec::with_capacity(layout.columns.len());

        for (col_index, (field, cell)) in layout.columns.iter().zip(cells).enumerate() {
            let entry =
                codec::encode_cell(cell, field, policy).map_err(|source| ImportError::BadCell {
                    table: name.to_string(),
                    row: data_index + 2,
                    col: col_index + 2,
                    source,
                })?;
            entries.push(entry);
        }

        lines.push(row_macro.invoke(&entries));
    }

    let mut out = String::new();
    out.push_str(&row_macro.definition());
    out.push_str("\n\n");

    match directive {
        Directive::Inline { label } => {
            let rom = rom.ok_or_else(|| ImportError::MissingRom(name.to_string()))?;
            let target = layout.base_offset | GBA_ROM_BASE;

            out.push_str("PUSH\n");
            for &offset in cache.offsets(rom, target) {
                out.push_str(&format!("ORG ${:X}\nPOIN {}\n", offset, label));
            }
            out.push_str("POP\n");
            out.push_str(&format!("ALIGN 4\n{}:\n", label));
            out.push_str(&lines.join("\n"));
            out.push('\n');
        }
        Directive::At(expr) => {
            out.push_str("PUSH\n");
            out.push_str(&format!("ORG {}\n", expr));
            out.push_str(&lines.join("\n"));
            out.push_str("\nPOP\n");
        }
    }

    Ok(out)
}
