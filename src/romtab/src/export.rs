//! Table export: ROM bytes to CSV rows.

use thiserror::Error;

use crate::codec;
use crate::layout::TableLayout;
use crate::sheet::Row;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("field window 0x{start:X}..0x{end:X} is outside the image (size 0x{size:X})")]
    OutOfBounds {
        start: usize,
        end: usize,
        size: usize,
    },
}

/// Decode every row of `layout` out of `image` into CSV rows.
///
/// The first row is the header: the table's base offset followed by the
/// field descriptions. Data rows keep table order. Labels come from the
/// layout's entry-name list where present and non-empty, falling back to
/// the row index in hex.
pub fn export_rows(layout: &TableLayout, image: &[u8]) -> Result<Vec<Row>, ExportError> {
    let mut rows = Vec::with_capacity(layout.row_count as usize + 1);

    let mut header: Row = vec![format!("0x{:X}", layout.base_offset)];
    header.extend(layout.columns.iter().map(|f| f.description.clone()));
    rows.push(header);

    for row in 0..layout.row_count {
        let row_offset = layout.base_offset as usize + row as usize * layout.row_stride as usize;

        let label = match layout.entry_names.get(row as usize) {
            Some(name) if !name.is_empty() => name.clone(),
            _ => format!("0x{:X}", row),
        };

        let mut cells: Row = Vec::with_capacity(layout.columns.len() + 1);
        cells.push(label);

        for field in &layout.columns {
            let start = row_offset + field.offset as usize;
            let end = start + field.length as usize;
            let window = image.get(start..end).ok_or(ExportError::OutOfBounds {
                start,
                end,
                size: image.len(),
            })?;
            cells.push(codec::decode_field(window, field));
        }

        rows.push(cells);
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{DisplayBase, Field};

    fn item_layout() -> TableLayout {
        TableLayout {
            title: "Item Table".to_string(),
            base_offset: 4,
            row_count: 2,
            row_stride: 4,
            columns: vec![
                Field {
                    description: "Might".to_string(),
                    offset: 0,
                    length: 1,
                    signed: false,
                    base: DisplayBase::Decimal,
                },
                Field {
                    description: "Weight".to_string(),
                    offset: 2,
                    length: 2,
                    signed: true,
                    base: DisplayBase::Hex,
                },
            ],
            entry_names: vec!["Iron Sword".to_string()],
        }
    }

    #[test]
    fn test_export_header_and_rows() {
        let image = [
            0xAA, 0xAA, 0xAA, 0xAA, // padding before the table
            0x09, 0x00, 0xFF, 0xFF, // row 0
            0x63, 0x00, 0x10, 0x00, // row 1
        ];

        let rows = export_rows(&item_layout(), &image).unwrap();

        assert_eq!(rows[0], vec!["0x4", "Might", "Weight"]);
        assert_eq!(rows[1], vec!["Iron Sword", "9", "-0x1"]);
        // no entry name for row 1: the row index stands in
        assert_eq!(rows[2], vec!["0x1", "99", "0x10"]);
    }

    #[test]
    fn test_export_row_order_is_table_order() {
        let mut layout = item_layout();
        layout.entry_names.clear();

        let image = [
            0, 0, 0, 0, //
            1, 0, 0, 0, //
            2, 0, 0, 0, //
        ];
        let rows = export_rows(&layout, &image).unwrap();

        assert_eq!(rows[1][1], "1");
        assert_eq!(rows[2][1], "2");
    }

    #[test]
    fn test_export_out_of_bounds() {
        let image = [0u8; 8]; // table needs 4 + 2*4 bytes
        let err = export_rows(&item_layout(), &image).unwrap_err();

        let ExportError::OutOfBounds { end, size, .. } = err;
        assert!(end > size);
    }

    #[test]
    fn test_export_empty_table() {
        let mut layout = item_layout();
        layout.row_count = 0;

        let rows = export_rows(&layout, &[]).unwrap();
        assert_eq!(rows.len(), 1); // header only
    }
}
