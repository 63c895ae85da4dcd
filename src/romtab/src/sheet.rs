//! CSV sheet reading and writing.
//!
//! Table documents are plain CSV. The writer quotes every cell and doubles
//! embedded quotes, with `\n` line endings. The reader accepts quoted and
//! bare cells, embedded commas, doubled quotes and newlines inside quoted
//! cells, and either line ending. Fully blank lines are skipped.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SheetError {
    #[error("unterminated quoted cell starting on line {0}")]
    UnterminatedQuote(usize),
}

/// One record: the cells of a single sheet row
pub type Row = Vec<String>;

/// Parse CSV text into rows of cells
pub fn parse_sheet(text: &str) -> Result<Vec<Row>, SheetError> {
    let mut rows = Vec::new();
    let mut row: Row = Vec::new();
    let mut cell = String::new();
    // a comma or quote has committed us to at least one more cell
    let mut pending = false;
    let mut line = 1;

    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                let start_line = line;
                loop {
                    match chars.next() {
                        None => return Err(SheetError::UnterminatedQuote(start_line)),
                        Some('"') => {
                            if chars.peek() == Some(&'"') {
                                chars.next();
                                cell.push('"');
                            } else {
                                break;
                            }
                        }
                        Some('\n') => {
                            line += 1;
                            cell.push('\n');
                        }
                        Some(ch) => cell.push(ch),
                    }
                }
                pending = true;
            }
            ',' => {
                row.push(std::mem::take(&mut cell));
                pending = true;
            }
            '\r' | '\n' => {
                if c == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                line += 1;

                if pending || !cell.is_empty() || !row.is_empty() {
                    row.push(std::mem::take(&mut cell));
                    rows.push(std::mem::take(&mut row));
                }
                pending = false;
            }
            _ => cell.push(c),
        }
    }

    if pending || !cell.is_empty() || !row.is_empty() {
        row.push(cell);
        rows.push(row);
    }

    Ok(rows)
}

/// Render rows as CSV text, quoting every cell
pub fn write_sheet(rows: &[Row]) -> String {
    let mut out = String::new();

    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            out.push('"');
            for ch in cell.chars() {
                if ch == '"' {
                    out.push('"');
                }
                out.push(ch);
            }
            out.push('"');
        }
        out.push('\n');
    }

    out
}
