//! # romtab
//!
//! GBA ROM table library - rip fixed-layout record tables out of a ROM
//! image into editable CSV, and convert edited CSV back into buildable
//! event code.
//!
//! This library provides functionality to:
//! - Parse table-layout modules (offset, stride, typed fields)
//! - Decode table rows out of a ROM image into CSV cells
//! - Encode CSV cells back into width-grouped event macros
//! - Scan a ROM for aligned pointer words, with a persisted cache, to
//!   repoint relocated tables
//!
//! ## Example
//!
//! ```no_run
//! use std::fs;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let layout = romtab::TableLayout::from_file(Path::new("Item Table.nmm"))?;
//! let rom = romtab::RomImage::load(Path::new("game.gba"))?;
//!
//! // Rip the table to CSV
//! let rows = romtab::export_rows(&layout, rom.bytes())?;
//! fs::write("Item Table.csv", romtab::write_sheet(&rows))?;
//!
//! // ... edit the CSV ...
//!
//! // Convert it back to event code
//! let rows = romtab::parse_sheet(&fs::read_to_string("Item Table.csv")?)?;
//! let mut cache = romtab::PointerCache::default();
//! let event = romtab::build_event(
//!     "Item Table",
//!     &layout,
//!     &rows,
//!     romtab::EmptyCellPolicy::Fail,
//!     Some(&rom),
//!     &mut cache,
//! )?;
//! fs::write("Item Table.event", event)?;
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod emit;
pub mod export;
pub mod import;
pub mod layout;
pub mod pointer;
pub mod sheet;

// Re-export commonly used items
#[doc(inline)]
pub use codec::{decode_field, encode_cell, CellError, CodeWidth, EmptyCellPolicy};
#[doc(inline)]
pub use emit::{sanitize_identifier, RowMacro};
#[doc(inline)]
pub use export::{export_rows, ExportError};
#[doc(inline)]
pub use import::{build_event, Directive, ImportError};
#[doc(inline)]
pub use layout::{DisplayBase, Field, LayoutError, TableLayout};
#[doc(inline)]
pub use pointer::{scan_pointers, CacheError, PointerCache, RomImage, GBA_ROM_BASE};
#[doc(inline)]
pub use sheet::{parse_sheet, write_sheet, Row, SheetError};
