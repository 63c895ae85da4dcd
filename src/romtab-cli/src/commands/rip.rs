//! Rip command handlers
//!
//! Decodes ROM tables into CSV documents, one per layout module.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use romtab::{export_rows, write_sheet, RomImage, TableLayout};

use crate::cli::RipArgs;

pub fn handle(args: RipArgs) -> Result<()> {
    let rom_path = super::require_rom(args.rom)?;
    let image = RomImage::load(&rom_path)
        .with_context(|| format!("Failed to read {}", rom_path.display()))?;

    if let Some(module) = args.module {
        let layout = TableLayout::from_file(&module)
            .with_context(|| format!("Failed to parse layout module {}", module.display()))?;
        let out = args.out.unwrap_or_else(|| module.with_extension("csv"));
        return rip_table(&layout, &out, &image, args.quiet);
    }

    let folder = args.folder.unwrap_or_else(|| PathBuf::from("."));
    let mut found = false;

    for entry in WalkDir::new(&folder) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("nmm") {
            continue;
        }
        found = true;

        // a malformed module skips that table, not the batch
        let layout = match TableLayout::from_file(path) {
            Ok(layout) => layout,
            Err(err) => {
                eprintln!("Error in {}: {}", path.display(), err);
                continue;
            }
        };

        rip_table(&layout, &path.with_extension("csv"), &image, args.quiet)?;
    }

    if !found && !args.quiet {
        eprintln!("No layout modules found under {}", folder.display());
    }

    Ok(())
}

/// Rip one table against an already-loaded image
fn rip_table(layout: &TableLayout, out: &Path, image: &RomImage, quiet: bool) -> Result<()> {
    let rows = export_rows(layout, image.bytes())
        .with_context(|| format!("Failed to rip `{}`", layout.title))?;

    fs::write(out, write_sheet(&rows))
        .with_context(|| format!("Failed to write {}", out.display()))?;

    if !quiet {
        println!("Wrote to {}", out.display());
    }

    Ok(())
}
