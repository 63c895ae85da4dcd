//! Convert command handlers
//!
//! Encodes CSV documents into event files, repointing relocated tables
//! against the reference ROM.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use romtab::{
    build_event, parse_sheet, Directive, EmptyCellPolicy, PointerCache, RomImage, TableLayout,
};

use crate::cli::{ConvertArgs, EmptyCells};
use crate::config;

/// Conversion state shared across a batch. The reference image and the
/// pointer cache load lazily, on the first table that relocates.
struct Session {
    rom_path: Option<PathBuf>,
    image: Option<RomImage>,
    cache: PointerCache,
    cache_loaded: bool,
    policy: EmptyCellPolicy,
    quiet: bool,
}

pub fn handle(args: ConvertArgs) -> Result<()> {
    let policy = match args.empty_cells {
        EmptyCells::Fail => EmptyCellPolicy::Fail,
        EmptyCells::Zero => EmptyCellPolicy::FillZero,
    };

    let mut session = Session {
        rom_path: super::optional_rom(args.rom)?,
        image: None,
        cache: PointerCache::default(),
        cache_loaded: false,
        policy,
        quiet: args.quiet,
    };

    if let Some(csv) = args.csv {
        let module = args.module.unwrap_or_else(|| csv.with_extension("nmm"));
        let out = args.out.unwrap_or_else(|| csv.with_extension("event"));
        session.convert_table(&csv, &module, &out)?;
        return session.finish();
    }

    let folder = args.folder.unwrap_or_else(|| PathBuf::from("."));
    let installer = args
        .installer
        .unwrap_or_else(|| folder.join("Table Installer.event"));

    let mut events = Vec::new();
    for entry in WalkDir::new(&folder) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("csv") {
            continue;
        }

        let out = path.with_extension("event");
        session.convert_table(path, &path.with_extension("nmm"), &out)?;
        events.push(out);
    }

    write_installer(&installer, &events, !args.no_definitions)?;
    if !session.quiet {
        println!("Wrote to {}", installer.display());
    }

    session.finish()
}

impl Session {
    fn convert_table(&mut self, csv: &Path, module: &Path, out: &Path) -> Result<()> {
        let name = csv
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("table")
            .to_string();

        let layout = TableLayout::from_file(module)
            .with_context(|| format!("Failed to parse layout module {}", module.display()))?;

        let text =
            fs::read_to_string(csv).with_context(|| format!("Failed to read {}", csv.display()))?;
        let rows =
            parse_sheet(&text).with_context(|| format!("Failed to parse {}", csv.display()))?;

        // relocation needs the reference image and the cache store
        let relocates = rows
            .first()
            .and_then(|row| row.first())
            .is_some_and(|cell| matches!(Directive::parse(cell), Directive::Inline { .. }));
        if relocates {
            self.ensure_reference()?;
        }

        let event = build_event(
            &name,
            &layout,
            &rows,
            self.policy,
            self.image.as_ref(),
            &mut self.cache,
        )?;

        fs::write(out, event).with_context(|| format!("Failed to write {}", out.display()))?;

        if !self.quiet {
            println!("Wrote to {}", out.display());
        }

        Ok(())
    }

    /// Load the reference image and the cache store, once per session
    fn ensure_reference(&mut self) -> Result<()> {
        if self.image.is_some() {
            return Ok(());
        }

        let rom_path = self.rom_path.clone().context(
            "A table requests relocation but no reference ROM is given. Pass one as an \
             argument or run 'romtab configure --rom PATH' to set a default.",
        )?;

        self.image = Some(
            RomImage::load(&rom_path)
                .with_context(|| format!("Failed to read {}", rom_path.display()))?,
        );

        self.cache = PointerCache::load(&config::cache_path()?);
        self.cache_loaded = true;

        Ok(())
    }

    /// Persist the pointer cache when this batch used it
    fn finish(self) -> Result<()> {
        if self.cache_loaded {
            let path = config::cache_path()?;
            if let Err(err) = self.cache.save(&path) {
                eprintln!("Warning: failed to save pointer cache: {}", err);
            }
        }
        Ok(())
    }
}

/// Write the master installer event including every generated event file
fn write_installer(installer: &Path, events: &[PathBuf], include_definitions: bool) -> Result<()> {
    let mut out = String::from("// Table master installer file generated by romtab\n\n");

    if include_definitions {
        out.push_str("#include \"Table Definitions.txt\"\n\n");
    }

    // include paths are relative to the installer's own directory
    let base = installer.parent().unwrap_or_else(|| Path::new("."));
    for event in events {
        let include = event.strip_prefix(base).unwrap_or(event);
        out.push_str(&format!("#include \"{}\"\n\n", include.display()));
    }

    fs::write(installer, out).with_context(|| format!("Failed to write {}", installer.display()))
}
