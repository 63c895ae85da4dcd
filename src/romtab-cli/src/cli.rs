//! CLI argument definitions for romtab
//!
//! This module contains all clap-derived structs and enums for CLI parsing.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "romtab")]
#[command(about = "GBA ROM table converter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rip tables out of a ROM into editable CSV documents
    #[command(visible_alias = "r")]
    Rip(RipArgs),

    /// Convert edited CSV documents into event files
    #[command(visible_alias = "c")]
    Convert(ConvertArgs),

    /// Pointer-scan cache operations
    Cache {
        #[command(subcommand)]
        command: CacheCommand,
    },

    /// Configure default settings
    Configure {
        /// Set the default reference ROM
        #[arg(long)]
        rom: Option<PathBuf>,

        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}

#[derive(Args)]
pub struct RipArgs {
    /// Reference ROM image (uses configured default if not provided)
    pub rom: Option<PathBuf>,

    /// Single layout module to rip
    #[arg(short, long)]
    pub module: Option<PathBuf>,

    /// Output CSV for single-module mode (default: module path with .csv)
    #[arg(short, long, requires = "module")]
    pub out: Option<PathBuf>,

    /// Folder to search for layout modules (default: current directory)
    #[arg(short, long, conflicts_with = "module")]
    pub folder: Option<PathBuf>,

    /// Disable per-file console output
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Args)]
pub struct ConvertArgs {
    /// Reference ROM image for repointing (uses configured default if not provided)
    pub rom: Option<PathBuf>,

    /// Single CSV document to convert
    #[arg(short, long)]
    pub csv: Option<PathBuf>,

    /// Layout module for single-CSV mode (default: CSV path with .nmm)
    #[arg(short, long, requires = "csv")]
    pub module: Option<PathBuf>,

    /// Output event file for single-CSV mode (default: CSV path with .event)
    #[arg(short, long, requires = "csv")]
    pub out: Option<PathBuf>,

    /// Folder to search for CSV documents (default: current directory)
    #[arg(short, long, conflicts_with = "csv")]
    pub folder: Option<PathBuf>,

    /// Output installer event (default: [folder]/Table Installer.event)
    #[arg(short, long, conflicts_with = "csv")]
    pub installer: Option<PathBuf>,

    /// Skip the shared definitions include in the installer
    #[arg(long)]
    pub no_definitions: bool,

    /// What to do with empty cells
    #[arg(long, value_enum, default_value_t = EmptyCells::Fail)]
    pub empty_cells: EmptyCells,

    /// Disable per-file console output
    #[arg(short, long)]
    pub quiet: bool,
}

/// Empty-cell policy flag
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum EmptyCells {
    /// Abort the conversion on the first empty cell
    Fail,
    /// Encode empty cells as zero
    Zero,
}

#[derive(Subcommand)]
pub enum CacheCommand {
    /// Delete every cached scan
    Clear,
    /// Show the cache store location and contents
    Show,
}
