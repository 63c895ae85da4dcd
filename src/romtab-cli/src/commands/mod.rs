//! Command handlers for romtab CLI
//!
//! Each subcommand has its own module with handler functions.

pub mod cache;
pub mod configure;
pub mod convert;
pub mod rip;

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::config::Config;

/// Get the reference ROM from the argument or the saved configuration
pub fn require_rom(provided: Option<PathBuf>) -> Result<PathBuf> {
    optional_rom(provided)?.context(
        "No reference ROM given. Pass one as an argument or run \
         'romtab configure --rom PATH' to set a default.",
    )
}

/// Like `require_rom`, but a missing ROM is not an error yet - conversion
/// only needs one once a table asks for relocation
pub fn optional_rom(provided: Option<PathBuf>) -> Result<Option<PathBuf>> {
    if let Some(rom) = provided {
        return Ok(Some(rom));
    }

    let config = Config::load()?;
    Ok(config.get_rom().map(PathBuf::from))
}
