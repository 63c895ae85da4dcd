//! Configuration command handlers
//!
//! Handles the `configure` subcommand for setting up romtab CLI defaults.

use anyhow::Result;
use std::path::PathBuf;

use crate::config::{cache_path, Config};

/// Handle the configure command
pub fn handle(rom: Option<PathBuf>, show: bool) -> Result<()> {
    let mut config = Config::load()?;

    if show {
        show_config(&config)?;
        return Ok(());
    }

    if let Some(rom) = rom {
        set_rom(&mut config, rom)?;
    } else {
        println!("Usage: romtab configure --rom PATH/TO/ROM.gba");
    }

    Ok(())
}

/// Display current configuration
fn show_config(config: &Config) -> Result<()> {
    match config.get_rom() {
        Some(rom) => println!("Reference ROM: {}", rom.display()),
        None => println!("No reference ROM configured"),
    }

    if let Ok(path) = Config::config_path() {
        println!("Config file: {}", path.display());
    }
    if let Ok(path) = cache_path() {
        println!("Cache store: {}", path.display());
    }

    Ok(())
}

/// Set the default reference ROM in configuration
fn set_rom(config: &mut Config, rom: PathBuf) -> Result<()> {
    config.set_rom(rom.clone());
    config.save()?;

    println!("Reference ROM configured: {}", rom.display());
    if let Ok(path) = Config::config_path() {
        println!("Config saved to: {}", path.display());
    }

    Ok(())
}
