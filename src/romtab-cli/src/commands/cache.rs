//! Pointer cache command handlers

use anyhow::{Context, Result};

use romtab::PointerCache;

use crate::config;

/// Delete every cached scan and persist the empty store
pub fn clear() -> Result<()> {
    let path = config::cache_path()?;

    let mut cache = PointerCache::load(&path);
    cache.clear();
    cache
        .save(&path)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!("Cleared pointer cache at {}", path.display());
    Ok(())
}

/// Show the cache store location and per-image entry counts
pub fn show() -> Result<()> {
    let path = config::cache_path()?;
    let cache = PointerCache::load(&path);

    println!("Cache store: {}", path.display());

    if cache.is_empty() {
        println!("No cached scans");
        return Ok(());
    }

    for (identity, scans) in cache.summary() {
        println!("{}  {} cached scan(s)", identity, scans);
    }

    Ok(())
}
