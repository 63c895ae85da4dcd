//! Pointer scanning with a persisted cache.
//!
//! Repointing a relocated table means rewriting every reference to its old
//! address, and references are 32-bit little-endian words at 4-byte-aligned
//! offsets. Scanning a whole ROM for them is slow enough to be worth
//! caching across runs, so scan results persist in a JSON store keyed by
//! image content hash and target word.
//!
//! The cache never invalidates individual entries; `clear` wipes the whole
//! store. Because keys are content hashes, editing a ROM in place simply
//! produces a new key rather than stale hits.

use byteorder::{ByteOrder, LittleEndian};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// GBA ROM-space mapping of a cartridge file offset
pub const GBA_ROM_BASE: u32 = 0x0800_0000;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A ROM image held in memory together with its content identity
#[derive(Debug, Clone)]
pub struct RomImage {
    bytes: Vec<u8>,
    identity: String,
}

impl RomImage {
    /// Read an image from disk, hashing its contents
    pub fn load(path: &Path) -> Result<Self, std::io::Error> {
        Ok(Self::from_bytes(fs::read(path)?))
    }

    /// Wrap bytes already in memory
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let identity = hex::encode(hasher.finalize());
        RomImage { bytes, identity }
    }

    /// Raw image bytes
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// SHA-256 of the image contents, as lowercase hex
    pub fn identity(&self) -> &str {
        &self.identity
    }
}

/// Return every 4-byte-aligned offset whose little-endian word equals
/// `target`, in ascending order.
///
/// A trailing partial word never matches, and neither does a word image
/// straddling an unaligned offset.
pub fn scan_pointers(image: &[u8], target: u32) -> Vec<u32> {
    image
        .chunks_exact(4)
        .enumerate()
        .filter(|(_, word)| LittleEndian::read_u32(word) == target)
        .map(|(i, _)| (i as u32) << 2)
        .collect()
}

/// Persisted scan results, keyed by image identity and target word
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PointerCache {
    entries: BTreeMap<String, BTreeMap<String, Vec<u32>>>,
}

impl PointerCache {
    /// Load a cache store.
    ///
    /// A missing, unreadable or corrupt store starts empty rather than
    /// failing - the cache is an accelerator, not a source of truth.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_default(),
            Err(_) => PointerCache::default(),
        }
    }

    /// Persist the full store as JSON, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), CacheError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Offsets of every reference to `target` in `rom`, scanning at most
    /// once per (image, target) pair
    pub fn offsets(&mut self, rom: &RomImage, target: u32) -> &[u32] {
        self.entries
            .entry(rom.identity().to_string())
            .or_default()
            .entry(format!("0x{:08X}", target))
            .or_insert_with(|| scan_pointers(rom.bytes(), target))
            .as_slice()
    }

    /// Drop every entry for every image
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// True when nothing is cached
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate (image identity, cached scan count) pairs
    pub fn summary(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(values: &[u32]) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(values.len() * 4);
        for v in values {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        bytes
    }

    #[test]
    fn test_scan_finds_aligned_words() {
        let image = words(&[0, 1, 2, 3, 4, 1, 6, 7]);
        assert_eq!(scan_pointers(&image, 1), vec![4, 20]);
    }

    #[test]
    fn test_scan_ignores_unaligned_match() {
        // 0x01000000 0x00000000: the bytes 01 00 00 00 appear at offset 3,
        // but only aligned words count
        let image = vec![0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00];
        assert_eq!(scan_pointers(&image, 1), Vec::<u32>::new());
    }

    #[test]
    fn test_scan_ignores_trailing_partial_word() {
        let mut image = words(&[5]);
        image.extend_from_slice(&[0x05, 0x00, 0x00]);
        assert_eq!(scan_pointers(&image, 5), vec![0]);
    }

    #[test]
    fn test_scan_no_matches() {
        let image = words(&[1, 2, 3]);
        assert_eq!(scan_pointers(&image, 9), Vec::<u32>::new());
    }

    #[test]
    fn test_cache_scans_once() {
        let rom = RomImage::from_bytes(words(&[0, 1, 2, 1]));
        let mut cache = PointerCache::default();

        assert_eq!(cache.offsets(&rom, 1), &[4, 12]);
        // second call is a cache hit with the same result
        assert_eq!(cache.offsets(&rom, 1), &[4, 12]);
    }

    #[test]
    fn test_cache_distinguishes_images() {
        let a = RomImage::from_bytes(words(&[1]));
        let b = RomImage::from_bytes(words(&[0, 1]));
        let mut cache = PointerCache::default();

        assert_eq!(cache.offsets(&a, 1), &[0]);
        assert_eq!(cache.offsets(&b, 1), &[4]);
    }

    #[test]
    fn test_cache_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = dir.path().join("pointers.json");

        let rom = RomImage::from_bytes(words(&[7, 0, 7]));
        let mut cache = PointerCache::default();
        cache.offsets(&rom, 7);
        cache.save(&store).unwrap();

        let mut reloaded = PointerCache::load(&store);
        assert!(!reloaded.is_empty());
        assert_eq!(reloaded.offsets(&rom, 7), &[0, 8]);
    }

    #[test]
    fn test_corrupt_store_recovers_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = dir.path().join("pointers.json");
        fs::write(&store, "{ not json").unwrap();

        let cache = PointerCache::load(&store);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clear_empties_every_image() {
        let rom = RomImage::from_bytes(words(&[1]));
        let mut cache = PointerCache::default();
        cache.offsets(&rom, 1);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_identity_is_content_derived() {
        let a = RomImage::from_bytes(vec![1, 2, 3]);
        let b = RomImage::from_bytes(vec![1, 2, 3]);
        let c = RomImage::from_bytes(vec![1, 2, 4]);

        assert_eq!(a.identity(), b.identity());
        assert_ne!(a.identity(), c.identity());
        assert_eq!(a.identity().len(), 64);
    }
}
