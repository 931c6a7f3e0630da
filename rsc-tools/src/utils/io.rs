//! Extracted archive directories
//!
//! Archive containers stay outside this tool: each source is a directory
//! holding the entries of one archive as plain files (`m05050.hei`, ...).

use anyhow::{Context, Result};
use log::debug;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use rsc_landscape::EntrySource;

/// Every regular file of a directory, keyed by lower-cased file name
#[derive(Debug, Default, Clone)]
pub struct EntryDirectory {
    entries: BTreeMap<String, Vec<u8>>,
}

impl EntryDirectory {
    /// Read all entries of `path` into memory
    pub fn load(path: &Path) -> Result<Self> {
        let mut entries = BTreeMap::new();

        let listing = fs::read_dir(path)
            .with_context(|| format!("Failed to read entry directory: {}", path.display()))?;

        for dir_entry in listing {
            let dir_entry = dir_entry
                .with_context(|| format!("Failed to list entries in {}", path.display()))?;
            if !dir_entry.file_type()?.is_file() {
                continue;
            }

            let file_path = dir_entry.path();
            let data = fs::read(&file_path)
                .with_context(|| format!("Failed to read entry: {}", file_path.display()))?;
            let name = dir_entry.file_name().to_string_lossy().to_lowercase();
            entries.insert(name, data);
        }

        debug!("Loaded {} entries from {}", entries.len(), path.display());
        Ok(Self { entries })
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the directory held no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Combined size of all entries
    pub fn total_bytes(&self) -> u64 {
        self.entries.values().map(|data| data.len() as u64).sum()
    }
}

impl EntrySource for EntryDirectory {
    fn entry(&self, name: &str) -> Option<&[u8]> {
        self.entries.get(name).map(Vec::as_slice)
    }
}

/// Write one entry into `dir`, creating the directory if needed
pub fn write_entry(dir: &Path, name: &str, data: &[u8]) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

    let path = dir.join(name);
    fs::write(&path, data).with_context(|| format!("Failed to write entry: {}", path.display()))?;
    Ok(path)
}
