// src/sync/files.rs

//! Files-database index
//!
//! A files database mirrors the sync database layout, adding a `files`
//! entry per package directory (`"<name>-<version>/files"`) that lists
//! the package's installed files. The index is built in one streaming
//! pass and consulted read-only while the sync database is converted.

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::io::Read;
use tar::Archive;
use tracing::debug;

/// Lookup table from `"<name>-<version>"` to that package's file-list
/// descriptor text. Never mutated after construction.
#[derive(Debug, Default)]
pub struct FilesIndex {
    entries: HashMap<String, String>,
}

impl FilesIndex {
    /// Build the index by scanning every entry of a files archive.
    ///
    /// Only regular files whose base name is `files` are retained; the
    /// key is the entry's parent directory component. The entry content
    /// is kept as raw descriptor text and parsed lazily at enrichment
    /// time, since the compressed tar stream cannot be re-read.
    pub fn build<R: Read>(archive: &mut Archive<R>) -> Result<Self> {
        let mut entries = HashMap::new();

        for entry in archive
            .entries()
            .map_err(|e| Error::Decode(format!("Failed to read files archive: {}", e)))?
        {
            let mut entry =
                entry.map_err(|e| Error::Decode(format!("Failed to read archive entry: {}", e)))?;

            if !entry.header().entry_type().is_file() {
                continue;
            }

            let path = entry
                .path()
                .map_err(|e| Error::Decode(format!("Invalid path in archive: {}", e)))?;

            if path.file_name().and_then(|n| n.to_str()) != Some("files") {
                continue;
            }

            let Some(key) = path
                .parent()
                .and_then(|p| p.file_name())
                .and_then(|n| n.to_str())
                .map(str::to_string)
            else {
                continue;
            };

            let mut content = String::new();
            entry
                .read_to_string(&mut content)
                .map_err(|e| Error::Decode(format!("Failed to read files entry {}: {}", key, e)))?;

            entries.insert(key, content);
        }

        debug!("Files index built with {} entries", entries.len());
        Ok(Self { entries })
    }

    /// Look up a package's file-list text by `"<name>-<version>"` key.
    /// An absent key is a normal outcome, not an error.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
