// src/sync/mod.rs

//! Sync-database reading
//!
//! This module streams pacman database archives (compressed tarballs of
//! per-package descriptors) and produces [`PackageDescriptor`]s:
//! - Compression is detected by magic bytes (gzip, xz, or zstd)
//! - Entries are visited sequentially, never materialized in memory
//! - When a files database is supplied, each package is enriched with
//!   its `%FILES%` field via a [`FilesIndex`] built once up front

pub mod depends;
pub mod descriptor;
pub mod files;

use crate::error::{Error, Result};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use tar::Archive;
use tracing::{debug, warn};
use xz2::read::XzDecoder;

pub use depends::{Comparator, DependencySpec};
pub use descriptor::PackageDescriptor;
pub use files::FilesIndex;

const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];
const XZ_MAGIC: [u8; 6] = [0xFD, 0x37, 0x7A, 0x58, 0x5A, 0x00];
const ZSTD_MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];

/// Open a pacman database archive for streaming.
///
/// Detects the compression from the file's magic bytes (gzip is the
/// pacman default; xz and zstd also occur) and wraps the file in the
/// matching streaming decoder. Unrecognized magic is a fatal decode
/// error. The file and decoder are released when the archive is dropped,
/// on every exit path.
pub fn open_archive(path: &Path) -> Result<Archive<Box<dyn Read>>> {
    let mut file = File::open(path)?;

    let mut magic = [0u8; 6];
    let n = file.read(&mut magic)?;
    file.seek(SeekFrom::Start(0))?;

    let reader: Box<dyn Read> = if n >= 2 && magic[0..2] == GZIP_MAGIC {
        debug!("Opening gzip database: {}", path.display());
        Box::new(GzDecoder::new(file))
    } else if n >= 6 && magic == XZ_MAGIC {
        debug!("Opening xz database: {}", path.display());
        Box::new(XzDecoder::new(file))
    } else if n >= 4 && magic[0..4] == ZSTD_MAGIC {
        debug!("Opening zstd database: {}", path.display());
        Box::new(
            zstd::stream::read::Decoder::new(file)
                .map_err(|e| Error::Decode(format!("Failed to open zstd stream: {}", e)))?,
        )
    } else {
        return Err(Error::Decode(format!(
            "Unrecognized compression in {}",
            path.display()
        )));
    };

    Ok(Archive::new(reader))
}

/// Stream every package descriptor out of a sync database.
///
/// Opens `sync_path`, walks its regular-file entries, parses each one as
/// a descriptor, optionally enriches it from the files database at
/// `files_path`, and hands it to `visit`. Visitor errors propagate and
/// abort the run. Malformed descriptor entries (content before the first
/// field marker) are discarded with a warning; a missing files-database
/// correlation is also only a warning.
pub fn read_packages<F>(sync_path: &Path, files_path: Option<&Path>, mut visit: F) -> Result<()>
where
    F: FnMut(PackageDescriptor) -> Result<()>,
{
    let files_index = match files_path {
        Some(path) => {
            let mut archive = open_archive(path)?;
            Some(FilesIndex::build(&mut archive)?)
        }
        None => None,
    };

    let mut archive = open_archive(sync_path)?;

    for entry in archive
        .entries()
        .map_err(|e| Error::Decode(format!("Failed to read sync archive: {}", e)))?
    {
        let mut entry =
            entry.map_err(|e| Error::Decode(format!("Failed to read archive entry: {}", e)))?;

        if !entry.header().entry_type().is_file() {
            continue;
        }

        let entry_name = entry
            .path()
            .map_err(|e| Error::Decode(format!("Invalid path in archive: {}", e)))?
            .to_string_lossy()
            .into_owned();

        let mut content = String::new();
        entry
            .read_to_string(&mut content)
            .map_err(|e| Error::Decode(format!("Failed to read entry {}: {}", entry_name, e)))?;

        let Some(mut package) = PackageDescriptor::parse(&content) else {
            warn!("Discarding malformed descriptor entry: {}", entry_name);
            continue;
        };

        if package.is_empty() {
            debug!("Skipping empty entry: {}", entry_name);
            continue;
        }

        if let Some(index) = &files_index {
            enrich_with_files(&mut package, index);
        }

        visit(package)?;
    }

    Ok(())
}

/// Merge a package's `%FILES%` field in from the files index.
///
/// The merge is additive: only `FILES` is taken from the files-database
/// descriptor, and an already-present field is never overwritten. A
/// missing correlation is logged and the package proceeds without files.
fn enrich_with_files(package: &mut PackageDescriptor, index: &FilesIndex) {
    let (Some(name), Some(version)) = (package.name(), package.version()) else {
        return;
    };
    let key = format!("{}-{}", name, version);

    match index.get(&key) {
        Some(text) => {
            if let Some(files_desc) = PackageDescriptor::parse(text) {
                if let Some(files) = files_desc.get("FILES") {
                    package.insert_if_absent("FILES", files);
                }
            } else {
                warn!("Discarding malformed files entry for {}", key);
            }
        }
        None => warn!("No files-database entry for {}", key),
    }
}
