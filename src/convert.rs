// src/convert.rs

//! Conversion driver
//!
//! Glue between the sync-database reader and the SQLite sink:
//! - Discover repositories (`*.db` archives, with optional `*.files`
//!   companions) in a pacman sync directory
//! - Convert every repository into one output database, in a single
//!   transaction
//! - Replace the output artifact atomically: write to a temp file in the
//!   destination directory and rename it into place only after a clean
//!   commit

use crate::db::models::PackageRows;
use crate::db::writer::SqlWriter;
use crate::error::{Error, Result};
use crate::sync;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// One repository to convert: a sync archive, its name, and the optional
/// files archive
#[derive(Debug, Clone)]
pub struct Repository {
    pub name: String,
    pub sync_path: PathBuf,
    pub files_path: Option<PathBuf>,
}

/// Discover repositories in a pacman sync directory.
///
/// Every regular `<name>.db` file is a repository; a sibling
/// `<name>.files` archive, when present, supplies the file lists.
/// Results are sorted by name so output is deterministic.
pub fn find_repositories(sync_dir: &Path) -> Result<Vec<Repository>> {
    let mut repositories = Vec::new();

    for entry in std::fs::read_dir(sync_dir)? {
        let entry = entry?;
        let path = entry.path();

        if !entry.file_type()?.is_file() {
            continue;
        }
        let Some(name) = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.strip_suffix(".db"))
        else {
            continue;
        };

        let files_path = path.with_extension("files");
        let files_path = files_path.is_file().then_some(files_path);

        debug!(
            "Found repository {} (files database: {})",
            name,
            files_path.is_some()
        );

        repositories.push(Repository {
            name: name.to_string(),
            sync_path: path,
            files_path,
        });
    }

    repositories.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(repositories)
}

/// Convert a set of repositories into one SQLite database at `output`.
///
/// The output file is created fresh; all rows commit together at the
/// end. Any fatal error leaves the file without committed rows.
pub fn convert(repositories: &[Repository], output: &Path) -> Result<()> {
    let mut writer = SqlWriter::create(output)?;

    for repo in repositories {
        info!("Converting repository: {}", repo.name);
        let mut count = 0usize;

        sync::read_packages(&repo.sync_path, repo.files_path.as_deref(), |package| {
            let rows = PackageRows::build(&repo.name, &package)?;
            writer.write_rows(&rows)?;
            count += 1;
            Ok(())
        })?;

        info!("Converted {} packages from {}", count, repo.name);
    }

    writer.commit()
}

/// Convert repositories, replacing `output` atomically.
///
/// The database is written to a temporary file in the output's
/// directory and only renamed over the destination after a clean,
/// fully committed run. On any error the previous artifact is left
/// untouched.
pub fn convert_atomic(repositories: &[Repository], output: &Path) -> Result<()> {
    let temp = tempfile::Builder::new()
        .prefix(".pacdb-")
        .suffix(".sqlite")
        .tempfile_in(staging_dir(output))?;

    convert(repositories, temp.path())?;

    temp.persist(output)
        .map_err(|e| Error::Io(e.error))?;
    info!("Wrote {}", output.display());

    Ok(())
}

/// Directory the temporary database is staged in.
///
/// Must be the output's own directory: persisting is a rename, which
/// cannot cross filesystems, so the system temp dir is never usable. A
/// bare filename stages in the current directory.
fn staging_dir(output: &Path) -> &Path {
    match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}
