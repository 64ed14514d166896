// src/db/mod.rs

//! Database layer for pacdb
//!
//! This module handles all SQLite operations including:
//! - Fresh output database creation with the fixed schema
//! - Relational mapping of package descriptors to rows
//! - The transactional row sink used by the conversion driver

pub mod models;
pub mod schema;
pub mod writer;

use crate::error::Result;
use rusqlite::Connection;
use std::path::Path;
use tracing::debug;

/// Create a fresh output database at the specified path.
///
/// The path is expected to be new or empty (the driver always writes to
/// a temporary file); the fixed schema is created immediately. The
/// journal is kept in memory so no sidecar files appear next to the
/// temporary database before it is renamed into place.
pub fn create(db_path: &Path) -> Result<Connection> {
    debug!("Creating output database at: {}", db_path.display());

    let conn = Connection::open(db_path)?;

    conn.execute_batch(
        "
        PRAGMA journal_mode = MEMORY;
        PRAGMA synchronous = NORMAL;
        ",
    )?;

    schema::create_schema(&conn)?;

    Ok(conn)
}
