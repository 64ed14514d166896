// src/db/schema.rs

//! Output database schema
//!
//! The schema is fixed and created fresh on every run; there is no
//! migration machinery because the output artifact is always rebuilt
//! from scratch. Every non-package table carries `(db, package)` as a
//! correlation back to its owning row in `packages`.

use crate::error::Result;
use rusqlite::Connection;
use tracing::debug;

/// Create all output tables on a fresh connection
pub fn create_schema(conn: &Connection) -> Result<()> {
    debug!("Creating output schema");

    conn.execute_batch(
        "
        -- Packages: one row per package per repository
        CREATE TABLE packages (
            db TEXT,
            package TEXT,
            base TEXT,
            version TEXT,
            architecture TEXT,
            description TEXT,
            url TEXT,
            download_bytes INT,
            installed_bytes INT,
            pgp_signature TEXT,
            build_timestamp INT,
            packager TEXT,
            filename TEXT,
            PRIMARY KEY (db, package)
        );

        -- Checksums: one row per *SUM descriptor field
        CREATE TABLE sums (
            db TEXT,
            package TEXT,
            type TEXT,
            sum TEXT
        );

        CREATE TABLE licenses (
            db TEXT,
            package TEXT,
            license TEXT
        );

        CREATE TABLE groups (
            db TEXT,
            package TEXT,
            group_name TEXT
        );

        CREATE TABLE depends (
            db TEXT,
            package TEXT,
            depend_package TEXT,
            version TEXT,
            comparator TEXT
        );

        CREATE TABLE make_depends (
            db TEXT,
            package TEXT,
            depend_package TEXT,
            version TEXT,
            comparator TEXT
        );

        CREATE TABLE check_depends (
            db TEXT,
            package TEXT,
            depend_package TEXT,
            version TEXT,
            comparator TEXT
        );

        -- Opt-depends additionally carries the human-readable reason
        CREATE TABLE opt_depends (
            db TEXT,
            package TEXT,
            depend_package TEXT,
            version TEXT,
            comparator TEXT,
            description TEXT
        );

        CREATE TABLE conflicts (
            db TEXT,
            package TEXT,
            conflict_package TEXT,
            version TEXT,
            comparator TEXT
        );

        CREATE TABLE provides (
            db TEXT,
            package TEXT,
            provide_package TEXT,
            version TEXT,
            comparator TEXT
        );

        CREATE TABLE replaces (
            db TEXT,
            package TEXT,
            replace_package TEXT,
            version TEXT,
            comparator TEXT
        );

        -- Installed file lists, from the optional files database
        CREATE TABLE files (
            db TEXT,
            package TEXT,
            file TEXT
        );
        ",
    )?;

    Ok(())
}
