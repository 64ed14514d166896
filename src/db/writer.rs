// src/db/writer.rs

//! Transactional row sink
//!
//! The writer owns the output connection for the whole run. All rows go
//! into a single transaction that only commits at the very end, so the
//! output file never holds a partial result: dropping the writer without
//! committing rolls everything back.

use crate::db;
use crate::db::models::PackageRows;
use crate::error::Result;
use rusqlite::Connection;
use std::path::Path;
use tracing::debug;

/// SQLite row sink for one conversion run
pub struct SqlWriter {
    conn: Connection,
}

impl SqlWriter {
    /// Create the output database, its schema, and open the run-wide
    /// transaction.
    pub fn create(path: &Path) -> Result<Self> {
        let conn = db::create(path)?;
        conn.execute_batch("BEGIN")?;
        Ok(Self { conn })
    }

    /// Write every row of one package's row set
    pub fn write_rows(&mut self, rows: &PackageRows) -> Result<()> {
        rows.package.insert(&self.conn)?;
        for sum in &rows.sums {
            sum.insert(&self.conn)?;
        }
        for license in &rows.licenses {
            license.insert(&self.conn)?;
        }
        for group in &rows.groups {
            group.insert(&self.conn)?;
        }
        for depend in &rows.depends {
            depend.insert(&self.conn)?;
        }
        for file in &rows.files {
            file.insert(&self.conn)?;
        }
        Ok(())
    }

    /// Commit the run, consuming the writer
    pub fn commit(self) -> Result<()> {
        self.conn.execute_batch("COMMIT")?;
        debug!("Output transaction committed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::descriptor::PackageDescriptor;
    use tempfile::NamedTempFile;

    fn rows(db: &str, content: &str) -> PackageRows {
        let desc = PackageDescriptor::parse(content).unwrap();
        PackageRows::build(db, &desc).unwrap()
    }

    #[test]
    fn test_write_and_commit() {
        let temp_file = NamedTempFile::new().unwrap();

        let mut writer = SqlWriter::create(temp_file.path()).unwrap();
        writer
            .write_rows(&rows(
                "core",
                "%NAME%\nfoo\n%VERSION%\n1.0-1\n%DEPENDS%\nbar>=2.0\nbaz\n",
            ))
            .unwrap();
        writer.commit().unwrap();

        let conn = Connection::open(temp_file.path()).unwrap();
        let packages: i64 = conn
            .query_row("SELECT count(*) FROM packages", [], |row| row.get(0))
            .unwrap();
        let depends: i64 = conn
            .query_row("SELECT count(*) FROM depends", [], |row| row.get(0))
            .unwrap();
        assert_eq!(packages, 1);
        assert_eq!(depends, 2);

        let (version, comparator): (Option<String>, Option<String>) = conn
            .query_row(
                "SELECT version, comparator FROM depends WHERE depend_package = 'bar'",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(version.as_deref(), Some("2.0"));
        assert_eq!(comparator.as_deref(), Some(">="));
    }

    #[test]
    fn test_drop_without_commit_rolls_back() {
        let temp_file = NamedTempFile::new().unwrap();

        {
            let mut writer = SqlWriter::create(temp_file.path()).unwrap();
            writer
                .write_rows(&rows("core", "%NAME%\nfoo\n%VERSION%\n1.0-1\n"))
                .unwrap();
            // Dropped without commit
        }

        let conn = Connection::open(temp_file.path()).unwrap();
        let packages: i64 = conn
            .query_row("SELECT count(*) FROM packages", [], |row| row.get(0))
            .unwrap();
        assert_eq!(packages, 0, "uncommitted rows must not be visible");
    }

    #[test]
    fn test_opt_depends_description_column() {
        let temp_file = NamedTempFile::new().unwrap();

        let mut writer = SqlWriter::create(temp_file.path()).unwrap();
        writer
            .write_rows(&rows(
                "extra",
                "%NAME%\nfoo\n%VERSION%\n1.0-1\n%OPTDEPENDS%\nbaz: pretty pictures\n",
            ))
            .unwrap();
        writer.commit().unwrap();

        let conn = Connection::open(temp_file.path()).unwrap();
        let description: Option<String> = conn
            .query_row(
                "SELECT description FROM opt_depends WHERE depend_package = 'baz'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(description.as_deref(), Some("pretty pictures"));
    }
}
