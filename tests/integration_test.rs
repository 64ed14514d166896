// tests/integration_test.rs

//! Integration tests for pacdb
//!
//! These tests build real compressed sync/files archives, run a full
//! conversion, and verify the output database end to end.

use flate2::Compression;
use flate2::write::GzEncoder;
use pacdb::convert::{Repository, convert_atomic, find_repositories};
use rusqlite::Connection;
use std::io::Write;
use std::path::Path;
use tar::{Builder, EntryType, Header};

const TABLES: [&str; 12] = [
    "packages",
    "sums",
    "licenses",
    "groups",
    "depends",
    "make_depends",
    "check_depends",
    "opt_depends",
    "conflicts",
    "provides",
    "replaces",
    "files",
];

/// Build a gzip-compressed tar archive; `None` content marks a directory
fn gz_tar(entries: &[(&str, Option<&str>)]) -> Vec<u8> {
    let mut builder = Builder::new(Vec::new());
    for (path, content) in entries {
        match content {
            Some(content) => {
                let mut header = Header::new_gnu();
                header.set_size(content.len() as u64);
                header.set_mode(0o644);
                header.set_cksum();
                builder
                    .append_data(&mut header, path, content.as_bytes())
                    .unwrap();
            }
            None => {
                let mut header = Header::new_gnu();
                header.set_entry_type(EntryType::dir());
                header.set_size(0);
                header.set_mode(0o755);
                header.set_cksum();
                builder.append_data(&mut header, path, &[][..]).unwrap();
            }
        }
    }
    let tarball = builder.into_inner().unwrap();

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&tarball).unwrap();
    encoder.finish().unwrap()
}

/// Dump every table row-for-row, preserving insertion order
fn dump_rows(db_path: &Path) -> Vec<String> {
    let conn = Connection::open(db_path).unwrap();
    let mut dump = Vec::new();

    for table in TABLES {
        let mut stmt = conn
            .prepare(&format!("SELECT * FROM {} ORDER BY rowid", table))
            .unwrap();
        let ncols = stmt.column_count();
        let rows = stmt
            .query_map([], |row| {
                let mut text = table.to_string();
                for i in 0..ncols {
                    text.push('|');
                    text.push_str(&format!("{:?}", row.get_ref(i)?));
                }
                Ok(text)
            })
            .unwrap();
        for row in rows {
            dump.push(row.unwrap());
        }
    }

    dump
}

fn count(conn: &Connection, sql: &str) -> i64 {
    conn.query_row(sql, [], |row| row.get(0)).unwrap()
}

#[test]
fn test_full_conversion_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("pacman.sqlite");

    let sync_path = dir.path().join("core.db");
    std::fs::write(
        &sync_path,
        gz_tar(&[
            ("foo-1.0-1", None),
            (
                "foo-1.0-1/desc",
                Some(
                    "%FILENAME%\nfoo-1.0-1-x86_64.pkg.tar.zst\n\n\
                     %NAME%\nfoo\n\n\
                     %BASE%\nfoo\n\n\
                     %VERSION%\n1.0-1\n\n\
                     %DESC%\nAn example package\n\n\
                     %CSIZE%\n2048\n\n\
                     %ISIZE%\n8192\n\n\
                     %SHA256SUM%\nabc123\n\n\
                     %URL%\nhttps://example.com\n\n\
                     %LICENSE%\nMIT\nGPL\n\n\
                     %ARCH%\nx86_64\n\n\
                     %BUILDDATE%\n1700000000\n\n\
                     %PACKAGER%\nSomeone <someone@example.com>\n\n\
                     %DEPENDS%\nbar>=2.0\nbaz\n\n\
                     %OPTDEPENDS%\nqux: pretty pictures\n\n\
                     %PROVIDES%\nlibfoo=1.0\n",
                ),
            ),
        ]),
    )
    .unwrap();

    let repos = vec![Repository {
        name: "core".to_string(),
        sync_path,
        files_path: None,
    }];

    convert_atomic(&repos, &output).unwrap();

    let conn = Connection::open(&output).unwrap();

    let (version, csize, isize, builddate): (String, i64, i64, Option<i64>) = conn
        .query_row(
            "SELECT version, download_bytes, installed_bytes, build_timestamp
             FROM packages WHERE db = 'core' AND package = 'foo'",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )
        .unwrap();
    assert_eq!(version, "1.0-1");
    assert_eq!(csize, 2048);
    assert_eq!(isize, 8192);
    assert_eq!(builddate, Some(1700000000));

    // Two depends rows: (bar, >=, 2.0) and (baz, null, null)
    let depends: Vec<(String, Option<String>, Option<String>)> = conn
        .prepare("SELECT depend_package, comparator, version FROM depends ORDER BY rowid")
        .unwrap()
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(
        depends,
        vec![
            ("bar".to_string(), Some(">=".to_string()), Some("2.0".to_string())),
            ("baz".to_string(), None, None),
        ]
    );

    // License rows in input order
    let licenses: Vec<String> = conn
        .prepare("SELECT license FROM licenses ORDER BY rowid")
        .unwrap()
        .query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(licenses, vec!["MIT", "GPL"]);

    assert_eq!(count(&conn, "SELECT count(*) FROM sums"), 1);
    assert_eq!(count(&conn, "SELECT count(*) FROM provides"), 1);
    assert_eq!(count(&conn, "SELECT count(*) FROM opt_depends"), 1);
}

#[test]
fn test_files_database_enrichment() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("pacman.sqlite");

    std::fs::write(
        dir.path().join("core.db"),
        gz_tar(&[
            (
                "foo-1.0-1/desc",
                Some("%NAME%\nfoo\n%VERSION%\n1.0-1\n"),
            ),
            (
                "bar-2.0-1/desc",
                Some("%NAME%\nbar\n%VERSION%\n2.0-1\n"),
            ),
        ]),
    )
    .unwrap();

    // Only foo has a files entry; bar's missing correlation is recoverable
    std::fs::write(
        dir.path().join("core.files"),
        gz_tar(&[(
            "foo-1.0-1/files",
            Some("%FILES%\nusr/\nusr/bin/\nusr/bin/foo\n"),
        )]),
    )
    .unwrap();

    let repos = find_repositories(dir.path()).unwrap();
    convert_atomic(&repos, &output).unwrap();

    let conn = Connection::open(&output).unwrap();
    assert_eq!(
        count(&conn, "SELECT count(*) FROM files WHERE package = 'foo'"),
        3
    );
    assert_eq!(
        count(&conn, "SELECT count(*) FROM files WHERE package = 'bar'"),
        0
    );
    assert_eq!(count(&conn, "SELECT count(*) FROM packages"), 2);
}

#[test]
fn test_directory_entries_produce_no_rows() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("pacman.sqlite");

    std::fs::write(
        dir.path().join("core.db"),
        gz_tar(&[
            ("foo-1.0-1", None),
            ("foo-1.0-1/desc", Some("%NAME%\nfoo\n%VERSION%\n1.0-1\n")),
            ("empty-dir", None),
        ]),
    )
    .unwrap();

    let repos = find_repositories(dir.path()).unwrap();
    convert_atomic(&repos, &output).unwrap();

    let conn = Connection::open(&output).unwrap();
    assert_eq!(count(&conn, "SELECT count(*) FROM packages"), 1);
}

#[test]
fn test_conversion_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();

    std::fs::write(
        dir.path().join("core.db"),
        gz_tar(&[(
            "foo-1.0-1/desc",
            Some(
                "%NAME%\nfoo\n%VERSION%\n1.0-1\n%SHA256SUM%\nabc\n%MD5SUM%\ndef\n\
                 %DEPENDS%\nbar>=2.0\nbaz\n%LICENSE%\nMIT\nGPL\n",
            ),
        )]),
    )
    .unwrap();
    std::fs::write(
        dir.path().join("extra.db"),
        gz_tar(&[(
            "quux-3.0-1/desc",
            Some("%NAME%\nquux\n%VERSION%\n3.0-1\n%GROUPS%\nbase\n"),
        )]),
    )
    .unwrap();

    let repos = find_repositories(dir.path()).unwrap();

    let first = dir.path().join("first.sqlite");
    let second = dir.path().join("second.sqlite");
    convert_atomic(&repos, &first).unwrap();
    convert_atomic(&repos, &second).unwrap();

    assert_eq!(
        dump_rows(&first),
        dump_rows(&second),
        "two runs over the same archives must produce row-for-row identical output"
    );
}

#[test]
fn test_every_row_correlates_to_a_package_row() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("pacman.sqlite");

    std::fs::write(
        dir.path().join("core.db"),
        gz_tar(&[(
            "foo-1.0-1/desc",
            Some(
                "%NAME%\nfoo\n%VERSION%\n1.0-1\n%SHA256SUM%\nabc\n\
                 %LICENSE%\nMIT\n%GROUPS%\nbase\n%DEPENDS%\nbar\n\
                 %MAKEDEPENDS%\ncmake\n%CHECKDEPENDS%\npytest\n\
                 %OPTDEPENDS%\nqux: extras\n%CONFLICTS%\noldfoo\n\
                 %PROVIDES%\nlibfoo=1.0\n%REPLACES%\nfoolib\n",
            ),
        )]),
    )
    .unwrap();

    let repos = find_repositories(dir.path()).unwrap();
    convert_atomic(&repos, &output).unwrap();

    let conn = Connection::open(&output).unwrap();
    for table in TABLES.iter().filter(|t| **t != "packages") {
        let orphans = count(
            &conn,
            &format!(
                "SELECT count(*) FROM {} t
                 WHERE NOT EXISTS (
                     SELECT 1 FROM packages p
                     WHERE p.db = t.db AND p.package = t.package
                 )",
                table
            ),
        );
        assert_eq!(orphans, 0, "orphan rows in {}", table);
    }
}

#[test]
fn test_malformed_dependency_aborts_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("pacman.sqlite");

    std::fs::write(
        dir.path().join("core.db"),
        gz_tar(&[(
            "foo-1.0-1/desc",
            Some("%NAME%\nfoo\n%VERSION%\n1.0-1\n%DEPENDS%\nbar>>nope\n"),
        )]),
    )
    .unwrap();

    let repos = find_repositories(dir.path()).unwrap();
    let result = convert_atomic(&repos, &output);

    assert!(result.is_err());
    assert!(!output.exists(), "aborted run must not create the output");
}

#[test]
fn test_corrupt_archive_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("pacman.sqlite");

    std::fs::write(dir.path().join("core.db"), b"definitely not a tarball").unwrap();

    let repos = find_repositories(dir.path()).unwrap();
    let result = convert_atomic(&repos, &output);

    assert!(result.is_err());
}
