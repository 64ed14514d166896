// src/db/models.rs

//! Row models and the relational mapper
//!
//! This module defines one Rust struct per output table and
//! [`PackageRows`], the complete row set produced for a single package.
//! [`PackageRows::build`] is the pure mapping from a repository name and
//! a parsed descriptor to rows; persistence lives in the `insert`
//! methods and is driven by the [`crate::db::writer::SqlWriter`] sink.

use crate::error::{Error, Result};
use crate::sync::depends::{Comparator, DependencySpec};
use crate::sync::descriptor::PackageDescriptor;
use rusqlite::{Connection, params};

/// One row of the `packages` table
#[derive(Debug, Clone)]
pub struct PackageRow {
    pub db: String,
    pub package: String,
    pub base: Option<String>,
    pub version: String,
    pub architecture: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub download_bytes: i64,
    pub installed_bytes: i64,
    pub pgp_signature: Option<String>,
    pub build_timestamp: Option<i64>,
    pub packager: Option<String>,
    pub filename: Option<String>,
}

impl PackageRow {
    pub fn insert(&self, conn: &Connection) -> Result<()> {
        let mut stmt = conn.prepare_cached(
            "INSERT INTO packages
                (db, package, base, version, architecture, description, url,
                 download_bytes, installed_bytes, pgp_signature, build_timestamp,
                 packager, filename)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        )?;
        stmt.execute(params![
            self.db,
            self.package,
            self.base,
            self.version,
            self.architecture,
            self.description,
            self.url,
            self.download_bytes,
            self.installed_bytes,
            self.pgp_signature,
            self.build_timestamp,
            self.packager,
            self.filename,
        ])?;
        Ok(())
    }
}

/// One row of the `sums` table
#[derive(Debug, Clone)]
pub struct SumRow {
    pub db: String,
    pub package: String,
    pub sum_type: String,
    pub sum: String,
}

impl SumRow {
    pub fn insert(&self, conn: &Connection) -> Result<()> {
        let mut stmt = conn.prepare_cached(
            "INSERT INTO sums (db, package, type, sum) VALUES (?1, ?2, ?3, ?4)",
        )?;
        stmt.execute(params![self.db, self.package, self.sum_type, self.sum])?;
        Ok(())
    }
}

/// One row of the `licenses` table
#[derive(Debug, Clone)]
pub struct LicenseRow {
    pub db: String,
    pub package: String,
    pub license: String,
}

impl LicenseRow {
    pub fn insert(&self, conn: &Connection) -> Result<()> {
        let mut stmt = conn.prepare_cached(
            "INSERT INTO licenses (db, package, license) VALUES (?1, ?2, ?3)",
        )?;
        stmt.execute(params![self.db, self.package, self.license])?;
        Ok(())
    }
}

/// One row of the `groups` table
#[derive(Debug, Clone)]
pub struct GroupRow {
    pub db: String,
    pub package: String,
    pub group_name: String,
}

impl GroupRow {
    pub fn insert(&self, conn: &Connection) -> Result<()> {
        let mut stmt = conn.prepare_cached(
            "INSERT INTO groups (db, package, group_name) VALUES (?1, ?2, ?3)",
        )?;
        stmt.execute(params![self.db, self.package, self.group_name])?;
        Ok(())
    }
}

/// One row of the `files` table
#[derive(Debug, Clone)]
pub struct FileRow {
    pub db: String,
    pub package: String,
    pub file: String,
}

impl FileRow {
    pub fn insert(&self, conn: &Connection) -> Result<()> {
        let mut stmt =
            conn.prepare_cached("INSERT INTO files (db, package, file) VALUES (?1, ?2, ?3)")?;
        stmt.execute(params![self.db, self.package, self.file])?;
        Ok(())
    }
}

/// The seven dependency-style relations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependKind {
    Depends,
    MakeDepends,
    CheckDepends,
    OptDepends,
    Conflicts,
    Provides,
    Replaces,
}

impl DependKind {
    pub const ALL: [DependKind; 7] = [
        DependKind::Depends,
        DependKind::MakeDepends,
        DependKind::CheckDepends,
        DependKind::OptDepends,
        DependKind::Conflicts,
        DependKind::Provides,
        DependKind::Replaces,
    ];

    /// Descriptor field the relation is read from
    pub fn field(&self) -> &str {
        match self {
            DependKind::Depends => "DEPENDS",
            DependKind::MakeDepends => "MAKEDEPENDS",
            DependKind::CheckDepends => "CHECKDEPENDS",
            DependKind::OptDepends => "OPTDEPENDS",
            DependKind::Conflicts => "CONFLICTS",
            DependKind::Provides => "PROVIDES",
            DependKind::Replaces => "REPLACES",
        }
    }

    /// Output table the relation is written to
    pub fn table(&self) -> &str {
        match self {
            DependKind::Depends => "depends",
            DependKind::MakeDepends => "make_depends",
            DependKind::CheckDepends => "check_depends",
            DependKind::OptDepends => "opt_depends",
            DependKind::Conflicts => "conflicts",
            DependKind::Provides => "provides",
            DependKind::Replaces => "replaces",
        }
    }

    /// Name of the other-package column, which varies by relation
    pub fn package_column(&self) -> &str {
        match self {
            DependKind::Depends
            | DependKind::MakeDepends
            | DependKind::CheckDepends
            | DependKind::OptDepends => "depend_package",
            DependKind::Conflicts => "conflict_package",
            DependKind::Provides => "provide_package",
            DependKind::Replaces => "replace_package",
        }
    }

    /// Only opt-depends rows carry a description column
    pub fn has_description(&self) -> bool {
        matches!(self, DependKind::OptDepends)
    }
}

/// One row of a dependency-relation table
#[derive(Debug, Clone)]
pub struct DependRow {
    pub kind: DependKind,
    pub db: String,
    pub package: String,
    pub depend_package: String,
    pub version: Option<String>,
    pub comparator: Option<Comparator>,
    pub description: Option<String>,
}

impl DependRow {
    pub fn insert(&self, conn: &Connection) -> Result<()> {
        let comparator = self.comparator.map(|c| c.as_str());
        if self.kind.has_description() {
            let mut stmt = conn.prepare_cached(
                "INSERT INTO opt_depends
                    (db, package, depend_package, version, comparator, description)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            stmt.execute(params![
                self.db,
                self.package,
                self.depend_package,
                self.version,
                comparator,
                self.description,
            ])?;
        } else {
            let sql = format!(
                "INSERT INTO {} (db, package, {}, version, comparator)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                self.kind.table(),
                self.kind.package_column(),
            );
            let mut stmt = conn.prepare_cached(&sql)?;
            stmt.execute(params![
                self.db,
                self.package,
                self.depend_package,
                self.version,
                comparator,
            ])?;
        }
        Ok(())
    }
}

/// The complete row set produced for one package.
///
/// All rows are correlated by `(db, package)`; building the set has no
/// side effects.
#[derive(Debug, Clone)]
pub struct PackageRows {
    pub package: PackageRow,
    pub sums: Vec<SumRow>,
    pub licenses: Vec<LicenseRow>,
    pub groups: Vec<GroupRow>,
    pub depends: Vec<DependRow>,
    pub files: Vec<FileRow>,
}

impl PackageRows {
    /// Map one package descriptor to its full row set.
    ///
    /// `%NAME%` and `%VERSION%` are required; `%CSIZE%`/`%ISIZE%` default
    /// to zero when absent and must parse as integers when present, as
    /// must `%BUILDDATE%` (NULL when absent). Multi-line fields produce
    /// one row per line, in descriptor order.
    pub fn build(db: &str, desc: &PackageDescriptor) -> Result<Self> {
        let name = desc
            .name()
            .ok_or_else(|| Error::Decode("Missing %NAME% field".to_string()))?;
        let version = desc
            .version()
            .ok_or_else(|| Error::Decode("Missing %VERSION% field".to_string()))?;

        let package = PackageRow {
            db: db.to_string(),
            package: name.to_string(),
            base: desc.get("BASE").map(str::to_string),
            version: version.to_string(),
            architecture: desc.get("ARCH").map(str::to_string),
            description: desc.get("DESC").map(str::to_string),
            url: desc.get("URL").map(str::to_string),
            download_bytes: int_field(desc, "CSIZE")?.unwrap_or(0),
            installed_bytes: int_field(desc, "ISIZE")?.unwrap_or(0),
            pgp_signature: desc.get("PGPSIG").map(str::to_string),
            build_timestamp: int_field(desc, "BUILDDATE")?,
            packager: desc.get("PACKAGER").map(str::to_string),
            filename: desc.get("FILENAME").map(str::to_string),
        };

        let sums = desc
            .iter()
            .filter(|(field, _)| field.ends_with("SUM"))
            .map(|(field, value)| SumRow {
                db: db.to_string(),
                package: name.to_string(),
                sum_type: field[..field.len() - 3].to_lowercase(),
                sum: value.to_string(),
            })
            .collect();

        let licenses = lines(desc, "LICENSE")
            .map(|license| LicenseRow {
                db: db.to_string(),
                package: name.to_string(),
                license: license.to_string(),
            })
            .collect();

        let groups = lines(desc, "GROUPS")
            .map(|group_name| GroupRow {
                db: db.to_string(),
                package: name.to_string(),
                group_name: group_name.to_string(),
            })
            .collect();

        let mut depends = Vec::new();
        for kind in DependKind::ALL {
            for line in lines(desc, kind.field()) {
                let spec = DependencySpec::parse(line)?;
                depends.push(DependRow {
                    kind,
                    db: db.to_string(),
                    package: name.to_string(),
                    depend_package: spec.name,
                    version: spec.version,
                    comparator: spec.comparator,
                    description: if kind.has_description() {
                        spec.description
                    } else {
                        None
                    },
                });
            }
        }

        let files = lines(desc, "FILES")
            .map(|file| FileRow {
                db: db.to_string(),
                package: name.to_string(),
                file: file.to_string(),
            })
            .collect();

        Ok(Self {
            package,
            sums,
            licenses,
            groups,
            depends,
            files,
        })
    }
}

/// Lines of a multi-line field, empty when the field is absent.
///
/// Blank interior lines are field content but carry no value: they must
/// not become empty rows, and an empty string is not a parseable
/// dependency specifier.
fn lines<'a>(desc: &'a PackageDescriptor, field: &str) -> impl Iterator<Item = &'a str> {
    desc.get(field)
        .into_iter()
        .flat_map(str::lines)
        .filter(|line| !line.is_empty())
}

/// Integer field, `None` when absent, fatal when unparseable
fn int_field(desc: &PackageDescriptor, field: &str) -> Result<Option<i64>> {
    match desc.get(field) {
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| Error::Decode(format!("Invalid integer in %{}%: {}", field, value))),
        None => Ok(None),
    }
}
