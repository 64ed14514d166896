// src/sync/depends.rs

//! Dependency specifier parsing
//!
//! Each line of a `%DEPENDS%`-style field names another package, with an
//! optional version constraint and (for opt-depends) an optional
//! description:
//!
//! ```text
//! name[<cmp>version][: description]
//! ```
//!
//! The name charset is `[a-z0-9@_+][a-z0-9@._+-]*`, matched
//! case-insensitively; the version excludes `:`, `/`, and whitespace.

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Version-relation operator inside a dependency specifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Less,
    LessEq,
    Eq,
    GreaterEq,
    Greater,
}

impl Comparator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Comparator::Less => "<",
            Comparator::LessEq => "<=",
            Comparator::Eq => "=",
            Comparator::GreaterEq => ">=",
            Comparator::Greater => ">",
        }
    }
}

impl FromStr for Comparator {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "<" => Ok(Comparator::Less),
            "<=" => Ok(Comparator::LessEq),
            "=" => Ok(Comparator::Eq),
            ">=" => Ok(Comparator::GreaterEq),
            ">" => Ok(Comparator::Greater),
            _ => Err(format!("Invalid comparator: {}", s)),
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One parsed dependency/provides/conflicts/replaces line.
///
/// `comparator` and `version` are present together or not at all;
/// `description` only carries meaning for opt-depends lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencySpec {
    pub name: String,
    pub comparator: Option<Comparator>,
    pub version: Option<String>,
    pub description: Option<String>,
}

impl DependencySpec {
    /// Parse one dependency line.
    ///
    /// A line that does not match the grammar is a fatal error: the whole
    /// conversion run aborts rather than emit a row with guessed fields.
    pub fn parse(line: &str) -> Result<Self> {
        let invalid = || Error::InvalidDependency(line.to_string());

        let name_len = name_length(line);
        if name_len == 0 {
            return Err(invalid());
        }
        let (name, mut rest) = line.split_at(name_len);

        let cmp_len = rest.chars().take_while(|c| matches!(c, '<' | '>' | '=')).count();
        let (comparator, version) = if cmp_len > 0 {
            let comparator = rest[..cmp_len].parse::<Comparator>().map_err(|_| invalid())?;
            rest = &rest[cmp_len..];

            let ver_len = rest
                .chars()
                .take_while(|&c| c != ':' && c != '/' && !c.is_whitespace())
                .map(char::len_utf8)
                .sum::<usize>();
            if ver_len == 0 {
                return Err(invalid());
            }
            let version = rest[..ver_len].to_string();
            rest = &rest[ver_len..];

            (Some(comparator), Some(version))
        } else {
            (None, None)
        };

        let description = if rest.is_empty() {
            None
        } else if let Some(text) = rest.strip_prefix(':') {
            let text = text.trim_start_matches(' ');
            if text.is_empty() {
                None
            } else {
                Some(text.to_string())
            }
        } else {
            return Err(invalid());
        };

        Ok(Self {
            name: name.to_string(),
            comparator,
            version,
            description,
        })
    }
}

/// Length in bytes of the leading package name, zero if none
fn name_length(line: &str) -> usize {
    let mut len = 0;
    for (i, c) in line.char_indices() {
        let ok = if i == 0 {
            is_name_start(c)
        } else {
            is_name_char(c)
        };
        if !ok {
            break;
        }
        len = i + c.len_utf8();
    }
    len
}

fn is_name_start(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '@' | '_' | '+')
}

fn is_name_char(c: char) -> bool {
    is_name_start(c) || matches!(c, '.' | '-')
}
