// src/sync/descriptor.rs

//! Package descriptor parsing
//!
//! Each entry in a sync or files database is a text block in pacman's
//! `%FIELD%` format: a field marker line followed by one value per line,
//! repeated. Multi-value fields (licenses, dependencies, file lists) keep
//! one value per line.

use indexmap::IndexMap;

/// Parsed per-package descriptor: an ordered field-name to text mapping.
///
/// Multi-value fields store their lines newline-joined. `%NAME%` and
/// `%VERSION%` are present for every valid sync-database entry; optional
/// fields are omitted entirely when absent, never present-but-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageDescriptor {
    fields: IndexMap<String, String>,
}

impl PackageDescriptor {
    /// Parse one descriptor text block.
    ///
    /// Returns `None` for a malformed block (content before the first
    /// field marker); the entry is discarded and the caller decides how
    /// to surface that. Blank lines inside a field are kept as content;
    /// trailing blank lines are stripped when the field is flushed.
    pub fn parse(content: &str) -> Option<Self> {
        let mut fields = IndexMap::new();
        let mut current: Option<(String, Vec<&str>)> = None;

        for line in content.lines() {
            if let Some(name) = field_marker(line) {
                if let Some((prior, values)) = current.take() {
                    flush(&mut fields, prior, &values);
                }
                current = Some((name.to_string(), Vec::new()));
            } else if let Some((_, values)) = current.as_mut() {
                values.push(line);
            } else {
                // Content before the first %FIELD% marker
                return None;
            }
        }

        if let Some((prior, values)) = current.take() {
            flush(&mut fields, prior, &values);
        }

        Some(Self { fields })
    }

    /// Look up a field by name
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// The `%NAME%` field, if present
    pub fn name(&self) -> Option<&str> {
        self.get("NAME")
    }

    /// The `%VERSION%` field, if present
    pub fn version(&self) -> Option<&str> {
        self.get("VERSION")
    }

    /// Insert a field only if it is not already set.
    ///
    /// Used by files-database enrichment, which is additive and must
    /// never overwrite sync-database fields.
    pub fn insert_if_absent(&mut self, field: &str, value: &str) {
        if !value.is_empty() && !self.fields.contains_key(field) {
            self.fields.insert(field.to_string(), value.to_string());
        }
    }

    /// Iterate fields in descriptor order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// True when the descriptor holds no fields at all
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Recognize a `%FIELD%` marker line, returning the field name
fn field_marker(line: &str) -> Option<&str> {
    if line.len() > 2 && line.starts_with('%') && line.ends_with('%') {
        Some(&line[1..line.len() - 1])
    } else {
        None
    }
}

/// Flush a completed field buffer into the map, dropping empty values
fn flush(fields: &mut IndexMap<String, String>, name: String, values: &[&str]) {
    let value = values.join("\n");
    let value = value.trim_end_matches('\n');
    if !value.is_empty() {
        fields.insert(name, value.to_string());
    }
}
