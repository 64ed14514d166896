// src/lib.rs

//! pacdb
//!
//! Converts pacman sync databases (and their optional files databases)
//! into a normalized SQLite database suitable for SQL querying.
//!
//! # Architecture
//!
//! - Streaming: sync databases are walked entry-by-entry, never
//!   materialized in memory
//! - One transaction: all rows for a run commit together at the end
//! - Atomic output: the driver writes to a temp file and renames it into
//!   place only after a clean commit

pub mod convert;
pub mod db;
mod error;
pub mod sync;

pub use error::{Error, Result};
