//! Store Module
//!
//! Flat-file persistence for ordered record sequences.
//!
//! ## Responsibilities
//! - Own exactly one file per store instance
//! - Load-all / save-all over the whole record sequence
//! - Serialize read-modify-write cycles behind a per-file lock
//! - Resource operations for squirrels layered on top
//!
//! ## File Format
//! ```text
//! ┌──────────┬───────────┬──────────────┬──────────┬─────────────────┐
//! │Magic (4) │Version (2)│Payload Len(4)│ CRC32 (4)│     Payload     │
//! └──────────┴───────────┴──────────────┴──────────┴─────────────────┘
//! ```
//!
//! The payload is the codec encoding of a [`Table`]: the id high-water
//! mark plus the records in order. Every save rewrites the whole file via
//! a temporary sibling and an atomic rename.

mod codec;
mod file;
mod squirrel;

pub use codec::{BincodeCodec, JsonCodec, RecordCodec, Table};
pub use file::{Commit, RecordFile, HEADER_SIZE, MAGIC, VERSION};
pub use squirrel::{parse_id, Squirrel, SquirrelRepository, SquirrelStore};

/// Opaque string records with no identity beyond position
pub type StringStore = RecordFile<String>;
