//! Record File
//!
//! Generic load-all / save-all store over one framed file.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Result, SquirrelError};

use super::{BincodeCodec, RecordCodec, Table};

/// Magic bytes at the start of every store file
pub const MAGIC: &[u8; 4] = b"SQDB";

/// Current file format version
pub const VERSION: u16 = 1;

/// Header size: magic (4) + version (2) + payload_len (4) + crc (4)
pub const HEADER_SIZE: usize = 14;

/// Outcome of a [`RecordFile::transact`] closure
#[derive(Debug)]
pub enum Commit<T> {
    /// Persist the mutated table, then return the value
    Write(T),

    /// Leave the file untouched and return the value
    Skip(T),
}

/// A single file holding an ordered sequence of records
///
/// ## Concurrency:
/// - Every read-modify-write (`append`, `save_all`, `transact`) runs under
///   `write_lock`, so overlapping writers cannot lose each other's updates
/// - `load_all` takes no lock; saves are atomic renames, so readers see
///   either the old or the new file
///
/// No file handle outlives a single call.
pub struct RecordFile<R, C = BincodeCodec> {
    /// Path of the persisted file
    path: PathBuf,

    /// Codec for the table payload
    codec: C,

    /// Serializes read-modify-write cycles
    write_lock: Mutex<()>,

    _record: PhantomData<fn() -> R>,
}

impl<R> RecordFile<R, BincodeCodec>
where
    R: Serialize + DeserializeOwned,
{
    /// Open a record file with the default binary codec
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        Self::open_with_codec(path, BincodeCodec)
    }
}

impl<R, C> RecordFile<R, C>
where
    R: Serialize + DeserializeOwned,
    C: RecordCodec,
{
    /// Open a record file with the given codec
    ///
    /// If nothing exists at `path`, an empty table is written there.
    /// Existing content is not read until the first load.
    pub fn open_with_codec(path: impl Into<PathBuf>, codec: C) -> Result<Self> {
        let file = Self {
            path: path.into(),
            codec,
            write_lock: Mutex::new(()),
            _record: PhantomData,
        };

        if !file.path.exists() {
            if let Some(parent) = file.path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            tracing::debug!("Initializing empty store at {}", file.path.display());
            file.write_table(&Table::new())?;
        }

        Ok(file)
    }

    /// Load every record, in order
    pub fn load_all(&self) -> Result<Vec<R>> {
        Ok(self.load_table()?.records)
    }

    /// Replace the file content with `records`
    ///
    /// The id high-water mark already on disk is kept when it can be read.
    /// Overwriting an unreadable file resets it to 0, so callers that derive
    /// ids from the records may hand out ids deleted before the corruption.
    pub fn save_all(&self, records: Vec<R>) -> Result<()> {
        let _guard = self.write_lock.lock();

        let sequence = match self.load_table() {
            Ok(table) => table.sequence,
            Err(e) => {
                tracing::warn!(
                    "Overwriting unreadable store {}: {}",
                    self.path.display(),
                    e
                );
                0
            }
        };

        self.write_table(&Table { sequence, records })
    }

    /// Append one record to the end of the sequence
    pub fn append(&self, record: R) -> Result<()> {
        self.transact(|table| {
            table.records.push(record);
            Commit::Write(())
        })
    }

    /// Run a read-modify-write cycle under the file lock
    ///
    /// The table is loaded, handed to `f`, and written back only if `f`
    /// returns [`Commit::Write`].
    pub fn transact<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Table<R>) -> Commit<T>,
    {
        let _guard = self.write_lock.lock();

        let mut table = self.load_table()?;
        match f(&mut table) {
            Commit::Write(value) => {
                self.write_table(&table)?;
                Ok(value)
            }
            Commit::Skip(value) => Ok(value),
        }
    }

    /// Load the full table, including the id high-water mark
    pub fn load_table(&self) -> Result<Table<R>> {
        let bytes = fs::read(&self.path)?;
        let payload = decode_frame(&bytes)?;
        let table = self.codec.decode(payload)?;

        tracing::trace!(
            "Loaded {} records from {}",
            table.records.len(),
            self.path.display()
        );
        Ok(table)
    }

    /// Get the store file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Write the table to a temporary sibling, sync it, and rename it over
    /// the store file
    fn write_table(&self, table: &Table<R>) -> Result<()> {
        let payload = self.codec.encode(table)?;
        let frame = encode_frame(&payload)?;

        let tmp_path = self.tmp_path();
        {
            let mut file: File = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&tmp_path)?;
            file.write_all(&frame)?;
            file.sync_all()?;
        }
        fs::rename(&tmp_path, &self.path)?;

        tracing::debug!(
            "Saved {} records ({} bytes) to {}",
            table.records.len(),
            frame.len(),
            self.path.display()
        );
        Ok(())
    }

    /// "squirrels.db" → "squirrels.db.tmp"
    fn tmp_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }
}

/// Wrap a payload in the file header
fn encode_frame(payload: &[u8]) -> Result<Vec<u8>> {
    let payload_len = u32::try_from(payload.len()).map_err(|_| {
        SquirrelError::Serialization(format!("Payload too large: {} bytes", payload.len()))
    })?;

    let mut frame = Vec::with_capacity(HEADER_SIZE + payload.len());
    frame.extend_from_slice(MAGIC);
    frame.extend_from_slice(&VERSION.to_le_bytes());
    frame.extend_from_slice(&payload_len.to_le_bytes());
    frame.extend_from_slice(&crc32fast::hash(payload).to_le_bytes());
    frame.extend_from_slice(payload);
    Ok(frame)
}

/// Validate the file header and return the payload
fn decode_frame(bytes: &[u8]) -> Result<&[u8]> {
    if bytes.len() < HEADER_SIZE {
        return Err(SquirrelError::CorruptData(format!(
            "Incomplete header: expected {} bytes, got {}",
            HEADER_SIZE,
            bytes.len()
        )));
    }

    if &bytes[0..4] != MAGIC {
        return Err(SquirrelError::CorruptData("Bad magic bytes".to_string()));
    }

    let version = u16::from_le_bytes([bytes[4], bytes[5]]);
    if version != VERSION {
        return Err(SquirrelError::CorruptData(format!(
            "Unsupported version: {}",
            version
        )));
    }

    let payload_len = u32::from_le_bytes([bytes[6], bytes[7], bytes[8], bytes[9]]) as usize;
    let expected_crc = u32::from_le_bytes([bytes[10], bytes[11], bytes[12], bytes[13]]);

    let payload = &bytes[HEADER_SIZE..];
    if payload.len() != payload_len {
        return Err(SquirrelError::CorruptData(format!(
            "Payload length mismatch: header says {}, file has {}",
            payload_len,
            payload.len()
        )));
    }

    let actual_crc = crc32fast::hash(payload);
    if actual_crc != expected_crc {
        return Err(SquirrelError::CorruptData(format!(
            "CRC mismatch: expected {:08x}, got {:08x}",
            expected_crc, actual_crc
        )));
    }

    Ok(payload)
}
