//! Record codecs
//!
//! Encode/decode the persisted table. The framing around the payload is
//! handled by [`RecordFile`](super::RecordFile); codecs only see the table.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SquirrelError};

/// Everything persisted in one store file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table<R> {
    /// Highest id ever handed out (never decreases)
    pub sequence: u64,

    /// Records in insertion order
    pub records: Vec<R>,
}

impl<R> Table<R> {
    /// Create an empty table
    pub fn new() -> Self {
        Self {
            sequence: 0,
            records: Vec::new(),
        }
    }
}

impl<R> Default for Table<R> {
    fn default() -> Self {
        Self::new()
    }
}

/// Serialization codec injected into a record file
pub trait RecordCodec: Send + Sync {
    /// Encode a table into payload bytes
    fn encode<R: Serialize>(&self, table: &Table<R>) -> Result<Vec<u8>>;

    /// Decode payload bytes into a table
    ///
    /// Bytes that do not describe a well-formed table are `CorruptData`.
    fn decode<R: DeserializeOwned>(&self, bytes: &[u8]) -> Result<Table<R>>;
}

/// Compact binary codec (default)
#[derive(Debug, Clone, Copy, Default)]
pub struct BincodeCodec;

impl RecordCodec for BincodeCodec {
    fn encode<R: Serialize>(&self, table: &Table<R>) -> Result<Vec<u8>> {
        bincode::serialize(table).map_err(|e| SquirrelError::Serialization(e.to_string()))
    }

    fn decode<R: DeserializeOwned>(&self, bytes: &[u8]) -> Result<Table<R>> {
        bincode::deserialize(bytes).map_err(|e| SquirrelError::CorruptData(e.to_string()))
    }
}

/// Human-readable JSON codec
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl RecordCodec for JsonCodec {
    fn encode<R: Serialize>(&self, table: &Table<R>) -> Result<Vec<u8>> {
        serde_json::to_vec(table).map_err(|e| SquirrelError::Serialization(e.to_string()))
    }

    fn decode<R: DeserializeOwned>(&self, bytes: &[u8]) -> Result<Table<R>> {
        serde_json::from_slice(bytes).map_err(|e| SquirrelError::CorruptData(e.to_string()))
    }
}
