//! Squirrel Store
//!
//! Resource operations for squirrels, each one a load/save cycle over a
//! [`RecordFile`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SquirrelError};

use super::{BincodeCodec, Commit, RecordCodec, RecordFile};

/// A stored squirrel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Squirrel {
    /// Assigned by the store at creation, never changed or reused
    pub id: u64,
    pub name: String,
    pub size: String,
}

/// Parse an id token taken from a request path
///
/// Ids are compared by numeric value, so "7" and "007" name the same
/// squirrel. Tokens that are not unsigned integers match nothing.
pub fn parse_id(token: &str) -> Option<u64> {
    token.parse().ok()
}

/// Squirrel persistence as seen by the request handler
///
/// Absence is `Ok(None)`, never an error.
pub trait SquirrelRepository: Send + Sync {
    /// All squirrels in insertion order
    fn get_all(&self) -> Result<Vec<Squirrel>>;

    /// Look up one squirrel
    fn get_by_id(&self, id: u64) -> Result<Option<Squirrel>>;

    /// Create a squirrel with a fresh id
    fn create(&self, name: &str, size: &str) -> Result<Squirrel>;

    /// Replace name and size, keeping id and position
    fn update(&self, id: u64, name: &str, size: &str) -> Result<Option<Squirrel>>;

    /// Remove a squirrel, returning what was removed
    fn delete(&self, id: u64) -> Result<Option<Squirrel>>;
}

/// File-backed squirrel store
pub struct SquirrelStore<C = BincodeCodec> {
    file: RecordFile<Squirrel, C>,
}

impl SquirrelStore<BincodeCodec> {
    /// Open or create a squirrel store at `path`
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            file: RecordFile::open(path)?,
        })
    }
}

impl<C: RecordCodec> SquirrelStore<C> {
    /// Open or create a squirrel store using a specific codec
    pub fn open_with_codec(path: impl Into<PathBuf>, codec: C) -> Result<Self> {
        Ok(Self {
            file: RecordFile::open_with_codec(path, codec)?,
        })
    }

    /// Get the store file path
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

impl<C: RecordCodec> SquirrelRepository for SquirrelStore<C> {
    fn get_all(&self) -> Result<Vec<Squirrel>> {
        self.file.load_all()
    }

    fn get_by_id(&self, id: u64) -> Result<Option<Squirrel>> {
        Ok(self.file.load_all()?.into_iter().find(|s| s.id == id))
    }

    fn create(&self, name: &str, size: &str) -> Result<Squirrel> {
        let squirrel = self.file.transact(|table| {
            // Also guard against a high-water mark older than the records
            let max_id = table.records.iter().map(|s| s.id).max().unwrap_or(0);
            let id = match table.sequence.max(max_id).checked_add(1) {
                Some(id) => id,
                None => {
                    return Commit::Skip(Err(SquirrelError::CorruptData(
                        "Squirrel id space exhausted".to_string(),
                    )))
                }
            };
            table.sequence = id;

            let squirrel = Squirrel {
                id,
                name: name.to_string(),
                size: size.to_string(),
            };
            table.records.push(squirrel.clone());
            Commit::Write(Ok(squirrel))
        })??;

        tracing::debug!("Created squirrel {}", squirrel.id);
        Ok(squirrel)
    }

    fn update(&self, id: u64, name: &str, size: &str) -> Result<Option<Squirrel>> {
        self.file.transact(|table| {
            match table.records.iter_mut().find(|s| s.id == id) {
                Some(squirrel) => {
                    squirrel.name = name.to_string();
                    squirrel.size = size.to_string();
                    Commit::Write(Some(squirrel.clone()))
                }
                None => Commit::Skip(None),
            }
        })
    }

    fn delete(&self, id: u64) -> Result<Option<Squirrel>> {
        self.file.transact(|table| {
            let position = table.records.iter().position(|s| s.id == id);
            match position {
                Some(index) => Commit::Write(Some(table.records.remove(index))),
                None => Commit::Skip(None),
            }
        })
    }
}
