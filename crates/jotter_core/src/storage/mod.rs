//! Key-value blob storage used for note persistence.
//!
//! # Responsibility
//! - Define the `get`/`set` contract the note store persists through.
//! - Provide in-memory and directory-backed implementations.
//!
//! # Invariants
//! - `set` replaces the whole value for a key; there are no partial writes.
//! - Keys are plain names (`[A-Za-z0-9._-]`), never paths.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod file;
mod memory;

pub use file::FileKvStore;
pub use memory::MemoryKvStore;

pub type StorageResult<T> = Result<T, StorageError>;

/// Blob storage failure.
#[derive(Debug)]
pub enum StorageError {
    /// Key is empty or contains characters outside `[A-Za-z0-9._-]`.
    InvalidKey(String),
    /// Underlying medium failed for `key`.
    Io {
        key: String,
        source: std::io::Error,
    },
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidKey(key) => write!(f, "invalid storage key `{key}`"),
            Self::Io { key, source } => write!(f, "storage i/o failed for `{key}`: {source}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidKey(_) => None,
            Self::Io { source, .. } => Some(source),
        }
    }
}

/// Text blob store keyed by name, in the shape of browser local storage.
pub trait KvStore {
    /// Returns the value stored under `key`, or `None` when absent.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    /// Stores `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> StorageResult<()>;
}

impl<S: KvStore + ?Sized> KvStore for Box<S> {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }
}

/// Validates a storage key.
pub fn validate_key(key: &str) -> StorageResult<()> {
    let valid = !key.is_empty()
        && key != "."
        && key != ".."
        && key
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-'));
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}
