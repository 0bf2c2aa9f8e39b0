//! Directory-backed blob store.
//!
//! # Invariants
//! - One UTF-8 file per key, named `<key>.json` inside the root directory.
//! - Writes go to a sibling temp file and are renamed into place, so readers
//!   never observe a half-written blob.

use super::{validate_key, KvStore, StorageError, StorageResult};
use log::{debug, error, info};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

const BLOB_EXTENSION: &str = "json";
const TEMP_SUFFIX: &str = "tmp";

/// Blob store keeping each key in its own file.
#[derive(Debug, Clone)]
pub struct FileKvStore {
    root: PathBuf,
}

impl FileKvStore {
    /// Opens (and creates if needed) the storage directory.
    pub fn open(root: impl AsRef<Path>) -> StorageResult<Self> {
        let root = root.as_ref().to_path_buf();
        if let Err(err) = fs::create_dir_all(&root) {
            error!(
                "event=kv_open module=storage status=error error_code=create_dir_failed error={}",
                err
            );
            return Err(StorageError::Io {
                key: root.display().to_string(),
                source: err,
            });
        }
        info!("event=kv_open module=storage status=ok mode=file");
        Ok(Self { root })
    }

    fn blob_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.{BLOB_EXTENSION}"))
    }
}

impl KvStore for FileKvStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        validate_key(key)?;
        match fs::read_to_string(self.blob_path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StorageError::Io {
                key: key.to_string(),
                source: err,
            }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        validate_key(key)?;
        let started_at = Instant::now();
        let target = self.blob_path(key);
        let temp = self
            .root
            .join(format!("{key}.{BLOB_EXTENSION}.{TEMP_SUFFIX}"));

        write_replace(&temp, &target, value).map_err(|err| {
            let _ = fs::remove_file(&temp);
            StorageError::Io {
                key: key.to_string(),
                source: err,
            }
        })?;

        debug!(
            "event=kv_set module=storage status=ok bytes={} duration_ms={}",
            value.len(),
            started_at.elapsed().as_millis()
        );
        Ok(())
    }
}

fn write_replace(temp: &Path, target: &Path, value: &str) -> std::io::Result<()> {
    let mut file = fs::File::create(temp)?;
    file.write_all(value.as_bytes())?;
    file.sync_all()?;
    drop(file);
    fs::rename(temp, target)
}
