//! Local key/value store.
//!
//! Each key maps to one file in a single store directory. Keys are
//! hex-encoded into file names so any key string is safe to use.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::SaveStorage;
use crate::atomic_write::atomic_write;
use crate::save_error::SaveError;

pub struct LocalKeyValueStorage {
    dir: PathBuf,
}

impl LocalKeyValueStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        let encoded: String = key.bytes().map(|b| format!("{b:02x}")).collect();
        self.dir.join(format!("{encoded}.kv"))
    }
}

impl SaveStorage for LocalKeyValueStorage {
    fn name(&self) -> &'static str {
        "local-kv"
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, SaveError> {
        match fs::read(self.entry_path(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, bytes: &[u8]) -> Result<(), SaveError> {
        atomic_write(&self.entry_path(key), bytes)?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), SaveError> {
        match fs::remove_file(self.entry_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
