//! Platform file storage (Steam remote storage directory).
//!
//! Each key is a plain file name inside the remote directory, which the
//! platform client syncs to the cloud. Writes are atomic.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::SaveStorage;
use crate::atomic_write::atomic_write;
use crate::save_error::SaveError;

pub struct CloudFileStorage {
    dir: PathBuf,
}

impl CloudFileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn file_path(&self, key: &str) -> Result<PathBuf, SaveError> {
        let valid = !key.is_empty()
            && key != "."
            && key != ".."
            && !key.contains(['/', '\\'])
            && !key.ends_with(".tmp");
        if !valid {
            return Err(SaveError::Storage(format!(
                "{key:?} is not a valid cloud file name"
            )));
        }
        Ok(self.dir.join(key))
    }
}

impl SaveStorage for CloudFileStorage {
    fn name(&self) -> &'static str {
        "cloud-file"
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, SaveError> {
        match fs::read(self.file_path(key)?) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, bytes: &[u8]) -> Result<(), SaveError> {
        atomic_write(&self.file_path(key)?, bytes)?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), SaveError> {
        match fs::remove_file(self.file_path(key)?) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
