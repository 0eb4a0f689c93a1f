//! In-process storage.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use super::SaveStorage;
use crate::save_error::SaveError;

/// A `HashMap` behind a mutex. Writes can be made to fail on demand to
/// exercise error paths.
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, Vec<u8>>>,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `set` fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of `set` calls attempted, including failed ones.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>>, SaveError> {
        self.entries
            .lock()
            .map_err(|_| SaveError::Storage("memory storage lock poisoned".to_string()))
    }
}

impl SaveStorage for MemoryStorage {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, SaveError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, bytes: &[u8]) -> Result<(), SaveError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(SaveError::Storage("simulated write failure".to_string()));
        }
        self.lock()?.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), SaveError> {
        self.lock()?.remove(key);
        Ok(())
    }
}
