// ---------------------------------------------------------------------------
// storage – where the save bytes live
// ---------------------------------------------------------------------------
//
// The lifecycle manager only talks to the `SaveStorage` trait. Which backend
// it gets is decided once at startup:
//   - `LocalKeyValueStorage`: the game's own key/value store under the data dir
//   - `CloudFileStorage`: the platform's file API (Steam remote storage dir)
//   - `MemoryStorage`: in-process, for tests and tools

use std::path::Path;
use std::sync::Arc;

use bevy::prelude::*;

use crate::save_error::SaveError;
use crate::save_settings::SaveSettings;

mod cloud_file;
mod key_value;
mod memory;

pub use cloud_file::CloudFileStorage;
pub use key_value::LocalKeyValueStorage;
pub use memory::MemoryStorage;

/// A key/value byte store holding save data.
///
/// Calls are blocking; the lifecycle manager runs them off the main thread.
pub trait SaveStorage: Send + Sync {
    /// Short backend name for log messages.
    fn name(&self) -> &'static str;

    /// Bytes stored under `key`, or `None` if nothing is stored.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, SaveError>;

    /// Store `bytes` under `key`, replacing any previous value.
    fn set(&self, key: &str, bytes: &[u8]) -> Result<(), SaveError>;

    /// Remove `key`. Removing a missing key is not an error.
    fn delete(&self, key: &str) -> Result<(), SaveError>;
}

/// Which storage backend a build should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoragePlatform {
    LocalKeyValue,
    CloudFile,
}

/// File the Steam client expects next to the executable of a Steam build.
const STEAM_APPID_FILE: &str = "steam_appid.txt";

impl StoragePlatform {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "local" | "kv" | "web" => Some(StoragePlatform::LocalKeyValue),
            "cloud" | "steam" => Some(StoragePlatform::CloudFile),
            _ => None,
        }
    }

    /// Runtime platform check: a Steam build ships `steam_appid.txt` next to
    /// its executable (or in the working directory when launched by the
    /// client).
    pub fn detect() -> Self {
        let beside_exe = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join(STEAM_APPID_FILE)))
            .is_some_and(|path| path.exists());
        if beside_exe || Path::new(STEAM_APPID_FILE).exists() {
            StoragePlatform::CloudFile
        } else {
            StoragePlatform::LocalKeyValue
        }
    }
}

/// Open the backend selected by `settings` (or detected).
pub fn open_storage(settings: &SaveSettings) -> Arc<dyn SaveStorage> {
    let platform = settings.platform.unwrap_or_else(StoragePlatform::detect);
    let storage: Arc<dyn SaveStorage> = match platform {
        StoragePlatform::LocalKeyValue => {
            Arc::new(LocalKeyValueStorage::new(settings.data_dir.join("local")))
        }
        StoragePlatform::CloudFile => {
            Arc::new(CloudFileStorage::new(settings.data_dir.join("remote")))
        }
    };
    info!(
        "Using {} save storage under {}",
        storage.name(),
        settings.data_dir.display()
    );
    storage
}
