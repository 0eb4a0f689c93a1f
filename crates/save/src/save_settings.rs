//! Save pipeline settings.
//!
//! Defaults suit a desktop build; each field can be overridden from the
//! environment (see [`SaveSettings::from_env`]).

use std::path::PathBuf;
use std::time::Duration;

use bevy::prelude::*;

use crate::storage::StoragePlatform;

/// Storage key the save document lives under.
pub const SAVE_KEY: &str = "CivIdle";

/// Default time between autosaves.
pub const DEFAULT_AUTOSAVE_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct SaveSettings {
    pub save_key: String,
    /// Root directory for both storage backends.
    pub data_dir: PathBuf,
    /// Force a storage backend instead of detecting the platform.
    pub platform: Option<StoragePlatform>,
    /// `None` disables autosave.
    pub autosave_interval: Option<Duration>,
}

impl Default for SaveSettings {
    fn default() -> Self {
        Self {
            save_key: SAVE_KEY.to_string(),
            data_dir: PathBuf::from("saves"),
            platform: None,
            autosave_interval: Some(DEFAULT_AUTOSAVE_INTERVAL),
        }
    }
}

impl SaveSettings {
    /// Defaults overridden by `CIVIDLE_SAVE_DIR`, `CIVIDLE_PLATFORM` and
    /// `CIVIDLE_AUTOSAVE_SECS` (`0` disables autosave).
    pub fn from_env() -> Self {
        Self::default().with_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary lookup. Unparseable values are
    /// ignored with a warning.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(dir) = lookup("CIVIDLE_SAVE_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(platform) = lookup("CIVIDLE_PLATFORM") {
            match StoragePlatform::parse(&platform) {
                Some(platform) => self.platform = Some(platform),
                None => warn!("Ignoring unknown CIVIDLE_PLATFORM {platform:?}"),
            }
        }
        if let Some(secs) = lookup("CIVIDLE_AUTOSAVE_SECS") {
            match secs.trim().parse::<u64>() {
                Ok(0) => self.autosave_interval = None,
                Ok(secs) => self.autosave_interval = Some(Duration::from_secs(secs)),
                Err(e) => warn!("Ignoring invalid CIVIDLE_AUTOSAVE_SECS {secs:?}: {e}"),
            }
        }
        self
    }
}
