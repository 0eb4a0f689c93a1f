mod atomic_write;
mod autosave;
mod compat_gate;
mod compress_worker;
pub mod file_header;
mod lifecycle;
mod save_codec;
mod save_error;
mod save_plugin;
pub mod save_settings;
pub mod storage;
mod tile_migrate;

#[cfg(test)]
mod test_fixtures;

pub use autosave::AutosaveTimer;
pub use compat_gate::is_game_data_compatible;
pub use lifecycle::{
    LifecycleState, ReloadHandler, RestoreOutcome, SaveLifecycle, SaveOutcome, SaveTask,
};
pub use save_codec::{
    compress_save, decode_stored_save, decompress_save, deserialize_save, serialize_save,
};
pub use save_error::SaveError;
pub use save_plugin::{
    InFlightSaves, ReloadRequested, SaveGameEvent, SavePlugin, SaveStorageHandle, SessionOrigin,
};
pub use save_settings::SaveSettings;
pub use storage::{SaveStorage, StoragePlatform};
pub use tile_migrate::{migrate_game_state, migrate_saved_game, MigrationReport};
