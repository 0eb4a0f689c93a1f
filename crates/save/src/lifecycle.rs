// ---------------------------------------------------------------------------
// lifecycle – owns the live save and serializes access to storage
// ---------------------------------------------------------------------------
//
// One `SaveLifecycle` exists per session. It holds the live `SavedGame`, the
// storage backend picked at startup and the in-flight flag that keeps two
// ordinary saves from overlapping.
//
//   Idle ──save(false)──> Saving ──task done──> Idle
//   any  ──save(true)───> SavingAndReloading ──task done──> reload handler
//
// A forced save neither waits for nor blocks other saves. Every save task
// carries a `SaveCleanup` guard, so its cleanup runs when the task finishes,
// fails, or is dropped unpolled.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use bevy::prelude::*;
use simulation::{GameConfig, GameState, SavedGame};

use crate::compat_gate::is_game_data_compatible;
use crate::compress_worker;
use crate::save_codec::{decode_stored_save, serialize_save};
use crate::save_error::SaveError;
use crate::save_settings::SAVE_KEY;
use crate::storage::SaveStorage;
use crate::tile_migrate::migrate_saved_game;

/// Called after a forced save completes, and by [`SaveLifecycle::clear_game`].
/// The host restarts the session from storage.
pub trait ReloadHandler: Send + Sync {
    fn reload(&self);
}

impl<F: Fn() + Send + Sync> ReloadHandler for F {
    fn reload(&self) {
        self()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Idle,
    Saving,
    SavingAndReloading,
}

/// How a save task ended. Write failures are already logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Written { bytes: usize },
    WriteFailed,
}

/// Result of restoring the session at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// A stored save was merged into the session.
    Loaded,
    /// A stored save exists but its version differs; the fresh session is kept.
    Incompatible,
    /// Nothing usable in storage.
    Fresh,
}

/// A pending save. Poll it (or hand it to a task pool) to compress and write.
pub struct SaveTask {
    inner: Pin<Box<dyn Future<Output = SaveOutcome> + Send>>,
}

impl Future for SaveTask {
    type Output = SaveOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<SaveOutcome> {
        self.inner.as_mut().poll(cx)
    }
}

/// Runs a save's cleanup exactly once, on drop.
struct SaveCleanup {
    force_and_reload: bool,
    saving: Arc<AtomicBool>,
    forced_in_flight: Arc<AtomicUsize>,
    reload: Arc<dyn ReloadHandler>,
}

impl Drop for SaveCleanup {
    fn drop(&mut self) {
        if self.force_and_reload {
            self.forced_in_flight.fetch_sub(1, Ordering::SeqCst);
            self.reload.reload();
        } else {
            self.saving.store(false, Ordering::SeqCst);
        }
    }
}

#[derive(Resource)]
pub struct SaveLifecycle {
    game: SavedGame,
    config: GameConfig,
    storage: Arc<dyn SaveStorage>,
    save_key: String,
    saving: Arc<AtomicBool>,
    /// Forced saves not yet finished.
    forced_in_flight: Arc<AtomicUsize>,
    reload: Arc<dyn ReloadHandler>,
}

impl SaveLifecycle {
    /// A session on a fresh save in the first configured city.
    pub fn new(config: GameConfig, storage: Arc<dyn SaveStorage>) -> Self {
        let city = config.first_city().unwrap_or_default().to_string();
        let game = SavedGame::new_for_city(&city, &config);
        Self {
            game,
            config,
            storage,
            save_key: SAVE_KEY.to_string(),
            saving: Arc::new(AtomicBool::new(false)),
            forced_in_flight: Arc::new(AtomicUsize::new(0)),
            reload: Arc::new(|| warn!("Reload requested but no reload handler is installed")),
        }
    }

    pub fn with_save_key(mut self, key: impl Into<String>) -> Self {
        self.save_key = key.into();
        self
    }

    pub fn with_reload_handler(mut self, reload: Arc<dyn ReloadHandler>) -> Self {
        self.reload = reload;
        self
    }

    pub fn game(&self) -> &SavedGame {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut SavedGame {
        &mut self.game
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn storage(&self) -> &Arc<dyn SaveStorage> {
        &self.storage
    }

    pub fn state(&self) -> LifecycleState {
        if self.forced_in_flight.load(Ordering::SeqCst) > 0 {
            LifecycleState::SavingAndReloading
        } else if self.saving.load(Ordering::SeqCst) {
            LifecycleState::Saving
        } else {
            LifecycleState::Idle
        }
    }

    /// Start a save of the live document.
    ///
    /// A non-forced save while another save is in flight fails immediately
    /// with [`SaveError::SaveInProgress`]; nothing is queued. The in-flight
    /// flag is set and the document serialized before this returns, so later
    /// edits to the live save do not leak into the task.
    pub fn save(&mut self, force_and_reload: bool) -> Result<SaveTask, SaveError> {
        if force_and_reload {
            self.saving.store(true, Ordering::SeqCst);
            self.forced_in_flight.fetch_add(1, Ordering::SeqCst);
        } else if self
            .saving
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(SaveError::SaveInProgress);
        }

        let cleanup = SaveCleanup {
            force_and_reload,
            saving: Arc::clone(&self.saving),
            forced_in_flight: Arc::clone(&self.forced_in_flight),
            reload: Arc::clone(&self.reload),
        };
        let json = serialize_save(&self.game)?;
        let storage = Arc::clone(&self.storage);
        let key = self.save_key.clone();

        let inner = async move {
            let _cleanup = cleanup;
            let compressed = compress_worker::compress(json).await;
            match storage.set(&key, &compressed) {
                Ok(()) => {
                    info!(
                        "Saved {} bytes to {} storage",
                        compressed.len(),
                        storage.name()
                    );
                    SaveOutcome::Written {
                        bytes: compressed.len(),
                    }
                }
                Err(e) => {
                    error!("Failed to write save to {} storage: {e}", storage.name());
                    SaveOutcome::WriteFailed
                }
            }
        };
        Ok(SaveTask {
            inner: Box::pin(inner),
        })
    }

    /// Read and decode the stored save. Missing or undecodable data yields
    /// `None`; decode failures are logged.
    pub fn load(&self) -> impl Future<Output = Option<SavedGame>> + Send + 'static {
        let storage = Arc::clone(&self.storage);
        let key = self.save_key.clone();
        async move {
            let bytes = match storage.get(&key) {
                Ok(Some(bytes)) => bytes,
                Ok(None) => {
                    info!("No save found in {} storage", storage.name());
                    return None;
                }
                Err(e) => {
                    warn!("Failed to read save from {} storage: {e}", storage.name());
                    return None;
                }
            };
            match decode_stored_save(bytes).await {
                Ok(save) => Some(save),
                Err(e) => {
                    warn!("Stored save could not be decoded: {e}");
                    None
                }
            }
        }
    }

    /// Startup: load the stored save and merge it into the fresh session.
    pub async fn restore_from_storage(&mut self) -> RestoreOutcome {
        let Some(mut stored) = self.load().await else {
            return RestoreOutcome::Fresh;
        };
        if self.merge_incoming(&mut stored) {
            info!("Restored save for city {}", self.game.current.city);
            RestoreOutcome::Loaded
        } else {
            warn!(
                "Stored save version {:?} is incompatible, starting fresh",
                stored.options.version
            );
            RestoreOutcome::Incompatible
        }
    }

    /// Merge an incoming save (cloud sync, file import) into the session.
    /// See [`is_game_data_compatible`].
    pub fn merge_incoming(&mut self, incoming: &mut SavedGame) -> bool {
        is_game_data_compatible(&mut self.game, incoming, &self.config)
    }

    /// Replace the current run with a fresh one in `city`. Options are kept.
    pub fn reset_to_city(&mut self, city: &str) {
        if self.config.city(city).is_none() {
            warn!("Resetting to unknown city {city:?}; the map will be empty");
        }
        self.game.current = GameState::new_for_city(city, &self.config);
    }

    /// Restart in the first city, forget great people and force a save.
    pub fn wipe_save_data(&mut self) -> Result<SaveTask, SaveError> {
        let city = self.config.first_city().unwrap_or_default().to_string();
        self.reset_to_city(&city);
        self.game.options.great_people.clear();
        self.game.options.great_people_choices.clear();
        self.save(true)
    }

    /// Replace the live document with an imported one and force a save.
    ///
    /// The imported document is migrated first so the stored copy is always
    /// in the canonical layout.
    pub fn load_save(&mut self, mut save: SavedGame) -> Result<SaveTask, SaveError> {
        self.saving.store(true, Ordering::SeqCst);
        migrate_saved_game(&mut save, &self.config);
        self.game = save;
        self.save(true)
    }

    /// Delete the stored save and reload. Ordinary saves stay blocked until
    /// the session is replaced.
    pub fn clear_game(&mut self) -> Result<(), SaveError> {
        self.saving.store(true, Ordering::SeqCst);
        let result = self.storage.delete(&self.save_key);
        match &result {
            Ok(()) => info!("Cleared save from {} storage", self.storage.name()),
            Err(e) => error!("Failed to clear save from {} storage: {e}", self.storage.name()),
        }
        self.reload.reload();
        result
    }
}

#[cfg(test)]
mod tests_save;

#[cfg(test)]
mod tests_restore;
