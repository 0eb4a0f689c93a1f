use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bevy::prelude::*;
use bevy::tasks::{block_on, IoTaskPool, Task, TaskPool};
use simulation::GameConfig;

use crate::lifecycle::{RestoreOutcome, SaveLifecycle, SaveOutcome};
use crate::save_settings::SaveSettings;
use crate::storage::{open_storage, SaveStorage};

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

/// Storage backend override. When present at startup it is used instead of
/// the backend selected from `SaveSettings`.
#[derive(Resource, Clone)]
pub struct SaveStorageHandle(pub Arc<dyn SaveStorage>);

/// Save tasks running on the `IoTaskPool`, polled once per frame.
#[derive(Resource, Default)]
pub struct InFlightSaves {
    tasks: Vec<Task<SaveOutcome>>,
}

impl InFlightSaves {
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Set by the lifecycle's reload handler; turned into an `AppExit` so the
/// host can restart the session from storage.
#[derive(Resource, Default, Clone)]
pub struct ReloadRequested(pub Arc<AtomicBool>);

/// How the session was restored at startup.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOrigin(pub RestoreOutcome);

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[derive(Event, Debug, Clone, Copy, Default)]
pub struct SaveGameEvent {
    /// Save even if another save is in flight, then reload.
    pub force_and_reload: bool,
}

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

pub struct SavePlugin;

impl Plugin for SavePlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<SaveSettings>() {
            app.insert_resource(SaveSettings::from_env());
        }

        app.add_event::<SaveGameEvent>()
            .init_resource::<GameConfig>()
            .init_resource::<InFlightSaves>()
            .init_resource::<ReloadRequested>();

        app.add_systems(Startup, (setup_save_lifecycle, restore_session).chain());

        app.add_systems(
            Update,
            (detect_save_event, poll_save_tasks, exit_on_reload).chain(),
        );

        app.add_plugins(crate::autosave::AutosavePlugin);
    }
}

// ---------------------------------------------------------------------------
// Startup
// ---------------------------------------------------------------------------

fn setup_save_lifecycle(
    mut commands: Commands,
    settings: Res<SaveSettings>,
    config: Res<GameConfig>,
    reload: Res<ReloadRequested>,
    storage_override: Option<Res<SaveStorageHandle>>,
) {
    let storage = match storage_override {
        Some(handle) => Arc::clone(&handle.0),
        None => open_storage(&settings),
    };
    let flag = Arc::clone(&reload.0);
    let lifecycle = SaveLifecycle::new(config.clone(), storage)
        .with_save_key(settings.save_key.clone())
        .with_reload_handler(Arc::new(move || flag.store(true, Ordering::SeqCst)));
    commands.insert_resource(lifecycle);
}

/// Blocks startup until the stored save has been read and merged.
fn restore_session(mut commands: Commands, mut lifecycle: ResMut<SaveLifecycle>) {
    let outcome = block_on(lifecycle.restore_from_storage());
    info!("Session restored: {outcome:?}");
    commands.insert_resource(SessionOrigin(outcome));
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

/// Starts at most one save per frame. If any of this frame's events is
/// forced, the save is forced.
fn detect_save_event(
    mut events: EventReader<SaveGameEvent>,
    mut lifecycle: ResMut<SaveLifecycle>,
    mut in_flight: ResMut<InFlightSaves>,
) {
    let mut requested = false;
    let mut force_and_reload = false;
    for event in events.read() {
        requested = true;
        force_and_reload |= event.force_and_reload;
    }
    if !requested {
        return;
    }

    match lifecycle.save(force_and_reload) {
        Ok(task) => {
            let pool = IoTaskPool::get_or_init(TaskPool::default);
            in_flight.tasks.push(pool.spawn(task));
        }
        Err(e) => warn!("Save request ignored: {e}"),
    }
}

fn poll_save_tasks(mut in_flight: ResMut<InFlightSaves>) {
    in_flight.tasks.retain_mut(|task| {
        match block_on(futures_lite::future::poll_once(task)) {
            Some(outcome) => {
                debug!("Save task finished: {outcome:?}");
                false
            }
            None => true,
        }
    });
}

fn exit_on_reload(reload: Res<ReloadRequested>, mut exit: EventWriter<AppExit>) {
    if reload.0.swap(false, Ordering::SeqCst) {
        info!("Reload requested, exiting so the session restarts from storage");
        exit.send(AppExit::Success);
    }
}
