//! Periodic autosave.
//!
//! A repeating timer built from `SaveSettings::autosave_interval`. When it
//! fires and no save is in flight, an ordinary `SaveGameEvent` is sent. A
//! tick that finds a save in flight is skipped rather than queued.

use bevy::prelude::*;

use crate::lifecycle::{LifecycleState, SaveLifecycle};
use crate::save_plugin::SaveGameEvent;
use crate::save_settings::SaveSettings;

/// `None` when autosave is disabled.
#[derive(Resource, Debug, Default)]
pub struct AutosaveTimer {
    pub timer: Option<Timer>,
}

impl AutosaveTimer {
    pub fn from_settings(settings: &SaveSettings) -> Self {
        Self {
            timer: settings
                .autosave_interval
                .map(|interval| Timer::new(interval, TimerMode::Repeating)),
        }
    }
}

fn init_autosave_timer(mut commands: Commands, settings: Res<SaveSettings>) {
    let timer = AutosaveTimer::from_settings(&settings);
    match &timer.timer {
        Some(t) => info!("Autosave every {:?}", t.duration()),
        None => info!("Autosave disabled"),
    }
    commands.insert_resource(timer);
}

fn trigger_autosave(
    time: Res<Time>,
    mut autosave: ResMut<AutosaveTimer>,
    lifecycle: Option<Res<SaveLifecycle>>,
    mut save_events: EventWriter<SaveGameEvent>,
) {
    let Some(timer) = autosave.timer.as_mut() else {
        return;
    };
    if !timer.tick(time.delta()).just_finished() {
        return;
    }
    let Some(lifecycle) = lifecycle else {
        return;
    };
    if lifecycle.state() != LifecycleState::Idle {
        debug!("Skipping autosave, a save is already in flight");
        return;
    }
    save_events.send(SaveGameEvent {
        force_and_reload: false,
    });
}

pub(crate) struct AutosavePlugin;

impl Plugin for AutosavePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AutosaveTimer>()
            .add_systems(Startup, init_autosave_timer)
            .add_systems(Update, trigger_autosave);
    }
}
