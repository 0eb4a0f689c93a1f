use std::time::Duration;

use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;

/// Frame interval of the headless runner.
const TICK_INTERVAL: Duration = Duration::from_millis(100);

fn main() {
    let mut app = App::new();

    app.add_plugins((
        MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(TICK_INTERVAL)),
        LogPlugin::default(),
    ))
    .add_plugins((simulation::SimulationPlugin, save::SavePlugin));

    // One-shot mode: restore (and migrate) the stored save, write it back in
    // the current format and exit once the write completes.
    if std::env::var("CIVIDLE_RESAVE_AND_EXIT").is_ok() {
        app.add_systems(Update, resave_once);
    }

    app.run();
}

fn resave_once(mut sent: Local<bool>, mut save_events: EventWriter<save::SaveGameEvent>) {
    if !*sent {
        *sent = true;
        save_events.send(save::SaveGameEvent {
            force_and_reload: true,
        });
    }
}
