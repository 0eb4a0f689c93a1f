use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bevy::tasks::block_on;
use simulation::GameConfig;

use super::*;
use crate::save_codec::decode_stored_save;
use crate::storage::MemoryStorage;
use crate::test_fixtures::sample_save;

fn lifecycle_with_counter() -> (SaveLifecycle, Arc<MemoryStorage>, Arc<AtomicUsize>) {
    let storage = Arc::new(MemoryStorage::new());
    let reloads = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&reloads);
    let lifecycle = SaveLifecycle::new(GameConfig::default(), storage.clone())
        .with_reload_handler(Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
    (lifecycle, storage, reloads)
}

#[test]
fn test_save_writes_envelope_under_key() {
    let (mut lifecycle, storage, reloads) = lifecycle_with_counter();
    *lifecycle.game_mut() = sample_save();

    let task = lifecycle.save(false).unwrap();
    assert_eq!(lifecycle.state(), LifecycleState::Saving);
    let outcome = block_on(task);

    assert!(matches!(outcome, SaveOutcome::Written { .. }));
    assert_eq!(lifecycle.state(), LifecycleState::Idle);
    assert_eq!(reloads.load(Ordering::SeqCst), 0);

    let stored = storage.get("CivIdle").unwrap().expect("save stored");
    assert!(crate::file_header::has_magic(&stored));
    let decoded = block_on(decode_stored_save(stored)).unwrap();
    assert_eq!(decoded, sample_save());
}

#[test]
fn test_second_ordinary_save_rejected_while_first_in_flight() {
    let (mut lifecycle, storage, _) = lifecycle_with_counter();

    let first = lifecycle.save(false).unwrap();
    let second = lifecycle.save(false);
    assert!(matches!(second, Err(SaveError::SaveInProgress)));

    block_on(first);
    assert_eq!(storage.write_count(), 1);
    assert!(lifecycle.save(false).is_ok());
}

#[test]
fn test_forced_saves_both_proceed_and_both_reload() {
    let (mut lifecycle, storage, reloads) = lifecycle_with_counter();

    let first = lifecycle.save(true).unwrap();
    let second = lifecycle.save(true).unwrap();
    assert_eq!(lifecycle.state(), LifecycleState::SavingAndReloading);
    assert!(matches!(lifecycle.save(false), Err(SaveError::SaveInProgress)));

    block_on(first);
    assert_eq!(lifecycle.state(), LifecycleState::SavingAndReloading);
    block_on(second);
    assert_eq!(storage.write_count(), 2);
    assert_eq!(reloads.load(Ordering::SeqCst), 2);
}

#[test]
fn test_forced_save_runs_alongside_ordinary_save() {
    let (mut lifecycle, storage, reloads) = lifecycle_with_counter();

    let ordinary = lifecycle.save(false).unwrap();
    let forced = lifecycle.save(true).unwrap();
    block_on(forced);
    block_on(ordinary);

    assert_eq!(storage.write_count(), 2);
    assert_eq!(reloads.load(Ordering::SeqCst), 1);
}

#[test]
fn test_failed_forced_write_still_reloads() {
    let (mut lifecycle, storage, reloads) = lifecycle_with_counter();
    storage.set_fail_writes(true);

    let outcome = block_on(lifecycle.save(true).unwrap());

    assert_eq!(outcome, SaveOutcome::WriteFailed);
    assert_eq!(reloads.load(Ordering::SeqCst), 1);
    assert!(storage.get("CivIdle").unwrap().is_none());
}

#[test]
fn test_failed_ordinary_write_clears_flag() {
    let (mut lifecycle, storage, reloads) = lifecycle_with_counter();
    storage.set_fail_writes(true);

    let outcome = block_on(lifecycle.save(false).unwrap());

    assert_eq!(outcome, SaveOutcome::WriteFailed);
    assert_eq!(lifecycle.state(), LifecycleState::Idle);
    assert_eq!(reloads.load(Ordering::SeqCst), 0);

    storage.set_fail_writes(false);
    let outcome = block_on(lifecycle.save(false).unwrap());
    assert!(matches!(outcome, SaveOutcome::Written { .. }));
}

#[test]
fn test_dropped_task_runs_cleanup() {
    let (mut lifecycle, storage, reloads) = lifecycle_with_counter();

    drop(lifecycle.save(false).unwrap());
    assert_eq!(lifecycle.state(), LifecycleState::Idle);

    drop(lifecycle.save(true).unwrap());
    assert_eq!(reloads.load(Ordering::SeqCst), 1);
    assert_eq!(storage.write_count(), 0);
}

#[test]
fn test_save_snapshots_document_at_call_time() {
    let (mut lifecycle, storage, _) = lifecycle_with_counter();
    lifecycle.game_mut().current.tick = 1;

    let task = lifecycle.save(false).unwrap();
    lifecycle.game_mut().current.tick = 2;
    block_on(task);

    let stored = storage.get("CivIdle").unwrap().unwrap();
    let decoded = block_on(decode_stored_save(stored)).unwrap();
    assert_eq!(decoded.current.tick, 1);
}

#[test]
fn test_wipe_save_data_resets_and_forces_save() {
    let (mut lifecycle, storage, reloads) = lifecycle_with_counter();
    *lifecycle.game_mut() = sample_save();
    lifecycle
        .game_mut()
        .options
        .great_people
        .insert("Plato".to_string(), Default::default());
    lifecycle
        .game_mut()
        .options
        .great_people_choices
        .push(vec!["Homer".to_string()]);

    block_on(lifecycle.wipe_save_data().unwrap());

    let game = lifecycle.game();
    assert_eq!(game.current.city, "Athens");
    assert_eq!(game.current.tick, 0);
    assert!(game.options.great_people.is_empty());
    assert!(game.options.great_people_choices.is_empty());
    assert_eq!(game.options.user_id.as_deref(), Some("player-1"));
    assert_eq!(reloads.load(Ordering::SeqCst), 1);
    assert_eq!(storage.write_count(), 1);
}

#[test]
fn test_load_save_replaces_document_and_reloads() {
    let (mut lifecycle, storage, reloads) = lifecycle_with_counter();
    let imported = sample_save();

    block_on(lifecycle.load_save(imported.clone()).unwrap());

    assert_eq!(lifecycle.game(), &imported);
    assert_eq!(reloads.load(Ordering::SeqCst), 1);
    let stored = storage.get("CivIdle").unwrap().unwrap();
    assert_eq!(block_on(decode_stored_save(stored)).unwrap(), imported);
}

#[test]
fn test_clear_game_deletes_key_and_reloads() {
    let (mut lifecycle, storage, reloads) = lifecycle_with_counter();
    block_on(lifecycle.save(false).unwrap());
    assert!(storage.get("CivIdle").unwrap().is_some());

    lifecycle.clear_game().unwrap();

    assert!(storage.get("CivIdle").unwrap().is_none());
    assert_eq!(reloads.load(Ordering::SeqCst), 1);
    assert!(matches!(lifecycle.save(false), Err(SaveError::SaveInProgress)));
}

#[test]
fn test_custom_save_key() {
    let (lifecycle, storage, _) = lifecycle_with_counter();
    let mut lifecycle = lifecycle.with_save_key("CivIdleBeta");
    block_on(lifecycle.save(false).unwrap());
    assert!(storage.get("CivIdle").unwrap().is_none());
    assert!(storage.get("CivIdleBeta").unwrap().is_some());
}
