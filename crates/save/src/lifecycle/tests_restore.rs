use std::sync::Arc;

use bevy::tasks::block_on;
use simulation::{point_to_tile, GameConfig, SAVE_FILE_VERSION};

use super::*;
use crate::file_header::wrap_compressed;
use crate::save_codec::serialize_save;
use crate::storage::MemoryStorage;
use crate::test_fixtures::{legacy_save_json, sample_save};

fn lifecycle_on(storage: &Arc<MemoryStorage>) -> SaveLifecycle {
    SaveLifecycle::new(GameConfig::default(), storage.clone())
}

#[test]
fn test_load_missing_key_is_none() {
    let storage = Arc::new(MemoryStorage::new());
    assert!(block_on(lifecycle_on(&storage).load()).is_none());
}

#[test]
fn test_load_garbage_is_none() {
    let storage = Arc::new(MemoryStorage::new());
    storage.set("CivIdle", b"\x00\x01 definitely not a save").unwrap();
    assert!(block_on(lifecycle_on(&storage).load()).is_none());
}

#[test]
fn test_load_compressed_save() {
    let storage = Arc::new(MemoryStorage::new());
    let json = serialize_save(&sample_save()).unwrap();
    storage.set("CivIdle", &wrap_compressed(&json)).unwrap();

    let loaded = block_on(lifecycle_on(&storage).load()).expect("save decodes");
    assert_eq!(loaded, sample_save());
}

#[test]
fn test_load_legacy_plain_text_save() {
    let storage = Arc::new(MemoryStorage::new());
    storage.set("CivIdle", legacy_save_json().as_bytes()).unwrap();

    let loaded = block_on(lifecycle_on(&storage).load()).expect("legacy save decodes");
    assert_eq!(loaded.current.city, "Rome");
    assert!(!loaded.current.tiles.is_canonical());
}

#[test]
fn test_restore_without_save_is_fresh() {
    let storage = Arc::new(MemoryStorage::new());
    let mut lifecycle = lifecycle_on(&storage);
    let fresh = lifecycle.game().clone();

    assert_eq!(
        block_on(lifecycle.restore_from_storage()),
        RestoreOutcome::Fresh
    );
    assert_eq!(lifecycle.game(), &fresh);
}

#[test]
fn test_restore_merges_compatible_save() {
    let storage = Arc::new(MemoryStorage::new());
    storage.set("CivIdle", legacy_save_json().as_bytes()).unwrap();
    let mut lifecycle = lifecycle_on(&storage);

    assert_eq!(
        block_on(lifecycle.restore_from_storage()),
        RestoreOutcome::Loaded
    );

    let current = &lifecycle.game().current;
    assert_eq!(current.city, "Rome");
    assert_eq!(current.tick, 10);
    let tiles = current.tiles.canonical().expect("migrated on restore");
    let unknown_hut = &tiles[&point_to_tile(3, 4).unwrap()];
    assert!(unknown_hut.building.is_none());
    let hut = tiles[&point_to_tile(1, 2).unwrap()]
        .building
        .as_ref()
        .expect("known building kept");
    assert_eq!(hut.resources.len(), 1);
    assert_eq!(hut.resources["Worker"], 3.0);
}

#[test]
fn test_restore_keeps_fresh_session_on_version_mismatch() {
    let storage = Arc::new(MemoryStorage::new());
    let mut stored = sample_save();
    stored.options.version = Some(SAVE_FILE_VERSION + 1);
    let json = serialize_save(&stored).unwrap();
    storage.set("CivIdle", &wrap_compressed(&json)).unwrap();

    let mut lifecycle = lifecycle_on(&storage);
    let fresh = lifecycle.game().clone();

    assert_eq!(
        block_on(lifecycle.restore_from_storage()),
        RestoreOutcome::Incompatible
    );
    assert_eq!(lifecycle.game(), &fresh);
}

#[test]
fn test_restore_rejects_save_without_version_tag() {
    let storage = Arc::new(MemoryStorage::new());
    storage
        .set(
            "CivIdle",
            br#"{"current":{"city":"Athens","tick":77,"tiles":{}},"options":{}}"#,
        )
        .unwrap();
    let mut lifecycle = lifecycle_on(&storage);
    let fresh = lifecycle.game().clone();

    assert_eq!(
        block_on(lifecycle.restore_from_storage()),
        RestoreOutcome::Incompatible
    );
    assert_eq!(lifecycle.game(), &fresh);
}

#[test]
fn test_merge_incoming_uses_compatibility_gate() {
    let storage = Arc::new(MemoryStorage::new());
    let mut lifecycle = lifecycle_on(&storage);

    let mut incoming = sample_save();
    assert!(lifecycle.merge_incoming(&mut incoming));
    assert_eq!(lifecycle.game().current, incoming.current);

    let mut newer = sample_save();
    newer.options.version = Some(SAVE_FILE_VERSION + 1);
    newer.current.tick = 1;
    assert!(!lifecycle.merge_incoming(&mut newer));
    assert_eq!(lifecycle.game().current.tick, 4242);
}

#[test]
fn test_reset_to_city_builds_grid_and_keeps_options() {
    let storage = Arc::new(MemoryStorage::new());
    let mut lifecycle = lifecycle_on(&storage);
    lifecycle.game_mut().options.sidebar_width = 250;

    lifecycle.reset_to_city("Memphis");

    let game = lifecycle.game();
    assert_eq!(game.current.city, "Memphis");
    assert_eq!(game.current.tiles.len(), 48 * 48);
    assert_eq!(game.options.sidebar_width, 250);
}

#[test]
fn test_reset_to_unknown_city_has_no_tiles() {
    let storage = Arc::new(MemoryStorage::new());
    let mut lifecycle = lifecycle_on(&storage);
    lifecycle.reset_to_city("Atlantis");
    assert!(lifecycle.game().current.tiles.is_empty());
}
