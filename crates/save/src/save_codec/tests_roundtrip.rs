// ---------------------------------------------------------------------------
// tests_roundtrip – serialize -> compress -> decompress -> deserialize
// ---------------------------------------------------------------------------

use bevy::tasks::block_on;
use simulation::{SavedGame, TileStore};

use super::*;
use crate::test_fixtures::sample_save;

#[test]
fn test_full_pipeline_roundtrip_preserves_save() {
    let save = sample_save();
    let stored = block_on(compress_save(&save)).unwrap();
    let restored = block_on(decompress_save(stored)).unwrap();
    assert_eq!(restored, save);
}

#[test]
fn test_map_fields_restore_as_maps_with_same_keys() {
    let save = sample_save();
    let stored = block_on(compress_save(&save)).unwrap();
    let restored = block_on(decompress_save(stored)).unwrap();

    let (TileStore::Canonical(original), TileStore::Canonical(tiles)) =
        (&save.current.tiles, &restored.current.tiles)
    else {
        panic!("tiles should stay canonical across a round-trip");
    };
    assert!(original.keys().eq(tiles.keys()));
    assert!(save
        .current
        .transportation
        .keys()
        .eq(restored.current.transportation.keys()));
}

#[test]
fn test_serialized_tiles_use_tagged_map_encoding() {
    let json: serde_json::Value =
        serde_json::from_slice(&serialize_save(&sample_save()).unwrap()).unwrap();
    assert_eq!(json["current"]["tiles"]["$type"], "Map");
    assert_eq!(json["current"]["transportation"]["$type"], "Map");
    assert!(json["current"]["tiles"]["value"].is_array());
}

#[test]
fn test_empty_save_roundtrip() {
    let save = SavedGame::default();
    let stored = block_on(compress_save(&save)).unwrap();
    assert_eq!(block_on(decompress_save(stored)).unwrap(), save);
}

#[test]
fn test_decompress_save_rejects_plain_text() {
    let json = serialize_save(&sample_save()).unwrap();
    assert!(block_on(decompress_save(json)).is_err());
}

#[test]
fn test_nan_amount_survives_as_nan_for_migration() {
    let mut save = sample_save();
    if let Some(tiles) = save.current.tiles.canonical_mut() {
        for tile in tiles.values_mut() {
            if let Some(building) = tile.building.as_mut() {
                building.resources.insert("Wood".to_string(), f64::NAN);
            }
        }
    }
    let stored = block_on(compress_save(&save)).unwrap();
    let restored = block_on(decompress_save(stored)).unwrap();
    let tiles = restored.current.tiles.canonical().unwrap();
    let amounts: Vec<f64> = tiles
        .values()
        .filter_map(|t| t.building.as_ref())
        .filter_map(|b| b.resources.get("Wood").copied())
        .collect();
    assert!(!amounts.is_empty());
    assert!(amounts.iter().all(|a| a.is_nan()));
}
