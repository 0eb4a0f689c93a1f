//! Shared builders for save pipeline tests.

use std::collections::BTreeMap;

use simulation::{
    point_to_tile, Building, GameConfig, GameState, LegacyTileData, SavedGame, TileData,
    TileStore, Transportation,
};

/// A small canonical save with a building, stored resources, transports and
/// non-default options.
pub(crate) fn sample_save() -> SavedGame {
    let config = GameConfig::default();
    let mut save = SavedGame::new_for_city("Rome", &config);
    save.current.tick = 4242;

    let farm_tile = point_to_tile(3, 4).unwrap();
    if let Some(tiles) = save.current.tiles.canonical_mut() {
        tiles.insert(
            farm_tile,
            TileData {
                tile: farm_tile,
                explored: true,
                building: Some(Building {
                    level: 3,
                    desired_level: 3,
                    resources: BTreeMap::from([
                        ("Water".to_string(), 12.5),
                        ("Wheat".to_string(), 4.0),
                    ]),
                    ..Building::new("WheatFarm", &config.buildings["WheatFarm"])
                }),
            },
        );
    }

    save.current.transportation.insert(
        farm_tile,
        vec![Transportation {
            id: 1,
            from_xy: point_to_tile(20, 20).unwrap(),
            to_xy: farm_tile,
            resource: "Water".to_string(),
            amount: 6.0,
            ticks_required: 17,
            ticks_spent: 5,
            fuel: Some("Worker".to_string()),
        }],
    );

    save.options.user_id = Some("player-1".to_string());
    save.options
        .theme_colors
        .insert("Grid".to_string(), "#123456".to_string());
    save
}

/// A save in the old string-keyed tile layout, as a JS build would have
/// written it.
pub(crate) fn legacy_save_json() -> String {
    serde_json::json!({
        "current": {
            "city": "Rome",
            "tick": 10,
            "tiles": {
                "3,4": {
                    "xy": "3,4",
                    "explored": true,
                    "building": {"type": "UnknownHut", "resources": {"Water": 5}}
                },
                "1,2": {
                    "xy": "1,2",
                    "building": {
                        "type": "Hut",
                        "level": 2,
                        "resources": {"Worker": 3, "Water": null, "Gold": 1}
                    }
                }
            },
            "transportation": {}
        },
        "options": {"version": simulation::SAVE_FILE_VERSION}
    })
    .to_string()
}

/// A legacy-layout state built in memory.
pub(crate) fn legacy_state(entries: Vec<(&str, LegacyTileData)>) -> GameState {
    GameState {
        city: "Rome".to_string(),
        tiles: TileStore::Legacy(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        ),
        ..GameState::default()
    }
}
