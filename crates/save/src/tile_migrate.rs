// ---------------------------------------------------------------------------
// tile_migrate – legacy tile layout upgrade and building revalidation
// ---------------------------------------------------------------------------
//
// Two passes over `GameState`:
//   1. Structural: a `TileStore::Legacy` map keyed by "x,y" becomes a
//      `TileStore::Canonical` map keyed by numeric tile id. The redundant
//      `xy` field is consumed and `transportation` is reset. Skipped when the
//      store is already canonical, so the whole migration is idempotent.
//   2. Revalidation: every building is checked against the current
//      definition tables. Unknown building types are removed from their tile,
//      known ones are rebuilt through `make_building`, and resources that are
//      unknown or hold a non-finite amount are deleted. Transports with a
//      non-finite amount are dropped as well.
//
// Nothing in here fails: malformed entries are dropped and counted.

use std::collections::BTreeMap;

use bevy::prelude::*;
use simulation::{make_building, xy_to_tile, GameConfig, GameState, SavedGame, TileData, TileStore};

/// What a migration run changed. Only used for logging and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Whether the legacy -> canonical conversion ran.
    pub converted_layout: bool,
    /// Legacy entries converted to canonical tiles.
    pub tiles_converted: usize,
    /// Legacy entries whose key was not a valid `"x,y"` pair.
    pub invalid_keys_dropped: usize,
    /// Buildings removed because their type is not in the building table.
    pub buildings_removed: usize,
    /// Resource entries removed (unknown id or non-finite amount).
    pub resources_removed: usize,
    /// Transports removed because their amount is not a finite number.
    pub transports_removed: usize,
}

impl MigrationReport {
    pub fn changed_anything(&self) -> bool {
        self.converted_layout
            || self.invalid_keys_dropped > 0
            || self.buildings_removed > 0
            || self.resources_removed > 0
            || self.transports_removed > 0
    }
}

/// Migrate the tile data of a save in place.
pub fn migrate_saved_game(save: &mut SavedGame, config: &GameConfig) -> MigrationReport {
    migrate_game_state(&mut save.current, config)
}

/// Migrate a `GameState` in place. See the module docs for the passes.
pub fn migrate_game_state(state: &mut GameState, config: &GameConfig) -> MigrationReport {
    let mut report = MigrationReport::default();

    if let TileStore::Legacy(legacy) = &mut state.tiles {
        let legacy = std::mem::take(legacy);
        let mut tiles = BTreeMap::new();
        for (key, entry) in legacy {
            let Some(id) = xy_to_tile(&key) else {
                warn!("Dropping legacy tile with invalid coordinate key {key:?}");
                report.invalid_keys_dropped += 1;
                continue;
            };
            let own_id = entry
                .xy
                .as_deref()
                .and_then(xy_to_tile)
                .or(entry.tile)
                .unwrap_or(id);
            tiles.insert(
                id,
                TileData {
                    tile: own_id,
                    explored: entry.explored,
                    building: entry.building,
                },
            );
            report.tiles_converted += 1;
        }
        state.tiles = TileStore::Canonical(tiles);
        state.transportation = BTreeMap::new();
        report.converted_layout = true;
    }

    if let Some(tiles) = state.tiles.canonical_mut() {
        for tile in tiles.values_mut() {
            let Some(building) = tile.building.take() else {
                continue;
            };
            let Some(def) = config.building(&building.building_type) else {
                debug!(
                    "Removing unknown building {:?} from tile {}",
                    building.building_type, tile.tile
                );
                report.buildings_removed += 1;
                continue;
            };
            let mut building = make_building(building, def);
            let before = building.resources.len();
            building
                .resources
                .retain(|res, amount| config.has_resource(res) && amount.is_finite());
            report.resources_removed += before - building.resources.len();
            tile.building = Some(building);
        }
    }

    for transports in state.transportation.values_mut() {
        let before = transports.len();
        transports.retain(|t| t.amount.is_finite());
        report.transports_removed += before - transports.len();
    }

    if report.changed_anything() {
        info!(
            "Migrated save tiles: {} converted, {} invalid keys dropped, \
             {} buildings removed, {} resources removed, {} transports removed",
            report.tiles_converted,
            report.invalid_keys_dropped,
            report.buildings_removed,
            report.resources_removed,
            report.transports_removed,
        );
    }

    report
}
