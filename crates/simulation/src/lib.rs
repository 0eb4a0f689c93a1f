//! Game-state data model shared by the save pipeline and the rest of the
//! game: the persisted [`SavedGame`] document, tile addressing, building
//! records and the read-only definition tables.

use bevy::prelude::*;

pub mod buildings;
pub mod config;
pub mod game_state;
pub mod lenient;
pub mod map_encoding;
pub mod tile;

pub use buildings::{make_building, Building, BuildingStatus};
pub use config::GameConfig;
pub use game_state::{
    GameOptions, GameState, LegacyTileData, SavedGame, TileData, TileStore, Transportation,
    SAVE_FILE_VERSION,
};
pub use tile::{point_to_tile, tile_to_point, tile_to_xy, xy_to_tile, TileId};

/// Registers the definition tables as a resource.
///
/// If `CIVIDLE_CONFIG` points at a JSON file, the tables are read from it;
/// otherwise the built-in tables are used.
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        if app.world().contains_resource::<GameConfig>() {
            return;
        }
        let config = match std::env::var("CIVIDLE_CONFIG") {
            Ok(path) => GameConfig::load_or_default(path),
            Err(_) => GameConfig::default(),
        };
        app.insert_resource(config);
    }
}
