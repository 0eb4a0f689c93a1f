// ---------------------------------------------------------------------------
// game_state – the persisted save document
// ---------------------------------------------------------------------------
//
// `SavedGame` is the root of everything written to storage: the per-run
// `GameState` plus the player's `GameOptions`. Map-typed fields go through
// `map_encoding` so they survive the JSON round-trip as real maps.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::buildings::{make_building, Building};
use crate::config::GameConfig;
use crate::map_encoding;
use crate::tile::{point_to_tile, TileId};

/// Compatibility tag written into [`GameOptions::version`]. Two saves can only
/// be merged if their tags are identical.
pub const SAVE_FILE_VERSION: u32 = 1;

/// Radius (in tiles, Chebyshev distance) explored around the headquarter of a
/// fresh city.
pub const STARTING_EXPLORED_RADIUS: u32 = 2;

/// One tile in canonical form.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TileData {
    /// The tile's own id (equal to its key in the tile map).
    pub tile: TileId,
    #[serde(default)]
    pub explored: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building: Option<Building>,
}

/// One tile as written by builds that keyed tiles by `"x,y"`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LegacyTileData {
    /// Redundant copy of the map key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tile: Option<TileId>,
    #[serde(default)]
    pub explored: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building: Option<Building>,
}

/// Tile storage in either of its two historical layouts.
///
/// The layout is decided structurally when the document is read: a tagged map
/// (see [`map_encoding`]) is `Canonical`, a plain keyed record is `Legacy`.
#[derive(Debug, Clone, PartialEq)]
pub enum TileStore {
    Legacy(BTreeMap<String, LegacyTileData>),
    Canonical(BTreeMap<TileId, TileData>),
}

impl Default for TileStore {
    fn default() -> Self {
        TileStore::Canonical(BTreeMap::new())
    }
}

impl TileStore {
    pub fn is_canonical(&self) -> bool {
        matches!(self, TileStore::Canonical(_))
    }

    /// The canonical tile map, or `None` if the store still needs migrating.
    pub fn canonical(&self) -> Option<&BTreeMap<TileId, TileData>> {
        match self {
            TileStore::Canonical(tiles) => Some(tiles),
            TileStore::Legacy(_) => None,
        }
    }

    pub fn canonical_mut(&mut self) -> Option<&mut BTreeMap<TileId, TileData>> {
        match self {
            TileStore::Canonical(tiles) => Some(tiles),
            TileStore::Legacy(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            TileStore::Legacy(tiles) => tiles.len(),
            TileStore::Canonical(tiles) => tiles.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Serialize for TileStore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TileStore::Legacy(tiles) => tiles.serialize(serializer),
            TileStore::Canonical(tiles) => map_encoding::serialize(tiles, serializer),
        }
    }
}

impl<'de> Deserialize<'de> for TileStore {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct CanonicalTiles(#[serde(with = "map_encoding")] BTreeMap<TileId, TileData>);

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Canonical(CanonicalTiles),
            Legacy(BTreeMap<String, LegacyTileData>),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Canonical(CanonicalTiles(tiles)) => TileStore::Canonical(tiles),
            Repr::Legacy(tiles) => TileStore::Legacy(tiles),
        })
    }
}

/// A batch of resources travelling between two tiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transportation {
    pub id: u32,
    pub from_xy: TileId,
    pub to_xy: TileId,
    pub resource: String,
    /// `null` reads as NaN; the migrator drops such transports.
    #[serde(deserialize_with = "crate::lenient::amount")]
    pub amount: f64,
    pub ticks_required: u32,
    #[serde(default)]
    pub ticks_spent: u32,
    #[serde(default)]
    pub fuel: Option<String>,
}

/// Per-run state: the city, its tiles and everything in motion on them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub city: String,
    #[serde(default)]
    pub tick: u64,
    #[serde(default)]
    pub tiles: TileStore,
    /// Destination tile -> transports heading there.
    #[serde(
        default,
        serialize_with = "map_encoding::serialize",
        deserialize_with = "map_encoding::deserialize_lenient"
    )]
    pub transportation: BTreeMap<TileId, Vec<Transportation>>,
    #[serde(default)]
    pub great_people_choices: Vec<Vec<String>>,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            city: String::new(),
            tick: 0,
            tiles: TileStore::default(),
            transportation: BTreeMap::new(),
            great_people_choices: Vec::new(),
        }
    }
}

impl GameState {
    /// A fresh run in `city`: one tile per grid cell, a headquarter in the
    /// centre and the area around it explored.
    ///
    /// An unknown city yields an empty tile map.
    pub fn new_for_city(city: &str, config: &GameConfig) -> Self {
        let mut tiles = BTreeMap::new();
        if let Some(def) = config.city(city) {
            let center = def.size / 2;
            for x in 0..def.size {
                for y in 0..def.size {
                    let Some(tile) = point_to_tile(x, y) else {
                        continue;
                    };
                    let explored = x.abs_diff(center) <= STARTING_EXPLORED_RADIUS
                        && y.abs_diff(center) <= STARTING_EXPLORED_RADIUS;
                    let building = if x == center && y == center {
                        config
                            .building("Headquarter")
                            .map(|hq| make_building(Building::new("Headquarter", hq), hq))
                    } else {
                        None
                    };
                    tiles.insert(
                        tile,
                        TileData {
                            tile,
                            explored,
                            building,
                        },
                    );
                }
            }
        }
        Self {
            city: city.to_string(),
            tiles: TileStore::Canonical(tiles),
            ..Self::default()
        }
    }

    /// Overwrite every field of `self` with the corresponding field of
    /// `other`.
    pub fn assign_from(&mut self, other: GameState) {
        let GameState {
            city,
            tick,
            tiles,
            transportation,
            great_people_choices,
        } = other;
        self.city = city;
        self.tick = tick;
        self.tiles = tiles;
        self.transportation = transportation;
        self.great_people_choices = great_people_choices;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GreatPersonLevel {
    pub level: u32,
    #[serde(default)]
    pub amount: u32,
}

/// Player preferences and cross-run progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameOptions {
    /// Compatibility tag. `None` when the stored document carries no tag;
    /// such a document never matches another save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    pub user_id: Option<String>,
    /// Theme color name -> CSS color.
    pub theme_colors: BTreeMap<String, String>,
    #[serde(rename = "useModernUI")]
    pub use_modern_ui: bool,
    pub sidebar_width: u32,
    pub font_size_scaling: f32,
    /// Permanent great people, id -> level.
    pub great_people: BTreeMap<String, GreatPersonLevel>,
    pub great_people_choices: Vec<Vec<String>>,
}

impl Default for GameOptions {
    fn default() -> Self {
        let theme_colors = [
            ("WorldBackground", "#1e2328"),
            ("Grid", "#000000"),
            ("SelectedGridColor", "#ffff99"),
            ("ResearchBackground", "#1e2328"),
            ("ResearchLockedColor", "#666666"),
            ("ResearchUnlockedColor", "#ffffff"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            version: Some(SAVE_FILE_VERSION),
            user_id: None,
            theme_colors,
            use_modern_ui: true,
            sidebar_width: 400,
            font_size_scaling: 1.0,
            great_people: BTreeMap::new(),
            great_people_choices: Vec::new(),
        }
    }
}

impl GameOptions {
    /// Defaults for a document read without an `options` record: no
    /// compatibility tag.
    pub fn unversioned() -> Self {
        Self {
            version: None,
            ..Self::default()
        }
    }
}

/// Root persisted document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SavedGame {
    pub current: GameState,
    #[serde(default = "GameOptions::unversioned")]
    pub options: GameOptions,
}

impl SavedGame {
    /// A fresh save starting in `city`.
    pub fn new_for_city(city: &str, config: &GameConfig) -> Self {
        Self {
            current: GameState::new_for_city(city, config),
            options: GameOptions::default(),
        }
    }
}
