//! Read-only game definition tables.
//!
//! [`GameConfig`] holds the building, resource and city tables. Save
//! migration only ever reads these to decide whether a stored building type or
//! resource id is still known; new-game setup reads the city table for the
//! map size.

use std::collections::BTreeMap;
use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Priority assigned to buildings whose definition does not override it.
pub const PRIORITY_REGULAR: u32 = 0x01_00_00;

/// Static description of a building type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingDefinition {
    pub name: String,
    /// Resources consumed per cycle at level 1.
    #[serde(default)]
    pub input: BTreeMap<String, f64>,
    /// Resources produced per cycle at level 1.
    #[serde(default)]
    pub output: BTreeMap<String, f64>,
    #[serde(default = "default_priority")]
    pub default_priority: u32,
    /// Upper bound for `level`. `None` means unbounded.
    #[serde(default)]
    pub max_level: Option<u32>,
}

fn default_priority() -> u32 {
    PRIORITY_REGULAR
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceDefinition {
    pub name: String,
    #[serde(default)]
    pub tier: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityDefinition {
    pub name: String,
    /// Width and height of the square tile grid.
    pub size: u32,
}

/// All definition tables, keyed by their string ids.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub buildings: BTreeMap<String, BuildingDefinition>,
    pub resources: BTreeMap<String, ResourceDefinition>,
    pub cities: BTreeMap<String, CityDefinition>,
}

impl GameConfig {
    /// Parse a full set of tables from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load tables from a JSON file, falling back to the built-in tables if
    /// the file cannot be read or parsed.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                warn!(
                    "Could not read game config {}: {e}; using built-in tables",
                    path.display()
                );
                return Self::default();
            }
        };
        match Self::from_json(&text) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Could not parse game config {}: {e}; using built-in tables",
                    path.display()
                );
                Self::default()
            }
        }
    }

    pub fn building(&self, building_type: &str) -> Option<&BuildingDefinition> {
        self.buildings.get(building_type)
    }

    pub fn has_resource(&self, resource: &str) -> bool {
        self.resources.contains_key(resource)
    }

    pub fn city(&self, city: &str) -> Option<&CityDefinition> {
        self.cities.get(city)
    }

    /// The city a wiped save restarts in: the first entry of the city table.
    pub fn first_city(&self) -> Option<&str> {
        self.cities.keys().next().map(String::as_str)
    }
}

fn building(name: &str, input: &[(&str, f64)], output: &[(&str, f64)]) -> BuildingDefinition {
    BuildingDefinition {
        name: name.to_string(),
        input: input.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        output: output.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        default_priority: PRIORITY_REGULAR,
        max_level: None,
    }
}

fn resource(name: &str, tier: u32) -> ResourceDefinition {
    ResourceDefinition {
        name: name.to_string(),
        tier,
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        let buildings = [
            (
                "Headquarter",
                BuildingDefinition {
                    max_level: Some(1),
                    ..building("Headquarter", &[], &[])
                },
            ),
            ("Hut", building("Hut", &[], &[("Worker", 1.0)])),
            ("House", building("House", &[("Wheat", 1.0)], &[("Worker", 2.0)])),
            ("Aqueduct", building("Aqueduct", &[], &[("Water", 1.0)])),
            ("WheatFarm", building("Wheat Farm", &[("Water", 1.0)], &[("Wheat", 1.0)])),
            ("LoggingCamp", building("Logging Camp", &[], &[("Wood", 1.0)])),
            ("Bakery", building("Bakery", &[("Wheat", 1.0), ("Water", 1.0)], &[("Bread", 1.0)])),
            ("Library", building("Library", &[("Bread", 1.0)], &[("Science", 1.0)])),
        ]
        .into_iter()
        .map(|(id, def)| (id.to_string(), def))
        .collect();

        let resources = [
            ("Worker", resource("Worker", 0)),
            ("Science", resource("Science", 0)),
            ("Water", resource("Water", 1)),
            ("Wheat", resource("Wheat", 1)),
            ("Wood", resource("Wood", 1)),
            ("Bread", resource("Bread", 2)),
        ]
        .into_iter()
        .map(|(id, def)| (id.to_string(), def))
        .collect();

        let cities = [
            ("Rome", CityDefinition { name: "Rome".to_string(), size: 40 }),
            ("Athens", CityDefinition { name: "Athens".to_string(), size: 40 }),
            ("Memphis", CityDefinition { name: "Memphis".to_string(), size: 48 }),
        ]
        .into_iter()
        .map(|(id, def)| (id.to_string(), def))
        .collect();

        Self {
            buildings,
            resources,
            cities,
        }
    }
}
