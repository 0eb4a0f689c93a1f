//! Building records stored on tiles.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::config::{BuildingDefinition, PRIORITY_REGULAR};
use crate::lenient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildingStatus {
    /// Under construction.
    Building,
    Upgrading,
    #[default]
    Completed,
}

impl<'de> Deserialize<'de> for BuildingStatus {
    /// Unknown status strings (from a newer or hand-edited save) read as
    /// `Completed` rather than failing the load.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let status = String::deserialize(deserializer)?;
        Ok(match status.as_str() {
            "building" => BuildingStatus::Building,
            "upgrading" => BuildingStatus::Upgrading,
            _ => BuildingStatus::Completed,
        })
    }
}

/// A building placed on a tile.
///
/// Every field except `type` has a serde default, and numeric fields are read
/// through [`lenient`], so records written by older builds still deserialize;
/// [`make_building`] then normalises them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Building {
    #[serde(rename = "type")]
    pub building_type: String,
    #[serde(default = "default_level", deserialize_with = "lenient::count_or_one")]
    pub level: u32,
    #[serde(default = "default_level", deserialize_with = "lenient::count_or_one")]
    pub desired_level: u32,
    #[serde(default)]
    pub status: BuildingStatus,
    /// Stored resources, resource id -> amount. Non-numeric amounts in the
    /// source document are read as NaN so migration can drop them.
    #[serde(default, deserialize_with = "lenient::amounts")]
    pub resources: BTreeMap<String, f64>,
    /// Fraction of full production capacity, `0.0..=1.0`. `null` reads as NaN.
    #[serde(default = "default_capacity", deserialize_with = "lenient::amount")]
    pub capacity: f64,
    #[serde(
        default = "default_stockpile_capacity",
        deserialize_with = "lenient::count_or_one"
    )]
    pub stockpile_capacity: u32,
    #[serde(default, deserialize_with = "lenient::count_or_zero")]
    pub stockpile_max: u32,
    #[serde(default = "default_priority", deserialize_with = "lenient::priority")]
    pub priority: u32,
    #[serde(default, deserialize_with = "lenient::count_or_zero")]
    pub electrification: u32,
}

fn default_level() -> u32 {
    1
}

fn default_capacity() -> f64 {
    1.0
}

fn default_stockpile_capacity() -> u32 {
    1
}

fn default_priority() -> u32 {
    PRIORITY_REGULAR
}

impl Building {
    /// A freshly placed level-1 building of the given type.
    pub fn new(building_type: impl Into<String>, def: &BuildingDefinition) -> Self {
        Self {
            building_type: building_type.into(),
            level: 1,
            desired_level: 1,
            status: BuildingStatus::Completed,
            resources: BTreeMap::new(),
            capacity: 1.0,
            stockpile_capacity: 1,
            stockpile_max: 0,
            priority: def.default_priority,
            electrification: 0,
        }
    }
}

/// Rebuild `data` as a canonical building of its definition.
///
/// Fields are carried over from `data`, then clamped into the ranges the
/// simulation expects: `level` within the definition's `max_level`,
/// `desired_level` never below `level`, `capacity` finite and in `0..=1`,
/// `electrification` never above `level`. Resources are carried over as-is;
/// callers filter them against the resource table.
///
/// Idempotent: `make_building(make_building(b, d), d) == make_building(b, d)`.
pub fn make_building(data: Building, def: &BuildingDefinition) -> Building {
    let mut building = Building {
        resources: data.resources,
        ..Building::new(data.building_type, def)
    };

    building.level = match def.max_level {
        Some(max) => data.level.min(max),
        None => data.level,
    };
    building.desired_level = data.desired_level.max(building.level);
    building.status = data.status;
    building.capacity = if data.capacity.is_finite() {
        data.capacity.clamp(0.0, 1.0)
    } else {
        1.0
    };
    building.stockpile_capacity = data.stockpile_capacity;
    building.stockpile_max = data.stockpile_max;
    building.priority = data.priority;
    building.electrification = data.electrification.min(building.level);
    building
}
