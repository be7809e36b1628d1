//! Tunable parameters for world generation and the simulation loop.
//!
//! Every section implements [`Default`] with the values the game ships with,
//! and every field may be omitted from a TOML document.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Complete configuration for a session.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Seed for every random decision. `None` lets the adapter pick one.
    pub seed: Option<u64>,
    /// Map dimensions and scattered decorations.
    pub map: MapConfig,
    /// Town grid placement and spacing.
    pub town: TownConfig,
    /// Building generator limits.
    pub building: BuildingConfig,
    /// Door behaviour.
    pub doors: DoorConfig,
    /// Pathfinder tuning.
    pub pathfinding: PathfindingConfig,
    /// Field-of-view settings.
    pub visibility: VisibilityConfig,
    /// Turn loop, schedule, and murder setup.
    pub simulation: SimulationConfig,
}

impl Config {
    /// Parses a TOML document and validates the result.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let building = &self.building;
        if building.minimum_room_dimension < 2 {
            return Err(invalid("building.minimum_room_dimension must be at least 2"));
        }
        if building.min_rooms == 0 || building.min_rooms > building.max_rooms {
            return Err(invalid(
                "building.min_rooms must be positive and not exceed building.max_rooms",
            ));
        }
        if building.max_attempts == 0 {
            return Err(invalid("building.max_attempts must be positive"));
        }
        let town = &self.town;
        if town.lot_size < building.minimum_height.max(building.minimum_width) + 1 {
            return Err(invalid("town.lot_size cannot fit the minimum building"));
        }
        if town.grid_rows == 0 || town.grid_columns == 0 {
            return Err(invalid("town grid must contain at least one lot"));
        }
        if town.grid_rows.saturating_mul(town.grid_columns) < 2 {
            return Err(invalid("town grid needs two lots for a victim and a killer"));
        }
        let town_rows = i64::from(town.origin_row)
            + i64::from(town.grid_rows) * i64::from(town.lot_size + town.road_height);
        let town_columns = i64::from(town.origin_column)
            + i64::from(town.grid_columns) * i64::from(town.lot_size + town.road_width);
        if town.origin_row < 0
            || town.origin_column < 0
            || town_rows > i64::from(self.map.rows)
            || town_columns > i64::from(self.map.columns)
        {
            return Err(invalid("town does not fit inside the map"));
        }
        if self.doors.close_after == 0 {
            return Err(invalid("doors.close_after must be positive"));
        }
        if !self.pathfinding.heuristic_scale.is_finite() || self.pathfinding.heuristic_scale < 0.0
        {
            return Err(invalid("pathfinding.heuristic_scale must be a non-negative number"));
        }
        let simulation = &self.simulation;
        if simulation.start_hour > 23 || simulation.start_minute > 59 {
            return Err(invalid("simulation start time is not a valid time of day"));
        }
        if simulation.first_visit_hour > simulation.last_visit_hour
            || simulation.last_visit_hour > 23
        {
            return Err(invalid("simulation visit hours are out of order"));
        }
        if simulation.police_min > simulation.police_max {
            return Err(invalid("simulation.police_min exceeds simulation.police_max"));
        }
        if simulation.kick_success_percent > 100 {
            return Err(invalid("simulation.kick_success_percent exceeds 100"));
        }
        Ok(())
    }
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::Invalid(message.to_owned())
}

/// Map dimensions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MapConfig {
    /// Number of rows on the map.
    pub rows: u32,
    /// Number of columns on the map.
    pub columns: u32,
    /// Number of random grass and flower decorations.
    pub scattered_decorations: u32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            rows: 75,
            columns: 78,
            scattered_decorations: 500,
        }
    }
}

/// Placement of the lot grid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TownConfig {
    /// Row of the first lot's upper-left corner.
    pub origin_row: i32,
    /// Column of the first lot's upper-left corner.
    pub origin_column: i32,
    /// Number of lot rows.
    pub grid_rows: u32,
    /// Number of lot columns.
    pub grid_columns: u32,
    /// Side length of a square lot.
    pub lot_size: i32,
    /// Width of the vertical road right of each lot.
    pub road_width: i32,
    /// Height of the horizontal road below each lot.
    pub road_height: i32,
}

impl Default for TownConfig {
    fn default() -> Self {
        Self {
            origin_row: 5,
            origin_column: 5,
            grid_rows: 3,
            grid_columns: 3,
            lot_size: 20,
            road_width: 3,
            road_height: 2,
        }
    }
}

/// Limits for the building generator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildingConfig {
    /// Smallest footprint width drawn for a building.
    pub minimum_width: i32,
    /// Smallest footprint height drawn for a building.
    pub minimum_height: i32,
    /// Smallest distance between parallel walls of a room.
    pub minimum_room_dimension: i32,
    /// Fewest rooms per building.
    pub min_rooms: u32,
    /// Most rooms per building.
    pub max_rooms: u32,
    /// Failed split picks tolerated before partitioning restarts.
    pub partition_retries: u32,
    /// Partition restarts tolerated before the attempt is abandoned.
    pub partition_restarts: u32,
    /// Whole-building attempts before generation fails.
    pub max_attempts: u32,
    /// Whether front doors start locked.
    pub front_doors_locked: bool,
}

impl Default for BuildingConfig {
    fn default() -> Self {
        Self {
            minimum_width: 15,
            minimum_height: 9,
            minimum_room_dimension: 4,
            min_rooms: 1,
            max_rooms: 4,
            partition_retries: 10,
            partition_restarts: 32,
            max_attempts: 64,
            front_doors_locked: false,
        }
    }
}

/// Door behaviour.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DoorConfig {
    /// Door updates an opened door stays open for.
    pub close_after: u32,
}

impl Default for DoorConfig {
    fn default() -> Self {
        Self { close_after: 10 }
    }
}

/// Distance estimate used to order the open set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Heuristic {
    /// Sum of the absolute row and column differences.
    #[default]
    Manhattan,
    /// Squared straight-line distance.
    SquaredEuclidean,
}

impl Heuristic {
    /// Unscaled estimate between two cells.
    #[must_use]
    pub fn estimate(self, from: crate::CellCoord, to: crate::CellCoord) -> f64 {
        let rows = f64::from(from.row()) - f64::from(to.row());
        let columns = f64::from(from.column()) - f64::from(to.column());
        match self {
            Heuristic::Manhattan => rows.abs() + columns.abs(),
            Heuristic::SquaredEuclidean => rows * rows + columns * columns,
        }
    }
}

/// Pathfinder tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathfindingConfig {
    /// Distance estimate.
    pub heuristic: Heuristic,
    /// Multiplier applied to the estimate; slightly above one prefers straighter routes.
    pub heuristic_scale: f64,
    /// Node expansions before the search gives up.
    pub max_iterations: u32,
}

impl Default for PathfindingConfig {
    fn default() -> Self {
        Self {
            heuristic: Heuristic::Manhattan,
            heuristic_scale: 1.001,
            max_iterations: 100_000,
        }
    }
}

/// Field-of-view settings.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VisibilityConfig {
    /// Computes field of view each turn instead of revealing the whole map.
    pub enabled: bool,
    /// Sight radius in cells. Defaults to the map width.
    pub radius: Option<u32>,
}

/// Turn loop, schedule, and murder setup.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Turns spent on each in-game minute after the first.
    pub turns_per_minute: u32,
    /// Hour shown when the session starts.
    pub start_hour: u8,
    /// Minute shown when the session starts.
    pub start_minute: u8,
    /// Whether non-player actors block each other.
    pub npc_collisions: bool,
    /// Visits planned for each living villager.
    pub visits_per_villager: u32,
    /// Earliest hour a visit may be planned for.
    pub first_visit_hour: u8,
    /// Latest hour a visit may be planned for.
    pub last_visit_hour: u8,
    /// Minutes a failed visit is postponed by. `None` drops failed visits.
    pub visit_retry_minutes: Option<u32>,
    /// Fewest officers posted inside the victim's house.
    pub police_min: u32,
    /// Most officers posted inside the victim's house.
    pub police_max: u32,
    /// Chance in percent that kicking a closed door breaks it open.
    pub kick_success_percent: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            turns_per_minute: 3,
            start_hour: 7,
            start_minute: 59,
            npc_collisions: false,
            visits_per_villager: 5,
            first_visit_hour: 8,
            last_visit_hour: 16,
            visit_retry_minutes: Some(15),
            police_min: 4,
            police_max: 5,
            kick_success_percent: 19,
        }
    }
}
