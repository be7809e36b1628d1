use thiserror::Error;

/// Failures raised while generating buildings, the town, or the opening scene.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GenerationError {
    /// The lot cannot host even the smallest building.
    #[error(
        "bounds {max_height}x{max_width} cannot fit a building of at least {min_height}x{min_width}"
    )]
    BoundsTooSmall {
        /// Maximum height offered by the caller.
        max_height: i32,
        /// Maximum width offered by the caller.
        max_width: i32,
        /// Smallest height the generator can partition.
        min_height: i32,
        /// Smallest width the generator can partition.
        min_width: i32,
    },
    /// Every attempt produced a building with unreachable rooms.
    #[error("no connected building after {attempts} attempts")]
    AttemptsExhausted {
        /// Number of whole-building attempts made.
        attempts: u32,
    },
    /// No free interior cell was found for an actor.
    #[error("no free cell for a {role} in house {house}")]
    NoFreeCell {
        /// Human readable role of the actor being placed.
        role: &'static str,
        /// House number that was searched.
        house: u32,
    },
    /// The lot grid has more rows or columns than map coordinates can address.
    #[error("a {rows}x{columns} lot grid does not fit in map coordinates")]
    GridTooLarge {
        /// Requested lot rows.
        rows: u32,
        /// Requested lot columns.
        columns: u32,
    },
    /// The town does not have enough residents for a murder.
    #[error("a murder needs at least two villagers, found {found}")]
    NotEnoughVillagers {
        /// Number of villagers available.
        found: usize,
    },
}

/// Failures raised by the pathfinder.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum PathError {
    /// The goal is blocked or disconnected from the origin.
    #[error("goal is unreachable")]
    Unreachable,
    /// The search gave up after expanding the configured number of nodes.
    #[error("search exhausted after {iterations} expansions")]
    SearchExhausted {
        /// Number of nodes expanded before giving up.
        iterations: u32,
    },
}

/// Failures raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document is not valid TOML or does not match the schema.
    #[error("failed to parse configuration")]
    Parse(#[from] toml::de::Error),
    /// A value is outside its permitted range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
