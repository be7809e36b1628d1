#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Procedural generator for houses partitioned into connected rooms.
//!
//! A building is produced in local coordinates: the footprint is split into
//! rooms by binary space partitioning, every partition gets a door, and a
//! flood fill rejects any layout whose rooms are not all reachable. The
//! result is handed to the world through `Command::PlaceBuilding`.

mod flood;
mod partition;

use std::collections::{BTreeMap, BTreeSet};

use murder_town_core::{
    config::BuildingConfig, BuildingLayout, CellCoord, DoorSpec, GenerationError, Room,
};
use rand::Rng;
use tracing::debug;

/// Generates building layouts within caller-provided bounds.
#[derive(Clone, Debug, Default)]
pub struct BuildingGenerator {
    config: BuildingConfig,
}

impl BuildingGenerator {
    /// Creates a generator using the provided limits.
    #[must_use]
    pub fn new(config: BuildingConfig) -> Self {
        Self { config }
    }

    /// Smallest `max_height` and `max_width` the generator accepts.
    #[must_use]
    pub fn minimum_bounds(&self) -> (i32, i32) {
        let partitionable = 2 * self.config.minimum_room_dimension + 1;
        (
            self.config.minimum_height.max(partitionable),
            self.config.minimum_width.max(partitionable),
        )
    }

    /// Generates a building whose footprint fits in `max_height` by `max_width` cells.
    ///
    /// The returned layout's `height` and `width` are far-wall indices, one
    /// less than the drawn footprint size.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        max_height: i32,
        max_width: i32,
        number: u32,
    ) -> Result<BuildingLayout, GenerationError> {
        let (min_height, min_width) = self.minimum_bounds();
        if max_height < min_height || max_width < min_width {
            return Err(GenerationError::BoundsTooSmall {
                max_height,
                max_width,
                min_height,
                min_width,
            });
        }

        for attempt in 1..=self.config.max_attempts {
            let height = rng.gen_range(min_height..=max_height) - 1;
            let width = rng.gen_range(min_width..=max_width) - 1;
            let splits = rng.gen_range(self.config.min_rooms..=self.config.max_rooms) - 1;

            let Some(partition) = partition::partition(rng, height, width, splits, &self.config)
            else {
                debug!(attempt, height, width, "partition restarts exhausted");
                continue;
            };

            let walls: BTreeSet<CellCoord> = partition
                .rooms
                .iter()
                .flat_map(Room::perimeter)
                .collect();
            let mut doors: BTreeMap<CellCoord, DoorSpec> = partition
                .doors
                .iter()
                .map(|&cell| (cell, DoorSpec { locked: false }))
                .collect();

            if !flood::is_connected(height, width, &walls, &doors) {
                debug!(attempt, "rooms disconnected, regenerating");
                continue;
            }

            let mut door_column = rng.gen_range(1..width);
            if walls.contains(&CellCoord::new(height - 1, door_column)) {
                door_column -= 1;
            }
            let front_door = CellCoord::new(height, door_column);
            let _ = doors.insert(
                front_door,
                DoorSpec {
                    locked: self.config.front_doors_locked,
                },
            );

            let floors = (0..height)
                .flat_map(|row| (0..width).map(move |column| CellCoord::new(row, column)))
                .collect();

            debug!(number, attempt, rooms = partition.rooms.len(), "building generated");
            return Ok(BuildingLayout {
                number,
                height,
                width,
                rooms: partition.rooms,
                walls,
                doors,
                floors,
                front_door,
                sign: CellCoord::new(height, door_column - 1),
            });
        }

        Err(GenerationError::AttemptsExhausted {
            attempts: self.config.max_attempts,
        })
    }
}

/// Reports whether every open cell of a layout is reachable from its first interior cell.
#[must_use]
pub fn is_connected(layout: &BuildingLayout) -> bool {
    flood::is_connected(layout.height, layout.width, &layout.walls, &layout.doors)
}
