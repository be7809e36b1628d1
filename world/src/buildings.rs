//! Stamping generated buildings into the sparse stores.

use murder_town_core::{BuildingLayout, CellCoord, Direction, Room};

use crate::{Door, Wall, World};

/// Building placed in the world.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Building {
    number: u32,
    origin: CellCoord,
    height: i32,
    width: i32,
    rooms: Vec<Room>,
    front_door: CellCoord,
}

impl Building {
    /// House number painted on the sign.
    #[must_use]
    pub const fn number(&self) -> u32 {
        self.number
    }

    /// Absolute cell of the building's local origin.
    #[must_use]
    pub const fn origin(&self) -> CellCoord {
        self.origin
    }

    /// Row offset of the bottom outer wall.
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.height
    }

    /// Column offset of the right outer wall.
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.width
    }

    /// Rooms in local coordinates.
    #[must_use]
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    /// Absolute cell of the front door.
    #[must_use]
    pub const fn front_door(&self) -> CellCoord {
        self.front_door
    }

    /// Converts a local cell to an absolute one.
    #[must_use]
    pub const fn absolute(&self, local: CellCoord) -> CellCoord {
        self.origin.offset(local.row(), local.column())
    }

    /// Reports whether the absolute cell lies strictly inside the outer walls.
    #[must_use]
    pub fn interior_contains(&self, cell: CellCoord) -> bool {
        Room {
            origin: self.origin,
            height: self.height,
            width: self.width,
        }
        .interior_contains(cell)
    }
}

/// Writes the layout into the world and returns the front door's final cell.
pub(crate) fn stamp(world: &mut World, origin: CellCoord, layout: BuildingLayout) -> CellCoord {
    let absolute = |local: CellCoord| origin.offset(local.row(), local.column());

    for &local in &layout.walls {
        let cell = absolute(local);
        if world.doors.contains_key(&cell) {
            continue;
        }
        let _ = world.fences.remove(&cell);
        let sign = (local == layout.sign).then_some(layout.number);
        let _ = world.walls.insert(cell, Wall { sign });
    }

    for &local in &layout.floors {
        let _ = world
            .decorations
            .insert(absolute(local), murder_town_core::Decoration::Floor);
    }

    let mut front_door = absolute(layout.front_door);
    for (&local, spec) in &layout.doors {
        let cell = corrected_door_cell(world, absolute(local));
        let _ = world.walls.remove(&cell);
        let _ = world.fences.remove(&cell);
        let _ = world.doors.insert(cell, Door::new(spec.locked));
        if local == layout.front_door {
            front_door = cell;
        }
    }

    let building = Building {
        number: layout.number,
        origin,
        height: layout.height,
        width: layout.width,
        rooms: layout.rooms,
        front_door,
    };
    let _ = world.buildings.insert(layout.number, building);
    front_door
}

/// Moves a door off a wall junction so it never sits where three walls meet.
fn corrected_door_cell(world: &World, cell: CellCoord) -> CellCoord {
    let wall = |direction: Direction| world.walls.contains_key(&cell.step(direction));
    let (north, east, south, west) = (
        wall(Direction::North),
        wall(Direction::East),
        wall(Direction::South),
        wall(Direction::West),
    );

    if north && south && (east || west) {
        cell.step(Direction::North)
    } else if east && west && (north || south) {
        cell.step(Direction::West)
    } else {
        cell
    }
}
