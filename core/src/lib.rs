#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Murder Town engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Generators and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then reports [`Event`] values
//! describing what actually changed. Systems read immutable snapshots and
//! respond exclusively with new command batches.

pub mod config;
mod error;

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};

pub use error::{ConfigError, GenerationError, PathError};

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Stamps a generated building into the world with its local origin at `origin`.
    PlaceBuilding {
        /// Absolute cell that receives the building's local `(0, 0)`.
        origin: CellCoord,
        /// Generated building expressed in local coordinates.
        layout: BuildingLayout,
    },
    /// Places a fence segment unless a wall or door already claims the cell.
    PlaceFence {
        /// Cell that should receive the fence.
        cell: CellCoord,
    },
    /// Records cosmetic ground cover for a cell.
    PlaceDecoration {
        /// Cell that receives the decoration.
        cell: CellCoord,
        /// Kind of ground cover to record.
        decoration: Decoration,
    },
    /// Requests that a new actor enters the world.
    SpawnActor {
        /// Role of the actor being spawned.
        kind: ActorKind,
        /// Cell the actor should occupy.
        cell: CellCoord,
        /// House number the actor lives in, if any.
        home: Option<u32>,
    },
    /// Marks an actor as dead, clearing any pending route.
    KillActor {
        /// Identifier of the actor that dies.
        actor: ActorId,
    },
    /// Flags an actor as the killer of the current case.
    MarkKiller {
        /// Identifier of the actor to flag.
        actor: ActorId,
    },
    /// Replaces the fallback behaviour an actor uses when it has no route.
    SetBehaviour {
        /// Identifier of the actor being updated.
        actor: ActorId,
        /// Behaviour the actor should adopt.
        behaviour: Behaviour,
    },
    /// Replaces the route an actor consumes one step per turn.
    SetActorPath {
        /// Identifier of the actor receiving the route.
        actor: ActorId,
        /// Ordered cells to visit, excluding the actor's current cell.
        path: Vec<CellCoord>,
    },
    /// Moves an actor onto the next cell of its route when that cell is enterable.
    AdvanceAlongPath {
        /// Identifier of the actor consuming its route.
        actor: ActorId,
    },
    /// Moves an actor one cell in the provided direction when the cell is enterable.
    StepActor {
        /// Identifier of the actor attempting to move.
        actor: ActorId,
        /// Direction of travel for the attempted step.
        direction: Direction,
    },
    /// Moves the player two cells across an adjacent fence.
    JumpFence {
        /// Identifier of the jumping actor.
        actor: ActorId,
        /// Direction of the fence being jumped.
        direction: Direction,
    },
    /// Opens the door at the provided cell.
    OpenDoor {
        /// Cell containing the door.
        cell: CellCoord,
        /// Opens the door even when it is locked.
        bypass_lock: bool,
    },
    /// Closes the door at the provided cell.
    CloseDoor {
        /// Cell containing the door.
        cell: CellCoord,
    },
    /// Clears the lock flag of the door at the provided cell.
    UnlockDoor {
        /// Cell containing the door.
        cell: CellCoord,
    },
    /// Advances the turn counter and, every few turns, the in-game clock.
    Tick,
    /// Counts down open doors and closes the ones whose timer expires.
    TickDoors,
    /// Replaces the set of cells currently in view of the player.
    UpdateVisibility {
        /// Cells visible this turn.
        visible: Vec<CellCoord>,
    },
    /// Marks every tile as visible and seen.
    RevealAll,
}

/// Events reported by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a building was stamped into the world.
    BuildingPlaced {
        /// House number painted on the building's sign.
        house: u32,
        /// Absolute cell of the building's local origin.
        origin: CellCoord,
        /// Absolute cell of the front door after corner correction.
        front_door: CellCoord,
    },
    /// Reports that a placement request was refused.
    PlacementRejected {
        /// Cell named by the request.
        cell: CellCoord,
        /// Reason the placement failed.
        reason: Rejection,
    },
    /// Confirms that an actor entered the world.
    ActorSpawned {
        /// Identifier assigned by the world.
        actor: ActorId,
        /// Role of the new actor.
        kind: ActorKind,
        /// Cell the actor occupies.
        cell: CellCoord,
    },
    /// Reports that a spawn request was refused.
    SpawnRejected {
        /// Role requested for the actor.
        kind: ActorKind,
        /// Cell named by the request.
        cell: CellCoord,
        /// Reason the spawn failed.
        reason: Rejection,
    },
    /// Confirms that an actor died.
    ActorDied {
        /// Identifier of the dead actor.
        actor: ActorId,
    },
    /// Confirms that an actor received a new route.
    PathAssigned {
        /// Identifier of the routed actor.
        actor: ActorId,
        /// Number of steps in the route.
        length: usize,
    },
    /// Reports that a route was discarded because it no longer starts next to the actor.
    PathAbandoned {
        /// Identifier of the actor whose route was dropped.
        actor: ActorId,
    },
    /// Confirms that an actor moved between two cells.
    ActorMoved {
        /// Identifier of the actor that moved.
        actor: ActorId,
        /// Cell the actor occupied before moving.
        from: CellCoord,
        /// Cell the actor occupies after moving.
        to: CellCoord,
    },
    /// Reports that a requested move did not happen.
    StepBlocked {
        /// Identifier of the actor that stayed put.
        actor: ActorId,
        /// Cell the actor attempted to enter.
        cell: CellCoord,
        /// Reason the move was refused.
        reason: Rejection,
    },
    /// Confirms that a door swung open.
    DoorOpened {
        /// Cell containing the door.
        cell: CellCoord,
    },
    /// Confirms that a door closed, either on request or when its timer expired.
    DoorClosed {
        /// Cell containing the door.
        cell: CellCoord,
    },
    /// Confirms that a door's lock was cleared.
    DoorUnlocked {
        /// Cell containing the door.
        cell: CellCoord,
    },
    /// Reports that an open request hit a locked door.
    DoorLocked {
        /// Cell containing the door.
        cell: CellCoord,
    },
    /// Reports that a door command named a cell without a door.
    DoorMissing {
        /// Cell named by the command.
        cell: CellCoord,
    },
    /// Announces that the in-game clock moved to a new minute.
    TimeAdvanced {
        /// Clock reading after the tick.
        time: ClockTime,
    },
    /// Confirms that the visible tile set was replaced.
    VisibilityUpdated {
        /// Number of tiles visible after the update.
        visible: usize,
    },
}

/// Reasons the world refuses a placement, spawn, or move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Rejection {
    /// The cell lies outside the map.
    OutOfBounds,
    /// A wall, fence, or closed door occupies the cell.
    Obstructed(Obstruction),
    /// Another actor stands in the cell.
    Occupied(ActorId),
    /// The actor is not allowed to perform the action.
    NotPermitted,
    /// A player already exists.
    DuplicatePlayer,
}

/// Static features that block movement through a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Obstruction {
    /// Building wall.
    Wall,
    /// Lot boundary fence.
    Fence,
    /// Door that is currently closed.
    ClosedDoor,
}

/// Cosmetic ground cover. Never blocks movement or sight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Decoration {
    /// Building floor.
    Floor,
    /// Road surface between lots.
    Road,
    /// Random grass and flowers.
    Scatter,
}

/// Cardinal movement directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// All directions in the order neighbours are expanded.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Row and column delta of a single step in this direction.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Direction::North => (-1, 0),
            Direction::East => (0, 1),
            Direction::South => (1, 0),
            Direction::West => (0, -1),
        }
    }
}

/// Location of a single grid cell expressed as row and column coordinates.
///
/// Ordering is row-major, so sparse stores iterate top to bottom.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    row: i32,
    column: i32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(row: i32, column: i32) -> Self {
        Self { row, column }
    }

    /// Row index of the cell.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Column index of the cell.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Returns the cell shifted by the provided row and column deltas.
    #[must_use]
    pub const fn offset(self, rows: i32, columns: i32) -> Self {
        Self::new(self.row + rows, self.column + columns)
    }

    /// Returns the neighbouring cell in the provided direction.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        let (rows, columns) = direction.offset();
        self.offset(rows, columns)
    }

    /// Returns the four cardinal neighbours in [`Direction::ALL`] order.
    #[must_use]
    pub fn neighbors(self) -> [CellCoord; 4] {
        Direction::ALL.map(|direction| self.step(direction))
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.row.abs_diff(other.row) + self.column.abs_diff(other.column)
    }

    /// Direction of the single step from `self` to an adjacent `other`.
    #[must_use]
    pub fn direction_to(self, other: CellCoord) -> Option<Direction> {
        Direction::ALL
            .into_iter()
            .find(|direction| self.step(*direction) == other)
    }
}

/// Axis-aligned rectangle expressed in cell coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRect {
    origin: CellCoord,
    rows: u32,
    columns: u32,
}

impl CellRect {
    /// Constructs a rectangle from an origin cell and a size in cells.
    #[must_use]
    pub const fn new(origin: CellCoord, rows: u32, columns: u32) -> Self {
        Self {
            origin,
            rows,
            columns,
        }
    }

    /// Upper-left cell that anchors the rectangle.
    #[must_use]
    pub const fn origin(&self) -> CellCoord {
        self.origin
    }

    /// Reports whether the cell lies inside the rectangle.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        let row = i64::from(cell.row()) - i64::from(self.origin.row());
        let column = i64::from(cell.column()) - i64::from(self.origin.column());
        (0..i64::from(self.rows)).contains(&row) && (0..i64::from(self.columns)).contains(&column)
    }
}

/// Rectangular room produced by partitioning a building.
///
/// `height` and `width` are the indices of the far walls, so the room's
/// perimeter spans `height + 1` rows and `width + 1` columns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Room {
    /// Local cell of the room's upper-left wall corner.
    pub origin: CellCoord,
    /// Row offset of the bottom wall from `origin`.
    pub height: i32,
    /// Column offset of the right wall from `origin`.
    pub width: i32,
}

impl Room {
    /// Cells on the room's perimeter, corners included.
    #[must_use]
    pub fn perimeter(&self) -> Vec<CellCoord> {
        let mut cells = Vec::new();
        for column in 0..=self.width {
            cells.push(self.origin.offset(0, column));
            cells.push(self.origin.offset(self.height, column));
        }
        for row in 1..self.height {
            cells.push(self.origin.offset(row, 0));
            cells.push(self.origin.offset(row, self.width));
        }
        cells
    }

    /// Reports whether the cell lies strictly inside the room's walls.
    #[must_use]
    pub fn interior_contains(&self, cell: CellCoord) -> bool {
        let row = cell.row() - self.origin.row();
        let column = cell.column() - self.origin.column();
        row > 0 && row < self.height && column > 0 && column < self.width
    }
}

/// Door requested by a building layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DoorSpec {
    /// Whether the door starts locked.
    pub locked: bool,
}

/// Building produced by the generator, expressed in local coordinates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildingLayout {
    /// House number painted on the sign.
    pub number: u32,
    /// Row index of the bottom outer wall.
    pub height: i32,
    /// Column index of the right outer wall.
    pub width: i32,
    /// Rooms that partition the interior.
    pub rooms: Vec<Room>,
    /// Wall cells, including cells that doors later replace.
    pub walls: BTreeSet<CellCoord>,
    /// Door cells and their initial lock state.
    pub doors: BTreeMap<CellCoord, DoorSpec>,
    /// Cells that receive floor decoration.
    pub floors: BTreeSet<CellCoord>,
    /// Door cell on the bottom outer wall.
    pub front_door: CellCoord,
    /// Wall cell that carries the house number.
    pub sign: CellCoord,
}

/// Unique identifier assigned to an actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(u32);

impl ActorId {
    /// Creates a new actor identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Role an actor plays in the town.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorKind {
    /// The detective controlled by the user.
    Player,
    /// Resident of one of the houses.
    Villager,
    /// Officer posted at the crime scene.
    Police,
}

/// Fallback behaviour an actor follows whenever its route is empty.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Behaviour {
    /// Random walk, one cell or none per turn.
    Wander,
    /// Lingers inside a neighbour's house.
    Visiting {
        /// House number being visited.
        house: u32,
    },
    /// Never moves.
    Dead,
}

/// In-game time of day.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClockTime {
    hour: u8,
    minute: u8,
}

impl ClockTime {
    /// Creates a clock reading, wrapping out-of-range components.
    #[must_use]
    pub const fn new(hour: u8, minute: u8) -> Self {
        Self {
            hour: (hour as u16 + minute as u16 / 60) as u8 % 24,
            minute: minute % 60,
        }
    }

    /// Hour of day in `0..24`.
    #[must_use]
    pub const fn hour(&self) -> u8 {
        self.hour
    }

    /// Minute of the hour in `0..60`.
    #[must_use]
    pub const fn minute(&self) -> u8 {
        self.minute
    }

    /// Returns the reading `minutes` later, wrapping at midnight.
    #[must_use]
    pub fn plus_minutes(self, minutes: u32) -> Self {
        let total = (u32::from(self.hour) * 60 + u32::from(self.minute) + minutes) % (24 * 60);
        Self {
            hour: (total / 60) as u8,
            minute: (total % 60) as u8,
        }
    }
}

impl std::fmt::Display for ClockTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Per-cell visibility flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Tile {
    /// Cell is in view this turn.
    pub visible: bool,
    /// Cell has been in view at least once.
    pub seen: bool,
}

/// Read-only snapshot describing an actor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActorSnapshot {
    /// Identifier assigned to the actor.
    pub id: ActorId,
    /// Role of the actor.
    pub kind: ActorKind,
    /// Cell currently occupied by the actor.
    pub cell: CellCoord,
    /// Whether the actor is alive.
    pub alive: bool,
    /// Whether the actor committed the murder.
    pub killer: bool,
    /// House number the actor lives in, if any.
    pub home: Option<u32>,
    /// Fallback behaviour used when the route is empty.
    pub behaviour: Behaviour,
    /// Next cell of the actor's route, if any.
    pub next_step: Option<CellCoord>,
    /// Number of cells left on the route.
    pub remaining_path: usize,
}

/// Read-only view of every actor in spawn order.
#[derive(Clone, Debug, Default)]
pub struct ActorView {
    snapshots: Vec<ActorSnapshot>,
}

impl ActorView {
    /// Creates a new view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(snapshots: Vec<ActorSnapshot>) -> Self {
        Self { snapshots }
    }

    /// Iterates over the captured actor snapshots.
    pub fn iter(&self) -> impl Iterator<Item = &ActorSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot of a single actor.
    #[must_use]
    pub fn get(&self, actor: ActorId) -> Option<&ActorSnapshot> {
        self.snapshots.iter().find(|snapshot| snapshot.id == actor)
    }

    /// Snapshot of the player, if one has spawned.
    #[must_use]
    pub fn player(&self) -> Option<&ActorSnapshot> {
        self.snapshots
            .iter()
            .find(|snapshot| snapshot.kind == ActorKind::Player)
    }
}

/// Ordered route consumed front to back.
pub type Route = VecDeque<CellCoord>;
