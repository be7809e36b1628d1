#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Murder Town.
//!
//! Static map features live in sparse ordered maps keyed by [`CellCoord`]; the
//! only dense structure is the per-cell visibility grid. Every mutation goes
//! through [`apply`], and read access goes through the [`query`] module.

mod actors;
mod buildings;
mod clock;
mod doors;
mod tiles;

use std::collections::{BTreeMap, BTreeSet};

use murder_town_core::{
    config::Config, ActorId, ActorKind, CellCoord, CellRect, ClockTime, Command, Decoration,
    Direction, Event, Obstruction, Rejection,
};
use tracing::{debug, trace};

use actors::Actor;
use clock::Clock;
use tiles::TileGrid;

pub use buildings::Building;
pub use doors::Door;

/// Settings fixed for the lifetime of a world.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorldSettings {
    /// Number of rows on the map.
    pub rows: u32,
    /// Number of columns on the map.
    pub columns: u32,
    /// Door updates an opened door stays open for.
    pub door_close_after: u32,
    /// Whether non-player actors block each other.
    pub npc_collisions: bool,
    /// Turns spent on each in-game minute after the first.
    pub turns_per_minute: u32,
    /// Clock reading at creation.
    pub start: ClockTime,
}

impl WorldSettings {
    /// Extracts the world-level settings from a full configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            rows: config.map.rows,
            columns: config.map.columns,
            door_close_after: config.doors.close_after,
            npc_collisions: config.simulation.npc_collisions,
            turns_per_minute: config.simulation.turns_per_minute,
            start: ClockTime::new(
                config.simulation.start_hour,
                config.simulation.start_minute,
            ),
        }
    }
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Wall segment, optionally carrying a house number sign.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Wall {
    sign: Option<u32>,
}

impl Wall {
    /// House number shown on this wall cell, if it is a sign.
    #[must_use]
    pub const fn sign(&self) -> Option<u32> {
        self.sign
    }
}

/// Which cardinal neighbours of a wall are themselves walls or doors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WallLinks {
    /// Neighbour above is part of a wall.
    pub north: bool,
    /// Neighbour to the right is part of a wall.
    pub east: bool,
    /// Neighbour below is part of a wall.
    pub south: bool,
    /// Neighbour to the left is part of a wall.
    pub west: bool,
}

/// Represents the authoritative Murder Town world state.
#[derive(Debug)]
pub struct World {
    bounds: CellRect,
    walls: BTreeMap<CellCoord, Wall>,
    fences: BTreeSet<CellCoord>,
    doors: BTreeMap<CellCoord, Door>,
    decorations: BTreeMap<CellCoord, Decoration>,
    buildings: BTreeMap<u32, Building>,
    tiles: TileGrid,
    actors: Vec<Actor>,
    next_actor: u32,
    clock: Clock,
    door_close_after: u32,
    npc_collisions: bool,
}

impl World {
    /// Creates an empty world with the provided settings.
    #[must_use]
    pub fn new(settings: WorldSettings) -> Self {
        Self {
            bounds: CellRect::new(CellCoord::new(0, 0), settings.rows, settings.columns),
            walls: BTreeMap::new(),
            fences: BTreeSet::new(),
            doors: BTreeMap::new(),
            decorations: BTreeMap::new(),
            buildings: BTreeMap::new(),
            tiles: TileGrid::new(settings.rows, settings.columns),
            actors: Vec::new(),
            next_actor: 0,
            clock: Clock::new(settings.start, settings.turns_per_minute),
            door_close_after: settings.door_close_after,
            npc_collisions: settings.npc_collisions,
        }
    }

    fn obstruction_at(&self, cell: CellCoord) -> Option<Obstruction> {
        if self.walls.contains_key(&cell) {
            Some(Obstruction::Wall)
        } else if self.fences.contains(&cell) {
            Some(Obstruction::Fence)
        } else if self.doors.get(&cell).is_some_and(Door::is_closed) {
            Some(Obstruction::ClosedDoor)
        } else {
            None
        }
    }

    fn actor_index(&self, actor: ActorId) -> Option<usize> {
        self.actors.iter().position(|record| record.id == actor)
    }

    fn occupant(&self, cell: CellCoord) -> Option<&Actor> {
        self.actors.iter().find(|actor| actor.cell == cell)
    }

    /// Reason the actor at `index` may not enter `cell`, if any.
    fn entry_rejection(&self, index: usize, cell: CellCoord) -> Option<Rejection> {
        if !self.bounds.contains(cell) {
            return Some(Rejection::OutOfBounds);
        }
        if let Some(obstruction) = self.obstruction_at(cell) {
            return Some(Rejection::Obstructed(obstruction));
        }
        let mover = &self.actors[index];
        let blocking = self.actors.iter().find(|other| {
            other.id != mover.id
                && other.cell == cell
                && (other.kind == ActorKind::Player
                    || mover.kind == ActorKind::Player
                    || self.npc_collisions)
        });
        blocking.map(|other| Rejection::Occupied(other.id))
    }

    fn move_actor(
        &mut self,
        index: usize,
        to: CellCoord,
        out_events: &mut Vec<Event>,
    ) -> CellCoord {
        let actor = &mut self.actors[index];
        let from = actor.cell;
        actor.cell = to;
        out_events.push(Event::ActorMoved {
            actor: actor.id,
            from,
            to,
        });
        from
    }

    fn spawn(
        &mut self,
        kind: ActorKind,
        cell: CellCoord,
        home: Option<u32>,
        out_events: &mut Vec<Event>,
    ) {
        let rejection = if !self.bounds.contains(cell) {
            Some(Rejection::OutOfBounds)
        } else if let Some(obstruction) = self.obstruction_at(cell) {
            Some(Rejection::Obstructed(obstruction))
        } else if let Some(other) = self.occupant(cell) {
            Some(Rejection::Occupied(other.id))
        } else if kind == ActorKind::Player
            && self.actors.iter().any(|actor| actor.kind == ActorKind::Player)
        {
            Some(Rejection::DuplicatePlayer)
        } else {
            None
        };

        if let Some(reason) = rejection {
            debug!(?kind, ?cell, ?reason, "spawn rejected");
            out_events.push(Event::SpawnRejected { kind, cell, reason });
            return;
        }

        let actor = ActorId::new(self.next_actor);
        self.next_actor += 1;
        self.actors.push(Actor::new(actor, kind, cell, home));
        out_events.push(Event::ActorSpawned { actor, kind, cell });
    }

    fn step(&mut self, index: usize, target: CellCoord, out_events: &mut Vec<Event>) {
        let actor = self.actors[index].id;
        if !self.actors[index].alive {
            out_events.push(Event::StepBlocked {
                actor,
                cell: target,
                reason: Rejection::NotPermitted,
            });
            return;
        }
        match self.entry_rejection(index, target) {
            Some(reason) => out_events.push(Event::StepBlocked {
                actor,
                cell: target,
                reason,
            }),
            None => {
                let _ = self.move_actor(index, target, out_events);
            }
        }
    }

    fn advance_along_path(&mut self, index: usize, out_events: &mut Vec<Event>) {
        let actor = &self.actors[index];
        let Some(next) = actor.next_step() else {
            return;
        };
        let id = actor.id;
        if !actor.alive {
            return;
        }
        if actor.cell.manhattan_distance(next) != 1 {
            self.actors[index].clear_path();
            out_events.push(Event::PathAbandoned { actor: id });
            return;
        }
        if let Some(reason) = self.entry_rejection(index, next) {
            trace!(actor = id.get(), ?next, ?reason, "waiting on route");
            out_events.push(Event::StepBlocked {
                actor: id,
                cell: next,
                reason,
            });
            return;
        }
        let actor = &mut self.actors[index];
        let from = actor.cell;
        let _ = actor.advance();
        out_events.push(Event::ActorMoved {
            actor: id,
            from,
            to: next,
        });
    }

    fn jump_fence(&mut self, index: usize, direction: Direction, out_events: &mut Vec<Event>) {
        let actor = &self.actors[index];
        let id = actor.id;
        let fence = actor.cell.step(direction);
        let landing = fence.step(direction);
        let rejection = if actor.kind != ActorKind::Player || !actor.alive {
            Some(Rejection::NotPermitted)
        } else if !self.fences.contains(&fence) {
            Some(Rejection::NotPermitted)
        } else {
            self.entry_rejection(index, landing)
        };

        match rejection {
            Some(reason) => out_events.push(Event::StepBlocked {
                actor: id,
                cell: landing,
                reason,
            }),
            None => {
                let _ = self.move_actor(index, landing, out_events);
            }
        }
    }

    fn open_door(&mut self, cell: CellCoord, bypass_lock: bool, out_events: &mut Vec<Event>) {
        let close_after = self.door_close_after;
        let Some(door) = self.doors.get_mut(&cell) else {
            out_events.push(Event::DoorMissing { cell });
            return;
        };
        if !door.is_closed() {
            return;
        }
        if door.is_locked() && !bypass_lock {
            out_events.push(Event::DoorLocked { cell });
            return;
        }
        door.open(close_after);
        out_events.push(Event::DoorOpened { cell });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::PlaceBuilding { origin, layout } => {
            let house = layout.number;
            let front_door = buildings::stamp(world, origin, layout);
            debug!(house, ?origin, ?front_door, "building placed");
            out_events.push(Event::BuildingPlaced {
                house,
                origin,
                front_door,
            });
        }
        Command::PlaceFence { cell } => {
            let obstruction = if world.walls.contains_key(&cell) {
                Some(Obstruction::Wall)
            } else if world.doors.contains_key(&cell) {
                Some(Obstruction::ClosedDoor)
            } else {
                None
            };
            match obstruction {
                Some(obstruction) => out_events.push(Event::PlacementRejected {
                    cell,
                    reason: Rejection::Obstructed(obstruction),
                }),
                None => {
                    let _ = world.fences.insert(cell);
                }
            }
        }
        Command::PlaceDecoration { cell, decoration } => {
            let _ = world.decorations.insert(cell, decoration);
        }
        Command::SpawnActor { kind, cell, home } => world.spawn(kind, cell, home, out_events),
        Command::KillActor { actor } => {
            if let Some(index) = world.actor_index(actor) {
                let record = &mut world.actors[index];
                if record.alive {
                    record.kill();
                    out_events.push(Event::ActorDied { actor });
                }
            }
        }
        Command::MarkKiller { actor } => {
            if let Some(index) = world.actor_index(actor) {
                world.actors[index].killer = true;
            }
        }
        Command::SetBehaviour { actor, behaviour } => {
            if let Some(index) = world.actor_index(actor) {
                let record = &mut world.actors[index];
                if record.alive {
                    record.behaviour = behaviour;
                }
            }
        }
        Command::SetActorPath { actor, path } => {
            if let Some(index) = world.actor_index(actor) {
                let length = world.actors[index].assign_path(path);
                out_events.push(Event::PathAssigned { actor, length });
            }
        }
        Command::AdvanceAlongPath { actor } => {
            if let Some(index) = world.actor_index(actor) {
                world.advance_along_path(index, out_events);
            }
        }
        Command::StepActor { actor, direction } => {
            if let Some(index) = world.actor_index(actor) {
                let target = world.actors[index].cell.step(direction);
                world.step(index, target, out_events);
            }
        }
        Command::JumpFence { actor, direction } => {
            if let Some(index) = world.actor_index(actor) {
                world.jump_fence(index, direction, out_events);
            }
        }
        Command::OpenDoor { cell, bypass_lock } => world.open_door(cell, bypass_lock, out_events),
        Command::CloseDoor { cell } => match world.doors.get_mut(&cell) {
            Some(door) if !door.is_closed() => {
                door.close();
                out_events.push(Event::DoorClosed { cell });
            }
            Some(_) => {}
            None => out_events.push(Event::DoorMissing { cell }),
        },
        Command::UnlockDoor { cell } => match world.doors.get_mut(&cell) {
            Some(door) if door.is_locked() => {
                door.unlock();
                out_events.push(Event::DoorUnlocked { cell });
            }
            Some(_) => {}
            None => out_events.push(Event::DoorMissing { cell }),
        },
        Command::Tick => {
            if world.clock.advance() {
                out_events.push(Event::TimeAdvanced {
                    time: world.clock.time(),
                });
            }
        }
        Command::TickDoors => {
            for (&cell, door) in world.doors.iter_mut() {
                if door.tick() {
                    out_events.push(Event::DoorClosed { cell });
                }
            }
        }
        Command::UpdateVisibility { visible } => {
            world.tiles.show_only(&visible);
            out_events.push(Event::VisibilityUpdated {
                visible: world.tiles.visible_count(),
            });
        }
        Command::RevealAll => {
            world.tiles.reveal_all();
            out_events.push(Event::VisibilityUpdated {
                visible: world.tiles.visible_count(),
            });
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use murder_town_core::{
        ActorId, ActorSnapshot, ActorView, CellCoord, CellRect, ClockTime, Decoration, Direction,
        Obstruction, Tile,
    };

    use super::{Building, Door, Wall, WallLinks, World};

    /// Rectangle covering every cell of the map.
    #[must_use]
    pub fn bounds(world: &World) -> CellRect {
        world.bounds
    }

    /// Static feature that blocks movement through the cell, if any.
    #[must_use]
    pub fn obstruction_at(world: &World, cell: CellCoord) -> Option<Obstruction> {
        world.obstruction_at(cell)
    }

    /// Whether the pathfinder must route around the cell.
    ///
    /// Doors never block routes, closed or not; actors open them on arrival.
    #[must_use]
    pub fn blocks_routes(world: &World, cell: CellCoord) -> bool {
        !world.bounds.contains(cell)
            || world.walls.contains_key(&cell)
            || world.fences.contains(&cell)
    }

    /// Whether the cell stops line of sight.
    #[must_use]
    pub fn is_opaque(world: &World, cell: CellCoord) -> bool {
        world.walls.contains_key(&cell) || world.doors.get(&cell).is_some_and(Door::is_closed)
    }

    /// Wall stored at the cell, if any.
    #[must_use]
    pub fn wall_at(world: &World, cell: CellCoord) -> Option<&Wall> {
        world.walls.get(&cell)
    }

    /// Whether a fence stands at the cell.
    #[must_use]
    pub fn fence_at(world: &World, cell: CellCoord) -> bool {
        world.fences.contains(&cell)
    }

    /// Door stored at the cell, if any.
    #[must_use]
    pub fn door_at(world: &World, cell: CellCoord) -> Option<&Door> {
        world.doors.get(&cell)
    }

    /// Ground cover recorded for the cell, if any.
    #[must_use]
    pub fn decoration_at(world: &World, cell: CellCoord) -> Option<Decoration> {
        world.decorations.get(&cell).copied()
    }

    /// Visibility flags for the cell, or `None` outside the map.
    #[must_use]
    pub fn tile_at(world: &World, cell: CellCoord) -> Option<Tile> {
        world.tiles.get(cell)
    }

    /// Number of tiles currently in view.
    #[must_use]
    pub fn visible_count(world: &World) -> usize {
        world.tiles.visible_count()
    }

    /// Number of tiles seen at least once.
    #[must_use]
    pub fn seen_count(world: &World) -> usize {
        world.tiles.seen_count()
    }

    /// Wall neighbours of a wall cell, used to pick junction glyphs.
    #[must_use]
    pub fn wall_links(world: &World, cell: CellCoord) -> Option<WallLinks> {
        if !world.walls.contains_key(&cell) {
            return None;
        }
        let linked = |direction: Direction| {
            let neighbour = cell.step(direction);
            world.walls.contains_key(&neighbour) || world.doors.contains_key(&neighbour)
        };
        Some(WallLinks {
            north: linked(Direction::North),
            east: linked(Direction::East),
            south: linked(Direction::South),
            west: linked(Direction::West),
        })
    }

    /// Iterates over every wall in row-major order.
    pub fn walls(world: &World) -> impl Iterator<Item = (CellCoord, &Wall)> {
        world.walls.iter().map(|(cell, wall)| (*cell, wall))
    }

    /// Iterates over every fence in row-major order.
    pub fn fences(world: &World) -> impl Iterator<Item = CellCoord> + '_ {
        world.fences.iter().copied()
    }

    /// Iterates over every door in row-major order.
    pub fn doors(world: &World) -> impl Iterator<Item = (CellCoord, &Door)> {
        world.doors.iter().map(|(cell, door)| (*cell, door))
    }

    /// Building carrying the provided house number.
    #[must_use]
    pub fn building(world: &World, house: u32) -> Option<&Building> {
        world.buildings.get(&house)
    }

    /// Iterates over placed buildings ordered by house number.
    pub fn buildings(world: &World) -> impl Iterator<Item = &Building> {
        world.buildings.values()
    }

    /// Captures a read-only view of every actor.
    #[must_use]
    pub fn actor_view(world: &World) -> ActorView {
        ActorView::from_snapshots(world.actors.iter().map(|actor| actor.snapshot()).collect())
    }

    /// Snapshot of a single actor.
    #[must_use]
    pub fn actor(world: &World, actor: ActorId) -> Option<ActorSnapshot> {
        world
            .actors
            .iter()
            .find(|record| record.id == actor)
            .map(|record| record.snapshot())
    }

    /// Actor standing in the cell, if any.
    #[must_use]
    pub fn occupant(world: &World, cell: CellCoord) -> Option<ActorSnapshot> {
        world.occupant(cell).map(|actor| actor.snapshot())
    }

    /// Whether non-player actors block each other.
    #[must_use]
    pub fn npc_collisions(world: &World) -> bool {
        world.npc_collisions
    }

    /// Current in-game time.
    #[must_use]
    pub fn clock(world: &World) -> ClockTime {
        world.clock.time()
    }
}
