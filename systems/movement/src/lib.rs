#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Movement system that consumes routes, drives idle behaviours, and turns
//! player actions into world commands.
//!
//! Every decision is made against an immutable world snapshot; the world
//! re-validates each emitted step when the command is applied.

use murder_town_core::{
    ActorKind, ActorSnapshot, Behaviour, CellCoord, Command, Direction, Rejection,
};
use murder_town_system_pathfinding::Pathfinder;
use murder_town_world::{query, World};
use rand::Rng;
use tracing::debug;

/// One in this many visiting turns picks a new spot inside the house.
const VISIT_WANDER_ODDS: u32 = 26;

/// Action chosen by the player for the current turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerAction {
    /// Skip the turn.
    Wait,
    /// Step in a direction, jumping a fence when one is in the way.
    Move(Direction),
    /// Open or close the adjacent door.
    ToggleDoor(Direction),
    /// Try to break the adjacent door open.
    KickDoor(Direction),
}

/// Pure system that emits movement commands for actors.
#[derive(Clone, Debug)]
pub struct Movement {
    kick_success_percent: u32,
}

impl Movement {
    /// Creates a movement system with the provided chance of a successful kick.
    #[must_use]
    pub const fn new(kick_success_percent: u32) -> Self {
        Self {
            kick_success_percent,
        }
    }

    /// Emits this turn's commands for a non-player actor.
    ///
    /// A pending route always wins over the idle behaviour: the actor advances
    /// one step, opens a closed door in its way, or waits for the cell to clear.
    pub fn handle_npc<R>(
        &self,
        world: &World,
        actor: &ActorSnapshot,
        pathfinder: &mut Pathfinder,
        rng: &mut R,
        out: &mut Vec<Command>,
    ) where
        R: Rng + ?Sized,
    {
        if !actor.alive {
            return;
        }

        if let Some(next) = actor.next_step {
            self.follow_route(world, actor, next, out);
            return;
        }

        match actor.behaviour {
            Behaviour::Dead => {}
            Behaviour::Wander => {
                if let Some(direction) = random_direction(rng) {
                    step_if_clear(world, actor, direction, out);
                }
            }
            Behaviour::Visiting { house } => {
                self.linger(world, actor, house, pathfinder, rng, out);
            }
        }
    }

    /// Emits the commands for the player's chosen action.
    ///
    /// Returns `false` when the action cannot be taken and the turn should not
    /// advance.
    pub fn handle_player<R>(
        &self,
        world: &World,
        action: PlayerAction,
        rng: &mut R,
        out: &mut Vec<Command>,
    ) -> bool
    where
        R: Rng + ?Sized,
    {
        let Some(player) = query::actor_view(world).player().cloned() else {
            return false;
        };

        match action {
            PlayerAction::Wait => true,
            PlayerAction::Move(direction) => {
                let target = player.cell.step(direction);
                if entry_rejection(world, &player, target).is_none() {
                    out.push(Command::StepActor {
                        actor: player.id,
                        direction,
                    });
                    return true;
                }
                let landing = target.step(direction);
                if query::fence_at(world, target)
                    && entry_rejection(world, &player, landing).is_none()
                {
                    out.push(Command::JumpFence {
                        actor: player.id,
                        direction,
                    });
                    return true;
                }
                false
            }
            PlayerAction::ToggleDoor(direction) => {
                let cell = player.cell.step(direction);
                let Some(door) = query::door_at(world, cell) else {
                    return false;
                };
                if door.is_closed() {
                    out.push(Command::OpenDoor {
                        cell,
                        bypass_lock: direction == Direction::South,
                    });
                } else {
                    out.push(Command::CloseDoor { cell });
                }
                true
            }
            PlayerAction::KickDoor(direction) => {
                let cell = player.cell.step(direction);
                let Some(door) = query::door_at(world, cell) else {
                    return false;
                };
                if door.is_closed() && rng.gen_range(0..100) < self.kick_success_percent {
                    debug!(?cell, "door kicked open");
                    out.push(Command::UnlockDoor { cell });
                    out.push(Command::OpenDoor {
                        cell,
                        bypass_lock: false,
                    });
                }
                true
            }
        }
    }

    fn follow_route(
        &self,
        world: &World,
        actor: &ActorSnapshot,
        next: CellCoord,
        out: &mut Vec<Command>,
    ) {
        if query::door_at(world, next).is_some_and(|door| door.is_closed()) {
            out.push(Command::UnlockDoor { cell: next });
            out.push(Command::OpenDoor {
                cell: next,
                bypass_lock: false,
            });
            return;
        }
        if matches!(
            entry_rejection(world, actor, next),
            Some(Rejection::Occupied(_))
        ) {
            return;
        }
        out.push(Command::AdvanceAlongPath { actor: actor.id });
    }

    /// Wanders inside the visited house without leaving through its front door.
    fn linger<R>(
        &self,
        world: &World,
        actor: &ActorSnapshot,
        house: u32,
        pathfinder: &mut Pathfinder,
        rng: &mut R,
        out: &mut Vec<Command>,
    ) where
        R: Rng + ?Sized,
    {
        let Some(building) = query::building(world, house) else {
            return;
        };

        if rng.gen_range(0..VISIT_WANDER_ODDS) == 0 && !building.rooms().is_empty() {
            let room = building.rooms()[rng.gen_range(0..building.rooms().len())];
            let local = room.origin.offset(
                rng.gen_range(1..room.height.max(2)),
                rng.gen_range(1..room.width.max(2)),
            );
            let goal = building.absolute(local);
            match pathfinder.route(world, actor.cell, goal) {
                Ok(path) if !path.is_empty() => out.push(Command::SetActorPath {
                    actor: actor.id,
                    path,
                }),
                Ok(_) => {}
                Err(error) => debug!(actor = actor.id.get(), ?goal, %error, "no route to room"),
            }
            return;
        }

        let front_door = building.front_door();
        let direction = loop {
            let direction = random_direction(rng);
            if direction == Some(Direction::South)
                && actor.cell.step(Direction::South) == front_door
            {
                continue;
            }
            break direction;
        };
        if let Some(direction) = direction {
            step_if_clear(world, actor, direction, out);
        }
    }
}

impl Default for Movement {
    fn default() -> Self {
        Self::new(19)
    }
}

/// Picks one of the four directions or, one time in five, staying put.
fn random_direction<R: Rng + ?Sized>(rng: &mut R) -> Option<Direction> {
    Direction::ALL.get(rng.gen_range(0..5)).copied()
}

fn step_if_clear(
    world: &World,
    actor: &ActorSnapshot,
    direction: Direction,
    out: &mut Vec<Command>,
) {
    if entry_rejection(world, actor, actor.cell.step(direction)).is_none() {
        out.push(Command::StepActor {
            actor: actor.id,
            direction,
        });
    }
}

/// Mirrors the world's entry rules so systems only emit steps that will succeed.
fn entry_rejection(world: &World, mover: &ActorSnapshot, cell: CellCoord) -> Option<Rejection> {
    if !query::bounds(world).contains(cell) {
        return Some(Rejection::OutOfBounds);
    }
    if let Some(obstruction) = query::obstruction_at(world, cell) {
        return Some(Rejection::Obstructed(obstruction));
    }
    let occupant = query::occupant(world, cell)?;
    if occupant.id == mover.id {
        return None;
    }
    let blocks = occupant.kind == ActorKind::Player
        || mover.kind == ActorKind::Player
        || query::npc_collisions(world);
    blocks.then_some(Rejection::Occupied(occupant.id))
}
