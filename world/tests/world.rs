use std::collections::{BTreeMap, BTreeSet};

use murder_town_core::{
    ActorId, ActorKind, BuildingLayout, CellCoord, ClockTime, Command, Direction, DoorSpec,
    Event, Obstruction, Rejection, Room,
};
use murder_town_world::{self as world, query, World, WorldSettings};

fn settings() -> WorldSettings {
    WorldSettings {
        rows: 20,
        columns: 20,
        door_close_after: 10,
        npc_collisions: false,
        turns_per_minute: 3,
        start: ClockTime::new(7, 59),
    }
}

/// Single 6x6 room at `(2, 2)` with a door on its bottom wall at `(8, 5)`.
fn world_with_house(locked: bool) -> World {
    let room = Room {
        origin: CellCoord::new(0, 0),
        height: 6,
        width: 6,
    };
    let front_door = CellCoord::new(6, 3);
    let mut doors = BTreeMap::new();
    let _ = doors.insert(front_door, DoorSpec { locked });
    let layout = BuildingLayout {
        number: 4,
        height: 6,
        width: 6,
        rooms: vec![room],
        walls: room.perimeter().into_iter().collect(),
        doors,
        floors: BTreeSet::new(),
        front_door,
        sign: CellCoord::new(6, 2),
    };
    let mut world = World::new(settings());
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::PlaceBuilding {
            origin: CellCoord::new(2, 2),
            layout,
        },
        &mut events,
    );
    assert_eq!(
        events,
        vec![Event::BuildingPlaced {
            house: 4,
            origin: CellCoord::new(2, 2),
            front_door: CellCoord::new(8, 5),
        }]
    );
    world
}

fn spawn(world: &mut World, kind: ActorKind, cell: CellCoord) -> ActorId {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::SpawnActor {
            kind,
            cell,
            home: None,
        },
        &mut events,
    );
    match events.as_slice() {
        [Event::ActorSpawned { actor, .. }] => *actor,
        other => panic!("unexpected spawn events: {other:?}"),
    }
}

#[test]
fn open_door_closes_after_exactly_its_timer() {
    let mut world = world_with_house(false);
    let door = CellCoord::new(8, 5);
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::OpenDoor {
            cell: door,
            bypass_lock: false,
        },
        &mut events,
    );
    assert_eq!(events, vec![Event::DoorOpened { cell: door }]);

    let timer = query::door_at(&world, door).expect("door").timer();
    assert!(timer > 0);
    for _ in 1..timer {
        events.clear();
        world::apply(&mut world, Command::TickDoors, &mut events);
        assert!(events.is_empty());
        assert!(!query::door_at(&world, door).expect("door").is_closed());
    }
    events.clear();
    world::apply(&mut world, Command::TickDoors, &mut events);
    assert_eq!(events, vec![Event::DoorClosed { cell: door }]);
    assert_eq!(query::obstruction_at(&world, door), Some(Obstruction::ClosedDoor));
}

#[test]
fn locked_door_refuses_unless_bypassed() {
    let mut world = world_with_house(true);
    let door = CellCoord::new(8, 5);
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::OpenDoor {
            cell: door,
            bypass_lock: false,
        },
        &mut events,
    );
    assert_eq!(events, vec![Event::DoorLocked { cell: door }]);

    events.clear();
    world::apply(
        &mut world,
        Command::OpenDoor {
            cell: door,
            bypass_lock: true,
        },
        &mut events,
    );
    assert_eq!(events, vec![Event::DoorOpened { cell: door }]);
    assert!(query::door_at(&world, door).expect("door").is_locked());
}

#[test]
fn fences_cannot_replace_walls_or_doors() {
    let mut world = world_with_house(false);
    let mut events = Vec::new();
    for cell in [CellCoord::new(2, 2), CellCoord::new(8, 5)] {
        world::apply(&mut world, Command::PlaceFence { cell }, &mut events);
    }
    assert_eq!(events.len(), 2);
    assert!(events
        .iter()
        .all(|event| matches!(event, Event::PlacementRejected { .. })));
    assert_eq!(query::fences(&world).count(), 0);
}

#[test]
fn route_waits_on_closed_door_then_walks_through() {
    let mut world = world_with_house(false);
    let villager = spawn(&mut world, ActorKind::Villager, CellCoord::new(9, 5));
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SetActorPath {
            actor: villager,
            path: vec![CellCoord::new(8, 5), CellCoord::new(7, 5)],
        },
        &mut events,
    );

    events.clear();
    world::apply(&mut world, Command::AdvanceAlongPath { actor: villager }, &mut events);
    assert_eq!(
        events,
        vec![Event::StepBlocked {
            actor: villager,
            cell: CellCoord::new(8, 5),
            reason: Rejection::Obstructed(Obstruction::ClosedDoor),
        }]
    );

    world::apply(
        &mut world,
        Command::OpenDoor {
            cell: CellCoord::new(8, 5),
            bypass_lock: true,
        },
        &mut events,
    );
    for _ in 0..2 {
        world::apply(&mut world, Command::AdvanceAlongPath { actor: villager }, &mut events);
    }
    let snapshot = query::actor(&world, villager).expect("villager");
    assert_eq!(snapshot.cell, CellCoord::new(7, 5));
    assert_eq!(snapshot.remaining_path, 0);
}

#[test]
fn npcs_pass_through_each_other_but_not_the_player() {
    let mut world = World::new(settings());
    let first = spawn(&mut world, ActorKind::Villager, CellCoord::new(10, 10));
    let _second = spawn(&mut world, ActorKind::Villager, CellCoord::new(10, 11));
    let player = spawn(&mut world, ActorKind::Player, CellCoord::new(10, 9));

    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::StepActor {
            actor: first,
            direction: Direction::East,
        },
        &mut events,
    );
    assert!(matches!(events.as_slice(), [Event::ActorMoved { .. }]));

    events.clear();
    world::apply(
        &mut world,
        Command::StepActor {
            actor: first,
            direction: Direction::West,
        },
        &mut events,
    );
    world::apply(
        &mut world,
        Command::StepActor {
            actor: first,
            direction: Direction::West,
        },
        &mut events,
    );
    assert_eq!(
        events.last(),
        Some(&Event::StepBlocked {
            actor: first,
            cell: CellCoord::new(10, 9),
            reason: Rejection::Occupied(player),
        })
    );
}

#[test]
fn second_player_is_rejected() {
    let mut world = World::new(settings());
    let _ = spawn(&mut world, ActorKind::Player, CellCoord::new(1, 1));
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SpawnActor {
            kind: ActorKind::Player,
            cell: CellCoord::new(1, 2),
            home: None,
        },
        &mut events,
    );
    assert!(matches!(
        events.as_slice(),
        [Event::SpawnRejected {
            reason: Rejection::DuplicatePlayer,
            ..
        }]
    ));
}

#[test]
fn player_jumps_fences_but_villagers_do_not() {
    let mut world = World::new(settings());
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::PlaceFence {
            cell: CellCoord::new(5, 6),
        },
        &mut events,
    );
    let player = spawn(&mut world, ActorKind::Player, CellCoord::new(5, 5));
    let villager = spawn(&mut world, ActorKind::Villager, CellCoord::new(4, 5));

    events.clear();
    world::apply(
        &mut world,
        Command::JumpFence {
            actor: villager,
            direction: Direction::South,
        },
        &mut events,
    );
    world::apply(
        &mut world,
        Command::JumpFence {
            actor: player,
            direction: Direction::East,
        },
        &mut events,
    );
    assert!(matches!(
        events[0],
        Event::StepBlocked {
            reason: Rejection::NotPermitted,
            ..
        }
    ));
    assert_eq!(
        events[1],
        Event::ActorMoved {
            actor: player,
            from: CellCoord::new(5, 5),
            to: CellCoord::new(5, 7),
        }
    );
}

#[test]
fn clock_rolls_minutes_every_fourth_tick() {
    let mut world = World::new(settings());
    let mut events = Vec::new();
    for _ in 0..5 {
        world::apply(&mut world, Command::Tick, &mut events);
    }
    assert_eq!(
        events,
        vec![
            Event::TimeAdvanced {
                time: ClockTime::new(8, 0)
            },
            Event::TimeAdvanced {
                time: ClockTime::new(8, 1)
            },
        ]
    );
}

#[test]
fn visibility_updates_keep_seen_history() {
    let mut world = World::new(settings());
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::UpdateVisibility {
            visible: vec![CellCoord::new(0, 0), CellCoord::new(0, 1)],
        },
        &mut events,
    );
    world::apply(
        &mut world,
        Command::UpdateVisibility {
            visible: vec![CellCoord::new(3, 3)],
        },
        &mut events,
    );
    assert_eq!(query::visible_count(&world), 1);
    assert_eq!(query::seen_count(&world), 3);
    let old = query::tile_at(&world, CellCoord::new(0, 1)).expect("tile");
    assert!(old.seen && !old.visible);
}

#[test]
fn reveal_all_marks_every_tile() {
    let mut world = World::new(settings());
    assert_eq!(query::seen_count(&world), 0);
    let mut events = Vec::new();
    world::apply(&mut world, Command::RevealAll, &mut events);
    assert_eq!(query::visible_count(&world), 400);
    assert_eq!(query::seen_count(&world), 400);
}

#[test]
fn wall_links_report_junction_neighbours() {
    let world = world_with_house(false);
    let corner = query::wall_links(&world, CellCoord::new(2, 2)).expect("corner wall");
    assert!(corner.east && corner.south && !corner.north && !corner.west);
    let beside_door = query::wall_links(&world, CellCoord::new(8, 4)).expect("sign wall");
    assert!(beside_door.east && beside_door.west);
    assert_eq!(
        query::wall_at(&world, CellCoord::new(8, 4)).and_then(|wall| wall.sign()),
        Some(4)
    );
}
