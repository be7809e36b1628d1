use std::collections::{BTreeMap, BTreeSet};

use murder_town_core::{
    config::SimulationConfig, ActorId, ActorKind, Behaviour, BuildingLayout, CellCoord,
    ClockTime, Command, DoorSpec, Event, Room,
};
use murder_town_system_pathfinding::Pathfinder;
use murder_town_system_schedule::{PlanAction, PlanEntry, Schedule};
use murder_town_world::{self as world, query, World, WorldSettings};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const NINE: ClockTime = ClockTime::new(9, 0);

fn world_at_nine() -> World {
    let mut world = World::new(WorldSettings {
        rows: 30,
        columns: 30,
        door_close_after: 10,
        npc_collisions: false,
        turns_per_minute: 3,
        start: NINE,
    });
    let room = Room {
        origin: CellCoord::new(0, 0),
        height: 8,
        width: 14,
    };
    let mut doors = BTreeMap::new();
    let _ = doors.insert(CellCoord::new(8, 6), DoorSpec { locked: false });
    let layout = BuildingLayout {
        number: 3,
        height: 8,
        width: 14,
        rooms: vec![room],
        walls: room.perimeter().into_iter().collect::<BTreeSet<_>>(),
        doors,
        floors: BTreeSet::new(),
        front_door: CellCoord::new(8, 6),
        sign: CellCoord::new(8, 5),
    };
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::PlaceBuilding {
            origin: CellCoord::new(2, 2),
            layout,
        },
        &mut events,
    );
    world
}

fn spawn(world: &mut World, cell: CellCoord) -> ActorId {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::SpawnActor {
            kind: ActorKind::Villager,
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

fn visit(house: u32, reschedule_after: Option<u32>) -> PlanEntry {
    PlanEntry {
        action: PlanAction::VisitNeighbour { house },
        reschedule_after,
    }
}

#[test]
fn due_visit_routes_to_just_inside_the_front_door() {
    let mut world = world_at_nine();
    let villager = spawn(&mut world, CellCoord::new(20, 20));
    let mut schedule = Schedule::new();
    schedule.add(villager, NINE, visit(3, None));

    let snapshot = query::actor(&world, villager).expect("villager");
    let mut commands = Vec::new();
    schedule.handle(&world, &snapshot, &mut Pathfinder::default(), &mut commands);

    let mut events = Vec::new();
    for command in commands {
        world::apply(&mut world, command, &mut events);
    }
    let snapshot = query::actor(&world, villager).expect("villager");
    assert_eq!(snapshot.behaviour, Behaviour::Visiting { house: 3 });
    assert!(snapshot.remaining_path > 0);
    assert!(schedule.plan(villager).expect("plan").is_empty());
}

#[test]
fn unreachable_visit_is_postponed() {
    let mut world = world_at_nine();
    let villager = spawn(&mut world, CellCoord::new(20, 20));
    let mut events = Vec::new();
    for cell in CellCoord::new(20, 20).neighbors() {
        world::apply(&mut world, Command::PlaceFence { cell }, &mut events);
    }

    let mut schedule = Schedule::new();
    schedule.add(villager, NINE, visit(3, Some(15)));
    let snapshot = query::actor(&world, villager).expect("villager");
    let mut commands = Vec::new();
    schedule.handle(&world, &snapshot, &mut Pathfinder::default(), &mut commands);

    assert!(commands.is_empty());
    let plan = schedule.plan(villager).expect("plan");
    assert!(plan.entry(NINE).is_none());
    assert_eq!(plan.entry(ClockTime::new(9, 15)), Some(&visit(3, Some(15))));
}

#[test]
fn failed_visit_without_retry_stays_in_place() {
    let mut world = world_at_nine();
    let villager = spawn(&mut world, CellCoord::new(20, 20));
    let mut schedule = Schedule::new();
    schedule.add(villager, NINE, visit(42, None));

    let snapshot = query::actor(&world, villager).expect("villager");
    let mut commands = Vec::new();
    schedule.handle(&world, &snapshot, &mut Pathfinder::default(), &mut commands);
    assert!(commands.is_empty());
    assert!(schedule.plan(villager).expect("plan").entry(NINE).is_some());
}

#[test]
fn entries_only_fire_at_their_time() {
    let mut world = world_at_nine();
    let villager = spawn(&mut world, CellCoord::new(20, 20));
    let mut schedule = Schedule::new();
    schedule.add(villager, ClockTime::new(10, 0), visit(3, None));

    let snapshot = query::actor(&world, villager).expect("villager");
    let mut commands = Vec::new();
    schedule.handle(&world, &snapshot, &mut Pathfinder::default(), &mut commands);
    assert!(commands.is_empty());
    assert_eq!(schedule.plan(villager).expect("plan").len(), 1);
}

#[test]
fn planned_visits_fall_on_the_hour_within_visiting_hours() {
    let config = SimulationConfig::default();
    let mut schedule = Schedule::new();
    let visitors = [ActorId::new(1), ActorId::new(2), ActorId::new(3)];
    let houses = [1, 2, 4];
    schedule.plan_visits(&mut ChaCha8Rng::seed_from_u64(12), &visitors, &houses, &config);

    for visitor in visitors {
        let plan = schedule.plan(visitor).expect("plan");
        assert!(!plan.is_empty() && plan.len() <= config.visits_per_villager as usize);
        for (time, entry) in plan.iter() {
            assert_eq!(time.minute(), 0);
            assert!((config.first_visit_hour..=config.last_visit_hour).contains(&time.hour()));
            let PlanAction::VisitNeighbour { house } = entry.action;
            assert!(houses.contains(&house));
        }
    }
}
