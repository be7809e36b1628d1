use murder_town_core::{
    config::{BuildingConfig, TownConfig},
    ActorKind, CellCoord, Decoration, GenerationError,
};
use murder_town_system_town::{spawn_inside, TownPlanner};
use murder_town_world::{query, World, WorldSettings};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn build(seed: u64) -> (World, murder_town_system_town::Town) {
    let mut world = World::new(WorldSettings::default());
    let planner = TownPlanner::new(TownConfig::default(), BuildingConfig::default());
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let town = planner.layout(&mut world, &mut rng).expect("town generates");
    (world, town)
}

#[test]
fn every_lot_holds_a_numbered_house_and_its_resident() {
    let (world, town) = build(11);
    assert_eq!(town.lots().len(), 9);

    for (index, lot) in town.lots().iter().enumerate() {
        assert_eq!(lot.index(), index);
        assert_eq!(lot.house(), index as u32 + 1);

        let building = query::building(&world, lot.house()).expect("building placed");
        let resident = query::actor(&world, lot.resident()).expect("resident spawned");
        assert_eq!(resident.kind, ActorKind::Villager);
        assert_eq!(resident.home, Some(lot.house()));
        assert!(building.interior_contains(resident.cell));
        assert_eq!(town.home_of(lot.resident()), Some(lot));
    }
}

#[test]
fn walls_doors_and_fences_never_share_a_cell() {
    for seed in 0..8 {
        let (world, _) = build(seed);
        for (cell, _) in query::walls(&world) {
            assert!(query::door_at(&world, cell).is_none(), "wall on door {cell:?}");
            assert!(!query::fence_at(&world, cell), "wall on fence {cell:?}");
        }
        for (cell, _) in query::doors(&world) {
            assert!(!query::fence_at(&world, cell), "door on fence {cell:?}");
        }
    }
}

#[test]
fn front_doors_open_onto_the_road() {
    let (world, town) = build(5);
    for lot in town.lots() {
        let building = query::building(&world, lot.house()).expect("building");
        let front_door = building.front_door();
        assert!(query::door_at(&world, front_door).is_some());

        let outside = CellCoord::new(front_door.row() + 1, front_door.column());
        assert_eq!(query::decoration_at(&world, outside), Some(Decoration::Road));
        assert!(query::obstruction_at(&world, outside).is_none());

        let inside = CellCoord::new(front_door.row() - 1, front_door.column());
        assert!(building.interior_contains(inside));
        assert!(query::obstruction_at(&world, inside).is_none());
    }
}

#[test]
fn lots_are_fenced_and_separated_by_roads() {
    let (world, town) = build(2);
    let first = town.lot(1).expect("first lot");
    assert_eq!(first.origin(), CellCoord::new(5, 5));
    for offset in 0..20 {
        for cell in [
            CellCoord::new(5, 5 + offset),
            CellCoord::new(5 + offset, 5),
            CellCoord::new(24, 5 + offset),
            CellCoord::new(5 + offset, 24),
        ] {
            assert!(
                query::fence_at(&world, cell)
                    || query::wall_at(&world, cell).is_some()
                    || query::door_at(&world, cell).is_some(),
                "lot boundary open at {cell:?}"
            );
        }
    }
    assert_eq!(town.lot(2).expect("second lot").origin(), CellCoord::new(5, 28));
    assert_eq!(town.lot(4).expect("fourth lot").origin(), CellCoord::new(27, 5));

    for row in 5..27 {
        for column in 25..28 {
            assert_eq!(
                query::decoration_at(&world, CellCoord::new(row, column)),
                Some(Decoration::Road)
            );
        }
    }
}

#[test]
fn officers_spawn_on_free_interior_cells() {
    let (mut world, town) = build(3);
    let house = town.lots()[4].house();
    let mut rng = ChaCha8Rng::seed_from_u64(99);
    let officers: Vec<_> = (0..5)
        .map(|_| spawn_inside(&mut world, &mut rng, house, ActorKind::Police).expect("spawn"))
        .collect();

    let building = query::building(&world, house).expect("building");
    let mut cells: Vec<_> = officers
        .iter()
        .map(|id| query::actor(&world, *id).expect("officer").cell)
        .collect();
    assert!(cells.iter().all(|cell| building.interior_contains(*cell)));
    cells.sort();
    cells.dedup();
    assert_eq!(cells.len(), 5);
}

#[test]
fn each_house_has_one_sign_beside_its_front_door() {
    let (world, town) = build(8);
    for lot in town.lots() {
        let building = query::building(&world, lot.house()).expect("building");
        let signs: Vec<_> = query::walls(&world)
            .filter(|(_, wall)| wall.sign() == Some(lot.house()))
            .map(|(cell, _)| cell)
            .collect();
        assert_eq!(signs.len(), 1, "house {} signs: {signs:?}", lot.house());
        assert_eq!(signs[0].manhattan_distance(building.front_door()), 1);
    }
}

#[test]
fn grid_beyond_map_coordinates_is_rejected() {
    let mut world = World::new(WorldSettings::default());
    let planner = TownPlanner::new(
        TownConfig {
            grid_rows: u32::MAX,
            ..TownConfig::default()
        },
        BuildingConfig::default(),
    );
    let error = planner
        .layout(&mut world, &mut ChaCha8Rng::seed_from_u64(0))
        .expect_err("grid rows overflow i32");
    assert_eq!(
        error,
        GenerationError::GridTooLarge {
            rows: u32::MAX,
            columns: 3,
        }
    );
    assert_eq!(query::buildings(&world).count(), 0);
}

#[test]
fn lot_origins_step_over_lots_and_roads() {
    let planner = TownPlanner::default();
    assert_eq!(planner.lot_origin(0, 0), CellCoord::new(5, 5));
    assert_eq!(planner.lot_origin(1, 2), CellCoord::new(27, 51));
}
