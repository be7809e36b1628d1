use murder_town_core::{config::BuildingConfig, CellCoord, GenerationError};
use murder_town_system_building::{is_connected, BuildingGenerator};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

#[test]
fn generated_buildings_are_connected_and_within_bounds() {
    let generator = BuildingGenerator::default();
    let config = BuildingConfig::default();
    let mut rng = ChaCha8Rng::seed_from_u64(0x5eed);

    for number in 1..=1_000 {
        let max_height = 9 + (number as i32 % 12);
        let max_width = 15 + (number as i32 % 6);
        let layout = generator
            .generate(&mut rng, max_height, max_width, number)
            .expect("bounds above the minimum always generate");

        assert!(is_connected(&layout), "house {number} has unreachable rooms");
        assert!(layout.height + 1 <= max_height && layout.width + 1 <= max_width);
        assert!(layout.height + 1 >= config.minimum_height);
        assert!(layout.width + 1 >= config.minimum_width);
        assert!(!layout.rooms.is_empty() && layout.rooms.len() <= 4);
        assert_eq!(layout.doors.len(), layout.rooms.len());

        for room in &layout.rooms {
            assert!(room.height >= config.minimum_room_dimension);
            assert!(room.width >= config.minimum_room_dimension);
            assert!(room.origin.row() + room.height <= layout.height);
            assert!(room.origin.column() + room.width <= layout.width);
        }

        assert_eq!(layout.front_door.row(), layout.height);
        let inside = CellCoord::new(layout.height - 1, layout.front_door.column());
        assert!(!layout.walls.contains(&inside), "front door opens onto a wall");
        assert!(layout.walls.contains(&layout.sign));
        for door in layout.doors.keys() {
            assert!(layout.walls.contains(door), "door {door:?} is not in a wall");
        }
    }
}

#[test]
fn same_seed_generates_same_building() {
    let generator = BuildingGenerator::default();
    let first = generator
        .generate(&mut ChaCha8Rng::seed_from_u64(17), 20, 20, 3)
        .expect("generates");
    let second = generator
        .generate(&mut ChaCha8Rng::seed_from_u64(17), 20, 20, 3)
        .expect("generates");
    assert_eq!(first, second);
}

#[test]
fn locked_front_doors_follow_configuration() {
    let generator = BuildingGenerator::new(BuildingConfig {
        front_doors_locked: true,
        ..BuildingConfig::default()
    });
    let layout = generator
        .generate(&mut ChaCha8Rng::seed_from_u64(1), 20, 20, 1)
        .expect("generates");
    let locked: Vec<_> = layout
        .doors
        .iter()
        .filter(|(_, spec)| spec.locked)
        .map(|(cell, _)| *cell)
        .collect();
    assert_eq!(locked, vec![layout.front_door]);
}

#[test]
fn bounds_below_minimum_are_rejected() {
    let generator = BuildingGenerator::default();
    let error = generator
        .generate(&mut ChaCha8Rng::seed_from_u64(0), 8, 20, 1)
        .expect_err("too short");
    assert_eq!(
        error,
        GenerationError::BoundsTooSmall {
            max_height: 8,
            max_width: 20,
            min_height: 9,
            min_width: 15,
        }
    );
}

#[test]
fn single_room_buildings_have_only_a_front_door() {
    let generator = BuildingGenerator::new(BuildingConfig {
        minimum_height: 15,
        minimum_width: 15,
        min_rooms: 1,
        max_rooms: 1,
        ..BuildingConfig::default()
    });
    let layout = generator
        .generate(&mut ChaCha8Rng::seed_from_u64(4), 15, 15, 1)
        .expect("generates");
    assert_eq!(layout.rooms.len(), 1);
    assert_eq!(layout.doors.len(), 1);
    assert_eq!(layout.height, 14);
    assert_eq!(layout.width, 14);
}

#[test]
fn impossible_room_counts_give_up_after_max_attempts() {
    let generator = BuildingGenerator::new(BuildingConfig {
        min_rooms: 5,
        max_rooms: 5,
        minimum_room_dimension: 7,
        max_attempts: 5,
        ..BuildingConfig::default()
    });
    let error = generator
        .generate(&mut ChaCha8Rng::seed_from_u64(1), 15, 15, 1)
        .expect_err("five rooms of seven cells cannot fit");
    assert_eq!(error, GenerationError::AttemptsExhausted { attempts: 5 });
}
