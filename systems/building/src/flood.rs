//! Connectivity check over a building's interior.

use std::collections::{BTreeMap, BTreeSet};

use murder_town_core::{CellCoord, DoorSpec};

/// Reports whether every open cell of the footprint is reachable from `(1, 1)`.
///
/// The footprint covers rows `0..height` and columns `0..width`; walls block
/// unless a door replaces them. The scan uses an explicit stack so large
/// footprints cannot exhaust the call stack.
pub(crate) fn is_connected(
    height: i32,
    width: i32,
    walls: &BTreeSet<CellCoord>,
    doors: &BTreeMap<CellCoord, DoorSpec>,
) -> bool {
    let blocked =
        |cell: &CellCoord| walls.contains(cell) && !doors.contains_key(cell);
    let in_footprint = |cell: &CellCoord| {
        (0..height).contains(&cell.row()) && (0..width).contains(&cell.column())
    };

    let start = CellCoord::new(1, 1);
    if !in_footprint(&start) || blocked(&start) {
        return false;
    }

    let mut visited = BTreeSet::new();
    let mut stack = vec![start];
    while let Some(cell) = stack.pop() {
        if !visited.insert(cell) {
            continue;
        }
        for neighbour in cell.neighbors() {
            if in_footprint(&neighbour) && !blocked(&neighbour) && !visited.contains(&neighbour) {
                stack.push(neighbour);
            }
        }
    }

    let open = (0..height)
        .flat_map(|row| (0..width).map(move |column| CellCoord::new(row, column)))
        .filter(|cell| !blocked(cell))
        .count();
    visited.len() == open
}

#[cfg(test)]
mod tests {
    use murder_town_core::Room;

    use super::*;

    fn split_room(door: Option<CellCoord>) -> (BTreeSet<CellCoord>, BTreeMap<CellCoord, DoorSpec>) {
        let outer = Room {
            origin: CellCoord::new(0, 0),
            height: 8,
            width: 10,
        };
        let mut walls: BTreeSet<_> = outer.perimeter().into_iter().collect();
        for row in 0..=8 {
            let _ = walls.insert(CellCoord::new(row, 5));
        }
        let mut doors = BTreeMap::new();
        if let Some(door) = door {
            let _ = doors.insert(door, DoorSpec { locked: false });
        }
        (walls, doors)
    }

    #[test]
    fn partition_without_door_is_disconnected() {
        let (walls, doors) = split_room(None);
        assert!(!is_connected(8, 10, &walls, &doors));
    }

    #[test]
    fn door_reconnects_the_halves() {
        let (walls, doors) = split_room(Some(CellCoord::new(4, 5)));
        assert!(is_connected(8, 10, &walls, &doors));
    }
}
