//! Binary space partitioning of a building footprint into rooms.

use std::collections::BTreeSet;

use murder_town_core::{config::BuildingConfig, CellCoord, Room};
use rand::Rng;
use tracing::trace;

/// Orientation of a new partition wall.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Axis {
    /// Wall runs along a row, splitting the room's height.
    Row,
    /// Wall runs along a column, splitting the room's width.
    Column,
}

impl Axis {
    fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        if rng.gen_bool(0.5) {
            Axis::Row
        } else {
            Axis::Column
        }
    }

    const fn other(self) -> Self {
        match self {
            Axis::Row => Axis::Column,
            Axis::Column => Axis::Row,
        }
    }
}

/// Rooms and interior doors produced by a successful partition.
#[derive(Clone, Debug, Default)]
pub(crate) struct Partition {
    pub(crate) rooms: Vec<Room>,
    pub(crate) doors: BTreeSet<CellCoord>,
}

impl Partition {
    fn whole(height: i32, width: i32) -> Self {
        Self {
            rooms: vec![Room {
                origin: CellCoord::new(0, 0),
                height,
                width,
            }],
            doors: BTreeSet::new(),
        }
    }

    /// Offset of a valid cut through `room` along `axis`, if one exists.
    fn choose_cut<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        room: &Room,
        axis: Axis,
        minimum: i32,
    ) -> Option<i32> {
        let span = match axis {
            Axis::Row => room.height,
            Axis::Column => room.width,
        };
        if span < 2 * minimum {
            return None;
        }
        let cut = rng.gen_range(minimum..=span - minimum);
        let (first_end, second_end) = match axis {
            Axis::Row => (
                room.origin.offset(cut, 0),
                room.origin.offset(cut, room.width),
            ),
            Axis::Column => (
                room.origin.offset(0, cut),
                room.origin.offset(room.height, cut),
            ),
        };
        if self.doors.contains(&first_end) || self.doors.contains(&second_end) {
            trace!(?first_end, ?second_end, "cut would end on a door");
            return None;
        }
        Some(cut)
    }

    fn split<R: Rng + ?Sized>(&mut self, rng: &mut R, index: usize, axis: Axis, cut: i32) {
        let room = self.rooms.swap_remove(index);
        let (first, second, door) = match axis {
            Axis::Row => (
                Room {
                    origin: room.origin,
                    height: cut,
                    width: room.width,
                },
                Room {
                    origin: room.origin.offset(cut, 0),
                    height: room.height - cut,
                    width: room.width,
                },
                room.origin.offset(cut, rng.gen_range(1..room.width)),
            ),
            Axis::Column => (
                Room {
                    origin: room.origin,
                    height: room.height,
                    width: cut,
                },
                Room {
                    origin: room.origin.offset(0, cut),
                    height: room.height,
                    width: room.width - cut,
                },
                room.origin.offset(rng.gen_range(1..room.height), cut),
            ),
        };
        self.rooms.push(first);
        self.rooms.push(second);
        let _ = self.doors.insert(door);
    }

    /// Splits the whole footprint once, falling back to the other axis.
    fn first_split<R: Rng + ?Sized>(&mut self, rng: &mut R, minimum: i32) -> bool {
        let preferred = Axis::random(rng);
        for axis in [preferred, preferred.other()] {
            let room = self.rooms[0];
            if let Some(cut) = self.choose_cut(rng, &room, axis, minimum) {
                self.split(rng, 0, axis, cut);
                return true;
            }
        }
        false
    }
}

/// Partitions a `height` by `width` footprint into `splits + 1` rooms.
///
/// Each split picks a random room and axis. After `partition_retries`
/// failed picks every partition is discarded and the process restarts from a
/// fresh first split; `None` is returned once `partition_restarts` is spent.
pub(crate) fn partition<R: Rng + ?Sized>(
    rng: &mut R,
    height: i32,
    width: i32,
    splits: u32,
    config: &BuildingConfig,
) -> Option<Partition> {
    let minimum = config.minimum_room_dimension;
    let mut partition = Partition::whole(height, width);
    if splits == 0 {
        return Some(partition);
    }
    if !partition.first_split(rng, minimum) {
        return None;
    }

    let mut remaining = splits - 1;
    let mut restarts = 0;
    while remaining > 0 {
        let mut picked = None;
        for _ in 0..config.partition_retries.max(1) {
            let index = rng.gen_range(0..partition.rooms.len());
            let axis = Axis::random(rng);
            let room = partition.rooms[index];
            if let Some(cut) = partition.choose_cut(rng, &room, axis, minimum) {
                picked = Some((index, axis, cut));
                break;
            }
        }

        match picked {
            Some((index, axis, cut)) => {
                partition.split(rng, index, axis, cut);
                remaining -= 1;
            }
            None => {
                restarts += 1;
                if restarts > config.partition_restarts {
                    return None;
                }
                trace!(restarts, "restarting partition");
                partition = Partition::whole(height, width);
                if !partition.first_split(rng, minimum) {
                    return None;
                }
                remaining = splits - 1;
            }
        }
    }

    Some(partition)
}
