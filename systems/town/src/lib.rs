#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Lays out a grid of fenced lots, each holding one generated house and its
//! resident, with roads running between the lots.

use murder_town_core::{
    config::{BuildingConfig, TownConfig},
    ActorId, ActorKind, CellCoord, Command, Decoration, Event, GenerationError,
};
use murder_town_system_building::BuildingGenerator;
use murder_town_world::{self as world, query, World};
use rand::Rng;
use tracing::{debug, info};

const SPAWN_ATTEMPTS: u32 = 256;

/// Square parcel of land holding a single house.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Lot {
    index: usize,
    origin: CellCoord,
    house: u32,
    resident: ActorId,
}

impl Lot {
    /// Row-major position of the lot in the town grid.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Absolute upper-left cell of the lot.
    #[must_use]
    pub const fn origin(&self) -> CellCoord {
        self.origin
    }

    /// House number of the lot's building.
    #[must_use]
    pub const fn house(&self) -> u32 {
        self.house
    }

    /// Villager who lives on the lot.
    #[must_use]
    pub const fn resident(&self) -> ActorId {
        self.resident
    }
}

/// Lots produced by [`TownPlanner::layout`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Town {
    lots: Vec<Lot>,
}

impl Town {
    /// Lots in row-major order.
    #[must_use]
    pub fn lots(&self) -> &[Lot] {
        &self.lots
    }

    /// Lot whose building carries the provided house number.
    #[must_use]
    pub fn lot(&self, house: u32) -> Option<&Lot> {
        self.lots.iter().find(|lot| lot.house == house)
    }

    /// Lot the provided villager lives on.
    #[must_use]
    pub fn home_of(&self, resident: ActorId) -> Option<&Lot> {
        self.lots.iter().find(|lot| lot.resident == resident)
    }
}

/// Places buildings, fences, roads, and residents into a world.
#[derive(Clone, Debug, Default)]
pub struct TownPlanner {
    town: TownConfig,
    generator: BuildingGenerator,
}

impl TownPlanner {
    /// Creates a planner using the provided grid and building limits.
    #[must_use]
    pub fn new(town: TownConfig, building: BuildingConfig) -> Self {
        Self {
            town,
            generator: BuildingGenerator::new(building),
        }
    }

    /// Absolute upper-left cell of the lot at the provided grid position.
    #[must_use]
    pub fn lot_origin(&self, grid_row: i32, grid_column: i32) -> CellCoord {
        let town = &self.town;
        CellCoord::new(
            town.origin_row + grid_row * (town.lot_size + town.road_height),
            town.origin_column + grid_column * (town.lot_size + town.road_width),
        )
    }

    /// Fills the world with the town's lots in row-major order.
    pub fn layout<R: Rng + ?Sized>(
        &self,
        world: &mut World,
        rng: &mut R,
    ) -> Result<Town, GenerationError> {
        let (Ok(grid_rows), Ok(grid_columns)) = (
            i32::try_from(self.town.grid_rows),
            i32::try_from(self.town.grid_columns),
        ) else {
            return Err(GenerationError::GridTooLarge {
                rows: self.town.grid_rows,
                columns: self.town.grid_columns,
            });
        };
        let lot_size = self.town.lot_size;
        let mut lots = Vec::new();
        let mut events = Vec::new();
        let mut house = 0u32;

        for grid_row in 0..grid_rows {
            for grid_column in 0..grid_columns {
                let index = lots.len();
                house += 1;
                let origin = self.lot_origin(grid_row, grid_column);

                let layout = self.generator.generate(rng, lot_size, lot_size, house)?;
                let row_offset = lot_size - layout.height - 1;
                let column_offset = rng.gen_range(0..=lot_size - layout.width - 1);
                world::apply(
                    world,
                    Command::PlaceBuilding {
                        origin: origin.offset(row_offset, column_offset),
                        layout,
                    },
                    &mut events,
                );

                self.fence_lot(world, origin, &mut events);
                let resident = spawn_inside(world, rng, house, ActorKind::Villager)?;
                debug!(house, ?origin, resident = resident.get(), "lot settled");

                lots.push(Lot {
                    index,
                    origin,
                    house,
                    resident,
                });
            }
        }

        for lot in &lots {
            self.pave_around(world, lot.origin, &mut events);
        }

        info!(lots = lots.len(), "town laid out");
        Ok(Town { lots })
    }

    fn fence_lot(&self, world: &mut World, origin: CellCoord, events: &mut Vec<Event>) {
        let last = self.town.lot_size - 1;
        let mut perimeter = Vec::new();
        for column in 0..=last {
            perimeter.push(origin.offset(0, column));
            perimeter.push(origin.offset(last, column));
        }
        for row in 1..last {
            perimeter.push(origin.offset(row, 0));
            perimeter.push(origin.offset(row, last));
        }
        for cell in perimeter {
            world::apply(world, Command::PlaceFence { cell }, events);
        }
    }

    /// Lays the road strip right of the lot and the strip below it, corner included.
    fn pave_around(&self, world: &mut World, origin: CellCoord, events: &mut Vec<Event>) {
        let town = &self.town;
        let vertical = (0..town.lot_size + town.road_height).flat_map(|row| {
            (0..town.road_width).map(move |column| origin.offset(row, town.lot_size + column))
        });
        let horizontal = (0..town.road_height).flat_map(|row| {
            (0..town.lot_size + town.road_width)
                .map(move |column| origin.offset(town.lot_size + row, column))
        });
        for cell in vertical.chain(horizontal) {
            world::apply(
                world,
                Command::PlaceDecoration {
                    cell,
                    decoration: Decoration::Road,
                },
                events,
            );
        }
    }
}

/// Spawns an actor on a random free interior cell of the numbered house.
///
/// Cells holding walls, doors, or other actors are skipped.
pub fn spawn_inside<R: Rng + ?Sized>(
    world: &mut World,
    rng: &mut R,
    house: u32,
    kind: ActorKind,
) -> Result<ActorId, GenerationError> {
    let role = match kind {
        ActorKind::Player => "player",
        ActorKind::Villager => "villager",
        ActorKind::Police => "police officer",
    };
    let no_cell = GenerationError::NoFreeCell { role, house };
    let Some(building) = query::building(world, house) else {
        return Err(no_cell);
    };
    let (height, width) = (building.height(), building.width());
    let origin = building.origin();
    let home = (kind == ActorKind::Villager).then_some(house);

    for _ in 0..SPAWN_ATTEMPTS {
        let cell = origin.offset(rng.gen_range(1..height), rng.gen_range(1..width));
        if query::obstruction_at(world, cell).is_some()
            || query::door_at(world, cell).is_some()
            || query::occupant(world, cell).is_some()
        {
            continue;
        }
        let mut events = Vec::new();
        world::apply(world, Command::SpawnActor { kind, cell, home }, &mut events);
        if let Some(actor) = events.iter().find_map(|event| match event {
            Event::ActorSpawned { actor, .. } => Some(*actor),
            _ => None,
        }) {
            return Ok(actor);
        }
    }
    Err(no_cell)
}
