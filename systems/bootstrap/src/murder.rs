//! Opening scene: a dead villager, a hidden killer, and police at the house.

use murder_town_core::{
    config::SimulationConfig, ActorId, ActorKind, CellCoord, Command, Direction, Event,
    GenerationError,
};
use murder_town_system_town::{spawn_inside, Town};
use murder_town_world::{self as world, query, World};
use rand::Rng;
use tracing::{info, warn};

/// Who died, who did it, and who is investigating.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Case {
    victim: ActorId,
    killer: ActorId,
    crime_scene: u32,
    player: ActorId,
    officers: Vec<ActorId>,
}

impl Case {
    /// Villager found dead.
    #[must_use]
    pub const fn victim(&self) -> ActorId {
        self.victim
    }

    /// Villager who committed the murder.
    #[must_use]
    pub const fn killer(&self) -> ActorId {
        self.killer
    }

    /// House number of the victim's home.
    #[must_use]
    pub const fn crime_scene(&self) -> u32 {
        self.crime_scene
    }

    /// The detective.
    #[must_use]
    pub const fn player(&self) -> ActorId {
        self.player
    }

    /// Officers posted at the scene.
    #[must_use]
    pub fn officers(&self) -> &[ActorId] {
        &self.officers
    }
}

pub(crate) fn stage<R: Rng + ?Sized>(
    world: &mut World,
    town: &Town,
    rng: &mut R,
    config: &SimulationConfig,
) -> Result<Case, GenerationError> {
    let lots = town.lots();
    if lots.len() < 2 {
        return Err(GenerationError::NotEnoughVillagers { found: lots.len() });
    }
    let victim_lot = &lots[rng.gen_range(0..lots.len())];
    let killer_lot = loop {
        let lot = &lots[rng.gen_range(0..lots.len())];
        if lot.index() != victim_lot.index() {
            break lot;
        }
    };
    let (victim, killer) = (victim_lot.resident(), killer_lot.resident());
    let house = victim_lot.house();

    let mut events = Vec::new();
    world::apply(world, Command::KillActor { actor: victim }, &mut events);
    world::apply(world, Command::MarkKiller { actor: killer }, &mut events);

    let mut officers = Vec::new();
    for _ in 0..rng.gen_range(config.police_min..=config.police_max) {
        officers.push(spawn_inside(world, rng, house, ActorKind::Police)?);
    }

    let no_room = GenerationError::NoFreeCell {
        role: "player",
        house,
    };
    let front_door = query::building(world, house)
        .ok_or(no_room.clone())?
        .front_door();
    let outside = front_door.step(Direction::South);
    let player = spawn_at(world, ActorKind::Player, outside).ok_or(no_room)?;

    let beside = outside.step(Direction::East);
    match spawn_at(world, ActorKind::Police, beside) {
        Some(officer) => officers.push(officer),
        None => warn!(?beside, "no room for the officer beside the player"),
    }

    info!(
        victim = victim.get(),
        house,
        officers = officers.len(),
        "murder staged"
    );
    Ok(Case {
        victim,
        killer,
        crime_scene: house,
        player,
        officers,
    })
}

fn spawn_at(world: &mut World, kind: ActorKind, cell: CellCoord) -> Option<ActorId> {
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
    events.into_iter().find_map(|event| match event {
        Event::ActorSpawned { actor, .. } => Some(actor),
        _ => None,
    })
}
