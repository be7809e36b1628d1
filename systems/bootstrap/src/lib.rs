#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Session bootstrap: builds the town, stages the murder, and runs turns.
//!
//! A [`Session`] owns the world together with every system and a single
//! seeded generator, so two sessions built from the same configuration
//! replay identically.

mod murder;

pub use murder::Case;

use murder_town_core::{
    config::{Config, MapConfig},
    ActorId, ActorKind, CellCoord, Command, Decoration, Event, GenerationError,
};
use murder_town_system_movement::{Movement, PlayerAction};
use murder_town_system_pathfinding::Pathfinder;
use murder_town_system_schedule::Schedule;
use murder_town_system_town::{Town, TownPlanner};
use murder_town_system_visibility::Visibility;
use murder_town_world::{self as world, query, World, WorldSettings};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

/// Seed used when the configuration leaves it open.
pub const DEFAULT_SEED: u64 = 0x6d75_7264_6572;

/// A running game: the world plus the systems that drive it.
#[derive(Debug)]
pub struct Session {
    seed: u64,
    world: World,
    town: Town,
    case: Case,
    schedule: Schedule,
    movement: Movement,
    pathfinder: Pathfinder,
    visibility: Option<Visibility>,
    rng: ChaCha8Rng,
    turn: u64,
}

impl Session {
    /// Generates a fresh session from validated configuration.
    pub fn new(config: &Config) -> Result<Self, GenerationError> {
        let seed = config.seed.unwrap_or(DEFAULT_SEED);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut world = World::new(WorldSettings::from_config(config));

        scatter_decorations(&mut world, &mut rng, &config.map);
        let town = TownPlanner::new(config.town.clone(), config.building.clone())
            .layout(&mut world, &mut rng)?;
        let case = murder::stage(&mut world, &town, &mut rng, &config.simulation)?;

        let view = query::actor_view(&world);
        let visitors: Vec<ActorId> = view
            .iter()
            .filter(|actor| actor.kind == ActorKind::Villager && actor.alive)
            .map(|actor| actor.id)
            .collect();
        let houses: Vec<u32> = town
            .lots()
            .iter()
            .filter(|lot| view.get(lot.resident()).is_some_and(|actor| actor.alive))
            .map(|lot| lot.house())
            .collect();
        let mut schedule = Schedule::new();
        schedule.plan_visits(&mut rng, &visitors, &houses, &config.simulation);

        let visibility = config
            .visibility
            .enabled
            .then(|| Visibility::from_config(&config.visibility, config.map.columns));

        let mut session = Self {
            seed,
            world,
            town,
            case,
            schedule,
            movement: Movement::new(config.simulation.kick_success_percent),
            pathfinder: Pathfinder::new(&config.pathfinding),
            visibility,
            rng,
            turn: 0,
        };
        let mut events = Vec::new();
        if session.visibility.is_none() {
            world::apply(&mut session.world, Command::RevealAll, &mut events);
        }
        session.refresh_view(&mut events);

        info!(
            seed,
            houses = session.town.lots().len(),
            villagers = visitors.len(),
            "session ready"
        );
        Ok(session)
    }

    /// Seed the session was generated from.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Current world state.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Town layout.
    #[must_use]
    pub fn town(&self) -> &Town {
        &self.town
    }

    /// The murder under investigation.
    #[must_use]
    pub fn case(&self) -> &Case {
        &self.case
    }

    /// Villagers' plans.
    #[must_use]
    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Number of turns played.
    #[must_use]
    pub const fn turn(&self) -> u64 {
        self.turn
    }

    /// Plays one turn with the player's chosen action.
    ///
    /// Returns `None` without advancing time when the action cannot be taken.
    pub fn advance(&mut self, action: PlayerAction) -> Option<Vec<Event>> {
        let mut commands = Vec::new();
        if !self
            .movement
            .handle_player(&self.world, action, &mut self.rng, &mut commands)
        {
            debug!(?action, "player action refused");
            return None;
        }

        let mut events = Vec::new();
        apply_all(&mut self.world, commands, &mut events);
        world::apply(&mut self.world, Command::Tick, &mut events);

        let npcs: Vec<ActorId> = query::actor_view(&self.world)
            .iter()
            .filter(|actor| actor.kind != ActorKind::Player && actor.alive)
            .map(|actor| actor.id)
            .collect();
        for id in npcs {
            self.npc_turn(id, &mut events);
        }

        world::apply(&mut self.world, Command::TickDoors, &mut events);
        self.refresh_view(&mut events);
        self.turn += 1;
        Some(events)
    }

    fn npc_turn(&mut self, id: ActorId, events: &mut Vec<Event>) {
        let mut commands = Vec::new();
        let Some(actor) = query::actor(&self.world, id) else {
            return;
        };
        self.schedule
            .handle(&self.world, &actor, &mut self.pathfinder, &mut commands);
        apply_all(&mut self.world, commands, events);

        let mut commands = Vec::new();
        let Some(actor) = query::actor(&self.world, id) else {
            return;
        };
        self.movement.handle_npc(
            &self.world,
            &actor,
            &mut self.pathfinder,
            &mut self.rng,
            &mut commands,
        );
        apply_all(&mut self.world, commands, events);
    }

    fn refresh_view(&mut self, events: &mut Vec<Event>) {
        let Some(visibility) = self.visibility.as_mut() else {
            return;
        };
        let Some(player) = query::actor_view(&self.world).player().cloned() else {
            return;
        };
        let mut commands = Vec::new();
        visibility.handle(&self.world, player.cell, &mut commands);
        apply_all(&mut self.world, commands, events);
    }
}

fn apply_all(world: &mut World, commands: Vec<Command>, events: &mut Vec<Event>) {
    for command in commands {
        world::apply(world, command, events);
    }
}

/// Sprinkles grass and flowers over the map before anything is built on it.
fn scatter_decorations<R: Rng + ?Sized>(world: &mut World, rng: &mut R, map: &MapConfig) {
    let (Ok(rows), Ok(columns)) = (i32::try_from(map.rows), i32::try_from(map.columns)) else {
        return;
    };
    if rows < 2 || columns < 2 {
        return;
    }
    let mut events = Vec::new();
    for _ in 0..map.scattered_decorations {
        let cell = CellCoord::new(rng.gen_range(0..rows - 1), rng.gen_range(0..columns - 1));
        world::apply(
            world,
            Command::PlaceDecoration {
                cell,
                decoration: Decoration::Scatter,
            },
            &mut events,
        );
    }
}
