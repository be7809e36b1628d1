#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Daily plans that send villagers on errands at fixed times of day.
//!
//! A plan maps a clock reading to an entry. Whenever an actor's turn comes up
//! at a reading its plan names, the entry runs: a successful entry is
//! removed, a failed one is postponed when it allows it and kept otherwise.

use std::collections::BTreeMap;

use murder_town_core::{
    config::SimulationConfig, ActorId, ActorSnapshot, Behaviour, ClockTime, Command, Direction,
};
use murder_town_system_pathfinding::Pathfinder;
use murder_town_world::{query, World};
use rand::Rng;
use tracing::{debug, warn};

/// Errand performed when a plan entry fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlanAction {
    /// Walk to just inside the front door of a house and linger there.
    VisitNeighbour {
        /// House number to visit.
        house: u32,
    },
}

/// Scheduled errand.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlanEntry {
    /// Errand to perform.
    pub action: PlanAction,
    /// Minutes to postpone a failed errand by. `None` keeps it at its time.
    pub reschedule_after: Option<u32>,
}

/// One actor's errands keyed by time of day.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Plan {
    entries: BTreeMap<ClockTime, PlanEntry>,
}

impl Plan {
    /// Schedules an entry, replacing any entry already at that time.
    pub fn add(&mut self, time: ClockTime, entry: PlanEntry) {
        let _ = self.entries.insert(time, entry);
    }

    /// Entry scheduled at the provided time.
    #[must_use]
    pub fn entry(&self, time: ClockTime) -> Option<&PlanEntry> {
        self.entries.get(&time)
    }

    /// Iterates over the scheduled entries in time order.
    pub fn iter(&self) -> impl Iterator<Item = (ClockTime, &PlanEntry)> {
        self.entries.iter().map(|(time, entry)| (*time, entry))
    }

    /// Number of scheduled entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is scheduled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Plans for every actor.
#[derive(Clone, Debug, Default)]
pub struct Schedule {
    plans: BTreeMap<ActorId, Plan>,
}

impl Schedule {
    /// Creates an empty schedule.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules an entry for an actor.
    pub fn add(&mut self, actor: ActorId, time: ClockTime, entry: PlanEntry) {
        self.plans.entry(actor).or_default().add(time, entry);
    }

    /// Plan of the provided actor.
    #[must_use]
    pub fn plan(&self, actor: ActorId) -> Option<&Plan> {
        self.plans.get(&actor)
    }

    /// Gives every visitor a set of on-the-hour visits to random houses.
    pub fn plan_visits<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        visitors: &[ActorId],
        houses: &[u32],
        config: &SimulationConfig,
    ) {
        if houses.is_empty() {
            return;
        }
        for &visitor in visitors {
            for _ in 0..config.visits_per_villager {
                let house = houses[rng.gen_range(0..houses.len())];
                let hour = rng.gen_range(config.first_visit_hour..=config.last_visit_hour);
                self.add(
                    visitor,
                    ClockTime::new(hour, 0),
                    PlanEntry {
                        action: PlanAction::VisitNeighbour { house },
                        reschedule_after: config.visit_retry_minutes,
                    },
                );
            }
        }
    }

    /// Runs the actor's entry for the current time, if any.
    pub fn handle(
        &mut self,
        world: &World,
        actor: &ActorSnapshot,
        pathfinder: &mut Pathfinder,
        out: &mut Vec<Command>,
    ) {
        if !actor.alive {
            return;
        }
        let now = query::clock(world);
        let Some(plan) = self.plans.get_mut(&actor.id) else {
            return;
        };
        let Some(entry) = plan.entries.get(&now).copied() else {
            return;
        };

        if perform(world, actor, entry.action, pathfinder, out) {
            let _ = plan.entries.remove(&now);
            return;
        }

        if let Some(delay) = entry.reschedule_after {
            let _ = plan.entries.remove(&now);
            let later = now.plus_minutes(delay);
            debug!(actor = actor.id.get(), %later, "errand postponed");
            plan.add(later, entry);
        }
    }
}

fn perform(
    world: &World,
    actor: &ActorSnapshot,
    action: PlanAction,
    pathfinder: &mut Pathfinder,
    out: &mut Vec<Command>,
) -> bool {
    match action {
        PlanAction::VisitNeighbour { house } => {
            let Some(building) = query::building(world, house) else {
                warn!(house, "visit planned to a missing house");
                return false;
            };
            let goal = building.front_door().step(Direction::North);
            match pathfinder.route(world, actor.cell, goal) {
                Ok(path) => {
                    debug!(actor = actor.id.get(), house, steps = path.len(), "visiting");
                    out.push(Command::SetActorPath {
                        actor: actor.id,
                        path,
                    });
                    out.push(Command::SetBehaviour {
                        actor: actor.id,
                        behaviour: Behaviour::Visiting { house },
                    });
                    true
                }
                Err(error) => {
                    warn!(actor = actor.id.get(), house, %error, "no route to neighbour");
                    false
                }
            }
        }
    }
}
