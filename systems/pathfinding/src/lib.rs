#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Weighted A* search over the four-connected cell grid.
//!
//! Every step costs one. The heuristic is scaled by a factor slightly above
//! one by default, which breaks ties toward straighter routes at the price of
//! strict optimality. Open-set entries are never updated in place: improved
//! entries are pushed again and stale ones are skipped when popped.

use std::{
    cmp::Ordering,
    collections::{BinaryHeap, HashMap, HashSet},
};

use murder_town_core::{
    config::{Heuristic, PathfindingConfig},
    CellCoord, CellRect, PathError,
};
use murder_town_world::{query, World};
use tracing::trace;

/// Reusable A* search state.
#[derive(Debug)]
pub struct Pathfinder {
    heuristic: Heuristic,
    scale: f64,
    max_iterations: u32,
    open: BinaryHeap<OpenNode>,
    costs: HashMap<CellCoord, u32>,
    parents: HashMap<CellCoord, CellCoord>,
    closed: HashSet<CellCoord>,
}

impl Pathfinder {
    /// Creates a pathfinder using the provided tuning.
    #[must_use]
    pub fn new(config: &PathfindingConfig) -> Self {
        Self {
            heuristic: config.heuristic,
            scale: config.heuristic_scale,
            max_iterations: config.max_iterations,
            open: BinaryHeap::new(),
            costs: HashMap::new(),
            parents: HashMap::new(),
            closed: HashSet::new(),
        }
    }

    /// Finds a route through the world, avoiding walls and fences.
    ///
    /// Doors are routable whether or not they are closed.
    pub fn route(
        &mut self,
        world: &World,
        origin: CellCoord,
        goal: CellCoord,
    ) -> Result<Vec<CellCoord>, PathError> {
        let bounds = query::bounds(world);
        self.find_path(origin, goal, Some(bounds), |cell| {
            query::blocks_routes(world, cell)
        })
    }

    /// Finds a route from `origin` to `goal`.
    ///
    /// The returned cells exclude `origin` and end with `goal`; an empty route
    /// means the two coincide. When `bounds` is provided, cells outside it are
    /// treated as blocked.
    pub fn find_path<F>(
        &mut self,
        origin: CellCoord,
        goal: CellCoord,
        bounds: Option<CellRect>,
        is_blocked: F,
    ) -> Result<Vec<CellCoord>, PathError>
    where
        F: Fn(CellCoord) -> bool,
    {
        if origin == goal {
            return Ok(Vec::new());
        }
        let passable =
            |cell: CellCoord| bounds.map_or(true, |rect| rect.contains(cell)) && !is_blocked(cell);
        if !passable(goal) {
            return Err(PathError::Unreachable);
        }

        self.open.clear();
        self.costs.clear();
        self.parents.clear();
        self.closed.clear();

        let mut sequence = 0_u64;
        let _ = self.costs.insert(origin, 0);
        self.open.push(OpenNode {
            estimate: self.estimate(origin, goal),
            sequence,
            cell: origin,
        });

        let mut iterations = 0_u32;
        while let Some(node) = self.open.pop() {
            if !self.closed.insert(node.cell) {
                continue;
            }
            if node.cell == goal {
                trace!(iterations, "route found");
                return Ok(self.reconstruct(origin, goal));
            }
            if iterations >= self.max_iterations {
                return Err(PathError::SearchExhausted { iterations });
            }
            iterations += 1;

            let cost = self.costs.get(&node.cell).copied().unwrap_or(u32::MAX);
            for neighbour in node.cell.neighbors() {
                if self.closed.contains(&neighbour) || !passable(neighbour) {
                    continue;
                }
                let tentative = cost.saturating_add(1);
                if self
                    .costs
                    .get(&neighbour)
                    .is_some_and(|&known| known <= tentative)
                {
                    continue;
                }
                let _ = self.costs.insert(neighbour, tentative);
                let _ = self.parents.insert(neighbour, node.cell);
                sequence += 1;
                self.open.push(OpenNode {
                    estimate: f64::from(tentative) + self.estimate(neighbour, goal),
                    sequence,
                    cell: neighbour,
                });
            }
        }

        Err(PathError::Unreachable)
    }

    fn estimate(&self, from: CellCoord, goal: CellCoord) -> f64 {
        self.heuristic.estimate(from, goal) * self.scale
    }

    fn reconstruct(&self, origin: CellCoord, goal: CellCoord) -> Vec<CellCoord> {
        let mut route = vec![goal];
        let mut cell = goal;
        while let Some(&parent) = self.parents.get(&cell) {
            if parent == origin {
                break;
            }
            route.push(parent);
            cell = parent;
        }
        route.reverse();
        route
    }
}

impl Default for Pathfinder {
    fn default() -> Self {
        Self::new(&PathfindingConfig::default())
    }
}

/// Open-set entry ordered so the heap pops the lowest estimate first, and
/// the earliest pushed entry among equal estimates.
#[derive(Clone, Copy, Debug)]
struct OpenNode {
    estimate: f64,
    sequence: u64,
    cell: CellCoord,
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .estimate
            .total_cmp(&self.estimate)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenNode {}
