#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Recursive shadowcasting field of view.
//!
//! The eight octants around the observer are scanned row by row outward.
//! Walls and closed doors cast shadows; when a scan meets the first opaque
//! cell of a run it queues a narrower child scan for the rows beyond, so the
//! recursion lives on an explicit work list rather than the call stack. Scans
//! stop at the sight radius, which bounds a square around the observer.

use murder_town_core::{config::VisibilityConfig, CellCoord, CellRect, Command};
use murder_town_world::{query, World};

/// Octant transforms as `(xx, xy, yx, yy)`, mapping scan offsets to columns and rows.
const OCTANTS: [[i32; 4]; 8] = [
    [1, 0, 0, 1],
    [0, 1, 1, 0],
    [0, -1, 1, 0],
    [-1, 0, 0, 1],
    [-1, 0, 0, -1],
    [0, -1, -1, 0],
    [0, 1, -1, 0],
    [1, 0, 0, -1],
];

#[derive(Clone, Copy, Debug)]
struct Scan {
    row: u32,
    start: f64,
    end: f64,
}

/// Pure system that computes the player's visible cells.
#[derive(Debug)]
pub struct Visibility {
    radius: u32,
    scans: Vec<Scan>,
}

impl Visibility {
    /// Creates a field of view reaching `radius` cells from the observer.
    #[must_use]
    pub fn new(radius: u32) -> Self {
        Self {
            radius,
            scans: Vec::new(),
        }
    }

    /// Creates a field of view from configuration, defaulting the radius to the map width.
    #[must_use]
    pub fn from_config(config: &VisibilityConfig, map_columns: u32) -> Self {
        Self::new(config.radius.unwrap_or(map_columns))
    }

    /// Sight radius in cells.
    #[must_use]
    pub const fn radius(&self) -> u32 {
        self.radius
    }

    /// Computes the player's view and emits the visibility update.
    pub fn handle(&mut self, world: &World, observer: CellCoord, out: &mut Vec<Command>) {
        let mut visible = Vec::new();
        self.compute(
            observer,
            query::bounds(world),
            |cell| query::is_opaque(world, cell),
            &mut visible,
        );
        out.push(Command::UpdateVisibility { visible });
    }

    /// Collects every in-bounds cell visible from `observer`, sorted and deduplicated.
    ///
    /// The observer's own cell is always visible.
    pub fn compute<F>(
        &mut self,
        observer: CellCoord,
        bounds: CellRect,
        is_opaque: F,
        out: &mut Vec<CellCoord>,
    ) where
        F: Fn(CellCoord) -> bool,
    {
        out.clear();
        if bounds.contains(observer) {
            out.push(observer);
        }

        for [xx, xy, yx, yy] in OCTANTS {
            self.scans.push(Scan {
                row: 1,
                start: 1.0,
                end: 0.0,
            });
            while let Some(scan) = self.scans.pop() {
                self.cast(observer, scan, [xx, xy, yx, yy], bounds, &is_opaque, out);
            }
        }

        out.sort_unstable();
        out.dedup();
    }

    fn cast<F>(
        &mut self,
        observer: CellCoord,
        scan: Scan,
        [xx, xy, yx, yy]: [i32; 4],
        bounds: CellRect,
        is_opaque: &F,
        out: &mut Vec<CellCoord>,
    ) where
        F: Fn(CellCoord) -> bool,
    {
        let Scan { row, mut start, end } = scan;
        if start < end {
            return;
        }

        let mut next_start = start;
        for distance in row..=self.radius {
            let Ok(depth) = i32::try_from(distance) else {
                break;
            };
            let dy = -depth;
            let mut blocked = false;
            for dx in dy..=0 {
                let left = (f64::from(dx) - 0.5) / (f64::from(dy) + 0.5);
                let right = (f64::from(dx) + 0.5) / (f64::from(dy) - 0.5);
                if start < right {
                    continue;
                }
                if end > left {
                    break;
                }

                let cell = observer.offset(dx * yx + dy * yy, dx * xx + dy * xy);
                if bounds.contains(cell) {
                    out.push(cell);
                }

                let opaque = is_opaque(cell);
                if blocked {
                    if opaque {
                        next_start = right;
                        continue;
                    }
                    blocked = false;
                    start = next_start;
                } else if opaque && distance < self.radius {
                    blocked = true;
                    self.scans.push(Scan {
                        row: distance + 1,
                        start,
                        end: left,
                    });
                    next_start = right;
                }
            }
            if blocked {
                break;
            }
        }
    }
}
