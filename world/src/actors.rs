//! Actor records owned by the world.

use murder_town_core::{ActorId, ActorKind, ActorSnapshot, Behaviour, CellCoord, Route};

#[derive(Clone, Debug)]
pub(crate) struct Actor {
    pub(crate) id: ActorId,
    pub(crate) kind: ActorKind,
    pub(crate) cell: CellCoord,
    pub(crate) alive: bool,
    pub(crate) killer: bool,
    pub(crate) home: Option<u32>,
    pub(crate) behaviour: Behaviour,
    path: Route,
}

impl Actor {
    pub(crate) fn new(id: ActorId, kind: ActorKind, cell: CellCoord, home: Option<u32>) -> Self {
        Self {
            id,
            kind,
            cell,
            alive: true,
            killer: false,
            home,
            behaviour: Behaviour::Wander,
            path: Route::new(),
        }
    }

    pub(crate) fn next_step(&self) -> Option<CellCoord> {
        self.path.front().copied()
    }

    pub(crate) fn assign_path(&mut self, path: Vec<CellCoord>) -> usize {
        self.path = path.into();
        self.path.len()
    }

    pub(crate) fn clear_path(&mut self) {
        self.path.clear();
    }

    /// Moves onto the front of the route, consuming it.
    pub(crate) fn advance(&mut self) -> Option<CellCoord> {
        let next = self.path.pop_front()?;
        self.cell = next;
        Some(next)
    }

    pub(crate) fn kill(&mut self) {
        self.alive = false;
        self.behaviour = Behaviour::Dead;
        self.path.clear();
    }

    pub(crate) fn snapshot(&self) -> ActorSnapshot {
        ActorSnapshot {
            id: self.id,
            kind: self.kind,
            cell: self.cell,
            alive: self.alive,
            killer: self.killer,
            home: self.home,
            behaviour: self.behaviour,
            next_step: self.next_step(),
            remaining_path: self.path.len(),
        }
    }
}
