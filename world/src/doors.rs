//! Door state machine.

/// Door occupying a single cell of a building wall.
///
/// An open door counts down once per door update and closes itself when the
/// countdown reaches zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Door {
    closed: bool,
    locked: bool,
    timer: u32,
}

impl Door {
    pub(crate) const fn new(locked: bool) -> Self {
        Self {
            closed: true,
            locked,
            timer: 0,
        }
    }

    /// Whether the door currently blocks movement and sight.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.closed
    }

    /// Whether opening the door requires bypassing its lock.
    #[must_use]
    pub const fn is_locked(&self) -> bool {
        self.locked
    }

    /// Door updates left before an open door closes itself.
    #[must_use]
    pub const fn timer(&self) -> u32 {
        self.timer
    }

    pub(crate) fn open(&mut self, close_after: u32) {
        self.closed = false;
        self.timer = close_after;
    }

    pub(crate) fn close(&mut self) {
        self.closed = true;
        self.timer = 0;
    }

    pub(crate) fn unlock(&mut self) {
        self.locked = false;
    }

    /// Counts the timer down, returning `true` when the door closed itself.
    pub(crate) fn tick(&mut self) -> bool {
        if self.closed || self.timer == 0 {
            return false;
        }
        self.timer -= 1;
        if self.timer == 0 {
            self.closed = true;
            return true;
        }
        false
    }
}
