//! Turn counter that drives the in-game clock.

use murder_town_core::ClockTime;

/// Advances the displayed minute once every `turns_per_minute + 1` turns,
/// so the first tick after creation rolls the starting minute over.
#[derive(Clone, Debug)]
pub(crate) struct Clock {
    time: ClockTime,
    turns_per_minute: u32,
    turns_left: u32,
}

impl Clock {
    pub(crate) const fn new(time: ClockTime, turns_per_minute: u32) -> Self {
        Self {
            time,
            turns_per_minute,
            turns_left: 0,
        }
    }

    pub(crate) const fn time(&self) -> ClockTime {
        self.time
    }

    /// Returns `true` when the minute changed.
    pub(crate) fn advance(&mut self) -> bool {
        if self.turns_left == 0 {
            self.time = self.time.plus_minutes(1);
            self.turns_left = self.turns_per_minute;
            true
        } else {
            self.turns_left -= 1;
            false
        }
    }
}
