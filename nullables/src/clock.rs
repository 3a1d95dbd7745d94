//! Nullable clock — deterministic time for testing.

use std::cell::Cell;

use agora_types::{Tick, Timestamp};

/// A deterministic pair of time sources for testing.
///
/// The engine runs on two independent clocks: a tick counter for voting
/// windows and a wall timestamp for the timelock. Neither advances unless
/// you tell it to.
pub struct NullClock {
    tick: Cell<u64>,
    secs: Cell<u64>,
}

impl NullClock {
    pub fn new(tick: u64, secs: u64) -> Self {
        Self {
            tick: Cell::new(tick),
            secs: Cell::new(secs),
        }
    }

    /// Current tick.
    pub fn tick(&self) -> Tick {
        Tick::new(self.tick.get())
    }

    /// Current timestamp.
    pub fn now(&self) -> Timestamp {
        Timestamp::new(self.secs.get())
    }

    /// Advance the tick counter.
    pub fn advance_ticks(&self, ticks: u64) {
        self.tick.set(self.tick.get() + ticks);
    }

    /// Advance the timestamp by a number of seconds.
    pub fn advance_secs(&self, secs: u64) {
        self.secs.set(self.secs.get() + secs);
    }

    /// Jump the tick counter to a specific value.
    pub fn set_tick(&self, tick: u64) {
        self.tick.set(tick);
    }

    /// Jump the timestamp to a specific value.
    pub fn set_secs(&self, secs: u64) {
        self.secs.set(secs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clocks_advance_independently() {
        let clock = NullClock::new(5, 1_000);
        clock.advance_ticks(3);
        assert_eq!(clock.tick(), Tick::new(8));
        assert_eq!(clock.now(), Timestamp::new(1_000));
        clock.advance_secs(60);
        assert_eq!(clock.tick(), Tick::new(8));
        assert_eq!(clock.now(), Timestamp::new(1_060));
    }

    #[test]
    fn test_set_jumps() {
        let clock = NullClock::new(0, 0);
        clock.set_tick(100);
        clock.set_secs(50_000);
        assert_eq!(clock.tick(), Tick::new(100));
        assert_eq!(clock.now(), Timestamp::new(50_000));
    }
}
