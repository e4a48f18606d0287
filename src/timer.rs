use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// The delay and sound timers count down at 60Hz
pub const TIMER_HZ: u32 = 60;
pub const TICK_INTERVAL: Duration = Duration::from_nanos(1_000_000_000 / TIMER_HZ as u64);

/// Source of wall-clock time for the timers. Swapped out in tests so decay
/// can be driven deterministically.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// the real monotonic clock
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to. Clones share the same time, so a test
/// can keep one handle and give the other to an interpreter.
#[derive(Clone, Debug)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        ManualClock {
            now: Rc::new(Cell::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

/// The two countdown timers plus the reference point of their last tick.
#[derive(Clone, Debug)]
pub struct Timers {
    pub delay: u8,
    pub sound: u8,
    last_tick: Instant,
}

impl Timers {
    pub fn new(now: Instant) -> Self {
        Timers {
            delay: 0,
            sound: 0,
            last_tick: now,
        }
    }

    /// Catch up with `now`, one whole interval at a time. The reference point
    /// advances by exactly one interval per tick, so a stalled caller gets
    /// every tick it missed and the remainder carries over to the next call.
    ///
    /// Returns the number of ticks that fired.
    pub fn tick(&mut self, now: Instant) -> u32 {
        let mut ticks = 0;
        while now.saturating_duration_since(self.last_tick) >= TICK_INTERVAL {
            self.delay = self.delay.saturating_sub(1);
            self.sound = self.sound.saturating_sub(1);
            self.last_tick += TICK_INTERVAL;
            ticks += 1;
        }
        ticks
    }
}
