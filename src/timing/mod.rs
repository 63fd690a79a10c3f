// SPDX-FileCopyrightText: The padio authors
// SPDX-License-Identifier: MPL-2.0

//! Timers driven by explicitly passed time stamps.
//!
//! Nothing in this module reads a clock. The owner advances time by
//! passing the current [`TimeStamp`] into each call and collects due
//! timers with `poll()`. Tests simply pass virtual time stamps.

use std::{
    fmt,
    ops::Add,
    time::{Duration, Instant},
};

mod button;
pub use self::button::{ButtonTimer, ButtonTimings, PressType};

mod knob;
pub use self::knob::{KnobAcceleration, KnobSpeedControl};

mod repeat;
pub use self::repeat::{DelayedTasks, IntervalRepeater, RepeatSpeed, RepeatSpeedTable};


/// Time stamp with microsecond precision.
///
/// Only differences between time stamps are meaningful, the origin
/// is arbitrary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeStamp(u64);

impl TimeStamp {
    #[must_use]
    pub const fn from_micros(micros: u64) -> Self {
        Self(micros)
    }

    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis.saturating_mul(1_000))
    }

    #[must_use]
    pub const fn to_micros(self) -> u64 {
        self.0
    }

    /// Elapsed time since an earlier time stamp.
    ///
    /// Returns [`Duration::ZERO`] if `earlier` is actually later.
    #[must_use]
    pub const fn saturating_duration_since(self, earlier: Self) -> Duration {
        Duration::from_micros(self.0.saturating_sub(earlier.0))
    }
}

impl Add<Duration> for TimeStamp {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self {
        Self(self.0.saturating_add(duration_as_micros(rhs)))
    }
}

impl fmt::Display for TimeStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.0 / 1_000_000;
        let micros = self.0 % 1_000_000;
        write!(f, "{secs}.{micros:06}")
    }
}

/// Monotonic wall clock that produces [`TimeStamp`]s.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    origin: Instant,
}

impl Clock {
    #[must_use]
    pub fn start() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    #[must_use]
    pub fn now(&self) -> TimeStamp {
        TimeStamp::from_micros(duration_as_micros(self.origin.elapsed()))
    }
}

#[derive(Debug, Clone, Copy)]
struct Timer {
    due: TimeStamp,
    period: Option<Duration>,
}

/// Keyed registry of one-shot and repeating timers.
///
/// Each key owns at most one timer. Scheduling an existing key
/// replaces its timer. Cancelling a key only removes future firings.
#[derive(Debug, Clone)]
pub struct TimerQueue<K> {
    timers: Vec<(K, Timer)>,
}

impl<K> Default for TimerQueue<K> {
    fn default() -> Self {
        Self { timers: Vec::new() }
    }
}

impl<K> TimerQueue<K>
where
    K: PartialEq + Clone,
{
    #[must_use]
    pub const fn new() -> Self {
        Self { timers: Vec::new() }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.timers.len()
    }

    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.position(key).is_some()
    }

    /// The earliest pending due time.
    #[must_use]
    pub fn next_due(&self) -> Option<TimeStamp> {
        self.timers.iter().map(|(_, timer)| timer.due).min()
    }

    pub fn schedule_once(&mut self, key: K, now: TimeStamp, delay: Duration) {
        self.insert(
            key,
            Timer {
                due: now + delay,
                period: None,
            },
        );
    }

    /// Schedule a repeating timer that first fires at `first_due`.
    pub fn schedule_repeating(&mut self, key: K, first_due: TimeStamp, period: Duration) {
        self.insert(
            key,
            Timer {
                due: first_due,
                period: Some(period),
            },
        );
    }

    /// Move the next firing of an existing timer to `now + delay`.
    pub fn reschedule(&mut self, key: &K, now: TimeStamp, delay: Duration) -> bool {
        let Some(index) = self.position(key) else {
            return false;
        };
        self.timers[index].1.due = now + delay;
        true
    }

    /// Change the period of a repeating timer.
    ///
    /// The time that has already elapsed since the last firing is
    /// preserved, i.e. the phase is not reset.
    pub fn update_period(&mut self, key: &K, period: Duration) -> bool {
        let Some(index) = self.position(key) else {
            return false;
        };
        let timer = &mut self.timers[index].1;
        let Some(old_period) = timer.period else {
            return false;
        };
        let last_fired = TimeStamp::from_micros(
            timer
                .due
                .to_micros()
                .saturating_sub(duration_as_micros(old_period)),
        );
        timer.due = last_fired + period;
        timer.period = Some(period);
        true
    }

    pub fn cancel(&mut self, key: &K) -> bool {
        let Some(index) = self.position(key) else {
            return false;
        };
        self.timers.remove(index);
        true
    }

    pub fn cancel_all(&mut self) {
        self.timers.clear();
    }

    /// Collect all timers that are due at `now`.
    ///
    /// Keys are returned in the order of their due times. One-shot
    /// timers are removed. Repeating timers fire at most once per
    /// poll and skip missed ticks instead of catching up.
    pub fn poll(&mut self, now: TimeStamp) -> Vec<K> {
        let mut due = self
            .timers
            .iter()
            .filter(|(_, timer)| timer.due <= now)
            .map(|(key, timer)| (timer.due, key.clone()))
            .collect::<Vec<_>>();
        if due.is_empty() {
            return Vec::new();
        }
        due.sort_by_key(|(due, _)| *due);
        self.timers.retain_mut(|(_, timer)| {
            if timer.due > now {
                return true;
            }
            let Some(period) = timer.period else {
                return false;
            };
            let next_due = timer.due + period;
            timer.due = if next_due > now {
                next_due
            } else {
                now + period
            };
            true
        });
        due.into_iter().map(|(_, key)| key).collect()
    }

    fn position(&self, key: &K) -> Option<usize> {
        self.timers.iter().position(|(other, _)| other == key)
    }

    fn insert(&mut self, key: K, timer: Timer) {
        if let Some(index) = self.position(&key) {
            self.timers[index].1 = timer;
        } else {
            self.timers.push((key, timer));
        }
    }
}

fn duration_as_micros(duration: Duration) -> u64 {
    u64::try_from(duration.as_micros()).unwrap_or(u64::MAX)
}
