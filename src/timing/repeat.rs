// SPDX-FileCopyrightText: The padio authors
// SPDX-License-Identifier: MPL-2.0

use std::time::Duration;

use is_sorted::IsSorted;

use super::{TimeStamp, TimerQueue};

/// Fires each key repeatedly until it is removed.
///
/// A newly added key fires on the next poll and then once per interval.
#[derive(Debug, Clone)]
pub struct IntervalRepeater<K> {
    timers: TimerQueue<K>,
}

impl<K> Default for IntervalRepeater<K> {
    fn default() -> Self {
        Self {
            timers: TimerQueue::default(),
        }
    }
}

impl<K> IntervalRepeater<K>
where
    K: PartialEq + Clone,
{
    #[must_use]
    pub const fn new() -> Self {
        Self {
            timers: TimerQueue::new(),
        }
    }

    /// Start repeating a key, restarting it if already present.
    pub fn add(&mut self, key: K, now: TimeStamp, interval: Duration) {
        self.timers.schedule_repeating(key, now, interval);
    }

    /// Change the interval of a key without resetting its phase.
    pub fn update(&mut self, key: &K, interval: Duration) -> bool {
        self.timers.update_period(key, interval)
    }

    pub fn remove(&mut self, key: &K) -> bool {
        self.timers.cancel(key)
    }

    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.timers.contains(key)
    }

    pub fn clear(&mut self) {
        self.timers.cancel_all();
    }

    pub fn poll(&mut self, now: TimeStamp) -> Vec<K> {
        self.timers.poll(now)
    }
}

/// One-shot tasks that fire once after a delay unless cancelled.
#[derive(Debug, Clone)]
pub struct DelayedTasks<K> {
    timers: TimerQueue<K>,
}

impl<K> Default for DelayedTasks<K> {
    fn default() -> Self {
        Self {
            timers: TimerQueue::default(),
        }
    }
}

impl<K> DelayedTasks<K>
where
    K: PartialEq + Clone,
{
    #[must_use]
    pub const fn new() -> Self {
        Self {
            timers: TimerQueue::new(),
        }
    }

    /// Schedule a task, restarting its delay if already pending.
    pub fn add(&mut self, key: K, now: TimeStamp, delay: Duration) {
        self.timers.schedule_once(key, now, delay);
    }

    /// Replace the remaining delay of a pending task.
    pub fn update(&mut self, key: &K, now: TimeStamp, delay: Duration) -> bool {
        self.timers.reschedule(key, now, delay)
    }

    pub fn cancel(&mut self, key: &K) -> bool {
        self.timers.cancel(key)
    }

    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.timers.contains(key)
    }

    pub fn clear(&mut self) {
        self.timers.cancel_all();
    }

    pub fn poll(&mut self, now: TimeStamp) -> Vec<K> {
        self.timers.poll(now)
    }
}

/// Breakpoint of a [`RepeatSpeedTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepeatSpeed {
    /// Smallest input value that selects this interval
    pub min_value: u8,
    pub interval: Duration,
}

/// Maps the magnitude of a deflection onto a repeat interval.
///
/// Breakpoints are ordered by ascending `min_value`. Values below
/// the first breakpoint do not repeat at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepeatSpeedTable {
    breakpoints: &'static [RepeatSpeed],
}

impl RepeatSpeedTable {
    #[must_use]
    pub const fn new(breakpoints: &'static [RepeatSpeed]) -> Self {
        Self { breakpoints }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        let mut min_values = self.breakpoints.iter().map(|breakpoint| breakpoint.min_value);
        IsSorted::is_sorted(&mut min_values)
    }

    #[must_use]
    pub fn interval_for(&self, value: u8) -> Option<Duration> {
        debug_assert!(self.is_valid());
        self.breakpoints
            .iter()
            .rev()
            .find(|breakpoint| breakpoint.min_value <= value)
            .map(|breakpoint| breakpoint.interval)
    }
}
