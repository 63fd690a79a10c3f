// SPDX-FileCopyrightText: The padio authors
// SPDX-License-Identifier: MPL-2.0

use std::time::Duration;

use super::TimeStamp;
use crate::StepEncoderInput;

/// Speeds up knobs that are turned quickly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnobAcceleration {
    /// Maximum time between two feeds that continues a fast turn
    pub window: Duration,

    /// Upper bound for the delta multiplier
    pub max_multiplier: i32,
}

impl KnobAcceleration {
    pub const DEFAULT: Self = Self {
        window: Duration::from_millis(40),
        max_multiplier: 4,
    };

    fn multiplier(&self, streak: u32) -> i32 {
        let boost = i32::try_from(streak / 2).unwrap_or(i32::MAX);
        boost.saturating_add(1).min(self.max_multiplier.max(1))
    }
}

impl Default for KnobAcceleration {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct KnobState {
    pending: i32,
    last_feed: Option<TimeStamp>,
    streak: u32,
}

/// Smooths and accelerates relative encoder ticks per control.
///
/// Ticks are accumulated until the number of steps for the current
/// (shifted or normal) state has been reached. Turning in the opposite
/// direction discards the accumulated ticks.
#[derive(Debug, Clone)]
pub struct KnobSpeedControl<K> {
    steps_normal: u32,
    steps_shifted: u32,
    acceleration: Option<KnobAcceleration>,
    knobs: Vec<(K, KnobState)>,
}

impl<K> Default for KnobSpeedControl<K> {
    fn default() -> Self {
        Self {
            steps_normal: 1,
            steps_shifted: 8,
            acceleration: Some(KnobAcceleration::DEFAULT),
            knobs: Vec::new(),
        }
    }
}

impl<K> KnobSpeedControl<K>
where
    K: PartialEq,
{
    #[must_use]
    pub const fn new(
        steps_normal: u32,
        steps_shifted: u32,
        acceleration: Option<KnobAcceleration>,
    ) -> Self {
        Self {
            steps_normal,
            steps_shifted,
            acceleration,
            knobs: Vec::new(),
        }
    }

    /// Feed a raw 7-bit relative encoder value.
    ///
    /// Returns `None` if the value carries no movement or if the
    /// movement has been absorbed by the step threshold.
    pub fn feed(&mut self, key: K, value: u8, now: TimeStamp, shifted: bool) -> Option<i32> {
        let delta = StepEncoderInput::try_from_u7_relative(value)?.delta;
        let steps = if shifted {
            self.steps_shifted
        } else {
            self.steps_normal
        }
        .max(1);
        let window = self.acceleration.map(|acceleration| acceleration.window);
        let state = self.state_mut(key);
        let same_direction = state.pending == 0 || state.pending.signum() == delta.signum();
        let continued = state.last_feed.is_some_and(|last_feed| {
            window.is_some_and(|window| now.saturating_duration_since(last_feed) <= window)
        });
        state.streak = if continued && same_direction {
            state.streak.saturating_add(1)
        } else {
            0
        };
        state.last_feed = Some(now);
        if !same_direction {
            state.pending = 0;
        }
        state.pending = state.pending.saturating_add(delta);
        if state.pending.unsigned_abs() < steps {
            return None;
        }
        state.pending = 0;
        let streak = state.streak;
        let multiplier = self
            .acceleration
            .map_or(1, |acceleration| acceleration.multiplier(streak));
        Some(delta.saturating_mul(multiplier))
    }

    /// Forget all accumulated ticks.
    pub fn reset(&mut self) {
        self.knobs.clear();
    }

    fn state_mut(&mut self, key: K) -> &mut KnobState {
        let index = if let Some(index) = self.knobs.iter().position(|(other, _)| *other == key) {
            index
        } else {
            self.knobs.push((key, KnobState::default()));
            self.knobs.len() - 1
        };
        &mut self.knobs[index].1
    }
}
