// SPDX-FileCopyrightText: The padio authors
// SPDX-License-Identifier: MPL-2.0

use std::time::Duration;

use super::TimeStamp;

/// Classification of a button press by its duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum PressType {
    Short,
    Bold,
    Long,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonTimings {
    /// Releasing after this duration is a bold press
    pub bold: Duration,

    /// Holding for this duration is a long press
    pub long: Duration,
}

impl ButtonTimings {
    pub const DEFAULT: Self = Self {
        bold: Duration::from_millis(300),
        long: Duration::from_millis(2000),
    };

    #[must_use]
    pub fn classify(&self, held: Duration) -> PressType {
        if held < self.bold {
            PressType::Short
        } else if held < self.long {
            PressType::Bold
        } else {
            PressType::Long
        }
    }
}

impl Default for ButtonTimings {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Debug, Clone)]
struct PressedButton<K> {
    key: K,
    pressed_at: TimeStamp,
    long_fired: bool,
}

/// Disambiguates short, bold, and long presses of multiple buttons.
#[derive(Debug, Clone)]
pub struct ButtonTimer<K> {
    timings: ButtonTimings,
    pressed: Vec<PressedButton<K>>,
}

impl<K> Default for ButtonTimer<K>
where
    K: PartialEq + Clone,
{
    fn default() -> Self {
        Self::new(ButtonTimings::DEFAULT)
    }
}

impl<K> ButtonTimer<K>
where
    K: PartialEq + Clone,
{
    #[must_use]
    pub const fn new(timings: ButtonTimings) -> Self {
        Self {
            timings,
            pressed: Vec::new(),
        }
    }

    #[must_use]
    pub const fn timings(&self) -> &ButtonTimings {
        &self.timings
    }

    #[must_use]
    pub fn is_pressed(&self, key: &K) -> bool {
        self.pressed.iter().any(|pressed| &pressed.key == key)
    }

    /// Start tracking a button.
    ///
    /// Pressing a button that is already held restarts it.
    pub fn press(&mut self, key: K, now: TimeStamp) {
        self.pressed.retain(|pressed| pressed.key != key);
        self.pressed.push(PressedButton {
            key,
            pressed_at: now,
            long_fired: false,
        });
    }

    /// Stop tracking a button and classify the press.
    ///
    /// Returns `None` for unknown buttons and for buttons whose
    /// long press has already been reported by [`Self::poll()`].
    pub fn release(&mut self, key: &K, now: TimeStamp) -> Option<PressType> {
        let index = self.pressed.iter().position(|pressed| &pressed.key == key)?;
        let pressed = self.pressed.remove(index);
        if pressed.long_fired {
            return None;
        }
        Some(
            self.timings
                .classify(now.saturating_duration_since(pressed.pressed_at)),
        )
    }

    /// Report each button that has been held past the long threshold.
    ///
    /// Each press is reported at most once.
    pub fn poll(&mut self, now: TimeStamp) -> Vec<K> {
        let long = self.timings.long;
        self.pressed
            .iter_mut()
            .filter(|pressed| {
                !pressed.long_fired && now.saturating_duration_since(pressed.pressed_at) >= long
            })
            .map(|pressed| {
                pressed.long_fired = true;
                pressed.key.clone()
            })
            .collect()
    }

    pub fn cancel_all(&mut self) {
        self.pressed.clear();
    }
}
