// SPDX-FileCopyrightText: The padio authors
// SPDX-License-Identifier: MPL-2.0

//! Interpretation of raw 7-bit MIDI values.


/// Center of the 7-bit value range.
pub const U7_MIDPOINT: u8 = 0x40;

pub const U7_MAX: u8 = 0x7f;

/// A simple two-state button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonInput {
    Pressed,
    Released,
}

impl ButtonInput {
    #[must_use]
    pub const fn from_u7(value: u8) -> Self {
        if value == 0 {
            Self::Released
        } else {
            Self::Pressed
        }
    }

    #[must_use]
    pub const fn is_pressed(self) -> bool {
        matches!(self, Self::Pressed)
    }
}

/// A velocity sensitive pad that reports its press strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PadInput {
    pub strength: u8,
}

impl PadInput {
    #[must_use]
    pub const fn from_u7(value: u8) -> Self {
        Self { strength: value }
    }

    #[must_use]
    pub const fn is_pressed(self) -> bool {
        self.strength > 0
    }

    /// Pressed with maximum strength, e.g. when "full level" is enabled.
    #[must_use]
    pub const fn is_full_strength(self) -> bool {
        self.strength >= U7_MAX
    }

    /// Interpret the strength as a boolean switch.
    ///
    /// The hardware reports momentary strength instead of a clean
    /// on/off value, so the decision is made against the midpoint.
    #[must_use]
    pub const fn is_below_midpoint(self) -> bool {
        self.strength < U7_MIDPOINT
    }
}

/// An endless encoder that sends discrete delta values when rotated
/// in CW (positive) or CCW (negative) direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepEncoderInput {
    pub delta: i32,
}

impl StepEncoderInput {
    /// Decode a relative encoder value in "signed bit" notation.
    ///
    /// 1..=63 are CW ticks, 65..=127 are CCW ticks (127 = -1).
    /// 0, 64, and values out of the 7-bit range carry no movement.
    #[must_use]
    pub const fn try_from_u7_relative(value: u8) -> Option<Self> {
        match value {
            1..=0x3f => Some(Self {
                delta: value as i32,
            }),
            0x41..=0x7f => Some(Self {
                delta: value as i32 - 0x80,
            }),
            _ => None,
        }
    }
}

/// A continuous fader.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderInput {
    /// Position in the interval [0, 1]
    pub position: f32,
}

impl SliderInput {
    pub const MIN_POSITION: f32 = 0.0;
    pub const MAX_POSITION: f32 = 1.0;

    #[must_use]
    pub fn from_u7(value: u8) -> Self {
        let position = f32::from(value.min(U7_MAX)) / f32::from(U7_MAX);
        Self { position }
    }
}

/// A continuous fader with a symmetric center position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CenterSliderInput {
    /// Position in the interval [-1, 1]
    pub position: f32,
}

impl CenterSliderInput {
    pub const MIN_POSITION: f32 = -1.0;
    pub const CENTER_POSITION: f32 = 0.0;
    pub const MAX_POSITION: f32 = 1.0;

    /// Both 0 and 1 map onto the minimum to keep 64 centered.
    #[must_use]
    pub fn from_u7(value: u8) -> Self {
        let value = value.clamp(1, U7_MAX);
        let position = (f32::from(value) - f32::from(U7_MIDPOINT)) / f32::from(U7_MAX - U7_MIDPOINT);
        Self { position }
    }
}
