// SPDX-FileCopyrightText: The padio authors
// SPDX-License-Identifier: MPL-2.0

//! Mode handlers shared by the supported devices.
//!
//! The handlers are generic and parameterized by static profile
//! tables of the individual devices.

use crate::{
    sysex::program::{
        DeviceProgram, JoystickAxis, KnobAssignment, KnobMode, PadAssignment, KNOB_COUNT,
        PAD_COUNT, TEMPO_BPM_MAX, TEMPO_BPM_MIN,
    },
    PersistedState,
};

pub mod grid_mixer;
pub mod navigation;
pub mod notepad;
pub mod pad_mixer;
pub mod pattern;

pub use self::{
    grid_mixer::{GridMixerHandler, GridMixerProfile},
    navigation::{NavigationHandler, NavigationProfile},
    notepad::NotePadHandler,
    pad_mixer::{PadMixerHandler, PadMixerProfile},
    pattern::PatternHandler,
};


/// One of the two halves of a 16 pad surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum::Display)]
pub enum Bank {
    #[default]
    A,
    B,
}

impl Bank {
    /// Number of targets per bank.
    pub const SIZE: usize = 8;

    /// Offset of the first target of the bank.
    #[must_use]
    pub const fn offset(self) -> usize {
        match self {
            Self::A => 0,
            Self::B => Self::SIZE,
        }
    }
}

/// Static description of a knob in a [`ProgramLayout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnobLayout {
    pub mode: KnobMode,
    pub cc: u8,
    pub min: u8,
    pub max: u8,
    pub name: &'static str,
}

impl KnobLayout {
    #[must_use]
    pub const fn relative(cc: u8, name: &'static str) -> Self {
        Self {
            mode: KnobMode::Relative,
            cc,
            min: 0,
            max: 127,
            name,
        }
    }

    #[must_use]
    pub const fn absolute(cc: u8, min: u8, max: u8, name: &'static str) -> Self {
        Self {
            mode: KnobMode::Absolute,
            cc,
            min,
            max,
            name,
        }
    }

    fn to_assignment(self) -> KnobAssignment {
        let Self {
            mode,
            cc,
            min,
            max,
            name,
        } = self;
        match mode {
            KnobMode::Absolute => KnobAssignment::absolute(cc, min, max, name),
            KnobMode::Relative => KnobAssignment::relative(cc, name),
        }
    }
}

/// Static part of a device program that is uploaded by a mode.
///
/// The pad notes and the pads channel are taken from the
/// [`PersistedState`] and the tempo from the workstation when
/// building the actual program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramLayout {
    pub name: &'static str,
    /// Control change number of the first pad
    pub pad_cc_start: u8,
    pub knobs: [KnobLayout; KNOB_COUNT],
    pub joystick_x: JoystickAxis,
    pub joystick_y: JoystickAxis,
}

impl ProgramLayout {
    #[must_use]
    pub fn build(&self, state: &PersistedState, tempo: f32) -> DeviceProgram {
        let pads = state
            .pad_notes()
            .iter()
            .zip(0u8..)
            .map(|(note, index)| PadAssignment {
                note: *note,
                program: index,
                cc: self.pad_cc_start.saturating_add(index),
            })
            .collect::<Vec<_>>();
        debug_assert_eq!(PAD_COUNT, pads.len());
        DeviceProgram {
            name: self.name.to_owned(),
            pads_channel: state.pads_channel(),
            tempo_bpm: tempo_bpm(tempo),
            joystick_x: self.joystick_x,
            joystick_y: self.joystick_y,
            pads,
            knobs: self.knobs.iter().copied().map(KnobLayout::to_assignment).collect(),
            ..Default::default()
        }
    }
}

/// Round a tempo into the range that the device accepts.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn tempo_bpm(tempo: f32) -> u16 {
    if !tempo.is_finite() {
        return TEMPO_BPM_MIN;
    }
    tempo
        .round()
        .clamp(f32::from(TEMPO_BPM_MIN), f32::from(TEMPO_BPM_MAX)) as u16
}

/// Apply a number of encoder ticks to a normalized value.
///
/// The value is scaled by 100 and rounded before adding the ticks
/// and clamping to `min..=max` (also scaled by 100). Repeated edits
/// therefore never accumulate rounding errors.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn apply_scaled_delta(value: f32, delta: i32, min: i32, max: i32) -> f32 {
    debug_assert!(min <= max);
    let scaled = if value.is_finite() {
        (value * 100.0).round() as i32
    } else {
        min
    };
    let scaled = scaled.saturating_add(delta).clamp(min, max);
    scaled as f32 / 100.0
}
