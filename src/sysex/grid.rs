// SPDX-FileCopyrightText: The padio authors
// SPDX-License-Identifier: MPL-2.0

//! Commands for the Novation Launchpad Mini mk3 grid controller.

use strum::FromRepr;

use super::{check_range, frame, Error, Result};
use crate::{
    midi::{control_change_message, note_on_message},
    LedColor, LedMode,
};

pub const HEADER: [u8; 5] = [0x00, 0x20, 0x29, 0x02, 0x0d];

pub const MAX_FADERS: usize = 8;

/// Color of faders without an explicit color.
pub const DEFAULT_FADER_COLOR: LedColor = LedColor::new(0x25);

const CMD_SELECT_LAYOUT: u8 = 0x00;
const CMD_SETUP_FADERS: u8 = 0x01;
const CMD_LEDS_ENABLED: u8 = 0x09;
const CMD_DAW_MODE: u8 = 0x10;
const CMD_DAW_CLEAR: u8 = 0x12;

/// LED ids of the top row exceed this value.
const LED_TOP_ROW_MIN: u8 = 89;

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr)]
#[repr(u8)]
pub enum Layout {
    Session = 0x00,
    Drums = 0x04,
    Keys = 0x05,
    User = 0x06,
    Faders = 0x0d,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromRepr)]
#[repr(u8)]
pub enum FaderOrientation {
    #[default]
    Vertical = 0,
    Horizontal = 1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fader {
    pub cc: u8,
    pub bipolar: bool,
    pub color: LedColor,
}

impl Fader {
    #[must_use]
    pub const fn unipolar(cc: u8) -> Self {
        Self {
            cc,
            bipolar: false,
            color: DEFAULT_FADER_COLOR,
        }
    }

    #[must_use]
    pub const fn bipolar(cc: u8) -> Self {
        Self {
            cc,
            bipolar: true,
            color: DEFAULT_FADER_COLOR,
        }
    }

    #[must_use]
    pub const fn with_color(self, color: LedColor) -> Self {
        Self { color, ..self }
    }
}

fn command(cmd: u8, params: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(HEADER.len() + 1 + params.len());
    body.extend_from_slice(&HEADER);
    body.push(cmd);
    body.extend_from_slice(params);
    frame(&body)
}

#[must_use]
pub fn select_layout(layout: Layout) -> Vec<u8> {
    command(CMD_SELECT_LAYOUT, &[layout as u8])
}

#[must_use]
pub fn set_daw_mode(enabled: bool) -> Vec<u8> {
    command(CMD_DAW_MODE, &[u8::from(enabled)])
}

/// Clear session, drum, and CC state of the DAW mode.
#[must_use]
pub fn clear_daw_state() -> Vec<u8> {
    command(CMD_DAW_CLEAR, &[0x01, 0x00, 0x01])
}

#[must_use]
pub fn set_leds_enabled(enabled: bool) -> Vec<u8> {
    command(CMD_LEDS_ENABLED, &[u8::from(enabled)])
}

/// Configure the fader bank.
///
/// Empty slots occupy no fader on the device. More than
/// [`MAX_FADERS`] slots are rejected.
pub fn setup_faders(orientation: FaderOrientation, faders: &[Option<Fader>]) -> Result<Vec<u8>> {
    if faders.len() > MAX_FADERS {
        return Err(Error::TooManyFaders {
            count: faders.len(),
        });
    }
    let mut params = Vec::with_capacity(2 + faders.len() * 4);
    params.extend_from_slice(&[0x00, orientation as u8]);
    for (index, fader) in faders.iter().enumerate() {
        let Some(fader) = fader else {
            continue;
        };
        #[allow(clippy::cast_possible_truncation)]
        let index = index as u8;
        let cc = check_range(format!("faders[{index}].cc"), fader.cc, 0, 127)?;
        params.extend_from_slice(&[
            index,
            u8::from(fader.bipolar),
            cc,
            fader.color.to_u7(),
        ]);
    }
    Ok(command(CMD_SETUP_FADERS, &params))
}

/// Light a single LED of the grid.
///
/// Pads are addressed by note, the buttons of the top row and of
/// the right column by control change.
#[must_use]
pub fn led_message(led: u8, color: LedColor, mode: LedMode) -> [u8; 3] {
    let channel = mode as u8;
    if led >= LED_TOP_ROW_MIN || (led >= 10 && led % 10 == 9) {
        control_change_message(channel, led, color.to_u7())
    } else {
        note_on_message(channel, led, color.to_u7())
    }
}

/// Frequently used entries of the color palette.
pub mod palette {
    use crate::LedColor;

    pub const RED: LedColor = LedColor::new(0x05);
    pub const ORANGE: LedColor = LedColor::new(0x09);
    pub const YELLOW: LedColor = LedColor::new(0x0d);
    pub const GREEN: LedColor = LedColor::new(0x15);
    pub const BLUE_SKY: LedColor = LedColor::new(0x24);
    pub const AQUA: LedColor = LedColor::new(0x25);
    pub const BLUE: LedColor = LedColor::new(0x29);
    pub const BLUE_DARK: LedColor = LedColor::new(0x2d);
    pub const PURPLE: LedColor = LedColor::new(0x31);
    pub const GREEN_YELLOW: LedColor = LedColor::new(0x4a);
    pub const LIME: LedColor = LedColor::new(0x4b);
    pub const AMBER: LedColor = LedColor::new(0x53);
    pub const LOGO: LedColor = LedColor::new(0x63);
    pub const WHITE: LedColor = LedColor::new(0x77);
}
