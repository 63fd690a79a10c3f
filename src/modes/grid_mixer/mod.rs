// SPDX-FileCopyrightText: The padio authors
// SPDX-License-Identifier: MPL-2.0

//! Mixer strips on the pad grid of a grid controller.
//!
//! The bottom row of pads addresses 8 chains of the active bank.
//! Function buttons select what the pads do. Volume and pan switch
//! the device into its fader layout.

use float_cmp::approx_eq;

use super::Bank;
use crate::{
    app::ChainInfo,
    controller::{Context, Mode, ModeHandler},
    midi::control_change_message,
    sysex::grid::{self, palette, Fader, FaderOrientation, Layout},
    ButtonInput, CenterSliderInput, LedColor, LedMode, OutputResult, SliderInput, U7_MAX,
    U7_MIDPOINT,
};

/// Function of the track pads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum::Display)]
pub enum GridFunction {
    #[default]
    Select,
    Volume,
    Pan,
    Mute,
    Solo,
}

impl GridFunction {
    #[must_use]
    pub const fn uses_faders(self) -> bool {
        matches!(self, Self::Volume | Self::Pan)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionButton {
    pub cc: u8,
    pub function: GridFunction,
    /// Color while active
    pub color: LedColor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridMixerProfile {
    pub function_buttons: &'static [FunctionButton],
    /// Control changes that select bank A and B
    pub bank_buttons: [u8; 2],
    /// Note of the first track pad
    pub track_note_start: u8,
    /// Control change of the first fader
    pub fader_cc_start: u8,
    /// Channel for sending fader values to the device
    pub fader_channel: u8,
    pub logo: u8,
    pub logo_color: LedColor,
}

impl GridMixerProfile {
    fn track(&self, note: u8) -> Option<usize> {
        let index = usize::from(note.checked_sub(self.track_note_start)?);
        (index < Bank::SIZE).then_some(index)
    }

    fn fader(&self, controller: u8) -> Option<usize> {
        let index = usize::from(controller.checked_sub(self.fader_cc_start)?);
        (index < Bank::SIZE).then_some(index)
    }

    fn bank(&self, controller: u8) -> Option<Bank> {
        let [bank_a, bank_b] = self.bank_buttons;
        if controller == bank_a {
            Some(Bank::A)
        } else if controller == bank_b {
            Some(Bank::B)
        } else {
            None
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn level_to_u7(level: f32) -> u8 {
    (level.clamp(0.0, 1.0) * f32::from(U7_MAX)).round() as u8
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn balance_to_u7(balance: f32) -> u8 {
    let max = f32::from(U7_MAX - U7_MIDPOINT);
    (balance.clamp(-1.0, 1.0) * max + f32::from(U7_MIDPOINT))
        .round()
        .clamp(0.0, f32::from(U7_MAX)) as u8
}

#[derive(Debug)]
pub struct GridMixerHandler {
    profile: &'static GridMixerProfile,
    function: GridFunction,
    bank: Bank,
}

impl GridMixerHandler {
    #[must_use]
    pub const fn new(profile: &'static GridMixerProfile) -> Self {
        Self {
            profile,
            function: GridFunction::Select,
            bank: Bank::A,
        }
    }

    #[must_use]
    pub const fn function(&self) -> GridFunction {
        self.function
    }

    #[must_use]
    pub const fn bank(&self) -> Bank {
        self.bank
    }

    fn chain(&self, ctx: &Context<'_>, track: usize) -> Option<ChainInfo> {
        let index = track + self.bank.offset();
        let chain = ctx.app.chain_by_index(index).filter(|chain| !chain.is_main());
        if chain.is_none() {
            log::debug!("No chain at index {index}");
        }
        chain
    }

    fn set_function(&mut self, ctx: &mut Context<'_>, function: GridFunction) -> OutputResult<()> {
        let old_function = self.function;
        log::debug!("Grid function: {old_function} -> {function}");
        self.function = function;
        if function.uses_faders() {
            self.setup_faders(ctx)?;
        } else if old_function.uses_faders() {
            ctx.send(&grid::select_layout(Layout::Session))?;
        }
        self.refresh_leds(ctx)
    }

    fn setup_faders(&self, ctx: &mut Context<'_>) -> OutputResult<()> {
        let bipolar = self.function == GridFunction::Pan;
        let color = self.function_color();
        let faders = (0..Bank::SIZE)
            .zip(self.profile.fader_cc_start..)
            .map(|(track, cc)| {
                self.chain(ctx, track).map(|_| {
                    let fader = if bipolar {
                        Fader::bipolar(cc)
                    } else {
                        Fader::unipolar(cc)
                    };
                    fader.with_color(color)
                })
            })
            .collect::<Vec<_>>();
        ctx.send(&grid::setup_faders(FaderOrientation::Vertical, &faders)?)?;
        ctx.send(&grid::select_layout(Layout::Faders))?;
        self.send_fader_values(ctx)
    }

    fn send_fader_values(&self, ctx: &mut Context<'_>) -> OutputResult<()> {
        for (track, cc) in (0..Bank::SIZE).zip(self.profile.fader_cc_start..) {
            let Some(chain) = self.chain(ctx, track) else {
                continue;
            };
            let value = match self.function {
                GridFunction::Volume => level_to_u7(ctx.app.level(chain.mixer_channel)),
                GridFunction::Pan => balance_to_u7(ctx.app.balance(chain.mixer_channel)),
                GridFunction::Select | GridFunction::Mute | GridFunction::Solo => return Ok(()),
            };
            ctx.send(&control_change_message(self.profile.fader_channel, cc, value))?;
        }
        Ok(())
    }

    fn function_color(&self) -> LedColor {
        self.profile
            .function_buttons
            .iter()
            .find(|button| button.function == self.function)
            .map_or(palette::WHITE, |button| button.color)
    }

    fn refresh_leds(&self, ctx: &mut Context<'_>) -> OutputResult<()> {
        if !ctx.active {
            return Ok(());
        }
        ctx.send(&grid::clear_daw_state())?;
        ctx.set_led(self.profile.logo, self.profile.logo_color, LedMode::Static)?;
        for button in self.profile.function_buttons {
            let color = if button.function == self.function {
                button.color
            } else {
                palette::WHITE
            };
            ctx.set_led(button.cc, color, LedMode::Static)?;
        }
        for (bank, id) in [Bank::A, Bank::B].into_iter().zip(self.profile.bank_buttons) {
            let color = if bank == self.bank {
                palette::WHITE
            } else {
                palette::BLUE_DARK
            };
            ctx.set_led(id, color, LedMode::Static)?;
        }
        if !self.function.uses_faders() {
            self.refresh_track_leds(ctx)?;
        }
        Ok(())
    }

    fn refresh_track_leds(&self, ctx: &mut Context<'_>) -> OutputResult<()> {
        let active_chain = ctx.app.active_chain();
        for (track, note) in (0..Bank::SIZE).zip(self.profile.track_note_start..) {
            let Some(chain) = self.chain(ctx, track) else {
                ctx.led_off(note)?;
                continue;
            };
            let (enabled, color) = match self.function {
                GridFunction::Mute => (ctx.app.mute(chain.mixer_channel), palette::RED),
                GridFunction::Solo => (ctx.app.solo(chain.mixer_channel), palette::YELLOW),
                GridFunction::Select | GridFunction::Volume | GridFunction::Pan => {
                    (active_chain == Some(chain.id), palette::GREEN)
                }
            };
            let color = if enabled { color } else { palette::AQUA };
            ctx.set_led(note, color, LedMode::Static)?;
        }
        Ok(())
    }

    fn on_track(&mut self, ctx: &mut Context<'_>, track: usize) -> OutputResult<()> {
        let Some(chain) = self.chain(ctx, track) else {
            return Ok(());
        };
        let channel = chain.mixer_channel;
        match self.function {
            GridFunction::Select => {
                log::debug!("Selecting chain {id}", id = chain.id);
                ctx.app.set_active_chain(chain.id);
            }
            GridFunction::Mute => {
                let mute = !ctx.app.mute(channel);
                log::debug!("Mute of chain {id}: {mute}", id = chain.id);
                ctx.app.set_mute(channel, mute);
            }
            GridFunction::Solo => {
                let solo = !ctx.app.solo(channel);
                log::debug!("Solo of chain {id}: {solo}", id = chain.id);
                ctx.app.set_solo(channel, solo);
            }
            GridFunction::Volume | GridFunction::Pan => {
                // Covered by the faders
                return Ok(());
            }
        }
        self.refresh_track_leds(ctx)
    }

    fn on_fader(&self, ctx: &mut Context<'_>, track: usize, value: u8) {
        let Some(chain) = self.chain(ctx, track) else {
            return;
        };
        let channel = chain.mixer_channel;
        match self.function {
            GridFunction::Volume => {
                let SliderInput { position } = SliderInput::from_u7(value);
                if !approx_eq!(f32, ctx.app.level(channel), position, ulps = 2) {
                    ctx.app.set_level(channel, position);
                }
            }
            GridFunction::Pan => {
                let CenterSliderInput { position } = CenterSliderInput::from_u7(value);
                if !approx_eq!(f32, ctx.app.balance(channel), position, ulps = 2) {
                    ctx.app.set_balance(channel, position);
                }
            }
            GridFunction::Select | GridFunction::Mute | GridFunction::Solo => (),
        }
    }
}

impl ModeHandler for GridMixerHandler {
    fn mode(&self) -> Mode {
        Mode::GridMixer
    }

    fn activate(&mut self, ctx: &mut Context<'_>) -> OutputResult<()> {
        ctx.send(&grid::select_layout(Layout::Session))?;
        self.refresh_leds(ctx)
    }

    fn deactivate(&mut self, ctx: &mut Context<'_>) -> OutputResult<()> {
        if self.function.uses_faders() {
            ctx.send(&grid::select_layout(Layout::Session))?;
        }
        self.function = GridFunction::Select;
        Ok(())
    }

    fn on_note_on(
        &mut self,
        ctx: &mut Context<'_>,
        _channel: u8,
        note: u8,
        velocity: u8,
    ) -> OutputResult<bool> {
        let Some(track) = self.profile.track(note) else {
            return Ok(false);
        };
        if ButtonInput::from_u7(velocity).is_pressed() {
            self.on_track(ctx, track)?;
        }
        Ok(true)
    }

    fn on_note_off(&mut self, _ctx: &mut Context<'_>, _channel: u8, note: u8) -> OutputResult<bool> {
        Ok(self.profile.track(note).is_some())
    }

    fn on_control_change(
        &mut self,
        ctx: &mut Context<'_>,
        _channel: u8,
        controller: u8,
        value: u8,
    ) -> OutputResult<bool> {
        let pressed = ButtonInput::from_u7(value).is_pressed();
        if let Some(button) = self
            .profile
            .function_buttons
            .iter()
            .find(|button| button.cc == controller)
        {
            if pressed {
                let function = if button.function == self.function {
                    GridFunction::Select
                } else {
                    button.function
                };
                self.set_function(ctx, function)?;
            }
            return Ok(true);
        }
        if let Some(bank) = self.profile.bank(controller) {
            if pressed && bank != self.bank {
                log::debug!("Bank {bank}");
                self.bank = bank;
                if self.function.uses_faders() {
                    self.setup_faders(ctx)?;
                }
                self.refresh_leds(ctx)?;
            }
            return Ok(true);
        }
        if self.function.uses_faders() {
            if let Some(track) = self.profile.fader(controller) {
                self.on_fader(ctx, track, value);
                return Ok(true);
            }
        }
        Ok(false)
    }
}
