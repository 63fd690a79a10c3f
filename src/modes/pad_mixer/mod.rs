// SPDX-FileCopyrightText: The padio authors
// SPDX-License-Identifier: MPL-2.0

//! Mixer strips and transport on the pads and knobs of a keyboard
//! controller.
//!
//! The 16 pads are split into two banks of 8. Each bank provides the
//! same knob functions and a few single-purpose pads. The active bank
//! selects which 8 chains are addressed by the 8 knobs.

use float_cmp::approx_eq;

use super::{apply_scaled_delta, Bank, ProgramLayout};
use crate::{
    app::{Action, ChainInfo},
    controller::{Context, Mode, ModeHandler},
    OutputResult, PadInput, StepEncoderInput,
};

const LEVEL_MIN: i32 = 0;
const LEVEL_MAX: i32 = 100;
const BALANCE_MIN: i32 = -100;
const BALANCE_MAX: i32 = 100;

/// The function of the knobs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum::Display)]
pub enum KnobFunction {
    #[default]
    Volume,
    Pan,
    Mute,
    Solo,
    Select,
}

/// The function of a pad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadFunction {
    /// Select the function of the knobs
    Knobs(KnobFunction),
    /// Silence everything and stop all players
    Panic,
    Action(Action),
}

#[derive(Debug, Clone, Copy)]
pub struct PadMixerProfile {
    /// Control change number of the first pad of each bank
    pub pad_cc_start: [u8; 2],
    pub pads: [[PadFunction; Bank::SIZE]; 2],
    /// Control change number of the first knob
    pub knob_cc_start: u8,
    pub layout: ProgramLayout,
}

impl PadMixerProfile {
    fn pad(&self, controller: u8) -> Option<(Bank, usize, PadFunction)> {
        [Bank::A, Bank::B]
            .into_iter()
            .zip(self.pad_cc_start)
            .zip(self.pads)
            .find_map(|((bank, start), functions)| {
                let index = usize::from(controller.checked_sub(start)?);
                functions.get(index).map(|function| (bank, index, *function))
            })
    }

    fn knob(&self, controller: u8) -> Option<usize> {
        let index = usize::from(controller.checked_sub(self.knob_cc_start)?);
        (index < Bank::SIZE).then_some(index)
    }
}

/// The main chain is never addressed.
fn chain_at(ctx: &Context<'_>, index: usize) -> Option<ChainInfo> {
    let chain = ctx.app.chain_by_index(index).filter(|chain| !chain.is_main());
    if chain.is_none() {
        log::debug!("No chain at index {index}");
    }
    chain
}

#[derive(Debug)]
pub struct PadMixerHandler {
    profile: &'static PadMixerProfile,
    knob_function: KnobFunction,
    bank: Bank,
    /// A pad has been pressed with full strength to select a chain
    select_override: bool,
}

impl PadMixerHandler {
    #[must_use]
    pub const fn new(profile: &'static PadMixerProfile) -> Self {
        Self {
            profile,
            knob_function: KnobFunction::Volume,
            bank: Bank::A,
            select_override: false,
        }
    }

    #[must_use]
    pub const fn knob_function(&self) -> KnobFunction {
        self.knob_function
    }

    #[must_use]
    pub const fn bank(&self) -> Bank {
        self.bank
    }

    fn upload_layout(&self, ctx: &mut Context<'_>) -> OutputResult<()> {
        let tempo = ctx.app.tempo();
        let program = self.profile.layout.build(ctx.state, tempo);
        ctx.upload_program(&program)
    }

    /// Resolve the chain of a knob in the active bank.
    fn chain(&self, ctx: &Context<'_>, knob: usize) -> Option<ChainInfo> {
        chain_at(ctx, knob + self.bank.offset())
    }

    fn on_pad(
        &mut self,
        ctx: &mut Context<'_>,
        bank: Bank,
        index: usize,
        function: PadFunction,
        value: u8,
    ) {
        let input = PadInput::from_u7(value);
        let live = ctx.screen.is_some_and(|screen| screen.is_live());
        if input.is_full_strength() && live {
            self.select_override = true;
            // Pads address the chains by their position in the whole pad row
            if let Some(chain) = chain_at(ctx, index + bank.offset()) {
                log::debug!("Selecting chain {id}", id = chain.id);
                ctx.app.set_active_chain(chain.id);
            }
            return;
        }
        match function {
            PadFunction::Panic => {
                if input.is_pressed() {
                    ctx.send_action(Action::AllSoundsOff);
                    ctx.send_action(Action::StopMidiPlay);
                    ctx.send_action(Action::StopAudioPlay);
                }
                return;
            }
            PadFunction::Action(action) => {
                if input.is_pressed() {
                    ctx.send_action(action);
                }
                return;
            }
            PadFunction::Knobs(_) => (),
        }
        if !input.is_pressed() {
            self.bank = Bank::A;
            if self.select_override {
                self.select_override = false;
                return;
            }
        } else if bank == Bank::B {
            self.bank = Bank::B;
        }
        if let PadFunction::Knobs(knob_function) = function {
            if input.is_pressed() && live {
                log::debug!("Knob function: {knob_function}");
                self.knob_function = knob_function;
            }
        }
    }

    fn on_knob(&mut self, ctx: &mut Context<'_>, knob: usize, value: u8) {
        if !ctx.screen.is_some_and(|screen| screen.is_live()) {
            return;
        }
        let Some(chain) = self.chain(ctx, knob) else {
            return;
        };
        let channel = chain.mixer_channel;
        match self.knob_function {
            KnobFunction::Volume => {
                let Some(StepEncoderInput { delta }) = StepEncoderInput::try_from_u7_relative(value)
                else {
                    return;
                };
                let level = ctx.app.level(channel);
                let new_level = apply_scaled_delta(level, delta, LEVEL_MIN, LEVEL_MAX);
                if !approx_eq!(f32, level, new_level, ulps = 2) {
                    log::debug!("Level of chain {id}: {new_level}", id = chain.id);
                    ctx.app.set_level(channel, new_level);
                }
            }
            KnobFunction::Pan => {
                let Some(StepEncoderInput { delta }) = StepEncoderInput::try_from_u7_relative(value)
                else {
                    return;
                };
                let balance = ctx.app.balance(channel);
                let new_balance = apply_scaled_delta(balance, delta, BALANCE_MIN, BALANCE_MAX);
                if !approx_eq!(f32, balance, new_balance, ulps = 2) {
                    log::debug!("Balance of chain {id}: {new_balance}", id = chain.id);
                    ctx.app.set_balance(channel, new_balance);
                }
            }
            KnobFunction::Mute => {
                let mute = PadInput::from_u7(value).is_below_midpoint();
                log::debug!("Mute of chain {id}: {mute}", id = chain.id);
                ctx.app.set_mute(channel, mute);
            }
            KnobFunction::Solo => {
                let solo = PadInput::from_u7(value).is_below_midpoint();
                log::debug!("Solo of chain {id}: {solo}", id = chain.id);
                ctx.app.set_solo(channel, solo);
            }
            KnobFunction::Select => {
                ctx.app.set_active_chain(chain.id);
            }
        }
    }
}

impl ModeHandler for PadMixerHandler {
    fn mode(&self) -> Mode {
        Mode::PadMixer
    }

    fn activate(&mut self, ctx: &mut Context<'_>) -> OutputResult<()> {
        self.upload_layout(ctx)
    }

    fn deactivate(&mut self, _ctx: &mut Context<'_>) -> OutputResult<()> {
        self.bank = Bank::A;
        self.select_override = false;
        Ok(())
    }

    fn on_control_change(
        &mut self,
        ctx: &mut Context<'_>,
        _channel: u8,
        controller: u8,
        value: u8,
    ) -> OutputResult<bool> {
        if let Some((bank, index, function)) = self.profile.pad(controller) {
            self.on_pad(ctx, bank, index, function, value);
            return Ok(true);
        }
        if let Some(knob) = self.profile.knob(controller) {
            self.on_knob(ctx, knob, value);
            return Ok(true);
        }
        log::debug!("Unmapped control change {controller}");
        Ok(false)
    }
}

#[cfg(all(test, feature = "akai-mpk-mini-mk3"))]
mod tests;
