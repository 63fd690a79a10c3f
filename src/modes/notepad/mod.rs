// SPDX-FileCopyrightText: The padio authors
// SPDX-License-Identifier: MPL-2.0

//! Assignment of notes to pads.
//!
//! Hold a pad and strike a key on the keybed to assign the note of
//! the key to the pad. Hold pads and turn the removal knob fully
//! clockwise to restore their default notes. Hold the channel pad and
//! turn the channel knob to change the MIDI channel of all pads.
//!
//! Edits are staged while pads are held and committed at once when
//! the last pad has been released.

use super::ProgramLayout;
use crate::{
    controller::{Context, Mode, ModeHandler},
    midi::note_off_message,
    ButtonInput, OutputResult, U7_MAX,
};

#[derive(Debug, Clone, Copy)]
pub struct NotePadProfile {
    pub keybed_channel: u8,
    /// Hold to change the pads channel
    pub channel_pad_cc: u8,
    /// Absolute knob with values 1..=16
    pub channel_knob_cc: u8,
    /// Removes the notes of all held pads at full turn
    pub remove_knob_cc: u8,
    pub layout: ProgramLayout,
}

#[derive(Debug)]
pub struct NotePadHandler {
    profile: &'static NotePadProfile,
    /// Held pads in the order they were pressed
    held_pads: Vec<usize>,
    channel_pad_held: bool,
    channel_to_commit: Option<u8>,
    notes_to_add: Vec<(usize, u8)>,
    pads_to_reset: Vec<usize>,
}

impl NotePadHandler {
    #[must_use]
    pub const fn new(profile: &'static NotePadProfile) -> Self {
        Self {
            profile,
            held_pads: Vec::new(),
            channel_pad_held: false,
            channel_to_commit: None,
            notes_to_add: Vec::new(),
            pads_to_reset: Vec::new(),
        }
    }

    #[must_use]
    pub fn has_pending_edits(&self) -> bool {
        self.channel_to_commit.is_some()
            || !self.notes_to_add.is_empty()
            || !self.pads_to_reset.is_empty()
    }

    fn discard(&mut self) {
        self.held_pads.clear();
        self.channel_pad_held = false;
        self.channel_to_commit = None;
        self.notes_to_add.clear();
        self.pads_to_reset.clear();
    }

    fn upload_layout(&self, ctx: &mut Context<'_>) -> OutputResult<()> {
        let tempo = ctx.app.tempo();
        ctx.upload_program(&self.profile.layout.build(ctx.state, tempo))
    }

    /// Apply all staged note edits if no pad is held anymore.
    fn try_commit_notes(&mut self, ctx: &mut Context<'_>) -> OutputResult<()> {
        if !self.held_pads.is_empty() {
            return Ok(());
        }
        if self.notes_to_add.is_empty() && self.pads_to_reset.is_empty() {
            return Ok(());
        }
        for (pad, note) in self.notes_to_add.drain(..) {
            log::debug!("Assigning note {note} to pad {pad}");
            ctx.state.set_pad_note(pad, note);
        }
        for pad in self.pads_to_reset.drain(..) {
            log::debug!("Resetting note of pad {pad}");
            ctx.state.reset_pad(pad);
        }
        self.upload_layout(ctx)
    }

    fn on_channel_pad(&mut self, ctx: &mut Context<'_>, input: ButtonInput) -> OutputResult<()> {
        self.channel_pad_held = input.is_pressed();
        if self.channel_pad_held {
            return Ok(());
        }
        let Some(channel) = self.channel_to_commit.take() else {
            return Ok(());
        };
        log::debug!("Changing pads channel to {channel}");
        ctx.state.set_pads_channel(channel);
        self.upload_layout(ctx)
    }

    fn on_remove_knob(&mut self, ctx: &mut Context<'_>) {
        let pads_channel = ctx.state.pads_channel();
        for pad in &self.held_pads {
            if !self.pads_to_reset.contains(pad) {
                self.pads_to_reset.push(*pad);
            }
            if let Some(note) = ctx.state.pad_note(*pad) {
                ctx.app.send_midi(&note_off_message(pads_channel, note));
            }
        }
    }
}

impl ModeHandler for NotePadHandler {
    fn mode(&self) -> Mode {
        Mode::NotePad
    }

    fn activate(&mut self, ctx: &mut Context<'_>) -> OutputResult<()> {
        self.discard();
        self.upload_layout(ctx)
    }

    fn deactivate(&mut self, _ctx: &mut Context<'_>) -> OutputResult<()> {
        if self.has_pending_edits() {
            log::debug!("Discarding uncommitted note edits");
        }
        self.discard();
        Ok(())
    }

    fn on_note_on(
        &mut self,
        ctx: &mut Context<'_>,
        channel: u8,
        note: u8,
        _velocity: u8,
    ) -> OutputResult<bool> {
        let mut handled = false;
        if channel == ctx.state.pads_channel() {
            if let Some(pad) = ctx.state.pad_for_note(note) {
                if !self.held_pads.contains(&pad) {
                    self.held_pads.push(pad);
                }
                handled = true;
            }
        }
        // The keybed and the pads may share a channel
        if channel == self.profile.keybed_channel {
            if let [pad] = self.held_pads[..] {
                if ctx.state.contains_note(note) {
                    log::debug!("Note {note} is already assigned");
                } else {
                    self.notes_to_add.retain(|(other, _)| *other != pad);
                    self.notes_to_add.push((pad, note));
                }
                handled = true;
            }
        }
        Ok(handled)
    }

    fn on_note_off(&mut self, ctx: &mut Context<'_>, channel: u8, note: u8) -> OutputResult<bool> {
        if channel == ctx.state.pads_channel() {
            if let Some(pad) = ctx.state.pad_for_note(note) {
                self.held_pads.retain(|other| *other != pad);
            }
        }
        self.try_commit_notes(ctx)?;
        Ok(true)
    }

    fn on_control_change(
        &mut self,
        ctx: &mut Context<'_>,
        _channel: u8,
        controller: u8,
        value: u8,
    ) -> OutputResult<bool> {
        let profile = self.profile;
        if controller == profile.channel_pad_cc {
            self.on_channel_pad(ctx, ButtonInput::from_u7(value))?;
            return Ok(true);
        }
        if controller == profile.channel_knob_cc {
            if self.channel_pad_held {
                self.channel_to_commit = value.checked_sub(1);
            }
            return Ok(true);
        }
        if controller == profile.remove_knob_cc {
            if value == U7_MAX {
                self.on_remove_knob(ctx);
            }
            return Ok(true);
        }
        Ok(false)
    }
}

#[cfg(all(test, feature = "akai-mpk-mini-mk3"))]
mod tests;
