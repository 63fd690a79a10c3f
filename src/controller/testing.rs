// SPDX-FileCopyrightText: The padio authors
// SPDX-License-Identifier: MPL-2.0

//! Recording test doubles for the application and the device.

use std::collections::HashMap;

use super::Context;
use crate::{
    app::{
        Action, ActionSink, ChainId, ChainInfo, Mixer, MixerChannel, Screen, Sequencer, Signal,
        SignalRegistry,
    },
    sysex::program::{CMD_WRITE_PROGRAM, DIRECTION_OUT, MANUFACTURER_ID, PRODUCT_ID},
    MidiOutputConnection, OutputResult, PersistedState, TimeStamp,
};

#[derive(Debug, Default)]
pub(crate) struct RecordingWorkstation {
    pub(crate) actions: Vec<Action>,
    pub(crate) chains: Vec<ChainInfo>,
    pub(crate) active_chain: Option<ChainId>,
    pub(crate) levels: HashMap<MixerChannel, f32>,
    pub(crate) balances: HashMap<MixerChannel, f32>,
    pub(crate) mutes: HashMap<MixerChannel, bool>,
    pub(crate) solos: HashMap<MixerChannel, bool>,
    pub(crate) tempo: f32,
    pub(crate) sent_midi: Vec<Vec<u8>>,
    pub(crate) subscriptions: Vec<Signal>,
}

impl RecordingWorkstation {
    /// A main chain followed by `count` regular chains on mixer
    /// channels `0..count`.
    pub(crate) fn with_chains(count: u8) -> Self {
        let mut chains = vec![ChainInfo {
            id: 0,
            mixer_channel: 16,
        }];
        chains.extend((0..count).map(|index| ChainInfo {
            id: ChainId::from(index) + 1,
            mixer_channel: index,
        }));
        Self {
            chains,
            tempo: 120.0,
            ..Default::default()
        }
    }

    pub(crate) fn take_actions(&mut self) -> Vec<Action> {
        std::mem::take(&mut self.actions)
    }
}

impl ActionSink for RecordingWorkstation {
    fn send_action(&mut self, action: Action) {
        self.actions.push(action);
    }
}

impl Mixer for RecordingWorkstation {
    fn chain_by_index(&self, index: usize) -> Option<ChainInfo> {
        self.chains.get(index).copied()
    }

    fn active_chain(&self) -> Option<ChainId> {
        self.active_chain
    }

    fn set_active_chain(&mut self, id: ChainId) {
        self.active_chain = Some(id);
    }

    fn level(&self, channel: MixerChannel) -> f32 {
        self.levels.get(&channel).copied().unwrap_or(0.8)
    }

    fn set_level(&mut self, channel: MixerChannel, level: f32) {
        self.levels.insert(channel, level);
    }

    fn balance(&self, channel: MixerChannel) -> f32 {
        self.balances.get(&channel).copied().unwrap_or(0.0)
    }

    fn set_balance(&mut self, channel: MixerChannel, balance: f32) {
        self.balances.insert(channel, balance);
    }

    fn mute(&self, channel: MixerChannel) -> bool {
        self.mutes.get(&channel).copied().unwrap_or(false)
    }

    fn set_mute(&mut self, channel: MixerChannel, mute: bool) {
        self.mutes.insert(channel, mute);
    }

    fn solo(&self, channel: MixerChannel) -> bool {
        self.solos.get(&channel).copied().unwrap_or(false)
    }

    fn set_solo(&mut self, channel: MixerChannel, solo: bool) {
        self.solos.insert(channel, solo);
    }
}

impl Sequencer for RecordingWorkstation {
    fn tempo(&self) -> f32 {
        self.tempo
    }

    fn set_tempo(&mut self, bpm: f32) {
        self.tempo = bpm;
    }

    fn send_midi(&mut self, message: &[u8]) {
        self.sent_midi.push(message.to_vec());
    }
}

impl SignalRegistry for RecordingWorkstation {
    fn subscribe(&mut self, signal: Signal) {
        self.subscriptions.push(signal);
    }

    fn unsubscribe(&mut self, signal: Signal) {
        self.subscriptions.retain(|other| *other != signal);
    }
}

#[derive(Debug, Default)]
pub(crate) struct RecordingOutput {
    pub(crate) messages: Vec<Vec<u8>>,
}

impl RecordingOutput {
    pub(crate) fn take_messages(&mut self) -> Vec<Vec<u8>> {
        std::mem::take(&mut self.messages)
    }
}

impl MidiOutputConnection for RecordingOutput {
    fn send_midi_output(&mut self, output: &[u8]) -> OutputResult<()> {
        self.messages.push(output.to_vec());
        Ok(())
    }
}

pub(crate) fn is_program_upload(message: &[u8]) -> bool {
    message.starts_with(&[
        0xf0,
        MANUFACTURER_ID,
        DIRECTION_OUT,
        PRODUCT_ID,
        CMD_WRITE_PROGRAM,
    ])
}

pub(crate) fn program_uploads(messages: &[Vec<u8>]) -> Vec<&Vec<u8>> {
    messages
        .iter()
        .filter(|message| is_program_upload(message))
        .collect()
}

/// Whether a message contains an ASCII text, e.g. a knob name.
pub(crate) fn contains_text(message: &[u8], text: &str) -> bool {
    message
        .windows(text.len())
        .any(|window| window == text.as_bytes())
}

/// Everything needed to invoke a mode handler directly.
#[derive(Debug)]
pub(crate) struct Fixture {
    pub(crate) app: RecordingWorkstation,
    pub(crate) output: RecordingOutput,
    pub(crate) state: PersistedState,
    pub(crate) screen: Option<Screen>,
}

impl Fixture {
    pub(crate) fn new() -> Self {
        Self {
            app: RecordingWorkstation::with_chains(8),
            output: RecordingOutput::default(),
            state: PersistedState::default(),
            screen: None,
        }
    }

    pub(crate) fn with_screen(mut self, screen: Screen) -> Self {
        self.screen = Some(screen);
        self
    }

    pub(crate) fn context(&mut self, now: TimeStamp) -> Context<'_> {
        Context::new(
            &mut self.app,
            &mut self.output,
            &mut self.state,
            self.screen,
            now,
            true,
        )
    }

    pub(crate) fn uploads(&self) -> usize {
        program_uploads(&self.output.messages).len()
    }
}
