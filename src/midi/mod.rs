// SPDX-FileCopyrightText: The padio authors
// SPDX-License-Identifier: MPL-2.0

use std::{
    borrow::Cow,
    ops::{Deref, DerefMut},
};

use crate::{DeviceDescriptor, OutputResult, TimeStamp};

#[cfg(feature = "midir")]
pub mod midir;


pub const MIDI_STATUS_NOTE_OFF: u8 = 0x80;
pub const MIDI_STATUS_NOTE_ON: u8 = 0x90;
pub const MIDI_STATUS_CC: u8 = 0xb0;
pub const MIDI_STATUS_PROGRAM_CHANGE: u8 = 0xc0;

pub const MIDI_SYSEX_START: u8 = 0xf0;
pub const MIDI_SYSEX_END: u8 = 0xf7;

const MIDI_STATUS_TYPE_MASK: u8 = 0xf0;
const MIDI_CHANNEL_MASK: u8 = 0x0f;
const MIDI_DATA_MASK: u8 = 0x7f;

/// Number of addressable MIDI channels.
pub const MIDI_CHANNEL_COUNT: u8 = 16;

/// MIDI-related, extended [`DeviceDescriptor`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MidiDeviceDescriptor {
    pub device: DeviceDescriptor,
    pub port_name_prefix: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MidiPortDescriptor {
    pub name: Cow<'static, str>,
}

/// Channel voice messages that are relevant for control surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEvent {
    ProgramChange { channel: u8, program: u8 },
    NoteOn { channel: u8, note: u8, velocity: u8 },
    NoteOff { channel: u8, note: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
}

#[derive(Debug)]
pub struct MidiInputDecodeError;

impl MidiEvent {
    /// Decode a single MIDI message.
    ///
    /// Note On with zero velocity is decoded as Note Off. Valid
    /// messages of other types are not an error and decode to `None`.
    pub fn try_decode(input: &[u8]) -> Result<Option<Self>, MidiInputDecodeError> {
        let Some(status) = input.first().copied() else {
            return Err(MidiInputDecodeError);
        };
        if status & 0x80 == 0 {
            // Running status is not supported
            return Err(MidiInputDecodeError);
        }
        let channel = status & MIDI_CHANNEL_MASK;
        let event = match (status & MIDI_STATUS_TYPE_MASK, input) {
            (MIDI_STATUS_PROGRAM_CHANGE, [_, program]) => Self::ProgramChange {
                channel,
                program: program & MIDI_DATA_MASK,
            },
            (MIDI_STATUS_NOTE_ON, [_, note, 0]) | (MIDI_STATUS_NOTE_OFF, [_, note, _]) => {
                Self::NoteOff {
                    channel,
                    note: note & MIDI_DATA_MASK,
                }
            }
            (MIDI_STATUS_NOTE_ON, [_, note, velocity]) => Self::NoteOn {
                channel,
                note: note & MIDI_DATA_MASK,
                velocity: velocity & MIDI_DATA_MASK,
            },
            (MIDI_STATUS_CC, [_, controller, value]) => Self::ControlChange {
                channel,
                controller: controller & MIDI_DATA_MASK,
                value: value & MIDI_DATA_MASK,
            },
            (
                MIDI_STATUS_PROGRAM_CHANGE
                | MIDI_STATUS_NOTE_ON
                | MIDI_STATUS_NOTE_OFF
                | MIDI_STATUS_CC,
                _,
            ) => return Err(MidiInputDecodeError),
            _ => return Ok(None),
        };
        Ok(Some(event))
    }

    #[must_use]
    pub const fn channel(self) -> u8 {
        match self {
            Self::ProgramChange { channel, .. }
            | Self::NoteOn { channel, .. }
            | Self::NoteOff { channel, .. }
            | Self::ControlChange { channel, .. } => channel,
        }
    }

    /// Encode the event into its wire format.
    #[must_use]
    pub fn to_bytes(self) -> Vec<u8> {
        match self {
            Self::ProgramChange { channel, program } => vec![
                MIDI_STATUS_PROGRAM_CHANGE | (channel & MIDI_CHANNEL_MASK),
                program & MIDI_DATA_MASK,
            ],
            Self::NoteOn {
                channel,
                note,
                velocity,
            } => note_on_message(channel, note, velocity).to_vec(),
            Self::NoteOff { channel, note } => note_off_message(channel, note).to_vec(),
            Self::ControlChange {
                channel,
                controller,
                value,
            } => control_change_message(channel, controller, value).to_vec(),
        }
    }
}

#[must_use]
pub const fn note_on_message(channel: u8, note: u8, velocity: u8) -> [u8; 3] {
    [
        MIDI_STATUS_NOTE_ON | (channel & MIDI_CHANNEL_MASK),
        note & MIDI_DATA_MASK,
        velocity & MIDI_DATA_MASK,
    ]
}

#[must_use]
pub const fn note_off_message(channel: u8, note: u8) -> [u8; 3] {
    [
        MIDI_STATUS_NOTE_OFF | (channel & MIDI_CHANNEL_MASK),
        note & MIDI_DATA_MASK,
        0,
    ]
}

#[must_use]
pub const fn control_change_message(channel: u8, controller: u8, value: u8) -> [u8; 3] {
    [
        MIDI_STATUS_CC | (channel & MIDI_CHANNEL_MASK),
        controller & MIDI_DATA_MASK,
        value & MIDI_DATA_MASK,
    ]
}

/// Passive callback for sinking MIDI input messages
pub trait MidiInputHandler: Send {
    /// Invoked for each incoming message.
    ///
    /// Returns `true` if the message has been accepted and handled
    /// or `false` otherwise.
    #[must_use]
    fn handle_midi_input(&mut self, ts: TimeStamp, input: &[u8]) -> bool;
}

impl<D> MidiInputHandler for D
where
    D: DerefMut + Send,
    <D as Deref>::Target: MidiInputHandler,
{
    fn handle_midi_input(&mut self, ts: TimeStamp, input: &[u8]) -> bool {
        self.deref_mut().handle_midi_input(ts, input)
    }
}

pub trait MidiOutputConnection {
    fn send_midi_output(&mut self, output: &[u8]) -> OutputResult<()>;
}

impl<T> MidiOutputConnection for Box<T>
where
    T: MidiOutputConnection + ?Sized,
{
    fn send_midi_output(&mut self, output: &[u8]) -> OutputResult<()> {
        self.as_mut().send_midi_output(output)
    }
}

pub type BoxedMidiOutputConnection = Box<dyn MidiOutputConnection + Send + 'static>;
