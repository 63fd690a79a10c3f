// SPDX-FileCopyrightText: The padio authors
// SPDX-License-Identifier: MPL-2.0

//! Device configuration that survives restarts.

use std::path::Path;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::sysex::program::{DEFAULT_PADS_CHANNEL, PAD_COUNT};

const MIDI_CHANNEL_MAX: u8 = 15;
const NOTE_MAX: u8 = 127;

/// Pad channel and pad to note assignment of a controller.
///
/// A pad whose note equals its own index is unassigned. The table
/// always has exactly [`PAD_COUNT`] entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PersistedRecord")]
pub struct PersistedState {
    pad_notes: [u8; PAD_COUNT],
    pads_channel: u8,
}

impl Default for PersistedState {
    fn default() -> Self {
        Self {
            pad_notes: identity_pad_notes(),
            pads_channel: DEFAULT_PADS_CHANNEL,
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn identity_pad_notes() -> [u8; PAD_COUNT] {
    std::array::from_fn(|pad| pad as u8)
}

impl PersistedState {
    #[must_use]
    pub const fn pad_notes(&self) -> &[u8; PAD_COUNT] {
        &self.pad_notes
    }

    #[must_use]
    pub const fn pads_channel(&self) -> u8 {
        self.pads_channel
    }

    /// Values beyond the last MIDI channel are ignored.
    pub fn set_pads_channel(&mut self, channel: u8) {
        if channel > MIDI_CHANNEL_MAX {
            log::debug!("Ignoring invalid pads channel {channel}");
            return;
        }
        self.pads_channel = channel;
    }

    #[must_use]
    pub fn pad_note(&self, pad: usize) -> Option<u8> {
        self.pad_notes.get(pad).copied()
    }

    /// Find the (first) pad that sends a note.
    #[must_use]
    pub fn pad_for_note(&self, note: u8) -> Option<usize> {
        self.pad_notes.iter().position(|pad_note| *pad_note == note)
    }

    #[must_use]
    pub fn contains_note(&self, note: u8) -> bool {
        self.pad_notes.contains(&note)
    }

    pub fn set_pad_note(&mut self, pad: usize, note: u8) {
        debug_assert!(note <= NOTE_MAX);
        if let Some(pad_note) = self.pad_notes.get_mut(pad) {
            *pad_note = note & NOTE_MAX;
        }
    }

    /// Restore the default note of a pad.
    pub fn reset_pad(&mut self, pad: usize) {
        #[allow(clippy::cast_possible_truncation)]
        self.set_pad_note(pad, pad as u8);
    }

    #[must_use]
    pub fn is_pad_assigned(&self, pad: usize) -> bool {
        self.pad_note(pad)
            .is_some_and(|note| usize::from(note) != pad)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Load the state from a JSON file.
    ///
    /// Falls back to the defaults if the file is missing or invalid.
    #[must_use]
    pub fn load_from_file(path: &Path) -> Self {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(err) => {
                log::warn!("Failed to read state from {path}: {err}", path = path.display());
                return Self::default();
            }
        };
        match Self::from_json(&json) {
            Ok(state) => {
                log::debug!("Loaded state from {path}", path = path.display());
                state
            }
            Err(err) => {
                log::warn!("Failed to parse state from {path}: {err}", path = path.display());
                Self::default()
            }
        }
    }

    pub fn save_to_file(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        let json = self.to_json().context("Failed to serialize state")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write state to {}", path.display()))?;
        log::debug!("Saved state to {path}", path = path.display());
        Ok(())
    }
}

/// Persisted representation with optional, unchecked fields.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PersistedRecord {
    pad_notes: Option<Vec<u8>>,
    pads_channel: Option<u8>,
}

impl From<PersistedRecord> for PersistedState {
    fn from(from: PersistedRecord) -> Self {
        let PersistedRecord {
            pad_notes,
            pads_channel,
        } = from;
        let mut state = Self::default();
        if let Some(pad_notes) = pad_notes {
            if pad_notes.len() == PAD_COUNT {
                for (pad, note) in pad_notes.into_iter().enumerate() {
                    if note <= NOTE_MAX {
                        state.pad_notes[pad] = note;
                    } else {
                        log::warn!("Resetting invalid note {note} of pad {pad}");
                    }
                }
            } else {
                log::warn!(
                    "Ignoring pad notes with {len} instead of {PAD_COUNT} entries",
                    len = pad_notes.len()
                );
            }
        }
        if let Some(pads_channel) = pads_channel {
            if pads_channel <= MIDI_CHANNEL_MAX {
                state.pads_channel = pads_channel;
            } else {
                log::warn!("Ignoring invalid pads channel {pads_channel}");
            }
        }
        state
    }
}
