// SPDX-FileCopyrightText: The padio authors
// SPDX-License-Identifier: MPL-2.0

//! Interface towards the workstation application.
//!
//! Drivers never touch the application directly. They invoke
//! [`Action`]s, query and modify the mixer, and receive screen and
//! media notifications through the traits in this module.

use std::{fmt, str::FromStr};

use strum::{EnumIter, IntoEnumIterator as _, IntoStaticStr};
use thiserror::Error;


/// Press classification that is forwarded to switch actions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SwitchPress {
    #[default]
    Short,
    Bold,
    Long,
}

impl SwitchPress {
    const fn as_char(self) -> char {
        match self {
            Self::Short => 'S',
            Self::Bold => 'B',
            Self::Long => 'L',
        }
    }

    const fn from_char(c: char) -> Option<Self> {
        match c {
            'S' => Some(Self::Short),
            'B' => Some(Self::Bold),
            'L' => Some(Self::Long),
            _ => None,
        }
    }
}

/// Named application action with typed parameters.
///
/// Actions are rendered as their name followed by comma separated
/// parameters, e.g. `ENCODER 1,-2`, and can be parsed back from that
/// representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr, EnumIter)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Back,
    Menu,
    ScreenAdmin,
    ScreenAudioMixer,
    ScreenAlsaMixer,
    ScreenControl,
    Preset,
    PresetFav,
    ScreenBank,
    ScreenSceneRecall,
    ScreenSnapshot,
    ScreenPadGrid,
    ScreenPatternEditor,
    ScreenArranger,
    Tempo,
    AudioFileList,
    PowerOff,
    Reboot,
    RestartUi,
    ReloadMidiConfig,
    AllSoundsOff,
    AllNotesOff,
    StartAudioRecord,
    StopAudioRecord,
    ToggleAudioRecord,
    StartAudioPlay,
    StopAudioPlay,
    ToggleAudioPlay,
    StartMidiRecord,
    StopMidiRecord,
    ToggleMidiRecord,
    StartMidiPlay,
    StopMidiPlay,
    ToggleMidiPlay,
    ToggleRecord,
    TogglePlay,
    Stop,
    ToggleAltMode,
    ProgramChange(u8),
    /// Front panel switch
    Switch {
        index: u8,
        press: SwitchPress,
    },
    /// Push switch of a rotary encoder
    EncoderSwitch {
        index: u8,
        press: SwitchPress,
    },
    /// Relative rotation of a rotary encoder
    Encoder {
        index: u8,
        delta: i32,
    },
}

impl Action {
    #[must_use]
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// The select switch that confirms the current item.
    pub const SELECT: Self = Self::Switch {
        index: 3,
        press: SwitchPress::Short,
    };
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())?;
        match *self {
            Self::ProgramChange(program) => write!(f, " {program}"),
            Self::Switch { index, press } | Self::EncoderSwitch { index, press } => {
                write!(f, " {index}")?;
                if press != SwitchPress::Short {
                    write!(f, ",{}", press.as_char())?;
                }
                Ok(())
            }
            Self::Encoder { index, delta } => write!(f, " {index},{delta}"),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseActionError {
    #[error("unknown action {name}")]
    UnknownName { name: String },
    #[error("invalid parameters for action {name}: {params}")]
    InvalidParams { name: &'static str, params: String },
}

fn parse_switch_params(params: &[&str]) -> Option<(u8, SwitchPress)> {
    match params {
        [index] => Some((index.parse().ok()?, SwitchPress::Short)),
        [index, press] => {
            let mut chars = press.chars();
            let press = chars.next().and_then(SwitchPress::from_char)?;
            if chars.next().is_some() {
                return None;
            }
            Some((index.parse().ok()?, press))
        }
        _ => None,
    }
}

impl FromStr for Action {
    type Err = ParseActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (name, params) = s.split_once(' ').unwrap_or((s, ""));
        let template = Self::iter()
            .find(|action| action.name() == name)
            .ok_or_else(|| ParseActionError::UnknownName {
                name: name.to_owned(),
            })?;
        let param_list = params
            .split(',')
            .map(str::trim)
            .filter(|param| !param.is_empty())
            .collect::<Vec<_>>();
        let action = match (template, param_list.as_slice()) {
            (Self::ProgramChange(_), [program]) => program.parse().ok().map(Self::ProgramChange),
            (Self::Switch { .. }, params) => {
                parse_switch_params(params).map(|(index, press)| Self::Switch { index, press })
            }
            (Self::EncoderSwitch { .. }, params) => parse_switch_params(params)
                .map(|(index, press)| Self::EncoderSwitch { index, press }),
            (Self::Encoder { .. }, [index, delta]) => index
                .parse()
                .ok()
                .zip(delta.parse().ok())
                .map(|(index, delta)| Self::Encoder { index, delta }),
            (Self::ProgramChange(_) | Self::Encoder { .. }, _) => None,
            (action, []) => Some(action),
            (_, _) => None,
        };
        action.ok_or_else(|| ParseActionError::InvalidParams {
            name: template.name(),
            params: params.to_owned(),
        })
    }
}

/// Screens of the workstation that drivers care about.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum Screen {
    MainMenu,
    Options,
    Admin,
    AudioMixer,
    AlsaMixer,
    Control,
    Engine,
    Preset,
    Bank,
    SceneRecall,
    Snapshot,
    PadGrid,
    PatternEditor,
    Arranger,
    Tempo,
    AudioFileList,
}

impl Screen {
    /// Screens that show the mixer strips of the chains.
    #[must_use]
    pub const fn is_live(self) -> bool {
        matches!(self, Self::AudioMixer | Self::PadGrid)
    }
}

/// Identifier of a processing chain.
pub type ChainId = u16;

/// The main chain is never controlled through the chain strips.
pub const MAIN_CHAIN_ID: ChainId = 0;

/// Channel of the audio mixer.
pub type MixerChannel = u8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainInfo {
    pub id: ChainId,
    pub mixer_channel: MixerChannel,
}

impl ChainInfo {
    #[must_use]
    pub const fn is_main(&self) -> bool {
        self.id == MAIN_CHAIN_ID
    }
}

/// Fire-and-forget action invocation.
pub trait ActionSink {
    fn send_action(&mut self, action: Action);
}

/// Query and control the mixer strips of the chains.
///
/// Levels are normalized to `0.0..=1.0`, balances to `-1.0..=1.0`.
pub trait Mixer {
    /// Look up a chain by its position in the chain list.
    fn chain_by_index(&self, index: usize) -> Option<ChainInfo>;

    fn active_chain(&self) -> Option<ChainId>;

    fn set_active_chain(&mut self, id: ChainId);

    fn level(&self, channel: MixerChannel) -> f32;

    fn set_level(&mut self, channel: MixerChannel, level: f32);

    fn balance(&self, channel: MixerChannel) -> f32;

    fn set_balance(&mut self, channel: MixerChannel, balance: f32);

    fn mute(&self, channel: MixerChannel) -> bool;

    fn set_mute(&mut self, channel: MixerChannel, mute: bool);

    fn solo(&self, channel: MixerChannel) -> bool;

    fn set_solo(&mut self, channel: MixerChannel, solo: bool);
}

pub trait Sequencer {
    /// Tempo in BPM
    fn tempo(&self) -> f32;

    fn set_tempo(&mut self, bpm: f32);

    /// Inject a MIDI message into the sequencer output.
    fn send_midi(&mut self, message: &[u8]);
}

/// Notifications that a driver may subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, EnumIter)]
pub enum Signal {
    ScreenChanged,
    MediaStateChanged,
}

pub trait SignalRegistry {
    fn subscribe(&mut self, signal: Signal);

    fn unsubscribe(&mut self, signal: Signal);
}

/// Everything a driver needs from the application.
pub trait Workstation: ActionSink + Mixer + Sequencer + SignalRegistry {}

impl<T> Workstation for T where T: ActionSink + Mixer + Sequencer + SignalRegistry {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaSource {
    Audio,
    /// An instance of the audio player
    AudioPlayer(u32),
    Midi,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Player,
    Recorder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaState {
    pub source: MediaSource,
    pub kind: MediaKind,
    pub active: bool,
}

/// Receives the notifications of subscribed [`Signal`]s.
pub trait WorkstationObserver {
    fn on_screen_changed(&mut self, screen: Screen);

    fn on_media_state_changed(&mut self, state: MediaState);
}
