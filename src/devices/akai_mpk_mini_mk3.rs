// SPDX-FileCopyrightText: The padio authors
// SPDX-License-Identifier: MPL-2.0

//! Akai MPK mini mk3
//!
//! Keyboard controller with 8 velocity sensitive pads (two banks),
//! 8 endless knobs, and a joystick. The layout of pads and knobs is
//! uploaded as a program into the volatile program slot whenever
//! the mode changes.
//!
//! Modes are selected with the program change pads:
//!
//! | Program | Function                          |
//! |---------|-----------------------------------|
//! | 1       | Audio mixer screen                |
//! | 2       | Toggle pad grid/pattern editor    |
//! | 3       | Tempo screen                      |
//! | 4       | Toggle scene recall/snapshot      |
//! | 5       | Pad mixer mode                    |
//! | 6       | Navigation mode                   |
//! | 7       | Pattern mode                      |
//! | 8       | Note pad mode                     |

use std::borrow::Cow;

use crate::{
    app::{Action, Screen, Workstation},
    controller::{no_messages, BoxedModeHandler, DeviceProfile, Driver, Mode, ProgramChangeTarget},
    modes::{
        navigation::{
            ButtonRole, ButtonSource, DirectButton, EncoderKnob, JoystickDirection, TimedButton,
        },
        notepad::NotePadProfile,
        pad_mixer::{KnobFunction, PadFunction},
        KnobLayout, NavigationHandler, NavigationProfile, NotePadHandler, PadMixerHandler,
        PadMixerProfile, PatternHandler, ProgramLayout,
    },
    sysex::program::{JoystickAxis, JoystickMode, DEFAULT_KEYBED_CHANNEL},
    DeviceDescriptor, LedColor, MidiDeviceDescriptor, MidiOutputConnection,
};

pub const MIDI_DEVICE_DESCRIPTOR: &MidiDeviceDescriptor = &MidiDeviceDescriptor {
    device: DeviceDescriptor {
        vendor_name: Cow::Borrowed("Akai"),
        product_name: Cow::Borrowed("MPK mini 3"),
    },
    port_name_prefix: "MPK mini 3",
};

pub const DEVICE_DESCRIPTOR: &DeviceDescriptor = &MIDI_DEVICE_DESCRIPTOR.device;

const PAD_CC_START: u8 = 8;
const PAD_CC_START_B: u8 = 16;
const KNOB_CC_START: u8 = 24;

const JOYSTICK_X_NEGATIVE: u8 = 32;
const JOYSTICK_X_POSITIVE: u8 = 33;
const JOYSTICK_Y_NEGATIVE: u8 = 34;
const JOYSTICK_Y_POSITIVE: u8 = 35;

const JOYSTICK_X: JoystickAxis = JoystickAxis::dual_cc(JOYSTICK_X_NEGATIVE, JOYSTICK_X_POSITIVE);
const JOYSTICK_Y: JoystickAxis = JoystickAxis::dual_cc(JOYSTICK_Y_NEGATIVE, JOYSTICK_Y_POSITIVE);
const JOYSTICK_PITCH_BEND: JoystickAxis = JoystickAxis {
    mode: JoystickMode::PitchBend,
    negative: 1,
    positive: 2,
};

pub static PAD_MIXER_PROFILE: PadMixerProfile = PadMixerProfile {
    pad_cc_start: [PAD_CC_START, PAD_CC_START_B],
    pads: [
        [
            PadFunction::Knobs(KnobFunction::Volume),
            PadFunction::Knobs(KnobFunction::Pan),
            PadFunction::Knobs(KnobFunction::Mute),
            PadFunction::Knobs(KnobFunction::Solo),
            PadFunction::Panic,
            PadFunction::Action(Action::ToggleAudioRecord),
            PadFunction::Action(Action::StopAudioPlay),
            PadFunction::Action(Action::ToggleAudioPlay),
        ],
        [
            PadFunction::Knobs(KnobFunction::Volume),
            PadFunction::Knobs(KnobFunction::Pan),
            PadFunction::Knobs(KnobFunction::Mute),
            PadFunction::Knobs(KnobFunction::Solo),
            PadFunction::Panic,
            PadFunction::Action(Action::ToggleMidiRecord),
            PadFunction::Action(Action::StopMidiPlay),
            PadFunction::Action(Action::ToggleMidiPlay),
        ],
    ],
    knob_cc_start: KNOB_CC_START,
    layout: ProgramLayout {
        name: "Padio MixPad",
        pad_cc_start: PAD_CC_START,
        knobs: [
            KnobLayout::relative(24, "Chain 1/9"),
            KnobLayout::relative(25, "Chain 2/10"),
            KnobLayout::relative(26, "Chain 3/11"),
            KnobLayout::relative(27, "Chain 4/12"),
            KnobLayout::relative(28, "Chain 5/13"),
            KnobLayout::relative(29, "Chain 6/14"),
            KnobLayout::relative(30, "Chain 7/15"),
            KnobLayout::relative(31, "Chain 8/16"),
        ],
        joystick_x: JOYSTICK_X,
        joystick_y: JOYSTICK_PITCH_BEND,
    },
};

pub static NAVIGATION_PROFILE: NavigationProfile = NavigationProfile {
    source: ButtonSource::ControlChange,
    buttons: &[
        DirectButton {
            id: 8,
            action: Action::ArrowLeft,
            color: LedColor::OFF,
        },
        DirectButton {
            id: 9,
            action: Action::ArrowDown,
            color: LedColor::OFF,
        },
        DirectButton {
            id: 10,
            action: Action::ArrowRight,
            color: LedColor::OFF,
        },
        DirectButton {
            id: 12,
            action: Action::Back,
            color: LedColor::OFF,
        },
        DirectButton {
            id: 13,
            action: Action::ArrowUp,
            color: LedColor::OFF,
        },
        DirectButton {
            id: 14,
            action: Action::SELECT,
            color: LedColor::OFF,
        },
    ],
    timed_buttons: &[
        TimedButton {
            id: 11,
            role: ButtonRole::Screen,
            actions: &[Action::ScreenControl, Action::Preset, Action::ScreenBank],
            screens: &[(Screen::Control, 0), (Screen::Preset, 1), (Screen::Bank, 2)],
            bold: Some(Action::ScreenPatternEditor),
            long: Some(Action::PresetFav),
        },
        TimedButton {
            id: 15,
            role: ButtonRole::Screen,
            actions: &[Action::Menu, Action::ScreenAdmin],
            screens: &[(Screen::MainMenu, 0), (Screen::Admin, 1)],
            bold: None,
            long: Some(Action::PowerOff),
        },
    ],
    program_buttons: &[],
    alt_button: None,
    encoders: &[
        EncoderKnob { cc: 24, index: 0 },
        EncoderKnob { cc: 25, index: 2 },
        EncoderKnob { cc: 28, index: 1 },
        EncoderKnob { cc: 29, index: 3 },
    ],
    tempo_knob: Some(26),
    joystick: &[
        JoystickDirection {
            cc: JOYSTICK_X_NEGATIVE,
            action: Action::ArrowLeft,
        },
        JoystickDirection {
            cc: JOYSTICK_X_POSITIVE,
            action: Action::ArrowRight,
        },
        JoystickDirection {
            cc: JOYSTICK_Y_NEGATIVE,
            action: Action::ArrowDown,
        },
        JoystickDirection {
            cc: JOYSTICK_Y_POSITIVE,
            action: Action::ArrowUp,
        },
    ],
    encoder_buttons: &[],
    shift: None,
    mode_buttons: &[],
    layout: Some(ProgramLayout {
        name: "Padio Device",
        pad_cc_start: PAD_CC_START,
        knobs: [
            KnobLayout::relative(24, "Encoder 1"),
            KnobLayout::relative(25, "Encoder 3"),
            KnobLayout::relative(26, "Tempo"),
            KnobLayout::relative(27, "K4"),
            KnobLayout::relative(28, "Encoder 2"),
            KnobLayout::relative(29, "Encoder 4"),
            KnobLayout::relative(30, "K7"),
            KnobLayout::relative(31, "K8"),
        ],
        joystick_x: JOYSTICK_X,
        joystick_y: JOYSTICK_Y,
    }),
    leds: None,
};

pub static PATTERN_LAYOUT: ProgramLayout = ProgramLayout {
    name: "Padio Pattern",
    pad_cc_start: PAD_CC_START,
    knobs: [
        KnobLayout::relative(24, "Duration"),
        KnobLayout::relative(25, "Velocity"),
        KnobLayout::relative(26, "Stutter Count"),
        KnobLayout::relative(27, "Stutter Duration"),
        KnobLayout::relative(28, "Cursor H"),
        KnobLayout::relative(29, "Cursor V"),
        KnobLayout::relative(30, "K7"),
        KnobLayout::relative(31, "K8"),
    ],
    joystick_x: JoystickAxis::DEFAULT_X,
    joystick_y: JoystickAxis::DEFAULT_Y,
};

pub static NOTEPAD_PROFILE: NotePadProfile = NotePadProfile {
    keybed_channel: DEFAULT_KEYBED_CHANNEL,
    channel_pad_cc: 8,
    channel_knob_cc: 24,
    remove_knob_cc: 31,
    layout: ProgramLayout {
        name: "Padio NotePad",
        pad_cc_start: PAD_CC_START,
        knobs: [
            KnobLayout::absolute(24, 1, 16, "Pads Channel"),
            KnobLayout::relative(25, "K2"),
            KnobLayout::relative(26, "K3"),
            KnobLayout::relative(27, "K4"),
            KnobLayout::relative(28, "K5"),
            KnobLayout::relative(29, "K6"),
            KnobLayout::relative(30, "K7"),
            KnobLayout::relative(31, "Remove Note"),
        ],
        joystick_x: JOYSTICK_X,
        joystick_y: JOYSTICK_Y,
    },
};

pub static DEVICE_PROFILE: DeviceProfile = DeviceProfile {
    descriptor: MIDI_DEVICE_DESCRIPTOR,
    default_mode: Mode::PadMixer,
    navigation_mode: Mode::Navigation,
    program_changes: &[
        (0, ProgramChangeTarget::Action(Action::ScreenAudioMixer)),
        (
            1,
            ProgramChangeTarget::ToggleScreen {
                current: Screen::PadGrid,
                then: Action::ScreenPatternEditor,
                otherwise: Action::ScreenPadGrid,
            },
        ),
        (2, ProgramChangeTarget::Action(Action::Tempo)),
        (
            3,
            ProgramChangeTarget::ToggleScreen {
                current: Screen::SceneRecall,
                then: Action::ScreenSnapshot,
                otherwise: Action::ScreenSceneRecall,
            },
        ),
        (4, ProgramChangeTarget::SwitchMode(Mode::PadMixer)),
        (5, ProgramChangeTarget::SwitchMode(Mode::Navigation)),
        (6, ProgramChangeTarget::SwitchMode(Mode::Pattern)),
        (7, ProgramChangeTarget::SwitchMode(Mode::NotePad)),
    ],
    session_toggle: None,
    claim: no_messages,
    release: no_messages,
    sleep_on: no_messages,
    sleep_off: no_messages,
    light_off: no_messages,
};

#[must_use]
pub fn mode_handlers() -> Vec<BoxedModeHandler> {
    vec![
        Box::new(PadMixerHandler::new(&PAD_MIXER_PROFILE)),
        Box::new(NavigationHandler::new(&NAVIGATION_PROFILE)),
        Box::new(PatternHandler::new(&PATTERN_LAYOUT)),
        Box::new(NotePadHandler::new(&NOTEPAD_PROFILE)),
    ]
}

/// Create a driver in pad mixer mode.
#[must_use]
pub fn new_driver<W, O>(app: W, output: O) -> Driver<W, O>
where
    W: Workstation,
    O: MidiOutputConnection,
{
    Driver::new(DEVICE_PROFILE, app, output, mode_handlers())
}
