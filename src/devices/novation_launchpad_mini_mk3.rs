// SPDX-FileCopyrightText: The padio authors
// SPDX-License-Identifier: MPL-2.0

//! Novation Launchpad Mini MK3
//!
//! 8x8 pad grid with a row of buttons on top and a column of buttons
//! on the right. The device is operated in DAW mode and all LEDs are
//! controlled by the driver.
//!
//! The button labeled "Session" (CC 95) toggles between navigation
//! and the previous mode. Releasing one of the neighbouring buttons
//! (CC 96..=98) instead suppresses the next toggle.

use std::borrow::Cow;

use crate::{
    app::{Action, Screen, SwitchPress, Workstation},
    controller::{BoxedModeHandler, DeviceProfile, Driver, Mode, SessionToggle},
    modes::{
        grid_mixer::{FunctionButton, GridFunction},
        navigation::{
            ButtonRole, ButtonSource, DirectButton, EncoderButtons, ModeButton, ModeButtonTarget,
            NavigationLeds, TimedButton,
        },
        GridMixerHandler, GridMixerProfile, NavigationHandler, NavigationProfile,
    },
    sysex::grid::{self, palette, Layout},
    DeviceDescriptor, MidiDeviceDescriptor, MidiOutputConnection,
};

pub const MIDI_DEVICE_DESCRIPTOR: &MidiDeviceDescriptor = &MidiDeviceDescriptor {
    device: DeviceDescriptor {
        vendor_name: Cow::Borrowed("Novation"),
        product_name: Cow::Borrowed("Launchpad Mini MK3"),
    },
    port_name_prefix: "Launchpad Mini MK3",
};

pub const DEVICE_DESCRIPTOR: &DeviceDescriptor = &MIDI_DEVICE_DESCRIPTOR.device;

/// The logo LED above the right column
pub const LOGO_LED: u8 = 99;

pub const SESSION_BUTTON: u8 = 95;

const SHIFT_BUTTON: u8 = 19;

pub static GRID_MIXER_PROFILE: GridMixerProfile = GridMixerProfile {
    function_buttons: &[
        FunctionButton {
            cc: 91,
            function: GridFunction::Volume,
            color: palette::BLUE_SKY,
        },
        FunctionButton {
            cc: 92,
            function: GridFunction::Pan,
            color: palette::GREEN,
        },
        FunctionButton {
            cc: 93,
            function: GridFunction::Solo,
            color: palette::YELLOW,
        },
        FunctionButton {
            cc: 94,
            function: GridFunction::Mute,
            color: palette::RED,
        },
    ],
    bank_buttons: [89, 79],
    track_note_start: 11,
    fader_cc_start: 21,
    fader_channel: 4,
    logo: LOGO_LED,
    logo_color: palette::GREEN,
};

const fn encoder_switch(id: u8, index: u8) -> TimedButton {
    TimedButton {
        id,
        role: ButtonRole::EncoderSwitch,
        actions: match index {
            0 => &[Action::EncoderSwitch {
                index: 0,
                press: SwitchPress::Short,
            }],
            1 => &[Action::EncoderSwitch {
                index: 1,
                press: SwitchPress::Short,
            }],
            2 => &[Action::EncoderSwitch {
                index: 2,
                press: SwitchPress::Short,
            }],
            _ => &[Action::EncoderSwitch {
                index: 3,
                press: SwitchPress::Short,
            }],
        },
        screens: &[],
        bold: Some(Action::EncoderSwitch {
            index,
            press: SwitchPress::Bold,
        }),
        long: None,
    }
}

const fn encoder_buttons(switch: u8, index: u8) -> EncoderButtons {
    EncoderButtons {
        index,
        decrement: switch - 2,
        increment: switch - 1,
    }
}

pub static NAVIGATION_PROFILE: NavigationProfile = NavigationProfile {
    source: ButtonSource::Note,
    buttons: &[
        DirectButton {
            id: 52,
            action: Action::ArrowUp,
            color: palette::YELLOW,
        },
        DirectButton {
            id: 42,
            action: Action::ArrowDown,
            color: palette::YELLOW,
        },
        DirectButton {
            id: 41,
            action: Action::ArrowLeft,
            color: palette::YELLOW,
        },
        DirectButton {
            id: 43,
            action: Action::ArrowRight,
            color: palette::YELLOW,
        },
        DirectButton {
            id: 53,
            action: Action::SELECT,
            color: palette::GREEN,
        },
        DirectButton {
            id: 51,
            action: Action::Back,
            color: palette::RED,
        },
    ],
    timed_buttons: &[
        TimedButton {
            id: 81,
            role: ButtonRole::Screen,
            actions: &[Action::Menu, Action::ScreenAdmin],
            screens: &[(Screen::Options, 0), (Screen::MainMenu, 0), (Screen::Admin, 1)],
            bold: None,
            long: Some(Action::PowerOff),
        },
        TimedButton {
            id: 82,
            role: ButtonRole::Screen,
            actions: &[Action::ScreenAudioMixer, Action::ScreenAlsaMixer],
            screens: &[(Screen::AudioMixer, 0), (Screen::AlsaMixer, 1)],
            bold: None,
            long: None,
        },
        TimedButton {
            id: 83,
            role: ButtonRole::Screen,
            actions: &[Action::ScreenControl, Action::Preset, Action::ScreenBank],
            screens: &[
                (Screen::Control, 0),
                (Screen::Engine, 0),
                (Screen::Preset, 1),
                (Screen::Bank, 1),
            ],
            bold: None,
            long: Some(Action::PresetFav),
        },
        TimedButton {
            id: 84,
            role: ButtonRole::Screen,
            actions: &[Action::ScreenSceneRecall, Action::ScreenSnapshot],
            screens: &[(Screen::SceneRecall, 0), (Screen::Snapshot, 1)],
            bold: None,
            long: None,
        },
        TimedButton {
            id: 73,
            role: ButtonRole::Screen,
            actions: &[Action::ScreenPadGrid, Action::ScreenPatternEditor],
            screens: &[
                (Screen::PadGrid, 0),
                (Screen::PatternEditor, 1),
                (Screen::Arranger, 1),
            ],
            bold: None,
            long: Some(Action::ScreenArranger),
        },
        TimedButton {
            id: 72,
            role: ButtonRole::Screen,
            actions: &[Action::Tempo],
            screens: &[(Screen::Tempo, 0)],
            bold: None,
            long: None,
        },
        TimedButton {
            id: 61,
            role: ButtonRole::Record,
            actions: &[Action::ToggleRecord],
            screens: &[],
            bold: None,
            long: None,
        },
        TimedButton {
            id: 62,
            role: ButtonRole::Stop,
            actions: &[Action::Stop],
            screens: &[],
            bold: Some(Action::AllSoundsOff),
            long: None,
        },
        TimedButton {
            id: 63,
            role: ButtonRole::Play,
            actions: &[Action::TogglePlay],
            screens: &[],
            bold: Some(Action::AudioFileList),
            long: None,
        },
        encoder_switch(88, 0),
        encoder_switch(78, 1),
        encoder_switch(68, 2),
        encoder_switch(58, 3),
    ],
    program_buttons: &[74, 64, 54, 44],
    alt_button: Some(71),
    encoders: &[],
    tempo_knob: None,
    joystick: &[],
    encoder_buttons: &[
        encoder_buttons(88, 0),
        encoder_buttons(78, 1),
        encoder_buttons(68, 2),
        encoder_buttons(58, 3),
    ],
    shift: Some(SHIFT_BUTTON),
    mode_buttons: &[
        ModeButton {
            id: 13,
            target: ModeButtonTarget::Mode(Mode::GridMixer),
            color: palette::GREEN,
        },
        ModeButton {
            id: 14,
            target: ModeButtonTarget::Action(Action::ScreenPadGrid),
            color: palette::RED,
        },
        ModeButton {
            id: 15,
            target: ModeButtonTarget::Action(Action::ScreenPatternEditor),
            color: palette::BLUE,
        },
    ],
    layout: None,
    leds: Some(NavigationLeds {
        logo: LOGO_LED,
        encoder_decrement: palette::AMBER,
        encoder_increment: palette::ORANGE,
        encoder_switch: palette::LIME,
    }),
};

fn claim() -> Vec<Vec<u8>> {
    vec![
        grid::set_leds_enabled(true),
        grid::set_daw_mode(true),
        grid::select_layout(Layout::Session),
    ]
}

fn release() -> Vec<Vec<u8>> {
    vec![grid::set_daw_mode(false), grid::select_layout(Layout::Keys)]
}

fn sleep_on() -> Vec<Vec<u8>> {
    vec![grid::set_leds_enabled(false)]
}

fn sleep_off() -> Vec<Vec<u8>> {
    vec![grid::set_leds_enabled(true)]
}

fn light_off() -> Vec<Vec<u8>> {
    vec![grid::clear_daw_state()]
}

pub static DEVICE_PROFILE: DeviceProfile = DeviceProfile {
    descriptor: MIDI_DEVICE_DESCRIPTOR,
    default_mode: Mode::GridMixer,
    navigation_mode: Mode::Navigation,
    program_changes: &[],
    session_toggle: Some(SessionToggle {
        controller: SESSION_BUTTON,
        suppressing_controllers: &[96, 97, 98],
    }),
    claim,
    release,
    sleep_on,
    sleep_off,
    light_off,
};

#[must_use]
pub fn mode_handlers() -> Vec<BoxedModeHandler> {
    vec![
        Box::new(GridMixerHandler::new(&GRID_MIXER_PROFILE)),
        Box::new(NavigationHandler::new(&NAVIGATION_PROFILE)),
    ]
}

/// Create a driver in grid mixer mode.
#[must_use]
pub fn new_driver<W, O>(app: W, output: O) -> Driver<W, O>
where
    W: Workstation,
    O: MidiOutputConnection,
{
    Driver::new(DEVICE_PROFILE, app, output, mode_handlers())
}
