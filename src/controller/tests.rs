// SPDX-FileCopyrightText: The padio authors
// SPDX-License-Identifier: MPL-2.0

use super::{
    testing::{contains_text, program_uploads, RecordingOutput, RecordingWorkstation},
    Driver, Mode, SharedDriver,
};
use crate::{
    app::{Action, Screen, Signal, WorkstationObserver as _},
    devices::{akai_mpk_mini_mk3, novation_launchpad_mini_mk3},
    sysex::grid::{self, Layout},
    Clock, MidiEvent, MidiInputHandler as _, TimeStamp,
};

type TestDriver = Driver<RecordingWorkstation, RecordingOutput>;

const PADS_CHANNEL: u8 = 9;

fn mpk() -> TestDriver {
    let mut driver =
        akai_mpk_mini_mk3::new_driver(RecordingWorkstation::with_chains(8), RecordingOutput::default());
    driver.init(TimeStamp::default()).unwrap();
    driver
}

fn launchpad() -> TestDriver {
    let mut driver = novation_launchpad_mini_mk3::new_driver(
        RecordingWorkstation::with_chains(8),
        RecordingOutput::default(),
    );
    driver.init(TimeStamp::default()).unwrap();
    driver
}

fn program_change(driver: &mut TestDriver, program: u8) -> bool {
    driver
        .handle_event(
            MidiEvent::ProgramChange {
                channel: PADS_CHANNEL,
                program,
            },
            TimeStamp::default(),
        )
        .unwrap()
}

fn control_change(driver: &mut TestDriver, controller: u8, value: u8) -> bool {
    driver
        .handle_event(
            MidiEvent::ControlChange {
                channel: 0,
                controller,
                value,
            },
            TimeStamp::default(),
        )
        .unwrap()
}

#[test]
fn init_activates_default_mode() {
    let mut driver = mpk();
    assert!(driver.is_initialized());
    assert_eq!(Mode::PadMixer, driver.current_mode());
    let messages = driver.output_mut().take_messages();
    let uploads = program_uploads(&messages);
    assert_eq!(1, uploads.len());
    assert!(contains_text(uploads[0], "Padio MixPad"));
    assert_eq!(
        vec![Signal::ScreenChanged, Signal::MediaStateChanged],
        driver.app().subscriptions
    );
}

#[test]
fn nothing_is_sent_before_init() {
    let mut driver =
        akai_mpk_mini_mk3::new_driver(RecordingWorkstation::with_chains(8), RecordingOutput::default());
    assert!(!program_change(&mut driver, 6));
    driver.switch_mode(Mode::Pattern, TimeStamp::default()).unwrap();
    assert_eq!(Mode::Pattern, driver.current_mode());
    assert!(driver.output().messages.is_empty());
}

#[test]
fn switching_to_current_mode_sends_nothing() {
    let mut driver = mpk();
    driver.output_mut().take_messages();
    assert!(program_change(&mut driver, 4));
    assert_eq!(Mode::PadMixer, driver.current_mode());
    assert!(driver.output().messages.is_empty());
}

#[test]
fn program_change_switches_mode_with_single_upload() {
    let mut driver = mpk();
    driver.output_mut().take_messages();
    assert!(program_change(&mut driver, 6));
    assert_eq!(Mode::Pattern, driver.current_mode());
    assert_eq!(Mode::PadMixer, driver.previous_mode());
    let messages = driver.output_mut().take_messages();
    let uploads = program_uploads(&messages);
    assert_eq!(1, uploads.len());
    assert!(contains_text(uploads[0], "Padio Pattern"));
    assert!(contains_text(uploads[0], "Stutter Count"));
}

#[test]
fn unmapped_program_change_is_ignored() {
    let mut driver = mpk();
    driver.output_mut().take_messages();
    assert!(!program_change(&mut driver, 42));
    assert_eq!(Mode::PadMixer, driver.current_mode());
    assert!(driver.output().messages.is_empty());
    assert!(driver.app().actions.is_empty());
}

#[test]
fn program_change_toggles_screens() {
    let mut driver = mpk();
    assert!(program_change(&mut driver, 0));
    assert!(program_change(&mut driver, 1));
    driver.on_screen_changed(Screen::PadGrid);
    assert_eq!(Some(Screen::PadGrid), driver.screen());
    assert!(program_change(&mut driver, 1));
    assert_eq!(
        vec![
            Action::ScreenAudioMixer,
            Action::ScreenPadGrid,
            Action::ScreenPatternEditor
        ],
        driver.app_mut().take_actions()
    );
}

#[test]
fn previous_mode_excludes_navigation() {
    let mut driver = mpk();
    assert!(program_change(&mut driver, 5));
    assert_eq!(Mode::Navigation, driver.current_mode());
    assert_eq!(Mode::PadMixer, driver.previous_mode());
    assert!(program_change(&mut driver, 7));
    assert_eq!(Mode::NotePad, driver.current_mode());
    assert_eq!(Mode::PadMixer, driver.previous_mode());

    driver.toggle_navigation(TimeStamp::default()).unwrap();
    assert_eq!(Mode::Navigation, driver.current_mode());
    assert_eq!(Mode::NotePad, driver.previous_mode());
    driver.toggle_navigation(TimeStamp::default()).unwrap();
    assert_eq!(Mode::NotePad, driver.current_mode());
}

#[test]
fn unsupported_mode_is_ignored() {
    let mut driver = mpk();
    driver.output_mut().take_messages();
    driver
        .switch_mode(Mode::GridMixer, TimeStamp::default())
        .unwrap();
    assert_eq!(Mode::PadMixer, driver.current_mode());
    assert!(driver.output().messages.is_empty());
}

#[test]
fn end_unsubscribes_signals() {
    let mut driver = mpk();
    driver.end(TimeStamp::default()).unwrap();
    assert!(!driver.is_initialized());
    assert!(driver.app().subscriptions.is_empty());
    assert!(!program_change(&mut driver, 6));
}

#[test]
fn state_file_is_saved_on_end() {
    let path = std::env::temp_dir().join(format!("padio-state-{}.json", std::process::id()));
    std::fs::remove_file(&path).ok();
    let mut driver =
        akai_mpk_mini_mk3::new_driver(RecordingWorkstation::with_chains(8), RecordingOutput::default())
            .with_state_file(&path);
    driver.init(TimeStamp::default()).unwrap();
    let mut state = driver.state().clone();
    state.set_pad_note(0, 60);
    driver.set_state(state.clone());
    driver.end(TimeStamp::default()).unwrap();

    let mut driver =
        akai_mpk_mini_mk3::new_driver(RecordingWorkstation::with_chains(8), RecordingOutput::default())
            .with_state_file(&path);
    driver.init(TimeStamp::default()).unwrap();
    assert_eq!(&state, driver.state());
    std::fs::remove_file(&path).ok();
}

#[test]
fn launchpad_claim_and_release() {
    let mut driver = launchpad();
    assert_eq!(Mode::GridMixer, driver.current_mode());
    let messages = driver.output_mut().take_messages();
    assert_eq!(
        vec![
            grid::set_leds_enabled(true),
            grid::set_daw_mode(true),
            grid::select_layout(Layout::Session),
        ],
        messages[..3]
    );
    driver.end(TimeStamp::default()).unwrap();
    let messages = driver.output_mut().take_messages();
    assert_eq!(
        vec![grid::set_daw_mode(false), grid::select_layout(Layout::Keys)],
        messages[messages.len() - 2..]
    );
}

#[test]
fn session_button_toggles_navigation_on_release() {
    let mut driver = launchpad();
    assert!(control_change(&mut driver, 95, 127));
    assert_eq!(Mode::GridMixer, driver.current_mode());
    assert!(control_change(&mut driver, 95, 0));
    assert_eq!(Mode::Navigation, driver.current_mode());
    assert!(control_change(&mut driver, 95, 127));
    assert!(control_change(&mut driver, 95, 0));
    assert_eq!(Mode::GridMixer, driver.current_mode());
}

#[test]
fn neighbouring_button_suppresses_next_toggle() {
    let mut driver = launchpad();
    control_change(&mut driver, 96, 127);
    control_change(&mut driver, 96, 0);
    assert!(control_change(&mut driver, 95, 0));
    assert_eq!(Mode::GridMixer, driver.current_mode());
    assert!(control_change(&mut driver, 95, 0));
    assert_eq!(Mode::Navigation, driver.current_mode());
}

#[test]
fn mode_button_leaves_navigation() {
    let mut driver = launchpad();
    driver
        .switch_mode(Mode::Navigation, TimeStamp::default())
        .unwrap();
    let note = 13;
    assert!(driver
        .handle_event(
            MidiEvent::NoteOn {
                channel: 0,
                note,
                velocity: 127
            },
            TimeStamp::default(),
        )
        .unwrap());
    assert_eq!(Mode::Navigation, driver.current_mode());
    assert!(driver
        .handle_event(MidiEvent::NoteOff { channel: 0, note }, TimeStamp::default())
        .unwrap());
    assert_eq!(Mode::GridMixer, driver.current_mode());
}

#[test]
fn shared_driver_decodes_raw_input() {
    let mut shared = SharedDriver::new(mpk(), Clock::start());
    assert!(shared.handle_midi_input(TimeStamp::default(), &[0xc0 | PADS_CHANNEL, 6]));
    assert!(!shared.handle_midi_input(TimeStamp::default(), &[0xf8]));
    assert_eq!(
        Some(Mode::Pattern),
        shared.with_driver(|driver, _now| driver.current_mode())
    );
    shared.poll_timers();
}
