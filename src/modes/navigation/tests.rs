// SPDX-FileCopyrightText: The padio authors
// SPDX-License-Identifier: MPL-2.0

use float_cmp::assert_approx_eq;

use super::NavigationHandler;
use crate::{
    app::{Action, MediaKind, MediaSource, MediaState, Screen, SwitchPress},
    controller::{
        testing::{contains_text, Fixture},
        Context, Mode, ModeHandler as _,
    },
    devices::{akai_mpk_mini_mk3, novation_launchpad_mini_mk3},
    sysex::grid::{led_message, palette},
    LedMode, TimeStamp,
};

fn ms(millis: u64) -> TimeStamp {
    TimeStamp::from_millis(millis)
}

fn mpk() -> NavigationHandler {
    NavigationHandler::new(&akai_mpk_mini_mk3::NAVIGATION_PROFILE)
}

fn launchpad() -> NavigationHandler {
    NavigationHandler::new(&novation_launchpad_mini_mk3::NAVIGATION_PROFILE)
}

fn cc(handler: &mut NavigationHandler, fixture: &mut Fixture, now: u64, controller: u8, value: u8) {
    let mut ctx = fixture.context(ms(now));
    assert!(handler
        .on_control_change(&mut ctx, 0, controller, value)
        .unwrap());
}

fn note_on(handler: &mut NavigationHandler, fixture: &mut Fixture, now: u64, note: u8) {
    let mut ctx = fixture.context(ms(now));
    assert!(handler.on_note_on(&mut ctx, 0, note, 127).unwrap());
}

fn note_off(handler: &mut NavigationHandler, fixture: &mut Fixture, now: u64, note: u8) -> Option<Mode> {
    let mut ctx = fixture.context(ms(now));
    assert!(handler.on_note_off(&mut ctx, 0, note).unwrap());
    ctx.take_requested_mode()
}

fn poll(handler: &mut NavigationHandler, fixture: &mut Fixture, now: u64) -> Vec<Action> {
    handler.poll_timers(&mut fixture.context(ms(now))).unwrap();
    fixture.app.take_actions()
}

#[test]
fn direct_buttons_fire_on_press() {
    let mut fixture = Fixture::new();
    let mut handler = mpk();
    cc(&mut handler, &mut fixture, 0, 8, 127);
    assert_eq!(vec![Action::ArrowLeft], fixture.app.take_actions());
    cc(&mut handler, &mut fixture, 10, 8, 0);
    assert!(fixture.app.take_actions().is_empty());
}

#[test]
fn short_press_cycles_screens() {
    let mut handler = mpk();

    let mut fixture = Fixture::new();
    cc(&mut handler, &mut fixture, 0, 11, 127);
    cc(&mut handler, &mut fixture, 100, 11, 0);
    assert_eq!(vec![Action::ScreenControl], fixture.app.take_actions());

    let mut fixture = Fixture::new().with_screen(Screen::Control);
    cc(&mut handler, &mut fixture, 0, 11, 127);
    cc(&mut handler, &mut fixture, 100, 11, 0);
    assert_eq!(vec![Action::Preset], fixture.app.take_actions());

    let mut fixture = Fixture::new().with_screen(Screen::Bank);
    cc(&mut handler, &mut fixture, 0, 11, 127);
    cc(&mut handler, &mut fixture, 100, 11, 0);
    assert_eq!(vec![Action::ScreenControl], fixture.app.take_actions());
}

#[test]
fn bold_press_falls_back_to_second_action() {
    let mut fixture = Fixture::new();
    let mut handler = mpk();
    cc(&mut handler, &mut fixture, 0, 11, 127);
    cc(&mut handler, &mut fixture, 500, 11, 0);
    assert_eq!(vec![Action::ScreenPatternEditor], fixture.app.take_actions());

    cc(&mut handler, &mut fixture, 1000, 15, 127);
    cc(&mut handler, &mut fixture, 1500, 15, 0);
    assert_eq!(vec![Action::ScreenAdmin], fixture.app.take_actions());
}

#[test]
fn long_press_fires_while_held() {
    let mut fixture = Fixture::new();
    let mut handler = mpk();
    cc(&mut handler, &mut fixture, 0, 15, 127);
    assert!(poll(&mut handler, &mut fixture, 1999).is_empty());
    assert_eq!(vec![Action::PowerOff], poll(&mut handler, &mut fixture, 2000));
    assert!(poll(&mut handler, &mut fixture, 2050).is_empty());
    cc(&mut handler, &mut fixture, 2100, 15, 0);
    assert!(fixture.app.take_actions().is_empty());
}

#[test]
fn joystick_repeats_until_centered() {
    let mut fixture = Fixture::new();
    let mut handler = mpk();
    cc(&mut handler, &mut fixture, 0, 33, 127);
    assert_eq!(vec![Action::ArrowRight], poll(&mut handler, &mut fixture, 0));
    assert!(poll(&mut handler, &mut fixture, 30).is_empty());
    assert_eq!(vec![Action::ArrowRight], poll(&mut handler, &mut fixture, 50));

    // Within the dead zone
    cc(&mut handler, &mut fixture, 60, 33, 10);
    assert!(poll(&mut handler, &mut fixture, 1000).is_empty());
}

#[test]
fn joystick_deflection_changes_repeat_interval() {
    let mut fixture = Fixture::new();
    let mut handler = mpk();
    cc(&mut handler, &mut fixture, 0, 34, 50);
    assert_eq!(vec![Action::ArrowDown], poll(&mut handler, &mut fixture, 0));
    assert!(poll(&mut handler, &mut fixture, 700).is_empty());
    cc(&mut handler, &mut fixture, 700, 34, 127);
    // The phase of the last firing is preserved
    assert_eq!(vec![Action::ArrowDown], poll(&mut handler, &mut fixture, 700));
}

#[test]
fn encoder_knobs_send_deltas() {
    let mut fixture = Fixture::new();
    let mut handler = mpk();
    cc(&mut handler, &mut fixture, 0, 28, 1);
    cc(&mut handler, &mut fixture, 500, 29, 127);
    assert_eq!(
        vec![
            Action::Encoder { index: 1, delta: 1 },
            Action::Encoder {
                index: 3,
                delta: -1
            },
        ],
        fixture.app.take_actions()
    );
}

#[test]
fn tempo_knob_shows_tempo_screen_temporarily() {
    let mut fixture = Fixture::new();
    let mut handler = mpk();
    cc(&mut handler, &mut fixture, 0, 26, 1);
    assert_eq!(vec![Action::Tempo], fixture.app.take_actions());
    assert_approx_eq!(f32, 120.1, fixture.app.tempo, epsilon = 0.001);
    assert_eq!(0, fixture.uploads());

    assert!(poll(&mut handler, &mut fixture, 1499).is_empty());
    assert_eq!(vec![Action::Back], poll(&mut handler, &mut fixture, 1500));
    assert_eq!(1, fixture.uploads());
    assert!(contains_text(&fixture.output.messages[0], "Padio Device"));
}

#[test]
fn tempo_knob_on_tempo_screen_extends_timeout() {
    let mut fixture = Fixture::new();
    let mut handler = mpk();
    cc(&mut handler, &mut fixture, 0, 26, 1);
    fixture.app.take_actions();
    fixture.screen = Some(Screen::Tempo);
    cc(&mut handler, &mut fixture, 1000, 26, 1);
    assert!(fixture.app.take_actions().is_empty());
    assert!(poll(&mut handler, &mut fixture, 1500).is_empty());
    assert_eq!(vec![Action::Back], poll(&mut handler, &mut fixture, 2500));
}

#[test]
fn deactivate_cancels_timers() {
    let mut fixture = Fixture::new();
    let mut handler = mpk();
    cc(&mut handler, &mut fixture, 0, 26, 1);
    cc(&mut handler, &mut fixture, 0, 33, 127);
    fixture.app.take_actions();
    handler.deactivate(&mut fixture.context(ms(10))).unwrap();
    assert!(poll(&mut handler, &mut fixture, 5000).is_empty());
    assert_eq!(0, fixture.uploads());
}

#[test]
fn program_buttons_respect_alt_mode() {
    let mut fixture = Fixture::new();
    let mut handler = launchpad();
    note_on(&mut handler, &mut fixture, 0, 74);
    assert_eq!(vec![Action::ProgramChange(1)], fixture.app.take_actions());

    note_on(&mut handler, &mut fixture, 0, 71);
    assert!(handler.is_alt());
    assert_eq!(vec![Action::ToggleAltMode], fixture.app.take_actions());

    note_on(&mut handler, &mut fixture, 0, 44);
    assert_eq!(vec![Action::ProgramChange(8)], fixture.app.take_actions());
}

#[test]
fn shifted_presses_are_ignored() {
    let mut fixture = Fixture::new();
    let mut handler = launchpad();
    cc(&mut handler, &mut fixture, 0, 19, 127);
    note_on(&mut handler, &mut fixture, 0, 52);
    assert!(fixture.app.take_actions().is_empty());
    cc(&mut handler, &mut fixture, 0, 19, 0);
    note_on(&mut handler, &mut fixture, 0, 52);
    assert_eq!(vec![Action::ArrowUp], fixture.app.take_actions());
}

#[test]
fn encoder_buttons_repeat_while_held() {
    let mut fixture = Fixture::new();
    let mut handler = launchpad();
    note_on(&mut handler, &mut fixture, 0, 86);
    let decrement = Action::Encoder {
        index: 0,
        delta: -1,
    };
    assert_eq!(vec![decrement], poll(&mut handler, &mut fixture, 0));
    assert_eq!(vec![decrement], poll(&mut handler, &mut fixture, 120));
    assert_eq!(None, note_off(&mut handler, &mut fixture, 130, 86));
    assert!(poll(&mut handler, &mut fixture, 500).is_empty());
}

#[test]
fn encoder_switch_distinguishes_bold_press() {
    let mut fixture = Fixture::new();
    let mut handler = launchpad();
    note_on(&mut handler, &mut fixture, 0, 78);
    note_off(&mut handler, &mut fixture, 400, 78);
    assert_eq!(
        vec![Action::EncoderSwitch {
            index: 1,
            press: SwitchPress::Bold
        }],
        fixture.app.take_actions()
    );
}

#[test]
fn mode_buttons_act_on_release() {
    let mut fixture = Fixture::new();
    let mut handler = launchpad();
    note_on(&mut handler, &mut fixture, 0, 13);
    assert_eq!(
        Some(Mode::GridMixer),
        note_off(&mut handler, &mut fixture, 10, 13)
    );
    assert!(fixture.app.take_actions().is_empty());

    note_on(&mut handler, &mut fixture, 20, 15);
    assert_eq!(None, note_off(&mut handler, &mut fixture, 30, 15));
    assert_eq!(vec![Action::ScreenPatternEditor], fixture.app.take_actions());
}

#[test]
fn activate_lights_buttons() {
    let mut fixture = Fixture::new().with_screen(Screen::AudioMixer);
    let mut handler = launchpad();
    handler.on_previous_mode_changed(Mode::GridMixer);
    handler.activate(&mut fixture.context(ms(0))).unwrap();
    let messages = fixture.output.take_messages();
    let lit = |led, color, mode| messages.contains(&led_message(led, color, mode).to_vec());
    assert!(lit(99, palette::YELLOW, LedMode::Static));
    assert!(lit(52, palette::YELLOW, LedMode::Static));
    assert!(lit(82, palette::GREEN, LedMode::Static));
    assert!(lit(81, palette::BLUE, LedMode::Static));
    assert!(lit(13, palette::GREEN, LedMode::Pulsing));
    assert!(lit(14, palette::RED, LedMode::Static));
    assert!(lit(63, palette::BLUE_SKY, LedMode::Static));
    assert_eq!(0, fixture.uploads());
}

#[test]
fn media_state_flashes_transport_buttons() {
    let mut fixture = Fixture::new();
    let mut handler = launchpad();
    let playing = MediaState {
        source: MediaSource::Midi,
        kind: MediaKind::Player,
        active: true,
    };
    handler
        .on_media_state_changed(&mut fixture.context(ms(0)), playing)
        .unwrap();
    assert!(handler.is_playing());
    assert!(!handler.is_recording());
    assert!(fixture
        .output
        .take_messages()
        .contains(&led_message(63, palette::GREEN, LedMode::Flashing).to_vec()));

    handler
        .on_media_state_changed(
            &mut fixture.context(ms(0)),
            MediaState {
                active: false,
                ..playing
            },
        )
        .unwrap();
    assert!(!handler.is_playing());
}

#[test]
fn inactive_handler_sends_no_leds() {
    let mut fixture = Fixture::new();
    let mut handler = launchpad();
    let mut ctx = Context::new(
        &mut fixture.app,
        &mut fixture.output,
        &mut fixture.state,
        None,
        ms(0),
        false,
    );
    handler
        .on_media_state_changed(
            &mut ctx,
            MediaState {
                source: MediaSource::Audio,
                kind: MediaKind::Recorder,
                active: true,
            },
        )
        .unwrap();
    assert!(handler.is_recording());
    assert!(fixture.output.messages.is_empty());
}
