// SPDX-FileCopyrightText: The padio authors
// SPDX-License-Identifier: MPL-2.0

use float_cmp::assert_approx_eq;

use super::{KnobFunction, PadMixerHandler};
use crate::{
    app::{Action, Screen},
    controller::{
        testing::{Fixture, RecordingWorkstation},
        ModeHandler as _,
    },
    devices::akai_mpk_mini_mk3::PAD_MIXER_PROFILE,
    modes::Bank,
    TimeStamp,
};

const PAD_VOLUME_A: u8 = 8;
const PAD_PAN_A: u8 = 9;
const PAD_MUTE_A: u8 = 10;
const PAD_VOLUME_B: u8 = 16;
const PAD_PANIC_A: u8 = 12;
const PAD_AUDIO_RECORD: u8 = 13;
const PAD_PAN_B: u8 = 17;
const PAD_MIDI_PLAY: u8 = 23;
const KNOB_1: u8 = 24;
const KNOB_2: u8 = 25;
const KNOB_3: u8 = 26;

fn cc(handler: &mut PadMixerHandler, fixture: &mut Fixture, controller: u8, value: u8) -> bool {
    let mut ctx = fixture.context(TimeStamp::default());
    handler
        .on_control_change(&mut ctx, 9, controller, value)
        .unwrap()
}

#[test]
fn activate_uploads_layout() {
    let mut fixture = Fixture::new();
    let mut handler = PadMixerHandler::new(&PAD_MIXER_PROFILE);
    handler
        .activate(&mut fixture.context(TimeStamp::default()))
        .unwrap();
    assert_eq!(1, fixture.uploads());
    let upload = &fixture.output.messages[0];
    assert!(crate::controller::testing::contains_text(upload, "Padio MixPad"));
    assert!(crate::controller::testing::contains_text(upload, "Chain 1/9"));
}

#[test]
fn full_strength_press_selects_chain_on_live_screen() {
    let mut fixture = Fixture::new().with_screen(Screen::AudioMixer);
    let mut handler = PadMixerHandler::new(&PAD_MIXER_PROFILE);
    // Third pad of bank A, index 0 is the main chain
    assert!(cc(&mut handler, &mut fixture, PAD_MUTE_A, 127));
    let expected = fixture.app.chains[2].id;
    assert_eq!(Some(expected), fixture.app.active_chain);
    assert_eq!(KnobFunction::Volume, handler.knob_function());
    assert!(fixture.app.actions.is_empty());

    // Release cancels the override without side effects
    fixture.app.active_chain = None;
    assert!(cc(&mut handler, &mut fixture, PAD_MUTE_A, 0));
    assert_eq!(None, fixture.app.active_chain);
    assert_eq!(KnobFunction::Volume, handler.knob_function());
    assert_eq!(Bank::A, handler.bank());
}

#[test]
fn full_strength_press_on_main_chain_is_ignored() {
    let mut fixture = Fixture::new().with_screen(Screen::PadGrid);
    let mut handler = PadMixerHandler::new(&PAD_MIXER_PROFILE);
    assert!(cc(&mut handler, &mut fixture, PAD_VOLUME_A, 127));
    assert_eq!(None, fixture.app.active_chain);
}

#[test]
fn full_strength_press_on_bank_b_pad_selects_chain_of_bank_b() {
    let mut fixture = Fixture::new().with_screen(Screen::AudioMixer);
    fixture.app = RecordingWorkstation::with_chains(12);
    let mut handler = PadMixerHandler::new(&PAD_MIXER_PROFILE);
    assert!(cc(&mut handler, &mut fixture, PAD_VOLUME_B, 127));
    let expected = fixture.app.chains[8].id;
    assert_eq!(Some(expected), fixture.app.active_chain);
    assert_eq!(Bank::A, handler.bank());

    assert!(cc(&mut handler, &mut fixture, PAD_PAN_B, 127));
    let expected = fixture.app.chains[9].id;
    assert_eq!(Some(expected), fixture.app.active_chain);
    assert_eq!(KnobFunction::Volume, handler.knob_function());
}

#[test]
fn full_strength_press_outside_live_screens_is_a_regular_press() {
    let mut fixture = Fixture::new().with_screen(Screen::Preset);
    let mut handler = PadMixerHandler::new(&PAD_MIXER_PROFILE);
    assert!(cc(&mut handler, &mut fixture, PAD_AUDIO_RECORD, 127));
    assert_eq!(None, fixture.app.active_chain);
    assert_eq!(vec![Action::ToggleAudioRecord], fixture.app.take_actions());
}

#[test]
fn bank_is_sticky_until_release() {
    let mut fixture = Fixture::new().with_screen(Screen::AudioMixer);
    let mut handler = PadMixerHandler::new(&PAD_MIXER_PROFILE);
    assert!(cc(&mut handler, &mut fixture, PAD_PAN_B, 80));
    assert_eq!(Bank::B, handler.bank());
    assert_eq!(KnobFunction::Pan, handler.knob_function());

    // Knobs address the chains of bank B while the pad is held
    assert!(cc(&mut handler, &mut fixture, KNOB_1, 5));
    let channel = fixture.app.chains[8].mixer_channel;
    assert_approx_eq!(f32, 0.05, fixture.app.balances[&channel]);

    assert!(cc(&mut handler, &mut fixture, PAD_PAN_B, 0));
    assert_eq!(Bank::A, handler.bank());
    assert_eq!(KnobFunction::Pan, handler.knob_function());
}

#[test]
fn function_pads_are_ignored_outside_live_screens() {
    let mut fixture = Fixture::new().with_screen(Screen::Control);
    let mut handler = PadMixerHandler::new(&PAD_MIXER_PROFILE);
    assert!(cc(&mut handler, &mut fixture, PAD_PAN_A, 80));
    assert_eq!(KnobFunction::Volume, handler.knob_function());
    assert!(cc(&mut handler, &mut fixture, KNOB_1, 1));
    assert!(fixture.app.levels.is_empty());
}

#[test]
fn volume_knob_applies_scaled_delta_and_clamps() {
    let mut fixture = Fixture::new().with_screen(Screen::AudioMixer);
    let mut handler = PadMixerHandler::new(&PAD_MIXER_PROFILE);
    // Knobs address the chains by their index, the third knob the second chain
    let channel = fixture.app.chains[2].mixer_channel;
    fixture.app.levels.insert(channel, 0.5);

    assert!(cc(&mut handler, &mut fixture, KNOB_3, 3));
    assert_approx_eq!(f32, 0.53, fixture.app.levels[&channel]);

    // 127 = one tick down
    assert!(cc(&mut handler, &mut fixture, KNOB_3, 127));
    assert_approx_eq!(f32, 0.52, fixture.app.levels[&channel]);

    assert!(cc(&mut handler, &mut fixture, KNOB_3, 63));
    assert!(cc(&mut handler, &mut fixture, KNOB_3, 63));
    assert_approx_eq!(f32, 1.0, fixture.app.levels[&channel]);
}

#[test]
fn mute_knob_uses_midpoint() {
    let mut fixture = Fixture::new().with_screen(Screen::AudioMixer);
    let mut handler = PadMixerHandler::new(&PAD_MIXER_PROFILE);
    assert!(cc(&mut handler, &mut fixture, PAD_MUTE_A, 90));
    assert!(cc(&mut handler, &mut fixture, PAD_MUTE_A, 0));
    let channel = fixture.app.chains[1].mixer_channel;

    assert!(cc(&mut handler, &mut fixture, KNOB_2, 1));
    assert_eq!(Some(&true), fixture.app.mutes.get(&channel));
    assert!(cc(&mut handler, &mut fixture, KNOB_2, 127));
    assert_eq!(Some(&false), fixture.app.mutes.get(&channel));
}

#[test]
fn first_knob_of_bank_a_skips_main_chain() {
    let mut fixture = Fixture::new().with_screen(Screen::AudioMixer);
    let mut handler = PadMixerHandler::new(&PAD_MIXER_PROFILE);
    assert!(fixture.app.chains[0].is_main());
    assert!(cc(&mut handler, &mut fixture, KNOB_1, 5));
    assert!(fixture.app.levels.is_empty());
}

#[test]
fn missing_chain_is_ignored() {
    let mut fixture = Fixture::new().with_screen(Screen::AudioMixer);
    fixture.app.chains.truncate(2);
    let mut handler = PadMixerHandler::new(&PAD_MIXER_PROFILE);
    assert!(cc(&mut handler, &mut fixture, KNOB_3, 1));
    assert!(fixture.app.levels.is_empty());
}

#[test]
fn transport_pads_act_on_press_only() {
    let mut fixture = Fixture::new();
    let mut handler = PadMixerHandler::new(&PAD_MIXER_PROFILE);
    assert!(cc(&mut handler, &mut fixture, PAD_PANIC_A, 60));
    assert!(cc(&mut handler, &mut fixture, PAD_PANIC_A, 0));
    assert!(cc(&mut handler, &mut fixture, PAD_MIDI_PLAY, 60));
    assert!(cc(&mut handler, &mut fixture, PAD_MIDI_PLAY, 0));
    assert_eq!(
        vec![
            Action::AllSoundsOff,
            Action::StopMidiPlay,
            Action::StopAudioPlay,
            Action::ToggleMidiPlay,
        ],
        fixture.app.take_actions()
    );
}
