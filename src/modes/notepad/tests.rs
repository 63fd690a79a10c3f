// SPDX-FileCopyrightText: The padio authors
// SPDX-License-Identifier: MPL-2.0

use super::NotePadHandler;
use crate::{
    controller::{
        testing::{contains_text, Fixture},
        ModeHandler as _,
    },
    devices::akai_mpk_mini_mk3::NOTEPAD_PROFILE,
    midi::note_off_message,
    TimeStamp,
};

const PADS: u8 = 9;
const KEYBED: u8 = 0;
const CHANNEL_PAD: u8 = 8;
const CHANNEL_KNOB: u8 = 24;
const REMOVE_KNOB: u8 = 31;

fn note_on(handler: &mut NotePadHandler, fixture: &mut Fixture, channel: u8, note: u8) -> bool {
    let mut ctx = fixture.context(TimeStamp::default());
    handler.on_note_on(&mut ctx, channel, note, 100).unwrap()
}

fn note_off(handler: &mut NotePadHandler, fixture: &mut Fixture, channel: u8, note: u8) {
    let mut ctx = fixture.context(TimeStamp::default());
    assert!(handler.on_note_off(&mut ctx, channel, note).unwrap());
}

fn cc(handler: &mut NotePadHandler, fixture: &mut Fixture, controller: u8, value: u8) {
    let mut ctx = fixture.context(TimeStamp::default());
    assert!(handler
        .on_control_change(&mut ctx, PADS, controller, value)
        .unwrap());
}

#[test]
fn activate_uploads_layout() {
    let mut fixture = Fixture::new();
    let mut handler = NotePadHandler::new(&NOTEPAD_PROFILE);
    handler
        .activate(&mut fixture.context(TimeStamp::default()))
        .unwrap();
    assert_eq!(1, fixture.uploads());
    assert!(contains_text(&fixture.output.messages[0], "Padio NotePad"));
}

#[test]
fn assign_keybed_note_to_held_pad() {
    let mut fixture = Fixture::new();
    let mut handler = NotePadHandler::new(&NOTEPAD_PROFILE);
    assert!(note_on(&mut handler, &mut fixture, PADS, 3));
    assert!(note_on(&mut handler, &mut fixture, KEYBED, 67));
    assert!(handler.has_pending_edits());
    note_off(&mut handler, &mut fixture, KEYBED, 67);
    assert_eq!(0, fixture.uploads());

    note_off(&mut handler, &mut fixture, PADS, 3);
    assert_eq!(67, fixture.state.pad_notes()[3]);
    assert!(!handler.has_pending_edits());
    assert_eq!(1, fixture.uploads());
}

#[test]
fn pad_without_keybed_note_changes_nothing() {
    let mut fixture = Fixture::new();
    let mut handler = NotePadHandler::new(&NOTEPAD_PROFILE);
    let state = fixture.state.clone();
    assert!(note_on(&mut handler, &mut fixture, PADS, 3));
    note_off(&mut handler, &mut fixture, PADS, 3);
    assert_eq!(state, fixture.state);
    assert_eq!(0, fixture.uploads());
}

#[test]
fn assigned_notes_are_not_assigned_twice() {
    let mut fixture = Fixture::new();
    let mut handler = NotePadHandler::new(&NOTEPAD_PROFILE);
    assert!(note_on(&mut handler, &mut fixture, PADS, 3));
    // Default note of pad 5
    assert!(note_on(&mut handler, &mut fixture, KEYBED, 5));
    assert!(!handler.has_pending_edits());
    note_off(&mut handler, &mut fixture, PADS, 3);
    assert_eq!(3, fixture.state.pad_notes()[3]);
    assert_eq!(0, fixture.uploads());
}

#[test]
fn keybed_note_is_ignored_while_multiple_pads_are_held() {
    let mut fixture = Fixture::new();
    let mut handler = NotePadHandler::new(&NOTEPAD_PROFILE);
    assert!(note_on(&mut handler, &mut fixture, PADS, 3));
    assert!(note_on(&mut handler, &mut fixture, PADS, 4));
    assert!(!note_on(&mut handler, &mut fixture, KEYBED, 67));
    note_off(&mut handler, &mut fixture, PADS, 3);
    note_off(&mut handler, &mut fixture, PADS, 4);
    assert!(!fixture.state.contains_note(67));
    assert_eq!(0, fixture.uploads());
}

#[test]
fn remove_knob_restores_default_notes() {
    let mut fixture = Fixture::new();
    fixture.state.set_pad_note(3, 67);
    let mut handler = NotePadHandler::new(&NOTEPAD_PROFILE);
    assert!(note_on(&mut handler, &mut fixture, PADS, 67));
    cc(&mut handler, &mut fixture, REMOVE_KNOB, 100);
    assert!(!handler.has_pending_edits());
    cc(&mut handler, &mut fixture, REMOVE_KNOB, 127);
    assert!(handler.has_pending_edits());
    assert_eq!(
        vec![note_off_message(PADS, 67).to_vec()],
        fixture.app.sent_midi
    );
    assert_eq!(0, fixture.uploads());

    note_off(&mut handler, &mut fixture, PADS, 67);
    assert_eq!(3, fixture.state.pad_notes()[3]);
    assert!(!fixture.state.is_pad_assigned(3));
    assert_eq!(1, fixture.uploads());
}

#[test]
fn channel_is_committed_when_channel_pad_is_released() {
    let mut fixture = Fixture::new();
    let mut handler = NotePadHandler::new(&NOTEPAD_PROFILE);
    // Ignored without holding the channel pad
    cc(&mut handler, &mut fixture, CHANNEL_KNOB, 3);
    assert!(!handler.has_pending_edits());

    cc(&mut handler, &mut fixture, CHANNEL_PAD, 127);
    cc(&mut handler, &mut fixture, CHANNEL_KNOB, 5);
    assert_eq!(9, fixture.state.pads_channel());
    assert_eq!(0, fixture.uploads());
    cc(&mut handler, &mut fixture, CHANNEL_PAD, 0);
    assert_eq!(4, fixture.state.pads_channel());
    assert_eq!(1, fixture.uploads());
}

#[test]
fn deactivate_discards_staged_edits() {
    let mut fixture = Fixture::new();
    let mut handler = NotePadHandler::new(&NOTEPAD_PROFILE);
    assert!(note_on(&mut handler, &mut fixture, PADS, 3));
    assert!(note_on(&mut handler, &mut fixture, KEYBED, 67));
    handler
        .deactivate(&mut fixture.context(TimeStamp::default()))
        .unwrap();
    assert!(!handler.has_pending_edits());
    note_off(&mut handler, &mut fixture, PADS, 3);
    assert!(!fixture.state.contains_note(67));
    assert_eq!(0, fixture.uploads());
}
