// SPDX-FileCopyrightText: The padio authors
// SPDX-License-Identifier: MPL-2.0

//! Screen navigation of the workstation.
//!
//! Arrow, select, and back buttons are mapped onto the corresponding
//! actions. Screen buttons support short, bold, and long presses.
//! Knobs act as the rotary encoders of the workstation and a joystick
//! or dedicated buttons auto-repeat while held.

use std::time::Duration;

use super::ProgramLayout;
use crate::{
    app::{Action, MediaKind, MediaSource, MediaState, Screen, Signal},
    controller::{Context, Mode, ModeHandler},
    sysex::grid::{self, palette},
    timing::{
        ButtonTimer, DelayedTasks, IntervalRepeater, KnobSpeedControl, PressType, RepeatSpeed,
        RepeatSpeedTable,
    },
    ButtonInput, LedColor, LedMode, OutputResult,
};

/// Auto-repeat intervals of a joystick by deflection.
pub const JOYSTICK_SPEED: RepeatSpeedTable = RepeatSpeedTable::new(&[
    RepeatSpeed {
        min_value: 30,
        interval: Duration::from_millis(800),
    },
    RepeatSpeed {
        min_value: 100,
        interval: Duration::from_millis(300),
    },
    RepeatSpeed {
        min_value: 120,
        interval: Duration::from_millis(50),
    },
]);

/// How long the tempo screen stays visible after the last change.
pub const TEMPO_SCREEN_TIMEOUT: Duration = Duration::from_millis(1500);

/// Delay between the last tempo change and the layout upload.
pub const TEMPO_UPLOAD_DELAY: Duration = Duration::from_millis(1500);

/// BPM per encoder tick
const TEMPO_STEP: f32 = 0.1;

const ENCODER_REPEAT_INTERVAL: Duration = Duration::from_millis(120);
const ENCODER_REPEAT_INTERVAL_SHIFTED: Duration = Duration::from_millis(10);
const ENCODER_REPEAT_DELTA: i32 = 1;
const ENCODER_REPEAT_DELTA_SHIFTED: i32 = 2;

/// Program change offset of the function buttons in alt mode.
const ALT_PROGRAM_OFFSET: u8 = 4;

/// Whether buttons are reported as notes or as control changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonSource {
    Note,
    ControlChange,
}

/// A button that fires its action immediately when pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectButton {
    pub id: u8,
    pub action: Action,
    pub color: LedColor,
}

/// Feedback role of a [`TimedButton`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonRole {
    /// Opens one of multiple screens
    Screen,
    Record,
    Stop,
    Play,
    EncoderSwitch,
}

/// A button that distinguishes short, bold, and long presses.
///
/// Short presses cycle through the actions, starting after the
/// action that corresponds to the current screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimedButton {
    pub id: u8,
    pub role: ButtonRole,
    pub actions: &'static [Action],
    /// Screens and the index of their action in `actions`
    pub screens: &'static [(Screen, usize)],
    /// Fired on a bold press instead of the second action
    pub bold: Option<Action>,
    pub long: Option<Action>,
}

impl TimedButton {
    fn screen_state(&self, screen: Option<Screen>) -> Option<usize> {
        let screen = screen?;
        self.screens
            .iter()
            .find_map(|(other, index)| (*other == screen).then_some(*index))
    }

    fn action(&self, press: PressType, screen: Option<Screen>) -> Option<Action> {
        match press {
            PressType::Short => {
                if self.actions.is_empty() {
                    return None;
                }
                let index = self
                    .screen_state(screen)
                    .map_or(0, |state| (state + 1) % self.actions.len());
                self.actions.get(index).copied()
            }
            PressType::Bold => self.bold.or_else(|| {
                self.actions
                    .get(1)
                    .or_else(|| self.actions.first())
                    .copied()
            }),
            PressType::Long => self.long,
        }
    }
}

/// A knob that acts as a rotary encoder of the workstation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderKnob {
    pub cc: u8,
    pub index: u8,
}

/// One direction of a joystick axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoystickDirection {
    pub cc: u8,
    pub action: Action,
}

/// Two buttons that turn an encoder while held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderButtons {
    pub index: u8,
    pub decrement: u8,
    pub increment: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeButtonTarget {
    Mode(Mode),
    Action(Action),
}

/// Leaves navigation when released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeButton {
    pub id: u8,
    pub target: ModeButtonTarget,
    pub color: LedColor,
}

/// LED feedback of a grid controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationLeds {
    pub logo: u8,
    pub encoder_decrement: LedColor,
    pub encoder_increment: LedColor,
    pub encoder_switch: LedColor,
}

#[derive(Debug, Clone, Copy)]
pub struct NavigationProfile {
    pub source: ButtonSource,
    pub buttons: &'static [DirectButton],
    pub timed_buttons: &'static [TimedButton],
    /// Send program changes 1, 2, ... or 5, 6, ... in alt mode
    pub program_buttons: &'static [u8],
    pub alt_button: Option<u8>,
    pub encoders: &'static [EncoderKnob],
    pub tempo_knob: Option<u8>,
    pub joystick: &'static [JoystickDirection],
    pub encoder_buttons: &'static [EncoderButtons],
    /// Control change of a shift button
    pub shift: Option<u8>,
    pub mode_buttons: &'static [ModeButton],
    pub layout: Option<ProgramLayout>,
    pub leds: Option<NavigationLeds>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RepeatKey {
    Joystick(u8),
    EncoderButton(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DelayedTask {
    LeaveTempoScreen,
    UploadLayout,
}

#[derive(Debug)]
pub struct NavigationHandler {
    profile: &'static NavigationProfile,
    button_timer: ButtonTimer<u8>,
    repeater: IntervalRepeater<RepeatKey>,
    /// Encoder deltas of held encoder buttons
    encoder_repeats: Vec<(u8, u8, i32)>,
    delayed: DelayedTasks<DelayedTask>,
    knobs: KnobSpeedControl<u8>,
    shifted: bool,
    alt: bool,
    previous_mode: Option<Mode>,
    playing: Vec<MediaSource>,
    recording: Vec<MediaSource>,
}

impl NavigationHandler {
    #[must_use]
    pub fn new(profile: &'static NavigationProfile) -> Self {
        Self {
            profile,
            button_timer: ButtonTimer::default(),
            repeater: IntervalRepeater::new(),
            encoder_repeats: Vec::new(),
            delayed: DelayedTasks::new(),
            knobs: KnobSpeedControl::default(),
            shifted: false,
            alt: false,
            previous_mode: None,
            playing: Vec::new(),
            recording: Vec::new(),
        }
    }

    #[must_use]
    pub const fn is_alt(&self) -> bool {
        self.alt
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        !self.playing.is_empty()
    }

    #[must_use]
    pub fn is_recording(&self) -> bool {
        !self.recording.is_empty()
    }

    fn upload_layout(&self, ctx: &mut Context<'_>) -> OutputResult<()> {
        let Some(layout) = &self.profile.layout else {
            return Ok(());
        };
        let tempo = ctx.app.tempo();
        ctx.upload_program(&layout.build(ctx.state, tempo))
    }

    fn cancel_timers(&mut self) {
        self.button_timer.cancel_all();
        self.repeater.clear();
        self.encoder_repeats.clear();
        self.delayed.clear();
        self.knobs.reset();
    }

    fn on_button(&mut self, ctx: &mut Context<'_>, id: u8, input: ButtonInput) -> OutputResult<bool> {
        let pressed = input.is_pressed();
        if let Some(buttons) = self
            .profile
            .encoder_buttons
            .iter()
            .find(|buttons| buttons.decrement == id || buttons.increment == id)
        {
            let key = RepeatKey::EncoderButton(id);
            if pressed {
                let (interval, delta) = if self.shifted {
                    (ENCODER_REPEAT_INTERVAL_SHIFTED, ENCODER_REPEAT_DELTA_SHIFTED)
                } else {
                    (ENCODER_REPEAT_INTERVAL, ENCODER_REPEAT_DELTA)
                };
                let delta = if id == buttons.decrement { -delta } else { delta };
                self.encoder_repeats.retain(|(other, _, _)| *other != id);
                self.encoder_repeats.push((id, buttons.index, delta));
                self.repeater.add(key, ctx.now, interval);
            } else {
                self.repeater.remove(&key);
                self.encoder_repeats.retain(|(other, _, _)| *other != id);
            }
            return Ok(true);
        }
        if !pressed {
            return self.on_button_released(ctx, id);
        }
        if self.shifted {
            log::debug!("Ignoring shifted button {id}");
            return Ok(true);
        }
        if let Some(button) = self.profile.buttons.iter().find(|button| button.id == id) {
            ctx.send_action(button.action);
            return Ok(true);
        }
        if self.profile.alt_button == Some(id) {
            self.alt = !self.alt;
            log::debug!("Alt mode: {alt}", alt = self.alt);
            ctx.send_action(Action::ToggleAltMode);
            self.refresh_leds(ctx)?;
            return Ok(true);
        }
        if let Some(position) = self
            .profile
            .program_buttons
            .iter()
            .position(|button| *button == id)
        {
            #[allow(clippy::cast_possible_truncation)]
            let mut program = position as u8 + 1;
            if self.alt {
                program += ALT_PROGRAM_OFFSET;
            }
            ctx.send_action(Action::ProgramChange(program));
            return Ok(true);
        }
        if self
            .profile
            .timed_buttons
            .iter()
            .any(|button| button.id == id)
        {
            self.button_timer.press(id, ctx.now);
            return Ok(true);
        }
        Ok(self
            .profile
            .mode_buttons
            .iter()
            .any(|button| button.id == id))
    }

    fn on_button_released(&mut self, ctx: &mut Context<'_>, id: u8) -> OutputResult<bool> {
        if let Some(button) = self
            .profile
            .timed_buttons
            .iter()
            .find(|button| button.id == id)
        {
            if let Some(press) = self.button_timer.release(&id, ctx.now) {
                log::debug!("{press} press of button {id}");
                if let Some(action) = button.action(press, ctx.screen) {
                    ctx.send_action(action);
                }
            }
            return Ok(true);
        }
        if let Some(button) = self
            .profile
            .mode_buttons
            .iter()
            .find(|button| button.id == id)
        {
            match button.target {
                ModeButtonTarget::Mode(mode) => ctx.request_mode(mode),
                ModeButtonTarget::Action(action) => ctx.send_action(action),
            }
            return Ok(true);
        }
        // Direct buttons only act on press
        Ok(self.profile.buttons.iter().any(|button| button.id == id)
            || self.profile.alt_button == Some(id)
            || self.profile.program_buttons.contains(&id))
    }

    fn on_joystick(&mut self, ctx: &Context<'_>, direction: JoystickDirection, value: u8) {
        let key = RepeatKey::Joystick(direction.cc);
        match JOYSTICK_SPEED.interval_for(value) {
            None => {
                self.repeater.remove(&key);
            }
            Some(interval) => {
                if !self.repeater.update(&key, interval) {
                    self.repeater.add(key, ctx.now, interval);
                }
            }
        }
    }

    fn on_tempo_knob(&mut self, ctx: &mut Context<'_>, delta: i32) {
        if ctx.screen == Some(Screen::Tempo) {
            self.delayed
                .update(&DelayedTask::LeaveTempoScreen, ctx.now, TEMPO_SCREEN_TIMEOUT);
        } else {
            ctx.send_action(Action::Tempo);
            self.delayed
                .add(DelayedTask::LeaveTempoScreen, ctx.now, TEMPO_SCREEN_TIMEOUT);
        }
        #[allow(clippy::cast_precision_loss)]
        let tempo = ctx.app.tempo() + delta as f32 * TEMPO_STEP;
        log::debug!("Tempo: {tempo:.1}");
        ctx.app.set_tempo(tempo);
        if self.profile.layout.is_some() {
            self.delayed
                .add(DelayedTask::UploadLayout, ctx.now, TEMPO_UPLOAD_DELAY);
        }
    }

    fn refresh_leds(&self, ctx: &mut Context<'_>) -> OutputResult<()> {
        let Some(leds) = self.profile.leds else {
            return Ok(());
        };
        if !ctx.active {
            return Ok(());
        }
        ctx.send(&grid::clear_daw_state())?;
        for button in self.profile.buttons {
            ctx.set_led(button.id, button.color, LedMode::Static)?;
        }
        let (program_color, alt_color) = if self.alt {
            (palette::PURPLE, palette::PURPLE)
        } else {
            (palette::WHITE, palette::BLUE_DARK)
        };
        for id in self.profile.program_buttons {
            ctx.set_led(*id, program_color, LedMode::Static)?;
        }
        if let Some(id) = self.profile.alt_button {
            ctx.set_led(id, alt_color, LedMode::Static)?;
        }
        self.refresh_transport_leds(ctx)?;
        for buttons in self.profile.encoder_buttons {
            ctx.set_led(buttons.decrement, leds.encoder_decrement, LedMode::Static)?;
            ctx.set_led(buttons.increment, leds.encoder_increment, LedMode::Static)?;
        }
        for button in self.profile.timed_buttons {
            if button.role == ButtonRole::EncoderSwitch {
                ctx.set_led(button.id, leds.encoder_switch, LedMode::Static)?;
            }
        }
        self.refresh_screen_leds(ctx)?;
        ctx.set_led(leds.logo, palette::YELLOW, LedMode::Static)?;
        if let Some(shift) = self.profile.shift {
            ctx.set_led(shift, palette::WHITE, LedMode::Static)?;
        }
        for button in self.profile.mode_buttons {
            let mode = match button.target {
                ModeButtonTarget::Mode(mode) if Some(mode) == self.previous_mode => LedMode::Pulsing,
                _ => LedMode::Static,
            };
            ctx.set_led(button.id, button.color, mode)?;
        }
        Ok(())
    }

    fn refresh_screen_leds(&self, ctx: &mut Context<'_>) -> OutputResult<()> {
        if self.profile.leds.is_none() || !ctx.active {
            return Ok(());
        }
        for button in self.profile.timed_buttons {
            if button.role != ButtonRole::Screen {
                continue;
            }
            let color = match button.screen_state(ctx.screen) {
                Some(0) => palette::GREEN,
                Some(1) => palette::ORANGE,
                _ => palette::BLUE,
            };
            ctx.set_led(button.id, color, LedMode::Static)?;
        }
        Ok(())
    }

    fn refresh_transport_leds(&self, ctx: &mut Context<'_>) -> OutputResult<()> {
        if self.profile.leds.is_none() || !ctx.active {
            return Ok(());
        }
        for button in self.profile.timed_buttons {
            let active_color = match button.role {
                ButtonRole::Stop => {
                    ctx.set_led(button.id, palette::BLUE_SKY, LedMode::Static)?;
                    continue;
                }
                ButtonRole::Play if self.is_playing() => palette::GREEN,
                ButtonRole::Record if self.is_recording() => palette::RED,
                ButtonRole::Play | ButtonRole::Record => {
                    ctx.set_led(button.id, palette::BLUE_SKY, LedMode::Static)?;
                    continue;
                }
                ButtonRole::Screen | ButtonRole::EncoderSwitch => continue,
            };
            // Flashing only starts from an unlit LED
            ctx.led_off(button.id)?;
            ctx.set_led(button.id, active_color, LedMode::Flashing)?;
        }
        Ok(())
    }
}

impl ModeHandler for NavigationHandler {
    fn mode(&self) -> Mode {
        Mode::Navigation
    }

    fn signals(&self) -> &'static [Signal] {
        &[Signal::ScreenChanged, Signal::MediaStateChanged]
    }

    fn activate(&mut self, ctx: &mut Context<'_>) -> OutputResult<()> {
        self.upload_layout(ctx)?;
        self.refresh_leds(ctx)
    }

    fn deactivate(&mut self, _ctx: &mut Context<'_>) -> OutputResult<()> {
        self.cancel_timers();
        self.shifted = false;
        Ok(())
    }

    fn on_note_on(
        &mut self,
        ctx: &mut Context<'_>,
        _channel: u8,
        note: u8,
        velocity: u8,
    ) -> OutputResult<bool> {
        if self.profile.source != ButtonSource::Note {
            return Ok(false);
        }
        self.on_button(ctx, note, ButtonInput::from_u7(velocity))
    }

    fn on_note_off(&mut self, ctx: &mut Context<'_>, _channel: u8, note: u8) -> OutputResult<bool> {
        if self.profile.source != ButtonSource::Note {
            return Ok(false);
        }
        self.on_button(ctx, note, ButtonInput::Released)
    }

    fn on_control_change(
        &mut self,
        ctx: &mut Context<'_>,
        _channel: u8,
        controller: u8,
        value: u8,
    ) -> OutputResult<bool> {
        if self.profile.shift == Some(controller) {
            self.shifted = ButtonInput::from_u7(value).is_pressed();
            return Ok(true);
        }
        if let Some(direction) = self
            .profile
            .joystick
            .iter()
            .find(|direction| direction.cc == controller)
        {
            self.on_joystick(ctx, *direction, value);
            return Ok(true);
        }
        if self.profile.tempo_knob == Some(controller) {
            if let Some(delta) = self.knobs.feed(controller, value, ctx.now, self.shifted) {
                self.on_tempo_knob(ctx, delta);
            }
            return Ok(true);
        }
        if let Some(encoder) = self
            .profile
            .encoders
            .iter()
            .find(|encoder| encoder.cc == controller)
        {
            if let Some(delta) = self.knobs.feed(controller, value, ctx.now, self.shifted) {
                ctx.send_action(Action::Encoder {
                    index: encoder.index,
                    delta,
                });
            }
            return Ok(true);
        }
        if self.profile.source == ButtonSource::ControlChange {
            return self.on_button(ctx, controller, ButtonInput::from_u7(value));
        }
        Ok(false)
    }

    fn on_screen_changed(&mut self, ctx: &mut Context<'_>, _screen: Screen) -> OutputResult<()> {
        self.refresh_screen_leds(ctx)
    }

    fn on_media_state_changed(
        &mut self,
        ctx: &mut Context<'_>,
        state: MediaState,
    ) -> OutputResult<()> {
        let MediaState {
            source,
            kind,
            active,
        } = state;
        let sources = match kind {
            MediaKind::Player => &mut self.playing,
            MediaKind::Recorder => &mut self.recording,
        };
        sources.retain(|other| *other != source);
        if active {
            sources.push(source);
        }
        self.refresh_transport_leds(ctx)
    }

    fn on_previous_mode_changed(&mut self, mode: Mode) {
        self.previous_mode = Some(mode);
    }

    fn poll_timers(&mut self, ctx: &mut Context<'_>) -> OutputResult<()> {
        for id in self.button_timer.poll(ctx.now) {
            let Some(button) = self
                .profile
                .timed_buttons
                .iter()
                .find(|button| button.id == id)
            else {
                continue;
            };
            log::debug!("Long press of button {id}");
            if let Some(action) = button.action(PressType::Long, ctx.screen) {
                ctx.send_action(action);
            }
        }
        for key in self.repeater.poll(ctx.now) {
            let action = match key {
                RepeatKey::Joystick(cc) => self
                    .profile
                    .joystick
                    .iter()
                    .find_map(|direction| (direction.cc == cc).then_some(direction.action)),
                RepeatKey::EncoderButton(id) => self
                    .encoder_repeats
                    .iter()
                    .find_map(|(other, index, delta)| {
                        (*other == id).then_some(Action::Encoder {
                            index: *index,
                            delta: *delta,
                        })
                    }),
            };
            if let Some(action) = action {
                ctx.send_action(action);
            }
        }
        for task in self.delayed.poll(ctx.now) {
            match task {
                DelayedTask::LeaveTempoScreen => ctx.send_action(Action::Back),
                DelayedTask::UploadLayout => self.upload_layout(ctx)?,
            }
        }
        Ok(())
    }
}

#[cfg(all(
    test,
    feature = "akai-mpk-mini-mk3",
    feature = "novation-launchpad-mini-mk3"
))]
mod tests;
