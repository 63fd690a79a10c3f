// SPDX-FileCopyrightText: The padio authors
// SPDX-License-Identifier: MPL-2.0

use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use super::{BoxedModeHandler, Context, DeviceProfile, Mode, ModeHandler, ProgramChangeTarget};
use crate::{
    app::{MediaState, Screen, Signal, Workstation, WorkstationObserver},
    Clock, MidiEvent, MidiInputHandler, MidiOutputConnection, OutputResult, PersistedState,
    TimeStamp,
};

/// Drives a single device.
///
/// Owns the workstation handle, the output connection, the persisted
/// state, and one handler per mode.
#[allow(missing_debug_implementations)]
pub struct Driver<W, O> {
    profile: DeviceProfile,
    app: W,
    output: O,
    state: PersistedState,
    state_file: Option<PathBuf>,
    handlers: Vec<BoxedModeHandler>,
    current_mode: Mode,
    previous_mode: Mode,
    screen: Option<Screen>,
    suppress_session_toggle: bool,
    last_seen: TimeStamp,
    initialized: bool,
}

impl<W, O> Driver<W, O>
where
    W: Workstation,
    O: MidiOutputConnection,
{
    /// Create a new driver in the default mode of the profile.
    ///
    /// Nothing is sent before [`Self::init()`] is invoked.
    #[must_use]
    pub fn new(profile: DeviceProfile, app: W, output: O, handlers: Vec<BoxedModeHandler>) -> Self {
        debug_assert!(handlers
            .iter()
            .any(|handler| handler.mode() == profile.default_mode));
        Self {
            current_mode: profile.default_mode,
            previous_mode: profile.default_mode,
            profile,
            app,
            output,
            state: PersistedState::default(),
            state_file: None,
            handlers,
            screen: None,
            suppress_session_toggle: false,
            last_seen: TimeStamp::default(),
            initialized: false,
        }
    }

    /// Restore the state from a file on init and save it on teardown.
    #[must_use]
    pub fn with_state_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.state_file = Some(path.into());
        self
    }

    #[must_use]
    pub const fn profile(&self) -> &DeviceProfile {
        &self.profile
    }

    #[must_use]
    pub const fn current_mode(&self) -> Mode {
        self.current_mode
    }

    /// The last mode before the current one, excluding navigation.
    #[must_use]
    pub const fn previous_mode(&self) -> Mode {
        self.previous_mode
    }

    #[must_use]
    pub const fn screen(&self) -> Option<Screen> {
        self.screen
    }

    #[must_use]
    pub const fn state(&self) -> &PersistedState {
        &self.state
    }

    /// Replace the persisted state, e.g. after loading it externally.
    ///
    /// The new state takes effect with the next layout upload.
    pub fn set_state(&mut self, state: PersistedState) {
        self.state = state;
    }

    #[must_use]
    pub const fn app(&self) -> &W {
        &self.app
    }

    pub fn app_mut(&mut self) -> &mut W {
        &mut self.app
    }

    #[must_use]
    pub const fn output(&self) -> &O {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn subscribed_signals(&self) -> Vec<Signal> {
        let mut signals = Vec::new();
        for signal in self.handlers.iter().flat_map(|handler| handler.signals()) {
            if !signals.contains(signal) {
                signals.push(*signal);
            }
        }
        signals
    }

    fn send_sequence(&mut self, messages: Vec<Vec<u8>>) -> OutputResult<()> {
        for message in messages {
            self.output.send_midi_output(&message)?;
        }
        Ok(())
    }

    /// Take control of the device.
    ///
    /// Restores the persisted state, subscribes to signals, and
    /// activates the current mode.
    pub fn init(&mut self, now: TimeStamp) -> OutputResult<()> {
        log::info!(
            "Initializing {device}",
            device = self.profile.descriptor.device.name()
        );
        self.last_seen = now;
        if let Some(path) = &self.state_file {
            self.state = PersistedState::load_from_file(path);
        }
        let claim = (self.profile.claim)();
        self.send_sequence(claim)?;
        for signal in self.subscribed_signals() {
            self.app.subscribe(signal);
        }
        self.initialized = true;
        let mode = self.current_mode;
        self.with_handler(mode, now, |handler, ctx| handler.activate(ctx))
            .unwrap_or(Ok(()))
    }

    /// Release the device.
    ///
    /// Unsubscribes from signals, saves the persisted state, and
    /// deactivates the current mode before leaving the device in a
    /// clean state.
    pub fn end(&mut self, now: TimeStamp) -> OutputResult<()> {
        if !self.initialized {
            return Ok(());
        }
        log::info!(
            "Releasing {device}",
            device = self.profile.descriptor.device.name()
        );
        self.last_seen = now;
        for signal in self.subscribed_signals() {
            self.app.unsubscribe(signal);
        }
        if let Some(path) = &self.state_file {
            if let Err(err) = self.state.save_to_file(path) {
                log::warn!("Failed to save state: {err:#}");
            }
        }
        self.initialized = false;
        let mode = self.current_mode;
        let deactivated = self
            .with_handler(mode, now, |handler, ctx| handler.deactivate(ctx))
            .unwrap_or(Ok(()));
        let release = (self.profile.release)();
        let released = self.send_sequence(release);
        deactivated.and(released)
    }

    pub fn sleep_on(&mut self) -> OutputResult<()> {
        let messages = (self.profile.sleep_on)();
        self.send_sequence(messages)
    }

    pub fn sleep_off(&mut self) -> OutputResult<()> {
        let messages = (self.profile.sleep_off)();
        self.send_sequence(messages)
    }

    pub fn light_off(&mut self) -> OutputResult<()> {
        let messages = (self.profile.light_off)();
        self.send_sequence(messages)
    }

    /// Invoke a closure on the handler for a mode.
    ///
    /// Returns `None` if the device has no handler for this mode.
    /// Mode requests of the handler are processed afterwards.
    fn with_handler<T>(
        &mut self,
        mode: Mode,
        now: TimeStamp,
        f: impl FnOnce(&mut dyn ModeHandler, &mut Context<'_>) -> OutputResult<T>,
    ) -> Option<OutputResult<T>> {
        let active = mode == self.current_mode && self.initialized;
        let Some(handler) = self
            .handlers
            .iter_mut()
            .find(|handler| handler.mode() == mode)
        else {
            log::error!("No handler for mode {mode}");
            return None;
        };
        let mut ctx = Context::new(
            &mut self.app,
            &mut self.output,
            &mut self.state,
            self.screen,
            now,
            active,
        );
        let result = f(handler.as_mut(), &mut ctx);
        let requested_mode = ctx.take_requested_mode();
        if let Some(requested_mode) = requested_mode {
            if let Err(err) = self.switch_mode(requested_mode, now) {
                log::error!("Failed to switch to mode {requested_mode}: {err}");
            }
        }
        Some(result)
    }

    /// Switch to another mode.
    ///
    /// Switching to the current mode has no effect.
    pub fn switch_mode(&mut self, mode: Mode, now: TimeStamp) -> OutputResult<()> {
        if mode == self.current_mode {
            log::debug!("Already in mode {mode}");
            return Ok(());
        }
        if !self.handlers.iter().any(|handler| handler.mode() == mode) {
            log::debug!("Ignoring switch to unsupported mode {mode}");
            return Ok(());
        }
        let old_mode = self.current_mode;
        log::debug!("Switching mode: {old_mode} -> {mode}");
        let deactivated = if self.initialized {
            self.with_handler(old_mode, now, |handler, ctx| handler.deactivate(ctx))
                .unwrap_or(Ok(()))
        } else {
            Ok(())
        };
        if old_mode != self.profile.navigation_mode {
            self.previous_mode = old_mode;
        }
        self.current_mode = mode;
        if mode == self.profile.navigation_mode {
            let previous_mode = self.previous_mode;
            if let Some(handler) = self
                .handlers
                .iter_mut()
                .find(|handler| handler.mode() == mode)
            {
                handler.on_previous_mode_changed(previous_mode);
            }
        }
        if !self.initialized {
            return deactivated;
        }
        let activated = self
            .with_handler(mode, now, |handler, ctx| handler.activate(ctx))
            .unwrap_or(Ok(()));
        deactivated.and(activated)
    }

    /// Toggle between navigation and the last functional mode.
    pub fn toggle_navigation(&mut self, now: TimeStamp) -> OutputResult<()> {
        let mode = if self.current_mode == self.profile.navigation_mode {
            self.previous_mode
        } else {
            self.profile.navigation_mode
        };
        self.switch_mode(mode, now)
    }

    fn handle_program_change(&mut self, program: u8, now: TimeStamp) -> OutputResult<bool> {
        let Some(target) = self.profile.program_change_target(program) else {
            log::debug!("Ignoring unmapped program change {program}");
            return Ok(false);
        };
        match target {
            ProgramChangeTarget::SwitchMode(mode) => self.switch_mode(mode, now)?,
            ProgramChangeTarget::Action(action) => {
                log::debug!("Sending action {action}");
                self.app.send_action(action);
            }
            ProgramChangeTarget::ToggleScreen {
                current,
                then,
                otherwise,
            } => {
                let action = if self.screen == Some(current) {
                    then
                } else {
                    otherwise
                };
                log::debug!("Sending action {action}");
                self.app.send_action(action);
            }
        }
        Ok(true)
    }

    fn handle_control_change(
        &mut self,
        channel: u8,
        controller: u8,
        value: u8,
        now: TimeStamp,
    ) -> OutputResult<bool> {
        if let Some(toggle) = self.profile.session_toggle {
            if controller == toggle.controller {
                if value == 0 {
                    if self.suppress_session_toggle {
                        self.suppress_session_toggle = false;
                    } else {
                        self.toggle_navigation(now)?;
                    }
                }
                return Ok(true);
            }
            if value == 0 && toggle.suppressing_controllers.contains(&controller) {
                self.suppress_session_toggle = true;
            }
        }
        let mode = self.current_mode;
        self.with_handler(mode, now, |handler, ctx| {
            handler.on_control_change(ctx, channel, controller, value)
        })
        .unwrap_or(Ok(false))
    }

    /// Route a decoded event to the active mode.
    pub fn handle_event(&mut self, event: MidiEvent, now: TimeStamp) -> OutputResult<bool> {
        self.last_seen = now;
        if !self.initialized {
            log::debug!("Ignoring {event:?} before initialization");
            return Ok(false);
        }
        let mode = self.current_mode;
        match event {
            MidiEvent::ProgramChange { program, .. } => self.handle_program_change(program, now),
            MidiEvent::NoteOn {
                channel,
                note,
                velocity,
            } => self
                .with_handler(mode, now, |handler, ctx| {
                    handler.on_note_on(ctx, channel, note, velocity)
                })
                .unwrap_or(Ok(false)),
            MidiEvent::NoteOff { channel, note } => self
                .with_handler(mode, now, |handler, ctx| {
                    handler.on_note_off(ctx, channel, note)
                })
                .unwrap_or(Ok(false)),
            MidiEvent::ControlChange {
                channel,
                controller,
                value,
            } => self.handle_control_change(channel, controller, value, now),
        }
    }

    /// Fire the due timers of the active mode.
    pub fn poll_timers(&mut self, now: TimeStamp) -> OutputResult<()> {
        self.last_seen = now;
        if !self.initialized {
            return Ok(());
        }
        let mode = self.current_mode;
        self.with_handler(mode, now, |handler, ctx| handler.poll_timers(ctx))
            .unwrap_or(Ok(()))
    }

    /// Forward a signal to every interested handler.
    fn notify(
        &mut self,
        signal: Signal,
        f: impl Fn(&mut dyn ModeHandler, &mut Context<'_>) -> OutputResult<()>,
    ) {
        let now = self.last_seen;
        let modes = self
            .handlers
            .iter()
            .filter(|handler| handler.signals().contains(&signal))
            .map(|handler| handler.mode())
            .collect::<Vec<_>>();
        for mode in modes {
            if let Some(Err(err)) = self.with_handler(mode, now, &f) {
                log::error!("Failed to handle signal {signal} in mode {mode}: {err}");
            }
        }
    }
}

impl<W, O> WorkstationObserver for Driver<W, O>
where
    W: Workstation,
    O: MidiOutputConnection,
{
    fn on_screen_changed(&mut self, screen: Screen) {
        log::debug!("Screen changed: {screen}");
        self.screen = Some(screen);
        self.notify(Signal::ScreenChanged, |handler, ctx| {
            handler.on_screen_changed(ctx, screen)
        });
    }

    fn on_media_state_changed(&mut self, state: MediaState) {
        log::debug!("Media state changed: {state:?}");
        self.notify(Signal::MediaStateChanged, |handler, ctx| {
            handler.on_media_state_changed(ctx, state)
        });
    }
}

impl<W, O> MidiInputHandler for Driver<W, O>
where
    W: Workstation + Send,
    O: MidiOutputConnection + Send,
{
    fn handle_midi_input(&mut self, ts: TimeStamp, input: &[u8]) -> bool {
        log::trace!("Received MIDI input at {ts}: {input:x?}");
        let event = match MidiEvent::try_decode(input) {
            Ok(Some(event)) => event,
            Ok(None) => return false,
            Err(err) => {
                log::debug!("Failed to decode MIDI input {input:x?}: {err:?}");
                return false;
            }
        };
        match self.handle_event(event, ts) {
            Ok(handled) => handled,
            Err(err) => {
                log::error!("Failed to handle {event:?}: {err}");
                true
            }
        }
    }
}

/// A driver that is shared between the MIDI input and timer threads.
///
/// Input time stamps of the transport are replaced by the shared
/// clock to keep a single time base for all timers.
#[allow(missing_debug_implementations)]
pub struct SharedDriver<W, O> {
    driver: Arc<Mutex<Driver<W, O>>>,
    clock: Clock,
}

impl<W, O> Clone for SharedDriver<W, O> {
    fn clone(&self) -> Self {
        Self {
            driver: Arc::clone(&self.driver),
            clock: self.clock,
        }
    }
}

impl<W, O> SharedDriver<W, O>
where
    W: Workstation,
    O: MidiOutputConnection,
{
    #[must_use]
    pub fn new(driver: Driver<W, O>, clock: Clock) -> Self {
        Self {
            driver: Arc::new(Mutex::new(driver)),
            clock,
        }
    }

    #[must_use]
    pub const fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Run a closure on the locked driver with the current time.
    ///
    /// Returns `None` if the lock has been poisoned.
    pub fn with_driver<T>(&self, f: impl FnOnce(&mut Driver<W, O>, TimeStamp) -> T) -> Option<T> {
        let now = self.clock.now();
        match self.driver.lock() {
            Ok(mut driver) => Some(f(&mut driver, now)),
            Err(err) => {
                log::error!("Driver lock poisoned: {err}");
                None
            }
        }
    }

    pub fn poll_timers(&self) {
        if let Some(Err(err)) = self.with_driver(|driver, now| driver.poll_timers(now)) {
            log::error!("Failed to poll timers: {err}");
        }
    }
}

impl<W, O> WorkstationObserver for SharedDriver<W, O>
where
    W: Workstation,
    O: MidiOutputConnection,
{
    fn on_screen_changed(&mut self, screen: Screen) {
        self.with_driver(|driver, now| {
            driver.last_seen = now;
            driver.on_screen_changed(screen);
        });
    }

    fn on_media_state_changed(&mut self, state: MediaState) {
        self.with_driver(|driver, now| {
            driver.last_seen = now;
            driver.on_media_state_changed(state);
        });
    }
}

impl<W, O> MidiInputHandler for SharedDriver<W, O>
where
    W: Workstation + Send,
    O: MidiOutputConnection + Send,
{
    fn handle_midi_input(&mut self, _ts: TimeStamp, input: &[u8]) -> bool {
        self.with_driver(|driver, now| driver.handle_midi_input(now, input))
            .unwrap_or(false)
    }
}
