// SPDX-FileCopyrightText: The padio authors
// SPDX-License-Identifier: MPL-2.0

//! Generic driver engine for mode based control surfaces.
//!
//! A device is described by a [`DeviceProfile`] and a set of
//! [`ModeHandler`]s. Exactly one handler is active at any time. The
//! [`Driver`] routes input to the active handler and manages the
//! transitions between modes.

use strum::{EnumIter, IntoStaticStr};

use crate::{
    app::{Action, Screen, Signal, Workstation},
    sysex::{grid, program::DeviceProgram},
    LedColor, LedMode, MidiDeviceDescriptor, MidiOutputConnection, OutputResult, PersistedState,
    TimeStamp,
};

mod driver;
pub use self::driver::{Driver, SharedDriver};

#[cfg(feature = "driver-thread")]
mod thread;
#[cfg(feature = "driver-thread")]
pub use self::thread::{DriverThread, DEFAULT_POLL_INTERVAL};

#[cfg(test)]
pub(crate) mod testing;

#[cfg(all(
    test,
    feature = "akai-mpk-mini-mk3",
    feature = "novation-launchpad-mini-mk3"
))]
mod tests;

/// Operating modes of a control surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, IntoStaticStr, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum Mode {
    /// Mixer strips and transport on the pads of a keyboard controller
    PadMixer,
    /// Screen navigation of the workstation
    Navigation,
    /// Pattern editing
    Pattern,
    /// Assignment of notes to pads
    NotePad,
    /// Mixer strips on a pad grid
    GridMixer,
}

/// Everything a mode handler may access while handling an event.
#[allow(missing_debug_implementations)]
pub struct Context<'a> {
    pub app: &'a mut dyn Workstation,
    pub output: &'a mut dyn MidiOutputConnection,
    pub state: &'a mut PersistedState,
    /// The screen that is currently shown, if known
    pub screen: Option<Screen>,
    pub now: TimeStamp,
    /// Whether the handler is the active one
    pub active: bool,
    requested_mode: Option<Mode>,
}

impl<'a> Context<'a> {
    pub fn new(
        app: &'a mut dyn Workstation,
        output: &'a mut dyn MidiOutputConnection,
        state: &'a mut PersistedState,
        screen: Option<Screen>,
        now: TimeStamp,
        active: bool,
    ) -> Self {
        Self {
            app,
            output,
            state,
            screen,
            now,
            active,
            requested_mode: None,
        }
    }

    pub fn send(&mut self, message: &[u8]) -> OutputResult<()> {
        self.output.send_midi_output(message)
    }

    pub fn send_action(&mut self, action: Action) {
        log::debug!("Sending action {action}");
        self.app.send_action(action);
    }

    /// Encode and upload a complete device program.
    ///
    /// Nothing is sent if the program is invalid.
    pub fn upload_program(&mut self, program: &DeviceProgram) -> OutputResult<()> {
        let message = program.encode()?;
        log::debug!("Uploading layout \"{name}\"", name = program.name);
        self.send(&message)
    }

    pub fn set_led(&mut self, led: u8, color: LedColor, mode: LedMode) -> OutputResult<()> {
        self.send(&grid::led_message(led, color, mode))
    }

    pub fn led_off(&mut self, led: u8) -> OutputResult<()> {
        self.set_led(led, LedColor::OFF, LedMode::Static)
    }

    /// Ask the driver to switch modes after the current event.
    pub fn request_mode(&mut self, mode: Mode) {
        self.requested_mode = Some(mode);
    }

    #[must_use]
    pub(crate) fn take_requested_mode(&mut self) -> Option<Mode> {
        self.requested_mode.take()
    }
}

/// One exclusive operating mode of a device.
///
/// Handlers own all of their transient interaction state including
/// timers. The input methods return `true` if the event was handled.
pub trait ModeHandler: Send {
    fn mode(&self) -> Mode;

    /// Signals that this handler wants to receive, even while inactive.
    fn signals(&self) -> &'static [Signal] {
        &[]
    }

    /// Enter the mode and upload its complete layout.
    fn activate(&mut self, ctx: &mut Context<'_>) -> OutputResult<()>;

    /// Leave the mode.
    ///
    /// Must cancel all pending timers and discard uncommitted edits.
    fn deactivate(&mut self, ctx: &mut Context<'_>) -> OutputResult<()>;

    fn on_note_on(
        &mut self,
        _ctx: &mut Context<'_>,
        _channel: u8,
        note: u8,
        _velocity: u8,
    ) -> OutputResult<bool> {
        log::debug!("Unhandled note on {note} in mode {mode}", mode = self.mode());
        Ok(false)
    }

    fn on_note_off(
        &mut self,
        _ctx: &mut Context<'_>,
        _channel: u8,
        note: u8,
    ) -> OutputResult<bool> {
        log::debug!("Unhandled note off {note} in mode {mode}", mode = self.mode());
        Ok(false)
    }

    fn on_control_change(
        &mut self,
        _ctx: &mut Context<'_>,
        _channel: u8,
        controller: u8,
        _value: u8,
    ) -> OutputResult<bool> {
        log::debug!(
            "Unhandled control change {controller} in mode {mode}",
            mode = self.mode()
        );
        Ok(false)
    }

    fn on_screen_changed(&mut self, _ctx: &mut Context<'_>, _screen: Screen) -> OutputResult<()> {
        Ok(())
    }

    fn on_media_state_changed(
        &mut self,
        _ctx: &mut Context<'_>,
        _state: crate::app::MediaState,
    ) -> OutputResult<()> {
        Ok(())
    }

    /// The last functional mode before entering this one.
    fn on_previous_mode_changed(&mut self, _mode: Mode) {}

    /// Fire all timers that are due.
    fn poll_timers(&mut self, _ctx: &mut Context<'_>) -> OutputResult<()> {
        Ok(())
    }
}

pub type BoxedModeHandler = Box<dyn ModeHandler + 'static>;

/// Reaction on a program change message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramChangeTarget {
    SwitchMode(Mode),
    Action(Action),
    /// Toggle between two screens
    ToggleScreen {
        /// The screen that is toggled away from
        current: Screen,
        /// Sent while `current` is shown
        then: Action,
        /// Sent otherwise
        otherwise: Action,
    },
}

/// Toggles between navigation and the previous functional mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionToggle {
    /// Toggles on release
    pub controller: u8,
    /// The release of any of these controllers suppresses the
    /// next toggle.
    pub suppressing_controllers: &'static [u8],
}

/// Builds the raw messages of a device specific sequence.
pub type MessageSequence = fn() -> Vec<Vec<u8>>;

#[must_use]
pub fn no_messages() -> Vec<Vec<u8>> {
    Vec::new()
}

/// Static description of a device.
#[derive(Debug, Clone, Copy)]
pub struct DeviceProfile {
    pub descriptor: &'static MidiDeviceDescriptor,
    pub default_mode: Mode,
    /// Excluded from the previous mode tracking
    pub navigation_mode: Mode,
    pub program_changes: &'static [(u8, ProgramChangeTarget)],
    pub session_toggle: Option<SessionToggle>,
    /// Sent when taking control of the device
    pub claim: MessageSequence,
    /// Sent when releasing the device
    pub release: MessageSequence,
    pub sleep_on: MessageSequence,
    pub sleep_off: MessageSequence,
    pub light_off: MessageSequence,
}

impl DeviceProfile {
    #[must_use]
    pub fn program_change_target(&self, program: u8) -> Option<ProgramChangeTarget> {
        self.program_changes
            .iter()
            .find_map(|(other, target)| (*other == program).then_some(*target))
    }
}
